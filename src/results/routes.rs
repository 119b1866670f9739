use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};

use super::models::GameResult;
use crate::shared::{AppError, AppState};

/// Read-only routes over the finished games store
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/results", get(list_results))
        .route("/api/results/:id", get(get_result))
        .route("/api/results/player/:name", get(get_player_results))
}

/// GET /api/results
#[instrument(name = "list_results", skip(state))]
pub async fn list_results(State(state): State<AppState>) -> Result<Json<Vec<GameResult>>, AppError> {
    let results = state.results.list().await?;
    info!(result_count = results.len(), "Results listed");
    Ok(Json(results))
}

/// GET /api/results/:id
#[instrument(name = "get_result", skip(state))]
pub async fn get_result(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<GameResult>, AppError> {
    state
        .results
        .get_by_id(&id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("No result with id {id}")))
}

/// GET /api/results/player/:name
///
/// 404 when the player has no finished games.
#[instrument(name = "get_player_results", skip(state))]
pub async fn get_player_results(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Vec<GameResult>>, AppError> {
    let results = state.results.get_by_player(&name).await?;
    if results.is_empty() {
        return Err(AppError::NotFound(format!("No results for player {name}")));
    }
    Ok(Json(results))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::{InMemoryResultRepository, ResultRepository};
    use crate::shared::test_utils::AppStateBuilder;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use std::sync::Arc;
    use tower::ServiceExt; // for `oneshot`

    async fn app_with(results: Vec<GameResult>) -> Router {
        let repository = Arc::new(InMemoryResultRepository::new());
        for result in &results {
            repository.record(result).await.unwrap();
        }
        router().with_state(AppStateBuilder::new().with_results(repository).build())
    }

    fn sample(id: &str) -> GameResult {
        GameResult::new(
            id.to_string(),
            ["Ada".to_string(), "Bea".to_string()],
            ["Cid".to_string(), "Dan".to_string()],
            31,
            14,
        )
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_list_results() {
        let app = app_with(vec![sample("g1"), sample("g2")]).await;
        let (status, body) = get(app, "/api/results").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 2);
        assert_eq!(body[0]["id"], "g2");
    }

    #[tokio::test]
    async fn test_get_result_by_id() {
        let app = app_with(vec![sample("g1")]).await;
        let (status, body) = get(app.clone(), "/api/results/g1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["player1"], "Ada");
        assert_eq!(body["team1_score"], 31);

        let (status, body) = get(app, "/api/results/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_player_results_404_when_empty() {
        let app = app_with(vec![sample("g1")]).await;
        let (status, body) = get(app.clone(), "/api/results/player/Dan").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["id"], "g1");

        let (status, _) = get(app, "/api/results/player/Zed").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
