//! Test assertion helpers
#![allow(dead_code)] // Test utilities may not all be used in every test

use tressette::{
    game::Card,
    websockets::{MessageType, WebSocketMessage},
};

/// Asserts the message is an `error` carrying exactly `text`.
pub fn assert_error(message: &WebSocketMessage, text: &str) {
    assert_eq!(message.message_type, MessageType::Error, "{:?}", message);
    assert_eq!(message.payload["message"], text);
}

/// Cards of a `deal_hand` message.
pub fn hand_of(message: &WebSocketMessage) -> Vec<Card> {
    assert_eq!(message.message_type, MessageType::DealHand);
    serde_json::from_value(message.payload["hand"].clone()).unwrap()
}

/// Id of the team with the given number in a `game_start` message.
pub fn team_id(game_start: &WebSocketMessage, team_number: u8) -> String {
    assert_eq!(game_start.message_type, MessageType::GameStart);
    game_start.payload["teams"]
        .as_array()
        .unwrap()
        .iter()
        .find(|team| team["team_number"] == team_number)
        .and_then(|team| team["id"].as_str())
        .unwrap()
        .to_string()
}
