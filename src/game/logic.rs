// One game session between four seated players. The machine is synchronous: every
// transition appends addressed messages to an outbox that the owning session flushes.
use rand::{rngs::StdRng, SeedableRng};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::game::cards::{Card, Deck, Rank, Suit, Trick};
use crate::game::declaration::{self, Declaration, DeclarationError, DeclarationOutcome};
use crate::game::player::{seat_order, team_of_seat, Player, SeatRequest, Team, SEATS};
use crate::game::scoring;
use crate::results::GameResult;
use crate::websockets::{
    DeclarationConfirmationPayload, GameStatePayload, MessageType, PlayCardPayload, PlayerInfo,
    RoundEndPayload, TeamInfo, WebSocketMessage,
};

pub const CARDS_PER_PLAYER: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    Dealing,
    Playing,
    RoundOver,
    GameOver,
}

impl GameState {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameState::Dealing => "Dealing",
            GameState::Playing => "Playing",
            GameState::RoundOver => "RoundOver",
            GameState::GameOver => "GameOver",
        }
    }
}

/// Bookkeeping that can only go wrong through a bug. Ends the affected game.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameFault {
    #[error("hand inconsistency")]
    HandInconsistency,
    #[error("no card of the led suit in the trick")]
    NoLedSuitCard,
    #[error("dealing failed")]
    DealFailed,
    #[error("resolved an empty trick")]
    EmptyTrick,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("Game is already over.")]
    AlreadyOver,
    #[error("Cannot {0} now.")]
    NotPlaying(&'static str),
    #[error("Not your turn.")]
    NotYourTurn,
    #[error("Card not in your hand.")]
    CardNotInHand,
    #[error("Invalid move: you must follow {0}.")]
    MustFollowSuit(Suit),
    #[error("Invalid declaration: must have the same number of cards as dealt.")]
    AlreadyPlayed,
    #[error("Invalid declaration: {0}.")]
    InvalidDeclaration(#[from] DeclarationError),
    #[error("Invalid {0} message.")]
    InvalidPayload(&'static str),
    #[error("Unknown player.")]
    UnknownPlayer,
    #[error("Internal server error: {0}.")]
    Fault(#[from] GameFault),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recipient {
    All,
    Player(String),
}

#[derive(Debug, Clone)]
pub struct Outgoing {
    pub recipient: Recipient,
    pub message: WebSocketMessage,
}

#[derive(Debug)]
pub struct Game {
    id: String,
    players: [Player; SEATS],
    teams: [Team; 2],
    trick: Trick,
    turn: usize,
    state: GameState,
    target_score: u32,
    last_trick_winner: Option<usize>,
    round_starter: usize,
    rounds_played: u32,
    winning_team: Option<usize>,
    rng: StdRng,
    outbox: Vec<Outgoing>,
    pending_result: Option<GameResult>,
}

impl Game {
    /// Seats the four lobby members (given in join order) and prepares the first deal.
    pub fn new(members: [SeatRequest; SEATS], target_score: u32) -> Self {
        Self::with_rng(members, target_score, StdRng::from_rng(&mut rand::rng()))
    }

    /// Same as [`Game::new`] with a reproducible shuffle.
    pub fn with_seed(members: [SeatRequest; SEATS], target_score: u32, seed: u64) -> Self {
        Self::with_rng(members, target_score, StdRng::seed_from_u64(seed))
    }

    fn with_rng(members: [SeatRequest; SEATS], target_score: u32, rng: StdRng) -> Self {
        let order = seat_order(members.each_ref().map(|m| m.desired_team));
        let players = order.map(|join_index| Player::new(members[join_index].clone()));

        Self {
            id: uuid::Uuid::new_v4().to_string(),
            players,
            teams: [Team::new(1, [0, 2]), Team::new(2, [1, 3])],
            trick: Trick::new(),
            turn: 0,
            state: GameState::Dealing,
            target_score,
            last_trick_winner: None,
            round_starter: 0,
            rounds_played: 0,
            winning_team: None,
            rng,
            outbox: Vec::new(),
            pending_result: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn is_over(&self) -> bool {
        self.state == GameState::GameOver
    }

    pub fn players(&self) -> &[Player; SEATS] {
        &self.players
    }

    pub fn teams(&self) -> &[Team; 2] {
        &self.teams
    }

    pub fn target_score(&self) -> u32 {
        self.target_score
    }

    pub fn rounds_played(&self) -> u32 {
        self.rounds_played
    }

    pub fn current_player_id(&self) -> &str {
        &self.players[self.turn].id
    }

    pub fn seat_of(&self, player_id: &str) -> Option<usize> {
        self.players.iter().position(|p| p.id == player_id)
    }

    pub fn hand_of(&self, player_id: &str) -> Option<&[Card]> {
        self.seat_of(player_id).map(|seat| self.players[seat].hand.as_slice())
    }

    pub fn cards_on_table(&self) -> Vec<Card> {
        self.trick.cards()
    }

    /// Team number (1 or 2) of the winner once the game is over.
    pub fn winning_team(&self) -> Option<u8> {
        self.winning_team.map(|t| self.teams[t].number)
    }

    pub fn take_outbox(&mut self) -> Vec<Outgoing> {
        std::mem::take(&mut self.outbox)
    }

    /// The record to persist, produced once when the game ends by reaching its target.
    pub fn take_pending_result(&mut self) -> Option<GameResult> {
        self.pending_result.take()
    }

    /// Announces the seating and deals the first round.
    pub fn begin(&mut self) {
        let players: Vec<PlayerInfo> = self
            .players
            .iter()
            .enumerate()
            .map(|(seat, p)| self.player_info(seat, p))
            .collect();
        let teams: Vec<TeamInfo> = self
            .teams
            .iter()
            .map(|team| TeamInfo {
                id: team.id.clone(),
                players: team
                    .seats
                    .iter()
                    .map(|&seat| self.player_info(seat, &self.players[seat]))
                    .collect(),
                score: team.total_score(),
                team_number: team.number,
            })
            .collect();

        info!(game_id = %self.id, target_score = self.target_score, "Game starting");
        self.broadcast(WebSocketMessage::game_start(
            self.id.clone(),
            players,
            teams,
            self.target_score,
        ));

        if let Err(fault) = self.start_round() {
            self.abort(fault);
        }
    }

    fn player_info(&self, seat: usize, player: &Player) -> PlayerInfo {
        PlayerInfo {
            id: player.id.clone(),
            name: player.name.clone(),
            position: seat,
        }
    }

    /// Shuffles a fresh deck and deals it.
    pub fn start_round(&mut self) -> Result<(), GameFault> {
        let mut deck = Deck::new();
        deck.shuffle(&mut self.rng);
        let hands = deck
            .deal(SEATS, CARDS_PER_PLAYER)
            .ok_or(GameFault::DealFailed)?;
        self.start_round_with_hands(hands)
    }

    /// Starts a round with the given hands, seat by seat.
    pub fn start_round_with_hands(&mut self, hands: Vec<Vec<Card>>) -> Result<(), GameFault> {
        if self.is_over() {
            debug!(game_id = %self.id, "Not starting a round, game is over");
            return Ok(());
        }
        if hands.len() != SEATS || hands.iter().any(|h| h.len() != CARDS_PER_PLAYER) {
            return Err(GameFault::DealFailed);
        }

        self.state = GameState::Dealing;
        for team in self.teams.iter_mut() {
            team.reset_round();
        }
        self.trick.clear();
        self.turn = self.last_trick_winner.unwrap_or(self.round_starter);

        for (seat, hand) in hands.into_iter().enumerate() {
            self.players[seat].take_hand(hand.clone());
            let id = self.players[seat].id.clone();
            self.send_to(&id, WebSocketMessage::deal_hand(hand));
        }

        self.state = GameState::Playing;
        info!(
            game_id = %self.id,
            starter = self.turn,
            round = self.rounds_played + 1,
            "Round started"
        );
        self.broadcast_state();
        self.notify_turn();
        Ok(())
    }

    /// Applies a client action. Rule violations are answered to the sender, faults end
    /// the game for everyone.
    pub fn handle_action(&mut self, client_id: &str, message: &WebSocketMessage) {
        let result = match message.message_type {
            MessageType::PlayCard => match message.payload_as::<PlayCardPayload>() {
                Ok(payload) => self.play_requested(client_id, &payload),
                Err(_) => self
                    .precheck(client_id, "play card")
                    .and(Err(GameError::InvalidPayload("play_card"))),
            },
            MessageType::Declare => match message.payload_as::<Declaration>() {
                Ok(declaration) => self.declare(client_id, &declaration).map(|_| ()),
                Err(_) => self
                    .precheck(client_id, "declare")
                    .and(Err(GameError::InvalidPayload("declare"))),
            },
            other => {
                debug!(
                    game_id = %self.id,
                    client_id = %client_id,
                    message_type = ?other,
                    "Ignoring unhandled action"
                );
                Ok(())
            }
        };

        match result {
            Ok(()) => {}
            Err(GameError::UnknownPlayer) => {
                warn!(game_id = %self.id, client_id = %client_id, "Action from unknown client");
            }
            Err(GameError::Fault(fault)) => self.abort(fault),
            Err(err) => {
                debug!(game_id = %self.id, client_id = %client_id, error = %err, "Action rejected");
                self.send_to(client_id, WebSocketMessage::error(err.to_string()));
            }
        }
    }

    /// Checks that apply to every action, returning the actor's seat.
    fn precheck(&self, client_id: &str, action: &'static str) -> Result<usize, GameError> {
        if self.is_over() {
            return Err(GameError::AlreadyOver);
        }
        let seat = self.seat_of(client_id).ok_or(GameError::UnknownPlayer)?;
        if self.state != GameState::Playing {
            return Err(GameError::NotPlaying(action));
        }
        if seat != self.turn {
            return Err(GameError::NotYourTurn);
        }
        Ok(seat)
    }

    fn play_requested(
        &mut self,
        client_id: &str,
        payload: &PlayCardPayload,
    ) -> Result<(), GameError> {
        self.precheck(client_id, "play card")?;
        let card = Card::from_parts(&payload.suit, &payload.rank).map_err(|reason| {
            debug!(game_id = %self.id, client_id = %client_id, reason = %reason, "Unparseable card");
            GameError::CardNotInHand
        })?;
        self.play_card(client_id, card.suit, card.rank)
    }

    /// Plays the named card for `player_id`.
    pub fn play_card(&mut self, player_id: &str, suit: Suit, rank: Rank) -> Result<(), GameError> {
        let seat = self.precheck(player_id, "play card")?;
        let card = self.players[seat]
            .find_card(suit, rank)
            .ok_or(GameError::CardNotInHand)?;

        if let Some(led) = self.trick.led_suit() {
            if card.suit != led && self.players[seat].has_suit(led) {
                return Err(GameError::MustFollowSuit(led));
            }
        }

        if !self.players[seat].remove_card(&card) {
            return Err(GameFault::HandInconsistency.into());
        }
        self.trick.add_card(card, seat);
        debug!(game_id = %self.id, seat, card = %card, "Card played");
        self.send_to(player_id, WebSocketMessage::you_played(player_id.to_string(), card));

        if self.trick.is_complete() {
            self.broadcast_state();
            self.end_trick()?;
        } else {
            self.turn = (self.turn + 1) % SEATS;
            self.broadcast_state();
            self.notify_turn();
        }
        Ok(())
    }

    /// Records a bonus declaration for `player_id` before their first play of the round.
    pub fn declare(
        &mut self,
        player_id: &str,
        declaration: &Declaration,
    ) -> Result<DeclarationOutcome, GameError> {
        let seat = self.precheck(player_id, "declare")?;
        let player = &self.players[seat];
        if player.hand.len() != CARDS_PER_PLAYER {
            return Err(GameError::AlreadyPlayed);
        }

        let outcome = declaration::evaluate(&player.hand, &player.declarations, declaration)?;
        let scaled = scoring::scale(outcome.points);
        self.players[seat].declarations.push(outcome.declaration);

        let team = &mut self.teams[team_of_seat(seat)];
        team.add_score(scaled);
        info!(
            game_id = %self.id,
            player_id = %player_id,
            team = team.number,
            points = outcome.points,
            "Declaration accepted"
        );

        let confirmation = DeclarationConfirmationPayload {
            team_id: team.id.clone(),
            player_id: player_id.to_string(),
            points: scaled,
            declaration: outcome.declaration,
            without_suit: outcome.without_suit,
        };
        self.broadcast(WebSocketMessage::declaration_confirmation(confirmation));
        Ok(outcome)
    }

    fn end_trick(&mut self) -> Result<(), GameFault> {
        if self.trick.is_empty() {
            return Err(GameFault::EmptyTrick);
        }
        let winner = self.trick.winner().ok_or(GameFault::NoLedSuitCard)?;

        let remaining = self.players[0].hand.len();
        if self.players.iter().any(|p| p.hand.len() != remaining) {
            return Err(GameFault::HandInconsistency);
        }
        let is_last = remaining == 0;

        let mut points = self.trick.points();
        if is_last {
            points += scoring::LAST_TRICK_BONUS;
        }

        let team_index = team_of_seat(winner.player_index);
        self.teams[team_index].add_score(points);
        let winner_id = self.players[winner.player_index].id.clone();
        debug!(
            game_id = %self.id,
            winner = winner.player_index,
            team = self.teams[team_index].number,
            points,
            "Trick resolved"
        );

        let cards = self.trick.cards();
        self.broadcast(WebSocketMessage::trick_end(winner, winner_id, cards, points));

        self.trick.clear();
        self.last_trick_winner = Some(winner.player_index);
        self.turn = winner.player_index;

        if is_last {
            self.end_round()
        } else {
            self.broadcast_state();
            self.notify_turn();
            Ok(())
        }
    }

    fn end_round(&mut self) -> Result<(), GameFault> {
        self.state = GameState::RoundOver;
        self.rounds_played += 1;

        let earned = [self.teams[0].close_round(), self.teams[1].close_round()];
        let totals = [self.teams[0].total_score(), self.teams[1].total_score()];
        info!(
            game_id = %self.id,
            round = self.rounds_played,
            team1_total = totals[0],
            team2_total = totals[1],
            "Round over"
        );
        self.broadcast(WebSocketMessage::round_end(RoundEndPayload {
            team1_round_score: earned[0],
            team2_round_score: earned[1],
            team1_total_score: totals[0],
            team2_total_score: totals[1],
        }));

        let reached = totals.iter().any(|&t| t >= self.target_score);
        if totals[0] != totals[1] && reached {
            let winner = if totals[0] > totals[1] { 0 } else { 1 };
            self.finish(winner);
            self.pending_result = Some(self.result());
            return Ok(());
        }

        self.last_trick_winner = None;
        self.round_starter = (self.round_starter + 1) % SEATS;
        self.start_round()
    }

    fn finish(&mut self, winner: usize) {
        self.state = GameState::GameOver;
        self.winning_team = Some(winner);
        info!(
            game_id = %self.id,
            winning_team = self.teams[winner].number,
            "Game over"
        );
        self.broadcast(WebSocketMessage::game_over(
            self.teams[winner].id.clone(),
            self.teams[0].total_score(),
            self.teams[1].total_score(),
        ));
    }

    fn result(&self) -> GameResult {
        let names = |team: &Team| team.seats.map(|seat| self.players[seat].name.clone());
        GameResult::new(
            self.id.clone(),
            names(&self.teams[0]),
            names(&self.teams[1]),
            self.teams[0].total_score(),
            self.teams[1].total_score(),
        )
    }

    /// A seated player dropped: their team forfeits with scores as they stand.
    pub fn handle_disconnect(&mut self, client_id: &str) {
        if self.is_over() {
            debug!(game_id = %self.id, client_id = %client_id, "Disconnect after game over");
            return;
        }
        let Some(seat) = self.seat_of(client_id) else {
            warn!(game_id = %self.id, client_id = %client_id, "Disconnect from unknown client");
            return;
        };

        info!(game_id = %self.id, client_id = %client_id, seat, "Player left, forfeiting");
        self.broadcast(WebSocketMessage::player_left(client_id.to_string()));
        self.finish(1 - team_of_seat(seat));
    }

    /// Ends the game after an internal fault and tells every player.
    pub fn abort(&mut self, fault: GameFault) {
        error!(game_id = %self.id, fault = %fault, "Game aborted");
        self.state = GameState::GameOver;
        self.broadcast(WebSocketMessage::error(GameError::Fault(fault).to_string()));
    }

    fn broadcast_state(&mut self) {
        let state = GameStatePayload {
            current_player_id: self.current_player_id().to_string(),
            cards_on_table: self.trick.cards(),
            team1_score: self.teams[0].round_score(),
            team2_score: self.teams[1].round_score(),
            game_state: self.state.as_str().to_string(),
        };
        self.broadcast(WebSocketMessage::game_state_update(state));
    }

    fn notify_turn(&mut self) {
        let id = self.current_player_id().to_string();
        self.send_to(&id, WebSocketMessage::your_turn(id.clone()));
    }

    fn broadcast(&mut self, message: WebSocketMessage) {
        self.outbox.push(Outgoing {
            recipient: Recipient::All,
            message,
        });
    }

    fn send_to(&mut self, player_id: &str, message: WebSocketMessage) {
        self.outbox.push(Outgoing {
            recipient: Recipient::Player(player_id.to_string()),
            message,
        });
    }
}
