// Public API
pub use cards::{Card, Deck, PlayedCard, Rank, Suit, Trick};
pub use declaration::{Declaration, DeclarationError, DeclarationKind, DeclarationOutcome};
pub use logic::{Game, GameError, GameFault, GameState, Outgoing, Recipient, CARDS_PER_PLAYER};
pub use player::{seat_order, Player, SeatRequest, Team, TeamSide, SEATS};
pub use session::{GameSession, OutboundSink, SessionCommand, SessionHandle};

// Internal modules
mod cards;
mod declaration;
mod logic;
mod player;
pub mod scoring;
mod session;
