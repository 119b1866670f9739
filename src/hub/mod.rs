// Public API
pub use codes::{CodeGenerator, RandomCodeGenerator, CODE_LENGTH};
pub use errors::HubError;
pub use lobby::{Lobby, LobbyError, LobbyMember};
pub use router::{Hub, HubCommand, HubHandle, HubStats};
pub use sink::HubSink;

// Internal modules
mod codes;
mod errors;
mod lobby;
mod router;
mod sink;
