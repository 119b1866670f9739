pub mod actions;
pub mod assertions;
pub mod client;
pub mod mocks;
pub mod setup;

// Re-export main utilities for use by test files
#[allow(unused_imports)]
pub use actions::{choose_card, led_suit};
#[allow(unused_imports)]
pub use assertions::{assert_error, hand_of, team_id};
#[allow(unused_imports)]
pub use client::TestClient;
#[allow(unused_imports)]
pub use mocks::ChannelSink;
#[allow(unused_imports)]
pub use setup::{TestSetup, TestSetupBuilder};
