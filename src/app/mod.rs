mod bridge;
mod connection_test;
mod request_router;

pub use bridge::{BridgeClient, BridgeError, BridgeHost, PendingRewrite, serve_lines};
pub use connection_test::{CONNECTION_TEST_PROMPT, ConnectionTestOutcome, ConnectionTester};
pub use request_router::{API_KEY_NOT_CONFIGURED, RequestRouter};
