//! Port traits. API boundaries for the hexagon.
//!
//! - Inbound: Called by adapters (update loop, UI) into the application
//! - Outbound: Called by application into infrastructure

pub mod inbound;
pub mod outbound;

pub use inbound::{LoginPrompt, MessageHandler};
pub use outbound::{AuthPort, ChatTransport, GenerativeBackend, MessageRepo, SignInResult};
