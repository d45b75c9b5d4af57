pub mod auth_adapter;
pub mod client;
pub mod mapper;
pub mod session;

pub use auth_adapter::GrammersAuthAdapter;
pub use client::{GrammersTransport, run_until_shutdown, run_update_loop};
