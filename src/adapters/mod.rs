//! Infrastructure adapters. Implement outbound ports.
//!
//! Telegram, libsql, generative backends, HTTP health, terminal prompts.
//! Map errors to DomainError.

pub mod ai;
pub mod http;
pub mod persistence;
pub mod telegram;
pub mod ui;
