//! tg-digest: group chat history, AI business reports and on-demand answers for Telegram,
//! with Hexagonal Architecture.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod shared;
pub mod usecases;

#[cfg(test)]
pub(crate) mod test_support;
