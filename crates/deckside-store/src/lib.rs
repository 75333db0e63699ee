//! Identity persistence for Deckside.
//!
//! A game server hands each player a resume secret on first join; whoever
//! presents that secret later is reattached to the same seat. This crate
//! keeps the `{username, lobby, secret}` triple on disk between process
//! runs so a crashed or restarted client can pick its game back up.
//!
//! The store is deliberately forgiving: a missing or corrupt file means
//! "no saved identity", and saving can never erase a value with an empty
//! one. Losing a resume secret costs a player their seat, so the write
//! path is biased toward keeping what it has.

mod error;
mod store;

pub use error::StoreError;
pub use store::{Identity, ResumeStore};
