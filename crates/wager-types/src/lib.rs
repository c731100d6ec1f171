//! Foundation types for wager.
//!
//! This crate provides the identifier, identity, and catalogue types shared by
//! every other wager crate.
//!
//! # Key Types
//!
//! - [`UserId`], [`SessionId`], [`GameSessionId`], [`RoundId`], [`GameId`],
//!   [`ParticipantId`]: typed integer identifiers
//! - [`HasLedgerIdentity`]: capability for anything that occupies a ledger row
//! - [`User`], [`Game`], [`Participant`]: catalogue and membership entities
//! - [`Page`]: offset/limit pagination for list reads

pub mod entity;
pub mod error;
pub mod id;
pub mod identity;
pub mod page;

pub use entity::{Game, Participant, User};
pub use error::TypeError;
pub use id::{GameId, GameSessionId, ParticipantId, RoundId, SessionId, UserId};
pub use identity::HasLedgerIdentity;
pub use page::Page;
