//! BoardGameGeek XML API client.
//!
//! Exposes the remote catalog as a [`GameDatabase`]: text search, detail
//! lookup by id, and image download. [`BggClient`] is the blocking HTTP
//! implementation; every call it makes passes through one rate gate.

pub mod client;
pub mod database;
pub mod error;
pub mod types;
pub mod xml;

pub use client::{BggClient, ClientConfig, RateGate};
pub use database::GameDatabase;
pub use error::BggError;
pub use types::{GameDetails, ImageData, PlayerVotes, SearchCandidate};
