//! Network layer - catalog API client and the jobs built on it
//!
//! The Network actor receives commands, runs jobs against the shared client
//! and sends back responses.

pub mod actor;
pub mod cancel;
pub mod client;
pub mod feeds;

pub use actor::NetworkActor;
pub use client::MangaClient;
