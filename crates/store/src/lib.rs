//! Persistence seams for the eligibility engine: the creative ad catalog,
//! the ad event log and per-user client state, with in-process
//! implementations backed by DashMap.
#![warn(clippy::unwrap_used)]

pub mod catalog;
pub mod client;
pub mod events;

pub use catalog::{CreativeAdStore, InMemoryCreativeAdStore};
pub use client::ClientState;
pub use events::{AdEventStore, InMemoryAdEventStore};
