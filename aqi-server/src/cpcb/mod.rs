//! CPCB monitoring-station feed.
//!
//! The feed lists every regulatory air-quality station in the country,
//! nested region → city → station. This module loads it (over HTTP or from
//! a local file), sanitizes the noisy numeric fields and picks the station
//! nearest to a coordinate.

mod client;
mod error;
mod matcher;
mod number;
mod offline;
mod types;

use async_trait::async_trait;

pub use client::{CpcbClient, DEFAULT_FEED_URL, FeedConfig};
pub use error::FeedError;
pub use matcher::{nearest_station, station_name};
pub use number::{parse_finite_number, parse_finite_str};
pub use offline::{FileFeed, StaticFeed};
pub use types::{City, CpcbFeed, RawStationRecord, Region};

/// Something that can produce a fresh copy of the station feed.
#[async_trait]
pub trait StationFeed: Send + Sync {
    /// Load the current feed. Nothing is cached between calls.
    async fn load(&self) -> Result<CpcbFeed, FeedError>;
}
