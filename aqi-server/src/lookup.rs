//! End-to-end AQI lookup: nearest CPCB station, then its AQICN reading.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::aqicn::{
    ScrapeConfig, ScrapeError, ScrapeOrchestrator, ScrapeReading, SessionError, SessionLauncher,
};
use crate::cpcb::{FeedError, StationFeed, nearest_station};
use crate::domain::{Coordinate, NearestStationResult, Station};

/// Response for one lookup.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AqiReport {
    pub latitude: f64,
    pub longitude: f64,
    pub nearest_station: NearestStationResult,
    pub aqicn: ScrapeReading,
}

impl AqiReport {
    /// Combine the matched station and its reading, echoing the query point.
    pub fn assemble(user: Coordinate, station: &Station, reading: ScrapeReading) -> Self {
        Self {
            latitude: user.latitude,
            longitude: user.longitude,
            nearest_station: NearestStationResult::from(station),
            aqicn: reading,
        }
    }
}

/// Errors from a lookup.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    /// The feed has no station with usable coordinates
    #[error("No CPCB station found")]
    NoStation,

    #[error("failed to load CPCB feed: {0}")]
    Feed(#[from] FeedError),

    #[error("failed to start browser session: {0}")]
    Launch(#[source] SessionError),

    #[error(transparent)]
    Scrape(#[from] ScrapeError),
}

/// Runs lookups. Shared across requests; every lookup gets its own
/// feed copy and browser session.
pub struct AqiLookup {
    feed: Arc<dyn StationFeed>,
    launcher: Arc<dyn SessionLauncher>,
    scrape: ScrapeConfig,
}

impl AqiLookup {
    pub fn new(
        feed: impl StationFeed + 'static,
        launcher: impl SessionLauncher + 'static,
        scrape: ScrapeConfig,
    ) -> Self {
        Self {
            feed: Arc::new(feed),
            launcher: Arc::new(launcher),
            scrape,
        }
    }

    /// Find the CPCB station nearest to `user`.
    pub async fn nearest(&self, user: Coordinate) -> Result<Station, LookupError> {
        let feed = self.feed.load().await?;
        let station = nearest_station(&feed, user).ok_or(LookupError::NoStation)?;
        info!(
            station = %station.name,
            distance_km = station.distance_km,
            feed_aqi = ?station.feed_aqi,
            "matched nearest CPCB station"
        );
        Ok(station)
    }

    /// Resolve the nearest station and scrape its current reading.
    ///
    /// The browser session is closed whether or not the scrape succeeds.
    #[instrument(skip(self), fields(lat = user.latitude, lon = user.longitude))]
    pub async fn lookup(&self, user: Coordinate) -> Result<AqiReport, LookupError> {
        let station = self.nearest(user).await?;

        let session = self.launcher.launch().await.map_err(LookupError::Launch)?;
        let result = ScrapeOrchestrator::new(session.as_ref(), &self.scrape)
            .run(&station.name)
            .await;
        if let Err(e) = session.close().await {
            warn!(error = %e, "failed to close browser session");
        }

        Ok(AqiReport::assemble(user, &station, result?))
    }
}
