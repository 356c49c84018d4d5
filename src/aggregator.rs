//! Concurrent multi-location aggregation
//!
//! Fans out one current-conditions call per location and collects whatever
//! succeeded: a settle-all join, never fail-fast. A location that fails on
//! a refresh pass keeps its last successful value, flagged stale, instead
//! of vanishing from the result.

use crate::gateway::WeatherGateway;
use crate::models::{CurrentWeather, Location};
use crate::store::KeyValueStore;
use futures::future::join_all;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// One location's slot in an aggregation result
#[derive(Debug, Clone, PartialEq)]
pub struct LocationConditions {
    pub weather: CurrentWeather,
    /// True when this pass failed and `weather` is the retained value
    /// from an earlier successful pass
    pub stale: bool,
}

/// Fetches current conditions for a set of locations concurrently,
/// retaining each location's last good value across failing passes.
#[derive(Debug, Default)]
pub struct MultiLocationAggregator {
    last_good: HashMap<String, CurrentWeather>,
}

impl MultiLocationAggregator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch current conditions for every location.
    ///
    /// Each location's failure is contained to its own slot: the result
    /// map holds an entry per location that succeeded now (fresh) or ever
    /// (stale); a location that has never succeeded is simply absent. No
    /// error escapes this call.
    pub async fn fetch_all<S: KeyValueStore>(
        &mut self,
        gateway: &WeatherGateway<S>,
        locations: &[Location],
    ) -> HashMap<String, LocationConditions> {
        let fetches = locations.iter().map(|location| async move {
            let outcome = gateway
                .current_weather(location.latitude, location.longitude)
                .await;
            (location, outcome)
        });
        let settled = join_all(fetches).await;

        // Locations dropped from the comparison set lose their retained value
        let live_ids: HashSet<&str> = locations.iter().map(|l| l.id.as_str()).collect();
        self.last_good.retain(|id, _| live_ids.contains(id.as_str()));

        let mut results = HashMap::new();
        for (location, outcome) in settled {
            match outcome {
                Ok(mut weather) => {
                    weather.location = location.display_name();
                    self.last_good.insert(location.id.clone(), weather.clone());
                    results.insert(
                        location.id.clone(),
                        LocationConditions {
                            weather,
                            stale: false,
                        },
                    );
                }
                Err(e) => {
                    warn!(location = %location.name, error = %e, "location fetch failed");
                    if let Some(previous) = self.last_good.get(&location.id) {
                        results.insert(
                            location.id.clone(),
                            LocationConditions {
                                weather: previous.clone(),
                                stale: true,
                            },
                        );
                    }
                }
            }
        }

        debug!(
            requested = locations.len(),
            resolved = results.len(),
            "aggregation pass finished"
        );
        results
    }
}
