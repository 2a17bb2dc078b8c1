//! Concurrent, cached search service.
//!
//! One search is plain synchronous computation. The service runs each on
//! tokio's blocking pool against a shared, read-only [`Timetable`], so any
//! number of requests can be in flight at once. Finished results are cached
//! by request.
//!
//! Requests can also be read from JSON, naming stops instead of indexing
//! them:
//!
//! ```json
//! {
//!   "time": "10:00",
//!   "access": [{"stop": "A", "duration": 180}],
//!   "egress": [{"stop": "E", "duration": 465, "c1": 93000}],
//!   "config": {"direction": "forward", "search_window_mins": 30},
//!   "pass_through": [["C"]]
//! }
//! ```

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use moka::future::Cache as MokaCache;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::domain::{AccessEgress, DomainError, OpeningHours, StopIndex, TransitTime, to_raptor_cost};
use crate::raptor::{CostConfig, Planner, SearchConfig, SearchError, SearchRequest, SearchResult};
use crate::transit::{SlackConfig, Timetable};

/// Errors from the service layer.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// The search itself failed
    #[error(transparent)]
    Search(#[from] SearchError),

    /// The blocking search task panicked or was cancelled
    #[error("search task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// Request JSON could not be parsed
    #[error("invalid request JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Request values are inconsistent
    #[error("invalid request: {0}")]
    Domain(#[from] DomainError),

    /// A request names a stop the network does not have
    #[error("unknown stop name: {0}")]
    UnknownStop(String),
}

/// Cache key: the whole request, formatted.
///
/// Configuration maps are ordered, so equal requests format identically.
type SearchKey = String;

/// Configuration for the result cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for cached results.
    pub ttl: Duration,

    /// Maximum number of cached results.
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(60),
            max_capacity: 1000,
        }
    }
}

/// Runs searches over one network.
///
/// Cloning is cheap; clones share the network and the cache.
#[derive(Clone)]
pub struct RoutingService {
    timetable: Arc<Timetable>,
    slack: Arc<SlackConfig>,
    cache: MokaCache<SearchKey, Arc<SearchResult>>,
}

impl RoutingService {
    pub fn new(timetable: Arc<Timetable>, slack: SlackConfig, cache_config: &CacheConfig) -> Self {
        let cache = MokaCache::builder()
            .time_to_live(cache_config.ttl)
            .max_capacity(cache_config.max_capacity)
            .build();
        Self {
            timetable,
            slack: Arc::new(slack),
            cache,
        }
    }

    pub fn timetable(&self) -> &Timetable {
        &self.timetable
    }

    /// Run one search, using the cache if possible.
    ///
    /// Errors, including timeouts, are not cached.
    pub async fn search(&self, request: SearchRequest) -> Result<Arc<SearchResult>, ServiceError> {
        let key = format!("{request:?}");
        if let Some(cached) = self.cache.get(&key).await {
            debug!("search result served from cache");
            return Ok(cached);
        }

        let timetable = Arc::clone(&self.timetable);
        let slack = Arc::clone(&self.slack);
        let result = tokio::task::spawn_blocking(move || {
            Planner::new(timetable.as_ref(), slack.as_ref()).search(&request)
        })
        .await??;

        let result = Arc::new(result);
        self.cache.insert(key, Arc::clone(&result)).await;
        Ok(result)
    }

    /// Run several searches concurrently. Results are in request order.
    pub async fn search_all(
        &self,
        requests: Vec<SearchRequest>,
    ) -> Vec<Result<Arc<SearchResult>, ServiceError>> {
        let results = join_all(requests.into_iter().map(|request| self.search(request))).await;
        let failed = results.iter().filter(|result| result.is_err()).count();
        if failed > 0 {
            warn!(failed, total = results.len(), "some searches failed");
        }
        results
    }

    /// Get cache statistics.
    pub fn cache_entry_count(&self) -> u64 {
        self.cache.entry_count()
    }

    /// Invalidate all cached results.
    pub fn invalidate_cache(&self) {
        self.cache.invalidate_all();
    }
}

fn default_walk_reluctance() -> f64 {
    2.0
}

/// A street leg in a request file.
#[derive(Debug, Clone, Deserialize)]
pub struct StreetLegEntry {
    pub stop: String,
    /// Seconds.
    pub duration: i32,
    /// Raptor cost; derived from the file's `walk_reluctance` when absent.
    #[serde(default)]
    pub c1: Option<i32>,
    #[serde(default)]
    pub opens: Option<TransitTime>,
    #[serde(default)]
    pub closes: Option<TransitTime>,
}

/// A search request as read from JSON.
#[derive(Debug, Clone, Deserialize)]
pub struct RequestFile {
    pub time: TransitTime,
    pub access: Vec<StreetLegEntry>,
    pub egress: Vec<StreetLegEntry>,
    #[serde(default)]
    pub config: SearchConfig,
    #[serde(default)]
    pub costs: CostConfig,
    /// Groups of stop names every path must visit, in order.
    #[serde(default)]
    pub pass_through: Vec<Vec<String>>,
    #[serde(default)]
    pub transit_group_priority: bool,
    #[serde(default = "default_walk_reluctance")]
    pub walk_reluctance: f64,
}

/// A file holding one request or a list of them.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RequestFiles {
    One(Box<RequestFile>),
    Many(Vec<RequestFile>),
}

impl RequestFile {
    /// Parse one request, or a JSON array of requests.
    pub fn list_from_json(json: &str) -> Result<Vec<Self>, ServiceError> {
        Ok(match serde_json::from_str(json)? {
            RequestFiles::One(request) => vec![*request],
            RequestFiles::Many(requests) => requests,
        })
    }

    /// Resolve stop names against `timetable`.
    pub fn into_request(self, timetable: &Timetable) -> Result<SearchRequest, ServiceError> {
        let lookup = |name: &str| {
            timetable
                .stop_index(name)
                .ok_or_else(|| ServiceError::UnknownStop(name.to_string()))
        };
        let legs = |entries: &[StreetLegEntry]| {
            entries
                .iter()
                .map(|entry| street_leg(entry, lookup(entry.stop.as_str())?, self.walk_reluctance))
                .collect::<Result<Vec<_>, ServiceError>>()
        };

        let mut request = SearchRequest::new(self.time, legs(&self.access)?, legs(&self.egress)?)
            .with_config(self.config.clone())
            .with_costs(self.costs.clone());

        if !self.pass_through.is_empty() {
            let points = self
                .pass_through
                .iter()
                .map(|group| group.iter().map(|name| lookup(name.as_str())).collect::<Result<Vec<_>, _>>())
                .collect::<Result<Vec<Vec<StopIndex>>, _>>()?;
            request = request.with_pass_through(points);
        } else if self.transit_group_priority {
            request = request.with_transit_group_priority();
        }
        Ok(request)
    }
}

fn street_leg(
    entry: &StreetLegEntry,
    stop: StopIndex,
    walk_reluctance: f64,
) -> Result<AccessEgress, ServiceError> {
    let c1 = entry
        .c1
        .unwrap_or_else(|| to_raptor_cost(walk_reluctance * f64::from(entry.duration)));
    let leg = AccessEgress::new(stop, entry.duration, c1);
    Ok(match (entry.opens, entry.closes) {
        (Some(opens), Some(closes)) => leg.with_opening_hours(OpeningHours::new(opens, closes)?),
        (None, None) => leg,
        _ => return Err(DomainError::InvalidOpeningHours.into()),
    })
}
