//! # Aspectarian: the scanner session façade
//!
//! This module defines the [`Aspectarian`] struct, the central façade that
//! wires together:
//!
//! 1. **Position access** — the injected [`PositionProvider`], optionally
//!    fronted by the bucketed cache
//!    ([`CachedPositions`](crate::position::CachedPositions)), which is the
//!    standard deployment configuration.
//! 2. **Scanning** — [`scan_time_range`](crate::scan::scan_time_range)
//!    across all requested pairs and target angles.
//! 3. **Post-processing** — severity ranking, daily/monthly aggregation,
//!    and stable pagination, assembled into one [`ScanReport`].
//!
//! The provider and cache are owned by the session object and passed by
//! reference into each call: there is no module-level state, so two
//! sessions with different ephemeris sources can coexist in one process and
//! tests never leak configuration into each other.
//!
//! ## Typical usage
//!
//! ```rust, no_run
//! use std::collections::HashMap;
//! use std::time::Duration;
//!
//! use aspectarian::aspectarian::{Aspectarian, ScanRequest};
//! use aspectarian::constants::Body;
//! use aspectarian::position::FnProvider;
//! use hifitime::Epoch;
//!
//! let provider = FnProvider(|time: Epoch| {
//!     // query an ephemeris backend here
//!     Ok(HashMap::from([(Body::Sun, 10.0), (Body::Moon, 250.0)]))
//! });
//!
//! // one cached bucket per 15 minutes, kept for an hour
//! let session = Aspectarian::with_cache(provider, 15, Duration::from_secs(3600), 512);
//!
//! let request: ScanRequest = serde_json::from_str(r#"{
//!     "objects": ["Sun", "Moon"],
//!     "start": "2025-01-01T00:00:00 UTC",
//!     "end": "2025-02-01T00:00:00 UTC"
//! }"#).unwrap();
//!
//! let report = session.run(&request).unwrap();
//! println!("{} hits, {} active days", report.page.total, report.days.len());
//! ```

use std::sync::Arc;
use std::time::Duration as StdDuration;

use serde::{Deserialize, Serialize};

use hifitime::Epoch;

use crate::aggregate::{day_bins, monthly_composite, DayBin, MonthBin};
use crate::aspectarian_errors::AspectarianError;
use crate::aspects::Aspect;
use crate::constants::Body;
use crate::orb_policy::OrbPolicy;
use crate::paginate::paginate;
use crate::position::{CachedPositions, PositionProvider};
use crate::ranking::{rank_hits, HitOrdering, RankedHit, SeverityProfile};
use crate::scan::{scan_time_range, CancelToken, Hit, ScanConfig, TimeWindow};

type SharedProvider = Arc<dyn PositionProvider + Send + Sync>;

fn default_aspects() -> Vec<Aspect> {
    vec![
        Aspect::Conjunction,
        Aspect::Sextile,
        Aspect::Square,
        Aspect::Trine,
        Aspect::Opposition,
    ]
}

fn default_step_minutes() -> u32 {
    60
}

fn default_dedup_minutes() -> u32 {
    120
}

fn default_limit() -> i64 {
    100
}

/// One full scan request, as carried by the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanRequest {
    pub objects: Vec<Body>,
    #[serde(default = "default_aspects")]
    pub aspects: Vec<Aspect>,
    #[serde(default)]
    pub harmonics: Vec<u32>,
    pub start: Epoch,
    pub end: Epoch,
    /// Restrict the scan to these pairs instead of all combinations.
    #[serde(default)]
    pub pairs: Option<Vec<(Body, Body)>>,
    #[serde(default = "default_step_minutes")]
    pub step_minutes: u32,
    #[serde(default = "default_dedup_minutes")]
    pub dedup_minutes: u32,
    #[serde(default)]
    pub orb_policy: OrbPolicy,
    #[serde(default)]
    pub profile: Option<SeverityProfile>,
    #[serde(default)]
    pub order_by: HitOrdering,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

/// Paging envelope echoed back alongside every report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageInfo {
    pub limit: i64,
    pub offset: i64,
    pub total: usize,
}

/// The assembled response to one [`ScanRequest`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    /// The requested page of ranked hits.
    pub hits: Vec<RankedHit>,
    /// Daily aggregation over the *whole* result, not just the page.
    pub days: Vec<DayBin>,
    pub months: Vec<MonthBin>,
    pub page: PageInfo,
}

/// Scanner session owning the position provider and its cache.
pub struct Aspectarian {
    provider: SharedProvider,
    cached: Option<Arc<CachedPositions<SharedProvider>>>,
}

impl Aspectarian {
    /// Build a session that queries the provider directly, with no cache.
    pub fn new<P>(provider: P) -> Self
    where
        P: PositionProvider + Send + Sync + 'static,
    {
        Aspectarian {
            provider: Arc::new(provider),
            cached: None,
        }
    }

    /// Build a session with the bucketed position cache in front of the
    /// provider — the standard deployment configuration.
    ///
    /// Arguments
    /// ---------
    /// * `provider`: the position source to wrap
    /// * `resolution_minutes`: width of one cache bucket
    /// * `ttl`: lifetime of a cached bucket
    /// * `maxsize`: maximum number of cached buckets
    pub fn with_cache<P>(
        provider: P,
        resolution_minutes: u32,
        ttl: StdDuration,
        maxsize: usize,
    ) -> Self
    where
        P: PositionProvider + Send + Sync + 'static,
    {
        let provider: SharedProvider = Arc::new(provider);
        let cached = Arc::new(CachedPositions::new(
            provider.clone(),
            resolution_minutes,
            ttl,
            maxsize,
        ));
        Aspectarian {
            provider,
            cached: Some(cached),
        }
    }

    /// The provider as the scanners see it: cached when a cache is
    /// configured, direct otherwise.
    pub fn provider(&self) -> &dyn PositionProvider {
        match &self.cached {
            Some(cached) => cached.as_ref(),
            None => self.provider.as_ref(),
        }
    }

    /// Drop all cached position buckets. No-op without a cache.
    pub fn clear_cache(&self) {
        if let Some(cached) = &self.cached {
            cached.clear();
        }
    }

    /// Number of live cached buckets, or 0 without a cache.
    pub fn cached_buckets(&self) -> usize {
        self.cached
            .as_ref()
            .map(|cached| cached.cached_buckets())
            .unwrap_or(0)
    }

    /// Raw scan: all hits for the given objects and window, time-sorted,
    /// without ranking or pagination.
    #[allow(clippy::too_many_arguments)]
    pub fn scan_window(
        &self,
        objects: &[Body],
        window: &TimeWindow,
        aspects: &[Aspect],
        harmonics: &[u32],
        policy: &OrbPolicy,
        pairs: Option<&[(Body, Body)]>,
        config: &ScanConfig,
    ) -> Result<Vec<Hit>, AspectarianError> {
        scan_time_range(
            objects,
            window,
            self.provider(),
            aspects,
            harmonics,
            policy,
            pairs,
            config,
        )
    }

    /// Execute a full request: scan, rank, aggregate, paginate.
    pub fn run(&self, request: &ScanRequest) -> Result<ScanReport, AspectarianError> {
        self.run_with_cancel(request, CancelToken::new())
    }

    /// Like [`run`](Aspectarian::run), with a caller-owned cancellation
    /// token threaded into the sampling loop.
    pub fn run_with_cancel(
        &self,
        request: &ScanRequest,
        cancel: CancelToken,
    ) -> Result<ScanReport, AspectarianError> {
        let window = TimeWindow::new(request.start, request.end)?;
        let config =
            ScanConfig::from_minutes(request.step_minutes, request.dedup_minutes)?.with_cancel(cancel);

        let hits = self.scan_window(
            &request.objects,
            &window,
            &request.aspects,
            &request.harmonics,
            &request.orb_policy,
            request.pairs.as_deref(),
            &config,
        )?;

        let ranked = rank_hits(hits, request.profile.as_ref(), request.order_by);
        let days = day_bins(&ranked);
        let months = monthly_composite(&days);
        let (page, total) = paginate(&ranked, request.limit, request.offset)?;

        Ok(ScanReport {
            hits: page,
            days,
            months,
            page: PageInfo {
                limit: request.limit,
                offset: request.offset,
                total,
            },
        })
    }
}
