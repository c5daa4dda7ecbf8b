//! # Position providers and the bucketed cache in front of them
//!
//! The engine never computes ecliptic longitudes itself: it consumes an
//! injected [`PositionProvider`] returning, for one instant, the longitude of
//! every body it knows about. Providers must be pure with respect to the
//! timestamp (same input ⇒ same output) — caching correctness depends on it.
//!
//! [`CachedPositions`] is the standard deployment configuration: it wraps an
//! arbitrary provider and quantizes timestamps into fixed-size buckets
//! ([`bucket_epoch`]) before caching the full mapping for the bucket. All
//! timestamps inside one bucket receive the positions computed at the *first*
//! query's timestamp in that bucket, not their own — a deliberate,
//! documented precision/throughput trade-off.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use hifitime::Epoch;
use log::trace;

use crate::aspectarian_errors::AspectarianError;
use crate::cache::TtlCache;
use crate::constants::{Body, Degree};

/// Longitudes in [0, 360) for every body a provider knows about.
pub type PositionMap = HashMap<Body, Degree>;

/// Cache key: UTC timestamp truncated to `(year, month, day, hour, minute)`.
pub type BucketKey = (i32, u8, u8, u8, u8);

/// A source of ecliptic longitudes.
///
/// Errors are propagated verbatim by the scanner: no retry, no partial
/// result.
pub trait PositionProvider {
    fn positions(&self, time: Epoch) -> Result<PositionMap, AspectarianError>;
}

impl<P: PositionProvider + ?Sized> PositionProvider for &P {
    fn positions(&self, time: Epoch) -> Result<PositionMap, AspectarianError> {
        (**self).positions(time)
    }
}

impl<P: PositionProvider + ?Sized> PositionProvider for Arc<P> {
    fn positions(&self, time: Epoch) -> Result<PositionMap, AspectarianError> {
        (**self).positions(time)
    }
}

impl<P: PositionProvider + ?Sized> PositionProvider for Box<P> {
    fn positions(&self, time: Epoch) -> Result<PositionMap, AspectarianError> {
        (**self).positions(time)
    }
}

/// Adapter turning a plain closure into a [`PositionProvider`].
pub struct FnProvider<F>(pub F);

impl<F> PositionProvider for FnProvider<F>
where
    F: Fn(Epoch) -> Result<PositionMap, AspectarianError>,
{
    fn positions(&self, time: Epoch) -> Result<PositionMap, AspectarianError> {
        (self.0)(time)
    }
}

/// Fetch one body's longitude out of a provider mapping.
pub(crate) fn longitude_of(
    map: &PositionMap,
    body: Body,
    time: Epoch,
) -> Result<Degree, AspectarianError> {
    map.get(&body)
        .copied()
        .ok_or(AspectarianError::MissingPosition { body, epoch: time })
}

/// Truncate a UTC timestamp to the hour and round the minute down to the
/// nearest multiple of `resolution_minutes` (clamped into [1, 60]).
pub fn bucket_epoch(time: Epoch, resolution_minutes: u32) -> BucketKey {
    let (year, month, day, hour, minute, _, _) = time.to_gregorian_utc();
    let resolution = resolution_minutes.clamp(1, 60) as u8;
    (year, month, day, hour, (minute / resolution) * resolution)
}

/// Bucketed TTL cache in front of an expensive position provider.
pub struct CachedPositions<P> {
    inner: P,
    cache: TtlCache<BucketKey, PositionMap>,
    resolution_minutes: u32,
    ttl: Duration,
}

impl<P: PositionProvider> CachedPositions<P> {
    /// Wrap `inner` with a cache of at most `maxsize` buckets of
    /// `resolution_minutes` width, each entry living for `ttl`.
    pub fn new(inner: P, resolution_minutes: u32, ttl: Duration, maxsize: usize) -> Self {
        CachedPositions {
            inner,
            cache: TtlCache::new(maxsize),
            resolution_minutes,
            ttl,
        }
    }

    /// Drop all cached buckets, e.g. after hot-swapping ephemeris sources.
    pub fn clear(&self) {
        self.cache.clear();
    }

    /// Number of live cached buckets.
    pub fn cached_buckets(&self) -> usize {
        self.cache.len()
    }
}

impl<P: PositionProvider> PositionProvider for CachedPositions<P> {
    fn positions(&self, time: Epoch) -> Result<PositionMap, AspectarianError> {
        let key = bucket_epoch(time, self.resolution_minutes);
        if let Some(cached) = self.cache.get(&key) {
            return Ok(cached);
        }

        trace!("position cache miss for bucket {key:?}, querying provider at {time}");
        // the inner provider sees the original timestamp, not the bucket floor
        let positions = self.inner.positions(time)?;
        self.cache.set(key, positions.clone(), self.ttl);
        Ok(positions)
    }
}

#[cfg(test)]
mod position_test {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_provider(calls: Arc<AtomicUsize>) -> FnProvider<impl Fn(Epoch) -> Result<PositionMap, AspectarianError>> {
        FnProvider(move |_time| {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(HashMap::from([(Body::Sun, 10.0), (Body::Moon, 250.0)]))
        })
    }

    #[test]
    fn test_bucket_epoch_rounds_minute_down() {
        let t = Epoch::from_gregorian_utc(2025, 3, 14, 15, 37, 12, 0);
        assert_eq!(bucket_epoch(t, 15), (2025, 3, 14, 15, 30));
        assert_eq!(bucket_epoch(t, 60), (2025, 3, 14, 15, 0));
        assert_eq!(bucket_epoch(t, 1), (2025, 3, 14, 15, 37));
    }

    #[test]
    fn test_same_bucket_hits_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cached = CachedPositions::new(
            counting_provider(calls.clone()),
            15,
            Duration::from_secs(60),
            16,
        );

        let t1 = Epoch::from_gregorian_utc(2025, 3, 14, 15, 31, 0, 0);
        let t2 = Epoch::from_gregorian_utc(2025, 3, 14, 15, 44, 59, 0);
        cached.positions(t1).unwrap();
        cached.positions(t2).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // next bucket triggers a second provider call
        let t3 = Epoch::from_gregorian_utc(2025, 3, 14, 15, 45, 0, 0);
        cached.positions(t3).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cached.cached_buckets(), 2);
    }

    #[test]
    fn test_clear_forces_requery() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cached = CachedPositions::new(
            counting_provider(calls.clone()),
            15,
            Duration::from_secs(60),
            16,
        );

        let t = Epoch::from_gregorian_utc(2025, 3, 14, 15, 31, 0, 0);
        cached.positions(t).unwrap();
        cached.clear();
        cached.positions(t).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
