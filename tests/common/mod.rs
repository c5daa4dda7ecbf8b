use std::collections::HashMap;

use hifitime::Epoch;

use aspectarian::angles::normalize_deg;
use aspectarian::aspectarian_errors::AspectarianError;
use aspectarian::constants::{Body, SECONDS_PER_DAY};
use aspectarian::position::{FnProvider, PositionMap};

/// Capture `debug!`/`trace!` output of the engine in test runs.
pub fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Reference instant of the synthetic ephemerides.
pub fn t0() -> Epoch {
    Epoch::from_gregorian_utc(2025, 1, 1, 0, 0, 0, 0)
}

/// Synthetic ephemeris where every body moves linearly:
/// `lon(t) = lon0 + rate_deg_per_day * days_since_t0`, wrapped into [0, 360).
pub fn linear_ephemeris(
    bodies: Vec<(Body, f64, f64)>,
) -> FnProvider<impl Fn(Epoch) -> Result<PositionMap, AspectarianError>> {
    let reference = t0();
    FnProvider(move |time: Epoch| {
        let days = (time - reference).to_seconds() / SECONDS_PER_DAY;
        Ok(bodies
            .iter()
            .map(|&(body, lon0, rate)| (body, normalize_deg(lon0 + rate * days)))
            .collect::<HashMap<_, _>>())
    })
}
