//! Time-range scanner: fans the pair scanner out across object pairs.

use itertools::Itertools;
use log::debug;

use crate::aspectarian_errors::AspectarianError;
use crate::aspects::{expand_targets, Aspect};
use crate::constants::Body;
use crate::orb_policy::OrbPolicy;
use crate::position::PositionProvider;
use crate::scan::{pair::scan_pair, Hit, ScanConfig, TimeWindow};

/// Scan every requested pair across a time window.
///
/// Target angles are expanded once and shared across all pairs. Without an
/// explicit `pairs` restriction, all `C(n, 2)` unordered pairs of `objects`
/// are scanned. Pairs run sequentially; the merged result is re-sorted by
/// `exact_time` so callers never observe scan-order artifacts.
///
/// Arguments
/// ---------
/// * `objects`: the bodies to combine into pairs
/// * `window`: the scan window
/// * `provider`: source of ecliptic longitudes
/// * `aspects`: named aspect families to target
/// * `harmonics`: integer harmonics to expand on top of the families
/// * `policy`: the orb policy of the request
/// * `pairs`: optional explicit pair restriction, scanned verbatim
/// * `config`: step, dedup span, and cancellation token
///
/// Return
/// ------
/// * All hits across all pairs, sorted by `exact_time`, or the first error
///   encountered (a provider failure aborts the whole call).
#[allow(clippy::too_many_arguments)]
pub fn scan_time_range<P>(
    objects: &[Body],
    window: &TimeWindow,
    provider: &P,
    aspects: &[Aspect],
    harmonics: &[u32],
    policy: &OrbPolicy,
    pairs: Option<&[(Body, Body)]>,
    config: &ScanConfig,
) -> Result<Vec<Hit>, AspectarianError>
where
    P: PositionProvider + ?Sized,
{
    let targets = expand_targets(aspects, harmonics)?;

    let pair_list: Vec<(Body, Body)> = match pairs {
        Some(explicit) => explicit.to_vec(),
        None => objects.iter().copied().tuple_combinations().collect(),
    };

    debug!(
        "scanning {} pairs over {} target angles, window {} -> {}",
        pair_list.len(),
        targets.len(),
        window.start(),
        window.end()
    );

    let mut hits: Vec<Hit> = Vec::new();
    for (a, b) in pair_list {
        hits.extend(scan_pair(a, b, window, provider, &targets, policy, config)?);
    }

    hits.sort_by(|x, y| x.exact_time.cmp(&y.exact_time));
    debug!("scan produced {} hits", hits.len());
    Ok(hits)
}
