//! Pair scanner: sampling, bracketing, bisection refinement, dedup, orb
//! filtering. This is the numerical core of the crate.

use hifitime::{Duration, Epoch};
use log::trace;

use crate::angles::angular_sep_deg;
use crate::aspectarian_errors::AspectarianError;
use crate::aspects::AspectLabel;
use crate::constants::{Body, Degree, EPS};
use crate::orb_policy::OrbPolicy;
use crate::position::{longitude_of, PositionProvider};
use crate::scan::{Hit, ScanConfig, TimeWindow};

/// |f| below which a bracket endpoint or midpoint counts as an exact root.
const ROOT_EPS: f64 = 1e-6;

/// Bisection stops once the bracket is narrower than this.
const BRACKET_FLOOR_SECONDS: f64 = 1.0;

/// Maximum bisection iterations per bracket.
const MAX_BISECTION_ITER: usize = 40;

/// Angular separation of the pair at one instant, through the provider.
fn separation_at<P>(
    provider: &P,
    a: Body,
    b: Body,
    time: Epoch,
) -> Result<Degree, AspectarianError>
where
    P: PositionProvider + ?Sized,
{
    let positions = provider.positions(time)?;
    let lon_a = longitude_of(&positions, a, time)?;
    let lon_b = longitude_of(&positions, b, time)?;
    Ok(angular_sep_deg(lon_a, lon_b))
}

/// Classic interval halving on `f` over a bracketing interval with
/// opposite-signed endpoints.
///
/// Returns early if either endpoint is already within [`ROOT_EPS`] of zero,
/// otherwise halves until [`MAX_BISECTION_ITER`] iterations or a bracket
/// narrower than [`BRACKET_FLOOR_SECONDS`], and reports the midpoint of the
/// final bracket. Assumes `f` brackets a single root, which holds when the
/// sampling step is small relative to the bodies' angular velocity.
fn refine_bisection<F>(
    lo: Epoch,
    f_lo: f64,
    hi: Epoch,
    f_hi: f64,
    f: &F,
) -> Result<Epoch, AspectarianError>
where
    F: Fn(Epoch) -> Result<f64, AspectarianError>,
{
    if f_lo.abs() < ROOT_EPS {
        return Ok(lo);
    }
    if f_hi.abs() < ROOT_EPS {
        return Ok(hi);
    }

    let (mut lo, mut hi, mut f_lo) = (lo, hi, f_lo);
    for _ in 0..MAX_BISECTION_ITER {
        if (hi - lo).to_seconds() < BRACKET_FLOOR_SECONDS {
            break;
        }
        let mid = lo + Duration::from_seconds((hi - lo).to_seconds() * 0.5);
        let f_mid = f(mid)?;
        if f_mid.abs() < ROOT_EPS {
            return Ok(mid);
        }
        if (f_lo <= 0.0 && f_mid >= 0.0) || (f_lo >= 0.0 && f_mid <= 0.0) {
            hi = mid;
        } else {
            lo = mid;
            f_lo = f_mid;
        }
    }

    Ok(lo + Duration::from_seconds((hi - lo).to_seconds() * 0.5))
}

/// Scan one unordered pair across a time window for every target angle.
///
/// For each target angle, processed independently with its own dedup state:
/// walk the window in fixed steps (both ends inclusive), bracket every sign
/// change of `separation − target`, refine the crossing by bisection, clamp
/// it into the window, discard roots within the dedup span of the previous
/// one, and keep the hit only if its orb fits the resolved policy limit.
///
/// Arguments
/// ---------
/// * `a`, `b`: the pair under scan
/// * `window`: the scan window
/// * `provider`: source of ecliptic longitudes; any failure aborts the pair
///   scan with no partial result
/// * `targets`: expanded target angles in [0, 360)
/// * `policy`: the orb policy of the request
/// * `config`: step, dedup span, and cancellation token
///
/// Return
/// ------
/// * The pair's hits across all target angles, sorted by `exact_time`.
pub fn scan_pair<P>(
    a: Body,
    b: Body,
    window: &TimeWindow,
    provider: &P,
    targets: &[Degree],
    policy: &OrbPolicy,
    config: &ScanConfig,
) -> Result<Vec<Hit>, AspectarianError>
where
    P: PositionProvider + ?Sized,
{
    let mut samples: Vec<(Epoch, Degree)> = Vec::new();
    let mut t = window.start();
    loop {
        config.cancel.check()?;
        samples.push((t, separation_at(provider, a, b, t)?));
        if t >= window.end() {
            break;
        }
        t = t + config.step;
        if t > window.end() {
            t = window.end();
        }
    }

    let mut hits: Vec<Hit> = Vec::new();
    for &target in targets {
        let label = AspectLabel::from_angle(target);
        let orb_limit = policy.orb_limit(a, b, &label);
        let mut last_root: Option<Epoch> = None;

        for pair in samples.windows(2) {
            let (t_prev, sep_prev) = pair[0];
            let (t_cur, sep_cur) = pair[1];
            let f_prev = sep_prev - target;
            let f_cur = sep_cur - target;

            let brackets_root =
                (f_prev <= 0.0 && f_cur >= 0.0) || (f_prev >= 0.0 && f_cur <= 0.0);
            if !brackets_root {
                continue;
            }

            let f = |time: Epoch| -> Result<f64, AspectarianError> {
                Ok(separation_at(provider, a, b, time)? - target)
            };
            let root = window.clamp(refine_bisection(t_prev, f_prev, t_cur, f_cur, &f)?);

            if let Some(previous) = last_root {
                if root - previous < config.dedup {
                    continue;
                }
            }
            last_root = Some(root);

            let orb = (separation_at(provider, a, b, root)? - target).abs();
            if orb <= orb_limit + EPS {
                trace!("{a}-{b} {label} at {root} (orb {orb:.4}, limit {orb_limit:.2})");
                hits.push(Hit {
                    a,
                    b,
                    aspect_angle: target,
                    exact_time: root,
                    orb,
                    orb_limit,
                });
            }
        }
    }

    hits.sort_by(|x, y| x.exact_time.cmp(&y.exact_time));
    Ok(hits)
}
