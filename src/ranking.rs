//! # Severity scoring and hit ordering
//!
//! A raw [`Hit`] only records where and how tightly a crossing happened.
//! Ranking turns it into a [`RankedHit`]: the target angle is mapped back to
//! an [`AspectLabel`], and a severity in 0..~1 is derived as
//!
//! ```text
//! severity = taper_by_orb(orb, orb_limit) × weight(label) × Π(body modifiers)
//! ```
//!
//! [`taper_by_orb`] is a smooth cosine decay from exact (1.0) to the orb
//! boundary (0.0), so severity degrades continuously as a hit loosens
//! instead of cliff-dropping at the limit.

use std::collections::HashMap;
use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::aspects::AspectLabel;
use crate::constants::Body;
use crate::scan::Hit;

/// Ranking weight for harmonic angles outside the named aspect set.
pub const HARMONIC_ASPECT_WEIGHT: f64 = 0.3;

/// Sort order of a ranked hit list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HitOrdering {
    /// Ascending `exact_time`, ties kept in original order.
    #[default]
    Time,
    /// Descending severity, ties broken by ascending time.
    Severity,
    /// Ascending orb, ties broken by ascending time.
    Orb,
}

/// Optional overrides for the severity computation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeverityProfile {
    /// Per-aspect weight overrides, keyed by lowercase canonical name.
    pub aspect_weights: HashMap<String, f64>,
    /// Weight for harmonic angles outside the named set; defaults to
    /// [`HARMONIC_ASPECT_WEIGHT`].
    pub harmonic_weight: Option<f64>,
    /// Per-body multiplicative modifiers; both bodies of a hit contribute.
    pub body_modifiers: HashMap<Body, f64>,
}

impl SeverityProfile {
    fn weight(&self, label: &AspectLabel) -> f64 {
        match label {
            AspectLabel::Named(aspect) => self
                .aspect_weights
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(aspect.name()))
                .map(|(_, weight)| *weight)
                .unwrap_or_else(|| aspect.weight()),
            AspectLabel::Numeric(_) => self.harmonic_weight.unwrap_or(HARMONIC_ASPECT_WEIGHT),
        }
    }

    fn body_modifier(&self, body: Body) -> f64 {
        self.body_modifiers.get(&body).copied().unwrap_or(1.0)
    }
}

/// A hit enriched with its aspect label and severity score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedHit {
    #[serde(flatten)]
    pub hit: Hit,
    pub label: AspectLabel,
    pub severity: f64,
}

/// Smooth orb taper: 1.0 at an exact hit, 0.0 at the orb boundary.
///
/// `0.5·(1 + cos(π·orb/limit))` in between — continuous and monotonically
/// non-increasing in `orb`.
pub fn taper_by_orb(orb: f64, limit: f64) -> f64 {
    if limit <= 0.0 || orb >= limit {
        return 0.0;
    }
    if orb <= 0.0 {
        return 1.0;
    }
    0.5 * (1.0 + (PI * orb / limit).cos())
}

/// Attach severities to a hit list and sort it.
///
/// Arguments
/// ---------
/// * `hits`: the raw scan output
/// * `profile`: optional weight/modifier overrides
/// * `order_by`: the requested sort order
///
/// Return
/// ------
/// * The ranked hits in the requested order. Sorting is stable, so
///   `HitOrdering::Time` preserves the scanner's original tie order.
pub fn rank_hits(
    hits: Vec<Hit>,
    profile: Option<&SeverityProfile>,
    order_by: HitOrdering,
) -> Vec<RankedHit> {
    let default_profile = SeverityProfile::default();
    let profile = profile.unwrap_or(&default_profile);

    let mut ranked: Vec<RankedHit> = hits
        .into_iter()
        .map(|hit| {
            let label = AspectLabel::from_angle(hit.aspect_angle);
            let severity = taper_by_orb(hit.orb, hit.orb_limit)
                * profile.weight(&label)
                * profile.body_modifier(hit.a)
                * profile.body_modifier(hit.b);
            RankedHit {
                hit,
                label,
                severity,
            }
        })
        .collect();

    match order_by {
        HitOrdering::Time => {
            ranked.sort_by(|x, y| x.hit.exact_time.cmp(&y.hit.exact_time));
        }
        HitOrdering::Severity => {
            ranked.sort_by(|x, y| {
                y.severity
                    .total_cmp(&x.severity)
                    .then_with(|| x.hit.exact_time.cmp(&y.hit.exact_time))
            });
        }
        HitOrdering::Orb => {
            ranked.sort_by(|x, y| {
                x.hit
                    .orb
                    .total_cmp(&y.hit.orb)
                    .then_with(|| x.hit.exact_time.cmp(&y.hit.exact_time))
            });
        }
    }

    ranked
}

#[cfg(test)]
mod ranking_test {
    use super::*;
    use crate::aspects::Aspect;
    use approx::assert_relative_eq;
    use hifitime::Epoch;

    fn hit(angle: f64, orb: f64, orb_limit: f64, minute: u8) -> Hit {
        Hit {
            a: Body::Sun,
            b: Body::Moon,
            aspect_angle: angle,
            exact_time: Epoch::from_gregorian_utc(2025, 6, 1, 12, minute, 0, 0),
            orb,
            orb_limit,
        }
    }

    #[test]
    fn test_taper_endpoints_and_monotonicity() {
        assert_relative_eq!(taper_by_orb(0.0, 5.0), 1.0);
        assert_relative_eq!(taper_by_orb(5.0, 5.0), 0.0);
        assert_relative_eq!(taper_by_orb(2.5, 5.0), 0.5);

        let mut previous = f64::INFINITY;
        for i in 0..=100 {
            let value = taper_by_orb(i as f64 * 0.05, 5.0);
            assert!(value <= previous + 1e-12);
            previous = value;
        }
    }

    #[test]
    fn test_labels_and_default_weights() {
        let ranked = rank_hits(
            vec![hit(120.0, 0.0, 6.0, 0), hit(51.43, 0.0, 3.0, 1)],
            None,
            HitOrdering::Time,
        );

        assert_eq!(ranked[0].label, AspectLabel::Named(Aspect::Trine));
        assert_relative_eq!(ranked[0].severity, Aspect::Trine.weight());
        assert!(matches!(ranked[1].label, AspectLabel::Numeric(_)));
        assert_relative_eq!(ranked[1].severity, HARMONIC_ASPECT_WEIGHT);
    }

    #[test]
    fn test_profile_overrides_and_modifiers() {
        let profile = SeverityProfile {
            aspect_weights: HashMap::from([("trine".to_string(), 0.5)]),
            harmonic_weight: Some(1.0),
            body_modifiers: HashMap::from([(Body::Sun, 2.0)]),
        };
        let ranked = rank_hits(
            vec![hit(120.0, 0.0, 6.0, 0)],
            Some(&profile),
            HitOrdering::Time,
        );
        // taper 1.0 x weight 0.5 x Sun modifier 2.0 x Moon modifier 1.0
        assert_relative_eq!(ranked[0].severity, 1.0);
    }

    #[test]
    fn test_severity_order_ties_broken_by_time() {
        let ranked = rank_hits(
            vec![
                hit(120.0, 3.0, 6.0, 2),
                hit(120.0, 0.0, 6.0, 1),
                hit(120.0, 3.0, 6.0, 0),
            ],
            None,
            HitOrdering::Severity,
        );
        // the exact hit first, then the two equal-severity hits by time
        assert_relative_eq!(ranked[0].hit.orb, 0.0);
        assert!(ranked[1].hit.exact_time < ranked[2].hit.exact_time);
    }

    #[test]
    fn test_orb_order() {
        let ranked = rank_hits(
            vec![hit(120.0, 2.0, 6.0, 0), hit(120.0, 0.5, 6.0, 1)],
            None,
            HitOrdering::Orb,
        );
        assert_relative_eq!(ranked[0].hit.orb, 0.5);
        assert_relative_eq!(ranked[1].hit.orb, 2.0);
    }
}
