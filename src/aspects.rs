//! # Aspect families, labels, and harmonic expansion
//!
//! An *aspect* is a named target angular separation between two bodies
//! (square = 90°, trine = 120°, ...). The scanner never works on names
//! directly: a request's aspect families and integer harmonics are first
//! expanded into a flat, sorted set of target angles
//! ([`expand_targets`]), and each confirmed crossing is mapped back to a
//! label ([`AspectLabel::from_angle`]) for orb resolution and ranking.
//!
//! Harmonic `h` contributes the angles `k·360/h` for `k = 1..h`, reduced
//! modulo 360. The expansion is purely combinatorial: every requested
//! angle appears in the output exactly once (float-noise duplicates are
//! collapsed with a small epsilon).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::angles::normalize_deg;
use crate::aspectarian_errors::AspectarianError;
use crate::constants::{Degree, EPS, FULL_CIRCLE};

/// Base orb in degrees for aspects without a per-aspect entry, and for
/// harmonic angles outside the named set.
pub const DEFAULT_ASPECT_ORB: f64 = 3.0;

/// The named aspect families, each with a canonical base angle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aspect {
    Conjunction,
    SemiSextile,
    SemiSquare,
    Sextile,
    Quintile,
    Square,
    Trine,
    SesquiSquare,
    BiQuintile,
    Quincunx,
    Opposition,
}

/// All named aspects, in ascending angle order.
pub const ALL_ASPECTS: [Aspect; 11] = [
    Aspect::Conjunction,
    Aspect::SemiSextile,
    Aspect::SemiSquare,
    Aspect::Sextile,
    Aspect::Quintile,
    Aspect::Square,
    Aspect::Trine,
    Aspect::SesquiSquare,
    Aspect::BiQuintile,
    Aspect::Quincunx,
    Aspect::Opposition,
];

impl Aspect {
    /// Canonical base angle of the family, in degrees.
    pub fn angle(&self) -> Degree {
        match self {
            Aspect::Conjunction => 0.0,
            Aspect::SemiSextile => 30.0,
            Aspect::SemiSquare => 45.0,
            Aspect::Sextile => 60.0,
            Aspect::Quintile => 72.0,
            Aspect::Square => 90.0,
            Aspect::Trine => 120.0,
            Aspect::SesquiSquare => 135.0,
            Aspect::BiQuintile => 144.0,
            Aspect::Quincunx => 150.0,
            Aspect::Opposition => 180.0,
        }
    }

    /// Built-in base orb of the family, in degrees.
    pub fn default_orb(&self) -> f64 {
        match self {
            Aspect::Conjunction => 8.0,
            Aspect::Opposition => 7.0,
            Aspect::Square => 6.0,
            Aspect::Trine => 6.0,
            Aspect::Sextile => 4.0,
            Aspect::Quincunx => 3.0,
            Aspect::SemiSextile => 3.0,
            Aspect::SemiSquare => 2.0,
            Aspect::SesquiSquare => 2.0,
            Aspect::Quintile => 2.0,
            Aspect::BiQuintile => 2.0,
        }
    }

    /// True for the minor set, affected by the `minor_aspect_factor`
    /// adaptive orb rule.
    pub fn is_minor(&self) -> bool {
        !matches!(
            self,
            Aspect::Conjunction
                | Aspect::Sextile
                | Aspect::Square
                | Aspect::Trine
                | Aspect::Opposition
        )
    }

    /// Default ranking weight of the family.
    pub fn weight(&self) -> f64 {
        match self {
            Aspect::Conjunction => 1.0,
            Aspect::Opposition => 0.95,
            Aspect::Square => 0.9,
            Aspect::Trine => 0.85,
            Aspect::Sextile => 0.7,
            Aspect::Quincunx => 0.5,
            Aspect::SemiSquare => 0.45,
            Aspect::SesquiSquare => 0.45,
            Aspect::SemiSextile => 0.4,
            Aspect::Quintile => 0.4,
            Aspect::BiQuintile => 0.4,
        }
    }

    /// Canonical lowercase name, the key used in per-aspect orb policies.
    pub fn name(&self) -> &'static str {
        match self {
            Aspect::Conjunction => "conjunction",
            Aspect::SemiSextile => "semisextile",
            Aspect::SemiSquare => "semisquare",
            Aspect::Sextile => "sextile",
            Aspect::Quintile => "quintile",
            Aspect::Square => "square",
            Aspect::Trine => "trine",
            Aspect::SesquiSquare => "sesquisquare",
            Aspect::BiQuintile => "biquintile",
            Aspect::Quincunx => "quincunx",
            Aspect::Opposition => "opposition",
        }
    }

    /// Map an angle back to the named family it belongs to, within [`EPS`].
    pub fn from_angle(angle: Degree) -> Option<Aspect> {
        ALL_ASPECTS
            .iter()
            .copied()
            .find(|aspect| (aspect.angle() - angle).abs() < EPS)
    }
}

impl fmt::Display for Aspect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Aspect {
    type Err = AspectarianError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL_ASPECTS
            .iter()
            .copied()
            .find(|aspect| aspect.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| AspectarianError::InvalidArgument(format!("unknown aspect: {s}")))
    }
}

/// Label attached to a target angle once a crossing is confirmed.
///
/// The angle → name map is a closed set: harmonic angles outside it keep
/// their numeric value instead of being forced into a string field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AspectLabel {
    Named(Aspect),
    Numeric(Degree),
}

impl AspectLabel {
    /// Classify a target angle against the canonical table.
    pub fn from_angle(angle: Degree) -> AspectLabel {
        match Aspect::from_angle(angle) {
            Some(aspect) => AspectLabel::Named(aspect),
            None => AspectLabel::Numeric(angle),
        }
    }

    /// Key used for per-aspect policy lookups. Numeric labels use their
    /// stringified angle, so a policy may still target them explicitly.
    pub fn policy_key(&self) -> String {
        match self {
            AspectLabel::Named(aspect) => aspect.name().to_string(),
            AspectLabel::Numeric(angle) => format!("{angle}"),
        }
    }

    /// Built-in base orb for this label.
    pub fn default_orb(&self) -> f64 {
        match self {
            AspectLabel::Named(aspect) => aspect.default_orb(),
            AspectLabel::Numeric(_) => DEFAULT_ASPECT_ORB,
        }
    }

    /// Minor-set membership; numeric labels are never minor.
    pub fn is_minor(&self) -> bool {
        match self {
            AspectLabel::Named(aspect) => aspect.is_minor(),
            AspectLabel::Numeric(_) => false,
        }
    }
}

impl fmt::Display for AspectLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AspectLabel::Named(aspect) => aspect.fmt(f),
            AspectLabel::Numeric(angle) => write!(f, "{angle:.3}°"),
        }
    }
}

/// Expand aspect families and integer harmonics into a sorted set of
/// distinct target angles in [0, 360).
///
/// Arguments
/// ---------
/// * `aspects`: the named families to include (their base angles)
/// * `harmonics`: positive integers; harmonic `h` contributes `k·360/h`
///   for `k = 1..h`, reduced modulo 360
///
/// Return
/// ------
/// * The union of both sources, sorted ascending and deduplicated with
///   [`EPS`], or [`AspectarianError::InvalidArgument`] for harmonic 0.
pub fn expand_targets(
    aspects: &[Aspect],
    harmonics: &[u32],
) -> Result<Vec<Degree>, AspectarianError> {
    let mut angles: Vec<Degree> = aspects.iter().map(|aspect| aspect.angle()).collect();

    for &h in harmonics {
        if h == 0 {
            return Err(AspectarianError::InvalidArgument(
                "harmonic must be a positive integer".to_string(),
            ));
        }
        let step = FULL_CIRCLE / h as f64;
        for k in 1..=h {
            angles.push(normalize_deg(step * k as f64));
        }
    }

    angles.sort_by(f64::total_cmp);
    angles.dedup_by(|a, b| (*a - *b).abs() < EPS);
    Ok(angles)
}
