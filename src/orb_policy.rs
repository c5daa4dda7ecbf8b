//! # Orb policy resolution
//!
//! The *orb* is the tolerated deviation between an observed separation and a
//! target aspect angle. How wide that tolerance is depends on the pair and the
//! aspect: a Sun–Moon conjunction is commonly granted a much wider orb than a
//! Mercury–Chiron quintile. [`OrbPolicy`] is the declarative, per-request
//! description of those choices, and [`OrbPolicy::orb_limit`] resolves it for
//! one `(bodyA, bodyB, aspect)` triple:
//!
//! 1. base orb from the per-aspect table, falling back to the built-in
//!    defaults ([`Aspect::default_orb`](crate::aspects::Aspect::default_orb)),
//! 2. widened to the **most permissive** of the base and either body's
//!    explicit override,
//! 3. scaled by the multiplicative adaptive factors (luminaries, outers,
//!    minor aspects — composing multiplicatively when several apply),
//! 4. floored at [`MIN_ORB`] so a policy can never produce a zero-width orb.
//!
//! Unknown aspect names never fail: they silently resolve to the default base
//! orb. The policy is read-only during a scan and resolved once per
//! (pair, target angle).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::aspects::AspectLabel;
use crate::constants::Body;

/// Hard floor on any resolved orb limit, in degrees.
pub const MIN_ORB: f64 = 0.1;

/// Multiplicative widening/narrowing factors applied on top of the base orb.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdaptiveRules {
    /// Applied when either body is the Sun or the Moon.
    pub luminaries_factor: f64,
    /// Applied when either body is Jupiter, Saturn, Uranus, Neptune, or Pluto.
    pub outers_factor: f64,
    /// Applied when the aspect belongs to the minor set.
    pub minor_aspect_factor: f64,
}

impl Default for AdaptiveRules {
    fn default() -> Self {
        AdaptiveRules {
            luminaries_factor: 1.0,
            outers_factor: 1.0,
            minor_aspect_factor: 1.0,
        }
    }
}

/// Declarative orb policy, supplied per scan request.
///
/// All fields are optional on the wire; absent fields fall back to the
/// built-in defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbPolicy {
    /// Explicit per-body orb overrides, in degrees.
    pub per_object: HashMap<Body, f64>,
    /// Per-aspect base orbs, keyed by lowercase canonical name.
    pub per_aspect: HashMap<String, f64>,
    pub adaptive_rules: AdaptiveRules,
}

impl OrbPolicy {
    /// Resolve the allowed orb for one `(bodyA, bodyB, aspect)` triple.
    ///
    /// Arguments
    /// ---------
    /// * `a`, `b`: the pair under scan
    /// * `label`: the aspect label of the target angle
    ///
    /// Return
    /// ------
    /// * The orb limit in degrees, always ≥ [`MIN_ORB`].
    pub fn orb_limit(&self, a: Body, b: Body, label: &AspectLabel) -> f64 {
        let key = label.policy_key();
        let base = self
            .per_aspect
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(&key))
            .map(|(_, orb)| *orb)
            .unwrap_or_else(|| label.default_orb());

        let start = base
            .max(self.per_object.get(&a).copied().unwrap_or(base))
            .max(self.per_object.get(&b).copied().unwrap_or(base));

        let mut factor = 1.0;
        if a.is_luminary() || b.is_luminary() {
            factor *= self.adaptive_rules.luminaries_factor;
        }
        if a.is_outer() || b.is_outer() {
            factor *= self.adaptive_rules.outers_factor;
        }
        if label.is_minor() {
            factor *= self.adaptive_rules.minor_aspect_factor;
        }

        (start * factor).max(MIN_ORB)
    }
}
