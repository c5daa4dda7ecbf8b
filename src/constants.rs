//! # Constants and type definitions for Aspectarian
//!
//! This module centralizes the **angular constants**, **numerical tolerances**,
//! and **common type definitions** used throughout the `aspectarian` library.
//! It also defines the identifiers for the bodies the scanning engine can be
//! asked about.
//!
//! ## Overview
//!
//! - Angular constants and float-comparison tolerances
//! - Core type aliases used across the crate
//! - Identifiers for scannable bodies ([`Body`]), with the luminary/outer
//!   classification consumed by the adaptive orb rules
//!
//! These definitions are used by all main modules, including the pair scanner,
//! the orb policy resolver, and the ranking pipeline.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::aspectarian_errors::AspectarianError;

// -------------------------------------------------------------------------------------------------
// Angular constants and tolerances
// -------------------------------------------------------------------------------------------------

/// Full circle in degrees
pub const FULL_CIRCLE: f64 = 360.0;

/// Half circle in degrees, the maximum possible angular separation
pub const HALF_CIRCLE: f64 = 180.0;

/// Numerical epsilon used for floating-point comparisons (degrees)
pub const EPS: f64 = 1e-6;

/// Number of seconds in a day
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Number of seconds in a minute
pub const SECONDS_PER_MINUTE: f64 = 60.0;

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Ecliptic longitude or angular distance, in degrees
pub type Degree = f64;

// -------------------------------------------------------------------------------------------------
// Bodies
// -------------------------------------------------------------------------------------------------

/// Identifier of a scannable body.
///
/// The set is closed: a position provider may compute longitudes for any
/// subset of these, and the scanner fails with
/// [`AspectarianError::MissingPosition`](crate::aspectarian_errors::AspectarianError::MissingPosition)
/// when a requested body is absent from the provider's mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Body {
    Sun,
    Moon,
    Mercury,
    Venus,
    Mars,
    Jupiter,
    Saturn,
    Uranus,
    Neptune,
    Pluto,
    MeanNode,
    Chiron,
}

impl Body {
    /// True for the Sun and the Moon, the bodies affected by the
    /// `luminaries_factor` adaptive orb rule.
    pub fn is_luminary(&self) -> bool {
        matches!(self, Body::Sun | Body::Moon)
    }

    /// True for Jupiter through Pluto, the bodies affected by the
    /// `outers_factor` adaptive orb rule.
    pub fn is_outer(&self) -> bool {
        matches!(
            self,
            Body::Jupiter | Body::Saturn | Body::Uranus | Body::Neptune | Body::Pluto
        )
    }

    /// Canonical name of the body, as used on the wire.
    pub fn name(&self) -> &'static str {
        match self {
            Body::Sun => "Sun",
            Body::Moon => "Moon",
            Body::Mercury => "Mercury",
            Body::Venus => "Venus",
            Body::Mars => "Mars",
            Body::Jupiter => "Jupiter",
            Body::Saturn => "Saturn",
            Body::Uranus => "Uranus",
            Body::Neptune => "Neptune",
            Body::Pluto => "Pluto",
            Body::MeanNode => "MeanNode",
            Body::Chiron => "Chiron",
        }
    }
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Body {
    type Err = AspectarianError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Sun" => Ok(Body::Sun),
            "Moon" => Ok(Body::Moon),
            "Mercury" => Ok(Body::Mercury),
            "Venus" => Ok(Body::Venus),
            "Mars" => Ok(Body::Mars),
            "Jupiter" => Ok(Body::Jupiter),
            "Saturn" => Ok(Body::Saturn),
            "Uranus" => Ok(Body::Uranus),
            "Neptune" => Ok(Body::Neptune),
            "Pluto" => Ok(Body::Pluto),
            "MeanNode" => Ok(Body::MeanNode),
            "Chiron" => Ok(Body::Chiron),
            other => Err(AspectarianError::InvalidArgument(format!(
                "unknown body: {other}"
            ))),
        }
    }
}
