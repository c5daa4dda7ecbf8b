use hifitime::Epoch;
use thiserror::Error;

use crate::constants::Body;

#[derive(Error, Debug)]
pub enum AspectarianError {
    #[error("Invalid time window: end {end} is not after start {start}")]
    InvalidWindow { start: Epoch, end: Epoch },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid step: {0} minutes is outside [1, 720]")]
    InvalidStep(u32),

    #[error("Position provider failed at {epoch}: {source}")]
    ProviderFailure {
        epoch: Epoch,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Position provider returned no longitude for {body} at {epoch}")]
    MissingPosition { body: Body, epoch: Epoch },

    #[error("Scan cancelled")]
    Cancelled,

    #[error("Scan deadline exceeded")]
    DeadlineExceeded,
}

impl AspectarianError {
    /// Wrap an arbitrary provider error together with the epoch that triggered it.
    pub fn provider_failure<E>(epoch: Epoch, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        AspectarianError::ProviderFailure {
            epoch,
            source: Box::new(source),
        }
    }
}

impl PartialEq for AspectarianError {
    fn eq(&self, other: &Self) -> bool {
        use AspectarianError::*;
        match (self, other) {
            (
                InvalidWindow { start: s1, end: e1 },
                InvalidWindow { start: s2, end: e2 },
            ) => s1 == s2 && e1 == e2,
            (InvalidArgument(a), InvalidArgument(b)) => a == b,
            (InvalidStep(a), InvalidStep(b)) => a == b,

            // Provider errors are not comparable: equality on variant only
            (ProviderFailure { epoch: a, .. }, ProviderFailure { epoch: b, .. }) => a == b,

            (
                MissingPosition { body: b1, epoch: e1 },
                MissingPosition { body: b2, epoch: e2 },
            ) => b1 == b2 && e1 == e2,

            // Unit variants
            (Cancelled, Cancelled) => true,
            (DeadlineExceeded, DeadlineExceeded) => true,

            _ => false,
        }
    }
}
