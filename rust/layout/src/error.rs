// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for layout operations.

/// Result type alias for layout operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or querying a layout.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A transform produced an unsafe topology, or a derived footprint
    /// collapsed to nothing.
    #[error("invalid shape for {entity}: {reason}")]
    InvalidShape { entity: String, reason: String },

    /// A feature could not be exclusively assigned to one area.
    #[error("feature {feature} matches {candidates} areas, expected exactly one")]
    CorruptedAnnotation { feature: String, candidates: usize },

    /// A feature declares an expected wall side but no wall qualifies.
    #[error("no wall found to orient feature {0}")]
    AngleInference(String),

    /// A clip or union expected to yield one simple polygon did not.
    #[error("features generation failed: {0}")]
    FeaturesGeneration(String),

    /// Lower bound above upper bound.
    #[error("invalid height interval [{lower}, {upper}]")]
    InvalidHeight { lower: f64, upper: f64 },

    /// An error bubbled up from the footprint algebra.
    #[error(transparent)]
    Geometry(#[from] floorplan_geometry::Error),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl Error {
    pub(crate) fn invalid_shape(entity: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidShape {
            entity: entity.into(),
            reason: reason.into(),
        }
    }
}
