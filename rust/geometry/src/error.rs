// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for footprint operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during footprint processing
#[derive(Error, Debug)]
pub enum Error {
    /// A transform or repair produced a topology the caller cannot accept.
    #[error("Invalid shape: {0}")]
    InvalidShape(String),

    /// An operation collapsed its input to nothing.
    #[error("Empty geometry: {0}")]
    EmptyGeometry(String),

    /// A clip or union expected to yield a single simple polygon did not.
    #[error("Features generation failed: {0}")]
    FeaturesGeneration(String),

    /// Tolerance configuration could not be loaded.
    #[error("Invalid tolerance configuration: {0}")]
    Config(String),
}
