// SPDX-License-Identifier: Apache-2.0

use crate::contract_class::ArtifactError;
use crate::felt::{EncodingError, Felt};
use crate::uint256::RangeError;
use itertools::Itertools;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Range(#[from] RangeError),
    #[error(transparent)]
    Encoding(#[from] EncodingError),
    #[error(transparent)]
    Artifact(#[from] ArtifactError),
    /// The simulator rejected a deploy, invoke or call.
    #[error("simulator: {reason}")]
    Simulator { reason: String },
    #[error(
        "{function} returned ({}), expected ({})",
        .found.iter().join(", "),
        .expected.iter().join(", ")
    )]
    UnexpectedResult {
        function: String,
        expected: Vec<Felt>,
        found: Vec<Felt>,
    },
}

impl Error {
    pub fn simulator(reason: impl Into<String>) -> Self {
        Error::Simulator {
            reason: reason.into(),
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
