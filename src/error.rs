// Copyright (c) 2026-present, the dynamic-learned-index authors
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

/// Represents errors that can occur while configuring or loading a [`crate::DynamicIndex`]
#[derive(Debug)]
pub enum Error {
    /// A [`crate::Config`] had an invalid combination of level thresholds
    InvalidConfig {
        /// Human-readable explanation
        reason: &'static str,
    },

    /// `insert` was given a value that collides with the tombstone sentinel
    ///
    /// Only reachable when the index is instantiated with [`crate::item::SentinelTag`].
    SentinelCollision,

    /// [`crate::DynamicIndex::bulk_load`] was given a sequence that was not
    /// ascending by key.
    ///
    /// Only checked in debug builds; in release builds an unsorted input is
    /// an unspecified-result contract violation rather than a detected error.
    UnsortedInput,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidConfig { reason } => write!(f, "invalid config: {reason}"),
            Self::SentinelCollision => {
                write!(f, "value collides with the reserved tombstone sentinel")
            }
            Self::UnsortedInput => write!(f, "bulk_load requires a non-decreasing input sequence"),
        }
    }
}

impl std::error::Error for Error {}

/// Crate-wide result type
pub type Result<T> = std::result::Result<T, Error>;
