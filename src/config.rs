// Copyright (c) 2026-present, the dynamic-learned-index authors
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use crate::error::{Error, Result};

/// Tuning knobs for a [`crate::DynamicIndex`]'s buffer hierarchy.
///
/// Construct with [`Config::new`], adjust via the builder methods, then call
/// [`Config::build`] to validate the combination before handing it to
/// [`crate::DynamicIndex::new`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    /// Smallest level index. The bottom level (the insertion buffer) lives here
    /// and may hold up to `2^(min_level + 1) - 1` items.
    pub min_level: usize,

    /// Smallest level index that carries a companion learned index.
    ///
    /// Levels below this threshold are searched with plain binary search; the
    /// per-level capacity at this threshold must be large enough for a learned
    /// index's error bound to be meaningful (`2 * epsilon < 2^min_indexed_level`
    /// is the source's assumption; the bundled stub index has `epsilon == 0`
    /// so this always holds).
    pub min_indexed_level: usize,

    /// Levels at or below this index keep their reserved capacity after being
    /// cleared by a merge; levels above it release their allocation instead.
    pub max_fully_allocated_level: usize,

    /// Number of level slots to pre-allocate at construction time.
    pub init_levels: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min_level: 6,
            min_indexed_level: 18,
            max_fully_allocated_level: 20,
            init_levels: 20 - 6 + 1,
        }
    }
}

impl Config {
    /// Starts a new config with the defaults used by the source design
    /// (`min_level = 6`, `min_indexed_level = 18`, `max_fully_allocated_level = 20`).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the bottom level index.
    #[must_use]
    pub fn min_level(mut self, min_level: usize) -> Self {
        self.min_level = min_level;
        self
    }

    /// Sets the smallest learned-indexed level.
    #[must_use]
    pub fn min_indexed_level(mut self, min_indexed_level: usize) -> Self {
        self.min_indexed_level = min_indexed_level;
        self
    }

    /// Sets the cutoff above which emptied levels release their allocation.
    #[must_use]
    pub fn max_fully_allocated_level(mut self, max_fully_allocated_level: usize) -> Self {
        self.max_fully_allocated_level = max_fully_allocated_level;
        self
    }

    /// Sets the number of level slots pre-allocated at construction time.
    #[must_use]
    pub fn init_levels(mut self, init_levels: usize) -> Self {
        self.init_levels = init_levels;
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `min_level` does not sit strictly
    /// below both `min_indexed_level` and `max_fully_allocated_level`.
    pub fn build(self) -> Result<Self> {
        if self.min_level >= self.min_indexed_level {
            return Err(Error::InvalidConfig {
                reason: "min_level must be less than min_indexed_level",
            });
        }

        if self.min_level >= self.max_fully_allocated_level {
            return Err(Error::InvalidConfig {
                reason: "min_level must be less than max_fully_allocated_level",
            });
        }

        Ok(self)
    }

    /// Capacity of the bottom (insertion-buffer) level: `2^(min_level + 1) - 1`.
    #[must_use]
    pub fn bottom_capacity(&self) -> usize {
        (1_usize << (self.min_level + 1)) - 1
    }

    /// Capacity of an arbitrary non-bottom level: `2^level`.
    #[must_use]
    pub fn level_capacity(&self, level: usize) -> usize {
        1_usize << level
    }
}
