// Copyright (c) 2026-present, the dynamic-learned-index authors
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! A dynamic, learned, ordered key-value map.
//!
//! This crate turns a static, read-only learned index — something that can
//! `build` a position predictor from a sorted array and `search` it in
//! roughly constant time — into a structure that also supports efficient
//! inserts and deletes, using the classic logarithmic method: writes land in
//! a small sorted buffer and cascade upward through geometrically sized
//! levels as that buffer fills, the way a binary counter carries.
//!
//! The learned index itself is treated as an external black box behind the
//! [`LearnedIndex`] trait; this crate ships [`LinearIndex`], a stub that
//! always hands back the whole level as its candidate range, so the
//! hierarchy is usable (if not especially fast) without plugging in a real
//! predictor.
//!
//! # Example
//!
//! ```
//! use dynamic_learned_index::{Config, DynamicIndex};
//!
//! let config = Config::new().build()?;
//! let mut index: DynamicIndex<i32, &str> = DynamicIndex::new(config);
//!
//! index.insert(1, "one");
//! index.insert(2, "two");
//! index.erase(1);
//!
//! assert_eq!(None, index.find(&1));
//! assert_eq!(Some(&"two"), index.find(&2));
//!
//! let keys: Vec<_> = index.iter().map(|(k, _)| *k).collect();
//! assert_eq!(vec![2], keys);
//! # Ok::<(), dynamic_learned_index::Error>(())
//! ```
#![forbid(unsafe_code)]
#![deny(clippy::all, missing_docs)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::missing_errors_doc)]

#[doc(hidden)]
pub mod binary_search;
mod config;
mod error;
mod hierarchy;
mod index;
mod item;
mod iter;
mod level;

#[doc(hidden)]
pub mod merge;

pub use config::Config;
pub use error::{Error, Result};
pub use hierarchy::DynamicIndex;
pub use index::{LearnedIndex, LinearIndex};
pub use item::{ExplicitFlag, Item, SentinelTag, SentinelValue, TombstoneTag};
pub use iter::MergingIter;
