//! Core domain model for aubade.
//!
//! This crate defines the album catalog and history ledger, the text
//! normalization and variant rules used to compare artist and title
//! strings, the fuzzy matcher, and the history-aware catalog selector.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod content;
pub mod error;
pub mod matching;
pub mod model;
pub mod select;
pub mod store;
pub mod text;

pub use error::{Error, Result};
pub use matching::{AlbumTarget, Match, MatchCandidate, MatchKind, Matcher};
pub use model::{AlbumRecord, CatalogEntry, HistoryEntry, SelectionResult};
pub use select::{CatalogSelector, Transition};
pub use store::DataDir;
