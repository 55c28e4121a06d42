//! # informer-core
//!
//! Data model for the Informer event toolkit.
//!
//! This crate has no runtime behavior of its own. It defines the vocabulary
//! shared by the emitter (`informer`) and the standard augmentations
//! (`informer-std`):
//!
//! ## Values ([`Value`])
//!
//! Event arguments and filter attributes are dynamically typed. Two values are
//! compared with [`Value::loose_eq`], a coercing equality where `5`, `"5"` and
//! `5.0` are all equal. Filter matching, seen-tracking and removal all use this
//! one comparison.
//!
//! ## Filters ([`Filter`])
//!
//! An attribute map with an optional reserved `type` attribute. A filter
//! matches another when every attribute it names is loosely equal in the other.
//!
//! ## Event descriptors ([`EventType`])
//!
//! Either a plain event name or a filter. Every subscription and emission is
//! addressed by one.
//!
//! # Error Types
//!
//! - [`EmitError`] - Faults raised or reported by an emission
//! - [`BoxError`] - What listeners return when they fail

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod args;
mod error;
mod event_type;
mod filter;
mod value;

pub use args::IntoArgs;
pub use error::{BoxError, EmitError, SharedError};
pub use event_type::EventType;
pub use filter::{Filter, TYPE_KEY};
pub use value::Value;
