//! # informer-std
//!
//! Standard augmentations for the Informer event toolkit.
//!
//! This crate provides:
//! - **Task sequencing**: [`sequence::run_series`], [`sequence::run_parallel`]
//! - **Named functions**: [`Named`], a name and parameter list attached to any callable
//! - **Collection helpers**: [`SliceExt`], [`ValueSliceExt`], [`cast`]
//!
//! Built-in types are never patched: every helper is either a free function
//! or an extension trait the caller opts into with a `use`.

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core types
pub use informer_core;

pub mod collections;
pub mod named;
pub mod sequence;

pub use collections::{SliceExt, ValueSliceExt, cast};
pub use named::{InvalidName, Named};
