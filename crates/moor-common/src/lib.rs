//! # moor-common
//!
//! Shared types for the Moor mount toolkit.
//!
//! This crate provides the error type used across all Moor crates. Mount and
//! unmount failures keep the full syscall context (operation, source, target,
//! flags, data) and the underlying OS error, so callers can both render a
//! useful message and inspect the original errno.

#![warn(missing_docs)]

pub mod error;

pub use error::{MountError, MountResult};
