//! Core types for VICAR label handling.
//!
//! This module provides the fundamental data structures for representing
//! label parameter values, optional per-value formatting, and lookup keys.

mod format;
mod key;
mod value;

pub use format::{ListFormat, ValueFormat};
pub use key::Key;
pub use value::{Scalar, Value, validate_name};
