//! # Vectorgate Tools
//!
//! The thin dispatch shell over [`vectorgate_core`]: one tool adapter
//! per logical operation, a uniform `{success, ...}` response
//! envelope, and provider-style credential validation. Each adapter
//! extracts its parameters, invokes exactly one facade operation, and
//! wraps the result or the classified error — nothing else.

#![warn(rustdoc::missing_crate_level_docs)]

pub mod envelope;
pub mod params;
pub mod provider;
pub mod tools;

pub use tools::{dispatch, tool_schema, TOOL_NAMES};
