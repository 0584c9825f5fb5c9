//! CLI command implementations.

pub mod cancel;
pub mod common;
pub mod devices;
pub mod result;
pub mod run;
pub mod status;
