//! falsecolor library crate.
//!
//! Live pseudo-color preview with manual exposure controls, and still
//! annotation with a luminance legend.

pub mod camera;
pub mod cli;
pub mod config;
pub mod event_loop;
pub mod exposure;
pub mod input;
pub mod live;
pub mod logger;
pub mod luminance;
pub mod ramp;
pub mod snapshot;
pub mod terminal;
pub mod viewport;
