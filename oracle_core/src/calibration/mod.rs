//! Empirically calibrated constants.
//!
//! The stencil weights and round-unit bins were tuned against 2020–2024 output
//! histograms. As purchasing power drifts these tables need recalibration; a new
//! calibration is added as a new `Calibration` value rather than by editing an old one.

pub mod tables;

pub use tables::{Calibration, SmoothShape, CURRENT};
