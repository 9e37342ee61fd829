//! # Calibration Module
//!
//! Notch coordinates, derived notch angles, and feature-enable flags.
//!
//! This module handles:
//! - The six stored notch coordinate pairs and their derived angles
//! - The five independently toggleable feature flags
//! - Loading and persisting calibration through the storage layer

pub mod flags;
pub mod store;

pub use flags::{Feature, FeatureSet};
pub use store::{CalibrationStore, Notch, NotchAngles, NotchAxis, NotchSet};
