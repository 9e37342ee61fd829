//! # GCC Bridge Library
//!
//! Calibration-driven input shaping for GameCube controllers.
//!
//! This library sits between a GameCube controller and the console, reshaping
//! the analog stick signal each poll cycle: snapping near-cardinal inputs to
//! exact vectors, widening perfect-angle zones, expanding the shield-drop
//! window, debouncing dash-back reversals, and zeroing near-center noise.

pub mod config;
pub mod error;
pub mod storage;
pub mod calibration;
pub mod pipeline;
pub mod controller;
pub mod bridge;
pub mod menu;
pub mod verify;
pub mod serial;
