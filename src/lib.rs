//! ascii-cam library crate.
//!
//! Converts camera frames to character grids and renders them back to
//! bitmaps. This module exposes the components for the binary and for
//! integration testing.

pub mod ascii;
pub mod camera;
pub mod config;
pub mod engine;
pub mod export;
pub mod pool;
pub mod render;
