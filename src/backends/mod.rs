// SPDX-License-Identifier: MPL-2.0

//! Backend abstraction layer for frame capture
//!
//! # Modules
//!
//! - [`camera`]: Frame types, pixel format conversion and frame sources

pub mod camera;
