// SPDX-License-Identifier: MPL-2.0

//! Frame analysis
//!
//! - `frame_processor`: Analyzers, the throttle they share and vision types
//! - `analysis`: Analysis session binding analyzers to a frame source

pub mod analysis;
pub mod frame_processor;
