// SPDX-License-Identifier: MPL-2.0

//! Camera frame delivery
//!
//! ```text
//! ┌─────────────────────┐
//! │    FrameSource      │  ← File replay, or any frame iterator
//! └──────────┬──────────┘
//!            │
//!            ▼
//! ┌─────────────────────┐
//! │CaptureLoopController│  ← Single capture thread
//! └──────────┬──────────┘
//!            │
//!            ▼
//! ┌─────────────────────┐
//! │     Analyzers       │
//! └─────────────────────┘
//! ```

pub mod file_source;
pub mod format_converters;
pub mod frame_loop;
pub mod types;

pub use file_source::FileFrameSource;
pub use frame_loop::{CaptureLoopController, LoopAction};
pub use types::*;
