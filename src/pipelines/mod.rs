// SPDX-License-Identifier: MPL-2.0

//! Processing pipelines for photo capture
//!
//! Heavy operations run in background tasks so frame analysis is never
//! held up by encoding or disk I/O.

pub mod photo;
