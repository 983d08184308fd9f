// SPDX-License-Identifier: GPL-3.0-only

//! Backend abstraction layer for the camera device
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                  App Layer                   │
//! └────────────────────┬────────────────────────┘
//!                      │
//! ┌────────────────────┴────────────────────────┐
//! │  CameraManager  (owns the single stream)    │
//! └────────────────────┬────────────────────────┘
//!                      │
//! ┌────────────────────┴────────────────────────┐
//! │  MediaDevices trait                          │
//! │  ┌─────────────────┐  ┌──────────────────┐  │
//! │  │ Platform camera │  │ FileCamera       │  │
//! │  │ (host supplied) │  │ (still image)    │  │
//! │  └─────────────────┘  └──────────────────┘  │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! - [`camera`]: constraints, stream ownership and the file-backed source

pub mod camera;
