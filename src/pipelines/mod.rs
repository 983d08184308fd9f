// SPDX-License-Identifier: GPL-3.0-only

//! Image pipelines
//!
//! ```text
//! ┌──────────────┐     ┌───────────────────┐     ┌──────────────┐
//! │ Live frame / │ ──▶ │  Viewport crop    │ ──▶ │ Preview      │
//! │ Upload       │     │  - center crop    │     │ bitmap       │
//! │              │     │  - selfie mirror  │     │              │
//! └──────────────┘     └───────────────────┘     └──────────────┘
//!
//! ┌──────────────┐     ┌───────────────────┐     ┌──────────────┐
//! │ Snapshot     │ ──▶ │  Encoding         │ ──▶ │  JPEG bytes  │
//! │ (RGBA)       │     │  - RGBA→RGB       │     │              │
//! └──────────────┘     └───────────────────┘     └──────────────┘
//! ```
//!
//! - [`photo`]: viewport crop and JPEG encoding

pub mod photo;
