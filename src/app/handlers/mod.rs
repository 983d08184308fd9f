// SPDX-License-Identifier: GPL-3.0-only

//! Operation handlers
//!
//! Each module extends [`AppModel`](super::AppModel) with the operations of
//! one functional area.

pub mod camera;
pub mod capture;
pub mod export;
