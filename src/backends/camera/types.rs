// SPDX-License-Identifier: GPL-3.0-only

//! Shared types for camera backends

use serde::{Deserialize, Serialize};

/// Which side of the device the camera faces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FacingMode {
    /// Front ("selfie") camera, shown mirrored
    User,
    /// Rear camera
    #[default]
    Environment,
}

impl FacingMode {
    /// The other camera
    pub fn toggled(self) -> Self {
        match self {
            FacingMode::User => FacingMode::Environment,
            FacingMode::Environment => FacingMode::User,
        }
    }

    /// Front-facing feeds are displayed and captured mirrored
    pub fn is_front(self) -> bool {
        self == FacingMode::User
    }

    /// Constraint value understood by media device APIs
    pub fn as_str(self) -> &'static str {
        match self {
            FacingMode::User => "user",
            FacingMode::Environment => "environment",
        }
    }
}

impl std::fmt::Display for FacingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What is asked of the camera collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CameraConstraints {
    pub facing: FacingMode,
    /// Preferred width; the device may deliver less
    pub ideal_width: Option<u32>,
    /// Preferred height; the device may deliver less
    pub ideal_height: Option<u32>,
}

impl CameraConstraints {
    /// First attempt: facing mode plus the highest resolution we want
    pub fn high_resolution(facing: FacingMode, width: u32, height: u32) -> Self {
        Self {
            facing,
            ideal_width: Some(width),
            ideal_height: Some(height),
        }
    }

    /// Fallback attempt: facing mode only
    pub fn bare(facing: FacingMode) -> Self {
        Self {
            facing,
            ideal_width: None,
            ideal_height: None,
        }
    }

    pub fn is_bare(&self) -> bool {
        self.ideal_width.is_none() && self.ideal_height.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_round_trips() {
        assert_eq!(FacingMode::User.toggled(), FacingMode::Environment);
        assert_eq!(FacingMode::Environment.toggled().toggled(), FacingMode::Environment);
    }

    #[test]
    fn test_default_is_rear_camera() {
        assert_eq!(FacingMode::default(), FacingMode::Environment);
        assert!(!FacingMode::default().is_front());
    }

    #[test]
    fn test_bare_constraints_drop_resolution() {
        let c = CameraConstraints::bare(FacingMode::User);
        assert!(c.is_bare());
        assert!(!CameraConstraints::high_resolution(FacingMode::User, 3840, 2160).is_bare());
    }
}
