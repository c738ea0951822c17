//! Physical key descriptors handed over by the layout parser.

use serde::{Deserialize, Serialize};

/// One key of the physical layout, in keyboard units (1u = key width).
///
/// The position of a key in the layout sequence is its key index: keymap
/// cells and matrix transform slots are addressed by that index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicalKey {
    /// X position of the top-left corner
    pub x: f32,
    /// Y position of the top-left corner
    pub y: f32,
    /// Key width (default 1.0)
    #[serde(default = "default_size")]
    pub width: f32,
    /// Key height (default 1.0)
    #[serde(default = "default_size")]
    pub height: f32,
    /// Rotation in degrees, clockwise
    #[serde(default)]
    pub rotation_angle: f32,
    /// X coordinate of the rotation origin
    #[serde(default)]
    pub rotation_x: f32,
    /// Y coordinate of the rotation origin
    #[serde(default)]
    pub rotation_y: f32,
}

fn default_size() -> f32 {
    1.0
}

impl PhysicalKey {
    /// Creates a 1u, unrotated key at `(x, y)`.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            width: 1.0,
            height: 1.0,
            rotation_angle: 0.0,
            rotation_x: 0.0,
            rotation_y: 0.0,
        }
    }

    /// Sets the key width.
    #[must_use]
    pub const fn with_width(mut self, width: f32) -> Self {
        self.width = width;
        self
    }

    /// Sets the key height.
    #[must_use]
    pub const fn with_height(mut self, height: f32) -> Self {
        self.height = height;
        self
    }

    /// Sets the rotation angle and origin.
    #[must_use]
    pub const fn with_rotation(mut self, angle: f32, origin_x: f32, origin_y: f32) -> Self {
        self.rotation_angle = angle;
        self.rotation_x = origin_x;
        self.rotation_y = origin_y;
        self
    }

    /// Returns true if the key is rotated.
    #[must_use]
    pub fn is_rotated(&self) -> bool {
        self.rotation_angle != 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_deserializing() {
        let key: PhysicalKey = serde_json::from_str(r#"{"x": 2.0, "y": 0.5}"#).unwrap();
        assert_eq!(key, PhysicalKey::new(2.0, 0.5));
        assert!(!key.is_rotated());
    }

    #[test]
    fn test_builders() {
        let key = PhysicalKey::new(0.0, 0.0)
            .with_width(1.5)
            .with_height(2.0)
            .with_rotation(15.0, 3.0, 4.0);
        assert!((key.width - 1.5).abs() < f32::EPSILON);
        assert!((key.height - 2.0).abs() < f32::EPSILON);
        assert!(key.is_rotated());
        assert!((key.rotation_y - 4.0).abs() < f32::EPSILON);
    }
}
