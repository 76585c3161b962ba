//! Shared Utility Functions
//!
//! Config parsing helpers and small geometry used by several modules.

use std::path::Path;

use bevy::prelude::*;
use serde::de::DeserializeOwned;

/// Parse a RON document, labelling errors with where it came from
pub fn parse_ron<T: DeserializeOwned>(contents: &str, label: &str) -> Result<T, String> {
    ron::from_str(contents).map_err(|e| format!("Failed to parse {}: {}", label, e))
}

/// Read and parse a RON file
pub fn read_ron<T: DeserializeOwned>(path: &Path) -> Result<T, String> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    parse_ron(&contents, &path.display().to_string())
}

/// Distance on the ground plane, ignoring height
pub fn flat_distance(a: Vec3, b: Vec3) -> f32 {
    Vec2::new(a.x, a.z).distance(Vec2::new(b.x, b.z))
}

/// Unit direction from `from` to `to` on the ground plane.
/// Falls back to +Z when the points coincide.
pub fn flat_direction(from: Vec3, to: Vec3) -> Vec3 {
    let offset = Vec3::new(to.x - from.x, 0.0, to.z - from.z);
    let direction = offset.normalize_or_zero();
    if direction == Vec3::ZERO {
        Vec3::Z
    } else {
        direction
    }
}
