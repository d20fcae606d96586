//! Interaction settings

use serde::{Deserialize, Serialize};

use sk_view::Tolerances;

/// User-tunable interaction settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct InteractionConfig {
    /// Hit-test pixel tolerances
    pub tolerances: Tolerances,
    /// Snap placed and dragged points to the sketch-plane grid
    pub snap_to_grid: bool,
    /// Grid pitch in world units
    pub grid_spacing: f64,
    /// Radians of orbit per pixel of middle-drag
    pub orbit_sensitivity: f64,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            tolerances: Tolerances::default(),
            snap_to_grid: false,
            grid_spacing: 1.0,
            orbit_sensitivity: 0.01,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = InteractionConfig::default();
        assert!(!config.snap_to_grid);
        assert_eq!(config.tolerances.vertex_px, 6.0);
        assert_eq!(config.tolerances.center_px, 4.0);
    }
}
