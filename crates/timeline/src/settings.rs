use serde::{Deserialize, Serialize};

/// Grid spacing presets for time-mode snapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapGranularity {
    Coarse,
    Medium,
    Fine,
    Custom,
}

/// Arrangement view settings. Transient UI state, owned by the caller.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Timeline {
    /// Zoom expressed as pixels per millisecond.
    pub zoom: f64,
    pub snap_to_grid: bool,
    pub snap_granularity: SnapGranularity,
    pub custom_snap_interval_ms: f64,
}

impl Timeline {
    /// Active fixed grid interval for time mode.
    pub fn snap_interval_ms(&self) -> f64 {
        match self.snap_granularity {
            SnapGranularity::Coarse => 1000.0,
            SnapGranularity::Medium => 500.0,
            SnapGranularity::Fine => 100.0,
            SnapGranularity::Custom => self.custom_snap_interval_ms,
        }
    }
}

impl Default for Timeline {
    fn default() -> Self {
        Self {
            zoom: 0.1,
            snap_to_grid: true,
            snap_granularity: SnapGranularity::Medium,
            custom_snap_interval_ms: 250.0,
        }
    }
}
