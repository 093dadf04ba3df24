//! Surface configuration

use serde::{Deserialize, Serialize};

/// Defaults applied by a [`crate::Surface`] to the groups it builds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
    /// Events flag stamped onto every attached group
    pub events_enabled: bool,
    /// Bar width used when a bar call gives none
    pub bar_width: f64,
    /// Bin count used when a histogram call gives none
    pub bins: usize,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            events_enabled: false,
            bar_width: 0.8,
            bins: 10,
        }
    }
}

impl SurfaceConfig {
    /// Set the events flag stamped onto attached groups
    #[inline]
    #[must_use]
    pub fn with_events_enabled(mut self, enabled: bool) -> Self {
        self.events_enabled = enabled;
        self
    }

    /// Set the default bar width
    #[inline]
    #[must_use]
    pub fn with_bar_width(mut self, width: f64) -> Self {
        self.bar_width = width;
        self
    }

    /// Set the default histogram bin count
    #[inline]
    #[must_use]
    pub fn with_bins(mut self, bins: usize) -> Self {
        self.bins = bins;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = SurfaceConfig::default();
        assert!(!config.events_enabled);
        assert_eq!(config.bins, 10);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: SurfaceConfig = serde_json::from_str(r#"{"bins": 4}"#).unwrap();
        assert_eq!(config.bins, 4);
        assert!((config.bar_width - 0.8).abs() < f64::EPSILON);
    }

    #[test]
    fn builder_chain() {
        let config = SurfaceConfig::default()
            .with_events_enabled(true)
            .with_bar_width(0.5)
            .with_bins(3);
        assert!(config.events_enabled);
        assert_eq!(config.bins, 3);
    }
}
