//! Figure descriptions
//!
//! A figure is a TOML file with an optional `[surface]` table and one
//! `[[series]]` entry per plotted series:
//!
//! ```toml
//! [surface]
//! bins = 4
//!
//! [[series]]
//! kind = "bar"
//! x = [1.0, 2.0]
//! heights = [3.0, 5.0]
//! label = "heights"
//!
//! [[series]]
//! kind = "hist"
//! data = [0.5, 1.5, 1.7]
//! [series.params]
//! cumulative = true
//! ```

use anyhow::{Context, Result};
use pg_container::{Container, HistData, ScatterParams};
use pg_surface::{BarOptions, ErrorbarOptions, Surface, SurfaceConfig, SurfaceError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::rc::Rc;

/// Parsed figure description
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct FigureConfig {
    #[serde(default)]
    pub(crate) surface: SurfaceConfig,
    #[serde(default)]
    pub(crate) series: Vec<Series>,
}

/// One plotted series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub(crate) enum Series {
    Bar {
        x: Vec<f64>,
        heights: Vec<f64>,
        width: Option<f64>,
        #[serde(default)]
        bottom: f64,
        yerr: Option<Vec<f64>>,
        label: Option<String>,
    },
    Hist {
        data: Vec<f64>,
        #[serde(default)]
        params: HistData,
    },
    Scatter {
        x: Vec<f64>,
        y: Vec<f64>,
        #[serde(default)]
        params: ScatterParams,
        label: Option<String>,
    },
    Errorbar {
        x: Vec<f64>,
        y: Vec<f64>,
        xerr: Option<Vec<f64>>,
        yerr: Option<Vec<f64>>,
        label: Option<String>,
    },
    Stem {
        x: Vec<f64>,
        y: Vec<f64>,
        #[serde(default)]
        bottom: f64,
        label: Option<String>,
    },
}

impl Series {
    /// Plot this series on `surface`
    ///
    /// # Errors
    /// Returns the surface's error for bad input data
    pub(crate) fn plot(&self, surface: &Surface) -> Result<Rc<Container>, SurfaceError> {
        match self {
            Self::Bar {
                x,
                heights,
                width,
                bottom,
                yerr,
                label,
            } => {
                let opts = BarOptions {
                    width: *width,
                    bottom: *bottom,
                    yerr: yerr.clone(),
                    label: label.clone(),
                };
                surface.bar(x, heights, &opts)
            }
            Self::Hist { data, params } => Ok(surface.hist(data, params.clone())?.group),
            Self::Scatter {
                x,
                y,
                params,
                label,
            } => surface.scatter(x, y, params.clone(), label.as_deref()),
            Self::Errorbar {
                x,
                y,
                xerr,
                yerr,
                label,
            } => {
                let opts = ErrorbarOptions {
                    xerr: xerr.clone(),
                    yerr: yerr.clone(),
                    label: label.clone(),
                };
                surface.errorbar(x, y, &opts)
            }
            Self::Stem {
                x,
                y,
                bottom,
                label,
            } => surface.stem(x, y, *bottom, label.as_deref()),
        }
    }
}

impl FigureConfig {
    /// Parse a figure from TOML text
    ///
    /// # Errors
    /// Returns error if `text` is not a valid figure description
    pub(crate) fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Read and parse a figure file
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("failed to parse {}", path.display()))
    }

    /// Build a surface holding every series, in file order
    ///
    /// # Errors
    /// Returns error naming the first series that could not be plotted
    pub(crate) fn build(&self) -> Result<Surface> {
        let surface = Surface::new(self.surface.clone());
        for (index, series) in self.series.iter().enumerate() {
            series
                .plot(&surface)
                .with_context(|| format!("series #{index} could not be plotted"))?;
        }
        tracing::info!(
            series = self.series.len(),
            groups = surface.groups().len(),
            "figure built"
        );
        Ok(surface)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pg_container::Bins;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    const FIGURE: &str = r#"
[surface]
bins = 4
events_enabled = true

[[series]]
kind = "bar"
x = [1.0, 2.0]
heights = [3.0, 5.0]
yerr = [0.5, 0.5]
label = "heights"

[[series]]
kind = "hist"
data = [0.5, 1.5, 1.7]
[series.params]
nbins = 2
cumulative = true

[[series]]
kind = "stem"
x = [0.0, 1.0]
y = [2.0, 1.0]
label = "_stems"
"#;

    #[test]
    fn parses_tagged_series() {
        let figure = FigureConfig::from_toml(FIGURE).unwrap();
        assert_eq!(figure.surface.bins, 4);
        assert!(figure.surface.events_enabled);
        assert_eq!(figure.series.len(), 3);
        match &figure.series[1] {
            Series::Hist { data, params } => {
                assert_eq!(data, &vec![0.5, 1.5, 1.7]);
                assert_eq!(params.nbins, Some(Bins::Count(2)));
                assert_eq!(params.cumulative, Some(true));
            }
            other => panic!("expected hist, got {other:?}"),
        }
    }

    #[test]
    fn empty_figure_uses_defaults() {
        let figure = FigureConfig::from_toml("").unwrap();
        assert_eq!(figure, FigureConfig::default());
    }

    #[test]
    fn unknown_kind_rejected() {
        let text = "[[series]]\nkind = \"pie\"\nx = [1.0]\n";
        assert!(FigureConfig::from_toml(text).is_err());
    }

    #[test]
    fn build_attaches_every_group() {
        let surface = FigureConfig::from_toml(FIGURE).unwrap().build().unwrap();
        // bar, its error bars, hist, stem
        assert_eq!(surface.groups().len(), 4);
        assert!(surface.groups().iter().all(|g| g.events_enabled()));
        let legend: Vec<_> = surface.legend_entries().into_iter().map(|(l, _)| l).collect();
        assert_eq!(legend, vec!["heights"]);
    }

    #[test]
    fn build_reports_failing_series() {
        let text = "[[series]]\nkind = \"stem\"\nx = [1.0, 2.0]\ny = [1.0]\n";
        let err = FigureConfig::from_toml(text).unwrap().build().unwrap_err();
        assert_eq!(err.to_string(), "series #0 could not be plotted");
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(FIGURE.as_bytes()).unwrap();
        let figure = FigureConfig::load(file.path()).unwrap();
        assert_eq!(figure.series.len(), 3);

        let missing = file.path().with_extension("missing");
        assert!(FigureConfig::load(&missing).is_err());
    }
}
