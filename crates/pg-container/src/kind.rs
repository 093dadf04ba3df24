//! Specialized group records
//!
//! Each plotting call that produces a group records the parameters it was
//! called with. These records are plain data: every field is optional, set
//! once at construction, and never checked against the others.

use crate::container::Container;
use serde::{Deserialize, Serialize};
use std::rc::Rc;

/// Tag and data of a container's specialization
#[derive(Debug, Clone, Default)]
pub enum GroupKind {
    /// Plain group with no extra fields
    #[default]
    Plain,
    /// Bar chart group
    Bar(BarParams),
    /// Histogram group
    Hist(HistParams),
    /// Scatter group
    Scatter(ScatterParams),
    /// Error bar group
    Errorbar(ErrorbarParams),
    /// Stem plot group
    Stem,
}

impl GroupKind {
    /// Short lowercase name of the variant
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Plain => "plain",
            Self::Bar(_) => "bar",
            Self::Hist(_) => "hist",
            Self::Scatter(_) => "scatter",
            Self::Errorbar(_) => "errorbar",
            Self::Stem => "stem",
        }
    }
}

/// Fields of a bar group
#[derive(Debug, Clone, Default)]
pub struct BarParams {
    /// Error bars drawn on top of the bars
    pub errorbar: Option<Rc<Container>>,
}

/// Bin specification for a histogram
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Bins {
    /// Number of equal-width bins
    Count(usize),
    /// Explicit bin edges
    Edges(Vec<f64>),
}

/// Histogram drawing style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistType {
    Bar,
    BarStacked,
    Step,
    StepFilled,
}

/// Bar alignment relative to the bin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    Left,
    Mid,
    Right,
}

/// Bar orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Vertical,
    Horizontal,
}

/// Fields of a histogram group
#[derive(Debug, Clone, Default)]
pub struct HistParams {
    pub data: HistData,
    /// Error bars drawn on top of the bars
    pub errorbar: Option<Rc<Container>>,
}

/// Serializable histogram parameters
///
/// `label` is the label the caller asked for; it does not set the
/// container's own label.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistData {
    pub x: Option<Vec<f64>>,
    pub nbins: Option<Bins>,
    pub range: Option<(f64, f64)>,
    pub normed: Option<bool>,
    pub weights: Option<Vec<f64>>,
    pub cumulative: Option<bool>,
    pub bottom: Option<f64>,
    pub histtype: Option<HistType>,
    pub align: Option<Align>,
    pub orientation: Option<Orientation>,
    pub rwidth: Option<f64>,
    pub log: Option<bool>,
    pub color: Option<String>,
    pub label: Option<String>,
    pub stacked: Option<bool>,
}

/// Fields of a scatter group
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScatterParams {
    pub x: Option<Vec<f64>>,
    pub y: Option<Vec<f64>>,
    /// Marker sizes
    pub s: Option<Vec<f64>>,
    /// Marker colors
    pub c: Option<Vec<String>>,
    pub marker: Option<String>,
    pub cmap: Option<String>,
    pub norm: Option<String>,
    pub vmin: Option<f64>,
    pub vmax: Option<f64>,
    pub alpha: Option<f64>,
    pub linewidths: Option<Vec<f64>>,
    pub verts: Option<Vec<(f64, f64)>>,
}

/// Fields of an error bar group
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorbarParams {
    pub has_xerr: bool,
    pub has_yerr: bool,
}
