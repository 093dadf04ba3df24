//! Plotting calls that build specialized groups
//!
//! Each call creates the primitives for one series, wraps them in the
//! matching [`Container`] specialization and attaches the group.

use crate::error::{check_len, SurfaceError};
use crate::primitive::PrimitiveKind;
use crate::surface::Surface;
use pg_container::{
    Align, ArtistRef, BarParams, Bins, Container, HistData, HistParams, Member, Orientation,
    ScatterParams,
};
use std::rc::Rc;

/// Options for [`Surface::bar`]
#[derive(Debug, Clone, Default)]
pub struct BarOptions {
    /// Bar width; the surface default applies when unset
    pub width: Option<f64>,
    /// Baseline of every bar
    pub bottom: f64,
    /// Symmetric vertical error per bar
    pub yerr: Option<Vec<f64>>,
    pub label: Option<String>,
}

/// Options for [`Surface::errorbar`]
#[derive(Debug, Clone, Default)]
pub struct ErrorbarOptions {
    /// Symmetric horizontal error per point
    pub xerr: Option<Vec<f64>>,
    /// Symmetric vertical error per point
    pub yerr: Option<Vec<f64>>,
    pub label: Option<String>,
}

/// Result of [`Surface::hist`]
#[derive(Debug, Clone)]
pub struct Histogram {
    /// Value of each bin (after density and cumulative handling)
    pub counts: Vec<f64>,
    /// Bin edges, one more than `counts`
    pub edges: Vec<f64>,
    /// Attached histogram group
    pub group: Rc<Container>,
}

fn labeled(container: Container, label: Option<&str>) -> Container {
    match label {
        Some(l) => container.with_label(l),
        None => container,
    }
}

fn rect(x0: f64, y0: f64, width: f64, height: f64, orientation: Orientation) -> Vec<(f64, f64)> {
    let corners = [
        (x0, y0),
        (x0 + width, y0),
        (x0 + width, y0 + height),
        (x0, y0 + height),
    ];
    match orientation {
        Orientation::Vertical => corners.to_vec(),
        Orientation::Horizontal => corners.iter().map(|&(a, b)| (b, a)).collect(),
    }
}

impl Surface {
    /// Bar chart: one patch per `(x, height)` pair
    ///
    /// With `yerr`, an error bar group is attached as well and recorded on
    /// the bar group.
    ///
    /// # Errors
    /// Returns error if inputs are empty or their lengths disagree
    pub fn bar(
        &self,
        x: &[f64],
        heights: &[f64],
        opts: &BarOptions,
    ) -> Result<Rc<Container>, SurfaceError> {
        if x.is_empty() {
            return Err(SurfaceError::EmptyData("bar"));
        }
        check_len("bar heights", x.len(), heights.len())?;
        if let Some(yerr) = &opts.yerr {
            check_len("bar yerr", x.len(), yerr.len())?;
        }
        let width = opts.width.unwrap_or(self.config().bar_width);

        let patches: Vec<ArtistRef> = x
            .iter()
            .zip(heights)
            .map(|(&xi, &h)| {
                self.add_artist(
                    PrimitiveKind::Patch,
                    rect(xi - width / 2.0, opts.bottom, width, h, Orientation::Vertical),
                )
            })
            .collect();

        let errorbar = match &opts.yerr {
            Some(yerr) => {
                let tops: Vec<f64> = heights.iter().map(|h| h + opts.bottom).collect();
                let eb_opts = ErrorbarOptions {
                    yerr: Some(yerr.clone()),
                    label: Some("_nolegend_".to_string()),
                    ..ErrorbarOptions::default()
                };
                Some(self.errorbar(x, &tops, &eb_opts)?)
            }
            None => None,
        };

        let group = labeled(
            Container::bar(patches, BarParams { errorbar }),
            opts.label.as_deref(),
        );
        Ok(self.add_container(group))
    }

    /// Error bars around `(x, y)`
    ///
    /// Members are `[data_line, [caplines..], [barlinecols..]]`.
    ///
    /// # Errors
    /// Returns error if inputs are empty or their lengths disagree
    pub fn errorbar(
        &self,
        x: &[f64],
        y: &[f64],
        opts: &ErrorbarOptions,
    ) -> Result<Rc<Container>, SurfaceError> {
        if x.is_empty() {
            return Err(SurfaceError::EmptyData("errorbar"));
        }
        check_len("errorbar y", x.len(), y.len())?;
        if let Some(xerr) = &opts.xerr {
            check_len("errorbar xerr", x.len(), xerr.len())?;
        }
        if let Some(yerr) = &opts.yerr {
            check_len("errorbar yerr", x.len(), yerr.len())?;
        }

        let points: Vec<(f64, f64)> = x.iter().copied().zip(y.iter().copied()).collect();
        let data_line = self.add_artist(PrimitiveKind::Line, points.clone());

        let mut caplines = Vec::new();
        let mut barlinecols = Vec::new();
        // (low, high) endpoints of each bar, per direction
        let mut directions: Vec<Vec<((f64, f64), (f64, f64))>> = Vec::new();
        if let Some(xerr) = &opts.xerr {
            directions.push(
                points
                    .iter()
                    .zip(xerr)
                    .map(|(&(px, py), e)| ((px - e, py), (px + e, py)))
                    .collect(),
            );
        }
        if let Some(yerr) = &opts.yerr {
            directions.push(
                points
                    .iter()
                    .zip(yerr)
                    .map(|(&(px, py), e)| ((px, py - e), (px, py + e)))
                    .collect(),
            );
        }
        for bars in directions {
            let lows = bars.iter().map(|(lo, _)| *lo).collect();
            let highs = bars.iter().map(|(_, hi)| *hi).collect();
            caplines.push(self.add_artist(PrimitiveKind::Marker, lows));
            caplines.push(self.add_artist(PrimitiveKind::Marker, highs));
            let segments = bars.iter().flat_map(|(lo, hi)| [*lo, *hi]).collect();
            barlinecols.push(self.add_artist(PrimitiveKind::Segment, segments));
        }

        let group = labeled(
            Container::errorbar(
                vec![
                    Member::Artist(data_line),
                    Member::seq(caplines),
                    Member::seq(barlinecols),
                ],
                opts.xerr.is_some(),
                opts.yerr.is_some(),
            ),
            opts.label.as_deref(),
        );
        Ok(self.add_container(group))
    }

    /// Histogram of `data`
    ///
    /// `params.nbins` defaults to the surface's bin count. `params.label`
    /// also becomes the group label.
    ///
    /// # Errors
    /// Returns error if `data` is empty, weights do not line up, or the
    /// bins/range cannot be used
    pub fn hist(&self, data: &[f64], params: HistData) -> Result<Histogram, SurfaceError> {
        if data.is_empty() {
            return Err(SurfaceError::EmptyData("hist"));
        }
        if let Some(weights) = &params.weights {
            check_len("hist weights", data.len(), weights.len())?;
        }
        let bins = params
            .nbins
            .clone()
            .unwrap_or(Bins::Count(self.config().bins));
        let edges = bin_edges(data, &bins, params.range)?;
        let mut counts = bin_counts(data, params.weights.as_deref(), &edges);
        let widths: Vec<f64> = edges.windows(2).map(|w| w[1] - w[0]).collect();

        let normed = params.normed.unwrap_or(false);
        if normed {
            let total: f64 = counts.iter().sum();
            if total > 0.0 {
                for (c, w) in counts.iter_mut().zip(&widths) {
                    *c /= total * w;
                }
            }
        }
        if params.cumulative.unwrap_or(false) {
            let mut acc = 0.0;
            for (c, w) in counts.iter_mut().zip(&widths) {
                acc += if normed { *c * w } else { *c };
                *c = acc;
            }
        }

        let bottom = params.bottom.unwrap_or(0.0);
        let rwidth = params.rwidth.unwrap_or(1.0);
        let align = params.align.unwrap_or(Align::Mid);
        let orientation = params.orientation.unwrap_or_default();
        let patches: Vec<ArtistRef> = counts
            .iter()
            .zip(edges.windows(2))
            .map(|(&count, edge)| {
                let width = (edge[1] - edge[0]) * rwidth;
                let center = match align {
                    Align::Left => edge[0],
                    Align::Mid => (edge[0] + edge[1]) / 2.0,
                    Align::Right => edge[1],
                };
                self.add_artist(
                    PrimitiveKind::Patch,
                    rect(center - width / 2.0, bottom, width, count, orientation),
                )
            })
            .collect();

        let label = params.label.clone();
        let record = HistParams {
            data: HistData {
                x: Some(data.to_vec()),
                nbins: Some(bins),
                ..params
            },
            errorbar: None,
        };
        let group = self.add_container(labeled(
            Container::hist(patches, record),
            label.as_deref(),
        ));
        Ok(Histogram {
            counts,
            edges,
            group,
        })
    }

    /// Scatter of `(x, y)` as a single point collection
    ///
    /// # Errors
    /// Returns error if inputs are empty or their lengths disagree
    pub fn scatter(
        &self,
        x: &[f64],
        y: &[f64],
        params: ScatterParams,
        label: Option<&str>,
    ) -> Result<Rc<Container>, SurfaceError> {
        if x.is_empty() {
            return Err(SurfaceError::EmptyData("scatter"));
        }
        check_len("scatter y", x.len(), y.len())?;
        if let Some(sizes) = &params.s {
            if sizes.len() != 1 {
                check_len("scatter sizes", x.len(), sizes.len())?;
            }
        }

        let points = x.iter().copied().zip(y.iter().copied()).collect();
        let collection = self.add_artist(PrimitiveKind::Collection, points);
        let record = ScatterParams {
            x: Some(x.to_vec()),
            y: Some(y.to_vec()),
            ..params
        };
        let group = labeled(
            Container::scatter(vec![Member::Artist(collection)], record),
            label,
        );
        Ok(self.add_container(group))
    }

    /// Stem plot: marker line, one stem per point, and a base line at `bottom`
    ///
    /// # Errors
    /// Returns error if inputs are empty or their lengths disagree
    pub fn stem(
        &self,
        x: &[f64],
        y: &[f64],
        bottom: f64,
        label: Option<&str>,
    ) -> Result<Rc<Container>, SurfaceError> {
        if x.is_empty() {
            return Err(SurfaceError::EmptyData("stem"));
        }
        check_len("stem y", x.len(), y.len())?;

        let points: Vec<(f64, f64)> = x.iter().copied().zip(y.iter().copied()).collect();
        let markerline = self.add_artist(PrimitiveKind::Marker, points.clone());
        let stemlines = points
            .iter()
            .map(|&(px, py)| self.add_artist(PrimitiveKind::Line, vec![(px, bottom), (px, py)]))
            .collect();
        let (lo, hi) = x
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        let baseline = self.add_artist(PrimitiveKind::Line, vec![(lo, bottom), (hi, bottom)]);

        let group = labeled(Container::stem(markerline, stemlines, baseline), label);
        Ok(self.add_container(group))
    }
}

fn bin_edges(data: &[f64], bins: &Bins, range: Option<(f64, f64)>) -> Result<Vec<f64>, SurfaceError> {
    match bins {
        Bins::Edges(edges) => {
            if edges.len() < 2 || edges.windows(2).any(|w| w[0] >= w[1]) {
                Err(SurfaceError::InvalidBins(
                    "edges must be strictly increasing with at least two values".to_string(),
                ))
            } else {
                Ok(edges.clone())
            }
        }
        Bins::Count(0) => Err(SurfaceError::InvalidBins(
            "bin count must be positive".to_string(),
        )),
        Bins::Count(n) => {
            let (lo, hi) = range.unwrap_or_else(|| {
                data.iter()
                    .filter(|v| v.is_finite())
                    .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                        (lo.min(v), hi.max(v))
                    })
            });
            if !lo.is_finite() || !hi.is_finite() || lo > hi {
                return Err(SurfaceError::InvalidBins(format!(
                    "cannot bin over range ({lo}, {hi})"
                )));
            }
            let (lo, hi) = if hi <= lo { (lo - 0.5, hi + 0.5) } else { (lo, hi) };
            #[allow(clippy::cast_precision_loss)]
            let step = (hi - lo) / *n as f64;
            #[allow(clippy::cast_precision_loss)]
            let mut edges: Vec<f64> = (0..=*n).map(|i| lo + step * i as f64).collect();
            edges[*n] = hi;
            Ok(edges)
        }
    }
}

/// Weighted count per bin; the last bin includes its right edge
fn bin_counts(data: &[f64], weights: Option<&[f64]>, edges: &[f64]) -> Vec<f64> {
    let nbins = edges.len() - 1;
    let mut counts = vec![0.0; nbins];
    let (lo, hi) = (edges[0], edges[nbins]);
    for (i, &v) in data.iter().enumerate() {
        if !(lo..=hi).contains(&v) {
            continue;
        }
        let weight = weights.map_or(1.0, |w| w[i]);
        let idx = edges
            .partition_point(|&e| e <= v)
            .saturating_sub(1)
            .min(nbins - 1);
        counts[idx] += weight;
    }
    counts
}
