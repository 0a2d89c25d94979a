//! Chart options and the preprocessing applied before they reach the engine.
use iced::Color;

use crate::error::{ChartError, ChartWarning};
use crate::scene::SeriesKind;

/// Link value that attaches a series to the one right before it.
pub const LINK_PREVIOUS: &str = ":previous";

/// A single input data item.
#[derive(Debug, Clone, PartialEq)]
pub struct DataPoint {
    pub x: f64,
    /// `None` is an explicit gap.
    pub y: Option<f64>,
    /// Low/high interval for error ranges.
    pub range: Option<(f64, f64)>,
    pub id: Option<String>,
    pub name: Option<String>,
    pub visible: bool,
}

impl DataPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y: Some(y),
            range: None,
            id: None,
            name: None,
            visible: true,
        }
    }

    /// A point without a value.
    pub fn gap(x: f64) -> Self {
        Self {
            y: None,
            ..Self::new(x, 0.0)
        }
    }

    /// An interval point. The value is the interval midpoint.
    pub fn range(x: f64, low: f64, high: f64) -> Self {
        Self {
            range: Some((low, high)),
            ..Self::new(x, (low + high) * 0.5)
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }
}

impl From<[f64; 2]> for DataPoint {
    fn from([x, y]: [f64; 2]) -> Self {
        Self::new(x, y)
    }
}

impl From<(f64, f64)> for DataPoint {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

/// Options of one series.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesOptions {
    pub kind: SeriesKind,
    pub id: Option<String>,
    pub name: Option<String>,
    pub color: Color,
    pub data: Vec<DataPoint>,
    /// Target of an error range: a series id, a series name, or [`LINK_PREVIOUS`].
    pub linked_to: Option<String>,
    pub visible: bool,
    /// Position of a threshold line.
    pub value: Option<f64>,
}

impl SeriesOptions {
    pub fn new<P: Into<DataPoint>>(kind: SeriesKind, data: impl IntoIterator<Item = P>) -> Self {
        Self {
            kind,
            id: None,
            name: None,
            color: Color::from_rgb(0.3, 0.3, 0.9),
            data: data.into_iter().map(Into::into).collect(),
            linked_to: None,
            visible: true,
            value: None,
        }
    }

    pub fn line<P: Into<DataPoint>>(data: impl IntoIterator<Item = P>) -> Self {
        Self::new(SeriesKind::Line, data)
    }

    pub fn column<P: Into<DataPoint>>(data: impl IntoIterator<Item = P>) -> Self {
        Self::new(SeriesKind::Column, data)
    }

    pub fn scatter<P: Into<DataPoint>>(data: impl IntoIterator<Item = P>) -> Self {
        Self::new(SeriesKind::Scatter, data)
    }

    /// A pie from named segments.
    pub fn pie<S: Into<String>>(segments: impl IntoIterator<Item = (S, f64)>) -> Self {
        let data = segments
            .into_iter()
            .enumerate()
            .map(|(i, (name, value))| DataPoint::new(i as f64, value).with_name(name));
        Self::new(SeriesKind::Pie, data)
    }

    /// Error ranges as `(x, low, high)`, attached to the previous series.
    pub fn error_bar(data: impl IntoIterator<Item = (f64, f64, f64)>) -> Self {
        let data = data
            .into_iter()
            .map(|(x, low, high)| DataPoint::range(x, low, high));
        let mut series = Self::new(SeriesKind::ErrorBar, data);
        series.linked_to = Some(LINK_PREVIOUS.to_owned());
        series
    }

    pub fn x_threshold(value: f64) -> Self {
        let mut series = Self::new::<DataPoint>(SeriesKind::XThreshold, []);
        series.value = Some(value);
        series
    }

    pub fn y_threshold(value: f64) -> Self {
        let mut series = Self::new::<DataPoint>(SeriesKind::YThreshold, []);
        series.value = Some(value);
        series
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        let id = id.into();
        if !id.is_empty() {
            self.id = Some(id);
        }
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !name.is_empty() {
            self.name = Some(name);
        }
        self
    }

    pub fn with_color(mut self, color: impl Into<Color>) -> Self {
        self.color = color.into();
        self
    }

    pub fn linked_to(mut self, target: impl Into<String>) -> Self {
        self.linked_to = Some(target.into());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    fn label(&self) -> String {
        self.id
            .clone()
            .or_else(|| self.name.clone())
            .unwrap_or_else(|| format!("{:?}", self.kind))
    }

    fn validate(&self) -> Result<(), ChartError> {
        if let Some(point) = self.data.iter().find(|p| !p.x.is_finite()) {
            return Err(ChartError::InvalidOptions(format!(
                "series `{}` has a non-finite x value {}",
                self.label(),
                point.x
            )));
        }
        if self.kind.is_pie() && self.data.is_empty() {
            return Err(ChartError::InvalidOptions(format!(
                "pie series `{}` has no segments",
                self.label()
            )));
        }
        if self.kind.is_threshold() && !self.value.is_some_and(f64::is_finite) {
            return Err(ChartError::InvalidOptions(format!(
                "threshold series `{}` needs a finite value",
                self.label()
            )));
        }
        Ok(())
    }
}

/// Options of a whole chart.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChartOptions {
    pub series: Vec<SeriesOptions>,
    pub inverted: bool,
    pub x_title: Option<String>,
    pub y_title: Option<String>,
}

impl ChartOptions {
    pub fn builder() -> ChartOptionsBuilder {
        ChartOptionsBuilder::new()
    }
}

/// Builder for configuring and validating [`ChartOptions`].
///
/// # Example
///
/// ```ignore
/// let options = ChartOptions::builder()
///     .with_x_title("Time")
///     .add_series(SeriesOptions::line([[1.0, 11.0], [2.0, 12.0]]).with_name("Line series 1"))
///     .build()?;
/// ```
#[derive(Debug, Default)]
pub struct ChartOptionsBuilder {
    x_title: Option<String>,
    y_title: Option<String>,
    inverted: bool,
    series: Vec<SeriesOptions>,
}

impl ChartOptionsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_x_title(mut self, title: impl Into<String>) -> Self {
        let title = title.into();
        if !title.is_empty() {
            self.x_title = Some(title);
        }
        self
    }

    pub fn with_y_title(mut self, title: impl Into<String>) -> Self {
        let title = title.into();
        if !title.is_empty() {
            self.y_title = Some(title);
        }
        self
    }

    /// Swap the axes: x runs vertically.
    pub fn inverted(mut self, inverted: bool) -> Self {
        self.inverted = inverted;
        self
    }

    pub fn add_series(mut self, series: SeriesOptions) -> Self {
        self.series.push(series);
        self
    }

    pub fn build(self) -> Result<ChartOptions, ChartError> {
        for series in &self.series {
            series.validate()?;
        }
        Ok(ChartOptions {
            series: self.series,
            inverted: self.inverted,
            x_title: self.x_title,
            y_title: self.y_title,
        })
    }
}

/// A series that survived preprocessing.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedSeries<'a> {
    pub options: &'a SeriesOptions,
    /// Index into the resolved list.
    pub linked_to: Option<usize>,
}

/// Resolve error-range links. Unresolvable error ranges are dropped with one warning each.
pub fn resolve_series(options: &ChartOptions) -> (Vec<ResolvedSeries<'_>>, Vec<ChartWarning>) {
    let series = &options.series;
    let mut warnings = Vec::new();
    let mut targets: Vec<Option<usize>> = vec![None; series.len()];
    let mut kept = vec![true; series.len()];

    for (index, item) in series.iter().enumerate() {
        if !item.kind.is_error_range() {
            continue;
        }
        let link = item.linked_to.as_deref().unwrap_or_default();
        let target = if link == LINK_PREVIOUS {
            index.checked_sub(1)
        } else if link.is_empty() {
            None
        } else {
            series
                .iter()
                .position(|s| s.id.as_deref() == Some(link))
                .or_else(|| series.iter().position(|s| s.name.as_deref() == Some(link)))
        };
        let warning = match target {
            None => Some(ChartWarning::UnresolvedLink {
                series: item.label(),
                link: link.to_owned(),
            }),
            Some(target) => {
                let kind = series[target].kind;
                if kind.is_error_range() || kind.is_threshold() || kind.is_pie() {
                    Some(ChartWarning::UnsupportedLinkTarget {
                        series: item.label(),
                        target: series[target].label(),
                    })
                } else {
                    targets[index] = Some(target);
                    None
                }
            }
        };
        if let Some(warning) = warning {
            log::warn!("{warning}");
            warnings.push(warning);
            kept[index] = false;
        }
    }

    let mut output_index = vec![None; series.len()];
    let mut next = 0;
    for (index, keep) in kept.iter().enumerate() {
        if *keep {
            output_index[index] = Some(next);
            next += 1;
        }
    }

    let resolved = series
        .iter()
        .enumerate()
        .filter(|(index, _)| kept[*index])
        .map(|(index, options)| ResolvedSeries {
            options,
            linked_to: targets[index].and_then(|t| output_index[t]),
        })
        .collect();
    (resolved, warnings)
}
