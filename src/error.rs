/// Errors surfaced by the chart api and the options builder.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ChartError {
    /// The chart was used before the engine reported its first render.
    #[error("chart accessed before the first render")]
    NotRendered,
    /// No series or point carries the given identifier.
    #[error("no series or point with id `{0}`")]
    UnknownItem(String),
    /// The chart options are inconsistent.
    #[error("invalid chart options: {0}")]
    InvalidOptions(String),
}

/// Configuration mismatches that degrade the chart instead of failing it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ChartWarning {
    #[error("series `{series}` links to `{link}`, which does not resolve; the series is dropped")]
    UnresolvedLink { series: String, link: String },
    #[error("series `{series}` cannot attach to `{target}`; the series is dropped")]
    UnsupportedLinkTarget { series: String, target: String },
}
