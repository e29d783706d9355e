//! Structured canvas artifacts decoded from inline marker payloads.
//!
//! The payload vocabulary is closed: adding a kind means adding an
//! [`Artifact`] variant, and every render site has to match it.

use std::fmt;

use serde::Deserialize;
use serde_json::error::Category;
use serde_json::Number;
use thiserror::Error;

pub const TABLE_KIND: &str = "table";
pub const BAR_CHART_KIND: &str = "bar_chart";

/// A fully decoded artifact. Never partially populated.
#[derive(Debug, Clone, PartialEq)]
pub enum Artifact {
    Table(TableArtifact),
    BarChart(BarChartArtifact),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableArtifact {
    pub title: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarChartArtifact {
    pub title: String,
    pub series: Vec<BarPoint>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarPoint {
    pub label: String,
    pub value: f64,
}

/// Scalar table cell. Arrays and objects are rejected.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Text(String),
    Number(Number),
    Bool(bool),
    Empty,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Number(number) => write!(f, "{number}"),
            Self::Bool(value) => write!(f, "{value}"),
            Self::Empty => Ok(()),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

/// Why a marker payload did not produce an artifact.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("artifact payload is not valid JSON: {0}")]
    Json(#[source] serde_json::Error),

    /// Valid JSON of the wrong shape: not an object, an unknown or missing
    /// `type`, or a field of the wrong type.
    #[error("artifact payload has an unexpected shape: {0}")]
    Shape(#[source] serde_json::Error),

    #[error("{kind} artifact is missing `{field}`")]
    MissingField {
        kind: &'static str,
        field: &'static str,
    },

    #[error("{kind} artifact has invalid `{field}`: {reason}")]
    InvalidField {
        kind: &'static str,
        field: &'static str,
        reason: String,
    },
}

impl From<serde_json::Error> for ArtifactError {
    fn from(error: serde_json::Error) -> Self {
        match error.classify() {
            Category::Data => Self::Shape(error),
            Category::Io | Category::Syntax | Category::Eof => Self::Json(error),
        }
    }
}

/// Marker payload as the model writes it.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WireArtifact {
    Table(WireTable),
    BarChart(WireBarChart),
}

/// Flat `headers`/`rows`, or the same pair nested under `data`.
#[derive(Debug, Deserialize)]
struct WireTable {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    headers: Option<Vec<WireText>>,
    #[serde(default)]
    rows: Option<Vec<Vec<CellValue>>>,
    #[serde(default)]
    data: Option<WireTableData>,
}

#[derive(Debug, Deserialize)]
struct WireTableData {
    headers: Vec<WireText>,
    rows: Vec<Vec<CellValue>>,
}

/// Points under `series`, or under `data` as the backend sends them.
#[derive(Debug, Deserialize)]
struct WireBarChart {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    series: Option<Vec<WirePoint>>,
    #[serde(default)]
    data: Option<Vec<WirePoint>>,
}

#[derive(Debug, Deserialize)]
struct WirePoint {
    label: WireText,
    value: WireNumber,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireText {
    Text(String),
    Number(Number),
}

impl From<WireText> for String {
    fn from(text: WireText) -> Self {
        match text {
            WireText::Text(text) => text,
            WireText::Number(number) => number.to_string(),
        }
    }
}

// Models occasionally quote numbers; a numeric string is still a number.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireNumber {
    Number(f64),
    Text(String),
}

impl Artifact {
    /// Decodes the text found between the artifact markers.
    pub fn decode(payload: &str) -> Result<Self, ArtifactError> {
        match serde_json::from_str::<WireArtifact>(payload.trim())? {
            WireArtifact::Table(table) => table.into_artifact().map(Self::Table),
            WireArtifact::BarChart(chart) => chart.into_artifact().map(Self::BarChart),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Table(_) => TABLE_KIND,
            Self::BarChart(_) => BAR_CHART_KIND,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Self::Table(table) => &table.title,
            Self::BarChart(chart) => &chart.title,
        }
    }
}

impl WireTable {
    fn into_artifact(self) -> Result<TableArtifact, ArtifactError> {
        let (headers, rows) = match self.data {
            Some(data) => (data.headers, data.rows),
            None => (
                self.headers.ok_or(ArtifactError::MissingField {
                    kind: TABLE_KIND,
                    field: "headers",
                })?,
                self.rows.ok_or(ArtifactError::MissingField {
                    kind: TABLE_KIND,
                    field: "rows",
                })?,
            ),
        };

        Ok(TableArtifact {
            title: self.title.unwrap_or_default(),
            headers: headers.into_iter().map(String::from).collect(),
            rows,
        })
    }
}

impl WireBarChart {
    fn into_artifact(self) -> Result<BarChartArtifact, ArtifactError> {
        let points = self
            .series
            .or(self.data)
            .ok_or(ArtifactError::MissingField {
                kind: BAR_CHART_KIND,
                field: "series",
            })?;

        let series = points
            .into_iter()
            .enumerate()
            .map(|(index, point)| {
                let value = match point.value {
                    WireNumber::Number(value) => Some(value),
                    WireNumber::Text(text) => text.trim().parse::<f64>().ok(),
                }
                .filter(|value| value.is_finite())
                .ok_or_else(|| ArtifactError::InvalidField {
                    kind: BAR_CHART_KIND,
                    field: "series",
                    reason: format!("point {index} has no numeric `value`"),
                })?;

                Ok(BarPoint {
                    label: point.label.into(),
                    value,
                })
            })
            .collect::<Result<Vec<_>, ArtifactError>>()?;

        Ok(BarChartArtifact {
            title: self.title.unwrap_or_default(),
            series,
        })
    }
}
