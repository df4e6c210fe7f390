//! Chart configuration

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::date::Language;
use crate::ConfigError;

// ============================================================================
// View modes
// ============================================================================

/// Named time scale of the timeline axis
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ViewMode {
    #[serde(rename = "Quarter Day")]
    QuarterDay,
    #[serde(rename = "Half Day")]
    HalfDay,
    #[default]
    Day,
    Week,
    Month,
    Year,
}

impl ViewMode {
    pub const ALL: [ViewMode; 6] = [
        ViewMode::QuarterDay,
        ViewMode::HalfDay,
        ViewMode::Day,
        ViewMode::Week,
        ViewMode::Month,
        ViewMode::Year,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ViewMode::QuarterDay => "Quarter Day",
            ViewMode::HalfDay => "Half Day",
            ViewMode::Day => "Day",
            ViewMode::Week => "Week",
            ViewMode::Month => "Month",
            ViewMode::Year => "Year",
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ViewMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ViewMode::ALL
            .into_iter()
            .find(|mode| mode.name() == s)
            .ok_or_else(|| ConfigError::UnknownViewMode(s.to_string()))
    }
}

// ============================================================================
// Mount target
// ============================================================================

/// Element the chart is mounted on, given as `#id` or a bare id
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MountTarget {
    id: String,
}

impl MountTarget {
    pub fn parse(selector: &str) -> Result<Self, ConfigError> {
        let id = selector.trim();
        let id = id.strip_prefix('#').unwrap_or(id);

        let mut chars = id.chars();
        let valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(ConfigError::InvalidMountTarget(selector.to_string()));
        }

        Ok(Self { id: id.to_string() })
    }

    /// Element id, without the leading `#`
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for MountTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.id)
    }
}

// ============================================================================
// Options
// ============================================================================

/// How a column's cells are drawn and edited by the host
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    /// Read-only text
    #[default]
    Label,
    /// One of a fixed list of options
    Select,
    /// Free text input
    Text,
    /// Date picker; the value is shown with `dateFormat`
    Calendar,
}

impl ColumnKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Label => "label",
            Self::Select => "select",
            Self::Text => "text",
            Self::Calendar => "calendar",
        }
    }

    pub fn is_editable(self) -> bool {
        self != Self::Label
    }
}

/// An entry of a select column
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// A column of the left-hand table
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
    /// Field key looked up on each task
    pub key: String,
    /// Header text
    pub label: String,
    #[serde(default)]
    pub kind: ColumnKind,
    /// Choices of a `select` column
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<SelectOption>,
}

impl ColumnDef {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            kind: ColumnKind::Label,
            options: Vec::new(),
        }
    }

    pub fn kind(mut self, kind: ColumnKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn option(mut self, value: impl Into<String>, label: impl Into<String>) -> Self {
        self.options.push(SelectOption::new(value, label));
        self
    }

    /// Display text of a stored value; select columns show the option label
    pub fn display_value(&self, value: &str) -> String {
        match self.kind {
            ColumnKind::Select => self
                .options
                .iter()
                .find(|o| o.value == value)
                .map_or_else(|| value.to_string(), |o| o.label.clone()),
            _ => value.to_string(),
        }
    }
}

/// Chart options. Any subset deserializes over the defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GanttOptions {
    pub header_height: f64,
    /// Seed only; replaced from the scale table on every layout
    pub column_width: f64,
    /// Seed only; replaced from the scale table on every layout
    pub step: f64,
    pub bar_height: f64,
    pub bar_corner_radius: f64,
    pub arrow_curve: f64,
    pub padding: f64,
    /// Extra vertical space between rows
    pub row_spacing: f64,
    pub view_mode: ViewMode,
    pub view_modes: Vec<ViewMode>,
    pub date_format: String,
    pub language: String,
    pub custom_popup_html: Option<String>,
    pub columns: Vec<ColumnDef>,
    pub column_width_for_columns: f64,
}

impl Default for GanttOptions {
    fn default() -> Self {
        Self {
            header_height: 50.0,
            column_width: 30.0,
            step: 24.0,
            bar_height: 20.0,
            bar_corner_radius: 3.0,
            arrow_curve: 5.0,
            padding: 18.0,
            row_spacing: 20.0,
            view_mode: ViewMode::Day,
            view_modes: ViewMode::ALL.to_vec(),
            date_format: "YYYY-MM-DD".to_string(),
            language: "ja".to_string(),
            custom_popup_html: None,
            columns: Vec::new(),
            column_width_for_columns: 120.0,
        }
    }
}

impl GanttOptions {
    /// Check the options before a chart is built from them
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.language()?;

        let geometry = [
            ("headerHeight", self.header_height),
            ("columnWidth", self.column_width),
            ("step", self.step),
            ("barHeight", self.bar_height),
            ("columnWidthForColumns", self.column_width_for_columns),
        ];
        for (name, value) in geometry {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::InvalidOption(format!(
                    "{} must be positive, got {}",
                    name, value
                )));
            }
        }

        let non_negative = [
            ("barCornerRadius", self.bar_corner_radius),
            ("arrowCurve", self.arrow_curve),
            ("padding", self.padding),
            ("rowSpacing", self.row_spacing),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::InvalidOption(format!(
                    "{} must not be negative, got {}",
                    name, value
                )));
            }
        }

        if !self.view_modes.contains(&self.view_mode) {
            return Err(ConfigError::InvalidOption(format!(
                "viewMode '{}' is not listed in viewModes",
                self.view_mode
            )));
        }

        if let Some(column) = self.columns.iter().find(|c| c.key.trim().is_empty()) {
            return Err(ConfigError::InvalidOption(format!(
                "column '{}' has an empty key",
                column.label
            )));
        }
        if let Some(column) = self
            .columns
            .iter()
            .find(|c| c.kind == ColumnKind::Select && c.options.is_empty())
        {
            return Err(ConfigError::InvalidOption(format!(
                "select column '{}' has no options",
                column.key
            )));
        }

        Ok(())
    }

    pub fn language(&self) -> Result<Language, ConfigError> {
        self.language.parse()
    }

    /// Vertical distance between consecutive rows
    pub fn row_pitch(&self) -> f64 {
        self.bar_height + self.padding + self.row_spacing
    }
}
