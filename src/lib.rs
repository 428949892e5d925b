// Library exports for surveygraph

pub mod archive;
pub mod data;
pub mod graph;
pub mod index;
pub mod ingest;
pub mod palette;
pub mod runtime;
pub mod selection;

// Pipeline phases
pub mod ir;
pub mod scale;
pub mod transform;

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// How answer values are laid out on the x-axis
#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
pub enum XAxisMode {
    /// Five-point scale: ticks 1..5, domain [0.5, 5.5]
    #[serde(rename = "likert5")]
    #[default]
    Likert5,
    /// Ticks at the numeric answer values observed in each chart
    #[serde(rename = "observed")]
    Observed,
}

/// How age groups pick their palette slot
#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
pub enum ColorAssignment {
    /// Position of the group within its own chart
    #[serde(rename = "positional")]
    #[default]
    Positional,
    /// Position of the group across the whole table, stable between charts
    #[serde(rename = "by_label")]
    ByLabel,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartOptions {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default)]
    pub x_axis: XAxisMode,
    #[serde(default)]
    pub colors: ColorAssignment,
    #[serde(default = "default_palette")]
    pub palette: Vec<String>,
    #[serde(default = "default_x_title")]
    pub x_title: String,
    #[serde(default = "default_y_title")]
    pub y_title: String,
    #[serde(default = "default_legend_title")]
    pub legend_title: String,
    #[serde(default = "default_legend_suffix")]
    pub legend_suffix: String,
    #[serde(default = "default_title_wrap")]
    pub title_wrap: usize,
    #[serde(default = "default_name_limit")]
    pub name_limit: usize,
}

fn default_width() -> u32 { 800 }
fn default_height() -> u32 { 600 }
fn default_palette() -> Vec<String> { palette::SURVEY10.iter().map(|c| c.to_string()).collect() }
fn default_x_title() -> String { "評価".to_string() }
fn default_y_title() -> String { "回答数".to_string() }
fn default_legend_title() -> String { "年齢区分".to_string() }
fn default_legend_suffix() -> String { "代".to_string() }
fn default_title_wrap() -> usize { 40 }
fn default_name_limit() -> usize { 50 }

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            x_axis: XAxisMode::default(),
            colors: ColorAssignment::default(),
            palette: default_palette(),
            x_title: default_x_title(),
            y_title: default_y_title(),
            legend_title: default_legend_title(),
            legend_suffix: default_legend_suffix(),
            title_wrap: default_title_wrap(),
            name_limit: default_name_limit(),
        }
    }
}

impl ChartOptions {
    /// Load options from a JSON file; absent fields take their defaults
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .context(format!("Failed to read options file '{}'", path.display()))?;
        Self::from_json_str(&text)
            .context(format!("Invalid options file '{}'", path.display()))
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let options: ChartOptions = serde_json::from_str(text)?;
        if options.palette.is_empty() {
            anyhow::bail!("Palette must contain at least one color");
        }
        for color in &options.palette {
            palette::parse_hex_color(color)?;
        }
        if options.title_wrap == 0 || options.name_limit == 0 {
            anyhow::bail!("title_wrap and name_limit must be positive");
        }
        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_defaults_from_empty_json() {
        let options = ChartOptions::from_json_str("{}").unwrap();
        assert_eq!(options.width, 800);
        assert_eq!(options.x_axis, XAxisMode::Likert5);
        assert_eq!(options.colors, ColorAssignment::Positional);
        assert_eq!(options.palette.len(), 10);
        assert_eq!(options.title_wrap, 40);
        assert_eq!(options.name_limit, 50);
    }

    #[test]
    fn test_options_overrides() {
        let options = ChartOptions::from_json_str(
            r##"{"x_axis": "observed", "colors": "by_label", "palette": ["#000000"], "legend_suffix": ""}"##,
        )
        .unwrap();
        assert_eq!(options.x_axis, XAxisMode::Observed);
        assert_eq!(options.colors, ColorAssignment::ByLabel);
        assert_eq!(options.palette, vec!["#000000"]);
        assert_eq!(options.legend_suffix, "");
    }

    #[test]
    fn test_options_reject_bad_palette() {
        assert!(ChartOptions::from_json_str(r#"{"palette": []}"#).is_err());
        assert!(ChartOptions::from_json_str(r#"{"palette": ["blue"]}"#).is_err());
    }
}
