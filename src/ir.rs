use serde::{Deserialize, Serialize};

// =============================================================================
// Phase 1: Aggregation
// =============================================================================

/// Response counts for one question, densely filled.
///
/// `counts[g][a]` is the number of rows answering `answers[a]` in age group
/// `groups[g]`; combinations never seen are explicit zeros.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionAggregate {
    pub question: String,
    pub answers: Vec<String>, // Sorted, numeric-aware
    pub groups: Vec<String>,  // First-seen order within this question
    pub counts: Vec<Vec<u64>>,
}

impl QuestionAggregate {
    /// Count for an (age group, answer) pair, zero if either is unknown
    pub fn count(&self, group: &str, answer: &str) -> u64 {
        let g = self.groups.iter().position(|k| k == group);
        let a = self.answers.iter().position(|k| k == answer);
        match (g, a) {
            (Some(g), Some(a)) => self.counts[g][a],
            _ => 0,
        }
    }

    /// Sum over all age groups for one answer column
    pub fn answer_total(&self, answer_idx: usize) -> u64 {
        self.counts.iter().map(|row| row[answer_idx]).sum()
    }
}

// =============================================================================
// Phase 2: Chart data (stacked, colored)
// =============================================================================

/// Everything needed to draw one question's chart. Also embedded as JSON in
/// the rendered document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartData {
    pub question: String,
    pub title_lines: Vec<String>,
    pub answers: Vec<String>,
    pub x: Vec<f64>, // Axis position of each answer
    pub series: Vec<SeriesData>,
}

impl ChartData {
    /// Height of the tallest stack
    pub fn max_stack(&self) -> f64 {
        (0..self.answers.len())
            .map(|i| self.series.iter().map(|s| s.counts[i] as f64).sum::<f64>())
            .fold(0.0, f64::max)
    }
}

/// One age group's segment of every stacked bar
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeriesData {
    pub key: String,   // Raw age-group value
    pub label: String, // Legend text
    pub color: String,
    pub counts: Vec<u64>,  // Per answer
    pub y_start: Vec<f64>, // Stack offsets
    pub y_end: Vec<f64>,
}

// =============================================================================
// Phase 3: Scaling
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct AxisScale {
    pub domain: (f64, f64),
    /// Explicit tick positions and labels; empty means automatic
    pub ticks: Vec<(f64, String)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartScales {
    pub x: AxisScale,
    pub y: AxisScale,
}

// =============================================================================
// Phase 4: Artifacts
// =============================================================================

/// A named file destined for the archive
#[derive(Debug, Clone)]
pub struct Artifact {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// One row of the index spreadsheet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub file_name: String,
    pub question: String,
}
