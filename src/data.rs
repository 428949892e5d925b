use anyhow::{anyhow, Result};

/// A survey table held entirely in memory. Every cell is kept as its raw text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurveyTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl SurveyTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Build a table from string slices (handy for fixtures and tests)
    pub fn from_strs(headers: &[&str], rows: &[&[&str]]) -> Self {
        Self {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.headers.iter().any(|h| h == name)
    }

    /// Position of a column by exact header match
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| anyhow!("Column '{}' not found", name))
    }

    /// Cell at (row, column); short rows read as empty
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Distinct values of a column in first-seen order
    pub fn distinct_values(&self, col: usize) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        let mut values = Vec::new();
        for row in 0..self.rows.len() {
            let value = self.cell(row, col);
            if seen.insert(value) {
                values.push(value.to_string());
            }
        }
        values
    }

    /// First `n` rows, used for previews
    pub fn head(&self, n: usize) -> SurveyTable {
        SurveyTable {
            headers: self.headers.clone(),
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }

    /// Replace missing cells column by column.
    ///
    /// A column whose present cells all parse as numbers gets its mean;
    /// any other column gets the literal `0`.
    pub fn fill_nulls(&mut self) {
        for col in 0..self.headers.len() {
            let fill = match column_mean(&self.rows, col) {
                Some(mean) => format_number(mean),
                None => "0".to_string(),
            };

            for row in &mut self.rows {
                if row.len() <= col {
                    row.resize(col + 1, String::new());
                }
                if is_null(&row[col]) {
                    row[col] = fill.clone();
                }
            }
        }
    }

    /// Render rows as an aligned text grid
    pub fn to_text_grid(&self) -> String {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate().take(widths.len()) {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }

        let format_line = |cells: &[String]| -> String {
            widths
                .iter()
                .enumerate()
                .map(|(i, w)| {
                    let cell = cells.get(i).map(String::as_str).unwrap_or("");
                    let pad = w.saturating_sub(cell.chars().count());
                    format!("{}{}", cell, " ".repeat(pad))
                })
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_string()
        };

        let mut out = format_line(&self.headers);
        out.push('\n');
        for row in &self.rows {
            out.push_str(&format_line(row));
            out.push('\n');
        }
        out
    }
}

/// Cell texts read as missing, besides blanks
const NA_TOKENS: [&str; 18] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND",
    "1.#QNAN", "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

pub fn is_null(cell: &str) -> bool {
    let cell = cell.trim();
    cell.is_empty() || NA_TOKENS.contains(&cell)
}

/// Parse a cell as a finite number
pub fn parse_finite(cell: &str) -> Option<f64> {
    cell.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Mean of a column if it is numeric (at least one value, all values parse)
fn column_mean(rows: &[Vec<String>], col: usize) -> Option<f64> {
    let mut sum = 0.0;
    let mut count = 0usize;
    for row in rows {
        let cell = row.get(col).map(String::as_str).unwrap_or("");
        if is_null(cell) {
            continue;
        }
        let v = parse_finite(cell)?;
        sum += v;
        count += 1;
    }
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

/// Integral values print without a fractional part
pub fn format_number(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        v.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distinct_values_first_seen_order() {
        let table = SurveyTable::from_strs(
            &["q"],
            &[&["B"], &["A"], &["B"], &["C"], &["A"]],
        );
        assert_eq!(table.distinct_values(0), vec!["B", "A", "C"]);
    }

    #[test]
    fn test_column_not_found() {
        let table = SurveyTable::from_strs(&["a"], &[]);
        let err = table.column_index("b").unwrap_err();
        assert!(err.to_string().contains("Column 'b' not found"));
    }

    #[test]
    fn test_column_lookup_is_exact() {
        let table = SurveyTable::from_strs(&["Age", "age"], &[]);
        assert_eq!(table.column_index("age").unwrap(), 1);
    }

    #[test]
    fn test_fill_nulls_numeric_mean() {
        let mut table = SurveyTable::from_strs(
            &["score", "label"],
            &[&["1", "x"], &["", ""], &["4", "y"]],
        );
        table.fill_nulls();
        assert_eq!(table.rows[1], vec!["2.5", "0"]);
    }

    #[test]
    fn test_fill_nulls_integral_mean() {
        let mut table = SurveyTable::from_strs(&["n"], &[&["2"], &[" "], &["4"]]);
        table.fill_nulls();
        assert_eq!(table.rows[1][0], "3");
    }

    #[test]
    fn test_fill_nulls_na_tokens() {
        let mut table = SurveyTable::from_strs(
            &["a", "label"],
            &[&["1", "x"], &["NA", "null"], &["3", "#N/A"], &["nan", "y"]],
        );
        table.fill_nulls();
        assert_eq!(table.rows[1], vec!["2", "0"]);
        assert_eq!(table.rows[2][1], "0");
        assert_eq!(table.rows[3][0], "2");
    }

    #[test]
    fn test_infinite_values_make_column_text() {
        let mut table = SurveyTable::from_strs(&["a"], &[&["1"], &["inf"], &[""]]);
        table.fill_nulls();
        assert_eq!(table.rows[2][0], "0");
    }

    #[test]
    fn test_parse_finite() {
        assert_eq!(parse_finite(" 2.5 "), Some(2.5));
        assert_eq!(parse_finite("NaN"), None);
        assert_eq!(parse_finite("inf"), None);
        assert_eq!(parse_finite("x"), None);
    }

    #[test]
    fn test_fill_nulls_all_empty_column_gets_zero() {
        let mut table = SurveyTable::from_strs(&["n"], &[&[""], &[""]]);
        table.fill_nulls();
        assert_eq!(table.rows[0][0], "0");
        assert_eq!(table.rows[1][0], "0");
    }

    #[test]
    fn test_fill_nulls_pads_short_rows() {
        let mut table = SurveyTable::new(
            vec!["a".to_string(), "b".to_string()],
            vec![vec!["x".to_string()]],
        );
        table.fill_nulls();
        assert_eq!(table.rows[0], vec!["x", "0"]);
    }

    #[test]
    fn test_head_and_grid() {
        let table = SurveyTable::from_strs(&["a", "bb"], &[&["1", "2"], &["3", "4"]]);
        let head = table.head(1);
        assert_eq!(head.len(), 1);
        assert_eq!(head.to_text_grid(), "a  bb\n1  2\n");
    }
}
