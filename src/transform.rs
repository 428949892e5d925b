use anyhow::Result;
use std::collections::HashMap;
use crate::data::{parse_finite, SurveyTable};
use crate::ir::{ChartData, QuestionAggregate, SeriesData};
use crate::palette::ColorPalette;
use crate::selection::ColumnRoles;
use crate::{ChartOptions, ColorAssignment};

/// Column positions of the three roles
#[derive(Debug, Clone, Copy)]
struct RoleIndices {
    age: usize,
    question: usize,
    answer: usize,
}

impl RoleIndices {
    fn resolve(table: &SurveyTable, roles: &ColumnRoles) -> Result<Self> {
        Ok(Self {
            age: table.column_index(&roles.age_group)?,
            question: table.column_index(&roles.question)?,
            answer: table.column_index(&roles.answer)?,
        })
    }
}

/// Aggregate every distinct question, in first-seen order
pub fn aggregate_questions(table: &SurveyTable, roles: &ColumnRoles) -> Result<Vec<QuestionAggregate>> {
    let idx = RoleIndices::resolve(table, roles)?;

    // Partition row indices by question, remembering first-seen order
    let mut order: Vec<String> = Vec::new();
    let mut partitions: HashMap<&str, Vec<usize>> = HashMap::new();
    for row in 0..table.len() {
        let q = table.cell(row, idx.question);
        let rows = partitions.entry(q).or_insert_with(|| {
            order.push(q.to_string());
            Vec::new()
        });
        rows.push(row);
    }

    Ok(order
        .iter()
        .map(|q| aggregate_rows(table, idx, q, &partitions[q.as_str()]))
        .collect())
}

/// Count (answer, age group) cells over the given rows of one question
fn aggregate_rows(table: &SurveyTable, idx: RoleIndices, question: &str, rows: &[usize]) -> QuestionAggregate {
    let mut groups: Vec<String> = Vec::new();
    let mut answers: Vec<String> = Vec::new();
    let mut cells: HashMap<(&str, &str), u64> = HashMap::new();

    for &row in rows {
        let group = table.cell(row, idx.age);
        let answer = table.cell(row, idx.answer);
        if !groups.iter().any(|g| g == group) {
            groups.push(group.to_string());
        }
        if !answers.iter().any(|a| a == answer) {
            answers.push(answer.to_string());
        }
        *cells.entry((group, answer)).or_default() += 1;
    }

    sort_categories(&mut groups);
    sort_categories(&mut answers);

    // Dense fill: every (group, answer) pair gets a slot
    let counts = groups
        .iter()
        .map(|g| {
            answers
                .iter()
                .map(|a| cells.get(&(g.as_str(), a.as_str())).copied().unwrap_or(0))
                .collect()
        })
        .collect();

    QuestionAggregate {
        question: question.to_string(),
        answers,
        groups,
        counts,
    }
}

/// Sort numerically when every value is a finite number, otherwise lexicographically
fn sort_categories(categories: &mut [String]) {
    let numeric: Option<Vec<f64>> = categories.iter().map(|s| parse_finite(s)).collect();
    match numeric {
        Some(values) => {
            let mut keyed: Vec<(f64, String)> = values.into_iter().zip(categories.iter().cloned()).collect();
            // Ties ("1" vs "01") fall back to the text so the order is total
            keyed.sort_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
            for (slot, (_, value)) in categories.iter_mut().zip(keyed) {
                *slot = value;
            }
        }
        None => categories.sort(),
    }
}

/// Age groups across the whole table, in the same sorted order each chart stacks them
pub fn table_age_groups(table: &SurveyTable, roles: &ColumnRoles) -> Result<Vec<String>> {
    let col = table.column_index(&roles.age_group)?;
    let mut groups = table.distinct_values(col);
    sort_categories(&mut groups);
    Ok(groups)
}

/// Turn an aggregate into stacked, colored series ready for scaling and drawing.
///
/// `table_groups` is only consulted for [`ColorAssignment::ByLabel`].
pub fn build_chart_data(
    agg: &QuestionAggregate,
    options: &ChartOptions,
    table_groups: &[String],
) -> ChartData {
    let palette = ColorPalette::new(options.palette.clone());
    let color_map = match options.colors {
        ColorAssignment::Positional => palette.assign_colors(&agg.groups),
        ColorAssignment::ByLabel => palette.assign_colors(table_groups),
    };

    let mut stack_offsets = vec![0.0; agg.answers.len()];
    let mut series = Vec::with_capacity(agg.groups.len());

    // Series order is stacking order: first group sits at the bottom
    for (g, key) in agg.groups.iter().enumerate() {
        let counts = agg.counts[g].clone();
        let mut y_start = Vec::with_capacity(counts.len());
        let mut y_end = Vec::with_capacity(counts.len());
        for (a, &count) in counts.iter().enumerate() {
            let start = stack_offsets[a];
            let end = start + count as f64;
            stack_offsets[a] = end;
            y_start.push(start);
            y_end.push(end);
        }

        let color = color_map
            .get(key)
            .cloned()
            .unwrap_or_else(|| palette.color_at(g).to_string());

        series.push(SeriesData {
            key: key.clone(),
            label: legend_label(key, &options.legend_suffix),
            color,
            counts,
            y_start,
            y_end,
        });
    }

    ChartData {
        question: agg.question.clone(),
        title_lines: wrap_title(&agg.question, options.title_wrap),
        answers: agg.answers.clone(),
        x: answer_positions(&agg.answers),
        series,
    }
}

/// Axis position of each answer.
///
/// Answers sit at their numeric values when every answer is a finite number
/// and no two share a value. Otherwise every answer sits at its 1-based rank,
/// so two answers never land on the same slot.
pub fn answer_positions(answers: &[String]) -> Vec<f64> {
    let ranks = || -> Vec<f64> { (1..=answers.len()).map(|i| i as f64).collect() };

    let values: Option<Vec<f64>> = answers.iter().map(|a| parse_finite(a)).collect();
    match values {
        Some(values) => {
            let distinct = values
                .iter()
                .enumerate()
                .all(|(i, v)| !values[..i].contains(v));
            if distinct { values } else { ranks() }
        }
        None => ranks(),
    }
}

/// Age-group text before the first '-', plus the suffix ("20-29" -> "20代")
pub fn legend_label(group: &str, suffix: &str) -> String {
    let head = group.split('-').next().unwrap_or(group);
    format!("{}{}", head, suffix)
}

/// Hard-wrap every `width` characters, ignoring word boundaries
pub fn wrap_title(title: &str, width: usize) -> Vec<String> {
    let chars: Vec<char> = title.chars().collect();
    if chars.is_empty() {
        return vec![String::new()];
    }
    chars
        .chunks(width.max(1))
        .map(|chunk| chunk.iter().collect())
        .collect()
}
