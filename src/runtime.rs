// Runtime executor: table in, chart archive out

use crate::archive::{self, ArtifactNamer};
use crate::data::SurveyTable;
use crate::graph;
use crate::index;
use crate::ir::{Artifact, IndexEntry};
use crate::scale;
use crate::selection::ColumnRoles;
use crate::transform;
use crate::ChartOptions;
use anyhow::{Context, Result};
use std::io::Cursor;
use tracing::{debug, info};

/// Everything one run produces, before packaging
#[derive(Debug, Clone)]
pub struct ChartSet {
    pub charts: Vec<Artifact>,
    pub index: Vec<IndexEntry>,
}

/// Render one stacked bar chart per distinct question and return them,
/// plus the `file_name.xlsx` index, as a ZIP archive in memory.
///
/// The roles are expected to be validated already (see
/// [`ColumnRoles::validate`]); a column missing from the table still fails
/// here with "Column '...' not found".
pub fn render_survey_archive(
    table: &SurveyTable,
    roles: &ColumnRoles,
    options: &ChartOptions,
) -> Result<Cursor<Vec<u8>>> {
    let set = render_charts(table, roles, options)?;

    let mut artifacts = set.charts;
    artifacts.push(index::build_index(&set.index)?);

    let buffer = archive::package(&artifacts)?;
    info!(
        charts = set.index.len(),
        bytes = buffer.get_ref().len(),
        "Archive ready"
    );
    Ok(buffer)
}

/// Aggregate and render every question without packaging
pub fn render_charts(table: &SurveyTable, roles: &ColumnRoles, options: &ChartOptions) -> Result<ChartSet> {
    let aggregates = transform::aggregate_questions(table, roles)?;
    let table_groups = transform::table_age_groups(table, roles)?;
    info!(
        rows = table.len(),
        questions = aggregates.len(),
        age_groups = table_groups.len(),
        "Rendering survey charts"
    );

    let mut namer = ArtifactNamer::new(options.name_limit);
    let mut charts = Vec::with_capacity(aggregates.len());
    let mut entries = Vec::with_capacity(aggregates.len());

    for agg in &aggregates {
        let chart = transform::build_chart_data(agg, options, &table_groups);
        let scales = scale::build_scales(&chart, options.x_axis);
        let html = graph::render_html(&chart, &scales, options)
            .context(format!("Failed to render chart for question '{}'", agg.question))?;

        let file_name = namer.name_for(&agg.question);
        debug!(
            file_name = file_name.as_str(),
            answers = agg.answers.len(),
            groups = agg.groups.len(),
            "Rendered chart"
        );

        charts.push(Artifact {
            name: file_name.clone(),
            bytes: html.into_bytes(),
        });
        entries.push(IndexEntry {
            file_name,
            question: agg.question.clone(),
        });
    }

    Ok(ChartSet { charts, index: entries })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario_table() -> SurveyTable {
        SurveyTable::from_strs(
            &["age", "q", "a"],
            &[
                &["20s", "Q1", "1"],
                &["20s", "Q1", "1"],
                &["30s", "Q1", "2"],
                &["20s", "Q2", "5"],
                &["20s", "Q2", "5"],
                &["20s", "Q2", "5"],
            ],
        )
    }

    #[test]
    fn test_render_charts_scenario() {
        let set = render_charts(
            &scenario_table(),
            &ColumnRoles::new("age", "q", "a"),
            &ChartOptions::default(),
        )
        .unwrap();

        let names: Vec<&str> = set.charts.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Q1.html", "Q2.html"]);
        assert_eq!(
            set.index,
            vec![
                IndexEntry { file_name: "Q1.html".to_string(), question: "Q1".to_string() },
                IndexEntry { file_name: "Q2.html".to_string(), question: "Q2".to_string() },
            ]
        );
    }

    #[test]
    fn test_render_charts_missing_column() {
        let result = render_charts(
            &scenario_table(),
            &ColumnRoles::new("age", "question", "a"),
            &ChartOptions::default(),
        );
        let err = result.unwrap_err();
        assert!(err.to_string().contains("Column 'question' not found"));
    }

    #[test]
    fn test_render_survey_archive_rewound() {
        let buffer = render_survey_archive(
            &scenario_table(),
            &ColumnRoles::new("age", "q", "a"),
            &ChartOptions::default(),
        )
        .unwrap();
        assert_eq!(buffer.position(), 0);
        assert_eq!(&buffer.get_ref()[..2], b"PK");
    }
}
