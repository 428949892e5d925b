use crate::data::{format_number, parse_finite};
use crate::ir::{AxisScale, ChartData, ChartScales};
use crate::XAxisMode;

/// Build the axis scales for one chart
pub fn build_scales(chart: &ChartData, mode: XAxisMode) -> ChartScales {
    ChartScales {
        x: build_x_scale(chart, mode),
        y: build_y_scale(chart),
    }
}

fn build_x_scale(chart: &ChartData, mode: XAxisMode) -> AxisScale {
    match mode {
        XAxisMode::Likert5 => AxisScale {
            domain: (0.5, 5.5),
            ticks: (1..=5).map(|i| (i as f64, i.to_string())).collect(),
        },
        XAxisMode::Observed => {
            // Ranked answers keep their own text
            let at_values = chart
                .answers
                .iter()
                .zip(&chart.x)
                .all(|(a, p)| parse_finite(a) == Some(*p));

            let mut ticks: Vec<(f64, String)> = Vec::new();
            for (pos, answer) in chart.x.iter().zip(&chart.answers) {
                if !ticks.iter().any(|(p, _)| p == pos) {
                    let label = if at_values { format_number(*pos) } else { answer.clone() };
                    ticks.push((*pos, label));
                }
            }
            ticks.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

            let domain = match (ticks.first(), ticks.last()) {
                (Some(first), Some(last)) => (first.0 - 0.5, last.0 + 0.5),
                _ => (0.5, 1.5),
            };
            AxisScale { domain, ticks }
        }
    }
}

fn build_y_scale(chart: &ChartData) -> AxisScale {
    let max = chart.max_stack();
    let top = if max <= 0.0 { 1.0 } else { max * 1.1 };
    AxisScale {
        domain: (0.0, top),
        ticks: Vec::new(),
    }
}
