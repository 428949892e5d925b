use anyhow::{anyhow, Context, Result};
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use crate::ir::{ChartData, ChartScales};
use crate::palette::parse_hex_color;
use crate::ChartOptions;

const TITLE_LINE_HEIGHT: i32 = 26;
const BAR_WIDTH: f64 = 0.8;

/// Id of the script block carrying the chart's data inside the document
pub const DATA_ELEMENT_ID: &str = "chart-data";

/// Render one stacked bar chart as a standalone HTML document
pub fn render_html(chart: &ChartData, scales: &ChartScales, options: &ChartOptions) -> Result<String> {
    let svg = render_svg(chart, scales, options)?;

    // Keep "</script>" inside the JSON from closing the block early
    let data = serde_json::to_string(chart)
        .context("Failed to serialize chart data")?
        .replace("</", "<\\/");

    Ok(format!(
        "<!DOCTYPE html>\n\
         <html>\n\
         <head>\n\
         <meta charset=\"utf-8\">\n\
         <title>{title}</title>\n\
         </head>\n\
         <body>\n\
         <figure>\n{svg}\n</figure>\n\
         <script type=\"application/json\" id=\"{id}\">{data}</script>\n\
         </body>\n\
         </html>\n",
        title = escape_html(&chart.question),
        svg = svg,
        id = DATA_ELEMENT_ID,
        data = data,
    ))
}

/// Pull the embedded chart data back out of a rendered document
pub fn read_chart_data(html: &str) -> Result<ChartData> {
    let open = format!("id=\"{}\">", DATA_ELEMENT_ID);
    let start = html
        .find(&open)
        .map(|i| i + open.len())
        .ok_or_else(|| anyhow!("Document has no embedded chart data"))?;
    let end = html[start..]
        .find("</script>")
        .map(|i| start + i)
        .ok_or_else(|| anyhow!("Unterminated chart data block"))?;

    let json = html[start..end].replace("<\\/", "</");
    serde_json::from_str(&json).context("Failed to parse embedded chart data")
}

/// Draw the chart with the SVG backend
pub fn render_svg(chart: &ChartData, scales: &ChartScales, options: &ChartOptions) -> Result<String> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (options.width, options.height))
            .into_drawing_area();
        root.fill(&WHITE).context("Failed to fill background")?;

        // Title block: one line per wrapped segment
        let title_height = chart.title_lines.len() as i32 * TITLE_LINE_HEIGHT + 12;
        let (title_area, plot_area) = root.split_vertically(title_height);
        let title_style = TextStyle::from(("sans-serif", 20).into_font())
            .pos(Pos::new(HPos::Center, VPos::Top));
        let center = options.width as i32 / 2;
        for (i, line) in chart.title_lines.iter().enumerate() {
            title_area
                .draw_text(line, &title_style, (center, 8 + i as i32 * TITLE_LINE_HEIGHT))
                .context("Failed to draw title")?;
        }

        let x_range = scales.x.domain.0..scales.x.domain.1;
        let y_range = scales.y.domain.0..scales.y.domain.1;

        let mut ctx = ChartBuilder::on(&plot_area)
            .margin(10)
            .x_label_area_size(50)
            .y_label_area_size(60)
            .build_cartesian_2d(x_range, y_range)
            .context("Failed to build chart")?;

        // x labels come from the scale's ticks, drawn below
        ctx.configure_mesh()
            .disable_x_mesh()
            .x_labels(0)
            .x_desc(options.x_title.as_str())
            .y_desc(options.y_title.as_str())
            .y_label_formatter(&|y| count_label(*y))
            .draw()
            .context("Failed to draw mesh")?;

        let tick_style = TextStyle::from(("sans-serif", 14).into_font())
            .pos(Pos::new(HPos::Center, VPos::Top));
        for (pos, label) in &scales.x.ticks {
            let (px, py) = ctx.backend_coord(&(*pos, scales.y.domain.0));
            root.draw(&PathElement::new(vec![(px, py), (px, py + 5)], BLACK))
                .context("Failed to draw tick mark")?;
            root.draw_text(label, &tick_style, (px, py + 8))
                .context("Failed to draw tick label")?;
        }

        // Legend heading goes in first so it sits above the entries
        if !options.legend_title.is_empty() {
            ctx.draw_series(std::iter::empty::<Rectangle<(f64, f64)>>())
                .context("Failed to draw legend title")?
                .label(options.legend_title.clone());
        }

        let half = BAR_WIDTH / 2.0;
        for series in &chart.series {
            let color = parse_hex_color(&series.color)?;

            let bars = (0..chart.answers.len())
                .filter(|&i| series.counts[i] > 0)
                .map(|i| {
                    Rectangle::new(
                        [
                            (chart.x[i] - half, series.y_start[i]),
                            (chart.x[i] + half, series.y_end[i]),
                        ],
                        color.filled(),
                    )
                });

            ctx.draw_series(bars)
                .context("Failed to draw bars")?
                .label(series.label.clone())
                .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));

            // Segment values, centered inside each segment
            let text_color = contrast_text(&color);
            let value_style = TextStyle::from(("sans-serif", 14).into_font())
                .color(text_color)
                .pos(Pos::new(HPos::Center, VPos::Center));

            let labels = (0..chart.answers.len())
                .filter(|&i| series.counts[i] > 0)
                .map(|i| {
                    let mid = (series.y_start[i] + series.y_end[i]) / 2.0;
                    Text::new(series.counts[i].to_string(), (chart.x[i], mid), value_style.clone())
                });

            ctx.draw_series(labels).context("Failed to draw value labels")?;
        }

        ctx.configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()
            .context("Failed to draw legend")?;

        root.present().context("Failed to present drawing")?;
    }

    Ok(svg)
}

/// Counts are whole numbers; fractional ticks stay unlabeled
fn count_label(y: f64) -> String {
    if (y - y.round()).abs() < 1e-9 {
        format!("{}", y.round() as i64)
    } else {
        String::new()
    }
}

/// Black text on light fills, white on dark ones
fn contrast_text(fill: &RGBColor) -> &'static RGBColor {
    let luminance = 0.299 * fill.0 as f64 + 0.587 * fill.1 as f64 + 0.114 * fill.2 as f64;
    if luminance > 150.0 { &BLACK } else { &WHITE }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
