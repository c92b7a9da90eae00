// Text line chart drawn with box-drawing characters
use crate::application::chart_renderer::ChartRenderer;

const OFFSET: usize = 3;
const LABEL_WIDTH: usize = 11;

#[derive(Debug, Clone, Copy, Default)]
pub struct AsciiChart;

impl AsciiChart {
    pub fn new() -> Self {
        Self
    }
}

impl ChartRenderer for AsciiChart {
    fn plot(&self, series: &[f64], height: usize) -> String {
        let finite = series.iter().copied().filter(|v| v.is_finite());
        let (min, max) = finite.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
        if min > max {
            return String::new();
        }

        let range = max - min;
        let height = if height == 0 { range.max(1.0) } else { height as f64 };
        let ratio = if range != 0.0 { height / range } else { 1.0 };
        let min_row = (min * ratio).round() as i64;
        let max_row = (max * ratio).round() as i64;
        let rows = (max_row - min_row) as usize;
        let width = series.len() + OFFSET;

        let mut grid = vec![vec![" ".to_string(); width]; rows + 1];

        // y axis with labels
        for y in min_row..=max_row {
            let row = (y - min_row) as usize;
            let label_value = if rows > 0 {
                max - (row as f64) * range / rows as f64
            } else {
                y as f64
            };
            let label = format!("{label_value:>width$.2}", width = LABEL_WIDTH);
            grid[row][0] = label;
            grid[row][OFFSET - 1] = "┤".to_string();
        }

        let level = |value: f64| {
            let value = if value.is_finite() { value } else { min };
            ((value * ratio).round() as i64 - min_row) as usize
        };

        grid[rows - level(series[0])][OFFSET - 1] = "┼".to_string();

        for (x, pair) in series.windows(2).enumerate() {
            let (y0, y1) = (level(pair[0]), level(pair[1]));
            let column = x + OFFSET;
            if y0 == y1 {
                grid[rows - y0][column] = "─".to_string();
                continue;
            }

            let (from, to) = if y0 > y1 { ("╮", "╰") } else { ("╯", "╭") };
            grid[rows - y1][column] = to.to_string();
            grid[rows - y0][column] = from.to_string();
            for y in y0.min(y1) + 1..y0.max(y1) {
                grid[rows - y][column] = "│".to_string();
            }
        }

        grid.iter()
            .map(|cells| cells.concat().trim_end().to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
