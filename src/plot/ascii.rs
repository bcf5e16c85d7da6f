//! ASCII time-series plots for terminal output.
//!
//! Fixed-size character grid, deterministic output. Each country is drawn as a
//! line in its own glyph (`1`, `2`, ...) and listed in a legend underneath.

use chrono::NaiveDate;

use crate::domain::{Metric, View};

const GLYPHS: &[u8] = b"123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Render `metric` over time for every country in the view.
pub fn render_metric_plot(view: &View, metric: Metric, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let series: Vec<(&str, Vec<(NaiveDate, f64)>)> = view
        .countries()
        .into_iter()
        .map(|country| {
            let points = view
                .records
                .iter()
                .filter(|r| r.country() == country)
                .filter_map(|r| metric.value(r).map(|v| (r.date(), v)))
                .collect();
            (country, points)
        })
        .collect();

    let Some((d_min, d_max)) = date_range(&series) else {
        return format!("{}: no data\n", metric.title());
    };
    let (y_min, y_max) = y_range(&series).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);
    let span_days = (d_max - d_min).num_days().max(1) as f64;

    let mut grid = vec![vec![' '; width]; height];
    for (i, (_, points)) in series.iter().enumerate() {
        let glyph = GLYPHS[i % GLYPHS.len()] as char;
        let mut prev = None;
        for &(date, v) in points {
            let t = (date - d_min).num_days() as f64 / span_days;
            let x = map_x(t, width);
            let y = map_y(v, y_min, y_max, height);
            match prev {
                Some((x0, y0)) => draw_line(&mut grid, x0, y0, x, y, glyph),
                None => grid[y][x] = glyph,
            }
            prev = Some((x, y));
        }
    }

    let mut out = String::new();
    out.push_str(&format!(
        "{}: dates=[{d_min}, {d_max}] | y=[{y_min:.2}, {y_max:.2}]\n",
        metric.title()
    ));
    for row in grid {
        out.push_str(row.into_iter().collect::<String>().trim_end());
        out.push('\n');
    }
    for (i, (country, _)) in series.iter().enumerate() {
        out.push_str(&format!("  {} {country}\n", GLYPHS[i % GLYPHS.len()] as char));
    }
    out
}

fn date_range(series: &[(&str, Vec<(NaiveDate, f64)>)]) -> Option<(NaiveDate, NaiveDate)> {
    let dates = series.iter().flat_map(|(_, p)| p.iter().map(|(d, _)| *d));
    let min = dates.clone().min()?;
    let max = dates.max()?;
    Some((min, max))
}

fn y_range(series: &[(&str, Vec<(NaiveDate, f64)>)]) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for (_, points) in series {
        for &(_, y) in points {
            min_y = min_y.min(y);
            max_y = max_y.max(y);
        }
    }
    if min_y.is_finite() && max_y.is_finite() && max_y > min_y {
        Some((min_y, max_y))
    } else if min_y.is_finite() {
        Some((min_y - 0.5, min_y + 0.5))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(u: f64, width: usize) -> usize {
    let width = width.max(2);
    (u.clamp(0.0, 1.0) * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // Row 0 is the top of the plot.
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

/// Integer line drawing (Bresenham-ish). Later series overwrite earlier ones.
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0 && (y0 as usize) < grid.len() && x0 >= 0 && (x0 as usize) < grid[0].len() {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}
