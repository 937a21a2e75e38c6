//! Horizon chart rendering.
//!
//! Every visible metric takes two terminal lines:
//!
//! ```text
//! ╔ GPU util %...................................4.0%| ╗
//! ╚ ▁▁▁  ▁    ▁▆▅▄ ▁▁▁      ▂ ▇▃▃▂█▃▇▁▃▂▁▁▂▁▁▃▃▂▁▂▄▄ ╝
//! ```
//!
//! The ruler line carries the title and, depending on the view mode, the
//! formatted value at the right edge (one) or at every ruler interval
//! (all) plus a trailing time ruler. Geometry is recomputed every frame,
//! so resizes just work.

use ratatui::prelude::*;

use strata_core::horizon::{AnsiColor, ColorBand};
use strata_core::presenters::Row;
use strata_core::{Presenter, ViewMode};

use super::app::App;

/// Columns between ruler value/time marks.
const RULER_INTERVAL: usize = 20;

fn color(c: AnsiColor) -> Color {
    if c < 0 { Color::Reset } else { Color::Indexed(c as u8) }
}

fn put(buf: &mut Buffer, area: Rect, x: usize, y: usize, ch: char, style: Style) {
    if x >= area.width as usize || y >= area.height as usize {
        return;
    }
    let pos = Position::new(area.left() + x as u16, area.top() + y as u16);
    if let Some(cell) = buf.cell_mut(pos) {
        cell.set_char(ch);
        cell.set_style(style);
    }
}

fn paint_line(buf: &mut Buffer, area: Rect, y: usize, line: &[char]) {
    for (x, &ch) in line.iter().enumerate() {
        put(buf, area, x, y, ch, Style::default());
    }
}

/// Column of the ruler mark `ago` samples back from the right edge.
fn mark_col(cols: usize, ago: usize) -> Option<usize> {
    cols.checked_sub(3 + ago)
}

/// Right-align `text` so it ends at the mark column, followed by a `|`.
/// Marks that would collide with the title are dropped.
fn place_mark(line: &mut [char], min_x: usize, ago: usize, text: &str) {
    let cols = line.len();
    let Some(col) = mark_col(cols, ago) else { return };
    let len = text.chars().count();
    if col >= cols || col < min_x + len + 1 {
        return;
    }
    line[col] = '|';
    for (i, ch) in text.chars().enumerate() {
        line[col - len + i] = ch;
    }
}

pub fn draw(f: &mut Frame, app: &App) {
    let area = f.area();
    if area.width < 1 || area.height < 1 {
        return;
    }
    let cols = area.width as usize;
    let rows = area.height as usize;
    let buf = f.buffer_mut();

    let mut y = 0usize;
    let mut skip = app.rows_off;
    'domains: for presenter in &app.presenters {
        let names = app.store.names_in_domain(presenter.domain());
        if names.is_empty() {
            continue;
        }
        let band = app.band_for(presenter.domain());
        for row in presenter.rows(&names) {
            if skip > 0 {
                skip -= 1;
                continue;
            }
            if y >= rows {
                break 'domains;
            }
            draw_row(buf, area, app, presenter.as_ref(), band, &row, y);
            y += 2;
        }
    }

    if app.view == ViewMode::All && y < rows {
        draw_time_ruler(buf, area, app, y);
    }
}

fn draw_row(
    buf: &mut Buffer,
    area: Rect,
    app: &App,
    presenter: &dyn Presenter,
    band: &ColorBand,
    row: &Row,
    y: usize,
) {
    let cols = area.width as usize;
    let indent = row.indent as usize;
    let chart_width = cols.saturating_sub(4 + indent);
    if chart_width == 0 {
        return;
    }
    let window = app.store.window(&row.metric, chart_width, app.cols_off);
    let scale = presenter.scale(&row.title, window.max);

    // Ruler line: indent, left border, title, dotted filler, value marks,
    // right border.
    let mut line: Vec<char> = vec!['.'; cols];
    for slot in line.iter_mut().take(indent.min(cols)) {
        *slot = ' ';
    }
    let header = format!("╔ {}", row.title);
    let mut title_end = indent;
    for (i, ch) in header.chars().enumerate() {
        if indent + i < cols {
            line[indent + i] = ch;
            title_end = indent + i;
        }
    }
    if cols >= 2 {
        line[cols - 2] = ' ';
        line[cols - 1] = '╗';
    }

    if app.view != ViewMode::Off {
        for ago in (0..chart_width).step_by(RULER_INTERVAL) {
            if ago >= window.filled {
                break;
            }
            let value = window.values[window.values.len() - 1 - ago];
            let text = presenter.format(&row.title, value, scale);
            place_mark(&mut line, title_end + 1, ago, &text);
            if app.view == ViewMode::One {
                break;
            }
        }
    }
    paint_line(buf, area, y, &line);

    // Chart line: left border, colored band cells, right border.
    let chart_y = y + 1;
    put(buf, area, indent, chart_y, '╚', Style::default());
    let x0 = indent + 2;
    for (i, &value) in window.values.iter().enumerate() {
        if value <= 0.0 {
            continue;
        }
        let cell = band.cell(value, scale);
        let style = Style::default().fg(color(cell.fg)).bg(color(cell.bg));
        put(buf, area, x0 + i, chart_y, cell.ch, style);
    }
    if cols >= 1 {
        put(buf, area, cols - 1, chart_y, '╝', Style::default());
    }
}

fn draw_time_ruler(buf: &mut Buffer, area: Rect, app: &App, y: usize) {
    let cols = area.width as usize;
    let mut line: Vec<char> = vec!['.'; cols];
    line[0] = '╚';
    if cols >= 2 {
        line[1] = ' ';
        line[cols - 2] = ' ';
        line[cols - 1] = '╝';
    }
    let chart_width = cols.saturating_sub(4);
    for ago in (0..chart_width).step_by(RULER_INTERVAL) {
        let secs = app.refresh_ms as f64 * (ago + app.cols_off) as f64 / 1000.0;
        place_mark(&mut line, 1, ago, &format!("-{secs:.2}s"));
    }
    paint_line(buf, area, y, &line);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mark_col_counts_back_from_right_border() {
        assert_eq!(mark_col(80, 0), Some(77));
        assert_eq!(mark_col(80, 20), Some(57));
        assert_eq!(mark_col(10, 40), None);
    }

    #[test]
    fn place_mark_right_aligns_value() {
        let mut line: Vec<char> = vec!['.'; 20];
        place_mark(&mut line, 0, 0, "42%");
        let s: String = line.iter().collect();
        assert_eq!(&s[14..18], "42%|");
        assert_eq!(&s[18..], "..");
    }

    #[test]
    fn place_mark_refuses_title_collision() {
        let mut line: Vec<char> = vec!['.'; 12];
        // Mark column is 9; a 9-char value would start inside the title.
        place_mark(&mut line, 4, 0, "123456789");
        assert!(line.iter().all(|&c| c == '.'));
    }
}
