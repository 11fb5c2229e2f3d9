//! HTML rendering: the artist grid and the dashboard page around it

use crate::grid::{GridLayout, GridSize};
use crate::report::Report;
use crate::window::Window;
use std::io::{self, Write};

/// Write the grid as a standalone HTML document
pub fn write<W: Write>(writer: &mut W, report: &Report) -> io::Result<()> {
    writer.write_all(render_grid(report).as_bytes())
}

/// The grid document: one captioned image cell per artist, K columns wide
pub fn render_grid(report: &Report) -> String {
    let layout = &report.layout;
    let cells: String = report
        .artists
        .iter()
        .map(|a| {
            let name = escape(&a.entity_label);
            format!(
                r#"<div class="cell">
  <div class="item">
    <img src="{img}" alt="{name}">
    <div class="overlay-caption">{name}<br>{count} {plays}</div>
  </div>
</div>
"#,
                img = escape(&a.entity_image),
                name = name,
                count = a.count,
                plays = if a.count == 1 { "play" } else { "plays" },
            )
        })
        .collect();

    let empty = if report.artists.is_empty() {
        r#"<p class="empty">No listens in this window.</p>"#
    } else {
        ""
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<title>{title}</title>
<style>
    body {{ font-family: Arial, sans-serif; margin: 0; padding: {padding}px; }}
    .grid {{ display: grid; grid-template-columns: repeat({k}, {cell}px); grid-auto-rows: {cell}px; gap: {gap}px; justify-content: center; }}
    .cell {{ position: relative; width: 100%; height: 100%; }}
    .item {{ position: absolute; top: 0; left: 0; width: 100%; height: 100%; background-color: white; overflow: hidden; border-radius: 8px; }}
    .item img {{ width: 100%; height: 100%; object-fit: contain; }}
    .overlay-caption {{ position: absolute; bottom: 0; left: 0; width: 100%; height: 20%; background: rgba(128, 128, 128, 0.5); color: #fff; font-size: 0.9em; padding: 4px 8px; box-sizing: border-box; text-align: left; display: flex; flex-direction: column; justify-content: center; align-items: flex-start; overflow: hidden; }}
    .empty {{ text-align: center; color: #888; }}
</style>
</head>
<body>
{empty}<div class="grid">
{cells}</div>
</body>
</html>
"#,
        title = escape(&report.title()),
        padding = layout.padding,
        k = report.grid,
        cell = layout.cell_size,
        gap = layout.gap,
        empty = empty,
        cells = cells,
    )
}

/// The interactive page: both selectors, the heading, and the grid framed
/// at exactly its own height so no scrollbar appears
pub fn render_dashboard(grid: GridSize, window: Window, layout: &GridLayout) -> String {
    let grid_options: String = GridSize::ALL
        .iter()
        .map(|g| {
            format!(
                r#"<option value="{0}"{1}>{0}</option>"#,
                g,
                if *g == grid { " selected" } else { "" }
            )
        })
        .collect();

    let window_options: String = Window::ALL
        .iter()
        .map(|w| {
            format!(
                r#"<option value="{}"{}>{}</option>"#,
                w.key(),
                if *w == window { " selected" } else { "" },
                w.label()
            )
        })
        .collect();

    let query = format!("grid={}&amp;window={}", grid, window.key());

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{title}</title>
<style>
    body {{ font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Helvetica, Arial, sans-serif; margin: 0; padding: 1rem 2rem; }}
    .controls {{ display: grid; grid-template-columns: 1fr 1fr; gap: 1rem; }}
    .controls label {{ display: block; font-size: 0.875rem; color: #555; margin-bottom: 0.25rem; }}
    .controls select {{ width: 100%; padding: 0.5rem; font-size: 1rem; }}
    iframe {{ border: none; width: 100%; }}
</style>
</head>
<body>
<form class="controls" method="get" action="/">
    <div>
        <label for="grid">Select grid size</label>
        <select id="grid" name="grid" onchange="this.form.submit()">{grid_options}</select>
    </div>
    <div>
        <label for="window">Select timeframe</label>
        <select id="window" name="window" onchange="this.form.submit()">{window_options}</select>
    </div>
    <noscript><button type="submit">Show</button></noscript>
</form>
<h1>{title}</h1>
<iframe src="/grid?{query}" height="{height}" scrolling="no"></iframe>
</body>
</html>
"#,
        title = escape(&crate::report::title(grid, window)),
        grid_options = grid_options,
        window_options = window_options,
        query = query,
        height = layout.frame_height(grid),
    )
}

/// Escape text for HTML body and attribute positions
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
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
