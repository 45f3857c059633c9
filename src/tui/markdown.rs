//! Markdown rendering for the guidance pane.
//!
//! Thin wrapper around `tui-markdown` — converts markdown text to styled
//! ratatui `Line`s. The wellness agents like to answer with pipe-delimited
//! tables (which `tui-markdown` does not support), so table blocks are
//! intercepted and rendered as box-drawing tables.

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use unicode_width::UnicodeWidthStr;

/// Parse markdown text and return styled lines suitable for a `Paragraph`.
pub fn render_markdown(text: &str) -> Vec<Line<'static>> {
    let mut result = Vec::new();
    let mut prose = String::new();

    let lines: Vec<&str> = text.lines().collect();
    let mut i = 0;

    while i < lines.len() {
        if is_table_line(lines[i]) {
            if !prose.trim().is_empty() {
                result.extend(render_markdown_raw(&prose));
            }
            prose.clear();

            let mut table_lines = Vec::new();
            while i < lines.len() && is_table_line(lines[i]) {
                table_lines.push(lines[i]);
                i += 1;
            }
            result.extend(render_table_block(&table_lines));
        } else {
            prose.push_str(lines[i]);
            prose.push('\n');
            i += 1;
        }
    }

    if !prose.trim().is_empty() {
        result.extend(render_markdown_raw(&prose));
    }

    result
}

/// A line belongs to a markdown table if it starts with `|`.
fn is_table_line(line: &str) -> bool {
    line.trim_start().starts_with('|')
}

/// Parse and render a markdown pipe-delimited table as box-drawing art.
fn render_table_block(lines: &[&str]) -> Vec<Line<'static>> {
    if lines.is_empty() {
        return Vec::new();
    }

    // Parse rows: split each line on `|`, trim cells, drop separator rows.
    let mut rows: Vec<Vec<String>> = Vec::new();
    for line in lines {
        let trimmed = line.trim();
        let inner = trimmed.strip_prefix('|').unwrap_or(trimmed);
        let inner = inner.strip_suffix('|').unwrap_or(inner);

        let cells: Vec<String> = inner.split('|').map(|c| c.trim().to_string()).collect();

        let is_sep = cells.iter().all(|c| {
            let stripped = c.trim_matches(|ch: char| ch == '-' || ch == ':' || ch == ' ');
            stripped.is_empty() && !c.is_empty()
        });
        if !is_sep {
            rows.push(cells);
        }
    }

    if rows.is_empty() {
        return Vec::new();
    }

    // Column widths use Unicode display width so emojis and CJK align.
    let col_count = rows.iter().map(|r| r.len()).max().unwrap_or(0);
    let mut col_widths: Vec<usize> = vec![0; col_count];
    for row in &rows {
        for (j, cell) in row.iter().enumerate() {
            if j < col_count {
                col_widths[j] = col_widths[j].max(cell.width());
            }
        }
    }
    for w in &mut col_widths {
        *w = (*w).max(3);
    }

    let border_style = Style::default().fg(Color::DarkGray);
    let mut result = Vec::new();

    result.push(Line::from(Span::styled(
        build_border(&col_widths, '┌', '┬', '┐'),
        border_style,
    )));

    for (i, row) in rows.iter().enumerate() {
        let mut spans = vec![Span::styled("│", border_style)];
        for (j, width) in col_widths.iter().enumerate() {
            let cell = row.get(j).map(|s| s.as_str()).unwrap_or("");
            let pad = width.saturating_sub(cell.width());
            let padded = format!(" {}{} ", cell, " ".repeat(pad));
            let style = if i == 0 {
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            spans.push(Span::styled(padded, style));
            spans.push(Span::styled("│", border_style));
        }
        result.push(Line::from(spans));

        if i == 0 && rows.len() > 1 {
            result.push(Line::from(Span::styled(
                build_border(&col_widths, '├', '┼', '┤'),
                border_style,
            )));
        }
    }

    result.push(Line::from(Span::styled(
        build_border(&col_widths, '└', '┴', '┘'),
        border_style,
    )));

    result
}

/// Build a horizontal border line: left + (─×width + 2 padding)... + right
fn build_border(col_widths: &[usize], left: char, mid: char, right: char) -> String {
    let mut s = String::new();
    s.push(left);
    for (i, w) in col_widths.iter().enumerate() {
        for _ in 0..(w + 2) {
            s.push('─');
        }
        if i + 1 < col_widths.len() {
            s.push(mid);
        }
    }
    s.push(right);
    s
}

/// Render plain markdown via tui-markdown (no table interception).
fn render_markdown_raw(text: &str) -> Vec<Line<'static>> {
    let rendered = tui_markdown::from_str(text);
    rendered
        .lines
        .into_iter()
        .map(|line| {
            let spans: Vec<Span<'static>> = line
                .spans
                .into_iter()
                .map(|span| Span::styled(span.content.into_owned(), span.style))
                .collect();
            Line::from(spans)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines_to_text(lines: &[Line]) -> String {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn render_plain_text() {
        let lines = render_markdown("Stay hydrated and rest.");
        assert!(!lines.is_empty());
        assert!(lines_to_text(&lines).contains("Stay hydrated"));
    }

    #[test]
    fn render_heading_and_list() {
        let md = "# Wellness Plan\n\n- Sleep 8 hours\n- Drink water";
        let text = lines_to_text(&render_markdown(md));
        assert!(text.contains("Wellness Plan"));
        assert!(text.contains("Sleep 8 hours"));
    }

    #[test]
    fn render_table_as_box_drawing() {
        let md = "| Remedy | Frequency |\n|--------|----------|\n| Ginger tea | Twice daily |";
        let text = lines_to_text(&render_markdown(md));
        assert!(text.contains("Remedy"));
        assert!(text.contains("Ginger tea"));
        assert!(text.contains('┌'));
        assert!(text.contains('│'));
        assert!(text.contains('└'));
        // Header separator
        assert!(text.contains('├'));
        assert!(text.contains('┼'));
    }

    #[test]
    fn render_mixed_prose_and_table() {
        let md = "# Summary\n\nTry these:\n\n| A | B |\n|---|---|\n| x | y |\n\nGet well soon.";
        let text = lines_to_text(&render_markdown(md));
        assert!(text.contains("Summary"));
        assert!(text.contains("Try these"));
        assert!(text.contains('┌'));
        assert!(text.contains("Get well soon"));
    }

    #[test]
    fn render_empty() {
        let lines = render_markdown("");
        assert!(lines.len() <= 1);
    }

    #[test]
    fn table_line_detection() {
        assert!(is_table_line("| a | b |"));
        assert!(is_table_line("|---|---|"));
        assert!(!is_table_line("not a table"));
        assert!(!is_table_line("some | pipe | in text"));
    }

    #[test]
    fn build_border_works() {
        let b = build_border(&[5, 3], '┌', '┬', '┐');
        assert_eq!(b, "┌───────┬─────┐");
    }

    #[test]
    fn wide_characters_align() {
        // Emojis are double-width — every rendered line must come out the
        // same display width.
        let md = "| Step | Note |\n|---|---|\n| Hydrate | 💧💧 often |\n| Rest | 😴 early |";
        let lines = render_markdown(md);
        let widths: Vec<usize> = lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.width()).sum::<usize>())
            .collect();
        let first = widths[0];
        for (i, w) in widths.iter().enumerate() {
            assert_eq!(*w, first, "line {i} has width {w}, expected {first}");
        }
    }

    #[test]
    fn uneven_column_count_aligns() {
        let md = "| A | B |\n|---|---|\n| x | y | extra |";
        let lines = render_markdown(md);
        let widths: Vec<usize> = lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.width()).sum::<usize>())
            .collect();
        let first = widths[0];
        for w in &widths {
            assert_eq!(*w, first);
        }
    }

    #[test]
    fn header_only_table() {
        let md = "| Only | Header |\n|---|---|";
        let text = lines_to_text(&render_markdown(md));
        assert!(text.contains("Only"));
        assert!(text.contains('┌'));
        assert!(text.contains('└'));
    }
}
