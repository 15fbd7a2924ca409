use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use unicode_width::UnicodeWidthChar;

use super::host::TerminalHost;
use crate::sort::SortDirection;

/// Text for the status line
pub struct Status<'a> {
    pub file_name: &'a str,
    pub rows: usize,
    pub sort: Option<(&'a str, SortDirection)>,
    pub message: Option<&'a str>,
}

/// Header line, body, status line
fn split(area: Rect) -> [Rect; 3] {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1), Constraint::Length(1)])
        .split(area);
    [chunks[0], chunks[1], chunks[2]]
}

/// Where the grid body goes for a terminal of this size
pub fn body_area(size: Rect) -> Rect {
    split(size)[1]
}

pub fn render(frame: &mut Frame, host: &TerminalHost, status: &Status) {
    let [header_area, body, status_area] = split(frame.size());
    render_header(frame.buffer_mut(), host, header_area);
    render_body(frame.buffer_mut(), host, body);
    render_status_bar(frame, status, status_area);
}

fn sort_arrow(direction: Option<SortDirection>) -> &'static str {
    match direction {
        Some(SortDirection::Ascending) => " ▲",
        Some(SortDirection::Descending) => " ▼",
        None => "",
    }
}

/// Draw `text` into the span `[left, left + width)` of grid space, shifted by
/// `scroll` and clipped to `area`. The last cell is left blank as a separator.
#[allow(clippy::too_many_arguments)]
fn draw_span(buf: &mut Buffer, area: Rect, y: u16, left: u32, width: u32, scroll: u32, text: &str, style: Style) {
    let right = left + width;
    let view_left = scroll;
    let view_right = scroll + u32::from(area.width);
    if right <= view_left || left >= view_right {
        return;
    }
    let start = left.max(view_left);
    let end = right.min(view_right);
    let x = area.x + (start - view_left) as u16;
    let span = (end - start) as usize;

    // blank the whole span so the style covers it
    buf.set_stringn(x, y, " ".repeat(span), span, style);

    // a column partly scrolled off the left shows the tail of its text
    let skip = (start - left) as usize;
    let visible = span.min((width as usize).saturating_sub(1 + skip));
    if visible == 0 {
        return;
    }
    let mut shown = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = UnicodeWidthChar::width(ch).unwrap_or(0);
        if used < skip {
            used += w;
            continue;
        }
        if used + w > skip + visible {
            break;
        }
        shown.push(ch);
        used += w;
    }
    buf.set_stringn(x, y, &shown, visible, style);
}

fn render_header(buf: &mut Buffer, host: &TerminalHost, area: Rect) {
    let base = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    buf.set_style(area, base);
    for header in host.headers.iter().filter(|h| h.visible) {
        let style = if header.hover {
            base.bg(Color::DarkGray)
        } else {
            base
        };
        let text = format!("{}{}", header.text, sort_arrow(header.sort));
        draw_span(buf, area, area.y, header.left, header.width, host.header_scroll, &text, style);
    }
}

fn render_body(buf: &mut Buffer, host: &TerminalHost, area: Rect) {
    let (scroll_x, scroll_y) = host.scroll;
    let bottom = scroll_y + u32::from(area.height);
    // rows sit at index * 1, so only the visible slice needs drawing
    let visible = host.rows().enumerate().skip(scroll_y as usize).take(usize::from(area.height));
    for (index, row) in visible {
        if row.top < scroll_y || row.top >= bottom {
            continue;
        }
        let y = area.y + (row.top - scroll_y) as u16;
        let style = if host.is_focused(index) {
            Style::default().bg(Color::Blue).fg(Color::White).add_modifier(Modifier::BOLD)
        } else if row.selected {
            Style::default().bg(Color::DarkGray).fg(Color::White)
        } else if row.alternate {
            Style::default().fg(Color::Gray)
        } else {
            Style::default()
        };
        buf.set_style(Rect::new(area.x, y, area.width, 1), style);
        for (col, cell) in row.cells.iter().enumerate() {
            let Some(geometry) = host.columns.get(col).filter(|c| c.visible) else {
                continue;
            };
            draw_span(buf, area, y, geometry.left, geometry.width, scroll_x, cell, style);
        }
    }
}

fn render_status_bar(frame: &mut Frame, status: &Status, area: Rect) {
    let sort = match status.sort {
        Some((header, direction)) => format!("sorted by {}{}", header, sort_arrow(Some(direction))),
        None => "unsorted".to_string(),
    };
    let line = Line::from(vec![
        Span::styled(" VIEW ", Style::default().bg(Color::Blue).fg(Color::White).add_modifier(Modifier::BOLD)),
        Span::raw(" "),
        Span::raw(status.file_name.to_string()),
        Span::raw(format!("  {} rows  {}", status.rows, sort)),
        Span::raw("  "),
        Span::styled(status.message.unwrap_or("").to_string(), Style::default().fg(Color::Yellow)),
    ]);
    let bar = Paragraph::new(line).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(bar, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width).map(|x| buf.get(x, y).symbol().to_string()).collect()
    }

    #[test]
    fn test_span_is_clipped_and_separated() {
        let area = Rect::new(0, 0, 10, 1);
        let mut buf = Buffer::empty(area);
        draw_span(&mut buf, area, 0, 0, 4, 0, "abcdef", Style::default());
        draw_span(&mut buf, area, 0, 4, 8, 0, "ghijklmn", Style::default());
        assert_eq!(line(&buf, 0), "abc ghijkl");
    }

    #[test]
    fn test_span_scrolled_left_shows_tail() {
        let area = Rect::new(0, 0, 6, 1);
        let mut buf = Buffer::empty(area);
        draw_span(&mut buf, area, 0, 0, 8, 3, "abcdefgh", Style::default());
        assert_eq!(line(&buf, 0), "defg  ");
    }

    #[test]
    fn test_body_area_leaves_header_and_status_lines() {
        assert_eq!(body_area(Rect::new(0, 0, 80, 24)), Rect::new(0, 1, 80, 22));
    }
}
