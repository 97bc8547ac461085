use ratatui::{prelude::*, widgets::*};

use crate::messages::render::{ChapterLine, PageCheck};

/// Renders tabs
pub fn render_tabs<'a>(titles: &[&'a str], selected: usize) -> Tabs<'a> {
    let titles: Vec<Line> = titles.iter().map(|t| Line::from(*t)).collect();

    Tabs::new(titles)
        .select(selected)
        .style(Style::default().fg(Color::DarkGray))
        .highlight_style(Style::default().fg(Color::Yellow).bold())
        .divider("|")
}

/// Badge shown next to chapters published in the last week
pub fn new_badge() -> Span<'static> {
    Span::styled(" NEW ", Style::default().fg(Color::Black).bg(Color::Green).bold())
}

/// `Ch. 12 - Title  [Group]  01/02/2024 NEW`
pub fn chapter_line(chapter: &ChapterLine, indent: &str) -> Line<'static> {
    let mut spans = vec![
        Span::raw(indent.to_string()),
        Span::styled(chapter.label.clone(), Style::default().fg(Color::White)),
    ];
    if let Some(group) = &chapter.group {
        spans.push(Span::styled(
            format!("  [{}]", group),
            Style::default().fg(Color::Magenta),
        ));
    }
    spans.push(Span::styled(
        format!("  {}", chapter.date),
        Style::default().fg(Color::DarkGray),
    ));
    if chapter.is_new {
        spans.push(Span::raw(" "));
        spans.push(new_badge());
    }
    Line::from(spans)
}

/// `« 3 4 [5] 6 7 »` with the arrows dimmed at the edges
pub fn pagination_line(window: &[usize], page: usize, total_pages: usize) -> Line<'static> {
    let enabled = Style::default().fg(Color::Cyan);
    let disabled = Style::default().fg(Color::DarkGray);

    let mut spans = vec![Span::styled(
        "« ",
        if page > 1 { enabled } else { disabled },
    )];
    for &number in window {
        if number == page {
            spans.push(Span::styled(
                format!("[{}] ", number),
                Style::default().fg(Color::Yellow).bold(),
            ));
        } else {
            spans.push(Span::raw(format!("{} ", number)));
        }
    }
    spans.push(Span::styled(
        "»",
        if page < total_pages { enabled } else { disabled },
    ));
    Line::from(spans)
}

/// Color of a reader page check
pub fn page_state_color(state: PageCheck) -> Color {
    match state {
        PageCheck::Ok => Color::Green,
        PageCheck::FellBack => Color::Yellow,
        PageCheck::Unavailable => Color::Red,
        PageCheck::Checking | PageCheck::Unchecked => Color::DarkGray,
    }
}

pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
