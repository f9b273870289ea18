use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use unicode_width::UnicodeWidthChar;
use crate::app::App;
use crate::conversation::GREETING;
use crate::state::Role;

/// Parse a line of text and convert **bold** markdown to styled spans
fn parse_markdown_line(text: &str) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut rest = text;

    while let Some(start) = rest.find("**") {
        let after_open = &rest[start + 2..];
        let Some(end) = after_open.find("**") else {
            break;
        };
        if end == 0 {
            // "****" has nothing to embolden
            break;
        }

        if start > 0 {
            spans.push(Span::raw(rest[..start].to_string()));
        }
        spans.push(Span::styled(
            after_open[..end].to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ));
        rest = &after_open[end + 2..];
    }

    if !rest.is_empty() {
        spans.push(Span::raw(rest.to_string()));
    }

    Line::from(spans)
}

fn role_style(role: Role) -> Style {
    let color = match role {
        Role::User => Color::Cyan,
        Role::Assistant => Color::Yellow,
        Role::Error => Color::Red,
    };
    Style::default().fg(color).add_modifier(Modifier::BOLD)
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, chat, input, footer
    let [header_area, chat_area, input_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(3),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);
    render_chat(app, frame, chat_area);
    render_input(app, frame, input_area);
    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let header = Line::from(vec![
        Span::styled(" AI Chatbot ", Style::default().fg(Color::Black).bg(Color::Cyan)),
        Span::styled(format!("  {}", app.endpoint), Style::default().fg(Color::DarkGray)),
    ]);
    frame.render_widget(Paragraph::new(header), area);
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    let chat_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Conversation ");

    // Remember inner size for scroll math
    let inner = chat_block.inner(area);
    app.chat_height = inner.height;
    app.chat_width = inner.width;

    let pending = app.conversation.is_pending();
    let transcript = app.conversation.transcript();

    let chat_text = if transcript.is_empty() && !pending {
        Text::from(Span::styled(GREETING, Style::default().fg(Color::DarkGray)))
    } else {
        let mut lines: Vec<Line> = Vec::new();

        for msg in transcript {
            lines.push(Line::from(Span::styled(
                format!("{}:", msg.role().display_name()),
                role_style(msg.role()),
            )));
            match msg.role() {
                Role::Assistant => {
                    for line in msg.text().lines() {
                        lines.push(parse_markdown_line(line));
                    }
                }
                _ => {
                    for line in msg.text().lines() {
                        lines.push(Line::from(line.to_string()));
                    }
                }
            }
            lines.push(Line::default());
        }

        if pending {
            lines.push(Line::from(Span::styled("AI:", role_style(Role::Assistant))));
            // Animated ellipsis: cycles through ".", "..", "..."
            let dots = ".".repeat((app.animation_frame as usize) + 1);
            lines.push(Line::from(Span::styled(
                format!("Thinking{}", dots),
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            )));
        }

        Text::from(lines)
    };

    let chat = Paragraph::new(chat_text)
        .block(chat_block)
        .wrap(Wrap { trim: false })
        .scroll((app.chat_scroll, 0));

    frame.render_widget(chat, area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let border_color = if app.conversation.is_pending() { Color::DarkGray } else { Color::Cyan };
    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(" Type your message... ");

    let width = area.width.saturating_sub(2) as usize;
    let (visible, offset) = draft_tail(app.conversation.draft(), width);
    let cursor_x = area.x + 1 + offset;

    frame.render_widget(Paragraph::new(visible).block(input_block), area);
    frame.set_cursor_position((cursor_x, area.y + 1));
}

/// The end of `draft` that fits in `width` terminal cells with one cell
/// left for the cursor, plus its display width.
fn draft_tail(draft: &str, width: usize) -> (String, u16) {
    let budget = width.saturating_sub(1);
    let mut used = 0;
    let mut start = draft.len();

    for (idx, c) in draft.char_indices().rev() {
        let w = c.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        start = idx;
    }

    (draft[start..].to_string(), used as u16)
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let footer = match &app.status {
        Some(status) => Line::from(Span::styled(status.clone(), Style::default().fg(Color::Yellow))),
        None => Line::from(Span::styled(
            "Enter send · ↑/↓ PgUp/PgDn scroll · Ctrl-L clear · Esc quit",
            Style::default().fg(Color::DarkGray),
        )),
    };
    frame.render_widget(Paragraph::new(footer), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_bold_markdown_is_styled() {
        let line = parse_markdown_line("Wear **linen** in summer");
        assert_eq!(line.spans.len(), 3);
        assert_eq!(line.spans[1].content, "linen");
        assert!(line.spans[1].style.add_modifier.contains(Modifier::BOLD));
        assert_eq!(plain(&line), "Wear linen in summer");
    }

    #[test]
    fn test_unclosed_bold_is_literal() {
        let line = parse_markdown_line("2 ** 3 is not markdown");
        assert_eq!(plain(&line), "2 ** 3 is not markdown");
    }

    #[test]
    fn test_short_draft_fits() {
        assert_eq!(draft_tail("hello", 20), ("hello".to_string(), 5));
    }

    #[test]
    fn test_long_draft_keeps_tail() {
        let (visible, offset) = draft_tail("abcdefghij", 5);
        assert_eq!(visible, "ghij");
        assert_eq!(offset, 4);
    }

    #[test]
    fn test_wide_chars_use_display_width() {
        // Each CJK char takes two cells
        assert_eq!(draft_tail("日本語", 20), ("日本語".to_string(), 6));

        let (visible, offset) = draft_tail("日本語です", 6);
        assert_eq!(visible, "です");
        assert_eq!(offset, 4);
    }

    #[test]
    fn test_empty_line() {
        assert!(parse_markdown_line("").spans.is_empty());
    }
}
