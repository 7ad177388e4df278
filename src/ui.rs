use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
};

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::app::{App, InputMode};
use crate::message::ChatRole;

/// Most rows the multi-line input grows to before scrolling
const MAX_INPUT_ROWS: usize = 5;

/// Tabs in messages are expanded to this before wrapping
const TAB: &str = "    ";

/// Wrap text to fit within a given display width, returning multiple lines.
/// Breaks at whitespace and keeps the spacing inside a line, including
/// indentation. Words wider than the line are split between characters.
pub fn wrap_text_to_width(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();
    let mut current_line = String::new();
    let mut current_width = 0;
    // Whitespace seen since the last word; dropped if the line breaks there
    let mut gap = String::new();

    for (is_space, token) in whitespace_runs(text) {
        if is_space {
            gap.push_str(token);
            continue;
        }

        let word_width = token.width();
        let gap_width = gap.width();

        if current_width + gap_width + word_width <= width {
            current_line.push_str(&gap);
            current_line.push_str(token);
            current_width += gap_width + word_width;
        } else {
            if !current_line.is_empty() {
                lines.push(std::mem::take(&mut current_line));
                current_width = 0;
            }
            if word_width <= width {
                current_line.push_str(token);
                current_width = word_width;
            } else {
                for c in token.chars() {
                    let char_width = c.width().unwrap_or(0);
                    if current_width > 0 && current_width + char_width > width {
                        lines.push(std::mem::take(&mut current_line));
                        current_width = 0;
                    }
                    current_line.push(c);
                    current_width += char_width;
                }
            }
        }
        gap.clear();
    }

    if !current_line.is_empty() {
        lines.push(current_line);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }

    lines
}

/// Split text into alternating runs of whitespace and non-whitespace
fn whitespace_runs(text: &str) -> impl Iterator<Item = (bool, &str)> {
    let mut rest = text;
    std::iter::from_fn(move || {
        let first = rest.chars().next()?;
        let is_space = first.is_whitespace();
        let end = rest
            .char_indices()
            .find(|(_, c)| c.is_whitespace() != is_space)
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        let (run, tail) = rest.split_at(end);
        rest = tail;
        Some((is_space, run))
    })
}

/// Wrap message content, keeping its own line breaks
fn wrap_content(content: &str, width: usize) -> Vec<String> {
    if content.is_empty() {
        return vec![String::new()];
    }
    content
        .replace('\t', TAB)
        .split('\n')
        .flat_map(|line| wrap_text_to_width(line.trim_end_matches('\r'), width))
        .collect()
}

/// Parse a line of text and convert **bold** markdown to styled spans
fn parse_markdown_line(text: &str) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut rest = text;

    while let Some(start) = rest.find("**") {
        let after = &rest[start + 2..];
        match after.find("**") {
            Some(end) if end > 0 => {
                if start > 0 {
                    spans.push(Span::raw(rest[..start].to_string()));
                }
                spans.push(Span::styled(
                    after[..end].to_string(),
                    Style::default().add_modifier(Modifier::BOLD),
                ));
                rest = &after[end + 2..];
            }
            _ => break,
        }
    }

    if !rest.is_empty() {
        spans.push(Span::raw(rest.to_string()));
    }

    if spans.is_empty() {
        Line::default()
    } else {
        Line::from(spans)
    }
}

/// Lines of the chat transcript at the given inner width
pub fn transcript_lines(app: &App, width: usize) -> Vec<Line<'static>> {
    let messages = app.conversation.messages();
    let busy = app.is_busy();

    if messages.is_empty() && !busy {
        return vec![
            Line::default(),
            Line::from(Span::styled("Chào bạn!", Style::default().fg(Color::Gray).bold()))
                .alignment(Alignment::Center),
            Line::from(Span::styled(
                "Tôi có thể giúp gì cho bạn",
                Style::default().fg(Color::DarkGray),
            ))
            .alignment(Alignment::Center),
        ];
    }

    let assistant_label = format!("{}:", app.variant.title());
    let assistant_style = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);
    let mut lines: Vec<Line<'static>> = Vec::new();

    for msg in messages {
        match msg.role() {
            ChatRole::User => {
                lines.push(
                    Line::from(Span::styled(
                        "Bạn:",
                        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                    ))
                    .alignment(Alignment::Right),
                );
                for line in wrap_content(msg.content(), width) {
                    lines.push(Line::from(Span::styled(line, Style::default().fg(Color::Cyan))).alignment(Alignment::Right));
                }
            }
            ChatRole::Assistant => {
                lines.push(Line::from(Span::styled(assistant_label.clone(), assistant_style)));
                for line in wrap_content(msg.content(), width) {
                    lines.push(parse_markdown_line(&line));
                }
            }
        }
        lines.push(Line::default());
    }

    if busy {
        lines.push(Line::from(Span::styled(assistant_label, assistant_style)));
        let indicator = match app.variant.pending_text() {
            Some(text) => Line::from(Span::styled(
                text,
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            )),
            None => Line::from(
                (0..3u8)
                    .map(|i| {
                        let color = if i == app.animation_frame { Color::White } else { Color::DarkGray };
                        Span::styled("● ", Style::default().fg(color))
                    })
                    .collect::<Vec<_>>(),
            ),
        };
        lines.push(indicator);
    }

    lines
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    let model_bar_height = if app.conversation.selector().is_some() { 1 } else { 0 };
    let input_height = input_rows(app) as u16 + 2;

    let [header_area, chat_area, model_area, input_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(model_bar_height),
        Constraint::Length(input_height),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);
    render_chat(app, frame, chat_area);
    if model_bar_height > 0 {
        render_model_bar(app, frame, model_area);
    }
    render_input(app, frame, input_area);
    render_footer(app, frame, footer_area);

    if app.show_model_picker {
        render_model_picker(app, frame, area);
    }
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let mut spans = vec![
        Span::styled(format!(" {} ", app.variant.title()), Style::default().fg(Color::Cyan).bold()),
        Span::styled(app.variant.subtitle(), Style::default().fg(Color::Gray)),
    ];
    if let Some(model) = app.conversation.selected_model() {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(format!(" {} ", model), Style::default().bg(Color::Blue).fg(Color::White)));
    }
    spans.push(Span::raw(" "));
    spans.push(Span::styled(
        format!("v{}", env!("CARGO_PKG_VERSION")),
        Style::default().fg(Color::DarkGray),
    ));

    let header = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    app.chat_area = Some(area);
    app.chat_height = area.height.saturating_sub(2);
    let inner_width = area.width.saturating_sub(2) as usize;

    let lines = transcript_lines(app, inner_width);
    let total_lines = u16::try_from(lines.len()).unwrap_or(u16::MAX);
    app.autoscroll.observe(
        app.conversation.messages().len(),
        app.is_busy(),
        total_lines,
        app.chat_height,
    );

    let border_color = if app.input_mode == InputMode::Normal { Color::Cyan } else { Color::DarkGray };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(format!(" {} ", app.variant.title()));

    let chat = Paragraph::new(Text::from(lines))
        .block(block)
        .scroll((app.autoscroll.offset(), 0));

    frame.render_widget(chat, area);
}

fn render_model_bar(app: &App, frame: &mut Frame, area: Rect) {
    let Some(model) = app.conversation.selected_model() else {
        return;
    };
    let enabled = app.conversation.can_select_model();
    let value_style = if enabled {
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let mut spans = vec![
        Span::styled(" Chọn mô hình: ", Style::default().fg(Color::Gray)),
        Span::styled(format!("[{}]", model), value_style),
    ];
    if enabled {
        spans.push(Span::styled("  (m để đổi)", Style::default().fg(Color::DarkGray)));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Rows the input box needs for its current text
fn input_rows(app: &App) -> usize {
    if !app.variant.multiline_input() {
        return 1;
    }
    let rows = app.conversation.input.text().split('\n').count();
    rows.clamp(1, MAX_INPUT_ROWS)
}

/// (row, column) of the input cursor, in characters
fn cursor_row_col(text: &str, cursor: usize) -> (usize, usize) {
    let before: String = text.chars().take(cursor).collect();
    let row = before.matches('\n').count();
    let col = before.rsplit('\n').next().map(|l| l.chars().count()).unwrap_or(0);
    (row, col)
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let busy = app.is_busy();
    let editing = app.input_mode == InputMode::Editing && !app.show_model_picker;
    let border_color = if busy {
        Color::DarkGray
    } else if editing {
        Color::Yellow
    } else {
        Color::Gray
    };

    let title = if app.variant.multiline_input() {
        " Gửi: Enter · Xuống dòng: Shift+Enter "
    } else {
        " Gửi: Enter "
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);

    let input = &app.conversation.input;
    if input.text().is_empty() {
        let placeholder = Paragraph::new(Span::styled(
            app.variant.placeholder(),
            Style::default().fg(Color::DarkGray),
        ))
        .block(block);
        frame.render_widget(placeholder, area);
        if editing && !busy {
            frame.set_cursor_position((area.x + 1, area.y + 1));
        }
        return;
    }

    // Visible window of the input, scrolled to keep the cursor in view
    let inner_width = area.width.saturating_sub(2) as usize;
    let inner_height = area.height.saturating_sub(2) as usize;
    let (cursor_row, cursor_col) = cursor_row_col(input.text(), input.cursor());

    let row_offset = if inner_height == 0 {
        0
    } else {
        cursor_row.saturating_sub(inner_height - 1)
    };
    let col_offset = if inner_width == 0 {
        0
    } else if cursor_col >= inner_width {
        cursor_col - inner_width + 1
    } else {
        0
    };

    let text_color = if busy { Color::DarkGray } else { Color::Cyan };
    let lines: Vec<Line> = input
        .text()
        .split('\n')
        .skip(row_offset)
        .take(inner_height.max(1))
        .map(|line| {
            let visible: String = line.chars().skip(col_offset).take(inner_width).collect();
            Line::from(visible)
        })
        .collect();

    let paragraph = Paragraph::new(lines)
        .style(Style::default().fg(text_color))
        .block(block);
    frame.render_widget(paragraph, area);

    if editing && !busy {
        let x = (cursor_col - col_offset) as u16;
        let y = (cursor_row - row_offset) as u16;
        frame.set_cursor_position((area.x + x + 1, area.y + y + 1));
    }
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default().bg(Color::Blue).fg(Color::White),
        InputMode::Editing => Style::default().bg(Color::Yellow).fg(Color::Black),
    };
    let mode_text = match app.input_mode {
        InputMode::Normal => " XEM ",
        InputMode::Editing => " NHẬP ",
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let mut spans = vec![Span::styled(mode_text, mode_style), Span::raw(" ")];

    match app.input_mode {
        InputMode::Editing => {
            spans.extend(vec![
                Span::styled(" Enter ", key_style),
                Span::styled(" gửi ", label_style),
                Span::styled(" Esc ", key_style),
                Span::styled(" cuộn ", label_style),
            ]);
        }
        InputMode::Normal => {
            spans.extend(vec![
                Span::styled(" j/k ", key_style),
                Span::styled(" cuộn ", label_style),
                Span::styled(" i ", key_style),
                Span::styled(" nhập ", label_style),
            ]);
            if app.conversation.selector().is_some() {
                spans.extend(vec![
                    Span::styled(" m ", key_style),
                    Span::styled(" mô hình ", label_style),
                ]);
            }
            spans.extend(vec![
                Span::styled(" q ", key_style),
                Span::styled(" thoát ", label_style),
            ]);
        }
    }

    if let Some(model) = app.conversation.selected_model() {
        spans.push(Span::styled(
            format!("  Mô hình hiện tại: {}", model),
            Style::default().fg(Color::DarkGray),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_model_picker(app: &mut App, frame: &mut Frame, area: Rect) {
    let Some(selector) = app.conversation.selector() else {
        return;
    };

    // Calculate popup size and position (centered)
    let popup_width = 40.min(area.width.saturating_sub(4));
    let popup_height = (selector.models().len() as u16 + 2).min(area.height.saturating_sub(4));

    let popup_x = (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = (area.height.saturating_sub(popup_height)) / 2;

    let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height);

    // Clear the area behind the popup
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Chọn mô hình (Enter chọn, Esc huỷ) ");

    let current = selector.current();
    let items: Vec<ListItem> = selector
        .models()
        .iter()
        .map(|model| {
            let style = if model == current {
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            ListItem::new(format!(" {} ", model)).style(style)
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, popup_area, &mut app.model_picker_state);
}
