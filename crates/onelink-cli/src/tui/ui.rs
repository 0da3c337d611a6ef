//! UI rendering

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use onelink_core::view::Thumbnail;

use super::app::{ActivePane, App, InputMode};

/// Main UI rendering function
pub fn draw(frame: &mut Frame, app: &App, delete_target: Option<&str>) {
    // Create vertical layout for status bar at the bottom
    let outer_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(frame.area());

    let pane_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
        .split(outer_chunks[0]);

    draw_collections_pane(frame, app, pane_chunks[0]);
    draw_links_pane(frame, app, pane_chunks[1]);

    if app.input_mode.is_text_entry() {
        draw_input(frame, app, outer_chunks[1]);
    } else {
        draw_status_bar(frame, app, outer_chunks[1]);
    }

    if app.input_mode == InputMode::ConfirmDelete {
        if let Some(name) = delete_target {
            draw_confirm_delete(frame, name);
        }
    }

    if let Some(message) = &app.error_message {
        draw_error(frame, message);
    }

    if app.show_help {
        draw_help_overlay(frame);
    }
}

fn pane_styles(is_active: bool) -> (Style, Style) {
    let border_style = if is_active {
        Style::default().add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };

    let highlight_style = if is_active {
        Style::default()
            .add_modifier(Modifier::BOLD)
            .add_modifier(Modifier::REVERSED)
    } else {
        Style::default().add_modifier(Modifier::REVERSED)
    };

    (border_style, highlight_style)
}

/// Draw the collections pane (left)
fn draw_collections_pane(frame: &mut Frame, app: &App, area: Rect) {
    let (border_style, highlight_style) = pane_styles(app.active_pane == ActivePane::Collections);

    let block = Block::default()
        .title(format!(" Collections ({}) ", app.collections.len()))
        .borders(Borders::ALL)
        .border_style(border_style);

    if app.collections.is_empty() {
        let hint = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                "Press n to create one",
                Style::default().add_modifier(Modifier::DIM),
            )),
        ])
        .alignment(Alignment::Center)
        .block(block);
        frame.render_widget(hint, area);
        return;
    }

    let items: Vec<ListItem> = app
        .collections
        .iter()
        .map(|summary| {
            let marker = if summary.active { "● " } else { "  " };
            let name = Line::from(vec![
                Span::styled(marker, Style::default().fg(Color::Cyan)),
                Span::raw(summary.name.clone()),
            ]);
            let meta = Line::from(Span::styled(
                format!("  {}", summary.meta()),
                Style::default().add_modifier(Modifier::DIM),
            ));
            ListItem::new(vec![name, meta])
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(highlight_style);

    let mut state = ListState::default();
    state.select(Some(app.collection_index));

    frame.render_stateful_widget(list, area, &mut state);
}

/// Draw the links pane (right)
fn draw_links_pane(frame: &mut Frame, app: &App, area: Rect) {
    let (border_style, highlight_style) = pane_styles(app.active_pane == ActivePane::Links);
    let cards = app.grid.cards();

    let title = if app.grid.message().is_some() && cards.is_empty() {
        format!(" {} ", app.heading)
    } else {
        format!(" {} ({}) ", app.heading, cards.len())
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style);

    if let Some(message) = app.grid.message() {
        let empty = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                message,
                Style::default().add_modifier(Modifier::DIM),
            )),
        ])
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let max_len = area.width.saturating_sub(10) as usize;
    let items: Vec<ListItem> = cards
        .iter()
        .map(|card| {
            let thumb = match &card.thumbnail {
                Thumbnail::Image(_) => Span::styled("[▣]", Style::default().fg(Color::Green)),
                Thumbnail::Placeholder(glyph) => Span::styled(
                    format!("[{}]", glyph),
                    Style::default().fg(Color::Cyan),
                ),
            };

            let title = Line::from(vec![
                thumb,
                Span::raw(" "),
                Span::styled(
                    truncate(&card.title, max_len),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
            ]);
            let url = Line::from(Span::styled(
                format!("    {}", truncate(&card.url, max_len)),
                Style::default().add_modifier(Modifier::DIM),
            ));
            let note = Line::from(Span::styled(
                format!("    {}", truncate(&card.note, max_len)),
                Style::default().fg(Color::DarkGray),
            ));

            ListItem::new(vec![title, url, note])
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(highlight_style);

    let mut state = ListState::default();
    if !cards.is_empty() {
        state.select(Some(app.link_index));
    }

    frame.render_stateful_widget(list, area, &mut state);
}

/// Draw the status bar at the bottom
fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let content = if let Some(msg) = &app.status_message {
        msg.clone()
    } else if app.pending_previews > 0 {
        format!("Fetching {} preview(s)…", app.pending_previews)
    } else {
        "n:new  r:rename  d:delete  a:add link  x:export  ?:help  q:quit".to_string()
    };

    let paragraph = Paragraph::new(content).style(Style::default().add_modifier(Modifier::DIM));

    frame.render_widget(paragraph, area);
}

/// Draw the input line at the bottom
fn draw_input(frame: &mut Frame, app: &App, area: Rect) {
    let prefix = app.input_mode.prompt();

    let line = Line::from(vec![
        Span::styled(prefix, Style::default().fg(Color::Yellow)),
        Span::raw(app.input.as_str()),
    ]);

    frame.render_widget(Paragraph::new(line), area);

    // Position cursor
    let cursor_x = area.x + (prefix.chars().count() + app.input_cursor) as u16;
    frame.set_cursor_position((cursor_x, area.y));
}

/// Rectangle of the given size centered in the frame
fn centered(frame: &Frame, width: u16, height: u16) -> Rect {
    let area = frame.area();
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(2));
    let x = area.width.saturating_sub(width) / 2;
    let y = area.height.saturating_sub(height) / 2;
    Rect::new(x, y, width, height)
}

fn draw_confirm_delete(frame: &mut Frame, name: &str) {
    let popup_area = centered(frame, 50, 5);
    frame.render_widget(Clear, popup_area);

    let text = vec![
        Line::from(format!("Delete \"{}\" collection?", name)),
        Line::from(""),
        Line::from(Span::styled(
            "y: delete   n/Esc: cancel",
            Style::default().add_modifier(Modifier::DIM),
        )),
    ];

    let block = Block::default()
        .title(" Confirm ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    let paragraph = Paragraph::new(text)
        .block(block)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, popup_area);
}

fn draw_error(frame: &mut Frame, message: &str) {
    let popup_area = centered(frame, 60, 8);
    frame.render_widget(Clear, popup_area);

    let mut text: Vec<Line> = message.lines().map(|l| Line::from(l.to_string())).collect();
    text.push(Line::from(""));
    text.push(Line::from(Span::styled(
        "Press any key to close",
        Style::default().add_modifier(Modifier::DIM),
    )));

    let block = Block::default()
        .title(" Error ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));

    let paragraph = Paragraph::new(text)
        .block(block)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, popup_area);
}

/// Draw help overlay
fn draw_help_overlay(frame: &mut Frame) {
    let popup_area = centered(frame, 50, 20);

    // Clear the popup area
    frame.render_widget(Clear, popup_area);

    let help_text = vec![
        Line::from(vec![Span::styled(
            "Keyboard Shortcuts",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from(""),
        Line::from("Navigation:"),
        Line::from("  j/k, ↑/↓    Move up/down"),
        Line::from("  h/l, ←/→    Switch panes"),
        Line::from("  Tab         Switch panes"),
        Line::from("  Enter       Select collection / Open link"),
        Line::from(""),
        Line::from("Collections:"),
        Line::from("  n           New collection"),
        Line::from("  r           Rename active collection"),
        Line::from("  d           Delete active collection"),
        Line::from("  x           Export active collection"),
        Line::from(""),
        Line::from("Links:"),
        Line::from("  a           Add link (<url> [title])"),
        Line::from(""),
        Line::from("  q           Quit"),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(Style::default().add_modifier(Modifier::BOLD));

    let paragraph = Paragraph::new(help_text).block(block);
    frame.render_widget(paragraph, popup_area);
}

/// Truncate to max characters, adding "…" if truncated
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(1)).collect();
        format!("{}…", kept)
    }
}
