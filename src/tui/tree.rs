use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Gauge, List, ListItem, Paragraph};

use super::app::{App, Mode};
use crate::output;
use crate::progress;

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(frame.area());

    render_summary(frame, app, chunks[0]);
    render_tree(frame, app, chunks[1]);

    match &app.mode {
        Mode::ConfirmDelete(id) => render_confirm(frame, app, id),
        Mode::Help => render_help(frame),
        Mode::Normal => {}
    }
}

fn render_summary(frame: &mut Frame, app: &App, area: Rect) {
    let (done, total) = progress::overall(&app.tasks);
    let ratio = if total > 0 {
        f64::from(done) / f64::from(total)
    } else {
        0.0
    };

    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(" Progress "))
        .gauge_style(Style::default().fg(Color::Green))
        // Gauge insists on [0, 1]; an overcommitted forest can overshoot.
        .ratio(ratio.clamp(0.0, 1.0))
        .label(format!(
            "{done} / {total} min ({})",
            output::percent(ratio)
        ));

    frame.render_widget(gauge, area);
}

fn render_tree(frame: &mut Frame, app: &App, area: Rect) {
    let (tree_area, error_area) = if app.error.is_some() {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(area);
        (chunks[0], Some(chunks[1]))
    } else {
        (area, None)
    };

    if let (Some(err), Some(err_area)) = (&app.error, error_area) {
        frame.render_widget(
            Paragraph::new(err.as_str()).style(Style::default().fg(Color::Red)),
            err_area,
        );
    }

    let items: Vec<ListItem> = app
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let mut prefix = String::new();

            // Build tree lines
            for d in 1..row.depth + 1 {
                if d == row.depth {
                    if row.is_last_at_depth[d] {
                        prefix.push_str("└── ");
                    } else {
                        prefix.push_str("├── ");
                    }
                } else if row.is_last_at_depth[d] {
                    prefix.push_str("    ");
                } else {
                    prefix.push_str("│   ");
                }
            }

            // Collapse indicator for nodes with children
            let collapse_indicator = if row.has_children {
                if app.collapsed.contains(&row.id) {
                    "> "
                } else {
                    "v "
                }
            } else {
                "  "
            };

            let (icon, icon_style) = if row.completed {
                ("x", Style::default().fg(Color::DarkGray))
            } else {
                (".", Style::default().fg(Color::Green))
            };

            let title_style = if row.completed {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default().bold()
            };

            let minutes = format!(
                "  {}/{}m ({})",
                row.done_minutes,
                row.minutes,
                output::percent(row.progress)
            );

            let free = match row.free {
                Some(0) => "  (full)".to_string(),
                Some(n) => format!("  (free: {n}m)"),
                None => String::new(),
            };

            let line = Line::from(vec![
                Span::raw(prefix),
                Span::raw(collapse_indicator),
                Span::styled(format!("{icon} "), icon_style),
                Span::styled(format!("{}  ", row.id), Style::default().fg(Color::DarkGray)),
                Span::styled(row.title.clone(), title_style),
                Span::styled(minutes, Style::default().fg(Color::Yellow)),
                Span::styled(free, Style::default().fg(Color::Cyan)),
            ]);

            let item = ListItem::new(line);
            if i == app.cursor {
                item.style(Style::default().bg(Color::DarkGray))
            } else {
                item
            }
        })
        .collect();

    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(" Tasks "));

    frame.render_widget(list, tree_area);
}

fn render_confirm(frame: &mut Frame, app: &App, id: &str) {
    let title = app
        .tasks
        .get(id)
        .map(|t| t.title.clone())
        .unwrap_or_else(|| id.to_string());

    let term = frame.area();
    let width = 50.min(term.width.saturating_sub(4));
    let height = 5.min(term.height.saturating_sub(2));
    let area = centered_rect(width, height, term);

    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Delete ")
        .border_style(Style::default().fg(Color::Red));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let text = vec![
        Line::raw(format!("Delete '{title}' and its whole subtree?")),
        Line::raw(""),
        Line::styled("y: delete  any other key: cancel", Style::default().fg(Color::DarkGray)),
    ];
    frame.render_widget(Paragraph::new(text), inner);
}

fn render_help(frame: &mut Frame) {
    let term = frame.area();
    let width = 46.min(term.width.saturating_sub(4));
    let height = 15.min(term.height.saturating_sub(2));
    let area = centered_rect(width, height, term);

    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Help ")
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let key = |k: &str, desc: &str| {
        Line::from(vec![
            Span::styled(format!("{k:<8}"), Style::default().fg(Color::Cyan)),
            Span::raw(desc.to_string()),
        ])
    };

    let help_text = vec![
        key("j/Down", "Move down"),
        key("k/Up", "Move up"),
        key("Space", "Toggle collapse"),
        key("a", "Add subtask (re-splits the budget)"),
        key("A", "Add root task"),
        key("d/x", "Toggle complete"),
        key("+/-", "Adjust budget by 5 minutes"),
        key("D", "Delete subtree (asks first)"),
        key("r", "Refresh from store"),
        key("?", "Toggle help"),
        key("q/Esc", "Quit"),
    ];

    frame.render_widget(Paragraph::new(help_text), inner);
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}
