use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use crate::models::PlayStatus;
use crate::tiers::Severity;
use crate::tui::app::{App, InputMode, Screen, StatusMessage};

pub fn draw(frame: &mut Frame, app: &App) {
    match app.current_screen {
        Screen::Tracker => draw_tracker_screen(frame, app),
        Screen::Statistics => draw_statistics_screen(frame, app),
    }

    match app.input_mode {
        InputMode::Search if app.current_screen == Screen::Tracker => draw_search_popup(frame, app),
        InputMode::Jump if app.current_screen == Screen::Tracker => draw_jump_popup(frame, app),
        _ => {}
    }
}

fn severity_color(severity: Severity) -> Color {
    severity.hex_color().parse().unwrap_or(Color::Gray)
}

fn key_hint(key: &str) -> Span<'_> {
    Span::styled(key, Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
}

fn status_line(app: &App) -> Line<'_> {
    match &app.status_message {
        Some(StatusMessage::Info(message)) => Line::from(Span::styled(message.as_str(), Style::default().fg(Color::Cyan))),
        Some(StatusMessage::Error(message)) => Line::from(vec![
            Span::styled("Error: ", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
            Span::styled(message.as_str(), Style::default().fg(Color::Red)),
        ]),
        None => Line::from(""),
    }
}

fn draw_tracker_screen(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(3),
            Constraint::Length(4),
        ])
        .split(frame.size());

    let stats = &app.session.snapshot().stats;
    let title = Paragraph::new(format!(
        "Board Game Tracker  |  played {}  rated {}  avg {:.1}",
        stats.total_played, stats.total_rated, stats.average_rating
    ))
    .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(title, chunks[0]);

    // Current game
    let text = match app.current_game() {
        Some(game) => {
            let status = app.current_status();
            let status_style = match status {
                PlayStatus::PlayedRated(value) => Style::default().fg(severity_color(Severity::from_rating(value))),
                PlayStatus::PlayedNoRating => Style::default().fg(Color::Green),
                PlayStatus::Unplayed => Style::default().fg(Color::Yellow),
                PlayStatus::Unrated => Style::default().fg(Color::Gray),
            };

            let mut lines = vec![
                Line::from(vec![
                    Span::raw(format!("#{}/{}  ", app.current + 1, app.game_count())),
                    Span::styled(game.name.as_str(), Style::default().add_modifier(Modifier::BOLD)),
                ]),
                Line::from(game.year.map(|y| format!("Published {}", y)).unwrap_or_default()),
                Line::from(""),
                Line::from(Span::styled(status.describe(), status_style)),
            ];
            if let Some(rank) = game.rank {
                lines.push(Line::from(format!("BGG rank {}", rank)));
            }
            if let Some(tier) = app.session.snapshot().tier_of(&game.id) {
                lines.push(Line::from(format!("Tier {}", tier)));
            }
            lines
        }
        None => vec![Line::from("No games found.")],
    };
    let game = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title("Game"))
        .wrap(Wrap { trim: true });
    frame.render_widget(game, chunks[1]);

    let input = Paragraph::new(app.rating_input.as_str())
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL).title("Rating (0-10)"));
    frame.render_widget(input, chunks[2]);

    let help = Paragraph::new(vec![
        Line::from(vec![
            key_hint("0-9 ."),
            Span::raw(" rate | "),
            key_hint("Enter"),
            Span::raw(" played | "),
            key_hint("Backspace"),
            Span::raw(" not played | "),
            key_hint("←/→"),
            Span::raw(" move | "),
            key_hint("/"),
            Span::raw(" search | "),
            key_hint("g"),
            Span::raw(" go to | "),
            key_hint("e"),
            Span::raw(" export | "),
            key_hint("s"),
            Span::raw(" statistics | "),
            Span::styled("q", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
            Span::raw(" quit"),
        ]),
        status_line(app),
    ])
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(help, chunks[3]);

    if app.input_mode == InputMode::Rating {
        frame.set_cursor(chunks[2].x + app.rating_input.len() as u16 + 1, chunks[2].y + 1);
    }
}

fn draw_statistics_screen(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints([
            Constraint::Length(6),
            Constraint::Min(10),
            Constraint::Length(4),
        ])
        .split(frame.size());

    let snapshot = app.session.snapshot();
    let stats = &snapshot.stats;
    let summary = Paragraph::new(vec![
        Line::from(vec![
            Span::raw("Games played: "),
            Span::styled(stats.total_played.to_string(), Style::default().fg(Color::Cyan)),
        ]),
        Line::from(vec![
            Span::raw("Games rated: "),
            Span::styled(stats.total_rated.to_string(), Style::default().fg(Color::Cyan)),
        ]),
        Line::from(vec![
            Span::raw("Average rating: "),
            Span::styled(format!("{:.1}", stats.average_rating), Style::default().fg(Color::Yellow)),
        ]),
        Line::from(vec![
            Span::raw("Top rating: "),
            Span::styled(format!("{:.1}", stats.top_rating), Style::default().fg(Color::Yellow)),
        ]),
    ])
    .block(Block::default().borders(Borders::ALL).title("Statistics"));
    frame.render_widget(summary, chunks[0]);

    // Tier headers interleaved with their games; only game rows are selectable
    let mut items = Vec::new();
    let mut selected_row = None;
    let mut game_index = 0;
    for tier in &snapshot.tiers {
        let color = severity_color(tier.severity);
        items.push(ListItem::new(Line::from(vec![
            Span::styled(tier.label.as_str(), Style::default().fg(color).add_modifier(Modifier::BOLD)),
            Span::raw(format!("  {}  ({} games)", tier.range, tier.games.len())),
        ])));
        for member in &tier.games {
            if game_index == app.selected_rank {
                selected_row = Some(items.len());
            }
            items.push(ListItem::new(format!(
                "  {:>4}. {:<40} {}",
                member.rank,
                member.game.display_title(),
                member.rating
            )));
            game_index += 1;
        }
    }

    let mut state = ListState::default();
    state.select(selected_row);
    let tier_list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Tier list (↑/↓ select, [ / ] move tier)"),
        )
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD));
    frame.render_stateful_widget(tier_list, chunks[1], &mut state);

    let help = Paragraph::new(vec![
        Line::from(vec![
            key_hint("j"),
            Span::raw(" export JSON | "),
            key_hint("c"),
            Span::raw(" export CSV | "),
            key_hint("b"),
            Span::raw(" back | "),
            Span::styled("q", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
            Span::raw(" quit"),
        ]),
        status_line(app),
    ])
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(help, chunks[2]);
}

fn draw_search_popup(frame: &mut Frame, app: &App) {
    let area = centered_rect(60, 50, frame.size());
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(3)])
        .split(area);

    let input = Paragraph::new(app.search_query.as_str())
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL).title("Search (Enter to jump, Esc to cancel)"));

    let items: Vec<ListItem> = app
        .search_results()
        .iter()
        .map(|hit| {
            ListItem::new(format!(
                "{}  #{} of {}",
                hit.game.display_title(),
                hit.position + 1,
                app.game_count()
            ))
        })
        .collect();
    let mut state = ListState::default();
    if !items.is_empty() {
        state.select(Some(app.search_selected));
    }
    let results = List::new(items)
        .block(Block::default().borders(Borders::ALL))
        .highlight_style(Style::default().bg(Color::DarkGray));

    frame.render_widget(Clear, area);
    frame.render_widget(input, chunks[0]);
    frame.render_stateful_widget(results, chunks[1], &mut state);
    frame.set_cursor(chunks[0].x + app.search_query.len() as u16 + 1, chunks[0].y + 1);
}

fn draw_jump_popup(frame: &mut Frame, app: &App) {
    let area = centered_rect(40, 20, frame.size());
    let input = Paragraph::new(app.jump_input.as_str())
        .style(Style::default().fg(Color::Yellow))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Go to game (1-{})", app.game_count())),
        );

    frame.render_widget(Clear, area);
    frame.render_widget(input, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
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
