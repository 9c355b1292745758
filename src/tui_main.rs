use anyhow::Result;
use crossterm::{
    event::{KeyCode, KeyEvent},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;

use boardgame_tracker::{
    tiers::Direction,
    tui::{ui, App, Event as TuiEvent, EventHandler, ExportKind, InputMode, Screen},
};

pub fn run_tui(mut app: App, tick_rate_ms: u64) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let events = EventHandler::new(tick_rate_ms);
    let res = run_app(&mut terminal, &mut app, &events);

    // Always restore terminal state, even if there was an error
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|f| ui::draw(f, app))?;

        match events.next()? {
            TuiEvent::Key(key) => handle_key(app, key),
            TuiEvent::Resize(_, _) | TuiEvent::Tick => {}
        }
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    match app.current_screen {
        Screen::Tracker => match app.input_mode {
            InputMode::Rating => match key.code {
                KeyCode::Char(c) if c.is_ascii_digit() || c == '.' => app.push_rating_char(c),
                KeyCode::Enter => app.commit_rating(),
                KeyCode::Backspace => app.backspace(),
                KeyCode::Left => app.previous_game(),
                KeyCode::Right => app.next_game(),
                KeyCode::Char('/') => app.open_search(),
                KeyCode::Char('g') => app.open_jump(),
                KeyCode::Char('e') => app.export(ExportKind::Ratings),
                KeyCode::Char('s') => app.show_statistics(),
                KeyCode::Char('q') => app.should_quit = true,
                _ => {}
            },
            InputMode::Search => match key.code {
                KeyCode::Esc => app.close_input(),
                KeyCode::Enter => app.confirm_search(),
                KeyCode::Up => app.search_move(true),
                KeyCode::Down => app.search_move(false),
                KeyCode::Backspace => app.search_pop(),
                KeyCode::Char(c) => app.search_push(c),
                _ => {}
            },
            InputMode::Jump => match key.code {
                KeyCode::Esc => app.close_input(),
                KeyCode::Enter => app.confirm_jump(),
                KeyCode::Backspace => {
                    app.jump_input.pop();
                }
                KeyCode::Char(c) => app.jump_push(c),
                _ => {}
            },
        },
        Screen::Statistics => match key.code {
            KeyCode::Up => app.move_selection_up(),
            KeyCode::Down => app.move_selection_down(),
            KeyCode::Char('[') => app.shift_selected(Direction::Up),
            KeyCode::Char(']') => app.shift_selected(Direction::Down),
            KeyCode::Char('j') => app.export(ExportKind::StatisticsJson),
            KeyCode::Char('c') => app.export(ExportKind::StatisticsCsv),
            KeyCode::Char('b') => app.back_to_tracker(),
            KeyCode::Char('q') => app.should_quit = true,
            _ => {}
        },
    }
}
