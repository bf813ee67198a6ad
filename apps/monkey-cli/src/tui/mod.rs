//! Presenter terminal UI.
//!
//! A single event loop drives the session: keypresses step the
//! presenter, a short tick keeps the screen fresh, and the raw-mode
//! guard restores the terminal on any exit path.

mod app;
mod ui;

use std::io;

use anyhow::{Context, Result};
use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use futures_util::StreamExt;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tokio::time::{interval, sleep, Duration, Instant};

use monkey_presenter::{Presenter, StepResult};

use app::App;

type Term = Terminal<CrosstermBackend<io::Stdout>>;

struct TerminalGuard {
    terminal: Term,
}

impl TerminalGuard {
    fn enter() -> Result<Self> {
        enable_raw_mode().context("enable raw mode")?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen).context("enter alternate screen")?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).context("create terminal")?;
        terminal.clear().context("clear terminal")?;
        Ok(Self { terminal })
    }

    fn terminal_mut(&mut self) -> &mut Term {
        &mut self.terminal
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

pub async fn run(presenter: Presenter) -> Result<()> {
    let mut term = TerminalGuard::enter()?;
    let mut app = App::new(presenter);
    let mut events = EventStream::new();
    let mut ticker = interval(Duration::from_millis(250));

    while !app.should_quit {
        term.terminal_mut()
            .draw(|frame| ui::draw(frame, &app))
            .context("draw frame")?;

        tokio::select! {
            maybe = events.next() => match maybe {
                Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                    handle_key(&mut term, &mut app, &mut events, key).await?;
                }
                Some(Ok(_)) => {}
                Some(Err(err)) => return Err(err).context("terminal event stream"),
                None => break,
            },
            _ = ticker.tick() => {}
        }
    }

    Ok(())
}

async fn handle_key(
    term: &mut TerminalGuard,
    app: &mut App,
    events: &mut EventStream,
    key: KeyEvent,
) -> Result<()> {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('b') => {
            app.presenter.go_back();
            app.status = None;
            app.finished = false;
        }
        KeyCode::Char('s') => {
            app.presenter.skip();
            app.status = None;
        }
        KeyCode::Enter => step(term, app, events).await?,
        _ => {}
    }
    Ok(())
}

async fn step(term: &mut TerminalGuard, app: &mut App, events: &mut EventStream) -> Result<()> {
    if app.finished {
        app.should_quit = true;
        return Ok(());
    }

    if !app.presenter.is_connected() {
        match app.presenter.connect().await {
            Ok(()) => app.status = Some("Reconnected".into()),
            Err(err) => {
                app.status = Some(format!("Reconnect failed: {err}"));
                return Ok(());
            }
        }
    }

    app.status = Some("Executing...".into());
    term.terminal_mut()
        .draw(|frame| ui::draw(frame, app))
        .context("draw frame")?;

    match app.presenter.step().await {
        StepResult::Executed | StepResult::NarrationOnly | StepResult::Paused(None) => {
            app.status = None;
        }
        StepResult::Paused(Some(secs)) => {
            app.status = Some(format!("Waiting {secs} seconds (Enter to continue)..."));
            term.terminal_mut()
                .draw(|frame| ui::draw(frame, app))
                .context("draw frame")?;
            wait_pause(events, secs).await;
            app.status = None;
        }
        StepResult::Finished => {
            app.finished = true;
            app.status = Some("Presentation complete. Press Enter or q to exit.".into());
        }
        StepResult::AgentError(msg) => {
            app.status = Some(format!("Agent error: {msg} (Enter retries, s skips)"));
        }
        StepResult::ConnectionLost => {
            app.status = Some("Connection lost. Press Enter to reconnect.".into());
        }
    }

    Ok(())
}

/// Hold for a timed pause, letting Enter or q cut it short.
async fn wait_pause(events: &mut EventStream, secs: u64) {
    let deadline = Instant::now() + Duration::from_secs(secs);
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return;
        }
        tokio::select! {
            _ = sleep(remaining) => return,
            maybe = events.next() => match maybe {
                Some(Ok(Event::Key(key)))
                    if key.kind == KeyEventKind::Press
                        && matches!(key.code, KeyCode::Enter | KeyCode::Char('q')) =>
                {
                    return;
                }
                Some(Ok(_)) => {}
                _ => return,
            }
        }
    }
}
