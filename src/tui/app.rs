use std::io;
use std::path::Path;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing::warn;

use crate::cli::output::display_date;
use crate::io::config_io::read_config;
use crate::io::store_io::{FileStore, Persistence};
use crate::io::watcher::DataWatcher;
use crate::logging;
use crate::model::{Config, Tree};
use crate::ops::rollover::{Clock, Notice, SystemClock};
use crate::schedule::{self, Scheduler, ThreadScheduler, TimerEvent};
use crate::session::Session;

use super::input;
use super::render;
use super::theme::Theme;

/// A visible line in the tree view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Row {
    Title {
        title_id: String,
    },
    Subtitle {
        title_id: String,
        subtitle_id: String,
    },
    Item {
        title_id: String,
        subtitle_id: String,
        item_id: String,
    },
}

impl Row {
    pub fn depth(&self) -> usize {
        match self {
            Row::Title { .. } => 0,
            Row::Subtitle { .. } => 1,
            Row::Item { .. } => 2,
        }
    }
}

/// Where a new entry typed into the input line goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddTarget {
    Title,
    Subtitle { title_id: String },
    Item { title_id: String, subtitle_id: String },
}

impl AddTarget {
    pub fn prompt(&self) -> &'static str {
        match self {
            AddTarget::Title => "New title",
            AddTarget::Subtitle { .. } => "New subtitle",
            AddTarget::Item { .. } => "New checklist item",
        }
    }
}

/// Current interaction mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Navigate,
    Input { target: AddTarget, buffer: String },
    ConfirmDelete(Row),
}

/// Flatten the tree into the rows currently visible: subtitles of expanded
/// titles, items of expanded subtitles.
pub fn visible_rows(tree: &Tree) -> Vec<Row> {
    let mut rows = Vec::new();
    for title in &tree.titles {
        rows.push(Row::Title {
            title_id: title.id.clone(),
        });
        if !title.expanded {
            continue;
        }
        for sub in &title.subtitles {
            rows.push(Row::Subtitle {
                title_id: title.id.clone(),
                subtitle_id: sub.id.clone(),
            });
            if !sub.expanded {
                continue;
            }
            for item in &sub.checklist {
                rows.push(Row::Item {
                    title_id: title.id.clone(),
                    subtitle_id: sub.id.clone(),
                    item_id: item.id.clone(),
                });
            }
        }
    }
    rows
}

/// Main application state
pub struct App<P: Persistence, C: Clock> {
    pub session: Session<P, C>,
    pub config: Config,
    pub theme: Theme,
    pub mode: Mode,
    pub should_quit: bool,
    /// Cursor index into `visible_rows`
    pub cursor: usize,
    /// Scroll offset (first visible row)
    pub scroll_offset: usize,
    /// Reset banner, if one is showing
    pub notice: Option<Notice>,
    /// Long-form date shown in the header
    pub today_display: String,
    /// One-line message in the status row (errors, warnings)
    pub status_message: Option<String>,
}

impl<P: Persistence, C: Clock> App<P, C> {
    pub fn new(session: Session<P, C>, config: Config) -> Self {
        let theme = Theme::from_config(&config.ui);
        let today_display = display_date(session.clock().today());
        App {
            session,
            config,
            theme,
            mode: Mode::Navigate,
            should_quit: false,
            cursor: 0,
            scroll_offset: 0,
            notice: None,
            today_display,
            status_message: None,
        }
    }

    pub fn rows(&self) -> Vec<Row> {
        visible_rows(self.session.tree())
    }

    pub fn current_row(&self) -> Option<Row> {
        self.rows().into_iter().nth(self.cursor)
    }

    /// Keep the cursor inside the visible rows
    pub fn clamp_cursor(&mut self) {
        let len = self.rows().len();
        if len == 0 {
            self.cursor = 0;
        } else if self.cursor >= len {
            self.cursor = len - 1;
        }
    }

    /// Move the cursor onto a specific row if it is visible
    pub fn select_row(&mut self, row: &Row) {
        if let Some(idx) = self.rows().iter().position(|r| r == row) {
            self.cursor = idx;
        }
    }

    pub fn refresh_date(&mut self) {
        self.today_display = display_date(self.session.clock().today());
    }

    /// Run the rollover check; shows the banner if a reset happened.
    pub fn check_rollover(&mut self, now: Instant) {
        self.refresh_date();
        let Some(report) = self.session.check_rollover() else {
            return;
        };
        let ttl = Duration::from_secs(self.config.ui.notice_seconds);
        self.notice = Some(Notice::reset(ttl, now));
        if !report.persisted {
            self.status_message =
                Some("Could not save the daily reset; it will repeat next start".to_string());
        }
        self.clamp_cursor();
    }

    pub fn handle_timer(&mut self, event: TimerEvent, now: Instant) {
        if schedule::triggers_rollover(event) {
            self.check_rollover(now);
        } else {
            self.refresh_date();
        }
    }

    /// Drop the banner once its time is up
    pub fn expire_notice(&mut self, now: Instant) {
        if self.notice.as_ref().is_some_and(|n| n.is_expired(now)) {
            self.notice = None;
        }
    }

    /// Pick up writes made by another process
    pub fn reload(&mut self, now: Instant) {
        self.session.reload();
        self.check_rollover(now);
        self.clamp_cursor();
    }
}

/// Run the TUI application against a data directory
pub fn run(data_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    std::fs::create_dir_all(data_dir)?;
    let config = read_config(data_dir)?;
    logging::init_file(data_dir, &config.log.level);

    let session = Session::open(FileStore::new(data_dir), SystemClock);
    let mut app = App::new(session, config);
    app.check_rollover(Instant::now());

    let (tx, timer_rx) = mpsc::channel();
    let mut scheduler = ThreadScheduler::new(tx);
    schedule::arm_daily_timers(&mut scheduler, app.session.clock().now());

    let watcher = match DataWatcher::start(data_dir) {
        Ok(w) => Some(w),
        Err(e) => {
            warn!(error = %e, "file watcher unavailable; external changes need a restart");
            None
        }
    };

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Restore the terminal on panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let result = run_event_loop(
        &mut terminal,
        &mut app,
        &mut scheduler,
        &timer_rx,
        watcher.as_ref(),
    );

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_event_loop<P: Persistence, C: Clock>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App<P, C>,
    scheduler: &mut dyn Scheduler,
    timer_rx: &mpsc::Receiver<TimerEvent>,
    watcher: Option<&DataWatcher>,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        terminal.draw(|frame| render::render(frame, app))?;

        let has_key = event::poll(Duration::from_millis(250))?;

        // Apply writes from other processes before this key edits the tree
        let now = Instant::now();
        if let Some(w) = watcher
            && !w.poll().is_empty()
        {
            app.reload(now);
        }

        if has_key
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            input::handle_key(app, key);
        }

        while let Ok(timer) = timer_rx.try_recv() {
            app.handle_timer(timer, now);
            schedule::on_timer(scheduler, timer);
        }

        app.expire_notice(now);

        if app.should_quit {
            break;
        }
    }
    Ok(())
}

/// An app on 2025-05-05 whose reset already ran today
#[cfg(test)]
pub(crate) fn test_app() -> App<crate::io::store_io::MemoryStore, crate::ops::rollover::FixedClock> {
    use crate::io::store_io::{LoadedState, MemoryStore};
    use crate::ops::rollover::FixedClock;
    use chrono::NaiveDate;

    let clock = FixedClock::at_date(NaiveDate::from_ymd_opt(2025, 5, 5).unwrap());
    let store = MemoryStore::with_state(LoadedState {
        last_reset: NaiveDate::from_ymd_opt(2025, 5, 5),
        ..LoadedState::default()
    });
    App::new(Session::open(store, clock), Config::default())
}
