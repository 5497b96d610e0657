use cadence::{
    app::{AppAction, NotifierFactory, TickerFactory},
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore},
    form::{SetupForm, TimeUnit},
    logging::init_logging,
    notify::{BellNotifier, DesktopNotifier, Notifier},
    runtime::{
        event_channel, spawn_terminal_reader, AppEvent, AppEventSource, Runner, ThreadTicker,
        TickSource, DEFAULT_TICK_MS,
    },
    session::SessionMode,
    ui, App,
};
use clap::{error::ErrorKind, CommandFactory, Parser, ValueEnum};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    time::Duration,
};

const REDRAW_MS: u64 = 250;

/// work/rest interval timer with phase alerts
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "An interval timer: alternate work and rest phases for a total duration or a number of cycles, with a desktop alert at every phase change and when the session is done."
)]
pub struct Cli {
    /// end the session by total duration or by number of cycles
    #[clap(short = 'm', long, value_enum)]
    mode: Option<ModeArg>,

    /// unit for total, work and rest values
    #[clap(short = 'u', long, value_enum)]
    unit: Option<UnitArg>,

    /// total session length (duration mode)
    #[clap(short = 't', long)]
    total: Option<u64>,

    /// number of work/rest cycles (cycles mode)
    #[clap(short = 'c', long)]
    cycles: Option<u64>,

    /// work interval length
    #[clap(short = 'w', long)]
    work: Option<u64>,

    /// rest interval length
    #[clap(short = 'r', long)]
    rest: Option<u64>,

    /// skip the setup form and start the session right away
    #[clap(long)]
    start: bool,

    /// ring the terminal bell instead of sending desktop notifications
    #[clap(short = 'q', long)]
    quiet: bool,

    /// tick interval in milliseconds
    #[clap(long, default_value_t = DEFAULT_TICK_MS, hide = true)]
    tick_ms: u64,
}

#[derive(Debug, Copy, Clone, PartialEq, ValueEnum)]
pub enum ModeArg {
    Duration,
    Cycles,
}

impl From<ModeArg> for SessionMode {
    fn from(m: ModeArg) -> Self {
        match m {
            ModeArg::Duration => SessionMode::Duration,
            ModeArg::Cycles => SessionMode::Cycles,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, ValueEnum)]
pub enum UnitArg {
    Minutes,
    Seconds,
}

impl From<UnitArg> for TimeUnit {
    fn from(u: UnitArg) -> Self {
        match u {
            UnitArg::Minutes => TimeUnit::Minutes,
            UnitArg::Seconds => TimeUnit::Seconds,
        }
    }
}

impl Cli {
    /// Overlay the flags that were given onto the persisted settings
    fn apply_to(&self, cfg: &mut Config) {
        if let Some(mode) = self.mode {
            cfg.mode = mode.into();
        }
        if let Some(unit) = self.unit {
            cfg.unit = unit.into();
        }
        if let Some(total) = self.total {
            cfg.total = total;
        }
        if let Some(cycles) = self.cycles {
            cfg.cycles = cycles;
        }
        if let Some(work) = self.work {
            cfg.work = work;
        }
        if let Some(rest) = self.rest {
            cfg.rest = rest;
        }
    }

    fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let _log_guard = AppDirs::log_dir().and_then(|dir| match init_logging(&dir) {
        Ok(guard) => Some(guard),
        Err(err) => {
            eprintln!("cadence: logging disabled: {}", err);
            None
        }
    });

    let store = FileConfigStore::new();
    let mut config = store.load();
    cli.apply_to(&mut config);
    tracing::info!(config = ?config, "Starting cadence");

    let (tx, events) = event_channel();

    let ticker_tx = tx.clone();
    let tick_interval = cli.tick_interval();
    let ticker_factory: TickerFactory = Box::new(move || {
        Box::new(ThreadTicker::new(ticker_tx.clone(), tick_interval)) as Box<dyn TickSource>
    });

    let desktop = config.notifications && !cli.quiet;
    let notifier_factory: NotifierFactory = Box::new(move || {
        if desktop {
            Box::new(DesktopNotifier) as Box<dyn Notifier>
        } else {
            Box::new(BellNotifier)
        }
    });

    let form = SetupForm::from_config(&config);
    let mut app = App::new(form, config, ticker_factory, notifier_factory).with_store(Box::new(store));

    if cli.start {
        if let Err(err) = app.start_session() {
            tracing::warn!(error = %err, "Could not start from flags, showing setup form");
        }
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    spawn_terminal_reader(tx);
    let runner = Runner::new(events, Duration::from_millis(REDRAW_MS));
    let result = start_tui(&mut terminal, &mut app, &runner);

    // Release the tick thread before handing the terminal back.
    app.stop_session();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend, E: AppEventSource>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<E>,
) -> Result<(), Box<dyn Error>> {
    terminal.draw(|f| ui::draw(app, f))?;

    loop {
        match runner.step() {
            Some(AppEvent::Tick(tick)) => app.on_tick(tick),
            Some(AppEvent::Key(key)) => {
                if app.on_key(key) == AppAction::Quit {
                    break;
                }
            }
            // Resizes and idle timeouts only need a redraw.
            Some(AppEvent::Resize) | None => {}
        }
        terminal.draw(|f| ui::draw(app, f))?;
    }

    Ok(())
}
