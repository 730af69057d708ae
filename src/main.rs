mod app;
mod cli;
mod config;
mod engine;
mod format;
mod input;
mod mock;
mod model;
mod poll;
mod resources;
mod source;
mod ui;
mod usage;

use anyhow::{Context, Result};
use app::{App, AppCommand};
use clap::Parser;
use cli::CliArgs;
use config::{RuntimeConfig, RuntimeConfigWatcher};
use crossterm::event::{
    Event, EventStream, KeyEventKind, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags,
    PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
    supports_keyboard_enhancement,
};
use futures::StreamExt;
use model::ResourceTab;
use poll::{PollEvent, PollTarget, Poller};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use std::fs::OpenOptions;
use std::io::{self, Stdout};
use std::path::Path;
use std::sync::Mutex;
use tokio::sync::mpsc;
use tokio::time::{Duration, MissedTickBehavior, interval};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

type TuiTerminal = Terminal<CrosstermBackend<Stdout>>;
const REDRAW_INTERVAL: Duration = Duration::from_secs(1);

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_tracing(&args.log_filter, args.log_file.as_deref())?;

    let mut watcher = match args.config.clone() {
        Some(path) => RuntimeConfigWatcher::with_path(path),
        None => RuntimeConfigWatcher::discover(),
    };
    let mut config = watcher.load_current()?;
    config.apply_cli(&args);
    if let Some(path) = config.source.as_deref() {
        info!("loaded config from {path}");
    }

    let source = source::build_source(&config, Duration::from_millis(args.mock_latency_ms))?;
    let (poller, rx) = Poller::new(source.clone(), config.poll, config.request_timeout);

    let mut app = App::new(source.label());
    if let Some(token) = args.page.as_deref() {
        match ResourceTab::from_token(token) {
            Some(tab) => app.open_tab(tab),
            None => warn!("unknown start page '{token}', opening the dashboard"),
        }
    }

    let mut runtime = Runtime {
        poller,
        rx,
        watcher,
        config,
        args,
    };
    run(&mut app, &mut runtime).await
}

fn init_tracing(level_filter: &str, log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_new(level_filter)
        .or_else(|_| EnvFilter::try_new("info"))
        .context("failed to initialize tracing filter")?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact();

    // The terminal belongs to the UI, so logs go to a file or nowhere.
    match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            let _ = builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init();
        }
        None => {
            let _ = builder.with_writer(std::io::sink).try_init();
        }
    }

    Ok(())
}

struct Runtime {
    poller: Poller,
    rx: mpsc::UnboundedReceiver<PollEvent>,
    watcher: RuntimeConfigWatcher,
    config: RuntimeConfig,
    args: CliArgs,
}

async fn run(app: &mut App, runtime: &mut Runtime) -> Result<()> {
    let (mut terminal, keyboard_enhanced) = init_terminal()?;
    let run_result = run_loop(&mut terminal, app, runtime).await;
    let restore_result = restore_terminal(&mut terminal, keyboard_enhanced);

    match (run_result, restore_result) {
        (Err(run_error), Err(restore_error)) => Err(anyhow::anyhow!(
            "{run_error:#}\nterminal restore error: {restore_error:#}"
        )),
        (Err(error), _) => Err(error),
        (_, Err(error)) => Err(error),
        (Ok(()), Ok(())) => Ok(()),
    }
}

fn init_terminal() -> Result<(TuiTerminal, bool)> {
    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    let keyboard_enhanced = matches!(supports_keyboard_enhancement(), Ok(true));
    if keyboard_enhanced {
        execute!(
            stdout,
            EnterAlternateScreen,
            PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                    | KeyboardEnhancementFlags::REPORT_ALTERNATE_KEYS
            )
        )
        .context("failed to enter alternate screen with keyboard enhancement")?;
    } else {
        execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("failed to create terminal backend")?;
    terminal.clear().context("failed to clear terminal")?;
    Ok((terminal, keyboard_enhanced))
}

fn restore_terminal(terminal: &mut TuiTerminal, keyboard_enhanced: bool) -> Result<()> {
    if keyboard_enhanced {
        execute!(terminal.backend_mut(), PopKeyboardEnhancementFlags)
            .context("failed to pop keyboard enhancement flags")?;
    }
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor().context("failed to show cursor")?;
    Ok(())
}

async fn run_loop(terminal: &mut TuiTerminal, app: &mut App, runtime: &mut Runtime) -> Result<()> {
    app.set_status(format!("Loading {}…", app.active_tab().title().to_ascii_lowercase()));
    runtime.poller.subscribe(PollTarget::Ping);
    runtime.poller.subscribe(PollTarget::Tab(app.active_tab()));

    let mut reader = EventStream::new();
    let mut redraw = interval(REDRAW_INTERVAL);
    redraw.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        terminal
            .draw(|frame| ui::render(frame, app))
            .context("failed to render terminal frame")?;

        if !app.running() {
            break;
        }

        tokio::select! {
            maybe_event = reader.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        if let Some(action) = input::map_key(app.mode(), key) {
                            debug!("action={action:?}");
                            let command = app.apply_action(action);
                            execute_app_command(app, &mut runtime.poller, command);
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(error)) => {
                        app.set_status(format!("terminal event error: {error}"));
                    }
                    None => {
                        app.set_status("terminal event stream closed");
                        break;
                    }
                }
            }
            maybe_event = runtime.rx.recv() => {
                let Some(event) = maybe_event else {
                    warn!("poll channel closed");
                    break;
                };
                handle_poll_event(app, runtime, event);
            }
            _ = redraw.tick() => {}
        }
    }

    Ok(())
}

fn handle_poll_event(app: &mut App, runtime: &mut Runtime, event: PollEvent) {
    match event {
        PollEvent::Fetched { tab, result } => {
            if let Err(error) = &result {
                debug!("fetch failed for {}: {error}", tab.title());
            }
            app.apply_fetch(tab, result);
        }
        PollEvent::Ping(result) => {
            app.apply_ping(result);
            reload_runtime_config(app, runtime);
        }
        PollEvent::ScanFinished(result) => {
            let command = app.apply_scan_finished(result);
            execute_app_command(app, &mut runtime.poller, command);
        }
    }
}

fn execute_app_command(app: &mut App, poller: &mut Poller, command: AppCommand) {
    match command {
        AppCommand::None => {}
        AppCommand::RefreshActive => poller.subscribe(PollTarget::Tab(app.active_tab())),
        AppCommand::TriggerScan => poller.trigger_scan(),
        AppCommand::SwitchedTab { from, to } => {
            poller.unsubscribe(PollTarget::Tab(from));
            poller.subscribe(PollTarget::Tab(to));
        }
    }
}

/// Picks up edits to the config file. Poll intervals apply live; anything
/// else only takes effect after a restart.
fn reload_runtime_config(app: &mut App, runtime: &mut Runtime) {
    let mut next = match runtime.watcher.reload_if_changed() {
        Ok(Some(config)) => config,
        Ok(None) => return,
        Err(error) => {
            warn!("config reload failed: {error:#}");
            app.set_status(format!("Config reload failed: {}", poll::compact_error(&error)));
            return;
        }
    };
    next.apply_cli(&runtime.args);

    if next.poll != runtime.config.poll {
        info!("poll intervals changed: {:?}", next.poll);
        runtime.poller.set_intervals(next.poll);
        app.set_status("Config reloaded, poll intervals updated");
    }
    if runtime.config.requires_restart(&next) {
        warn!("config change needs a restart to take effect");
        app.set_status("Config changed; restart doku to switch data source");
    }
    runtime.config = next;
}
