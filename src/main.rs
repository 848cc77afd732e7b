mod api;
mod config;
mod dashboard;
mod models;
mod tui;

use anyhow::{Context, Result};
use crossterm::{
    event::{Event, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use api::{EventsApi, HttpEventsApi};
use config::Config;
use dashboard::filter::FilterCategory;
use dashboard::{Dashboard, Route};
use tui::App;

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.iter().any(|a| a == "--init") {
        let path = Config::generate_default()?;
        println!("Generated config file at: {}", path.display());
        println!("Edit api_url and session_cookie, then run inbox-tui.");
        return Ok(());
    }

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_help();
        return Ok(());
    }

    let interactive = !args
        .iter()
        .any(|a| a == "--list" || a == "--login");
    init_logging(interactive)?;

    let config = Config::load().with_context(|| {
        "Failed to load configuration.\n\
         Run `inbox-tui --init` to generate a config file,\n\
         or set INBOX_API_URL and INBOX_SESSION environment variables."
    })?;
    tracing::info!(api_url = %config.api_url, "configuration loaded");

    let api = Arc::new(HttpEventsApi::new(&config)?);

    if args.iter().any(|a| a == "--login") {
        api.initiate_google_login()?;
        println!("Opened the sign-in page in your browser.");
        return Ok(());
    }

    if args.iter().any(|a| a == "--list") {
        let filter = flag_value(&args, "--filter")
            .map(FilterCategory::from_label)
            .unwrap_or_default();
        let sync = args.iter().any(|a| a == "--sync");
        return run_headless(api, filter, sync).await;
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, api).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
    }

    Ok(())
}

fn print_help() {
    println!("inbox-tui — interviews, exams and deadlines found in your email");
    println!();
    println!("USAGE:");
    println!("  inbox-tui                          Start the TUI");
    println!("  inbox-tui --init                   Generate a default config file");
    println!("  inbox-tui --login                  Open the Google sign-in page");
    println!("  inbox-tui --list [--filter <cat>] [--sync]");
    println!("                                     Print events and exit");
    println!();
    println!("CONFIG:");
    println!("  File: ~/.config/inbox-tui/config.toml");
    println!("  Env:  INBOX_API_URL, INBOX_SESSION (overrides the file)");
    println!("  Logs: INBOX_LOG sets the filter (default: info)");
    println!();
    println!("KEYBINDINGS:");
    println!("  1-4 / Tab         Filter: All, Interview, Exam, Other");
    println!("  j / k / Up / Down Navigate events");
    println!("  s                 Sync emails");
    println!("  o / Enter         Open the event's link");
    println!("  x                 Switch account (log out)");
    println!("  q / Ctrl+C        Quit");
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

/// The TUI owns the terminal, so interactive runs log to a file in the
/// cache directory; headless commands log to stderr.
fn init_logging(interactive: bool) -> Result<()> {
    let filter = EnvFilter::try_from_env("INBOX_LOG").unwrap_or_else(|_| EnvFilter::new("info"));

    if !interactive {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
        return Ok(());
    }

    let Some(dir) = dirs::cache_dir().map(|d| d.join("inbox-tui")) else {
        return Ok(());
    };
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("inbox-tui.log"))
        .with_context(|| "Failed to open log file")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

async fn run_headless<C: EventsApi + 'static>(
    api: Arc<C>,
    filter: FilterCategory,
    sync: bool,
) -> Result<()> {
    let mut dashboard = Dashboard::mount(api);
    dashboard.settle().await;

    if sync && dashboard.start_sync() {
        dashboard.settle().await;
    }

    dashboard.set_filter(filter);
    let mut out = io::stdout().lock();
    for line in dashboard.view().plain_lines() {
        writeln!(out, "{line}")?;
    }
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    api: Arc<HttpEventsApi>,
) -> Result<()> {
    // Without a configured session the server will refuse every call, so
    // start on the sign-in screen.
    let start = if api.has_session() {
        Route::Dashboard
    } else {
        Route::Login
    };
    let mut app = App::new(api, start);

    loop {
        app.frame_count = app.frame_count.wrapping_add(1);
        terminal.draw(|f| tui::ui::render(f, &mut app))?;

        if let Some(Event::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            ..
        })) = tui::event::poll_event(Duration::from_millis(100))?
        {
            tui::event::handle_key(&mut app, code, modifiers);
        }

        if !app.running {
            break;
        }

        // Apply completed network results without blocking.
        app.poll_background();
    }

    Ok(())
}
