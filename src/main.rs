use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Parser};
use color_eyre::Result;
use color_eyre::eyre::{WrapErr, eyre};

use hostpulse::action::Action;
use hostpulse::app::{App, run_collection};
use hostpulse::config::{self, Config, SCAN_ROOT_ENV};
use hostpulse::event::{Event, EventHandler};
use hostpulse::logging::{self, LogSettings, LogTarget};
use hostpulse::report::ReportFormat;
use hostpulse::system::collector::Collector;
use hostpulse::ui;

#[derive(Parser)]
#[command(
    name = "hostpulse",
    version,
    about = "Point-in-time host health report: CPU, memory, load, processes and disk composition"
)]
struct Cli {
    /// Path to config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory to scan recursively (default: home directory)
    #[arg(long)]
    root: Option<PathBuf>,

    /// Report format for one-shot mode
    #[arg(long, value_enum)]
    format: Option<ReportFormat>,

    /// Write the report to this file instead of stdout
    #[arg(long, conflicts_with = "watch")]
    output: Option<PathBuf>,

    /// Live terminal dashboard that re-collects on every tick
    #[arg(long)]
    watch: bool,

    /// Watch-mode refresh rate in milliseconds
    #[arg(long)]
    refresh_rate: Option<u64>,

    /// Abort a collection after this many milliseconds (0 disables)
    #[arg(long)]
    timeout: Option<u64>,

    /// Exit with an error if any section is unavailable
    #[arg(long)]
    strict: bool,

    /// Write logs to this file (required for logs in watch mode)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let config = load_config_for_cli(&cli);
    logging::init_tracing(&log_settings(&cli, &config)?)?;

    if cli.watch && config.general.refresh_rate_ms == 0 {
        return Err(eyre!("--refresh-rate must be greater than 0"));
    }

    let collector = Collector::new(config.collector_config());
    tracing::info!(
        scan_root = ?collector.config().scan_root,
        watch = cli.watch,
        "starting"
    );

    if cli.watch {
        return run_watch(config, collector).await;
    }
    run_once(&cli, &config, &collector)
}

fn load_config_for_cli(cli: &Cli) -> Config {
    let mut config = match &cli.config {
        Some(path) => {
            let mut config = config::load_config_from_path(path);
            config.apply_scan_root_override(std::env::var_os(SCAN_ROOT_ENV));
            config
        }
        None => config::load_config(),
    };

    if let Some(root) = &cli.root {
        config.apply_scan_root_override(Some(OsString::from(root)));
    }
    if let Some(format) = cli.format {
        config.general.format = format;
    }
    if let Some(rate) = cli.refresh_rate {
        config.general.refresh_rate_ms = rate;
    }
    if let Some(timeout) = cli.timeout {
        config.general.collect_timeout_ms = timeout;
    }

    config
}

fn log_settings(cli: &Cli, config: &Config) -> Result<LogSettings> {
    let base = logging::parse_level(&config.logging.level)
        .ok_or_else(|| eyre!("unknown log level `{}`", config.logging.level))?;
    let target = match (&cli.log_file, cli.watch) {
        (Some(path), _) => LogTarget::File(path.clone()),
        // stderr would draw over the dashboard
        (None, true) => LogTarget::Disabled,
        (None, false) => LogTarget::Stderr,
    };
    Ok(LogSettings {
        level: logging::raise_level(base, cli.verbose),
        json: config.logging.json,
        target,
    })
}

fn run_once(cli: &Cli, config: &Config, collector: &Collector) -> Result<()> {
    let snapshot = run_collection(collector, config.collect_timeout())
        .wrap_err("failed to collect a host snapshot")?;

    if let Some(err) = snapshot.first_failure() {
        if cli.strict {
            return Err(eyre!(err.clone()).wrap_err("snapshot is incomplete"));
        }
        for (section, err) in snapshot.failures() {
            tracing::warn!(section, error = %err, "rendering degraded report");
        }
    }

    let rendered = config.general.format.render(&snapshot)?;
    match &cli.output {
        Some(path) => {
            std::fs::write(path, rendered)
                .wrap_err_with(|| format!("failed to write {}", path.display()))?;
            println!(
                "Report written to {} (captured {})",
                path.display(),
                snapshot.timestamp.format("%Y-%m-%d %H:%M:%S")
            );
        }
        None => print!("{rendered}"),
    }
    Ok(())
}

async fn run_watch(config: Config, collector: Collector) -> Result<()> {
    // init() also installs a panic hook that restores the terminal
    let mut terminal = ratatui::init();
    let result = watch_loop(&mut terminal, config, collector).await;

    ratatui::restore();
    result
}

async fn watch_loop(
    terminal: &mut ratatui::DefaultTerminal,
    config: Config,
    collector: Collector,
) -> Result<()> {
    let tick_rate = Duration::from_millis(config.general.refresh_rate_ms);
    let mut app = App::new(&config, collector);
    let mut events = EventHandler::new(tick_rate);

    spawn_collect(&mut app, &events);
    terminal.draw(|frame| ui::draw(frame, &app))?;

    while app.running {
        let Some(event) = events.next().await else {
            break;
        };
        match event {
            Event::Key(key) => {
                if key.kind != crossterm::event::KeyEventKind::Press {
                    continue;
                }
                let action = app.map_key(key);
                if action == Action::Refresh {
                    spawn_collect(&mut app, &events);
                }
                app.dispatch(action);
            }
            Event::Tick => {
                app.expire_status();
                spawn_collect(&mut app, &events);
            }
            Event::Resize => {}
            Event::Collected(result) => app.on_collected(*result),
        }
        terminal.draw(|frame| ui::draw(frame, &app))?;
    }

    Ok(())
}

fn spawn_collect(app: &mut App, events: &EventHandler) {
    let Some(job) = app.begin_collect() else {
        return;
    };
    let tx = events.sender();
    tokio::task::spawn_blocking(move || {
        let _ = tx.send(Event::Collected(Box::new(job.run())));
    });
}
