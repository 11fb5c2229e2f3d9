use artistgrid::config::{AppConfig, CliConfig, FileConfig};
use artistgrid::report::{self, Report};
use artistgrid::{history, top_grid, AggregateError, GridSize, RankedEntity, Window};
use chrono::Local;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "artistgrid")]
#[command(author, version, about = "Show your most-played artists as an image grid")]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Listening-history CSV (optional in GUI mode)
    path: Option<PathBuf>,

    /// Launch GUI file picker (auto-enabled when double-clicked)
    #[arg(long)]
    gui: bool,

    /// Grid size: 3, 5 or 7
    #[arg(short, long)]
    grid: Option<GridSize>,

    /// Time window: 1w, 1m, 3m, 12m, 3y, all
    #[arg(short, long)]
    window: Option<Window>,

    /// Output report file (.html, .json, .csv)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Directory for auto-generated reports
    #[arg(long)]
    report_dir: Option<PathBuf>,

    /// Don't auto-generate an HTML report
    #[arg(long)]
    no_report: bool,

    /// Don't prompt to open report
    #[arg(long)]
    no_open: bool,

    /// Only show errors
    #[arg(short, long)]
    quiet: bool,

    /// TOML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start interactive dashboard
    Serve {
        /// Listening-history CSV
        path: Option<PathBuf>,

        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },
}

fn main() {
    let args = Args::parse();

    init_logging();

    // Load TOML config if provided
    let file_config = match &args.config {
        Some(path) => match FileConfig::load(path) {
            Ok(config) => Some(config),
            Err(e) => {
                eprintln!("Config error: {}", e);
                std::process::exit(1);
            }
        },
        None => None,
    };

    // Handle subcommands first
    if let Some(Command::Serve { path, port }) = args.command {
        let cli = CliConfig {
            data_path: path,
            interactive_path: None,
            port,
            grid: args.grid,
            window: args.window,
            report_dir: args.report_dir.clone(),
        };
        let config = resolve_or_exit(&cli, file_config);
        if let Err(e) = artistgrid::serve::start(&config) {
            eprintln!("Server error: {}", e);
            std::process::exit(1);
        }
        return;
    }

    // Determine if we should use GUI mode
    // With GUI feature: launch GUI if --gui flag OR no path given anywhere
    #[cfg(feature = "gui")]
    let use_gui = args.gui
        || (args.path.is_none() && file_config.as_ref().and_then(|f| f.data_path.as_ref()).is_none());

    #[cfg(not(feature = "gui"))]
    let use_gui = false;

    // A picked file beats data_path from the config file
    #[cfg(feature = "gui")]
    let picked = if use_gui {
        match pick_path_gui() {
            Some(p) => Some(p),
            None => {
                // User cancelled - show message and exit
                eprintln!("No file selected.");
                std::process::exit(0);
            }
        }
    } else {
        None
    };

    #[cfg(not(feature = "gui"))]
    let picked = None;

    let cli = CliConfig {
        data_path: args.path.clone(),
        interactive_path: picked,
        port: None,
        grid: args.grid,
        window: args.window,
        report_dir: args.report_dir.clone(),
    };
    let config = resolve_or_exit(&cli, file_config);

    if !args.quiet {
        eprintln!("\x1b[1martistgrid - Top Artists\x1b[0m");
        eprintln!("{}", "─".repeat(70));
    }

    // Load history
    let spinner = if args.quiet {
        None
    } else {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            pb.set_style(style);
        }
        pb.set_message(format!("Reading {}", config.data_path.display()));
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    };

    let events = match history::load(&config.data_path) {
        Ok(events) => events,
        Err(e) => {
            if let Some(pb) = spinner {
                pb.finish_and_clear();
            }
            eprintln!("Failed to load {}: {}", config.data_path.display(), e);
            std::process::exit(1);
        }
    };

    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    let grid = config.default_grid;
    let window = config.default_window;

    let artists = match top_grid(&events, window, grid) {
        Ok(artists) => artists,
        // Nothing to rank: render an empty grid
        Err(AggregateError::EmptyDataset) => Vec::new(),
        Err(e) => {
            eprintln!("Ranking failed: {}", e);
            std::process::exit(1);
        }
    };

    let report = Report::new(window, grid, config.layout, &events, artists);

    // Print results
    if !args.quiet {
        eprintln!("Read {} listen(s)\n", events.len());
        eprintln!("\x1b[1m{}\x1b[0m\n", report.title());
        print_table(&report.artists);

        eprintln!("\n{}", "─".repeat(70));
        eprintln!("\x1b[1mSummary:\x1b[0m");
        eprintln!("  Artists shown: {}", report.summary.shown_artists);
        eprintln!("  Plays shown:   {}", report.summary.shown_listens);
        if let (Some(first), Some(last)) = (report.summary.first_listen, report.summary.last_listen) {
            eprintln!("  History:       {} .. {}", first.format("%Y-%m-%d"), last.format("%Y-%m-%d"));
        }
    }

    // Determine report path
    let report_path = if let Some(ref output) = args.output {
        Some(output.clone())
    } else if !args.no_report {
        // Auto-generate report
        std::fs::create_dir_all(&config.report_dir).ok();
        let timestamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
        Some(config.report_dir.join(report::default_filename(window, grid, &timestamp)))
    } else {
        None
    };

    // Generate report
    if let Some(ref output_path) = report_path {
        if let Err(e) = report::generate(output_path, &report) {
            eprintln!("Failed to write report: {}", e);
            std::process::exit(1);
        }
        if !args.quiet {
            eprintln!("\n\x1b[32mReport saved: {}\x1b[0m", output_path.display());
        }

        // Open report
        if !args.no_open {
            if use_gui {
                // In GUI mode, auto-open the report (no prompt)
                let _ = open::that(output_path);
            } else if !args.quiet {
                // In terminal mode, ask first
                eprint!("\nOpen report in browser? [Y/n] ");
                io::stderr().flush().ok();

                let mut input = String::new();
                if io::stdin().read_line(&mut input).is_ok() {
                    let input = input.trim().to_lowercase();
                    if input.is_empty() || input == "y" || input == "yes" {
                        if let Err(e) = open::that(output_path) {
                            eprintln!("Failed to open report: {}", e);
                        }
                    }
                }
            }
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .with_env_var("LOG_LEVEL")
        .from_env_lossy();

    // Logs go to stderr so stdout stays a clean table
    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(filter)
        .try_init();
}

fn resolve_or_exit(cli: &CliConfig, file_config: Option<FileConfig>) -> AppConfig {
    match AppConfig::resolve(cli, file_config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            eprintln!("Run 'artistgrid --help' for more options.");
            std::process::exit(1);
        }
    }
}

fn print_table(artists: &[RankedEntity]) {
    if artists.is_empty() {
        println!("No listens in this window.");
        return;
    }

    println!("{:>4}  {:<40}  {:>6}", "RANK", "ARTIST", "PLAYS");
    println!("{}", "-".repeat(54));
    for (i, a) in artists.iter().enumerate() {
        println!("{:>4}  {:<40}  {:>6}", i + 1, truncate(&a.entity_label, 40), a.count);
    }
}

#[cfg(feature = "gui")]
fn pick_path_gui() -> Option<PathBuf> {
    rfd::FileDialog::new()
        .set_title("Select listening-history CSV")
        .add_filter("CSV files", &["csv"])
        .pick_file()
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{}...", head)
    }
}
