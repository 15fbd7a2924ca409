mod app;

use std::fs::File;
use std::io;
use std::panic;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use gridview::column::ColumnModel;
use gridview::config::GridConfig;
use gridview::error::GridError;
use gridview::fileio::FileIO;
use gridview::tui::ui;

use app::App;

struct Args {
    file_path: PathBuf,
    delimiter: Option<u8>,
    config: Option<PathBuf>,
    has_header: bool,
    log: Option<PathBuf>,
}

/// Parse command line arguments
fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().collect();
    let mut file_path: Option<PathBuf> = None;
    let mut delimiter: Option<u8> = None;
    let mut config: Option<PathBuf> = None;
    let mut has_header = true;
    let mut log: Option<PathBuf> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-d" | "--delimiter" => {
                delimiter = parse_delimiter(option_value(&args, i, "--delimiter"));
                i += 2;
            }
            "-c" | "--config" => {
                config = Some(PathBuf::from(option_value(&args, i, "--config")));
                i += 2;
            }
            "--log" => {
                log = Some(PathBuf::from(option_value(&args, i, "--log")));
                i += 2;
            }
            "--no-header" => {
                has_header = false;
                i += 1;
            }
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            arg if arg.starts_with('-') => {
                eprintln!("Unknown option: {}", arg);
                std::process::exit(1);
            }
            _ => {
                file_path = Some(PathBuf::from(&args[i]));
                i += 1;
            }
        }
    }

    let Some(file_path) = file_path else {
        print_help();
        std::process::exit(1);
    };
    Args {
        file_path,
        delimiter,
        config,
        has_header,
        log,
    }
}

fn option_value<'a>(args: &'a [String], i: usize, name: &str) -> &'a str {
    match args.get(i + 1) {
        Some(value) => value,
        None => {
            eprintln!("Error: {} requires an argument", name);
            std::process::exit(1);
        }
    }
}

/// Parse a delimiter string into a byte
fn parse_delimiter(s: &str) -> Option<u8> {
    match s.to_lowercase().as_str() {
        "comma" | "," => Some(b','),
        "tab" | "\\t" | "\t" => Some(b'\t'),
        "semicolon" | ";" => Some(b';'),
        "pipe" | "|" => Some(b'|'),
        _ if s.len() == 1 => Some(s.as_bytes()[0]),
        _ => {
            eprintln!("Invalid delimiter: '{}'. Use comma, tab, semicolon, pipe, or a single character.", s);
            std::process::exit(1);
        }
    }
}

/// Log to `path` when given; otherwise logging is off, since the terminal
/// belongs to the grid
fn init_logging(path: Option<&Path>) -> io::Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = File::create(path)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture)
}

/// Handle panics gracefully
fn install_panic_hook() {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        let _ = restore_terminal();

        if let Some(location) = info.location() {
            error!(file = location.file(), line = location.line(), "panic occurred");
        } else {
            error!("panic occurred");
        }

        if let Some(s) = info.payload().downcast_ref::<&str>() {
            error!(message = %s);
        } else if let Some(s) = info.payload().downcast_ref::<String>() {
            error!(message = %s);
        }

        default_hook(info);
    }));
}

/// Sizing that suits a character grid when no config file is given
fn terminal_config() -> GridConfig {
    GridConfig {
        default_width: 12,
        min_column_width: 4,
        auto_size_columns: true,
        auto_size_headers: true,
        max_rows_to_measure: Some(1000),
        width_fudge: 1,
        row_height: 1,
        ..GridConfig::default()
    }
}

fn print_help() {
    eprintln!("gridview - view CSV/TSV files in a sortable, resizable terminal grid");
    eprintln!();
    eprintln!("USAGE:");
    eprintln!("    gridview [OPTIONS] FILE");
    eprintln!();
    eprintln!("OPTIONS:");
    eprintln!("    -d, --delimiter <DELIM>  Set the field delimiter (comma, tab, semicolon, pipe, or char)");
    eprintln!("    -c, --config <FILE>      Load grid settings and column definitions from TOML");
    eprintln!("    --no-header              Treat the first record as data");
    eprintln!("    --log <FILE>             Write logs to FILE (filter with RUST_LOG)");
    eprintln!("    -h, --help               Print this help message");
    eprintln!();
    eprintln!("KEYS:");
    eprintln!("    j/k  focus next/previous row    h/l  scroll left/right");
    eprintln!("    a    auto-size columns          q    quit");
    eprintln!();
    eprintln!("Click a header to sort, drag its right edge to resize, double-click the edge to fit.");
}

fn to_io(e: GridError) -> io::Error {
    match e {
        GridError::Io(e) => e,
        other => io::Error::other(other),
    }
}

fn main() -> io::Result<()> {
    let args = parse_args();
    init_logging(args.log.as_deref())?;
    info!("gridview started");

    install_panic_hook();

    let config = match &args.config {
        Some(path) => GridConfig::from_file(path).map_err(|e| {
            error!(error = %e, "failed to load config");
            to_io(e)
        })?,
        None => terminal_config(),
    };

    let file_io = FileIO::new(args.file_path, args.delimiter, args.has_header);
    let load_result = file_io.load(&config).map_err(|e| {
        error!(error = %e, "failed to load file");
        to_io(e)
    })?;
    let columns = ColumnModel::with_defaults(load_result.columns, config.default_width, config.default_sortable)
        .map_err(to_io)?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut messages = load_result.warnings;
    messages.push(format!("Delimiter: {}", file_io.delimiter_name()));

    let area = ui::body_area(terminal.size()?);
    let result = App::new(columns, load_result.rows, config, file_io, area)
        .map_err(to_io)
        .and_then(|mut app| {
            app.set_message(messages.join("; "));
            app.run(&mut terminal)
        });

    restore_terminal()?;
    result
}
