use colored::{Color, ColoredString, Colorize};
use env_logger::Builder;
use log::Level;
use std::io::Write;

/// Colors used by the shell when rendering records.
pub struct Colors;

impl Colors {
    pub const HEADING: Color = Color::Cyan;
    pub const ERROR: Color = Color::Red;
    pub const FIELD: Color = Color::White;

    pub fn paint(color: Color, text: &str) -> ColoredString {
        text.color(color)
    }
}

/// Install the env_logger backend. Safe to call more than once; later calls are ignored.
pub fn setup_logging(verbose: bool) {
    use log::LevelFilter;

    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    let _ = Builder::from_default_env()
        .filter_level(LevelFilter::Warn) // Default: only warnings from dependencies
        .filter_module(env!("CARGO_PKG_NAME"), level) // Our crate: use requested level
        .format(|buf, record| {
            let name = env!("CARGO_PKG_NAME");
            let line = match record.level() {
                Level::Error | Level::Warn => {
                    let level_str = match record.level() {
                        Level::Warn => "WARN".yellow(),
                        _ => "ERROR".red(),
                    };
                    let path = record.target().to_string().white();
                    format!("[{} {} {}] {}", name.cyan(), level_str, path, record.args())
                }
                _ => format!("[{}] {}", name.cyan(), record.args()),
            };
            writeln!(buf, "{}", line)
        })
        .try_init();
}
