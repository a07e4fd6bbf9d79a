//! Line-command shell over a finished [`Library`].

use std::io::{self, BufRead, Write};
use std::path::Path;

use crate::library::Library;
use crate::utils::Colors;
use crate::{Field, StoredRow};

const SEPARATOR: &str = "---------------------------------------";

/// One parsed input line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Help,
    List,
    Db,
    Tag { path: String, tag: String },
    ViewTag { path: String },
    Exit,
    Empty,
    /// Known command with missing arguments; holds the usage line.
    Usage(&'static str),
    Unknown(String),
}

impl Command {
    /// Parse a whitespace-separated command line. Extra words are ignored.
    pub fn parse(line: &str) -> Self {
        let mut words = line.split_whitespace();
        let Some(cmd) = words.next() else {
            return Command::Empty;
        };
        match cmd {
            "help" => Command::Help,
            "list" => Command::List,
            "db" => Command::Db,
            "exit" | "quit" => Command::Exit,
            "tag" => match (words.next(), words.next()) {
                (Some(path), Some(tag)) => Command::Tag {
                    path: path.to_string(),
                    tag: tag.to_string(),
                },
                _ => Command::Usage("Usage: tag <filepath> <tag>"),
            },
            "viewtag" => match words.next() {
                Some(path) => Command::ViewTag {
                    path: path.to_string(),
                },
                None => Command::Usage("Usage: viewtag <filepath>"),
            },
            other => Command::Unknown(other.to_string()),
        }
    }
}

fn write_help(out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "Available commands:")?;
    writeln!(out, "  list                : View in-memory metadata.")?;
    writeln!(out, "  db                  : Display database contents.")?;
    writeln!(out, "  tag <filepath> <tag>: Add a custom tag to a file.")?;
    writeln!(out, "  viewtag <filepath>  : View custom tags for a file.")?;
    writeln!(out, "  exit                : Exit the program.")
}

/// Render the in-memory records, sorted by path.
pub fn write_records(library: &Library, out: &mut impl Write) -> io::Result<()> {
    writeln!(
        out,
        "\n{}",
        Colors::paint(Colors::HEADING, "Library Content Manager - Media Metadata:")
    )?;
    for (path, record) in library.sorted_records() {
        writeln!(out, "File: {}", path.display())?;
        for (field, value) in record.iter() {
            let name = Colors::paint(Colors::FIELD, field.as_str());
            if field == Field::Error {
                writeln!(out, "  {} : {}", name, Colors::paint(Colors::ERROR, value))?;
            } else {
                writeln!(out, "  {} : {}", name, value)?;
            }
        }
        writeln!(out, "{SEPARATOR}")?;
    }
    Ok(())
}

/// Render database rows in column order.
pub fn write_rows(rows: &[StoredRow], out: &mut impl Write) -> io::Result<()> {
    writeln!(
        out,
        "\n{}",
        Colors::paint(Colors::HEADING, "Database Contents:")
    )?;
    for row in rows {
        writeln!(out, "File: {}", row.filepath)?;
        writeln!(out, "  Type: {}", row.kind)?;
        writeln!(out, "  Artist: {}", row.artist)?;
        writeln!(out, "  Album: {}", row.album)?;
        writeln!(out, "  Title: {}", row.title)?;
        writeln!(out, "  Year: {}", row.year)?;
        writeln!(out, "  Duration: {}", row.duration)?;
        writeln!(out, "{SEPARATOR}")?;
    }
    Ok(())
}

/// Apply one command. Returns false when the shell should exit.
pub fn execute(library: &mut Library, command: Command, out: &mut impl Write) -> io::Result<bool> {
    match command {
        Command::Help => write_help(out)?,
        Command::List => write_records(library, out)?,
        Command::Db => match library.stored_rows() {
            Ok(rows) => write_rows(&rows, out)?,
            Err(e) => {
                log::error!("Failed to query database: {:#}", e);
            }
        },
        Command::Tag { path, tag } => {
            if library.add_tag(path.as_str(), tag) {
                writeln!(out, "Tag added.")?;
            } else {
                writeln!(out, "Usage: tag <filepath> <tag>")?;
            }
        }
        Command::ViewTag { path } => {
            let tags = library.tags(Path::new(&path));
            if tags.is_empty() {
                writeln!(out, "No custom tags for {}.", path)?;
            } else {
                writeln!(out, "Custom Tags for {}:", path)?;
                for tag in tags {
                    writeln!(out, "  {}", tag)?;
                }
            }
        }
        Command::Exit => return Ok(false),
        Command::Empty => {}
        Command::Usage(usage) => writeln!(out, "{usage}")?,
        Command::Unknown(_) => writeln!(
            out,
            "Unknown command. Type 'help' for a list of available commands."
        )?,
    }
    Ok(true)
}

/// Read commands from `input` until `exit` or end of input.
pub fn run_shell<R: BufRead, W: Write>(
    library: &mut Library,
    input: R,
    mut out: W,
) -> io::Result<()> {
    writeln!(out, "\nEnter a command (type 'help' for a list of commands):")?;
    let mut lines = input.lines();
    loop {
        write!(out, "> ")?;
        out.flush()?;
        let Some(line) = lines.next() else {
            break;
        };
        if !execute(library, Command::parse(&line?), &mut out)? {
            break;
        }
    }
    Ok(())
}
