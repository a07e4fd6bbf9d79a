//! Engine: extraction, database access, path filtering, and the CLI surface.

pub mod arg_parser;
pub mod cli;
pub mod db_ops;
pub mod extract;
pub mod shell;
pub mod tools;

// Re-export commonly used functions
pub use arg_parser::Cli;
pub use cli::handle_run;
pub use db_ops::{
    PersistSummary, load_records, open_db, open_db_in_memory, persist_records, record_count,
    upsert_record,
};
pub use extract::{Extractor, MediaExtractor};
pub use shell::{Command, run_shell};
pub use tools::{Exclusions, glob_match, path_to_db_string, should_include};
