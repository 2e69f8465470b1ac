pub mod commands;
pub mod handlers;

pub use commands::{CLAP_STYLING, DEFAULT_DB_PATH, command_argument_builder};
pub use handlers::{GlobalOptions, OutputFormat, client_config, expand_db_path, open_database};
