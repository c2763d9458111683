mod config_cmd;
mod import_cmd;
mod menu_cmd;

use clap::ValueEnum;

pub use config_cmd::ConfigCommand;
pub use import_cmd::ImportCommand;
pub use menu_cmd::MenuCommand;

#[derive(Clone, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}
