use clap::{Args, Subcommand};

use super::OutputFormat;
use kruatayai::config::{Config, ConfigValue};

#[derive(Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub command: ConfigSubcommand,
}

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Show current configuration values
    Show {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

impl ConfigCommand {
    pub fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            ConfigSubcommand::Show { format } => {
                let mut shown = config.clone();
                mask(&mut shown.admin_secret);
                mask(&mut shown.sync_secret);

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&shown)?);
                    }
                    OutputFormat::Text => {
                        println!("Configuration");
                        println!("=============\n");

                        if let Some(path) = &shown.config_file {
                            println!("Config file: {}", path.display());
                        } else {
                            println!(
                                "Config file: {} (not found)",
                                Config::default_config_path().display()
                            );
                        }
                        println!();

                        println!("database_path: {}", shown.database_path.value.display());
                        println!("  source: {}", shown.database_path.source);
                        println!();

                        println!("port: {}", shown.port.value);
                        println!("  source: {}", shown.port.source);
                        println!();

                        println!("static_dir: {}", shown.static_dir.value.display());
                        println!("  source: {}", shown.static_dir.source);
                        println!();

                        for (name, secret) in [
                            ("admin_secret", &shown.admin_secret),
                            ("sync_secret", &shown.sync_secret),
                        ] {
                            let value = secret.value.as_deref().unwrap_or("(not set)");
                            println!("{}: {}", name, value);
                            println!("  source: {}", secret.source);
                            println!();
                        }

                        println!(
                            "rate_limit: {} requests / {}s",
                            shown.rate_limit.max_requests, shown.rate_limit.window_secs
                        );
                    }
                }
                Ok(())
            }
        }
    }
}

fn mask(secret: &mut ConfigValue<Option<String>>) {
    if let Some(value) = secret.value.as_mut() {
        *value = "********".to_string();
    }
}
