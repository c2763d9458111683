use clap::{Args, Subcommand};
use std::collections::HashMap;

use super::OutputFormat;
use kruatayai::db::MenuRepository;

#[derive(Args)]
pub struct MenuCommand {
    #[command(subcommand)]
    pub command: MenuSubcommand,
}

#[derive(Subcommand)]
pub enum MenuSubcommand {
    /// List menu items as currently stored
    List {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

impl MenuCommand {
    pub async fn run(&self, repo: &MenuRepository) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            MenuSubcommand::List { format } => {
                let menu = repo.menu().await?;

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&menu)?);
                    }
                    OutputFormat::Text => {
                        if menu.items.is_empty() {
                            println!("No menu items found");
                            return Ok(());
                        }

                        let categories: HashMap<&str, &str> = menu
                            .categories
                            .iter()
                            .map(|c| (c.id.as_str(), c.name.as_str()))
                            .collect();

                        println!(
                            "{:<10}  {:<30}  {:<16}  {:>7}  FLAGS",
                            "ID", "NAME", "CATEGORY", "PRICE"
                        );
                        println!("{}", "-".repeat(80));
                        for item in &menu.items {
                            let category = item
                                .category
                                .as_ref()
                                .map(|c| {
                                    categories.get(c.as_str()).copied().unwrap_or(c.as_str())
                                })
                                .unwrap_or("-");

                            let mut flags = Vec::new();
                            if item.is_popular {
                                flags.push("popular");
                            }
                            if !item.is_available {
                                flags.push("unavailable");
                            }

                            println!(
                                "{:<10}  {:<30}  {:<16}  {:>7}  {}",
                                item.id,
                                truncate(&item.name, 30),
                                truncate(category, 16),
                                item.price,
                                flags.join(", ")
                            );
                        }
                        println!(
                            "\n{} item(s) in {} categories",
                            menu.items.len(),
                            menu.categories.len()
                        );
                    }
                }
                Ok(())
            }
        }
    }
}

/// Char-based so Thai names are never split mid-character.
fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() > width {
        let head: String = s.chars().take(width - 3).collect();
        format!("{}...", head)
    } else {
        s.to_string()
    }
}
