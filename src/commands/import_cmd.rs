use clap::Args;
use std::path::PathBuf;

use kruatayai::db::DataImporter;

#[derive(Args)]
pub struct ImportCommand {
    /// Directory containing menu.json, gallery.json, reservations.json,
    /// news.json, reviews.json and settings.json
    pub data_dir: PathBuf,
}

impl ImportCommand {
    pub async fn run(&self, importer: &DataImporter) -> Result<(), Box<dyn std::error::Error>> {
        println!("Importing data from {}...", self.data_dir.display());

        let report = importer.import_dir(&self.data_dir).await?;

        println!("{}", report);
        println!("Import completed");
        Ok(())
    }
}
