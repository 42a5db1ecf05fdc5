// ==========================================
// Asset Inventory - CLI entry point
// ==========================================
// Imports one CSV document into the inventory database and prints the
// per-row results as JSON.
// ==========================================

use asset_inventory::api::ImportApi;
use asset_inventory::config::AppConfig;
use asset_inventory::repository::AssetRepository;
use std::process::ExitCode;
use std::sync::Arc;

fn main() -> ExitCode {
    asset_inventory::logging::init();

    tracing::info!("==================================================");
    tracing::info!("{} v{}", asset_inventory::APP_NAME, asset_inventory::VERSION);
    tracing::info!("==================================================");

    let mut args = std::env::args().skip(1);
    let Some(csv_path) = args.next() else {
        eprintln!("usage: asset-inventory <csv-file> [user]");
        return ExitCode::from(2);
    };
    let user = args.next().unwrap_or_else(|| "cli".to_string());

    let config = AppConfig::from_env();
    tracing::info!(db = %config.db_path, "opening inventory database");

    let repo = match AssetRepository::open(&config.db_path) {
        Ok(repo) => Arc::new(repo),
        Err(error) => {
            tracing::error!(%error, "cannot open the inventory database");
            return ExitCode::FAILURE;
        }
    };

    let csv_text = match std::fs::read_to_string(&csv_path) {
        Ok(text) => text,
        Err(error) => {
            tracing::error!(path = %csv_path, %error, "cannot read the CSV file");
            return ExitCode::FAILURE;
        }
    };

    let api = ImportApi::new(repo)
        .with_sanitize_names(config.sanitize_names)
        .with_licensing(
            Box::new(asset_inventory::engine::PermissiveLicensing),
            config.check_licensing,
        );
    match api.import_csv(&csv_text, &user) {
        Ok(response) => {
            match serde_json::to_string_pretty(&response) {
                Ok(json) => println!("{}", json),
                Err(error) => {
                    tracing::error!(%error, "cannot render the import response");
                    return ExitCode::FAILURE;
                }
            }
            if response.failed > 0 {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(error) => {
            tracing::error!(%error, "import aborted");
            ExitCode::FAILURE
        }
    }
}
