//! `parley feedback` — Inspect the feedback log.

use parley_config::AppConfig;

pub async fn show() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let log = parley_feedback::build_from_config(&config);

    if log.name() == "file" {
        println!("  Log: {}", config.feedback_path().display());
        println!();
    }
    println!("{}", log.display().await?);
    Ok(())
}
