//! `parley models` — List selectable models.

use parley_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    println!("🧠 Models");
    println!("=========");
    for model in &config.models {
        let marker = if *model == config.default_model { "●" } else { " " };
        println!("  {marker} {model}");
    }
    println!();
    println!("  Endpoint:  {}", config.base_url);

    Ok(())
}
