//! `parley demos` — List demo personas.

use parley_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let table = config.profile_table();

    println!("🎭 Demo personas");
    println!("================");
    for (key, profile) in table.iter() {
        let marker = if key == config.demo { "●" } else { " " };
        let [bot, user] = &profile.participants;
        println!("  {marker} {key:<16} {bot} ↔ {user}");
        println!("      {}", first_line(&profile.background));
    }
    println!();
    println!("  Unknown names fall back to a generic \"Bot\" persona.");

    Ok(())
}

fn first_line(text: &str) -> &str {
    text.lines().find(|l| !l.trim().is_empty()).unwrap_or("").trim()
}
