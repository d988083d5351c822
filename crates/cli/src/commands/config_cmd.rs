//! `parley config` — Configuration management commands.

use parley_config::AppConfig;

pub async fn validate() -> Result<(), Box<dyn std::error::Error>> {
    println!("🔍 Validating configuration...");

    match AppConfig::load() {
        Ok(config) => {
            println!("   ✅ Config parsed successfully");

            let warnings = warnings(&config);
            if warnings.is_empty() {
                println!("   ✅ All checks passed");
            } else {
                println!();
                for w in &warnings {
                    println!("   ⚠️  {w}");
                }
            }

            println!();
            println!("   Endpoint:  {}", config.base_url);
            println!("   Model:     {}", config.default_model);
            println!("   Demo:      {}", config.demo);
            println!("   Feedback:  {}", config.feedback.backend);
            println!("   Demos:     {}", config.profile_table().keys().count());
        }
        Err(e) => {
            println!("   ❌ Config error: {e}");
            return Err(e.into());
        }
    }

    Ok(())
}

/// Non-fatal problems worth pointing out.
fn warnings(config: &AppConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if !config.has_api_key() {
        warnings.push("No API key set (set PARLEY_API_KEY or AI21_API_KEY env var)".to_string());
    }

    if !config.profile_table().contains(&config.demo) {
        warnings.push(format!(
            "Demo '{}' is not defined; the generic persona will be used",
            config.demo
        ));
    }

    if config.base_url.starts_with("http://") {
        warnings.push("base_url is not HTTPS; the API key is sent in clear text".to_string());
    }

    warnings
}

pub async fn show() -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    if config.has_api_key() {
        config.api_key = Some("[REDACTED]".into());
    }
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

pub async fn path() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = AppConfig::config_dir().join("config.toml");
    println!("{}", config_path.display());
    Ok(())
}
