//! Provider construction from configuration.

use std::sync::Arc;

use parley_core::completion::CompletionProvider;
use parley_core::error::CompletionError;
use tracing::debug;

use crate::ai21::Ai21Provider;

/// Build the completion provider described by `config`.
///
/// Fails with `NotConfigured` when no API key is available.
pub fn build_from_config(
    config: &parley_config::AppConfig,
) -> Result<Arc<dyn CompletionProvider>, CompletionError> {
    let api_key = config
        .api_key
        .clone()
        .filter(|k| !k.is_empty())
        .ok_or_else(|| {
            CompletionError::NotConfigured(
                "no API key; set PARLEY_API_KEY or api_key in config.toml".into(),
            )
        })?;

    debug!(base_url = %config.base_url, "Building completion provider");
    Ok(Arc::new(Ai21Provider::with_base_url(&config.base_url, api_key)))
}
