use anyhow::{Context, Result, bail};
use shared::config::ClientConfig;
use std::fs;

/// Generates a configuration file in the specified format in the working directory.
///
/// # Errors
/// Returns an error if the format is unsupported or if writing the file fails.
pub fn generate_config(format: &str) -> Result<()> {
    let config = ClientConfig::with_defaults();
    let (file_name, serialized) = match format {
        "yaml" | "yml" => ("staffhub.yaml", serde_yml::to_string(&config)?),
        "json" => ("staffhub.json", serde_json::to_string_pretty(&config)?),
        "toml" => ("staffhub.toml", toml::to_string_pretty(&config)?),
        other => bail!("Unsupported format '{other}'. Use 'yaml', 'json' or 'toml'."),
    };

    fs::write(file_name, serialized)
        .with_context(|| format!("failed to write configuration file '{file_name}'"))?;

    println!("Configuration file '{file_name}' generated successfully.");
    Ok(())
}
