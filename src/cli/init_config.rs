use super::config::{default_config_path, SpvConfig};
use std::path::PathBuf;

/// Write the commented default configuration
pub fn execute(output: Option<PathBuf>, force: bool) -> Result<(), Box<dyn std::error::Error>> {
    let path = output.unwrap_or_else(default_config_path);
    if path.exists() && !force {
        return Err(format!(
            "Config file '{}' already exists (use --force to overwrite)",
            path.display()
        )
        .into());
    }

    SpvConfig::create_default(&path)?;
    println!("✅ Wrote default configuration to {}", path.display());
    Ok(())
}
