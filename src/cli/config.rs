use colored::Colorize;

use crate::error::{FlowError, Result};
use crate::settings::{load_settings, save_settings, settings_file_exists, settings_path, Settings};

pub fn show() -> Result<()> {
    let settings = load_settings();
    let json = serde_json::to_string_pretty(&settings)
        .map_err(|e| FlowError::Settings(e.to_string()))?;
    let origin = if settings_file_exists() { "" } else { " (not found, using defaults)" };
    println!("Settings:  {}{origin}", settings_path().display());
    println!("{json}");
    Ok(())
}

pub fn init(force: bool) -> Result<()> {
    let path = settings_path();
    if settings_file_exists() && !force {
        return Err(FlowError::Settings(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }
    save_settings(&Settings::default())?;
    println!("{} Wrote {}", "✓".green(), path.display());
    Ok(())
}
