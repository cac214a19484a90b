use std::fs;
use std::path::Path;

use colored::Colorize;

use rpgc_session::persistence::restore_settings;

pub fn run(file: &Path, fix: bool) -> Result<(), String> {
    let text = fs::read_to_string(file)
        .map_err(|e| format!("failed to read '{}': {e}", file.display()))?;
    let saved: serde_json::Value = serde_json::from_str(&text)
        .map_err(|e| format!("invalid JSON in '{}': {e}", file.display()))?;

    let loaded = restore_settings(Some(&saved));
    if !loaded.repaired {
        println!("  {}", "Settings are valid.".green());
        return Ok(());
    }

    if !fix {
        return Err(format!(
            "'{}' needs repair (run with --fix to rewrite it)",
            file.display()
        ));
    }

    let out = serde_json::to_string_pretty(&loaded.settings).map_err(|e| e.to_string())?;
    fs::write(file, out).map_err(|e| format!("failed to write '{}': {e}", file.display()))?;
    println!("  {} '{}'", "Repaired".yellow().bold(), file.display());
    Ok(())
}
