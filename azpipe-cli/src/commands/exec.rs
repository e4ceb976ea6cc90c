//! Generic action commands

use anyhow::{Context, Result};
use azpipe_actions::ActionRegistry;
use colored::*;
use serde_json::Value as JsonValue;
use std::path::Path;

/// Reads an action input from a JSON file
pub fn read_input(path: &Path) -> Result<JsonValue> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read input file: {}", path.display()))?;
    let input: JsonValue = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse input file: {}", path.display()))?;
    if !input.is_object() {
        anyhow::bail!("Action input in {} must be a JSON object", path.display());
    }
    Ok(input)
}

/// Prints the registered actions
pub fn list_actions(registry: &ActionRegistry) {
    println!("{}", "Available actions:".bold());
    for action in registry.iter() {
        println!("  {} {}", "▸".cyan(), action.id().bold());
        println!("    {}", action.description().dimmed());
        if let Some(required) = action.schema()["required"].as_array() {
            let names: Vec<_> = required.iter().filter_map(JsonValue::as_str).collect();
            println!("    Required: {}", names.join(", ").dimmed());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_read_input() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"organization": "contoso", "pipelineId": 12}}"#).unwrap();

        let input = read_input(file.path()).unwrap();
        assert_eq!(input["pipelineId"], 12);
    }

    #[test]
    fn test_read_input_rejects_non_object() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[1, 2]").unwrap();

        assert!(read_input(file.path()).is_err());
    }
}
