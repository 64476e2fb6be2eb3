// src/cli/output.rs — Report serialization and destination

use serde::Serialize;

/// Serialize `data` as json/yaml, or use the pre-rendered `text`.
pub fn format_output<T: Serialize>(data: &T, format: &str, text: String) -> anyhow::Result<String> {
    match format {
        "text" => Ok(text),
        "json" => Ok(serde_json::to_string_pretty(data)?),
        "yaml" | "yml" => Ok(serde_yml::to_string(data)?),
        other => anyhow::bail!("Unsupported format '{}'. Options: text, json, yaml", other),
    }
}

/// Print to stdout or write to `path`.
pub fn emit(output: Option<&str>, content: &str) -> anyhow::Result<()> {
    if let Some(path) = output {
        std::fs::write(path, content)?;
        eprintln!("Report written to {path}");
    } else {
        print!("{content}");
        if !content.ends_with('\n') {
            println!();
        }
    }
    Ok(())
}
