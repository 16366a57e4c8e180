use ferrous_sweep_domain::DomainError;
use std::path::Path;
use tracing::debug;

/// Read a prefix, suffix or host list: one entry per line, surrounding
/// whitespace trimmed, blank lines and `#` comments skipped.
pub fn load_key_list(path: &Path) -> Result<Vec<String>, DomainError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        DomainError::IoError(format!("Failed to read '{}': {}", path.display(), e))
    })?;

    let entries = parse_key_list(&content);
    debug!(path = %path.display(), entries = entries.len(), "Key list loaded");
    Ok(entries)
}

pub fn parse_key_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}
