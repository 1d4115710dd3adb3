/// Catalog log: one row per logically uploaded dataset/results file
pub const CATALOG_TABLE: &str = "uploads_log";

/// Locally uploaded audio clips
pub const CLIPS_TABLE: &str = "music_clips";

/// Names an imported dataset table may never take.
pub fn is_reserved_table_name(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    lower == CATALOG_TABLE || lower == CLIPS_TABLE || lower.starts_with("sqlite_")
}

/// Plain identifier check for table names arriving from URLs.
pub fn is_valid_table_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    name.len() <= 128 && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Quote an identifier for interpolation into SQL.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
