use std::path::PathBuf;

/// Expands a leading `~` in a configured path to the user's home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    } else if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// First `max` characters of `text`. Counts chars, not bytes, so a Cyrillic
/// prompt never gets cut inside a code point.
pub fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

/// File name a mod is saved under: spaces become underscores and `.jar` is
/// appended. Path separators are replaced too so a name can't escape the
/// target directory.
pub fn jar_file_name(mod_name: &str) -> String {
    let stem: String = mod_name
        .chars()
        .map(|c| match c {
            ' ' | '/' | '\\' => '_',
            c => c,
        })
        .collect();
    format!("{stem}.jar")
}
