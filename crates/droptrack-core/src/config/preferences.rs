use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;

const PLAYER_NAME_KEY: &str = "playername";
const SOUND_SIGNALS_KEY: &str = "sound_signals";
const DEFAULT_PLAYER_NAME: &str = "Unknown";

/// Key-value preference store.
///
/// File format: one `key=value` per line, `#` starts a comment line.
/// Keys are case-insensitive and stored lowercased.
#[derive(Debug, Clone, Default)]
pub struct Preferences {
    values: BTreeMap<String, String>,
    path: Option<PathBuf>,
}

impl Preferences {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load preferences from file; a missing file yields an empty store bound to `path`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut prefs = if path.exists() {
            Self::parse(&fs::read_to_string(path)?)
        } else {
            Self::new()
        };
        prefs.path = Some(path.to_path_buf());
        Ok(prefs)
    }

    /// Parse preferences from string content
    pub fn parse(content: &str) -> Self {
        let mut values = BTreeMap::new();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some((key, value)) = line.split_once('=') {
                values.insert(key.trim().to_lowercase(), value.trim().to_string());
            }
        }

        Self { values, path: None }
    }

    /// Write preferences back to the file they were loaded from.
    pub fn save(&self) -> Result<()> {
        if let Some(path) = &self.path {
            self.save_to(path)?;
        }
        Ok(())
    }

    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }
        let lines: Vec<String> = self
            .values
            .iter()
            .map(|(key, value)| format!("{}={}", key, value))
            .collect();
        fs::write(path, lines.join("\n") + "\n")?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(&key.to_lowercase()).map(String::as_str)
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.values.insert(key.to_lowercase(), value.into());
    }

    pub fn get_int(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(|v| v.parse().ok())
    }

    /// Display name of the tracked player.
    pub fn player_name(&self) -> &str {
        match self.get(PLAYER_NAME_KEY) {
            Some(name) if !name.trim().is_empty() => name,
            _ => DEFAULT_PLAYER_NAME,
        }
    }

    pub fn set_player_name(&mut self, name: &str) {
        self.set(PLAYER_NAME_KEY, name);
    }

    pub fn sound_signals(&self) -> bool {
        self.get(SOUND_SIGNALS_KEY) == Some("1")
    }

    pub fn set_sound_signals(&mut self, enabled: bool) {
        self.set(SOUND_SIGNALS_KEY, if enabled { "1" } else { "0" });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_preferences() {
        let content = r#"# tracked character
PlayerName = Aragorn
sound_signals=1
hud_left=120
broken line
"#;
        let prefs = Preferences::parse(content);

        assert_eq!(prefs.player_name(), "Aragorn");
        assert!(prefs.sound_signals());
        assert_eq!(prefs.get_int("HUD_LEFT"), Some(120));
        assert!(prefs.get("broken line").is_none());
    }

    #[test]
    fn test_defaults() {
        let prefs = Preferences::new();
        assert_eq!(prefs.player_name(), "Unknown");
        assert!(!prefs.sound_signals());
    }

    #[test]
    fn test_blank_player_name_falls_back() {
        let prefs = Preferences::parse("playername=   \n");
        assert_eq!(prefs.player_name(), "Unknown");
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("data").join("preferences.cfg");

        let mut prefs = Preferences::load(&path).unwrap();
        prefs.set_player_name("Legolas");
        prefs.set_sound_signals(true);
        prefs.save().unwrap();

        let reloaded = Preferences::load(&path).unwrap();
        assert_eq!(reloaded.player_name(), "Legolas");
        assert!(reloaded.sound_signals());
    }
}
