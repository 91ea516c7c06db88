use std::path::{Path, PathBuf};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::types::{Color, NamedColor};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub generation: GenerationSettings,
    pub audio: AudioSettings,
    pub theme: Theme,
    pub key_bindings: KeyBindings,
    pub animation: AnimationSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    /// Usually supplied through `GEMINI_API_KEY` instead of the file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    /// `None` waits for the endpoint indefinitely.
    pub timeout_secs: Option<u64>,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://generativelanguage.googleapis.com".into(),
            model: "gemini-3-flash-preview".into(),
            temperature: 1.0,
            timeout_secs: Some(20),
        }
    }
}

/// External player spawned for the soundtrack, e.g.
/// `["mpv", "--no-video", "--loop=inf", "--volume=40", "garden-of-peace.mp3"]`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    pub command: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationSettings {
    pub tick_ms: u64,
    /// Fixed seed for the garden layout; random when absent.
    pub seed: Option<u64>,
}

impl Default for AnimationSettings {
    fn default() -> Self {
        Self {
            tick_ms: 50,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    #[serde(default = "default_petal")]
    pub petal: Color,
    /// One colour per hanging cluster, left to right.
    #[serde(default = "default_wisteria")]
    pub wisteria: [Color; 3],
    #[serde(default = "default_spirit")]
    pub spirit: Color,
    #[serde(default = "default_star")]
    pub star: Color,
    #[serde(default = "default_accent")]
    pub accent: Color,
    #[serde(default = "default_text")]
    pub text: Color,
}

fn default_petal() -> Color { Color::rgb(0xff, 0xb7, 0xce) }
fn default_wisteria() -> [Color; 3] {
    [
        Color::rgb(0xb1, 0x9c, 0xd9),
        Color::rgb(0x93, 0x70, 0xdb),
        Color::rgb(0xba, 0x55, 0xd3),
    ]
}
fn default_star() -> Color { Color::rgb(0xe6, 0xe0, 0xff) }
fn default_spirit() -> Color { Color::rgb(0x00, 0xf2, 0xff) }
fn default_accent() -> Color { Color::rgb(0xf9, 0xa8, 0xd4) }
fn default_text() -> Color { Color::Named(NamedColor::White) }

impl Default for Theme {
    fn default() -> Self {
        Theme {
            petal: default_petal(),
            wisteria: default_wisteria(),
            spirit: default_spirit(),
            star: default_star(),
            accent: default_accent(),
            text: default_text(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    pub reveal: String,
    pub next: String,
    pub prev: String,
    pub yes: String,
    pub no: String,
    pub mute: String,
    pub quit: String,
    pub fullscreen: String,
}

impl Default for KeyBindings {
    fn default() -> Self {
        KeyBindings {
            reveal: "Enter".into(),
            next: "Right".into(),
            prev: "Left".into(),
            yes: "s".into(),
            no: "n".into(),
            mute: "m".into(),
            quit: "q".into(),
            fullscreen: "F11".into(),
        }
    }
}

impl AppConfig {
    /// Load `~/.config/sakura-letter/config.json`, then apply environment
    /// overrides. A missing file is not an error; an invalid one is reported
    /// and ignored.
    pub fn load() -> Self {
        let mut config = Self::load_from(&Self::config_path());
        config.apply_overrides(|key| std::env::var(key).ok());
        config
    }

    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(config) => {
                    info!(path = %path.display(), "loaded config");
                    config
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "invalid config, using defaults");
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    /// Apply `GEMINI_API_KEY` / `API_KEY`, `SAKURA_MODEL` and `SAKURA_BASE_URL`.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("API_KEY") {
            self.generation.api_key = Some(v);
        }
        if let Some(v) = lookup("GEMINI_API_KEY") {
            self.generation.api_key = Some(v);
        }
        if let Some(v) = lookup("SAKURA_MODEL") {
            self.generation.model = v;
        }
        if let Some(v) = lookup("SAKURA_BASE_URL") {
            self.generation.base_url = v;
        }
        if self
            .generation
            .api_key
            .as_deref()
            .is_some_and(|k| k.trim().is_empty())
        {
            self.generation.api_key = None;
        }
    }

    fn config_path() -> PathBuf {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
        let mut path = PathBuf::from(home);
        path.push(".config");
        path.push("sakura-letter");
        path.push("config.json");
        path
    }
}

/// Check whether a crossterm `KeyEvent` matches a binding string from config.
pub fn matches_binding(binding: &str, event: &KeyEvent) -> bool {
    if let Some(rest) = binding.strip_prefix("Ctrl-") {
        if !event.modifiers.contains(KeyModifiers::CONTROL) {
            return false;
        }
        return single_char(rest).is_some_and(|c| event.code == KeyCode::Char(c));
    }

    // Plain bindings never fire with Ctrl or Alt held.
    if event.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
        return false;
    }

    match binding {
        "Right" => event.code == KeyCode::Right,
        "Left" => event.code == KeyCode::Left,
        "Up" => event.code == KeyCode::Up,
        "Down" => event.code == KeyCode::Down,
        "Enter" => event.code == KeyCode::Enter,
        "Esc" => event.code == KeyCode::Esc,
        "Space" => event.code == KeyCode::Char(' '),
        "Tab" => event.code == KeyCode::Tab,
        "Backspace" => event.code == KeyCode::Backspace,
        "Home" => event.code == KeyCode::Home,
        "End" => event.code == KeyCode::End,
        s => {
            if let Some(n) = s.strip_prefix('F').and_then(|rest| rest.parse::<u8>().ok()) {
                return event.code == KeyCode::F(n);
            }
            // Letters match regardless of Shift.
            single_char(s).is_some_and(|c| match event.code {
                KeyCode::Char(got) => got.eq_ignore_ascii_case(&c),
                _ => false,
            })
        }
    }
}

fn single_char(s: &str) -> Option<char> {
    let mut chars = s.chars();
    let c = chars.next()?;
    chars.next().is_none().then_some(c)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{ "generation": { "model": "otro" }, "theme": { "petal": "red" } }"#)
                .unwrap();
        assert_eq!(config.generation.model, "otro");
        assert_eq!(config.generation.temperature, 1.0);
        assert_eq!(config.theme.petal, Color::Named(NamedColor::Red));
        assert_eq!(config.theme.spirit, default_spirit());
        assert_eq!(config.key_bindings.next, "Right");
        assert_eq!(config.animation.tick_ms, 50);
    }

    #[test]
    fn single_binding_keeps_the_rest_of_the_file() {
        let path = std::env::temp_dir().join(format!("sakura-letter-keys-{}.json", std::process::id()));
        std::fs::write(
            &path,
            r#"{ "generation": { "model": "mi-modelo", "api_key": "k" }, "key_bindings": { "next": "l" } }"#,
        )
        .unwrap();
        let config = AppConfig::load_from(&path);
        std::fs::remove_file(&path).ok();

        assert_eq!(config.generation.model, "mi-modelo");
        assert_eq!(config.generation.api_key.as_deref(), Some("k"));
        assert_eq!(config.key_bindings.next, "l");
        assert_eq!(config.key_bindings.prev, "Left");
        assert_eq!(config.key_bindings.quit, "q");
        assert_eq!(config.key_bindings.fullscreen, "F11");
    }

    #[test]
    fn rgb_colors_deserialize() {
        let theme: Theme = serde_json::from_str(r#"{ "accent": { "r": 1, "g": 2, "b": 3 } }"#).unwrap();
        assert_eq!(theme.accent, Color::rgb(1, 2, 3));
        assert_eq!(theme.wisteria, default_wisteria());
    }

    #[test]
    fn wisteria_takes_one_colour_per_cluster() {
        let theme: Theme =
            serde_json::from_str(r#"{ "wisteria": ["red", "magenta", { "r": 9, "g": 9, "b": 9 }] }"#).unwrap();
        assert_eq!(theme.wisteria[0], Color::Named(NamedColor::Red));
        assert_eq!(theme.wisteria[2], Color::rgb(9, 9, 9));
    }

    #[test]
    fn invalid_file_falls_back_to_defaults() {
        let path = std::env::temp_dir().join(format!("sakura-letter-bad-{}.json", std::process::id()));
        std::fs::write(&path, "{ not json").unwrap();
        let config = AppConfig::load_from(&path);
        std::fs::remove_file(&path).ok();
        assert_eq!(config.generation.model, GenerationSettings::default().model);
    }

    #[test]
    fn environment_overrides_take_precedence() {
        let env: HashMap<&str, &str> = [
            ("API_KEY", "generic"),
            ("GEMINI_API_KEY", "gemini"),
            ("SAKURA_MODEL", "flash"),
        ]
        .into_iter()
        .collect();
        let mut config = AppConfig::default();
        config.apply_overrides(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(config.generation.api_key.as_deref(), Some("gemini"));
        assert_eq!(config.generation.model, "flash");
    }

    #[test]
    fn blank_api_key_counts_as_missing() {
        let mut config = AppConfig::default();
        config.apply_overrides(|k| (k == "API_KEY").then(|| "  ".to_string()));
        assert!(config.generation.api_key.is_none());
    }

    #[test]
    fn bindings_match_named_keys_and_letters() {
        assert!(matches_binding("Right", &key(KeyCode::Right, KeyModifiers::NONE)));
        assert!(matches_binding("F11", &key(KeyCode::F(11), KeyModifiers::NONE)));
        assert!(matches_binding("s", &key(KeyCode::Char('S'), KeyModifiers::SHIFT)));
        assert!(!matches_binding("s", &key(KeyCode::Char('s'), KeyModifiers::ALT)));
        assert!(matches_binding("Ctrl-c", &key(KeyCode::Char('c'), KeyModifiers::CONTROL)));
        assert!(!matches_binding("Ctrl-c", &key(KeyCode::Char('c'), KeyModifiers::NONE)));
    }
}
