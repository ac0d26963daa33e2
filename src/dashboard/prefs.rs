//! User preferences: display name, theme, background music.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::store::{StateBackend, StoredValue};

/// Storage key for the display name.
pub const USER_KEY: &str = "nebulaUser";

/// Storage key for the background-music flag.
pub const MUSIC_KEY: &str = "music";

/// Storage key for the color theme.
pub const THEME_KEY: &str = "nebulaTheme";

/// Fallback display name when the user declines to give one.
pub const DEFAULT_USER: &str = "dreamer";

/// Color theme.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
  #[default]
  Dark,
  Light,
}

/// Background music toggle, stored as the strings `on` / `off`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MusicSetting {
  On,
  #[default]
  Off,
}

impl MusicSetting {
  pub fn is_on(self) -> bool {
    matches!(self, MusicSetting::On)
  }

  pub fn toggled(self) -> Self {
    match self {
      MusicSetting::On => MusicSetting::Off,
      MusicSetting::Off => MusicSetting::On,
    }
  }
}

/// The user's stored preferences.
pub struct Preferences {
  user: StoredValue<Option<String>>,
  music: StoredValue<MusicSetting>,
  theme: StoredValue<Theme>,
}

impl Preferences {
  pub fn new(backend: Arc<dyn StateBackend>) -> Self {
    Self {
      user: StoredValue::initialize(Arc::clone(&backend), USER_KEY, None),
      music: StoredValue::initialize(Arc::clone(&backend), MUSIC_KEY, MusicSetting::default()),
      theme: StoredValue::initialize(backend, THEME_KEY, Theme::default()),
    }
  }

  /// The stored display name, if the user ever gave one.
  pub fn user(&self) -> Option<&str> {
    self.user.get().as_deref()
  }

  /// Resolve the display name: the stored one wins, otherwise a supplied
  /// name is persisted and used, otherwise [`DEFAULT_USER`]. The fallback
  /// is never persisted, so the user is asked again next time.
  pub fn ensure_user(&mut self, supplied: Option<&str>) -> String {
    if let Some(name) = self.user.get() {
      return name.clone();
    }

    match supplied {
      Some(name) if !name.trim().is_empty() => {
        let name = name.trim().to_string();
        self.user.set(Some(name.clone()));
        name
      }
      _ => DEFAULT_USER.to_string(),
    }
  }

  pub fn theme(&self) -> Theme {
    *self.theme.get()
  }

  pub fn set_theme(&mut self, theme: Theme) {
    self.theme.set(theme);
  }

  pub fn music(&self) -> MusicSetting {
    *self.music.get()
  }

  pub fn set_music(&mut self, setting: MusicSetting) {
    self.music.set(setting);
  }

  /// Flip the music flag and return the new setting.
  pub fn toggle_music(&mut self) -> MusicSetting {
    let next = self.music.get().toggled();
    self.music.set(next);
    next
  }
}

/// Time-of-day greeting for the dashboard header.
pub fn greeting(name: &str, hour: u32) -> String {
  if hour < 12 {
    format!("Good morning, {} ☀️", name)
  } else if hour < 18 {
    format!("Good afternoon, {} 🌤️", name)
  } else {
    format!("Welcome back, {} 🌙", name)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::store::MemoryState;

  #[test]
  fn test_ensure_user_prefers_stored_name() {
    let backend = Arc::new(MemoryState::new());

    let mut prefs = Preferences::new(backend.clone());
    assert_eq!(prefs.ensure_user(Some("Nova")), "Nova");

    let mut reloaded = Preferences::new(backend);
    assert_eq!(reloaded.ensure_user(Some("Someone Else")), "Nova");
  }

  #[test]
  fn test_ensure_user_falls_back_without_persisting() {
    let backend = Arc::new(MemoryState::new());

    let mut prefs = Preferences::new(backend.clone());
    assert_eq!(prefs.ensure_user(None), DEFAULT_USER);
    assert_eq!(prefs.ensure_user(Some("  ")), DEFAULT_USER);

    // The default never sticks; a real name later still wins.
    assert_eq!(prefs.ensure_user(Some("Lyra")), "Lyra");
    let mut reloaded = Preferences::new(backend);
    assert_eq!(reloaded.ensure_user(None), "Lyra");
  }

  #[test]
  fn test_music_round_trips_as_on_off() {
    let backend = Arc::new(MemoryState::new());

    let mut prefs = Preferences::new(backend.clone());
    assert!(!prefs.music().is_on());
    assert!(prefs.toggle_music().is_on());

    // Durable shape is the bare "on"/"off" string.
    assert_eq!(backend.read(MUSIC_KEY).unwrap().as_deref(), Some("\"on\""));

    let reloaded = Preferences::new(backend);
    assert!(reloaded.music().is_on());
  }

  #[test]
  fn test_theme_defaults_to_dark_and_persists() {
    let backend = Arc::new(MemoryState::new());

    let mut prefs = Preferences::new(backend.clone());
    assert_eq!(prefs.theme(), Theme::Dark);
    prefs.set_theme(Theme::Light);

    let reloaded = Preferences::new(backend);
    assert_eq!(reloaded.theme(), Theme::Light);
  }

  #[test]
  fn test_greeting_tracks_time_of_day() {
    assert_eq!(greeting("Nova", 8), "Good morning, Nova ☀️");
    assert_eq!(greeting("Nova", 12), "Good afternoon, Nova 🌤️");
    assert_eq!(greeting("Nova", 17), "Good afternoon, Nova 🌤️");
    assert_eq!(greeting("Nova", 22), "Welcome back, Nova 🌙");
  }
}
