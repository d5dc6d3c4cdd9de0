use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::store::{Persistence, keys};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

/// Persisted light/dark preference
pub struct ThemePreference {
    theme: Theme,
    persistence: Persistence,
}

impl ThemePreference {
    pub fn load(persistence: Persistence) -> Self {
        let theme = persistence.load(keys::THEME).unwrap_or_default();
        Self { theme, persistence }
    }

    pub fn get(&self) -> Theme {
        self.theme
    }

    pub fn set(&mut self, theme: Theme) {
        self.theme = theme;
        self.persistence.save(keys::THEME, &self.theme);
    }

    pub fn toggle(&mut self) -> Theme {
        self.set(self.theme.toggled());
        self.theme
    }
}
