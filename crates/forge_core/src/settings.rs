//! Runtime game settings.

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::ids::PlayerId;

/// Default polity upgrade class.
pub const DEFAULT_POLITY_CLASS: &str = "writing";

/// Per-game switches that change how upgrades play out.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    /// Suppress trait modifiers on non-character units.
    pub no_randomness: bool,
    /// Grand strategy mode; factions are managed outside the battle.
    pub grand_strategy: bool,
    /// Player seated at this machine, if any.
    pub local_player: Option<PlayerId>,
    /// Upgrade class whose research promotes tribes to polities.
    pub polity_class: String,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            no_randomness: false,
            grand_strategy: false,
            local_player: None,
            polity_class: DEFAULT_POLITY_CLASS.to_string(),
        }
    }
}

impl GameSettings {
    /// Parse settings from a RON document.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::DataParseError`] if the document is malformed.
    pub fn from_ron_str(source: &str) -> Result<Self> {
        ron::from_str(source).map_err(|e| GameError::DataParseError {
            path: "<settings>".to_string(),
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_take_defaults() {
        let settings = GameSettings::from_ron_str("(no_randomness: true)").unwrap();
        assert!(settings.no_randomness);
        assert!(!settings.grand_strategy);
        assert_eq!(settings.polity_class, DEFAULT_POLITY_CLASS);
    }

    #[test]
    fn test_local_player() {
        let settings = GameSettings::from_ron_str("(local_player: Some(PlayerId(2)))").unwrap();
        assert_eq!(settings.local_player, Some(PlayerId::new(2)));
    }
}
