//! Civilization and faction data structures.

use serde::{Deserialize, Serialize};

use crate::factions::FactionKind;

/// Data-driven faction definition.
///
/// # Example RON
///
/// ```ron
/// FactionData(
///     ident: "saxon-tribe",
///     civilization: "germanic",
///     kind: Tribe,
/// )
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FactionData {
    /// Unique string identifier.
    pub ident: String,

    /// Civilization identifier.
    pub civilization: String,

    /// Tribe or polity.
    #[serde(default)]
    pub kind: FactionKind,

    /// Whether players may be assigned this faction.
    #[serde(default = "default_playable")]
    pub playable: bool,
}

const fn default_playable() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_faction_defaults() {
        let data: FactionData =
            ron::from_str(r#"FactionData(ident: "saxony", civilization: "germanic")"#).unwrap();
        assert_eq!(data.kind, FactionKind::Tribe);
        assert!(data.playable);
    }
}
