//! Error types for the upgrade engine.
//!
//! Only recoverable failures live here: bad rule data, bad save data and
//! lookups of runtime handles (units) that may have gone away. Out-of-range
//! dense handles (players, unit types, upgrades, variables) are programming
//! errors and panic at the indexing site instead.

use thiserror::Error;

/// Result type alias using [`GameError`].
pub type Result<T> = std::result::Result<T, GameError>;

/// Top-level error type for all engine errors.
#[derive(Debug, Error)]
pub enum GameError {
    /// A definition referenced an identifier that was never registered.
    #[error("Unknown {kind} identifier: \"{ident}\"")]
    UnknownIdentifier {
        /// What kind of thing was looked up ("upgrade", "unit type", ...).
        kind: &'static str,
        /// The identifier as written in the definition.
        ident: String,
    },

    /// An identifier was registered twice.
    #[error("Duplicate {kind} identifier: \"{ident}\"")]
    DuplicateIdentifier {
        /// What kind of thing was registered.
        kind: &'static str,
        /// The offending identifier.
        ident: String,
    },

    /// A percent modifier that cannot be reversed.
    #[error("Invalid percent modifier {percent} for upgrade \"{upgrade}\": must be greater than -100")]
    InvalidPercent {
        /// Upgrade the modifier belongs to.
        upgrade: String,
        /// Offending percentage.
        percent: i32,
    },

    /// Invalid player reference.
    #[error("Invalid player: {0}")]
    InvalidPlayer(u32),

    /// Invalid unit reference.
    #[error("Unit not found: {0}")]
    UnitNotFound(u64),

    /// The upgrade is not flagged as an ability.
    #[error("Upgrade \"{0}\" is not an ability")]
    NotAnAbility(String),

    /// Data file parsing error.
    #[error("Failed to parse data file '{path}': {message}")]
    DataParseError {
        /// Path to the file that failed to parse.
        path: String,
        /// Error message.
        message: String,
    },

    /// Saved state does not match the loaded rules.
    #[error("Invalid save data: {0}")]
    SaveFormat(String),

    /// Invalid game state.
    #[error("Invalid game state: {0}")]
    InvalidState(String),
}

impl GameError {
    /// Shorthand for [`GameError::UnknownIdentifier`].
    pub fn unknown(kind: &'static str, ident: impl Into<String>) -> Self {
        Self::UnknownIdentifier {
            kind,
            ident: ident.into(),
        }
    }
}
