//! Data validation utilities.

use std::fmt;
use std::path::{Path, PathBuf};

use forge_core::data::RulesetData;
use forge_core::error::GameError;
use forge_core::ruleset::Ruleset;

use crate::error::{Result, ToolError};

/// Registry sizes of a validated ruleset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RulesetSummary {
    /// File the ruleset came from.
    pub path: PathBuf,
    /// Resource kinds, including time.
    pub resources: usize,
    /// Variables, including the built-ins.
    pub variables: usize,
    /// Unit types.
    pub unit_types: usize,
    /// Upgrades.
    pub upgrades: usize,
    /// Modifiers.
    pub modifiers: usize,
    /// Civilizations.
    pub civilizations: usize,
    /// Factions.
    pub factions: usize,
}

impl fmt::Display for RulesetSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} resources, {} variables, {} unit types, {} upgrades, {} modifiers, \
             {} civilizations, {} factions",
            self.path.display(),
            self.resources,
            self.variables,
            self.unit_types,
            self.upgrades,
            self.modifiers,
            self.civilizations,
            self.factions,
        )
    }
}

/// Read and build one ruleset file.
///
/// # Errors
///
/// Returns [`ToolError::Io`] if the file cannot be read and
/// [`ToolError::Game`] if the engine rejects it. Parse errors carry the
/// file path.
pub fn load_ruleset(path: &Path) -> Result<Ruleset> {
    let source = std::fs::read_to_string(path).map_err(|source| ToolError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let data = RulesetData::from_ron_str(&source).map_err(|e| match e {
        GameError::DataParseError { message, .. } => GameError::DataParseError {
            path: path.display().to_string(),
            message,
        },
        other => other,
    })?;
    Ok(Ruleset::from_data(&data)?)
}

/// Validate one ruleset file.
///
/// # Errors
///
/// See [`load_ruleset`].
pub fn validate_file(path: &Path) -> Result<RulesetSummary> {
    let ruleset = load_ruleset(path)?;
    tracing::debug!(path = %path.display(), "Ruleset is valid");
    Ok(RulesetSummary {
        path: path.to_path_buf(),
        resources: ruleset.resources.len(),
        variables: ruleset.variables.len(),
        unit_types: ruleset.unit_types.len(),
        upgrades: ruleset.upgrades.len(),
        modifiers: ruleset.modifiers.len(),
        civilizations: ruleset.factions.civilization_count(),
        factions: ruleset.factions.faction_count(),
    })
}

/// Validate a ruleset file, or every `.ron` file of a directory in name
/// order.
///
/// # Errors
///
/// Returns the first failure, or [`ToolError::NoRulesets`] for a directory
/// without `.ron` files.
pub fn validate_path(path: &Path) -> Result<Vec<RulesetSummary>> {
    if !path.is_dir() {
        return Ok(vec![validate_file(path)?]);
    }

    let io_error = |source: std::io::Error| ToolError::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut files = Vec::new();
    for entry in std::fs::read_dir(path).map_err(io_error)? {
        let file = entry.map_err(io_error)?.path();
        if file.extension().is_some_and(|ext| ext == "ron") {
            files.push(file);
        }
    }
    if files.is_empty() {
        return Err(ToolError::NoRulesets(path.to_path_buf()));
    }
    files.sort();

    files.iter().map(|file| validate_file(file)).collect()
}
