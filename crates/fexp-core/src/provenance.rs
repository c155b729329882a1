//! Provenance and schema descriptors attached to serialized draws and reports.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Semantic version describing the schema of serialized payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SchemaVersion {
    /// Major version incremented for breaking changes.
    pub major: u32,
    /// Minor version incremented for additive changes.
    pub minor: u32,
    /// Patch version incremented for bug fixes and documentation updates.
    pub patch: u32,
}

impl SchemaVersion {
    /// Creates a new schema version descriptor.
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl Default for SchemaVersion {
    fn default() -> Self {
        Self::new(1, 0, 0)
    }
}

/// Everything needed to reproduce a randomization draw or an analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DrawProvenance {
    /// Schema of the enclosing payload.
    pub schema_version: SchemaVersion,
    /// Short label of the procedure (`complete`, `block`, `ri`, ...).
    pub procedure: String,
    /// Master seed used for all randomness.
    pub seed: u64,
    /// Procedure parameters rendered as strings (sizes, counts, K).
    #[serde(default)]
    pub parameters: BTreeMap<String, String>,
    /// Version map for all tools involved in the run.
    #[serde(default)]
    pub tool_versions: BTreeMap<String, String>,
}

impl DrawProvenance {
    /// Starts a provenance record for `procedure` seeded with `seed`.
    pub fn new(procedure: impl Into<String>, seed: u64) -> Self {
        let mut tool_versions = BTreeMap::new();
        tool_versions.insert("fexp-core".to_string(), env!("CARGO_PKG_VERSION").to_string());
        Self {
            schema_version: SchemaVersion::default(),
            procedure: procedure.into(),
            seed,
            parameters: BTreeMap::new(),
            tool_versions,
        }
    }

    /// Records a procedure parameter.
    pub fn with_parameter(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.parameters.insert(key.into(), value.to_string());
        self
    }
}
