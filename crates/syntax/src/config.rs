use serde::{Deserialize, Serialize};

/// Default API level: the first level at which optimized instructions are
/// no longer assemblable.
pub const DEFAULT_API_LEVEL: u32 = 15;

/// Maximum nesting of literals and annotations before the parser reports an
/// error instead of recursing further.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Parser settings fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Full token dumps and the rule stack in diagnostics.
    pub verbose_errors: bool,
    /// Accept optimized instructions the opcode oracle allows.
    pub allow_legacy_encodings: bool,
    pub api_level: u32,
    pub max_depth: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        ParserConfig {
            verbose_errors: false,
            allow_legacy_encodings: false,
            api_level: DEFAULT_API_LEVEL,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}
