//! Instruction mnemonic table and the legacy-encoding eligibility oracle.
//!
//! The lexer uses [`mnemonic_kind`] to turn a mnemonic into the token kind of
//! its instruction format. The parser never looks at opcode metadata itself;
//! it asks a [`LegacyOracle`] whether an optimized ("odex") instruction may be
//! assembled at the configured API level.

use crate::token::TokenKind;

/// API level at which optimized field/verification instructions stopped
/// being representable in assembled output (Ice Cream Sandwich).
pub const LEGACY_CUTOFF_API: u32 = 14;

// ──────────────────────────────────────────────
// Mnemonic table
// ──────────────────────────────────────────────

const MNEMONICS: &[(&str, TokenKind)] = {
    use TokenKind::*;
    &[
        ("goto", InstructionFormat10t),
        ("nop", InstructionFormat10x),
        ("return-void", InstructionFormat10x),
        ("return-void-barrier", InstructionFormat10xOdex),
        ("return-void-no-barrier", InstructionFormat10xOdex),
        ("const/4", InstructionFormat11n),
        ("move-result", InstructionFormat11x),
        ("move-result-wide", InstructionFormat11x),
        ("move-result-object", InstructionFormat11x),
        ("move-exception", InstructionFormat11x),
        ("return", InstructionFormat11x),
        ("return-wide", InstructionFormat11x),
        ("return-object", InstructionFormat11x),
        ("monitor-enter", InstructionFormat11x),
        ("monitor-exit", InstructionFormat11x),
        ("throw", InstructionFormat11x),
        ("move", InstructionFormat12xOrId),
        ("move-wide", InstructionFormat12xOrId),
        ("move-object", InstructionFormat12xOrId),
        ("array-length", InstructionFormat12xOrId),
        ("neg-int", InstructionFormat12xOrId),
        ("not-int", InstructionFormat12xOrId),
        ("neg-long", InstructionFormat12xOrId),
        ("not-long", InstructionFormat12xOrId),
        ("neg-float", InstructionFormat12xOrId),
        ("neg-double", InstructionFormat12xOrId),
        ("int-to-long", InstructionFormat12xOrId),
        ("int-to-float", InstructionFormat12xOrId),
        ("int-to-double", InstructionFormat12xOrId),
        ("long-to-int", InstructionFormat12xOrId),
        ("long-to-float", InstructionFormat12xOrId),
        ("long-to-double", InstructionFormat12xOrId),
        ("float-to-int", InstructionFormat12xOrId),
        ("float-to-long", InstructionFormat12xOrId),
        ("float-to-double", InstructionFormat12xOrId),
        ("double-to-int", InstructionFormat12xOrId),
        ("double-to-long", InstructionFormat12xOrId),
        ("double-to-float", InstructionFormat12xOrId),
        ("int-to-byte", InstructionFormat12xOrId),
        ("int-to-char", InstructionFormat12xOrId),
        ("int-to-short", InstructionFormat12xOrId),
        ("add-int/2addr", InstructionFormat12x),
        ("sub-int/2addr", InstructionFormat12x),
        ("mul-int/2addr", InstructionFormat12x),
        ("div-int/2addr", InstructionFormat12x),
        ("rem-int/2addr", InstructionFormat12x),
        ("and-int/2addr", InstructionFormat12x),
        ("or-int/2addr", InstructionFormat12x),
        ("xor-int/2addr", InstructionFormat12x),
        ("shl-int/2addr", InstructionFormat12x),
        ("shr-int/2addr", InstructionFormat12x),
        ("ushr-int/2addr", InstructionFormat12x),
        ("add-long/2addr", InstructionFormat12x),
        ("sub-long/2addr", InstructionFormat12x),
        ("mul-long/2addr", InstructionFormat12x),
        ("div-long/2addr", InstructionFormat12x),
        ("rem-long/2addr", InstructionFormat12x),
        ("and-long/2addr", InstructionFormat12x),
        ("or-long/2addr", InstructionFormat12x),
        ("xor-long/2addr", InstructionFormat12x),
        ("shl-long/2addr", InstructionFormat12x),
        ("shr-long/2addr", InstructionFormat12x),
        ("ushr-long/2addr", InstructionFormat12x),
        ("add-float/2addr", InstructionFormat12x),
        ("sub-float/2addr", InstructionFormat12x),
        ("mul-float/2addr", InstructionFormat12x),
        ("div-float/2addr", InstructionFormat12x),
        ("rem-float/2addr", InstructionFormat12x),
        ("add-double/2addr", InstructionFormat12x),
        ("sub-double/2addr", InstructionFormat12x),
        ("mul-double/2addr", InstructionFormat12x),
        ("div-double/2addr", InstructionFormat12x),
        ("rem-double/2addr", InstructionFormat12x),
        ("throw-verification-error", InstructionFormat20bc),
        ("goto/16", InstructionFormat20t),
        ("sget", InstructionFormat21cField),
        ("sget-wide", InstructionFormat21cField),
        ("sget-object", InstructionFormat21cField),
        ("sget-boolean", InstructionFormat21cField),
        ("sget-byte", InstructionFormat21cField),
        ("sget-char", InstructionFormat21cField),
        ("sget-short", InstructionFormat21cField),
        ("sput", InstructionFormat21cField),
        ("sput-wide", InstructionFormat21cField),
        ("sput-object", InstructionFormat21cField),
        ("sput-boolean", InstructionFormat21cField),
        ("sput-byte", InstructionFormat21cField),
        ("sput-char", InstructionFormat21cField),
        ("sput-short", InstructionFormat21cField),
        ("sget-volatile", InstructionFormat21cFieldOdex),
        ("sget-wide-volatile", InstructionFormat21cFieldOdex),
        ("sget-object-volatile", InstructionFormat21cFieldOdex),
        ("sput-volatile", InstructionFormat21cFieldOdex),
        ("sput-wide-volatile", InstructionFormat21cFieldOdex),
        ("sput-object-volatile", InstructionFormat21cFieldOdex),
        ("const-string", InstructionFormat21cString),
        ("check-cast", InstructionFormat21cType),
        ("new-instance", InstructionFormat21cType),
        ("const-class", InstructionFormat21cType),
        ("const/high16", InstructionFormat21ih),
        ("const-wide/high16", InstructionFormat21lh),
        ("const/16", InstructionFormat21s),
        ("const-wide/16", InstructionFormat21s),
        ("if-eqz", InstructionFormat21t),
        ("if-nez", InstructionFormat21t),
        ("if-ltz", InstructionFormat21t),
        ("if-gez", InstructionFormat21t),
        ("if-gtz", InstructionFormat21t),
        ("if-lez", InstructionFormat21t),
        ("add-int/lit8", InstructionFormat22b),
        ("rsub-int/lit8", InstructionFormat22b),
        ("mul-int/lit8", InstructionFormat22b),
        ("div-int/lit8", InstructionFormat22b),
        ("rem-int/lit8", InstructionFormat22b),
        ("and-int/lit8", InstructionFormat22b),
        ("or-int/lit8", InstructionFormat22b),
        ("xor-int/lit8", InstructionFormat22b),
        ("shl-int/lit8", InstructionFormat22b),
        ("shr-int/lit8", InstructionFormat22b),
        ("ushr-int/lit8", InstructionFormat22b),
        ("iget", InstructionFormat22cField),
        ("iget-wide", InstructionFormat22cField),
        ("iget-object", InstructionFormat22cField),
        ("iget-boolean", InstructionFormat22cField),
        ("iget-byte", InstructionFormat22cField),
        ("iget-char", InstructionFormat22cField),
        ("iget-short", InstructionFormat22cField),
        ("iput", InstructionFormat22cField),
        ("iput-wide", InstructionFormat22cField),
        ("iput-object", InstructionFormat22cField),
        ("iput-boolean", InstructionFormat22cField),
        ("iput-byte", InstructionFormat22cField),
        ("iput-char", InstructionFormat22cField),
        ("iput-short", InstructionFormat22cField),
        ("iget-volatile", InstructionFormat22cFieldOdex),
        ("iget-wide-volatile", InstructionFormat22cFieldOdex),
        ("iget-object-volatile", InstructionFormat22cFieldOdex),
        ("iput-volatile", InstructionFormat22cFieldOdex),
        ("iput-wide-volatile", InstructionFormat22cFieldOdex),
        ("iput-object-volatile", InstructionFormat22cFieldOdex),
        ("instance-of", InstructionFormat22cType),
        ("new-array", InstructionFormat22cType),
        ("iget-quick", InstructionFormat22csField),
        ("iget-wide-quick", InstructionFormat22csField),
        ("iget-object-quick", InstructionFormat22csField),
        ("iget-boolean-quick", InstructionFormat22csField),
        ("iget-byte-quick", InstructionFormat22csField),
        ("iget-char-quick", InstructionFormat22csField),
        ("iget-short-quick", InstructionFormat22csField),
        ("iput-quick", InstructionFormat22csField),
        ("iput-wide-quick", InstructionFormat22csField),
        ("iput-object-quick", InstructionFormat22csField),
        ("iput-boolean-quick", InstructionFormat22csField),
        ("iput-byte-quick", InstructionFormat22csField),
        ("iput-char-quick", InstructionFormat22csField),
        ("iput-short-quick", InstructionFormat22csField),
        ("rsub-int", InstructionFormat22sOrId),
        ("add-int/lit16", InstructionFormat22s),
        ("mul-int/lit16", InstructionFormat22s),
        ("div-int/lit16", InstructionFormat22s),
        ("rem-int/lit16", InstructionFormat22s),
        ("and-int/lit16", InstructionFormat22s),
        ("or-int/lit16", InstructionFormat22s),
        ("xor-int/lit16", InstructionFormat22s),
        ("if-eq", InstructionFormat22t),
        ("if-ne", InstructionFormat22t),
        ("if-lt", InstructionFormat22t),
        ("if-ge", InstructionFormat22t),
        ("if-gt", InstructionFormat22t),
        ("if-le", InstructionFormat22t),
        ("move/from16", InstructionFormat22x),
        ("move-wide/from16", InstructionFormat22x),
        ("move-object/from16", InstructionFormat22x),
        ("cmpl-float", InstructionFormat23x),
        ("cmpg-float", InstructionFormat23x),
        ("cmpl-double", InstructionFormat23x),
        ("cmpg-double", InstructionFormat23x),
        ("cmp-long", InstructionFormat23x),
        ("aget", InstructionFormat23x),
        ("aget-wide", InstructionFormat23x),
        ("aget-object", InstructionFormat23x),
        ("aget-boolean", InstructionFormat23x),
        ("aget-byte", InstructionFormat23x),
        ("aget-char", InstructionFormat23x),
        ("aget-short", InstructionFormat23x),
        ("aput", InstructionFormat23x),
        ("aput-wide", InstructionFormat23x),
        ("aput-object", InstructionFormat23x),
        ("aput-boolean", InstructionFormat23x),
        ("aput-byte", InstructionFormat23x),
        ("aput-char", InstructionFormat23x),
        ("aput-short", InstructionFormat23x),
        ("add-int", InstructionFormat23x),
        ("sub-int", InstructionFormat23x),
        ("mul-int", InstructionFormat23x),
        ("div-int", InstructionFormat23x),
        ("rem-int", InstructionFormat23x),
        ("and-int", InstructionFormat23x),
        ("or-int", InstructionFormat23x),
        ("xor-int", InstructionFormat23x),
        ("shl-int", InstructionFormat23x),
        ("shr-int", InstructionFormat23x),
        ("ushr-int", InstructionFormat23x),
        ("add-long", InstructionFormat23x),
        ("sub-long", InstructionFormat23x),
        ("mul-long", InstructionFormat23x),
        ("div-long", InstructionFormat23x),
        ("rem-long", InstructionFormat23x),
        ("and-long", InstructionFormat23x),
        ("or-long", InstructionFormat23x),
        ("xor-long", InstructionFormat23x),
        ("shl-long", InstructionFormat23x),
        ("shr-long", InstructionFormat23x),
        ("ushr-long", InstructionFormat23x),
        ("add-float", InstructionFormat23x),
        ("sub-float", InstructionFormat23x),
        ("mul-float", InstructionFormat23x),
        ("div-float", InstructionFormat23x),
        ("rem-float", InstructionFormat23x),
        ("add-double", InstructionFormat23x),
        ("sub-double", InstructionFormat23x),
        ("mul-double", InstructionFormat23x),
        ("div-double", InstructionFormat23x),
        ("rem-double", InstructionFormat23x),
        ("goto/32", InstructionFormat30t),
        ("const-string/jumbo", InstructionFormat31c),
        ("const", InstructionFormat31iOrId),
        ("const-wide/32", InstructionFormat31i),
        ("fill-array-data", InstructionFormat31t),
        ("packed-switch", InstructionFormat31t),
        ("sparse-switch", InstructionFormat31t),
        ("move/16", InstructionFormat32x),
        ("move-wide/16", InstructionFormat32x),
        ("move-object/16", InstructionFormat32x),
        ("invoke-virtual", InstructionFormat35cMethod),
        ("invoke-super", InstructionFormat35cMethod),
        ("invoke-direct", InstructionFormat35cMethod),
        ("invoke-static", InstructionFormat35cMethod),
        ("invoke-interface", InstructionFormat35cMethod),
        ("invoke-direct-empty", InstructionFormat35cMethodOdex),
        ("filled-new-array", InstructionFormat35cType),
        ("execute-inline", InstructionFormat35miMethod),
        ("invoke-virtual-quick", InstructionFormat35msMethod),
        ("invoke-super-quick", InstructionFormat35msMethod),
        ("invoke-virtual/range", InstructionFormat3rcMethod),
        ("invoke-super/range", InstructionFormat3rcMethod),
        ("invoke-direct/range", InstructionFormat3rcMethod),
        ("invoke-static/range", InstructionFormat3rcMethod),
        ("invoke-interface/range", InstructionFormat3rcMethod),
        ("invoke-object-init/range", InstructionFormat3rcMethodOdex),
        ("filled-new-array/range", InstructionFormat3rcType),
        ("execute-inline/range", InstructionFormat3rmiMethod),
        ("invoke-virtual-quick/range", InstructionFormat3rmsMethod),
        ("invoke-super-quick/range", InstructionFormat3rmsMethod),
        ("const-wide", InstructionFormat51l),
    ]
};

/// Token kind for an instruction mnemonic, or `None` if `text` is not one.
pub fn mnemonic_kind(text: &str) -> Option<TokenKind> {
    MNEMONICS
        .iter()
        .find(|(name, _)| *name == text)
        .map(|(_, kind)| *kind)
}

/// True if some mnemonic starts with `prefix` followed by `/`, i.e. the
/// lexer should try to extend `prefix` across a slash.
pub fn has_slash_variant(prefix: &str) -> bool {
    MNEMONICS.iter().any(|(name, _)| {
        name.len() > prefix.len() && name.starts_with(prefix) && name[prefix.len()..].starts_with('/')
    })
}

// ──────────────────────────────────────────────
// Legacy-encoding oracle
// ──────────────────────────────────────────────

/// Decides whether an optimized instruction may be assembled.
///
/// Injected into the parser at construction so the grammar stays free of
/// opcode-table knowledge.
pub trait LegacyOracle {
    fn is_legacy_eligible(&self, mnemonic: &str, api_level: u32) -> bool;
}

/// Default oracle backed by the built-in table of gated optimized opcodes.
///
/// An instruction is eligible when the table knows it at `api_level` (it was
/// introduced at or before that level) and `api_level` predates
/// [`LEGACY_CUTOFF_API`].
#[derive(Debug, Clone, Copy, Default)]
pub struct OpcodeTable;

/// Gated optimized opcodes with the API level that introduced them.
const GATED_LEGACY_OPCODES: &[(&str, u32)] = &[
    ("return-void-barrier", 11),
    ("return-void-no-barrier", 22),
    ("invoke-direct-empty", 1),
    ("invoke-object-init/range", 1),
    ("iget-volatile", 9),
    ("iput-volatile", 9),
    ("sget-volatile", 9),
    ("sput-volatile", 9),
    ("iget-object-volatile", 9),
    ("iget-wide-volatile", 9),
    ("iput-wide-volatile", 9),
    ("sget-wide-volatile", 9),
    ("sput-wide-volatile", 9),
    ("iput-object-volatile", 9),
    ("sget-object-volatile", 9),
    ("sput-object-volatile", 9),
];

impl OpcodeTable {
    /// API level that introduced `mnemonic`, if it is a gated legacy opcode.
    pub fn introduced_in(&self, mnemonic: &str) -> Option<u32> {
        GATED_LEGACY_OPCODES
            .iter()
            .find(|(name, _)| *name == mnemonic)
            .map(|(_, api)| *api)
    }
}

impl LegacyOracle for OpcodeTable {
    fn is_legacy_eligible(&self, mnemonic: &str, api_level: u32) -> bool {
        match self.introduced_in(mnemonic) {
            Some(introduced) => api_level >= introduced && api_level < LEGACY_CUTOFF_API,
            None => false,
        }
    }
}
