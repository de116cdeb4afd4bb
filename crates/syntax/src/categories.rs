//! Token kinds the grammar treats as interchangeable at a given position.

use crate::token::TokenKind;
use crate::token::TokenKind::*;

/// Kinds accepted as a simple name. Keywords, mnemonics and numeric-looking
/// words all read as identifiers where the grammar wants a name.
pub const IDENTIFIER_KINDS: &[TokenKind] = &[
    SimpleName,
    AccessSpec,
    VerificationErrorType,
    PositiveIntegerLiteral,
    NegativeIntegerLiteral,
    FloatLiteralOrId,
    DoubleLiteralOrId,
    BoolLiteral,
    NullLiteral,
    Register,
    ParamListOrIdPrimitiveType,
    PrimitiveType,
    VoidType,
    AnnotationVisibility,
    InstructionFormat10t,
    InstructionFormat10x,
    InstructionFormat10xOdex,
    InstructionFormat11x,
    InstructionFormat12xOrId,
    InstructionFormat21cField,
    InstructionFormat21cFieldOdex,
    InstructionFormat21cString,
    InstructionFormat21cType,
    InstructionFormat21t,
    InstructionFormat22cField,
    InstructionFormat22cFieldOdex,
    InstructionFormat22cType,
    InstructionFormat22csField,
    InstructionFormat22sOrId,
    InstructionFormat22t,
    InstructionFormat23x,
    InstructionFormat31iOrId,
    InstructionFormat31t,
    InstructionFormat35cMethod,
    InstructionFormat35cMethodOdex,
    InstructionFormat35cType,
    InstructionFormat35miMethod,
    InstructionFormat35msMethod,
    InstructionFormat51l,
];

/// Integral literals: the array-data element and switch-key positions.
pub const INTEGRAL_LITERAL_KINDS: &[TokenKind] = &[
    LongLiteral,
    PositiveIntegerLiteral,
    NegativeIntegerLiteral,
    ShortLiteral,
    CharLiteral,
    ByteLiteral,
];

/// Literals that fit in 32 bits: the operand of `const` (31i).
pub const FIXED_32BIT_LITERAL_KINDS: &[TokenKind] = &[
    LongLiteral,
    PositiveIntegerLiteral,
    NegativeIntegerLiteral,
    ShortLiteral,
    ByteLiteral,
    FloatLiteralOrId,
    FloatLiteral,
    CharLiteral,
    BoolLiteral,
];

/// Every fixed-width literal: array-data elements.
pub const FIXED_LITERAL_KINDS: &[TokenKind] = &[
    PositiveIntegerLiteral,
    NegativeIntegerLiteral,
    LongLiteral,
    ShortLiteral,
    ByteLiteral,
    FloatLiteralOrId,
    DoubleLiteralOrId,
    FloatLiteral,
    DoubleLiteral,
    CharLiteral,
    BoolLiteral,
];

pub const NONVOID_TYPE_KINDS: &[TokenKind] = &[PrimitiveType, ClassDescriptor, ArrayDescriptor];

pub const REFERENCE_TYPE_KINDS: &[TokenKind] = &[ClassDescriptor, ArrayDescriptor];

/// Directives that may only start a top-level construct. Seeing one inside a
/// method body ends that body.
pub const TOP_LEVEL_KINDS: &[TokenKind] = &[
    ClassDirective,
    SuperDirective,
    ImplementsDirective,
    SourceDirective,
    FieldDirective,
    MethodDirective,
];

pub const DEBUG_DIRECTIVE_KINDS: &[TokenKind] = &[
    LineDirective,
    LocalDirective,
    EndLocalDirective,
    RestartLocalDirective,
    PrologueDirective,
    EpilogueDirective,
    SourceDirective,
];

/// Legacy formats that may be assembled when compatibility mode is on and
/// the oracle allows the opcode.
pub const GATED_LEGACY_FORMATS: &[TokenKind] = &[
    InstructionFormat10xOdex,
    InstructionFormat21cFieldOdex,
    InstructionFormat22cFieldOdex,
    InstructionFormat35cMethodOdex,
    InstructionFormat3rcMethodOdex,
];

/// Legacy formats that carry a raw field offset, inline/vtable index or a
/// bare verification-error opcode. Never assembled.
pub const REJECTED_LEGACY_FORMATS: &[TokenKind] = &[
    InstructionFormat20bc,
    InstructionFormat22csField,
    InstructionFormat35miMethod,
    InstructionFormat3rmiMethod,
    InstructionFormat35msMethod,
    InstructionFormat3rmsMethod,
];

pub fn is_identifier(kind: TokenKind) -> bool {
    IDENTIFIER_KINDS.contains(&kind)
}

/// Identifier or `<init>`-style member name.
pub fn is_member_name(kind: TokenKind) -> bool {
    kind == MemberName || is_identifier(kind)
}

pub fn is_integral_literal(kind: TokenKind) -> bool {
    INTEGRAL_LITERAL_KINDS.contains(&kind)
}

pub fn is_fixed_32bit_literal(kind: TokenKind) -> bool {
    FIXED_32BIT_LITERAL_KINDS.contains(&kind)
}

pub fn is_fixed_literal(kind: TokenKind) -> bool {
    FIXED_LITERAL_KINDS.contains(&kind)
}

pub fn is_nonvoid_type(kind: TokenKind) -> bool {
    NONVOID_TYPE_KINDS.contains(&kind)
}

pub fn is_reference_type(kind: TokenKind) -> bool {
    REFERENCE_TYPE_KINDS.contains(&kind)
}

pub fn is_top_level(kind: TokenKind) -> bool {
    TOP_LEVEL_KINDS.contains(&kind)
}

pub fn is_debug_directive(kind: TokenKind) -> bool {
    DEBUG_DIRECTIVE_KINDS.contains(&kind)
}

pub fn is_gated_legacy(kind: TokenKind) -> bool {
    GATED_LEGACY_FORMATS.contains(&kind)
}

pub fn is_rejected_legacy(kind: TokenKind) -> bool {
    REJECTED_LEGACY_FORMATS.contains(&kind)
}

/// Instruction mnemonic of any format.
pub fn is_instruction(kind: TokenKind) -> bool {
    matches!(
        kind,
        InstructionFormat10t
            | InstructionFormat10x
            | InstructionFormat10xOdex
            | InstructionFormat11n
            | InstructionFormat11x
            | InstructionFormat12x
            | InstructionFormat12xOrId
            | InstructionFormat20bc
            | InstructionFormat20t
            | InstructionFormat21cField
            | InstructionFormat21cFieldOdex
            | InstructionFormat21cString
            | InstructionFormat21cType
            | InstructionFormat21ih
            | InstructionFormat21lh
            | InstructionFormat21s
            | InstructionFormat21t
            | InstructionFormat22b
            | InstructionFormat22cField
            | InstructionFormat22cFieldOdex
            | InstructionFormat22cType
            | InstructionFormat22csField
            | InstructionFormat22s
            | InstructionFormat22sOrId
            | InstructionFormat22t
            | InstructionFormat22x
            | InstructionFormat23x
            | InstructionFormat30t
            | InstructionFormat31c
            | InstructionFormat31i
            | InstructionFormat31iOrId
            | InstructionFormat31t
            | InstructionFormat32x
            | InstructionFormat35cMethod
            | InstructionFormat35cMethodOdex
            | InstructionFormat35cType
            | InstructionFormat35miMethod
            | InstructionFormat35msMethod
            | InstructionFormat3rcMethod
            | InstructionFormat3rcMethodOdex
            | InstructionFormat3rcType
            | InstructionFormat3rmiMethod
            | InstructionFormat3rmsMethod
            | InstructionFormat51l
    )
}

/// Tokens that can begin one method-body item.
pub fn starts_body_item(kind: TokenKind) -> bool {
    is_instruction(kind)
        || is_debug_directive(kind)
        || matches!(
            kind,
            Colon
                | RegistersDirective
                | LocalsDirective
                | CatchDirective
                | CatchallDirective
                | ParameterDirective
                | AnnotationDirective
                | ArrayDataDirective
                | PackedSwitchDirective
                | SparseSwitchDirective
                | EndMethodDirective
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifier_set_covers_keyword_words() {
        for kind in [AccessSpec, Register, PrimitiveType, VoidType, BoolLiteral, NullLiteral] {
            assert!(is_identifier(kind), "{:?}", kind);
        }
        assert!(!is_identifier(ClassDescriptor));
        assert!(!is_identifier(MemberName));
        assert!(is_member_name(MemberName));
    }

    #[test]
    fn slash_mnemonics_are_not_identifiers() {
        // Their surface contains '/', which a simple name cannot.
        for kind in [InstructionFormat11n, InstructionFormat22b, InstructionFormat3rcMethod] {
            assert!(!is_identifier(kind), "{:?}", kind);
            assert!(is_instruction(kind));
        }
    }

    #[test]
    fn legacy_groups_are_disjoint() {
        for kind in GATED_LEGACY_FORMATS {
            assert!(!is_rejected_legacy(*kind));
            assert!(is_instruction(*kind));
        }
        for kind in REJECTED_LEGACY_FORMATS {
            assert!(!is_gated_legacy(*kind));
            assert!(is_instruction(*kind));
        }
        assert_eq!(GATED_LEGACY_FORMATS.len(), 5);
        assert_eq!(REJECTED_LEGACY_FORMATS.len(), 6);
    }

    #[test]
    fn source_is_both_top_level_and_debug() {
        assert!(is_top_level(SourceDirective));
        assert!(is_debug_directive(SourceDirective));
        assert!(starts_body_item(SourceDirective));
    }
}
