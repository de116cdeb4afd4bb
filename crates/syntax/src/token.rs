//! Token model shared by the lexer, the cursor and the parser.
//!
//! Every terminal the grammar knows about has its own [`TokenKind`]. Many
//! word-like kinds (access flags, mnemonics, numeric-looking words) double as
//! identifiers; the parser decides which reading applies from the grammar
//! position, see [`crate::categories::IDENTIFIER_KINDS`].

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    // ── Directives ──────────────────────────────────
    ClassDirective,
    SuperDirective,
    ImplementsDirective,
    SourceDirective,
    FieldDirective,
    EndFieldDirective,
    SubannotationDirective,
    EndSubannotationDirective,
    AnnotationDirective,
    EndAnnotationDirective,
    EnumDirective,
    MethodDirective,
    EndMethodDirective,
    RegistersDirective,
    LocalsDirective,
    ArrayDataDirective,
    EndArrayDataDirective,
    PackedSwitchDirective,
    EndPackedSwitchDirective,
    SparseSwitchDirective,
    EndSparseSwitchDirective,
    CatchDirective,
    CatchallDirective,
    LineDirective,
    ParameterDirective,
    EndParameterDirective,
    LocalDirective,
    EndLocalDirective,
    RestartLocalDirective,
    PrologueDirective,
    EpilogueDirective,

    // ── Punctuation ─────────────────────────────────
    DotDot,
    Arrow,
    Equal,
    Colon,
    Comma,
    OpenBrace,
    CloseBrace,
    OpenParen,
    CloseParen,

    // ── Literals ────────────────────────────────────
    PositiveIntegerLiteral,
    NegativeIntegerLiteral,
    LongLiteral,
    ShortLiteral,
    ByteLiteral,
    FloatLiteralOrId,
    DoubleLiteralOrId,
    FloatLiteral,
    DoubleLiteral,
    BoolLiteral,
    NullLiteral,
    StringLiteral,
    CharLiteral,

    // ── Words and descriptors ───────────────────────
    Register,
    AnnotationVisibility,
    AccessSpec,
    VerificationErrorType,
    InlineIndex,
    VtableIndex,
    FieldOffset,
    PrimitiveType,
    VoidType,
    ClassDescriptor,
    ArrayDescriptor,
    /// Several concatenated descriptors inside `( )`, e.g. `ILjava/lang/String;[J`.
    ParamList,
    /// Two or more primitive letters, e.g. `IJZ`: a parameter list or a name.
    ParamListOrIdPrimitiveType,
    /// `<init>` / `<clinit>`
    MemberName,
    SimpleName,

    // ── Instruction mnemonics, one kind per format ──
    InstructionFormat10t,
    InstructionFormat10x,
    InstructionFormat10xOdex,
    InstructionFormat11n,
    InstructionFormat11x,
    InstructionFormat12x,
    InstructionFormat12xOrId,
    InstructionFormat20bc,
    InstructionFormat20t,
    InstructionFormat21cField,
    InstructionFormat21cFieldOdex,
    InstructionFormat21cString,
    InstructionFormat21cType,
    InstructionFormat21ih,
    InstructionFormat21lh,
    InstructionFormat21s,
    InstructionFormat21t,
    InstructionFormat22b,
    InstructionFormat22cField,
    InstructionFormat22cFieldOdex,
    InstructionFormat22cType,
    InstructionFormat22csField,
    InstructionFormat22s,
    InstructionFormat22sOrId,
    InstructionFormat22t,
    InstructionFormat22x,
    InstructionFormat23x,
    InstructionFormat30t,
    InstructionFormat31c,
    InstructionFormat31i,
    InstructionFormat31iOrId,
    InstructionFormat31t,
    InstructionFormat32x,
    InstructionFormat35cMethod,
    InstructionFormat35cMethodOdex,
    InstructionFormat35cType,
    InstructionFormat35miMethod,
    InstructionFormat35msMethod,
    InstructionFormat3rcMethod,
    InstructionFormat3rcMethodOdex,
    InstructionFormat3rcType,
    InstructionFormat3rmiMethod,
    InstructionFormat3rmsMethod,
    InstructionFormat51l,

    // ── Trivia and sentinels ────────────────────────
    LineComment,
    InvalidToken,
    Eof,
}

impl TokenKind {
    /// Human-readable name used in "expected ..." messages.
    pub fn describe(self) -> &'static str {
        use TokenKind::*;
        match self {
            ClassDirective => "'.class'",
            SuperDirective => "'.super'",
            ImplementsDirective => "'.implements'",
            SourceDirective => "'.source'",
            FieldDirective => "'.field'",
            EndFieldDirective => "'.end field'",
            SubannotationDirective => "'.subannotation'",
            EndSubannotationDirective => "'.end subannotation'",
            AnnotationDirective => "'.annotation'",
            EndAnnotationDirective => "'.end annotation'",
            EnumDirective => "'.enum'",
            MethodDirective => "'.method'",
            EndMethodDirective => "'.end method'",
            RegistersDirective => "'.registers'",
            LocalsDirective => "'.locals'",
            ArrayDataDirective => "'.array-data'",
            EndArrayDataDirective => "'.end array-data'",
            PackedSwitchDirective => "'.packed-switch'",
            EndPackedSwitchDirective => "'.end packed-switch'",
            SparseSwitchDirective => "'.sparse-switch'",
            EndSparseSwitchDirective => "'.end sparse-switch'",
            CatchDirective => "'.catch'",
            CatchallDirective => "'.catchall'",
            LineDirective => "'.line'",
            ParameterDirective => "'.param'",
            EndParameterDirective => "'.end param'",
            LocalDirective => "'.local'",
            EndLocalDirective => "'.end local'",
            RestartLocalDirective => "'.restart local'",
            PrologueDirective => "'.prologue'",
            EpilogueDirective => "'.epilogue'",
            DotDot => "'..'",
            Arrow => "'->'",
            Equal => "'='",
            Colon => "':'",
            Comma => "','",
            OpenBrace => "'{'",
            CloseBrace => "'}'",
            OpenParen => "'('",
            CloseParen => "')'",
            PositiveIntegerLiteral | NegativeIntegerLiteral => "integer literal",
            LongLiteral => "long literal",
            ShortLiteral => "short literal",
            ByteLiteral => "byte literal",
            FloatLiteralOrId | FloatLiteral => "float literal",
            DoubleLiteralOrId | DoubleLiteral => "double literal",
            BoolLiteral => "boolean literal",
            NullLiteral => "'null'",
            StringLiteral => "string literal",
            CharLiteral => "char literal",
            Register => "register",
            AnnotationVisibility => "annotation visibility",
            AccessSpec => "access flag",
            VerificationErrorType => "verification error type",
            InlineIndex => "inline index",
            VtableIndex => "vtable index",
            FieldOffset => "field offset",
            PrimitiveType => "primitive type",
            VoidType => "'V'",
            ClassDescriptor => "class descriptor",
            ArrayDescriptor => "array descriptor",
            ParamList | ParamListOrIdPrimitiveType => "parameter list",
            MemberName => "member name",
            SimpleName => "identifier",
            LineComment => "comment",
            InvalidToken => "invalid token",
            Eof => "end of file",
            _ => "instruction",
        }
    }
}

/// Tokens on the hidden channel are kept for diagnostics but never reach
/// grammar rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Channel {
    Default,
    Hidden,
}

/// A lexed token. Lines and columns are 1-based; offsets are 0-based char
/// offsets into the source, `end_offset` exclusive.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub line: u32,
    pub column: u32,
    pub start_offset: usize,
    pub end_offset: usize,
    pub channel: Channel,
}

impl Token {
    pub fn new(
        kind: TokenKind,
        text: impl Into<String>,
        line: u32,
        column: u32,
        start_offset: usize,
    ) -> Self {
        let text = text.into();
        let end_offset = start_offset + text.chars().count();
        Token {
            kind,
            text,
            line,
            column,
            start_offset,
            end_offset,
            channel: Channel::Default,
        }
    }

    /// A token carved out of this one, `char_start..char_end` in char units.
    ///
    /// Descriptor runs never span lines, so only the column moves.
    pub fn sub_token(&self, kind: TokenKind, char_start: usize, char_end: usize) -> Token {
        let text: String = self
            .text
            .chars()
            .skip(char_start)
            .take(char_end - char_start)
            .collect();
        Token {
            kind,
            text,
            line: self.line,
            column: self.column + char_start as u32,
            start_offset: self.start_offset + char_start,
            end_offset: self.start_offset + char_end,
            channel: self.channel,
        }
    }

    /// The same token re-tagged with another kind, text and position unchanged.
    pub fn with_kind(&self, kind: TokenKind) -> Token {
        Token {
            kind,
            ..self.clone()
        }
    }

    pub fn is_hidden(&self) -> bool {
        self.channel == Channel::Hidden
    }
}
