//! Smali lexer: source text to a flat token vector.
//!
//! Lexing never fails. Input that fits no token shape becomes an
//! [`TokenKind::InvalidToken`] which the parser reports and recovers from.
//! Whitespace is dropped; `#` comments are kept on the hidden channel.
//!
//! Text between `(` and `)` is lexed in parameter-list mode, where each
//! whitespace-separated chunk is one of: a primitive letter, a run of
//! primitive letters, a class descriptor, an array descriptor, or a
//! concatenated run of descriptors ([`TokenKind::ParamList`]).

use crate::opcodes;
use crate::token::{Channel, Token, TokenKind};

pub fn lex(src: &str) -> Vec<Token> {
    let mut lexer = Lexer {
        chars: src.chars().collect(),
        pos: 0,
        line: 1,
        column: 1,
        tokens: Vec::new(),
        in_param_list: false,
    };
    lexer.run();
    lexer.tokens
}

/// Why an invalid token was rejected, for the parser's diagnostic.
pub fn describe_invalid(text: &str) -> &'static str {
    if text.starts_with('"') {
        "unterminated or malformed string literal"
    } else if text.starts_with('\'') {
        "malformed character literal"
    } else if text.starts_with('.') {
        "unknown directive"
    } else if text.starts_with('L') && text.ends_with(';') {
        "malformed class descriptor"
    } else if text.starts_with('<') {
        "malformed member name"
    } else {
        "unrecognized input"
    }
}

struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: u32,
    column: u32,
    tokens: Vec<Token>,
    in_param_list: bool,
}

struct Mark {
    pos: usize,
    line: u32,
    column: u32,
}

impl Lexer {
    fn run(&mut self) {
        while self.pos < self.chars.len() {
            let c = self.chars[self.pos];

            if c.is_whitespace() {
                // An unclosed prototype ends with its line.
                if c == '\n' {
                    self.in_param_list = false;
                }
                self.bump();
                continue;
            }

            if c == '#' {
                let start = self.mark();
                while self.pos < self.chars.len() && self.chars[self.pos] != '\n' {
                    self.bump();
                }
                self.push_hidden(TokenKind::LineComment, start);
                continue;
            }

            if self.in_param_list {
                self.lex_param_chunk();
                continue;
            }

            let start = self.mark();
            match c {
                '.' => self.lex_dot(start),
                '"' => self.lex_string(start),
                '\'' => self.lex_char(start),
                '{' => self.single(TokenKind::OpenBrace, start),
                '}' => self.single(TokenKind::CloseBrace, start),
                '(' => {
                    self.single(TokenKind::OpenParen, start);
                    self.in_param_list = true;
                }
                ')' => self.single(TokenKind::CloseParen, start),
                ',' => self.single(TokenKind::Comma, start),
                '=' => self.single(TokenKind::Equal, start),
                ':' => self.single(TokenKind::Colon, start),
                '-' if self.peek_at(1) == Some('>') => {
                    self.bump();
                    self.bump();
                    self.push(TokenKind::Arrow, start);
                }
                '<' => self.lex_member_name(start),
                '[' => self.lex_array_descriptor(start),
                'L' if self.class_descriptor_end(self.pos).is_some() => {
                    self.lex_class_descriptor(start)
                }
                _ if is_name_char(c) || c == '+' => self.lex_word(start),
                _ => {
                    self.bump();
                    self.push(TokenKind::InvalidToken, start);
                }
            }
        }

        let start = self.mark();
        self.push(TokenKind::Eof, start);
    }

    // -- Position bookkeeping ------------------------------------

    fn mark(&self) -> Mark {
        Mark {
            pos: self.pos,
            line: self.line,
            column: self.column,
        }
    }

    fn bump(&mut self) {
        if self.chars[self.pos] == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        self.pos += 1;
    }

    fn bump_to(&mut self, end: usize) {
        while self.pos < end {
            self.bump();
        }
    }

    fn peek_at(&self, ahead: usize) -> Option<char> {
        self.chars.get(self.pos + ahead).copied()
    }

    fn text_from(&self, start: &Mark) -> String {
        self.chars[start.pos..self.pos].iter().collect()
    }

    fn push(&mut self, kind: TokenKind, start: Mark) {
        let text = self.text_from(&start);
        self.tokens
            .push(Token::new(kind, text, start.line, start.column, start.pos));
    }

    fn push_hidden(&mut self, kind: TokenKind, start: Mark) {
        self.push(kind, start);
        if let Some(tok) = self.tokens.last_mut() {
            tok.channel = Channel::Hidden;
        }
    }

    fn single(&mut self, kind: TokenKind, start: Mark) {
        self.bump();
        self.push(kind, start);
    }

    // -- Directives ----------------------------------------------

    fn lex_dot(&mut self, start: Mark) {
        if self.peek_at(1) == Some('.') {
            self.bump();
            self.bump();
            self.push(TokenKind::DotDot, start);
            return;
        }

        self.bump();
        while self.pos < self.chars.len()
            && (self.chars[self.pos].is_ascii_lowercase() || self.chars[self.pos] == '-')
        {
            self.bump();
        }
        let head = self.text_from(&start);

        // `.end field`, `.restart local`: the keyword after the blank is part
        // of the directive.
        let mut key = head.clone();
        if head == ".end" || head == ".restart" {
            let mut look = self.pos;
            while look < self.chars.len() && (self.chars[look] == ' ' || self.chars[look] == '\t') {
                look += 1;
            }
            let word_start = look;
            while look < self.chars.len()
                && (self.chars[look].is_ascii_lowercase() || self.chars[look] == '-')
            {
                look += 1;
            }
            if look > word_start && word_start > self.pos {
                let word: String = self.chars[word_start..look].iter().collect();
                key = format!("{} {}", head, word);
                self.bump_to(look);
            }
        }

        match directive_kind(&key) {
            Some(kind) => self.push(kind, start),
            None => self.push(TokenKind::InvalidToken, start),
        }
    }

    // -- String and char literals --------------------------------

    fn lex_string(&mut self, start: Mark) {
        self.bump();
        let mut valid = true;
        loop {
            match self.peek_at(0) {
                None | Some('\n') => {
                    self.push(TokenKind::InvalidToken, start);
                    return;
                }
                Some('"') => {
                    self.bump();
                    break;
                }
                Some('\\') => {
                    self.bump();
                    valid &= self.lex_escape();
                }
                Some(_) => self.bump(),
            }
        }
        let kind = if valid {
            TokenKind::StringLiteral
        } else {
            TokenKind::InvalidToken
        };
        self.push(kind, start);
    }

    fn lex_char(&mut self, start: Mark) {
        self.bump();
        let valid = match self.peek_at(0) {
            Some('\\') => {
                self.bump();
                self.lex_escape()
            }
            Some('\'') | Some('\n') | None => false,
            Some(_) => {
                self.bump();
                true
            }
        };
        if valid && self.peek_at(0) == Some('\'') {
            self.bump();
            self.push(TokenKind::CharLiteral, start);
        } else {
            while self.pos < self.chars.len()
                && self.chars[self.pos] != '\''
                && self.chars[self.pos] != '\n'
            {
                self.bump();
            }
            if self.peek_at(0) == Some('\'') {
                self.bump();
            }
            self.push(TokenKind::InvalidToken, start);
        }
    }

    /// Consume one escape sequence after the backslash. Returns false if it
    /// is not one of the recognised escapes.
    fn lex_escape(&mut self) -> bool {
        match self.peek_at(0) {
            Some('b' | 't' | 'n' | 'f' | 'r' | '\'' | '"' | '\\') => {
                self.bump();
                true
            }
            Some('u') => {
                self.bump();
                for _ in 0..4 {
                    match self.peek_at(0) {
                        Some(h) if h.is_ascii_hexdigit() => self.bump(),
                        _ => return false,
                    }
                }
                true
            }
            Some('\n') | None => false,
            Some(_) => {
                self.bump();
                false
            }
        }
    }

    // -- Names and descriptors -----------------------------------

    fn lex_member_name(&mut self, start: Mark) {
        self.bump();
        let name_start = self.pos;
        while self.pos < self.chars.len() && is_name_char(self.chars[self.pos]) {
            self.bump();
        }
        let has_name = self.pos > name_start;
        if has_name && self.peek_at(0) == Some('>') {
            self.bump();
            self.push(TokenKind::MemberName, start);
        } else {
            self.push(TokenKind::InvalidToken, start);
        }
    }

    /// End (exclusive) of a well-formed class descriptor starting at `at`.
    fn class_descriptor_end(&self, at: usize) -> Option<usize> {
        if self.chars.get(at) != Some(&'L') {
            return None;
        }
        let mut i = at + 1;
        let mut segment_len = 0usize;
        while i < self.chars.len() {
            let c = self.chars[i];
            if c == ';' {
                return if segment_len > 0 { Some(i + 1) } else { None };
            }
            if c == '/' {
                if segment_len == 0 {
                    return None;
                }
                segment_len = 0;
            } else if is_name_char(c) {
                segment_len += 1;
            } else {
                return None;
            }
            i += 1;
        }
        None
    }

    fn lex_class_descriptor(&mut self, start: Mark) {
        if let Some(end) = self.class_descriptor_end(self.pos) {
            self.bump_to(end);
            self.push(TokenKind::ClassDescriptor, start);
        }
    }

    /// `[`+ followed by one element. The element text is taken leniently;
    /// the parser validates it so malformed descriptors get a precise error.
    fn lex_array_descriptor(&mut self, start: Mark) {
        while self.peek_at(0) == Some('[') {
            self.bump();
        }
        match self.peek_at(0) {
            Some('L') => {
                while let Some(c) = self.peek_at(0) {
                    if c == ';' {
                        self.bump();
                        break;
                    }
                    if is_delimiter(c) || (c == '-' && self.peek_at(1) == Some('>')) {
                        break;
                    }
                    self.bump();
                }
            }
            Some(c) if is_primitive(c) => self.bump(),
            _ => {
                while matches!(self.peek_at(0), Some(c) if is_name_char(c)) {
                    self.bump();
                }
            }
        }
        self.push(TokenKind::ArrayDescriptor, start);
    }

    fn lex_param_chunk(&mut self) {
        let start = self.mark();
        if self.chars[self.pos] == ')' {
            self.in_param_list = false;
            self.single(TokenKind::CloseParen, start);
            return;
        }
        while let Some(c) = self.peek_at(0) {
            if c.is_whitespace() || c == ')' || c == '#' {
                break;
            }
            self.bump();
        }
        let text = self.text_from(&start);
        self.push(classify_param_chunk(&text), start);
    }

    // -- Words and numbers ---------------------------------------

    fn lex_word(&mut self, start: Mark) {
        let number_end = self.number_end(self.pos);
        let mut word_end = self.pos;
        while word_end < self.chars.len()
            && is_name_char(self.chars[word_end])
            && !(self.chars[word_end] == '-' && self.chars.get(word_end + 1) == Some(&'>'))
        {
            word_end += 1;
        }

        if let Some(number_end) = number_end {
            if number_end >= word_end {
                self.bump_to(number_end);
                let text = self.text_from(&start);
                let kind = classify_numeric(&text).unwrap_or(TokenKind::InvalidToken);
                self.push(kind, start);
                return;
            }
        }

        if word_end == self.pos {
            // A lone '+' that does not start a number.
            self.bump();
            self.push(TokenKind::InvalidToken, start);
            return;
        }
        self.bump_to(word_end);
        let word = self.text_from(&start);

        if self.peek_at(0) == Some('/') && opcodes::has_slash_variant(&word) {
            let mut end = self.pos + 1;
            while end < self.chars.len() && is_name_char(self.chars[end]) {
                end += 1;
            }
            let extended: String = self.chars[start.pos..end].iter().collect();
            if let Some(kind) = opcodes::mnemonic_kind(&extended) {
                self.bump_to(end);
                self.push(kind, start);
                return;
            }
        }

        if self.peek_at(0) == Some('@') {
            let index_kind = match word.as_str() {
                "inline" => Some(TokenKind::InlineIndex),
                "vtable" => Some(TokenKind::VtableIndex),
                "field" => Some(TokenKind::FieldOffset),
                _ => None,
            };
            if let Some(kind) = index_kind {
                self.bump();
                let digits_start = self.pos;
                if self.peek_at(0) == Some('0') && matches!(self.peek_at(1), Some('x' | 'X')) {
                    self.bump();
                    self.bump();
                }
                let hex_start = self.pos;
                while matches!(self.peek_at(0), Some(h) if h.is_ascii_hexdigit()) {
                    self.bump();
                }
                let kind = if self.pos > hex_start && hex_start > digits_start {
                    kind
                } else {
                    TokenKind::InvalidToken
                };
                self.push(kind, start);
                return;
            }
        }

        self.push(classify_word(&word), start);
    }

    /// End of the longest numeric literal starting at `at`, if any.
    fn number_end(&self, at: usize) -> Option<usize> {
        let chars = &self.chars;
        let digit = |i: usize| chars.get(i).is_some_and(|c| c.is_ascii_digit());
        let hex = |i: usize| chars.get(i).is_some_and(|c| c.is_ascii_hexdigit());

        let mut i = at;
        if matches!(chars.get(i), Some('+' | '-')) {
            i += 1;
        }
        if !digit(i) {
            return None;
        }

        if chars[i] == '0' && matches!(chars.get(i + 1), Some('x' | 'X')) && hex(i + 2) {
            i += 2;
            while hex(i) {
                i += 1;
            }
            let mut is_float = false;
            if chars.get(i) == Some(&'.') && hex(i + 1) {
                i += 1;
                while hex(i) {
                    i += 1;
                }
                is_float = true;
            }
            if matches!(chars.get(i), Some('p' | 'P')) {
                let mut j = i + 1;
                if matches!(chars.get(j), Some('+' | '-')) {
                    j += 1;
                }
                if digit(j) {
                    i = j;
                    while digit(i) {
                        i += 1;
                    }
                    is_float = true;
                }
            }
            // Hex digits already swallow 'f'/'d'; only the float form takes
            // a suffix here.
            let suffixes: &[char] = if is_float {
                &['f', 'F', 'd', 'D']
            } else {
                &['l', 'L', 's', 'S', 't', 'T']
            };
            if chars.get(i).is_some_and(|c| suffixes.contains(c)) {
                i += 1;
            }
            return Some(i);
        }

        while digit(i) {
            i += 1;
        }
        if chars.get(i) == Some(&'.') && digit(i + 1) {
            i += 1;
            while digit(i) {
                i += 1;
            }
        }
        if matches!(chars.get(i), Some('e' | 'E')) {
            let mut j = i + 1;
            if matches!(chars.get(j), Some('+' | '-')) {
                j += 1;
            }
            if digit(j) {
                i = j;
                while digit(i) {
                    i += 1;
                }
            }
        }
        if matches!(
            chars.get(i),
            Some('l' | 'L' | 's' | 'S' | 't' | 'T' | 'f' | 'F' | 'd' | 'D')
        ) {
            i += 1;
        }
        Some(i)
    }
}

// ──────────────────────────────────────────────
// Classification tables
// ──────────────────────────────────────────────

fn directive_kind(key: &str) -> Option<TokenKind> {
    use TokenKind::*;
    let kind = match key {
        ".class" => ClassDirective,
        ".super" => SuperDirective,
        ".implements" => ImplementsDirective,
        ".source" => SourceDirective,
        ".field" => FieldDirective,
        ".end field" => EndFieldDirective,
        ".subannotation" => SubannotationDirective,
        ".end subannotation" => EndSubannotationDirective,
        ".annotation" => AnnotationDirective,
        ".end annotation" => EndAnnotationDirective,
        ".enum" => EnumDirective,
        ".method" => MethodDirective,
        ".end method" => EndMethodDirective,
        ".registers" => RegistersDirective,
        ".locals" => LocalsDirective,
        ".array-data" => ArrayDataDirective,
        ".end array-data" => EndArrayDataDirective,
        ".packed-switch" => PackedSwitchDirective,
        ".end packed-switch" => EndPackedSwitchDirective,
        ".sparse-switch" => SparseSwitchDirective,
        ".end sparse-switch" => EndSparseSwitchDirective,
        ".catch" => CatchDirective,
        ".catchall" => CatchallDirective,
        ".line" => LineDirective,
        ".param" | ".parameter" => ParameterDirective,
        ".end param" | ".end parameter" => EndParameterDirective,
        ".local" => LocalDirective,
        ".end local" => EndLocalDirective,
        ".restart local" => RestartLocalDirective,
        ".prologue" => PrologueDirective,
        ".epilogue" => EpilogueDirective,
        _ => return None,
    };
    Some(kind)
}

const ACCESS_SPECS: &[&str] = &[
    "public",
    "private",
    "protected",
    "static",
    "final",
    "synchronized",
    "bridge",
    "varargs",
    "native",
    "abstract",
    "strictfp",
    "synthetic",
    "constructor",
    "declared-synchronized",
    "interface",
    "enum",
    "annotation",
    "volatile",
    "transient",
];

const ANNOTATION_VISIBILITIES: &[&str] = &["build", "runtime", "system"];

const VERIFICATION_ERROR_TYPES: &[&str] = &[
    "no-error",
    "generic-error",
    "no-such-class",
    "no-such-field",
    "no-such-method",
    "illegal-class-access",
    "illegal-field-access",
    "illegal-method-access",
    "class-change-error",
    "instantiation-error",
];

fn classify_word(word: &str) -> TokenKind {
    if is_register(word) {
        return TokenKind::Register;
    }
    match word {
        "true" | "false" => return TokenKind::BoolLiteral,
        "null" => return TokenKind::NullLiteral,
        "V" => return TokenKind::VoidType,
        _ => {}
    }
    if ACCESS_SPECS.contains(&word) {
        return TokenKind::AccessSpec;
    }
    if ANNOTATION_VISIBILITIES.contains(&word) {
        return TokenKind::AnnotationVisibility;
    }
    if VERIFICATION_ERROR_TYPES.contains(&word) {
        return TokenKind::VerificationErrorType;
    }
    if let Some(kind) = opcodes::mnemonic_kind(word) {
        return kind;
    }
    if word.chars().all(is_primitive) {
        return if word.chars().count() == 1 {
            TokenKind::PrimitiveType
        } else {
            TokenKind::ParamListOrIdPrimitiveType
        };
    }
    classify_numeric(word).unwrap_or(TokenKind::SimpleName)
}

/// Numeric literal kind for `text`, or `None` if it is not a number.
///
/// Words that read as both a number and a name (`Infinity`, `1e5`, `10f`)
/// get the `...OrId` kinds; the grammar position decides which reading wins.
pub fn classify_numeric(text: &str) -> Option<TokenKind> {
    let (negative, body) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    if body.is_empty() {
        return None;
    }
    let name_like = !text.contains('+') && !text.contains('.');

    let (stem, suffix) = match body.char_indices().last() {
        Some((i, c)) if c.is_ascii_alphabetic() && !is_hex_body(body) => (&body[..i], Some(c)),
        _ => (body, None),
    };

    if is_integer_body(body) {
        return Some(if negative {
            TokenKind::NegativeIntegerLiteral
        } else {
            TokenKind::PositiveIntegerLiteral
        });
    }
    if let Some(s) = suffix {
        if is_integer_body(stem) {
            match s {
                'l' | 'L' => return Some(TokenKind::LongLiteral),
                's' | 'S' => return Some(TokenKind::ShortLiteral),
                't' | 'T' => return Some(TokenKind::ByteLiteral),
                _ => {}
            }
        }
    }

    let (float_stem, is_f) = match suffix {
        Some('f' | 'F') => (stem, true),
        Some('d' | 'D') => (stem, false),
        _ => (body, false),
    };
    if !is_float_body(float_stem) {
        return None;
    }
    Some(match (is_f, name_like) {
        (true, true) => TokenKind::FloatLiteralOrId,
        (true, false) => TokenKind::FloatLiteral,
        (false, true) => TokenKind::DoubleLiteralOrId,
        (false, false) => TokenKind::DoubleLiteral,
    })
}

fn is_hex_body(body: &str) -> bool {
    let lower = body.to_ascii_lowercase();
    lower.starts_with("0x") && lower.len() > 2 && lower[2..].chars().all(|c| c.is_ascii_hexdigit())
}

fn is_integer_body(body: &str) -> bool {
    is_hex_body(body) || (!body.is_empty() && body.chars().all(|c| c.is_ascii_digit()))
}

fn is_float_body(body: &str) -> bool {
    if body == "Infinity" || body == "NaN" {
        return true;
    }
    let lower = body.to_ascii_lowercase();
    if let Some(hex) = lower.strip_prefix("0x") {
        let (mantissa, exponent) = match hex.split_once('p') {
            Some((m, e)) => (m, Some(e)),
            None => (hex, None),
        };
        let mantissa_ok = {
            let (int, frac) = mantissa.split_once('.').unwrap_or((mantissa, ""));
            !(int.is_empty() && frac.is_empty())
                && int.chars().all(|c| c.is_ascii_hexdigit())
                && frac.chars().all(|c| c.is_ascii_hexdigit())
        };
        return mantissa_ok && exponent.is_some_and(is_signed_digits);
    }
    let (mantissa, exponent) = match lower.split_once('e') {
        Some((m, e)) => (m, Some(e)),
        None => (lower.as_str(), None),
    };
    let (int, frac) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    let mantissa_ok = !int.is_empty()
        && int.chars().all(|c| c.is_ascii_digit())
        && frac.chars().all(|c| c.is_ascii_digit());
    mantissa_ok && exponent.map_or(true, is_signed_digits)
}

fn is_signed_digits(s: &str) -> bool {
    let digits = s.strip_prefix(['+', '-']).unwrap_or(s);
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

fn classify_param_chunk(chunk: &str) -> TokenKind {
    let chars: Vec<char> = chunk.chars().collect();
    if chars.iter().all(|c| is_primitive(*c)) {
        return if chars.len() == 1 {
            TokenKind::PrimitiveType
        } else {
            TokenKind::ParamListOrIdPrimitiveType
        };
    }
    // Length of the first descriptor; a chunk holding exactly one keeps its
    // own kind, anything longer is a concatenated list.
    let mut i = 0;
    while i < chars.len() && chars[i] == '[' {
        i += 1;
    }
    let first_end = match chars.get(i) {
        Some('L') => chars[i..].iter().position(|c| *c == ';').map(|p| i + p + 1),
        Some(_) => Some(i + 1),
        None => None,
    };
    match first_end {
        Some(end) if end == chars.len() => match chars[0] {
            '[' => TokenKind::ArrayDescriptor,
            'L' => TokenKind::ClassDescriptor,
            'V' => TokenKind::VoidType,
            _ => TokenKind::ParamList,
        },
        None if chars[0] == '[' => TokenKind::ArrayDescriptor,
        _ => TokenKind::ParamList,
    }
}

fn is_primitive(c: char) -> bool {
    matches!(c, 'Z' | 'B' | 'S' | 'C' | 'I' | 'J' | 'F' | 'D')
}

fn is_register(word: &str) -> bool {
    let mut chars = word.chars();
    matches!(chars.next(), Some('v' | 'p'))
        && word.len() > 1
        && chars.all(|c| c.is_ascii_digit())
}

/// Characters allowed in a simple name.
pub(crate) fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || c == '$'
        || c == '_'
        || c == '-'
        || (!c.is_ascii() && !c.is_whitespace() && !c.is_control())
}

fn is_delimiter(c: char) -> bool {
    c.is_whitespace() || matches!(c, ',' | ')' | '(' | '{' | '}' | ':' | '=' | '#')
}
