//! Instruction dispatch: one operand shape per instruction format.
//!
//! Every rule matches its mnemonic and the exact operand sequence, then
//! builds one `StatementFormat*` node: `[Mnemonic, operand...]`. Field and
//! method references are flattened into the operand list.
//!
//! Optimized ("odex") formats are matched like their regular counterparts
//! and then pass through the legacy gate. Five of them build their regular
//! statement kind when compatibility mode is on and the oracle allows the
//! opcode. Forms that carry a raw field offset, inline index or vtable
//! index, and the verification-error form, are never assembled.

use super::{PResult, Parser};
use crate::ast::{Node, NodeKind, Span};
use crate::categories::{
    is_fixed_32bit_literal, is_fixed_literal, is_gated_legacy, is_rejected_legacy,
};
use crate::cursor::Checkpoint;
use crate::error::{Diagnostic, DiagnosticKind};
use crate::literal;
use crate::token::{Token, TokenKind};

impl<'a> Parser<'a> {
    pub(super) fn instruction(&mut self) -> PResult<Node> {
        let kind = self.peek(0);
        self.rule(rule_name(kind), |p| p.instruction_operands(kind))
    }

    fn instruction_operands(&mut self, kind: TokenKind) -> PResult<Node> {
        use NodeKind as N;
        use TokenKind::*;

        let start = self.cursor.mark();
        let mnemonic = self.consume();
        if is_rejected_legacy(kind) {
            self.rejected_operands(kind)?;
            return Err(self.reject_legacy(start, &mnemonic));
        }
        let mut ops = vec![Node::literal(N::Mnemonic, mnemonic.clone())];

        let statement = match kind {
            InstructionFormat10t | InstructionFormat20t | InstructionFormat30t => {
                ops.push(self.label_ref()?);
                match kind {
                    InstructionFormat10t => N::StatementFormat10t,
                    InstructionFormat20t => N::StatementFormat20t,
                    _ => N::StatementFormat30t,
                }
            }
            InstructionFormat10x | InstructionFormat10xOdex => N::StatementFormat10x,
            InstructionFormat11n => {
                self.register_then_comma(&mut ops)?;
                ops.push(self.integral_literal()?);
                N::StatementFormat11n
            }
            InstructionFormat11x => {
                ops.push(self.register()?);
                N::StatementFormat11x
            }
            InstructionFormat12x | InstructionFormat12xOrId => {
                self.register_then_comma(&mut ops)?;
                ops.push(self.register()?);
                N::StatementFormat12x
            }
            InstructionFormat21cField | InstructionFormat21cFieldOdex => {
                self.register_then_comma(&mut ops)?;
                ops.extend(self.field_reference()?);
                N::StatementFormat21cField
            }
            InstructionFormat21cString => {
                self.register_then_comma(&mut ops)?;
                ops.push(self.string_literal()?);
                N::StatementFormat21cString
            }
            InstructionFormat21cType => {
                self.register_then_comma(&mut ops)?;
                ops.push(self.nonvoid_type_descriptor()?);
                N::StatementFormat21cType
            }
            InstructionFormat21ih => {
                self.register_then_comma(&mut ops)?;
                ops.push(self.fixed_32bit_literal()?);
                N::StatementFormat21ih
            }
            InstructionFormat21lh => {
                self.register_then_comma(&mut ops)?;
                ops.push(self.fixed_32bit_literal()?);
                N::StatementFormat21lh
            }
            InstructionFormat21s => {
                self.register_then_comma(&mut ops)?;
                ops.push(self.integral_literal()?);
                N::StatementFormat21s
            }
            InstructionFormat21t => {
                self.register_then_comma(&mut ops)?;
                ops.push(self.label_ref()?);
                N::StatementFormat21t
            }
            InstructionFormat22b => {
                self.two_registers(&mut ops)?;
                self.comma()?;
                ops.push(self.integral_literal()?);
                N::StatementFormat22b
            }
            InstructionFormat22cField | InstructionFormat22cFieldOdex => {
                self.two_registers(&mut ops)?;
                self.comma()?;
                ops.extend(self.field_reference()?);
                N::StatementFormat22cField
            }
            InstructionFormat22cType => {
                self.two_registers(&mut ops)?;
                self.comma()?;
                ops.push(self.nonvoid_type_descriptor()?);
                N::StatementFormat22cType
            }
            InstructionFormat22s | InstructionFormat22sOrId => {
                self.two_registers(&mut ops)?;
                self.comma()?;
                ops.push(self.integral_literal()?);
                N::StatementFormat22s
            }
            InstructionFormat22t => {
                self.two_registers(&mut ops)?;
                self.comma()?;
                ops.push(self.label_ref()?);
                N::StatementFormat22t
            }
            InstructionFormat22x => {
                self.two_registers(&mut ops)?;
                N::StatementFormat22x
            }
            InstructionFormat23x => {
                self.two_registers(&mut ops)?;
                self.comma()?;
                ops.push(self.register()?);
                N::StatementFormat23x
            }
            InstructionFormat31c => {
                self.register_then_comma(&mut ops)?;
                ops.push(self.string_literal()?);
                N::StatementFormat31c
            }
            InstructionFormat31i | InstructionFormat31iOrId => {
                self.register_then_comma(&mut ops)?;
                ops.push(self.fixed_32bit_literal()?);
                N::StatementFormat31i
            }
            InstructionFormat31t => {
                self.register_then_comma(&mut ops)?;
                ops.push(self.label_ref()?);
                N::StatementFormat31t
            }
            InstructionFormat32x => {
                self.two_registers(&mut ops)?;
                N::StatementFormat32x
            }
            InstructionFormat35cMethod | InstructionFormat35cMethodOdex => {
                ops.push(self.register_list()?);
                self.comma()?;
                ops.extend(self.method_reference()?);
                N::StatementFormat35cMethod
            }
            InstructionFormat35cType => {
                ops.push(self.register_list()?);
                self.comma()?;
                ops.push(self.nonvoid_type_descriptor()?);
                N::StatementFormat35cType
            }
            InstructionFormat3rcMethod | InstructionFormat3rcMethodOdex => {
                ops.push(self.register_range()?);
                self.comma()?;
                ops.extend(self.method_reference()?);
                N::StatementFormat3rcMethod
            }
            InstructionFormat3rcType => {
                ops.push(self.register_range()?);
                self.comma()?;
                ops.push(self.nonvoid_type_descriptor()?);
                N::StatementFormat3rcType
            }
            InstructionFormat51l => {
                self.register_then_comma(&mut ops)?;
                ops.push(self.fixed_literal()?);
                N::StatementFormat51l
            }
            _ => return Err(self.unexpected("instruction")),
        };

        self.legacy_gate(start, &mnemonic)?;
        Ok(Node::synthetic(statement, ops))
    }

    /// Operands of a form that is never assembled. They are still matched so
    /// the diagnostic covers the whole instruction.
    fn rejected_operands(&mut self, kind: TokenKind) -> PResult<()> {
        use TokenKind::*;

        match kind {
            InstructionFormat20bc => {
                self.expect(VerificationErrorType)?;
                self.comma()?;
                self.verification_error_reference()?;
            }
            InstructionFormat22csField => {
                self.register()?;
                self.comma()?;
                self.register()?;
                self.comma()?;
                self.expect(FieldOffset)?;
            }
            InstructionFormat35miMethod | InstructionFormat3rmiMethod => {
                self.register_group(kind == InstructionFormat35miMethod)?;
                self.comma()?;
                self.expect(InlineIndex)?;
            }
            InstructionFormat35msMethod | InstructionFormat3rmsMethod => {
                self.register_group(kind == InstructionFormat35msMethod)?;
                self.comma()?;
                self.expect(VtableIndex)?;
            }
            _ => return Err(self.unexpected("instruction")),
        }
        Ok(())
    }

    // -- Operand helpers -----------------------------------------

    fn register_group(&mut self, list: bool) -> PResult<Node> {
        if list {
            self.register_list()
        } else {
            self.register_range()
        }
    }

    fn register(&mut self) -> PResult<Node> {
        let tok = self.expect(TokenKind::Register)?;
        Ok(Node::literal(NodeKind::Register, tok))
    }

    fn comma(&mut self) -> PResult<()> {
        self.expect(TokenKind::Comma).map(|_| ())
    }

    fn register_then_comma(&mut self, ops: &mut Vec<Node>) -> PResult<()> {
        ops.push(self.register()?);
        self.comma()
    }

    fn two_registers(&mut self, ops: &mut Vec<Node>) -> PResult<()> {
        self.register_then_comma(ops)?;
        ops.push(self.register()?);
        Ok(())
    }

    /// `{ (REGISTER (, REGISTER)*)? }`
    fn register_list(&mut self) -> PResult<Node> {
        self.expect(TokenKind::OpenBrace)?;
        let mut regs = Vec::new();
        if self.at(TokenKind::Register) {
            regs.push(self.register()?);
            while self.at(TokenKind::Comma) {
                self.consume();
                regs.push(self.register()?);
            }
        }
        self.expect(TokenKind::CloseBrace)?;
        Ok(Node::synthetic(NodeKind::RegisterList, regs))
    }

    /// `{ (REGISTER (.. REGISTER)?)? }`
    fn register_range(&mut self) -> PResult<Node> {
        self.expect(TokenKind::OpenBrace)?;
        let mut regs = Vec::new();
        if self.at(TokenKind::Register) {
            regs.push(self.register()?);
            if self.at(TokenKind::DotDot) {
                self.consume();
                regs.push(self.register()?);
            }
        }
        self.expect(TokenKind::CloseBrace)?;
        Ok(Node::synthetic(NodeKind::RegisterRange, regs))
    }

    // -- Legacy gate ---------------------------------------------

    /// Pass regular instructions; pass a gated optimized instruction only in
    /// compatibility mode and when the oracle allows it at the API level.
    fn legacy_gate(&self, start: Checkpoint, mnemonic: &Token) -> PResult<()> {
        if !is_gated_legacy(mnemonic.kind) {
            return Ok(());
        }
        let api = self.config.api_level;
        if !self.config.allow_legacy_encodings {
            log::debug!("rejecting {}: compatibility mode is off", mnemonic.text);
            return Err(self.unsupported(start, mnemonic, "compatibility mode is off".to_string()));
        }
        if !self.oracle.is_legacy_eligible(&mnemonic.text, api) {
            log::debug!("rejecting {}: not eligible at API level {}", mnemonic.text, api);
            return Err(self.unsupported(start, mnemonic, format!("not available at API level {}", api)));
        }
        log::debug!("accepting optimized instruction {} at API level {}", mnemonic.text, api);
        Ok(())
    }

    fn reject_legacy(&self, start: Checkpoint, mnemonic: &Token) -> Diagnostic {
        let reason = match mnemonic.kind {
            TokenKind::InstructionFormat20bc => "verification-error opcodes are never assembled",
            TokenKind::InstructionFormat22csField => "field offsets are never assembled",
            TokenKind::InstructionFormat35miMethod | TokenKind::InstructionFormat3rmiMethod => {
                "inline method indices are never assembled"
            }
            _ => "vtable indices are never assembled",
        };
        log::debug!("rejecting {}: {}", mnemonic.text, reason);
        self.unsupported(start, mnemonic, reason.to_string())
    }

    fn unsupported(&self, start: Checkpoint, mnemonic: &Token, reason: String) -> Diagnostic {
        let message = format!(
            "optimized instruction '{}' is not supported in this context ({})",
            mnemonic.text, reason
        );
        self.diag(DiagnosticKind::Unsupported, message, self.span_since(start))
    }

    // -- Pseudo-instructions -------------------------------------

    /// `.array-data WIDTH fixed_literal* .end array-data`. The width must be
    /// 1, 2, 4 or 8 and is checked as soon as it is read.
    pub(super) fn array_data(&mut self) -> PResult<Node> {
        self.rule("insn_array_data_directive", |p| {
            p.expect(TokenKind::ArrayDataDirective)?;
            let width_tok = p.expect_one_of(
                &[TokenKind::PositiveIntegerLiteral, TokenKind::NegativeIntegerLiteral],
                "element width",
            )?;
            let width = literal::parse_int(&width_tok.text)
                .map_err(|e| p.semantic_at(&width_tok, e.to_string()))?;
            if !matches!(width, 1 | 2 | 4 | 8) {
                return Err(p.diag(
                    DiagnosticKind::Structural,
                    format!("Invalid element width: {}. Must be 1, 2, 4 or 8", width),
                    Span::of(&width_tok),
                ));
            }

            let mut elements = Vec::new();
            while is_fixed_literal(p.peek(0)) {
                elements.push(p.fixed_literal()?);
            }
            p.expect(TokenKind::EndArrayDataDirective)?;
            Ok(Node::synthetic(
                NodeKind::ArrayData,
                vec![
                    Node::synthetic(
                        NodeKind::ArrayElementSize,
                        vec![Node::literal(NodeKind::IntegerLiteral, width_tok)],
                    ),
                    Node::synthetic(NodeKind::ArrayElements, elements),
                ],
            ))
        })
    }

    /// `.packed-switch FIRST_KEY label_ref* .end packed-switch`
    pub(super) fn packed_switch(&mut self) -> PResult<Node> {
        self.rule("insn_packed_switch_directive", |p| {
            p.expect(TokenKind::PackedSwitchDirective)?;
            let first_key = p.fixed_32bit_literal()?;
            let mut targets = Vec::new();
            while p.at(TokenKind::Colon) {
                targets.push(p.label_ref()?);
            }
            p.expect(TokenKind::EndPackedSwitchDirective)?;
            Ok(Node::synthetic(
                NodeKind::PackedSwitch,
                vec![
                    Node::synthetic(NodeKind::PackedSwitchStartKey, vec![first_key]),
                    Node::synthetic(NodeKind::PackedSwitchElements, targets),
                ],
            ))
        })
    }

    /// `.sparse-switch (KEY -> label_ref)* .end sparse-switch`, elements
    /// flattened as key, target, key, target.
    pub(super) fn sparse_switch(&mut self) -> PResult<Node> {
        self.rule("insn_sparse_switch_directive", |p| {
            p.expect(TokenKind::SparseSwitchDirective)?;
            let mut elements = Vec::new();
            while is_fixed_32bit_literal(p.peek(0)) {
                elements.push(p.fixed_32bit_literal()?);
                p.expect(TokenKind::Arrow)?;
                elements.push(p.label_ref()?);
            }
            p.expect(TokenKind::EndSparseSwitchDirective)?;
            Ok(Node::synthetic(
                NodeKind::SparseSwitch,
                vec![Node::synthetic(NodeKind::SparseSwitchElements, elements)],
            ))
        })
    }
}

/// Grammar rule name for the verbose rule stack.
fn rule_name(kind: TokenKind) -> &'static str {
    use TokenKind::*;
    match kind {
        InstructionFormat10t => "insn_format10t",
        InstructionFormat10x => "insn_format10x",
        InstructionFormat10xOdex => "insn_format10x_odex",
        InstructionFormat11n => "insn_format11n",
        InstructionFormat11x => "insn_format11x",
        InstructionFormat12x | InstructionFormat12xOrId => "insn_format12x",
        InstructionFormat20bc => "insn_format20bc",
        InstructionFormat20t => "insn_format20t",
        InstructionFormat21cField => "insn_format21c_field",
        InstructionFormat21cFieldOdex => "insn_format21c_field_odex",
        InstructionFormat21cString => "insn_format21c_string",
        InstructionFormat21cType => "insn_format21c_type",
        InstructionFormat21ih => "insn_format21ih",
        InstructionFormat21lh => "insn_format21lh",
        InstructionFormat21s => "insn_format21s",
        InstructionFormat21t => "insn_format21t",
        InstructionFormat22b => "insn_format22b",
        InstructionFormat22cField => "insn_format22c_field",
        InstructionFormat22cFieldOdex => "insn_format22c_field_odex",
        InstructionFormat22cType => "insn_format22c_type",
        InstructionFormat22csField => "insn_format22cs_field",
        InstructionFormat22s | InstructionFormat22sOrId => "insn_format22s",
        InstructionFormat22t => "insn_format22t",
        InstructionFormat22x => "insn_format22x",
        InstructionFormat23x => "insn_format23x",
        InstructionFormat30t => "insn_format30t",
        InstructionFormat31c => "insn_format31c",
        InstructionFormat31i | InstructionFormat31iOrId => "insn_format31i",
        InstructionFormat31t => "insn_format31t",
        InstructionFormat32x => "insn_format32x",
        InstructionFormat35cMethod => "insn_format35c_method",
        InstructionFormat35cMethodOdex => "insn_format35c_method_odex",
        InstructionFormat35cType => "insn_format35c_type",
        InstructionFormat35miMethod => "insn_format35mi_method",
        InstructionFormat35msMethod => "insn_format35ms_method",
        InstructionFormat3rcMethod => "insn_format3rc_method",
        InstructionFormat3rcMethodOdex => "insn_format3rc_method_odex",
        InstructionFormat3rcType => "insn_format3rc_type",
        InstructionFormat3rmiMethod => "insn_format3rmi_method",
        InstructionFormat3rmsMethod => "insn_format3rms_method",
        InstructionFormat51l => "insn_format51l_type",
        _ => "instruction",
    }
}
