//! Instruction formats, pseudo-instructions and the optimized-instruction
//! gate.

use smali_syntax::{parse_str, DiagnosticKind, Node, NodeKind, ParseOutput, ParserConfig};

fn method_source(body: &str) -> String {
    format!(
        ".class public LFoo;\n.super Ljava/lang/Object;\n.method public run(I)V\n.registers 8\n{}\n.end method\n",
        body
    )
}

fn parse_body(body: &str, config: &ParserConfig) -> ParseOutput {
    parse_str(&method_source(body), config)
}

/// Items of the single method in `out`.
fn items(out: &ParseOutput) -> Vec<Node> {
    out.class_def()
        .and_then(|def| def.methods().first())
        .and_then(|m| m.first_of_kind(NodeKind::OrderedMethodItems))
        .map(|o| o.children.clone())
        .unwrap_or_default()
}

fn single_statement(body: &str) -> Node {
    let out = parse_body(body, &ParserConfig::default());
    assert!(
        out.is_success(),
        "{}: {:?}",
        body,
        out.diagnostics.iter().map(|d| d.render()).collect::<Vec<_>>()
    );
    let mut items = items(&out);
    assert_eq!(items.len(), 1, "{}", body);
    items.remove(0)
}

fn legacy_config(api_level: u32) -> ParserConfig {
    ParserConfig {
        allow_legacy_encodings: true,
        api_level,
        ..ParserConfig::default()
    }
}

// ──────────────────────────────────────────────
// Regular formats
// ──────────────────────────────────────────────

#[test]
fn every_regular_format_builds_its_statement() {
    let cases: &[(&str, NodeKind, &str)] = &[
        ("goto :l", NodeKind::StatementFormat10t, "(StatementFormat10t goto l)"),
        ("return-void", NodeKind::StatementFormat10x, "(StatementFormat10x return-void)"),
        ("const/4 v0, 0x7", NodeKind::StatementFormat11n, "(StatementFormat11n const/4 v0 0x7)"),
        ("move-result v0", NodeKind::StatementFormat11x, "(StatementFormat11x move-result v0)"),
        ("move v0, v1", NodeKind::StatementFormat12x, "(StatementFormat12x move v0 v1)"),
        ("add-int/2addr v0, v1", NodeKind::StatementFormat12x, "(StatementFormat12x add-int/2addr v0 v1)"),
        ("goto/16 :l", NodeKind::StatementFormat20t, "(StatementFormat20t goto/16 l)"),
        (
            "sget v0, LFoo;->count:I",
            NodeKind::StatementFormat21cField,
            "(StatementFormat21cField sget v0 LFoo; count I)",
        ),
        (
            "const-string v0, \"hi\"",
            NodeKind::StatementFormat21cString,
            "(StatementFormat21cString const-string v0 \"hi\")",
        ),
        (
            "new-instance v0, Ljava/lang/Object;",
            NodeKind::StatementFormat21cType,
            "(StatementFormat21cType new-instance v0 Ljava/lang/Object;)",
        ),
        (
            "const/high16 v0, 0x7f000000",
            NodeKind::StatementFormat21ih,
            "(StatementFormat21ih const/high16 v0 0x7f000000)",
        ),
        (
            "const-wide/high16 v0, 0x4000L",
            NodeKind::StatementFormat21lh,
            "(StatementFormat21lh const-wide/high16 v0 0x4000L)",
        ),
        ("const/16 v0, -5", NodeKind::StatementFormat21s, "(StatementFormat21s const/16 v0 -5)"),
        ("if-eqz v0, :l", NodeKind::StatementFormat21t, "(StatementFormat21t if-eqz v0 l)"),
        (
            "add-int/lit8 v0, v1, 0x1",
            NodeKind::StatementFormat22b,
            "(StatementFormat22b add-int/lit8 v0 v1 0x1)",
        ),
        (
            "iget v0, p0, LFoo;->count:I",
            NodeKind::StatementFormat22cField,
            "(StatementFormat22cField iget v0 p0 LFoo; count I)",
        ),
        (
            "instance-of v0, v1, [Ljava/lang/String;",
            NodeKind::StatementFormat22cType,
            "(StatementFormat22cType instance-of v0 v1 [Ljava/lang/String;)",
        ),
        (
            "add-int/lit16 v0, v1, 0x100",
            NodeKind::StatementFormat22s,
            "(StatementFormat22s add-int/lit16 v0 v1 0x100)",
        ),
        ("rsub-int v0, v1, 0x10", NodeKind::StatementFormat22s, "(StatementFormat22s rsub-int v0 v1 0x10)"),
        ("if-eq v0, v1, :l", NodeKind::StatementFormat22t, "(StatementFormat22t if-eq v0 v1 l)"),
        ("move/from16 v0, v1", NodeKind::StatementFormat22x, "(StatementFormat22x move/from16 v0 v1)"),
        ("add-int v0, v1, v2", NodeKind::StatementFormat23x, "(StatementFormat23x add-int v0 v1 v2)"),
        ("goto/32 :l", NodeKind::StatementFormat30t, "(StatementFormat30t goto/32 l)"),
        (
            "const-string/jumbo v0, \"big\"",
            NodeKind::StatementFormat31c,
            "(StatementFormat31c const-string/jumbo v0 \"big\")",
        ),
        ("const v0, 0x12345678", NodeKind::StatementFormat31i, "(StatementFormat31i const v0 0x12345678)"),
        ("const v0, 1.5f", NodeKind::StatementFormat31i, "(StatementFormat31i const v0 1.5f)"),
        ("fill-array-data v0, :l", NodeKind::StatementFormat31t, "(StatementFormat31t fill-array-data v0 l)"),
        ("move/16 v0, v1", NodeKind::StatementFormat32x, "(StatementFormat32x move/16 v0 v1)"),
        (
            "invoke-direct {p0}, Ljava/lang/Object;-><init>()V",
            NodeKind::StatementFormat35cMethod,
            "(StatementFormat35cMethod invoke-direct (RegisterList p0) Ljava/lang/Object; <init> \
             (MethodPrototype (MethodReturnType V)))",
        ),
        (
            "invoke-static {}, LFoo;->tick()V",
            NodeKind::StatementFormat35cMethod,
            "(StatementFormat35cMethod invoke-static RegisterList LFoo; tick (MethodPrototype (MethodReturnType V)))",
        ),
        (
            "filled-new-array {v0, v1}, [I",
            NodeKind::StatementFormat35cType,
            "(StatementFormat35cType filled-new-array (RegisterList v0 v1) [I)",
        ),
        (
            "invoke-static/range {v0 .. v2}, LFoo;->sum(III)I",
            NodeKind::StatementFormat3rcMethod,
            "(StatementFormat3rcMethod invoke-static/range (RegisterRange v0 v2) LFoo; sum \
             (MethodPrototype (MethodReturnType I) I I I))",
        ),
        (
            "filled-new-array/range {v0 .. v4}, [I",
            NodeKind::StatementFormat3rcType,
            "(StatementFormat3rcType filled-new-array/range (RegisterRange v0 v4) [I)",
        ),
        (
            "const-wide v0, 0x123456789L",
            NodeKind::StatementFormat51l,
            "(StatementFormat51l const-wide v0 0x123456789L)",
        ),
    ];

    for (body, kind, sexpr) in cases {
        let stmt = single_statement(body);
        assert_eq!(stmt.kind, *kind, "{}", body);
        assert!(stmt.kind.is_statement());
        assert_eq!(stmt.to_sexpr(), *sexpr, "{}", body);
    }
}

#[test]
fn method_reference_without_owner() {
    let stmt = single_statement("invoke-virtual {p0}, run(I)V");
    assert_eq!(
        stmt.to_sexpr(),
        "(StatementFormat35cMethod invoke-virtual (RegisterList p0) run (MethodPrototype (MethodReturnType V) I))"
    );
}

#[test]
fn missing_operand_is_a_syntax_error() {
    let out = parse_body("add-int v0, v1", &ParserConfig::default());
    assert!(out.has_kind(DiagnosticKind::Syntax), "{:?}", out.diagnostics);
    let items = items(&out);
    assert!(items.iter().any(Node::is_error));
}

#[test]
fn out_of_range_literal_operand_is_semantic() {
    let out = parse_body("const/16 v0, 99999999999", &ParserConfig::default());
    assert!(out.has_kind(DiagnosticKind::Semantic), "{:?}", out.diagnostics);
}

// ──────────────────────────────────────────────
// Pseudo-instructions
// ──────────────────────────────────────────────

#[test]
fn array_data_with_valid_widths() {
    for width in ["1", "2", "4", "8"] {
        let stmt = single_statement(&format!(".array-data {}\n0x1\n0x2\n.end array-data", width));
        assert_eq!(
            stmt.to_sexpr(),
            format!("(ArrayData (ArrayElementSize {}) (ArrayElements 0x1 0x2))", width)
        );
    }
}

#[test]
fn array_data_rejects_other_widths() {
    let out = parse_body(".array-data 3\n0x1\n.end array-data\nreturn-void", &ParserConfig::default());
    assert_eq!(out.diagnostics.len(), 1, "{:?}", out.diagnostics);
    let d = &out.diagnostics[0];
    assert_eq!(d.kind, DiagnosticKind::Structural);
    assert!(d.message.contains("Invalid element width: 3"), "{}", d.message);

    // The broken block is skipped as a unit and parsing resumes after it.
    let items = items(&out);
    assert_eq!(items.len(), 2);
    assert!(items[0].is_error());
    assert_eq!(items[1].kind, NodeKind::StatementFormat10x);
}

#[test]
fn packed_switch_block() {
    let stmt = single_statement(".packed-switch 0x10\n:a\n:b\n:c\n.end packed-switch");
    assert_eq!(
        stmt.to_sexpr(),
        "(PackedSwitch (PackedSwitchStartKey 0x10) (PackedSwitchElements a b c))"
    );
}

#[test]
fn sparse_switch_block() {
    let stmt = single_statement(".sparse-switch\n0x1 -> :a\n-0x5 -> :b\n.end sparse-switch");
    assert_eq!(
        stmt.to_sexpr(),
        "(SparseSwitch (SparseSwitchElements 0x1 a -0x5 b))"
    );
}

#[test]
fn empty_packed_switch() {
    let stmt = single_statement(".packed-switch 0x0\n.end packed-switch");
    assert_eq!(stmt.to_sexpr(), "(PackedSwitch (PackedSwitchStartKey 0x0) PackedSwitchElements)");
}

// ──────────────────────────────────────────────
// Optimized instructions
// ──────────────────────────────────────────────

#[test]
fn gated_instruction_accepted_in_compatibility_mode() {
    let cases: &[(&str, NodeKind)] = &[
        ("iget-volatile v0, p0, LFoo;->count:I", NodeKind::StatementFormat22cField),
        ("sget-volatile v0, LFoo;->count:I", NodeKind::StatementFormat21cField),
        ("invoke-direct-empty {p0}, Ljava/lang/Object;-><init>()V", NodeKind::StatementFormat35cMethod),
        (
            "invoke-object-init/range {p0}, Ljava/lang/Object;-><init>()V",
            NodeKind::StatementFormat3rcMethod,
        ),
        ("return-void-barrier", NodeKind::StatementFormat10x),
    ];
    let config = legacy_config(13);
    for (body, kind) in cases {
        let out = parse_body(body, &config);
        assert!(out.is_success(), "{}: {:?}", body, out.diagnostics);
        let items = items(&out);
        assert_eq!(items[0].kind, *kind, "{}", body);
    }
}

#[test]
fn field_offset_forms_are_rejected_even_in_compatibility_mode() {
    for (body, api, text) in [
        ("iget-quick v0, v1, field@0x8", 13, "iget-quick v0 , v1 , field@0x8"),
        ("iput-quick v0, p0, field@0x10", 10, "iput-quick v0 , p0 , field@0x10"),
    ] {
        let out = parse_body(body, &legacy_config(api));
        assert_eq!(out.diagnostics.len(), 1, "{}: {:?}", body, out.diagnostics);
        let d = &out.diagnostics[0];
        assert_eq!(d.kind, DiagnosticKind::Unsupported);
        assert!(d.message.contains("field offsets are never assembled"), "{}", d.message);
        let items = items(&out);
        assert!(items[0].is_error());
        assert_eq!(items[0].text(), text);
    }
}

#[test]
fn gated_instruction_rejected_without_compatibility_mode() {
    let config = ParserConfig {
        api_level: 10,
        ..ParserConfig::default()
    };
    let out = parse_body("iget-volatile v0, p0, LFoo;->count:I", &config);
    assert_eq!(out.diagnostics.len(), 1);
    let d = &out.diagnostics[0];
    assert_eq!(d.kind, DiagnosticKind::Unsupported);
    assert!(
        d.message.contains("optimized instruction 'iget-volatile' is not supported in this context"),
        "{}",
        d.message
    );
    assert!(items(&out)[0].is_error());
}

#[test]
fn gated_instruction_rejected_at_modern_api_level() {
    let out = parse_body("iget-volatile v0, p0, LFoo;->count:I", &legacy_config(15));
    assert!(out.has_kind(DiagnosticKind::Unsupported));
    assert!(out.diagnostics[0].message.contains("API level 15"), "{}", out.diagnostics[0].message);
}

#[test]
fn gated_instruction_rejected_before_its_introduction() {
    // return-void-barrier first appears at API level 11.
    let out = parse_body("return-void-barrier", &legacy_config(10));
    assert!(out.has_kind(DiagnosticKind::Unsupported));
}

#[test]
fn index_and_verification_forms_are_always_rejected() {
    let config = legacy_config(10);
    for body in [
        "execute-inline {v0}, inline@0x4",
        "execute-inline/range {v0 .. v1}, inline@0x4",
        "invoke-virtual-quick {v0}, vtable@0x1a",
        "invoke-super-quick/range {v0 .. v1}, vtable@0x1a",
        "throw-verification-error generic-error, LFoo;",
        "throw-verification-error no-such-field, LFoo;->bar:I",
        "iget-object-quick v0, p0, field@0xc",
        "iput-boolean-quick v0, p0, field@0xc",
    ] {
        let out = parse_body(body, &config);
        assert_eq!(out.diagnostics.len(), 1, "{}: {:?}", body, out.diagnostics);
        assert_eq!(out.diagnostics[0].kind, DiagnosticKind::Unsupported, "{}", body);
        assert!(out.diagnostics[0].message.contains("never assembled"), "{}", body);
    }
}

#[test]
fn rejected_instruction_does_not_stop_the_method() {
    let out = parse_body(
        "execute-inline {v0}, inline@0x4\nreturn-void",
        &legacy_config(10),
    );
    let items = items(&out);
    assert_eq!(items.len(), 2);
    assert!(items[0].is_error());
    assert_eq!(items[0].text(), "execute-inline { v0 } , inline@0x4");
    assert_eq!(items[1].kind, NodeKind::StatementFormat10x);
}
