//! Tree-shape properties of parsed units.
//!
//! Every test parses full source text through `parse_str` and inspects the
//! resulting `ClassDef`.

use smali_syntax::{parse_str, ClassDef, DiagnosticKind, Node, NodeKind, ParseOutput, ParserConfig};

fn parse(src: &str) -> ParseOutput {
    parse_str(src, &ParserConfig::default())
}

fn parse_ok(src: &str) -> ParseOutput {
    let out = parse(src);
    assert!(
        out.is_success(),
        "unexpected diagnostics: {:?}",
        out.diagnostics.iter().map(|d| d.render()).collect::<Vec<_>>()
    );
    out
}

fn class_def(out: &ParseOutput) -> ClassDef<'_> {
    out.class_def().expect("root is a ClassDef")
}

/// Wrap method body lines in a minimal class.
fn with_method(signature: &str, body: &str) -> String {
    format!(
        ".class public LFoo;\n.super Ljava/lang/Object;\n.method {}\n{}\n.end method\n",
        signature, body
    )
}

fn prototype_params(method: &Node) -> Vec<(NodeKind, String)> {
    let proto = method
        .first_of_kind(NodeKind::MethodPrototype)
        .expect("method prototype");
    proto
        .children
        .iter()
        .skip(1)
        .map(|p| (p.kind, p.text().to_string()))
        .collect()
}

// ──────────────────────────────────────────────
// Root shape
// ──────────────────────────────────────────────

#[test]
fn root_has_seven_children_in_fixed_order() {
    let out = parse_ok(
        ".method public static main([Ljava/lang/String;)V\n\
         .registers 1\n\
         return-void\n\
         .end method\n\
         .field private count:I\n\
         .source \"Foo.java\"\n\
         .implements Ljava/lang/Runnable;\n\
         .annotation system Ldalvik/annotation/Signature;\n\
         value = \"x\"\n\
         .end annotation\n\
         .super Ljava/lang/Object;\n\
         .class public final LFoo;\n",
    );
    let kinds: Vec<NodeKind> = out.root.children.iter().map(|c| c.kind).collect();
    assert_eq!(
        kinds,
        vec![
            NodeKind::ClassDescriptor,
            NodeKind::Super,
            NodeKind::ImplementsList,
            NodeKind::Source,
            NodeKind::Methods,
            NodeKind::Fields,
            NodeKind::Annotations,
        ]
    );

    let def = class_def(&out);
    assert_eq!(def.class_descriptor().map(Node::text), Some("LFoo;"));
    let flags: Vec<&str> = def
        .access_list()
        .map(|a| a.children.iter().map(Node::text).collect())
        .unwrap_or_default();
    assert_eq!(flags, vec!["public", "final"]);
    assert_eq!(def.super_class().map(Node::text), Some("Ljava/lang/Object;"));
    assert_eq!(def.implements().map(Node::text).collect::<Vec<_>>(), vec!["Ljava/lang/Runnable;"]);
    assert_eq!(def.source().map(Node::text), Some("\"Foo.java\""));
    assert_eq!(def.methods().len(), 1);
    assert_eq!(def.fields().len(), 1);
    assert_eq!(def.annotations().len(), 1);
}

#[test]
fn empty_containers_are_still_present() {
    let out = parse_ok(".class public LFoo;\n.super Ljava/lang/Object;\n");
    assert_eq!(out.root.children.len(), ClassDef::CHILD_COUNT);
    let def = class_def(&out);
    assert!(def.methods().is_empty());
    assert!(def.fields().is_empty());
    assert!(def.annotations().is_empty());
    assert!(def.source().is_none());
    assert_eq!(def.implements().count(), 0);
}

#[test]
fn minimal_class_with_one_method() {
    let out = parse_ok(
        ".class public LFoo;\n\
         .super Ljava/lang/Object;\n\
         .method public foo()V\n\
         .registers 1\n\
         return-void\n\
         .end method\n",
    );
    let def = class_def(&out);
    let method = &def.methods()[0];
    assert_eq!(method.kind, NodeKind::Method);
    assert_eq!(
        method.to_sexpr(),
        "(Method foo (MethodPrototype (MethodReturnType V)) (AccessList public) (Registers 1) \
         (OrderedMethodItems (StatementFormat10x return-void)) Catches Parameters Annotations)"
    );
}

#[test]
fn multiple_implements_keep_source_order() {
    let out = parse_ok(
        ".class LFoo;\n.super Ljava/lang/Object;\n\
         .implements LA;\n.implements LB;\n.implements LC;\n",
    );
    let names: Vec<&str> = class_def(&out).implements().map(Node::text).collect();
    assert_eq!(names, vec!["LA;", "LB;", "LC;"]);
}

// ──────────────────────────────────────────────
// Parameter lists
// ──────────────────────────────────────────────

#[test]
fn primitive_param_forms_flatten_identically() {
    let compact = parse_ok(&with_method("static a(IJZ)V", "return-void"));
    let separated = parse_ok(&with_method("static a(I J Z)V", "return-void"));
    let a = prototype_params(&class_def(&compact).methods()[0]);
    let b = prototype_params(&class_def(&separated).methods()[0]);
    assert_eq!(a, b);
    assert_eq!(
        a,
        vec![
            (NodeKind::PrimitiveType, "I".to_string()),
            (NodeKind::PrimitiveType, "J".to_string()),
            (NodeKind::PrimitiveType, "Z".to_string()),
        ]
    );
}

#[test]
fn mixed_param_forms_flatten_identically() {
    let run = parse_ok(&with_method("static a(ILjava/lang/String;[J)V", "return-void"));
    let separated = parse_ok(&with_method("static a(I Ljava/lang/String; [J)V", "return-void"));
    let a = prototype_params(&class_def(&run).methods()[0]);
    let b = prototype_params(&class_def(&separated).methods()[0]);
    assert_eq!(a, b);
    assert_eq!(
        a,
        vec![
            (NodeKind::PrimitiveType, "I".to_string()),
            (NodeKind::ClassDescriptor, "Ljava/lang/String;".to_string()),
            (NodeKind::ArrayDescriptor, "[J".to_string()),
        ]
    );

    let sexpr_a = class_def(&run).methods()[0].first_of_kind(NodeKind::MethodPrototype).map(Node::to_sexpr);
    let sexpr_b = class_def(&separated).methods()[0].first_of_kind(NodeKind::MethodPrototype).map(Node::to_sexpr);
    assert_eq!(sexpr_a, sexpr_b);
}

#[test]
fn void_parameter_is_structural() {
    let out = parse(&with_method("static a(V)V", "return-void"));
    assert!(out.has_kind(DiagnosticKind::Structural), "{:?}", out.diagnostics);
}

// ──────────────────────────────────────────────
// Identifiers
// ──────────────────────────────────────────────

#[test]
fn keywords_are_reusable_as_method_names() {
    for name in [
        "move", "const", "goto", "v0", "p1", "true", "null", "public", "build", "no-error",
        "Infinity", "123", "I", "V", "IJ", "rsub-int", "iget-quick", "execute-inline",
    ] {
        let out = parse(&with_method(&format!("public {}()V", name), "return-void"));
        assert!(out.is_success(), "{}: {:?}", name, out.diagnostics);
        let method = &class_def(&out).methods()[0];
        let ident = method.child(0).expect("method name");
        assert_eq!(ident.kind, NodeKind::SimpleName, "{}", name);
        assert_eq!(ident.text(), name);
    }
}

#[test]
fn access_word_directly_before_colon_is_a_field_name() {
    let out = parse_ok(".class LFoo;\n.super Ljava/lang/Object;\n.field public static public:I\n");
    let field = &class_def(&out).fields()[0];
    assert_eq!(field.child(0).map(Node::text), Some("public"));
    let access = field.first_of_kind(NodeKind::AccessList).expect("access list");
    let flags: Vec<&str> = access.children.iter().map(Node::text).collect();
    assert_eq!(flags, vec!["public", "static"]);
}

#[test]
fn init_member_names_are_simple_names() {
    let out = parse_ok(&with_method("public constructor <init>()V", "return-void"));
    let name = class_def(&out).methods()[0].child(0).cloned().expect("name");
    assert_eq!(name.kind, NodeKind::SimpleName);
    assert_eq!(name.text(), "<init>");
}

// ──────────────────────────────────────────────
// Fields
// ──────────────────────────────────────────────

#[test]
fn field_without_terminator_has_empty_annotations() {
    let out = parse_ok(
        ".class LFoo;\n.super Ljava/lang/Object;\n\
         .field public x:I\n\
         .method public foo()V\n.registers 0\nreturn-void\n.end method\n",
    );
    let field = &class_def(&out).fields()[0];
    let kinds: Vec<NodeKind> = field.children.iter().map(|c| c.kind).collect();
    assert_eq!(
        kinds,
        vec![
            NodeKind::SimpleName,
            NodeKind::AccessList,
            NodeKind::FieldType,
            NodeKind::FieldInitialValue,
            NodeKind::Annotations,
        ]
    );
    assert!(field.first_of_kind(NodeKind::Annotations).map_or(false, |a| a.children.is_empty()));
    assert_eq!(class_def(&out).methods().len(), 1);
}

#[test]
fn unterminated_field_annotations_move_to_the_class() {
    let out = parse_ok(
        ".class LFoo;\n.super Ljava/lang/Object;\n\
         .field public x:I\n\
         .annotation runtime LAnno;\n\
         .end annotation\n",
    );
    let def = class_def(&out);
    assert_eq!(def.annotations().len(), 1);
    let field = &def.fields()[0];
    assert!(field.first_of_kind(NodeKind::Annotations).map_or(false, |a| a.children.is_empty()));
}

#[test]
fn terminated_field_keeps_its_annotations() {
    let out = parse_ok(
        ".class LFoo;\n.super Ljava/lang/Object;\n\
         .field public x:I\n\
         .annotation runtime LAnno;\n\
         .end annotation\n\
         .end field\n",
    );
    let def = class_def(&out);
    assert!(def.annotations().is_empty());
    let annotations = def.fields()[0].first_of_kind(NodeKind::Annotations).expect("annotations");
    assert_eq!(annotations.children.len(), 1);
}

#[test]
fn field_initial_values() {
    let out = parse_ok(
        ".class LFoo;\n.super Ljava/lang/Object;\n\
         .field public static final A:I = 0x10\n\
         .field public static final B:J = -1L\n\
         .field public static final C:Ljava/lang/String; = \"hi\"\n\
         .field public static final D:[I = {1, 2, 3}\n\
         .field public static final E:LEnum; = .enum LEnum;->ONE:LEnum;\n",
    );
    let values: Vec<String> = class_def(&out)
        .fields()
        .iter()
        .map(|f| f.first_of_kind(NodeKind::FieldInitialValue).map(Node::to_sexpr).unwrap_or_default())
        .collect();
    assert_eq!(
        values,
        vec![
            "(FieldInitialValue 0x10)",
            "(FieldInitialValue -1L)",
            "(FieldInitialValue \"hi\")",
            "(FieldInitialValue (EncodedArray 1 2 3))",
            "(FieldInitialValue (EncodedEnum LEnum; ONE LEnum;))",
        ]
    );
}

#[test]
fn out_of_range_int_initial_value_is_semantic() {
    let out = parse(".class LFoo;\n.super Ljava/lang/Object;\n.field public A:I = 4294967296\n");
    assert!(out.has_kind(DiagnosticKind::Semantic), "{:?}", out.diagnostics);
}

// ──────────────────────────────────────────────
// Annotations
// ──────────────────────────────────────────────

#[test]
fn annotation_elements_and_values() {
    let out = parse_ok(
        ".class LFoo;\n.super Ljava/lang/Object;\n\
         .annotation runtime LAnno;\n\
         type = LBar;\n\
         field = LBar;->baz:I\n\
         method = LBar;->run(I)V\n\
         prim = I\n\
         nested = .subannotation LInner;\n\
         value = true\n\
         .end subannotation\n\
         list = {}\n\
         .end annotation\n",
    );
    let annotation = &class_def(&out).annotations()[0];
    assert_eq!(annotation.child(0).map(Node::text), Some("runtime"));
    let sub = annotation.child(1).expect("subannotation");
    assert_eq!(sub.kind, NodeKind::Subannotation);
    assert_eq!(sub.child(0).map(Node::text), Some("LAnno;"));

    let values: Vec<NodeKind> = sub
        .children_of_kind(NodeKind::AnnotationElement)
        .filter_map(|e| e.child(1).map(|v| v.kind))
        .collect();
    assert_eq!(
        values,
        vec![
            NodeKind::ClassDescriptor,
            NodeKind::EncodedField,
            NodeKind::EncodedMethod,
            NodeKind::PrimitiveType,
            NodeKind::Subannotation,
            NodeKind::EncodedArray,
        ]
    );
}

#[test]
fn method_annotations_and_parameters() {
    let out = parse_ok(&with_method(
        "public foo(I)V",
        ".registers 2\n\
         .annotation build LDeprecated;\n\
         .end annotation\n\
         .param p1, \"count\"\n\
         .annotation runtime LNonNull;\n\
         .end annotation\n\
         .end param\n\
         return-void",
    ));
    let method = &class_def(&out).methods()[0];
    let annotations = method.first_of_kind(NodeKind::Annotations).expect("annotations");
    assert_eq!(annotations.children.len(), 1);

    let params = method.first_of_kind(NodeKind::Parameters).expect("parameters");
    assert_eq!(
        params.to_sexpr(),
        "(Parameters (Parameter p1 \"count\" (Annotations (Annotation runtime (Subannotation LNonNull;)))))"
    );
}

#[test]
fn unterminated_param_annotations_move_to_the_method() {
    let out = parse_ok(&with_method(
        "public foo(I)V",
        ".registers 2\n\
         .param p1\n\
         .annotation runtime LNonNull;\n\
         .end annotation\n\
         return-void",
    ));
    let method = &class_def(&out).methods()[0];
    let annotations = method.first_of_kind(NodeKind::Annotations).expect("annotations");
    assert_eq!(annotations.children.len(), 1);
    let param = method
        .first_of_kind(NodeKind::Parameters)
        .and_then(|p| p.child(0))
        .expect("parameter");
    assert_eq!(param.to_sexpr(), "(Parameter p1 Annotations)");
}

// ──────────────────────────────────────────────
// Method bodies
// ──────────────────────────────────────────────

#[test]
fn catches_come_before_catchalls() {
    let out = parse_ok(&with_method(
        "public foo()V",
        ".registers 1\n\
         :try_start\n\
         nop\n\
         :try_end\n\
         .catchall {:try_start .. :try_end} :handler\n\
         .catch Ljava/lang/Exception; {:try_start .. :try_end} :handler\n\
         :handler\n\
         return-void",
    ));
    let method = &class_def(&out).methods()[0];
    let catches = method.first_of_kind(NodeKind::Catches).expect("catches");
    let kinds: Vec<NodeKind> = catches.children.iter().map(|c| c.kind).collect();
    assert_eq!(kinds, vec![NodeKind::Catch, NodeKind::Catchall]);
    assert_eq!(
        catches.child(0).map(Node::to_sexpr).as_deref(),
        Some("(Catch Ljava/lang/Exception; try_start try_end handler)")
    );
}

#[test]
fn locals_directive_and_debug_items() {
    let out = parse_ok(&with_method(
        "public foo()V",
        ".locals 2\n\
         .prologue\n\
         .line 12\n\
         const/4 v0, 0x1\n\
         .local v0, \"x\":I\n\
         .local v1, null:Ljava/util/List;, \"Ljava/util/List<Ljava/lang/String;>;\"\n\
         .local v0, \"y\":I, null\n\
         .end local v0\n\
         .restart local v0\n\
         .epilogue\n\
         .source \"Other.java\"\n\
         return-void",
    ));
    let method = &class_def(&out).methods()[0];
    assert_eq!(method.first_of_kind(NodeKind::Locals).map(Node::to_sexpr).as_deref(), Some("(Locals 2)"));
    let items: Vec<NodeKind> = method
        .first_of_kind(NodeKind::OrderedMethodItems)
        .map(|o| o.children.iter().map(|c| c.kind).collect())
        .unwrap_or_default();
    assert_eq!(
        items,
        vec![
            NodeKind::Prologue,
            NodeKind::Line,
            NodeKind::StatementFormat11n,
            NodeKind::Local,
            NodeKind::Local,
            NodeKind::Local,
            NodeKind::EndLocal,
            NodeKind::RestartLocal,
            NodeKind::Epilogue,
            NodeKind::Source,
            NodeKind::StatementFormat10x,
        ]
    );

    let locals: Vec<Vec<NodeKind>> = method
        .first_of_kind(NodeKind::OrderedMethodItems)
        .map(|o| {
            o.children
                .iter()
                .filter(|c| c.kind == NodeKind::Local)
                .map(|c| c.children.iter().map(|n| n.kind).collect())
                .collect()
        })
        .unwrap_or_default();
    assert_eq!(
        locals[2],
        vec![NodeKind::Register, NodeKind::StringLiteral, NodeKind::PrimitiveType, NodeKind::NullLiteral]
    );
}

#[test]
fn labels_keep_their_names() {
    let out = parse_ok(&with_method("public foo()V", ".registers 0\n:goto_0\ngoto :goto_0"));
    let items = class_def(&out).methods()[0]
        .first_of_kind(NodeKind::OrderedMethodItems)
        .map(Node::to_sexpr);
    assert_eq!(
        items.as_deref(),
        Some("(OrderedMethodItems (Label goto_0) (StatementFormat10t goto goto_0))")
    );
}

#[test]
fn register_count_out_of_range_is_semantic() {
    let out = parse(&with_method("public foo()V", ".registers 70000\nreturn-void"));
    assert!(out.has_kind(DiagnosticKind::Semantic), "{:?}", out.diagnostics);
}
