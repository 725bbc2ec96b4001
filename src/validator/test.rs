use super::*;

use crate::decoder::decode;
use crate::encoder::encode;
use crate::parser::parse;

fn parse_ok(src: &str) -> Module {
    match parse(src) {
        Ok(module) => module,
        Err(error) => panic!("parse failed: {error}"),
    }
}

fn validate_ok(src: &str, features: &Features) {
    let module = parse_ok(src);
    if let Err(diagnostics) = validate(&module, features) {
        panic!("expected a valid module, got {diagnostics:?}");
    }
}

fn validate_err(src: &str, features: &Features) -> Vec<Diagnostic> {
    match validate(&parse_ok(src), features) {
        Ok(()) => panic!("expected validation to fail"),
        Err(diagnostics) => diagnostics,
    }
}

fn first(src: &str, features: &Features) -> Diagnostic {
    let mut diagnostics = validate_err(src, features);
    diagnostics.remove(0)
}

fn enable(names: &[&str]) -> Features {
    let mut features = Features::none();
    for name in names {
        *features.flag(name).unwrap() = true;
    }
    features
}

#[test]
fn valid_module_survives_a_round_trip() {
    let src = r#"
        (module
          (memory 1)
          (data (i32.const 0) "hi")
          (func (export "run") (param i32) (result i32)
            block (result i32)
              local.get 0
              br 0
            end))
    "#;
    let module = parse_ok(src);
    assert_eq!(validate(&module, &Features::none()), Ok(()));
    let decoded = decode(&encode(&module)).unwrap();
    assert_eq!(decoded, module);
    assert_eq!(validate(&decoded, &Features::none()), Ok(()));
}

#[test]
fn operand_type_mismatch() {
    let diagnostic = first("(module (func i32.const 1 f32.neg drop))", &Features::none());
    assert_eq!(diagnostic.message, "Expected f32 but found i32");
    assert_eq!(diagnostic.location, "func[0] instr[1]");
}

#[test]
fn operands_must_be_on_the_stack() {
    let diagnostic = first("(module (func i32.add drop))", &Features::none());
    assert_eq!(diagnostic.message, "Stack underflow");
    assert_eq!(diagnostic.location, "func[0] instr[0]");
}

#[test]
fn unreachable_code_is_polymorphic() {
    validate_ok("(module (func (result i32) unreachable i32.add))", &Features::none());
}

#[test]
fn branches_match_the_label_types_exactly() {
    let src = "(module (func block (result i32) f32.const 0 br 0 end drop))";
    let diagnostic = first(src, &Features::none());
    assert_eq!(diagnostic.message, "Expected i32 but found f32");
    assert_eq!(diagnostic.location, "func[0] instr[2]");
}

#[test]
fn branch_depth_out_of_range() {
    let diagnostic = first("(module (func br 2))", &Features::none());
    assert_eq!(diagnostic.message, "Branch depth 2 out of range");
    assert_eq!(diagnostic.location, "func[0] instr[0]");
}

#[test]
fn loop_labels_take_the_start_types() {
    // A branch to a loop jumps to its start, so the loop result plays no
    // part in the branch operands.
    validate_ok("(module (func (result i32) loop (result i32) br 0 end))", &Features::none());
    validate_ok(
        "(module (func loop (result i32) i32.const 1 br_if 0 i32.const 2 end drop))",
        &Features::none(),
    );
}

#[test]
fn if_arms_must_agree() {
    let src = "(module (func (result i32) i32.const 1 if (result i32) i32.const 1 else f64.const 0 end))";
    let diagnostic = first(src, &Features::none());
    assert_eq!(diagnostic.message, "Expected i32 but found f64");
    assert_eq!(diagnostic.location, "func[0] instr[5]");
}

#[test]
fn if_without_else_needs_empty_signature() {
    let src = "(module (func i32.const 1 if (result i32) i32.const 2 end drop))";
    let diagnostic = first(src, &Features::none());
    assert_eq!(
        diagnostic.message,
        "`if` without `else` requires matching parameter and result types"
    );
    assert_eq!(diagnostic.location, "func[0] instr[3]");
}

#[test]
fn bulk_memory_gate() {
    let src = "(module (memory 1) (func i32.const 0 i32.const 0 i32.const 0 memory.copy))";
    let diagnostic = first(src, &Features::none());
    assert_eq!(diagnostic.message, "Feature bulk-memory is not enabled");
    assert_eq!(diagnostic.location, "func[0] instr[3]");
    validate_ok(src, &enable(&["bulk-memory"]));

    let diagnostic = first(r#"(module (data "x"))"#, &Features::none());
    assert_eq!(diagnostic.message, "Feature bulk-memory is not enabled");
    assert_eq!(diagnostic.location, "data[0]");
}

#[test]
fn sign_extension_gate() {
    let src = "(module (func i32.const 1 i32.extend8_s drop))";
    let diagnostic = first(src, &Features::none());
    assert_eq!(diagnostic.message, "Feature sign-extension is not enabled");
    assert_eq!(diagnostic.location, "func[0] instr[1]");
    validate_ok(src, &enable(&["sign-extension"]));
}

#[test]
fn simd_gate_covers_types() {
    let src = "(module (func (param v128)))";
    let diagnostics = validate_err(src, &Features::none());
    assert_eq!(
        diagnostics,
        vec![Diagnostic {
            message: "Feature simd is not enabled".to_string(),
            location: "type[0]".to_string(),
        }]
    );
    validate_ok(src, &enable(&["simd"]));
}

#[test]
fn tail_call_gate() {
    let src = "(module (func $f return_call $f))";
    let diagnostic = first(src, &Features::none());
    assert_eq!(diagnostic.message, "Feature tail-call is not enabled");
    assert_eq!(diagnostic.location, "func[0] instr[0]");
    validate_ok(src, &enable(&["tail-call"]));
}

#[test]
fn exceptions_gate_and_tag_shape() {
    let diagnostic = first("(module (tag))", &Features::none());
    assert_eq!(diagnostic.message, "Feature exceptions is not enabled");
    assert_eq!(diagnostic.location, "tag[0]");
    validate_ok("(module (tag))", &enable(&["exceptions"]));

    let diagnostic = first("(module (tag (result i32)))", &enable(&["exceptions"]));
    assert_eq!(diagnostic.message, "Tag types must not have results");
    assert_eq!(diagnostic.location, "tag[0]");
}

#[test]
fn multi_value_gate_covers_type_and_use() {
    let src = "(module (func block (result i32 i32) i32.const 1 i32.const 2 end drop drop))";
    let diagnostics = validate_err(src, &Features::none());
    assert_eq!(diagnostics.len(), 2);
    assert_eq!(diagnostics[0].message, "Feature multi-value is not enabled");
    assert_eq!(diagnostics[0].location, "type[1]");
    assert_eq!(diagnostics[1].message, "Feature multi-value is not enabled");
    assert_eq!(diagnostics[1].location, "func[0] instr[0]");
    validate_ok(src, &enable(&["multi-value"]));
}

#[test]
fn struct_subtypes_may_widen_and_deepen() {
    let src = r#"
        (module
          (type $a (sub (struct (field i32))))
          (type $b (sub $a (struct (field i32) (field f64)))))
    "#;
    validate_ok(src, &enable(&["gc"]));
}

#[test]
fn struct_subtypes_keep_the_supertype_fields() {
    let src = r#"
        (module
          (type $a (sub (struct (field i32) (field i32))))
          (type $b (sub $a (struct (field i32)))))
    "#;
    let diagnostic = first(src, &enable(&["gc"]));
    assert_eq!(diagnostic.message, "Struct type has fewer fields than its supertype");
    assert_eq!(diagnostic.location, "type[1]");
}

#[test]
fn final_types_admit_no_subtypes() {
    let src = "(module (type $a (struct)) (type $b (sub $a (struct))))";
    let diagnostic = first(src, &enable(&["gc"]));
    assert_eq!(diagnostic.message, "Supertype 0 is final");
    assert_eq!(diagnostic.location, "type[1]");
}

#[test]
fn concrete_references_flow_along_declared_subtyping() {
    let src = r#"
        (module
          (type $a (sub (struct)))
          (type $b (sub $a (struct)))
          (func $take (param (ref null $a)))
          (func (param (ref null $b)) local.get 0 call $take))
    "#;
    validate_ok(src, &enable(&["gc"]));

    let src = r#"
        (module
          (type $a (sub (struct)))
          (type $b (sub $a (struct)))
          (func $take (param (ref null $b)))
          (func (param (ref null $a)) local.get 0 call $take))
    "#;
    let diagnostic = first(src, &enable(&["gc"]));
    assert_eq!(diagnostic.message, "Expected (ref null 1) but found (ref null 0)");
    assert_eq!(diagnostic.location, "func[1] instr[1]");
}

#[test]
fn globals_read_only_earlier_globals() {
    let src = "(module (global i32 (global.get 1)) (global i32 (i32.const 1)))";
    let diagnostic = first(src, &Features::none());
    assert_eq!(diagnostic.message, "Global 1 is not yet defined");
    assert_eq!(diagnostic.location, "global[0] init");
}

#[test]
fn constant_expressions_reject_mutable_globals() {
    let src = r#"
        (module
          (import "env" "g" (global (mut i32)))
          (global i32 (global.get 0)))
    "#;
    let diagnostic = first(src, &enable(&["mutable-global"]));
    assert_eq!(diagnostic.message, "Constant expressions cannot read mutable globals");
    assert_eq!(diagnostic.location, "global[1] init");
}

#[test]
fn constant_expressions_allow_few_instructions() {
    let src = "(module (global i32 (i32.popcnt (i32.const 1))))";
    let diagnostic = first(src, &Features::none());
    assert_eq!(diagnostic.message, "i32.popcnt is not allowed in constant expressions");
    assert_eq!(diagnostic.location, "global[0] init");
}

#[test]
fn extended_const_gate() {
    let src = "(module (global i32 (i32.add (i32.const 1) (i32.const 2))))";
    let diagnostic = first(src, &Features::none());
    assert_eq!(diagnostic.message, "Feature extended-const is not enabled");
    assert_eq!(diagnostic.location, "global[0] init");
    validate_ok(src, &enable(&["extended-const"]));
}

#[test]
fn ref_func_requires_a_declaration() {
    let src = "(module (func $f ref.func $f drop))";
    let diagnostic = first(src, &enable(&["reference-types"]));
    assert_eq!(
        diagnostic.message,
        "Function 0 is not declared in an element segment or export"
    );
    assert_eq!(diagnostic.location, "func[0] instr[0]");

    let src = "(module (elem declare func $f) (func $f ref.func $f drop))";
    validate_ok(src, &enable(&["reference-types", "bulk-memory"]));
}

#[test]
fn export_names_are_unique() {
    let src = r#"(module (func) (export "a" (func 0)) (export "a" (func 0)))"#;
    let diagnostic = first(src, &Features::none());
    assert_eq!(diagnostic.message, "Duplicate export name \"a\"");
    assert_eq!(diagnostic.location, "export[1]");
}

#[test]
fn start_function_takes_and_returns_nothing() {
    let diagnostic = first("(module (func (param i32)) (start 0))", &Features::none());
    assert_eq!(diagnostic.message, "Start function must have no parameters and no results");
    assert_eq!(diagnostic.location, "start");
}

#[test]
fn memory_limits_stay_below_the_cap() {
    let diagnostic = first("(module (memory 65537))", &Features::none());
    assert_eq!(diagnostic.message, "Limits minimum 65537 exceeds the cap of 65536");
    assert_eq!(diagnostic.location, "memory[0]");

    let diagnostic = first("(module (memory 2 1))", &Features::none());
    assert_eq!(diagnostic.message, "Limits minimum is larger than the maximum");
    assert_eq!(diagnostic.location, "memory[0]");
}

#[test]
fn alignment_cannot_exceed_the_natural_one() {
    let src = "(module (memory 1) (func i32.const 0 i32.load align=8 drop))";
    let diagnostic = first(src, &Features::none());
    assert_eq!(diagnostic.message, "Alignment must not exceed the natural alignment");
    assert_eq!(diagnostic.location, "func[0] instr[1]");
}

#[test]
fn element_segments_match_their_table() {
    let src = "(module (table 1 externref) (elem (i32.const 0) func $f) (func $f))";
    let diagnostic = first(src, &enable(&["reference-types"]));
    assert_eq!(
        diagnostic.message,
        "Element type funcref does not match the table element type externref"
    );
    assert_eq!(diagnostic.location, "elem[0]");
}

#[test]
fn every_broken_item_gets_a_diagnostic() {
    let diagnostics = validate_err("(module (memory 65537) (memory 1))", &Features::none());
    assert_eq!(diagnostics.len(), 2);
    assert_eq!(diagnostics[0].location, "memory[0]");
    assert_eq!(diagnostics[0].message, "Limits minimum 65537 exceeds the cap of 65536");
    assert_eq!(diagnostics[1].location, "memory[1]");
    assert_eq!(diagnostics[1].message, "Feature multi-memory is not enabled");
}
