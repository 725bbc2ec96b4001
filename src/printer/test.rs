use super::*;
use crate::encoder::encode;
use crate::instr::Instruction::End;
use crate::module::Names;
use crate::parser::parse;
use crate::types::RecGroup;

fn parse_ok(src: &str) -> Module {
    match parse(src) {
        Ok(module) => module,
        Err(error) => panic!("parse failed: {error}"),
    }
}

/// Prints a parsed module and checks the text re-parses to the same IR.
fn roundtrip(src: &str) -> String {
    let module = parse_ok(src);
    let printed = print(&module);
    let reparsed = match parse(&printed) {
        Ok(module) => module,
        Err(error) => panic!("printed text does not parse: {error}\n{printed}"),
    };
    assert_eq!(reparsed, module, "printed text:\n{printed}");
    printed
}

#[test]
fn empty_module() {
    assert_eq!(print(&Module::default()), "(module)\n");
}

#[test]
fn module_name_on_the_opening_line() {
    assert_eq!(roundtrip("(module $m)"), "(module $m)\n");
}

#[test]
fn add_function_layout() {
    let printed = roundtrip(
        "(module (func $add (param $x i32) (param $y i32) (result i32)
            local.get $x
            local.get $y
            i32.add))",
    );
    let expected = [
        "(module",
        "  (type (func (param i32 i32) (result i32)))",
        "  (func $add (type 0) (param $x i32) (param $y i32) (result i32)",
        "    local.get 0",
        "    local.get 1",
        "    i32.add",
        "  )",
        ")",
        "",
    ]
    .join("\n");
    assert_eq!(printed, expected);
}

#[test]
fn body_indentation_follows_nesting() {
    let printed = roundtrip(
        "(module (func
            block
              loop
                br 1
              end
            end
            if
              nop
            else
              unreachable
            end))",
    );
    let expected = [
        "    block",
        "      loop",
        "        br 1",
        "      end",
        "    end",
        "    if",
        "      nop",
        "    else",
        "      unreachable",
        "    end",
    ]
    .join("\n");
    assert!(printed.contains(&expected), "printed text:\n{printed}");
}

#[test]
fn try_catch_and_delegate_layout() {
    let printed = roundtrip(
        "(module
          (type (func))
          (tag (type 0))
          (func
            try
              throw 0
            catch 0
              rethrow 0
            catch_all
              nop
            end
            try
              nop
            delegate 0))",
    );
    let expected = [
        "    try",
        "      throw 0",
        "    catch 0",
        "      rethrow 0",
        "    catch_all",
        "      nop",
        "    end",
        "    try",
        "      nop",
        "    delegate 0",
    ]
    .join("\n");
    assert!(printed.contains(&expected), "printed text:\n{printed}");
}

#[test]
fn block_types_echo_as_type_uses() {
    let printed = roundtrip(
        "(module (func
            block (result i32)
              i32.const 1
            end
            drop
            block (param i32) (result i32 i32)
              i32.const 2
            end
            drop
            drop
            drop))",
    );
    assert!(printed.contains("block (result i32)"), "printed text:\n{printed}");
    assert!(printed.contains("block (type 1)"), "printed text:\n{printed}");
}

#[test]
fn memory_access_annotations() {
    let printed = roundtrip(
        "(module
          (memory 1)
          (memory 1)
          (func
            i32.const 0
            i32.load
            drop
            i32.const 0
            i32.load offset=16
            drop
            i32.const 0
            i32.load8_u align=2
            drop
            i32.const 0
            i32.load 1 offset=8
            drop))",
    );
    assert!(printed.contains("\n    i32.load\n"), "printed text:\n{printed}");
    assert!(printed.contains("i32.load offset=16"), "printed text:\n{printed}");
    assert!(printed.contains("i32.load8_u align=2"), "printed text:\n{printed}");
    assert!(printed.contains("i32.load 1 offset=8"), "printed text:\n{printed}");
}

#[test]
fn float_literals_stay_lossless() {
    let printed = roundtrip(
        "(module (func
            f32.const 0.5
            drop
            f32.const -0
            drop
            f32.const inf
            drop
            f32.const -inf
            drop
            f32.const nan
            drop
            f64.const nan:0x123
            drop
            f64.const 0x1p-3
            drop))",
    );
    assert!(printed.contains("f32.const 0.5"), "printed text:\n{printed}");
    assert!(printed.contains("f32.const -0"), "printed text:\n{printed}");
    assert!(printed.contains("f32.const inf"), "printed text:\n{printed}");
    assert!(printed.contains("f32.const -inf"), "printed text:\n{printed}");
    assert!(printed.contains("f32.const nan\n"), "printed text:\n{printed}");
    assert!(printed.contains("f64.const nan:0x123"), "printed text:\n{printed}");
    assert!(printed.contains("f64.const 0.125"), "printed text:\n{printed}");
}

#[test]
fn vector_immediates() {
    let printed = roundtrip(
        "(module (func
            v128.const i8x16 0 1 2 3 4 5 6 7 8 9 10 11 12 13 14 15
            v128.const i32x4 0x1 0x2 0x3 0x4
            i8x16.shuffle 0 1 2 3 4 5 6 7 8 9 10 11 12 13 14 15
            i32x4.extract_lane 2
            drop))",
    );
    assert!(
        printed.contains("v128.const i32x4 0x3020100 0x7060504 0xb0a0908 0xf0e0d0c"),
        "printed text:\n{printed}"
    );
    assert!(
        printed.contains("v128.const i32x4 0x1 0x2 0x3 0x4"),
        "printed text:\n{printed}"
    );
    assert!(
        printed.contains("i8x16.shuffle 0 1 2 3 4 5 6 7 8 9 10 11 12 13 14 15"),
        "printed text:\n{printed}"
    );
    assert!(printed.contains("i32x4.extract_lane 2"), "printed text:\n{printed}");
}

#[test]
fn gc_types_and_casts() {
    let printed = roundtrip(
        "(module
          (rec
            (type $a (sub (struct (field $x (mut i8)))))
            (type $b (sub final $a (struct (field (mut i8)) (field i16)))))
          (type $arr (array (mut i32)))
          (func (param (ref null $a)) (result anyref)
            local.get 0
            struct.get_s $a $x
            drop
            local.get 0
            br_on_cast 0 (ref null $a) (ref $b)
            ref.cast (ref $b)))",
    );
    assert!(printed.contains("(rec"), "printed text:\n{printed}");
    assert!(
        printed.contains("(type $a (sub (struct (field $x (mut i8)))))"),
        "printed text:\n{printed}"
    );
    assert!(
        printed.contains("(type $b (sub final 0 (struct (field (mut i8)) (field i16))))"),
        "printed text:\n{printed}"
    );
    assert!(
        printed.contains("(type $arr (array (mut i32)))"),
        "printed text:\n{printed}"
    );
    assert!(printed.contains("struct.get_s 0 0"), "printed text:\n{printed}");
    assert!(
        printed.contains("br_on_cast 0 (ref null 0) (ref 1)"),
        "printed text:\n{printed}"
    );
    assert!(printed.contains("ref.cast (ref 1)"), "printed text:\n{printed}");
}

#[test]
fn element_segment_forms() {
    let printed = roundtrip(
        "(module
          (table 2 funcref)
          (table 1 funcref)
          (func)
          (elem (table 0) (offset i32.const 0) func 0)
          (elem (i32.const 1) func)
          (elem funcref (ref.func 0) (item ref.func 0))
          (elem declare func 0)
          (elem $named (table 1) (i32.const 0) funcref (item ref.null func)))",
    );
    assert!(
        printed.contains("(elem (offset i32.const 0) func 0)"),
        "printed text:\n{printed}"
    );
    assert!(
        printed.contains("(elem (offset i32.const 1) func)"),
        "printed text:\n{printed}"
    );
    assert!(
        printed.contains("(elem funcref (item ref.func 0) (item ref.func 0))"),
        "printed text:\n{printed}"
    );
    assert!(printed.contains("(elem declare func 0)"), "printed text:\n{printed}");
    assert!(
        printed.contains("(elem $named (table 1) (offset i32.const 0) funcref (item ref.null func))"),
        "printed text:\n{printed}"
    );
}

#[test]
fn data_segment_forms_and_escapes() {
    let printed = roundtrip(
        r#"(module
          (memory 1)
          (memory 1)
          (data (i32.const 0) "hi")
          (data (memory 1) (offset i32.const 8) "a\00b\t\"\\")
          (data $blob "\de\ad\be\ef")
          (data ""))"#,
    );
    assert!(
        printed.contains(r#"(data (offset i32.const 0) "hi")"#),
        "printed text:\n{printed}"
    );
    assert!(
        printed.contains(r#"(data (memory 1) (offset i32.const 8) "a\00b\t\"\\")"#),
        "printed text:\n{printed}"
    );
    assert!(
        printed.contains(r#"(data $blob "\de\ad\be\ef")"#),
        "printed text:\n{printed}"
    );
    assert!(printed.contains(r#"(data "")"#), "printed text:\n{printed}");
}

#[test]
fn imports_echo_their_signatures() {
    let printed = roundtrip(
        r#"(module
          (type $binop (func (param i32 i32) (result i32)))
          (type $empty (func))
          (import "env" "add" (func $add (type $binop)))
          (import "env" "mem" (memory 1 2))
          (import "env" "tbl" (table 0 funcref))
          (import "env" "g" (global (mut i32)))
          (import "env" "sig" (tag (type $empty))))"#,
    );
    assert!(
        printed.contains(r#"(import "env" "add" (func $add (type 0) (param i32 i32) (result i32)))"#),
        "printed text:\n{printed}"
    );
    assert!(
        printed.contains(r#"(import "env" "mem" (memory 1 2))"#),
        "printed text:\n{printed}"
    );
    assert!(
        printed.contains(r#"(import "env" "g" (global (mut i32)))"#),
        "printed text:\n{printed}"
    );
    assert!(
        printed.contains(r#"(import "env" "sig" (tag (type 1)))"#),
        "printed text:\n{printed}"
    );
}

#[test]
fn exports_and_start_reference_by_index() {
    let printed = roundtrip(
        r#"(module
          (func $run)
          (export "run" (func $run))
          (start $run))"#,
    );
    assert!(
        printed.contains(r#"(export "run" (func 0))"#),
        "printed text:\n{printed}"
    );
    assert!(printed.contains("(start 0)"), "printed text:\n{printed}");
}

#[test]
fn globals_tables_and_memories() {
    let printed = roundtrip(
        "(module
          (global $g (mut i64) i64.const 7)
          (global f32 (f32.const 0.25))
          (table $t 1 10 funcref)
          (memory i64 1 2)
          (memory 1 1 shared))",
    );
    assert!(
        printed.contains("(global $g (mut i64) i64.const 7)"),
        "printed text:\n{printed}"
    );
    assert!(
        printed.contains("(global f32 f32.const 0.25)"),
        "printed text:\n{printed}"
    );
    assert!(printed.contains("(table $t 1 10 funcref)"), "printed text:\n{printed}");
    assert!(printed.contains("(memory i64 1 2)"), "printed text:\n{printed}");
    assert!(printed.contains("(memory 1 1 shared)"), "printed text:\n{printed}");
}

#[test]
fn printing_is_stable() {
    let module = parse_ok(
        r#"(module $demo
          (type $binop (func (param i32 i32) (result i32)))
          (import "env" "add" (func (type $binop)))
          (memory 1)
          (func $main (type $binop)
            local.get 0
            local.get 1
            call 0)
          (export "main" (func $main))
          (elem declare func 1)
          (data (i32.const 0) "seed"))"#,
    );
    let once = print(&module);
    let twice = print(&parse_ok(&once));
    assert_eq!(once, twice);
}

#[test]
fn unprintable_names_fall_back_to_indices() {
    let mut names = Names::default();
    names.module = Some("two words".to_string());
    names.funcs.insert(0, "has space".to_string());
    names.funcs.insert(1, "dup".to_string());
    names.funcs.insert(2, "dup".to_string());
    let func = Func {
        type_idx: 0,
        locals: vec![],
        body: vec![End],
    };
    let module = Module {
        types: vec![RecGroup::single(SubType::func(FuncType::default()))],
        funcs: vec![func.clone(), func.clone(), func],
        names,
        ..Module::default()
    };
    let printed = print(&module);
    assert!(!printed.contains('$'), "printed text:\n{printed}");
    let reparsed = parse(&printed).unwrap();
    assert!(reparsed.names.funcs.is_empty());
}

#[test]
fn agrees_with_reference_printer() {
    let module = parse_ok(
        r#"(module
          (type (func (param i32) (result i32)))
          (func (type 0)
            local.get 0
            i32.const 1
            i32.add)
          (table 1 funcref)
          (memory 1)
          (global i64 (i64.const 7))
          (export "inc" (func 0))
          (elem (i32.const 0) func 0)
          (data (i32.const 8) "hello"))"#,
    );
    let reference = wasmprinter::print_bytes(encode(&module)).unwrap();
    let reparsed = match parse(&reference) {
        Ok(module) => module,
        Err(error) => panic!("reference text does not parse: {error}\n{reference}"),
    };
    assert_eq!(reparsed, module);
}
