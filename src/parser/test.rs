use super::*;
use crate::instr::Instruction::*;
use crate::instr::{BlockType, MemArg};
use crate::module::{Data, DataKind, Elem, ElemItems, Export, Expr, Func, Import};
use crate::types::{CompositeType, FieldType, StorageType};

fn parse_ok(src: &str) -> Module {
    match parse(src) {
        Ok(module) => module,
        Err(error) => panic!("parse failed: {error}"),
    }
}

fn parse_err(src: &str) -> ParseError {
    match parse(src) {
        Ok(_) => panic!("expected a parse error"),
        Err(error) => error,
    }
}

fn body(fields: &str) -> Expr {
    let module = parse_ok(&format!("(module (func {fields}))"));
    module.funcs.into_iter().next().unwrap().body
}

#[test]
fn empty_module() {
    assert_eq!(parse_ok("(module)"), Module::default());
    assert_eq!(parse_ok(""), Module::default());
}

#[test]
fn module_id() {
    let module = parse_ok("(module $interchange)");
    assert_eq!(module.names.module.as_deref(), Some("interchange"));
}

#[test]
fn bare_fields_without_module() {
    let module = parse_ok("(func) (memory 1)");
    assert_eq!(module.funcs.len(), 1);
    assert_eq!(module.memories, vec![Limits::new(1, None)]);
}

#[test]
fn simple_func() {
    let module = parse_ok("(module (func))");
    assert_eq!(
        module.types,
        vec![RecGroup::single(SubType::func(FuncType::default()))]
    );
    assert_eq!(
        module.funcs,
        vec![Func {
            type_idx: 0,
            locals: vec![],
            body: vec![End],
        }]
    );
}

#[test]
fn func_signature_and_locals() {
    let module = parse_ok(
        r#"
        (module
          (func $add (param $x i32) (param i64 f32) (result f64)
            (local $tmp f32)
            local.get $x
            drop
            f64.const 0))
    "#,
    );
    let expected = FuncType::new([ValType::I32, ValType::I64, ValType::F32], [ValType::F64]);
    assert_eq!(module.types, vec![RecGroup::single(SubType::func(expected))]);
    assert_eq!(module.funcs[0].locals, vec![ValType::F32]);
    assert_eq!(
        module.funcs[0].body,
        vec![LocalGet(0), Drop, F64Const(0), End]
    );
    assert_eq!(module.names.funcs[&0], "add");
    let locals = &module.names.locals[&0];
    assert_eq!(locals[&0], "x");
    assert_eq!(locals[&3], "tmp");
}

#[test]
fn type_use_reuses_structural_duplicate() {
    let module = parse_ok("(module (type $t (func (param i32))) (func (param i32)))");
    assert_eq!(module.types.len(), 1);
    assert_eq!(module.funcs[0].type_idx, 0);
}

#[test]
fn type_use_appends_missing_signature() {
    let module = parse_ok("(module (type (func)) (func (param i32)))");
    assert_eq!(module.types.len(), 2);
    assert_eq!(module.funcs[0].type_idx, 1);
}

#[test]
fn explicit_type_use_brings_params_into_scope() {
    let module = parse_ok(
        "(module (type $t (func (param i32) (result i32))) (func (type $t) local.get 0))",
    );
    assert_eq!(module.funcs[0].type_idx, 0);
    assert_eq!(module.funcs[0].body, vec![LocalGet(0), End]);
}

#[test]
fn type_referenced_before_definition() {
    let module = parse_ok("(module (func (type $t)) (type $t (func (result i32))))");
    assert_eq!(module.funcs[0].type_idx, 0);
}

#[test]
fn inline_signature_mismatch() {
    let error = parse_err("(module (type $t (func)) (func (type $t) (param i32)))");
    assert_eq!(error.msg, "Inline signature does not match the type use");
}

#[test]
fn imports() {
    let module = parse_ok(
        r#"
        (module
          (import "env" "log" (func $log (param i32)))
          (func i32.const 1 call $log))
    "#,
    );
    assert_eq!(
        module.imports,
        vec![Import {
            module: "env".into(),
            name: "log".into(),
            kind: ImportKind::Func(0),
        }]
    );
    assert_eq!(module.funcs[0].body, vec![I32Const(1), Call(0), End]);
    assert_eq!(module.names.funcs[&0], "log");
}

#[test]
fn inline_import() {
    let module = parse_ok(r#"(module (memory $m (import "env" "mem") 1 2))"#);
    assert!(module.memories.is_empty());
    assert_eq!(
        module.imports,
        vec![Import {
            module: "env".into(),
            name: "mem".into(),
            kind: ImportKind::Memory(Limits::new(1, Some(2))),
        }]
    );
}

#[test]
fn inline_exports() {
    let module = parse_ok(r#"(module (func (export "a") (export "b")))"#);
    assert_eq!(
        module.exports,
        vec![
            Export {
                name: "a".into(),
                kind: ExternalKind::Func,
                index: 0,
            },
            Export {
                name: "b".into(),
                kind: ExternalKind::Func,
                index: 0,
            },
        ]
    );
}

#[test]
fn export_fields() {
    let module = parse_ok(
        r#"
        (module
          (func $f)
          (table 1 funcref)
          (memory 1)
          (global i32 (i32.const 0))
          (export "f" (func $f))
          (export "t" (table 0))
          (export "m" (memory 0))
          (export "g" (global 0)))
    "#,
    );
    let kinds: Vec<ExternalKind> = module.exports.iter().map(|e| e.kind).collect();
    assert_eq!(
        kinds,
        vec![
            ExternalKind::Func,
            ExternalKind::Table,
            ExternalKind::Memory,
            ExternalKind::Global,
        ]
    );
}

#[test]
fn import_after_definition() {
    let error = parse_err(r#"(module (func) (import "a" "b" (func)))"#);
    assert_eq!(error.msg, "Import after function definition");
}

#[test]
fn duplicate_function_name() {
    let error = parse_err("(module (func $f) (func $f))");
    assert_eq!(error.msg, "Duplicate function name $f");
}

#[test]
fn unknown_function() {
    let error = parse_err("(module (func (call $g)))");
    assert_eq!(error.msg, "Unknown function $g");
}

#[test]
fn forward_function_reference() {
    let module = parse_ok("(module (func (call $g)) (func $g))");
    assert_eq!(module.funcs[0].body, vec![Call(1), End]);
}

#[test]
fn label_resolution() {
    let instrs = body(
        r#"
        (block $outer
          (block $inner
            br $outer
            br $inner
            br 0))
    "#,
    );
    assert_eq!(
        instrs,
        vec![
            Block(BlockType::Empty),
            Block(BlockType::Empty),
            Br(1),
            Br(0),
            Br(0),
            End,
            End,
            End,
        ]
    );
}

#[test]
fn label_shadowing_picks_innermost() {
    let instrs = body("(block $l (block $l (br $l)))");
    assert_eq!(
        instrs,
        vec![
            Block(BlockType::Empty),
            Block(BlockType::Empty),
            Br(0),
            End,
            End,
            End,
        ]
    );
}

#[test]
fn mismatching_label() {
    let error = parse_err("(module (func block $a nop end $b))");
    assert_eq!(error.msg, "Mismatching label $b");
}

#[test]
fn unknown_label() {
    let error = parse_err("(module (func br $missing))");
    assert_eq!(error.msg, "Unknown label $missing");
}

#[test]
fn plain_if_else() {
    let instrs = body("i32.const 1 if nop else nop end");
    assert_eq!(
        instrs,
        vec![I32Const(1), If(BlockType::Empty), Nop, Else, Nop, End, End]
    );
}

#[test]
fn folded_if_keeps_condition_outside() {
    let instrs = body("(if (result i32) (i32.const 1) (then (i32.const 2)) (else (i32.const 3)))");
    assert_eq!(
        instrs,
        vec![
            I32Const(1),
            If(BlockType::Result(ValType::I32)),
            I32Const(2),
            Else,
            I32Const(3),
            End,
            End,
        ]
    );
}

#[test]
fn multi_result_block_gets_a_type() {
    let module =
        parse_ok("(module (func block (result i32 i32) i32.const 1 i32.const 2 end drop drop))");
    assert_eq!(module.funcs[0].body[0], Block(BlockType::Func(1)));
    assert_eq!(
        module.types[1],
        RecGroup::single(SubType::func(FuncType::new(
            [],
            [ValType::I32, ValType::I32]
        )))
    );
}

#[test]
fn br_table_defaults_to_last_target() {
    let instrs = body("(block (block (block i32.const 0 br_table 0 1 2)))");
    assert_eq!(
        instrs,
        vec![
            Block(BlockType::Empty),
            Block(BlockType::Empty),
            Block(BlockType::Empty),
            I32Const(0),
            BrTable {
                targets: vec![0, 1],
                default: 2,
            },
            End,
            End,
            End,
            End,
        ]
    );
}

#[test]
fn call_indirect_forms() {
    let module = parse_ok(
        r#"
        (module
          (table $tab 2 funcref)
          (type $t (func (param i32)))
          (func i32.const 0 i32.const 0 call_indirect $tab (type $t))
          (func call_indirect))
    "#,
    );
    assert_eq!(
        module.funcs[0].body,
        vec![
            I32Const(0),
            I32Const(0),
            CallIndirect {
                type_idx: 0,
                table: 0,
            },
            End,
        ]
    );
    assert_eq!(
        module.funcs[1].body,
        vec![
            CallIndirect {
                type_idx: 1,
                table: 0,
            },
            End,
        ]
    );
}

#[test]
fn memory_operands() {
    let instrs = body("i32.const 0 i32.load offset=4 align=2 drop i32.const 0 i64.load drop");
    assert_eq!(
        instrs,
        vec![
            I32Const(0),
            I32Load(MemArg {
                align: 1,
                offset: 4,
                memory: 0,
            }),
            Drop,
            I32Const(0),
            I64Load(MemArg {
                align: 3,
                offset: 0,
                memory: 0,
            }),
            Drop,
            End,
        ]
    );
}

#[test]
fn alignment_must_be_a_power_of_two() {
    let error = parse_err("(module (func i32.const 0 i32.load align=3))");
    assert_eq!(error.msg, "Alignment must be a power of two");
}

#[test]
fn multi_memory_copy() {
    let module = parse_ok(
        "(module (memory 1) (memory $b 1) (func i32.const 0 i32.const 0 i32.const 0 memory.copy $b 0))",
    );
    assert_eq!(
        module.funcs[0].body,
        vec![
            I32Const(0),
            I32Const(0),
            I32Const(0),
            MemoryCopy { dst: 1, src: 0 },
            End,
        ]
    );
}

#[test]
fn table_init_single_index_form() {
    let module = parse_ok(
        "(module (table 1 funcref) (elem $e func) (func i32.const 0 i32.const 0 i32.const 0 table.init $e))",
    );
    assert_eq!(module.funcs[0].body[3], TableInit { table: 0, elem: 0 });
    assert_eq!(module.elems[0].kind, ElemKind::Passive);
}

#[test]
fn int_literals() {
    assert_eq!(body("i32.const -1 drop"), vec![I32Const(-1), Drop, End]);
    assert_eq!(
        body("i32.const 0xFFFF_FFFF drop"),
        vec![I32Const(-1), Drop, End]
    );
    assert_eq!(
        body("i32.const 4294967295 drop"),
        vec![I32Const(-1), Drop, End]
    );
    assert_eq!(
        body("i64.const -0x8000_0000_0000_0000 drop"),
        vec![I64Const(i64::MIN), Drop, End]
    );
}

#[test]
fn int_literal_out_of_range() {
    let error = parse_err("(module (func i32.const 4294967296))");
    assert_eq!(error.msg, "Constant out of range: 4294967296");
    let error = parse_err("(module (func i32.const -2147483649))");
    assert_eq!(error.msg, "Constant out of range: -2147483649");
}

#[test]
fn float_literals() {
    assert_eq!(body("f32.const 1.5"), vec![F32Const(0x3fc00000), End]);
    assert_eq!(body("f32.const 0x1p-3"), vec![F32Const(0x3e000000), End]);
    assert_eq!(body("f32.const -0"), vec![F32Const(0x8000_0000), End]);
    assert_eq!(body("f32.const nan"), vec![F32Const(0x7fc00000), End]);
    assert_eq!(
        body("f32.const nan:0x200000"),
        vec![F32Const(0x7fa00000), End]
    );
    assert_eq!(body("f32.const -inf"), vec![F32Const(0xff800000), End]);
    assert_eq!(
        body("f64.const 0x1.8p1"),
        vec![F64Const(0x4008000000000000), End]
    );
    assert_eq!(
        body("f64.const 1e3"),
        vec![F64Const(0x408f400000000000), End]
    );
}

#[test]
fn float_literal_out_of_range() {
    let error = parse_err("(module (func f32.const 1e40))");
    assert_eq!(error.msg, "Constant out of range: 1e40");
}

#[test]
fn digit_separators_sit_between_digits() {
    assert_eq!(body("i32.const 1_000 drop"), vec![I32Const(1000), Drop, End]);
    assert_eq!(
        body("f64.const 1_000.5 drop"),
        vec![F64Const(0x408f440000000000), Drop, End]
    );
    let error = parse_err("(module (func i32.const 1_))");
    assert_eq!(error.msg, "Constant out of range: 1_");
    let error = parse_err("(module (func i32.const 1__2))");
    assert_eq!(error.msg, "Constant out of range: 1__2");
    let error = parse_err("(module (func i32.const 0x_ff))");
    assert_eq!(error.msg, "Constant out of range: 0x_ff");
    let error = parse_err("(module (func f32.const 1_.5))");
    assert_eq!(error.msg, "Constant out of range: 1_.5");
    let error = parse_err("(module (func f64.const nan:0x_4))");
    assert_eq!(error.msg, "Constant out of range: nan:0x_4");
}

#[test]
fn typed_select() {
    let instrs = body("i32.const 1 i32.const 2 i32.const 0 select (result i32)");
    assert_eq!(
        instrs,
        vec![
            I32Const(1),
            I32Const(2),
            I32Const(0),
            TypedSelect(ValType::I32),
            End,
        ]
    );
    assert_eq!(body("select"), vec![Select, End]);
}

#[test]
fn v128_literals() {
    assert_eq!(
        body("v128.const i32x4 1 2 3 4"),
        vec![
            V128Const([1, 0, 0, 0, 2, 0, 0, 0, 3, 0, 0, 0, 4, 0, 0, 0]),
            End,
        ]
    );
    assert_eq!(
        body("v128.const i8x16 0 1 2 3 4 5 6 7 8 9 10 11 12 13 14 -1"),
        vec![
            V128Const([0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 0xff]),
            End,
        ]
    );
}

#[test]
fn string_escapes() {
    let module = parse_ok(r#"(module (memory 1) (data (i32.const 0) "a\t\5A\u{263a}"))"#);
    assert_eq!(
        module.datas,
        vec![Data {
            kind: DataKind::Active {
                memory: 0,
                offset: vec![I32Const(0), End],
            },
            bytes: b"a\t\x5a\xe2\x98\xba".to_vec(),
        }]
    );
}

#[test]
fn invalid_string_escape() {
    let error = parse_err(r#"(module (memory 1) (data (i32.const 0) "\q"))"#);
    assert_eq!(error.msg, "Invalid string escape");
}

#[test]
fn inline_data_sizes_the_memory() {
    let module = parse_ok(r#"(module (memory (data "hi")))"#);
    assert_eq!(module.memories, vec![Limits::new(1, Some(1))]);
    assert_eq!(
        module.datas,
        vec![Data {
            kind: DataKind::Active {
                memory: 0,
                offset: vec![I32Const(0), End],
            },
            bytes: b"hi".to_vec(),
        }]
    );
}

#[test]
fn inline_elem_sizes_the_table() {
    let module = parse_ok("(module (func $f) (table $t funcref (elem $f $f)))");
    assert_eq!(
        module.tables,
        vec![TableType {
            element: RefType::FUNCREF,
            limits: Limits::new(2, Some(2)),
        }]
    );
    assert_eq!(
        module.elems,
        vec![Elem {
            kind: ElemKind::Active {
                table: 0,
                offset: vec![I32Const(0), End],
            },
            ty: RefType::FUNCREF,
            items: ElemItems::Functions(vec![0, 0]),
        }]
    );
}

#[test]
fn elem_segment_forms() {
    let module = parse_ok(
        r#"
        (module
          (table 1 funcref)
          (func $f)
          (elem (table 0) (i32.const 0) func $f)
          (elem func $f)
          (elem declare func $f)
          (elem (offset (i32.const 1)) func)
          (elem (i32.const 2) funcref (item ref.func $f) (ref.func $f)))
    "#,
    );
    assert_eq!(
        module.elems[0].kind,
        ElemKind::Active {
            table: 0,
            offset: vec![I32Const(0), End],
        }
    );
    assert_eq!(module.elems[0].items, ElemItems::Functions(vec![0]));
    assert_eq!(module.elems[1].kind, ElemKind::Passive);
    assert_eq!(module.elems[2].kind, ElemKind::Declared);
    assert_eq!(
        module.elems[3].kind,
        ElemKind::Active {
            table: 0,
            offset: vec![I32Const(1), End],
        }
    );
    assert_eq!(
        module.elems[4].items,
        ElemItems::Expressions(vec![vec![RefFunc(0), End], vec![RefFunc(0), End]])
    );
}

#[test]
fn bare_elem_items_need_an_active_segment() {
    let error = parse_err("(module (func $f) (elem 0))");
    assert_eq!(error.msg, "Expected element type");
}

#[test]
fn globals() {
    let module =
        parse_ok("(module (global $g (mut i32) (i32.const 42)) (func global.get $g drop))");
    assert_eq!(
        module.globals,
        vec![Global {
            ty: GlobalType {
                val_type: ValType::I32,
                mutable: true,
            },
            init: vec![I32Const(42), End],
        }]
    );
    assert_eq!(module.funcs[0].body, vec![GlobalGet(0), Drop, End]);
    assert_eq!(module.names.globals[&0], "g");
}

#[test]
fn start_field() {
    let module = parse_ok("(module (func $main) (start $main))");
    assert_eq!(module.start, Some(0));
}

#[test]
fn multiple_start_fields() {
    let error = parse_err("(module (func) (start 0) (start 0))");
    assert_eq!(error.msg, "Multiple start fields");
}

#[test]
fn memory64_and_shared_limits() {
    let module = parse_ok("(module (memory i64 1 2) (memory 1 2 shared))");
    assert_eq!(
        module.memories[0],
        Limits {
            min: 1,
            max: Some(2),
            shared: false,
            memory64: true,
        }
    );
    assert_eq!(
        module.memories[1],
        Limits {
            min: 1,
            max: Some(2),
            shared: true,
            memory64: false,
        }
    );
}

#[test]
fn struct_types_and_field_names() {
    let module = parse_ok(
        r#"
        (module
          (type $point (struct (field $x i32) (field $y (mut f64))))
          (func (param (ref $point))
            local.get 0
            struct.get $point $y
            drop))
    "#,
    );
    assert_eq!(
        module.types[0],
        RecGroup::single(SubType {
            is_final: true,
            supertype: None,
            composite: CompositeType::Struct(vec![
                FieldType {
                    storage: StorageType::Val(ValType::I32),
                    mutable: false,
                },
                FieldType {
                    storage: StorageType::Val(ValType::F64),
                    mutable: true,
                },
            ]),
        })
    );
    assert_eq!(
        module.funcs[0].body,
        vec![
            LocalGet(0),
            StructGet {
                type_idx: 0,
                field: 1,
            },
            Drop,
            End,
        ]
    );
    assert_eq!(module.names.types[&0], "point");
    assert_eq!(module.names.fields[&0][&1], "y");
}

#[test]
fn rec_groups() {
    let module = parse_ok("(module (rec (type $a (struct)) (type $b (array (mut i8)))))");
    assert_eq!(
        module.types,
        vec![RecGroup {
            explicit_rec: true,
            types: vec![
                SubType {
                    is_final: true,
                    supertype: None,
                    composite: CompositeType::Struct(vec![]),
                },
                SubType {
                    is_final: true,
                    supertype: None,
                    composite: CompositeType::Array(FieldType {
                        storage: StorageType::I8,
                        mutable: true,
                    }),
                },
            ],
        }]
    );
}

#[test]
fn sub_types() {
    let module = parse_ok(
        "(module (type $a (sub (struct))) (type $b (sub final $a (struct (field i32)))))",
    );
    assert_eq!(
        module.types[0].types[0],
        SubType {
            is_final: false,
            supertype: None,
            composite: CompositeType::Struct(vec![]),
        }
    );
    assert_eq!(
        module.types[1].types[0],
        SubType {
            is_final: true,
            supertype: Some(0),
            composite: CompositeType::Struct(vec![FieldType {
                storage: StorageType::Val(ValType::I32),
                mutable: false,
            }]),
        }
    );
}

#[test]
fn tags_and_exception_handling() {
    let module = parse_ok(
        r#"
        (module
          (tag $e (param i32))
          (func (try (do i32.const 1 throw $e) (catch $e drop))))
    "#,
    );
    assert_eq!(module.tags[0].type_idx, 0);
    assert_eq!(
        module.funcs[0].body,
        vec![
            Try(BlockType::Empty),
            I32Const(1),
            Throw(0),
            Catch(0),
            Drop,
            End,
            End,
        ]
    );
}

#[test]
fn delegate_closes_the_try() {
    let instrs = body("(block (try (do) (delegate 0)))");
    assert_eq!(
        instrs,
        vec![
            Block(BlockType::Empty),
            Try(BlockType::Empty),
            Delegate(0),
            End,
            End,
        ]
    );
}

#[test]
fn delegate_after_catch() {
    let error = parse_err("(module (func (try (do) (catch_all) (delegate 0))))");
    assert_eq!(error.msg, "Delegate after catch");
}

#[test]
fn duplicate_local_name() {
    let error = parse_err("(module (func (local $x i32) (local $x i32)))");
    assert_eq!(error.msg, "Duplicate local name $x");
}

#[test]
fn unknown_instruction() {
    let error = parse_err("(module (func i32.frobnicate))");
    assert_eq!(error.msg, "Unknown instruction i32.frobnicate");
}

#[test]
fn unknown_module_field() {
    let error = parse_err("(module (widget))");
    assert_eq!(error.msg, "Unknown module field widget");
}

#[test]
fn trailing_tokens() {
    let error = parse_err("(module) (module)");
    assert_eq!(error.msg, "Expected end of input, got LParen");
}

#[test]
fn errors_carry_line_and_column() {
    let error = parse_err("(module\n  (func (call $missing)))");
    assert_eq!(error.msg, "Unknown function $missing");
    assert_eq!((error.line, error.col), (2, 15));
    assert_eq!(
        error.to_string(),
        "Parse Error: Unknown function $missing at 2:15"
    );
}

#[test]
fn comments_are_skipped() {
    let module = parse_ok(
        r#"
        (module
          ;; line comment
          (; block (; nested ;) comment ;)
          (func (; inline ;) nop))
    "#,
    );
    assert_eq!(module.funcs[0].body, vec![Nop, End]);
}
