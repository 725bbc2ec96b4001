use super::*;
use crate::decoder::decode;
use crate::instr::Instruction::*;
use crate::module::{Export, Global, Import, Tag};
use crate::types::{FuncType, GlobalType, TableType};

#[test]
fn empty_module_is_header_only() {
    assert_eq!(encode(&Module::default()), b"\0asm\x01\0\0\0");
}

#[test]
fn start_section_uses_minimal_leb() {
    let module = Module {
        start: Some(128),
        ..Module::default()
    };
    let mut expected = b"\0asm\x01\0\0\0".to_vec();
    expected.extend_from_slice(&[0x08, 0x02, 0x80, 0x01]);
    assert_eq!(encode(&module), expected);
}

#[test]
fn locals_are_run_length_encoded() {
    let module = Module {
        types: vec![RecGroup::single(SubType::func(FuncType::default()))],
        funcs: vec![Func {
            type_idx: 0,
            locals: vec![ValType::I32, ValType::I32, ValType::I64],
            body: vec![End],
        }],
        ..Module::default()
    };
    let mut expected = b"\0asm\x01\0\0\0".to_vec();
    expected.extend_from_slice(&[0x01, 0x04, 0x01, 0x60, 0x00, 0x00]);
    expected.extend_from_slice(&[0x03, 0x02, 0x01, 0x00]);
    expected.extend_from_slice(&[0x0A, 0x08, 0x01, 0x06, 0x02, 0x02, 0x7F, 0x01, 0x7E, 0x0B]);
    assert_eq!(encode(&module), expected);
}

#[test]
fn matches_reference_encoder() {
    let module = Module {
        types: vec![RecGroup::single(SubType::func(FuncType::new(
            [],
            [ValType::I32],
        )))],
        funcs: vec![Func {
            type_idx: 0,
            locals: vec![],
            body: vec![I32Const(42), End],
        }],
        exports: vec![Export {
            name: "f".to_string(),
            kind: ExternalKind::Func,
            index: 0,
        }],
        ..Module::default()
    };

    let mut types = wasm_encoder::TypeSection::new();
    types.function([], [wasm_encoder::ValType::I32]);
    let mut functions = wasm_encoder::FunctionSection::new();
    functions.function(0);
    let mut exports = wasm_encoder::ExportSection::new();
    exports.export("f", wasm_encoder::ExportKind::Func, 0);
    let mut codes = wasm_encoder::CodeSection::new();
    let mut body = wasm_encoder::Function::new(vec![]);
    body.instruction(&wasm_encoder::Instruction::I32Const(42));
    body.instruction(&wasm_encoder::Instruction::End);
    codes.function(&body);
    let mut reference = wasm_encoder::Module::new();
    reference.section(&types);
    reference.section(&functions);
    reference.section(&exports);
    reference.section(&codes);

    assert_eq!(encode(&module), reference.finish());
}

#[test]
fn section_ids_in_required_order() {
    let module = Module {
        types: vec![RecGroup::single(SubType::func(FuncType::default()))],
        funcs: vec![Func {
            type_idx: 0,
            locals: vec![],
            body: vec![End],
        }],
        elems: vec![Elem {
            kind: ElemKind::Passive,
            ty: RefType::FUNCREF,
            items: ElemItems::Functions(vec![0]),
        }],
        data_count: Some(1),
        datas: vec![Data {
            kind: DataKind::Passive,
            bytes: vec![1, 2, 3],
        }],
        ..Module::default()
    };
    let bytes = encode(&module);

    // Walk the section headers. All payloads here are shorter than 128
    // bytes, so the size LEB is a single byte.
    let mut ids = Vec::new();
    let mut pos = 8;
    while pos < bytes.len() {
        ids.push(bytes[pos]);
        pos += 2 + bytes[pos + 1] as usize;
    }
    assert_eq!(ids, vec![1, 3, 9, 12, 10, 11]);
}

#[test]
fn customs_keep_their_anchors() {
    let module = Module {
        types: vec![RecGroup::single(SubType::func(FuncType::default()))],
        customs: vec![
            Custom {
                name: "head".to_string(),
                bytes: vec![0xAA],
                after: 0,
            },
            Custom {
                name: "tail".to_string(),
                bytes: vec![0xBB],
                after: 1,
            },
        ],
        ..Module::default()
    };
    let bytes = encode(&module);
    assert_eq!(bytes[8], 0x00);
    let decoded = decode(&bytes).unwrap();
    assert_eq!(decoded, module);
}

#[test]
fn shared_memory_flags() {
    let module = Module {
        memories: vec![Limits {
            min: 1,
            max: Some(2),
            shared: true,
            memory64: false,
        }],
        ..Module::default()
    };
    let mut expected = b"\0asm\x01\0\0\0".to_vec();
    expected.extend_from_slice(&[0x05, 0x04, 0x01, 0x03, 0x01, 0x02]);
    assert_eq!(encode(&module), expected);
}

#[test]
fn round_trip() {
    let struct_type = SubType {
        is_final: false,
        supertype: None,
        composite: CompositeType::Struct(vec![FieldType {
            storage: StorageType::I16,
            mutable: true,
        }]),
    };
    let sub_struct = SubType {
        is_final: true,
        supertype: Some(1),
        composite: CompositeType::Struct(vec![FieldType {
            storage: StorageType::I16,
            mutable: true,
        }]),
    };
    let module = Module {
        types: vec![
            RecGroup::single(SubType::func(FuncType::new(
                [ValType::I32, ValType::F64],
                [ValType::I64],
            ))),
            RecGroup {
                explicit_rec: true,
                types: vec![struct_type, sub_struct],
            },
        ],
        imports: vec![
            Import {
                module: "env".to_string(),
                name: "f".to_string(),
                kind: ImportKind::Func(0),
            },
            Import {
                module: "env".to_string(),
                name: "g".to_string(),
                kind: ImportKind::Global(GlobalType {
                    val_type: ValType::F32,
                    mutable: false,
                }),
            },
            Import {
                module: "env".to_string(),
                name: "t".to_string(),
                kind: ImportKind::Tag(Tag { type_idx: 0 }),
            },
        ],
        funcs: vec![Func {
            type_idx: 0,
            locals: vec![ValType::I32, ValType::V128],
            body: vec![
                Block(BlockType::Result(ValType::I32)),
                I32Const(-1),
                End,
                Drop,
                F32Const(0x7FC0_0001),
                Drop,
                V128Const([7; 16]),
                Drop,
                I32Load(MemArg {
                    align: 2,
                    offset: 16,
                    memory: 0,
                }),
                Drop,
                I64Const(i64::MIN),
                End,
            ],
        }],
        tables: vec![TableType {
            element: RefType::FUNCREF,
            limits: Limits::new(1, Some(10)),
        }],
        memories: vec![Limits::new(1, None)],
        globals: vec![Global {
            ty: GlobalType {
                val_type: ValType::I64,
                mutable: true,
            },
            init: vec![I64Const(7), End],
        }],
        exports: vec![Export {
            name: "main".to_string(),
            kind: ExternalKind::Func,
            index: 1,
        }],
        start: Some(1),
        elems: vec![
            Elem {
                kind: ElemKind::Active {
                    table: 0,
                    offset: vec![I32Const(0), End],
                },
                ty: RefType::FUNCREF,
                items: ElemItems::Functions(vec![0, 1]),
            },
            Elem {
                kind: ElemKind::Declared,
                ty: RefType::FUNCREF,
                items: ElemItems::Expressions(vec![vec![RefFunc(1), End]]),
            },
        ],
        data_count: Some(1),
        datas: vec![Data {
            kind: DataKind::Active {
                memory: 0,
                offset: vec![I32Const(8), End],
            },
            bytes: b"hello".to_vec(),
        }],
        tags: vec![Tag { type_idx: 0 }],
        customs: vec![Custom {
            name: "meta".to_string(),
            bytes: vec![1, 2, 3],
            after: 7,
        }],
        names: {
            let mut names = Names::default();
            names.module = Some("demo".to_string());
            names.funcs.insert(1, "main".to_string());
            names.locals.entry(1).or_default().insert(0, "x".to_string());
            names.types.insert(0, "sig".to_string());
            names
        },
    };

    let bytes = encode(&module);
    let decoded = decode(&bytes).unwrap();
    assert_eq!(decoded, module);
}

#[test]
fn element_segment_forms() {
    // Active on table zero with function indices is the shortest form.
    let elems = vec![
        Elem {
            kind: ElemKind::Active {
                table: 0,
                offset: vec![I32Const(0), End],
            },
            ty: RefType::FUNCREF,
            items: ElemItems::Functions(vec![0]),
        },
        Elem {
            kind: ElemKind::Passive,
            ty: RefType::EXTERNREF,
            items: ElemItems::Expressions(vec![vec![
                RefNull(HeapType::Extern),
                End,
            ]]),
        },
        Elem {
            kind: ElemKind::Active {
                table: 3,
                offset: vec![I32Const(1), End],
            },
            ty: RefType::FUNCREF,
            items: ElemItems::Functions(vec![2]),
        },
    ];
    let module = Module {
        elems,
        ..Module::default()
    };
    let bytes = encode(&module);
    let payload = &bytes[10..];
    assert_eq!(payload[0], 3);
    assert_eq!(payload[1], 0);
    let decoded = decode(&bytes).unwrap();
    assert_eq!(decoded, module);
}

#[test]
fn encoded_module_executes() {
    let module = crate::parser::parse(
        r#"(module
          (memory 1)
          (data (i32.const 0) "\2a\00\00\00")
          (func $factorial (param i32) (result i32)
            (local i32)
            i32.const 1
            local.set 1
            block
              loop
                local.get 0
                i32.eqz
                br_if 1
                local.get 0
                local.get 1
                i32.mul
                local.set 1
                local.get 0
                i32.const 1
                i32.sub
                local.set 0
                br 0
              end
            end
            local.get 1)
          (func $first (result i32)
            i32.const 0
            i32.load)
          (export "factorial" (func $factorial))
          (export "first" (func $first)))"#,
    )
    .unwrap();
    let wasm = encode(&module);

    let engine = wasmi::Engine::default();
    let module = wasmi::Module::new(&engine, &wasm).unwrap();
    let mut store = wasmi::Store::new(&engine, ());
    let linker = <wasmi::Linker<()>>::new(&engine);
    let instance = linker
        .instantiate(&mut store, &module)
        .unwrap()
        .start(&mut store)
        .unwrap();

    let factorial = instance
        .get_typed_func::<i32, i32>(&store, "factorial")
        .unwrap();
    assert_eq!(factorial.call(&mut store, 5).unwrap(), 120);
    let first = instance.get_typed_func::<(), i32>(&store, "first").unwrap();
    assert_eq!(first.call(&mut store, ()).unwrap(), 42);
}
