use super::*;
use crate::instr::Instruction::*;

fn module_with(sections: &[(u8, &[u8])]) -> Vec<u8> {
    let mut bytes = b"\0asm\x01\0\0\0".to_vec();
    for (id, payload) in sections {
        assert!(payload.len() < 128);
        bytes.push(*id);
        bytes.push(payload.len() as u8);
        bytes.extend_from_slice(payload);
    }
    bytes
}

fn func_module(body: &[u8]) -> Vec<u8> {
    let mut code = vec![0x01, body.len() as u8 + 1, 0x00];
    code.extend_from_slice(body);
    module_with(&[
        (1, &[0x01, 0x60, 0x00, 0x00]),
        (3, &[0x01, 0x00]),
        (10, &code),
    ])
}

fn decode_body(body: &[u8]) -> Expr {
    let module = decode(&func_module(body)).unwrap();
    module.funcs.into_iter().next().unwrap().body
}

fn decode_err(bytes: &[u8]) -> DecodeError {
    match decode(bytes) {
        Ok(_) => panic!("expected a decode error"),
        Err(error) => error,
    }
}

#[test]
fn empty_module() {
    let module = decode(b"\0asm\x01\0\0\0").unwrap();
    assert_eq!(module, Module::default());
}

#[test]
fn bad_magic() {
    let error = decode_err(b"\0msa\x01\0\0\0");
    assert_eq!(error.msg, "bad magic number");
    assert_eq!(error.offset, 0);
}

#[test]
fn bad_version() {
    let error = decode_err(b"\0asm\x02\0\0\0");
    assert_eq!(error.msg, "unsupported version 2");
    assert_eq!(error.offset, 4);
}

#[test]
fn truncated_header() {
    let error = decode_err(b"\0asm\x01");
    assert_eq!(error.msg, "unexpected end");
}

#[test]
fn error_display_includes_offset() {
    let error = decode_err(b"\0msa\x01\0\0\0");
    assert_eq!(error.to_string(), "bad magic number at offset 0x0");
}

#[test]
fn unsigned_leb() {
    fn u32_of(bytes: &[u8]) -> DecodeResult<u32> {
        Reader::new(bytes, 0).u32()
    }
    assert_eq!(u32_of(&[0x00]).unwrap(), 0);
    assert_eq!(u32_of(&[0x7F]).unwrap(), 127);
    assert_eq!(u32_of(&[0x80, 0x01]).unwrap(), 128);
    assert_eq!(u32_of(&[0xE5, 0x8E, 0x26]).unwrap(), 624485);
    assert_eq!(u32_of(&[0xFF, 0xFF, 0xFF, 0xFF, 0x0F]).unwrap(), u32::MAX);

    let error = u32_of(&[0x80, 0x00]).unwrap_err();
    assert_eq!(error.msg, "integer encoding is not minimal");
    let error = u32_of(&[0xFF, 0xFF, 0xFF, 0xFF, 0x1F]).unwrap_err();
    assert_eq!(error.msg, "integer too large");
    let error = u32_of(&[0x80, 0x80, 0x80, 0x80, 0x80]).unwrap_err();
    assert_eq!(error.msg, "integer representation too long");
    let error = u32_of(&[0x80]).unwrap_err();
    assert_eq!(error.msg, "unexpected end");
}

#[test]
fn signed_leb() {
    fn s32_of(bytes: &[u8]) -> DecodeResult<i32> {
        Reader::new(bytes, 0).s32()
    }
    assert_eq!(s32_of(&[0x00]).unwrap(), 0);
    assert_eq!(s32_of(&[0x3F]).unwrap(), 63);
    assert_eq!(s32_of(&[0x40]).unwrap(), -64);
    assert_eq!(s32_of(&[0x7F]).unwrap(), -1);
    assert_eq!(s32_of(&[0xC0, 0x00]).unwrap(), 64);
    assert_eq!(s32_of(&[0x80, 0x7F]).unwrap(), -128);
    assert_eq!(
        s32_of(&[0x80, 0x80, 0x80, 0x80, 0x78]).unwrap(),
        i32::MIN
    );
    assert_eq!(
        s32_of(&[0xFF, 0xFF, 0xFF, 0xFF, 0x07]).unwrap(),
        i32::MAX
    );

    // Final bytes that only repeat the sign are redundant.
    let error = s32_of(&[0xFF, 0x7F]).unwrap_err();
    assert_eq!(error.msg, "integer encoding is not minimal");
    let error = s32_of(&[0x80, 0x00]).unwrap_err();
    assert_eq!(error.msg, "integer encoding is not minimal");
    // Unused high bits must replicate the sign bit.
    let error = s32_of(&[0x80, 0x80, 0x80, 0x80, 0x70]).unwrap_err();
    assert_eq!(error.msg, "integer too large");

    let mut reader = Reader::new(
        &[0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x7F],
        0,
    );
    assert_eq!(reader.s64().unwrap(), i64::MIN);
}

#[test]
fn type_section() {
    let bytes = module_with(&[(1, &[0x01, 0x60, 0x01, 0x7F, 0x01, 0x7E])]);
    let module = decode(&bytes).unwrap();
    let expected = RecGroup::single(SubType::func(FuncType::new(
        [ValType::I32],
        [ValType::I64],
    )));
    assert_eq!(module.types, vec![expected]);
}

#[test]
fn rec_group_with_array() {
    // (rec (array (mut i8)))
    let bytes = module_with(&[(1, &[0x01, 0x4E, 0x01, 0x5E, 0x78, 0x01])]);
    let module = decode(&bytes).unwrap();
    assert!(module.types[0].explicit_rec);
    let sub = &module.types[0].types[0];
    assert_eq!(
        sub.composite,
        CompositeType::Array(FieldType {
            storage: StorageType::I8,
            mutable: true,
        })
    );
}

#[test]
fn import_section() {
    let bytes = module_with(&[(
        2,
        &[0x01, 0x03, b'e', b'n', b'v', 0x01, b'f', 0x00, 0x00],
    )]);
    let module = decode(&bytes).unwrap();
    assert_eq!(
        module.imports,
        vec![Import {
            module: "env".to_string(),
            name: "f".to_string(),
            kind: ImportKind::Func(0),
        }]
    );
}

#[test]
fn invalid_utf8_name() {
    let bytes = module_with(&[(2, &[0x01, 0x01, 0xFF, 0x00, 0x00, 0x00])]);
    let error = decode_err(&bytes);
    assert_eq!(error.msg, "invalid UTF-8 in name");
    assert_eq!(error.offset, 12);
}

#[test]
fn memory_limits() {
    let bytes = module_with(&[(5, &[0x02, 0x00, 0x01, 0x03, 0x01, 0x02])]);
    let module = decode(&bytes).unwrap();
    assert_eq!(module.memories[0], Limits::new(1, None));
    assert_eq!(
        module.memories[1],
        Limits {
            min: 1,
            max: Some(2),
            shared: true,
            memory64: false,
        }
    );

    let bytes = module_with(&[(5, &[0x01, 0x08, 0x01])]);
    assert_eq!(decode_err(&bytes).msg, "invalid limits flags");
}

#[test]
fn global_section() {
    let bytes = module_with(&[(6, &[0x01, 0x7F, 0x01, 0x41, 0x2A, 0x0B])]);
    let module = decode(&bytes).unwrap();
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
}

#[test]
fn export_and_start() {
    let bytes = module_with(&[
        (7, &[0x01, 0x01, b'm', 0x02, 0x00]),
        (8, &[0x00]),
    ]);
    let module = decode(&bytes).unwrap();
    assert_eq!(
        module.exports,
        vec![Export {
            name: "m".to_string(),
            kind: ExternalKind::Memory,
            index: 0,
        }]
    );
    assert_eq!(module.start, Some(0));
}

#[test]
fn element_segments() {
    // flags 0: active, table 0, funcref indices
    let bytes = module_with(&[(9, &[0x01, 0x00, 0x41, 0x00, 0x0B, 0x01, 0x00])]);
    let module = decode(&bytes).unwrap();
    assert_eq!(
        module.elems,
        vec![Elem {
            kind: ElemKind::Active {
                table: 0,
                offset: vec![I32Const(0), End],
            },
            ty: RefType::FUNCREF,
            items: ElemItems::Functions(vec![0]),
        }]
    );

    // flags 5: passive, reftype, expressions
    let bytes = module_with(&[(9, &[0x01, 0x05, 0x70, 0x01, 0xD2, 0x00, 0x0B])]);
    let module = decode(&bytes).unwrap();
    assert_eq!(
        module.elems,
        vec![Elem {
            kind: ElemKind::Passive,
            ty: RefType::FUNCREF,
            items: ElemItems::Expressions(vec![vec![RefFunc(0), End]]),
        }]
    );

    // elemkind must be zero
    let bytes = module_with(&[(9, &[0x01, 0x01, 0x01, 0x01, 0x00])]);
    assert_eq!(decode_err(&bytes).msg, "invalid element kind");
}

#[test]
fn data_segments() {
    let bytes = module_with(&[(11, &[0x01, 0x01, 0x02, b'h', b'i'])]);
    let module = decode(&bytes).unwrap();
    assert_eq!(
        module.datas,
        vec![Data {
            kind: DataKind::Passive,
            bytes: b"hi".to_vec(),
        }]
    );
}

#[test]
fn data_count_mismatch() {
    let bytes = module_with(&[(12, &[0x02]), (11, &[0x01, 0x01, 0x00])]);
    let error = decode_err(&bytes);
    assert_eq!(
        error.msg,
        "data count and data section have inconsistent lengths"
    );
}

#[test]
fn function_body() {
    let body = decode_body(&[0x41, 0x2A, 0x21, 0x00, 0x0B]);
    assert_eq!(body, vec![I32Const(42), LocalSet(0), End]);
}

#[test]
fn locals_are_expanded() {
    let code: &[u8] = &[
        0x01, 0x08, 0x02, 0x02, 0x7F, 0x01, 0x7E, 0x41, 0x00, 0x0B,
    ];
    let bytes = module_with(&[
        (1, &[0x01, 0x60, 0x00, 0x00]),
        (3, &[0x01, 0x00]),
        (10, code),
    ]);
    let module = decode(&bytes).unwrap();
    assert_eq!(
        module.funcs[0].locals,
        vec![ValType::I32, ValType::I32, ValType::I64]
    );
}

#[test]
fn code_count_mismatch() {
    let bytes = module_with(&[
        (1, &[0x01, 0x60, 0x00, 0x00]),
        (3, &[0x02, 0x00, 0x00]),
        (10, &[0x01, 0x02, 0x00, 0x0B]),
    ]);
    let error = decode_err(&bytes);
    assert_eq!(
        error.msg,
        "function and code section have inconsistent lengths"
    );
}

#[test]
fn missing_code_section() {
    let bytes = module_with(&[(1, &[0x01, 0x60, 0x00, 0x00]), (3, &[0x01, 0x00])]);
    let error = decode_err(&bytes);
    assert_eq!(
        error.msg,
        "function and code section have inconsistent lengths"
    );
}

#[test]
fn section_out_of_order() {
    let bytes = module_with(&[(5, &[0x00]), (4, &[0x00])]);
    assert_eq!(decode_err(&bytes).msg, "section out of order");

    let bytes = module_with(&[(1, &[0x00]), (1, &[0x00])]);
    assert_eq!(decode_err(&bytes).msg, "section out of order");
}

#[test]
fn section_size_mismatch() {
    let bytes = module_with(&[(1, &[0x00, 0x60])]);
    assert_eq!(decode_err(&bytes).msg, "section size mismatch");
}

#[test]
fn truncated_section() {
    let mut bytes = b"\0asm\x01\0\0\0".to_vec();
    bytes.extend_from_slice(&[0x01, 0x7F, 0x00]);
    assert_eq!(decode_err(&bytes).msg, "unexpected end");
}

#[test]
fn blocks_and_block_types() {
    let body = decode_body(&[0x02, 0x40, 0x0B, 0x0B]);
    assert_eq!(body, vec![Block(BlockType::Empty), End, End]);

    let body = decode_body(&[0x02, 0x6F, 0x0B, 0x0B]);
    assert_eq!(
        body,
        vec![
            Block(BlockType::Result(ValType::EXTERNREF)),
            End,
            End
        ]
    );

    let body = decode_body(&[0x03, 0x01, 0x0B, 0x0B]);
    assert_eq!(body, vec![Loop(BlockType::Func(1)), End, End]);
}

#[test]
fn try_delegate_nesting() {
    let body = decode_body(&[0x06, 0x40, 0x18, 0x00, 0x0B]);
    assert_eq!(body, vec![Try(BlockType::Empty), Delegate(0), End]);

    let error = decode_err(&func_module(&[0x18, 0x00, 0x0B]));
    assert_eq!(error.msg, "delegate outside of try block");
}

#[test]
fn br_table_targets() {
    let body = decode_body(&[0x0E, 0x02, 0x00, 0x01, 0x02, 0x0B]);
    assert_eq!(
        body,
        vec![
            BrTable {
                targets: vec![0, 1],
                default: 2,
            },
            End
        ]
    );
}

#[test]
fn typed_select() {
    let body = decode_body(&[0x1C, 0x01, 0x7F, 0x0B]);
    assert_eq!(body, vec![TypedSelect(ValType::I32), End]);

    let error = decode_err(&func_module(&[0x1C, 0x02, 0x7F, 0x7F, 0x0B]));
    assert_eq!(error.msg, "invalid result arity for select");
}

#[test]
fn mem_args() {
    let body = decode_body(&[0x28, 0x02, 0x08, 0x0B]);
    assert_eq!(
        body,
        vec![
            I32Load(MemArg {
                align: 2,
                offset: 8,
                memory: 0,
            }),
            End
        ]
    );

    // Bit 6 of the flags marks an explicit memory index.
    let body = decode_body(&[0x28, 0x42, 0x01, 0x08, 0x0B]);
    assert_eq!(
        body,
        vec![
            I32Load(MemArg {
                align: 2,
                offset: 8,
                memory: 1,
            }),
            End
        ]
    );
}

#[test]
fn float_consts_keep_bits() {
    let body = decode_body(&[0x43, 0x00, 0x00, 0xC0, 0x7F, 0x0B]);
    assert_eq!(body, vec![F32Const(0x7FC0_0000), End]);
}

#[test]
fn simd_instructions() {
    let mut raw = vec![0xFD, 0x0C];
    raw.extend(0u8..16);
    raw.push(0x0B);
    let body = decode_body(&raw);
    let lanes: Vec<u8> = (0..16).collect();
    assert_eq!(
        body,
        vec![
            V128Const(lanes.try_into().unwrap()),
            End
        ]
    );

    // Multi-byte sub-opcodes are LEB encoded: 0x105 is f32x4.relaxed_madd.
    let body = decode_body(&[0xFD, 0x85, 0x02, 0x0B]);
    assert_eq!(body, vec![F32x4RelaxedMadd, End]);

    let body = decode_body(&[0xFD, 0x53, 0x0B]);
    assert_eq!(body, vec![V128AnyTrue, End]);
}

#[test]
fn atomic_instructions() {
    let body = decode_body(&[0xFE, 0x00, 0x02, 0x00, 0x0B]);
    assert_eq!(
        body,
        vec![
            MemoryAtomicNotify(MemArg {
                align: 2,
                offset: 0,
                memory: 0,
            }),
            End
        ]
    );

    let body = decode_body(&[0xFE, 0x03, 0x00, 0x0B]);
    assert_eq!(body, vec![AtomicFence, End]);

    let error = decode_err(&func_module(&[0xFE, 0x03, 0x01, 0x0B]));
    assert_eq!(error.msg, "invalid atomic fence flags");
}

#[test]
fn gc_instructions() {
    let body = decode_body(&[0xFB, 0x15, 0x70, 0x0B]);
    assert_eq!(
        body,
        vec![
            RefTest(RefType {
                nullable: true,
                heap: HeapType::Func,
            }),
            End
        ]
    );

    let body = decode_body(&[0xFB, 0x18, 0x01, 0x00, 0x00, 0x6E, 0x0B]);
    assert_eq!(
        body,
        vec![
            BrOnCast {
                label: 0,
                from: RefType {
                    nullable: true,
                    heap: HeapType::Index(0),
                },
                to: RefType {
                    nullable: false,
                    heap: HeapType::Any,
                },
            },
            End
        ]
    );
}

#[test]
fn unknown_opcode() {
    let error = decode_err(&func_module(&[0x1D, 0x0B]));
    assert_eq!(error.msg, "unknown opcode 0x1d");
    // magic + version + three section headers land the body at 0x17
    assert_eq!(error.offset, 0x17);
}

#[test]
fn custom_sections_keep_position() {
    let mut bytes = b"\0asm\x01\0\0\0".to_vec();
    bytes.extend_from_slice(&[0x00, 0x03, 0x01, b'a', 0xAA]);
    bytes.extend_from_slice(&[0x01, 0x04, 0x01, 0x60, 0x00, 0x00]);
    bytes.extend_from_slice(&[0x00, 0x03, 0x01, b'b', 0xBB]);
    let module = decode(&bytes).unwrap();
    assert_eq!(
        module.customs,
        vec![
            Custom {
                name: "a".to_string(),
                bytes: vec![0xAA],
                after: 0,
            },
            Custom {
                name: "b".to_string(),
                bytes: vec![0xBB],
                after: 1,
            },
        ]
    );
}

#[test]
fn name_section() {
    let payload: &[u8] = &[
        0x04, b'n', b'a', b'm', b'e', // custom section name
        0x00, 0x02, 0x01, b'm', // module name "m"
        0x01, 0x04, 0x01, 0x00, 0x01, b'f', // func 0 named "f"
    ];
    let bytes = module_with(&[(0, payload)]);
    let module = decode(&bytes).unwrap();
    assert_eq!(module.names.module.as_deref(), Some("m"));
    assert_eq!(module.names.funcs.get(&0).map(String::as_str), Some("f"));
    assert!(module.customs.is_empty());
}

#[test]
fn malformed_name_section_is_kept_opaque() {
    let payload: &[u8] = &[0x04, b'n', b'a', b'm', b'e', 0x01, 0x05, 0x00];
    let bytes = module_with(&[(0, payload)]);
    let module = decode(&bytes).unwrap();
    assert!(module.names.is_empty());
    assert_eq!(module.customs.len(), 1);
    assert_eq!(module.customs[0].name, "name");
}

#[test]
fn unknown_section_id() {
    let bytes = module_with(&[(14, &[0x00])]);
    assert_eq!(decode_err(&bytes).msg, "unknown section id 14");
}
