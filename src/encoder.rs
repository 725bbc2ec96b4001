#[cfg(test)]
mod test;

use crate::instr::{BlockType, Instruction, MemArg};
use crate::module::{
    Custom, Data, DataKind, Elem, ElemItems, ElemKind, ExternalKind, Func, ImportKind, Module,
    Names,
};
use crate::types::{
    CompositeType, FieldType, HeapType, Limits, RecGroup, RefType, StorageType, SubType, ValType,
};

/// Standard sections in the order the binary format requires. The data
/// count section sits between element and code.
const SECTION_ORDER: [u8; 13] = [1, 2, 3, 4, 5, 13, 6, 7, 8, 9, 12, 10, 11];

/// Serializes a module in canonical form: minimal-length integers,
/// sections in required order, empty sections omitted, the name
/// section last. Decoding the result yields an equal module.
pub fn encode(module: &Module) -> Vec<u8> {
    let mut w = Writer::default();
    w.raw(b"\0asm\x01\0\0\0");
    w.customs(module, 0);
    for id in SECTION_ORDER {
        let payload = section_payload(module, id);
        if !payload.out.is_empty() {
            w.section(id, payload);
        }
        w.customs(module, id);
    }
    w.name_section(&module.names);
    w.out
}

fn section_payload(module: &Module, id: u8) -> Writer {
    let mut w = Writer::default();
    match id {
        1 => {
            if !module.types.is_empty() {
                w.u32(module.types.len() as u32);
                for group in &module.types {
                    w.rec_group(group);
                }
            }
        }
        2 => {
            if !module.imports.is_empty() {
                w.u32(module.imports.len() as u32);
                for import in &module.imports {
                    w.name(&import.module);
                    w.name(&import.name);
                    match &import.kind {
                        ImportKind::Func(type_idx) => {
                            w.byte(0x00);
                            w.u32(*type_idx);
                        }
                        ImportKind::Table(ty) => {
                            w.byte(0x01);
                            w.table_type(ty);
                        }
                        ImportKind::Memory(limits) => {
                            w.byte(0x02);
                            w.limits(limits);
                        }
                        ImportKind::Global(ty) => {
                            w.byte(0x03);
                            w.val_type(ty.val_type);
                            w.byte(ty.mutable.into());
                        }
                        ImportKind::Tag(tag) => {
                            w.byte(0x04);
                            w.byte(0x00);
                            w.u32(tag.type_idx);
                        }
                    }
                }
            }
        }
        3 => {
            if !module.funcs.is_empty() {
                w.u32(module.funcs.len() as u32);
                for func in &module.funcs {
                    w.u32(func.type_idx);
                }
            }
        }
        4 => {
            if !module.tables.is_empty() {
                w.u32(module.tables.len() as u32);
                for table in &module.tables {
                    w.table_type(table);
                }
            }
        }
        5 => {
            if !module.memories.is_empty() {
                w.u32(module.memories.len() as u32);
                for memory in &module.memories {
                    w.limits(memory);
                }
            }
        }
        13 => {
            if !module.tags.is_empty() {
                w.u32(module.tags.len() as u32);
                for tag in &module.tags {
                    w.byte(0x00);
                    w.u32(tag.type_idx);
                }
            }
        }
        6 => {
            if !module.globals.is_empty() {
                w.u32(module.globals.len() as u32);
                for global in &module.globals {
                    w.val_type(global.ty.val_type);
                    w.byte(global.ty.mutable.into());
                    w.expr(&global.init);
                }
            }
        }
        7 => {
            if !module.exports.is_empty() {
                w.u32(module.exports.len() as u32);
                for export in &module.exports {
                    w.name(&export.name);
                    w.byte(match export.kind {
                        ExternalKind::Func => 0x00,
                        ExternalKind::Table => 0x01,
                        ExternalKind::Memory => 0x02,
                        ExternalKind::Global => 0x03,
                        ExternalKind::Tag => 0x04,
                    });
                    w.u32(export.index);
                }
            }
        }
        8 => {
            if let Some(func) = module.start {
                w.u32(func);
            }
        }
        9 => {
            if !module.elems.is_empty() {
                w.u32(module.elems.len() as u32);
                for elem in &module.elems {
                    w.elem(elem);
                }
            }
        }
        12 => {
            if let Some(count) = module.data_count {
                w.u32(count);
            }
        }
        10 => {
            if !module.funcs.is_empty() {
                w.u32(module.funcs.len() as u32);
                for func in &module.funcs {
                    let entry = code_entry(func);
                    w.u32(entry.out.len() as u32);
                    w.raw(&entry.out);
                }
            }
        }
        11 => {
            if !module.datas.is_empty() {
                w.u32(module.datas.len() as u32);
                for data in &module.datas {
                    w.data(data);
                }
            }
        }
        _ => unreachable!(),
    }
    w
}

fn code_entry(func: &Func) -> Writer {
    let mut w = Writer::default();
    let mut runs: Vec<(u32, ValType)> = Vec::new();
    for &ty in &func.locals {
        match runs.last_mut() {
            Some((count, last)) if *last == ty => *count += 1,
            _ => runs.push((1, ty)),
        }
    }
    w.u32(runs.len() as u32);
    for (count, ty) in runs {
        w.u32(count);
        w.val_type(ty);
    }
    w.expr(&func.body);
    w
}

#[derive(Default)]
struct Writer {
    out: Vec<u8>,
}

impl Writer {
    fn byte(&mut self, byte: u8) {
        self.out.push(byte);
    }

    fn raw(&mut self, bytes: &[u8]) {
        self.out.extend_from_slice(bytes);
    }

    fn uleb(&mut self, mut value: u64) {
        loop {
            let byte = (value & 0x7F) as u8;
            value >>= 7;
            if value == 0 {
                self.out.push(byte);
                return;
            }
            self.out.push(byte | 0x80);
        }
    }

    fn sleb(&mut self, mut value: i64) {
        loop {
            let byte = (value & 0x7F) as u8;
            value >>= 7;
            let done = (value == 0 && byte & 0x40 == 0) || (value == -1 && byte & 0x40 != 0);
            self.out.push(if done { byte } else { byte | 0x80 });
            if done {
                return;
            }
        }
    }

    fn u32(&mut self, value: u32) {
        self.uleb(value.into());
    }

    fn u64(&mut self, value: u64) {
        self.uleb(value);
    }

    fn s32(&mut self, value: i32) {
        self.sleb(value.into());
    }

    fn s64(&mut self, value: i64) {
        self.sleb(value);
    }

    fn s33(&mut self, value: i64) {
        self.sleb(value);
    }

    fn f32_bits(&mut self, bits: u32) {
        self.raw(&bits.to_le_bytes());
    }

    fn f64_bits(&mut self, bits: u64) {
        self.raw(&bits.to_le_bytes());
    }

    fn name(&mut self, name: &str) {
        self.u32(name.len() as u32);
        self.raw(name.as_bytes());
    }

    fn section(&mut self, id: u8, payload: Writer) {
        self.byte(id);
        self.u32(payload.out.len() as u32);
        self.raw(&payload.out);
    }

    fn customs(&mut self, module: &Module, after: u8) {
        for custom in &module.customs {
            if custom.after == after {
                self.custom(custom);
            }
        }
    }

    fn custom(&mut self, custom: &Custom) {
        let mut payload = Writer::default();
        payload.name(&custom.name);
        payload.raw(&custom.bytes);
        self.section(0, payload);
    }

    fn name_section(&mut self, names: &Names) {
        if names.is_empty() {
            return;
        }
        let mut payload = Writer::default();
        payload.name("name");
        if let Some(module_name) = &names.module {
            let mut sub = Writer::default();
            sub.name(module_name);
            payload.subsection(0, sub);
        }
        payload.name_map(1, &names.funcs);
        payload.indirect_name_map(2, &names.locals);
        payload.name_map(4, &names.types);
        payload.name_map(5, &names.tables);
        payload.name_map(6, &names.memories);
        payload.name_map(7, &names.globals);
        payload.name_map(8, &names.elems);
        payload.name_map(9, &names.datas);
        payload.indirect_name_map(10, &names.fields);
        payload.name_map(11, &names.tags);
        self.section(0, payload);
    }

    fn subsection(&mut self, id: u8, payload: Writer) {
        self.byte(id);
        self.u32(payload.out.len() as u32);
        self.raw(&payload.out);
    }

    fn name_map(&mut self, id: u8, map: &std::collections::BTreeMap<u32, String>) {
        if map.is_empty() {
            return;
        }
        let mut sub = Writer::default();
        sub.u32(map.len() as u32);
        for (idx, name) in map {
            sub.u32(*idx);
            sub.name(name);
        }
        self.subsection(id, sub);
    }

    fn indirect_name_map(
        &mut self,
        id: u8,
        map: &std::collections::BTreeMap<u32, std::collections::BTreeMap<u32, String>>,
    ) {
        if map.is_empty() {
            return;
        }
        let mut sub = Writer::default();
        sub.u32(map.len() as u32);
        for (idx, inner) in map {
            sub.u32(*idx);
            sub.u32(inner.len() as u32);
            for (inner_idx, name) in inner {
                sub.u32(*inner_idx);
                sub.name(name);
            }
        }
        self.subsection(id, sub);
    }

    // Types.

    fn val_type(&mut self, ty: ValType) {
        match ty {
            ValType::I32 => self.byte(0x7F),
            ValType::I64 => self.byte(0x7E),
            ValType::F32 => self.byte(0x7D),
            ValType::F64 => self.byte(0x7C),
            ValType::V128 => self.byte(0x7B),
            ValType::Ref(ty) => self.ref_type(ty),
        }
    }

    fn ref_type(&mut self, ty: RefType) {
        // Nullable references to abstract heaps have one-byte shorthands.
        if ty.nullable {
            if let Some(byte) = abstract_heap_byte(ty.heap) {
                return self.byte(byte);
            }
            self.byte(0x63);
        } else {
            self.byte(0x64);
        }
        self.heap_type(ty.heap);
    }

    fn heap_type(&mut self, heap: HeapType) {
        match abstract_heap_byte(heap) {
            Some(byte) => self.byte(byte),
            None => match heap {
                HeapType::Index(idx) => self.s33(idx.into()),
                _ => unreachable!(),
            },
        }
    }

    fn storage_type(&mut self, storage: StorageType) {
        match storage {
            StorageType::I8 => self.byte(0x78),
            StorageType::I16 => self.byte(0x77),
            StorageType::Val(ty) => self.val_type(ty),
        }
    }

    fn field_type(&mut self, field: &FieldType) {
        self.storage_type(field.storage);
        self.byte(field.mutable.into());
    }

    fn composite_type(&mut self, composite: &CompositeType) {
        match composite {
            CompositeType::Func(ty) => {
                self.byte(0x60);
                self.u32(ty.params.len() as u32);
                for &param in &ty.params {
                    self.val_type(param);
                }
                self.u32(ty.results.len() as u32);
                for &result in &ty.results {
                    self.val_type(result);
                }
            }
            CompositeType::Struct(fields) => {
                self.byte(0x5F);
                self.u32(fields.len() as u32);
                for field in fields {
                    self.field_type(field);
                }
            }
            CompositeType::Array(field) => {
                self.byte(0x5E);
                self.field_type(field);
            }
        }
    }

    fn sub_type(&mut self, sub: &SubType) {
        if sub.is_final && sub.supertype.is_none() {
            return self.composite_type(&sub.composite);
        }
        self.byte(if sub.is_final { 0x4F } else { 0x50 });
        match sub.supertype {
            Some(idx) => {
                self.u32(1);
                self.u32(idx);
            }
            None => self.u32(0),
        }
        self.composite_type(&sub.composite);
    }

    fn rec_group(&mut self, group: &RecGroup) {
        if group.explicit_rec || group.types.len() != 1 {
            self.byte(0x4E);
            self.u32(group.types.len() as u32);
            for sub in &group.types {
                self.sub_type(sub);
            }
        } else {
            self.sub_type(&group.types[0]);
        }
    }

    fn limits(&mut self, limits: &Limits) {
        let mut flags = 0u8;
        if limits.max.is_some() {
            flags |= 0x01;
        }
        if limits.shared {
            flags |= 0x02;
        }
        if limits.memory64 {
            flags |= 0x04;
        }
        self.byte(flags);
        if limits.memory64 {
            self.u64(limits.min);
            if let Some(max) = limits.max {
                self.u64(max);
            }
        } else {
            self.u32(limits.min as u32);
            if let Some(max) = limits.max {
                self.u32(max as u32);
            }
        }
    }

    fn table_type(&mut self, table: &crate::types::TableType) {
        self.ref_type(table.element);
        self.limits(&table.limits);
    }

    fn elem(&mut self, elem: &Elem) {
        let exprs = matches!(elem.items, ElemItems::Expressions(_));
        let plain_funcref = elem.ty == RefType::FUNCREF;
        let flags: u32 = match &elem.kind {
            ElemKind::Active { table: 0, .. } if plain_funcref || !exprs => {
                if exprs {
                    4
                } else {
                    0
                }
            }
            ElemKind::Active { .. } => {
                if exprs {
                    6
                } else {
                    2
                }
            }
            ElemKind::Passive => {
                if exprs {
                    5
                } else {
                    1
                }
            }
            ElemKind::Declared => {
                if exprs {
                    7
                } else {
                    3
                }
            }
        };
        self.u32(flags);
        if let ElemKind::Active { table, offset } = &elem.kind {
            if flags & 0x02 != 0 {
                self.u32(*table);
            }
            self.expr(offset);
        }
        if flags & 0x03 != 0 {
            if exprs {
                self.ref_type(elem.ty);
            } else {
                self.byte(0x00);
            }
        }
        match &elem.items {
            ElemItems::Functions(funcs) => {
                self.u32(funcs.len() as u32);
                for &func in funcs {
                    self.u32(func);
                }
            }
            ElemItems::Expressions(items) => {
                self.u32(items.len() as u32);
                for item in items {
                    self.expr(item);
                }
            }
        }
    }

    fn data(&mut self, data: &Data) {
        match &data.kind {
            DataKind::Active { memory: 0, offset } => {
                self.u32(0);
                self.expr(offset);
            }
            DataKind::Active { memory, offset } => {
                self.u32(2);
                self.u32(*memory);
                self.expr(offset);
            }
            DataKind::Passive => self.u32(1),
        }
        self.u32(data.bytes.len() as u32);
        self.raw(&data.bytes);
    }

    // Instructions.

    fn expr(&mut self, expr: &[Instruction]) {
        for instr in expr {
            self.instr(instr);
        }
    }

    fn block_type(&mut self, bt: BlockType) {
        match bt {
            BlockType::Empty => self.byte(0x40),
            BlockType::Result(ty) => self.val_type(ty),
            BlockType::Func(idx) => self.s33(idx.into()),
        }
    }

    fn mem_arg(&mut self, arg: MemArg) {
        if arg.memory != 0 {
            self.u32(arg.align | 0x40);
            self.u32(arg.memory);
        } else {
            self.u32(arg.align);
        }
        self.u64(arg.offset);
    }

    fn misc(&mut self, op: u32) {
        self.byte(0xFC);
        self.u32(op);
    }

    fn simd(&mut self, op: u32) {
        self.byte(0xFD);
        self.u32(op);
    }

    fn simd_mem(&mut self, op: u32, arg: MemArg) {
        self.simd(op);
        self.mem_arg(arg);
    }

    fn simd_lane(&mut self, op: u32, lane: u8) {
        self.simd(op);
        self.byte(lane);
    }

    fn atomic(&mut self, op: u32, arg: MemArg) {
        self.byte(0xFE);
        self.u32(op);
        self.mem_arg(arg);
    }

    fn gc(&mut self, op: u32) {
        self.byte(0xFB);
        self.u32(op);
    }

    fn cast_flags(&mut self, op: u32, label: u32, from: RefType, to: RefType) {
        self.gc(op);
        let flags = u8::from(from.nullable) | u8::from(to.nullable) << 1;
        self.byte(flags);
        self.u32(label);
        self.heap_type(from.heap);
        self.heap_type(to.heap);
    }

    fn instr(&mut self, instr: &Instruction) {
        use Instruction::*;
        match *instr {
            Unreachable => self.byte(0x00),
            Nop => self.byte(0x01),
            Block(bt) => {
                self.byte(0x02);
                self.block_type(bt);
            }
            Loop(bt) => {
                self.byte(0x03);
                self.block_type(bt);
            }
            If(bt) => {
                self.byte(0x04);
                self.block_type(bt);
            }
            Else => self.byte(0x05),
            Try(bt) => {
                self.byte(0x06);
                self.block_type(bt);
            }
            Catch(tag) => {
                self.byte(0x07);
                self.u32(tag);
            }
            Throw(tag) => {
                self.byte(0x08);
                self.u32(tag);
            }
            Rethrow(depth) => {
                self.byte(0x09);
                self.u32(depth);
            }
            End => self.byte(0x0B),
            Br(label) => {
                self.byte(0x0C);
                self.u32(label);
            }
            BrIf(label) => {
                self.byte(0x0D);
                self.u32(label);
            }
            BrTable {
                ref targets,
                default,
            } => {
                self.byte(0x0E);
                self.u32(targets.len() as u32);
                for &target in targets {
                    self.u32(target);
                }
                self.u32(default);
            }
            Return => self.byte(0x0F),
            Call(func) => {
                self.byte(0x10);
                self.u32(func);
            }
            CallIndirect { type_idx, table } => {
                self.byte(0x11);
                self.u32(type_idx);
                self.u32(table);
            }
            ReturnCall(func) => {
                self.byte(0x12);
                self.u32(func);
            }
            ReturnCallIndirect { type_idx, table } => {
                self.byte(0x13);
                self.u32(type_idx);
                self.u32(table);
            }
            CallRef(type_idx) => {
                self.byte(0x14);
                self.u32(type_idx);
            }
            ReturnCallRef(type_idx) => {
                self.byte(0x15);
                self.u32(type_idx);
            }
            Delegate(depth) => {
                self.byte(0x18);
                self.u32(depth);
            }
            CatchAll => self.byte(0x19),
            Drop => self.byte(0x1A),
            Select => self.byte(0x1B),
            TypedSelect(ty) => {
                self.byte(0x1C);
                self.u32(1);
                self.val_type(ty);
            }
            LocalGet(idx) => {
                self.byte(0x20);
                self.u32(idx);
            }
            LocalSet(idx) => {
                self.byte(0x21);
                self.u32(idx);
            }
            LocalTee(idx) => {
                self.byte(0x22);
                self.u32(idx);
            }
            GlobalGet(idx) => {
                self.byte(0x23);
                self.u32(idx);
            }
            GlobalSet(idx) => {
                self.byte(0x24);
                self.u32(idx);
            }
            TableGet(idx) => {
                self.byte(0x25);
                self.u32(idx);
            }
            TableSet(idx) => {
                self.byte(0x26);
                self.u32(idx);
            }
            I32Load(arg) => {
                self.byte(0x28);
                self.mem_arg(arg);
            }
            I64Load(arg) => {
                self.byte(0x29);
                self.mem_arg(arg);
            }
            F32Load(arg) => {
                self.byte(0x2A);
                self.mem_arg(arg);
            }
            F64Load(arg) => {
                self.byte(0x2B);
                self.mem_arg(arg);
            }
            I32Load8S(arg) => {
                self.byte(0x2C);
                self.mem_arg(arg);
            }
            I32Load8U(arg) => {
                self.byte(0x2D);
                self.mem_arg(arg);
            }
            I32Load16S(arg) => {
                self.byte(0x2E);
                self.mem_arg(arg);
            }
            I32Load16U(arg) => {
                self.byte(0x2F);
                self.mem_arg(arg);
            }
            I64Load8S(arg) => {
                self.byte(0x30);
                self.mem_arg(arg);
            }
            I64Load8U(arg) => {
                self.byte(0x31);
                self.mem_arg(arg);
            }
            I64Load16S(arg) => {
                self.byte(0x32);
                self.mem_arg(arg);
            }
            I64Load16U(arg) => {
                self.byte(0x33);
                self.mem_arg(arg);
            }
            I64Load32S(arg) => {
                self.byte(0x34);
                self.mem_arg(arg);
            }
            I64Load32U(arg) => {
                self.byte(0x35);
                self.mem_arg(arg);
            }
            I32Store(arg) => {
                self.byte(0x36);
                self.mem_arg(arg);
            }
            I64Store(arg) => {
                self.byte(0x37);
                self.mem_arg(arg);
            }
            F32Store(arg) => {
                self.byte(0x38);
                self.mem_arg(arg);
            }
            F64Store(arg) => {
                self.byte(0x39);
                self.mem_arg(arg);
            }
            I32Store8(arg) => {
                self.byte(0x3A);
                self.mem_arg(arg);
            }
            I32Store16(arg) => {
                self.byte(0x3B);
                self.mem_arg(arg);
            }
            I64Store8(arg) => {
                self.byte(0x3C);
                self.mem_arg(arg);
            }
            I64Store16(arg) => {
                self.byte(0x3D);
                self.mem_arg(arg);
            }
            I64Store32(arg) => {
                self.byte(0x3E);
                self.mem_arg(arg);
            }
            MemorySize(mem) => {
                self.byte(0x3F);
                self.u32(mem);
            }
            MemoryGrow(mem) => {
                self.byte(0x40);
                self.u32(mem);
            }
            I32Const(value) => {
                self.byte(0x41);
                self.s32(value);
            }
            I64Const(value) => {
                self.byte(0x42);
                self.s64(value);
            }
            F32Const(bits) => {
                self.byte(0x43);
                self.f32_bits(bits);
            }
            F64Const(bits) => {
                self.byte(0x44);
                self.f64_bits(bits);
            }
            I32Eqz => self.byte(0x45),
            I32Eq => self.byte(0x46),
            I32Ne => self.byte(0x47),
            I32LtS => self.byte(0x48),
            I32LtU => self.byte(0x49),
            I32GtS => self.byte(0x4A),
            I32GtU => self.byte(0x4B),
            I32LeS => self.byte(0x4C),
            I32LeU => self.byte(0x4D),
            I32GeS => self.byte(0x4E),
            I32GeU => self.byte(0x4F),
            I64Eqz => self.byte(0x50),
            I64Eq => self.byte(0x51),
            I64Ne => self.byte(0x52),
            I64LtS => self.byte(0x53),
            I64LtU => self.byte(0x54),
            I64GtS => self.byte(0x55),
            I64GtU => self.byte(0x56),
            I64LeS => self.byte(0x57),
            I64LeU => self.byte(0x58),
            I64GeS => self.byte(0x59),
            I64GeU => self.byte(0x5A),
            F32Eq => self.byte(0x5B),
            F32Ne => self.byte(0x5C),
            F32Lt => self.byte(0x5D),
            F32Gt => self.byte(0x5E),
            F32Le => self.byte(0x5F),
            F32Ge => self.byte(0x60),
            F64Eq => self.byte(0x61),
            F64Ne => self.byte(0x62),
            F64Lt => self.byte(0x63),
            F64Gt => self.byte(0x64),
            F64Le => self.byte(0x65),
            F64Ge => self.byte(0x66),
            I32Clz => self.byte(0x67),
            I32Ctz => self.byte(0x68),
            I32Popcnt => self.byte(0x69),
            I32Add => self.byte(0x6A),
            I32Sub => self.byte(0x6B),
            I32Mul => self.byte(0x6C),
            I32DivS => self.byte(0x6D),
            I32DivU => self.byte(0x6E),
            I32RemS => self.byte(0x6F),
            I32RemU => self.byte(0x70),
            I32And => self.byte(0x71),
            I32Or => self.byte(0x72),
            I32Xor => self.byte(0x73),
            I32Shl => self.byte(0x74),
            I32ShrS => self.byte(0x75),
            I32ShrU => self.byte(0x76),
            I32Rotl => self.byte(0x77),
            I32Rotr => self.byte(0x78),
            I64Clz => self.byte(0x79),
            I64Ctz => self.byte(0x7A),
            I64Popcnt => self.byte(0x7B),
            I64Add => self.byte(0x7C),
            I64Sub => self.byte(0x7D),
            I64Mul => self.byte(0x7E),
            I64DivS => self.byte(0x7F),
            I64DivU => self.byte(0x80),
            I64RemS => self.byte(0x81),
            I64RemU => self.byte(0x82),
            I64And => self.byte(0x83),
            I64Or => self.byte(0x84),
            I64Xor => self.byte(0x85),
            I64Shl => self.byte(0x86),
            I64ShrS => self.byte(0x87),
            I64ShrU => self.byte(0x88),
            I64Rotl => self.byte(0x89),
            I64Rotr => self.byte(0x8A),
            F32Abs => self.byte(0x8B),
            F32Neg => self.byte(0x8C),
            F32Ceil => self.byte(0x8D),
            F32Floor => self.byte(0x8E),
            F32Trunc => self.byte(0x8F),
            F32Nearest => self.byte(0x90),
            F32Sqrt => self.byte(0x91),
            F32Add => self.byte(0x92),
            F32Sub => self.byte(0x93),
            F32Mul => self.byte(0x94),
            F32Div => self.byte(0x95),
            F32Min => self.byte(0x96),
            F32Max => self.byte(0x97),
            F32Copysign => self.byte(0x98),
            F64Abs => self.byte(0x99),
            F64Neg => self.byte(0x9A),
            F64Ceil => self.byte(0x9B),
            F64Floor => self.byte(0x9C),
            F64Trunc => self.byte(0x9D),
            F64Nearest => self.byte(0x9E),
            F64Sqrt => self.byte(0x9F),
            F64Add => self.byte(0xA0),
            F64Sub => self.byte(0xA1),
            F64Mul => self.byte(0xA2),
            F64Div => self.byte(0xA3),
            F64Min => self.byte(0xA4),
            F64Max => self.byte(0xA5),
            F64Copysign => self.byte(0xA6),
            I32WrapI64 => self.byte(0xA7),
            I32TruncF32S => self.byte(0xA8),
            I32TruncF32U => self.byte(0xA9),
            I32TruncF64S => self.byte(0xAA),
            I32TruncF64U => self.byte(0xAB),
            I64ExtendI32S => self.byte(0xAC),
            I64ExtendI32U => self.byte(0xAD),
            I64TruncF32S => self.byte(0xAE),
            I64TruncF32U => self.byte(0xAF),
            I64TruncF64S => self.byte(0xB0),
            I64TruncF64U => self.byte(0xB1),
            F32ConvertI32S => self.byte(0xB2),
            F32ConvertI32U => self.byte(0xB3),
            F32ConvertI64S => self.byte(0xB4),
            F32ConvertI64U => self.byte(0xB5),
            F32DemoteF64 => self.byte(0xB6),
            F64ConvertI32S => self.byte(0xB7),
            F64ConvertI32U => self.byte(0xB8),
            F64ConvertI64S => self.byte(0xB9),
            F64ConvertI64U => self.byte(0xBA),
            F64PromoteF32 => self.byte(0xBB),
            I32ReinterpretF32 => self.byte(0xBC),
            I64ReinterpretF64 => self.byte(0xBD),
            F32ReinterpretI32 => self.byte(0xBE),
            F64ReinterpretI64 => self.byte(0xBF),
            I32Extend8S => self.byte(0xC0),
            I32Extend16S => self.byte(0xC1),
            I64Extend8S => self.byte(0xC2),
            I64Extend16S => self.byte(0xC3),
            I64Extend32S => self.byte(0xC4),
            RefNull(heap) => {
                self.byte(0xD0);
                self.heap_type(heap);
            }
            RefIsNull => self.byte(0xD1),
            RefFunc(func) => {
                self.byte(0xD2);
                self.u32(func);
            }
            RefEq => self.byte(0xD3),
            RefAsNonNull => self.byte(0xD4),
            BrOnNull(label) => {
                self.byte(0xD5);
                self.u32(label);
            }
            BrOnNonNull(label) => {
                self.byte(0xD6);
                self.u32(label);
            }

            I32TruncSatF32S => self.misc(0),
            I32TruncSatF32U => self.misc(1),
            I32TruncSatF64S => self.misc(2),
            I32TruncSatF64U => self.misc(3),
            I64TruncSatF32S => self.misc(4),
            I64TruncSatF32U => self.misc(5),
            I64TruncSatF64S => self.misc(6),
            I64TruncSatF64U => self.misc(7),
            MemoryInit { data, memory } => {
                self.misc(8);
                self.u32(data);
                self.u32(memory);
            }
            DataDrop(data) => {
                self.misc(9);
                self.u32(data);
            }
            MemoryCopy { dst, src } => {
                self.misc(10);
                self.u32(dst);
                self.u32(src);
            }
            MemoryFill(mem) => {
                self.misc(11);
                self.u32(mem);
            }
            TableInit { elem, table } => {
                self.misc(12);
                self.u32(elem);
                self.u32(table);
            }
            ElemDrop(elem) => {
                self.misc(13);
                self.u32(elem);
            }
            TableCopy { dst, src } => {
                self.misc(14);
                self.u32(dst);
                self.u32(src);
            }
            TableGrow(table) => {
                self.misc(15);
                self.u32(table);
            }
            TableSize(table) => {
                self.misc(16);
                self.u32(table);
            }
            TableFill(table) => {
                self.misc(17);
                self.u32(table);
            }

            StructNew(idx) => {
                self.gc(0);
                self.u32(idx);
            }
            StructNewDefault(idx) => {
                self.gc(1);
                self.u32(idx);
            }
            StructGet { type_idx, field } => {
                self.gc(2);
                self.u32(type_idx);
                self.u32(field);
            }
            StructGetS { type_idx, field } => {
                self.gc(3);
                self.u32(type_idx);
                self.u32(field);
            }
            StructGetU { type_idx, field } => {
                self.gc(4);
                self.u32(type_idx);
                self.u32(field);
            }
            StructSet { type_idx, field } => {
                self.gc(5);
                self.u32(type_idx);
                self.u32(field);
            }
            ArrayNew(idx) => {
                self.gc(6);
                self.u32(idx);
            }
            ArrayNewDefault(idx) => {
                self.gc(7);
                self.u32(idx);
            }
            ArrayNewFixed { type_idx, size } => {
                self.gc(8);
                self.u32(type_idx);
                self.u32(size);
            }
            ArrayNewData { type_idx, data } => {
                self.gc(9);
                self.u32(type_idx);
                self.u32(data);
            }
            ArrayNewElem { type_idx, elem } => {
                self.gc(10);
                self.u32(type_idx);
                self.u32(elem);
            }
            ArrayGet(idx) => {
                self.gc(11);
                self.u32(idx);
            }
            ArrayGetS(idx) => {
                self.gc(12);
                self.u32(idx);
            }
            ArrayGetU(idx) => {
                self.gc(13);
                self.u32(idx);
            }
            ArraySet(idx) => {
                self.gc(14);
                self.u32(idx);
            }
            ArrayLen => self.gc(15),
            ArrayFill(idx) => {
                self.gc(16);
                self.u32(idx);
            }
            ArrayCopy { dst, src } => {
                self.gc(17);
                self.u32(dst);
                self.u32(src);
            }
            ArrayInitData { type_idx, data } => {
                self.gc(18);
                self.u32(type_idx);
                self.u32(data);
            }
            ArrayInitElem { type_idx, elem } => {
                self.gc(19);
                self.u32(type_idx);
                self.u32(elem);
            }
            RefTest(ty) => {
                self.gc(if ty.nullable { 21 } else { 20 });
                self.heap_type(ty.heap);
            }
            RefCast(ty) => {
                self.gc(if ty.nullable { 23 } else { 22 });
                self.heap_type(ty.heap);
            }
            BrOnCast { label, from, to } => self.cast_flags(24, label, from, to),
            BrOnCastFail { label, from, to } => self.cast_flags(25, label, from, to),
            AnyConvertExtern => self.gc(26),
            ExternConvertAny => self.gc(27),
            RefI31 => self.gc(28),
            I31GetS => self.gc(29),
            I31GetU => self.gc(30),

            V128Load(arg) => self.simd_mem(0, arg),
            V128Load8x8S(arg) => self.simd_mem(1, arg),
            V128Load8x8U(arg) => self.simd_mem(2, arg),
            V128Load16x4S(arg) => self.simd_mem(3, arg),
            V128Load16x4U(arg) => self.simd_mem(4, arg),
            V128Load32x2S(arg) => self.simd_mem(5, arg),
            V128Load32x2U(arg) => self.simd_mem(6, arg),
            V128Load8Splat(arg) => self.simd_mem(7, arg),
            V128Load16Splat(arg) => self.simd_mem(8, arg),
            V128Load32Splat(arg) => self.simd_mem(9, arg),
            V128Load64Splat(arg) => self.simd_mem(10, arg),
            V128Store(arg) => self.simd_mem(11, arg),
            V128Const(lanes) => {
                self.simd(12);
                self.raw(&lanes);
            }
            I8x16Shuffle(lanes) => {
                self.simd(13);
                self.raw(&lanes);
            }
            I8x16Swizzle => self.simd(14),
            I8x16Splat => self.simd(15),
            I16x8Splat => self.simd(16),
            I32x4Splat => self.simd(17),
            I64x2Splat => self.simd(18),
            F32x4Splat => self.simd(19),
            F64x2Splat => self.simd(20),
            I8x16ExtractLaneS(lane) => self.simd_lane(21, lane),
            I8x16ExtractLaneU(lane) => self.simd_lane(22, lane),
            I8x16ReplaceLane(lane) => self.simd_lane(23, lane),
            I16x8ExtractLaneS(lane) => self.simd_lane(24, lane),
            I16x8ExtractLaneU(lane) => self.simd_lane(25, lane),
            I16x8ReplaceLane(lane) => self.simd_lane(26, lane),
            I32x4ExtractLane(lane) => self.simd_lane(27, lane),
            I32x4ReplaceLane(lane) => self.simd_lane(28, lane),
            I64x2ExtractLane(lane) => self.simd_lane(29, lane),
            I64x2ReplaceLane(lane) => self.simd_lane(30, lane),
            F32x4ExtractLane(lane) => self.simd_lane(31, lane),
            F32x4ReplaceLane(lane) => self.simd_lane(32, lane),
            F64x2ExtractLane(lane) => self.simd_lane(33, lane),
            F64x2ReplaceLane(lane) => self.simd_lane(34, lane),
            I8x16Eq => self.simd(35),
            I8x16Ne => self.simd(36),
            I8x16LtS => self.simd(37),
            I8x16LtU => self.simd(38),
            I8x16GtS => self.simd(39),
            I8x16GtU => self.simd(40),
            I8x16LeS => self.simd(41),
            I8x16LeU => self.simd(42),
            I8x16GeS => self.simd(43),
            I8x16GeU => self.simd(44),
            I16x8Eq => self.simd(45),
            I16x8Ne => self.simd(46),
            I16x8LtS => self.simd(47),
            I16x8LtU => self.simd(48),
            I16x8GtS => self.simd(49),
            I16x8GtU => self.simd(50),
            I16x8LeS => self.simd(51),
            I16x8LeU => self.simd(52),
            I16x8GeS => self.simd(53),
            I16x8GeU => self.simd(54),
            I32x4Eq => self.simd(55),
            I32x4Ne => self.simd(56),
            I32x4LtS => self.simd(57),
            I32x4LtU => self.simd(58),
            I32x4GtS => self.simd(59),
            I32x4GtU => self.simd(60),
            I32x4LeS => self.simd(61),
            I32x4LeU => self.simd(62),
            I32x4GeS => self.simd(63),
            I32x4GeU => self.simd(64),
            F32x4Eq => self.simd(65),
            F32x4Ne => self.simd(66),
            F32x4Lt => self.simd(67),
            F32x4Gt => self.simd(68),
            F32x4Le => self.simd(69),
            F32x4Ge => self.simd(70),
            F64x2Eq => self.simd(71),
            F64x2Ne => self.simd(72),
            F64x2Lt => self.simd(73),
            F64x2Gt => self.simd(74),
            F64x2Le => self.simd(75),
            F64x2Ge => self.simd(76),
            V128Not => self.simd(77),
            V128And => self.simd(78),
            V128AndNot => self.simd(79),
            V128Or => self.simd(80),
            V128Xor => self.simd(81),
            V128Bitselect => self.simd(82),
            V128AnyTrue => self.simd(83),
            V128Load8Lane(arg, lane) => {
                self.simd_mem(84, arg);
                self.byte(lane);
            }
            V128Load16Lane(arg, lane) => {
                self.simd_mem(85, arg);
                self.byte(lane);
            }
            V128Load32Lane(arg, lane) => {
                self.simd_mem(86, arg);
                self.byte(lane);
            }
            V128Load64Lane(arg, lane) => {
                self.simd_mem(87, arg);
                self.byte(lane);
            }
            V128Store8Lane(arg, lane) => {
                self.simd_mem(88, arg);
                self.byte(lane);
            }
            V128Store16Lane(arg, lane) => {
                self.simd_mem(89, arg);
                self.byte(lane);
            }
            V128Store32Lane(arg, lane) => {
                self.simd_mem(90, arg);
                self.byte(lane);
            }
            V128Store64Lane(arg, lane) => {
                self.simd_mem(91, arg);
                self.byte(lane);
            }
            V128Load32Zero(arg) => self.simd_mem(92, arg),
            V128Load64Zero(arg) => self.simd_mem(93, arg),
            F32x4DemoteF64x2Zero => self.simd(94),
            F64x2PromoteLowF32x4 => self.simd(95),
            I8x16Abs => self.simd(96),
            I8x16Neg => self.simd(97),
            I8x16Popcnt => self.simd(98),
            I8x16AllTrue => self.simd(99),
            I8x16Bitmask => self.simd(100),
            I8x16NarrowI16x8S => self.simd(101),
            I8x16NarrowI16x8U => self.simd(102),
            F32x4Ceil => self.simd(103),
            F32x4Floor => self.simd(104),
            F32x4Trunc => self.simd(105),
            F32x4Nearest => self.simd(106),
            I8x16Shl => self.simd(107),
            I8x16ShrS => self.simd(108),
            I8x16ShrU => self.simd(109),
            I8x16Add => self.simd(110),
            I8x16AddSatS => self.simd(111),
            I8x16AddSatU => self.simd(112),
            I8x16Sub => self.simd(113),
            I8x16SubSatS => self.simd(114),
            I8x16SubSatU => self.simd(115),
            F64x2Ceil => self.simd(116),
            F64x2Floor => self.simd(117),
            I8x16MinS => self.simd(118),
            I8x16MinU => self.simd(119),
            I8x16MaxS => self.simd(120),
            I8x16MaxU => self.simd(121),
            F64x2Trunc => self.simd(122),
            I8x16AvgrU => self.simd(123),
            I16x8ExtaddPairwiseI8x16S => self.simd(124),
            I16x8ExtaddPairwiseI8x16U => self.simd(125),
            I32x4ExtaddPairwiseI16x8S => self.simd(126),
            I32x4ExtaddPairwiseI16x8U => self.simd(127),
            I16x8Abs => self.simd(128),
            I16x8Neg => self.simd(129),
            I16x8Q15MulrSatS => self.simd(130),
            I16x8AllTrue => self.simd(131),
            I16x8Bitmask => self.simd(132),
            I16x8NarrowI32x4S => self.simd(133),
            I16x8NarrowI32x4U => self.simd(134),
            I16x8ExtendLowI8x16S => self.simd(135),
            I16x8ExtendHighI8x16S => self.simd(136),
            I16x8ExtendLowI8x16U => self.simd(137),
            I16x8ExtendHighI8x16U => self.simd(138),
            I16x8Shl => self.simd(139),
            I16x8ShrS => self.simd(140),
            I16x8ShrU => self.simd(141),
            I16x8Add => self.simd(142),
            I16x8AddSatS => self.simd(143),
            I16x8AddSatU => self.simd(144),
            I16x8Sub => self.simd(145),
            I16x8SubSatS => self.simd(146),
            I16x8SubSatU => self.simd(147),
            F64x2Nearest => self.simd(148),
            I16x8Mul => self.simd(149),
            I16x8MinS => self.simd(150),
            I16x8MinU => self.simd(151),
            I16x8MaxS => self.simd(152),
            I16x8MaxU => self.simd(153),
            I16x8AvgrU => self.simd(155),
            I16x8ExtmulLowI8x16S => self.simd(156),
            I16x8ExtmulHighI8x16S => self.simd(157),
            I16x8ExtmulLowI8x16U => self.simd(158),
            I16x8ExtmulHighI8x16U => self.simd(159),
            I32x4Abs => self.simd(160),
            I32x4Neg => self.simd(161),
            I32x4AllTrue => self.simd(163),
            I32x4Bitmask => self.simd(164),
            I32x4ExtendLowI16x8S => self.simd(167),
            I32x4ExtendHighI16x8S => self.simd(168),
            I32x4ExtendLowI16x8U => self.simd(169),
            I32x4ExtendHighI16x8U => self.simd(170),
            I32x4Shl => self.simd(171),
            I32x4ShrS => self.simd(172),
            I32x4ShrU => self.simd(173),
            I32x4Add => self.simd(174),
            I32x4Sub => self.simd(177),
            I32x4Mul => self.simd(181),
            I32x4MinS => self.simd(182),
            I32x4MinU => self.simd(183),
            I32x4MaxS => self.simd(184),
            I32x4MaxU => self.simd(185),
            I32x4DotI16x8S => self.simd(186),
            I32x4ExtmulLowI16x8S => self.simd(188),
            I32x4ExtmulHighI16x8S => self.simd(189),
            I32x4ExtmulLowI16x8U => self.simd(190),
            I32x4ExtmulHighI16x8U => self.simd(191),
            I64x2Abs => self.simd(192),
            I64x2Neg => self.simd(193),
            I64x2AllTrue => self.simd(195),
            I64x2Bitmask => self.simd(196),
            I64x2ExtendLowI32x4S => self.simd(199),
            I64x2ExtendHighI32x4S => self.simd(200),
            I64x2ExtendLowI32x4U => self.simd(201),
            I64x2ExtendHighI32x4U => self.simd(202),
            I64x2Shl => self.simd(203),
            I64x2ShrS => self.simd(204),
            I64x2ShrU => self.simd(205),
            I64x2Add => self.simd(206),
            I64x2Sub => self.simd(209),
            I64x2Mul => self.simd(213),
            I64x2Eq => self.simd(214),
            I64x2Ne => self.simd(215),
            I64x2LtS => self.simd(216),
            I64x2GtS => self.simd(217),
            I64x2LeS => self.simd(218),
            I64x2GeS => self.simd(219),
            I64x2ExtmulLowI32x4S => self.simd(220),
            I64x2ExtmulHighI32x4S => self.simd(221),
            I64x2ExtmulLowI32x4U => self.simd(222),
            I64x2ExtmulHighI32x4U => self.simd(223),
            F32x4Abs => self.simd(224),
            F32x4Neg => self.simd(225),
            F32x4Sqrt => self.simd(227),
            F32x4Add => self.simd(228),
            F32x4Sub => self.simd(229),
            F32x4Mul => self.simd(230),
            F32x4Div => self.simd(231),
            F32x4Min => self.simd(232),
            F32x4Max => self.simd(233),
            F32x4Pmin => self.simd(234),
            F32x4Pmax => self.simd(235),
            F64x2Abs => self.simd(236),
            F64x2Neg => self.simd(237),
            F64x2Sqrt => self.simd(239),
            F64x2Add => self.simd(240),
            F64x2Sub => self.simd(241),
            F64x2Mul => self.simd(242),
            F64x2Div => self.simd(243),
            F64x2Min => self.simd(244),
            F64x2Max => self.simd(245),
            F64x2Pmin => self.simd(246),
            F64x2Pmax => self.simd(247),
            I32x4TruncSatF32x4S => self.simd(248),
            I32x4TruncSatF32x4U => self.simd(249),
            F32x4ConvertI32x4S => self.simd(250),
            F32x4ConvertI32x4U => self.simd(251),
            I32x4TruncSatF64x2SZero => self.simd(252),
            I32x4TruncSatF64x2UZero => self.simd(253),
            F64x2ConvertLowI32x4S => self.simd(254),
            F64x2ConvertLowI32x4U => self.simd(255),
            I8x16RelaxedSwizzle => self.simd(0x100),
            I32x4RelaxedTruncF32x4S => self.simd(0x101),
            I32x4RelaxedTruncF32x4U => self.simd(0x102),
            I32x4RelaxedTruncF64x2SZero => self.simd(0x103),
            I32x4RelaxedTruncF64x2UZero => self.simd(0x104),
            F32x4RelaxedMadd => self.simd(0x105),
            F32x4RelaxedNmadd => self.simd(0x106),
            F64x2RelaxedMadd => self.simd(0x107),
            F64x2RelaxedNmadd => self.simd(0x108),
            I8x16RelaxedLaneselect => self.simd(0x109),
            I16x8RelaxedLaneselect => self.simd(0x10A),
            I32x4RelaxedLaneselect => self.simd(0x10B),
            I64x2RelaxedLaneselect => self.simd(0x10C),
            F32x4RelaxedMin => self.simd(0x10D),
            F32x4RelaxedMax => self.simd(0x10E),
            F64x2RelaxedMin => self.simd(0x10F),
            F64x2RelaxedMax => self.simd(0x110),
            I16x8RelaxedQ15mulrS => self.simd(0x111),
            I16x8RelaxedDotI8x16I7x16S => self.simd(0x112),
            I32x4RelaxedDotI8x16I7x16AddS => self.simd(0x113),

            MemoryAtomicNotify(arg) => self.atomic(0x00, arg),
            MemoryAtomicWait32(arg) => self.atomic(0x01, arg),
            MemoryAtomicWait64(arg) => self.atomic(0x02, arg),
            AtomicFence => {
                self.byte(0xFE);
                self.u32(0x03);
                self.byte(0x00);
            }
            I32AtomicLoad(arg) => self.atomic(0x10, arg),
            I64AtomicLoad(arg) => self.atomic(0x11, arg),
            I32AtomicLoad8U(arg) => self.atomic(0x12, arg),
            I32AtomicLoad16U(arg) => self.atomic(0x13, arg),
            I64AtomicLoad8U(arg) => self.atomic(0x14, arg),
            I64AtomicLoad16U(arg) => self.atomic(0x15, arg),
            I64AtomicLoad32U(arg) => self.atomic(0x16, arg),
            I32AtomicStore(arg) => self.atomic(0x17, arg),
            I64AtomicStore(arg) => self.atomic(0x18, arg),
            I32AtomicStore8(arg) => self.atomic(0x19, arg),
            I32AtomicStore16(arg) => self.atomic(0x1A, arg),
            I64AtomicStore8(arg) => self.atomic(0x1B, arg),
            I64AtomicStore16(arg) => self.atomic(0x1C, arg),
            I64AtomicStore32(arg) => self.atomic(0x1D, arg),
            I32AtomicRmwAdd(arg) => self.atomic(0x1E, arg),
            I64AtomicRmwAdd(arg) => self.atomic(0x1F, arg),
            I32AtomicRmw8AddU(arg) => self.atomic(0x20, arg),
            I32AtomicRmw16AddU(arg) => self.atomic(0x21, arg),
            I64AtomicRmw8AddU(arg) => self.atomic(0x22, arg),
            I64AtomicRmw16AddU(arg) => self.atomic(0x23, arg),
            I64AtomicRmw32AddU(arg) => self.atomic(0x24, arg),
            I32AtomicRmwSub(arg) => self.atomic(0x25, arg),
            I64AtomicRmwSub(arg) => self.atomic(0x26, arg),
            I32AtomicRmw8SubU(arg) => self.atomic(0x27, arg),
            I32AtomicRmw16SubU(arg) => self.atomic(0x28, arg),
            I64AtomicRmw8SubU(arg) => self.atomic(0x29, arg),
            I64AtomicRmw16SubU(arg) => self.atomic(0x2A, arg),
            I64AtomicRmw32SubU(arg) => self.atomic(0x2B, arg),
            I32AtomicRmwAnd(arg) => self.atomic(0x2C, arg),
            I64AtomicRmwAnd(arg) => self.atomic(0x2D, arg),
            I32AtomicRmw8AndU(arg) => self.atomic(0x2E, arg),
            I32AtomicRmw16AndU(arg) => self.atomic(0x2F, arg),
            I64AtomicRmw8AndU(arg) => self.atomic(0x30, arg),
            I64AtomicRmw16AndU(arg) => self.atomic(0x31, arg),
            I64AtomicRmw32AndU(arg) => self.atomic(0x32, arg),
            I32AtomicRmwOr(arg) => self.atomic(0x33, arg),
            I64AtomicRmwOr(arg) => self.atomic(0x34, arg),
            I32AtomicRmw8OrU(arg) => self.atomic(0x35, arg),
            I32AtomicRmw16OrU(arg) => self.atomic(0x36, arg),
            I64AtomicRmw8OrU(arg) => self.atomic(0x37, arg),
            I64AtomicRmw16OrU(arg) => self.atomic(0x38, arg),
            I64AtomicRmw32OrU(arg) => self.atomic(0x39, arg),
            I32AtomicRmwXor(arg) => self.atomic(0x3A, arg),
            I64AtomicRmwXor(arg) => self.atomic(0x3B, arg),
            I32AtomicRmw8XorU(arg) => self.atomic(0x3C, arg),
            I32AtomicRmw16XorU(arg) => self.atomic(0x3D, arg),
            I64AtomicRmw8XorU(arg) => self.atomic(0x3E, arg),
            I64AtomicRmw16XorU(arg) => self.atomic(0x3F, arg),
            I64AtomicRmw32XorU(arg) => self.atomic(0x40, arg),
            I32AtomicRmwXchg(arg) => self.atomic(0x41, arg),
            I64AtomicRmwXchg(arg) => self.atomic(0x42, arg),
            I32AtomicRmw8XchgU(arg) => self.atomic(0x43, arg),
            I32AtomicRmw16XchgU(arg) => self.atomic(0x44, arg),
            I64AtomicRmw8XchgU(arg) => self.atomic(0x45, arg),
            I64AtomicRmw16XchgU(arg) => self.atomic(0x46, arg),
            I64AtomicRmw32XchgU(arg) => self.atomic(0x47, arg),
            I32AtomicRmwCmpxchg(arg) => self.atomic(0x48, arg),
            I64AtomicRmwCmpxchg(arg) => self.atomic(0x49, arg),
            I32AtomicRmw8CmpxchgU(arg) => self.atomic(0x4A, arg),
            I32AtomicRmw16CmpxchgU(arg) => self.atomic(0x4B, arg),
            I64AtomicRmw8CmpxchgU(arg) => self.atomic(0x4C, arg),
            I64AtomicRmw16CmpxchgU(arg) => self.atomic(0x4D, arg),
            I64AtomicRmw32CmpxchgU(arg) => self.atomic(0x4E, arg),
        }
    }
}

fn abstract_heap_byte(heap: HeapType) -> Option<u8> {
    let byte = match heap {
        HeapType::Func => 0x70,
        HeapType::Extern => 0x6F,
        HeapType::Any => 0x6E,
        HeapType::Eq => 0x6D,
        HeapType::I31 => 0x6C,
        HeapType::Struct => 0x6B,
        HeapType::Array => 0x6A,
        HeapType::None => 0x71,
        HeapType::NoExtern => 0x72,
        HeapType::NoFunc => 0x73,
        HeapType::Index(_) => return None,
    };
    Some(byte)
}
