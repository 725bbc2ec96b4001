#[cfg(test)]
mod test;

use thiserror::Error;

use crate::instr::{BlockType, Instruction, MemArg};
use crate::module::{
    Custom, Data, DataKind, Elem, ElemItems, ElemKind, Export, Expr, ExternalKind, Func, Global,
    Import, ImportKind, Module, Names, Tag,
};
use crate::types::{
    CompositeType, FieldType, FuncType, GlobalType, HeapType, Limits, RecGroup, RefType,
    StorageType, SubType, TableType, ValType,
};

/// Keeps a hostile local-count declaration from ballooning memory. The
/// ecosystem validators enforce the same bound.
const MAX_FUNCTION_LOCALS: u64 = 50_000;

#[derive(Error, Debug)]
#[error("{msg} at offset {offset:#x}")]
pub struct DecodeError {
    pub msg: String,
    pub offset: usize,
}

pub type DecodeResult<T> = Result<T, DecodeError>;

/// Decodes a binary module. All-or-nothing: the first malformed byte
/// aborts with its offset.
pub fn decode(bytes: &[u8]) -> DecodeResult<Module> {
    let mut reader = Reader::new(bytes, 0);
    let magic = reader.take(4)?;
    if magic != b"\0asm" {
        return Err(DecodeError {
            msg: "bad magic number".into(),
            offset: 0,
        });
    }
    let version = reader.fixed_u32()?;
    if version != 1 {
        return Err(DecodeError {
            msg: format!("unsupported version {version}"),
            offset: 4,
        });
    }

    let mut module = Module::default();
    let mut declared_funcs: Vec<u32> = Vec::new();
    let mut last_rank = 0u8;
    let mut last_standard_id = 0u8;
    let mut code_entries = 0usize;

    while !reader.done() {
        let id = reader.byte()?;
        let size = reader.u32()? as usize;
        let mut section = reader.sub_reader(size)?;
        if id == 0 {
            decode_custom_section(&mut section, last_standard_id, &mut module)?;
            continue;
        }
        let rank = match section_rank(id) {
            Some(rank) => rank,
            None => return section.error_msg(format!("unknown section id {id}")),
        };
        if rank <= last_rank {
            return section.error_msg("section out of order");
        }
        last_rank = rank;
        last_standard_id = id;
        match id {
            1 => decode_type_section(&mut section, &mut module)?,
            2 => decode_import_section(&mut section, &mut module)?,
            3 => {
                declared_funcs = section.vec(Reader::u32)?;
            }
            4 => module.tables = section.vec(Reader::table_type)?,
            5 => module.memories = section.vec(Reader::limits)?,
            6 => module.globals = section.vec(Reader::global)?,
            7 => module.exports = section.vec(Reader::export)?,
            8 => module.start = Some(section.u32()?),
            9 => module.elems = section.vec(Reader::elem_segment)?,
            10 => {
                code_entries = decode_code_section(&mut section, &declared_funcs, &mut module)?;
            }
            11 => module.datas = section.vec(Reader::data_segment)?,
            12 => module.data_count = Some(section.u32()?),
            13 => module.tags = section.vec(Reader::tag)?,
            _ => unreachable!(),
        }
        if !section.done() {
            return section.error_msg("section size mismatch");
        }
    }

    if declared_funcs.len() != code_entries {
        return Err(DecodeError {
            msg: "function and code section have inconsistent lengths".into(),
            offset: bytes.len(),
        });
    }
    if let Some(count) = module.data_count {
        if count as usize != module.datas.len() {
            return Err(DecodeError {
                msg: "data count and data section have inconsistent lengths".into(),
                offset: bytes.len(),
            });
        }
    }
    Ok(module)
}

// Canonical position of each standard section; custom sections go
// anywhere. The data count section sits between element and code.
fn section_rank(id: u8) -> Option<u8> {
    let rank = match id {
        1 => 1,
        2 => 2,
        3 => 3,
        4 => 4,
        5 => 5,
        13 => 6,
        6 => 7,
        7 => 8,
        8 => 9,
        9 => 10,
        12 => 11,
        10 => 12,
        11 => 13,
        _ => return None,
    };
    Some(rank)
}

fn decode_custom_section(
    section: &mut Reader,
    after: u8,
    module: &mut Module,
) -> DecodeResult<()> {
    let name = section.name()?;
    let payload_base = section.offset();
    let bytes = section.rest().to_vec();
    if name == "name" && module.names.is_empty() {
        // A malformed name payload demotes to an opaque custom section
        // instead of failing the whole module.
        if let Ok(names) = decode_names(&bytes, payload_base) {
            module.names = names;
            return Ok(());
        }
    }
    module.customs.push(Custom { name, bytes, after });
    Ok(())
}

fn decode_type_section(section: &mut Reader, module: &mut Module) -> DecodeResult<()> {
    let count = section.u32()?;
    module.types = Vec::with_capacity(count.min(1024) as usize);
    for _ in 0..count {
        let group = if section.peek_byte() == Some(0x4E) {
            section.byte()?;
            RecGroup {
                explicit_rec: true,
                types: section.vec(Reader::sub_type)?,
            }
        } else {
            RecGroup::single(section.sub_type()?)
        };
        module.types.push(group);
    }
    Ok(())
}

fn decode_import_section(section: &mut Reader, module: &mut Module) -> DecodeResult<()> {
    let count = section.u32()?;
    for _ in 0..count {
        let import_module = section.name()?;
        let name = section.name()?;
        let kind = match section.byte()? {
            0x00 => ImportKind::Func(section.u32()?),
            0x01 => ImportKind::Table(section.table_type()?),
            0x02 => ImportKind::Memory(section.limits()?),
            0x03 => ImportKind::Global(section.global_type()?),
            0x04 => ImportKind::Tag(section.tag()?),
            _ => return section.error_msg("invalid import kind"),
        };
        module.imports.push(Import {
            module: import_module,
            name,
            kind,
        });
    }
    Ok(())
}

fn decode_code_section(
    section: &mut Reader,
    declared: &[u32],
    module: &mut Module,
) -> DecodeResult<usize> {
    let count = section.u32()? as usize;
    if count != declared.len() {
        return section.error_msg("function and code section have inconsistent lengths");
    }
    for &type_idx in declared {
        let size = section.u32()? as usize;
        let mut body = section.sub_reader(size)?;
        let locals = body.locals()?;
        let expr = body.expr()?;
        if !body.done() {
            return body.error_msg("code entry size mismatch");
        }
        module.funcs.push(Func {
            type_idx,
            locals,
            body: expr,
        });
    }
    Ok(count)
}

fn decode_names(bytes: &[u8], base: usize) -> DecodeResult<Names> {
    let mut reader = Reader::new(bytes, base);
    let mut names = Names::default();
    let mut last_id = None;
    while !reader.done() {
        let id = reader.byte()?;
        if Some(id) <= last_id {
            return reader.error_msg("name subsection out of order");
        }
        last_id = Some(id);
        let size = reader.u32()? as usize;
        let mut sub = reader.sub_reader(size)?;
        match id {
            0 => names.module = Some(sub.name()?),
            1 => names.funcs = sub.name_map()?,
            2 => names.locals = sub.indirect_name_map()?,
            4 => names.types = sub.name_map()?,
            5 => names.tables = sub.name_map()?,
            6 => names.memories = sub.name_map()?,
            7 => names.globals = sub.name_map()?,
            8 => names.elems = sub.name_map()?,
            9 => names.datas = sub.name_map()?,
            10 => names.fields = sub.indirect_name_map()?,
            11 => names.tags = sub.name_map()?,
            // Label names and future subsections are skipped, not kept.
            _ => continue,
        }
        if !sub.done() {
            return sub.error_msg("name subsection size mismatch");
        }
    }
    Ok(names)
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
    /// Absolute offset of `bytes[0]`, so errors point into the whole
    /// buffer even inside nested section readers.
    base: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8], base: usize) -> Self {
        Reader { bytes, pos: 0, base }
    }

    fn done(&self) -> bool {
        self.pos == self.bytes.len()
    }

    fn offset(&self) -> usize {
        self.base + self.pos
    }

    fn error<T>(&self, msg: impl Into<String>, offset: usize) -> DecodeResult<T> {
        Err(DecodeError {
            msg: msg.into(),
            offset,
        })
    }

    fn error_msg<T>(&self, msg: impl Into<String>) -> DecodeResult<T> {
        self.error(msg, self.offset())
    }

    fn byte(&mut self) -> DecodeResult<u8> {
        match self.bytes.get(self.pos) {
            Some(&byte) => {
                self.pos += 1;
                Ok(byte)
            }
            None => self.error_msg("unexpected end"),
        }
    }

    fn peek_byte(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn take(&mut self, n: usize) -> DecodeResult<&'a [u8]> {
        if self.bytes.len() - self.pos < n {
            return self.error_msg("unexpected end");
        }
        let slice = &self.bytes[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn rest(&mut self) -> &'a [u8] {
        let slice = &self.bytes[self.pos..];
        self.pos = self.bytes.len();
        slice
    }

    /// Splits off a length-delimited region as its own reader. The
    /// parent advances past it; the child keeps absolute offsets.
    fn sub_reader(&mut self, size: usize) -> DecodeResult<Reader<'a>> {
        let base = self.offset();
        let slice = self.take(size)?;
        Ok(Reader::new(slice, base))
    }

    fn fixed_u32(&mut self) -> DecodeResult<u32> {
        let mut buf = [0u8; 4];
        buf.copy_from_slice(self.take(4)?);
        Ok(u32::from_le_bytes(buf))
    }

    fn f32_bits(&mut self) -> DecodeResult<u32> {
        let mut buf = [0u8; 4];
        buf.copy_from_slice(self.take(4)?);
        Ok(u32::from_le_bytes(buf))
    }

    fn f64_bits(&mut self) -> DecodeResult<u64> {
        let mut buf = [0u8; 8];
        buf.copy_from_slice(self.take(8)?);
        Ok(u64::from_le_bytes(buf))
    }

    /// Unsigned LEB128 limited to `bits`. Rejects encodings that
    /// overflow the width or spend more bytes than the value needs.
    fn uleb(&mut self, bits: u32) -> DecodeResult<u64> {
        let start = self.offset();
        let max_bytes = (bits as usize).div_ceil(7);
        let mut result = 0u64;
        for i in 0..max_bytes {
            let byte = self.byte()?;
            let low = u64::from(byte & 0x7F);
            let shift = 7 * i as u32;
            if shift + 7 > bits && low >> (bits - shift) != 0 {
                return self.error("integer too large", start);
            }
            result |= low << shift;
            if byte & 0x80 == 0 {
                if i > 0 && byte == 0 {
                    return self.error("integer encoding is not minimal", start);
                }
                return Ok(result);
            }
        }
        self.error("integer representation too long", start)
    }

    /// Signed LEB128 limited to `bits`, with the same strictness.
    fn sleb(&mut self, bits: u32) -> DecodeResult<i64> {
        let start = self.offset();
        let max_bytes = (bits as usize).div_ceil(7);
        let mut result = 0i64;
        let mut prev = 0u8;
        for i in 0..max_bytes {
            let byte = self.byte()?;
            let shift = 7 * i as u32;
            result |= i64::from(byte & 0x7F) << shift;
            if byte & 0x80 == 0 {
                if shift + 7 < 64 && byte & 0x40 != 0 {
                    result |= -1i64 << (shift + 7);
                }
                if i + 1 == max_bytes {
                    // Bits past the target width must replicate the sign.
                    let used = bits - shift;
                    let top = (byte & 0x7F) >> (used - 1);
                    if top != 0 && top != 0x7F >> (used - 1) {
                        return self.error("integer too large", start);
                    }
                }
                if i > 0 {
                    let redundant = (byte == 0x00 && prev & 0x40 == 0)
                        || (byte == 0x7F && prev & 0x40 != 0);
                    if redundant {
                        return self.error("integer encoding is not minimal", start);
                    }
                }
                return Ok(result);
            }
            prev = byte;
        }
        self.error("integer representation too long", start)
    }

    fn u32(&mut self) -> DecodeResult<u32> {
        Ok(self.uleb(32)? as u32)
    }

    fn u64(&mut self) -> DecodeResult<u64> {
        self.uleb(64)
    }

    fn s32(&mut self) -> DecodeResult<i32> {
        Ok(self.sleb(32)? as i32)
    }

    fn s64(&mut self) -> DecodeResult<i64> {
        self.sleb(64)
    }

    fn s33(&mut self) -> DecodeResult<i64> {
        self.sleb(33)
    }

    fn vec<T>(&mut self, item: fn(&mut Self) -> DecodeResult<T>) -> DecodeResult<Vec<T>> {
        let count = self.u32()?;
        let mut items = Vec::with_capacity(count.min(4096) as usize);
        for _ in 0..count {
            items.push(item(self)?);
        }
        Ok(items)
    }

    fn name(&mut self) -> DecodeResult<String> {
        let len = self.u32()? as usize;
        let start = self.offset();
        let bytes = self.take(len)?;
        match std::str::from_utf8(bytes) {
            Ok(s) => Ok(s.to_string()),
            Err(_) => self.error("invalid UTF-8 in name", start),
        }
    }

    fn name_map(&mut self) -> DecodeResult<std::collections::BTreeMap<u32, String>> {
        let count = self.u32()?;
        let mut map = std::collections::BTreeMap::new();
        for _ in 0..count {
            let idx = self.u32()?;
            let name = self.name()?;
            if map.insert(idx, name).is_some() {
                return self.error_msg("duplicate name map index");
            }
        }
        Ok(map)
    }

    fn indirect_name_map(
        &mut self,
    ) -> DecodeResult<std::collections::BTreeMap<u32, std::collections::BTreeMap<u32, String>>>
    {
        let count = self.u32()?;
        let mut map = std::collections::BTreeMap::new();
        for _ in 0..count {
            let idx = self.u32()?;
            let inner = self.name_map()?;
            if map.insert(idx, inner).is_some() {
                return self.error_msg("duplicate name map index");
            }
        }
        Ok(map)
    }

    // Types.

    fn val_type(&mut self) -> DecodeResult<ValType> {
        match self.peek_byte() {
            Some(0x7F) => self.skip_for(ValType::I32),
            Some(0x7E) => self.skip_for(ValType::I64),
            Some(0x7D) => self.skip_for(ValType::F32),
            Some(0x7C) => self.skip_for(ValType::F64),
            Some(0x7B) => self.skip_for(ValType::V128),
            Some(0x63) | Some(0x64) | Some(0x6A..=0x73) => Ok(ValType::Ref(self.ref_type()?)),
            _ => self.error_msg("invalid value type"),
        }
    }

    fn skip_for(&mut self, ty: ValType) -> DecodeResult<ValType> {
        self.byte()?;
        Ok(ty)
    }

    fn ref_type(&mut self) -> DecodeResult<RefType> {
        match self.peek_byte() {
            Some(0x63) => {
                self.byte()?;
                Ok(RefType {
                    nullable: true,
                    heap: self.heap_type()?,
                })
            }
            Some(0x64) => {
                self.byte()?;
                Ok(RefType {
                    nullable: false,
                    heap: self.heap_type()?,
                })
            }
            // Abstract shorthands are nullable references.
            Some(0x6A..=0x73) => Ok(RefType {
                nullable: true,
                heap: self.heap_type()?,
            }),
            _ => self.error_msg("malformed reference type"),
        }
    }

    fn heap_type(&mut self) -> DecodeResult<HeapType> {
        let start = self.offset();
        let value = self.s33()?;
        let heap = match value {
            -16 => HeapType::Func,
            -17 => HeapType::Extern,
            -18 => HeapType::Any,
            -19 => HeapType::Eq,
            -20 => HeapType::I31,
            -21 => HeapType::Struct,
            -22 => HeapType::Array,
            -15 => HeapType::None,
            -13 => HeapType::NoFunc,
            -14 => HeapType::NoExtern,
            idx if idx >= 0 => HeapType::Index(idx as u32),
            _ => return self.error("invalid heap type", start),
        };
        Ok(heap)
    }

    fn storage_type(&mut self) -> DecodeResult<StorageType> {
        match self.peek_byte() {
            Some(0x78) => {
                self.byte()?;
                Ok(StorageType::I8)
            }
            Some(0x77) => {
                self.byte()?;
                Ok(StorageType::I16)
            }
            _ => Ok(StorageType::Val(self.val_type()?)),
        }
    }

    fn field_type(&mut self) -> DecodeResult<FieldType> {
        let storage = self.storage_type()?;
        let mutable = match self.byte()? {
            0x00 => false,
            0x01 => true,
            _ => return self.error_msg("invalid mutability flag"),
        };
        Ok(FieldType { storage, mutable })
    }

    fn func_type(&mut self) -> DecodeResult<FuncType> {
        let params = self.vec(Reader::val_type)?;
        let results = self.vec(Reader::val_type)?;
        Ok(FuncType { params, results })
    }

    fn composite_type(&mut self) -> DecodeResult<CompositeType> {
        match self.byte()? {
            0x60 => Ok(CompositeType::Func(self.func_type()?)),
            0x5F => Ok(CompositeType::Struct(self.vec(Reader::field_type)?)),
            0x5E => Ok(CompositeType::Array(self.field_type()?)),
            _ => self.error_msg("unknown type form"),
        }
    }

    fn sub_type(&mut self) -> DecodeResult<SubType> {
        let (is_final, has_prefix) = match self.peek_byte() {
            Some(0x50) => (false, true),
            Some(0x4F) => (true, true),
            _ => (true, false),
        };
        if !has_prefix {
            return Ok(SubType {
                is_final: true,
                supertype: None,
                composite: self.composite_type()?,
            });
        }
        self.byte()?;
        let supers = self.vec(Reader::u32)?;
        if supers.len() > 1 {
            return self.error_msg("multiple supertypes are not supported");
        }
        Ok(SubType {
            is_final,
            supertype: supers.first().copied(),
            composite: self.composite_type()?,
        })
    }

    fn limits(&mut self) -> DecodeResult<Limits> {
        let flags = self.byte()?;
        if flags > 0x07 {
            return self.error_msg("invalid limits flags");
        }
        let memory64 = flags & 0x04 != 0;
        let min = if memory64 { self.u64()? } else { self.u32()?.into() };
        let max = if flags & 0x01 != 0 {
            Some(if memory64 { self.u64()? } else { self.u32()?.into() })
        } else {
            None
        };
        Ok(Limits {
            min,
            max,
            shared: flags & 0x02 != 0,
            memory64,
        })
    }

    fn table_type(&mut self) -> DecodeResult<TableType> {
        let element = self.ref_type()?;
        let limits = self.limits()?;
        Ok(TableType { element, limits })
    }

    fn global_type(&mut self) -> DecodeResult<GlobalType> {
        let val_type = self.val_type()?;
        let mutable = match self.byte()? {
            0x00 => false,
            0x01 => true,
            _ => return self.error_msg("invalid mutability flag"),
        };
        Ok(GlobalType { val_type, mutable })
    }

    fn global(&mut self) -> DecodeResult<Global> {
        let ty = self.global_type()?;
        let init = self.expr()?;
        Ok(Global { ty, init })
    }

    fn tag(&mut self) -> DecodeResult<Tag> {
        if self.byte()? != 0x00 {
            return self.error_msg("invalid tag attribute");
        }
        Ok(Tag {
            type_idx: self.u32()?,
        })
    }

    fn export(&mut self) -> DecodeResult<Export> {
        let name = self.name()?;
        let kind = match self.byte()? {
            0x00 => ExternalKind::Func,
            0x01 => ExternalKind::Table,
            0x02 => ExternalKind::Memory,
            0x03 => ExternalKind::Global,
            0x04 => ExternalKind::Tag,
            _ => return self.error_msg("invalid export kind"),
        };
        let index = self.u32()?;
        Ok(Export { name, kind, index })
    }

    fn elem_segment(&mut self) -> DecodeResult<Elem> {
        let flags = self.u32()?;
        if flags > 7 {
            return self.error_msg("invalid element segment flags");
        }
        let kind = match flags & 0x03 {
            0 => ElemKind::Active {
                table: 0,
                offset: self.expr()?,
            },
            2 => ElemKind::Active {
                table: self.u32()?,
                offset: self.expr()?,
            },
            1 => ElemKind::Passive,
            _ => ElemKind::Declared,
        };
        let has_exprs = flags & 0x04 != 0;
        let ty = if flags & 0x03 == 0 {
            RefType::FUNCREF
        } else if has_exprs {
            self.ref_type()?
        } else {
            match self.byte()? {
                0x00 => RefType::FUNCREF,
                _ => return self.error_msg("invalid element kind"),
            }
        };
        let items = if has_exprs {
            ElemItems::Expressions(self.vec(Reader::expr)?)
        } else {
            ElemItems::Functions(self.vec(Reader::u32)?)
        };
        Ok(Elem { kind, ty, items })
    }

    fn data_segment(&mut self) -> DecodeResult<Data> {
        let kind = match self.u32()? {
            0 => DataKind::Active {
                memory: 0,
                offset: self.expr()?,
            },
            1 => DataKind::Passive,
            2 => DataKind::Active {
                memory: self.u32()?,
                offset: self.expr()?,
            },
            _ => return self.error_msg("invalid data segment flags"),
        };
        let len = self.u32()? as usize;
        let bytes = self.take(len)?.to_vec();
        Ok(Data { kind, bytes })
    }

    fn locals(&mut self) -> DecodeResult<Vec<ValType>> {
        let groups = self.u32()?;
        let mut locals = Vec::new();
        let mut total = 0u64;
        for _ in 0..groups {
            let count = self.u32()?;
            let ty = self.val_type()?;
            total += u64::from(count);
            if total > MAX_FUNCTION_LOCALS {
                return self.error_msg("too many locals");
            }
            locals.extend(std::iter::repeat(ty).take(count as usize));
        }
        Ok(locals)
    }

    /// An instruction sequence up to and including the `end` that closes
    /// the outermost block.
    fn expr(&mut self) -> DecodeResult<Expr> {
        let mut instrs = Vec::new();
        let mut depth = 0usize;
        loop {
            let instr = self.instr()?;
            match instr {
                Instruction::Block(_)
                | Instruction::Loop(_)
                | Instruction::If(_)
                | Instruction::Try(_) => depth += 1,
                Instruction::End => {
                    if depth == 0 {
                        instrs.push(instr);
                        return Ok(instrs);
                    }
                    depth -= 1;
                }
                // `delegate` closes a try block like `end` does.
                Instruction::Delegate(_) => {
                    if depth == 0 {
                        return self.error_msg("delegate outside of try block");
                    }
                    depth -= 1;
                }
                _ => {}
            }
            instrs.push(instr);
        }
    }

    fn block_type(&mut self) -> DecodeResult<BlockType> {
        match self.peek_byte() {
            Some(0x40) => {
                self.byte()?;
                Ok(BlockType::Empty)
            }
            Some(0x7B..=0x7F) | Some(0x63) | Some(0x64) | Some(0x6A..=0x73) => {
                Ok(BlockType::Result(self.val_type()?))
            }
            _ => {
                let start = self.offset();
                let idx = self.s33()?;
                if idx < 0 {
                    return self.error("invalid block type", start);
                }
                Ok(BlockType::Func(idx as u32))
            }
        }
    }

    fn mem_arg(&mut self) -> DecodeResult<MemArg> {
        let flags = self.u32()?;
        let (align, memory) = if flags & 0x40 != 0 {
            (flags & !0x40, self.u32()?)
        } else {
            (flags, 0)
        };
        let offset = self.u64()?;
        Ok(MemArg {
            align,
            offset,
            memory,
        })
    }

    fn lane(&mut self) -> DecodeResult<u8> {
        self.byte()
    }

    fn lanes16(&mut self) -> DecodeResult<[u8; 16]> {
        let mut buf = [0u8; 16];
        buf.copy_from_slice(self.take(16)?);
        Ok(buf)
    }

    fn br_on_cast(&mut self) -> DecodeResult<(u32, RefType, RefType)> {
        let flags = self.byte()?;
        if flags > 0x03 {
            return self.error_msg("invalid cast flags");
        }
        let label = self.u32()?;
        let from = RefType {
            nullable: flags & 0x01 != 0,
            heap: self.heap_type()?,
        };
        let to = RefType {
            nullable: flags & 0x02 != 0,
            heap: self.heap_type()?,
        };
        Ok((label, from, to))
    }

    fn instr(&mut self) -> DecodeResult<Instruction> {
        use Instruction::*;
        let start = self.offset();
        let instr = match self.byte()? {
            0x00 => Unreachable,
            0x01 => Nop,
            0x02 => Block(self.block_type()?),
            0x03 => Loop(self.block_type()?),
            0x04 => If(self.block_type()?),
            0x05 => Else,
            0x06 => Try(self.block_type()?),
            0x07 => Catch(self.u32()?),
            0x08 => Throw(self.u32()?),
            0x09 => Rethrow(self.u32()?),
            0x0B => End,
            0x0C => Br(self.u32()?),
            0x0D => BrIf(self.u32()?),
            0x0E => {
                let targets = self.vec(Reader::u32)?;
                let default = self.u32()?;
                BrTable { targets, default }
            }
            0x0F => Return,
            0x10 => Call(self.u32()?),
            0x11 => {
                let type_idx = self.u32()?;
                let table = self.u32()?;
                CallIndirect { type_idx, table }
            }
            0x12 => ReturnCall(self.u32()?),
            0x13 => {
                let type_idx = self.u32()?;
                let table = self.u32()?;
                ReturnCallIndirect { type_idx, table }
            }
            0x14 => CallRef(self.u32()?),
            0x15 => ReturnCallRef(self.u32()?),
            0x18 => Delegate(self.u32()?),
            0x19 => CatchAll,
            0x1A => Drop,
            0x1B => Select,
            0x1C => {
                let types = self.vec(Reader::val_type)?;
                if types.len() != 1 {
                    return self.error("invalid result arity for select", start);
                }
                TypedSelect(types[0])
            }
            0x20 => LocalGet(self.u32()?),
            0x21 => LocalSet(self.u32()?),
            0x22 => LocalTee(self.u32()?),
            0x23 => GlobalGet(self.u32()?),
            0x24 => GlobalSet(self.u32()?),
            0x25 => TableGet(self.u32()?),
            0x26 => TableSet(self.u32()?),
            0x28 => I32Load(self.mem_arg()?),
            0x29 => I64Load(self.mem_arg()?),
            0x2A => F32Load(self.mem_arg()?),
            0x2B => F64Load(self.mem_arg()?),
            0x2C => I32Load8S(self.mem_arg()?),
            0x2D => I32Load8U(self.mem_arg()?),
            0x2E => I32Load16S(self.mem_arg()?),
            0x2F => I32Load16U(self.mem_arg()?),
            0x30 => I64Load8S(self.mem_arg()?),
            0x31 => I64Load8U(self.mem_arg()?),
            0x32 => I64Load16S(self.mem_arg()?),
            0x33 => I64Load16U(self.mem_arg()?),
            0x34 => I64Load32S(self.mem_arg()?),
            0x35 => I64Load32U(self.mem_arg()?),
            0x36 => I32Store(self.mem_arg()?),
            0x37 => I64Store(self.mem_arg()?),
            0x38 => F32Store(self.mem_arg()?),
            0x39 => F64Store(self.mem_arg()?),
            0x3A => I32Store8(self.mem_arg()?),
            0x3B => I32Store16(self.mem_arg()?),
            0x3C => I64Store8(self.mem_arg()?),
            0x3D => I64Store16(self.mem_arg()?),
            0x3E => I64Store32(self.mem_arg()?),
            0x3F => MemorySize(self.u32()?),
            0x40 => MemoryGrow(self.u32()?),
            0x41 => I32Const(self.s32()?),
            0x42 => I64Const(self.s64()?),
            0x43 => F32Const(self.f32_bits()?),
            0x44 => F64Const(self.f64_bits()?),
            0x45 => I32Eqz,
            0x46 => I32Eq,
            0x47 => I32Ne,
            0x48 => I32LtS,
            0x49 => I32LtU,
            0x4A => I32GtS,
            0x4B => I32GtU,
            0x4C => I32LeS,
            0x4D => I32LeU,
            0x4E => I32GeS,
            0x4F => I32GeU,
            0x50 => I64Eqz,
            0x51 => I64Eq,
            0x52 => I64Ne,
            0x53 => I64LtS,
            0x54 => I64LtU,
            0x55 => I64GtS,
            0x56 => I64GtU,
            0x57 => I64LeS,
            0x58 => I64LeU,
            0x59 => I64GeS,
            0x5A => I64GeU,
            0x5B => F32Eq,
            0x5C => F32Ne,
            0x5D => F32Lt,
            0x5E => F32Gt,
            0x5F => F32Le,
            0x60 => F32Ge,
            0x61 => F64Eq,
            0x62 => F64Ne,
            0x63 => F64Lt,
            0x64 => F64Gt,
            0x65 => F64Le,
            0x66 => F64Ge,
            0x67 => I32Clz,
            0x68 => I32Ctz,
            0x69 => I32Popcnt,
            0x6A => I32Add,
            0x6B => I32Sub,
            0x6C => I32Mul,
            0x6D => I32DivS,
            0x6E => I32DivU,
            0x6F => I32RemS,
            0x70 => I32RemU,
            0x71 => I32And,
            0x72 => I32Or,
            0x73 => I32Xor,
            0x74 => I32Shl,
            0x75 => I32ShrS,
            0x76 => I32ShrU,
            0x77 => I32Rotl,
            0x78 => I32Rotr,
            0x79 => I64Clz,
            0x7A => I64Ctz,
            0x7B => I64Popcnt,
            0x7C => I64Add,
            0x7D => I64Sub,
            0x7E => I64Mul,
            0x7F => I64DivS,
            0x80 => I64DivU,
            0x81 => I64RemS,
            0x82 => I64RemU,
            0x83 => I64And,
            0x84 => I64Or,
            0x85 => I64Xor,
            0x86 => I64Shl,
            0x87 => I64ShrS,
            0x88 => I64ShrU,
            0x89 => I64Rotl,
            0x8A => I64Rotr,
            0x8B => F32Abs,
            0x8C => F32Neg,
            0x8D => F32Ceil,
            0x8E => F32Floor,
            0x8F => F32Trunc,
            0x90 => F32Nearest,
            0x91 => F32Sqrt,
            0x92 => F32Add,
            0x93 => F32Sub,
            0x94 => F32Mul,
            0x95 => F32Div,
            0x96 => F32Min,
            0x97 => F32Max,
            0x98 => F32Copysign,
            0x99 => F64Abs,
            0x9A => F64Neg,
            0x9B => F64Ceil,
            0x9C => F64Floor,
            0x9D => F64Trunc,
            0x9E => F64Nearest,
            0x9F => F64Sqrt,
            0xA0 => F64Add,
            0xA1 => F64Sub,
            0xA2 => F64Mul,
            0xA3 => F64Div,
            0xA4 => F64Min,
            0xA5 => F64Max,
            0xA6 => F64Copysign,
            0xA7 => I32WrapI64,
            0xA8 => I32TruncF32S,
            0xA9 => I32TruncF32U,
            0xAA => I32TruncF64S,
            0xAB => I32TruncF64U,
            0xAC => I64ExtendI32S,
            0xAD => I64ExtendI32U,
            0xAE => I64TruncF32S,
            0xAF => I64TruncF32U,
            0xB0 => I64TruncF64S,
            0xB1 => I64TruncF64U,
            0xB2 => F32ConvertI32S,
            0xB3 => F32ConvertI32U,
            0xB4 => F32ConvertI64S,
            0xB5 => F32ConvertI64U,
            0xB6 => F32DemoteF64,
            0xB7 => F64ConvertI32S,
            0xB8 => F64ConvertI32U,
            0xB9 => F64ConvertI64S,
            0xBA => F64ConvertI64U,
            0xBB => F64PromoteF32,
            0xBC => I32ReinterpretF32,
            0xBD => I64ReinterpretF64,
            0xBE => F32ReinterpretI32,
            0xBF => F64ReinterpretI64,
            0xC0 => I32Extend8S,
            0xC1 => I32Extend16S,
            0xC2 => I64Extend8S,
            0xC3 => I64Extend16S,
            0xC4 => I64Extend32S,
            0xD0 => RefNull(self.heap_type()?),
            0xD1 => RefIsNull,
            0xD2 => RefFunc(self.u32()?),
            0xD3 => RefEq,
            0xD4 => RefAsNonNull,
            0xD5 => BrOnNull(self.u32()?),
            0xD6 => BrOnNonNull(self.u32()?),
            0xFB => self.gc_instr(start)?,
            0xFC => self.misc_instr(start)?,
            0xFD => self.simd_instr(start)?,
            0xFE => self.atomic_instr(start)?,
            op => return self.error(format!("unknown opcode {op:#04x}"), start),
        };
        Ok(instr)
    }

    fn misc_instr(&mut self, start: usize) -> DecodeResult<Instruction> {
        use Instruction::*;
        let instr = match self.u32()? {
            0 => I32TruncSatF32S,
            1 => I32TruncSatF32U,
            2 => I32TruncSatF64S,
            3 => I32TruncSatF64U,
            4 => I64TruncSatF32S,
            5 => I64TruncSatF32U,
            6 => I64TruncSatF64S,
            7 => I64TruncSatF64U,
            8 => {
                let data = self.u32()?;
                let memory = self.u32()?;
                MemoryInit { data, memory }
            }
            9 => DataDrop(self.u32()?),
            10 => {
                let dst = self.u32()?;
                let src = self.u32()?;
                MemoryCopy { dst, src }
            }
            11 => MemoryFill(self.u32()?),
            12 => {
                let elem = self.u32()?;
                let table = self.u32()?;
                TableInit { elem, table }
            }
            13 => ElemDrop(self.u32()?),
            14 => {
                let dst = self.u32()?;
                let src = self.u32()?;
                TableCopy { dst, src }
            }
            15 => TableGrow(self.u32()?),
            16 => TableSize(self.u32()?),
            17 => TableFill(self.u32()?),
            op => return self.error(format!("unknown opcode 0xfc {op:#x}"), start),
        };
        Ok(instr)
    }

    fn gc_instr(&mut self, start: usize) -> DecodeResult<Instruction> {
        use Instruction::*;
        let instr = match self.u32()? {
            0 => StructNew(self.u32()?),
            1 => StructNewDefault(self.u32()?),
            2 => {
                let type_idx = self.u32()?;
                let field = self.u32()?;
                StructGet { type_idx, field }
            }
            3 => {
                let type_idx = self.u32()?;
                let field = self.u32()?;
                StructGetS { type_idx, field }
            }
            4 => {
                let type_idx = self.u32()?;
                let field = self.u32()?;
                StructGetU { type_idx, field }
            }
            5 => {
                let type_idx = self.u32()?;
                let field = self.u32()?;
                StructSet { type_idx, field }
            }
            6 => ArrayNew(self.u32()?),
            7 => ArrayNewDefault(self.u32()?),
            8 => {
                let type_idx = self.u32()?;
                let size = self.u32()?;
                ArrayNewFixed { type_idx, size }
            }
            9 => {
                let type_idx = self.u32()?;
                let data = self.u32()?;
                ArrayNewData { type_idx, data }
            }
            10 => {
                let type_idx = self.u32()?;
                let elem = self.u32()?;
                ArrayNewElem { type_idx, elem }
            }
            11 => ArrayGet(self.u32()?),
            12 => ArrayGetS(self.u32()?),
            13 => ArrayGetU(self.u32()?),
            14 => ArraySet(self.u32()?),
            15 => ArrayLen,
            16 => ArrayFill(self.u32()?),
            17 => {
                let dst = self.u32()?;
                let src = self.u32()?;
                ArrayCopy { dst, src }
            }
            18 => {
                let type_idx = self.u32()?;
                let data = self.u32()?;
                ArrayInitData { type_idx, data }
            }
            19 => {
                let type_idx = self.u32()?;
                let elem = self.u32()?;
                ArrayInitElem { type_idx, elem }
            }
            20 => RefTest(RefType {
                nullable: false,
                heap: self.heap_type()?,
            }),
            21 => RefTest(RefType {
                nullable: true,
                heap: self.heap_type()?,
            }),
            22 => RefCast(RefType {
                nullable: false,
                heap: self.heap_type()?,
            }),
            23 => RefCast(RefType {
                nullable: true,
                heap: self.heap_type()?,
            }),
            24 => {
                let (label, from, to) = self.br_on_cast()?;
                BrOnCast { label, from, to }
            }
            25 => {
                let (label, from, to) = self.br_on_cast()?;
                BrOnCastFail { label, from, to }
            }
            26 => AnyConvertExtern,
            27 => ExternConvertAny,
            28 => RefI31,
            29 => I31GetS,
            30 => I31GetU,
            op => return self.error(format!("unknown opcode 0xfb {op:#x}"), start),
        };
        Ok(instr)
    }

    fn atomic_instr(&mut self, start: usize) -> DecodeResult<Instruction> {
        use Instruction::*;
        let instr = match self.u32()? {
            0x00 => MemoryAtomicNotify(self.mem_arg()?),
            0x01 => MemoryAtomicWait32(self.mem_arg()?),
            0x02 => MemoryAtomicWait64(self.mem_arg()?),
            0x03 => {
                if self.byte()? != 0x00 {
                    return self.error("invalid atomic fence flags", start);
                }
                AtomicFence
            }
            0x10 => I32AtomicLoad(self.mem_arg()?),
            0x11 => I64AtomicLoad(self.mem_arg()?),
            0x12 => I32AtomicLoad8U(self.mem_arg()?),
            0x13 => I32AtomicLoad16U(self.mem_arg()?),
            0x14 => I64AtomicLoad8U(self.mem_arg()?),
            0x15 => I64AtomicLoad16U(self.mem_arg()?),
            0x16 => I64AtomicLoad32U(self.mem_arg()?),
            0x17 => I32AtomicStore(self.mem_arg()?),
            0x18 => I64AtomicStore(self.mem_arg()?),
            0x19 => I32AtomicStore8(self.mem_arg()?),
            0x1A => I32AtomicStore16(self.mem_arg()?),
            0x1B => I64AtomicStore8(self.mem_arg()?),
            0x1C => I64AtomicStore16(self.mem_arg()?),
            0x1D => I64AtomicStore32(self.mem_arg()?),
            0x1E => I32AtomicRmwAdd(self.mem_arg()?),
            0x1F => I64AtomicRmwAdd(self.mem_arg()?),
            0x20 => I32AtomicRmw8AddU(self.mem_arg()?),
            0x21 => I32AtomicRmw16AddU(self.mem_arg()?),
            0x22 => I64AtomicRmw8AddU(self.mem_arg()?),
            0x23 => I64AtomicRmw16AddU(self.mem_arg()?),
            0x24 => I64AtomicRmw32AddU(self.mem_arg()?),
            0x25 => I32AtomicRmwSub(self.mem_arg()?),
            0x26 => I64AtomicRmwSub(self.mem_arg()?),
            0x27 => I32AtomicRmw8SubU(self.mem_arg()?),
            0x28 => I32AtomicRmw16SubU(self.mem_arg()?),
            0x29 => I64AtomicRmw8SubU(self.mem_arg()?),
            0x2A => I64AtomicRmw16SubU(self.mem_arg()?),
            0x2B => I64AtomicRmw32SubU(self.mem_arg()?),
            0x2C => I32AtomicRmwAnd(self.mem_arg()?),
            0x2D => I64AtomicRmwAnd(self.mem_arg()?),
            0x2E => I32AtomicRmw8AndU(self.mem_arg()?),
            0x2F => I32AtomicRmw16AndU(self.mem_arg()?),
            0x30 => I64AtomicRmw8AndU(self.mem_arg()?),
            0x31 => I64AtomicRmw16AndU(self.mem_arg()?),
            0x32 => I64AtomicRmw32AndU(self.mem_arg()?),
            0x33 => I32AtomicRmwOr(self.mem_arg()?),
            0x34 => I64AtomicRmwOr(self.mem_arg()?),
            0x35 => I32AtomicRmw8OrU(self.mem_arg()?),
            0x36 => I32AtomicRmw16OrU(self.mem_arg()?),
            0x37 => I64AtomicRmw8OrU(self.mem_arg()?),
            0x38 => I64AtomicRmw16OrU(self.mem_arg()?),
            0x39 => I64AtomicRmw32OrU(self.mem_arg()?),
            0x3A => I32AtomicRmwXor(self.mem_arg()?),
            0x3B => I64AtomicRmwXor(self.mem_arg()?),
            0x3C => I32AtomicRmw8XorU(self.mem_arg()?),
            0x3D => I32AtomicRmw16XorU(self.mem_arg()?),
            0x3E => I64AtomicRmw8XorU(self.mem_arg()?),
            0x3F => I64AtomicRmw16XorU(self.mem_arg()?),
            0x40 => I64AtomicRmw32XorU(self.mem_arg()?),
            0x41 => I32AtomicRmwXchg(self.mem_arg()?),
            0x42 => I64AtomicRmwXchg(self.mem_arg()?),
            0x43 => I32AtomicRmw8XchgU(self.mem_arg()?),
            0x44 => I32AtomicRmw16XchgU(self.mem_arg()?),
            0x45 => I64AtomicRmw8XchgU(self.mem_arg()?),
            0x46 => I64AtomicRmw16XchgU(self.mem_arg()?),
            0x47 => I64AtomicRmw32XchgU(self.mem_arg()?),
            0x48 => I32AtomicRmwCmpxchg(self.mem_arg()?),
            0x49 => I64AtomicRmwCmpxchg(self.mem_arg()?),
            0x4A => I32AtomicRmw8CmpxchgU(self.mem_arg()?),
            0x4B => I32AtomicRmw16CmpxchgU(self.mem_arg()?),
            0x4C => I64AtomicRmw8CmpxchgU(self.mem_arg()?),
            0x4D => I64AtomicRmw16CmpxchgU(self.mem_arg()?),
            0x4E => I64AtomicRmw32CmpxchgU(self.mem_arg()?),
            op => return self.error(format!("unknown opcode 0xfe {op:#x}"), start),
        };
        Ok(instr)
    }

    fn simd_instr(&mut self, start: usize) -> DecodeResult<Instruction> {
        use Instruction::*;
        let instr = match self.u32()? {
            0 => V128Load(self.mem_arg()?),
            1 => V128Load8x8S(self.mem_arg()?),
            2 => V128Load8x8U(self.mem_arg()?),
            3 => V128Load16x4S(self.mem_arg()?),
            4 => V128Load16x4U(self.mem_arg()?),
            5 => V128Load32x2S(self.mem_arg()?),
            6 => V128Load32x2U(self.mem_arg()?),
            7 => V128Load8Splat(self.mem_arg()?),
            8 => V128Load16Splat(self.mem_arg()?),
            9 => V128Load32Splat(self.mem_arg()?),
            10 => V128Load64Splat(self.mem_arg()?),
            11 => V128Store(self.mem_arg()?),
            12 => V128Const(self.lanes16()?),
            13 => I8x16Shuffle(self.lanes16()?),
            14 => I8x16Swizzle,
            15 => I8x16Splat,
            16 => I16x8Splat,
            17 => I32x4Splat,
            18 => I64x2Splat,
            19 => F32x4Splat,
            20 => F64x2Splat,
            21 => I8x16ExtractLaneS(self.lane()?),
            22 => I8x16ExtractLaneU(self.lane()?),
            23 => I8x16ReplaceLane(self.lane()?),
            24 => I16x8ExtractLaneS(self.lane()?),
            25 => I16x8ExtractLaneU(self.lane()?),
            26 => I16x8ReplaceLane(self.lane()?),
            27 => I32x4ExtractLane(self.lane()?),
            28 => I32x4ReplaceLane(self.lane()?),
            29 => I64x2ExtractLane(self.lane()?),
            30 => I64x2ReplaceLane(self.lane()?),
            31 => F32x4ExtractLane(self.lane()?),
            32 => F32x4ReplaceLane(self.lane()?),
            33 => F64x2ExtractLane(self.lane()?),
            34 => F64x2ReplaceLane(self.lane()?),
            35 => I8x16Eq,
            36 => I8x16Ne,
            37 => I8x16LtS,
            38 => I8x16LtU,
            39 => I8x16GtS,
            40 => I8x16GtU,
            41 => I8x16LeS,
            42 => I8x16LeU,
            43 => I8x16GeS,
            44 => I8x16GeU,
            45 => I16x8Eq,
            46 => I16x8Ne,
            47 => I16x8LtS,
            48 => I16x8LtU,
            49 => I16x8GtS,
            50 => I16x8GtU,
            51 => I16x8LeS,
            52 => I16x8LeU,
            53 => I16x8GeS,
            54 => I16x8GeU,
            55 => I32x4Eq,
            56 => I32x4Ne,
            57 => I32x4LtS,
            58 => I32x4LtU,
            59 => I32x4GtS,
            60 => I32x4GtU,
            61 => I32x4LeS,
            62 => I32x4LeU,
            63 => I32x4GeS,
            64 => I32x4GeU,
            65 => F32x4Eq,
            66 => F32x4Ne,
            67 => F32x4Lt,
            68 => F32x4Gt,
            69 => F32x4Le,
            70 => F32x4Ge,
            71 => F64x2Eq,
            72 => F64x2Ne,
            73 => F64x2Lt,
            74 => F64x2Gt,
            75 => F64x2Le,
            76 => F64x2Ge,
            77 => V128Not,
            78 => V128And,
            79 => V128AndNot,
            80 => V128Or,
            81 => V128Xor,
            82 => V128Bitselect,
            83 => V128AnyTrue,
            84 => V128Load8Lane(self.mem_arg()?, self.lane()?),
            85 => V128Load16Lane(self.mem_arg()?, self.lane()?),
            86 => V128Load32Lane(self.mem_arg()?, self.lane()?),
            87 => V128Load64Lane(self.mem_arg()?, self.lane()?),
            88 => V128Store8Lane(self.mem_arg()?, self.lane()?),
            89 => V128Store16Lane(self.mem_arg()?, self.lane()?),
            90 => V128Store32Lane(self.mem_arg()?, self.lane()?),
            91 => V128Store64Lane(self.mem_arg()?, self.lane()?),
            92 => V128Load32Zero(self.mem_arg()?),
            93 => V128Load64Zero(self.mem_arg()?),
            94 => F32x4DemoteF64x2Zero,
            95 => F64x2PromoteLowF32x4,
            96 => I8x16Abs,
            97 => I8x16Neg,
            98 => I8x16Popcnt,
            99 => I8x16AllTrue,
            100 => I8x16Bitmask,
            101 => I8x16NarrowI16x8S,
            102 => I8x16NarrowI16x8U,
            103 => F32x4Ceil,
            104 => F32x4Floor,
            105 => F32x4Trunc,
            106 => F32x4Nearest,
            107 => I8x16Shl,
            108 => I8x16ShrS,
            109 => I8x16ShrU,
            110 => I8x16Add,
            111 => I8x16AddSatS,
            112 => I8x16AddSatU,
            113 => I8x16Sub,
            114 => I8x16SubSatS,
            115 => I8x16SubSatU,
            116 => F64x2Ceil,
            117 => F64x2Floor,
            118 => I8x16MinS,
            119 => I8x16MinU,
            120 => I8x16MaxS,
            121 => I8x16MaxU,
            122 => F64x2Trunc,
            123 => I8x16AvgrU,
            124 => I16x8ExtaddPairwiseI8x16S,
            125 => I16x8ExtaddPairwiseI8x16U,
            126 => I32x4ExtaddPairwiseI16x8S,
            127 => I32x4ExtaddPairwiseI16x8U,
            128 => I16x8Abs,
            129 => I16x8Neg,
            130 => I16x8Q15MulrSatS,
            131 => I16x8AllTrue,
            132 => I16x8Bitmask,
            133 => I16x8NarrowI32x4S,
            134 => I16x8NarrowI32x4U,
            135 => I16x8ExtendLowI8x16S,
            136 => I16x8ExtendHighI8x16S,
            137 => I16x8ExtendLowI8x16U,
            138 => I16x8ExtendHighI8x16U,
            139 => I16x8Shl,
            140 => I16x8ShrS,
            141 => I16x8ShrU,
            142 => I16x8Add,
            143 => I16x8AddSatS,
            144 => I16x8AddSatU,
            145 => I16x8Sub,
            146 => I16x8SubSatS,
            147 => I16x8SubSatU,
            148 => F64x2Nearest,
            149 => I16x8Mul,
            150 => I16x8MinS,
            151 => I16x8MinU,
            152 => I16x8MaxS,
            153 => I16x8MaxU,
            155 => I16x8AvgrU,
            156 => I16x8ExtmulLowI8x16S,
            157 => I16x8ExtmulHighI8x16S,
            158 => I16x8ExtmulLowI8x16U,
            159 => I16x8ExtmulHighI8x16U,
            160 => I32x4Abs,
            161 => I32x4Neg,
            163 => I32x4AllTrue,
            164 => I32x4Bitmask,
            167 => I32x4ExtendLowI16x8S,
            168 => I32x4ExtendHighI16x8S,
            169 => I32x4ExtendLowI16x8U,
            170 => I32x4ExtendHighI16x8U,
            171 => I32x4Shl,
            172 => I32x4ShrS,
            173 => I32x4ShrU,
            174 => I32x4Add,
            177 => I32x4Sub,
            181 => I32x4Mul,
            182 => I32x4MinS,
            183 => I32x4MinU,
            184 => I32x4MaxS,
            185 => I32x4MaxU,
            186 => I32x4DotI16x8S,
            188 => I32x4ExtmulLowI16x8S,
            189 => I32x4ExtmulHighI16x8S,
            190 => I32x4ExtmulLowI16x8U,
            191 => I32x4ExtmulHighI16x8U,
            192 => I64x2Abs,
            193 => I64x2Neg,
            195 => I64x2AllTrue,
            196 => I64x2Bitmask,
            199 => I64x2ExtendLowI32x4S,
            200 => I64x2ExtendHighI32x4S,
            201 => I64x2ExtendLowI32x4U,
            202 => I64x2ExtendHighI32x4U,
            203 => I64x2Shl,
            204 => I64x2ShrS,
            205 => I64x2ShrU,
            206 => I64x2Add,
            209 => I64x2Sub,
            213 => I64x2Mul,
            214 => I64x2Eq,
            215 => I64x2Ne,
            216 => I64x2LtS,
            217 => I64x2GtS,
            218 => I64x2LeS,
            219 => I64x2GeS,
            220 => I64x2ExtmulLowI32x4S,
            221 => I64x2ExtmulHighI32x4S,
            222 => I64x2ExtmulLowI32x4U,
            223 => I64x2ExtmulHighI32x4U,
            224 => F32x4Abs,
            225 => F32x4Neg,
            227 => F32x4Sqrt,
            228 => F32x4Add,
            229 => F32x4Sub,
            230 => F32x4Mul,
            231 => F32x4Div,
            232 => F32x4Min,
            233 => F32x4Max,
            234 => F32x4Pmin,
            235 => F32x4Pmax,
            236 => F64x2Abs,
            237 => F64x2Neg,
            239 => F64x2Sqrt,
            240 => F64x2Add,
            241 => F64x2Sub,
            242 => F64x2Mul,
            243 => F64x2Div,
            244 => F64x2Min,
            245 => F64x2Max,
            246 => F64x2Pmin,
            247 => F64x2Pmax,
            248 => I32x4TruncSatF32x4S,
            249 => I32x4TruncSatF32x4U,
            250 => F32x4ConvertI32x4S,
            251 => F32x4ConvertI32x4U,
            252 => I32x4TruncSatF64x2SZero,
            253 => I32x4TruncSatF64x2UZero,
            254 => F64x2ConvertLowI32x4S,
            255 => F64x2ConvertLowI32x4U,
            0x100 => I8x16RelaxedSwizzle,
            0x101 => I32x4RelaxedTruncF32x4S,
            0x102 => I32x4RelaxedTruncF32x4U,
            0x103 => I32x4RelaxedTruncF64x2SZero,
            0x104 => I32x4RelaxedTruncF64x2UZero,
            0x105 => F32x4RelaxedMadd,
            0x106 => F32x4RelaxedNmadd,
            0x107 => F64x2RelaxedMadd,
            0x108 => F64x2RelaxedNmadd,
            0x109 => I8x16RelaxedLaneselect,
            0x10A => I16x8RelaxedLaneselect,
            0x10B => I32x4RelaxedLaneselect,
            0x10C => I64x2RelaxedLaneselect,
            0x10D => F32x4RelaxedMin,
            0x10E => F32x4RelaxedMax,
            0x10F => F64x2RelaxedMin,
            0x110 => F64x2RelaxedMax,
            0x111 => I16x8RelaxedQ15mulrS,
            0x112 => I16x8RelaxedDotI8x16I7x16S,
            0x113 => I32x4RelaxedDotI8x16I7x16AddS,
            op => return self.error(format!("unknown opcode 0xfd {op:#x}"), start),
        };
        Ok(instr)
    }
}
