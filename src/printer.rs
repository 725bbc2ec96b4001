#[cfg(test)]
mod test;

use std::collections::{BTreeMap, HashMap};

use crate::instr::{BlockType, Instruction, MemArg};
use crate::lexer::is_idchar;
use crate::module::{Data, DataKind, Elem, ElemItems, ElemKind, Expr, Func, ImportKind, Module};
use crate::types::{
    CompositeType, FieldType, FuncType, GlobalType, Limits, SubType, TableType,
};

/// Renders a module in the text format: one field per line, function
/// bodies one instruction per line, indented by control nesting. The
/// output of a valid module re-parses to an equal module, except custom
/// sections, which the text format cannot carry.
pub fn print(module: &Module) -> String {
    Printer {
        module,
        out: String::from("(module"),
        funcs: printable(&module.names.funcs),
        types: printable(&module.names.types),
        tables: printable(&module.names.tables),
        memories: printable(&module.names.memories),
        globals: printable(&module.names.globals),
        elems: printable(&module.names.elems),
        datas: printable(&module.names.datas),
        tags: printable(&module.names.tags),
    }
    .render()
}

struct Printer<'m> {
    module: &'m Module,
    out: String,
    funcs: BTreeMap<u32, &'m str>,
    types: BTreeMap<u32, &'m str>,
    tables: BTreeMap<u32, &'m str>,
    memories: BTreeMap<u32, &'m str>,
    globals: BTreeMap<u32, &'m str>,
    elems: BTreeMap<u32, &'m str>,
    datas: BTreeMap<u32, &'m str>,
    tags: BTreeMap<u32, &'m str>,
}

/// Names usable as `$id`s. A name the lexer cannot spell, or one shared
/// by two items of the same space, falls back to its numeric index.
fn printable(names: &BTreeMap<u32, String>) -> BTreeMap<u32, &str> {
    let mut counts: HashMap<&str, u32> = HashMap::new();
    for name in names.values() {
        *counts.entry(name.as_str()).or_insert(0) += 1;
    }
    names
        .iter()
        .filter(|(_, name)| is_id(name) && counts.get(name.as_str()) == Some(&1))
        .map(|(&idx, name)| (idx, name.as_str()))
        .collect()
}

fn is_id(name: &str) -> bool {
    !name.is_empty() && name.chars().all(is_idchar)
}

impl<'m> Printer<'m> {
    fn render(mut self) -> String {
        if let Some(name) = &self.module.names.module {
            if is_id(name) {
                self.out.push_str(&format!(" ${name}"));
            }
        }

        let mut type_idx = 0;
        for group in &self.module.types {
            if group.explicit_rec {
                self.line(1, "(rec");
                for sub in &group.types {
                    let text = self.sub_type(sub, type_idx);
                    self.line(2, &text);
                    type_idx += 1;
                }
                self.line(1, ")");
            } else {
                for sub in &group.types {
                    let text = self.sub_type(sub, type_idx);
                    self.line(1, &text);
                    type_idx += 1;
                }
            }
        }

        let mut func = 0;
        let mut table = 0;
        let mut memory = 0;
        let mut global = 0;
        let mut tag = 0;
        for import in &self.module.imports {
            let desc = match &import.kind {
                ImportKind::Func(type_idx) => {
                    let name = self.id(&self.funcs, func);
                    func += 1;
                    let echo = match self.module.func_type(*type_idx) {
                        Some(ty) => signature(ty),
                        None => String::new(),
                    };
                    format!("(func{name} (type {type_idx}){echo})")
                }
                ImportKind::Table(ty) => {
                    let name = self.id(&self.tables, table);
                    table += 1;
                    format!("(table{name} {})", table_type_text(ty))
                }
                ImportKind::Memory(limits) => {
                    let name = self.id(&self.memories, memory);
                    memory += 1;
                    format!("(memory{name} {})", limits_text(limits))
                }
                ImportKind::Global(ty) => {
                    let name = self.id(&self.globals, global);
                    global += 1;
                    format!("(global{name} {})", global_type_text(ty))
                }
                ImportKind::Tag(ty) => {
                    let name = self.id(&self.tags, tag);
                    tag += 1;
                    format!("(tag{name} (type {}))", ty.type_idx)
                }
            };
            let text = format!(
                "(import {} {} {desc})",
                string_text(import.module.as_bytes()),
                string_text(import.name.as_bytes()),
            );
            self.line(1, &text);
        }

        for (i, func) in self.module.funcs.iter().enumerate() {
            self.func(func, self.module.num_imported_funcs() + i as u32);
        }
        for (i, ty) in self.module.tables.iter().enumerate() {
            let name = self.id(&self.tables, self.module.num_imported_tables() + i as u32);
            let text = format!("(table{name} {})", table_type_text(ty));
            self.line(1, &text);
        }
        for (i, limits) in self.module.memories.iter().enumerate() {
            let name = self.id(&self.memories, self.module.num_imported_memories() + i as u32);
            let text = format!("(memory{name} {})", limits_text(limits));
            self.line(1, &text);
        }
        for (i, tag) in self.module.tags.iter().enumerate() {
            let name = self.id(&self.tags, self.module.num_imported_tags() + i as u32);
            let text = format!("(tag{name} (type {}))", tag.type_idx);
            self.line(1, &text);
        }
        for (i, global) in self.module.globals.iter().enumerate() {
            let name = self.id(&self.globals, self.module.num_imported_globals() + i as u32);
            let text = format!(
                "(global{name} {}{})",
                global_type_text(&global.ty),
                expr_text(&global.init),
            );
            self.line(1, &text);
        }
        for export in &self.module.exports {
            let text = format!(
                "(export {} ({} {}))",
                string_text(export.name.as_bytes()),
                export.kind.keyword(),
                export.index,
            );
            self.line(1, &text);
        }
        if let Some(start) = self.module.start {
            self.line(1, &format!("(start {start})"));
        }
        for (i, elem) in self.module.elems.iter().enumerate() {
            let text = self.elem_text(elem, i as u32);
            self.line(1, &text);
        }
        for (i, data) in self.module.datas.iter().enumerate() {
            let text = self.data_text(data, i as u32);
            self.line(1, &text);
        }

        if self.out.contains('\n') {
            self.out.push_str("\n)\n");
        } else {
            self.out.push_str(")\n");
        }
        self.out
    }

    fn line(&mut self, depth: usize, text: &str) {
        self.out.push('\n');
        for _ in 0..depth {
            self.out.push_str("  ");
        }
        self.out.push_str(text);
    }

    fn id(&self, names: &BTreeMap<u32, &str>, idx: u32) -> String {
        match names.get(&idx) {
            Some(name) => format!(" ${name}"),
            None => String::new(),
        }
    }

    fn sub_type(&self, sub: &SubType, type_idx: u32) -> String {
        let mut s = String::from("(type");
        s.push_str(&self.id(&self.types, type_idx));
        s.push(' ');
        if sub.is_final && sub.supertype.is_none() {
            s.push_str(&self.composite(&sub.composite, type_idx));
        } else {
            s.push_str("(sub");
            if sub.is_final {
                s.push_str(" final");
            }
            if let Some(sup) = sub.supertype {
                s.push_str(&format!(" {sup}"));
            }
            s.push(' ');
            s.push_str(&self.composite(&sub.composite, type_idx));
            s.push(')');
        }
        s.push(')');
        s
    }

    fn composite(&self, ty: &CompositeType, type_idx: u32) -> String {
        match ty {
            CompositeType::Func(sig) => format!("(func{})", signature(sig)),
            CompositeType::Struct(fields) => {
                let names = match self.module.names.fields.get(&type_idx) {
                    Some(names) => printable(names),
                    None => BTreeMap::new(),
                };
                let mut s = String::from("(struct");
                for (i, field) in fields.iter().enumerate() {
                    match names.get(&(i as u32)) {
                        Some(name) => {
                            s.push_str(&format!(" (field ${name} {})", field_type_text(field)))
                        }
                        None => s.push_str(&format!(" (field {})", field_type_text(field))),
                    }
                }
                s.push(')');
                s
            }
            CompositeType::Array(field) => format!("(array {})", field_type_text(field)),
        }
    }

    fn func(&mut self, func: &Func, func_idx: u32) {
        let mut head = String::from("(func");
        head.push_str(&self.id(&self.funcs, func_idx));
        head.push_str(&format!(" (type {})", func.type_idx));

        let locals = match self.module.names.locals.get(&func_idx) {
            Some(names) => printable(names),
            None => BTreeMap::new(),
        };
        let mut num_params = 0;
        if let Some(ty) = self.module.func_type(func.type_idx) {
            num_params = ty.params.len() as u32;
            for (i, param) in ty.params.iter().enumerate() {
                match locals.get(&(i as u32)) {
                    Some(name) => head.push_str(&format!(" (param ${name} {param})")),
                    None => head.push_str(&format!(" (param {param})")),
                }
            }
            if !ty.results.is_empty() {
                head.push_str(" (result");
                for result in &ty.results {
                    head.push_str(&format!(" {result}"));
                }
                head.push(')');
            }
        }

        // The body's own terminating `end` is implied by the closing
        // paren; only the instructions before it are printed.
        let body = match func.body.split_last() {
            Some((_, body)) => body,
            None => &[],
        };
        if func.locals.is_empty() && body.is_empty() {
            head.push(')');
            self.line(1, &head);
            return;
        }
        self.line(1, &head);
        for (i, local) in func.locals.iter().enumerate() {
            let text = match locals.get(&(num_params + i as u32)) {
                Some(name) => format!("(local ${name} {local})"),
                None => format!("(local {local})"),
            };
            self.line(2, &text);
        }
        let mut depth = 2;
        for instr in body {
            match instr {
                Instruction::End
                | Instruction::Else
                | Instruction::Catch(_)
                | Instruction::CatchAll
                | Instruction::Delegate(_) => {
                    if depth > 2 {
                        depth -= 1;
                    }
                }
                _ => {}
            }
            let text = instr_text(instr);
            self.line(depth, &text);
            match instr {
                Instruction::Block(_)
                | Instruction::Loop(_)
                | Instruction::If(_)
                | Instruction::Try(_)
                | Instruction::Else
                | Instruction::Catch(_)
                | Instruction::CatchAll => depth += 1,
                _ => {}
            }
        }
        self.line(1, ")");
    }

    fn elem_text(&self, elem: &Elem, idx: u32) -> String {
        let mut s = String::from("(elem");
        s.push_str(&self.id(&self.elems, idx));
        match &elem.kind {
            ElemKind::Active { table, offset } => {
                if *table != 0 {
                    s.push_str(&format!(" (table {table})"));
                }
                s.push_str(&format!(" (offset{})", expr_text(offset)));
            }
            ElemKind::Passive => {}
            ElemKind::Declared => s.push_str(" declare"),
        }
        match &elem.items {
            ElemItems::Functions(funcs) => {
                s.push_str(" func");
                for func in funcs {
                    s.push_str(&format!(" {func}"));
                }
            }
            ElemItems::Expressions(exprs) => {
                s.push_str(&format!(" {}", elem.ty));
                for expr in exprs {
                    s.push_str(&format!(" (item{})", expr_text(expr)));
                }
            }
        }
        s.push(')');
        s
    }

    fn data_text(&self, data: &Data, idx: u32) -> String {
        let mut s = String::from("(data");
        s.push_str(&self.id(&self.datas, idx));
        if let DataKind::Active { memory, offset } = &data.kind {
            if *memory != 0 {
                s.push_str(&format!(" (memory {memory})"));
            }
            s.push_str(&format!(" (offset{})", expr_text(offset)));
        }
        s.push_str(&format!(" {}", string_text(&data.bytes)));
        s.push(')');
        s
    }
}

/// Inline `(param ...)` and `(result ...)` clauses echoing a function
/// type, without names. The parser checks the echo against the type use.
fn signature(ty: &FuncType) -> String {
    let mut s = String::new();
    if !ty.params.is_empty() {
        s.push_str(" (param");
        for param in &ty.params {
            s.push_str(&format!(" {param}"));
        }
        s.push(')');
    }
    if !ty.results.is_empty() {
        s.push_str(" (result");
        for result in &ty.results {
            s.push_str(&format!(" {result}"));
        }
        s.push(')');
    }
    s
}

fn field_type_text(field: &FieldType) -> String {
    if field.mutable {
        format!("(mut {})", field.storage)
    } else {
        field.storage.to_string()
    }
}

fn global_type_text(ty: &GlobalType) -> String {
    if ty.mutable {
        format!("(mut {})", ty.val_type)
    } else {
        ty.val_type.to_string()
    }
}

fn table_type_text(ty: &TableType) -> String {
    format!("{} {}", limits_text(&ty.limits), ty.element)
}

fn limits_text(limits: &Limits) -> String {
    let mut s = String::new();
    if limits.memory64 {
        s.push_str("i64 ");
    }
    s.push_str(&limits.min.to_string());
    if let Some(max) = limits.max {
        s.push_str(&format!(" {max}"));
    }
    if limits.shared {
        s.push_str(" shared");
    }
    s
}

/// A constant expression as a plain instruction sequence, leading space
/// included, trailing `end` implied by the closing paren.
fn expr_text(expr: &Expr) -> String {
    let body = match expr.split_last() {
        Some((_, body)) => body,
        None => return String::new(),
    };
    let mut s = String::new();
    for instr in body {
        s.push(' ');
        s.push_str(&instr_text(instr));
    }
    s
}

fn instr_text(instr: &Instruction) -> String {
    use Instruction::*;
    let mut s = String::from(instr.mnemonic());
    match instr {
        Block(bt) | Loop(bt) | If(bt) | Try(bt) => s.push_str(&block_type_text(bt)),

        Br(idx) | BrIf(idx) | BrOnNull(idx) | BrOnNonNull(idx) | Rethrow(idx) | Delegate(idx)
        | Catch(idx) | Throw(idx) | Call(idx) | ReturnCall(idx) | CallRef(idx)
        | ReturnCallRef(idx) | RefFunc(idx) | LocalGet(idx) | LocalSet(idx) | LocalTee(idx)
        | GlobalGet(idx) | GlobalSet(idx) | ElemDrop(idx) | DataDrop(idx) | StructNew(idx)
        | StructNewDefault(idx) | ArrayNew(idx) | ArrayNewDefault(idx) | ArrayGet(idx)
        | ArrayGetS(idx) | ArrayGetU(idx) | ArraySet(idx) | ArrayFill(idx) => {
            s.push_str(&format!(" {idx}"));
        }
        BrTable { targets, default } => {
            for target in targets {
                s.push_str(&format!(" {target}"));
            }
            s.push_str(&format!(" {default}"));
        }
        CallIndirect { type_idx, table } | ReturnCallIndirect { type_idx, table } => {
            if *table != 0 {
                s.push_str(&format!(" {table}"));
            }
            s.push_str(&format!(" (type {type_idx})"));
        }
        TypedSelect(ty) => s.push_str(&format!(" (result {ty})")),

        TableGet(idx) | TableSet(idx) | TableGrow(idx) | TableSize(idx) | TableFill(idx)
        | MemorySize(idx) | MemoryGrow(idx) | MemoryFill(idx) => {
            if *idx != 0 {
                s.push_str(&format!(" {idx}"));
            }
        }
        TableInit { elem, table } => {
            if *table != 0 {
                s.push_str(&format!(" {table}"));
            }
            s.push_str(&format!(" {elem}"));
        }
        MemoryInit { data, memory } => {
            if *memory != 0 {
                s.push_str(&format!(" {memory}"));
            }
            s.push_str(&format!(" {data}"));
        }
        TableCopy { dst, src } | MemoryCopy { dst, src } => {
            if (*dst, *src) != (0, 0) {
                s.push_str(&format!(" {dst} {src}"));
            }
        }

        I32Const(value) => s.push_str(&format!(" {value}")),
        I64Const(value) => s.push_str(&format!(" {value}")),
        F32Const(bits) => s.push_str(&format!(" {}", f32_text(*bits))),
        F64Const(bits) => s.push_str(&format!(" {}", f64_text(*bits))),
        V128Const(bytes) => {
            s.push_str(" i32x4");
            for chunk in bytes.chunks_exact(4) {
                let lane = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
                s.push_str(&format!(" 0x{lane:x}"));
            }
        }
        I8x16Shuffle(lanes) => {
            for lane in lanes {
                s.push_str(&format!(" {lane}"));
            }
        }
        I8x16ExtractLaneS(lane) | I8x16ExtractLaneU(lane) | I8x16ReplaceLane(lane)
        | I16x8ExtractLaneS(lane) | I16x8ExtractLaneU(lane) | I16x8ReplaceLane(lane)
        | I32x4ExtractLane(lane) | I32x4ReplaceLane(lane) | I64x2ExtractLane(lane)
        | I64x2ReplaceLane(lane) | F32x4ExtractLane(lane) | F32x4ReplaceLane(lane)
        | F64x2ExtractLane(lane) | F64x2ReplaceLane(lane) => {
            s.push_str(&format!(" {lane}"));
        }

        RefNull(heap) => s.push_str(&format!(" {heap}")),
        RefTest(ty) | RefCast(ty) => s.push_str(&format!(" {ty}")),
        BrOnCast { label, from, to } | BrOnCastFail { label, from, to } => {
            s.push_str(&format!(" {label} {from} {to}"));
        }
        StructGet { type_idx, field }
        | StructGetS { type_idx, field }
        | StructGetU { type_idx, field }
        | StructSet { type_idx, field } => s.push_str(&format!(" {type_idx} {field}")),
        ArrayNewFixed { type_idx, size } => s.push_str(&format!(" {type_idx} {size}")),
        ArrayNewData { type_idx, data } | ArrayInitData { type_idx, data } => {
            s.push_str(&format!(" {type_idx} {data}"));
        }
        ArrayNewElem { type_idx, elem } | ArrayInitElem { type_idx, elem } => {
            s.push_str(&format!(" {type_idx} {elem}"));
        }
        ArrayCopy { dst, src } => s.push_str(&format!(" {dst} {src}")),

        // Memory access: naturals match the parser's defaults so an
        // unannotated access prints unannotated.
        I32Load8S(arg) | I32Load8U(arg) | I64Load8S(arg) | I64Load8U(arg) | I32Store8(arg)
        | I64Store8(arg) | V128Load8Splat(arg) | I32AtomicLoad8U(arg) | I64AtomicLoad8U(arg)
        | I32AtomicStore8(arg) | I64AtomicStore8(arg) | I32AtomicRmw8AddU(arg)
        | I64AtomicRmw8AddU(arg) | I32AtomicRmw8SubU(arg) | I64AtomicRmw8SubU(arg)
        | I32AtomicRmw8AndU(arg) | I64AtomicRmw8AndU(arg) | I32AtomicRmw8OrU(arg)
        | I64AtomicRmw8OrU(arg) | I32AtomicRmw8XorU(arg) | I64AtomicRmw8XorU(arg)
        | I32AtomicRmw8XchgU(arg) | I64AtomicRmw8XchgU(arg) | I32AtomicRmw8CmpxchgU(arg)
        | I64AtomicRmw8CmpxchgU(arg) => mem(&mut s, arg, 0),
        I32Load16S(arg) | I32Load16U(arg) | I64Load16S(arg) | I64Load16U(arg)
        | I32Store16(arg) | I64Store16(arg) | V128Load16Splat(arg) | I32AtomicLoad16U(arg)
        | I64AtomicLoad16U(arg) | I32AtomicStore16(arg) | I64AtomicStore16(arg)
        | I32AtomicRmw16AddU(arg) | I64AtomicRmw16AddU(arg) | I32AtomicRmw16SubU(arg)
        | I64AtomicRmw16SubU(arg) | I32AtomicRmw16AndU(arg) | I64AtomicRmw16AndU(arg)
        | I32AtomicRmw16OrU(arg) | I64AtomicRmw16OrU(arg) | I32AtomicRmw16XorU(arg)
        | I64AtomicRmw16XorU(arg) | I32AtomicRmw16XchgU(arg) | I64AtomicRmw16XchgU(arg)
        | I32AtomicRmw16CmpxchgU(arg) | I64AtomicRmw16CmpxchgU(arg) => mem(&mut s, arg, 1),
        I32Load(arg) | F32Load(arg) | I64Load32S(arg) | I64Load32U(arg) | I32Store(arg)
        | F32Store(arg) | I64Store32(arg) | V128Load32Splat(arg) | V128Load32Zero(arg)
        | MemoryAtomicNotify(arg) | MemoryAtomicWait32(arg) | I32AtomicLoad(arg)
        | I64AtomicLoad32U(arg) | I32AtomicStore(arg) | I64AtomicStore32(arg)
        | I32AtomicRmwAdd(arg) | I64AtomicRmw32AddU(arg) | I32AtomicRmwSub(arg)
        | I64AtomicRmw32SubU(arg) | I32AtomicRmwAnd(arg) | I64AtomicRmw32AndU(arg)
        | I32AtomicRmwOr(arg) | I64AtomicRmw32OrU(arg) | I32AtomicRmwXor(arg)
        | I64AtomicRmw32XorU(arg) | I32AtomicRmwXchg(arg) | I64AtomicRmw32XchgU(arg)
        | I32AtomicRmwCmpxchg(arg) | I64AtomicRmw32CmpxchgU(arg) => mem(&mut s, arg, 2),
        I64Load(arg) | F64Load(arg) | I64Store(arg) | F64Store(arg) | V128Load8x8S(arg)
        | V128Load8x8U(arg) | V128Load16x4S(arg) | V128Load16x4U(arg) | V128Load32x2S(arg)
        | V128Load32x2U(arg) | V128Load64Splat(arg) | V128Load64Zero(arg)
        | MemoryAtomicWait64(arg) | I64AtomicLoad(arg) | I64AtomicStore(arg)
        | I64AtomicRmwAdd(arg) | I64AtomicRmwSub(arg) | I64AtomicRmwAnd(arg)
        | I64AtomicRmwOr(arg) | I64AtomicRmwXor(arg) | I64AtomicRmwXchg(arg)
        | I64AtomicRmwCmpxchg(arg) => mem(&mut s, arg, 3),
        V128Load(arg) | V128Store(arg) => mem(&mut s, arg, 4),
        V128Load8Lane(arg, lane) | V128Store8Lane(arg, lane) => {
            mem(&mut s, arg, 0);
            s.push_str(&format!(" {lane}"));
        }
        V128Load16Lane(arg, lane) | V128Store16Lane(arg, lane) => {
            mem(&mut s, arg, 1);
            s.push_str(&format!(" {lane}"));
        }
        V128Load32Lane(arg, lane) | V128Store32Lane(arg, lane) => {
            mem(&mut s, arg, 2);
            s.push_str(&format!(" {lane}"));
        }
        V128Load64Lane(arg, lane) | V128Store64Lane(arg, lane) => {
            mem(&mut s, arg, 3);
            s.push_str(&format!(" {lane}"));
        }

        _ => {}
    }
    s
}

fn block_type_text(bt: &BlockType) -> String {
    match bt {
        BlockType::Empty => String::new(),
        BlockType::Result(ty) => format!(" (result {ty})"),
        BlockType::Func(idx) => format!(" (type {idx})"),
    }
}

fn mem(s: &mut String, arg: &MemArg, natural: u32) {
    if arg.memory != 0 {
        s.push_str(&format!(" {}", arg.memory));
    }
    if arg.offset != 0 {
        s.push_str(&format!(" offset={}", arg.offset));
    }
    if arg.align != natural {
        let bytes = 1u64.checked_shl(arg.align).unwrap_or(0);
        s.push_str(&format!(" align={bytes}"));
    }
}

const F32_EXP: u32 = 0x7f80_0000;
const F64_EXP: u64 = 0x7ff0_0000_0000_0000;

/// The shortest decimal that parses back to the same bits, or the
/// `inf`/`nan`/`nan:0x...` forms the decimal notation cannot reach.
fn f32_text(bits: u32) -> String {
    let sign = if bits >> 31 == 1 { "-" } else { "" };
    let magnitude = bits & !(1 << 31);
    if magnitude & F32_EXP == F32_EXP {
        let payload = magnitude & ((1 << 23) - 1);
        return match payload {
            0 => format!("{sign}inf"),
            q if q == 1 << 22 => format!("{sign}nan"),
            _ => format!("{sign}nan:0x{payload:x}"),
        };
    }
    format!("{sign}{}", f32::from_bits(magnitude))
}

fn f64_text(bits: u64) -> String {
    let sign = if bits >> 63 == 1 { "-" } else { "" };
    let magnitude = bits & !(1 << 63);
    if magnitude & F64_EXP == F64_EXP {
        let payload = magnitude & ((1 << 52) - 1);
        return match payload {
            0 => format!("{sign}inf"),
            q if q == 1 << 51 => format!("{sign}nan"),
            _ => format!("{sign}nan:0x{payload:x}"),
        };
    }
    format!("{sign}{}", f64::from_bits(magnitude))
}

/// Bytes as a quoted string literal using only the escapes the parser
/// decodes: the named ones plus two-digit hex for everything else.
fn string_text(bytes: &[u8]) -> String {
    let mut s = String::from("\"");
    for &byte in bytes {
        match byte {
            b'\t' => s.push_str("\\t"),
            b'\n' => s.push_str("\\n"),
            b'\r' => s.push_str("\\r"),
            b'"' => s.push_str("\\\""),
            b'\\' => s.push_str("\\\\"),
            0x20..=0x7e => s.push(byte as char),
            _ => s.push_str(&format!("\\{byte:02x}")),
        }
    }
    s.push('"');
    s
}
