use super::{Diagnostic, Validator};
use crate::instr::{BlockType, Instruction, MemArg};
use crate::module::Func;
use crate::types::{
    CompositeType, FieldType, FuncType, GlobalType, HeapType, Limits, RefType, StorageType,
    TableType, ValType,
};

type Check<T = ()> = Result<T, Diagnostic>;

pub(super) fn check_body(v: &Validator, idx: u32, ty: &FuncType, func: &Func) -> Check {
    let mut locals = ty.params.clone();
    locals.extend_from_slice(&func.locals);
    let mut checker = Checker {
        v,
        location: format!("func[{idx}]"),
        results: ty.results.clone(),
        locals,
        stack: Vec::new(),
        frames: vec![Frame {
            kind: FrameKind::Block,
            start: Vec::new(),
            end: ty.results.clone(),
            height: 0,
            unreachable: false,
        }],
        pos: 0,
        const_expr: false,
        global_limit: v.module.global_count(),
    };
    checker.run(&func.body)
}

pub(super) fn check_const(
    v: &Validator,
    location: &str,
    expected: ValType,
    global_limit: u32,
    expr: &[Instruction],
) -> Check {
    let mut checker = Checker {
        v,
        location: location.to_string(),
        results: vec![expected],
        locals: Vec::new(),
        stack: Vec::new(),
        frames: vec![Frame {
            kind: FrameKind::Block,
            start: Vec::new(),
            end: vec![expected],
            height: 0,
            unreachable: false,
        }],
        pos: 0,
        const_expr: true,
        global_limit,
    };
    checker.run(expr)
}

/// A value-stack slot. `Bottom` stands in for any type once the current
/// block has gone unreachable.
#[derive(Copy, Clone, Eq, PartialEq)]
enum StackType {
    Bottom,
    Val(ValType),
}

#[derive(Copy, Clone, Eq, PartialEq)]
enum FrameKind {
    Block,
    Loop,
    If,
    Else,
    Try,
    Catch,
    CatchAll,
}

struct Frame {
    kind: FrameKind,
    start: Vec<ValType>,
    end: Vec<ValType>,
    /// Stack height just below the block's parameters. Pops never reach
    /// past it; instead they yield `Bottom` when the frame is unreachable.
    height: usize,
    unreachable: bool,
}

impl Frame {
    /// What a branch to this frame must provide: loops branch back to the
    /// start, everything else to the end.
    fn label_types(&self) -> &[ValType] {
        if self.kind == FrameKind::Loop {
            &self.start
        } else {
            &self.end
        }
    }
}

struct Checker<'a, 'm> {
    v: &'a Validator<'m>,
    location: String,
    results: Vec<ValType>,
    locals: Vec<ValType>,
    stack: Vec<StackType>,
    frames: Vec<Frame>,
    pos: usize,
    const_expr: bool,
    /// Constant expressions may only read globals below this index.
    global_limit: u32,
}

impl<'m> Checker<'_, 'm> {
    fn run(&mut self, body: &[Instruction]) -> Check {
        for (pos, instr) in body.iter().enumerate() {
            self.pos = pos;
            if self.frames.is_empty() {
                return self.fail("Trailing instructions after the final `end`");
            }
            if self.const_expr {
                self.const_allowed(instr)?;
            }
            self.instr(instr)?;
        }
        if !self.frames.is_empty() {
            return self.fail("Missing `end`");
        }
        Ok(())
    }

    fn const_allowed(&self, instr: &Instruction) -> Check {
        use Instruction::*;
        match instr {
            I32Const(_) | I64Const(_) | F32Const(_) | F64Const(_) | V128Const(_) | RefNull(_)
            | RefFunc(_) | GlobalGet(_) | End => Ok(()),
            I32Add | I32Sub | I32Mul | I64Add | I64Sub | I64Mul => {
                self.require(self.v.features.extended_const, "extended-const")
            }
            StructNew(_) | StructNewDefault(_) | ArrayNew(_) | ArrayNewDefault(_)
            | ArrayNewFixed { .. } | RefI31 | AnyConvertExtern | ExternConvertAny => Ok(()),
            _ => self.fail(format!(
                "{} is not allowed in constant expressions",
                instr.mnemonic()
            )),
        }
    }

    fn instr(&mut self, instr: &Instruction) -> Check {
        use Instruction::*;
        match instr {
            // Control.
            Unreachable => self.set_unreachable(),
            Nop => Ok(()),
            Block(bt) => {
                let (params, results) = self.block_signature(*bt)?;
                self.pop_many(&params)?;
                self.push_frame(FrameKind::Block, params, results);
                Ok(())
            }
            Loop(bt) => {
                let (params, results) = self.block_signature(*bt)?;
                self.pop_many(&params)?;
                self.push_frame(FrameKind::Loop, params, results);
                Ok(())
            }
            If(bt) => {
                let (params, results) = self.block_signature(*bt)?;
                self.pop(ValType::I32)?;
                self.pop_many(&params)?;
                self.push_frame(FrameKind::If, params, results);
                Ok(())
            }
            Else => {
                let frame = self.pop_frame()?;
                if frame.kind != FrameKind::If {
                    return self.fail("`else` outside of an `if` block");
                }
                self.push_frame(FrameKind::Else, frame.start, frame.end);
                Ok(())
            }
            Try(bt) => {
                self.require(self.v.features.exceptions, "exceptions")?;
                let (params, results) = self.block_signature(*bt)?;
                self.pop_many(&params)?;
                self.push_frame(FrameKind::Try, params, results);
                Ok(())
            }
            Catch(tag) => {
                self.require(self.v.features.exceptions, "exceptions")?;
                let params = self.tag_params(*tag)?;
                let frame = self.pop_frame()?;
                match frame.kind {
                    FrameKind::Try | FrameKind::Catch => {}
                    FrameKind::CatchAll => return self.fail("`catch` after `catch_all`"),
                    _ => return self.fail("`catch` outside of a `try` block"),
                }
                self.push_frame(FrameKind::Catch, params.to_vec(), frame.end);
                Ok(())
            }
            CatchAll => {
                self.require(self.v.features.exceptions, "exceptions")?;
                let frame = self.pop_frame()?;
                match frame.kind {
                    FrameKind::Try | FrameKind::Catch => {}
                    FrameKind::CatchAll => return self.fail("`catch_all` after `catch_all`"),
                    _ => return self.fail("`catch_all` outside of a `try` block"),
                }
                self.push_frame(FrameKind::CatchAll, Vec::new(), frame.end);
                Ok(())
            }
            Delegate(depth) => {
                self.require(self.v.features.exceptions, "exceptions")?;
                let frame = self.pop_frame()?;
                if frame.kind != FrameKind::Try {
                    return self.fail("`delegate` after `catch`");
                }
                self.frame_at(*depth)?;
                self.push_many(&frame.end);
                Ok(())
            }
            Throw(tag) => {
                self.require(self.v.features.exceptions, "exceptions")?;
                let params = self.tag_params(*tag)?;
                self.pop_many(params)?;
                self.set_unreachable()
            }
            Rethrow(depth) => {
                self.require(self.v.features.exceptions, "exceptions")?;
                let frame = self.frame_at(*depth)?;
                if !matches!(frame.kind, FrameKind::Catch | FrameKind::CatchAll) {
                    return self.fail("`rethrow` target is not a `catch` block");
                }
                self.set_unreachable()
            }
            End => {
                let frame = self.pop_frame()?;
                if frame.kind == FrameKind::If && frame.start != frame.end {
                    return self
                        .fail("`if` without `else` requires matching parameter and result types");
                }
                self.push_many(&frame.end);
                Ok(())
            }
            Br(depth) => {
                let types = self.frame_at(*depth)?.label_types().to_vec();
                self.pop_many_exact(&types)?;
                self.set_unreachable()
            }
            BrIf(depth) => {
                self.pop(ValType::I32)?;
                let types = self.frame_at(*depth)?.label_types().to_vec();
                self.pop_many_exact(&types)?;
                self.push_many(&types);
                Ok(())
            }
            BrTable { targets, default } => {
                self.pop(ValType::I32)?;
                let types = self.frame_at(*default)?.label_types().to_vec();
                for &target in targets {
                    if self.frame_at(target)?.label_types() != types.as_slice() {
                        return self.fail("`br_table` targets have mismatched types");
                    }
                }
                self.pop_many_exact(&types)?;
                self.set_unreachable()
            }
            Return => {
                let types = self.results.clone();
                self.pop_many_exact(&types)?;
                self.set_unreachable()
            }
            Call(func) => {
                let type_idx = self.func_type_idx(*func)?;
                let ty = self.func_type(type_idx)?;
                self.pop_many(&ty.params)?;
                self.push_many(&ty.results);
                Ok(())
            }
            CallIndirect { type_idx, table } => {
                let table_ty = self.table(*table)?;
                if !self.v.heap_subtype(table_ty.element.heap, HeapType::Func) {
                    return self.fail("`call_indirect` requires a table of function references");
                }
                let ty = self.func_type(*type_idx)?;
                self.pop(self.addr(table_ty.limits))?;
                self.pop_many(&ty.params)?;
                self.push_many(&ty.results);
                Ok(())
            }
            ReturnCall(func) => {
                self.require(self.v.features.tail_call, "tail-call")?;
                let type_idx = self.func_type_idx(*func)?;
                let ty = self.func_type(type_idx)?;
                if ty.results != self.results {
                    return self.fail("Tail-call results must match the function results");
                }
                self.pop_many(&ty.params)?;
                self.set_unreachable()
            }
            ReturnCallIndirect { type_idx, table } => {
                self.require(self.v.features.tail_call, "tail-call")?;
                let table_ty = self.table(*table)?;
                if !self.v.heap_subtype(table_ty.element.heap, HeapType::Func) {
                    return self.fail("`call_indirect` requires a table of function references");
                }
                let ty = self.func_type(*type_idx)?;
                if ty.results != self.results {
                    return self.fail("Tail-call results must match the function results");
                }
                self.pop(self.addr(table_ty.limits))?;
                self.pop_many(&ty.params)?;
                self.set_unreachable()
            }
            CallRef(type_idx) => {
                self.require(self.v.features.function_references, "function-references")?;
                let ty = self.func_type(*type_idx)?;
                self.pop(ValType::Ref(RefType {
                    nullable: true,
                    heap: HeapType::Index(*type_idx),
                }))?;
                self.pop_many(&ty.params)?;
                self.push_many(&ty.results);
                Ok(())
            }
            ReturnCallRef(type_idx) => {
                self.require(self.v.features.function_references, "function-references")?;
                self.require(self.v.features.tail_call, "tail-call")?;
                let ty = self.func_type(*type_idx)?;
                if ty.results != self.results {
                    return self.fail("Tail-call results must match the function results");
                }
                self.pop(ValType::Ref(RefType {
                    nullable: true,
                    heap: HeapType::Index(*type_idx),
                }))?;
                self.pop_many(&ty.params)?;
                self.set_unreachable()
            }

            // Parametric.
            Drop => {
                self.pop_any()?;
                Ok(())
            }
            Select => {
                self.pop(ValType::I32)?;
                let a = self.pop_any()?;
                let b = self.pop_any()?;
                let ty = match (a, b) {
                    (StackType::Bottom, other) | (other, StackType::Bottom) => other,
                    (StackType::Val(x), StackType::Val(y)) if x == y => StackType::Val(x),
                    (StackType::Val(x), StackType::Val(y)) => {
                        return self.fail(format!("`select` operands differ: {x} and {y}"));
                    }
                };
                if let StackType::Val(ValType::Ref(_)) = ty {
                    return self.fail("Untyped `select` cannot take references");
                }
                self.stack.push(ty);
                Ok(())
            }
            TypedSelect(ty) => {
                self.require(self.v.features.reference_types, "reference-types")?;
                self.val_type(*ty)?;
                self.pop(ValType::I32)?;
                self.pop(*ty)?;
                self.pop(*ty)?;
                self.push(*ty);
                Ok(())
            }

            // Variables.
            LocalGet(idx) => {
                let ty = self.local(*idx)?;
                self.push(ty);
                Ok(())
            }
            LocalSet(idx) => {
                let ty = self.local(*idx)?;
                self.pop(ty)?;
                Ok(())
            }
            LocalTee(idx) => {
                let ty = self.local(*idx)?;
                self.pop(ty)?;
                self.push(ty);
                Ok(())
            }
            GlobalGet(idx) => {
                let ty = self.global(*idx)?;
                if self.const_expr {
                    if *idx >= self.global_limit {
                        return self.fail(format!("Global {idx} is not yet defined"));
                    }
                    if ty.mutable {
                        return self.fail("Constant expressions cannot read mutable globals");
                    }
                }
                self.push(ty.val_type);
                Ok(())
            }
            GlobalSet(idx) => {
                let ty = self.global(*idx)?;
                if !ty.mutable {
                    return self.fail(format!("Global {idx} is immutable"));
                }
                self.pop(ty.val_type)?;
                Ok(())
            }

            // Tables.
            TableGet(table) => {
                self.require(self.v.features.reference_types, "reference-types")?;
                let ty = self.table(*table)?;
                self.pop(self.addr(ty.limits))?;
                self.push(ValType::Ref(ty.element));
                Ok(())
            }
            TableSet(table) => {
                self.require(self.v.features.reference_types, "reference-types")?;
                let ty = self.table(*table)?;
                self.pop(ValType::Ref(ty.element))?;
                self.pop(self.addr(ty.limits))?;
                Ok(())
            }
            TableInit { elem, table } => {
                self.require(self.v.features.bulk_memory, "bulk-memory")?;
                let table_ty = self.table(*table)?;
                let elem_ty = self.elem(*elem)?;
                if !self.v.ref_subtype(elem_ty, table_ty.element) {
                    return self.fail("Element segment type does not match the table");
                }
                self.pop(ValType::I32)?;
                self.pop(ValType::I32)?;
                self.pop(self.addr(table_ty.limits))?;
                Ok(())
            }
            ElemDrop(elem) => {
                self.require(self.v.features.bulk_memory, "bulk-memory")?;
                self.elem(*elem)?;
                Ok(())
            }
            TableCopy { dst, src } => {
                self.require(self.v.features.bulk_memory, "bulk-memory")?;
                let dst_ty = self.table(*dst)?;
                let src_ty = self.table(*src)?;
                if !self.v.ref_subtype(src_ty.element, dst_ty.element) {
                    return self.fail("Table element types do not match in `table.copy`");
                }
                let len = if dst_ty.limits.memory64 && src_ty.limits.memory64 {
                    ValType::I64
                } else {
                    ValType::I32
                };
                self.pop(len)?;
                self.pop(self.addr(src_ty.limits))?;
                self.pop(self.addr(dst_ty.limits))?;
                Ok(())
            }
            TableGrow(table) => {
                self.require(self.v.features.reference_types, "reference-types")?;
                let ty = self.table(*table)?;
                self.pop(self.addr(ty.limits))?;
                self.pop(ValType::Ref(ty.element))?;
                self.push(self.addr(ty.limits));
                Ok(())
            }
            TableSize(table) => {
                self.require(self.v.features.reference_types, "reference-types")?;
                let ty = self.table(*table)?;
                self.push(self.addr(ty.limits));
                Ok(())
            }
            TableFill(table) => {
                self.require(self.v.features.reference_types, "reference-types")?;
                let ty = self.table(*table)?;
                self.pop(self.addr(ty.limits))?;
                self.pop(ValType::Ref(ty.element))?;
                self.pop(self.addr(ty.limits))?;
                Ok(())
            }

            // Memory.
            I32Load(arg) => self.load(arg, 2, ValType::I32),
            I64Load(arg) => self.load(arg, 3, ValType::I64),
            F32Load(arg) => self.load(arg, 2, ValType::F32),
            F64Load(arg) => self.load(arg, 3, ValType::F64),
            I32Load8S(arg) | I32Load8U(arg) => self.load(arg, 0, ValType::I32),
            I32Load16S(arg) | I32Load16U(arg) => self.load(arg, 1, ValType::I32),
            I64Load8S(arg) | I64Load8U(arg) => self.load(arg, 0, ValType::I64),
            I64Load16S(arg) | I64Load16U(arg) => self.load(arg, 1, ValType::I64),
            I64Load32S(arg) | I64Load32U(arg) => self.load(arg, 2, ValType::I64),
            I32Store(arg) => self.store(arg, 2, ValType::I32),
            I64Store(arg) => self.store(arg, 3, ValType::I64),
            F32Store(arg) => self.store(arg, 2, ValType::F32),
            F64Store(arg) => self.store(arg, 3, ValType::F64),
            I32Store8(arg) => self.store(arg, 0, ValType::I32),
            I32Store16(arg) => self.store(arg, 1, ValType::I32),
            I64Store8(arg) => self.store(arg, 0, ValType::I64),
            I64Store16(arg) => self.store(arg, 1, ValType::I64),
            I64Store32(arg) => self.store(arg, 2, ValType::I64),
            MemorySize(memory) => {
                let limits = self.memory(*memory)?;
                self.push(self.addr(limits));
                Ok(())
            }
            MemoryGrow(memory) => {
                let limits = self.memory(*memory)?;
                self.pop(self.addr(limits))?;
                self.push(self.addr(limits));
                Ok(())
            }
            MemoryInit { data, memory } => {
                self.require(self.v.features.bulk_memory, "bulk-memory")?;
                let limits = self.memory(*memory)?;
                self.data(*data)?;
                self.pop(ValType::I32)?;
                self.pop(ValType::I32)?;
                self.pop(self.addr(limits))?;
                Ok(())
            }
            DataDrop(data) => {
                self.require(self.v.features.bulk_memory, "bulk-memory")?;
                self.data(*data)?;
                Ok(())
            }
            MemoryCopy { dst, src } => {
                self.require(self.v.features.bulk_memory, "bulk-memory")?;
                let dst_limits = self.memory(*dst)?;
                let src_limits = self.memory(*src)?;
                let len = if dst_limits.memory64 && src_limits.memory64 {
                    ValType::I64
                } else {
                    ValType::I32
                };
                self.pop(len)?;
                self.pop(self.addr(src_limits))?;
                self.pop(self.addr(dst_limits))?;
                Ok(())
            }
            MemoryFill(memory) => {
                self.require(self.v.features.bulk_memory, "bulk-memory")?;
                let limits = self.memory(*memory)?;
                self.pop(self.addr(limits))?;
                self.pop(ValType::I32)?;
                self.pop(self.addr(limits))?;
                Ok(())
            }

            // Constants.
            I32Const(_) => {
                self.push(ValType::I32);
                Ok(())
            }
            I64Const(_) => {
                self.push(ValType::I64);
                Ok(())
            }
            F32Const(_) => {
                self.push(ValType::F32);
                Ok(())
            }
            F64Const(_) => {
                self.push(ValType::F64);
                Ok(())
            }

            // Comparisons.
            I32Eqz => self.testop(ValType::I32),
            I32Eq | I32Ne | I32LtS | I32LtU | I32GtS | I32GtU | I32LeS | I32LeU | I32GeS
            | I32GeU => self.cmpop(ValType::I32),
            I64Eqz => self.testop(ValType::I64),
            I64Eq | I64Ne | I64LtS | I64LtU | I64GtS | I64GtU | I64LeS | I64LeU | I64GeS
            | I64GeU => self.cmpop(ValType::I64),
            F32Eq | F32Ne | F32Lt | F32Gt | F32Le | F32Ge => self.cmpop(ValType::F32),
            F64Eq | F64Ne | F64Lt | F64Gt | F64Le | F64Ge => self.cmpop(ValType::F64),

            // Arithmetic.
            I32Clz | I32Ctz | I32Popcnt => self.unop(ValType::I32),
            I32Add | I32Sub | I32Mul | I32DivS | I32DivU | I32RemS | I32RemU | I32And | I32Or
            | I32Xor | I32Shl | I32ShrS | I32ShrU | I32Rotl | I32Rotr => self.binop(ValType::I32),
            I64Clz | I64Ctz | I64Popcnt => self.unop(ValType::I64),
            I64Add | I64Sub | I64Mul | I64DivS | I64DivU | I64RemS | I64RemU | I64And | I64Or
            | I64Xor | I64Shl | I64ShrS | I64ShrU | I64Rotl | I64Rotr => self.binop(ValType::I64),
            F32Abs | F32Neg | F32Ceil | F32Floor | F32Trunc | F32Nearest | F32Sqrt => {
                self.unop(ValType::F32)
            }
            F32Add | F32Sub | F32Mul | F32Div | F32Min | F32Max | F32Copysign => {
                self.binop(ValType::F32)
            }
            F64Abs | F64Neg | F64Ceil | F64Floor | F64Trunc | F64Nearest | F64Sqrt => {
                self.unop(ValType::F64)
            }
            F64Add | F64Sub | F64Mul | F64Div | F64Min | F64Max | F64Copysign => {
                self.binop(ValType::F64)
            }

            // Conversions.
            I32WrapI64 => self.cvtop(ValType::I64, ValType::I32),
            I32TruncF32S | I32TruncF32U => self.cvtop(ValType::F32, ValType::I32),
            I32TruncF64S | I32TruncF64U => self.cvtop(ValType::F64, ValType::I32),
            I64ExtendI32S | I64ExtendI32U => self.cvtop(ValType::I32, ValType::I64),
            I64TruncF32S | I64TruncF32U => self.cvtop(ValType::F32, ValType::I64),
            I64TruncF64S | I64TruncF64U => self.cvtop(ValType::F64, ValType::I64),
            F32ConvertI32S | F32ConvertI32U => self.cvtop(ValType::I32, ValType::F32),
            F32ConvertI64S | F32ConvertI64U => self.cvtop(ValType::I64, ValType::F32),
            F32DemoteF64 => self.cvtop(ValType::F64, ValType::F32),
            F64ConvertI32S | F64ConvertI32U => self.cvtop(ValType::I32, ValType::F64),
            F64ConvertI64S | F64ConvertI64U => self.cvtop(ValType::I64, ValType::F64),
            F64PromoteF32 => self.cvtop(ValType::F32, ValType::F64),
            I32ReinterpretF32 => self.cvtop(ValType::F32, ValType::I32),
            I64ReinterpretF64 => self.cvtop(ValType::F64, ValType::I64),
            F32ReinterpretI32 => self.cvtop(ValType::I32, ValType::F32),
            F64ReinterpretI64 => self.cvtop(ValType::I64, ValType::F64),
            I32Extend8S | I32Extend16S => {
                self.require(self.v.features.sign_extension, "sign-extension")?;
                self.unop(ValType::I32)
            }
            I64Extend8S | I64Extend16S | I64Extend32S => {
                self.require(self.v.features.sign_extension, "sign-extension")?;
                self.unop(ValType::I64)
            }
            I32TruncSatF32S | I32TruncSatF32U => {
                self.require(self.v.features.saturating_float_to_int, "saturating-float-to-int")?;
                self.cvtop(ValType::F32, ValType::I32)
            }
            I32TruncSatF64S | I32TruncSatF64U => {
                self.require(self.v.features.saturating_float_to_int, "saturating-float-to-int")?;
                self.cvtop(ValType::F64, ValType::I32)
            }
            I64TruncSatF32S | I64TruncSatF32U => {
                self.require(self.v.features.saturating_float_to_int, "saturating-float-to-int")?;
                self.cvtop(ValType::F32, ValType::I64)
            }
            I64TruncSatF64S | I64TruncSatF64U => {
                self.require(self.v.features.saturating_float_to_int, "saturating-float-to-int")?;
                self.cvtop(ValType::F64, ValType::I64)
            }

            // References.
            RefNull(heap) => {
                self.heap_type(*heap)?;
                self.push(ValType::Ref(RefType { nullable: true, heap: *heap }));
                Ok(())
            }
            RefIsNull => {
                self.require(self.v.features.reference_types, "reference-types")?;
                self.pop_ref()?;
                self.push(ValType::I32);
                Ok(())
            }
            RefFunc(func) => {
                self.require(self.v.features.reference_types, "reference-types")?;
                let type_idx = self.func_type_idx(*func)?;
                if !self.const_expr && !self.v.declared.contains(func) {
                    return self.fail(format!(
                        "Function {func} is not declared in an element segment or export"
                    ));
                }
                let heap = if self.v.features.typed_refs() {
                    HeapType::Index(type_idx)
                } else {
                    HeapType::Func
                };
                self.push(ValType::Ref(RefType { nullable: false, heap }));
                Ok(())
            }
            RefEq => {
                self.require(self.v.features.gc, "gc")?;
                let eq = ValType::Ref(RefType { nullable: true, heap: HeapType::Eq });
                self.pop(eq)?;
                self.pop(eq)?;
                self.push(ValType::I32);
                Ok(())
            }
            RefAsNonNull => {
                self.require(self.v.features.function_references, "function-references")?;
                match self.pop_ref()? {
                    Some(ty) => self.push(ValType::Ref(RefType { nullable: false, heap: ty.heap })),
                    _ => self.stack.push(StackType::Bottom),
                }
                Ok(())
            }
            BrOnNull(depth) => {
                self.require(self.v.features.function_references, "function-references")?;
                let reference = self.pop_ref()?;
                let types = self.frame_at(*depth)?.label_types().to_vec();
                self.pop_many(&types)?;
                self.push_many(&types);
                match reference {
                    Some(ty) => self.push(ValType::Ref(RefType { nullable: false, heap: ty.heap })),
                    _ => self.stack.push(StackType::Bottom),
                }
                Ok(())
            }
            BrOnNonNull(depth) => {
                self.require(self.v.features.function_references, "function-references")?;
                let types = self.frame_at(*depth)?.label_types().to_vec();
                let Some((&last, rest)) = types.split_last() else {
                    return self.fail("Branch target does not expect a reference");
                };
                let ValType::Ref(target) = last else {
                    return self.fail("Branch target does not expect a reference");
                };
                if let Some(ty) = self.pop_ref()? {
                    let taken = RefType { nullable: false, heap: ty.heap };
                    if !self.v.ref_subtype(taken, target) {
                        return self.fail(format!("Expected {target} but found {ty}"));
                    }
                }
                for &ty in rest.iter().rev() {
                    self.pop(ty)?;
                }
                self.push_many(rest);
                Ok(())
            }

            // Vector memory, constants and shuffles.
            V128Load(arg) => self.vload(arg, 4),
            V128Load8x8S(arg) | V128Load8x8U(arg) | V128Load16x4S(arg) | V128Load16x4U(arg)
            | V128Load32x2S(arg) | V128Load32x2U(arg) => self.vload(arg, 3),
            V128Load8Splat(arg) => self.vload(arg, 0),
            V128Load16Splat(arg) => self.vload(arg, 1),
            V128Load32Splat(arg) => self.vload(arg, 2),
            V128Load64Splat(arg) => self.vload(arg, 3),
            V128Store(arg) => {
                self.require(self.v.features.simd, "simd")?;
                self.store(arg, 4, ValType::V128)
            }
            V128Const(_) => {
                self.require(self.v.features.simd, "simd")?;
                self.push(ValType::V128);
                Ok(())
            }
            I8x16Shuffle(lanes) => {
                self.require(self.v.features.simd, "simd")?;
                if let Some(&lane) = lanes.iter().find(|&&lane| lane >= 32) {
                    return self.fail(format!("Lane index {lane} out of range"));
                }
                self.vbinop()
            }
            I8x16Swizzle => self.vbinop(),
            I8x16Splat | I16x8Splat | I32x4Splat => self.splat(ValType::I32),
            I64x2Splat => self.splat(ValType::I64),
            F32x4Splat => self.splat(ValType::F32),
            F64x2Splat => self.splat(ValType::F64),

            // Vector lane access.
            I8x16ExtractLaneS(lane) | I8x16ExtractLaneU(lane) => {
                self.extract(*lane, 16, ValType::I32)
            }
            I8x16ReplaceLane(lane) => self.replace(*lane, 16, ValType::I32),
            I16x8ExtractLaneS(lane) | I16x8ExtractLaneU(lane) => {
                self.extract(*lane, 8, ValType::I32)
            }
            I16x8ReplaceLane(lane) => self.replace(*lane, 8, ValType::I32),
            I32x4ExtractLane(lane) => self.extract(*lane, 4, ValType::I32),
            I32x4ReplaceLane(lane) => self.replace(*lane, 4, ValType::I32),
            I64x2ExtractLane(lane) => self.extract(*lane, 2, ValType::I64),
            I64x2ReplaceLane(lane) => self.replace(*lane, 2, ValType::I64),
            F32x4ExtractLane(lane) => self.extract(*lane, 4, ValType::F32),
            F32x4ReplaceLane(lane) => self.replace(*lane, 4, ValType::F32),
            F64x2ExtractLane(lane) => self.extract(*lane, 2, ValType::F64),
            F64x2ReplaceLane(lane) => self.replace(*lane, 2, ValType::F64),
            V128Load8Lane(arg, lane) => self.vlane(arg, 0, *lane, 16, true),
            V128Load16Lane(arg, lane) => self.vlane(arg, 1, *lane, 8, true),
            V128Load32Lane(arg, lane) => self.vlane(arg, 2, *lane, 4, true),
            V128Load64Lane(arg, lane) => self.vlane(arg, 3, *lane, 2, true),
            V128Store8Lane(arg, lane) => self.vlane(arg, 0, *lane, 16, false),
            V128Store16Lane(arg, lane) => self.vlane(arg, 1, *lane, 8, false),
            V128Store32Lane(arg, lane) => self.vlane(arg, 2, *lane, 4, false),
            V128Store64Lane(arg, lane) => self.vlane(arg, 3, *lane, 2, false),
            V128Load32Zero(arg) => self.vload(arg, 2),
            V128Load64Zero(arg) => self.vload(arg, 3),

            // Vector comparisons.
            I8x16Eq | I8x16Ne | I8x16LtS | I8x16LtU | I8x16GtS | I8x16GtU | I8x16LeS
            | I8x16LeU | I8x16GeS | I8x16GeU | I16x8Eq | I16x8Ne | I16x8LtS | I16x8LtU
            | I16x8GtS | I16x8GtU | I16x8LeS | I16x8LeU | I16x8GeS | I16x8GeU | I32x4Eq
            | I32x4Ne | I32x4LtS | I32x4LtU | I32x4GtS | I32x4GtU | I32x4LeS | I32x4LeU
            | I32x4GeS | I32x4GeU | F32x4Eq | F32x4Ne | F32x4Lt | F32x4Gt | F32x4Le | F32x4Ge
            | F64x2Eq | F64x2Ne | F64x2Lt | F64x2Gt | F64x2Le | F64x2Ge | I64x2Eq | I64x2Ne
            | I64x2LtS | I64x2GtS | I64x2LeS | I64x2GeS => self.vbinop(),

            // Vector bitwise operations.
            V128Not => self.vunop(),
            V128And | V128AndNot | V128Or | V128Xor => self.vbinop(),
            V128Bitselect => self.vternop(),
            V128AnyTrue => self.vtest(),

            // Vector integer arithmetic.
            I8x16Abs | I8x16Neg | I8x16Popcnt | I16x8Abs | I16x8Neg | I32x4Abs | I32x4Neg
            | I64x2Abs | I64x2Neg => self.vunop(),
            I8x16AllTrue | I8x16Bitmask | I16x8AllTrue | I16x8Bitmask | I32x4AllTrue
            | I32x4Bitmask | I64x2AllTrue | I64x2Bitmask => self.vtest(),
            I8x16Shl | I8x16ShrS | I8x16ShrU | I16x8Shl | I16x8ShrS | I16x8ShrU | I32x4Shl
            | I32x4ShrS | I32x4ShrU | I64x2Shl | I64x2ShrS | I64x2ShrU => self.vshift(),
            I8x16NarrowI16x8S | I8x16NarrowI16x8U | I16x8NarrowI32x4S | I16x8NarrowI32x4U => {
                self.vbinop()
            }
            I8x16Add | I8x16AddSatS | I8x16AddSatU | I8x16Sub | I8x16SubSatS | I8x16SubSatU
            | I8x16MinS | I8x16MinU | I8x16MaxS | I8x16MaxU | I8x16AvgrU => self.vbinop(),
            I16x8Q15MulrSatS | I16x8Add | I16x8AddSatS | I16x8AddSatU | I16x8Sub
            | I16x8SubSatS | I16x8SubSatU | I16x8Mul | I16x8MinS | I16x8MinU | I16x8MaxS
            | I16x8MaxU | I16x8AvgrU => self.vbinop(),
            I32x4Add | I32x4Sub | I32x4Mul | I32x4MinS | I32x4MinU | I32x4MaxS | I32x4MaxU
            | I32x4DotI16x8S => self.vbinop(),
            I64x2Add | I64x2Sub | I64x2Mul => self.vbinop(),
            I16x8ExtaddPairwiseI8x16S | I16x8ExtaddPairwiseI8x16U | I32x4ExtaddPairwiseI16x8S
            | I32x4ExtaddPairwiseI16x8U => self.vunop(),
            I16x8ExtendLowI8x16S | I16x8ExtendHighI8x16S | I16x8ExtendLowI8x16U
            | I16x8ExtendHighI8x16U | I32x4ExtendLowI16x8S | I32x4ExtendHighI16x8S
            | I32x4ExtendLowI16x8U | I32x4ExtendHighI16x8U | I64x2ExtendLowI32x4S
            | I64x2ExtendHighI32x4S | I64x2ExtendLowI32x4U | I64x2ExtendHighI32x4U => {
                self.vunop()
            }
            I16x8ExtmulLowI8x16S | I16x8ExtmulHighI8x16S | I16x8ExtmulLowI8x16U
            | I16x8ExtmulHighI8x16U | I32x4ExtmulLowI16x8S | I32x4ExtmulHighI16x8S
            | I32x4ExtmulLowI16x8U | I32x4ExtmulHighI16x8U | I64x2ExtmulLowI32x4S
            | I64x2ExtmulHighI32x4S | I64x2ExtmulLowI32x4U | I64x2ExtmulHighI32x4U => {
                self.vbinop()
            }

            // Vector float arithmetic and conversions.
            F32x4Ceil | F32x4Floor | F32x4Trunc | F32x4Nearest | F32x4Abs | F32x4Neg
            | F32x4Sqrt | F64x2Ceil | F64x2Floor | F64x2Trunc | F64x2Nearest | F64x2Abs
            | F64x2Neg | F64x2Sqrt => self.vunop(),
            F32x4Add | F32x4Sub | F32x4Mul | F32x4Div | F32x4Min | F32x4Max | F32x4Pmin
            | F32x4Pmax | F64x2Add | F64x2Sub | F64x2Mul | F64x2Div | F64x2Min | F64x2Max
            | F64x2Pmin | F64x2Pmax => self.vbinop(),
            F32x4DemoteF64x2Zero | F64x2PromoteLowF32x4 | I32x4TruncSatF32x4S
            | I32x4TruncSatF32x4U | F32x4ConvertI32x4S | F32x4ConvertI32x4U
            | I32x4TruncSatF64x2SZero | I32x4TruncSatF64x2UZero | F64x2ConvertLowI32x4S
            | F64x2ConvertLowI32x4U => self.vunop(),

            // Relaxed SIMD.
            I8x16RelaxedSwizzle | I16x8RelaxedQ15mulrS | I16x8RelaxedDotI8x16I7x16S => {
                self.require(self.v.features.relaxed_simd, "relaxed-simd")?;
                self.vbinop()
            }
            I32x4RelaxedTruncF32x4S | I32x4RelaxedTruncF32x4U | I32x4RelaxedTruncF64x2SZero
            | I32x4RelaxedTruncF64x2UZero => {
                self.require(self.v.features.relaxed_simd, "relaxed-simd")?;
                self.vunop()
            }
            F32x4RelaxedMadd | F32x4RelaxedNmadd | F64x2RelaxedMadd | F64x2RelaxedNmadd
            | I8x16RelaxedLaneselect | I16x8RelaxedLaneselect | I32x4RelaxedLaneselect
            | I64x2RelaxedLaneselect | I32x4RelaxedDotI8x16I7x16AddS => {
                self.require(self.v.features.relaxed_simd, "relaxed-simd")?;
                self.vternop()
            }
            F32x4RelaxedMin | F32x4RelaxedMax | F64x2RelaxedMin | F64x2RelaxedMax => {
                self.require(self.v.features.relaxed_simd, "relaxed-simd")?;
                self.vbinop()
            }

            // Atomics.
            MemoryAtomicNotify(arg) => {
                self.require(self.v.features.threads, "threads")?;
                let addr = self.mem_access(arg, 2, true)?;
                self.pop(ValType::I32)?;
                self.pop(addr)?;
                self.push(ValType::I32);
                Ok(())
            }
            MemoryAtomicWait32(arg) => {
                self.require(self.v.features.threads, "threads")?;
                let addr = self.mem_access(arg, 2, true)?;
                self.pop(ValType::I64)?;
                self.pop(ValType::I32)?;
                self.pop(addr)?;
                self.push(ValType::I32);
                Ok(())
            }
            MemoryAtomicWait64(arg) => {
                self.require(self.v.features.threads, "threads")?;
                let addr = self.mem_access(arg, 3, true)?;
                self.pop(ValType::I64)?;
                self.pop(ValType::I64)?;
                self.pop(addr)?;
                self.push(ValType::I32);
                Ok(())
            }
            AtomicFence => self.require(self.v.features.threads, "threads"),
            I32AtomicLoad(arg) => self.atomic_load(arg, 2, ValType::I32),
            I64AtomicLoad(arg) => self.atomic_load(arg, 3, ValType::I64),
            I32AtomicLoad8U(arg) => self.atomic_load(arg, 0, ValType::I32),
            I32AtomicLoad16U(arg) => self.atomic_load(arg, 1, ValType::I32),
            I64AtomicLoad8U(arg) => self.atomic_load(arg, 0, ValType::I64),
            I64AtomicLoad16U(arg) => self.atomic_load(arg, 1, ValType::I64),
            I64AtomicLoad32U(arg) => self.atomic_load(arg, 2, ValType::I64),
            I32AtomicStore(arg) => self.atomic_store(arg, 2, ValType::I32),
            I64AtomicStore(arg) => self.atomic_store(arg, 3, ValType::I64),
            I32AtomicStore8(arg) => self.atomic_store(arg, 0, ValType::I32),
            I32AtomicStore16(arg) => self.atomic_store(arg, 1, ValType::I32),
            I64AtomicStore8(arg) => self.atomic_store(arg, 0, ValType::I64),
            I64AtomicStore16(arg) => self.atomic_store(arg, 1, ValType::I64),
            I64AtomicStore32(arg) => self.atomic_store(arg, 2, ValType::I64),
            I32AtomicRmwAdd(arg) | I32AtomicRmwSub(arg) | I32AtomicRmwAnd(arg)
            | I32AtomicRmwOr(arg) | I32AtomicRmwXor(arg) | I32AtomicRmwXchg(arg) => {
                self.atomic_rmw(arg, 2, ValType::I32)
            }
            I64AtomicRmwAdd(arg) | I64AtomicRmwSub(arg) | I64AtomicRmwAnd(arg)
            | I64AtomicRmwOr(arg) | I64AtomicRmwXor(arg) | I64AtomicRmwXchg(arg) => {
                self.atomic_rmw(arg, 3, ValType::I64)
            }
            I32AtomicRmw8AddU(arg) | I32AtomicRmw8SubU(arg) | I32AtomicRmw8AndU(arg)
            | I32AtomicRmw8OrU(arg) | I32AtomicRmw8XorU(arg) | I32AtomicRmw8XchgU(arg) => {
                self.atomic_rmw(arg, 0, ValType::I32)
            }
            I32AtomicRmw16AddU(arg) | I32AtomicRmw16SubU(arg) | I32AtomicRmw16AndU(arg)
            | I32AtomicRmw16OrU(arg) | I32AtomicRmw16XorU(arg) | I32AtomicRmw16XchgU(arg) => {
                self.atomic_rmw(arg, 1, ValType::I32)
            }
            I64AtomicRmw8AddU(arg) | I64AtomicRmw8SubU(arg) | I64AtomicRmw8AndU(arg)
            | I64AtomicRmw8OrU(arg) | I64AtomicRmw8XorU(arg) | I64AtomicRmw8XchgU(arg) => {
                self.atomic_rmw(arg, 0, ValType::I64)
            }
            I64AtomicRmw16AddU(arg) | I64AtomicRmw16SubU(arg) | I64AtomicRmw16AndU(arg)
            | I64AtomicRmw16OrU(arg) | I64AtomicRmw16XorU(arg) | I64AtomicRmw16XchgU(arg) => {
                self.atomic_rmw(arg, 1, ValType::I64)
            }
            I64AtomicRmw32AddU(arg) | I64AtomicRmw32SubU(arg) | I64AtomicRmw32AndU(arg)
            | I64AtomicRmw32OrU(arg) | I64AtomicRmw32XorU(arg) | I64AtomicRmw32XchgU(arg) => {
                self.atomic_rmw(arg, 2, ValType::I64)
            }
            I32AtomicRmwCmpxchg(arg) => self.atomic_cmpxchg(arg, 2, ValType::I32),
            I64AtomicRmwCmpxchg(arg) => self.atomic_cmpxchg(arg, 3, ValType::I64),
            I32AtomicRmw8CmpxchgU(arg) => self.atomic_cmpxchg(arg, 0, ValType::I32),
            I32AtomicRmw16CmpxchgU(arg) => self.atomic_cmpxchg(arg, 1, ValType::I32),
            I64AtomicRmw8CmpxchgU(arg) => self.atomic_cmpxchg(arg, 0, ValType::I64),
            I64AtomicRmw16CmpxchgU(arg) => self.atomic_cmpxchg(arg, 1, ValType::I64),
            I64AtomicRmw32CmpxchgU(arg) => self.atomic_cmpxchg(arg, 2, ValType::I64),

            // Garbage-collected types.
            StructNew(type_idx) => {
                self.require(self.v.features.gc, "gc")?;
                let fields = self.struct_fields(*type_idx)?;
                for field in fields.iter().rev() {
                    self.pop(field.storage.unpacked())?;
                }
                self.push(struct_ref(*type_idx));
                Ok(())
            }
            StructNewDefault(type_idx) => {
                self.require(self.v.features.gc, "gc")?;
                let fields = self.struct_fields(*type_idx)?;
                if fields.iter().any(|field| !field.storage.unpacked().is_defaultable()) {
                    return self.fail("`struct.new_default` requires defaultable fields");
                }
                self.push(struct_ref(*type_idx));
                Ok(())
            }
            StructGet { type_idx, field } => {
                self.require(self.v.features.gc, "gc")?;
                let fields = self.struct_fields(*type_idx)?;
                let field_ty = self.field(fields, *field, *type_idx)?;
                if !matches!(field_ty.storage, StorageType::Val(_)) {
                    return self.fail("Packed fields require `struct.get_s` or `struct.get_u`");
                }
                self.pop(nullable_ref(*type_idx))?;
                self.push(field_ty.storage.unpacked());
                Ok(())
            }
            StructGetS { type_idx, field } | StructGetU { type_idx, field } => {
                self.require(self.v.features.gc, "gc")?;
                let fields = self.struct_fields(*type_idx)?;
                let field_ty = self.field(fields, *field, *type_idx)?;
                if matches!(field_ty.storage, StorageType::Val(_)) {
                    return self.fail("Signed and unsigned gets require a packed field");
                }
                self.pop(nullable_ref(*type_idx))?;
                self.push(field_ty.storage.unpacked());
                Ok(())
            }
            StructSet { type_idx, field } => {
                self.require(self.v.features.gc, "gc")?;
                let fields = self.struct_fields(*type_idx)?;
                let field_ty = self.field(fields, *field, *type_idx)?;
                if !field_ty.mutable {
                    return self.fail(format!("Field {field} of type {type_idx} is immutable"));
                }
                self.pop(field_ty.storage.unpacked())?;
                self.pop(nullable_ref(*type_idx))?;
                Ok(())
            }
            ArrayNew(type_idx) => {
                self.require(self.v.features.gc, "gc")?;
                let elem = self.array_elem(*type_idx)?;
                self.pop(ValType::I32)?;
                self.pop(elem.storage.unpacked())?;
                self.push(struct_ref(*type_idx));
                Ok(())
            }
            ArrayNewDefault(type_idx) => {
                self.require(self.v.features.gc, "gc")?;
                let elem = self.array_elem(*type_idx)?;
                if !elem.storage.unpacked().is_defaultable() {
                    return self.fail("`array.new_default` requires a defaultable element type");
                }
                self.pop(ValType::I32)?;
                self.push(struct_ref(*type_idx));
                Ok(())
            }
            ArrayNewFixed { type_idx, size } => {
                self.require(self.v.features.gc, "gc")?;
                let elem = self.array_elem(*type_idx)?;
                for _ in 0..*size {
                    self.pop(elem.storage.unpacked())?;
                }
                self.push(struct_ref(*type_idx));
                Ok(())
            }
            ArrayNewData { type_idx, data } => {
                self.require(self.v.features.gc, "gc")?;
                let elem = self.array_elem(*type_idx)?;
                if matches!(elem.storage.unpacked(), ValType::Ref(_)) {
                    return self.fail("`array.new_data` requires a numeric element type");
                }
                self.data(*data)?;
                self.pop(ValType::I32)?;
                self.pop(ValType::I32)?;
                self.push(struct_ref(*type_idx));
                Ok(())
            }
            ArrayNewElem { type_idx, elem } => {
                self.require(self.v.features.gc, "gc")?;
                let field = self.array_elem(*type_idx)?;
                let StorageType::Val(ValType::Ref(target)) = field.storage else {
                    return self.fail("`array.new_elem` requires a reference element type");
                };
                let segment = self.elem(*elem)?;
                if !self.v.ref_subtype(segment, target) {
                    return self.fail("Element segment type does not match the array");
                }
                self.pop(ValType::I32)?;
                self.pop(ValType::I32)?;
                self.push(struct_ref(*type_idx));
                Ok(())
            }
            ArrayGet(type_idx) => {
                self.require(self.v.features.gc, "gc")?;
                let elem = self.array_elem(*type_idx)?;
                if !matches!(elem.storage, StorageType::Val(_)) {
                    return self.fail("Packed arrays require `array.get_s` or `array.get_u`");
                }
                self.pop(ValType::I32)?;
                self.pop(nullable_ref(*type_idx))?;
                self.push(elem.storage.unpacked());
                Ok(())
            }
            ArrayGetS(type_idx) | ArrayGetU(type_idx) => {
                self.require(self.v.features.gc, "gc")?;
                let elem = self.array_elem(*type_idx)?;
                if matches!(elem.storage, StorageType::Val(_)) {
                    return self.fail("Signed and unsigned gets require a packed array");
                }
                self.pop(ValType::I32)?;
                self.pop(nullable_ref(*type_idx))?;
                self.push(elem.storage.unpacked());
                Ok(())
            }
            ArraySet(type_idx) => {
                self.require(self.v.features.gc, "gc")?;
                let elem = self.array_elem(*type_idx)?;
                if !elem.mutable {
                    return self.fail(format!("Array type {type_idx} is immutable"));
                }
                self.pop(elem.storage.unpacked())?;
                self.pop(ValType::I32)?;
                self.pop(nullable_ref(*type_idx))?;
                Ok(())
            }
            ArrayLen => {
                self.require(self.v.features.gc, "gc")?;
                self.pop(ValType::Ref(RefType { nullable: true, heap: HeapType::Array }))?;
                self.push(ValType::I32);
                Ok(())
            }
            ArrayFill(type_idx) => {
                self.require(self.v.features.gc, "gc")?;
                let elem = self.array_elem(*type_idx)?;
                if !elem.mutable {
                    return self.fail(format!("Array type {type_idx} is immutable"));
                }
                self.pop(ValType::I32)?;
                self.pop(elem.storage.unpacked())?;
                self.pop(ValType::I32)?;
                self.pop(nullable_ref(*type_idx))?;
                Ok(())
            }
            ArrayCopy { dst, src } => {
                self.require(self.v.features.gc, "gc")?;
                let dst_elem = self.array_elem(*dst)?;
                let src_elem = self.array_elem(*src)?;
                if !dst_elem.mutable {
                    return self.fail(format!("Array type {dst} is immutable"));
                }
                if !self.v.storage_subtype(src_elem.storage, dst_elem.storage) {
                    return self.fail("Array element types do not match in `array.copy`");
                }
                self.pop(ValType::I32)?;
                self.pop(ValType::I32)?;
                self.pop(nullable_ref(*src))?;
                self.pop(ValType::I32)?;
                self.pop(nullable_ref(*dst))?;
                Ok(())
            }
            ArrayInitData { type_idx, data } => {
                self.require(self.v.features.gc, "gc")?;
                let elem = self.array_elem(*type_idx)?;
                if !elem.mutable {
                    return self.fail(format!("Array type {type_idx} is immutable"));
                }
                if matches!(elem.storage.unpacked(), ValType::Ref(_)) {
                    return self.fail("`array.init_data` requires a numeric element type");
                }
                self.data(*data)?;
                self.pop(ValType::I32)?;
                self.pop(ValType::I32)?;
                self.pop(ValType::I32)?;
                self.pop(nullable_ref(*type_idx))?;
                Ok(())
            }
            ArrayInitElem { type_idx, elem } => {
                self.require(self.v.features.gc, "gc")?;
                let field = self.array_elem(*type_idx)?;
                if !field.mutable {
                    return self.fail(format!("Array type {type_idx} is immutable"));
                }
                let StorageType::Val(ValType::Ref(target)) = field.storage else {
                    return self.fail("`array.init_elem` requires a reference element type");
                };
                let segment = self.elem(*elem)?;
                if !self.v.ref_subtype(segment, target) {
                    return self.fail("Element segment type does not match the array");
                }
                self.pop(ValType::I32)?;
                self.pop(ValType::I32)?;
                self.pop(ValType::I32)?;
                self.pop(nullable_ref(*type_idx))?;
                Ok(())
            }
            RefTest(ty) => {
                self.require(self.v.features.gc, "gc")?;
                self.ref_type(*ty)?;
                let top = RefType { nullable: true, heap: self.v.top_heap(ty.heap) };
                self.pop(ValType::Ref(top))?;
                self.push(ValType::I32);
                Ok(())
            }
            RefCast(ty) => {
                self.require(self.v.features.gc, "gc")?;
                self.ref_type(*ty)?;
                let top = RefType { nullable: true, heap: self.v.top_heap(ty.heap) };
                self.pop(ValType::Ref(top))?;
                self.push(ValType::Ref(*ty));
                Ok(())
            }
            BrOnCast { label, from, to } => {
                self.require(self.v.features.gc, "gc")?;
                self.ref_type(*from)?;
                self.ref_type(*to)?;
                if !self.v.ref_subtype(*to, *from) {
                    return self.fail("`br_on_cast` target type must be a subtype of the source");
                }
                let types = self.frame_at(*label)?.label_types().to_vec();
                let Some((&last, rest)) = types.split_last() else {
                    return self.fail("Branch target does not expect a reference");
                };
                let ValType::Ref(target) = last else {
                    return self.fail("Branch target does not expect a reference");
                };
                if !self.v.ref_subtype(*to, target) {
                    return self.fail(format!("Expected {target} but found {to}"));
                }
                self.pop(ValType::Ref(*from))?;
                for &ty in rest.iter().rev() {
                    self.pop(ty)?;
                }
                self.push_many(rest);
                // What falls through is the source minus the cast target.
                let diff = RefType { nullable: from.nullable && !to.nullable, heap: from.heap };
                self.push(ValType::Ref(diff));
                Ok(())
            }
            BrOnCastFail { label, from, to } => {
                self.require(self.v.features.gc, "gc")?;
                self.ref_type(*from)?;
                self.ref_type(*to)?;
                if !self.v.ref_subtype(*to, *from) {
                    return self
                        .fail("`br_on_cast_fail` target type must be a subtype of the source");
                }
                let types = self.frame_at(*label)?.label_types().to_vec();
                let Some((&last, rest)) = types.split_last() else {
                    return self.fail("Branch target does not expect a reference");
                };
                let ValType::Ref(target) = last else {
                    return self.fail("Branch target does not expect a reference");
                };
                let diff = RefType { nullable: from.nullable && !to.nullable, heap: from.heap };
                if !self.v.ref_subtype(diff, target) {
                    return self.fail(format!("Expected {target} but found {diff}"));
                }
                self.pop(ValType::Ref(*from))?;
                for &ty in rest.iter().rev() {
                    self.pop(ty)?;
                }
                self.push_many(rest);
                self.push(ValType::Ref(*to));
                Ok(())
            }
            AnyConvertExtern => {
                self.require(self.v.features.gc, "gc")?;
                let nullable = self.pop_convertible(HeapType::Extern)?;
                self.push(ValType::Ref(RefType { nullable, heap: HeapType::Any }));
                Ok(())
            }
            ExternConvertAny => {
                self.require(self.v.features.gc, "gc")?;
                let nullable = self.pop_convertible(HeapType::Any)?;
                self.push(ValType::Ref(RefType { nullable, heap: HeapType::Extern }));
                Ok(())
            }
            RefI31 => {
                self.require(self.v.features.gc, "gc")?;
                self.pop(ValType::I32)?;
                self.push(ValType::Ref(RefType { nullable: false, heap: HeapType::I31 }));
                Ok(())
            }
            I31GetS | I31GetU => {
                self.require(self.v.features.gc, "gc")?;
                self.pop(ValType::Ref(RefType { nullable: true, heap: HeapType::I31 }))?;
                self.push(ValType::I32);
                Ok(())
            }
        }
    }

    fn fail<T>(&self, message: impl Into<String>) -> Check<T> {
        let location = if self.const_expr {
            self.location.clone()
        } else {
            format!("{} instr[{}]", self.location, self.pos)
        };
        Err(Diagnostic { message: message.into(), location })
    }

    fn require(&self, enabled: bool, feature: &str) -> Check {
        if enabled {
            Ok(())
        } else {
            self.fail(format!("Feature {feature} is not enabled"))
        }
    }

    fn push(&mut self, ty: ValType) {
        self.stack.push(StackType::Val(ty));
    }

    fn push_many(&mut self, types: &[ValType]) {
        for &ty in types {
            self.push(ty);
        }
    }

    fn pop_any(&mut self) -> Check<StackType> {
        let Some(frame) = self.frames.last() else {
            return self.fail("Stack underflow");
        };
        if self.stack.len() == frame.height {
            if frame.unreachable {
                return Ok(StackType::Bottom);
            }
            return self.fail("Stack underflow");
        }
        match self.stack.pop() {
            Some(slot) => Ok(slot),
            _ => self.fail("Stack underflow"),
        }
    }

    fn pop(&mut self, expected: ValType) -> Check {
        match self.pop_any()? {
            StackType::Bottom => Ok(()),
            StackType::Val(ty) if self.v.val_subtype(ty, expected) => Ok(()),
            StackType::Val(ty) => self.fail(format!("Expected {expected} but found {ty}")),
        }
    }

    /// Branches hand their operands to the target frame unchanged, so the
    /// types must match exactly rather than by subtyping.
    fn pop_exact(&mut self, expected: ValType) -> Check {
        match self.pop_any()? {
            StackType::Bottom => Ok(()),
            StackType::Val(ty) if ty == expected => Ok(()),
            StackType::Val(ty) => self.fail(format!("Expected {expected} but found {ty}")),
        }
    }

    fn pop_many(&mut self, expected: &[ValType]) -> Check {
        for &ty in expected.iter().rev() {
            self.pop(ty)?;
        }
        Ok(())
    }

    fn pop_many_exact(&mut self, expected: &[ValType]) -> Check {
        for &ty in expected.iter().rev() {
            self.pop_exact(ty)?;
        }
        Ok(())
    }

    fn pop_ref(&mut self) -> Check<Option<RefType>> {
        match self.pop_any()? {
            StackType::Bottom => Ok(None),
            StackType::Val(ValType::Ref(ty)) => Ok(Some(ty)),
            StackType::Val(ty) => self.fail(format!("Expected a reference but found {ty}")),
        }
    }

    /// Pops the operand of `any.convert_extern` or its inverse and keeps
    /// its nullability for the result.
    fn pop_convertible(&mut self, top: HeapType) -> Check<bool> {
        match self.pop_ref()? {
            Some(ty) => {
                if !self.v.heap_subtype(ty.heap, top) {
                    return self.fail(format!("Expected a {top} reference but found {ty}"));
                }
                Ok(ty.nullable)
            }
            _ => Ok(true),
        }
    }

    fn push_frame(&mut self, kind: FrameKind, start: Vec<ValType>, end: Vec<ValType>) {
        let height = self.stack.len();
        for &ty in &start {
            self.push(ty);
        }
        self.frames.push(Frame { kind, start, end, height, unreachable: false });
    }

    fn pop_frame(&mut self) -> Check<Frame> {
        let Some(frame) = self.frames.last() else {
            return self.fail("Mismatched `end`");
        };
        let end = frame.end.clone();
        let height = frame.height;
        self.pop_many(&end)?;
        if self.stack.len() != height {
            return self.fail("Values remain on the stack at the end of the block");
        }
        match self.frames.pop() {
            Some(frame) => Ok(frame),
            _ => self.fail("Mismatched `end`"),
        }
    }

    fn set_unreachable(&mut self) -> Check {
        let Some(frame) = self.frames.last_mut() else {
            return self.fail("Mismatched `end`");
        };
        frame.unreachable = true;
        let height = frame.height;
        self.stack.truncate(height);
        Ok(())
    }

    fn frame_at(&self, depth: u32) -> Check<&Frame> {
        let idx = self.frames.len().checked_sub(1 + depth as usize);
        match idx.and_then(|idx| self.frames.get(idx)) {
            Some(frame) => Ok(frame),
            _ => self.fail(format!("Branch depth {depth} out of range")),
        }
    }

    fn block_signature(&self, bt: BlockType) -> Check<(Vec<ValType>, Vec<ValType>)> {
        match bt {
            BlockType::Empty => Ok((Vec::new(), Vec::new())),
            BlockType::Result(ty) => {
                self.val_type(ty)?;
                Ok((Vec::new(), vec![ty]))
            }
            BlockType::Func(idx) => {
                let ty = self.func_type(idx)?;
                if !ty.params.is_empty() || ty.results.len() > 1 {
                    self.require(self.v.features.multi_value, "multi-value")?;
                }
                Ok((ty.params.clone(), ty.results.clone()))
            }
        }
    }

    // Lookups below translate the validator's structural errors into
    // positioned diagnostics.

    fn val_type(&self, ty: ValType) -> Check {
        match self.v.val_type_ok(ty) {
            Ok(()) => Ok(()),
            Err(msg) => self.fail(msg),
        }
    }

    fn ref_type(&self, ty: RefType) -> Check {
        match self.v.ref_type_ok(ty) {
            Ok(()) => Ok(()),
            Err(msg) => self.fail(msg),
        }
    }

    fn heap_type(&self, heap: HeapType) -> Check {
        self.ref_type(RefType { nullable: true, heap })
    }

    fn func_type(&self, idx: u32) -> Check<&'m FuncType> {
        match self.v.func_type_at(idx) {
            Ok(ty) => Ok(ty),
            Err(msg) => self.fail(msg),
        }
    }

    fn func_type_idx(&self, func: u32) -> Check<u32> {
        match self.v.module.func_type_idx(func) {
            Some(type_idx) => Ok(type_idx),
            _ => self.fail(format!("Unknown function {func}")),
        }
    }

    fn table(&self, table: u32) -> Check<TableType> {
        match self.v.module.table_type(table) {
            Some(ty) => Ok(ty),
            _ => self.fail(format!("Unknown table {table}")),
        }
    }

    fn memory(&self, memory: u32) -> Check<Limits> {
        match self.v.module.memory_type(memory) {
            Some(limits) => Ok(limits),
            _ => self.fail(format!("Unknown memory {memory}")),
        }
    }

    fn global(&self, global: u32) -> Check<GlobalType> {
        match self.v.module.global_type(global) {
            Some(ty) => Ok(ty),
            _ => self.fail(format!("Unknown global {global}")),
        }
    }

    fn local(&self, local: u32) -> Check<ValType> {
        match self.locals.get(local as usize) {
            Some(&ty) => Ok(ty),
            _ => self.fail(format!("Unknown local {local}")),
        }
    }

    fn elem(&self, elem: u32) -> Check<RefType> {
        match self.v.module.elems.get(elem as usize) {
            Some(segment) => Ok(segment.ty),
            _ => self.fail(format!("Unknown element segment {elem}")),
        }
    }

    fn data(&self, data: u32) -> Check {
        if (data as usize) < self.v.module.datas.len() {
            Ok(())
        } else {
            self.fail(format!("Unknown data segment {data}"))
        }
    }

    fn tag_params(&self, tag: u32) -> Check<&'m [ValType]> {
        let Some(type_idx) = self.v.module.tag_type_idx(tag) else {
            return self.fail(format!("Unknown tag {tag}"));
        };
        Ok(&self.func_type(type_idx)?.params)
    }

    fn struct_fields(&self, type_idx: u32) -> Check<&'m [FieldType]> {
        match self.composite(type_idx)? {
            CompositeType::Struct(fields) => Ok(fields),
            _ => self.fail(format!("Type {type_idx} is not a struct type")),
        }
    }

    fn array_elem(&self, type_idx: u32) -> Check<FieldType> {
        match self.composite(type_idx)? {
            CompositeType::Array(field) => Ok(*field),
            _ => self.fail(format!("Type {type_idx} is not an array type")),
        }
    }

    fn composite(&self, type_idx: u32) -> Check<&'m CompositeType> {
        match self.v.composite(type_idx) {
            Some(ty) => Ok(ty),
            _ => self.fail(format!("Unknown type {type_idx}")),
        }
    }

    fn field(&self, fields: &[FieldType], field: u32, type_idx: u32) -> Check<FieldType> {
        match fields.get(field as usize) {
            Some(&ty) => Ok(ty),
            _ => self.fail(format!("Field {field} out of range for type {type_idx}")),
        }
    }

    fn addr(&self, limits: Limits) -> ValType {
        if limits.memory64 {
            ValType::I64
        } else {
            ValType::I32
        }
    }

    /// Checks the memory index and alignment of a memory access and
    /// returns the address type the operand must have. Atomic accesses
    /// require the alignment to be exactly natural.
    fn mem_access(&self, arg: &MemArg, natural: u32, exact: bool) -> Check<ValType> {
        let limits = self.memory(arg.memory)?;
        if exact {
            if arg.align != natural {
                return self.fail("Atomic operations require natural alignment");
            }
        } else if arg.align > natural {
            return self.fail("Alignment must not exceed the natural alignment");
        }
        if !limits.memory64 && arg.offset > u64::from(u32::MAX) {
            return self.fail("Offset exceeds the 32-bit address range");
        }
        Ok(self.addr(limits))
    }

    fn load(&mut self, arg: &MemArg, natural: u32, ty: ValType) -> Check {
        let addr = self.mem_access(arg, natural, false)?;
        self.pop(addr)?;
        self.push(ty);
        Ok(())
    }

    fn store(&mut self, arg: &MemArg, natural: u32, ty: ValType) -> Check {
        let addr = self.mem_access(arg, natural, false)?;
        self.pop(ty)?;
        self.pop(addr)?;
        Ok(())
    }

    fn atomic_load(&mut self, arg: &MemArg, natural: u32, ty: ValType) -> Check {
        self.require(self.v.features.threads, "threads")?;
        let addr = self.mem_access(arg, natural, true)?;
        self.pop(addr)?;
        self.push(ty);
        Ok(())
    }

    fn atomic_store(&mut self, arg: &MemArg, natural: u32, ty: ValType) -> Check {
        self.require(self.v.features.threads, "threads")?;
        let addr = self.mem_access(arg, natural, true)?;
        self.pop(ty)?;
        self.pop(addr)?;
        Ok(())
    }

    fn atomic_rmw(&mut self, arg: &MemArg, natural: u32, ty: ValType) -> Check {
        self.require(self.v.features.threads, "threads")?;
        let addr = self.mem_access(arg, natural, true)?;
        self.pop(ty)?;
        self.pop(addr)?;
        self.push(ty);
        Ok(())
    }

    fn atomic_cmpxchg(&mut self, arg: &MemArg, natural: u32, ty: ValType) -> Check {
        self.require(self.v.features.threads, "threads")?;
        let addr = self.mem_access(arg, natural, true)?;
        self.pop(ty)?;
        self.pop(ty)?;
        self.pop(addr)?;
        self.push(ty);
        Ok(())
    }

    fn unop(&mut self, ty: ValType) -> Check {
        self.pop(ty)?;
        self.push(ty);
        Ok(())
    }

    fn binop(&mut self, ty: ValType) -> Check {
        self.pop(ty)?;
        self.pop(ty)?;
        self.push(ty);
        Ok(())
    }

    fn testop(&mut self, ty: ValType) -> Check {
        self.pop(ty)?;
        self.push(ValType::I32);
        Ok(())
    }

    fn cmpop(&mut self, ty: ValType) -> Check {
        self.pop(ty)?;
        self.pop(ty)?;
        self.push(ValType::I32);
        Ok(())
    }

    fn cvtop(&mut self, from: ValType, to: ValType) -> Check {
        self.pop(from)?;
        self.push(to);
        Ok(())
    }

    fn vload(&mut self, arg: &MemArg, natural: u32) -> Check {
        self.require(self.v.features.simd, "simd")?;
        self.load(arg, natural, ValType::V128)
    }

    fn vlane(&mut self, arg: &MemArg, natural: u32, lane: u8, lanes: u8, load: bool) -> Check {
        self.require(self.v.features.simd, "simd")?;
        if lane >= lanes {
            return self.fail(format!("Lane index {lane} out of range"));
        }
        let addr = self.mem_access(arg, natural, false)?;
        self.pop(ValType::V128)?;
        self.pop(addr)?;
        if load {
            self.push(ValType::V128);
        }
        Ok(())
    }

    fn vunop(&mut self) -> Check {
        self.require(self.v.features.simd, "simd")?;
        self.unop(ValType::V128)
    }

    fn vbinop(&mut self) -> Check {
        self.require(self.v.features.simd, "simd")?;
        self.binop(ValType::V128)
    }

    fn vternop(&mut self) -> Check {
        self.require(self.v.features.simd, "simd")?;
        self.pop(ValType::V128)?;
        self.pop(ValType::V128)?;
        self.pop(ValType::V128)?;
        self.push(ValType::V128);
        Ok(())
    }

    fn vtest(&mut self) -> Check {
        self.require(self.v.features.simd, "simd")?;
        self.pop(ValType::V128)?;
        self.push(ValType::I32);
        Ok(())
    }

    fn vshift(&mut self) -> Check {
        self.require(self.v.features.simd, "simd")?;
        self.pop(ValType::I32)?;
        self.pop(ValType::V128)?;
        self.push(ValType::V128);
        Ok(())
    }

    fn splat(&mut self, from: ValType) -> Check {
        self.require(self.v.features.simd, "simd")?;
        self.pop(from)?;
        self.push(ValType::V128);
        Ok(())
    }

    fn extract(&mut self, lane: u8, lanes: u8, to: ValType) -> Check {
        self.require(self.v.features.simd, "simd")?;
        if lane >= lanes {
            return self.fail(format!("Lane index {lane} out of range"));
        }
        self.pop(ValType::V128)?;
        self.push(to);
        Ok(())
    }

    fn replace(&mut self, lane: u8, lanes: u8, from: ValType) -> Check {
        self.require(self.v.features.simd, "simd")?;
        if lane >= lanes {
            return self.fail(format!("Lane index {lane} out of range"));
        }
        self.pop(from)?;
        self.pop(ValType::V128)?;
        self.push(ValType::V128);
        Ok(())
    }
}

fn nullable_ref(type_idx: u32) -> ValType {
    ValType::Ref(RefType { nullable: true, heap: HeapType::Index(type_idx) })
}

fn struct_ref(type_idx: u32) -> ValType {
    ValType::Ref(RefType { nullable: false, heap: HeapType::Index(type_idx) })
}
