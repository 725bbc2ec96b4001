use crate::types::{HeapType, RefType, ValType};

/// Memory access immediate. `align` is the log2 exponent from the binary
/// format; `memory` is non-zero only with multi-memory.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct MemArg {
    pub align: u32,
    pub offset: u64,
    pub memory: u32,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum BlockType {
    Empty,
    Result(ValType),
    /// Type-section index; required once params or several results appear.
    Func(u32),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Instruction {
    // Control, 0x00..=0x15 plus the legacy exception opcodes.
    Unreachable,
    Nop,
    Block(BlockType),
    Loop(BlockType),
    If(BlockType),
    Else,
    Try(BlockType),
    Catch(u32),
    Throw(u32),
    Rethrow(u32),
    End,
    Br(u32),
    BrIf(u32),
    BrTable { targets: Vec<u32>, default: u32 },
    Return,
    Call(u32),
    CallIndirect { type_idx: u32, table: u32 },
    ReturnCall(u32),
    ReturnCallIndirect { type_idx: u32, table: u32 },
    CallRef(u32),
    ReturnCallRef(u32),
    Delegate(u32),
    CatchAll,

    // Parametric, 0x1A..=0x1C.
    Drop,
    Select,
    TypedSelect(ValType),

    // Variables, 0x20..=0x24.
    LocalGet(u32),
    LocalSet(u32),
    LocalTee(u32),
    GlobalGet(u32),
    GlobalSet(u32),

    // Tables, 0x25/0x26 and the 0xFC range.
    TableGet(u32),
    TableSet(u32),
    TableInit { elem: u32, table: u32 },
    ElemDrop(u32),
    TableCopy { dst: u32, src: u32 },
    TableGrow(u32),
    TableSize(u32),
    TableFill(u32),

    // Memory, 0x28..=0x40 and the 0xFC range.
    I32Load(MemArg),
    I64Load(MemArg),
    F32Load(MemArg),
    F64Load(MemArg),
    I32Load8S(MemArg),
    I32Load8U(MemArg),
    I32Load16S(MemArg),
    I32Load16U(MemArg),
    I64Load8S(MemArg),
    I64Load8U(MemArg),
    I64Load16S(MemArg),
    I64Load16U(MemArg),
    I64Load32S(MemArg),
    I64Load32U(MemArg),
    I32Store(MemArg),
    I64Store(MemArg),
    F32Store(MemArg),
    F64Store(MemArg),
    I32Store8(MemArg),
    I32Store16(MemArg),
    I64Store8(MemArg),
    I64Store16(MemArg),
    I64Store32(MemArg),
    MemorySize(u32),
    MemoryGrow(u32),
    MemoryInit { data: u32, memory: u32 },
    DataDrop(u32),
    MemoryCopy { dst: u32, src: u32 },
    MemoryFill(u32),

    // Constants. Floats keep their raw bit pattern so NaN payloads
    // survive round trips and equality is bitwise.
    I32Const(i32),
    I64Const(i64),
    F32Const(u32),
    F64Const(u64),

    // i32 tests and comparisons, 0x45..=0x4F.
    I32Eqz,
    I32Eq,
    I32Ne,
    I32LtS,
    I32LtU,
    I32GtS,
    I32GtU,
    I32LeS,
    I32LeU,
    I32GeS,
    I32GeU,
    // i64, 0x50..=0x5A.
    I64Eqz,
    I64Eq,
    I64Ne,
    I64LtS,
    I64LtU,
    I64GtS,
    I64GtU,
    I64LeS,
    I64LeU,
    I64GeS,
    I64GeU,
    // f32/f64, 0x5B..=0x66.
    F32Eq,
    F32Ne,
    F32Lt,
    F32Gt,
    F32Le,
    F32Ge,
    F64Eq,
    F64Ne,
    F64Lt,
    F64Gt,
    F64Le,
    F64Ge,
    // i32 arithmetic, 0x67..=0x78.
    I32Clz,
    I32Ctz,
    I32Popcnt,
    I32Add,
    I32Sub,
    I32Mul,
    I32DivS,
    I32DivU,
    I32RemS,
    I32RemU,
    I32And,
    I32Or,
    I32Xor,
    I32Shl,
    I32ShrS,
    I32ShrU,
    I32Rotl,
    I32Rotr,
    // i64 arithmetic, 0x79..=0x8A.
    I64Clz,
    I64Ctz,
    I64Popcnt,
    I64Add,
    I64Sub,
    I64Mul,
    I64DivS,
    I64DivU,
    I64RemS,
    I64RemU,
    I64And,
    I64Or,
    I64Xor,
    I64Shl,
    I64ShrS,
    I64ShrU,
    I64Rotl,
    I64Rotr,
    // f32 arithmetic, 0x8B..=0x98.
    F32Abs,
    F32Neg,
    F32Ceil,
    F32Floor,
    F32Trunc,
    F32Nearest,
    F32Sqrt,
    F32Add,
    F32Sub,
    F32Mul,
    F32Div,
    F32Min,
    F32Max,
    F32Copysign,
    // f64 arithmetic, 0x99..=0xA6.
    F64Abs,
    F64Neg,
    F64Ceil,
    F64Floor,
    F64Trunc,
    F64Nearest,
    F64Sqrt,
    F64Add,
    F64Sub,
    F64Mul,
    F64Div,
    F64Min,
    F64Max,
    F64Copysign,
    // Conversions, 0xA7..=0xBF.
    I32WrapI64,
    I32TruncF32S,
    I32TruncF32U,
    I32TruncF64S,
    I32TruncF64U,
    I64ExtendI32S,
    I64ExtendI32U,
    I64TruncF32S,
    I64TruncF32U,
    I64TruncF64S,
    I64TruncF64U,
    F32ConvertI32S,
    F32ConvertI32U,
    F32ConvertI64S,
    F32ConvertI64U,
    F32DemoteF64,
    F64ConvertI32S,
    F64ConvertI32U,
    F64ConvertI64S,
    F64ConvertI64U,
    F64PromoteF32,
    I32ReinterpretF32,
    I64ReinterpretF64,
    F32ReinterpretI32,
    F64ReinterpretI64,
    // Sign extension, 0xC0..=0xC4.
    I32Extend8S,
    I32Extend16S,
    I64Extend8S,
    I64Extend16S,
    I64Extend32S,
    // Saturating truncations, 0xFC 0..=7.
    I32TruncSatF32S,
    I32TruncSatF32U,
    I32TruncSatF64S,
    I32TruncSatF64U,
    I64TruncSatF32S,
    I64TruncSatF32U,
    I64TruncSatF64S,
    I64TruncSatF64U,

    // References, 0xD0..=0xD6.
    RefNull(HeapType),
    RefIsNull,
    RefFunc(u32),
    RefEq,
    RefAsNonNull,
    BrOnNull(u32),
    BrOnNonNull(u32),

    // Vector, prefix 0xFD. Kept in sub-opcode order.
    V128Load(MemArg),
    V128Load8x8S(MemArg),
    V128Load8x8U(MemArg),
    V128Load16x4S(MemArg),
    V128Load16x4U(MemArg),
    V128Load32x2S(MemArg),
    V128Load32x2U(MemArg),
    V128Load8Splat(MemArg),
    V128Load16Splat(MemArg),
    V128Load32Splat(MemArg),
    V128Load64Splat(MemArg),
    V128Store(MemArg),
    V128Const([u8; 16]),
    I8x16Shuffle([u8; 16]),
    I8x16Swizzle,
    I8x16Splat,
    I16x8Splat,
    I32x4Splat,
    I64x2Splat,
    F32x4Splat,
    F64x2Splat,
    I8x16ExtractLaneS(u8),
    I8x16ExtractLaneU(u8),
    I8x16ReplaceLane(u8),
    I16x8ExtractLaneS(u8),
    I16x8ExtractLaneU(u8),
    I16x8ReplaceLane(u8),
    I32x4ExtractLane(u8),
    I32x4ReplaceLane(u8),
    I64x2ExtractLane(u8),
    I64x2ReplaceLane(u8),
    F32x4ExtractLane(u8),
    F32x4ReplaceLane(u8),
    F64x2ExtractLane(u8),
    F64x2ReplaceLane(u8),
    I8x16Eq,
    I8x16Ne,
    I8x16LtS,
    I8x16LtU,
    I8x16GtS,
    I8x16GtU,
    I8x16LeS,
    I8x16LeU,
    I8x16GeS,
    I8x16GeU,
    I16x8Eq,
    I16x8Ne,
    I16x8LtS,
    I16x8LtU,
    I16x8GtS,
    I16x8GtU,
    I16x8LeS,
    I16x8LeU,
    I16x8GeS,
    I16x8GeU,
    I32x4Eq,
    I32x4Ne,
    I32x4LtS,
    I32x4LtU,
    I32x4GtS,
    I32x4GtU,
    I32x4LeS,
    I32x4LeU,
    I32x4GeS,
    I32x4GeU,
    F32x4Eq,
    F32x4Ne,
    F32x4Lt,
    F32x4Gt,
    F32x4Le,
    F32x4Ge,
    F64x2Eq,
    F64x2Ne,
    F64x2Lt,
    F64x2Gt,
    F64x2Le,
    F64x2Ge,
    V128Not,
    V128And,
    V128AndNot,
    V128Or,
    V128Xor,
    V128Bitselect,
    V128AnyTrue,
    V128Load8Lane(MemArg, u8),
    V128Load16Lane(MemArg, u8),
    V128Load32Lane(MemArg, u8),
    V128Load64Lane(MemArg, u8),
    V128Store8Lane(MemArg, u8),
    V128Store16Lane(MemArg, u8),
    V128Store32Lane(MemArg, u8),
    V128Store64Lane(MemArg, u8),
    V128Load32Zero(MemArg),
    V128Load64Zero(MemArg),
    F32x4DemoteF64x2Zero,
    F64x2PromoteLowF32x4,
    I8x16Abs,
    I8x16Neg,
    I8x16Popcnt,
    I8x16AllTrue,
    I8x16Bitmask,
    I8x16NarrowI16x8S,
    I8x16NarrowI16x8U,
    F32x4Ceil,
    F32x4Floor,
    F32x4Trunc,
    F32x4Nearest,
    I8x16Shl,
    I8x16ShrS,
    I8x16ShrU,
    I8x16Add,
    I8x16AddSatS,
    I8x16AddSatU,
    I8x16Sub,
    I8x16SubSatS,
    I8x16SubSatU,
    F64x2Ceil,
    F64x2Floor,
    I8x16MinS,
    I8x16MinU,
    I8x16MaxS,
    I8x16MaxU,
    F64x2Trunc,
    I8x16AvgrU,
    I16x8ExtaddPairwiseI8x16S,
    I16x8ExtaddPairwiseI8x16U,
    I32x4ExtaddPairwiseI16x8S,
    I32x4ExtaddPairwiseI16x8U,
    I16x8Abs,
    I16x8Neg,
    I16x8Q15MulrSatS,
    I16x8AllTrue,
    I16x8Bitmask,
    I16x8NarrowI32x4S,
    I16x8NarrowI32x4U,
    I16x8ExtendLowI8x16S,
    I16x8ExtendHighI8x16S,
    I16x8ExtendLowI8x16U,
    I16x8ExtendHighI8x16U,
    I16x8Shl,
    I16x8ShrS,
    I16x8ShrU,
    I16x8Add,
    I16x8AddSatS,
    I16x8AddSatU,
    I16x8Sub,
    I16x8SubSatS,
    I16x8SubSatU,
    F64x2Nearest,
    I16x8Mul,
    I16x8MinS,
    I16x8MinU,
    I16x8MaxS,
    I16x8MaxU,
    I16x8AvgrU,
    I16x8ExtmulLowI8x16S,
    I16x8ExtmulHighI8x16S,
    I16x8ExtmulLowI8x16U,
    I16x8ExtmulHighI8x16U,
    I32x4Abs,
    I32x4Neg,
    I32x4AllTrue,
    I32x4Bitmask,
    I32x4ExtendLowI16x8S,
    I32x4ExtendHighI16x8S,
    I32x4ExtendLowI16x8U,
    I32x4ExtendHighI16x8U,
    I32x4Shl,
    I32x4ShrS,
    I32x4ShrU,
    I32x4Add,
    I32x4Sub,
    I32x4Mul,
    I32x4MinS,
    I32x4MinU,
    I32x4MaxS,
    I32x4MaxU,
    I32x4DotI16x8S,
    I32x4ExtmulLowI16x8S,
    I32x4ExtmulHighI16x8S,
    I32x4ExtmulLowI16x8U,
    I32x4ExtmulHighI16x8U,
    I64x2Abs,
    I64x2Neg,
    I64x2AllTrue,
    I64x2Bitmask,
    I64x2ExtendLowI32x4S,
    I64x2ExtendHighI32x4S,
    I64x2ExtendLowI32x4U,
    I64x2ExtendHighI32x4U,
    I64x2Shl,
    I64x2ShrS,
    I64x2ShrU,
    I64x2Add,
    I64x2Sub,
    I64x2Mul,
    I64x2Eq,
    I64x2Ne,
    I64x2LtS,
    I64x2GtS,
    I64x2LeS,
    I64x2GeS,
    I64x2ExtmulLowI32x4S,
    I64x2ExtmulHighI32x4S,
    I64x2ExtmulLowI32x4U,
    I64x2ExtmulHighI32x4U,
    F32x4Abs,
    F32x4Neg,
    F32x4Sqrt,
    F32x4Add,
    F32x4Sub,
    F32x4Mul,
    F32x4Div,
    F32x4Min,
    F32x4Max,
    F32x4Pmin,
    F32x4Pmax,
    F64x2Abs,
    F64x2Neg,
    F64x2Sqrt,
    F64x2Add,
    F64x2Sub,
    F64x2Mul,
    F64x2Div,
    F64x2Min,
    F64x2Max,
    F64x2Pmin,
    F64x2Pmax,
    I32x4TruncSatF32x4S,
    I32x4TruncSatF32x4U,
    F32x4ConvertI32x4S,
    F32x4ConvertI32x4U,
    I32x4TruncSatF64x2SZero,
    I32x4TruncSatF64x2UZero,
    F64x2ConvertLowI32x4S,
    F64x2ConvertLowI32x4U,
    // Relaxed vector, prefix 0xFD, 0x100..=0x113.
    I8x16RelaxedSwizzle,
    I32x4RelaxedTruncF32x4S,
    I32x4RelaxedTruncF32x4U,
    I32x4RelaxedTruncF64x2SZero,
    I32x4RelaxedTruncF64x2UZero,
    F32x4RelaxedMadd,
    F32x4RelaxedNmadd,
    F64x2RelaxedMadd,
    F64x2RelaxedNmadd,
    I8x16RelaxedLaneselect,
    I16x8RelaxedLaneselect,
    I32x4RelaxedLaneselect,
    I64x2RelaxedLaneselect,
    F32x4RelaxedMin,
    F32x4RelaxedMax,
    F64x2RelaxedMin,
    F64x2RelaxedMax,
    I16x8RelaxedQ15mulrS,
    I16x8RelaxedDotI8x16I7x16S,
    I32x4RelaxedDotI8x16I7x16AddS,

    // Atomics, prefix 0xFE.
    MemoryAtomicNotify(MemArg),
    MemoryAtomicWait32(MemArg),
    MemoryAtomicWait64(MemArg),
    AtomicFence,
    I32AtomicLoad(MemArg),
    I64AtomicLoad(MemArg),
    I32AtomicLoad8U(MemArg),
    I32AtomicLoad16U(MemArg),
    I64AtomicLoad8U(MemArg),
    I64AtomicLoad16U(MemArg),
    I64AtomicLoad32U(MemArg),
    I32AtomicStore(MemArg),
    I64AtomicStore(MemArg),
    I32AtomicStore8(MemArg),
    I32AtomicStore16(MemArg),
    I64AtomicStore8(MemArg),
    I64AtomicStore16(MemArg),
    I64AtomicStore32(MemArg),
    I32AtomicRmwAdd(MemArg),
    I64AtomicRmwAdd(MemArg),
    I32AtomicRmw8AddU(MemArg),
    I32AtomicRmw16AddU(MemArg),
    I64AtomicRmw8AddU(MemArg),
    I64AtomicRmw16AddU(MemArg),
    I64AtomicRmw32AddU(MemArg),
    I32AtomicRmwSub(MemArg),
    I64AtomicRmwSub(MemArg),
    I32AtomicRmw8SubU(MemArg),
    I32AtomicRmw16SubU(MemArg),
    I64AtomicRmw8SubU(MemArg),
    I64AtomicRmw16SubU(MemArg),
    I64AtomicRmw32SubU(MemArg),
    I32AtomicRmwAnd(MemArg),
    I64AtomicRmwAnd(MemArg),
    I32AtomicRmw8AndU(MemArg),
    I32AtomicRmw16AndU(MemArg),
    I64AtomicRmw8AndU(MemArg),
    I64AtomicRmw16AndU(MemArg),
    I64AtomicRmw32AndU(MemArg),
    I32AtomicRmwOr(MemArg),
    I64AtomicRmwOr(MemArg),
    I32AtomicRmw8OrU(MemArg),
    I32AtomicRmw16OrU(MemArg),
    I64AtomicRmw8OrU(MemArg),
    I64AtomicRmw16OrU(MemArg),
    I64AtomicRmw32OrU(MemArg),
    I32AtomicRmwXor(MemArg),
    I64AtomicRmwXor(MemArg),
    I32AtomicRmw8XorU(MemArg),
    I32AtomicRmw16XorU(MemArg),
    I64AtomicRmw8XorU(MemArg),
    I64AtomicRmw16XorU(MemArg),
    I64AtomicRmw32XorU(MemArg),
    I32AtomicRmwXchg(MemArg),
    I64AtomicRmwXchg(MemArg),
    I32AtomicRmw8XchgU(MemArg),
    I32AtomicRmw16XchgU(MemArg),
    I64AtomicRmw8XchgU(MemArg),
    I64AtomicRmw16XchgU(MemArg),
    I64AtomicRmw32XchgU(MemArg),
    I32AtomicRmwCmpxchg(MemArg),
    I64AtomicRmwCmpxchg(MemArg),
    I32AtomicRmw8CmpxchgU(MemArg),
    I32AtomicRmw16CmpxchgU(MemArg),
    I64AtomicRmw8CmpxchgU(MemArg),
    I64AtomicRmw16CmpxchgU(MemArg),
    I64AtomicRmw32CmpxchgU(MemArg),

    // Garbage collection, prefix 0xFB, 0..=30.
    StructNew(u32),
    StructNewDefault(u32),
    StructGet { type_idx: u32, field: u32 },
    StructGetS { type_idx: u32, field: u32 },
    StructGetU { type_idx: u32, field: u32 },
    StructSet { type_idx: u32, field: u32 },
    ArrayNew(u32),
    ArrayNewDefault(u32),
    ArrayNewFixed { type_idx: u32, size: u32 },
    ArrayNewData { type_idx: u32, data: u32 },
    ArrayNewElem { type_idx: u32, elem: u32 },
    ArrayGet(u32),
    ArrayGetS(u32),
    ArrayGetU(u32),
    ArraySet(u32),
    ArrayLen,
    ArrayFill(u32),
    ArrayCopy { dst: u32, src: u32 },
    ArrayInitData { type_idx: u32, data: u32 },
    ArrayInitElem { type_idx: u32, elem: u32 },
    RefTest(RefType),
    RefCast(RefType),
    BrOnCast { label: u32, from: RefType, to: RefType },
    BrOnCastFail { label: u32, from: RefType, to: RefType },
    AnyConvertExtern,
    ExternConvertAny,
    RefI31,
    I31GetS,
    I31GetU,
}

impl Instruction {
    /// The text-format name, used by the printer and in diagnostics.
    pub fn mnemonic(&self) -> &'static str {
        use Instruction::*;
        match self {
            Unreachable => "unreachable",
            Nop => "nop",
            Block(_) => "block",
            Loop(_) => "loop",
            If(_) => "if",
            Else => "else",
            Try(_) => "try",
            Catch(_) => "catch",
            Throw(_) => "throw",
            Rethrow(_) => "rethrow",
            End => "end",
            Br(_) => "br",
            BrIf(_) => "br_if",
            BrTable { .. } => "br_table",
            Return => "return",
            Call(_) => "call",
            CallIndirect { .. } => "call_indirect",
            ReturnCall(_) => "return_call",
            ReturnCallIndirect { .. } => "return_call_indirect",
            CallRef(_) => "call_ref",
            ReturnCallRef(_) => "return_call_ref",
            Delegate(_) => "delegate",
            CatchAll => "catch_all",
            Drop => "drop",
            Select | TypedSelect(_) => "select",
            LocalGet(_) => "local.get",
            LocalSet(_) => "local.set",
            LocalTee(_) => "local.tee",
            GlobalGet(_) => "global.get",
            GlobalSet(_) => "global.set",
            TableGet(_) => "table.get",
            TableSet(_) => "table.set",
            TableInit { .. } => "table.init",
            ElemDrop(_) => "elem.drop",
            TableCopy { .. } => "table.copy",
            TableGrow(_) => "table.grow",
            TableSize(_) => "table.size",
            TableFill(_) => "table.fill",
            I32Load(_) => "i32.load",
            I64Load(_) => "i64.load",
            F32Load(_) => "f32.load",
            F64Load(_) => "f64.load",
            I32Load8S(_) => "i32.load8_s",
            I32Load8U(_) => "i32.load8_u",
            I32Load16S(_) => "i32.load16_s",
            I32Load16U(_) => "i32.load16_u",
            I64Load8S(_) => "i64.load8_s",
            I64Load8U(_) => "i64.load8_u",
            I64Load16S(_) => "i64.load16_s",
            I64Load16U(_) => "i64.load16_u",
            I64Load32S(_) => "i64.load32_s",
            I64Load32U(_) => "i64.load32_u",
            I32Store(_) => "i32.store",
            I64Store(_) => "i64.store",
            F32Store(_) => "f32.store",
            F64Store(_) => "f64.store",
            I32Store8(_) => "i32.store8",
            I32Store16(_) => "i32.store16",
            I64Store8(_) => "i64.store8",
            I64Store16(_) => "i64.store16",
            I64Store32(_) => "i64.store32",
            MemorySize(_) => "memory.size",
            MemoryGrow(_) => "memory.grow",
            MemoryInit { .. } => "memory.init",
            DataDrop(_) => "data.drop",
            MemoryCopy { .. } => "memory.copy",
            MemoryFill(_) => "memory.fill",
            I32Const(_) => "i32.const",
            I64Const(_) => "i64.const",
            F32Const(_) => "f32.const",
            F64Const(_) => "f64.const",
            I32Eqz => "i32.eqz",
            I32Eq => "i32.eq",
            I32Ne => "i32.ne",
            I32LtS => "i32.lt_s",
            I32LtU => "i32.lt_u",
            I32GtS => "i32.gt_s",
            I32GtU => "i32.gt_u",
            I32LeS => "i32.le_s",
            I32LeU => "i32.le_u",
            I32GeS => "i32.ge_s",
            I32GeU => "i32.ge_u",
            I64Eqz => "i64.eqz",
            I64Eq => "i64.eq",
            I64Ne => "i64.ne",
            I64LtS => "i64.lt_s",
            I64LtU => "i64.lt_u",
            I64GtS => "i64.gt_s",
            I64GtU => "i64.gt_u",
            I64LeS => "i64.le_s",
            I64LeU => "i64.le_u",
            I64GeS => "i64.ge_s",
            I64GeU => "i64.ge_u",
            F32Eq => "f32.eq",
            F32Ne => "f32.ne",
            F32Lt => "f32.lt",
            F32Gt => "f32.gt",
            F32Le => "f32.le",
            F32Ge => "f32.ge",
            F64Eq => "f64.eq",
            F64Ne => "f64.ne",
            F64Lt => "f64.lt",
            F64Gt => "f64.gt",
            F64Le => "f64.le",
            F64Ge => "f64.ge",
            I32Clz => "i32.clz",
            I32Ctz => "i32.ctz",
            I32Popcnt => "i32.popcnt",
            I32Add => "i32.add",
            I32Sub => "i32.sub",
            I32Mul => "i32.mul",
            I32DivS => "i32.div_s",
            I32DivU => "i32.div_u",
            I32RemS => "i32.rem_s",
            I32RemU => "i32.rem_u",
            I32And => "i32.and",
            I32Or => "i32.or",
            I32Xor => "i32.xor",
            I32Shl => "i32.shl",
            I32ShrS => "i32.shr_s",
            I32ShrU => "i32.shr_u",
            I32Rotl => "i32.rotl",
            I32Rotr => "i32.rotr",
            I64Clz => "i64.clz",
            I64Ctz => "i64.ctz",
            I64Popcnt => "i64.popcnt",
            I64Add => "i64.add",
            I64Sub => "i64.sub",
            I64Mul => "i64.mul",
            I64DivS => "i64.div_s",
            I64DivU => "i64.div_u",
            I64RemS => "i64.rem_s",
            I64RemU => "i64.rem_u",
            I64And => "i64.and",
            I64Or => "i64.or",
            I64Xor => "i64.xor",
            I64Shl => "i64.shl",
            I64ShrS => "i64.shr_s",
            I64ShrU => "i64.shr_u",
            I64Rotl => "i64.rotl",
            I64Rotr => "i64.rotr",
            F32Abs => "f32.abs",
            F32Neg => "f32.neg",
            F32Ceil => "f32.ceil",
            F32Floor => "f32.floor",
            F32Trunc => "f32.trunc",
            F32Nearest => "f32.nearest",
            F32Sqrt => "f32.sqrt",
            F32Add => "f32.add",
            F32Sub => "f32.sub",
            F32Mul => "f32.mul",
            F32Div => "f32.div",
            F32Min => "f32.min",
            F32Max => "f32.max",
            F32Copysign => "f32.copysign",
            F64Abs => "f64.abs",
            F64Neg => "f64.neg",
            F64Ceil => "f64.ceil",
            F64Floor => "f64.floor",
            F64Trunc => "f64.trunc",
            F64Nearest => "f64.nearest",
            F64Sqrt => "f64.sqrt",
            F64Add => "f64.add",
            F64Sub => "f64.sub",
            F64Mul => "f64.mul",
            F64Div => "f64.div",
            F64Min => "f64.min",
            F64Max => "f64.max",
            F64Copysign => "f64.copysign",
            I32WrapI64 => "i32.wrap_i64",
            I32TruncF32S => "i32.trunc_f32_s",
            I32TruncF32U => "i32.trunc_f32_u",
            I32TruncF64S => "i32.trunc_f64_s",
            I32TruncF64U => "i32.trunc_f64_u",
            I64ExtendI32S => "i64.extend_i32_s",
            I64ExtendI32U => "i64.extend_i32_u",
            I64TruncF32S => "i64.trunc_f32_s",
            I64TruncF32U => "i64.trunc_f32_u",
            I64TruncF64S => "i64.trunc_f64_s",
            I64TruncF64U => "i64.trunc_f64_u",
            F32ConvertI32S => "f32.convert_i32_s",
            F32ConvertI32U => "f32.convert_i32_u",
            F32ConvertI64S => "f32.convert_i64_s",
            F32ConvertI64U => "f32.convert_i64_u",
            F32DemoteF64 => "f32.demote_f64",
            F64ConvertI32S => "f64.convert_i32_s",
            F64ConvertI32U => "f64.convert_i32_u",
            F64ConvertI64S => "f64.convert_i64_s",
            F64ConvertI64U => "f64.convert_i64_u",
            F64PromoteF32 => "f64.promote_f32",
            I32ReinterpretF32 => "i32.reinterpret_f32",
            I64ReinterpretF64 => "i64.reinterpret_f64",
            F32ReinterpretI32 => "f32.reinterpret_i32",
            F64ReinterpretI64 => "f64.reinterpret_i64",
            I32Extend8S => "i32.extend8_s",
            I32Extend16S => "i32.extend16_s",
            I64Extend8S => "i64.extend8_s",
            I64Extend16S => "i64.extend16_s",
            I64Extend32S => "i64.extend32_s",
            I32TruncSatF32S => "i32.trunc_sat_f32_s",
            I32TruncSatF32U => "i32.trunc_sat_f32_u",
            I32TruncSatF64S => "i32.trunc_sat_f64_s",
            I32TruncSatF64U => "i32.trunc_sat_f64_u",
            I64TruncSatF32S => "i64.trunc_sat_f32_s",
            I64TruncSatF32U => "i64.trunc_sat_f32_u",
            I64TruncSatF64S => "i64.trunc_sat_f64_s",
            I64TruncSatF64U => "i64.trunc_sat_f64_u",
            RefNull(_) => "ref.null",
            RefIsNull => "ref.is_null",
            RefFunc(_) => "ref.func",
            RefEq => "ref.eq",
            RefAsNonNull => "ref.as_non_null",
            BrOnNull(_) => "br_on_null",
            BrOnNonNull(_) => "br_on_non_null",
            V128Load(_) => "v128.load",
            V128Load8x8S(_) => "v128.load8x8_s",
            V128Load8x8U(_) => "v128.load8x8_u",
            V128Load16x4S(_) => "v128.load16x4_s",
            V128Load16x4U(_) => "v128.load16x4_u",
            V128Load32x2S(_) => "v128.load32x2_s",
            V128Load32x2U(_) => "v128.load32x2_u",
            V128Load8Splat(_) => "v128.load8_splat",
            V128Load16Splat(_) => "v128.load16_splat",
            V128Load32Splat(_) => "v128.load32_splat",
            V128Load64Splat(_) => "v128.load64_splat",
            V128Store(_) => "v128.store",
            V128Const(_) => "v128.const",
            I8x16Shuffle(_) => "i8x16.shuffle",
            I8x16Swizzle => "i8x16.swizzle",
            I8x16Splat => "i8x16.splat",
            I16x8Splat => "i16x8.splat",
            I32x4Splat => "i32x4.splat",
            I64x2Splat => "i64x2.splat",
            F32x4Splat => "f32x4.splat",
            F64x2Splat => "f64x2.splat",
            I8x16ExtractLaneS(_) => "i8x16.extract_lane_s",
            I8x16ExtractLaneU(_) => "i8x16.extract_lane_u",
            I8x16ReplaceLane(_) => "i8x16.replace_lane",
            I16x8ExtractLaneS(_) => "i16x8.extract_lane_s",
            I16x8ExtractLaneU(_) => "i16x8.extract_lane_u",
            I16x8ReplaceLane(_) => "i16x8.replace_lane",
            I32x4ExtractLane(_) => "i32x4.extract_lane",
            I32x4ReplaceLane(_) => "i32x4.replace_lane",
            I64x2ExtractLane(_) => "i64x2.extract_lane",
            I64x2ReplaceLane(_) => "i64x2.replace_lane",
            F32x4ExtractLane(_) => "f32x4.extract_lane",
            F32x4ReplaceLane(_) => "f32x4.replace_lane",
            F64x2ExtractLane(_) => "f64x2.extract_lane",
            F64x2ReplaceLane(_) => "f64x2.replace_lane",
            I8x16Eq => "i8x16.eq",
            I8x16Ne => "i8x16.ne",
            I8x16LtS => "i8x16.lt_s",
            I8x16LtU => "i8x16.lt_u",
            I8x16GtS => "i8x16.gt_s",
            I8x16GtU => "i8x16.gt_u",
            I8x16LeS => "i8x16.le_s",
            I8x16LeU => "i8x16.le_u",
            I8x16GeS => "i8x16.ge_s",
            I8x16GeU => "i8x16.ge_u",
            I16x8Eq => "i16x8.eq",
            I16x8Ne => "i16x8.ne",
            I16x8LtS => "i16x8.lt_s",
            I16x8LtU => "i16x8.lt_u",
            I16x8GtS => "i16x8.gt_s",
            I16x8GtU => "i16x8.gt_u",
            I16x8LeS => "i16x8.le_s",
            I16x8LeU => "i16x8.le_u",
            I16x8GeS => "i16x8.ge_s",
            I16x8GeU => "i16x8.ge_u",
            I32x4Eq => "i32x4.eq",
            I32x4Ne => "i32x4.ne",
            I32x4LtS => "i32x4.lt_s",
            I32x4LtU => "i32x4.lt_u",
            I32x4GtS => "i32x4.gt_s",
            I32x4GtU => "i32x4.gt_u",
            I32x4LeS => "i32x4.le_s",
            I32x4LeU => "i32x4.le_u",
            I32x4GeS => "i32x4.ge_s",
            I32x4GeU => "i32x4.ge_u",
            F32x4Eq => "f32x4.eq",
            F32x4Ne => "f32x4.ne",
            F32x4Lt => "f32x4.lt",
            F32x4Gt => "f32x4.gt",
            F32x4Le => "f32x4.le",
            F32x4Ge => "f32x4.ge",
            F64x2Eq => "f64x2.eq",
            F64x2Ne => "f64x2.ne",
            F64x2Lt => "f64x2.lt",
            F64x2Gt => "f64x2.gt",
            F64x2Le => "f64x2.le",
            F64x2Ge => "f64x2.ge",
            V128Not => "v128.not",
            V128And => "v128.and",
            V128AndNot => "v128.andnot",
            V128Or => "v128.or",
            V128Xor => "v128.xor",
            V128Bitselect => "v128.bitselect",
            V128AnyTrue => "v128.any_true",
            V128Load8Lane(..) => "v128.load8_lane",
            V128Load16Lane(..) => "v128.load16_lane",
            V128Load32Lane(..) => "v128.load32_lane",
            V128Load64Lane(..) => "v128.load64_lane",
            V128Store8Lane(..) => "v128.store8_lane",
            V128Store16Lane(..) => "v128.store16_lane",
            V128Store32Lane(..) => "v128.store32_lane",
            V128Store64Lane(..) => "v128.store64_lane",
            V128Load32Zero(_) => "v128.load32_zero",
            V128Load64Zero(_) => "v128.load64_zero",
            F32x4DemoteF64x2Zero => "f32x4.demote_f64x2_zero",
            F64x2PromoteLowF32x4 => "f64x2.promote_low_f32x4",
            I8x16Abs => "i8x16.abs",
            I8x16Neg => "i8x16.neg",
            I8x16Popcnt => "i8x16.popcnt",
            I8x16AllTrue => "i8x16.all_true",
            I8x16Bitmask => "i8x16.bitmask",
            I8x16NarrowI16x8S => "i8x16.narrow_i16x8_s",
            I8x16NarrowI16x8U => "i8x16.narrow_i16x8_u",
            F32x4Ceil => "f32x4.ceil",
            F32x4Floor => "f32x4.floor",
            F32x4Trunc => "f32x4.trunc",
            F32x4Nearest => "f32x4.nearest",
            I8x16Shl => "i8x16.shl",
            I8x16ShrS => "i8x16.shr_s",
            I8x16ShrU => "i8x16.shr_u",
            I8x16Add => "i8x16.add",
            I8x16AddSatS => "i8x16.add_sat_s",
            I8x16AddSatU => "i8x16.add_sat_u",
            I8x16Sub => "i8x16.sub",
            I8x16SubSatS => "i8x16.sub_sat_s",
            I8x16SubSatU => "i8x16.sub_sat_u",
            F64x2Ceil => "f64x2.ceil",
            F64x2Floor => "f64x2.floor",
            I8x16MinS => "i8x16.min_s",
            I8x16MinU => "i8x16.min_u",
            I8x16MaxS => "i8x16.max_s",
            I8x16MaxU => "i8x16.max_u",
            F64x2Trunc => "f64x2.trunc",
            I8x16AvgrU => "i8x16.avgr_u",
            I16x8ExtaddPairwiseI8x16S => "i16x8.extadd_pairwise_i8x16_s",
            I16x8ExtaddPairwiseI8x16U => "i16x8.extadd_pairwise_i8x16_u",
            I32x4ExtaddPairwiseI16x8S => "i32x4.extadd_pairwise_i16x8_s",
            I32x4ExtaddPairwiseI16x8U => "i32x4.extadd_pairwise_i16x8_u",
            I16x8Abs => "i16x8.abs",
            I16x8Neg => "i16x8.neg",
            I16x8Q15MulrSatS => "i16x8.q15mulr_sat_s",
            I16x8AllTrue => "i16x8.all_true",
            I16x8Bitmask => "i16x8.bitmask",
            I16x8NarrowI32x4S => "i16x8.narrow_i32x4_s",
            I16x8NarrowI32x4U => "i16x8.narrow_i32x4_u",
            I16x8ExtendLowI8x16S => "i16x8.extend_low_i8x16_s",
            I16x8ExtendHighI8x16S => "i16x8.extend_high_i8x16_s",
            I16x8ExtendLowI8x16U => "i16x8.extend_low_i8x16_u",
            I16x8ExtendHighI8x16U => "i16x8.extend_high_i8x16_u",
            I16x8Shl => "i16x8.shl",
            I16x8ShrS => "i16x8.shr_s",
            I16x8ShrU => "i16x8.shr_u",
            I16x8Add => "i16x8.add",
            I16x8AddSatS => "i16x8.add_sat_s",
            I16x8AddSatU => "i16x8.add_sat_u",
            I16x8Sub => "i16x8.sub",
            I16x8SubSatS => "i16x8.sub_sat_s",
            I16x8SubSatU => "i16x8.sub_sat_u",
            F64x2Nearest => "f64x2.nearest",
            I16x8Mul => "i16x8.mul",
            I16x8MinS => "i16x8.min_s",
            I16x8MinU => "i16x8.min_u",
            I16x8MaxS => "i16x8.max_s",
            I16x8MaxU => "i16x8.max_u",
            I16x8AvgrU => "i16x8.avgr_u",
            I16x8ExtmulLowI8x16S => "i16x8.extmul_low_i8x16_s",
            I16x8ExtmulHighI8x16S => "i16x8.extmul_high_i8x16_s",
            I16x8ExtmulLowI8x16U => "i16x8.extmul_low_i8x16_u",
            I16x8ExtmulHighI8x16U => "i16x8.extmul_high_i8x16_u",
            I32x4Abs => "i32x4.abs",
            I32x4Neg => "i32x4.neg",
            I32x4AllTrue => "i32x4.all_true",
            I32x4Bitmask => "i32x4.bitmask",
            I32x4ExtendLowI16x8S => "i32x4.extend_low_i16x8_s",
            I32x4ExtendHighI16x8S => "i32x4.extend_high_i16x8_s",
            I32x4ExtendLowI16x8U => "i32x4.extend_low_i16x8_u",
            I32x4ExtendHighI16x8U => "i32x4.extend_high_i16x8_u",
            I32x4Shl => "i32x4.shl",
            I32x4ShrS => "i32x4.shr_s",
            I32x4ShrU => "i32x4.shr_u",
            I32x4Add => "i32x4.add",
            I32x4Sub => "i32x4.sub",
            I32x4Mul => "i32x4.mul",
            I32x4MinS => "i32x4.min_s",
            I32x4MinU => "i32x4.min_u",
            I32x4MaxS => "i32x4.max_s",
            I32x4MaxU => "i32x4.max_u",
            I32x4DotI16x8S => "i32x4.dot_i16x8_s",
            I32x4ExtmulLowI16x8S => "i32x4.extmul_low_i16x8_s",
            I32x4ExtmulHighI16x8S => "i32x4.extmul_high_i16x8_s",
            I32x4ExtmulLowI16x8U => "i32x4.extmul_low_i16x8_u",
            I32x4ExtmulHighI16x8U => "i32x4.extmul_high_i16x8_u",
            I64x2Abs => "i64x2.abs",
            I64x2Neg => "i64x2.neg",
            I64x2AllTrue => "i64x2.all_true",
            I64x2Bitmask => "i64x2.bitmask",
            I64x2ExtendLowI32x4S => "i64x2.extend_low_i32x4_s",
            I64x2ExtendHighI32x4S => "i64x2.extend_high_i32x4_s",
            I64x2ExtendLowI32x4U => "i64x2.extend_low_i32x4_u",
            I64x2ExtendHighI32x4U => "i64x2.extend_high_i32x4_u",
            I64x2Shl => "i64x2.shl",
            I64x2ShrS => "i64x2.shr_s",
            I64x2ShrU => "i64x2.shr_u",
            I64x2Add => "i64x2.add",
            I64x2Sub => "i64x2.sub",
            I64x2Mul => "i64x2.mul",
            I64x2Eq => "i64x2.eq",
            I64x2Ne => "i64x2.ne",
            I64x2LtS => "i64x2.lt_s",
            I64x2GtS => "i64x2.gt_s",
            I64x2LeS => "i64x2.le_s",
            I64x2GeS => "i64x2.ge_s",
            I64x2ExtmulLowI32x4S => "i64x2.extmul_low_i32x4_s",
            I64x2ExtmulHighI32x4S => "i64x2.extmul_high_i32x4_s",
            I64x2ExtmulLowI32x4U => "i64x2.extmul_low_i32x4_u",
            I64x2ExtmulHighI32x4U => "i64x2.extmul_high_i32x4_u",
            F32x4Abs => "f32x4.abs",
            F32x4Neg => "f32x4.neg",
            F32x4Sqrt => "f32x4.sqrt",
            F32x4Add => "f32x4.add",
            F32x4Sub => "f32x4.sub",
            F32x4Mul => "f32x4.mul",
            F32x4Div => "f32x4.div",
            F32x4Min => "f32x4.min",
            F32x4Max => "f32x4.max",
            F32x4Pmin => "f32x4.pmin",
            F32x4Pmax => "f32x4.pmax",
            F64x2Abs => "f64x2.abs",
            F64x2Neg => "f64x2.neg",
            F64x2Sqrt => "f64x2.sqrt",
            F64x2Add => "f64x2.add",
            F64x2Sub => "f64x2.sub",
            F64x2Mul => "f64x2.mul",
            F64x2Div => "f64x2.div",
            F64x2Min => "f64x2.min",
            F64x2Max => "f64x2.max",
            F64x2Pmin => "f64x2.pmin",
            F64x2Pmax => "f64x2.pmax",
            I32x4TruncSatF32x4S => "i32x4.trunc_sat_f32x4_s",
            I32x4TruncSatF32x4U => "i32x4.trunc_sat_f32x4_u",
            F32x4ConvertI32x4S => "f32x4.convert_i32x4_s",
            F32x4ConvertI32x4U => "f32x4.convert_i32x4_u",
            I32x4TruncSatF64x2SZero => "i32x4.trunc_sat_f64x2_s_zero",
            I32x4TruncSatF64x2UZero => "i32x4.trunc_sat_f64x2_u_zero",
            F64x2ConvertLowI32x4S => "f64x2.convert_low_i32x4_s",
            F64x2ConvertLowI32x4U => "f64x2.convert_low_i32x4_u",
            I8x16RelaxedSwizzle => "i8x16.relaxed_swizzle",
            I32x4RelaxedTruncF32x4S => "i32x4.relaxed_trunc_f32x4_s",
            I32x4RelaxedTruncF32x4U => "i32x4.relaxed_trunc_f32x4_u",
            I32x4RelaxedTruncF64x2SZero => "i32x4.relaxed_trunc_f64x2_s_zero",
            I32x4RelaxedTruncF64x2UZero => "i32x4.relaxed_trunc_f64x2_u_zero",
            F32x4RelaxedMadd => "f32x4.relaxed_madd",
            F32x4RelaxedNmadd => "f32x4.relaxed_nmadd",
            F64x2RelaxedMadd => "f64x2.relaxed_madd",
            F64x2RelaxedNmadd => "f64x2.relaxed_nmadd",
            I8x16RelaxedLaneselect => "i8x16.relaxed_laneselect",
            I16x8RelaxedLaneselect => "i16x8.relaxed_laneselect",
            I32x4RelaxedLaneselect => "i32x4.relaxed_laneselect",
            I64x2RelaxedLaneselect => "i64x2.relaxed_laneselect",
            F32x4RelaxedMin => "f32x4.relaxed_min",
            F32x4RelaxedMax => "f32x4.relaxed_max",
            F64x2RelaxedMin => "f64x2.relaxed_min",
            F64x2RelaxedMax => "f64x2.relaxed_max",
            I16x8RelaxedQ15mulrS => "i16x8.relaxed_q15mulr_s",
            I16x8RelaxedDotI8x16I7x16S => "i16x8.relaxed_dot_i8x16_i7x16_s",
            I32x4RelaxedDotI8x16I7x16AddS => "i32x4.relaxed_dot_i8x16_i7x16_add_s",
            MemoryAtomicNotify(_) => "memory.atomic.notify",
            MemoryAtomicWait32(_) => "memory.atomic.wait32",
            MemoryAtomicWait64(_) => "memory.atomic.wait64",
            AtomicFence => "atomic.fence",
            I32AtomicLoad(_) => "i32.atomic.load",
            I64AtomicLoad(_) => "i64.atomic.load",
            I32AtomicLoad8U(_) => "i32.atomic.load8_u",
            I32AtomicLoad16U(_) => "i32.atomic.load16_u",
            I64AtomicLoad8U(_) => "i64.atomic.load8_u",
            I64AtomicLoad16U(_) => "i64.atomic.load16_u",
            I64AtomicLoad32U(_) => "i64.atomic.load32_u",
            I32AtomicStore(_) => "i32.atomic.store",
            I64AtomicStore(_) => "i64.atomic.store",
            I32AtomicStore8(_) => "i32.atomic.store8",
            I32AtomicStore16(_) => "i32.atomic.store16",
            I64AtomicStore8(_) => "i64.atomic.store8",
            I64AtomicStore16(_) => "i64.atomic.store16",
            I64AtomicStore32(_) => "i64.atomic.store32",
            I32AtomicRmwAdd(_) => "i32.atomic.rmw.add",
            I64AtomicRmwAdd(_) => "i64.atomic.rmw.add",
            I32AtomicRmw8AddU(_) => "i32.atomic.rmw8.add_u",
            I32AtomicRmw16AddU(_) => "i32.atomic.rmw16.add_u",
            I64AtomicRmw8AddU(_) => "i64.atomic.rmw8.add_u",
            I64AtomicRmw16AddU(_) => "i64.atomic.rmw16.add_u",
            I64AtomicRmw32AddU(_) => "i64.atomic.rmw32.add_u",
            I32AtomicRmwSub(_) => "i32.atomic.rmw.sub",
            I64AtomicRmwSub(_) => "i64.atomic.rmw.sub",
            I32AtomicRmw8SubU(_) => "i32.atomic.rmw8.sub_u",
            I32AtomicRmw16SubU(_) => "i32.atomic.rmw16.sub_u",
            I64AtomicRmw8SubU(_) => "i64.atomic.rmw8.sub_u",
            I64AtomicRmw16SubU(_) => "i64.atomic.rmw16.sub_u",
            I64AtomicRmw32SubU(_) => "i64.atomic.rmw32.sub_u",
            I32AtomicRmwAnd(_) => "i32.atomic.rmw.and",
            I64AtomicRmwAnd(_) => "i64.atomic.rmw.and",
            I32AtomicRmw8AndU(_) => "i32.atomic.rmw8.and_u",
            I32AtomicRmw16AndU(_) => "i32.atomic.rmw16.and_u",
            I64AtomicRmw8AndU(_) => "i64.atomic.rmw8.and_u",
            I64AtomicRmw16AndU(_) => "i64.atomic.rmw16.and_u",
            I64AtomicRmw32AndU(_) => "i64.atomic.rmw32.and_u",
            I32AtomicRmwOr(_) => "i32.atomic.rmw.or",
            I64AtomicRmwOr(_) => "i64.atomic.rmw.or",
            I32AtomicRmw8OrU(_) => "i32.atomic.rmw8.or_u",
            I32AtomicRmw16OrU(_) => "i32.atomic.rmw16.or_u",
            I64AtomicRmw8OrU(_) => "i64.atomic.rmw8.or_u",
            I64AtomicRmw16OrU(_) => "i64.atomic.rmw16.or_u",
            I64AtomicRmw32OrU(_) => "i64.atomic.rmw32.or_u",
            I32AtomicRmwXor(_) => "i32.atomic.rmw.xor",
            I64AtomicRmwXor(_) => "i64.atomic.rmw.xor",
            I32AtomicRmw8XorU(_) => "i32.atomic.rmw8.xor_u",
            I32AtomicRmw16XorU(_) => "i32.atomic.rmw16.xor_u",
            I64AtomicRmw8XorU(_) => "i64.atomic.rmw8.xor_u",
            I64AtomicRmw16XorU(_) => "i64.atomic.rmw16.xor_u",
            I64AtomicRmw32XorU(_) => "i64.atomic.rmw32.xor_u",
            I32AtomicRmwXchg(_) => "i32.atomic.rmw.xchg",
            I64AtomicRmwXchg(_) => "i64.atomic.rmw.xchg",
            I32AtomicRmw8XchgU(_) => "i32.atomic.rmw8.xchg_u",
            I32AtomicRmw16XchgU(_) => "i32.atomic.rmw16.xchg_u",
            I64AtomicRmw8XchgU(_) => "i64.atomic.rmw8.xchg_u",
            I64AtomicRmw16XchgU(_) => "i64.atomic.rmw16.xchg_u",
            I64AtomicRmw32XchgU(_) => "i64.atomic.rmw32.xchg_u",
            I32AtomicRmwCmpxchg(_) => "i32.atomic.rmw.cmpxchg",
            I64AtomicRmwCmpxchg(_) => "i64.atomic.rmw.cmpxchg",
            I32AtomicRmw8CmpxchgU(_) => "i32.atomic.rmw8.cmpxchg_u",
            I32AtomicRmw16CmpxchgU(_) => "i32.atomic.rmw16.cmpxchg_u",
            I64AtomicRmw8CmpxchgU(_) => "i64.atomic.rmw8.cmpxchg_u",
            I64AtomicRmw16CmpxchgU(_) => "i64.atomic.rmw16.cmpxchg_u",
            I64AtomicRmw32CmpxchgU(_) => "i64.atomic.rmw32.cmpxchg_u",
            StructNew(_) => "struct.new",
            StructNewDefault(_) => "struct.new_default",
            StructGet { .. } => "struct.get",
            StructGetS { .. } => "struct.get_s",
            StructGetU { .. } => "struct.get_u",
            StructSet { .. } => "struct.set",
            ArrayNew(_) => "array.new",
            ArrayNewDefault(_) => "array.new_default",
            ArrayNewFixed { .. } => "array.new_fixed",
            ArrayNewData { .. } => "array.new_data",
            ArrayNewElem { .. } => "array.new_elem",
            ArrayGet(_) => "array.get",
            ArrayGetS(_) => "array.get_s",
            ArrayGetU(_) => "array.get_u",
            ArraySet(_) => "array.set",
            ArrayLen => "array.len",
            ArrayFill(_) => "array.fill",
            ArrayCopy { .. } => "array.copy",
            ArrayInitData { .. } => "array.init_data",
            ArrayInitElem { .. } => "array.init_elem",
            RefTest(_) => "ref.test",
            RefCast(_) => "ref.cast",
            BrOnCast { .. } => "br_on_cast",
            BrOnCastFail { .. } => "br_on_cast_fail",
            AnyConvertExtern => "any.convert_extern",
            ExternConvertAny => "extern.convert_any",
            RefI31 => "ref.i31",
            I31GetS => "i31.get_s",
            I31GetU => "i31.get_u",
        }
    }
}
