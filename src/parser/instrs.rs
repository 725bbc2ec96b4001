use std::collections::BTreeMap;

use crate::instr::{Instruction, MemArg};
use crate::lexer::{Token, TokenKind};

use super::{parse_sint, parse_uint, Namespace, ParseResult, Parser, Space};

/// Per-function parsing state: the local index space and the stack of
/// enclosing block labels.
#[derive(Default)]
pub(crate) struct FuncContext<'src> {
    pub(crate) locals: Namespace<'src>,
    pub(crate) local_names: BTreeMap<u32, String>,
    labels: Vec<Option<&'src str>>,
}

impl<'src> Parser<'src> {
    /// Parses instructions up to the closing paren of the current
    /// s-expression and appends the implicit `end`. The paren itself is
    /// left for the caller.
    pub(crate) fn expr_until_close(
        &mut self,
        ctx: &mut FuncContext<'src>,
    ) -> ParseResult<Vec<Instruction>> {
        let mut instrs = Vec::new();
        self.instr_seq(&mut instrs, ctx)?;
        instrs.push(Instruction::End);
        Ok(instrs)
    }

    fn instr_seq(
        &mut self,
        instrs: &mut Vec<Instruction>,
        ctx: &mut FuncContext<'src>,
    ) -> ParseResult<()> {
        loop {
            match self.token.kind {
                TokenKind::LParen => self.folded_instr(instrs, ctx)?,
                TokenKind::Keyword => match self.token_text() {
                    "block" => self.plain_block(instrs, ctx, false)?,
                    "loop" => self.plain_block(instrs, ctx, true)?,
                    "if" => self.plain_if(instrs, ctx)?,
                    "try" => self.plain_try(instrs, ctx)?,
                    "end" | "else" | "catch" | "catch_all" | "delegate" => return Ok(()),
                    _ => {
                        let instr = self.plain_instr(ctx)?;
                        instrs.push(instr);
                    }
                },
                TokenKind::RParen | TokenKind::Eof => return Ok(()),
                TokenKind::UnterminatedStringError => {
                    return self.parse_error("Unterminated string literal")
                }
                TokenKind::UnterminatedCommentError => {
                    return self.parse_error("Unterminated block comment")
                }
                other => return self.parse_error(format!("Expected instruction, got {other:?}")),
            }
        }
    }

    pub(crate) fn folded_instr(
        &mut self,
        instrs: &mut Vec<Instruction>,
        ctx: &mut FuncContext<'src>,
    ) -> ParseResult<()> {
        self.expect(TokenKind::LParen)?;
        if self.token.kind != TokenKind::Keyword {
            return self.parse_error(format!("Expected instruction, got {:?}", self.token.kind));
        }
        match self.token_text() {
            "block" | "loop" => {
                let is_loop = self.token_text() == "loop";
                self.advance();
                let label = self.opt_id();
                let bt = self.block_type()?;
                ctx.labels.push(label);
                instrs.push(if is_loop {
                    Instruction::Loop(bt)
                } else {
                    Instruction::Block(bt)
                });
                self.instr_seq(instrs, ctx)?;
                self.expect(TokenKind::RParen)?;
                instrs.push(Instruction::End);
                ctx.labels.pop();
            }
            "if" => self.folded_if(instrs, ctx)?,
            "try" => self.folded_try(instrs, ctx)?,
            _ => {
                let instr = self.plain_instr(ctx)?;
                while self.token.kind == TokenKind::LParen {
                    self.folded_instr(instrs, ctx)?;
                }
                self.expect(TokenKind::RParen)?;
                instrs.push(instr);
            }
        }
        Ok(())
    }

    fn plain_block(
        &mut self,
        instrs: &mut Vec<Instruction>,
        ctx: &mut FuncContext<'src>,
        is_loop: bool,
    ) -> ParseResult<()> {
        self.advance();
        let label = self.opt_id();
        let bt = self.block_type()?;
        ctx.labels.push(label);
        instrs.push(if is_loop {
            Instruction::Loop(bt)
        } else {
            Instruction::Block(bt)
        });
        self.instr_seq(instrs, ctx)?;
        self.expect_keyword("end")?;
        self.check_label_name(ctx)?;
        instrs.push(Instruction::End);
        ctx.labels.pop();
        Ok(())
    }

    fn plain_if(
        &mut self,
        instrs: &mut Vec<Instruction>,
        ctx: &mut FuncContext<'src>,
    ) -> ParseResult<()> {
        self.advance();
        let label = self.opt_id();
        let bt = self.block_type()?;
        ctx.labels.push(label);
        instrs.push(Instruction::If(bt));
        self.instr_seq(instrs, ctx)?;
        if self.eat_keyword("else") {
            self.check_label_name(ctx)?;
            instrs.push(Instruction::Else);
            self.instr_seq(instrs, ctx)?;
        }
        self.expect_keyword("end")?;
        self.check_label_name(ctx)?;
        instrs.push(Instruction::End);
        ctx.labels.pop();
        Ok(())
    }

    fn plain_try(
        &mut self,
        instrs: &mut Vec<Instruction>,
        ctx: &mut FuncContext<'src>,
    ) -> ParseResult<()> {
        self.advance();
        let label = self.opt_id();
        let bt = self.block_type()?;
        ctx.labels.push(label);
        instrs.push(Instruction::Try(bt));
        self.instr_seq(instrs, ctx)?;
        let mut saw_catch = false;
        loop {
            if self.eat_keyword("catch") {
                saw_catch = true;
                let tag = self.resolve_idx(Space::Tag)?;
                instrs.push(Instruction::Catch(tag));
                self.instr_seq(instrs, ctx)?;
            } else if self.eat_keyword("catch_all") {
                saw_catch = true;
                instrs.push(Instruction::CatchAll);
                self.instr_seq(instrs, ctx)?;
            } else if self.token.kind == TokenKind::Keyword && self.token_text() == "delegate" {
                if saw_catch {
                    return self.parse_error("Delegate after catch");
                }
                self.advance();
                // The try's own label is not a valid delegate target.
                ctx.labels.pop();
                let target = self.label_idx(ctx)?;
                instrs.push(Instruction::Delegate(target));
                return Ok(());
            } else {
                self.expect_keyword("end")?;
                self.check_label_name(ctx)?;
                instrs.push(Instruction::End);
                ctx.labels.pop();
                return Ok(());
            }
        }
    }

    fn folded_if(
        &mut self,
        instrs: &mut Vec<Instruction>,
        ctx: &mut FuncContext<'src>,
    ) -> ParseResult<()> {
        self.advance();
        let label = self.opt_id();
        let bt = self.block_type()?;
        // Folded conditions sit before `then` and outside the label.
        while self.token.kind == TokenKind::LParen && self.peek_keyword() != Some("then") {
            self.folded_instr(instrs, ctx)?;
        }
        ctx.labels.push(label);
        instrs.push(Instruction::If(bt));
        self.expect(TokenKind::LParen)?;
        self.expect_keyword("then")?;
        self.instr_seq(instrs, ctx)?;
        self.expect(TokenKind::RParen)?;
        if self.token.kind == TokenKind::LParen {
            self.expect(TokenKind::LParen)?;
            self.expect_keyword("else")?;
            instrs.push(Instruction::Else);
            self.instr_seq(instrs, ctx)?;
            self.expect(TokenKind::RParen)?;
        }
        self.expect(TokenKind::RParen)?;
        instrs.push(Instruction::End);
        ctx.labels.pop();
        Ok(())
    }

    fn folded_try(
        &mut self,
        instrs: &mut Vec<Instruction>,
        ctx: &mut FuncContext<'src>,
    ) -> ParseResult<()> {
        self.advance();
        let label = self.opt_id();
        let bt = self.block_type()?;
        ctx.labels.push(label);
        instrs.push(Instruction::Try(bt));
        self.expect(TokenKind::LParen)?;
        self.expect_keyword("do")?;
        self.instr_seq(instrs, ctx)?;
        self.expect(TokenKind::RParen)?;
        let mut saw_catch = false;
        while self.token.kind == TokenKind::LParen {
            match self.peek_keyword() {
                Some("catch") => {
                    saw_catch = true;
                    self.expect(TokenKind::LParen)?;
                    self.advance();
                    let tag = self.resolve_idx(Space::Tag)?;
                    instrs.push(Instruction::Catch(tag));
                    self.instr_seq(instrs, ctx)?;
                    self.expect(TokenKind::RParen)?;
                }
                Some("catch_all") => {
                    saw_catch = true;
                    self.expect(TokenKind::LParen)?;
                    self.advance();
                    instrs.push(Instruction::CatchAll);
                    self.instr_seq(instrs, ctx)?;
                    self.expect(TokenKind::RParen)?;
                }
                Some("delegate") => {
                    if saw_catch {
                        return self.parse_error("Delegate after catch");
                    }
                    self.expect(TokenKind::LParen)?;
                    self.advance();
                    ctx.labels.pop();
                    let target = self.label_idx(ctx)?;
                    self.expect(TokenKind::RParen)?;
                    self.expect(TokenKind::RParen)?;
                    instrs.push(Instruction::Delegate(target));
                    return Ok(());
                }
                _ => break,
            }
        }
        self.expect(TokenKind::RParen)?;
        instrs.push(Instruction::End);
        ctx.labels.pop();
        Ok(())
    }

    fn check_label_name(&mut self, ctx: &FuncContext<'src>) -> ParseResult<()> {
        if self.token.kind != TokenKind::Id {
            return Ok(());
        }
        let name = &self.token_text()[1..];
        match ctx.labels.last() {
            Some(Some(label)) if *label == name => {
                self.advance();
                Ok(())
            }
            _ => self.parse_error(format!("Mismatching label ${name}")),
        }
    }

    fn label_idx(&mut self, ctx: &FuncContext<'src>) -> ParseResult<u32> {
        let token = self.token;
        match token.kind {
            TokenKind::Number => self.u32_immediate(),
            TokenKind::Id => {
                let name = &token.span.as_str(self.source)[1..];
                for (depth, label) in ctx.labels.iter().rev().enumerate() {
                    if *label == Some(name) {
                        self.advance();
                        return Ok(depth as u32);
                    }
                }
                self.parse_error(format!("Unknown label ${name}"))
            }
            other => self.parse_error(format!("Expected label, got {other:?}")),
        }
    }

    fn local_idx(&mut self, ctx: &FuncContext<'src>) -> ParseResult<u32> {
        let token = self.token;
        match token.kind {
            TokenKind::Number => self.u32_immediate(),
            TokenKind::Id => {
                let name = &token.span.as_str(self.source)[1..];
                match ctx.locals.resolve(name) {
                    Some(idx) => {
                        self.advance();
                        Ok(idx)
                    }
                    None => self.parse_error(format!("Unknown local ${name}")),
                }
            }
            other => self.parse_error(format!("Expected local index, got {other:?}")),
        }
    }

    fn raw_idx(&mut self) -> Option<Token> {
        if matches!(self.token.kind, TokenKind::Number | TokenKind::Id) {
            let token = self.token;
            self.advance();
            return Some(token);
        }
        None
    }

    fn required_raw_idx(&mut self, what: &str) -> ParseResult<Token> {
        match self.raw_idx() {
            Some(token) => Ok(token),
            None => self.parse_error(format!("Expected {what} index, got {:?}", self.token.kind)),
        }
    }

    fn resolve_raw(&self, space: Space, token: Token) -> ParseResult<u32> {
        let text = token.span.as_str(self.source);
        if token.kind == TokenKind::Number {
            return match parse_uint(text) {
                Some(value) if value <= u64::from(u32::MAX) => Ok(value as u32),
                _ => self.error_at(token.span, format!("Unable to parse index {text}")),
            };
        }
        let name = &text[1..];
        let namespace = match space {
            Space::Type => &self.types,
            Space::Func => &self.funcs,
            Space::Table => &self.tables,
            Space::Memory => &self.memories,
            Space::Global => &self.globals,
            Space::Elem => &self.elems,
            Space::Data => &self.datas,
            Space::Tag => &self.tags,
        };
        match namespace.resolve(name) {
            Some(idx) => Ok(idx),
            None => self.error_at(token.span, format!("Unknown {} ${name}", space.noun())),
        }
    }

    fn mem_arg(&mut self, natural: u32) -> ParseResult<MemArg> {
        let memory = self.opt_idx(Space::Memory)?;
        let offset = self.keyword_arg("offset=")?.unwrap_or(0);
        let align_token = self.token;
        let align = match self.keyword_arg("align=")? {
            Some(value) => {
                if value == 0 || !value.is_power_of_two() {
                    return self.error_at(align_token.span, "Alignment must be a power of two");
                }
                value.trailing_zeros()
            }
            None => natural,
        };
        Ok(MemArg {
            align,
            offset,
            memory,
        })
    }

    fn keyword_arg(&mut self, prefix: &str) -> ParseResult<Option<u64>> {
        if self.token.kind != TokenKind::Keyword {
            return Ok(None);
        }
        let text = self.token_text();
        let value = match text.strip_prefix(prefix) {
            Some(value) => value,
            None => return Ok(None),
        };
        match parse_uint(value) {
            Some(value) => {
                self.advance();
                Ok(Some(value))
            }
            None => self.parse_error(format!("Unable to parse number {text}")),
        }
    }

    fn sint_immediate(&mut self, bits: u32) -> ParseResult<i64> {
        let token = self.token;
        if token.kind != TokenKind::Number {
            return self.parse_error(format!("Expected number, got {:?}", token.kind));
        }
        let text = token.span.as_str(self.source);
        match parse_sint(text, bits) {
            Some(value) => {
                self.advance();
                Ok(value)
            }
            None => self.error_at(token.span, format!("Constant out of range: {text}")),
        }
    }

    fn lane_immediate(&mut self) -> ParseResult<u8> {
        let token = self.token;
        let value = self.u32_immediate()?;
        if value > 255 {
            return self.error_at(token.span, "Lane index out of range");
        }
        Ok(value as u8)
    }

    fn shuffle_lanes(&mut self) -> ParseResult<[u8; 16]> {
        let mut lanes = [0u8; 16];
        for lane in &mut lanes {
            *lane = self.lane_immediate()?;
        }
        Ok(lanes)
    }

    fn v128_immediate(&mut self) -> ParseResult<[u8; 16]> {
        let shape = self.keyword("vector shape")?;
        let mut bytes = [0u8; 16];
        match shape {
            "i8x16" => {
                for byte in &mut bytes {
                    *byte = self.sint_immediate(8)? as u8;
                }
            }
            "i16x8" => {
                for chunk in bytes.chunks_exact_mut(2) {
                    chunk.copy_from_slice(&(self.sint_immediate(16)? as i16).to_le_bytes());
                }
            }
            "i32x4" => {
                for chunk in bytes.chunks_exact_mut(4) {
                    chunk.copy_from_slice(&(self.sint_immediate(32)? as i32).to_le_bytes());
                }
            }
            "i64x2" => {
                for chunk in bytes.chunks_exact_mut(8) {
                    chunk.copy_from_slice(&self.sint_immediate(64)?.to_le_bytes());
                }
            }
            "f32x4" => {
                for chunk in bytes.chunks_exact_mut(4) {
                    chunk.copy_from_slice(&self.f32_immediate()?.to_le_bytes());
                }
            }
            "f64x2" => {
                for chunk in bytes.chunks_exact_mut(8) {
                    chunk.copy_from_slice(&self.f64_immediate()?.to_le_bytes());
                }
            }
            other => return self.parse_error(format!("Unknown vector shape {other}")),
        }
        Ok(bytes)
    }

    /// A plain instruction: mnemonic followed by its immediates. Folded
    /// arguments are handled by the caller.
    fn plain_instr(&mut self, ctx: &mut FuncContext<'src>) -> ParseResult<Instruction> {
        use Instruction::*;
        let kw = self.keyword("instruction")?;
        Ok(match kw {
            // Control.
            "unreachable" => Unreachable,
            "nop" => Nop,
            "br" => Br(self.label_idx(ctx)?),
            "br_if" => BrIf(self.label_idx(ctx)?),
            "br_table" => {
                let mut default = self.label_idx(ctx)?;
                let mut targets = Vec::new();
                while matches!(self.token.kind, TokenKind::Number | TokenKind::Id) {
                    targets.push(default);
                    default = self.label_idx(ctx)?;
                }
                BrTable { targets, default }
            }
            "return" => Return,
            "call" => Call(self.resolve_idx(Space::Func)?),
            "call_indirect" => {
                let table = self.opt_idx(Space::Table)?;
                CallIndirect {
                    type_idx: self.type_use(None)?,
                    table,
                }
            }
            "return_call" => ReturnCall(self.resolve_idx(Space::Func)?),
            "return_call_indirect" => {
                let table = self.opt_idx(Space::Table)?;
                ReturnCallIndirect {
                    type_idx: self.type_use(None)?,
                    table,
                }
            }
            "call_ref" => CallRef(self.resolve_idx(Space::Type)?),
            "return_call_ref" => ReturnCallRef(self.resolve_idx(Space::Type)?),
            "throw" => Throw(self.resolve_idx(Space::Tag)?),
            "rethrow" => Rethrow(self.label_idx(ctx)?),

            // Parametric.
            "drop" => Drop,
            "select" => {
                if self.at_sexpr("result") {
                    self.expect(TokenKind::LParen)?;
                    self.advance();
                    let mut results = Vec::new();
                    while self.token.kind != TokenKind::RParen {
                        results.push(self.val_type()?);
                    }
                    self.expect(TokenKind::RParen)?;
                    if results.len() != 1 {
                        return self.parse_error("Invalid result arity for select");
                    }
                    TypedSelect(results[0])
                } else {
                    Select
                }
            }

            // Variables.
            "local.get" => LocalGet(self.local_idx(ctx)?),
            "local.set" => LocalSet(self.local_idx(ctx)?),
            "local.tee" => LocalTee(self.local_idx(ctx)?),
            "global.get" => GlobalGet(self.resolve_idx(Space::Global)?),
            "global.set" => GlobalSet(self.resolve_idx(Space::Global)?),

            // Tables.
            "table.get" => TableGet(self.opt_idx(Space::Table)?),
            "table.set" => TableSet(self.opt_idx(Space::Table)?),
            "table.size" => TableSize(self.opt_idx(Space::Table)?),
            "table.grow" => TableGrow(self.opt_idx(Space::Table)?),
            "table.fill" => TableFill(self.opt_idx(Space::Table)?),
            "table.init" => {
                let first = self.required_raw_idx("element segment")?;
                match self.raw_idx() {
                    Some(second) => TableInit {
                        table: self.resolve_raw(Space::Table, first)?,
                        elem: self.resolve_raw(Space::Elem, second)?,
                    },
                    None => TableInit {
                        table: 0,
                        elem: self.resolve_raw(Space::Elem, first)?,
                    },
                }
            }
            "table.copy" => match self.raw_idx() {
                Some(dst) => {
                    let src = self.required_raw_idx("table")?;
                    TableCopy {
                        dst: self.resolve_raw(Space::Table, dst)?,
                        src: self.resolve_raw(Space::Table, src)?,
                    }
                }
                None => TableCopy { dst: 0, src: 0 },
            },
            "elem.drop" => ElemDrop(self.resolve_idx(Space::Elem)?),

            // Memory.
            "i32.load" => I32Load(self.mem_arg(2)?),
            "i64.load" => I64Load(self.mem_arg(3)?),
            "f32.load" => F32Load(self.mem_arg(2)?),
            "f64.load" => F64Load(self.mem_arg(3)?),
            "i32.load8_s" => I32Load8S(self.mem_arg(0)?),
            "i32.load8_u" => I32Load8U(self.mem_arg(0)?),
            "i32.load16_s" => I32Load16S(self.mem_arg(1)?),
            "i32.load16_u" => I32Load16U(self.mem_arg(1)?),
            "i64.load8_s" => I64Load8S(self.mem_arg(0)?),
            "i64.load8_u" => I64Load8U(self.mem_arg(0)?),
            "i64.load16_s" => I64Load16S(self.mem_arg(1)?),
            "i64.load16_u" => I64Load16U(self.mem_arg(1)?),
            "i64.load32_s" => I64Load32S(self.mem_arg(2)?),
            "i64.load32_u" => I64Load32U(self.mem_arg(2)?),
            "i32.store" => I32Store(self.mem_arg(2)?),
            "i64.store" => I64Store(self.mem_arg(3)?),
            "f32.store" => F32Store(self.mem_arg(2)?),
            "f64.store" => F64Store(self.mem_arg(3)?),
            "i32.store8" => I32Store8(self.mem_arg(0)?),
            "i32.store16" => I32Store16(self.mem_arg(1)?),
            "i64.store8" => I64Store8(self.mem_arg(0)?),
            "i64.store16" => I64Store16(self.mem_arg(1)?),
            "i64.store32" => I64Store32(self.mem_arg(2)?),
            "memory.size" => MemorySize(self.opt_idx(Space::Memory)?),
            "memory.grow" => MemoryGrow(self.opt_idx(Space::Memory)?),
            "memory.fill" => MemoryFill(self.opt_idx(Space::Memory)?),
            "memory.init" => {
                let first = self.required_raw_idx("data segment")?;
                match self.raw_idx() {
                    Some(second) => MemoryInit {
                        memory: self.resolve_raw(Space::Memory, first)?,
                        data: self.resolve_raw(Space::Data, second)?,
                    },
                    None => MemoryInit {
                        memory: 0,
                        data: self.resolve_raw(Space::Data, first)?,
                    },
                }
            }
            "memory.copy" => match self.raw_idx() {
                Some(dst) => {
                    let src = self.required_raw_idx("memory")?;
                    MemoryCopy {
                        dst: self.resolve_raw(Space::Memory, dst)?,
                        src: self.resolve_raw(Space::Memory, src)?,
                    }
                }
                None => MemoryCopy { dst: 0, src: 0 },
            },
            "data.drop" => DataDrop(self.resolve_idx(Space::Data)?),

            // Constants.
            "i32.const" => I32Const(self.i32_immediate()?),
            "i64.const" => I64Const(self.i64_immediate()?),
            "f32.const" => F32Const(self.f32_immediate()?),
            "f64.const" => F64Const(self.f64_immediate()?),

            // Comparisons.
            "i32.eqz" => I32Eqz,
            "i32.eq" => I32Eq,
            "i32.ne" => I32Ne,
            "i32.lt_s" => I32LtS,
            "i32.lt_u" => I32LtU,
            "i32.gt_s" => I32GtS,
            "i32.gt_u" => I32GtU,
            "i32.le_s" => I32LeS,
            "i32.le_u" => I32LeU,
            "i32.ge_s" => I32GeS,
            "i32.ge_u" => I32GeU,
            "i64.eqz" => I64Eqz,
            "i64.eq" => I64Eq,
            "i64.ne" => I64Ne,
            "i64.lt_s" => I64LtS,
            "i64.lt_u" => I64LtU,
            "i64.gt_s" => I64GtS,
            "i64.gt_u" => I64GtU,
            "i64.le_s" => I64LeS,
            "i64.le_u" => I64LeU,
            "i64.ge_s" => I64GeS,
            "i64.ge_u" => I64GeU,
            "f32.eq" => F32Eq,
            "f32.ne" => F32Ne,
            "f32.lt" => F32Lt,
            "f32.gt" => F32Gt,
            "f32.le" => F32Le,
            "f32.ge" => F32Ge,
            "f64.eq" => F64Eq,
            "f64.ne" => F64Ne,
            "f64.lt" => F64Lt,
            "f64.gt" => F64Gt,
            "f64.le" => F64Le,
            "f64.ge" => F64Ge,

            // Arithmetic.
            "i32.clz" => I32Clz,
            "i32.ctz" => I32Ctz,
            "i32.popcnt" => I32Popcnt,
            "i32.add" => I32Add,
            "i32.sub" => I32Sub,
            "i32.mul" => I32Mul,
            "i32.div_s" => I32DivS,
            "i32.div_u" => I32DivU,
            "i32.rem_s" => I32RemS,
            "i32.rem_u" => I32RemU,
            "i32.and" => I32And,
            "i32.or" => I32Or,
            "i32.xor" => I32Xor,
            "i32.shl" => I32Shl,
            "i32.shr_s" => I32ShrS,
            "i32.shr_u" => I32ShrU,
            "i32.rotl" => I32Rotl,
            "i32.rotr" => I32Rotr,
            "i64.clz" => I64Clz,
            "i64.ctz" => I64Ctz,
            "i64.popcnt" => I64Popcnt,
            "i64.add" => I64Add,
            "i64.sub" => I64Sub,
            "i64.mul" => I64Mul,
            "i64.div_s" => I64DivS,
            "i64.div_u" => I64DivU,
            "i64.rem_s" => I64RemS,
            "i64.rem_u" => I64RemU,
            "i64.and" => I64And,
            "i64.or" => I64Or,
            "i64.xor" => I64Xor,
            "i64.shl" => I64Shl,
            "i64.shr_s" => I64ShrS,
            "i64.shr_u" => I64ShrU,
            "i64.rotl" => I64Rotl,
            "i64.rotr" => I64Rotr,
            "f32.abs" => F32Abs,
            "f32.neg" => F32Neg,
            "f32.ceil" => F32Ceil,
            "f32.floor" => F32Floor,
            "f32.trunc" => F32Trunc,
            "f32.nearest" => F32Nearest,
            "f32.sqrt" => F32Sqrt,
            "f32.add" => F32Add,
            "f32.sub" => F32Sub,
            "f32.mul" => F32Mul,
            "f32.div" => F32Div,
            "f32.min" => F32Min,
            "f32.max" => F32Max,
            "f32.copysign" => F32Copysign,
            "f64.abs" => F64Abs,
            "f64.neg" => F64Neg,
            "f64.ceil" => F64Ceil,
            "f64.floor" => F64Floor,
            "f64.trunc" => F64Trunc,
            "f64.nearest" => F64Nearest,
            "f64.sqrt" => F64Sqrt,
            "f64.add" => F64Add,
            "f64.sub" => F64Sub,
            "f64.mul" => F64Mul,
            "f64.div" => F64Div,
            "f64.min" => F64Min,
            "f64.max" => F64Max,
            "f64.copysign" => F64Copysign,

            // Conversions.
            "i32.wrap_i64" => I32WrapI64,
            "i32.trunc_f32_s" => I32TruncF32S,
            "i32.trunc_f32_u" => I32TruncF32U,
            "i32.trunc_f64_s" => I32TruncF64S,
            "i32.trunc_f64_u" => I32TruncF64U,
            "i64.extend_i32_s" => I64ExtendI32S,
            "i64.extend_i32_u" => I64ExtendI32U,
            "i64.trunc_f32_s" => I64TruncF32S,
            "i64.trunc_f32_u" => I64TruncF32U,
            "i64.trunc_f64_s" => I64TruncF64S,
            "i64.trunc_f64_u" => I64TruncF64U,
            "f32.convert_i32_s" => F32ConvertI32S,
            "f32.convert_i32_u" => F32ConvertI32U,
            "f32.convert_i64_s" => F32ConvertI64S,
            "f32.convert_i64_u" => F32ConvertI64U,
            "f32.demote_f64" => F32DemoteF64,
            "f64.convert_i32_s" => F64ConvertI32S,
            "f64.convert_i32_u" => F64ConvertI32U,
            "f64.convert_i64_s" => F64ConvertI64S,
            "f64.convert_i64_u" => F64ConvertI64U,
            "f64.promote_f32" => F64PromoteF32,
            "i32.reinterpret_f32" => I32ReinterpretF32,
            "i64.reinterpret_f64" => I64ReinterpretF64,
            "f32.reinterpret_i32" => F32ReinterpretI32,
            "f64.reinterpret_i64" => F64ReinterpretI64,
            "i32.extend8_s" => I32Extend8S,
            "i32.extend16_s" => I32Extend16S,
            "i64.extend8_s" => I64Extend8S,
            "i64.extend16_s" => I64Extend16S,
            "i64.extend32_s" => I64Extend32S,
            "i32.trunc_sat_f32_s" => I32TruncSatF32S,
            "i32.trunc_sat_f32_u" => I32TruncSatF32U,
            "i32.trunc_sat_f64_s" => I32TruncSatF64S,
            "i32.trunc_sat_f64_u" => I32TruncSatF64U,
            "i64.trunc_sat_f32_s" => I64TruncSatF32S,
            "i64.trunc_sat_f32_u" => I64TruncSatF32U,
            "i64.trunc_sat_f64_s" => I64TruncSatF64S,
            "i64.trunc_sat_f64_u" => I64TruncSatF64U,

            // References.
            "ref.null" => RefNull(self.heap_type()?),
            "ref.is_null" => RefIsNull,
            "ref.func" => RefFunc(self.resolve_idx(Space::Func)?),
            "ref.eq" => RefEq,
            "ref.as_non_null" => RefAsNonNull,
            "br_on_null" => BrOnNull(self.label_idx(ctx)?),
            "br_on_non_null" => BrOnNonNull(self.label_idx(ctx)?),

            // Garbage-collected types.
            "struct.new" => StructNew(self.resolve_idx(Space::Type)?),
            "struct.new_default" => StructNewDefault(self.resolve_idx(Space::Type)?),
            "struct.get" => {
                let type_idx = self.resolve_idx(Space::Type)?;
                StructGet {
                    type_idx,
                    field: self.resolve_field_idx(type_idx)?,
                }
            }
            "struct.get_s" => {
                let type_idx = self.resolve_idx(Space::Type)?;
                StructGetS {
                    type_idx,
                    field: self.resolve_field_idx(type_idx)?,
                }
            }
            "struct.get_u" => {
                let type_idx = self.resolve_idx(Space::Type)?;
                StructGetU {
                    type_idx,
                    field: self.resolve_field_idx(type_idx)?,
                }
            }
            "struct.set" => {
                let type_idx = self.resolve_idx(Space::Type)?;
                StructSet {
                    type_idx,
                    field: self.resolve_field_idx(type_idx)?,
                }
            }
            "array.new" => ArrayNew(self.resolve_idx(Space::Type)?),
            "array.new_default" => ArrayNewDefault(self.resolve_idx(Space::Type)?),
            "array.new_fixed" => ArrayNewFixed {
                type_idx: self.resolve_idx(Space::Type)?,
                size: self.u32_immediate()?,
            },
            "array.new_data" => ArrayNewData {
                type_idx: self.resolve_idx(Space::Type)?,
                data: self.resolve_idx(Space::Data)?,
            },
            "array.new_elem" => ArrayNewElem {
                type_idx: self.resolve_idx(Space::Type)?,
                elem: self.resolve_idx(Space::Elem)?,
            },
            "array.get" => ArrayGet(self.resolve_idx(Space::Type)?),
            "array.get_s" => ArrayGetS(self.resolve_idx(Space::Type)?),
            "array.get_u" => ArrayGetU(self.resolve_idx(Space::Type)?),
            "array.set" => ArraySet(self.resolve_idx(Space::Type)?),
            "array.len" => ArrayLen,
            "array.fill" => ArrayFill(self.resolve_idx(Space::Type)?),
            "array.copy" => ArrayCopy {
                dst: self.resolve_idx(Space::Type)?,
                src: self.resolve_idx(Space::Type)?,
            },
            "array.init_data" => ArrayInitData {
                type_idx: self.resolve_idx(Space::Type)?,
                data: self.resolve_idx(Space::Data)?,
            },
            "array.init_elem" => ArrayInitElem {
                type_idx: self.resolve_idx(Space::Type)?,
                elem: self.resolve_idx(Space::Elem)?,
            },
            "ref.test" => RefTest(self.ref_type()?),
            "ref.cast" => RefCast(self.ref_type()?),
            "br_on_cast" => {
                let label = self.label_idx(ctx)?;
                BrOnCast {
                    label,
                    from: self.ref_type()?,
                    to: self.ref_type()?,
                }
            }
            "br_on_cast_fail" => {
                let label = self.label_idx(ctx)?;
                BrOnCastFail {
                    label,
                    from: self.ref_type()?,
                    to: self.ref_type()?,
                }
            }
            "any.convert_extern" => AnyConvertExtern,
            "extern.convert_any" => ExternConvertAny,
            "ref.i31" => RefI31,
            "i31.get_s" => I31GetS,
            "i31.get_u" => I31GetU,

            // Atomics.
            "memory.atomic.notify" => MemoryAtomicNotify(self.mem_arg(2)?),
            "memory.atomic.wait32" => MemoryAtomicWait32(self.mem_arg(2)?),
            "memory.atomic.wait64" => MemoryAtomicWait64(self.mem_arg(3)?),
            "atomic.fence" => AtomicFence,
            "i32.atomic.load" => I32AtomicLoad(self.mem_arg(2)?),
            "i64.atomic.load" => I64AtomicLoad(self.mem_arg(3)?),
            "i32.atomic.load8_u" => I32AtomicLoad8U(self.mem_arg(0)?),
            "i32.atomic.load16_u" => I32AtomicLoad16U(self.mem_arg(1)?),
            "i64.atomic.load8_u" => I64AtomicLoad8U(self.mem_arg(0)?),
            "i64.atomic.load16_u" => I64AtomicLoad16U(self.mem_arg(1)?),
            "i64.atomic.load32_u" => I64AtomicLoad32U(self.mem_arg(2)?),
            "i32.atomic.store" => I32AtomicStore(self.mem_arg(2)?),
            "i64.atomic.store" => I64AtomicStore(self.mem_arg(3)?),
            "i32.atomic.store8" => I32AtomicStore8(self.mem_arg(0)?),
            "i32.atomic.store16" => I32AtomicStore16(self.mem_arg(1)?),
            "i64.atomic.store8" => I64AtomicStore8(self.mem_arg(0)?),
            "i64.atomic.store16" => I64AtomicStore16(self.mem_arg(1)?),
            "i64.atomic.store32" => I64AtomicStore32(self.mem_arg(2)?),
            "i32.atomic.rmw.add" => I32AtomicRmwAdd(self.mem_arg(2)?),
            "i64.atomic.rmw.add" => I64AtomicRmwAdd(self.mem_arg(3)?),
            "i32.atomic.rmw8.add_u" => I32AtomicRmw8AddU(self.mem_arg(0)?),
            "i32.atomic.rmw16.add_u" => I32AtomicRmw16AddU(self.mem_arg(1)?),
            "i64.atomic.rmw8.add_u" => I64AtomicRmw8AddU(self.mem_arg(0)?),
            "i64.atomic.rmw16.add_u" => I64AtomicRmw16AddU(self.mem_arg(1)?),
            "i64.atomic.rmw32.add_u" => I64AtomicRmw32AddU(self.mem_arg(2)?),
            "i32.atomic.rmw.sub" => I32AtomicRmwSub(self.mem_arg(2)?),
            "i64.atomic.rmw.sub" => I64AtomicRmwSub(self.mem_arg(3)?),
            "i32.atomic.rmw8.sub_u" => I32AtomicRmw8SubU(self.mem_arg(0)?),
            "i32.atomic.rmw16.sub_u" => I32AtomicRmw16SubU(self.mem_arg(1)?),
            "i64.atomic.rmw8.sub_u" => I64AtomicRmw8SubU(self.mem_arg(0)?),
            "i64.atomic.rmw16.sub_u" => I64AtomicRmw16SubU(self.mem_arg(1)?),
            "i64.atomic.rmw32.sub_u" => I64AtomicRmw32SubU(self.mem_arg(2)?),
            "i32.atomic.rmw.and" => I32AtomicRmwAnd(self.mem_arg(2)?),
            "i64.atomic.rmw.and" => I64AtomicRmwAnd(self.mem_arg(3)?),
            "i32.atomic.rmw8.and_u" => I32AtomicRmw8AndU(self.mem_arg(0)?),
            "i32.atomic.rmw16.and_u" => I32AtomicRmw16AndU(self.mem_arg(1)?),
            "i64.atomic.rmw8.and_u" => I64AtomicRmw8AndU(self.mem_arg(0)?),
            "i64.atomic.rmw16.and_u" => I64AtomicRmw16AndU(self.mem_arg(1)?),
            "i64.atomic.rmw32.and_u" => I64AtomicRmw32AndU(self.mem_arg(2)?),
            "i32.atomic.rmw.or" => I32AtomicRmwOr(self.mem_arg(2)?),
            "i64.atomic.rmw.or" => I64AtomicRmwOr(self.mem_arg(3)?),
            "i32.atomic.rmw8.or_u" => I32AtomicRmw8OrU(self.mem_arg(0)?),
            "i32.atomic.rmw16.or_u" => I32AtomicRmw16OrU(self.mem_arg(1)?),
            "i64.atomic.rmw8.or_u" => I64AtomicRmw8OrU(self.mem_arg(0)?),
            "i64.atomic.rmw16.or_u" => I64AtomicRmw16OrU(self.mem_arg(1)?),
            "i64.atomic.rmw32.or_u" => I64AtomicRmw32OrU(self.mem_arg(2)?),
            "i32.atomic.rmw.xor" => I32AtomicRmwXor(self.mem_arg(2)?),
            "i64.atomic.rmw.xor" => I64AtomicRmwXor(self.mem_arg(3)?),
            "i32.atomic.rmw8.xor_u" => I32AtomicRmw8XorU(self.mem_arg(0)?),
            "i32.atomic.rmw16.xor_u" => I32AtomicRmw16XorU(self.mem_arg(1)?),
            "i64.atomic.rmw8.xor_u" => I64AtomicRmw8XorU(self.mem_arg(0)?),
            "i64.atomic.rmw16.xor_u" => I64AtomicRmw16XorU(self.mem_arg(1)?),
            "i64.atomic.rmw32.xor_u" => I64AtomicRmw32XorU(self.mem_arg(2)?),
            "i32.atomic.rmw.xchg" => I32AtomicRmwXchg(self.mem_arg(2)?),
            "i64.atomic.rmw.xchg" => I64AtomicRmwXchg(self.mem_arg(3)?),
            "i32.atomic.rmw8.xchg_u" => I32AtomicRmw8XchgU(self.mem_arg(0)?),
            "i32.atomic.rmw16.xchg_u" => I32AtomicRmw16XchgU(self.mem_arg(1)?),
            "i64.atomic.rmw8.xchg_u" => I64AtomicRmw8XchgU(self.mem_arg(0)?),
            "i64.atomic.rmw16.xchg_u" => I64AtomicRmw16XchgU(self.mem_arg(1)?),
            "i64.atomic.rmw32.xchg_u" => I64AtomicRmw32XchgU(self.mem_arg(2)?),
            "i32.atomic.rmw.cmpxchg" => I32AtomicRmwCmpxchg(self.mem_arg(2)?),
            "i64.atomic.rmw.cmpxchg" => I64AtomicRmwCmpxchg(self.mem_arg(3)?),
            "i32.atomic.rmw8.cmpxchg_u" => I32AtomicRmw8CmpxchgU(self.mem_arg(0)?),
            "i32.atomic.rmw16.cmpxchg_u" => I32AtomicRmw16CmpxchgU(self.mem_arg(1)?),
            "i64.atomic.rmw8.cmpxchg_u" => I64AtomicRmw8CmpxchgU(self.mem_arg(0)?),
            "i64.atomic.rmw16.cmpxchg_u" => I64AtomicRmw16CmpxchgU(self.mem_arg(1)?),
            "i64.atomic.rmw32.cmpxchg_u" => I64AtomicRmw32CmpxchgU(self.mem_arg(2)?),

            // Vector memory and constants.
            "v128.load" => V128Load(self.mem_arg(4)?),
            "v128.load8x8_s" => V128Load8x8S(self.mem_arg(3)?),
            "v128.load8x8_u" => V128Load8x8U(self.mem_arg(3)?),
            "v128.load16x4_s" => V128Load16x4S(self.mem_arg(3)?),
            "v128.load16x4_u" => V128Load16x4U(self.mem_arg(3)?),
            "v128.load32x2_s" => V128Load32x2S(self.mem_arg(3)?),
            "v128.load32x2_u" => V128Load32x2U(self.mem_arg(3)?),
            "v128.load8_splat" => V128Load8Splat(self.mem_arg(0)?),
            "v128.load16_splat" => V128Load16Splat(self.mem_arg(1)?),
            "v128.load32_splat" => V128Load32Splat(self.mem_arg(2)?),
            "v128.load64_splat" => V128Load64Splat(self.mem_arg(3)?),
            "v128.load32_zero" => V128Load32Zero(self.mem_arg(2)?),
            "v128.load64_zero" => V128Load64Zero(self.mem_arg(3)?),
            "v128.store" => V128Store(self.mem_arg(4)?),
            "v128.load8_lane" => V128Load8Lane(self.mem_arg(0)?, self.lane_immediate()?),
            "v128.load16_lane" => V128Load16Lane(self.mem_arg(1)?, self.lane_immediate()?),
            "v128.load32_lane" => V128Load32Lane(self.mem_arg(2)?, self.lane_immediate()?),
            "v128.load64_lane" => V128Load64Lane(self.mem_arg(3)?, self.lane_immediate()?),
            "v128.store8_lane" => V128Store8Lane(self.mem_arg(0)?, self.lane_immediate()?),
            "v128.store16_lane" => V128Store16Lane(self.mem_arg(1)?, self.lane_immediate()?),
            "v128.store32_lane" => V128Store32Lane(self.mem_arg(2)?, self.lane_immediate()?),
            "v128.store64_lane" => V128Store64Lane(self.mem_arg(3)?, self.lane_immediate()?),
            "v128.const" => V128Const(self.v128_immediate()?),
            "i8x16.shuffle" => I8x16Shuffle(self.shuffle_lanes()?),

            // Vector lane access.
            "i8x16.extract_lane_s" => I8x16ExtractLaneS(self.lane_immediate()?),
            "i8x16.extract_lane_u" => I8x16ExtractLaneU(self.lane_immediate()?),
            "i8x16.replace_lane" => I8x16ReplaceLane(self.lane_immediate()?),
            "i16x8.extract_lane_s" => I16x8ExtractLaneS(self.lane_immediate()?),
            "i16x8.extract_lane_u" => I16x8ExtractLaneU(self.lane_immediate()?),
            "i16x8.replace_lane" => I16x8ReplaceLane(self.lane_immediate()?),
            "i32x4.extract_lane" => I32x4ExtractLane(self.lane_immediate()?),
            "i32x4.replace_lane" => I32x4ReplaceLane(self.lane_immediate()?),
            "i64x2.extract_lane" => I64x2ExtractLane(self.lane_immediate()?),
            "i64x2.replace_lane" => I64x2ReplaceLane(self.lane_immediate()?),
            "f32x4.extract_lane" => F32x4ExtractLane(self.lane_immediate()?),
            "f32x4.replace_lane" => F32x4ReplaceLane(self.lane_immediate()?),
            "f64x2.extract_lane" => F64x2ExtractLane(self.lane_immediate()?),
            "f64x2.replace_lane" => F64x2ReplaceLane(self.lane_immediate()?),

            // Vector operations.
            "i8x16.swizzle" => I8x16Swizzle,
            "i8x16.splat" => I8x16Splat,
            "i16x8.splat" => I16x8Splat,
            "i32x4.splat" => I32x4Splat,
            "i64x2.splat" => I64x2Splat,
            "f32x4.splat" => F32x4Splat,
            "f64x2.splat" => F64x2Splat,
            "i8x16.eq" => I8x16Eq,
            "i8x16.ne" => I8x16Ne,
            "i8x16.lt_s" => I8x16LtS,
            "i8x16.lt_u" => I8x16LtU,
            "i8x16.gt_s" => I8x16GtS,
            "i8x16.gt_u" => I8x16GtU,
            "i8x16.le_s" => I8x16LeS,
            "i8x16.le_u" => I8x16LeU,
            "i8x16.ge_s" => I8x16GeS,
            "i8x16.ge_u" => I8x16GeU,
            "i16x8.eq" => I16x8Eq,
            "i16x8.ne" => I16x8Ne,
            "i16x8.lt_s" => I16x8LtS,
            "i16x8.lt_u" => I16x8LtU,
            "i16x8.gt_s" => I16x8GtS,
            "i16x8.gt_u" => I16x8GtU,
            "i16x8.le_s" => I16x8LeS,
            "i16x8.le_u" => I16x8LeU,
            "i16x8.ge_s" => I16x8GeS,
            "i16x8.ge_u" => I16x8GeU,
            "i32x4.eq" => I32x4Eq,
            "i32x4.ne" => I32x4Ne,
            "i32x4.lt_s" => I32x4LtS,
            "i32x4.lt_u" => I32x4LtU,
            "i32x4.gt_s" => I32x4GtS,
            "i32x4.gt_u" => I32x4GtU,
            "i32x4.le_s" => I32x4LeS,
            "i32x4.le_u" => I32x4LeU,
            "i32x4.ge_s" => I32x4GeS,
            "i32x4.ge_u" => I32x4GeU,
            "i64x2.eq" => I64x2Eq,
            "i64x2.ne" => I64x2Ne,
            "i64x2.lt_s" => I64x2LtS,
            "i64x2.gt_s" => I64x2GtS,
            "i64x2.le_s" => I64x2LeS,
            "i64x2.ge_s" => I64x2GeS,
            "f32x4.eq" => F32x4Eq,
            "f32x4.ne" => F32x4Ne,
            "f32x4.lt" => F32x4Lt,
            "f32x4.gt" => F32x4Gt,
            "f32x4.le" => F32x4Le,
            "f32x4.ge" => F32x4Ge,
            "f64x2.eq" => F64x2Eq,
            "f64x2.ne" => F64x2Ne,
            "f64x2.lt" => F64x2Lt,
            "f64x2.gt" => F64x2Gt,
            "f64x2.le" => F64x2Le,
            "f64x2.ge" => F64x2Ge,
            "v128.not" => V128Not,
            "v128.and" => V128And,
            "v128.andnot" => V128AndNot,
            "v128.or" => V128Or,
            "v128.xor" => V128Xor,
            "v128.bitselect" => V128Bitselect,
            "v128.any_true" => V128AnyTrue,
            "f32x4.demote_f64x2_zero" => F32x4DemoteF64x2Zero,
            "f64x2.promote_low_f32x4" => F64x2PromoteLowF32x4,
            "i8x16.abs" => I8x16Abs,
            "i8x16.neg" => I8x16Neg,
            "i8x16.popcnt" => I8x16Popcnt,
            "i8x16.all_true" => I8x16AllTrue,
            "i8x16.bitmask" => I8x16Bitmask,
            "i8x16.narrow_i16x8_s" => I8x16NarrowI16x8S,
            "i8x16.narrow_i16x8_u" => I8x16NarrowI16x8U,
            "f32x4.ceil" => F32x4Ceil,
            "f32x4.floor" => F32x4Floor,
            "f32x4.trunc" => F32x4Trunc,
            "f32x4.nearest" => F32x4Nearest,
            "i8x16.shl" => I8x16Shl,
            "i8x16.shr_s" => I8x16ShrS,
            "i8x16.shr_u" => I8x16ShrU,
            "i8x16.add" => I8x16Add,
            "i8x16.add_sat_s" => I8x16AddSatS,
            "i8x16.add_sat_u" => I8x16AddSatU,
            "i8x16.sub" => I8x16Sub,
            "i8x16.sub_sat_s" => I8x16SubSatS,
            "i8x16.sub_sat_u" => I8x16SubSatU,
            "f64x2.ceil" => F64x2Ceil,
            "f64x2.floor" => F64x2Floor,
            "i8x16.min_s" => I8x16MinS,
            "i8x16.min_u" => I8x16MinU,
            "i8x16.max_s" => I8x16MaxS,
            "i8x16.max_u" => I8x16MaxU,
            "f64x2.trunc" => F64x2Trunc,
            "i8x16.avgr_u" => I8x16AvgrU,
            "i16x8.extadd_pairwise_i8x16_s" => I16x8ExtaddPairwiseI8x16S,
            "i16x8.extadd_pairwise_i8x16_u" => I16x8ExtaddPairwiseI8x16U,
            "i32x4.extadd_pairwise_i16x8_s" => I32x4ExtaddPairwiseI16x8S,
            "i32x4.extadd_pairwise_i16x8_u" => I32x4ExtaddPairwiseI16x8U,
            "i16x8.abs" => I16x8Abs,
            "i16x8.neg" => I16x8Neg,
            "i16x8.q15mulr_sat_s" => I16x8Q15MulrSatS,
            "i16x8.all_true" => I16x8AllTrue,
            "i16x8.bitmask" => I16x8Bitmask,
            "i16x8.narrow_i32x4_s" => I16x8NarrowI32x4S,
            "i16x8.narrow_i32x4_u" => I16x8NarrowI32x4U,
            "i16x8.extend_low_i8x16_s" => I16x8ExtendLowI8x16S,
            "i16x8.extend_high_i8x16_s" => I16x8ExtendHighI8x16S,
            "i16x8.extend_low_i8x16_u" => I16x8ExtendLowI8x16U,
            "i16x8.extend_high_i8x16_u" => I16x8ExtendHighI8x16U,
            "i16x8.shl" => I16x8Shl,
            "i16x8.shr_s" => I16x8ShrS,
            "i16x8.shr_u" => I16x8ShrU,
            "i16x8.add" => I16x8Add,
            "i16x8.add_sat_s" => I16x8AddSatS,
            "i16x8.add_sat_u" => I16x8AddSatU,
            "i16x8.sub" => I16x8Sub,
            "i16x8.sub_sat_s" => I16x8SubSatS,
            "i16x8.sub_sat_u" => I16x8SubSatU,
            "f64x2.nearest" => F64x2Nearest,
            "i16x8.mul" => I16x8Mul,
            "i16x8.min_s" => I16x8MinS,
            "i16x8.min_u" => I16x8MinU,
            "i16x8.max_s" => I16x8MaxS,
            "i16x8.max_u" => I16x8MaxU,
            "i16x8.avgr_u" => I16x8AvgrU,
            "i16x8.extmul_low_i8x16_s" => I16x8ExtmulLowI8x16S,
            "i16x8.extmul_high_i8x16_s" => I16x8ExtmulHighI8x16S,
            "i16x8.extmul_low_i8x16_u" => I16x8ExtmulLowI8x16U,
            "i16x8.extmul_high_i8x16_u" => I16x8ExtmulHighI8x16U,
            "i32x4.abs" => I32x4Abs,
            "i32x4.neg" => I32x4Neg,
            "i32x4.all_true" => I32x4AllTrue,
            "i32x4.bitmask" => I32x4Bitmask,
            "i32x4.extend_low_i16x8_s" => I32x4ExtendLowI16x8S,
            "i32x4.extend_high_i16x8_s" => I32x4ExtendHighI16x8S,
            "i32x4.extend_low_i16x8_u" => I32x4ExtendLowI16x8U,
            "i32x4.extend_high_i16x8_u" => I32x4ExtendHighI16x8U,
            "i32x4.shl" => I32x4Shl,
            "i32x4.shr_s" => I32x4ShrS,
            "i32x4.shr_u" => I32x4ShrU,
            "i32x4.add" => I32x4Add,
            "i32x4.sub" => I32x4Sub,
            "i32x4.mul" => I32x4Mul,
            "i32x4.min_s" => I32x4MinS,
            "i32x4.min_u" => I32x4MinU,
            "i32x4.max_s" => I32x4MaxS,
            "i32x4.max_u" => I32x4MaxU,
            "i32x4.dot_i16x8_s" => I32x4DotI16x8S,
            "i32x4.extmul_low_i16x8_s" => I32x4ExtmulLowI16x8S,
            "i32x4.extmul_high_i16x8_s" => I32x4ExtmulHighI16x8S,
            "i32x4.extmul_low_i16x8_u" => I32x4ExtmulLowI16x8U,
            "i32x4.extmul_high_i16x8_u" => I32x4ExtmulHighI16x8U,
            "i64x2.abs" => I64x2Abs,
            "i64x2.neg" => I64x2Neg,
            "i64x2.all_true" => I64x2AllTrue,
            "i64x2.bitmask" => I64x2Bitmask,
            "i64x2.extend_low_i32x4_s" => I64x2ExtendLowI32x4S,
            "i64x2.extend_high_i32x4_s" => I64x2ExtendHighI32x4S,
            "i64x2.extend_low_i32x4_u" => I64x2ExtendLowI32x4U,
            "i64x2.extend_high_i32x4_u" => I64x2ExtendHighI32x4U,
            "i64x2.shl" => I64x2Shl,
            "i64x2.shr_s" => I64x2ShrS,
            "i64x2.shr_u" => I64x2ShrU,
            "i64x2.add" => I64x2Add,
            "i64x2.sub" => I64x2Sub,
            "i64x2.mul" => I64x2Mul,
            "i64x2.extmul_low_i32x4_s" => I64x2ExtmulLowI32x4S,
            "i64x2.extmul_high_i32x4_s" => I64x2ExtmulHighI32x4S,
            "i64x2.extmul_low_i32x4_u" => I64x2ExtmulLowI32x4U,
            "i64x2.extmul_high_i32x4_u" => I64x2ExtmulHighI32x4U,
            "f32x4.abs" => F32x4Abs,
            "f32x4.neg" => F32x4Neg,
            "f32x4.sqrt" => F32x4Sqrt,
            "f32x4.add" => F32x4Add,
            "f32x4.sub" => F32x4Sub,
            "f32x4.mul" => F32x4Mul,
            "f32x4.div" => F32x4Div,
            "f32x4.min" => F32x4Min,
            "f32x4.max" => F32x4Max,
            "f32x4.pmin" => F32x4Pmin,
            "f32x4.pmax" => F32x4Pmax,
            "f64x2.abs" => F64x2Abs,
            "f64x2.neg" => F64x2Neg,
            "f64x2.sqrt" => F64x2Sqrt,
            "f64x2.add" => F64x2Add,
            "f64x2.sub" => F64x2Sub,
            "f64x2.mul" => F64x2Mul,
            "f64x2.div" => F64x2Div,
            "f64x2.min" => F64x2Min,
            "f64x2.max" => F64x2Max,
            "f64x2.pmin" => F64x2Pmin,
            "f64x2.pmax" => F64x2Pmax,
            "i32x4.trunc_sat_f32x4_s" => I32x4TruncSatF32x4S,
            "i32x4.trunc_sat_f32x4_u" => I32x4TruncSatF32x4U,
            "f32x4.convert_i32x4_s" => F32x4ConvertI32x4S,
            "f32x4.convert_i32x4_u" => F32x4ConvertI32x4U,
            "i32x4.trunc_sat_f64x2_s_zero" => I32x4TruncSatF64x2SZero,
            "i32x4.trunc_sat_f64x2_u_zero" => I32x4TruncSatF64x2UZero,
            "f64x2.convert_low_i32x4_s" => F64x2ConvertLowI32x4S,
            "f64x2.convert_low_i32x4_u" => F64x2ConvertLowI32x4U,

            // Relaxed SIMD.
            "i8x16.relaxed_swizzle" => I8x16RelaxedSwizzle,
            "i32x4.relaxed_trunc_f32x4_s" => I32x4RelaxedTruncF32x4S,
            "i32x4.relaxed_trunc_f32x4_u" => I32x4RelaxedTruncF32x4U,
            "i32x4.relaxed_trunc_f64x2_s_zero" => I32x4RelaxedTruncF64x2SZero,
            "i32x4.relaxed_trunc_f64x2_u_zero" => I32x4RelaxedTruncF64x2UZero,
            "f32x4.relaxed_madd" => F32x4RelaxedMadd,
            "f32x4.relaxed_nmadd" => F32x4RelaxedNmadd,
            "f64x2.relaxed_madd" => F64x2RelaxedMadd,
            "f64x2.relaxed_nmadd" => F64x2RelaxedNmadd,
            "i8x16.relaxed_laneselect" => I8x16RelaxedLaneselect,
            "i16x8.relaxed_laneselect" => I16x8RelaxedLaneselect,
            "i32x4.relaxed_laneselect" => I32x4RelaxedLaneselect,
            "i64x2.relaxed_laneselect" => I64x2RelaxedLaneselect,
            "f32x4.relaxed_min" => F32x4RelaxedMin,
            "f32x4.relaxed_max" => F32x4RelaxedMax,
            "f64x2.relaxed_min" => F64x2RelaxedMin,
            "f64x2.relaxed_max" => F64x2RelaxedMax,
            "i16x8.relaxed_q15mulr_s" => I16x8RelaxedQ15mulrS,
            "i16x8.relaxed_dot_i8x16_i7x16_s" => I16x8RelaxedDotI8x16I7x16S,
            "i32x4.relaxed_dot_i8x16_i7x16_add_s" => I32x4RelaxedDotI8x16I7x16AddS,

            other => return self.parse_error(format!("Unknown instruction {other}")),
        })
    }
}
