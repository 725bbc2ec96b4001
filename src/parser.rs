mod instrs;
#[cfg(test)]
mod test;

use std::collections::{BTreeMap, HashMap};

use thiserror::Error;

use crate::instr::Instruction;
use crate::lexer::{line_col, Lexer, Span, Token, TokenKind};
use crate::module::{
    Data, DataKind, Elem, ElemItems, ElemKind, Export, ExternalKind, Func, Global, Import,
    ImportKind, Module, Tag,
};
use crate::types::{
    CompositeType, FieldType, FuncType, GlobalType, HeapType, Limits, RecGroup, RefType,
    StorageType, SubType, TableType, ValType,
};

pub(crate) use instrs::FuncContext;

pub const PAGE_SIZE: u64 = 65536;

#[derive(Error, Debug)]
#[error("Parse Error: {msg} at {line}:{col}")]
pub struct ParseError {
    pub msg: String,
    pub span: Span,
    pub line: usize,
    pub col: usize,
}

pub type ParseResult<T> = Result<T, ParseError>;

/// Parses the text format into a module. The text may be a single
/// `(module ...)` form or a bare sequence of module fields.
pub fn parse(src: &str) -> ParseResult<Module> {
    let mut parser = Parser::new(src);
    parser.parse()
}

/// One index space of the text format. Identifiers live only in the
/// source text; indices are what end up in the module.
#[derive(Default)]
pub(crate) struct Namespace<'src> {
    names: HashMap<&'src str, u32>,
    count: u32,
}

impl<'src> Namespace<'src> {
    fn register(&mut self, name: Option<&'src str>) -> Result<u32, &'src str> {
        let idx = self.count;
        if let Some(name) = name {
            if self.names.insert(name, idx).is_some() {
                return Err(name);
            }
        }
        self.count += 1;
        Ok(idx)
    }

    fn resolve(&self, name: &str) -> Option<u32> {
        self.names.get(name).copied()
    }
}

#[derive(Copy, Clone, Eq, PartialEq)]
pub(crate) enum Space {
    Type,
    Func,
    Table,
    Memory,
    Global,
    Elem,
    Data,
    Tag,
}

impl Space {
    fn noun(self) -> &'static str {
        match self {
            Space::Type => "type",
            Space::Func => "function",
            Space::Table => "table",
            Space::Memory => "memory",
            Space::Global => "global",
            Space::Elem => "element segment",
            Space::Data => "data segment",
            Space::Tag => "tag",
        }
    }
}

/// A saved lexer position. Definitions are scanned in a first pass that
/// only registers names; their bodies are re-parsed from these cursors
/// once every index space is complete, so forward references work.
#[derive(Clone)]
struct Cursor<'src> {
    lexer: Lexer<'src>,
    token: Token,
}

struct TypeDef<'src> {
    group: usize,
    member: usize,
    type_idx: u32,
    cursor: Cursor<'src>,
}

enum Deferred<'src> {
    ImportDesc {
        import: usize,
        kind: ExternalKind,
        cursor: Cursor<'src>,
    },
    FuncDef {
        func: usize,
        func_idx: u32,
        cursor: Cursor<'src>,
    },
    TableDef {
        table: usize,
        table_idx: u32,
        inline_elem: Option<usize>,
        cursor: Cursor<'src>,
    },
    MemoryDef {
        memory: usize,
        memory_idx: u32,
        inline_data: Option<usize>,
        cursor: Cursor<'src>,
    },
    GlobalDef {
        global: usize,
        cursor: Cursor<'src>,
    },
    TagDef {
        tag: usize,
        cursor: Cursor<'src>,
    },
    ExportIdx {
        export: usize,
        space: Space,
        cursor: Cursor<'src>,
    },
    StartIdx {
        cursor: Cursor<'src>,
    },
    ElemDef {
        elem: usize,
        cursor: Cursor<'src>,
    },
    DataDef {
        data: usize,
        cursor: Cursor<'src>,
    },
}

pub(crate) struct Parser<'src> {
    source: &'src str,
    token: Token,
    lexer: Lexer<'src>,
    module: Module,
    types: Namespace<'src>,
    funcs: Namespace<'src>,
    tables: Namespace<'src>,
    memories: Namespace<'src>,
    globals: Namespace<'src>,
    elems: Namespace<'src>,
    datas: Namespace<'src>,
    tags: Namespace<'src>,
    fields: HashMap<u32, Namespace<'src>>,
    deferred_types: Vec<TypeDef<'src>>,
    deferred: Vec<Deferred<'src>>,
    saw_start: bool,
}

impl<'src> Parser<'src> {
    fn new(source: &'src str) -> Self {
        let mut lexer = Lexer::new(source);
        Parser {
            source,
            token: lexer.next_non_trivial_token(),
            lexer,
            module: Module::default(),
            types: Namespace::default(),
            funcs: Namespace::default(),
            tables: Namespace::default(),
            memories: Namespace::default(),
            globals: Namespace::default(),
            elems: Namespace::default(),
            datas: Namespace::default(),
            tags: Namespace::default(),
            fields: HashMap::new(),
            deferred_types: Vec::new(),
            deferred: Vec::new(),
            saw_start: false,
        }
    }

    fn parse(&mut self) -> ParseResult<Module> {
        if self.token.kind == TokenKind::LParen && self.peek_keyword() == Some("module") {
            self.expect(TokenKind::LParen)?;
            self.advance();
            if let Some(name) = self.opt_id() {
                self.module.names.module = Some(name.to_string());
            }
            while self.token.kind == TokenKind::LParen {
                self.field()?;
            }
            self.expect(TokenKind::RParen)?;
        } else {
            while self.token.kind == TokenKind::LParen {
                self.field()?;
            }
        }
        if self.token.kind != TokenKind::Eof {
            return self.parse_error(format!("Expected end of input, got {:?}", self.token.kind));
        }
        self.resolve_types()?;
        self.resolve_deferred()?;
        Ok(std::mem::take(&mut self.module))
    }

    // First pass over a module field: register names, collect inline
    // imports and exports, and save a cursor for the second pass.
    fn field(&mut self) -> ParseResult<()> {
        self.expect(TokenKind::LParen)?;
        let kw = self.keyword("module field")?;
        match kw {
            "type" => self.type_field(),
            "rec" => self.rec_field(),
            "func" => self.func_field(),
            "table" => self.table_field(),
            "memory" => self.memory_field(),
            "global" => self.global_field(),
            "tag" => self.tag_field(),
            "import" => self.import_field(),
            "export" => self.export_field(),
            "start" => self.start_field(),
            "elem" => self.elem_field(),
            "data" => self.data_field(),
            other => self.parse_error(format!("Unknown module field {other}")),
        }
    }

    fn type_field(&mut self) -> ParseResult<()> {
        let name = self.opt_id();
        let type_idx = self.register(Space::Type, name)?;
        let group = self.module.types.len();
        self.module.types.push(RecGroup::single(SubType::func(FuncType::default())));
        self.deferred_types.push(TypeDef {
            group,
            member: 0,
            type_idx,
            cursor: self.cursor(),
        });
        self.skip_to_close()
    }

    fn rec_field(&mut self) -> ParseResult<()> {
        let group = self.module.types.len();
        self.module.types.push(RecGroup {
            explicit_rec: true,
            types: Vec::new(),
        });
        while self.token.kind == TokenKind::LParen {
            self.expect(TokenKind::LParen)?;
            self.expect_keyword("type")?;
            let name = self.opt_id();
            let type_idx = self.register(Space::Type, name)?;
            let member = self.module.types[group].types.len();
            self.module.types[group]
                .types
                .push(SubType::func(FuncType::default()));
            self.deferred_types.push(TypeDef {
                group,
                member,
                type_idx,
                cursor: self.cursor(),
            });
            self.skip_to_close()?;
        }
        self.expect(TokenKind::RParen)?;
        Ok(())
    }

    fn func_field(&mut self) -> ParseResult<()> {
        let name = self.opt_id();
        let func_idx = self.register(Space::Func, name)?;
        while self.at_sexpr("export") {
            self.inline_export(ExternalKind::Func, func_idx)?;
        }
        if self.at_sexpr("import") {
            self.check_import_allowed(Space::Func)?;
            let import = self.inline_import(ImportKind::Func(0))?;
            self.deferred.push(Deferred::ImportDesc {
                import,
                kind: ExternalKind::Func,
                cursor: self.cursor(),
            });
            return self.skip_to_close();
        }
        let func = self.module.funcs.len();
        self.module.funcs.push(Func {
            type_idx: 0,
            locals: Vec::new(),
            body: Vec::new(),
        });
        self.deferred.push(Deferred::FuncDef {
            func,
            func_idx,
            cursor: self.cursor(),
        });
        self.skip_to_close()
    }

    fn table_field(&mut self) -> ParseResult<()> {
        let name = self.opt_id();
        let table_idx = self.register(Space::Table, name)?;
        while self.at_sexpr("export") {
            self.inline_export(ExternalKind::Table, table_idx)?;
        }
        if self.at_sexpr("import") {
            self.check_import_allowed(Space::Table)?;
            let import = self.inline_import(ImportKind::Table(TableType {
                element: RefType::FUNCREF,
                limits: Limits::new(0, None),
            }))?;
            self.deferred.push(Deferred::ImportDesc {
                import,
                kind: ExternalKind::Table,
                cursor: self.cursor(),
            });
            return self.skip_to_close();
        }
        let table = self.module.tables.len();
        self.module.tables.push(TableType {
            element: RefType::FUNCREF,
            limits: Limits::new(0, None),
        });
        let cursor = self.cursor();
        let has_inline = self.skip_to_close_detecting("elem")?;
        let inline_elem = if has_inline {
            let elem = self.module.elems.len();
            self.module.elems.push(placeholder_elem());
            Some(elem)
        } else {
            None
        };
        self.deferred.push(Deferred::TableDef {
            table,
            table_idx,
            inline_elem,
            cursor,
        });
        Ok(())
    }

    fn memory_field(&mut self) -> ParseResult<()> {
        let name = self.opt_id();
        let memory_idx = self.register(Space::Memory, name)?;
        while self.at_sexpr("export") {
            self.inline_export(ExternalKind::Memory, memory_idx)?;
        }
        if self.at_sexpr("import") {
            self.check_import_allowed(Space::Memory)?;
            let import = self.inline_import(ImportKind::Memory(Limits::new(0, None)))?;
            self.deferred.push(Deferred::ImportDesc {
                import,
                kind: ExternalKind::Memory,
                cursor: self.cursor(),
            });
            return self.skip_to_close();
        }
        let memory = self.module.memories.len();
        self.module.memories.push(Limits::new(0, None));
        let cursor = self.cursor();
        let has_inline = self.skip_to_close_detecting("data")?;
        let inline_data = if has_inline {
            let data = self.module.datas.len();
            self.module.datas.push(Data {
                kind: DataKind::Passive,
                bytes: Vec::new(),
            });
            Some(data)
        } else {
            None
        };
        self.deferred.push(Deferred::MemoryDef {
            memory,
            memory_idx,
            inline_data,
            cursor,
        });
        Ok(())
    }

    fn global_field(&mut self) -> ParseResult<()> {
        let name = self.opt_id();
        let global_idx = self.register(Space::Global, name)?;
        while self.at_sexpr("export") {
            self.inline_export(ExternalKind::Global, global_idx)?;
        }
        if self.at_sexpr("import") {
            self.check_import_allowed(Space::Global)?;
            let import = self.inline_import(ImportKind::Global(GlobalType {
                val_type: ValType::I32,
                mutable: false,
            }))?;
            self.deferred.push(Deferred::ImportDesc {
                import,
                kind: ExternalKind::Global,
                cursor: self.cursor(),
            });
            return self.skip_to_close();
        }
        let global = self.module.globals.len();
        self.module.globals.push(Global {
            ty: GlobalType {
                val_type: ValType::I32,
                mutable: false,
            },
            init: Vec::new(),
        });
        self.deferred.push(Deferred::GlobalDef {
            global,
            cursor: self.cursor(),
        });
        self.skip_to_close()
    }

    fn tag_field(&mut self) -> ParseResult<()> {
        let name = self.opt_id();
        let tag_idx = self.register(Space::Tag, name)?;
        while self.at_sexpr("export") {
            self.inline_export(ExternalKind::Tag, tag_idx)?;
        }
        if self.at_sexpr("import") {
            self.check_import_allowed(Space::Tag)?;
            let import = self.inline_import(ImportKind::Tag(Tag { type_idx: 0 }))?;
            self.deferred.push(Deferred::ImportDesc {
                import,
                kind: ExternalKind::Tag,
                cursor: self.cursor(),
            });
            return self.skip_to_close();
        }
        let tag = self.module.tags.len();
        self.module.tags.push(Tag { type_idx: 0 });
        self.deferred.push(Deferred::TagDef {
            tag,
            cursor: self.cursor(),
        });
        self.skip_to_close()
    }

    fn import_field(&mut self) -> ParseResult<()> {
        let import_module = self.name_string()?;
        let import_name = self.name_string()?;
        self.expect(TokenKind::LParen)?;
        let kw = self.keyword("import kind")?;
        let (space, kind, external) = match kw {
            "func" => (Space::Func, ImportKind::Func(0), ExternalKind::Func),
            "table" => (
                Space::Table,
                ImportKind::Table(TableType {
                    element: RefType::FUNCREF,
                    limits: Limits::new(0, None),
                }),
                ExternalKind::Table,
            ),
            "memory" => (
                Space::Memory,
                ImportKind::Memory(Limits::new(0, None)),
                ExternalKind::Memory,
            ),
            "global" => (
                Space::Global,
                ImportKind::Global(GlobalType {
                    val_type: ValType::I32,
                    mutable: false,
                }),
                ExternalKind::Global,
            ),
            "tag" => (Space::Tag, ImportKind::Tag(Tag { type_idx: 0 }), ExternalKind::Tag),
            other => return self.parse_error(format!("Unknown import kind {other}")),
        };
        self.check_import_allowed(space)?;
        let name = self.opt_id();
        self.register(space, name)?;
        let import = self.module.imports.len();
        self.module.imports.push(Import {
            module: import_module,
            name: import_name,
            kind,
        });
        self.deferred.push(Deferred::ImportDesc {
            import,
            kind: external,
            cursor: self.cursor(),
        });
        self.skip_to_close()?;
        self.expect(TokenKind::RParen)?;
        Ok(())
    }

    fn export_field(&mut self) -> ParseResult<()> {
        let name = self.name_string()?;
        self.expect(TokenKind::LParen)?;
        let kw = self.keyword("export kind")?;
        let (kind, space) = match kw {
            "func" => (ExternalKind::Func, Space::Func),
            "table" => (ExternalKind::Table, Space::Table),
            "memory" => (ExternalKind::Memory, Space::Memory),
            "global" => (ExternalKind::Global, Space::Global),
            "tag" => (ExternalKind::Tag, Space::Tag),
            other => return self.parse_error(format!("Unknown export kind {other}")),
        };
        let export = self.module.exports.len();
        self.module.exports.push(Export {
            name,
            kind,
            index: 0,
        });
        self.deferred.push(Deferred::ExportIdx {
            export,
            space,
            cursor: self.cursor(),
        });
        self.skip_to_close()?;
        self.expect(TokenKind::RParen)?;
        Ok(())
    }

    fn start_field(&mut self) -> ParseResult<()> {
        if self.saw_start {
            return self.parse_error("Multiple start fields");
        }
        self.saw_start = true;
        self.deferred.push(Deferred::StartIdx {
            cursor: self.cursor(),
        });
        self.skip_to_close()
    }

    fn elem_field(&mut self) -> ParseResult<()> {
        let name = self.opt_id();
        self.register(Space::Elem, name)?;
        let elem = self.module.elems.len();
        self.module.elems.push(placeholder_elem());
        self.deferred.push(Deferred::ElemDef {
            elem,
            cursor: self.cursor(),
        });
        self.skip_to_close()
    }

    fn data_field(&mut self) -> ParseResult<()> {
        let name = self.opt_id();
        self.register(Space::Data, name)?;
        let data = self.module.datas.len();
        self.module.datas.push(Data {
            kind: DataKind::Passive,
            bytes: Vec::new(),
        });
        self.deferred.push(Deferred::DataDef {
            data,
            cursor: self.cursor(),
        });
        self.skip_to_close()
    }

    fn inline_export(&mut self, kind: ExternalKind, index: u32) -> ParseResult<()> {
        self.expect(TokenKind::LParen)?;
        self.expect_keyword("export")?;
        let name = self.name_string()?;
        self.expect(TokenKind::RParen)?;
        self.module.exports.push(Export { name, kind, index });
        Ok(())
    }

    fn inline_import(&mut self, kind: ImportKind) -> ParseResult<usize> {
        self.expect(TokenKind::LParen)?;
        self.expect_keyword("import")?;
        let module = self.name_string()?;
        let name = self.name_string()?;
        self.expect(TokenKind::RParen)?;
        let import = self.module.imports.len();
        self.module.imports.push(Import { module, name, kind });
        Ok(import)
    }

    // All imports of a space must come before its first definition,
    // otherwise text order and index order would disagree.
    fn check_import_allowed(&mut self, space: Space) -> ParseResult<()> {
        let defined = match space {
            Space::Func => !self.module.funcs.is_empty(),
            Space::Table => !self.module.tables.is_empty(),
            Space::Memory => !self.module.memories.is_empty(),
            Space::Global => !self.module.globals.is_empty(),
            Space::Tag => !self.module.tags.is_empty(),
            _ => false,
        };
        if defined {
            return self.parse_error(format!("Import after {} definition", space.noun()));
        }
        Ok(())
    }

    // Second pass: type definitions first, so field names and function
    // signatures are known before anything that mentions them.
    fn resolve_types(&mut self) -> ParseResult<()> {
        for def in std::mem::take(&mut self.deferred_types) {
            self.restore(&def.cursor);
            let sub = self.sub_type_def(def.type_idx)?;
            self.expect(TokenKind::RParen)?;
            self.module.types[def.group].types[def.member] = sub;
        }
        Ok(())
    }

    fn resolve_deferred(&mut self) -> ParseResult<()> {
        for def in std::mem::take(&mut self.deferred) {
            match def {
                Deferred::ImportDesc {
                    import,
                    kind,
                    cursor,
                } => {
                    self.restore(&cursor);
                    let kind = match kind {
                        ExternalKind::Func => ImportKind::Func(self.type_use(None)?),
                        ExternalKind::Table => ImportKind::Table(self.table_type()?),
                        ExternalKind::Memory => ImportKind::Memory(self.limits()?),
                        ExternalKind::Global => ImportKind::Global(self.global_type()?),
                        ExternalKind::Tag => ImportKind::Tag(Tag {
                            type_idx: self.type_use(None)?,
                        }),
                    };
                    self.expect(TokenKind::RParen)?;
                    self.module.imports[import].kind = kind;
                }
                Deferred::FuncDef {
                    func,
                    func_idx,
                    cursor,
                } => {
                    self.restore(&cursor);
                    self.func_def(func, func_idx)?;
                }
                Deferred::TableDef {
                    table,
                    table_idx,
                    inline_elem,
                    cursor,
                } => {
                    self.restore(&cursor);
                    self.table_def(table, table_idx, inline_elem)?;
                }
                Deferred::MemoryDef {
                    memory,
                    memory_idx,
                    inline_data,
                    cursor,
                } => {
                    self.restore(&cursor);
                    self.memory_def(memory, memory_idx, inline_data)?;
                }
                Deferred::GlobalDef { global, cursor } => {
                    self.restore(&cursor);
                    let ty = self.global_type()?;
                    let init = self.const_expr()?;
                    self.expect(TokenKind::RParen)?;
                    self.module.globals[global] = Global { ty, init };
                }
                Deferred::TagDef { tag, cursor } => {
                    self.restore(&cursor);
                    let type_idx = self.type_use(None)?;
                    self.expect(TokenKind::RParen)?;
                    self.module.tags[tag] = Tag { type_idx };
                }
                Deferred::ExportIdx {
                    export,
                    space,
                    cursor,
                } => {
                    self.restore(&cursor);
                    let index = self.resolve_idx(space)?;
                    self.expect(TokenKind::RParen)?;
                    self.module.exports[export].index = index;
                }
                Deferred::StartIdx { cursor } => {
                    self.restore(&cursor);
                    let func = self.resolve_idx(Space::Func)?;
                    self.expect(TokenKind::RParen)?;
                    self.module.start = Some(func);
                }
                Deferred::ElemDef { elem, cursor } => {
                    self.restore(&cursor);
                    self.elem_def(elem)?;
                }
                Deferred::DataDef { data, cursor } => {
                    self.restore(&cursor);
                    self.data_def(data)?;
                }
            }
        }
        Ok(())
    }

    fn func_def(&mut self, func: usize, func_idx: u32) -> ParseResult<()> {
        let mut ctx = FuncContext::default();
        let type_idx = self.type_use(Some(&mut ctx))?;
        let mut locals = Vec::new();
        while self.at_sexpr("local") {
            self.expect(TokenKind::LParen)?;
            self.advance();
            if let Some(name) = self.opt_id() {
                let idx = self.register_local(&mut ctx, Some(name))?;
                ctx.local_names.insert(idx, name.to_string());
                locals.push(self.val_type()?);
            } else {
                while self.token.kind != TokenKind::RParen {
                    self.register_local(&mut ctx, None)?;
                    locals.push(self.val_type()?);
                }
            }
            self.expect(TokenKind::RParen)?;
        }
        let body = self.expr_until_close(&mut ctx)?;
        self.expect(TokenKind::RParen)?;
        self.module.funcs[func] = Func {
            type_idx,
            locals,
            body,
        };
        if !ctx.local_names.is_empty() {
            self.module
                .names
                .locals
                .insert(func_idx, std::mem::take(&mut ctx.local_names));
        }
        Ok(())
    }

    fn table_def(&mut self, table: usize, table_idx: u32, inline_elem: Option<usize>) -> ParseResult<()> {
        if let Some(elem) = inline_elem {
            let element = self.ref_type()?;
            self.expect(TokenKind::LParen)?;
            self.expect_keyword("elem")?;
            let items = if self.token.kind == TokenKind::LParen {
                ElemItems::Expressions(self.elem_expr_items()?)
            } else {
                let mut funcs = Vec::new();
                while self.token.kind != TokenKind::RParen {
                    funcs.push(self.resolve_idx(Space::Func)?);
                }
                ElemItems::Functions(funcs)
            };
            let count = match &items {
                ElemItems::Functions(funcs) => funcs.len() as u64,
                ElemItems::Expressions(exprs) => exprs.len() as u64,
            };
            self.expect(TokenKind::RParen)?;
            self.expect(TokenKind::RParen)?;
            self.module.tables[table] = TableType {
                element,
                limits: Limits::new(count, Some(count)),
            };
            self.module.elems[elem] = Elem {
                kind: ElemKind::Active {
                    table: table_idx,
                    offset: vec![Instruction::I32Const(0), Instruction::End],
                },
                ty: element,
                items,
            };
            return Ok(());
        }
        let ty = self.table_type()?;
        self.expect(TokenKind::RParen)?;
        self.module.tables[table] = ty;
        Ok(())
    }

    fn memory_def(
        &mut self,
        memory: usize,
        memory_idx: u32,
        inline_data: Option<usize>,
    ) -> ParseResult<()> {
        if let Some(data) = inline_data {
            self.expect(TokenKind::LParen)?;
            self.expect_keyword("data")?;
            let mut bytes = Vec::new();
            while self.token.kind == TokenKind::String {
                bytes.extend(self.string()?);
            }
            self.expect(TokenKind::RParen)?;
            self.expect(TokenKind::RParen)?;
            let pages = (bytes.len() as u64).div_ceil(PAGE_SIZE);
            self.module.memories[memory] = Limits::new(pages, Some(pages));
            self.module.datas[data] = Data {
                kind: DataKind::Active {
                    memory: memory_idx,
                    offset: vec![Instruction::I32Const(0), Instruction::End],
                },
                bytes,
            };
            return Ok(());
        }
        let limits = self.limits()?;
        self.expect(TokenKind::RParen)?;
        self.module.memories[memory] = limits;
        Ok(())
    }

    fn elem_def(&mut self, elem: usize) -> ParseResult<()> {
        let kind = if self.eat_keyword("declare") {
            ElemKind::Declared
        } else if self.at_sexpr("table") {
            self.expect(TokenKind::LParen)?;
            self.advance();
            let table = self.resolve_idx(Space::Table)?;
            self.expect(TokenKind::RParen)?;
            ElemKind::Active {
                table,
                offset: self.offset_expr()?,
            }
        } else if self.token.kind == TokenKind::LParen && self.peek_keyword() != Some("ref") {
            ElemKind::Active {
                table: 0,
                offset: self.offset_expr()?,
            }
        } else {
            ElemKind::Passive
        };

        let (ty, items) = if self.eat_keyword("func") {
            let mut funcs = Vec::new();
            while self.token.kind != TokenKind::RParen {
                funcs.push(self.resolve_idx(Space::Func)?);
            }
            (RefType::FUNCREF, ElemItems::Functions(funcs))
        } else if self.token.kind == TokenKind::RParen {
            (RefType::FUNCREF, ElemItems::Functions(Vec::new()))
        } else if matches!(self.token.kind, TokenKind::Number | TokenKind::Id) {
            // Bare indices abbreviate `func ...` in active segments.
            if !matches!(kind, ElemKind::Active { .. }) {
                return self.parse_error("Expected element type");
            }
            let mut funcs = Vec::new();
            while self.token.kind != TokenKind::RParen {
                funcs.push(self.resolve_idx(Space::Func)?);
            }
            (RefType::FUNCREF, ElemItems::Functions(funcs))
        } else {
            let ty = self.ref_type()?;
            (ty, ElemItems::Expressions(self.elem_expr_items()?))
        };
        self.expect(TokenKind::RParen)?;
        self.module.elems[elem] = Elem { kind, ty, items };
        Ok(())
    }

    fn elem_expr_items(&mut self) -> ParseResult<Vec<Vec<Instruction>>> {
        let mut items = Vec::new();
        while self.token.kind == TokenKind::LParen {
            if self.peek_keyword() == Some("item") {
                self.expect(TokenKind::LParen)?;
                self.advance();
                let mut ctx = FuncContext::default();
                let expr = self.expr_until_close(&mut ctx)?;
                self.expect(TokenKind::RParen)?;
                items.push(expr);
            } else {
                let mut ctx = FuncContext::default();
                let mut expr = Vec::new();
                self.folded_instr(&mut expr, &mut ctx)?;
                expr.push(Instruction::End);
                items.push(expr);
            }
        }
        Ok(items)
    }

    fn data_def(&mut self, data: usize) -> ParseResult<()> {
        let kind = if self.at_sexpr("memory") {
            self.expect(TokenKind::LParen)?;
            self.advance();
            let memory = self.resolve_idx(Space::Memory)?;
            self.expect(TokenKind::RParen)?;
            DataKind::Active {
                memory,
                offset: self.offset_expr()?,
            }
        } else if self.token.kind == TokenKind::LParen {
            DataKind::Active {
                memory: 0,
                offset: self.offset_expr()?,
            }
        } else {
            DataKind::Passive
        };
        let mut bytes = Vec::new();
        while self.token.kind == TokenKind::String {
            bytes.extend(self.string()?);
        }
        self.expect(TokenKind::RParen)?;
        self.module.datas[data] = Data { kind, bytes };
        Ok(())
    }

    // `(offset instr*)` or a single folded instruction.
    fn offset_expr(&mut self) -> ParseResult<Vec<Instruction>> {
        let mut ctx = FuncContext::default();
        if self.peek_keyword() == Some("offset") {
            self.expect(TokenKind::LParen)?;
            self.advance();
            let expr = self.expr_until_close(&mut ctx)?;
            self.expect(TokenKind::RParen)?;
            return Ok(expr);
        }
        let mut expr = Vec::new();
        self.folded_instr(&mut expr, &mut ctx)?;
        expr.push(Instruction::End);
        Ok(expr)
    }

    pub(crate) fn const_expr(&mut self) -> ParseResult<Vec<Instruction>> {
        let mut ctx = FuncContext::default();
        self.expr_until_close(&mut ctx)
    }

    // Types.

    fn sub_type_def(&mut self, type_idx: u32) -> ParseResult<SubType> {
        self.expect(TokenKind::LParen)?;
        if self.token.kind == TokenKind::Keyword && self.token_text() == "sub" {
            self.advance();
            let is_final = self.eat_keyword("final");
            let mut supertype = None;
            while matches!(self.token.kind, TokenKind::Number | TokenKind::Id) {
                if supertype.is_some() {
                    return self.parse_error("Multiple supertypes");
                }
                supertype = Some(self.resolve_idx(Space::Type)?);
            }
            self.expect(TokenKind::LParen)?;
            let composite = self.composite_type(type_idx)?;
            self.expect(TokenKind::RParen)?;
            self.expect(TokenKind::RParen)?;
            return Ok(SubType {
                is_final,
                supertype,
                composite,
            });
        }
        let composite = self.composite_type(type_idx)?;
        self.expect(TokenKind::RParen)?;
        Ok(SubType {
            is_final: true,
            supertype: None,
            composite,
        })
    }

    fn composite_type(&mut self, type_idx: u32) -> ParseResult<CompositeType> {
        let kw = self.keyword("type definition")?;
        match kw {
            "func" => {
                let mut sig = FuncType::default();
                while self.at_sexpr("param") {
                    self.expect(TokenKind::LParen)?;
                    self.advance();
                    if self.opt_id().is_some() {
                        sig.params.push(self.val_type()?);
                    } else {
                        while self.token.kind != TokenKind::RParen {
                            sig.params.push(self.val_type()?);
                        }
                    }
                    self.expect(TokenKind::RParen)?;
                }
                while self.at_sexpr("result") {
                    self.expect(TokenKind::LParen)?;
                    self.advance();
                    while self.token.kind != TokenKind::RParen {
                        sig.results.push(self.val_type()?);
                    }
                    self.expect(TokenKind::RParen)?;
                }
                Ok(CompositeType::Func(sig))
            }
            "struct" => {
                let mut fields = Vec::new();
                let mut namespace = Namespace::default();
                let mut field_names = BTreeMap::new();
                while self.at_sexpr("field") {
                    self.expect(TokenKind::LParen)?;
                    self.advance();
                    if let Some(name) = self.opt_id() {
                        let idx = match namespace.register(Some(name)) {
                            Ok(idx) => idx,
                            Err(name) => {
                                return self.parse_error(format!("Duplicate field name ${name}"))
                            }
                        };
                        field_names.insert(idx, name.to_string());
                        fields.push(self.field_type()?);
                    } else {
                        while self.token.kind != TokenKind::RParen {
                            namespace.register(None).ok();
                            fields.push(self.field_type()?);
                        }
                    }
                    self.expect(TokenKind::RParen)?;
                }
                self.fields.insert(type_idx, namespace);
                if !field_names.is_empty() {
                    self.module.names.fields.insert(type_idx, field_names);
                }
                Ok(CompositeType::Struct(fields))
            }
            "array" => Ok(CompositeType::Array(self.field_type()?)),
            other => self.parse_error(format!("Unknown type definition {other}")),
        }
    }

    fn field_type(&mut self) -> ParseResult<FieldType> {
        if self.token.kind == TokenKind::LParen && self.peek_keyword() == Some("mut") {
            self.expect(TokenKind::LParen)?;
            self.advance();
            let storage = self.storage_type()?;
            self.expect(TokenKind::RParen)?;
            return Ok(FieldType {
                storage,
                mutable: true,
            });
        }
        Ok(FieldType {
            storage: self.storage_type()?,
            mutable: false,
        })
    }

    fn storage_type(&mut self) -> ParseResult<StorageType> {
        if self.token.kind == TokenKind::Keyword {
            match self.token_text() {
                "i8" => {
                    self.advance();
                    return Ok(StorageType::I8);
                }
                "i16" => {
                    self.advance();
                    return Ok(StorageType::I16);
                }
                _ => {}
            }
        }
        Ok(StorageType::Val(self.val_type()?))
    }

    pub(crate) fn val_type(&mut self) -> ParseResult<ValType> {
        if self.token.kind == TokenKind::Keyword {
            let ty = match self.token_text() {
                "i32" => ValType::I32,
                "i64" => ValType::I64,
                "f32" => ValType::F32,
                "f64" => ValType::F64,
                "v128" => ValType::V128,
                _ => return Ok(ValType::Ref(self.ref_type()?)),
            };
            self.advance();
            return Ok(ty);
        }
        Ok(ValType::Ref(self.ref_type()?))
    }

    pub(crate) fn ref_type(&mut self) -> ParseResult<RefType> {
        if self.token.kind == TokenKind::Keyword {
            let heap = match self.token_text() {
                "funcref" => HeapType::Func,
                "externref" => HeapType::Extern,
                "anyref" => HeapType::Any,
                "eqref" => HeapType::Eq,
                "i31ref" => HeapType::I31,
                "structref" => HeapType::Struct,
                "arrayref" => HeapType::Array,
                "nullref" => HeapType::None,
                "nullfuncref" => HeapType::NoFunc,
                "nullexternref" => HeapType::NoExtern,
                other => return self.parse_error(format!("Expected reference type, got {other}")),
            };
            self.advance();
            return Ok(RefType {
                nullable: true,
                heap,
            });
        }
        self.expect(TokenKind::LParen)?;
        self.expect_keyword("ref")?;
        let nullable = self.eat_keyword("null");
        let heap = self.heap_type()?;
        self.expect(TokenKind::RParen)?;
        Ok(RefType { nullable, heap })
    }

    pub(crate) fn heap_type(&mut self) -> ParseResult<HeapType> {
        if self.token.kind == TokenKind::Keyword {
            let heap = match self.token_text() {
                "func" => HeapType::Func,
                "extern" => HeapType::Extern,
                "any" => HeapType::Any,
                "eq" => HeapType::Eq,
                "i31" => HeapType::I31,
                "struct" => HeapType::Struct,
                "array" => HeapType::Array,
                "none" => HeapType::None,
                "nofunc" => HeapType::NoFunc,
                "noextern" => HeapType::NoExtern,
                other => return self.parse_error(format!("Unknown heap type {other}")),
            };
            self.advance();
            return Ok(heap);
        }
        Ok(HeapType::Index(self.resolve_idx(Space::Type)?))
    }

    fn table_type(&mut self) -> ParseResult<TableType> {
        let limits = self.limits()?;
        let element = self.ref_type()?;
        Ok(TableType { element, limits })
    }

    fn limits(&mut self) -> ParseResult<Limits> {
        let memory64 = if self.token.kind == TokenKind::Keyword {
            match self.token_text() {
                "i64" => {
                    self.advance();
                    true
                }
                "i32" => {
                    self.advance();
                    false
                }
                _ => false,
            }
        } else {
            false
        };
        let min = self.u64_immediate()?;
        let max = if self.token.kind == TokenKind::Number {
            Some(self.u64_immediate()?)
        } else {
            None
        };
        let shared = self.eat_keyword("shared");
        Ok(Limits {
            min,
            max,
            shared,
            memory64,
        })
    }

    fn global_type(&mut self) -> ParseResult<GlobalType> {
        if self.token.kind == TokenKind::LParen && self.peek_keyword() == Some("mut") {
            self.expect(TokenKind::LParen)?;
            self.advance();
            let val_type = self.val_type()?;
            self.expect(TokenKind::RParen)?;
            return Ok(GlobalType {
                val_type,
                mutable: true,
            });
        }
        Ok(GlobalType {
            val_type: self.val_type()?,
            mutable: false,
        })
    }

    /// A type use: `(type idx)?` followed by inline params and results.
    /// Inline-only signatures reuse a matching function type or append a
    /// new one after all explicitly declared types.
    pub(crate) fn type_use(&mut self, mut ctx: Option<&mut FuncContext<'src>>) -> ParseResult<u32> {
        let explicit = if self.token.kind == TokenKind::LParen && self.peek_keyword() == Some("type")
        {
            self.expect(TokenKind::LParen)?;
            self.advance();
            let idx = self.resolve_idx(Space::Type)?;
            self.expect(TokenKind::RParen)?;
            Some(idx)
        } else {
            None
        };
        let mut sig = FuncType::default();
        let mut has_inline = false;
        while self.at_sexpr("param") {
            has_inline = true;
            self.expect(TokenKind::LParen)?;
            self.advance();
            if let Some(name) = self.opt_id() {
                if let Some(ctx) = ctx.as_deref_mut() {
                    let idx = self.register_local(ctx, Some(name))?;
                    ctx.local_names.insert(idx, name.to_string());
                }
                sig.params.push(self.val_type()?);
            } else {
                while self.token.kind != TokenKind::RParen {
                    if let Some(ctx) = ctx.as_deref_mut() {
                        self.register_local(ctx, None)?;
                    }
                    sig.params.push(self.val_type()?);
                }
            }
            self.expect(TokenKind::RParen)?;
        }
        while self.at_sexpr("result") {
            has_inline = true;
            self.expect(TokenKind::LParen)?;
            self.advance();
            while self.token.kind != TokenKind::RParen {
                sig.results.push(self.val_type()?);
            }
            self.expect(TokenKind::RParen)?;
        }
        match explicit {
            Some(idx) => {
                let declared = match self.module.func_type(idx) {
                    Some(ty) => ty.clone(),
                    None => return self.parse_error("Type use does not name a function type"),
                };
                if has_inline && sig != declared {
                    return self.parse_error("Inline signature does not match the type use");
                }
                if !has_inline {
                    if let Some(ctx) = ctx {
                        for _ in &declared.params {
                            self.register_local(ctx, None)?;
                        }
                    }
                }
                Ok(idx)
            }
            None => Ok(self.func_type_idx(sig)),
        }
    }

    /// Block types keep the one-result shorthand; anything else becomes
    /// a type use.
    pub(crate) fn block_type(&mut self) -> ParseResult<crate::instr::BlockType> {
        use crate::instr::BlockType;
        if self.token.kind != TokenKind::LParen {
            return Ok(BlockType::Empty);
        }
        match self.peek_keyword() {
            Some("result") => {
                let mut results = Vec::new();
                while self.at_sexpr("result") {
                    self.expect(TokenKind::LParen)?;
                    self.advance();
                    while self.token.kind != TokenKind::RParen {
                        results.push(self.val_type()?);
                    }
                    self.expect(TokenKind::RParen)?;
                }
                if results.len() == 1 {
                    return Ok(BlockType::Result(results[0]));
                }
                Ok(BlockType::Func(self.func_type_idx(FuncType {
                    params: Vec::new(),
                    results,
                })))
            }
            Some("type") | Some("param") => Ok(BlockType::Func(self.type_use(None)?)),
            _ => Ok(BlockType::Empty),
        }
    }

    fn func_type_idx(&mut self, sig: FuncType) -> u32 {
        let mut idx = 0;
        for group in &self.module.types {
            for sub in &group.types {
                if sub.is_final && sub.supertype.is_none() {
                    if let CompositeType::Func(existing) = &sub.composite {
                        if *existing == sig {
                            return idx;
                        }
                    }
                }
                idx += 1;
            }
        }
        self.module.types.push(RecGroup::single(SubType::func(sig)));
        self.types.count += 1;
        idx
    }

    // Token plumbing.

    fn cursor(&self) -> Cursor<'src> {
        Cursor {
            lexer: self.lexer.clone(),
            token: self.token,
        }
    }

    fn restore(&mut self, cursor: &Cursor<'src>) {
        self.lexer = cursor.lexer.clone();
        self.token = cursor.token;
    }

    /// Skips the rest of the current field, through its closing paren.
    fn skip_to_close(&mut self) -> ParseResult<()> {
        self.skip_to_close_detecting("")?;
        Ok(())
    }

    fn skip_to_close_detecting(&mut self, needle: &str) -> ParseResult<bool> {
        let mut depth = 1usize;
        let mut found = false;
        loop {
            match self.token.kind {
                TokenKind::LParen => {
                    if depth == 1 && !needle.is_empty() && self.peek_keyword() == Some(needle) {
                        found = true;
                    }
                    depth += 1;
                }
                TokenKind::RParen => {
                    depth -= 1;
                    if depth == 0 {
                        self.advance();
                        return Ok(found);
                    }
                }
                TokenKind::Eof => return self.parse_error("Unexpected end of input"),
                TokenKind::UnterminatedStringError => {
                    return self.parse_error("Unterminated string literal")
                }
                TokenKind::UnterminatedCommentError => {
                    return self.parse_error("Unterminated block comment")
                }
                _ => {}
            }
            self.advance();
        }
    }

    fn register(&mut self, space: Space, name: Option<&'src str>) -> ParseResult<u32> {
        let namespace = match space {
            Space::Type => &mut self.types,
            Space::Func => &mut self.funcs,
            Space::Table => &mut self.tables,
            Space::Memory => &mut self.memories,
            Space::Global => &mut self.globals,
            Space::Elem => &mut self.elems,
            Space::Data => &mut self.datas,
            Space::Tag => &mut self.tags,
        };
        let idx = match namespace.register(name) {
            Ok(idx) => idx,
            Err(name) => {
                return self.parse_error(format!("Duplicate {} name ${name}", space.noun()))
            }
        };
        if let Some(name) = name {
            let names = &mut self.module.names;
            let map = match space {
                Space::Type => &mut names.types,
                Space::Func => &mut names.funcs,
                Space::Table => &mut names.tables,
                Space::Memory => &mut names.memories,
                Space::Global => &mut names.globals,
                Space::Elem => &mut names.elems,
                Space::Data => &mut names.datas,
                Space::Tag => &mut names.tags,
            };
            map.insert(idx, name.to_string());
        }
        Ok(idx)
    }

    fn register_local(&mut self, ctx: &mut FuncContext<'src>, name: Option<&'src str>) -> ParseResult<u32> {
        match ctx.locals.register(name) {
            Ok(idx) => Ok(idx),
            Err(name) => self.parse_error(format!("Duplicate local name ${name}")),
        }
    }

    /// Resolves a numeric or symbolic index against one index space.
    pub(crate) fn resolve_idx(&mut self, space: Space) -> ParseResult<u32> {
        let token = self.token;
        match token.kind {
            TokenKind::Number => {
                let idx = self.u32_immediate()?;
                Ok(idx)
            }
            TokenKind::Id => {
                let name = &token.span.as_str(self.source)[1..];
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
                    Some(idx) => {
                        self.advance();
                        Ok(idx)
                    }
                    None => self.parse_error(format!("Unknown {} ${name}", space.noun())),
                }
            }
            _ => self.parse_error(format!("Expected {} index, got {:?}", space.noun(), token.kind)),
        }
    }

    pub(crate) fn resolve_field_idx(&mut self, type_idx: u32) -> ParseResult<u32> {
        let token = self.token;
        match token.kind {
            TokenKind::Number => self.u32_immediate(),
            TokenKind::Id => {
                let name = &token.span.as_str(self.source)[1..];
                let resolved = self.fields.get(&type_idx).and_then(|ns| ns.resolve(name));
                match resolved {
                    Some(idx) => {
                        self.advance();
                        Ok(idx)
                    }
                    None => self.parse_error(format!("Unknown field ${name}")),
                }
            }
            _ => self.parse_error(format!("Expected field index, got {:?}", token.kind)),
        }
    }

    pub(crate) fn opt_idx(&mut self, space: Space) -> ParseResult<u32> {
        if matches!(self.token.kind, TokenKind::Number | TokenKind::Id) {
            return self.resolve_idx(space);
        }
        Ok(0)
    }

    fn opt_id(&mut self) -> Option<&'src str> {
        if self.token.kind == TokenKind::Id {
            let name = &self.token.span.as_str(self.source)[1..];
            self.advance();
            return Some(name);
        }
        None
    }

    pub(crate) fn token_text(&self) -> &'src str {
        self.token.span.as_str(self.source)
    }

    fn at_sexpr(&self, kw: &str) -> bool {
        self.token.kind == TokenKind::LParen && self.peek_keyword() == Some(kw)
    }

    pub(crate) fn peek_keyword(&self) -> Option<&'src str> {
        let token = self.peek();
        if token.kind == TokenKind::Keyword {
            Some(token.span.as_str(self.source))
        } else {
            None
        }
    }

    fn keyword(&mut self, what: &str) -> ParseResult<&'src str> {
        if self.token.kind != TokenKind::Keyword {
            return self.parse_error(format!("Expected {what}, got {:?}", self.token.kind));
        }
        let text = self.token_text();
        self.advance();
        Ok(text)
    }

    pub(crate) fn expect_keyword(&mut self, kw: &str) -> ParseResult<()> {
        if self.token.kind == TokenKind::Keyword && self.token_text() == kw {
            self.advance();
            return Ok(());
        }
        self.parse_error(format!("Expected {kw}, got {:?}", self.token.kind))
    }

    pub(crate) fn eat_keyword(&mut self, kw: &str) -> bool {
        if self.token.kind == TokenKind::Keyword && self.token_text() == kw {
            self.advance();
            return true;
        }
        false
    }

    // Literals.

    pub(crate) fn string(&mut self) -> ParseResult<Vec<u8>> {
        let token = self.token;
        match token.kind {
            TokenKind::String => {
                let text = token.span.as_str(self.source);
                let bytes = match decode_string(&text[1..text.len() - 1]) {
                    Some(bytes) => bytes,
                    None => return self.error_at(token.span, "Invalid string escape"),
                };
                self.advance();
                Ok(bytes)
            }
            TokenKind::UnterminatedStringError => self.parse_error("Unterminated string literal"),
            other => self.parse_error(format!("Expected string, got {other:?}")),
        }
    }

    pub(crate) fn name_string(&mut self) -> ParseResult<String> {
        let span = self.token.span;
        let bytes = self.string()?;
        match String::from_utf8(bytes) {
            Ok(name) => Ok(name),
            Err(_) => self.error_at(span, "Invalid UTF-8 in name"),
        }
    }

    pub(crate) fn u32_immediate(&mut self) -> ParseResult<u32> {
        let token = self.token;
        if token.kind != TokenKind::Number {
            return self.parse_error(format!("Expected index, got {:?}", token.kind));
        }
        let text = token.span.as_str(self.source);
        match parse_uint(text) {
            Some(value) if value <= u64::from(u32::MAX) => {
                self.advance();
                Ok(value as u32)
            }
            _ => self.error_at(token.span, format!("Unable to parse index {text}")),
        }
    }

    pub(crate) fn u64_immediate(&mut self) -> ParseResult<u64> {
        let token = self.token;
        if token.kind != TokenKind::Number {
            return self.parse_error(format!("Expected number, got {:?}", token.kind));
        }
        let text = token.span.as_str(self.source);
        match parse_uint(text) {
            Some(value) => {
                self.advance();
                Ok(value)
            }
            None => self.error_at(token.span, format!("Unable to parse number {text}")),
        }
    }

    pub(crate) fn i32_immediate(&mut self) -> ParseResult<i32> {
        let token = self.number_token()?;
        let text = token.span.as_str(self.source);
        match parse_sint(text, 32) {
            Some(value) => {
                self.advance();
                Ok(value as i32)
            }
            None => self.error_at(token.span, format!("Constant out of range: {text}")),
        }
    }

    pub(crate) fn i64_immediate(&mut self) -> ParseResult<i64> {
        let token = self.number_token()?;
        let text = token.span.as_str(self.source);
        match parse_sint(text, 64) {
            Some(value) => {
                self.advance();
                Ok(value)
            }
            None => self.error_at(token.span, format!("Constant out of range: {text}")),
        }
    }

    pub(crate) fn f32_immediate(&mut self) -> ParseResult<u32> {
        let token = self.number_token()?;
        let text = token.span.as_str(self.source);
        match parse_f32_bits(text) {
            Some(bits) => {
                self.advance();
                Ok(bits)
            }
            None => self.error_at(token.span, format!("Constant out of range: {text}")),
        }
    }

    pub(crate) fn f64_immediate(&mut self) -> ParseResult<u64> {
        let token = self.number_token()?;
        let text = token.span.as_str(self.source);
        match parse_f64_bits(text) {
            Some(bits) => {
                self.advance();
                Ok(bits)
            }
            None => self.error_at(token.span, format!("Constant out of range: {text}")),
        }
    }

    fn number_token(&mut self) -> ParseResult<Token> {
        if self.token.kind != TokenKind::Number {
            return self.parse_error(format!("Expected number, got {:?}", self.token.kind));
        }
        Ok(self.token)
    }

    pub(crate) fn peek(&self) -> Token {
        self.lexer.clone().next_non_trivial_token()
    }

    pub(crate) fn advance(&mut self) {
        self.token = self.lexer.next_non_trivial_token();
    }

    pub(crate) fn eat(&mut self, kind: TokenKind) -> bool {
        if self.token.kind == kind {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn expect(&mut self, token_kind: TokenKind) -> ParseResult<Token> {
        let token = self.token;
        if token.kind == token_kind {
            self.advance();
            return Ok(token);
        }
        match token.kind {
            TokenKind::UnterminatedStringError => self.parse_error("Unterminated string literal"),
            TokenKind::UnterminatedCommentError => self.parse_error("Unterminated block comment"),
            other => self.parse_error(format!("Expected token {token_kind:?}, got {other:?}")),
        }
    }

    pub(crate) fn parse_error<T>(&self, msg: impl Into<String>) -> ParseResult<T> {
        self.error_at(self.token.span, msg)
    }

    fn error_at<T>(&self, span: Span, msg: impl Into<String>) -> ParseResult<T> {
        let (line, col) = line_col(self.source, span.0);
        Err(ParseError {
            msg: msg.into(),
            span,
            line,
            col,
        })
    }
}

fn placeholder_elem() -> Elem {
    Elem {
        kind: ElemKind::Passive,
        ty: RefType::FUNCREF,
        items: ElemItems::Functions(Vec::new()),
    }
}

fn decode_string(text: &str) -> Option<Vec<u8>> {
    let mut bytes = Vec::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            let mut buf = [0u8; 4];
            bytes.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            continue;
        }
        match chars.next()? {
            't' => bytes.push(b'\t'),
            'n' => bytes.push(b'\n'),
            'r' => bytes.push(b'\r'),
            '"' => bytes.push(b'"'),
            '\'' => bytes.push(b'\''),
            '\\' => bytes.push(b'\\'),
            'u' => {
                if chars.next()? != '{' {
                    return None;
                }
                let mut value = 0u32;
                let mut digits = 0;
                loop {
                    let c = chars.next()?;
                    if c == '}' {
                        break;
                    }
                    if c == '_' {
                        continue;
                    }
                    value = value.checked_mul(16)?.checked_add(c.to_digit(16)?)?;
                    digits += 1;
                }
                if digits == 0 {
                    return None;
                }
                let c = char::from_u32(value)?;
                let mut buf = [0u8; 4];
                bytes.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            }
            hi => {
                let hi = hi.to_digit(16)?;
                let lo = chars.next()?.to_digit(16)?;
                bytes.push((hi * 16 + lo) as u8);
            }
        }
    }
    Some(bytes)
}

/// Removes `_` digit separators. Each one must sit between two digits
/// of the radix, so `1_`, `1__2` and `0x_ff` are malformed.
fn strip_separators(text: &str, hex: bool) -> Option<String> {
    fn digit(b: u8, hex: bool) -> bool {
        b.is_ascii_digit() || (hex && matches!(b, b'a'..=b'f' | b'A'..=b'F'))
    }
    let bytes = text.as_bytes();
    for (i, &b) in bytes.iter().enumerate() {
        if b != b'_' {
            continue;
        }
        let between = i > 0
            && digit(bytes[i - 1], hex)
            && bytes.get(i + 1).is_some_and(|&b| digit(b, hex));
        if !between {
            return None;
        }
    }
    Some(text.replace('_', ""))
}

fn parse_uint(text: &str) -> Option<u64> {
    let text = strip_separators(text, text.starts_with("0x"))?;
    if let Some(hex) = text.strip_prefix("0x") {
        if hex.is_empty() {
            return None;
        }
        u64::from_str_radix(hex, 16).ok()
    } else {
        if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        text.parse().ok()
    }
}

/// Signed constants accept the whole `[-2^(bits-1), 2^bits)` window so
/// both signed and unsigned spellings of the same bit pattern work.
fn parse_sint(text: &str, bits: u32) -> Option<i64> {
    let (negative, digits) = match text.as_bytes().first()? {
        b'+' => (false, &text[1..]),
        b'-' => (true, &text[1..]),
        _ => (false, text),
    };
    let magnitude = parse_uint(digits)?;
    if negative {
        let limit = 1u64 << (bits - 1);
        if magnitude > limit {
            return None;
        }
        Some((magnitude as i64).wrapping_neg())
    } else {
        if bits < 64 && magnitude >= 1u64 << bits {
            return None;
        }
        Some(magnitude as i64)
    }
}

fn parse_f32_bits(text: &str) -> Option<u32> {
    let (negative, body) = split_sign(text);
    let bits = float_bits(body, 24, 8, |text| {
        let value: f32 = text.parse().ok()?;
        if value.is_infinite() {
            return None;
        }
        Some(u64::from(value.to_bits()))
    })?;
    Some(bits as u32 | (u32::from(negative) << 31))
}

fn parse_f64_bits(text: &str) -> Option<u64> {
    let (negative, body) = split_sign(text);
    let bits = float_bits(body, 53, 11, |text| {
        let value: f64 = text.parse().ok()?;
        if value.is_infinite() {
            return None;
        }
        Some(value.to_bits())
    })?;
    Some(bits | (u64::from(negative) << 63))
}

fn split_sign(text: &str) -> (bool, &str) {
    match text.as_bytes().first() {
        Some(b'+') => (false, &text[1..]),
        Some(b'-') => (true, &text[1..]),
        _ => (false, text),
    }
}

fn float_bits(
    body: &str,
    signif: u32,
    ebits: u32,
    decimal: impl Fn(&str) -> Option<u64>,
) -> Option<u64> {
    let hex = body.starts_with("0x") || body.starts_with("nan:0x");
    let body = strip_separators(body, hex)?;
    let exp_mask = ((1u64 << ebits) - 1) << (signif - 1);
    if body == "inf" {
        return Some(exp_mask);
    }
    if body == "nan" {
        return Some(exp_mask | 1 << (signif - 2));
    }
    if let Some(payload) = body.strip_prefix("nan:0x") {
        let payload = u64::from_str_radix(payload, 16).ok()?;
        if payload == 0 || payload >> (signif - 1) != 0 {
            return None;
        }
        return Some(exp_mask | payload);
    }
    if let Some(hex) = body.strip_prefix("0x") {
        return hex_float_bits(hex, signif, ebits);
    }
    decimal(&body)
}

/// Hexadecimal floats are converted exactly, rounding to nearest-even
/// once at the target precision. Values too large for the format are
/// rejected rather than rounded to infinity.
fn hex_float_bits(text: &str, signif: u32, ebits: u32) -> Option<u64> {
    let (mantissa, exp) = match text.split_once(['p', 'P']) {
        Some((mantissa, exp)) => {
            let exp = match exp.as_bytes().first()? {
                b'+' => exp[1..].parse::<i64>().ok()?,
                _ => exp.parse::<i64>().ok()?,
            };
            (mantissa, exp)
        }
        None => (text, 0),
    };
    let (int_part, frac_part) = match mantissa.split_once('.') {
        Some((int_part, frac_part)) => (int_part, frac_part),
        None => (mantissa, ""),
    };
    if int_part.is_empty() {
        return None;
    }

    let mut acc: u128 = 0;
    let mut exp2: i64 = exp;
    let mut sticky = false;
    for c in int_part.chars() {
        let digit = c.to_digit(16)? as u128;
        if acc >> 120 == 0 {
            acc = acc * 16 + digit;
        } else {
            exp2 += 4;
            sticky |= digit != 0;
        }
    }
    for c in frac_part.chars() {
        let digit = c.to_digit(16)? as u128;
        if acc >> 120 == 0 {
            acc = acc * 16 + digit;
            exp2 -= 4;
        } else {
            sticky |= digit != 0;
        }
    }
    if acc == 0 {
        return Some(0);
    }

    let bias = (1i64 << (ebits - 1)) - 1;
    let width = 128 - acc.leading_zeros() as i64;
    let mut exponent = exp2 + width - 1 + bias;
    let mut shift = width - i64::from(signif);
    if exponent <= 0 {
        // Subnormal: shift further so the exponent field can stay zero.
        shift += 1 - exponent;
        exponent = 0;
    }

    let mut mant: u128;
    if shift <= 0 {
        mant = acc << -shift;
    } else if shift > 127 {
        mant = 0;
        sticky = true;
    } else {
        let guard = (acc >> (shift - 1)) & 1 != 0;
        sticky |= acc & ((1u128 << (shift - 1)) - 1) != 0;
        mant = acc >> shift;
        if guard && (sticky || mant & 1 != 0) {
            mant += 1;
            if mant >> signif != 0 {
                mant >>= 1;
                exponent += 1;
            }
        }
    }
    if exponent == 0 && mant >> (signif - 1) != 0 {
        // Rounding carried a subnormal up into normal range.
        exponent = 1;
    }
    if exponent >= (1i64 << ebits) - 1 {
        return None;
    }

    let mant_mask = (1u64 << (signif - 1)) - 1;
    Some(((exponent as u64) << (signif - 1)) | (mant as u64 & mant_mask))
}
