use std::collections::BTreeMap;

use crate::instr::Instruction;
use crate::types::{FuncType, GlobalType, Limits, RecGroup, RefType, SubType, TableType, ValType};

/// An instruction sequence terminated by `End`. Constant expressions use
/// the same shape.
pub type Expr = Vec<Instruction>;

/// A decoded or parsed module. Built by exactly one producer and not
/// mutated afterwards; `PartialEq` makes round-trip equality testable.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Module {
    pub types: Vec<RecGroup>,
    pub imports: Vec<Import>,
    pub funcs: Vec<Func>,
    pub tables: Vec<TableType>,
    pub memories: Vec<Limits>,
    pub globals: Vec<Global>,
    pub exports: Vec<Export>,
    pub start: Option<u32>,
    pub elems: Vec<Elem>,
    pub data_count: Option<u32>,
    pub datas: Vec<Data>,
    pub tags: Vec<Tag>,
    pub customs: Vec<Custom>,
    pub names: Names,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Import {
    pub module: String,
    pub name: String,
    pub kind: ImportKind,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ImportKind {
    Func(u32),
    Table(TableType),
    Memory(Limits),
    Global(GlobalType),
    Tag(Tag),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Func {
    pub type_idx: u32,
    pub locals: Vec<ValType>,
    pub body: Expr,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Global {
    pub ty: GlobalType,
    pub init: Expr,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Tag {
    pub type_idx: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Export {
    pub name: String,
    pub kind: ExternalKind,
    pub index: u32,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ExternalKind {
    Func,
    Table,
    Memory,
    Global,
    Tag,
}

impl ExternalKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            ExternalKind::Func => "func",
            ExternalKind::Table => "table",
            ExternalKind::Memory => "memory",
            ExternalKind::Global => "global",
            ExternalKind::Tag => "tag",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Elem {
    pub kind: ElemKind,
    pub ty: RefType,
    pub items: ElemItems,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ElemKind {
    Active { table: u32, offset: Expr },
    Passive,
    Declared,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ElemItems {
    Functions(Vec<u32>),
    Expressions(Vec<Expr>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Data {
    pub kind: DataKind,
    pub bytes: Vec<u8>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum DataKind {
    Active { memory: u32, offset: Expr },
    Passive,
}

/// An opaque custom section. `after` is the id of the last standard
/// section decoded before it, so re-encoding keeps the interleaving.
#[derive(Clone, Debug, PartialEq)]
pub struct Custom {
    pub name: String,
    pub bytes: Vec<u8>,
    pub after: u8,
}

/// Symbolic names, either recovered from a `name` custom section or
/// collected from `$ids` in text. Ordered maps keep encoding
/// deterministic.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Names {
    pub module: Option<String>,
    pub funcs: BTreeMap<u32, String>,
    pub locals: BTreeMap<u32, BTreeMap<u32, String>>,
    pub types: BTreeMap<u32, String>,
    pub tables: BTreeMap<u32, String>,
    pub memories: BTreeMap<u32, String>,
    pub globals: BTreeMap<u32, String>,
    pub elems: BTreeMap<u32, String>,
    pub datas: BTreeMap<u32, String>,
    pub tags: BTreeMap<u32, String>,
    pub fields: BTreeMap<u32, BTreeMap<u32, String>>,
}

impl Names {
    pub fn is_empty(&self) -> bool {
        self.module.is_none()
            && self.funcs.is_empty()
            && self.locals.is_empty()
            && self.types.is_empty()
            && self.tables.is_empty()
            && self.memories.is_empty()
            && self.globals.is_empty()
            && self.elems.is_empty()
            && self.datas.is_empty()
            && self.tags.is_empty()
            && self.fields.is_empty()
    }
}

impl Module {
    pub fn imported_funcs(&self) -> impl Iterator<Item = u32> + '_ {
        self.imports.iter().filter_map(|i| match i.kind {
            ImportKind::Func(type_idx) => Some(type_idx),
            _ => None,
        })
    }

    pub fn num_imported_funcs(&self) -> u32 {
        self.imported_funcs().count() as u32
    }

    pub fn num_imported_tables(&self) -> u32 {
        let tables = self.imports.iter().filter(|i| matches!(i.kind, ImportKind::Table(_)));
        tables.count() as u32
    }

    pub fn num_imported_memories(&self) -> u32 {
        let memories = self.imports.iter().filter(|i| matches!(i.kind, ImportKind::Memory(_)));
        memories.count() as u32
    }

    pub fn num_imported_globals(&self) -> u32 {
        let globals = self.imports.iter().filter(|i| matches!(i.kind, ImportKind::Global(_)));
        globals.count() as u32
    }

    pub fn num_imported_tags(&self) -> u32 {
        let tags = self.imports.iter().filter(|i| matches!(i.kind, ImportKind::Tag(_)));
        tags.count() as u32
    }

    pub fn func_count(&self) -> u32 {
        self.num_imported_funcs() + self.funcs.len() as u32
    }

    pub fn table_count(&self) -> u32 {
        self.num_imported_tables() + self.tables.len() as u32
    }

    pub fn memory_count(&self) -> u32 {
        self.num_imported_memories() + self.memories.len() as u32
    }

    pub fn global_count(&self) -> u32 {
        self.num_imported_globals() + self.globals.len() as u32
    }

    pub fn tag_count(&self) -> u32 {
        self.num_imported_tags() + self.tags.len() as u32
    }

    pub fn type_count(&self) -> u32 {
        self.types.iter().map(|g| g.types.len() as u32).sum()
    }

    /// Resolves a function index across imports and definitions to its
    /// type index.
    pub fn func_type_idx(&self, func: u32) -> Option<u32> {
        let imported = self.num_imported_funcs();
        if func < imported {
            self.imported_funcs().nth(func as usize)
        } else {
            let func = self.funcs.get((func - imported) as usize)?;
            Some(func.type_idx)
        }
    }

    pub fn table_type(&self, table: u32) -> Option<TableType> {
        let mut imported = self.imports.iter().filter_map(|i| match i.kind {
            ImportKind::Table(ty) => Some(ty),
            _ => None,
        });
        let count = self.num_imported_tables();
        if table < count {
            imported.nth(table as usize)
        } else {
            self.tables.get((table - count) as usize).copied()
        }
    }

    pub fn memory_type(&self, memory: u32) -> Option<Limits> {
        let mut imported = self.imports.iter().filter_map(|i| match i.kind {
            ImportKind::Memory(ty) => Some(ty),
            _ => None,
        });
        let count = self.num_imported_memories();
        if memory < count {
            imported.nth(memory as usize)
        } else {
            self.memories.get((memory - count) as usize).copied()
        }
    }

    pub fn global_type(&self, global: u32) -> Option<GlobalType> {
        let mut imported = self.imports.iter().filter_map(|i| match i.kind {
            ImportKind::Global(ty) => Some(ty),
            _ => None,
        });
        let count = self.num_imported_globals();
        if global < count {
            imported.nth(global as usize)
        } else {
            self.globals.get((global - count) as usize).map(|g| g.ty)
        }
    }

    pub fn tag_type_idx(&self, tag: u32) -> Option<u32> {
        let mut imported = self.imports.iter().filter_map(|i| match i.kind {
            ImportKind::Tag(tag) => Some(tag.type_idx),
            _ => None,
        });
        let count = self.num_imported_tags();
        if tag < count {
            imported.nth(tag as usize)
        } else {
            self.tags.get((tag - count) as usize).map(|t| t.type_idx)
        }
    }

    /// The flattened view of the type section, rec groups expanded.
    pub fn sub_types(&self) -> impl Iterator<Item = &SubType> {
        self.types.iter().flat_map(|group| group.types.iter())
    }

    pub fn sub_type(&self, idx: u32) -> Option<&SubType> {
        self.sub_types().nth(idx as usize)
    }

    pub fn func_type(&self, type_idx: u32) -> Option<&FuncType> {
        self.sub_type(type_idx)?.composite.as_func()
    }
}
