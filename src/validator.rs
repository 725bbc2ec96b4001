mod func;
#[cfg(test)]
mod test;

use std::collections::HashSet;

use thiserror::Error;

use crate::features::Features;
use crate::instr::Instruction;
use crate::module::{
    DataKind, Elem, ElemItems, ElemKind, Export, ExternalKind, Func, Import, ImportKind, Module,
    Tag,
};
use crate::types::{
    CompositeType, FieldType, FuncType, HeapType, Limits, RefType, StorageType, SubType,
    TableType, ValType,
};

const MAX_PAGES_32: u64 = 1 << 16;
const MAX_PAGES_64: u64 = 1 << 48;

/// One validation failure. `location` names the item it was found in, as
/// in `func[3] instr[17]`, `memory[1]` or `global[0] init`; item indices
/// count imports first, matching the binary index spaces.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[error("{location}: {message}")]
pub struct Diagnostic {
    pub message: String,
    pub location: String,
}

/// Checks a module against the rules of the enabled [`Features`]. A
/// failure is recorded and validation moves on to the next item, so a
/// single call reports every broken item; within one item the first
/// failure wins.
pub fn validate(module: &Module, features: &Features) -> Result<(), Vec<Diagnostic>> {
    let mut validator = Validator {
        module,
        features,
        types: module.sub_types().collect(),
        declared: HashSet::new(),
        diagnostics: Vec::new(),
    };
    validator.run();
    if validator.diagnostics.is_empty() {
        Ok(())
    } else {
        Err(validator.diagnostics)
    }
}

struct Validator<'m> {
    module: &'m Module,
    features: &'m Features,
    /// The type section flattened across rec groups.
    types: Vec<&'m SubType>,
    /// Functions that `ref.func` may name inside a body: those occurring
    /// in exports, element segments or other constant expressions.
    declared: HashSet<u32>,
    diagnostics: Vec<Diagnostic>,
}

impl<'m> Validator<'m> {
    fn run(&mut self) {
        self.collect_declared();
        self.check_types();
        self.check_imports();
        self.check_tables();
        self.check_memories();
        self.check_globals();
        self.check_exports();
        self.check_start();
        self.check_elems();
        self.check_datas();
        self.check_tags();
        self.check_funcs();
    }

    fn diag(&mut self, location: String, message: String) {
        self.diagnostics.push(Diagnostic { message, location });
    }

    fn check_const(&mut self, location: String, expected: ValType, global_limit: u32, expr: &[Instruction]) {
        if let Err(diagnostic) = func::check_const(self, &location, expected, global_limit, expr) {
            self.diagnostics.push(diagnostic);
        }
    }

    fn collect_declared(&mut self) {
        let module = self.module;
        for export in &module.exports {
            if export.kind == ExternalKind::Func {
                self.declared.insert(export.index);
            }
        }
        for global in &module.globals {
            self.collect_refs(&global.init);
        }
        for elem in &module.elems {
            if let ElemKind::Active { offset, .. } = &elem.kind {
                self.collect_refs(offset);
            }
            match &elem.items {
                ElemItems::Functions(items) => self.declared.extend(items),
                ElemItems::Expressions(exprs) => {
                    for expr in exprs {
                        self.collect_refs(expr);
                    }
                }
            }
        }
        for data in &module.datas {
            if let DataKind::Active { offset, .. } = &data.kind {
                self.collect_refs(offset);
            }
        }
    }

    fn collect_refs(&mut self, expr: &[Instruction]) {
        for instr in expr {
            if let Instruction::RefFunc(func) = instr {
                self.declared.insert(*func);
            }
        }
    }

    fn check_types(&mut self) {
        let module = self.module;
        let mut idx = 0;
        for group in &module.types {
            if group.explicit_rec {
                if let Err(msg) = self.feature(self.features.gc, "gc") {
                    self.diag(format!("type[{idx}]"), msg);
                }
            }
            for sub in &group.types {
                if let Err(msg) = self.sub_type_ok(idx, sub) {
                    self.diag(format!("type[{idx}]"), msg);
                }
                idx += 1;
            }
        }
    }

    fn sub_type_ok(&self, idx: u32, sub: &SubType) -> Result<(), String> {
        if !sub.is_final || sub.supertype.is_some() {
            self.feature(self.features.gc, "gc")?;
        }
        match &sub.composite {
            CompositeType::Func(ty) => {
                for &param in &ty.params {
                    self.val_type_ok(param)?;
                }
                for &result in &ty.results {
                    self.val_type_ok(result)?;
                }
                if ty.results.len() > 1 {
                    self.feature(self.features.multi_value, "multi-value")?;
                }
            }
            CompositeType::Struct(fields) => {
                self.feature(self.features.gc, "gc")?;
                for field in fields {
                    self.storage_ok(field.storage)?;
                }
            }
            CompositeType::Array(field) => {
                self.feature(self.features.gc, "gc")?;
                self.storage_ok(field.storage)?;
            }
        }
        if let Some(sup) = sub.supertype {
            if sup >= idx {
                return Err(format!("Supertype {sup} must be declared before its subtypes"));
            }
            let Some(sup_ty) = self.sub_type(sup) else {
                return Err(format!("Unknown type {sup}"));
            };
            if sup_ty.is_final {
                return Err(format!("Supertype {sup} is final"));
            }
            self.composite_matches(&sub.composite, &sup_ty.composite)?;
        }
        Ok(())
    }

    /// Declared subtyping: function types are contravariant in parameters
    /// and covariant in results, structs may widen and deepen, mutable
    /// fields stay invariant.
    fn composite_matches(&self, sub: &CompositeType, sup: &CompositeType) -> Result<(), String> {
        match (sub, sup) {
            (CompositeType::Func(a), CompositeType::Func(b)) => {
                let params_ok = a.params.len() == b.params.len()
                    && a.params.iter().zip(&b.params).all(|(x, y)| self.val_subtype(*y, *x));
                let results_ok = a.results.len() == b.results.len()
                    && a.results.iter().zip(&b.results).all(|(x, y)| self.val_subtype(*x, *y));
                if !params_ok || !results_ok {
                    return Err("Function type does not match its supertype".to_string());
                }
            }
            (CompositeType::Struct(a), CompositeType::Struct(b)) => {
                if a.len() < b.len() {
                    return Err("Struct type has fewer fields than its supertype".to_string());
                }
                for (i, (x, y)) in a.iter().zip(b).enumerate() {
                    if !self.field_subtype(*x, *y) {
                        return Err(format!("Field {i} does not match the supertype"));
                    }
                }
            }
            (CompositeType::Array(a), CompositeType::Array(b)) => {
                if !self.field_subtype(*a, *b) {
                    return Err("Array element type does not match the supertype".to_string());
                }
            }
            _ => return Err("Supertype has a different composite kind".to_string()),
        }
        Ok(())
    }

    fn check_imports(&mut self) {
        let module = self.module;
        for (i, import) in module.imports.iter().enumerate() {
            if let Err(msg) = self.import_ok(import) {
                self.diag(format!("import[{i}]"), msg);
            }
        }
    }

    fn import_ok(&self, import: &Import) -> Result<(), String> {
        match &import.kind {
            ImportKind::Func(type_idx) => self.func_type_at(*type_idx).map(|_| ()),
            ImportKind::Table(ty) => self.table_ok(ty),
            ImportKind::Memory(limits) => self.memory_ok(limits),
            ImportKind::Global(ty) => {
                self.val_type_ok(ty.val_type)?;
                if ty.mutable {
                    self.feature(self.features.mutable_global, "mutable-global")?;
                }
                Ok(())
            }
            ImportKind::Tag(tag) => self.tag_ok(tag),
        }
    }

    fn check_tables(&mut self) {
        let module = self.module;
        let imported = module.num_imported_tables();
        for (i, table) in module.tables.iter().enumerate() {
            let idx = imported + i as u32;
            if let Err(msg) = self.table_ok(table) {
                self.diag(format!("table[{idx}]"), msg);
            }
        }
        if module.table_count() > 1 {
            if let Err(msg) = self.feature(self.features.reference_types, "reference-types") {
                self.diag("table[1]".to_string(), msg);
            }
        }
    }

    fn table_ok(&self, table: &TableType) -> Result<(), String> {
        self.ref_type_ok(table.element)?;
        if !table.element.nullable {
            return Err(format!("Table element type {} has no default value", table.element));
        }
        let limits = &table.limits;
        if limits.shared {
            return Err("Tables cannot be shared".to_string());
        }
        if limits.memory64 {
            self.feature(self.features.memory64, "memory64")?;
        }
        let cap = if limits.memory64 { u64::MAX } else { u64::from(u32::MAX) };
        self.limits_ok(limits, cap)
    }

    fn check_memories(&mut self) {
        let module = self.module;
        let imported = module.num_imported_memories();
        for (i, limits) in module.memories.iter().enumerate() {
            let idx = imported + i as u32;
            if let Err(msg) = self.memory_ok(limits) {
                self.diag(format!("memory[{idx}]"), msg);
            }
        }
        if module.memory_count() > 1 {
            if let Err(msg) = self.feature(self.features.multi_memory, "multi-memory") {
                self.diag("memory[1]".to_string(), msg);
            }
        }
    }

    fn memory_ok(&self, limits: &Limits) -> Result<(), String> {
        if limits.memory64 {
            self.feature(self.features.memory64, "memory64")?;
        }
        if limits.shared {
            self.feature(self.features.threads, "threads")?;
            if limits.max.is_none() {
                return Err("Shared memories require a maximum size".to_string());
            }
        }
        let cap = if limits.memory64 { MAX_PAGES_64 } else { MAX_PAGES_32 };
        self.limits_ok(limits, cap)
    }

    fn limits_ok(&self, limits: &Limits, cap: u64) -> Result<(), String> {
        if limits.min > cap {
            return Err(format!("Limits minimum {} exceeds the cap of {cap}", limits.min));
        }
        if let Some(max) = limits.max {
            if max > cap {
                return Err(format!("Limits maximum {max} exceeds the cap of {cap}"));
            }
            if max < limits.min {
                return Err("Limits minimum is larger than the maximum".to_string());
            }
        }
        Ok(())
    }

    fn check_globals(&mut self) {
        let module = self.module;
        let imported = module.num_imported_globals();
        for (i, global) in module.globals.iter().enumerate() {
            let idx = imported + i as u32;
            if let Err(msg) = self.val_type_ok(global.ty.val_type) {
                self.diag(format!("global[{idx}]"), msg);
                continue;
            }
            // A global may only read globals declared before itself.
            self.check_const(format!("global[{idx}] init"), global.ty.val_type, idx, &global.init);
        }
    }

    fn check_exports(&mut self) {
        let module = self.module;
        let mut seen = HashSet::new();
        for (i, export) in module.exports.iter().enumerate() {
            if let Err(msg) = self.export_ok(export, &mut seen) {
                self.diag(format!("export[{i}]"), msg);
            }
        }
    }

    fn export_ok(&self, export: &'m Export, seen: &mut HashSet<&'m str>) -> Result<(), String> {
        if !seen.insert(export.name.as_str()) {
            return Err(format!("Duplicate export name \"{}\"", export.name));
        }
        let idx = export.index;
        match export.kind {
            ExternalKind::Func => {
                if self.module.func_type_idx(idx).is_none() {
                    return Err(format!("Unknown function {idx}"));
                }
            }
            ExternalKind::Table => {
                if self.module.table_type(idx).is_none() {
                    return Err(format!("Unknown table {idx}"));
                }
            }
            ExternalKind::Memory => {
                if self.module.memory_type(idx).is_none() {
                    return Err(format!("Unknown memory {idx}"));
                }
            }
            ExternalKind::Global => {
                let Some(ty) = self.module.global_type(idx) else {
                    return Err(format!("Unknown global {idx}"));
                };
                if ty.mutable {
                    self.feature(self.features.mutable_global, "mutable-global")?;
                }
            }
            ExternalKind::Tag => {
                if self.module.tag_type_idx(idx).is_none() {
                    return Err(format!("Unknown tag {idx}"));
                }
            }
        }
        Ok(())
    }

    fn check_start(&mut self) {
        if let Some(func) = self.module.start {
            if let Err(msg) = self.start_ok(func) {
                self.diag("start".to_string(), msg);
            }
        }
    }

    fn start_ok(&self, func: u32) -> Result<(), String> {
        let Some(type_idx) = self.module.func_type_idx(func) else {
            return Err(format!("Unknown function {func}"));
        };
        let ty = self.func_type_at(type_idx)?;
        if !ty.params.is_empty() || !ty.results.is_empty() {
            return Err("Start function must have no parameters and no results".to_string());
        }
        Ok(())
    }

    fn check_elems(&mut self) {
        let module = self.module;
        let globals = module.global_count();
        for (i, elem) in module.elems.iter().enumerate() {
            if let Err(msg) = self.elem_ok(elem) {
                self.diag(format!("elem[{i}]"), msg);
                continue;
            }
            if let ElemKind::Active { table, offset } = &elem.kind {
                let addr = match module.table_type(*table) {
                    Some(ty) if ty.limits.memory64 => ValType::I64,
                    _ => ValType::I32,
                };
                self.check_const(format!("elem[{i}] offset"), addr, globals, offset);
            }
            if let ElemItems::Expressions(exprs) = &elem.items {
                for (j, expr) in exprs.iter().enumerate() {
                    self.check_const(format!("elem[{i}] item[{j}]"), ValType::Ref(elem.ty), globals, expr);
                }
            }
        }
    }

    fn elem_ok(&self, elem: &Elem) -> Result<(), String> {
        self.ref_type_ok(elem.ty)?;
        match &elem.kind {
            ElemKind::Active { table, .. } => {
                let Some(ty) = self.module.table_type(*table) else {
                    return Err(format!("Unknown table {table}"));
                };
                if !self.ref_subtype(elem.ty, ty.element) {
                    return Err(format!(
                        "Element type {} does not match the table element type {}",
                        elem.ty, ty.element
                    ));
                }
            }
            ElemKind::Passive | ElemKind::Declared => {
                self.feature(self.features.bulk_memory, "bulk-memory")?;
            }
        }
        if let ElemItems::Functions(items) = &elem.items {
            for &func in items {
                let Some(type_idx) = self.module.func_type_idx(func) else {
                    return Err(format!("Unknown function {func}"));
                };
                let item = RefType { nullable: false, heap: HeapType::Index(type_idx) };
                if !self.ref_subtype(item, elem.ty) {
                    return Err(format!("Function {func} does not match the element type {}", elem.ty));
                }
            }
        }
        Ok(())
    }

    fn check_datas(&mut self) {
        let module = self.module;
        if let Some(count) = module.data_count {
            if count as usize != module.datas.len() {
                let msg = format!("Expected {count} data segments but found {}", module.datas.len());
                self.diag("data count".to_string(), msg);
            }
        }
        let globals = module.global_count();
        for (i, data) in module.datas.iter().enumerate() {
            match &data.kind {
                DataKind::Active { memory, offset } => {
                    let Some(limits) = module.memory_type(*memory) else {
                        self.diag(format!("data[{i}]"), format!("Unknown memory {memory}"));
                        continue;
                    };
                    let addr = if limits.memory64 { ValType::I64 } else { ValType::I32 };
                    self.check_const(format!("data[{i}] offset"), addr, globals, offset);
                }
                DataKind::Passive => {
                    if let Err(msg) = self.feature(self.features.bulk_memory, "bulk-memory") {
                        self.diag(format!("data[{i}]"), msg);
                    }
                }
            }
        }
    }

    fn check_tags(&mut self) {
        let module = self.module;
        let imported = module.num_imported_tags();
        for (i, tag) in module.tags.iter().enumerate() {
            let idx = imported + i as u32;
            if let Err(msg) = self.tag_ok(tag) {
                self.diag(format!("tag[{idx}]"), msg);
            }
        }
    }

    fn tag_ok(&self, tag: &Tag) -> Result<(), String> {
        self.feature(self.features.exceptions, "exceptions")?;
        let ty = self.func_type_at(tag.type_idx)?;
        if !ty.results.is_empty() {
            return Err("Tag types must not have results".to_string());
        }
        Ok(())
    }

    fn check_funcs(&mut self) {
        let module = self.module;
        let imported = module.num_imported_funcs();
        for (i, function) in module.funcs.iter().enumerate() {
            let idx = imported + i as u32;
            if let Err(msg) = self.func_ok(function) {
                self.diag(format!("func[{idx}]"), msg);
                continue;
            }
            let Some(ty) = module.func_type(function.type_idx) else {
                continue;
            };
            if let Err(diagnostic) = func::check_body(self, idx, ty, function) {
                self.diagnostics.push(diagnostic);
            }
        }
    }

    fn func_ok(&self, function: &Func) -> Result<(), String> {
        self.func_type_at(function.type_idx)?;
        for &local in &function.locals {
            self.val_type_ok(local)?;
            if !local.is_defaultable() {
                return Err(format!("Local of non-defaultable type {local}"));
            }
        }
        Ok(())
    }

    fn feature(&self, enabled: bool, name: &str) -> Result<(), String> {
        if enabled {
            Ok(())
        } else {
            Err(format!("Feature {name} is not enabled"))
        }
    }

    fn val_type_ok(&self, ty: ValType) -> Result<(), String> {
        match ty {
            ValType::V128 => self.feature(self.features.simd, "simd"),
            ValType::Ref(r) => self.ref_type_ok(r),
            _ => Ok(()),
        }
    }

    fn ref_type_ok(&self, ty: RefType) -> Result<(), String> {
        match ty.heap {
            HeapType::Func | HeapType::Extern if ty.nullable => {
                self.feature(self.features.reference_types, "reference-types")
            }
            HeapType::Func | HeapType::Extern => {
                self.feature(self.features.typed_refs(), "function-references")
            }
            HeapType::Index(idx) => {
                self.feature(self.features.typed_refs(), "function-references")?;
                if self.sub_type(idx).is_none() {
                    return Err(format!("Unknown type {idx}"));
                }
                Ok(())
            }
            _ => self.feature(self.features.gc, "gc"),
        }
    }

    fn storage_ok(&self, storage: StorageType) -> Result<(), String> {
        match storage {
            StorageType::I8 | StorageType::I16 => Ok(()),
            StorageType::Val(ty) => self.val_type_ok(ty),
        }
    }

    fn sub_type(&self, idx: u32) -> Option<&'m SubType> {
        self.types.get(idx as usize).copied()
    }

    fn composite(&self, idx: u32) -> Option<&'m CompositeType> {
        self.sub_type(idx).map(|sub| &sub.composite)
    }

    fn func_type_at(&self, idx: u32) -> Result<&'m FuncType, String> {
        let Some(sub) = self.sub_type(idx) else {
            return Err(format!("Unknown type {idx}"));
        };
        match sub.composite.as_func() {
            Some(ty) => Ok(ty),
            None => Err(format!("Type {idx} is not a function type")),
        }
    }

    fn val_subtype(&self, sub: ValType, sup: ValType) -> bool {
        match (sub, sup) {
            (ValType::Ref(a), ValType::Ref(b)) => self.ref_subtype(a, b),
            _ => sub == sup,
        }
    }

    fn ref_subtype(&self, sub: RefType, sup: RefType) -> bool {
        if sub.nullable && !sup.nullable {
            return false;
        }
        self.heap_subtype(sub.heap, sup.heap)
    }

    fn heap_subtype(&self, sub: HeapType, sup: HeapType) -> bool {
        use HeapType::{Any, Array, Eq, Extern, Func, I31, Index, NoExtern, NoFunc, None, Struct};
        if sub == sup {
            return true;
        }
        match (sub, sup) {
            (NoFunc, Func) => true,
            (NoExtern, Extern) => true,
            (Eq | I31 | Struct | Array | None, Any) => true,
            (I31 | Struct | Array | None, Eq) => true,
            (None, I31 | Struct | Array) => true,
            (Index(i), Func) => matches!(self.composite(i), Some(CompositeType::Func(_))),
            (Index(i), Any | Eq) => {
                matches!(self.composite(i), Some(CompositeType::Struct(_) | CompositeType::Array(_)))
            }
            (Index(i), Struct) => matches!(self.composite(i), Some(CompositeType::Struct(_))),
            (Index(i), Array) => matches!(self.composite(i), Some(CompositeType::Array(_))),
            (None, Index(j)) => {
                matches!(self.composite(j), Some(CompositeType::Struct(_) | CompositeType::Array(_)))
            }
            (NoFunc, Index(j)) => matches!(self.composite(j), Some(CompositeType::Func(_))),
            (Index(i), Index(j)) => self.supertype_chain(i, j),
            _ => false,
        }
    }

    fn supertype_chain(&self, mut idx: u32, target: u32) -> bool {
        // Bounded so a malformed chain, which check_types flags on its
        // own, cannot loop here.
        for _ in 0..=self.types.len() {
            if idx == target {
                return true;
            }
            match self.sub_type(idx).and_then(|sub| sub.supertype) {
                Some(sup) => idx = sup,
                _ => return false,
            }
        }
        false
    }

    fn field_subtype(&self, sub: FieldType, sup: FieldType) -> bool {
        if sub.mutable != sup.mutable {
            return false;
        }
        if sub.mutable {
            sub.storage == sup.storage
        } else {
            self.storage_subtype(sub.storage, sup.storage)
        }
    }

    fn storage_subtype(&self, sub: StorageType, sup: StorageType) -> bool {
        match (sub, sup) {
            (StorageType::Val(a), StorageType::Val(b)) => self.val_subtype(a, b),
            _ => sub == sup,
        }
    }

    fn top_heap(&self, heap: HeapType) -> HeapType {
        match heap {
            HeapType::Func | HeapType::NoFunc => HeapType::Func,
            HeapType::Extern | HeapType::NoExtern => HeapType::Extern,
            HeapType::Index(idx) => match self.composite(idx) {
                Some(CompositeType::Func(_)) => HeapType::Func,
                _ => HeapType::Any,
            },
            _ => HeapType::Any,
        }
    }
}
