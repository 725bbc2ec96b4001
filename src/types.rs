use std::fmt;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ValType {
    I32,
    I64,
    F32,
    F64,
    V128,
    Ref(RefType),
}

impl ValType {
    pub const FUNCREF: ValType = ValType::Ref(RefType::FUNCREF);
    pub const EXTERNREF: ValType = ValType::Ref(RefType::EXTERNREF);

    pub fn is_numeric(&self) -> bool {
        matches!(self, ValType::I32 | ValType::I64 | ValType::F32 | ValType::F64)
    }

    /// Types with a zero value. Locals and table/global defaults need one.
    pub fn is_defaultable(&self) -> bool {
        match self {
            ValType::Ref(r) => r.nullable,
            _ => true,
        }
    }
}

impl fmt::Display for ValType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ValType::I32 => write!(f, "i32"),
            ValType::I64 => write!(f, "i64"),
            ValType::F32 => write!(f, "f32"),
            ValType::F64 => write!(f, "f64"),
            ValType::V128 => write!(f, "v128"),
            ValType::Ref(r) => write!(f, "{r}"),
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct RefType {
    pub nullable: bool,
    pub heap: HeapType,
}

impl RefType {
    pub const FUNCREF: RefType = RefType {
        nullable: true,
        heap: HeapType::Func,
    };
    pub const EXTERNREF: RefType = RefType {
        nullable: true,
        heap: HeapType::Extern,
    };
}

impl fmt::Display for RefType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match (self.nullable, self.heap) {
            (true, HeapType::Func) => write!(f, "funcref"),
            (true, HeapType::Extern) => write!(f, "externref"),
            (true, heap) => write!(f, "(ref null {heap})"),
            (false, heap) => write!(f, "(ref {heap})"),
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum HeapType {
    Func,
    Extern,
    Any,
    Eq,
    I31,
    Struct,
    Array,
    None,
    NoFunc,
    NoExtern,
    /// A type-section index; func, struct or array composite.
    Index(u32),
}

impl fmt::Display for HeapType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            HeapType::Func => write!(f, "func"),
            HeapType::Extern => write!(f, "extern"),
            HeapType::Any => write!(f, "any"),
            HeapType::Eq => write!(f, "eq"),
            HeapType::I31 => write!(f, "i31"),
            HeapType::Struct => write!(f, "struct"),
            HeapType::Array => write!(f, "array"),
            HeapType::None => write!(f, "none"),
            HeapType::NoFunc => write!(f, "nofunc"),
            HeapType::NoExtern => write!(f, "noextern"),
            HeapType::Index(i) => write!(f, "{i}"),
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum StorageType {
    I8,
    I16,
    Val(ValType),
}

impl StorageType {
    pub fn unpacked(&self) -> ValType {
        match self {
            StorageType::I8 | StorageType::I16 => ValType::I32,
            StorageType::Val(ty) => *ty,
        }
    }
}

impl fmt::Display for StorageType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            StorageType::I8 => write!(f, "i8"),
            StorageType::I16 => write!(f, "i16"),
            StorageType::Val(ty) => write!(f, "{ty}"),
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct FieldType {
    pub storage: StorageType,
    pub mutable: bool,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CompositeType {
    Func(FuncType),
    Struct(Vec<FieldType>),
    Array(FieldType),
}

impl CompositeType {
    pub fn as_func(&self) -> Option<&FuncType> {
        match self {
            CompositeType::Func(ty) => Some(ty),
            _ => None,
        }
    }
}

/// One entry of a recursion group: a composite type plus its subtyping
/// declaration. A plain `(type ...)` is final with no supertype.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SubType {
    pub is_final: bool,
    pub supertype: Option<u32>,
    pub composite: CompositeType,
}

impl SubType {
    pub fn func(ty: FuncType) -> Self {
        SubType {
            is_final: true,
            supertype: None,
            composite: CompositeType::Func(ty),
        }
    }
}

/// A type-section entry. `explicit_rec` keeps the `(rec ...)` framing so
/// re-encoding preserves it; a group holding several types is always
/// explicit.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RecGroup {
    pub explicit_rec: bool,
    pub types: Vec<SubType>,
}

impl RecGroup {
    pub fn single(ty: SubType) -> Self {
        RecGroup {
            explicit_rec: false,
            types: vec![ty],
        }
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct FuncType {
    pub params: Vec<ValType>,
    pub results: Vec<ValType>,
}

impl FuncType {
    pub fn new(params: impl Into<Vec<ValType>>, results: impl Into<Vec<ValType>>) -> Self {
        FuncType {
            params: params.into(),
            results: results.into(),
        }
    }
}

/// Table and memory size bounds. `min`/`max` are u64 so 64-bit address
/// spaces fit; the validator enforces the 32-bit ranges when `memory64`
/// is not in play.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Limits {
    pub min: u64,
    pub max: Option<u64>,
    pub shared: bool,
    pub memory64: bool,
}

impl Limits {
    pub fn new(min: u64, max: Option<u64>) -> Self {
        Limits {
            min,
            max,
            shared: false,
            memory64: false,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct TableType {
    pub element: RefType,
    pub limits: Limits,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct GlobalType {
    pub val_type: ValType,
    pub mutable: bool,
}
