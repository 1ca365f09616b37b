//! The IR type algebra — §3.1 of the binding model.
//!
//! `IrType` is a closed sum of variants. `TypeDef`, `Struct`, `Union` and
//! `Enum` are simultaneously declaration entities and usable as types: the
//! same `Rc` is shared by every reference, so cycles between records are
//! ordinary graph edges rather than something the emitter has to special-case.

use std::cell::RefCell;
use std::rc::Rc;

/// Absolute source location of a declaration, as reported by the frontend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub file: std::path::PathBuf,
    pub line: u32,
}

/// Identity of a shared node, used to terminate recursion over cyclic graphs.
/// Two different `Rc` allocations never collide because the tag disambiguates
/// the variant even if an allocator happened to reuse an address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeKey(usize, u8);

fn key_of<T>(rc: &Rc<T>, tag: u8) -> NodeKey {
    NodeKey(Rc::as_ptr(rc) as *const () as usize, tag)
}

/// A C type translated into the IR's closed type algebra.
#[derive(Clone)]
pub enum IrType {
    Primitive(&'static str),
    Pointer(Box<IrType>),
    Array(Box<IrType>, u64),
    FunctionPointer(Rc<FunctionPointerType>),
    TypeDef(Rc<TypeDef>),
    Struct(Rc<Struct>),
    Union(Rc<Union>),
    Enum(Rc<Enum>),
}

impl IrType {
    /// Identity key for the shared node this type wraps, if any. Primitives,
    /// pointers, arrays and function pointers have no identity of their own —
    /// they're plain trees built fresh at every translation site.
    pub fn node_key(&self) -> Option<NodeKey> {
        match self {
            IrType::TypeDef(r) => Some(key_of(r, 0)),
            IrType::Struct(r) => Some(key_of(r, 1)),
            IrType::Union(r) => Some(key_of(r, 2)),
            IrType::Enum(r) => Some(key_of(r, 3)),
            _ => None,
        }
    }

    /// Structural equality, terminating on cyclic graphs. Composite named
    /// declarations fall back to name + content equality rather than deep
    /// structural comparison of every reachable node, matching §3.1.
    pub fn structurally_eq(&self, other: &IrType) -> bool {
        let mut visited = Vec::new();
        eq_rec(self, other, &mut visited)
    }

    /// True if the type directly names an incomplete record: a `TypeDef`
    /// whose inner type has not yet been resolved.
    pub fn is_opaque_typedef(&self) -> bool {
        matches!(self, IrType::TypeDef(td) if td.inner().is_none())
    }
}

impl PartialEq for IrType {
    fn eq(&self, other: &Self) -> bool {
        self.structurally_eq(other)
    }
}

type VisitedPairs = Vec<(NodeKey, NodeKey)>;

fn eq_rec(a: &IrType, b: &IrType, visited: &mut VisitedPairs) -> bool {
    match (a, b) {
        (IrType::Primitive(x), IrType::Primitive(y)) => x == y,
        (IrType::Pointer(x), IrType::Pointer(y)) => eq_rec(x, y, visited),
        (IrType::Array(x, nx), IrType::Array(y, ny)) => nx == ny && eq_rec(x, y, visited),
        (IrType::FunctionPointer(x), IrType::FunctionPointer(y)) => {
            x.variadic == y.variadic
                && x.params.len() == y.params.len()
                && eq_rec(&x.return_type, &y.return_type, visited)
                && x.params
                    .iter()
                    .zip(&y.params)
                    .all(|(p, q)| eq_rec(p, q, visited))
        }
        (IrType::TypeDef(x), IrType::TypeDef(y)) => {
            if Rc::ptr_eq(x, y) {
                return true;
            }
            if x.name != y.name {
                return false;
            }
            let pair = (key_of(x, 0), key_of(y, 0));
            if !visited.contains(&pair) {
                visited.push(pair);
            } else {
                return true;
            }
            match (x.inner(), y.inner()) {
                (Some(xi), Some(yi)) => eq_rec(&xi, &yi, visited),
                (None, None) => true,
                _ => false,
            }
        }
        (IrType::Struct(x), IrType::Struct(y)) => Rc::ptr_eq(x, y) || x.name == y.name,
        (IrType::Union(x), IrType::Union(y)) => Rc::ptr_eq(x, y) || x.name == y.name,
        (IrType::Enum(x), IrType::Enum(y)) => Rc::ptr_eq(x, y) || x.name == y.name,
        _ => false,
    }
}

/// A function-pointer type: return type, ordered parameter types, variadic flag.
pub struct FunctionPointerType {
    pub return_type: IrType,
    pub params: Vec<IrType>,
    pub variadic: bool,
}

/// A named alias for another type. May be opaque — `inner` absent — when the
/// referenced record was only forward-declared. Mutation is limited to a
/// single at-most-once write of `inner`, observed by every holder of the
/// `Rc` (§3.4: the only form of delayed mutation in the IR).
pub struct TypeDef {
    pub name: String,
    inner: RefCell<Option<IrType>>,
    pub location: Option<Location>,
}

impl TypeDef {
    pub fn new(name: impl Into<String>, inner: Option<IrType>, location: Option<Location>) -> Self {
        TypeDef {
            name: name.into(),
            inner: RefCell::new(inner),
            location,
        }
    }

    pub fn inner(&self) -> Option<IrType> {
        self.inner.borrow().clone()
    }

    /// Fill in (or overwrite, during prefix splicing) the referenced type.
    pub fn set_inner(&self, ty: IrType) {
        *self.inner.borrow_mut() = Some(ty);
    }

    pub fn clear_inner(&self) {
        *self.inner.borrow_mut() = None;
    }

    pub fn is_opaque(&self) -> bool {
        self.inner.borrow().is_none()
    }
}

/// A struct or union field.
pub struct Field {
    pub name: String,
    pub ty: IrType,
    /// Bit offset within the record, present only for bitfield members.
    pub bit_offset: Option<u64>,
}

/// A C `struct`. Byte size is always a multiple of 8 bits (§3.3).
pub struct Struct {
    pub name: String,
    pub fields: Vec<Field>,
    pub size: u64,
    pub packed: bool,
    pub bitfield: bool,
    pub location: Option<Location>,
}

/// A C `union`.
pub struct Union {
    pub name: String,
    pub fields: Vec<Field>,
    pub size: u64,
    pub location: Option<Location>,
}

/// A single named constant of an `Enum`.
pub struct Enumerator {
    pub name: String,
    pub value: i64,
}

/// A C `enum`. `underlying` is the target-primitive token for its storage
/// type (e.g. `"native.CInt"`).
pub struct Enum {
    pub name: String,
    pub underlying: &'static str,
    pub enumerators: Vec<Enumerator>,
    pub location: Option<Location>,
}

impl Enum {
    pub fn is_anonymous(&self) -> bool {
        self.name.is_empty()
    }
}

/// A declaration that is simultaneously usable as an `IrType` — the subset
/// of declarations that participate in reachability and cycle analysis.
#[derive(Clone)]
pub enum Decl {
    TypeDef(Rc<TypeDef>),
    Struct(Rc<Struct>),
    Union(Rc<Union>),
    Enum(Rc<Enum>),
}

impl Decl {
    pub fn as_ir_type(&self) -> IrType {
        match self {
            Decl::TypeDef(r) => IrType::TypeDef(r.clone()),
            Decl::Struct(r) => IrType::Struct(r.clone()),
            Decl::Union(r) => IrType::Union(r.clone()),
            Decl::Enum(r) => IrType::Enum(r.clone()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Decl::TypeDef(r) => &r.name,
            Decl::Struct(r) => &r.name,
            Decl::Union(r) => &r.name,
            Decl::Enum(r) => &r.name,
        }
    }
}

/// A function parameter. Source parameters with no name get a synthesized
/// `anonymousN` per §3.2.
pub struct Parameter {
    pub name: String,
    pub ty: IrType,
}

/// A C function declaration.
pub struct Function {
    pub name: String,
    pub params: Vec<Parameter>,
    pub return_type: IrType,
    pub variadic: bool,
    /// Set once during reserved-name resolution (§4.2); absent otherwise.
    output_name: RefCell<Option<String>>,
}

impl Function {
    pub fn new(name: impl Into<String>, params: Vec<Parameter>, return_type: IrType, variadic: bool) -> Self {
        Function {
            name: name.into(),
            params,
            return_type,
            variadic,
            output_name: RefCell::new(None),
        }
    }

    pub fn set_output_name(&self, name: impl Into<String>) {
        *self.output_name.borrow_mut() = Some(name.into());
    }

    pub fn output_name(&self) -> String {
        self.output_name
            .borrow()
            .clone()
            .unwrap_or_else(|| self.name.clone())
    }
}

/// A global variable declaration.
pub struct Variable {
    pub name: String,
    pub ty: IrType,
}

/// A `#define` whose value is a literal constant with a known type.
pub struct LiteralDefine {
    pub name: String,
    pub literal: String,
    pub ty: IrType,
}

/// A `#define` macro whose value looked like an identifier, pending
/// resolution against a later-registered `Variable`.
pub struct PossibleVarDefine {
    pub macro_name: String,
    pub var_name: String,
}

/// A resolved `PossibleVarDefine`: macro name aliasing a known variable.
pub struct VarDefine {
    pub name: String,
    pub variable: Rc<Variable>,
}
