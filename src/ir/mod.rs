//! The intermediate representation: a closed type algebra plus the
//! declaration graph built from it, with the operations (reachability,
//! cycle detection, prefix filtering) that turn raw extraction output into
//! an emittable binding set.

mod container;
mod cycles;
mod types;

pub use container::Ir;
pub use cycles::{CycleNode, find_all_cycles};
pub use types::{
    Decl, Enum, Enumerator, Field, Function, FunctionPointerType, IrType, LiteralDefine, Location, NodeKey,
    Parameter, PossibleVarDefine, Struct, TypeDef, Union, VarDefine, Variable,
};
