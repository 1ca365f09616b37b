//! C type → IR type translation — §3.1/§4.1.
//!
//! Mirrors the decision order of a Clang-AST-walking translator: function
//! pointers, then pointers (with `void*`/`char*` special cases), then
//! struct/union/enum (opaque-or-lookup), then constant arrays, then
//! everything else through a fixed primitive-name table with a `TypeDef`
//! lookup as the final fallback.

use std::rc::Rc;

use clang::{Entity, EntityKind, Type as ClangType, TypeKind};

use crate::ir::{Enum, Enumerator, Field, FunctionPointerType, Ir, IrType, Location, Struct, TypeDef, Union};

/// The fixed C-type-spelling → Scala Native primitive-token table.
/// `long`/`unsigned long` map to the 64-bit tokens: this translator targets
/// the LP64 ABI, matching every C header in this corpus.
const PRIMITIVE_MAP: &[(&str, &str)] = &[
    ("void", "Unit"),
    ("bool", "native.CBool"),
    ("_Bool", "native.CBool"),
    ("char", "native.CChar"),
    ("signed char", "native.CSignedChar"),
    ("unsigned char", "native.CUnsignedChar"),
    ("short", "native.CShort"),
    ("unsigned short", "native.CUnsignedShort"),
    ("int", "native.CInt"),
    ("long int", "native.CLongInt"),
    ("unsigned int", "native.CUnsignedInt"),
    ("unsigned long int", "native.CUnsignedLongInt"),
    ("long", "native.CLong"),
    ("unsigned long", "native.CUnsignedLong"),
    ("long long", "native.CLongLong"),
    ("unsigned long long", "native.CUnsignedLongLong"),
    ("size_t", "native.CSize"),
    ("ptrdiff_t", "native.CPtrDiff"),
    ("wchar_t", "native.CWideChar"),
    ("char16_t", "native.CChar16"),
    ("char32_t", "native.CChar32"),
    ("float", "native.CFloat"),
    ("double", "native.CDouble"),
    ("long double", "native.CDouble"),
];

pub fn lookup_primitive(spelling: &str) -> Option<&'static str> {
    PRIMITIVE_MAP.iter().find(|(k, _)| *k == spelling).map(|(_, v)| *v)
}

/// Translate a clang `Type`. Returns `None` for a bare (non-pointer)
/// function type — callers reaching this case should have already rejected
/// it as unsupported in this position (§7, fatal-abort category).
pub fn translate(ir: &mut Ir, ty: &ClangType) -> Option<IrType> {
    match ty.get_kind() {
        TypeKind::FunctionPrototype | TypeKind::FunctionNoPrototype => None,

        TypeKind::Pointer => {
            let pointee = ty.get_pointee_type()?;
            if matches!(pointee.get_kind(), TypeKind::FunctionPrototype | TypeKind::FunctionNoPrototype) {
                translate_function_pointer(ir, &pointee)
            } else {
                Some(translate_pointer(ir, &pointee))
            }
        }

        TypeKind::Record => {
            let decl = ty.get_declaration()?;
            let is_union = decl.get_kind() == EntityKind::UnionDecl;
            Some(translate_struct_or_union(ir, ty, &decl, is_union))
        }

        TypeKind::Enum => {
            let decl = ty.get_declaration()?;
            Some(translate_enum_ref(ir, &decl))
        }

        TypeKind::ConstantArray => Some(translate_constant_array(ir, ty)),

        TypeKind::IncompleteArray | TypeKind::VariableArray | TypeKind::DependentSizedArray => {
            let elem = ty.get_element_type()?;
            Some(translate_pointer(ir, &elem))
        }

        TypeKind::Elaborated => {
            let inner = ty.get_elaborated_type()?;
            translate(ir, &inner)
        }

        TypeKind::Typedef => {
            let spelling = unqualified_spelling(ty);
            if let Some(prim) = lookup_primitive(&spelling) {
                return Some(IrType::Primitive(prim));
            }
            match ir.get_type_def_with_name(&spelling) {
                Some(td) => Some(IrType::TypeDef(td)),
                None => {
                    let canonical = ty.get_canonical_type();
                    translate(ir, &canonical)
                }
            }
        }

        _ => {
            let spelling = unqualified_spelling(ty);
            if let Some(prim) = lookup_primitive(&spelling) {
                Some(IrType::Primitive(prim))
            } else {
                ir.get_type_def_with_name(&spelling).map(IrType::TypeDef)
            }
        }
    }
}

fn unqualified_spelling(ty: &ClangType) -> String {
    ty.get_display_name()
}

fn translate_function_pointer(ir: &mut Ir, fn_ty: &ClangType) -> Option<IrType> {
    let return_type = translate(ir, &fn_ty.get_result_type()?)?;
    let params = fn_ty
        .get_argument_types()
        .unwrap_or_default()
        .iter()
        .filter_map(|p| translate(ir, p))
        .collect();
    Some(IrType::FunctionPointer(Rc::new(FunctionPointerType {
        return_type,
        params,
        variadic: fn_ty.is_variadic(),
    })))
}

/// Translate a pointee type into `Pointer<translate(pointee)>`, with the
/// `void*` and `char*`/`signed char*` special cases from §4.1.
fn translate_pointer(ir: &mut Ir, pointee: &ClangType) -> IrType {
    if pointee.get_kind() == TypeKind::Void {
        return IrType::Pointer(Box::new(IrType::Primitive("Byte")));
    }
    if matches!(pointee.get_kind(), TypeKind::CharS | TypeKind::SChar) {
        return IrType::Primitive("native.CString");
    }
    match translate(ir, pointee) {
        Some(inner) => IrType::Pointer(Box::new(inner)),
        None => IrType::Pointer(Box::new(IrType::Primitive("Byte"))),
    }
}

/// Unnamed or locally-scoped record types (anonymous structs/unions used as
/// a field's type, or records declared inside a function) translate to a
/// fixed-size byte array rather than a named reference — there is no stable
/// name to emit a `TypeDef` for (§3.3).
fn is_unnamed_or_local(decl: &Entity) -> bool {
    decl.is_anonymous() || decl.get_name().is_none_or(|n| n.is_empty())
}

fn translate_struct_or_union(ir: &mut Ir, ty: &ClangType, decl: &Entity, is_union: bool) -> IrType {
    if is_unnamed_or_local(decl) {
        let size_bits = ty.get_sizeof().unwrap_or(0) as u64 * 8;
        debug_assert_eq!(size_bits % 8, 0);
        return IrType::Array(Box::new(IrType::Primitive("Byte")), size_bits / 8);
    }
    // The tag's own name never carries a `struct `/`union ` keyword — build
    // the `struct_<N>`/`union_<N>` placeholder name from the declaration's
    // bare name rather than trusting the type's display spelling, so this
    // always lines up with `register_struct`/`register_union` regardless of
    // how a given libclang version spells an elaborated record type (§3.3,
    // S1).
    let tag = decl.get_name().unwrap_or_default();
    let name = format!("{}_{tag}", if is_union { "union" } else { "struct" });
    lookup_or_create_opaque(ir, &name)
}

/// Look up (or register opaque) a `TypeDef` standing in for an enum
/// reference. Unlike struct/union, the generated typedef carries no prefix
/// (§3.3 invariant: a named enum's typedef is named `<enumName>` directly).
fn translate_enum_ref(ir: &mut Ir, decl: &Entity) -> IrType {
    let name = decl.get_name().unwrap_or_default();
    lookup_or_create_opaque(ir, &name)
}

fn lookup_or_create_opaque(ir: &mut Ir, name: &str) -> IrType {
    if let Some(existing) = ir.get_type_def_with_name(name) {
        return IrType::TypeDef(existing);
    }
    IrType::TypeDef(ir.get_or_create_type_def(name, None))
}

fn translate_constant_array(ir: &mut Ir, ty: &ClangType) -> IrType {
    let size = ty.get_size().unwrap_or(0) as u64;
    let elem_ty = ty.get_element_type();
    let element = elem_ty.as_ref().and_then(|e| translate(ir, e)).unwrap_or_else(|| {
        tracing::warn!(
            element = ?elem_ty.map(|e| e.get_display_name()),
            "failed to translate array element type, falling back to Byte"
        );
        IrType::Primitive("Byte")
    });
    IrType::Array(Box::new(element), size)
}

/// Register a named struct/union declaration: resolves any previously
/// opaque `TypeDef` of the same name, or creates a fresh resolved one.
pub fn register_struct(
    ir: &mut Ir,
    name: &str,
    fields: Vec<Field>,
    size: u64,
    packed: bool,
    bitfield: bool,
    location: Option<Location>,
) {
    let s = Rc::new(Struct {
        name: name.to_string(),
        fields,
        size,
        packed,
        bitfield,
        location,
    });
    ir.structs.push(s.clone());
    let td_name = format!("struct_{name}");
    resolve_opaque_type_def(ir, &td_name, IrType::Struct(s));
}

pub fn register_union(ir: &mut Ir, name: &str, fields: Vec<Field>, size: u64, location: Option<Location>) {
    let u = Rc::new(Union {
        name: name.to_string(),
        fields,
        size,
        location,
    });
    ir.unions.push(u.clone());
    let td_name = format!("union_{name}");
    resolve_opaque_type_def(ir, &td_name, IrType::Union(u));
}

pub fn register_enum(
    ir: &mut Ir,
    name: &str,
    underlying: &'static str,
    enumerators: Vec<Enumerator>,
    location: Option<Location>,
) -> Rc<Enum> {
    let e = Rc::new(Enum {
        name: name.to_string(),
        underlying,
        enumerators,
        location,
    });
    ir.enums.push(e.clone());
    if !name.is_empty() {
        resolve_opaque_type_def(ir, name, IrType::Enum(e.clone()));
    }
    e
}

fn resolve_opaque_type_def(ir: &mut Ir, name: &str, resolved: IrType) {
    ir.add_type_def(name, resolved, None);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitive_map_covers_void_and_sized_ints() {
        assert_eq!(lookup_primitive("void"), Some("Unit"));
        assert_eq!(lookup_primitive("int"), Some("native.CInt"));
        assert_eq!(lookup_primitive("unsigned long long"), Some("native.CUnsignedLongLong"));
        assert_eq!(lookup_primitive("size_t"), Some("native.CSize"));
        assert_eq!(lookup_primitive("not_a_c_type"), None);
    }

    #[test]
    fn register_struct_resolves_a_previously_opaque_type_def() {
        let mut ir = Ir::new();
        let opaque = ir.get_or_create_type_def("struct_Point", None);
        assert!(opaque.is_opaque());

        register_struct(&mut ir, "Point", vec![], 64, false, false, None);

        assert!(!opaque.is_opaque());
        assert!(matches!(opaque.inner(), Some(IrType::Struct(_))));
    }

    #[test]
    fn register_union_resolves_with_prefixed_name() {
        let mut ir = Ir::new();
        let opaque = ir.get_or_create_type_def("union_Word", None);
        register_union(&mut ir, "Word", vec![], 32, None);
        assert!(!opaque.is_opaque());
        assert!(matches!(opaque.inner(), Some(IrType::Union(_))));
    }
}
