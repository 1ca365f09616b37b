//! Emitter — the IR, once `generate`d, rendered as Scala Native source text.
//!
//! Output shape (§4.6/§4.7): a package clause, the import lines, a
//! `@native.extern object` holding typedefs/variables/var-defines/functions
//! behind a `@native.link` annotation, a sibling `Defines` object for literal
//! macro constants, an `Enums` object, and a `Helpers` object for any
//! composite type that needs indirection because it participates in a
//! pointer-free cycle.

use std::fmt::Write as _;

use crate::ir::{Decl, Enum, Function, Ir, IrType, LiteralDefine, Struct, TypeDef, Union, Variable};

/// Scala reserved words that a C identifier might collide with and need
/// backtick-quoting to use as-is.
const SCALA_RESERVED: &[&str] = &[
    "type", "object", "class", "trait", "val", "var", "def", "new", "package", "import", "match", "case", "if",
    "else", "for", "while", "do", "yield", "return", "extends", "with", "override", "final", "null", "true", "false",
];

fn ident(name: &str) -> String {
    if SCALA_RESERVED.contains(&name) {
        format!("`{name}`")
    } else {
        name.to_string()
    }
}

/// Render the full generated source for one library binding.
pub fn emit(ir: &Ir, package_name: &str, link_name: &str, lib_name: &str, object_name: &str) -> String {
    let mut out = String::new();
    let helpers = structs_and_unions_needing_helpers(ir);

    if !package_name.is_empty() {
        writeln!(out, "package {package_name}").unwrap();
        out.push('\n');
    }

    if has_any_emittable_declaration(ir, &helpers) {
        writeln!(out, "import scala.scalanative._").unwrap();
        writeln!(out, "import scala.scalanative.native._").unwrap();
        out.push('\n');
    }

    if !is_lib_object_empty(ir) {
        emit_lib_object(&mut out, ir, link_name, object_name);
        out.push('\n');
    }

    if !ir.literal_defines.is_empty() {
        emit_defines_object(&mut out, ir, lib_name);
        out.push('\n');
    }

    if !ir.enums.is_empty() || !helpers.is_empty() {
        writeln!(out, "import {object_name}._").unwrap();
        out.push('\n');
    }

    if !ir.enums.is_empty() {
        emit_enums_object(&mut out, ir, lib_name);
        out.push('\n');
    }

    if !helpers.is_empty() {
        emit_helpers_object(&mut out, lib_name, &helpers);
    }

    out
}

/// True once the lib object would have at least one line in its body — an
/// empty extern object is still noise the original guards against
/// (`isLibObjectEmpty`).
fn is_lib_object_empty(ir: &Ir) -> bool {
    ir.type_defs.is_empty()
        && ir.variables.is_empty()
        && ir.var_defines.borrow().is_empty()
        && ir.functions.is_empty()
}

/// §4.6 item 2: the fixed import lines are only worth emitting when
/// something downstream will actually reference the `native`/`scalanative`
/// namespace they bring into scope.
fn has_any_emittable_declaration(ir: &Ir, helpers: &[Decl]) -> bool {
    !ir.functions.is_empty()
        || !ir.var_defines.borrow().is_empty()
        || !ir.variables.is_empty()
        || !ir.enums.is_empty()
        || !ir.literal_defines.is_empty()
        || !ir.type_defs.is_empty()
        || !helpers.is_empty()
}

fn emit_lib_object(out: &mut String, ir: &Ir, link_name: &str, object_name: &str) {
    writeln!(out, "@native.link(\"{link_name}\")").unwrap();
    writeln!(out, "@native.extern").unwrap();
    writeln!(out, "object {object_name} {{").unwrap();

    for td in &ir.type_defs {
        emit_type_def_line(out, td);
    }
    for v in &ir.variables {
        emit_variable_line(out, v);
    }
    for (macro_name, var_name) in var_define_names(ir) {
        writeln!(out, "  val {}: CString = !\"{}\"", ident(&macro_name), var_name).unwrap();
    }
    for f in &ir.functions {
        emit_function_line(out, f);
    }

    writeln!(out, "}}").unwrap();
}

fn var_define_names(ir: &Ir) -> Vec<(String, String)> {
    ir.var_defines
        .borrow()
        .iter()
        .map(|vd| (vd.name.clone(), vd.variable.name.clone()))
        .collect()
}

fn emit_type_def_line(out: &mut String, td: &TypeDef) {
    match td.inner() {
        Some(inner) => {
            writeln!(out, "  type {} = {}", ident(&td.name), scala_type_string(&inner)).unwrap();
        }
        None => {
            writeln!(out, "  type {} = native.CStruct0 // incomplete type", ident(&td.name)).unwrap();
        }
    }
}

fn emit_variable_line(out: &mut String, v: &Variable) {
    writeln!(out, "  var {}: {} = extern", ident(&v.name), scala_type_string(&v.ty)).unwrap();
}

fn emit_function_line(out: &mut String, f: &Function) {
    let mut params: Vec<String> = f
        .params
        .iter()
        .map(|p| format!("{}: {}", ident(&p.name), scala_type_string(&p.ty)))
        .collect();
    if f.variadic {
        params.push("varargs: native.CVarArgList".to_string());
    }
    writeln!(
        out,
        "  def {}({}): {} = extern",
        ident(&f.output_name()),
        params.join(", "),
        scala_type_string(&f.return_type),
    )
    .unwrap();
}

fn emit_defines_object(out: &mut String, ir: &Ir, lib_name: &str) {
    writeln!(out, "object {lib_name}Defines {{").unwrap();
    for d in &ir.literal_defines {
        emit_literal_define_line(out, d);
    }
    writeln!(out, "}}").unwrap();
}

fn emit_literal_define_line(out: &mut String, d: &LiteralDefine) {
    writeln!(out, "  val {}: {} = {}", ident(&d.name), scala_type_string(&d.ty), d.literal).unwrap();
}

fn emit_enums_object(out: &mut String, ir: &Ir, lib_name: &str) {
    writeln!(out, "object {lib_name}Enums {{").unwrap();
    for e in &ir.enums {
        emit_enum_block(out, e);
    }
    writeln!(out, "}}").unwrap();
}

fn emit_enum_block(out: &mut String, e: &Enum) {
    for v in &e.enumerators {
        writeln!(out, "  val {}: {} = {}", ident(&v.name), e.underlying, v.value).unwrap();
    }
}

/// Scala Native's `CStructN` family tops out at `CStruct22`; a record with
/// more fields than that has no plain structural alias to fall back on at
/// all, cycle or not.
const MAX_PLAIN_STRUCT_FIELDS: usize = 22;

/// A struct/union needs a helper (field-accessor functions operating through
/// a typed pointer) instead of a plain structural `CStruct` alias when it
/// either sits on a pointer-free cycle (the alias would otherwise have to
/// name itself, §3.6/§4.7) or has more fields than `CStructN` can express.
fn structs_and_unions_needing_helpers(ir: &Ir) -> Vec<Decl> {
    let mut out = Vec::new();
    for s in &ir.structs {
        let decl = Decl::Struct(s.clone());
        if s.fields.len() > MAX_PLAIN_STRUCT_FIELDS || !ir.find_cycles(&decl).is_empty() {
            out.push(decl);
        }
    }
    for u in &ir.unions {
        let decl = Decl::Union(u.clone());
        if u.fields.len() > MAX_PLAIN_STRUCT_FIELDS || !ir.find_cycles(&decl).is_empty() {
            out.push(decl);
        }
    }
    out
}

fn emit_helpers_object(out: &mut String, lib_name: &str, helpers: &[Decl]) {
    writeln!(out, "object {lib_name}Helpers {{").unwrap();
    for decl in helpers {
        let (name, fields) = match decl {
            Decl::Struct(s) => (s.name.as_str(), field_list(s)),
            Decl::Union(u) => (u.name.as_str(), field_list_union(u)),
            _ => continue,
        };
        writeln!(out, "  // {name} participates in a pointer-free cycle; accessed through a typed pointer").unwrap();
        for (fname, fty) in fields {
            writeln!(out, "  def {name}_{fname}(self: Ptr[{name}]): {fty} = !self._{{\"{fname}\"}}").unwrap();
        }
    }
    writeln!(out, "}}").unwrap();
}

fn field_list(s: &Struct) -> Vec<(String, String)> {
    s.fields.iter().map(|f| (f.name.clone(), scala_type_string(&f.ty))).collect()
}

fn field_list_union(u: &Union) -> Vec<(String, String)> {
    u.fields.iter().map(|f| (f.name.clone(), scala_type_string(&f.ty))).collect()
}

/// Render an `IrType` as the Scala Native spelling used on the right-hand
/// side of a `type` alias, a parameter annotation, or a return type.
fn scala_type_string(ty: &IrType) -> String {
    match ty {
        IrType::Primitive(tok) => tok.to_string(),
        IrType::Pointer(inner) => format!("native.Ptr[{}]", scala_type_string(inner)),
        IrType::Array(inner, n) => format!("native.CArray[{}, native.Nat._{n}]", scala_type_string(inner)),
        IrType::FunctionPointer(fp) => {
            let mut parts: Vec<String> = fp.params.iter().map(scala_type_string).collect();
            parts.push(scala_type_string(&fp.return_type));
            format!("native.CFuncPtr{}[{}]", fp.params.len(), parts.join(", "))
        }
        IrType::TypeDef(td) => ident(&td.name),
        IrType::Struct(s) => composite_type_string(&s.fields.iter().map(|f| scala_type_string(&f.ty)).collect::<Vec<_>>()),
        IrType::Union(u) => composite_type_string(&u.fields.iter().map(|f| scala_type_string(&f.ty)).collect::<Vec<_>>()),
        IrType::Enum(e) => e.underlying.to_string(),
    }
}

/// A `Struct`/`Union` only ever appears as the inner type of its own
/// `TypeDef` (field and parameter positions always go through a `TypeDef`
/// reference instead — §4.1), so this is the one place that has to spell
/// out its Scala Native `CStructN[...]` layout rather than just naming it
/// (S1: `type struct_foo = native.CStruct1[native.CInt]`).
fn composite_type_string(field_types: &[String]) -> String {
    if field_types.is_empty() {
        "native.CStruct0".to_string()
    } else {
        format!("native.CStruct{}[{}]", field_types.len(), field_types.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn pointer_to_void_renders_byte_pointer() {
        let ty = IrType::Pointer(Box::new(IrType::Primitive("Byte")));
        assert_eq!(scala_type_string(&ty), "native.Ptr[Byte]");
    }

    #[test]
    fn opaque_typedef_emits_incomplete_marker() {
        let td = Rc::new(TypeDef::new("Foo", None, None));
        let mut out = String::new();
        emit_type_def_line(&mut out, &td);
        assert_eq!(out, "  type Foo = native.CStruct0 // incomplete type\n");
    }

    #[test]
    fn reserved_word_function_gets_backticked_identifier() {
        assert_eq!(ident("type"), "`type`");
        assert_eq!(ident("frobnicate"), "frobnicate");
    }

    #[test]
    fn empty_ir_emits_no_stray_blocks() {
        let ir = Ir::new();
        let out = emit(&ir, "simple", "simple", "simple", "Simple");
        assert!(!out.contains("import Simple._"));
        assert!(!out.contains("import scala.scalanative"));
        assert!(!out.contains("object Simple {"));
    }

    #[test]
    fn no_enums_or_helpers_omits_reimport() {
        let mut ir = Ir::new();
        ir.add_function(Function::new("simple_ping", vec![], IrType::Primitive("Unit"), false));
        ir.generate(None);
        let out = emit(&ir, "simple", "simple", "simple", "Simple");
        assert!(!out.contains("import Simple._"));
    }

    #[test]
    fn struct_past_cstruct_field_cap_needs_a_helper() {
        use crate::ir::Field;

        let mut ir = Ir::new();
        let fields: Vec<Field> = (0..23)
            .map(|i| Field {
                name: format!("f{i}"),
                ty: IrType::Primitive("native.CInt"),
                bit_offset: None,
            })
            .collect();
        ir.add_struct(Struct {
            name: "Wide".into(),
            fields,
            size: 23 * 32,
            packed: false,
            bitfield: false,
            location: None,
        });

        let helpers = structs_and_unions_needing_helpers(&ir);
        assert_eq!(helpers.len(), 1);
    }
}
