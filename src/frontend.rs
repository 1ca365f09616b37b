//! Frontend — walks a parsed translation unit and populates an [`Ir`].
//!
//! Only declarations physically located in one of the configured headers are
//! registered (§3.2): system headers pulled in transitively are visited only
//! as far as they're needed to translate a type, never as their own
//! top-level declarations. Anonymous struct/union declarations are never
//! registered as declarations in their own right — they only ever show up
//! translated at a field's use site, as a fixed-size byte array.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clang::{
    Entity, EntityKind, Index, Type as ClangType,
    sonar::{self, DefinitionValue},
};
use tracing::{debug, trace, warn};

use crate::config::{self, Config};
use crate::ir::{Enumerator, Field, Function, Ir, IrType, LiteralDefine, Location, Parameter, Variable};
use crate::translate;

/// Parse the configured headers and extract every in-scope declaration into
/// a fresh [`Ir`].
pub fn extract(index: &Index, cfg: &Config, base_dir: &Path) -> Result<Ir> {
    let header_path = cfg.wrapper_header(base_dir);
    debug!(header = %header_path.display(), "parsing translation unit");

    let mut all_args: Vec<String> = cfg.clang_args.clone();
    for inc in &cfg.include_paths {
        let flag = format!("-I{}", inc.display());
        if !all_args.contains(&flag) {
            all_args.push(flag);
        }
    }

    let tu = index
        .parser(header_path.to_str().context("header path is not valid UTF-8")?)
        .arguments(&all_args.iter().map(|s| s.as_str()).collect::<Vec<_>>())
        .detailed_preprocessing_record(true)
        .parse()
        .map_err(|e| anyhow::anyhow!("failed to parse {}: {:?}", header_path.display(), e))?;

    let resolved_traverse: Vec<PathBuf> = cfg
        .traverse_files()
        .iter()
        .map(|t| config::resolve_header(t, base_dir, &cfg.include_paths))
        .collect();
    let entities = tu.get_entity().get_children();
    let in_scope = |e: &Entity| in_main_files(e, &resolved_traverse);

    let mut ir = Ir::new();

    collect_structs_and_unions(&mut ir, &entities, &in_scope);
    collect_enums(&mut ir, &entities, &in_scope);
    collect_typedefs(&mut ir, &entities, &in_scope);
    collect_functions(&mut ir, &entities, &in_scope);
    collect_variables(&mut ir, &entities, &in_scope);
    collect_defines(&mut ir, &entities, &in_scope);

    ir.resolve_var_defines();

    info_summary(&ir);
    Ok(ir)
}

fn info_summary(ir: &Ir) {
    tracing::info!(
        structs = ir.structs.len(),
        unions = ir.unions.len(),
        enums = ir.enums.len(),
        type_defs = ir.type_defs.len(),
        functions = ir.functions.len(),
        variables = ir.variables.len(),
        literal_defines = ir.literal_defines.len(),
        possible_var_defines = ir.possible_var_defines.len(),
        "frontend extraction complete"
    );
}

// ---------------------------------------------------------------------------
// Struct / union collection
// ---------------------------------------------------------------------------

fn collect_structs_and_unions(ir: &mut Ir, entities: &[Entity], in_scope: &impl Fn(&Entity) -> bool) {
    let mut seen = HashSet::new();
    for entity in entities {
        let is_union = match entity.get_kind() {
            EntityKind::StructDecl => false,
            EntityKind::UnionDecl => true,
            _ => continue,
        };
        // Anonymous and non-defining declarations never become IR declarations
        // in their own right — §3.3/TreeVisitor only registers named,
        // defining, non-anonymous records.
        if entity.is_anonymous() || !entity.is_definition() {
            continue;
        }
        let Some(name) = entity.get_name() else { continue };
        if name.is_empty() || !seen.insert(name.clone()) {
            continue;
        }
        if !in_scope(entity) {
            continue;
        }
        match extract_record(ir, entity, &name, is_union) {
            Ok(()) => debug!(name = %name, is_union, "registered record"),
            Err(e) => warn!(name = %name, err = %e, "skipping struct/union"),
        }
    }
}

fn extract_record(ir: &mut Ir, entity: &Entity, name: &str, is_union: bool) -> Result<()> {
    let ty = entity.get_type().context("record has no type")?;
    let size_bits = ty.get_sizeof().unwrap_or(0) as u64 * 8;
    let packed = entity
        .get_children()
        .iter()
        .any(|c| matches!(c.get_kind(), EntityKind::PackedAttr));

    let mut fields = Vec::new();
    let mut bitfield = false;
    for child in entity.get_children() {
        if child.get_kind() != EntityKind::FieldDecl {
            continue;
        }
        let field_name = child.get_name().unwrap_or_default();
        let field_ty = child.get_type().context("field has no type")?;
        let ir_ty = translate::translate(ir, &field_ty).unwrap_or_else(|| {
            warn!(field = %field_name, "failed to translate field type, falling back to Byte");
            IrType::Primitive("Byte")
        });
        let bit_offset = if child.is_bit_field() {
            bitfield = true;
            child.get_offset_of_field().ok()
        } else {
            None
        };
        fields.push(Field {
            name: field_name,
            ty: ir_ty,
            bit_offset,
        });
    }

    if packed {
        warn!(name = %name, "packed record: field layout may not match native alignment");
    }

    let location = loc_of(entity);
    if is_union {
        translate::register_union(ir, name, fields, size_bits, location);
    } else {
        translate::register_struct(ir, name, fields, size_bits, packed, bitfield, location);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Enum collection
// ---------------------------------------------------------------------------

fn collect_enums(ir: &mut Ir, entities: &[Entity], in_scope: &impl Fn(&Entity) -> bool) {
    for decl in sonar::find_enums(entities.to_vec()) {
        if !in_scope(&decl.entity) {
            continue;
        }
        let underlying = decl
            .entity
            .get_enum_underlying_type()
            .and_then(|ut| translate::lookup_primitive(&ut.get_display_name()))
            .unwrap_or("native.CInt");

        let mut enumerators = Vec::new();
        for child in decl.entity.get_children() {
            if child.get_kind() != EntityKind::EnumConstantDecl {
                continue;
            }
            let Some(ename) = child.get_name() else { continue };
            let (signed, _) = child.get_enum_constant_value().unwrap_or((0, 0));
            enumerators.push(Enumerator {
                name: ename,
                value: signed,
            });
        }

        // Anonymous enums have no name to attach a declaration to — their
        // constants are emitted directly as literal defines instead.
        if decl.entity.is_anonymous() || decl.name.contains("(unnamed") {
            for e in enumerators {
                ir.add_literal_define(LiteralDefine {
                    name: e.name,
                    literal: e.value.to_string(),
                    ty: IrType::Primitive(underlying),
                });
            }
            continue;
        }

        debug!(name = %decl.name, variants = enumerators.len(), "registered enum");
        let location = loc_of(&decl.entity);
        translate::register_enum(ir, &decl.name, underlying, enumerators, location);
    }
}

// ---------------------------------------------------------------------------
// Typedef collection
// ---------------------------------------------------------------------------

fn collect_typedefs(ir: &mut Ir, entities: &[Entity], in_scope: &impl Fn(&Entity) -> bool) {
    let mut seen = HashSet::new();
    for entity in entities {
        if entity.get_kind() != EntityKind::TypedefDecl || !in_scope(entity) {
            continue;
        }
        let Some(name) = entity.get_name() else { continue };
        if name.is_empty() || !seen.insert(name.clone()) {
            continue;
        }
        let Some(underlying) = entity.get_typedef_underlying_type() else {
            continue;
        };
        if is_struct_passthrough(&underlying, &name) {
            trace!(name = %name, "skipping struct/enum/union passthrough typedef");
            continue;
        }
        match translate::translate(ir, &underlying) {
            Some(ir_ty) => {
                debug!(name = %name, "registered typedef");
                let location = loc_of(entity);
                ir.add_type_def(&name, ir_ty, location);
            }
            None => warn!(name = %name, "failed to translate typedef underlying type"),
        }
    }
}

fn is_struct_passthrough(underlying: &ClangType, typedef_name: &str) -> bool {
    let display = underlying.get_display_name();
    for prefix in &["struct ", "enum ", "union "] {
        if display.starts_with(prefix) && &display[prefix.len()..] == typedef_name {
            return true;
        }
    }
    false
}

// ---------------------------------------------------------------------------
// Function collection
// ---------------------------------------------------------------------------

fn collect_functions(ir: &mut Ir, entities: &[Entity], in_scope: &impl Fn(&Entity) -> bool) {
    let mut seen = HashSet::new();
    for decl in sonar::find_functions(entities.to_vec()) {
        if !in_scope(&decl.entity) || !seen.insert(decl.name.clone()) {
            continue;
        }
        match extract_function(ir, &decl.entity, &decl.name) {
            Ok(f) => {
                debug!(name = %f.name, params = f.params.len(), "registered function");
                ir.add_function(f);
            }
            Err(e) => warn!(name = %decl.name, err = %e, "skipping function"),
        }
    }
}

fn extract_function(ir: &mut Ir, entity: &Entity, name: &str) -> Result<Function> {
    let fn_ty = entity.get_type().context("function has no type")?;
    let return_type = translate::translate(ir, &fn_ty.get_result_type().context("no return type")?)
        .context("unsupported return type")?;

    let args = entity.get_arguments().unwrap_or_default();
    let arg_types = fn_ty.get_argument_types().unwrap_or_default();
    let mut params = Vec::new();
    let mut anon_index = 0usize;
    for (i, arg_entity) in args.iter().enumerate() {
        let param_name = match arg_entity.get_name() {
            Some(n) if !n.is_empty() => n,
            _ => {
                let synthesized = format!("anonymous{anon_index}");
                anon_index += 1;
                synthesized
            }
        };
        let ty = arg_types
            .get(i)
            .and_then(|t| translate::translate(ir, t))
            .unwrap_or(IrType::Primitive("Byte"));
        params.push(Parameter { name: param_name, ty });
    }

    // By-value composite parameters have no portable ABI representation in
    // this translation scheme and are skipped with a warning (§7).
    if params.iter().any(|p| is_by_value_composite(&p.ty)) || is_by_value_composite(&return_type) {
        anyhow::bail!("function passes a struct/union/array by value");
    }

    Ok(Function::new(name, params, return_type, fn_ty.is_variadic()))
}

fn is_by_value_composite(ty: &IrType) -> bool {
    match ty {
        IrType::Struct(_) | IrType::Union(_) => true,
        IrType::TypeDef(td) => td.inner().is_some_and(|inner| is_by_value_composite(&inner)),
        _ => false,
    }
}

// ---------------------------------------------------------------------------
// Variable collection
// ---------------------------------------------------------------------------

fn collect_variables(ir: &mut Ir, entities: &[Entity], in_scope: &impl Fn(&Entity) -> bool) {
    for entity in entities {
        if entity.get_kind() != EntityKind::VarDecl || !in_scope(entity) {
            continue;
        }
        let Some(name) = entity.get_name() else { continue };
        let Some(ty) = entity.get_type() else { continue };
        match translate::translate(ir, &ty) {
            Some(ir_ty) => {
                debug!(name = %name, "registered variable");
                ir.add_variable(Variable { name, ty: ir_ty });
            }
            None => warn!(name = %name, "failed to translate variable type"),
        }
    }
}

// ---------------------------------------------------------------------------
// #define collection: literal defines and possible var-defines
// ---------------------------------------------------------------------------

fn collect_defines(ir: &mut Ir, entities: &[Entity], in_scope: &impl Fn(&Entity) -> bool) {
    let mut seen = HashSet::new();

    for def in sonar::find_definitions(entities.to_vec()) {
        if !in_scope(&def.entity) {
            continue;
        }
        seen.insert(def.name.clone());
        let (literal, ty) = match def.value {
            DefinitionValue::Integer(negated, val) => {
                let text = if negated { format!("-{val}") } else { val.to_string() };
                (text, IrType::Primitive("native.CInt"))
            }
            DefinitionValue::Real(val) => (val.to_string(), IrType::Primitive("native.CDouble")),
        };
        ir.add_literal_define(LiteralDefine { name: def.name, literal, ty });
    }

    // Supplemental pass: macros that weren't literal constants. A macro
    // whose body is a single identifier is a candidate `PossibleVarDefine`,
    // resolved later against a registered `Variable` of the same name.
    for entity in entities {
        if entity.get_kind() != EntityKind::MacroDefinition || !in_scope(entity) {
            continue;
        }
        let Some(name) = entity.get_name() else { continue };
        if name.is_empty() || seen.contains(&name) {
            continue;
        }
        let Some(range) = entity.get_range() else { continue };
        let tokens: Vec<String> = range.tokenize().iter().map(|t| t.get_spelling()).collect();
        if tokens.len() == 2 && tokens[1].chars().next().is_some_and(|c| c.is_alphabetic() || c == '_') {
            ir.add_possible_var_define(name.clone(), tokens[1].clone());
            seen.insert(name);
        }
    }
}

// ---------------------------------------------------------------------------
// Location / scope helpers
// ---------------------------------------------------------------------------

fn loc_of(entity: &Entity) -> Option<Location> {
    let location = entity.get_location()?;
    let file_location = location.get_file_location();
    let file = file_location.file?;
    Some(Location {
        file: file.get_path(),
        line: file_location.line,
    })
}

fn in_main_files(entity: &Entity, traverse_files: &[PathBuf]) -> bool {
    let Some(location) = entity.get_location() else {
        return false;
    };
    let file_location = location.get_file_location();
    let Some(file) = file_location.file else {
        return false;
    };
    let file_path = file.get_path();
    traverse_files.iter().any(|tf| file_path == *tf || file_path.ends_with(tf))
}
