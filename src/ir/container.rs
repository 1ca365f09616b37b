//! The IR container — §3.4/§3.5: registration, lookup, reachability and
//! prefix-based filtering, gathered into the single `generate` entry point.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::{info, warn};

use super::cycles::find_all_cycles;
use super::types::*;

/// Reserved words in the target language that a function's C name may
/// collide with. Scala Native's `native` package object is the only one
/// the emitted code always brings into scope, so it's the only collision
/// that can actually occur (§4.2, scenario S3).
const RESERVED_FUNCTION_NAMES: &[&str] = &["native"];

/// The full set of declarations discovered from the source translation unit,
/// plus the operations that turn that raw set into an emittable program.
#[derive(Default)]
pub struct Ir {
    pub type_defs: Vec<Rc<TypeDef>>,
    pub structs: Vec<Rc<Struct>>,
    pub unions: Vec<Rc<Union>>,
    pub enums: Vec<Rc<Enum>>,
    pub functions: Vec<Rc<Function>>,
    pub variables: Vec<Rc<Variable>>,
    pub literal_defines: Vec<Rc<LiteralDefine>>,
    pub possible_var_defines: Vec<PossibleVarDefine>,
    pub var_defines: RefCell<Vec<VarDefine>>,
    generated: RefCell<bool>,
}

impl Ir {
    pub fn new() -> Self {
        Ir::default()
    }

    // -- registration --------------------------------------------------

    /// Look up an existing `TypeDef` by name, or create a fresh opaque one
    /// (`inner = None`) that a later declaration will resolve. Mirrors
    /// `IR::getTypeDefWithName` / the opaque-creation fallback in
    /// `TypeTranslator::translateStructOrUnionOrEnum`.
    pub fn get_or_create_type_def(&mut self, name: &str, location: Option<Location>) -> Rc<TypeDef> {
        if let Some(existing) = self.type_defs.iter().find(|td| td.name == name) {
            return existing.clone();
        }
        let td = Rc::new(TypeDef::new(name.to_string(), None, location));
        self.type_defs.push(td.clone());
        td
    }

    pub fn get_type_def_with_name(&self, name: &str) -> Option<Rc<TypeDef>> {
        self.type_defs.iter().find(|td| td.name == name).cloned()
    }

    /// Resolve a previously-opaque `TypeDef` to its definition, or register
    /// a brand-new resolved one. Never overwrites an already-resolved slot.
    pub fn add_type_def(&mut self, name: &str, inner: IrType, location: Option<Location>) -> Rc<TypeDef> {
        if let Some(existing) = self.type_defs.iter().find(|td| td.name == name) {
            if existing.is_opaque() {
                existing.set_inner(inner);
            }
            return existing.clone();
        }
        let td = Rc::new(TypeDef::new(name.to_string(), Some(inner), location));
        self.type_defs.push(td.clone());
        td
    }

    pub fn add_struct(&mut self, s: Struct) -> Rc<Struct> {
        let rc = Rc::new(s);
        self.structs.push(rc.clone());
        rc
    }

    pub fn add_union(&mut self, u: Union) -> Rc<Union> {
        let rc = Rc::new(u);
        self.unions.push(rc.clone());
        rc
    }

    pub fn add_enum(&mut self, e: Enum) -> Rc<Enum> {
        let rc = Rc::new(e);
        self.enums.push(rc.clone());
        rc
    }

    pub fn add_function(&mut self, f: Function) -> Rc<Function> {
        let rc = Rc::new(f);
        self.functions.push(rc.clone());
        rc
    }

    pub fn add_variable(&mut self, v: Variable) -> Rc<Variable> {
        let rc = Rc::new(v);
        self.variables.push(rc.clone());
        rc
    }

    pub fn add_literal_define(&mut self, d: LiteralDefine) -> Rc<LiteralDefine> {
        let rc = Rc::new(d);
        self.literal_defines.push(rc.clone());
        rc
    }

    pub fn add_possible_var_define(&mut self, macro_name: impl Into<String>, var_name: impl Into<String>) {
        self.possible_var_defines.push(PossibleVarDefine {
            macro_name: macro_name.into(),
            var_name: var_name.into(),
        });
    }

    /// Resolve any `PossibleVarDefine` whose target variable name matches a
    /// variable registered so far. Called once, after all declarations have
    /// been collected, since a macro may appear before the variable it
    /// aliases in the source (§3.2).
    pub fn resolve_var_defines(&self) {
        let mut resolved = self.var_defines.borrow_mut();
        for pvd in &self.possible_var_defines {
            if let Some(var) = self.variables.iter().find(|v| v.name == pvd.var_name) {
                resolved.push(VarDefine {
                    name: pvd.macro_name.clone(),
                    variable: var.clone(),
                });
            }
        }
    }

    pub fn get_define_for_var(&self, var_name: &str) -> Option<String> {
        self.var_defines
            .borrow()
            .iter()
            .find(|vd| vd.variable.name == var_name)
            .map(|vd| vd.name.clone())
    }

    pub fn remove_define(&self, macro_name: &str) {
        self.var_defines.borrow_mut().retain(|vd| vd.name != macro_name);
    }

    // -- reachability ----------------------------------------------------

    /// True if `target` is used — directly or transitively through any
    /// declaration that will itself be emitted. `should_output` and
    /// `is_type_used` are mutually recursive: a struct is emitted only if
    /// it's used, but "used" includes being a field of another struct that
    /// is itself going to be emitted. Both share one visited set so the
    /// recursion terminates on mutually-referential records (§4.4, §9).
    pub fn is_type_used(&self, target: &Decl) -> bool {
        let mut visited = Vec::new();
        self.is_type_used_rec(target, &mut visited)
    }

    /// §4.4's three-branch decision: used declarations are always emitted;
    /// unused ones are emitted only if they came from the main translation
    /// unit, with one exception — a `TypeDef` that's merely an alias chain
    /// ending in an unresolved opaque type is dropped with a warning even
    /// then (S5). Used-but-unreachable-otherwise structs/unions (S6's
    /// `struct_P`, kept alive purely by main-file membership after the
    /// function using it was rejected) fall through to that same default.
    ///
    /// Mutually recursive with `is_type_used` through `should_output_rec`,
    /// sharing one visited set the way the open question in §9 requires.
    pub fn should_output(&self, decl: &Decl) -> bool {
        let mut visited = Vec::new();
        self.should_output_rec(decl, &mut visited)
    }

    /// Every `Struct`/`Union`/`Enum` registered in this IR was already
    /// filtered to the main translation unit at collection time (§6's
    /// `LocationManager.inMainFile` check happens in the frontend here,
    /// rather than being re-queried per declaration at filter time). A
    /// `TypeDef` counts as main-file if it carries its own source location
    /// (a real `typedef` statement was seen) or resolves to *something* (an
    /// opaque placeholder that was eventually filled in inherits the
    /// resolved record's main-file membership, which — by the same
    /// collection-time filtering — is unconditionally true). A `TypeDef`
    /// with neither is a bare synthesized reference to a record that was
    /// never itself declared or defined in-scope.
    fn in_main_file(&self, decl: &Decl) -> bool {
        match decl {
            Decl::Struct(_) | Decl::Union(_) | Decl::Enum(_) => true,
            Decl::TypeDef(td) => td.location.is_some() || td.inner().is_some(),
        }
    }

    /// True if `td`, chasing through any number of typedef-to-typedef links,
    /// bottoms out at an unresolved opaque `TypeDef` rather than a concrete
    /// type (§9: resolution of the "illegal opaque usage" open question, as
    /// applied to the typedef-alias exception in `should_output`).
    fn is_opaque_alias(&self, td: &Rc<TypeDef>, visited: &mut Vec<NodeKey>) -> bool {
        let key = IrType::TypeDef(td.clone()).node_key().expect("TypeDef always has a node key");
        if visited.contains(&key) {
            return true;
        }
        visited.push(key);
        match td.inner() {
            None => true,
            Some(IrType::TypeDef(inner)) => self.is_opaque_alias(&inner, visited),
            Some(_) => false,
        }
    }

    fn is_type_used_rec(&self, target: &Decl, visited: &mut Vec<NodeKey>) -> bool {
        let target_ty = target.as_ir_type();

        for f in &self.functions {
            if type_references(&f.return_type, &target_ty)
                || f.params.iter().any(|p| type_references(&p.ty, &target_ty))
            {
                return true;
            }
        }
        for v in &self.variables {
            if type_references(&v.ty, &target_ty) {
                return true;
            }
        }
        for ld in &self.literal_defines {
            if type_references(&ld.ty, &target_ty) {
                return true;
            }
        }

        for decl in self.all_composite_decls() {
            if let Some(key) = decl.as_ir_type().node_key() {
                if visited.contains(&key) {
                    continue;
                }
            }
            if decl_references(&decl, &target_ty) && self.should_output_rec(&decl, visited) {
                return true;
            }
        }
        false
    }

    fn should_output_rec(&self, decl: &Decl, visited: &mut Vec<NodeKey>) -> bool {
        if let Some(key) = decl.as_ir_type().node_key() {
            if visited.contains(&key) {
                return false;
            }
            visited.push(key);
        }
        if self.is_type_used_rec(decl, visited) {
            return true;
        }
        if !self.in_main_file(decl) {
            return false;
        }
        if let Decl::TypeDef(td) = decl {
            if self.is_opaque_alias(td, &mut Vec::new()) {
                warn!(name = %td.name, "unused alias for incomplete type");
                return false;
            }
        }
        true
    }

    fn all_composite_decls(&self) -> Vec<Decl> {
        let mut out = Vec::new();
        out.extend(self.type_defs.iter().cloned().map(Decl::TypeDef));
        out.extend(self.structs.iter().cloned().map(Decl::Struct));
        out.extend(self.unions.iter().cloned().map(Decl::Union));
        out.extend(self.enums.iter().cloned().map(Decl::Enum));
        out
    }

    /// Any declaration whose reachable type tree still contains an
    /// unresolved opaque `TypeDef` — even behind a pointer — is illegal to
    /// emit (§9, resolution of the opaque-usage open question).
    pub fn uses_opaque_type_def(&self, ty: &IrType) -> bool {
        let mut visited = Vec::new();
        uses_opaque_rec(ty, &mut visited)
    }

    pub fn find_cycles(&self, decl: &Decl) -> Vec<Vec<super::cycles::CycleNode>> {
        find_all_cycles(decl)
    }

    // -- prefix filtering --------------------------------------------------

    /// Splice out typedefs whose name starts with `prefix` and which are
    /// used only by other typedefs: references to them are replaced by
    /// their inner type, and the typedef itself is dropped. Functions,
    /// literal defines, var defines and variables whose name starts with
    /// `prefix` are dropped outright. Structs, unions and enums are never
    /// prefix-filtered — only reachability-pruned later (§3.5).
    fn filter_by_prefix(&mut self, prefix: &str) {
        if prefix.is_empty() {
            return;
        }

        loop {
            let splice_name = self
                .type_defs
                .iter()
                .find(|td| td.name.starts_with(prefix) && self.used_only_by_type_defs(td))
                .map(|td| td.name.clone());

            let Some(name) = splice_name else { break };
            let td = self.type_defs.iter().find(|t| t.name == name).unwrap().clone();
            let Some(replacement) = td.inner() else {
                // Opaque alias with nothing to splice in — drop with a warning
                // rather than leaving a dangling reference (§7 skip-with-warning).
                warn!(name = %td.name, "dropping unused opaque typedef behind excluded prefix");
                self.type_defs.retain(|t| !Rc::ptr_eq(t, &td));
                continue;
            };
            self.replace_type_in_type_defs(&td, &replacement);
            self.type_defs.retain(|t| !Rc::ptr_eq(t, &td));
        }

        self.functions.retain(|f| !f.name.starts_with(prefix));
        self.literal_defines.retain(|d| !d.name.starts_with(prefix));
        self.var_defines.borrow_mut().retain(|d| !d.name.starts_with(prefix));
        self.variables.retain(|v| !v.name.starts_with(prefix));
    }

    fn used_only_by_type_defs(&self, target: &Rc<TypeDef>) -> bool {
        let target_ty = IrType::TypeDef(target.clone());
        let used_elsewhere = self.functions.iter().any(|f| {
            type_references(&f.return_type, &target_ty) || f.params.iter().any(|p| type_references(&p.ty, &target_ty))
        }) || self.variables.iter().any(|v| type_references(&v.ty, &target_ty))
            || self.literal_defines.iter().any(|d| type_references(&d.ty, &target_ty))
            || self.structs.iter().any(|s| s.fields.iter().any(|f| type_references(&f.ty, &target_ty)))
            || self.unions.iter().any(|u| u.fields.iter().any(|f| type_references(&f.ty, &target_ty)));
        !used_elsewhere
    }

    fn replace_type_in_type_defs(&self, target: &Rc<TypeDef>, replacement: &IrType) {
        let target_ty = IrType::TypeDef(target.clone());
        for td in &self.type_defs {
            if Rc::ptr_eq(td, target) {
                continue;
            }
            if let Some(inner) = td.inner() {
                if type_references(&inner, &target_ty) {
                    td.set_inner(substitute(&inner, &target_ty, replacement));
                }
            }
        }
    }

    // -- entry point --------------------------------------------------

    /// Resolve deferred var-defines, apply prefix filtering and drop any
    /// declaration that is unreachable or depends on a still-unresolved
    /// opaque type. Idempotent — calling it a second time with the same
    /// prefix is a no-op, matching `IR::generate`'s guard (§4.5).
    pub fn generate(&mut self, exclude_prefix: Option<&str>) {
        if *self.generated.borrow() {
            return;
        }
        *self.generated.borrow_mut() = true;

        self.resolve_var_defines();

        if let Some(prefix) = exclude_prefix {
            self.filter_by_prefix(prefix);
        }

        // `Vec::retain`'s closure can't call back into `&self` methods while
        // the receiver field itself is mutably borrowed, so each pass first
        // computes the surviving set against a shared `&self` and only then
        // replaces the field.
        self.functions = self
            .functions
            .iter()
            .filter(|f| {
                let illegal = self.uses_opaque_type_def(&f.return_type)
                    || f.params.iter().any(|p| self.uses_opaque_type_def(&p.ty));
                if illegal {
                    warn!(name = %f.name, "skipping function: reachable type tree contains an unresolved opaque type");
                }
                !illegal
            })
            .cloned()
            .collect();
        self.variables = self
            .variables
            .iter()
            .filter(|v| {
                let illegal = self.uses_opaque_type_def(&v.ty);
                if illegal {
                    warn!(name = %v.name, "skipping variable: reachable type tree contains an unresolved opaque type");
                }
                !illegal
            })
            .cloned()
            .collect();
        {
            let mut defines = self.var_defines.borrow_mut();
            defines.retain(|vd| {
                let illegal = self.uses_opaque_type_def(&vd.variable.ty);
                if illegal {
                    warn!(name = %vd.name, "skipping var-define: underlying variable has an unresolved opaque type");
                }
                !illegal
            });
        }

        self.assign_scala_names();

        self.structs = self
            .structs
            .iter()
            .filter(|s| self.should_output(&Decl::Struct((*s).clone())))
            .cloned()
            .collect();
        self.unions = self
            .unions
            .iter()
            .filter(|u| self.should_output(&Decl::Union((*u).clone())))
            .cloned()
            .collect();
        self.enums = self
            .enums
            .iter()
            .filter(|e| self.should_output(&Decl::Enum((*e).clone())))
            .cloned()
            .collect();
        self.type_defs = self
            .type_defs
            .iter()
            .filter(|td| self.should_output(&Decl::TypeDef((*td).clone())))
            .cloned()
            .collect();

        info!(
            functions = self.functions.len(),
            variables = self.variables.len(),
            structs = self.structs.len(),
            unions = self.unions.len(),
            enums = self.enums.len(),
            type_defs = self.type_defs.len(),
            "generated bindings"
        );
    }

    /// Give every function named after a reserved word an alternate output
    /// name: `<name>Func`, then `<name>Func0`, `<name>Func1`, ... — the
    /// first candidate that collides with no existing function name and no
    /// alternate name already assigned to an earlier function (§4.2, S3).
    fn assign_scala_names(&self) {
        let mut taken: Vec<String> = self.functions.iter().map(|f| f.name.clone()).collect();
        for f in &self.functions {
            if !RESERVED_FUNCTION_NAMES.contains(&f.name.as_str()) {
                continue;
            }
            let base = format!("{}Func", f.name);
            let mut candidate = base.clone();
            let mut n = 0i64;
            while taken.contains(&candidate) {
                candidate = format!("{base}{n}");
                n += 1;
            }
            f.set_output_name(candidate.clone());
            taken.push(candidate);
        }
    }
}

fn uses_opaque_rec(ty: &IrType, visited: &mut Vec<NodeKey>) -> bool {
    if ty.is_opaque_typedef() {
        return true;
    }
    if let Some(key) = ty.node_key() {
        if visited.contains(&key) {
            return false;
        }
        visited.push(key);
    }
    match ty {
        IrType::Pointer(inner) | IrType::Array(inner, _) => uses_opaque_rec(inner, visited),
        IrType::FunctionPointer(fp) => {
            uses_opaque_rec(&fp.return_type, visited) || fp.params.iter().any(|p| uses_opaque_rec(p, visited))
        }
        IrType::TypeDef(td) => td.inner().is_some_and(|inner| uses_opaque_rec(&inner, visited)),
        IrType::Struct(s) => s.fields.iter().any(|f| uses_opaque_rec(&f.ty, visited)),
        IrType::Union(u) => u.fields.iter().any(|f| uses_opaque_rec(&f.ty, visited)),
        IrType::Primitive(_) | IrType::Enum(_) => false,
    }
}

/// True if `haystack` contains `needle` anywhere in its reachable type tree,
/// stopping at the first occurrence of an already-visited node so cyclic
/// records terminate the search instead of recursing forever.
fn type_references(haystack: &IrType, needle: &IrType) -> bool {
    let mut visited = Vec::new();
    references_rec(haystack, needle, &mut visited)
}

fn references_rec(haystack: &IrType, needle: &IrType, visited: &mut Vec<NodeKey>) -> bool {
    if haystack.node_key() == needle.node_key() && needle.node_key().is_some() {
        return true;
    }
    if let Some(key) = haystack.node_key() {
        if visited.contains(&key) {
            return false;
        }
        visited.push(key);
    }
    match haystack {
        IrType::Pointer(inner) | IrType::Array(inner, _) => references_rec(inner, needle, visited),
        IrType::FunctionPointer(fp) => {
            references_rec(&fp.return_type, needle, visited) || fp.params.iter().any(|p| references_rec(p, needle, visited))
        }
        IrType::TypeDef(td) => td.inner().is_some_and(|inner| references_rec(&inner, needle, visited)),
        IrType::Struct(s) => s.fields.iter().any(|f| references_rec(&f.ty, needle, visited)),
        IrType::Union(u) => u.fields.iter().any(|f| references_rec(&f.ty, needle, visited)),
        IrType::Primitive(_) | IrType::Enum(_) => false,
    }
}

fn decl_references(decl: &Decl, needle: &IrType) -> bool {
    match decl {
        Decl::TypeDef(td) => td.inner().is_some_and(|inner| type_references(&inner, needle)),
        Decl::Struct(s) => s.fields.iter().any(|f| type_references(&f.ty, needle)),
        Decl::Union(u) => u.fields.iter().any(|f| type_references(&f.ty, needle)),
        Decl::Enum(_) => false,
    }
}

fn substitute(ty: &IrType, target: &IrType, replacement: &IrType) -> IrType {
    if ty.node_key() == target.node_key() && target.node_key().is_some() {
        return replacement.clone();
    }
    match ty {
        IrType::Pointer(inner) => IrType::Pointer(Box::new(substitute(inner, target, replacement))),
        IrType::Array(inner, n) => IrType::Array(Box::new(substitute(inner, target, replacement)), *n),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_function_name_gets_alternate_output_name() {
        let mut ir = Ir::new();
        ir.add_function(Function::new("native", vec![], IrType::Primitive("Unit"), false));
        ir.add_function(Function::new("nativeFunc", vec![], IrType::Primitive("Unit"), false));
        ir.assign_scala_names();

        let native_fn = ir.functions.iter().find(|f| f.name == "native").unwrap();
        // "nativeFunc" is already taken by the second declared function, so
        // the rename loop must fall through to the first numbered candidate.
        assert_eq!(native_fn.output_name(), "nativeFunc0");
    }

    #[test]
    fn non_reserved_function_name_is_unchanged() {
        let mut ir = Ir::new();
        ir.add_function(Function::new("frobnicate", vec![], IrType::Primitive("Unit"), false));
        ir.assign_scala_names();
        assert_eq!(ir.functions[0].output_name(), "frobnicate");
    }

    #[test]
    fn opaque_typedef_resolves_exactly_once() {
        let mut ir = Ir::new();
        let opaque = ir.get_or_create_type_def("Handle", None);
        assert!(opaque.is_opaque());

        let resolved = ir.add_type_def("Handle", IrType::Primitive("native.CInt"), None);
        assert!(Rc::ptr_eq(&opaque, &resolved));
        assert!(!opaque.is_opaque());

        // A second resolution attempt must not clobber the first.
        ir.add_type_def("Handle", IrType::Primitive("native.CLong"), None);
        match opaque.inner() {
            Some(IrType::Primitive(p)) => assert_eq!(p, "native.CInt"),
            other => panic!("expected Primitive(\"native.CInt\"), got {:?}", other.is_some()),
        }
    }

    #[test]
    fn prefix_filter_splices_typedef_only_used_by_other_typedefs() {
        let mut ir = Ir::new();
        // `priv_count` is only ever referenced by another typedef, `pub_count`,
        // which in turn is kept reachable by a function that uses it.
        let priv_td = ir.add_type_def("priv_count", IrType::Primitive("native.CInt"), None);
        let pub_td = ir.add_type_def("pub_count", IrType::TypeDef(priv_td), None);
        ir.add_function(Function::new(
            "get_count",
            vec![],
            IrType::TypeDef(pub_td),
            false,
        ));

        ir.generate(Some("priv_"));

        assert!(ir.get_type_def_with_name("priv_count").is_none());
        let pub_td = ir.get_type_def_with_name("pub_count").unwrap();
        assert!(matches!(pub_td.inner(), Some(IrType::Primitive("native.CInt"))));
    }

    #[test]
    fn prefix_filter_drops_functions_outright() {
        let mut ir = Ir::new();
        ir.add_function(Function::new("priv_helper", vec![], IrType::Primitive("Unit"), false));
        ir.add_function(Function::new("public_api", vec![], IrType::Primitive("Unit"), false));
        ir.generate(Some("priv_"));
        assert!(ir.functions.iter().all(|f| f.name != "priv_helper"));
        assert!(ir.functions.iter().any(|f| f.name == "public_api"));
    }

    #[test]
    fn generate_is_idempotent() {
        let mut ir = Ir::new();
        ir.add_function(Function::new("priv_helper", vec![], IrType::Primitive("Unit"), false));
        ir.generate(Some("priv_"));
        let count_before = ir.functions.len();
        ir.generate(Some("anything_else"));
        assert_eq!(ir.functions.len(), count_before);
    }

    #[test]
    fn unused_struct_in_main_file_is_still_emitted() {
        // S6: `struct_P` is emitted purely by main-file membership even once
        // the only function that referenced it (passing it by value) has
        // already been rejected and dropped — `isTypeUsed` alone would have
        // pruned it.
        let mut ir = Ir::new();
        ir.add_struct(Struct {
            name: "P".into(),
            fields: vec![],
            size: 0,
            packed: false,
            bitfield: false,
            location: None,
        });
        ir.generate(None);
        assert!(ir.structs.iter().any(|s| s.name == "P"));
    }

    #[test]
    fn unused_typedef_aliasing_opaque_type_is_dropped() {
        // S5: a typedef for a forward-declared-but-never-defined record,
        // referenced by nothing, is dropped even though it's in the main
        // file — the one exception `should_output` carves out of the
        // main-file fallback.
        let mut ir = Ir::new();
        let opaque = ir.get_or_create_type_def("struct_never_defined", None);
        ir.add_type_def(
            "nd_t",
            IrType::TypeDef(opaque),
            Some(Location {
                file: std::path::PathBuf::from("main.h"),
                line: 1,
            }),
        );
        ir.generate(None);
        assert!(ir.get_type_def_with_name("nd_t").is_none());
    }

    #[test]
    fn used_typedef_aliasing_opaque_type_is_kept() {
        // The same alias shape, but directly referenced by a literal define
        // (the one declaration kind `generate` never opaque-filters) —
        // `isTypeUsed` wins over the opaque-alias exception, which only
        // applies once a declaration is otherwise unused.
        let mut ir = Ir::new();
        let opaque = ir.get_or_create_type_def("struct_never_defined", None);
        let nd_t = ir.add_type_def("nd_t", IrType::TypeDef(opaque), None);
        ir.add_literal_define(LiteralDefine {
            name: "ND_MARKER".into(),
            literal: "0".into(),
            ty: IrType::TypeDef(nd_t),
        });
        ir.generate(None);
        assert!(ir.get_type_def_with_name("nd_t").is_some());
    }
}
