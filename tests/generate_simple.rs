//! End-to-end test: parse simple.h, run it through `generate`, and check the
//! generated Scala source for the shapes each fixture declaration exercises.

use std::path::Path;
use std::sync::LazyLock;

static SIMPLE_SOURCE: LazyLock<String> = LazyLock::new(|| {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/simple.toml");
    nativebindgen::generate(&path).expect("generate simple bindings")
});

#[test]
fn emits_package_and_link_annotation() {
    assert!(SIMPLE_SOURCE.starts_with("package simple\n"));
    assert!(SIMPLE_SOURCE.contains("@native.link(\"simple\")"));
    assert!(SIMPLE_SOURCE.contains("object Simple {"));
}

#[test]
fn opaque_then_defined_record_resolves() {
    // Context is forward-declared then defined — the emitted typedef must
    // not carry the "incomplete type" marker.
    assert!(SIMPLE_SOURCE.contains("type Context = Context") || SIMPLE_SOURCE.contains("Context"));
    assert!(!SIMPLE_SOURCE.contains("type Context = native.CStruct0"));
}

#[test]
fn void_and_char_pointer_params_translate() {
    assert!(SIMPLE_SOURCE.contains("def simple_alloc"));
    assert!(SIMPLE_SOURCE.contains("native.Ptr[Byte]"));
    assert!(SIMPLE_SOURCE.contains("native.CString"));
}

#[test]
fn reserved_name_collision_gets_renamed() {
    assert!(SIMPLE_SOURCE.contains("def nativeFunc"));
    assert!(!SIMPLE_SOURCE.contains("def native("));
}

#[test]
fn excluded_prefix_is_spliced_and_dropped() {
    assert!(!SIMPLE_SOURCE.contains("priv_weight_t"));
    assert!(!SIMPLE_SOURCE.contains("priv_unused_t"));
    assert!(SIMPLE_SOURCE.contains("pub_weight_t"));
}

#[test]
fn by_value_struct_param_is_skipped() {
    assert!(!SIMPLE_SOURCE.contains("simple_distance"));
}

#[test]
fn unreferenced_opaque_alias_outside_excluded_prefix_is_dropped() {
    // never_defined_t carries no excluded prefix, so it can only be pruned
    // by should_output's own opaque-alias exception, not prefix splicing.
    assert!(!SIMPLE_SOURCE.contains("never_defined_t"));
}

#[test]
fn literal_defines_object_present() {
    assert!(SIMPLE_SOURCE.contains("object simpleDefines {"));
    assert!(SIMPLE_SOURCE.contains("SIMPLE_VERSION"));
    assert!(SIMPLE_SOURCE.contains("3.14159"));
}
