//! Configuration types for `nativebindgen.toml` — §6.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Root configuration for one generation run.
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Name of the native library to link against, e.g. `"z"` for `libz.so`.
    /// Drives the emitted `@native.link(...)` annotation.
    pub lib_name: String,
    /// Override for the linked library name, when it differs from `lib_name`
    /// (e.g. linking `libfoo-1.0.so` under the name `foo`). Defaults to
    /// `lib_name` when absent.
    pub link_name: Option<String>,
    /// Name of the generated `@native.extern object`.
    pub object_name: String,
    /// Scala package the generated file declares itself in. Defaults to
    /// `object_name` lowercased when absent.
    pub package_name: Option<String>,
    /// Typedefs, functions, variables and var-defines whose name starts with
    /// this prefix are excluded from the generated output (§3.5).
    pub exclude_prefix: Option<String>,
    /// Output file path, relative to the config file's directory.
    #[serde(default = "default_output_file")]
    pub output: PathBuf,
    /// Headers to parse. All are parsed for dependency resolution.
    pub headers: Vec<PathBuf>,
    /// Which of `headers` to actually emit declarations from. Falls back to
    /// `headers` when empty — declarations in transitively-included system
    /// headers are never emitted regardless of this setting.
    #[serde(default)]
    pub traverse: Vec<PathBuf>,
    /// Additional directories to search when resolving header paths. Also
    /// injected as `-I` flags for clang.
    #[serde(default)]
    pub include_paths: Vec<PathBuf>,
    /// Extra clang arguments (e.g. `-DFOO`, `-std=c11`).
    #[serde(default)]
    pub clang_args: Vec<String>,
}

fn default_output_file() -> PathBuf {
    PathBuf::from("output.scala")
}

impl Config {
    pub fn link_name(&self) -> &str {
        self.link_name.as_deref().unwrap_or(&self.lib_name)
    }

    pub fn package_name(&self) -> String {
        self.package_name
            .clone()
            .unwrap_or_else(|| self.object_name.to_lowercase())
    }

    pub fn traverse_files(&self) -> &[PathBuf] {
        if self.traverse.is_empty() { &self.headers } else { &self.traverse }
    }

    /// The translation unit file to parse.
    ///
    /// A single header is parsed directly. Multiple headers are combined
    /// into a generated wrapper file that `#include`s each of them in
    /// order, so the whole set is visible to a single clang parse.
    pub fn wrapper_header(&self, base_dir: &Path) -> PathBuf {
        if self.headers.len() == 1 {
            return resolve_header(&self.headers[0], base_dir, &self.include_paths);
        }
        let wrapper_dir = std::env::temp_dir().join("nativebindgen_wrappers");
        std::fs::create_dir_all(&wrapper_dir).expect("create wrapper dir");
        let safe_name = self.object_name.replace(['.', '/'], "_");
        let wrapper_path = wrapper_dir.join(format!("{safe_name}_wrapper.c"));

        let mut content = String::new();
        for h in &self.headers {
            let abs = resolve_header(h, base_dir, &self.include_paths);
            content.push_str(&format!("#include \"{}\"\n", abs.display()));
        }
        std::fs::write(&wrapper_path, &content).expect("write wrapper file");
        wrapper_path
    }
}

/// Resolve a header path by searching `base_dir` first, then each
/// `include_paths` entry. Absolute paths are returned as-is. Falls back to
/// `base_dir.join(path)` when not found anywhere, so the caller gets a
/// meaningful error from clang instead of a path-resolution error here.
pub fn resolve_header(path: &Path, base_dir: &Path, include_paths: &[PathBuf]) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    let candidate = base_dir.join(path);
    if candidate.exists() {
        return candidate;
    }
    for inc in include_paths {
        let candidate = inc.join(path);
        if candidate.exists() {
            return candidate;
        }
    }
    base_dir.join(path)
}

/// Load and parse a `nativebindgen.toml` configuration file.
pub fn load_config(path: &Path) -> anyhow::Result<Config> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read config file {}: {}", path.display(), e))?;
    let config: Config = toml::from_str(&content)
        .map_err(|e| anyhow::anyhow!("failed to parse config file {}: {}", path.display(), e))?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_name_falls_back_to_lib_name() {
        let cfg = Config {
            lib_name: "z".into(),
            link_name: None,
            object_name: "Zlib".into(),
            package_name: None,
            exclude_prefix: None,
            output: default_output_file(),
            headers: vec![],
            traverse: vec![],
            include_paths: vec![],
            clang_args: vec![],
        };
        assert_eq!(cfg.link_name(), "z");
        assert_eq!(cfg.package_name(), "zlib");
    }

    #[test]
    fn parses_minimal_toml() {
        let toml = r#"
            lib_name = "z"
            object_name = "Zlib"
            headers = ["zlib.h"]
        "#;
        let cfg: Config = toml::from_str(toml).unwrap();
        assert_eq!(cfg.lib_name, "z");
        assert_eq!(cfg.output, PathBuf::from("output.scala"));
        assert!(cfg.traverse.is_empty());
    }
}
