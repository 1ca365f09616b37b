//! nativebindgen — C header → Scala Native FFI binding generator.
//!
//! Parses C headers via libclang, builds an intermediate representation of
//! the declarations found in them, resolves it against the target's
//! primitive and pointer conventions, and emits a single Scala source file
//! with the generated bindings.
//!
//! # Quick start
//!
//! Generate bindings from a config (suitable for `build.rs`):
//!
//! ```no_run
//! use std::path::Path;
//!
//! nativebindgen::run(Path::new("nativebindgen.toml"), None).unwrap();
//! ```
//!
//! Or get the generated source without writing to disk:
//!
//! ```no_run
//! use std::path::Path;
//!
//! let source = nativebindgen::generate(Path::new("nativebindgen.toml")).unwrap();
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

pub mod config;
pub mod emit;
pub mod frontend;
pub mod ir;
pub mod translate;

/// Run the full pipeline: load config, parse headers, generate bindings and
/// write the result to the configured (or overridden) output path.
///
/// Returns the path the source file was written to.
pub fn run(config_path: &Path, output: Option<&Path>) -> Result<PathBuf> {
    let cfg = config::load_config(config_path)
        .with_context(|| format!("loading config from {}", config_path.display()))?;

    let base_dir = config_path.parent().unwrap_or_else(|| Path::new("."));

    let source = generate_from_config(&cfg, base_dir)?;

    let output_path = match output {
        Some(p) => p.to_path_buf(),
        None => base_dir.join(&cfg.output),
    };
    std::fs::write(&output_path, &source)
        .with_context(|| format!("writing output to {}", output_path.display()))?;

    info!(path = %output_path.display(), bytes = source.len(), "wrote bindings");

    Ok(output_path)
}

/// Parse a config file, extract declarations from its headers, and return
/// the generated source without writing to disk.
pub fn generate(config_path: &Path) -> Result<String> {
    let cfg = config::load_config(config_path)
        .with_context(|| format!("loading config from {}", config_path.display()))?;

    let base_dir = config_path.parent().unwrap_or_else(|| Path::new("."));

    generate_from_config(&cfg, base_dir)
}

/// Generate bindings source from an already-loaded [`config::Config`].
///
/// `base_dir` is the directory relative to which header paths in the config
/// are resolved (typically the parent directory of the TOML file).
pub fn generate_from_config(cfg: &config::Config, base_dir: &Path) -> Result<String> {
    info!(lib = %cfg.lib_name, object = %cfg.object_name, headers = cfg.headers.len(), "loaded configuration");

    let clang =
        clang::Clang::new().map_err(|e| anyhow::anyhow!("failed to initialize libclang: {e}"))?;
    let index = clang::Index::new(&clang, false, false);

    let mut program = frontend::extract(&index, cfg, base_dir)?;
    program.generate(cfg.exclude_prefix.as_deref());

    let source = emit::emit(&program, &cfg.package_name(), cfg.link_name(), &cfg.lib_name, &cfg.object_name);

    info!(bytes = source.len(), "generated bindings");

    Ok(source)
}
