//! Generation entry point
//!
//! Derives every law for a configuration and writes them as one C batch.

use std::path::{Path, PathBuf};

use rdd2_core::{ConfigError, LawConfig};
use thiserror::Error;

use crate::error::CodegenError;
use crate::generator::CodeGenerator;
use crate::options::CodegenOptions;
use crate::registry::{LawRegistry, RegistryError};

/// Source file name used by [`generate_laws`]
pub const DEFAULT_FILENAME: &str = "rdd2.c";

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),
    #[error("Code generation error: {0}")]
    Codegen(#[from] CodegenError),
}

/// Generate `rdd2.c` and `rdd2.h` in `destination` with default options
pub fn generate_laws(
    config: &LawConfig,
    destination: impl AsRef<Path>,
) -> Result<Vec<PathBuf>, DriverError> {
    generate_laws_with(config, destination, DEFAULT_FILENAME, CodegenOptions::default())
}

/// Generate every law into `destination/filename`
///
/// Any failure aborts the whole batch and leaves no new file in
/// `destination`.
pub fn generate_laws_with(
    config: &LawConfig,
    destination: impl AsRef<Path>,
    filename: &str,
    options: CodegenOptions,
) -> Result<Vec<PathBuf>, DriverError> {
    config.validate()?;
    let mut generator = CodeGenerator::new(filename, options)?;

    let registry = LawRegistry::derive_all(config)?;
    for law in registry {
        log::info!("derived {}", law.name());
        generator.add(law)?;
    }

    Ok(generator.generate(destination)?)
}
