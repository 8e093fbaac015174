//! Loading descriptors from schema files.
//!
//! Schemas are kept as JSON (`.json`) or YAML (`.yaml`, `.yml`) documents
//! holding one root [`CommandDescriptor`]; subcommands nest inside it.
//!
//! # Example YAML
//!
//! ```yaml
//! name: program
//! description: Useful multi command
//! subcommands:
//!   - name: create
//!     fields:
//!       - { name: size, type: uint64, short: s, long: size, default: "0" }
//!       - { name: path, type: string, position: 1, required: true }
//! ```

use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::{CommandDescriptor, SchemaError, validate_descriptor};

/// Errors raised while reading or writing schema files.
#[derive(Debug, Error)]
pub enum LoadError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// File extension is neither JSON nor YAML.
    #[error("unsupported schema format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    /// Document parsed but describes an ambiguous or malformed schema.
    #[error("invalid schema: {0}")]
    InvalidSchema(#[from] SchemaError),
}

/// Convenience alias for results with [`LoadError`].
pub type Result<T> = std::result::Result<T, LoadError>;

/// On-disk schema encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaFormat {
    /// `.json`
    Json,
    /// `.yaml` / `.yml`
    Yaml,
}

impl SchemaFormat {
    /// Picks the format from a file extension.
    ///
    /// # Examples
    ///
    /// ```
    /// use protoargs_core::SchemaFormat;
    ///
    /// assert_eq!(SchemaFormat::from_path("schemas/simple.json"), Some(SchemaFormat::Json));
    /// assert_eq!(SchemaFormat::from_path("multi.YML"), Some(SchemaFormat::Yaml));
    /// assert_eq!(SchemaFormat::from_path("schema.proto"), None);
    /// ```
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        let ext = path.as_ref().extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            _ => None,
        }
    }
}

/// Parses and validates a JSON schema document.
///
/// # Errors
///
/// [`LoadError::JsonError`] for malformed JSON, [`LoadError::InvalidSchema`]
/// when the descriptor fails validation.
pub fn from_json_str(raw: &str) -> Result<CommandDescriptor> {
    let descriptor: CommandDescriptor = serde_json::from_str(raw)?;
    checked(descriptor)
}

/// Parses and validates a YAML schema document.
///
/// # Errors
///
/// [`LoadError::YamlError`] for malformed YAML, [`LoadError::InvalidSchema`]
/// when the descriptor fails validation.
///
/// # Examples
///
/// ```
/// let yaml = r#"
/// name: program
/// fields:
///   - { name: count, type: uint64, long: count, required: true }
/// "#;
/// let descriptor = protoargs_core::from_yaml_str(yaml).unwrap();
/// assert_eq!(descriptor.fields.len(), 1);
/// ```
pub fn from_yaml_str(raw: &str) -> Result<CommandDescriptor> {
    let descriptor: CommandDescriptor = serde_yaml::from_str(raw)?;
    checked(descriptor)
}

/// Loads and validates a schema file, choosing the decoder by extension.
///
/// # Errors
///
/// [`LoadError::UnsupportedFormat`] for unknown extensions, I/O and decode
/// errors, or [`LoadError::InvalidSchema`].
pub fn load_descriptor(path: impl AsRef<Path>) -> Result<CommandDescriptor> {
    let path = path.as_ref();
    let format =
        SchemaFormat::from_path(path).ok_or_else(|| LoadError::UnsupportedFormat(path.to_path_buf()))?;
    let reader = BufReader::new(std::fs::File::open(path)?);
    let descriptor: CommandDescriptor = match format {
        SchemaFormat::Json => serde_json::from_reader(reader)?,
        SchemaFormat::Yaml => serde_yaml::from_reader(reader)?,
    };
    checked(descriptor)
}

/// Writes a descriptor to `path`, choosing the encoder by extension.
///
/// # Errors
///
/// [`LoadError::UnsupportedFormat`] for unknown extensions, or I/O and
/// encode errors.
pub fn save_descriptor(path: impl AsRef<Path>, descriptor: &CommandDescriptor) -> Result<()> {
    let path = path.as_ref();
    let format =
        SchemaFormat::from_path(path).ok_or_else(|| LoadError::UnsupportedFormat(path.to_path_buf()))?;
    let writer = BufWriter::new(std::fs::File::create(path)?);
    match format {
        SchemaFormat::Json => serde_json::to_writer_pretty(writer, descriptor)?,
        SchemaFormat::Yaml => serde_yaml::to_writer(writer, descriptor)?,
    }
    Ok(())
}

fn checked(descriptor: CommandDescriptor) -> Result<CommandDescriptor> {
    match validate_descriptor(&descriptor).into_iter().next() {
        Some(err) => Err(err.into()),
        None => Ok(descriptor),
    }
}
