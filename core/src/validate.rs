//! Descriptor validation.
//!
//! Catches schemas that would make argv matching ambiguous (two fields on
//! one flag, a catch-all positional followed by more positionals, ...) and
//! literal defaults that do not fit their field. These are construction-time
//! failures, reported before any argv is looked at.
//!
//! # Examples
//!
//! ```
//! use protoargs_core::*;
//!
//! let ok = CommandDescriptor::new("program")
//!     .with_field(FieldDescriptor::flag("verbose", ValueType::Bool).with_short('v'));
//! assert!(validate_descriptor(&ok).is_empty());
//!
//! // Invalid: two fields claim `-v`
//! let bad = ok.clone()
//!     .with_field(FieldDescriptor::flag("version", ValueType::Bool).with_short('v'));
//! assert_eq!(validate_descriptor(&bad), vec![SchemaError::DuplicateShortFlag('v')]);
//! ```

use std::collections::HashSet;

use thiserror::Error;

use crate::{
    CommandDescriptor, CoerceError, FieldDescriptor, HELP_LONG, HELP_SHORT, SCHEMA_CONTRACT_VERSION,
    normalize_long_flag,
};

/// Malformed or ambiguous descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// Command name is empty or whitespace-only.
    #[error("command name cannot be empty")]
    EmptyCommandName,
    /// Field name is empty or whitespace-only.
    #[error("field name cannot be empty")]
    EmptyFieldName,
    /// Two fields in one command share a name.
    #[error("duplicate field: {0}")]
    DuplicateField(String),
    /// Field has neither a flag nor a positional slot.
    #[error("field '{0}' must define a short flag, a long flag or a position")]
    MissingAlias(String),
    /// Field has both a flag and a positional slot.
    #[error("field '{0}' cannot be both a flag and a positional")]
    FlaggedPositional(String),
    /// Short alias is not a single ASCII letter (`-5` is a negative number).
    #[error("invalid short flag: {0:?}")]
    InvalidShortFlag(char),
    /// Long alias is too short, starts with a dash or contains invalid characters.
    #[error("invalid long flag: {0:?}")]
    InvalidLongFlag(String),
    /// Field claims `-h` or `--help`.
    #[error("flag '{0}' is reserved for help")]
    ReservedFlag(String),
    /// Two fields share a short alias.
    #[error("duplicate short flag: -{0}")]
    DuplicateShortFlag(char),
    /// Two fields share a long alias (after `_`/`-` normalization).
    #[error("duplicate long flag: --{0}")]
    DuplicateLongFlag(String),
    /// Two positional fields share a slot.
    #[error("duplicate positional index: {0}")]
    DuplicatePosition(u32),
    /// A repeated positional is followed by another positional slot.
    #[error("repeated positional '{0}' must be the last positional")]
    RepeatedPositionalNotLast(String),
    /// Repeated fields accumulate values and cannot carry a scalar default.
    #[error("repeated field '{0}' cannot declare a default")]
    DefaultOnRepeated(String),
    /// Literal default does not coerce to the field type.
    #[error("invalid default for '{field}': {source}")]
    InvalidDefault {
        /// Field declaring the default.
        field: String,
        /// Coercion failure.
        source: CoerceError,
    },
    /// Two subcommands share a name.
    #[error("duplicate subcommand: {0}")]
    DuplicateSubcommand(String),
    /// Command with subcommands also declares positional fields.
    #[error("command '{0}' has subcommands and cannot declare positional fields")]
    PositionalWithSubcommands(String),
    /// `schema_version` has a different major version than this crate reads.
    #[error("unsupported schema version {found} (supported: {supported})")]
    UnsupportedSchemaVersion {
        /// Version declared by the descriptor.
        found: String,
        /// Version this crate writes.
        supported: &'static str,
    },
}

/// Validates a command descriptor and all nested subcommands.
///
/// Stops at the first problem found; an empty vector means the descriptor
/// is usable.
///
/// # Examples
///
/// ```
/// use protoargs_core::*;
///
/// let cmd = CommandDescriptor::new("program")
///     .with_field(FieldDescriptor::positional("rest", ValueType::String, 1).repeated())
///     .with_field(FieldDescriptor::positional("last", ValueType::String, 2));
/// let errors = validate_descriptor(&cmd);
/// assert_eq!(errors, vec![SchemaError::RepeatedPositionalNotLast("rest".into())]);
/// ```
pub fn validate_descriptor(descriptor: &CommandDescriptor) -> Vec<SchemaError> {
    let mut errors = Vec::new();

    if descriptor.name.trim().is_empty() {
        errors.push(SchemaError::EmptyCommandName);
        return errors;
    }

    if let Some(version) = &descriptor.schema_version {
        if major(version) != major(SCHEMA_CONTRACT_VERSION) {
            errors.push(SchemaError::UnsupportedSchemaVersion {
                found: version.clone(),
                supported: SCHEMA_CONTRACT_VERSION,
            });
            return errors;
        }
    }

    errors.extend(validate_fields(&descriptor.fields));
    if !errors.is_empty() {
        return errors;
    }

    if !descriptor.subcommands.is_empty() && descriptor.fields.iter().any(|f| f.is_positional()) {
        errors.push(SchemaError::PositionalWithSubcommands(descriptor.name.clone()));
        return errors;
    }

    let mut seen: HashSet<&str> = HashSet::new();
    for sub in &descriptor.subcommands {
        if !seen.insert(sub.name.as_str()) {
            errors.push(SchemaError::DuplicateSubcommand(sub.name.clone()));
            return errors;
        }
        errors.extend(validate_descriptor(sub));
        if !errors.is_empty() {
            return errors;
        }
    }

    errors
}

fn major(version: &str) -> &str {
    version.trim().split('.').next().unwrap_or_default()
}

fn validate_fields(fields: &[FieldDescriptor]) -> Vec<SchemaError> {
    let mut errors = Vec::new();
    let mut names = HashSet::new();
    let mut shorts = HashSet::new();
    let mut longs = HashSet::new();
    let mut positions = HashSet::new();

    for field in fields {
        if field.name.trim().is_empty() {
            errors.push(SchemaError::EmptyFieldName);
            return errors;
        }
        if !names.insert(field.name.as_str()) {
            errors.push(SchemaError::DuplicateField(field.name.clone()));
            return errors;
        }
        if !field.is_flag() && !field.is_positional() {
            errors.push(SchemaError::MissingAlias(field.name.clone()));
            return errors;
        }
        if field.is_flag() && field.is_positional() {
            errors.push(SchemaError::FlaggedPositional(field.name.clone()));
            return errors;
        }

        if let Some(short) = field.short {
            if !short.is_ascii_alphabetic() {
                errors.push(SchemaError::InvalidShortFlag(short));
                return errors;
            }
            if short == HELP_SHORT {
                errors.push(SchemaError::ReservedFlag(format!("-{short}")));
                return errors;
            }
            if !shorts.insert(short) {
                errors.push(SchemaError::DuplicateShortFlag(short));
                return errors;
            }
        }

        if let Some(long) = &field.long {
            if !is_valid_long_flag(long) {
                errors.push(SchemaError::InvalidLongFlag(long.clone()));
                return errors;
            }
            let normalized = normalize_long_flag(long);
            if normalized == HELP_LONG {
                errors.push(SchemaError::ReservedFlag(format!("--{long}")));
                return errors;
            }
            if !longs.insert(normalized.clone()) {
                errors.push(SchemaError::DuplicateLongFlag(normalized));
                return errors;
            }
        }

        if let Some(position) = field.position {
            if !positions.insert(position) {
                errors.push(SchemaError::DuplicatePosition(position));
                return errors;
            }
        }

        if field.default.is_some() && field.is_repeated() {
            errors.push(SchemaError::DefaultOnRepeated(field.name.clone()));
            return errors;
        }
        if let Err(source) = field.default_value() {
            errors.push(SchemaError::InvalidDefault {
                field: field.name.clone(),
                source,
            });
            return errors;
        }
    }

    let mut positionals: Vec<&FieldDescriptor> = fields.iter().filter(|f| f.is_positional()).collect();
    positionals.sort_by_key(|f| f.position);
    if let Some((_, init)) = positionals.split_last() {
        if let Some(catch_all) = init.iter().find(|f| f.is_repeated()) {
            errors.push(SchemaError::RepeatedPositionalNotLast(catch_all.name.clone()));
        }
    }

    errors
}

fn is_valid_long_flag(long: &str) -> bool {
    long.len() >= 2
        && !long.starts_with('-')
        && long
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_')
}
