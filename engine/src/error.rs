//! Error types for argv parsing and configuration access.

use protoargs_core::ValueType;
use thiserror::Error;

/// Failure of one parse call.
///
/// Every per-parse problem is reported through this type; schema problems
/// are a separate, earlier class ([`protoargs_core::SchemaError`]) raised by
/// [`Parser::new`](crate::Parser::new).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A required flag field was neither supplied nor defaulted.
    #[error("the following argument is required: {flag}")]
    MissingRequiredField {
        /// Field name.
        field: String,
        /// Flag spelling shown to the user.
        flag: String,
    },

    /// A required positional slot received no token.
    #[error("the following positional argument is required: {field}")]
    MissingRequiredPositional {
        /// Field name.
        field: String,
    },

    /// A supplied token does not convert to the field's type.
    #[error("argument {field}: invalid {expected} value: '{value}'")]
    TypeCoercionFailure {
        /// Field name.
        field: String,
        /// Raw token as given on the command line.
        value: String,
        /// Declared type of the field.
        expected: ValueType,
    },

    /// A flag-like token matches no field.
    #[error("unrecognized argument: {0}")]
    UnrecognizedToken(String),

    /// The subcommand position holds a name the command does not define.
    #[error("invalid choice: '{name}' (choose from {choices})")]
    SubcommandUnknown {
        /// Token found in the subcommand position.
        name: String,
        /// Comma-separated list of valid subcommands.
        choices: String,
    },

    /// A value-taking flag ended the argument list or was followed by another flag.
    #[error("argument {flag}: expected one argument")]
    MissingValue {
        /// Flag spelling as given on the command line.
        flag: String,
    },

    /// The command has subcommands but none was selected.
    #[error("a command is required (choose from {choices})")]
    MissingSubcommand {
        /// Comma-separated list of valid subcommands.
        choices: String,
    },
}

/// Misuse of the typed accessors on a [`Config`](crate::Config).
///
/// These are programmer errors (asking for a field the schema does not
/// declare, or with the wrong Rust type), never user-input errors.
#[derive(Debug, Error)]
pub enum AccessError {
    /// No field with this name in the command.
    #[error("unknown field: {0}")]
    UnknownField(String),

    /// The requested Rust type cannot hold the field's values.
    #[error("field '{field}' holds {actual} values, not {requested}")]
    TypeMismatch {
        /// Field name.
        field: String,
        /// Declared type of the field.
        actual: ValueType,
        /// Rust type asked for.
        requested: &'static str,
    },

    /// Scalar accessor used on a repeated field.
    #[error("field '{0}' is repeated; use get_all")]
    NotScalar(String),

    /// Repeated accessor used on a scalar field.
    #[error("field '{0}' is not repeated; use get")]
    NotRepeated(String),

    /// The configuration does not fit the requested struct.
    #[error("failed to decode configuration: {0}")]
    Decode(#[from] serde_json::Error),
}
