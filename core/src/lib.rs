//! Core descriptor types for schema-driven argument parsing.
//!
//! This crate defines the static side of protoargs: the metadata a parser is
//! compiled from.
//!
//! - [`CommandDescriptor`] — one command level: ordered fields plus nested
//!   subcommands.
//! - [`FieldDescriptor`] — one field with its type, aliases, positional slot,
//!   requiredness and default.
//! - [`Value`] and [`coerce`] — typed values and the raw-token coercer.
//!
//! Validation ([`validate_descriptor`]) rejects ambiguous schemas such as
//! duplicate flags or a catch-all positional that is not last. Schema files
//! are read with [`load_descriptor`].
//!
//! # Example
//!
//! ```
//! use protoargs_core::*;
//!
//! let copy = CommandDescriptor::new("copy")
//!     .with_field(
//!         FieldDescriptor::flag("recursive", ValueType::Bool)
//!             .with_short('r')
//!             .with_long("recursive")
//!             .with_description("Recursive copy"),
//!     )
//!     .with_field(FieldDescriptor::positional("src", ValueType::String, 1).required())
//!     .with_field(FieldDescriptor::positional("dst", ValueType::String, 2).required());
//!
//! assert_eq!(copy.positionals().len(), 2);
//! assert!(validate_descriptor(&copy).is_empty());
//! ```

mod load;
mod types;
mod validate;
mod value;

pub use load::{LoadError, SchemaFormat, from_json_str, from_yaml_str, load_descriptor, save_descriptor};
pub use types::*;
pub use validate::{SchemaError, validate_descriptor};
pub use value::{CoerceError, Value, coerce};
