//! Schema-driven argv parsing engine.
//!
//! A [`Parser`] is compiled once from a
//! [`CommandDescriptor`](protoargs_core::CommandDescriptor) and turns argv into
//! a validated [`Config`] or a [`ParseError`]:
//!
//! ```text
//! argv -> tokenize -> coerce + accumulate -> validate -> Config | ParseError
//! ```
//!
//! Multi-level tools either call [`dispatch`], or do the steps by hand: parse
//! the top level with a short `argc` to learn the subcommand, [`exclude`] the
//! tokens that belong to the parent, and parse the rest with the child parser.
//!
//! # Example
//!
//! ```
//! use protoargs_core::{CommandDescriptor, FieldDescriptor, ValueType};
//! use protoargs_engine::{ParseOptions, Parser, exclude};
//!
//! let create = CommandDescriptor::new("create")
//!     .with_field(FieldDescriptor::flag("size", ValueType::UInt64).with_short('s').with_default("0"))
//!     .with_field(FieldDescriptor::positional("path", ValueType::String, 1).required());
//! let program = Parser::new(&CommandDescriptor::new("program").with_subcommand(create)).unwrap();
//!
//! let argv = ["program", "create", "-s", "2048", "/tmp/f"];
//!
//! // Peek at the subcommand name only.
//! let top = program.parse_with(&argv, &ParseOptions::new().with_argc(2)).unwrap();
//! assert_eq!(top.command(), Some("create"));
//!
//! // Hand the remainder to the child.
//! let child = program.subcommand("create").unwrap();
//! let rest = exclude(argv.len(), &argv, &[2]);
//! let options = ParseOptions::new().with_program("program create");
//! let config = child.parse_with(&rest, &options).unwrap();
//! assert_eq!(config.get::<u64>("size").unwrap(), 2048);
//! assert_eq!(config.get::<String>("path").unwrap(), "/tmp/f");
//! ```

mod config;
mod dispatch;
mod error;
mod exclude;
mod parser;
pub mod tokenizer;
mod usage;
mod validator;

pub use config::{Config, FromValue};
pub use dispatch::{Invocation, dispatch};
pub use error::{AccessError, ParseError};
pub use exclude::exclude;
pub use parser::{ParseOptions, Parser};
pub use tokenizer::{Token, Tokens, tokenize};
pub use usage::render_usage;
