//! Descriptor type definitions for command-line schemas.
//!
//! A [`CommandDescriptor`] is the compiled form of one message-like schema:
//! an ordered list of [`FieldDescriptor`]s plus nested subcommands. The types
//! are plain data, serializable with [`serde`] so schemas can be kept in JSON
//! or YAML files and loaded once at process start.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::value::{CoerceError, Value, coerce};

/// Version of the descriptor contract (semver).
///
/// Written into every [`CommandDescriptor`] created through
/// [`CommandDescriptor::new`]. Validation rejects descriptors declaring a
/// different major version.
pub const SCHEMA_CONTRACT_VERSION: &str = "1.0.0";

/// Reserved short alias for the implicit help flag.
pub const HELP_SHORT: char = 'h';

/// Reserved long alias for the implicit help flag.
pub const HELP_LONG: &str = "help";

/// Value type of a field.
///
/// Names follow protobuf scalar types, which is also how they are spelled in
/// schema files (`"uint64"`, `"string"`, ...).
///
/// # Examples
///
/// ```
/// use protoargs_core::ValueType;
///
/// assert_eq!(ValueType::Double.to_string(), "double");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    /// UTF-8 string, passed through verbatim.
    String,
    /// Signed 32-bit integer.
    Int32,
    /// Signed 64-bit integer.
    Int64,
    /// Unsigned 32-bit integer.
    UInt32,
    /// Unsigned 64-bit integer.
    UInt64,
    /// Single precision float.
    Float,
    /// Double precision float.
    Double,
    /// Boolean.
    Bool,
}

impl ValueType {
    /// Schema spelling of the type.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::UInt32 => "uint32",
            Self::UInt64 => "uint64",
            Self::Float => "float",
            Self::Double => "double",
            Self::Bool => "bool",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cardinality of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// At most one value; re-supplying the flag overwrites the previous value.
    #[default]
    Scalar,
    /// Any number of values, kept in argv order.
    Repeated,
}

/// Schema for one configuration field.
///
/// A field is reachable through a short flag (`-e`), a long flag
/// (`--a-long-param`) or a positional slot. Flags are stored without their
/// leading dashes.
///
/// # Examples
///
/// ```
/// use protoargs_core::{FieldDescriptor, ValueType};
///
/// let size = FieldDescriptor::flag("size", ValueType::UInt64)
///     .with_short('s')
///     .with_long("size")
///     .with_default("0");
/// assert!(size.takes_value());
///
/// let path = FieldDescriptor::positional("path", ValueType::String, 1).required();
/// assert!(path.is_positional());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Logical field name, unique within its command.
    pub name: String,
    /// Scalar or repeated.
    #[serde(default)]
    pub kind: FieldKind,
    /// Value type of the field.
    #[serde(rename = "type")]
    pub value_type: ValueType,
    /// Single character alias, e.g. `e` for `-e`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short: Option<char>,
    /// Multi character alias, e.g. `a-long-param` for `--a-long-param`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long: Option<String>,
    /// Ordinal among the positional slots (ascending order decides matching).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<u32>,
    /// Must be supplied (or defaulted) for a parse to succeed.
    #[serde(default)]
    pub required: bool,
    /// Literal default, as written in the schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    /// Help text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Placeholder shown for the value in usage text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metavar: Option<String>,
}

impl FieldDescriptor {
    fn base(name: &str, value_type: ValueType) -> Self {
        Self {
            name: name.to_string(),
            kind: FieldKind::Scalar,
            value_type,
            short: None,
            long: None,
            position: None,
            required: false,
            default: None,
            description: None,
            metavar: None,
        }
    }

    /// Creates a flag field. Add aliases with [`with_short`](Self::with_short)
    /// and [`with_long`](Self::with_long).
    pub fn flag(name: &str, value_type: ValueType) -> Self {
        Self::base(name, value_type)
    }

    /// Creates a positional field occupying slot `position`.
    pub fn positional(name: &str, value_type: ValueType, position: u32) -> Self {
        Self {
            position: Some(position),
            ..Self::base(name, value_type)
        }
    }

    /// Sets the short alias.
    pub fn with_short(mut self, short: char) -> Self {
        self.short = Some(short);
        self
    }

    /// Sets the long alias.
    pub fn with_long(mut self, long: &str) -> Self {
        self.long = Some(long.to_string());
        self
    }

    /// Marks the field as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Marks the field as repeated.
    pub fn repeated(mut self) -> Self {
        self.kind = FieldKind::Repeated;
        self
    }

    /// Sets the literal default.
    pub fn with_default(mut self, literal: &str) -> Self {
        self.default = Some(literal.to_string());
        self
    }

    /// Adds a description.
    pub fn with_description(mut self, desc: &str) -> Self {
        self.description = Some(desc.to_string());
        self
    }

    /// Sets the usage placeholder.
    pub fn with_metavar(mut self, metavar: &str) -> Self {
        self.metavar = Some(metavar.to_string());
        self
    }

    /// Returns `true` if the field occupies a positional slot.
    pub fn is_positional(&self) -> bool {
        self.position.is_some()
    }

    /// Returns `true` if the field has a short or long alias.
    pub fn is_flag(&self) -> bool {
        self.short.is_some() || self.long.is_some()
    }

    /// Returns `true` for repeated fields.
    pub fn is_repeated(&self) -> bool {
        self.kind == FieldKind::Repeated
    }

    /// Flags of every type except `bool` consume the following token.
    pub fn takes_value(&self) -> bool {
        self.value_type != ValueType::Bool
    }

    /// Preferred flag spelling with dashes (long form first), if any.
    pub fn canonical_flag(&self) -> Option<String> {
        match (&self.long, self.short) {
            (Some(long), _) => Some(format!("--{long}")),
            (None, Some(short)) => Some(format!("-{short}")),
            (None, None) => None,
        }
    }

    /// Placeholder for the field's value in usage text.
    pub fn metavar(&self) -> &str {
        self.metavar.as_deref().unwrap_or(&self.name)
    }

    /// Compiles the literal default into a typed value.
    ///
    /// # Errors
    ///
    /// Returns the [`CoerceError`] produced when the literal does not fit the
    /// field's [`ValueType`].
    ///
    /// # Examples
    ///
    /// ```
    /// use protoargs_core::{FieldDescriptor, Value, ValueType};
    ///
    /// let f = FieldDescriptor::flag("count", ValueType::UInt32).with_long("count").with_default("10");
    /// assert_eq!(f.default_value().unwrap(), Some(Value::UInt(10)));
    /// ```
    pub fn default_value(&self) -> Result<Option<Value>, CoerceError> {
        self.default
            .as_deref()
            .map(|literal| coerce(literal, self.value_type))
            .transpose()
    }
}

/// Descriptor for one command or subcommand.
///
/// Field order matters: positional slots are matched by ascending position
/// and usage text lists fields in declaration order.
///
/// # Examples
///
/// ```
/// use protoargs_core::*;
///
/// let create = CommandDescriptor::new("create")
///     .with_field(FieldDescriptor::flag("size", ValueType::UInt64).with_short('s').with_long("size"))
///     .with_field(FieldDescriptor::positional("path", ValueType::String, 1).required());
/// let program = CommandDescriptor::new("program").with_subcommand(create);
///
/// assert_eq!(program.subcommand_names(), vec!["create"]);
/// assert_eq!(program.find_subcommand("create").unwrap().flags().count(), 1);
/// assert!(validate_descriptor(&program).is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandDescriptor {
    /// Contract version (populated from [`SCHEMA_CONTRACT_VERSION`]).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_version: Option<String>,
    /// Program or subcommand name, used in usage text and for dispatch.
    pub name: String,
    /// Short description of the command.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Fields in declaration order.
    #[serde(default)]
    pub fields: Vec<FieldDescriptor>,
    /// Nested subcommands.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subcommands: Vec<CommandDescriptor>,
}

impl CommandDescriptor {
    /// Creates an empty descriptor with the given name.
    pub fn new(name: &str) -> Self {
        Self {
            schema_version: Some(SCHEMA_CONTRACT_VERSION.to_string()),
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Adds a description.
    pub fn with_description(mut self, desc: &str) -> Self {
        self.description = Some(desc.to_string());
        self
    }

    /// Appends a field.
    pub fn with_field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    /// Appends a nested subcommand.
    pub fn with_subcommand(mut self, sub: CommandDescriptor) -> Self {
        self.subcommands.push(sub);
        self
    }

    /// Finds a direct subcommand by name.
    pub fn find_subcommand(&self, name: &str) -> Option<&CommandDescriptor> {
        self.subcommands.iter().find(|s| s.name == name)
    }

    /// Names of the direct subcommands, in declaration order.
    pub fn subcommand_names(&self) -> Vec<&str> {
        self.subcommands.iter().map(|s| s.name.as_str()).collect()
    }

    /// Positional fields sorted by ascending position.
    pub fn positionals(&self) -> Vec<&FieldDescriptor> {
        let mut positionals: Vec<&FieldDescriptor> =
            self.fields.iter().filter(|f| f.is_positional()).collect();
        positionals.sort_by_key(|f| f.position);
        positionals
    }

    /// Flag fields in declaration order.
    pub fn flags(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(|f| f.is_flag())
    }
}

/// Maps `--snake_case` and `--kebab-case` spellings to one form.
///
/// # Examples
///
/// ```
/// use protoargs_core::normalize_long_flag;
///
/// assert_eq!(normalize_long_flag("a_long_param"), "a-long-param");
/// assert_eq!(normalize_long_flag("a-long-param"), "a-long-param");
/// ```
pub fn normalize_long_flag(flag: &str) -> String {
    flag.replace('_', "-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_builders() {
        let field = FieldDescriptor::flag("paramF", ValueType::Int32)
            .with_short('f')
            .repeated()
            .with_description("Integer param which may encounter multiple times");

        assert_eq!(field.short, Some('f'));
        assert!(field.is_repeated());
        assert!(field.is_flag());
        assert!(!field.is_positional());
        assert_eq!(field.canonical_flag().as_deref(), Some("-f"));
        assert_eq!(field.metavar(), "paramF");
    }

    #[test]
    fn test_bool_flag_takes_no_value() {
        let field = FieldDescriptor::flag("param_I", ValueType::Bool).with_short('i');
        assert!(!field.takes_value());
    }

    #[test]
    fn test_positionals_sorted_by_position() {
        let cmd = CommandDescriptor::new("program")
            .with_field(FieldDescriptor::positional("b", ValueType::String, 2))
            .with_field(FieldDescriptor::flag("x", ValueType::Bool).with_short('x'))
            .with_field(FieldDescriptor::positional("a", ValueType::String, 1));

        let names: Vec<&str> = cmd.positionals().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(cmd.flags().count(), 1);
    }

    #[test]
    fn test_default_value_compiles_literal() {
        let field = FieldDescriptor::flag("paramA", ValueType::String)
            .with_long("a-long-param")
            .with_default("// tricky default value");
        assert_eq!(
            field.default_value().unwrap(),
            Some(Value::String("// tricky default value".to_string()))
        );

        let bad = FieldDescriptor::flag("n", ValueType::UInt32).with_long("n").with_default("-1");
        assert!(bad.default_value().is_err());
    }

    #[test]
    fn test_descriptor_serde_field_names() {
        let json = r#"{
            "name": "program",
            "fields": [
                {"name": "count", "type": "uint64", "long": "count", "required": true, "default": "1"},
                {"name": "flags", "type": "bool", "kind": "repeated", "long": "flags"}
            ]
        }"#;
        let cmd: CommandDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(cmd.fields[0].value_type, ValueType::UInt64);
        assert!(cmd.fields[0].required);
        assert_eq!(cmd.fields[1].kind, FieldKind::Repeated);
        assert!(cmd.subcommands.is_empty());
    }
}
