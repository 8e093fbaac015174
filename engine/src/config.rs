//! Parsed configuration and its typed accessors.

use protoargs_core::{CommandDescriptor, Value, ValueType};
use serde::de::DeserializeOwned;
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::AccessError;

/// Rust types a field value can be read as.
pub trait FromValue: Sized {
    /// Name used in [`AccessError::TypeMismatch`].
    const TYPE_NAME: &'static str;

    /// Extracts `Self`, or `None` if the value holds another type.
    fn from_value(value: &Value) -> Option<Self>;
}

impl FromValue for String {
    const TYPE_NAME: &'static str = "String";

    fn from_value(value: &Value) -> Option<Self> {
        value.as_str().map(str::to_string)
    }
}

impl FromValue for bool {
    const TYPE_NAME: &'static str = "bool";

    fn from_value(value: &Value) -> Option<Self> {
        value.as_bool()
    }
}

impl FromValue for u64 {
    const TYPE_NAME: &'static str = "u64";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::UInt(v) => Some(*v),
            _ => None,
        }
    }
}

impl FromValue for u32 {
    const TYPE_NAME: &'static str = "u32";

    fn from_value(value: &Value) -> Option<Self> {
        u64::from_value(value).and_then(|v| u32::try_from(v).ok())
    }
}

impl FromValue for i64 {
    const TYPE_NAME: &'static str = "i64";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }
}

impl FromValue for i32 {
    const TYPE_NAME: &'static str = "i32";

    fn from_value(value: &Value) -> Option<Self> {
        i64::from_value(value).and_then(|v| i32::try_from(v).ok())
    }
}

impl FromValue for f32 {
    const TYPE_NAME: &'static str = "f32";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }
}

impl FromValue for f64 {
    const TYPE_NAME: &'static str = "f64";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Double(v) => Some(*v),
            Value::Float(v) => Some(f64::from(*v)),
            _ => None,
        }
    }
}

impl FromValue for Value {
    const TYPE_NAME: &'static str = "Value";

    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Slot {
    name: String,
    value_type: ValueType,
    repeated: bool,
    default: Option<Value>,
    values: Vec<Value>,
}

impl Slot {
    /// Explicit value, else the default.
    fn current(&self) -> Option<&Value> {
        self.values.last().or(self.default.as_ref())
    }
}

/// The configuration produced by a successful parse.
///
/// One slot per declared field: scalar slots hold at most one explicit value
/// (the last one supplied), repeated slots keep every value in argv order.
/// Built fresh by every parse call and owned by the caller.
///
/// Serializes as a map from field name to value: repeated fields as arrays,
/// scalar fields as their explicit or default value, and unset scalar fields
/// without a default omitted.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub(crate) program: String,
    pub(crate) help: bool,
    pub(crate) command: Option<String>,
    pub(crate) command_index: Option<usize>,
    pub(crate) ignored: Vec<String>,
    pub(crate) unrecognized: Vec<String>,
    slots: Vec<Slot>,
}

impl Config {
    pub(crate) fn new(program: String, descriptor: &CommandDescriptor, defaults: &[Option<Value>]) -> Self {
        let slots = descriptor
            .fields
            .iter()
            .zip(defaults)
            .map(|(field, default)| Slot {
                name: field.name.clone(),
                value_type: field.value_type,
                repeated: field.is_repeated(),
                default: default.clone(),
                values: Vec::new(),
            })
            .collect();

        Self {
            program,
            help: false,
            command: None,
            command_index: None,
            ignored: Vec::new(),
            unrecognized: Vec::new(),
            slots,
        }
    }

    /// Appends to a repeated slot, overwrites a scalar one.
    pub(crate) fn record(&mut self, field: usize, value: Value) {
        let slot = &mut self.slots[field];
        if !slot.repeated {
            slot.values.clear();
        }
        slot.values.push(value);
    }

    pub(crate) fn explicit_count(&self, field: usize) -> usize {
        self.slots.get(field).map_or(0, |slot| slot.values.len())
    }

    pub(crate) fn command_index(&self) -> Option<usize> {
        self.command_index
    }

    fn slot(&self, name: &str) -> Result<&Slot, AccessError> {
        self.slots
            .iter()
            .find(|slot| slot.name == name)
            .ok_or_else(|| AccessError::UnknownField(name.to_string()))
    }

    /// Program name used for this command level.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// `-h`/`--help` was given.
    pub fn help(&self) -> bool {
        self.help
    }

    /// Subcommand selected at this level, if any.
    pub fn command(&self) -> Option<&str> {
        self.command.as_deref()
    }

    /// Positional tokens beyond the declared slots.
    pub fn ignored(&self) -> &[String] {
        &self.ignored
    }

    /// Flag-like tokens that matched no field (only non-empty in
    /// allow-incomplete mode, since strict mode rejects them).
    pub fn unrecognized(&self) -> &[String] {
        &self.unrecognized
    }

    /// `true` only if the field was supplied on the command line; a default
    /// does not count. Unknown fields report `false`.
    pub fn has(&self, name: &str) -> bool {
        self.slot(name).is_ok_and(|slot| !slot.values.is_empty())
    }

    /// Number of explicit values (0 or 1 for scalar fields).
    pub fn count(&self, name: &str) -> usize {
        self.slot(name).map_or(0, |slot| slot.values.len())
    }

    /// Current value of a scalar field: explicit, else default.
    ///
    /// Returns `None` for unset fields without a default, repeated fields
    /// and unknown names.
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.slot(name)
            .ok()
            .filter(|slot| !slot.repeated)
            .and_then(Slot::current)
    }

    /// Reads a scalar field: explicit value, else default, else the type's
    /// zero value.
    ///
    /// # Errors
    ///
    /// [`AccessError::UnknownField`], [`AccessError::NotScalar`] for repeated
    /// fields, [`AccessError::TypeMismatch`] if `T` cannot hold the field's type.
    ///
    /// # Examples
    ///
    /// ```
    /// use protoargs_core::{CommandDescriptor, FieldDescriptor, ValueType};
    /// use protoargs_engine::Parser;
    ///
    /// let parser = Parser::new(
    ///     &CommandDescriptor::new("program")
    ///         .with_field(FieldDescriptor::flag("paramC", ValueType::Int32).with_short('c')),
    /// )
    /// .unwrap();
    /// let config = parser.parse(&["program"]).unwrap();
    /// assert_eq!(config.get::<i32>("paramC").unwrap(), 0);
    /// assert!(config.get::<String>("paramC").is_err());
    /// ```
    pub fn get<T: FromValue>(&self, name: &str) -> Result<T, AccessError> {
        let slot = self.slot(name)?;
        if slot.repeated {
            return Err(AccessError::NotScalar(name.to_string()));
        }
        let zero;
        let value = match slot.current() {
            Some(value) => value,
            None => {
                zero = Value::zero(slot.value_type);
                &zero
            }
        };
        T::from_value(value).ok_or_else(|| mismatch::<T>(slot))
    }

    /// Reads every value of a repeated field, in argv order.
    ///
    /// # Errors
    ///
    /// [`AccessError::UnknownField`], [`AccessError::NotRepeated`] for scalar
    /// fields, [`AccessError::TypeMismatch`] if `T` cannot hold the field's type.
    pub fn get_all<T: FromValue>(&self, name: &str) -> Result<Vec<T>, AccessError> {
        let slot = self.slot(name)?;
        if !slot.repeated {
            return Err(AccessError::NotRepeated(name.to_string()));
        }
        slot.values
            .iter()
            .map(|value| T::from_value(value).ok_or_else(|| mismatch::<T>(slot)))
            .collect()
    }

    /// Decodes the configuration into a user-defined struct.
    ///
    /// Field names map to struct fields through serde, so rename attributes
    /// work as usual.
    ///
    /// # Errors
    ///
    /// [`AccessError::Decode`] if the values do not fit `T`.
    ///
    /// # Examples
    ///
    /// ```
    /// use protoargs_core::{CommandDescriptor, FieldDescriptor, ValueType};
    /// use protoargs_engine::Parser;
    ///
    /// #[derive(serde::Deserialize)]
    /// struct Create {
    ///     size: u64,
    ///     path: String,
    /// }
    ///
    /// let parser = Parser::new(
    ///     &CommandDescriptor::new("create")
    ///         .with_field(FieldDescriptor::flag("size", ValueType::UInt64).with_short('s').with_default("0"))
    ///         .with_field(FieldDescriptor::positional("path", ValueType::String, 1).required()),
    /// )
    /// .unwrap();
    /// let create: Create = parser.parse(&["create", "/tmp/f"]).unwrap().decode().unwrap();
    /// assert_eq!((create.size, create.path.as_str()), (0, "/tmp/f"));
    /// ```
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, AccessError> {
        let value = serde_json::to_value(self)?;
        Ok(serde_json::from_value(value)?)
    }
}

fn mismatch<T: FromValue>(slot: &Slot) -> AccessError {
    AccessError::TypeMismatch {
        field: slot.name.clone(),
        actual: slot.value_type,
        requested: T::TYPE_NAME,
    }
}

impl Serialize for Config {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for slot in &self.slots {
            if slot.repeated {
                map.serialize_entry(&slot.name, &slot.values)?;
            } else if let Some(value) = slot.current() {
                map.serialize_entry(&slot.name, value)?;
            }
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use protoargs_core::FieldDescriptor;

    use super::*;
    use crate::Parser;

    fn parser() -> Parser {
        Parser::new(
            &CommandDescriptor::new("program")
                .with_field(FieldDescriptor::flag("count", ValueType::UInt32).with_long("count").with_default("10"))
                .with_field(FieldDescriptor::flag("ratio", ValueType::Float).with_short('r'))
                .with_field(FieldDescriptor::flag("tags", ValueType::String).with_short('t').repeated())
                .with_field(FieldDescriptor::flag("name", ValueType::String).with_short('n')),
        )
        .unwrap()
    }

    #[test]
    fn test_presence_vs_default() {
        let config = parser().parse(&["program"]).unwrap();
        assert!(!config.has("count"));
        assert_eq!(config.value("count"), Some(&Value::UInt(10)));
        assert_eq!(config.get::<u32>("count").unwrap(), 10);
        assert_eq!(config.value("name"), None);
        assert_eq!(config.get::<String>("name").unwrap(), "");
        assert_eq!(config.count("tags"), 0);
        assert!(!config.has("missing"));
    }

    #[test]
    fn test_float_widens_to_f64() {
        let config = parser().parse(&["program", "-r", "0.5"]).unwrap();
        assert_eq!(config.get::<f32>("ratio").unwrap(), 0.5);
        assert_eq!(config.get::<f64>("ratio").unwrap(), 0.5);
    }

    #[test]
    fn test_access_errors() {
        let config = parser().parse(&["program", "-t", "a"]).unwrap();
        assert!(matches!(config.get::<u32>("nope"), Err(AccessError::UnknownField(_))));
        assert!(matches!(config.get::<String>("tags"), Err(AccessError::NotScalar(_))));
        assert!(matches!(config.get_all::<String>("name"), Err(AccessError::NotRepeated(_))));
        assert!(matches!(
            config.get::<i64>("count"),
            Err(AccessError::TypeMismatch { requested: "i64", actual: ValueType::UInt32, .. })
        ));
    }

    #[test]
    fn test_serialize_omits_unset_scalars() {
        let config = parser().parse(&["program", "-t", "a", "-t", "b"]).unwrap();
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json, serde_json::json!({"count": 10, "tags": ["a", "b"]}));
    }
}
