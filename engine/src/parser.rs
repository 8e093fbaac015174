//! Compiled field table and the parse entry point.

use std::collections::HashMap;

use protoargs_core::{
    CommandDescriptor, FieldDescriptor, SchemaError, Value, coerce, normalize_long_flag,
    validate_descriptor,
};
use tracing::debug;

use crate::config::Config;
use crate::error::ParseError;
use crate::tokenizer::{Token, tokenize};
use crate::usage::render_usage;
use crate::validator::Validator;

/// Per-call parse settings.
///
/// # Examples
///
/// ```
/// use protoargs_engine::ParseOptions;
///
/// // Peek at the first argument only, tolerating missing required fields.
/// let options = ParseOptions::new().with_argc(2).allow_incomplete(true);
/// assert_eq!(options.argc, Some(2));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Only the first `argc` entries of argv are examined (program name included).
    pub argc: Option<usize>,
    /// Suppress structural rejections so `help` can be read from a partial parse.
    pub allow_incomplete: bool,
    /// Name used in usage text; defaults to `argv[0]`.
    pub program: Option<String>,
}

impl ParseOptions {
    /// Default options: whole argv, strict validation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Limits parsing to the first `argc` entries.
    pub fn with_argc(mut self, argc: usize) -> Self {
        self.argc = Some(argc);
        self
    }

    /// Enables or disables allow-incomplete mode.
    pub fn allow_incomplete(mut self, allow: bool) -> Self {
        self.allow_incomplete = allow;
        self
    }

    /// Overrides the program name.
    pub fn with_program(mut self, program: &str) -> Self {
        self.program = Some(program.to_string());
        self
    }
}

/// Parsing engine for one command level, compiled from a [`CommandDescriptor`].
///
/// A `Parser` is immutable once built; share it freely between parse calls
/// and threads. Nested subcommands are compiled alongside their parent and
/// reached with [`Parser::subcommand`].
///
/// # Examples
///
/// ```
/// use protoargs_core::{CommandDescriptor, FieldDescriptor, ValueType};
/// use protoargs_engine::Parser;
///
/// let descriptor = CommandDescriptor::new("program")
///     .with_field(FieldDescriptor::flag("count", ValueType::UInt64).with_long("count").with_default("1"))
///     .with_field(FieldDescriptor::flag("paramF", ValueType::Int32).with_short('f').repeated());
/// let parser = Parser::new(&descriptor).unwrap();
///
/// let config = parser.parse(&["program", "-f", "1", "-f", "2", "-f", "3"]).unwrap();
/// assert_eq!(config.get_all::<i32>("paramF").unwrap(), vec![1, 2, 3]);
/// assert!(!config.has("count"));
/// assert_eq!(config.get::<u64>("count").unwrap(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct Parser {
    descriptor: CommandDescriptor,
    defaults: Vec<Option<Value>>,
    shorts: HashMap<char, usize>,
    longs: HashMap<String, usize>,
    positionals: Vec<usize>,
    subcommands: Vec<Parser>,
}

impl Parser {
    /// Validates and compiles a descriptor tree.
    ///
    /// # Errors
    ///
    /// Returns the first [`SchemaError`] found in the descriptor or any of
    /// its subcommands.
    pub fn new(descriptor: &CommandDescriptor) -> Result<Self, SchemaError> {
        if let Some(err) = validate_descriptor(descriptor).into_iter().next() {
            return Err(err);
        }
        Ok(Self::compile(descriptor))
    }

    fn compile(descriptor: &CommandDescriptor) -> Self {
        let mut shorts = HashMap::new();
        let mut longs = HashMap::new();
        let mut defaults = Vec::with_capacity(descriptor.fields.len());

        for (index, field) in descriptor.fields.iter().enumerate() {
            if let Some(short) = field.short {
                shorts.insert(short, index);
            }
            if let Some(long) = &field.long {
                longs.insert(normalize_long_flag(long), index);
            }
            // Literals were checked by validate_descriptor.
            defaults.push(field.default_value().ok().flatten());
        }

        let mut positionals: Vec<usize> = descriptor
            .fields
            .iter()
            .enumerate()
            .filter(|(_, f)| f.is_positional())
            .map(|(index, _)| index)
            .collect();
        positionals.sort_by_key(|&index| descriptor.fields[index].position);

        let subcommands = descriptor.subcommands.iter().map(Self::compile).collect();

        debug!(
            command = %descriptor.name,
            fields = descriptor.fields.len(),
            positionals = positionals.len(),
            subcommands = descriptor.subcommands.len(),
            "Compiled field table"
        );

        Self {
            descriptor: level(descriptor),
            defaults,
            shorts,
            longs,
            positionals,
            subcommands,
        }
    }

    /// This level of the descriptor it was compiled from.
    ///
    /// Subcommand entries carry only their name and description; the full
    /// child descriptor lives on [`Parser::subcommand`].
    pub fn descriptor(&self) -> &CommandDescriptor {
        &self.descriptor
    }

    /// Command name from the descriptor.
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    /// Compiled parser of a direct subcommand.
    pub fn subcommand(&self, name: &str) -> Option<&Parser> {
        self.subcommands.iter().find(|sub| sub.name() == name)
    }

    /// Renders usage text for this command level.
    ///
    /// Pure: does not need, or affect, any parse call.
    pub fn usage(&self, program: &str) -> String {
        render_usage(&self.descriptor, program)
    }

    /// Parses a full argv (`argv[0]` is the program name) with default options.
    ///
    /// # Errors
    ///
    /// See [`Parser::parse_with`].
    pub fn parse<S: AsRef<str>>(&self, argv: &[S]) -> Result<Config, ParseError> {
        self.parse_with(argv, &ParseOptions::default())
    }

    /// Parses argv into a validated [`Config`].
    ///
    /// `-h`/`--help` always yields `Ok` with [`Config::help`] set. Values that
    /// fail type coercion are rejected even in allow-incomplete mode; missing
    /// required fields, missing flag values, unknown flags and unknown
    /// subcommands are rejected only in strict mode.
    ///
    /// # Errors
    ///
    /// The first [`ParseError`] found, in this order: coercion failures,
    /// token-level problems in argv order, missing required fields in
    /// declaration order, missing subcommand.
    pub fn parse_with<S: AsRef<str>>(
        &self,
        argv: &[S],
        options: &ParseOptions,
    ) -> Result<Config, ParseError> {
        let argc = options.argc.map_or(argv.len(), |argc| argc.min(argv.len()));
        let argv = &argv[..argc];
        let program = options
            .program
            .clone()
            .or_else(|| argv.first().map(|arg| arg.as_ref().to_string()))
            .unwrap_or_else(|| self.descriptor.name.clone());

        let tokens = tokenize(self, argv);
        let mut config = Config::new(program, &self.descriptor, &self.defaults);
        let mut validator = Validator::new(options.allow_incomplete);
        config.help = tokens.help;

        let mut slot = 0;
        for token in tokens.tokens {
            match token {
                Token::FlagValue { field, raw, .. } => {
                    self.apply(&mut config, &mut validator, field, &raw);
                }
                Token::FlagBool { field, literal, .. } => match literal {
                    Some(raw) => self.apply(&mut config, &mut validator, field, &raw),
                    None => config.record(field, Value::Bool(true)),
                },
                Token::Positional(raw) => match self.positionals.get(slot) {
                    Some(&field) => {
                        self.apply(&mut config, &mut validator, field, &raw);
                        if !self.descriptor.fields[field].is_repeated() {
                            slot += 1;
                        }
                    }
                    None => {
                        debug!(token = %raw, "Ignoring excess positional");
                        config.ignored.push(raw);
                    }
                },
                Token::Unrecognized(raw) => {
                    config.unrecognized.push(raw.clone());
                    validator.structural(ParseError::UnrecognizedToken(raw));
                }
                Token::MissingValue { flag, .. } => {
                    validator.structural(ParseError::MissingValue { flag });
                }
                Token::UnknownSubcommand(name) => {
                    validator.structural(ParseError::SubcommandUnknown {
                        name,
                        choices: self.choices(),
                    });
                }
            }
        }

        if let Some((index, name)) = tokens.subcommand {
            config.command = Some(name);
            config.command_index = Some(index);
        }

        validator.finish(self, config)
    }

    fn apply(&self, config: &mut Config, validator: &mut Validator, field: usize, raw: &str) {
        let descriptor = &self.descriptor.fields[field];
        match coerce(raw, descriptor.value_type) {
            Ok(value) => config.record(field, value),
            Err(err) => {
                debug!(field = %descriptor.name, error = %err, "Coercion failed");
                validator.coercion_failure(ParseError::TypeCoercionFailure {
                    field: descriptor.name.clone(),
                    value: raw.to_string(),
                    expected: descriptor.value_type,
                });
            }
        }
    }

    pub(crate) fn field(&self, index: usize) -> &FieldDescriptor {
        &self.descriptor.fields[index]
    }

    pub(crate) fn default_at(&self, index: usize) -> Option<&Value> {
        self.defaults.get(index).and_then(Option::as_ref)
    }

    pub(crate) fn lookup_short(&self, short: char) -> Option<usize> {
        self.shorts.get(&short).copied()
    }

    pub(crate) fn lookup_long(&self, long: &str) -> Option<usize> {
        self.longs.get(&normalize_long_flag(long)).copied()
    }

    pub(crate) fn has_subcommands(&self) -> bool {
        !self.subcommands.is_empty()
    }

    pub(crate) fn choices(&self) -> String {
        self.descriptor.subcommand_names().join(", ")
    }
}

/// Copies one command level, reducing subcommands to what usage needs.
fn level(descriptor: &CommandDescriptor) -> CommandDescriptor {
    let summary = |sub: &CommandDescriptor| CommandDescriptor {
        schema_version: None,
        name: sub.name.clone(),
        description: sub.description.clone(),
        fields: Vec::new(),
        subcommands: Vec::new(),
    };
    CommandDescriptor {
        schema_version: descriptor.schema_version.clone(),
        name: descriptor.name.clone(),
        description: descriptor.description.clone(),
        fields: descriptor.fields.clone(),
        subcommands: descriptor.subcommands.iter().map(summary).collect(),
    }
}
