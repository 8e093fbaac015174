//! Walking argv down a subcommand tree.

use tracing::debug;

use crate::config::Config;
use crate::error::ParseError;
use crate::exclude::exclude;
use crate::parser::{ParseOptions, Parser};

/// Parsed configuration of one command level and, if selected, the level below.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    /// Configuration of this level.
    pub config: Config,
    /// The selected subcommand's invocation.
    pub subcommand: Option<Box<Invocation>>,
}

impl Invocation {
    /// Subcommand names from the root down, e.g. `["create"]`.
    pub fn path(&self) -> Vec<&str> {
        let mut path = Vec::new();
        let mut current = self;
        while let Some(sub) = &current.subcommand {
            if let Some(name) = current.config.command() {
                path.push(name);
            }
            current = sub;
        }
        path
    }

    /// Deepest parsed level.
    pub fn leaf(&self) -> &Invocation {
        let mut current = self;
        while let Some(sub) = &current.subcommand {
            current = sub;
        }
        current
    }
}

/// Parses argv at every level of a command tree.
///
/// Each level is parsed with its own [`Parser`]. When a level selects a
/// subcommand at argv index `k`, positions `2..=k+1` (everything between the
/// program name and the subcommand token, inclusive) are excluded and the
/// rest is parsed by the child under the program name `"<parent> <sub>"`.
/// Help at any level stops the descent there.
///
/// `options.argc` bounds the whole argv; `allow_incomplete` applies to every
/// level.
///
/// # Errors
///
/// The first [`ParseError`] from any level.
///
/// # Examples
///
/// ```
/// use protoargs_core::{CommandDescriptor, FieldDescriptor, ValueType};
/// use protoargs_engine::{ParseOptions, Parser, dispatch};
///
/// let create = CommandDescriptor::new("create")
///     .with_field(FieldDescriptor::flag("size", ValueType::UInt64).with_short('s').with_default("0"))
///     .with_field(FieldDescriptor::positional("path", ValueType::String, 1).required());
/// let parser = Parser::new(&CommandDescriptor::new("program").with_subcommand(create)).unwrap();
///
/// let argv = ["program", "create", "-s", "2048", "/tmp/f"];
/// let invocation = dispatch(&parser, &argv, &ParseOptions::new()).unwrap();
/// assert_eq!(invocation.path(), vec!["create"]);
///
/// let leaf = &invocation.leaf().config;
/// assert_eq!(leaf.program(), "program create");
/// assert_eq!(leaf.get::<u64>("size").unwrap(), 2048);
/// ```
pub fn dispatch<S: AsRef<str>>(
    parser: &Parser,
    argv: &[S],
    options: &ParseOptions,
) -> Result<Invocation, ParseError> {
    let argc = options.argc.map_or(argv.len(), |argc| argc.min(argv.len()));
    let argv: Vec<String> = argv[..argc].iter().map(|arg| arg.as_ref().to_string()).collect();
    let root = ParseOptions {
        argc: None,
        ..options.clone()
    };
    let config = parser.parse_with(&argv, &root)?;
    descend(parser, &argv, config, options.allow_incomplete)
}

fn descend(
    parser: &Parser,
    argv: &[String],
    config: Config,
    allow_incomplete: bool,
) -> Result<Invocation, ParseError> {
    let selected = match (config.help(), config.command(), config.command_index()) {
        (false, Some(name), Some(index)) => parser.subcommand(name).map(|child| (child, index)),
        _ => None,
    };
    let Some((child, index)) = selected else {
        return Ok(Invocation {
            config,
            subcommand: None,
        });
    };

    let positions: Vec<usize> = (2..=index + 1).collect();
    let child_argv = exclude(argv.len(), argv, &positions);
    let program = format!("{} {}", config.program(), child.name());
    debug!(program = %program, argv = ?child_argv, "Dispatching to subcommand");

    let options = ParseOptions::new()
        .with_program(&program)
        .allow_incomplete(allow_incomplete);
    let child_config = child.parse_with(&child_argv, &options)?;
    let sub = descend(child, &child_argv, child_config, allow_incomplete)?;

    Ok(Invocation {
        config,
        subcommand: Some(Box::new(sub)),
    })
}
