//! Classifies raw argv tokens against a compiled field table.
//!
//! The tokenizer scans left to right with no lookahead beyond the value of a
//! flag. It never fails: tokens it cannot place are reported as
//! [`Token::Unrecognized`] or [`Token::MissingValue`] and the validator decides
//! what they mean.
//!
//! Conventions:
//!
//! - `--name` and `--name=value` match long aliases, with `-`/`_` treated alike.
//! - `-x` matches a short alias; `-5`, `-.5` and a lone `-` are values.
//! - `-h` and `--help` are always the help flag.
//! - A bool flag takes a directly following `true`/`false` as its literal.
//! - `--` ends flag processing.
//! - For commands with subcommands, the first non-flag token names the
//!   subcommand and stops the scan; the rest of argv belongs to the child.

use protoargs_core::{HELP_LONG, HELP_SHORT};
use tracing::debug;

use crate::Parser;

/// One classified argv event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Value-taking flag followed by its raw value.
    FlagValue {
        /// Index of the field in the command's descriptor.
        field: usize,
        /// Flag as spelled on the command line.
        flag: String,
        /// Raw, uncoerced value.
        raw: String,
    },
    /// Bool flag, with an explicit literal if one was given.
    FlagBool {
        /// Index of the field in the command's descriptor.
        field: usize,
        /// Flag as spelled on the command line.
        flag: String,
        /// `true`/`false` following the flag, or the inline `--flag=value`.
        literal: Option<String>,
    },
    /// Non-flag token, assigned to positional slots later.
    Positional(String),
    /// Flag-like token matching no field.
    Unrecognized(String),
    /// Token in the subcommand position that names no subcommand.
    UnknownSubcommand(String),
    /// Value-taking flag with nothing usable after it.
    MissingValue {
        /// Index of the field in the command's descriptor.
        field: usize,
        /// Flag as spelled on the command line.
        flag: String,
    },
}

/// Result of tokenizing one argv.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tokens {
    /// Events in argv order.
    pub tokens: Vec<Token>,
    /// `-h` or `--help` was seen.
    pub help: bool,
    /// Selected subcommand: argv index of the name token, and the name.
    pub subcommand: Option<(usize, String)>,
}

/// Tokenizes `argv`, skipping `argv[0]` (the program name).
///
/// # Examples
///
/// ```
/// use protoargs_core::{CommandDescriptor, FieldDescriptor, ValueType};
/// use protoargs_engine::{Parser, Token, tokenize};
///
/// let parser = Parser::new(
///     &CommandDescriptor::new("program")
///         .with_field(FieldDescriptor::flag("verbose", ValueType::Bool).with_short('v')),
/// )
/// .unwrap();
///
/// let tokens = tokenize(&parser, &["program", "-v", "false", "file", "--nope"]);
/// assert_eq!(
///     tokens.tokens,
///     vec![
///         Token::FlagBool { field: 0, flag: "-v".into(), literal: Some("false".into()) },
///         Token::Positional("file".into()),
///         Token::Unrecognized("--nope".into()),
///     ]
/// );
/// ```
pub fn tokenize<S: AsRef<str>>(parser: &Parser, argv: &[S]) -> Tokens {
    let mut out = Tokens::default();
    let mut only_positionals = false;
    let mut awaiting_subcommand = parser.has_subcommands();
    let mut next = 1;

    while next < argv.len() {
        let index = next;
        let token = argv[index].as_ref();
        next += 1;

        if only_positionals || is_value_like(token) {
            if awaiting_subcommand {
                if parser.subcommand(token).is_some() {
                    debug!(command = %parser.name(), subcommand = token, index, "Selected subcommand");
                    out.subcommand = Some((index, token.to_string()));
                    break;
                }
                debug!(command = %parser.name(), token, "Unknown subcommand");
                out.tokens.push(Token::UnknownSubcommand(token.to_string()));
                awaiting_subcommand = false;
                continue;
            }
            out.tokens.push(Token::Positional(token.to_string()));
            continue;
        }

        if token == "--" {
            only_positionals = true;
            continue;
        }

        if is_help(token) {
            out.help = true;
            continue;
        }

        if let Some(body) = token.strip_prefix("--") {
            let (name, inline) = match body.split_once('=') {
                Some((name, value)) => (name, Some(value)),
                None => (body, None),
            };
            match parser.lookup_long(name) {
                Some(field) => {
                    let flag = format!("--{name}");
                    next = consume_flag(parser, argv, next, field, flag, inline, &mut out.tokens);
                }
                None => unrecognized(&mut out.tokens, token),
            }
            continue;
        }

        let mut chars = token[1..].chars();
        let lookup = match (chars.next(), chars.next()) {
            (Some(short), None) => parser.lookup_short(short),
            _ => None,
        };
        match lookup {
            Some(field) => {
                next = consume_flag(parser, argv, next, field, token.to_string(), None, &mut out.tokens);
            }
            None => unrecognized(&mut out.tokens, token),
        }
    }

    out
}

fn consume_flag<S: AsRef<str>>(
    parser: &Parser,
    argv: &[S],
    mut next: usize,
    field: usize,
    flag: String,
    inline: Option<&str>,
    tokens: &mut Vec<Token>,
) -> usize {
    let following = argv.get(next).map(AsRef::as_ref);

    if !parser.field(field).takes_value() {
        let literal = match (inline, following) {
            (Some(value), _) => Some(value.to_string()),
            (None, Some(value @ ("true" | "false"))) => {
                next += 1;
                Some(value.to_string())
            }
            (None, _) => None,
        };
        tokens.push(Token::FlagBool { field, flag, literal });
        return next;
    }

    match (inline, following) {
        (Some(value), _) => tokens.push(Token::FlagValue {
            field,
            flag,
            raw: value.to_string(),
        }),
        (None, Some(value)) if is_value_like(value) => {
            next += 1;
            tokens.push(Token::FlagValue {
                field,
                flag,
                raw: value.to_string(),
            });
        }
        (None, _) => {
            debug!(flag = %flag, "Flag is missing its value");
            tokens.push(Token::MissingValue { field, flag });
        }
    }
    next
}

fn unrecognized(tokens: &mut Vec<Token>, token: &str) {
    debug!(token, "Unrecognized token");
    tokens.push(Token::Unrecognized(token.to_string()));
}

fn is_help(token: &str) -> bool {
    match token.strip_prefix("--") {
        Some(long) => long == HELP_LONG,
        None => token.strip_prefix('-').is_some_and(|short| {
            let mut chars = short.chars();
            chars.next() == Some(HELP_SHORT) && chars.next().is_none()
        }),
    }
}

/// Tokens that are data rather than flags: anything not starting with `-`,
/// a lone `-`, and negative numbers like `-5` or `-.5`.
fn is_value_like(token: &str) -> bool {
    match token.strip_prefix('-') {
        None => true,
        Some("") => true,
        Some(rest) => rest.starts_with(|c: char| c.is_ascii_digit() || c == '.'),
    }
}

#[cfg(test)]
mod tests {
    use protoargs_core::{CommandDescriptor, FieldDescriptor, ValueType};

    use super::*;

    fn parser() -> Parser {
        Parser::new(
            &CommandDescriptor::new("program")
                .with_field(FieldDescriptor::flag("size", ValueType::Int64).with_short('s').with_long("size"))
                .with_field(FieldDescriptor::flag("recursive", ValueType::Bool).with_short('r'))
                .with_field(FieldDescriptor::flag("under_score", ValueType::String).with_long("under_score")),
        )
        .unwrap()
    }

    fn multi() -> Parser {
        Parser::new(
            &CommandDescriptor::new("program")
                .with_field(FieldDescriptor::flag("verbose", ValueType::Bool).with_short('v'))
                .with_subcommand(CommandDescriptor::new("create"))
                .with_subcommand(CommandDescriptor::new("copy")),
        )
        .unwrap()
    }

    #[test]
    fn test_negative_numbers_are_values() {
        let tokens = tokenize(&parser(), &["program", "-s", "-5", "-.5", "-"]);
        assert_eq!(
            tokens.tokens,
            vec![
                Token::FlagValue { field: 0, flag: "-s".into(), raw: "-5".into() },
                Token::Positional("-.5".into()),
                Token::Positional("-".into()),
            ]
        );
    }

    #[test]
    fn test_inline_long_value_and_normalization() {
        let tokens = tokenize(&parser(), &["program", "--size=10", "--under-score", "x"]);
        assert_eq!(
            tokens.tokens,
            vec![
                Token::FlagValue { field: 0, flag: "--size".into(), raw: "10".into() },
                Token::FlagValue { field: 2, flag: "--under-score".into(), raw: "x".into() },
            ]
        );
    }

    #[test]
    fn test_missing_value_at_end_or_before_flag() {
        let tokens = tokenize(&parser(), &["program", "-s", "-r", "--size"]);
        assert_eq!(
            tokens.tokens,
            vec![
                Token::MissingValue { field: 0, flag: "-s".into() },
                Token::FlagBool { field: 1, flag: "-r".into(), literal: None },
                Token::MissingValue { field: 0, flag: "--size".into() },
            ]
        );
    }

    #[test]
    fn test_bool_only_takes_literal_true_false() {
        let tokens = tokenize(&parser(), &["program", "-r", "1", "-r", "true"]);
        assert_eq!(
            tokens.tokens,
            vec![
                Token::FlagBool { field: 1, flag: "-r".into(), literal: None },
                Token::Positional("1".into()),
                Token::FlagBool { field: 1, flag: "-r".into(), literal: Some("true".into()) },
            ]
        );
    }

    #[test]
    fn test_help_and_double_dash() {
        let tokens = tokenize(&parser(), &["program", "--", "-h", "--size"]);
        assert!(!tokens.help);
        assert_eq!(
            tokens.tokens,
            vec![Token::Positional("-h".into()), Token::Positional("--size".into())]
        );

        let tokens = tokenize(&parser(), &["program", "--bogus", "--help"]);
        assert!(tokens.help);
        assert_eq!(tokens.tokens, vec![Token::Unrecognized("--bogus".into())]);
    }

    #[test]
    fn test_clustered_short_flags_are_unrecognized() {
        let tokens = tokenize(&parser(), &["program", "-rs"]);
        assert_eq!(tokens.tokens, vec![Token::Unrecognized("-rs".into())]);
    }

    #[test]
    fn test_subcommand_stops_scan() {
        let tokens = tokenize(&multi(), &["program", "-v", "copy", "-h", "a", "b"]);
        assert_eq!(tokens.subcommand, Some((2, "copy".to_string())));
        assert!(!tokens.help);
        assert_eq!(tokens.tokens.len(), 1);
    }

    #[test]
    fn test_unknown_subcommand_keeps_scanning_for_help() {
        let tokens = tokenize(&multi(), &["program", "move", "-h"]);
        assert_eq!(tokens.tokens, vec![Token::UnknownSubcommand("move".into())]);
        assert!(tokens.subcommand.is_none());
        assert!(tokens.help);
    }

    #[test]
    fn test_unknown_subcommand_keeps_argv_order() {
        let tokens = tokenize(&multi(), &["program", "move", "--bogus", "copy"]);
        assert_eq!(
            tokens.tokens,
            vec![
                Token::UnknownSubcommand("move".into()),
                Token::Unrecognized("--bogus".into()),
                Token::Positional("copy".into()),
            ]
        );
        assert!(tokens.subcommand.is_none());
    }
}
