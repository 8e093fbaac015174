//! Post-accumulation validation.
//!
//! A parse call moves through `Collecting -> Validating -> Accepted | Rejected`.
//! Problems are collected while tokens are applied and judged once the
//! configuration is complete:
//!
//! 1. help requested: accepted, nothing else is checked;
//! 2. a value failed coercion: rejected, in every mode;
//! 3. allow-incomplete mode: accepted;
//! 4. otherwise token problems, missing required fields and a missing
//!    subcommand reject, first found wins.

use tracing::debug;

use crate::Parser;
use crate::config::Config;
use crate::error::ParseError;

#[derive(Debug, Clone, PartialEq, Eq)]
enum State {
    Collecting,
    Validating,
    Accepted,
    Rejected(ParseError),
}

pub(crate) struct Validator {
    allow_incomplete: bool,
    state: State,
    coercion_failures: Vec<ParseError>,
    structural: Vec<ParseError>,
}

impl Validator {
    pub(crate) fn new(allow_incomplete: bool) -> Self {
        Self {
            allow_incomplete,
            state: State::Collecting,
            coercion_failures: Vec::new(),
            structural: Vec::new(),
        }
    }

    pub(crate) fn coercion_failure(&mut self, err: ParseError) {
        debug_assert_eq!(self.state, State::Collecting);
        self.coercion_failures.push(err);
    }

    /// Records a problem that only matters in strict mode.
    pub(crate) fn structural(&mut self, err: ParseError) {
        debug_assert_eq!(self.state, State::Collecting);
        self.structural.push(err);
    }

    pub(crate) fn finish(mut self, parser: &Parser, config: Config) -> Result<Config, ParseError> {
        self.state = State::Validating;
        self.state = self.judge(parser, &config);
        debug!(
            command = %parser.name(),
            help = config.help(),
            allow_incomplete = self.allow_incomplete,
            state = ?self.state,
            "Validated configuration"
        );
        match self.state {
            State::Rejected(err) => Err(err),
            _ => Ok(config),
        }
    }

    fn judge(&mut self, parser: &Parser, config: &Config) -> State {
        if config.help() {
            return State::Accepted;
        }
        if !self.coercion_failures.is_empty() {
            return State::Rejected(self.coercion_failures.swap_remove(0));
        }
        if self.allow_incomplete {
            return State::Accepted;
        }
        if !self.structural.is_empty() {
            return State::Rejected(self.structural.swap_remove(0));
        }
        if let Some(err) = missing_required(parser, config) {
            return State::Rejected(err);
        }
        if parser.has_subcommands() && config.command().is_none() {
            return State::Rejected(ParseError::MissingSubcommand {
                choices: parser.choices(),
            });
        }
        State::Accepted
    }
}

fn missing_required(parser: &Parser, config: &Config) -> Option<ParseError> {
    parser
        .descriptor()
        .fields
        .iter()
        .enumerate()
        .find(|&(index, field)| {
            field.required && config.explicit_count(index) == 0 && parser.default_at(index).is_none()
        })
        .map(|(_, field)| {
            if field.is_positional() {
                ParseError::MissingRequiredPositional {
                    field: field.name.clone(),
                }
            } else {
                ParseError::MissingRequiredField {
                    field: field.name.clone(),
                    flag: field.canonical_flag().unwrap_or_else(|| field.name.clone()),
                }
            }
        })
}
