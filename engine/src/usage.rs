//! Usage and help text.
//!
//! Layout follows the familiar argparse style: a wrapped synopsis, the
//! command description, then positional arguments and options with their
//! help in a column. Output depends only on the descriptor and program name.

use protoargs_core::{CommandDescriptor, FieldDescriptor};

const WIDTH: usize = 80;
const HELP_COLUMN: usize = 24;

/// Renders usage text for one command level.
///
/// # Examples
///
/// ```
/// use protoargs_core::{CommandDescriptor, FieldDescriptor, ValueType};
/// use protoargs_engine::render_usage;
///
/// let copy = CommandDescriptor::new("copy")
///     .with_field(FieldDescriptor::flag("recursive", ValueType::Bool).with_short('r').with_long("recursive"))
///     .with_field(FieldDescriptor::positional("SRC", ValueType::String, 1).required())
///     .with_field(FieldDescriptor::positional("DST", ValueType::String, 2).required());
///
/// let usage = render_usage(&copy, "program copy");
/// assert!(usage.starts_with("usage: program copy [-h] [-r] SRC DST\n"));
/// assert!(usage.contains("  -r, --recursive"));
/// ```
pub fn render_usage(descriptor: &CommandDescriptor, program: &str) -> String {
    let mut out = synopsis(descriptor, program);

    if let Some(description) = &descriptor.description {
        out.push('\n');
        out.push_str(description.trim_end());
        out.push('\n');
    }

    let positionals = descriptor.positionals();
    if !positionals.is_empty() || !descriptor.subcommands.is_empty() {
        out.push_str("\npositional arguments:\n");
        if !descriptor.subcommands.is_empty() {
            let choices = format!("{{{}}}", descriptor.subcommand_names().join(","));
            entry(&mut out, 2, &choices, None);
            for sub in &descriptor.subcommands {
                entry(&mut out, 4, &sub.name, sub.description.as_deref());
            }
        }
        for field in positionals {
            entry(&mut out, 2, field.metavar(), Some(&field_help(field)));
        }
    }

    out.push_str("\noptions:\n");
    entry(&mut out, 2, "-h, --help", Some("show this help message and exit"));
    for field in descriptor.flags() {
        entry(&mut out, 2, &invocation(field), Some(&field_help(field)));
    }

    out
}

fn synopsis(descriptor: &CommandDescriptor, program: &str) -> String {
    let mut items = vec!["[-h]".to_string()];

    for field in descriptor.flags() {
        let flag = match (field.short, &field.long) {
            (Some(short), _) => format!("-{short}"),
            (None, Some(long)) => format!("--{long}"),
            (None, None) => continue,
        };
        let body = if field.takes_value() {
            format!("{flag} {}", field.metavar())
        } else {
            flag
        };
        items.push(arity(&body, field.required, field.is_repeated()));
    }

    if !descriptor.subcommands.is_empty() {
        items.push(format!("{{{}}} ...", descriptor.subcommand_names().join(",")));
    }

    for field in descriptor.positionals() {
        items.push(arity(field.metavar(), field.required, field.is_repeated()));
    }

    let prefix = format!("usage: {program} ");
    let mut lines = Vec::new();
    let mut line = prefix.clone();
    for item in items {
        if line.len() > prefix.len() && line.len() + item.len() > WIDTH {
            lines.push(line.trim_end().to_string());
            line = " ".repeat(prefix.len());
        }
        line.push_str(&item);
        line.push(' ');
    }
    lines.push(line.trim_end().to_string());

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn arity(body: &str, required: bool, repeated: bool) -> String {
    match (required, repeated) {
        (true, false) => body.to_string(),
        (true, true) => format!("{body} [{body} ...]"),
        (false, false) => format!("[{body}]"),
        (false, true) => format!("[{body} ...]"),
    }
}

fn invocation(field: &FieldDescriptor) -> String {
    let value = if field.takes_value() {
        format!(" {}", field.metavar())
    } else {
        String::new()
    };
    let mut parts = Vec::new();
    if let Some(short) = field.short {
        parts.push(format!("-{short}{value}"));
    }
    if let Some(long) = &field.long {
        parts.push(format!("--{long}{value}"));
    }
    parts.join(", ")
}

fn field_help(field: &FieldDescriptor) -> String {
    let mut notes = vec![field.value_type.to_string()];
    if field.is_repeated() {
        notes.push("repeated".to_string());
    }
    notes.push(if field.required { "required" } else { "optional" }.to_string());
    if let Some(default) = &field.default {
        notes.push(format!("default: {default}"));
    }

    match field.description.as_deref().map(str::trim) {
        Some(description) if !description.is_empty() => {
            format!("{description} ({})", notes.join(", "))
        }
        _ => format!("({})", notes.join(", ")),
    }
}

fn entry(out: &mut String, indent: usize, invocation: &str, help: Option<&str>) {
    let left = format!("{:indent$}{invocation}", "");
    let Some(help) = help else {
        out.push_str(&left);
        out.push('\n');
        return;
    };

    let lines = wrap(help, WIDTH - HELP_COLUMN);
    let mut lines = lines.iter();
    if left.len() + 2 <= HELP_COLUMN {
        if let Some(first) = lines.next() {
            out.push_str(&format!("{left:<width$}{first}\n", width = HELP_COLUMN));
        }
    } else {
        out.push_str(&left);
        out.push('\n');
    }
    for line in lines {
        out.push_str(&format!("{:width$}{line}\n", "", width = HELP_COLUMN));
    }
}

fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        if !line.is_empty() && line.len() + 1 + word.len() > width {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(word);
    }
    if !line.is_empty() || lines.is_empty() {
        lines.push(line);
    }
    lines
}

#[cfg(test)]
mod tests {
    use protoargs_core::ValueType;

    use super::*;

    #[test]
    fn test_field_lines_show_type_requirement_default() {
        let cmd = CommandDescriptor::new("program")
            .with_field(
                FieldDescriptor::flag("paramB", ValueType::UInt32)
                    .with_long("b-long-param")
                    .with_default("10")
                    .with_description("Integer param"),
            )
            .with_field(FieldDescriptor::flag("paramE", ValueType::String).with_short('e').required());

        let usage = render_usage(&cmd, "program");
        assert!(usage.starts_with("usage: program [-h] [--b-long-param paramB] -e paramE\n"));
        assert!(usage.contains(
            "  --b-long-param paramB\n                        Integer param (uint32, optional, default: 10)\n"
        ));
        assert!(usage.contains("  -e paramE             (string, required)\n"));
    }

    #[test]
    fn test_repeated_positional_and_subcommands() {
        let leaf = CommandDescriptor::new("program")
            .with_field(FieldDescriptor::positional("PARAMH", ValueType::String, 1).repeated().required());
        assert!(render_usage(&leaf, "program").starts_with("usage: program [-h] PARAMH [PARAMH ...]\n"));

        let multi = CommandDescriptor::new("program")
            .with_description("Useful multi command")
            .with_subcommand(CommandDescriptor::new("create").with_description("Create file"))
            .with_subcommand(CommandDescriptor::new("copy"));
        let usage = render_usage(&multi, "program");
        assert!(usage.starts_with("usage: program [-h] {create,copy} ...\n\nUseful multi command\n"));
        assert!(usage.contains("  {create,copy}\n    create              Create file\n    copy\n"));
    }

    #[test]
    fn test_metavar_replaces_field_name() {
        let cmd = CommandDescriptor::new("program")
            .with_field(
                FieldDescriptor::flag("size", ValueType::UInt64)
                    .with_short('s')
                    .with_long("size")
                    .with_metavar("BYTES"),
            )
            .with_field(
                FieldDescriptor::positional("path", ValueType::String, 1)
                    .required()
                    .with_metavar("FILE"),
            );

        let usage = render_usage(&cmd, "program");
        assert!(usage.starts_with("usage: program [-h] [-s BYTES] FILE\n"));
        assert!(usage.contains("  -s BYTES, --size BYTES\n"));
        assert!(usage.contains(&format!("{:<24}(string, required)\n", "  FILE")));
        assert!(!usage.contains("path"));
    }

    #[test]
    fn test_synopsis_wraps_at_width() {
        let mut cmd = CommandDescriptor::new("program");
        for i in 0..12 {
            let name = format!("option{i}");
            cmd = cmd.with_field(FieldDescriptor::flag(&name, ValueType::String).with_long(&name));
        }
        let usage = render_usage(&cmd, "program");
        let synopsis: Vec<&str> = usage.lines().take_while(|line| !line.is_empty()).collect();
        assert!(synopsis.len() > 1);
        assert!(synopsis.iter().all(|line| line.len() <= WIDTH));
        assert!(synopsis[1].starts_with("               ["));
    }

    #[test]
    fn test_wrap() {
        assert_eq!(wrap("a bb ccc", 4), vec!["a bb", "ccc"]);
        assert_eq!(wrap("", 10), vec![""]);
    }
}
