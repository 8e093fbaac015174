//! Argv exclusion for handing a slice of argv to a nested command.

/// Returns the first `argc` entries of `argv` without the given positions.
///
/// Positions are 1-based argument positions: position 1 is the program name
/// and is always kept, position 2 is the first argument. Position 0 and
/// positions past `argc` are ignored, so callers can pass a generic
/// "command position plus N more" set. `argc` is clamped to `argv.len()`.
/// The returned vector's length is the filtered argc.
///
/// # Examples
///
/// ```
/// use protoargs_engine::exclude;
///
/// let argv = ["program", "create", "-s", "2048", "/tmp/f"];
/// assert_eq!(exclude(argv.len(), &argv, &[2, 50]), vec!["program", "-s", "2048", "/tmp/f"]);
/// ```
pub fn exclude<S: AsRef<str>>(argc: usize, argv: &[S], positions: &[usize]) -> Vec<String> {
    let argc = argc.min(argv.len());
    argv[..argc]
        .iter()
        .enumerate()
        .filter(|(index, _)| *index == 0 || !positions.contains(&(index + 1)))
        .map(|(_, arg)| arg.as_ref().to_string())
        .collect()
}
