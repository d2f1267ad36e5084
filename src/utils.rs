//! # Utility Functions Module
//!
//! Small helpers shared by the encoder backends: argument-vector building
//! and rendering a command line the way a user would paste it in a shell.

/// Builds a `Vec<String>` from heterogeneous displayable expressions.
///
/// ```rust
/// use asset_optimizer::args;
///
/// let quality = 80;
/// let args = args!["-s", "formatOptions", quality];
/// assert_eq!(args, vec!["-s", "formatOptions", "80"]);
/// ```
#[macro_export]
macro_rules! args {
    [$($item:expr),* $(,)?] => {
        vec![$($item.to_string()),*]
    };
}

/// Quotes a single argument for POSIX shells, leaving safe words untouched.
pub fn shell_quote(arg: &str) -> String {
    let is_safe = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "@%+=:,./-_".contains(c));

    if is_safe {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', "'\"'\"'"))
    }
}

/// Renders a program plus its arguments as one copy-pasteable shell line.
pub fn shell_join<S: AsRef<str>>(program: &str, args: &[S]) -> String {
    std::iter::once(shell_quote(program))
        .chain(args.iter().map(|arg| shell_quote(arg.as_ref())))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Layout used when an external command fails: the command, then both streams.
pub fn format_diagnostics(command: &str, stdout: &str, stderr: &str) -> String {
    format!("$ {command}\n\nstdout:\n{stdout}\n\nstderr:\n{stderr}\n")
}
