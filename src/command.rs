//! Command invocation planning.
//!
//! A raw command string is executed one of two ways: as a tokenized argv
//! when it splits cleanly into shell words, or handed verbatim to
//! `$SHELL -c` when it carries shell constructs (pipes, redirections,
//! expansions) or does not tokenize at all.

/// Characters that require a shell to interpret the command.
const SHELL_METACHARS: &[char] = &['|', '&', ';', '<', '>', '(', ')', '$', '`', '\n'];

/// How a command string will be executed. Immutable once the session starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// Tokenized word list, executed directly (argv[0] is the program).
    Argv(Vec<String>),
    /// Raw string handed to `$SHELL -c`.
    Shell(String),
}

impl Invocation {
    /// Plan how to execute `command`.
    pub fn parse(command: &str) -> Invocation {
        if command.chars().any(|c| SHELL_METACHARS.contains(&c)) {
            return Invocation::Shell(command.to_string());
        }
        match shlex::split(command) {
            Some(words) if !words.is_empty() => Invocation::Argv(words),
            _ => Invocation::Shell(command.to_string()),
        }
    }
}

/// Returns the user's shell, falling back to `/bin/sh`.
pub fn default_shell() -> String {
    std::env::var("SHELL").unwrap_or_else(|_| "/bin/sh".to_string())
}
