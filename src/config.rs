// ABOUTME: Constants for the driver: version, prompt, history file

pub const VERSION: &str = "0.1.0";

/// Printed before each interactive read.
pub const PROMPT: &str = " * ";

/// REPL line history, persisted across sessions.
pub const HISTORY_FILE: &str = ".schemer_history";
