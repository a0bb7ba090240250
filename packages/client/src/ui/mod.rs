//! Terminal UI: formatting, prompts and the runner that drives a session.

mod formatter;
mod input;
mod prompt;
mod runner;

pub use formatter::MessageFormatter;
pub use prompt::prompt_nickname;
pub use runner::run_client;
