//! Prompt helpers for the terminal.

use std::io::Write;

use rustyline::{DefaultEditor, error::ReadlineError};

use crate::domain::{ClientError, Nickname};

/// Redisplay the prompt after printing a message
pub fn redisplay_prompt(nickname: &Nickname) {
    print!("{}> ", nickname);
    std::io::stdout().flush().ok();
}

/// Ask for a nickname until a valid one is entered.
///
/// Ctrl+C / Ctrl+D abort with an error.
pub fn prompt_nickname() -> Result<Nickname, ClientError> {
    let mut rl = DefaultEditor::new()
        .map_err(|e| ClientError::InvalidConfig(format!("failed to initialize readline: {}", e)))?;

    loop {
        match rl.readline("Enter your nickname: ") {
            Ok(line) => match Nickname::new(&line) {
                Ok(nickname) => return Ok(nickname),
                Err(e) => println!("{}", e),
            },
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => {
                return Err(ClientError::InvalidConfig("no nickname given".to_string()));
            }
            Err(e) => {
                return Err(ClientError::InvalidConfig(format!("readline error: {}", e)));
            }
        }
    }
}
