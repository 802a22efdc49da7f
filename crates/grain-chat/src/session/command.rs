//! The console command language.

use super::error::SessionError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `/j <channel>`
    Join(String),
    /// `/l [channel]`; `None` means the current channel.
    Leave(Option<String>),
    /// `/r`
    RunTask,
    /// `/h`
    History,
    /// `/exit`
    Exit,
    /// Any other non-blank line, sent verbatim.
    Message(String),
    Blank,
}

impl Command {
    /// Parses one input line. Only the first whitespace-separated token selects a command,
    /// so `/join` or `/hello` are ordinary messages.
    pub fn parse(line: &str) -> Result<Command, SessionError> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Ok(Command::Blank);
        }
        let (head, rest) = match trimmed.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (trimmed, ""),
        };
        let argument = (!rest.is_empty()).then(|| rest.to_string());

        match head {
            "/j" => argument
                .map(Command::Join)
                .ok_or_else(|| SessionError::Usage("/j <channel>".to_string())),
            "/l" => Ok(Command::Leave(argument)),
            "/r" => Ok(Command::RunTask),
            "/h" => Ok(Command::History),
            "/exit" => Ok(Command::Exit),
            _ => Ok(Command::Message(line.to_string())),
        }
    }
}
