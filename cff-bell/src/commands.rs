//! Operator input: one command per stdin line.

use std::fmt;
use std::str::FromStr;

use cff_notifications::OrderId;

pub const HELP: &str = "commands: open | close | click <order_id> | clear | list | help | quit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellCommand {
    Open,
    Close,
    Click(OrderId),
    Clear,
    List,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseCommandError(String);

impl fmt::Display for ParseCommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.0, HELP)
    }
}

impl std::error::Error for ParseCommandError {}

impl FromStr for ShellCommand {
    type Err = ParseCommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut parts = line.split_whitespace();
        let verb = parts
            .next()
            .ok_or_else(|| ParseCommandError("empty command".to_string()))?
            .to_lowercase();
        let argument = parts.next();
        if parts.next().is_some() {
            return Err(ParseCommandError(format!("too many arguments for '{}'", verb)));
        }

        let command = match (verb.as_str(), argument) {
            ("open", None) => ShellCommand::Open,
            ("close", None) => ShellCommand::Close,
            ("click", Some(id)) => ShellCommand::Click(
                id.trim_start_matches('#')
                    .parse()
                    .map_err(|_| ParseCommandError(format!("'{}' is not an order id", id)))?,
            ),
            ("click", None) => return Err(ParseCommandError("click needs an order id".to_string())),
            ("clear", None) => ShellCommand::Clear,
            ("list", None) => ShellCommand::List,
            ("help", None) | ("?", None) => ShellCommand::Help,
            ("quit", None) | ("exit", None) => ShellCommand::Quit,
            (other, _) => return Err(ParseCommandError(format!("unknown command '{}'", other))),
        };
        Ok(command)
    }
}
