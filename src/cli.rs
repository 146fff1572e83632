//! Command language of the interactive front end.

use thiserror::Error;

use crate::form::SoilAttribute;

pub const HELP: &str = "\
Commands:
  water <ml>                 set the water level
  rows <n>                   number of wavelength rows (3-18)
  label <row> <nm|->         pick a wavelength for a row, '-' clears it
  value <row> [reading]      type a reading for a row
  available <row>            wavelengths still free for a row
  show                       print the form
  submit                     validate and send for analysis
  metrics                    load and show model metrics
  back                       return to the form
  top <attribute> <count>    most important wavelengths for an attribute
  chat <question>            ask about the results
  history                    print the chat transcript
  save                       write the session to disk
  reset                      start a fresh form
  quit";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Water(String),
    Rows(usize),
    /// Zero-based row index; an empty label clears the selection
    Label { row: usize, label: String },
    Value { row: usize, raw: String },
    Available(usize),
    Show,
    Submit,
    Metrics,
    Back,
    Top { attribute: SoilAttribute, count: usize },
    Chat(String),
    History,
    Save,
    Reset,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommandError {
    #[error("unknown command '{0}', type 'help' for a list")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error(transparent)]
    Attribute(#[from] crate::form::catalog::UnknownAttribute),
}

/// Rows are numbered from 1 on screen.
fn row_index(text: Option<&str>, usage: &'static str) -> Result<usize, CommandError> {
    text.and_then(|t| t.parse::<usize>().ok())
        .filter(|n| *n >= 1)
        .map(|n| n - 1)
        .ok_or(CommandError::Usage(usage))
}

/// Counts may be typed out of range; clamping happens downstream.
fn count(text: Option<&str>, usage: &'static str) -> Result<usize, CommandError> {
    text.and_then(|t| t.parse::<i64>().ok())
        .map(|n| n.max(0) as usize)
        .ok_or(CommandError::Usage(usage))
}

pub fn parse(line: &str) -> Result<Command, CommandError> {
    let line = line.trim();
    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (line, ""),
    };
    let mut args = rest.split_whitespace();

    let command = match head.to_lowercase().as_str() {
        "water" => {
            if rest.is_empty() {
                return Err(CommandError::Usage("water <ml>"));
            }
            Command::Water(rest.to_string())
        }
        "rows" => Command::Rows(count(args.next(), "rows <n>")?),
        "label" => {
            const USAGE: &str = "label <row> <nm|->";
            let row = row_index(args.next(), USAGE)?;
            let label = args.next().ok_or(CommandError::Usage(USAGE))?;
            Command::Label {
                row,
                label: if label == "-" { String::new() } else { label.to_string() },
            }
        }
        "value" => {
            let row = row_index(args.next(), "value <row> [reading]")?;
            Command::Value {
                row,
                raw: args.next().unwrap_or_default().to_string(),
            }
        }
        "available" => Command::Available(row_index(args.next(), "available <row>")?),
        "show" => Command::Show,
        "submit" => Command::Submit,
        "metrics" => Command::Metrics,
        "back" => Command::Back,
        "top" => {
            const USAGE: &str = "top <attribute> <count>";
            let (name, n) = rest.rsplit_once(char::is_whitespace).ok_or(CommandError::Usage(USAGE))?;
            Command::Top {
                attribute: name.trim().parse()?,
                count: count(Some(n), USAGE)?,
            }
        }
        "chat" => Command::Chat(rest.to_string()),
        "history" => Command::History,
        "save" => Command::Save,
        "reset" | "clear" => Command::Reset,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => return Err(CommandError::Unknown(other.to_string())),
    };
    Ok(command)
}
