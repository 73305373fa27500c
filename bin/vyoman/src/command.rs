//! Dashboard commands read from the prompt.

use std::str::FromStr;
use thiserror::Error;

pub const HELP: &str = "\
Commands:
  connect                  connect the wallet
  load [address]           load a token (defaults to the configured token)
  transfer <to> <amount>   send tokens to an address
  refresh                  refetch the token balance
  cancel                   cancel an in-flight token load
  status                   show the session
  history                  list confirmed transfers
  json                     print the session as JSON
  dismiss                  clear the error and notice
  disconnect               forget the account, token and history
  help                     show this help
  quit                     exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Connect,
    Load(Option<String>),
    Transfer { to: String, amount: String },
    Refresh,
    Cancel,
    Status,
    History,
    Json,
    Dismiss,
    Disconnect,
    Help,
    Quit,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command `{0}`, try `help`")]
    Unknown(String),

    #[error("usage: {0}")]
    Usage(&'static str),
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some((&name, args)) = words.split_first() else {
            return Ok(Self::Status);
        };

        let bare = |command: Self, usage: &'static str| {
            if args.is_empty() {
                Ok(command)
            } else {
                Err(CommandError::Usage(usage))
            }
        };

        match name.to_ascii_lowercase().as_str() {
            "connect" => bare(Self::Connect, "connect"),
            "load" => match args {
                [] => Ok(Self::Load(None)),
                [address] => Ok(Self::Load(Some((*address).to_string()))),
                _ => Err(CommandError::Usage("load [address]")),
            },
            "transfer" | "send" => match args {
                [to, amount] => Ok(Self::Transfer {
                    to: (*to).to_string(),
                    amount: (*amount).to_string(),
                }),
                _ => Err(CommandError::Usage("transfer <to> <amount>")),
            },
            "refresh" => bare(Self::Refresh, "refresh"),
            "cancel" => bare(Self::Cancel, "cancel"),
            "status" => bare(Self::Status, "status"),
            "history" => bare(Self::History, "history"),
            "json" => bare(Self::Json, "json"),
            "dismiss" => bare(Self::Dismiss, "dismiss"),
            "disconnect" => bare(Self::Disconnect, "disconnect"),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" | "q" => Ok(Self::Quit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}
