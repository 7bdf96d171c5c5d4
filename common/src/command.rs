use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Command word for binding a channel to an object attribute.
pub const CONNECT_ATTRIBUTE_COMMAND: &str = "arduinoConnectAttribute";

/// Command word for binding a channel to the time cursor.
pub const CONNECT_TIME_COMMAND: &str = "arduinoConnectTime";

/// Command word for applying one raw reading to a channel.
pub const UPDATE_CHANNEL_COMMAND: &str = "arduinoUpdateChannel";

/// Default endpoint of the dispatcher's command port.
pub const DEFAULT_COMMAND_ADDR: &str = "127.0.0.1:1923";

/// One text command on the wire between the bridge (or a user script) and
/// the dispatcher. Commands are single ASCII lines of whitespace-separated
/// tokens, newline-terminated on the wire.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum Command {
    /// Bind a channel to a float attribute of a named object. Raw readings
    /// are mapped onto `[min, max]`.
    ConnectAttribute {
        channel: usize,
        object: String,
        attribute: String,
        min: f64,
        max: f64,
    },

    /// Bind a channel to the host's current-time cursor. Raw readings are
    /// applied as signed deltas.
    ConnectTime { channel: usize },

    /// Apply one raw reading to whatever a channel is bound to.
    UpdateChannel { channel: usize, value: i32 },
}

/// Represents errors parsing a command line off the wire.
#[derive(Debug, Error, PartialEq)]
pub enum CommandError {
    /// The line held no tokens at all.
    #[error("Empty command line.")]
    Empty,

    /// The first token is not a known command word.
    #[error("Unknown command word '{0}'.")]
    UnknownCommand(String),

    /// The command word was recognized but the argument count is wrong.
    #[error("Command '{command}' takes {expected} arguments, got {got}.")]
    WrongArgumentCount {
        command: &'static str,
        expected: usize,
        got: usize,
    },

    /// A channel index token did not parse as an unsigned integer.
    #[error("Malformed channel index '{0}'.")]
    MalformedChannel(String),

    /// An update value token did not parse as an integer. Electrical noise
    /// on the serial line shows up here; callers drop these silently.
    #[error("Malformed reading '{0}'.")]
    MalformedReading(String),

    /// A range bound token did not parse as a float.
    #[error("Malformed range bound '{0}'.")]
    MalformedBound(String),
}

fn parse_channel(token: &str) -> Result<usize, CommandError> {
    token
        .parse::<usize>()
        .map_err(|_| CommandError::MalformedChannel(token.to_string()))
}

fn parse_bound(token: &str) -> Result<f64, CommandError> {
    token
        .parse::<f64>()
        .map_err(|_| CommandError::MalformedBound(token.to_string()))
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let Some((&word, args)) = tokens.split_first() else {
            return Err(CommandError::Empty);
        };

        match word {
            CONNECT_ATTRIBUTE_COMMAND => {
                if args.len() != 5 {
                    return Err(CommandError::WrongArgumentCount {
                        command: CONNECT_ATTRIBUTE_COMMAND,
                        expected: 5,
                        got: args.len(),
                    });
                }
                Ok(Command::ConnectAttribute {
                    channel: parse_channel(args[0])?,
                    object: args[1].to_string(),
                    attribute: args[2].to_string(),
                    min: parse_bound(args[3])?,
                    max: parse_bound(args[4])?,
                })
            }
            CONNECT_TIME_COMMAND => {
                if args.len() != 1 {
                    return Err(CommandError::WrongArgumentCount {
                        command: CONNECT_TIME_COMMAND,
                        expected: 1,
                        got: args.len(),
                    });
                }
                Ok(Command::ConnectTime {
                    channel: parse_channel(args[0])?,
                })
            }
            UPDATE_CHANNEL_COMMAND => {
                if args.len() != 2 {
                    return Err(CommandError::WrongArgumentCount {
                        command: UPDATE_CHANNEL_COMMAND,
                        expected: 2,
                        got: args.len(),
                    });
                }
                Ok(Command::UpdateChannel {
                    channel: parse_channel(args[0])?,
                    value: args[1]
                        .parse::<i32>()
                        .map_err(|_| CommandError::MalformedReading(args[1].to_string()))?,
                })
            }
            _ => Err(CommandError::UnknownCommand(word.to_string())),
        }
    }
}

impl Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::ConnectAttribute {
                channel,
                object,
                attribute,
                min,
                max,
            } => write!(
                f,
                "{} {} {} {} {} {}",
                CONNECT_ATTRIBUTE_COMMAND, channel, object, attribute, min, max
            ),
            Command::ConnectTime { channel } => {
                write!(f, "{} {}", CONNECT_TIME_COMMAND, channel)
            }
            Command::UpdateChannel { channel, value } => {
                write!(f, "{} {} {}", UPDATE_CHANNEL_COMMAND, channel, value)
            }
        }
    }
}
