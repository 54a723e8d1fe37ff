// commands/mod.rs
use crate::error::CommandError;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    On,
    Off,
    Color,
}

impl CommandKind {
    pub const ALL: [CommandKind; 3] = [CommandKind::On, CommandKind::Off, CommandKind::Color];

    pub fn as_str(self) -> &'static str {
        match self {
            CommandKind::On => "ON",
            CommandKind::Off => "OFF",
            CommandKind::Color => "COLOR",
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CommandKind {
    type Err = CommandError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        CommandKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == name)
            .ok_or_else(|| CommandError::UnknownCommand(name.to_string()))
    }
}

/// A validated command, consumed by a single dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub kind: CommandKind,
    pub metadata: Option<String>,
}

impl Command {
    pub fn new(kind: CommandKind) -> Self {
        Self {
            kind,
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: impl Into<String>) -> Self {
        self.metadata = Some(metadata.into());
        self
    }
}

/// Decodes one inbound text unit and validates it against the command set.
pub fn decode(text: &str) -> Result<Command, CommandError> {
    let payload: Value = serde_json::from_str(text.trim())
        .map_err(|e| CommandError::InvalidFormat(e.to_string()))?;
    let payload = match payload {
        Value::Object(payload) => payload,
        other => {
            return Err(CommandError::InvalidFormat(format!(
                "expected an object, got {other}"
            )));
        }
    };

    let kind = match payload.get("command") {
        None | Some(Value::Null) => return Err(CommandError::MissingCommand),
        Some(Value::String(name)) => name.parse::<CommandKind>()?,
        Some(other) => return Err(CommandError::UnknownCommand(other.to_string())),
    };

    // Only string metadata is meaningful.
    let metadata = payload
        .get("metadata")
        .and_then(Value::as_str)
        .map(str::to_string);

    Ok(Command { kind, metadata })
}
