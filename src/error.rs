//! Error types for dashgate.

use std::path::PathBuf;

use serde_json::Value;

use crate::events::EventName;

/// A string that is not one of the recognized event names.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized event name `{0}`")]
pub struct UnrecognizedEvent(pub String);

/// A recognized event name whose payload has the wrong shape.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("event {name} does not accept payload {}", describe_payload(.payload))]
pub struct PayloadMismatch {
    pub name: EventName,
    pub payload: Option<Value>,
}

fn describe_payload(payload: &Option<Value>) -> String {
    payload.as_ref().map_or_else(|| "<none>".to_string(), Value::to_string)
}

/// Failure raised by an event handler.
///
/// Never reaches the publisher: the channel logs it and moves on to the
/// next subscriber.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error("{0}")]
    Message(String),

    #[error("handler panicked: {0}")]
    Panicked(String),
}

impl HandlerError {
    pub fn msg(message: impl Into<String>) -> Self {
        HandlerError::Message(message.into())
    }
}

/// Errors from the key-value storage backends.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Sidebar menu validation errors.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum MenuError {
    #[error("duplicate menu item id `{0}`")]
    DuplicateId(String),

    #[error("menu item id must not be empty")]
    EmptyId,
}

/// Errors from the text command dispatcher.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("empty command")]
    Empty,

    #[error("unknown command `{0}`")]
    Unknown(String),

    #[error("unknown feature `{0}` (expected `navbar` or `sidebar`)")]
    UnknownFeature(String),

    #[error("unknown button `{button}` for {feature}")]
    UnknownButton { feature: String, button: String },

    #[error("missing argument: {0}")]
    MissingArgument(&'static str),

    #[error("invalid payload `{0}`: not valid JSON")]
    InvalidPayload(String),
}

/// Errors surfaced while bootstrapping or shutting down the shell.
#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Menu(#[from] MenuError),
}
