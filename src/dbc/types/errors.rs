use std::fmt;
use std::io;
use thiserror::Error;

use crate::dbc::types::attributes::PropertyScope;

/// Errors that stop a parse before any statement is processed.
///
/// Everything that goes wrong *inside* the DBC text is a [`Diagnostic`] instead
/// and never surfaces here.
#[derive(Debug, Error)]
pub enum DbcParseError {
    #[error("Not a valid .dbc file: {path}")]
    InvalidExtension { path: String },
    #[error("Failed to open '{path}'. \nError: {source}")]
    OpenFile {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("Failed while reading '{path}'. \nError: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("Failed while reading DBC stream. \nError: {source}")]
    ReadStream {
        #[source]
        source: io::Error,
    },
}

/// Statement families, used to tag syntax errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StatementKind {
    Node,
    Message,
    Signal,
    Comment,
    ValueTableDefinition,
    ValueTable,
    PropertyDefinition,
    PropertyDefault,
    Property,
    EnvironmentVariable,
    EnvironmentData,
    ExtendedMultiplexing,
    MessageTransmitters,
    SignalValueType,
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StatementKind::Node => "BU_",
            StatementKind::Message => "BO_",
            StatementKind::Signal => "SG_",
            StatementKind::Comment => "CM_",
            StatementKind::ValueTableDefinition => "VAL_TABLE_",
            StatementKind::ValueTable => "VAL_",
            StatementKind::PropertyDefinition => "BA_DEF_",
            StatementKind::PropertyDefault => "BA_DEF_DEF_",
            StatementKind::Property => "BA_",
            StatementKind::EnvironmentVariable => "EV_",
            StatementKind::EnvironmentData => "ENVVAR_DATA_",
            StatementKind::ExtendedMultiplexing => "SG_MUL_VAL_",
            StatementKind::MessageTransmitters => "BO_TX_BU_",
            StatementKind::SignalValueType => "SIG_VALTYPE_",
        })
    }
}

/// A recoverable problem found while parsing. Reported to a
/// [`FailureObserver`](crate::FailureObserver); parsing always continues.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum Diagnostic {
    #[error("Signal found before any message definition")]
    NoMessageFound,
    #[error("Node '{name}' already defined")]
    DuplicatedNode { name: String },
    #[error("Message ID {id} already defined")]
    DuplicatedMessage { id: u32 },
    #[error("Signal '{signal}' already defined in message {message_id}")]
    DuplicatedSignalInMessage { message_id: u32, signal: String },
    #[error("Environment variable '{name}' already defined")]
    DuplicatedEnvironmentVariable { name: String },
    #[error("Property '{name}' already defined for {scope}")]
    DuplicatedPropertyDefinition { name: String, scope: PropertyScope },
    #[error("Property '{name}' already assigned to node '{node}'")]
    DuplicatedPropertyInNode { name: String, node: String },
    #[error("Property '{name}' already assigned to message {message_id}")]
    DuplicatedPropertyInMessage { name: String, message_id: u32 },
    #[error("Property '{name}' already assigned to signal '{signal}' of message {message_id}")]
    DuplicatedPropertyInSignal {
        name: String,
        message_id: u32,
        signal: String,
    },
    #[error("Property '{name}' already assigned to environment variable '{variable}'")]
    DuplicatedPropertyInEnvironmentVariable { name: String, variable: String },
    #[error("Global property '{name}' already assigned")]
    DuplicatedGlobalProperty { name: String },
    #[error("Value table '{name}' already defined")]
    DuplicatedValueTable { name: String },
    #[error("Node '{node}' listed twice as transmitter of message {message_id}")]
    DuplicatedTransmitterInMessage { message_id: u32, node: String },
    #[error("Node '{name}' not found")]
    NodeReferenceNotFound { name: String },
    #[error("Message ID {id} not found")]
    MessageIdNotFound { id: u32 },
    #[error("Signal '{signal}' not found in message {message_id}")]
    SignalNameNotFound { message_id: u32, signal: String },
    #[error("Environment variable '{name}' not found")]
    EnvironmentVariableNotFound { name: String },
    #[error("Value table '{name}' not found")]
    ValueTableNotFound { name: String },
    #[error("Property '{name}' not defined for {scope}")]
    PropertyNameNotFound { name: String, scope: PropertyScope },
    #[error("Value '{value}' of property '{name}' is out of bounds")]
    PropertyValueOutOfBound { name: String, value: String },
    #[error("Value '{value}' of enum property '{name}' is not an allowed entry")]
    PropertyValueOutOfIndex { name: String, value: String },
    #[error("Value '{value}' does not match the type of property '{name}'")]
    PropertyValueSyntaxError { name: String, value: String },
    #[error("{statement} syntax error")]
    SyntaxError { statement: StatementKind },
    #[error("Unknown line")]
    UnknownLine,
}

/// A [`Diagnostic`] together with the input line it was raised on (1-based).
#[derive(Clone, Debug, PartialEq)]
pub struct Failure {
    pub line: usize,
    pub diagnostic: Diagnostic,
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.diagnostic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_display() {
        let failure = Failure {
            line: 12,
            diagnostic: Diagnostic::SyntaxError {
                statement: StatementKind::Signal,
            },
        };
        assert_eq!(failure.to_string(), "line 12: SG_ syntax error");

        let dup = Diagnostic::DuplicatedPropertyDefinition {
            name: "GenMsgCycleTime".into(),
            scope: PropertyScope::Message,
        };
        assert_eq!(
            dup.to_string(),
            "Property 'GenMsgCycleTime' already defined for Message"
        );
    }
}
