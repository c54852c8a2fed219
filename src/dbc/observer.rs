//! Failure observers: where parse diagnostics go.
//!
//! The parser never stops on a malformed statement. It reports a [`Diagnostic`]
//! and moves on. Pick an observer to decide what happens with the reports:
//! - [`SilentObserver`] drops them,
//! - [`CollectingObserver`] keeps them as [`Failure`]s,
//! - [`TracingObserver`] logs them through `tracing`,
//! - or implement [`FailureObserver`] yourself.
//!
//! The parser always wraps the chosen observer in a [`LineCountingObserver`]
//! which feeds it the current input line before each statement.

use crate::dbc::types::{
    attributes::PropertyScope,
    errors::{Diagnostic, Failure, StatementKind},
};

/// Receives parse diagnostics. Implementations must not panic.
///
/// Only [`report`](FailureObserver::report) is required; each specific
/// notification forwards to it by default.
pub trait FailureObserver {
    /// Called with the 1-based line of the statement about to be parsed.
    fn set_current_line(&mut self, _line: usize) {}

    fn report(&mut self, diagnostic: Diagnostic);

    fn no_message_found(&mut self) {
        self.report(Diagnostic::NoMessageFound);
    }

    fn duplicated_node(&mut self, name: &str) {
        self.report(Diagnostic::DuplicatedNode { name: name.into() });
    }

    fn duplicated_message(&mut self, id: u32) {
        self.report(Diagnostic::DuplicatedMessage { id });
    }

    fn duplicated_signal_in_message(&mut self, message_id: u32, signal: &str) {
        self.report(Diagnostic::DuplicatedSignalInMessage {
            message_id,
            signal: signal.into(),
        });
    }

    fn duplicated_environment_variable(&mut self, name: &str) {
        self.report(Diagnostic::DuplicatedEnvironmentVariable { name: name.into() });
    }

    fn duplicated_property_definition(&mut self, name: &str, scope: PropertyScope) {
        self.report(Diagnostic::DuplicatedPropertyDefinition {
            name: name.into(),
            scope,
        });
    }

    fn duplicated_property_in_node(&mut self, name: &str, node: &str) {
        self.report(Diagnostic::DuplicatedPropertyInNode {
            name: name.into(),
            node: node.into(),
        });
    }

    fn duplicated_property_in_message(&mut self, name: &str, message_id: u32) {
        self.report(Diagnostic::DuplicatedPropertyInMessage {
            name: name.into(),
            message_id,
        });
    }

    fn duplicated_property_in_signal(&mut self, name: &str, message_id: u32, signal: &str) {
        self.report(Diagnostic::DuplicatedPropertyInSignal {
            name: name.into(),
            message_id,
            signal: signal.into(),
        });
    }

    fn duplicated_property_in_environment_variable(&mut self, name: &str, variable: &str) {
        self.report(Diagnostic::DuplicatedPropertyInEnvironmentVariable {
            name: name.into(),
            variable: variable.into(),
        });
    }

    fn duplicated_global_property(&mut self, name: &str) {
        self.report(Diagnostic::DuplicatedGlobalProperty { name: name.into() });
    }

    fn duplicated_value_table(&mut self, name: &str) {
        self.report(Diagnostic::DuplicatedValueTable { name: name.into() });
    }

    fn duplicated_transmitter_in_message(&mut self, message_id: u32, node: &str) {
        self.report(Diagnostic::DuplicatedTransmitterInMessage {
            message_id,
            node: node.into(),
        });
    }

    fn node_reference_not_found(&mut self, name: &str) {
        self.report(Diagnostic::NodeReferenceNotFound { name: name.into() });
    }

    fn message_id_not_found(&mut self, id: u32) {
        self.report(Diagnostic::MessageIdNotFound { id });
    }

    fn signal_name_not_found(&mut self, message_id: u32, signal: &str) {
        self.report(Diagnostic::SignalNameNotFound {
            message_id,
            signal: signal.into(),
        });
    }

    fn environment_variable_not_found(&mut self, name: &str) {
        self.report(Diagnostic::EnvironmentVariableNotFound { name: name.into() });
    }

    fn value_table_not_found(&mut self, name: &str) {
        self.report(Diagnostic::ValueTableNotFound { name: name.into() });
    }

    fn property_name_not_found(&mut self, name: &str, scope: PropertyScope) {
        self.report(Diagnostic::PropertyNameNotFound {
            name: name.into(),
            scope,
        });
    }

    fn syntax_error(&mut self, statement: StatementKind) {
        self.report(Diagnostic::SyntaxError { statement });
    }

    fn unknown_line(&mut self) {
        self.report(Diagnostic::UnknownLine);
    }
}

/// Drops every diagnostic.
#[derive(Clone, Copy, Debug, Default)]
pub struct SilentObserver;

impl FailureObserver for SilentObserver {
    fn report(&mut self, _diagnostic: Diagnostic) {}
}

/// Keeps every diagnostic together with its input line.
#[derive(Clone, Debug, Default)]
pub struct CollectingObserver {
    line: usize,
    failures: Vec<Failure>,
}

impl CollectingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failures(&self) -> &[Failure] {
        &self.failures
    }

    pub fn into_failures(self) -> Vec<Failure> {
        self.failures
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn clear(&mut self) {
        self.failures.clear();
        self.line = 0;
    }
}

impl FailureObserver for CollectingObserver {
    fn set_current_line(&mut self, line: usize) {
        self.line = line;
    }

    fn report(&mut self, diagnostic: Diagnostic) {
        self.failures.push(Failure {
            line: self.line,
            diagnostic,
        });
    }
}

/// Logs every diagnostic as a `tracing` warning.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingObserver {
    line: usize,
}

impl FailureObserver for TracingObserver {
    fn set_current_line(&mut self, line: usize) {
        self.line = line;
    }

    fn report(&mut self, diagnostic: Diagnostic) {
        tracing::warn!(line = self.line, %diagnostic, "DBC parse failure");
    }
}

/// Decorator that remembers the current input line and counts reports
/// before forwarding them to the wrapped observer.
pub struct LineCountingObserver<'o> {
    inner: &'o mut dyn FailureObserver,
    line: usize,
    reported: usize,
}

impl<'o> LineCountingObserver<'o> {
    pub fn new(inner: &'o mut dyn FailureObserver) -> Self {
        Self {
            inner,
            line: 0,
            reported: 0,
        }
    }

    /// Line of the statement being parsed (1-based, 0 before the first one).
    pub fn line(&self) -> usize {
        self.line
    }

    /// Number of diagnostics forwarded so far.
    pub fn reported(&self) -> usize {
        self.reported
    }
}

impl FailureObserver for LineCountingObserver<'_> {
    fn set_current_line(&mut self, line: usize) {
        self.line = line;
        self.inner.set_current_line(line);
    }

    fn report(&mut self, diagnostic: Diagnostic) {
        self.reported += 1;
        self.inner.report(diagnostic);
    }
}
