//! Statement recognizers.
//!
//! Each DBC construct has its own decoder module named after its keyword.
//! Decoders are tried in a fixed order and the first one whose keyword prefixes
//! the statement claims it; [`unknown_`] sits at the end and claims the rest.

use regex::Regex;

use crate::dbc::builder::DbcBuilder;
use crate::dbc::observer::FailureObserver;
use crate::dbc::statements::StatementReader;
use crate::dbc::types::{errors::StatementKind, message::split_raw_id};

pub(crate) mod ba_;
pub(crate) mod ba_def_;
pub(crate) mod ba_def_def_;
pub(crate) mod bo_;
pub(crate) mod bo_tx_bu_;
pub(crate) mod bu_;
pub(crate) mod cm_;
pub(crate) mod envvar_data_;
pub(crate) mod ev_;
pub(crate) mod ignore_;
pub(crate) mod sg_;
pub(crate) mod sg_mul_val_;
pub(crate) mod sig_valtype_;
pub(crate) mod strings;
pub(crate) mod unknown_;
pub(crate) mod val_;
pub(crate) mod val_table_;

pub(crate) type LazyRegex = once_cell::sync::Lazy<Regex>;

/// A link of the recognizer chain.
pub(crate) trait Recognizer {
    /// Claims `statement` and applies it to `builder`. Returns `false`, without
    /// touching anything, when the statement belongs to another recognizer.
    fn try_parse(
        &self,
        statement: &str,
        builder: &mut DbcBuilder<'_>,
        statements: &mut StatementReader<'_>,
    ) -> bool;
}

/// Recognizer for one keyword-prefixed statement family.
pub(crate) trait StatementDecoder {
    /// Literal prefix of the statement, separator included (`"BO_ "`).
    fn keyword(&self) -> &'static str;

    /// Family reported when the statement is malformed.
    fn kind(&self) -> StatementKind;

    /// Applies a claimed statement. `None` means it did not match its grammar.
    fn decode(
        &self,
        statement: &str,
        builder: &mut DbcBuilder<'_>,
        statements: &mut StatementReader<'_>,
    ) -> Option<()>;
}

impl<T: StatementDecoder> Recognizer for T {
    fn try_parse(
        &self,
        statement: &str,
        builder: &mut DbcBuilder<'_>,
        statements: &mut StatementReader<'_>,
    ) -> bool {
        if !statement.starts_with(self.keyword()) {
            return false;
        }
        if self.decode(statement, builder, statements).is_none() {
            builder.observer().syntax_error(self.kind());
        }
        true
    }
}

/// The recognizer chain, in priority order.
pub(crate) fn recognizers() -> Vec<Box<dyn Recognizer>> {
    vec![
        Box::new(bu_::NodesDecoder),
        Box::new(bo_::MessageDecoder),
        Box::new(sg_::SignalDecoder),
        Box::new(cm_::CommentDecoder),
        Box::new(val_table_::ValueTableDefinitionDecoder),
        Box::new(val_::ValueTableDecoder),
        Box::new(ba_def_::PropertyDefinitionDecoder),
        Box::new(ba_def_def_::PropertyDefaultDecoder),
        Box::new(ba_::PropertyDecoder),
        Box::new(ev_::EnvironmentVariableDecoder),
        Box::new(envvar_data_::EnvironmentDataDecoder),
        Box::new(sg_mul_val_::ExtendedMultiplexingDecoder),
        Box::new(bo_tx_bu_::MessageTransmittersDecoder),
        Box::new(sig_valtype_::SignalValueTypeDecoder),
        Box::new(ignore_::IgnoredStatement),
        Box::new(unknown_::UnknownStatement),
    ]
}

/// Feeds every statement of `statements` through the chain.
pub(crate) fn run(statements: &mut StatementReader<'_>, builder: &mut DbcBuilder<'_>) {
    let chain = recognizers();
    while let Some(statement) = statements.next_statement() {
        builder.observer().set_current_line(statement.line);
        tracing::trace!(line = statement.line, "statement");
        for recognizer in &chain {
            if recognizer.try_parse(&statement.text, builder, statements) {
                break;
            }
        }
    }
}

/// Parses a message ID literal and drops the extended marker bit.
pub(crate) fn message_id(literal: &str) -> Option<u32> {
    literal.parse::<u32>().ok().map(|raw| split_raw_id(raw).0)
}


#[cfg(test)]
mod tests {
    use super::testing::parse;
    use super::*;
    use crate::dbc::types::errors::Diagnostic;

    #[test]
    fn test_message_id_literal() {
        assert_eq!(message_id("1041"), Some(1041));
        assert_eq!(message_id("2566869246"), Some(0x18FF_50FE));
        assert_eq!(message_id("4294967296"), None);
        assert_eq!(message_id("-1"), None);
    }

    #[test]
    fn test_unknown_and_ignored_lines() {
        let text = "VERSION \"1.0\"\n\nNS_ :\n\tNS_DESC_\n\tCM_\n\nBS_:\n// note\nFOO bar;\n";
        let (_, diagnostics) = parse(text);
        assert_eq!(diagnostics, vec![Diagnostic::UnknownLine]);
    }

    #[test]
    fn test_syntax_error_is_reported_with_kind() {
        let (dbc, diagnostics) = parse("BO_ x Broken: 8 ECU1");
        assert_eq!(dbc.message_count(), 0);
        assert_eq!(
            diagnostics,
            vec![Diagnostic::SyntaxError {
                statement: StatementKind::Message
            }]
        );
    }
}
