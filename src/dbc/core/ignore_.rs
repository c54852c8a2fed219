use crate::dbc::builder::DbcBuilder;
use crate::dbc::core::Recognizer;
use crate::dbc::statements::{StatementReader, is_ignored};

/// Blank lines, `//` comments and statements we deliberately skip
/// (`VERSION`, `NS_`, `BS_`, `SIG_GROUP_`, ...).
pub(crate) struct IgnoredStatement;

impl Recognizer for IgnoredStatement {
    fn try_parse(
        &self,
        statement: &str,
        _builder: &mut DbcBuilder<'_>,
        _statements: &mut StatementReader<'_>,
    ) -> bool {
        statement.trim().is_empty() || is_ignored(statement)
    }
}
