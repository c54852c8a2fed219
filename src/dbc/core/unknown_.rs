use crate::dbc::builder::DbcBuilder;
use crate::dbc::core::Recognizer;
use crate::dbc::observer::FailureObserver;
use crate::dbc::statements::StatementReader;

/// Last link of the chain: claims whatever is left and reports it.
pub(crate) struct UnknownStatement;

impl Recognizer for UnknownStatement {
    fn try_parse(
        &self,
        _statement: &str,
        builder: &mut DbcBuilder<'_>,
        _statements: &mut StatementReader<'_>,
    ) -> bool {
        builder.observer().unknown_line();
        true
    }
}
