use regex::Regex;

use crate::dbc::builder::DbcBuilder;
use crate::dbc::core::{LazyRegex, StatementDecoder, message_id, strings::split_names};
use crate::dbc::statements::StatementReader;
use crate::dbc::types::errors::StatementKind;

/// Parse `BO_TX_BU_` lines assigning further transmit-capable nodes to a message.
/// Example: `BO_TX_BU_ 123 : NodeA,NodeB;`
pub(crate) struct MessageTransmittersDecoder;

impl StatementDecoder for MessageTransmittersDecoder {
    fn keyword(&self) -> &'static str {
        "BO_TX_BU_ "
    }

    fn kind(&self) -> StatementKind {
        StatementKind::MessageTransmitters
    }

    fn decode(
        &self,
        statement: &str,
        builder: &mut DbcBuilder<'_>,
        _statements: &mut StatementReader<'_>,
    ) -> Option<()> {
        static RE: LazyRegex = LazyRegex::new(|| {
            Regex::new(r"^BO_TX_BU_\s+(?P<id>\d+)\s*:(?P<nodes>[\w\s,]*?)\s*;?\s*$").unwrap()
        });

        let caps = RE.captures(statement)?;
        let id: u32 = message_id(caps.name("id")?.as_str())?;
        let nodes: Vec<&str> = split_names(caps.name("nodes")?.as_str()).collect();
        builder.add_additional_transmitters(id, &nodes);
        Some(())
    }
}

#[cfg(test)]
mod tests {
    use crate::dbc::core::testing::parse;
    use crate::dbc::types::errors::Diagnostic;

    #[test]
    fn test_additional_transmitters() {
        let text = "BU_: A B C\nBO_ 123 M: 8 A\nBO_TX_BU_ 123 : B,C,B;\nBO_TX_BU_ 124 : A;\n";
        let (dbc, diagnostics) = parse(text);
        assert_eq!(
            diagnostics,
            vec![
                Diagnostic::DuplicatedTransmitterInMessage {
                    message_id: 123,
                    node: "B".into()
                },
                Diagnostic::MessageIdNotFound { id: 124 },
            ]
        );
        assert_eq!(
            dbc.message(123).unwrap().additional_transmitters,
            vec!["B", "C"]
        );
    }
}
