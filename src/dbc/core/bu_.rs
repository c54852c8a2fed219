use regex::Regex;

use crate::dbc::builder::DbcBuilder;
use crate::dbc::core::{LazyRegex, StatementDecoder, strings::split_names};
use crate::dbc::statements::StatementReader;
use crate::dbc::types::errors::StatementKind;

/// `BU_:` node list. Names are separated by blanks (commas are tolerated).
/// Example: `BU_: ECU1 ECU2 ECU3`
pub(crate) struct NodesDecoder;

impl StatementDecoder for NodesDecoder {
    fn keyword(&self) -> &'static str {
        "BU_:"
    }

    fn kind(&self) -> StatementKind {
        StatementKind::Node
    }

    fn decode(
        &self,
        statement: &str,
        builder: &mut DbcBuilder<'_>,
        _statements: &mut StatementReader<'_>,
    ) -> Option<()> {
        static RE: LazyRegex =
            LazyRegex::new(|| Regex::new(r"^BU_:(?P<nodes>[\w\s,]*?)\s*;?\s*$").unwrap());

        let caps = RE.captures(statement)?;
        for name in split_names(caps.name("nodes")?.as_str()) {
            builder.add_node(name);
        }
        Some(())
    }
}

#[cfg(test)]
mod tests {
    use crate::dbc::core::testing::parse;
    use crate::dbc::types::errors::{Diagnostic, StatementKind};

    #[test]
    fn test_node_list() {
        let (dbc, diagnostics) = parse("BU_: ECU1 ECU2  ECU3\nBU_:\nBU_:ECU4 ECU1");
        let names: Vec<&str> = dbc.nodes().iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["ECU1", "ECU2", "ECU3", "ECU4"]);
        assert_eq!(
            diagnostics,
            vec![Diagnostic::DuplicatedNode {
                name: "ECU1".into()
            }]
        );
    }

    #[test]
    fn test_malformed_node_list() {
        let (_, diagnostics) = parse("BU_: ECU-1");
        assert_eq!(
            diagnostics,
            vec![Diagnostic::SyntaxError {
                statement: StatementKind::Node
            }]
        );
    }
}
