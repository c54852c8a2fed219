use regex::Regex;

use crate::dbc::builder::{DbcBuilder, ValueSource};
use crate::dbc::core::{
    LazyRegex, StatementDecoder, message_id, strings::IDENT, val_table_::parse_value_pairs,
};
use crate::dbc::statements::StatementReader;
use crate::dbc::types::errors::StatementKind;

/// `VAL_` links labels to a signal or an environment variable, inline or
/// through a `VAL_TABLE_` name. A numeric first token selects the signal form.
/// - `VAL_ 1041 DoorState 0 "Closed" 1 "Open" ;`
/// - `VAL_ 1041 DoorState DoorStates;`
/// - `VAL_ EnvGear 0 "P" 1 "R";`
pub(crate) struct ValueTableDecoder;

impl StatementDecoder for ValueTableDecoder {
    fn keyword(&self) -> &'static str {
        "VAL_ "
    }

    fn kind(&self) -> StatementKind {
        StatementKind::ValueTable
    }

    fn decode(
        &self,
        statement: &str,
        builder: &mut DbcBuilder<'_>,
        _statements: &mut StatementReader<'_>,
    ) -> Option<()> {
        static RE: LazyRegex = LazyRegex::new(|| {
            Regex::new(&format!(
                r"(?s)^VAL_\s+(?:(?P<id>\d+)\s+(?P<signal>{IDENT})|(?P<var>{IDENT}))(?P<body>.*?)\s*;?\s*$"
            ))
            .unwrap()
        });
        static TABLE_NAME: LazyRegex =
            LazyRegex::new(|| Regex::new(&format!(r"^\s*(?P<name>{IDENT})\s*$")).unwrap());

        let caps = RE.captures(statement)?;
        let body: &str = caps.name("body")?.as_str();
        let source: ValueSource = match TABLE_NAME.captures(body) {
            Some(table) => ValueSource::Named(table.name("name")?.as_str().to_string()),
            None => ValueSource::Inline(parse_value_pairs(body)?),
        };

        match (caps.name("id"), caps.name("signal"), caps.name("var")) {
            (Some(id), Some(signal), _) => {
                builder.link_signal_values(message_id(id.as_str())?, signal.as_str(), source);
            }
            (_, _, Some(var)) => builder.link_env_var_values(var.as_str(), source),
            _ => return None,
        }
        Some(())
    }
}

#[cfg(test)]
mod tests {
    use crate::dbc::core::testing::parse;
    use crate::dbc::types::errors::{Diagnostic, StatementKind};

    const HEADER: &str = r#"BU_: ECU1
BO_ 1041 DOORS: 8 ECU1
 SG_ DoorState : 0|2@1+ (1,0) [0|3] "" ECU1
 SG_ Gear : 8|3@1+ (1,0) [0|7] "" ECU1
EV_ EnvGear: 0 [0|3] "" 0 1 DUMMY_NODE_VECTOR0 ECU1;
"#;

    #[test]
    fn test_inline_and_named_tables() {
        let text = format!(
            "{HEADER}VAL_TABLE_ T 1 \"On\" 0 \"Off\";\nVAL_ 1041 DoorState 0 \"Closed\" 1 \"Open\" ;\nVAL_ 1041 Gear T;\nVAL_ EnvGear 0 \"P\" 1 \"R\";\n"
        );
        let (dbc, diagnostics) = parse(&text);
        assert!(diagnostics.is_empty(), "{diagnostics:?}");

        let msg = dbc.message(1041).unwrap();
        assert_eq!(msg.signal("DoorState").unwrap().value_label(1), Some("Open"));
        assert_eq!(msg.signal("Gear").unwrap().value_label(1), Some("On"));
        assert_eq!(msg.signal("Gear").unwrap().value_label(0), Some("Off"));
        let env = dbc.environment_variable("EnvGear").unwrap();
        assert_eq!(env.value_table.get(&1).map(String::as_str), Some("R"));
    }

    #[test]
    fn test_redefined_table_keeps_earlier_links() {
        let text = format!(
            "{HEADER}VAL_TABLE_ T 1 \"Old\";\nVAL_ 1041 Gear T;\nVAL_TABLE_ T 1 \"New\";\nVAL_ 1041 DoorState T;\n"
        );
        let (dbc, diagnostics) = parse(&text);
        assert_eq!(
            diagnostics,
            vec![Diagnostic::DuplicatedValueTable { name: "T".into() }]
        );
        let msg = dbc.message(1041).unwrap();
        assert_eq!(msg.signal("Gear").unwrap().value_label(1), Some("Old"));
        assert_eq!(msg.signal("DoorState").unwrap().value_label(1), Some("New"));
    }

    #[test]
    fn test_value_table_failures() {
        let text = format!(
            "{HEADER}VAL_ 1041 Gear Missing;\nVAL_ 1041 Nope 0 \"x\";\nVAL_ 1041 Gear 0 \"x\" junk \"y\";\n"
        );
        let (_, diagnostics) = parse(&text);
        assert_eq!(
            diagnostics,
            vec![
                Diagnostic::ValueTableNotFound {
                    name: "Missing".into()
                },
                Diagnostic::SignalNameNotFound {
                    message_id: 1041,
                    signal: "Nope".into()
                },
                Diagnostic::SyntaxError {
                    statement: StatementKind::ValueTable
                },
            ]
        );
    }
}
