use regex::Regex;

use crate::dbc::builder::DbcBuilder;
use crate::dbc::core::{LazyRegex, StatementDecoder, message_id, strings::IDENT};
use crate::dbc::statements::StatementReader;
use crate::dbc::types::{errors::StatementKind, signal::ValueKind};

/// `SIG_VALTYPE_ <id> <signal> : <n>;` where 1 marks an IEEE float and 2 an
/// IEEE double. Any other value keeps the integer kind given by `SG_`, but
/// the message and signal must still exist.
pub(crate) struct SignalValueTypeDecoder;

impl StatementDecoder for SignalValueTypeDecoder {
    fn keyword(&self) -> &'static str {
        "SIG_VALTYPE_ "
    }

    fn kind(&self) -> StatementKind {
        StatementKind::SignalValueType
    }

    fn decode(
        &self,
        statement: &str,
        builder: &mut DbcBuilder<'_>,
        _statements: &mut StatementReader<'_>,
    ) -> Option<()> {
        static RE: LazyRegex = LazyRegex::new(|| {
            Regex::new(&format!(
                r"^SIG_VALTYPE_\s+(?P<id>\d+)\s+(?P<signal>{IDENT})\s*:?\s*(?P<kind>\d+)\s*;?\s*$"
            ))
            .unwrap()
        });

        let caps = RE.captures(statement)?;
        let kind: Option<ValueKind> = match caps.name("kind")?.as_str() {
            "1" => Some(ValueKind::IeeeFloat),
            "2" => Some(ValueKind::IeeeDouble),
            _ => None,
        };
        builder.set_signal_value_kind(
            message_id(caps.name("id")?.as_str())?,
            caps.name("signal")?.as_str(),
            kind,
        );
        Some(())
    }
}

#[cfg(test)]
mod tests {
    use crate::dbc::core::testing::parse;
    use crate::dbc::types::{errors::Diagnostic, signal::ValueKind};

    #[test]
    fn test_value_types() {
        let text = r#"BO_ 1 M: 8 ECU1
 SG_ F : 0|32@1- (1,0) [0|0] "" ECU1
 SG_ D : 0|64@1+ (1,0) [0|0] "" ECU1
 SG_ I : 0|8@1- (1,0) [0|0] "" ECU1
SIG_VALTYPE_ 1 F : 1;
SIG_VALTYPE_ 1 D 2;
SIG_VALTYPE_ 1 I : 0;
"#;
        let (dbc, diagnostics) = parse(text);
        assert!(diagnostics.is_empty(), "{diagnostics:?}");
        let msg = dbc.message(1).unwrap();
        assert_eq!(msg.signal("F").unwrap().value_kind, ValueKind::IeeeFloat);
        assert_eq!(msg.signal("D").unwrap().value_kind, ValueKind::IeeeDouble);
        assert_eq!(msg.signal("I").unwrap().value_kind, ValueKind::Signed);
    }

    #[test]
    fn test_integer_kind_still_checks_reference() {
        let text = "BO_ 1 M: 8 ECU1\n SG_ I : 0|8@1- (1,0) [0|0] \"\" ECU1\nSIG_VALTYPE_ 999 Ghost : 0;\nSIG_VALTYPE_ 1 Ghost : 0;\n";
        let (dbc, diagnostics) = parse(text);
        assert_eq!(
            diagnostics,
            vec![
                Diagnostic::MessageIdNotFound { id: 999 },
                Diagnostic::SignalNameNotFound {
                    message_id: 1,
                    signal: "Ghost".into()
                },
            ]
        );
        assert_eq!(
            dbc.message(1).unwrap().signal("I").unwrap().value_kind,
            ValueKind::Signed
        );
    }
}
