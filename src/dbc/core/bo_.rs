use regex::Regex;

use crate::dbc::builder::DbcBuilder;
use crate::dbc::core::{LazyRegex, StatementDecoder, strings::IDENT};
use crate::dbc::statements::StatementReader;
use crate::dbc::types::{
    errors::StatementKind,
    message::{Message, split_raw_id},
};

/// `BO_` message definition. Bit 31 of the ID flags an extended frame.
/// Example: `BO_ 2364540158 EEC1: 8 Vector__XXX`
pub(crate) struct MessageDecoder;

impl StatementDecoder for MessageDecoder {
    fn keyword(&self) -> &'static str {
        "BO_ "
    }

    fn kind(&self) -> StatementKind {
        StatementKind::Message
    }

    fn decode(
        &self,
        statement: &str,
        builder: &mut DbcBuilder<'_>,
        _statements: &mut StatementReader<'_>,
    ) -> Option<()> {
        static RE: LazyRegex = LazyRegex::new(|| {
            Regex::new(&format!(
                r"^BO_\s+(?P<id>\d+)\s+(?P<name>{IDENT})\s*:\s*(?P<dlc>\d+)\s+(?P<tx>{IDENT})\s*;?\s*$"
            ))
            .unwrap()
        });

        let caps = RE.captures(statement)?;
        let raw: u32 = caps.name("id")?.as_str().parse().ok()?;
        let (id, is_ext_id) = split_raw_id(raw);

        builder.add_message(Message {
            id,
            is_ext_id,
            name: caps.name("name")?.as_str().to_string(),
            dlc: caps.name("dlc")?.as_str().parse().ok()?,
            transmitter: caps.name("tx")?.as_str().to_string(),
            ..Default::default()
        });
        Some(())
    }
}

#[cfg(test)]
mod tests {
    use crate::dbc::core::testing::parse;
    use crate::dbc::types::errors::{Diagnostic, StatementKind};

    #[test]
    fn test_standard_and_extended_messages() {
        let text = "BO_ 1041 DOORS_SEATBELTS: 8 MCU\nBO_ 2566869246 PROP_B: 8 Vector__XXX";
        let (dbc, diagnostics) = parse(text);
        assert!(diagnostics.is_empty());

        let doors = dbc.message(1041).unwrap();
        assert_eq!(doors.name, "DOORS_SEATBELTS");
        assert_eq!(doors.dlc, 8);
        assert_eq!(doors.transmitter, "MCU");
        assert!(!doors.is_ext_id);

        let prop = dbc.message(0x18FF_50FE).unwrap();
        assert!(prop.is_ext_id);
        assert_eq!(prop.raw_id(), 2_566_869_246);
    }

    #[test]
    fn test_bad_dlc() {
        let (dbc, diagnostics) = parse("BO_ 1 M: 99999 X");
        assert_eq!(dbc.message_count(), 0);
        assert_eq!(
            diagnostics,
            vec![Diagnostic::SyntaxError {
                statement: StatementKind::Message
            }]
        );
    }
}
