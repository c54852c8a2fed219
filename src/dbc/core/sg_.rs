use regex::Regex;

use crate::dbc::builder::DbcBuilder;
use crate::dbc::core::{
    LazyRegex, StatementDecoder,
    strings::{IDENT, NUM, parse_float, split_names, unescape},
};
use crate::dbc::statements::StatementReader;
use crate::dbc::types::{
    errors::StatementKind,
    signal::{ByteOrder, Signal, ValueKind},
};

/// Decode a `SG_` line belonging to the **current message** (the last parsed BO_).
/// Format:
/// SG_ <name> [M|mX|mXM]: <bit_start>|<bit_length>@<endian><sign> (<factor>,<offset>) [<min>|<max>] "<unit>" <receivers...>
pub(crate) struct SignalDecoder;

impl StatementDecoder for SignalDecoder {
    fn keyword(&self) -> &'static str {
        "SG_ "
    }

    fn kind(&self) -> StatementKind {
        StatementKind::Signal
    }

    fn decode(
        &self,
        statement: &str,
        builder: &mut DbcBuilder<'_>,
        _statements: &mut StatementReader<'_>,
    ) -> Option<()> {
        static RE: LazyRegex = LazyRegex::new(|| {
            Regex::new(&format!(
                concat!(
                    r"^SG_\s+(?P<name>{ident})(?:\s+(?P<mux>[Mm]\w*))?\s*:\s*",
                    r"(?P<start>\d+)\s*\|\s*(?P<len>\d+)\s*@\s*(?P<order>[01])\s*(?P<sign>[+-])\s*",
                    r"\(\s*(?P<factor>{num})\s*,\s*(?P<offset>{num})\s*\)\s*",
                    r"\[\s*(?P<min>{num})\s*\|\s*(?P<max>{num})\s*\]\s*",
                    r#""(?P<unit>(?:[^"\\]|\\.)*)"\s*(?P<rx>[\w\s,]*?)\s*;?\s*$"#,
                ),
                ident = IDENT,
                num = NUM,
            ))
            .unwrap()
        });

        let caps = RE.captures(statement)?;
        let number = |group: &str| caps.name(group).and_then(|m| parse_float(m.as_str()));

        let signal = Signal {
            name: caps.name("name")?.as_str().to_string(),
            start_bit: caps.name("start")?.as_str().parse().ok()?,
            length: caps.name("len")?.as_str().parse().ok()?,
            byte_order: match caps.name("order")?.as_str() {
                "1" => ByteOrder::Intel,
                _ => ByteOrder::Motorola,
            },
            value_kind: match caps.name("sign")?.as_str() {
                "-" => ValueKind::Signed,
                _ => ValueKind::Unsigned,
            },
            factor: number("factor")?,
            offset: number("offset")?,
            min: number("min")?,
            max: number("max")?,
            unit: unescape(caps.name("unit")?.as_str()),
            receivers: split_names(caps.name("rx")?.as_str())
                .map(str::to_string)
                .collect(),
            multiplexing: caps.name("mux").map(|m| m.as_str().to_string()),
            ..Default::default()
        };

        builder.add_signal(signal);
        Some(())
    }
}

#[cfg(test)]
mod tests {
    use crate::dbc::core::testing::parse;
    use crate::dbc::types::{
        errors::{Diagnostic, StatementKind},
        signal::{ByteOrder, MuxRole, ValueKind},
    };

    const MCU_GPS: &str = r#"
BO_ 1043 MCU_gpsVehicleSpeed: 8 MCU
 SG_ MCU_longitude : 7|28@0- (1E-006,0) [-134.217728|134.217727] "deg" Vector__XXX
 SG_ MCU_mux M : 0|3@1+ (1,0) [0|7] "" ECU1,ECU2
 SG_ MCU_speed m2 : 8|16@1+ (0.00390625,-10) [0|250.996] "km\"h" ECU1 ECU2
 SG_ MCU_sub m3M : 24|4@1+ (1,0) [0|15] "" ECU1
"#;

    #[test]
    fn test_signal_fields() {
        let (dbc, diagnostics) = parse(MCU_GPS);
        assert!(diagnostics.is_empty(), "{diagnostics:?}");
        let msg = dbc.message(1043).unwrap();
        assert_eq!(msg.signals.len(), 4);

        let lon = msg.signal("MCU_longitude").unwrap();
        assert_eq!(lon.message_id, 1043);
        assert_eq!(lon.start_bit, 7);
        assert_eq!(lon.length, 28);
        assert_eq!(lon.byte_order, ByteOrder::Motorola);
        assert_eq!(lon.value_kind, ValueKind::Signed);
        assert_eq!(lon.factor, 1e-6);
        assert_eq!(lon.offset, 0.0);
        assert_eq!(lon.min, -134.217728);
        assert_eq!(lon.max, 134.217727);
        assert_eq!(lon.unit, "deg");
        assert_eq!(lon.receivers, vec!["Vector__XXX"]);
        assert_eq!(lon.multiplexing_info().role, MuxRole::None);

        let mux = msg.signal("MCU_mux").unwrap();
        assert_eq!(mux.multiplexing_info().role, MuxRole::Multiplexor);
        assert_eq!(mux.receivers, vec!["ECU1", "ECU2"]);

        let speed = msg.signal("MCU_speed").unwrap();
        assert_eq!(speed.byte_order, ByteOrder::Intel);
        assert_eq!(speed.unit, "km\"h");
        assert_eq!(speed.multiplexing_info().group, Some(2));

        let sub = msg.signal("MCU_sub").unwrap();
        assert_eq!(
            sub.multiplexing_info().role,
            MuxRole::MultiplexedMultiplexor
        );
    }

    #[test]
    fn test_signal_without_message() {
        let (_, diagnostics) = parse(r#" SG_ S : 0|8@1+ (1,0) [0|0] "" X"#);
        assert_eq!(diagnostics, vec![Diagnostic::NoMessageFound]);
    }

    #[test]
    fn test_malformed_signal() {
        let (dbc, diagnostics) = parse("BO_ 1 M: 8 X\n SG_ S : 0|8@2+ (1,0) [0|0] \"\" X");
        assert!(dbc.message(1).unwrap().signals.is_empty());
        assert_eq!(
            diagnostics,
            vec![Diagnostic::SyntaxError {
                statement: StatementKind::Signal
            }]
        );
    }
}
