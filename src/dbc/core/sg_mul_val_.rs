use regex::Regex;

use crate::dbc::builder::DbcBuilder;
use crate::dbc::core::{LazyRegex, StatementDecoder, message_id, strings::IDENT};
use crate::dbc::statements::StatementReader;
use crate::dbc::types::{errors::StatementKind, signal::MuxRange};

/// `SG_MUL_VAL_ <id> <signal> <multiplexor> <lo>-<hi>[, <lo>-<hi>...];`
/// Example: `SG_MUL_VAL_ 100 Mux_2 Mux_1 3-3, 5-10;`
pub(crate) struct ExtendedMultiplexingDecoder;

impl StatementDecoder for ExtendedMultiplexingDecoder {
    fn keyword(&self) -> &'static str {
        "SG_MUL_VAL_ "
    }

    fn kind(&self) -> StatementKind {
        StatementKind::ExtendedMultiplexing
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
                    r"(?s)^SG_MUL_VAL_\s+(?P<id>\d+)\s+(?P<signal>{ident})\s+(?P<mux>{ident})\s+",
                    r"(?P<ranges>\d+\s*-\s*\d+(?:\s*,\s*\d+\s*-\s*\d+)*)\s*,?\s*;?\s*$",
                ),
                ident = IDENT,
            ))
            .unwrap()
        });
        static RANGE: LazyRegex =
            LazyRegex::new(|| Regex::new(r"(?P<lo>\d+)\s*-\s*(?P<hi>\d+)").unwrap());

        let caps = RE.captures(statement)?;
        let mut ranges: Vec<MuxRange> = Vec::new();
        for range in RANGE.captures_iter(caps.name("ranges")?.as_str()) {
            let min: u64 = range.name("lo")?.as_str().parse().ok()?;
            let max: u64 = range.name("hi")?.as_str().parse().ok()?;
            if min > max {
                return None;
            }
            ranges.push(MuxRange { min, max });
        }

        builder.add_extended_multiplexing(
            message_id(caps.name("id")?.as_str())?,
            caps.name("signal")?.as_str(),
            caps.name("mux")?.as_str(),
            ranges,
        );
        Some(())
    }
}
