use regex::Regex;
use std::collections::BTreeMap;

use crate::dbc::builder::DbcBuilder;
use crate::dbc::core::{
    LazyRegex, StatementDecoder,
    strings::{IDENT, NUM, parse_integer, unescape},
};
use crate::dbc::statements::StatementReader;
use crate::dbc::types::errors::StatementKind;

/// `VAL_TABLE_ <name> (<int> "<label>")* ;`
pub(crate) struct ValueTableDefinitionDecoder;

impl StatementDecoder for ValueTableDefinitionDecoder {
    fn keyword(&self) -> &'static str {
        "VAL_TABLE_ "
    }

    fn kind(&self) -> StatementKind {
        StatementKind::ValueTableDefinition
    }

    fn decode(
        &self,
        statement: &str,
        builder: &mut DbcBuilder<'_>,
        _statements: &mut StatementReader<'_>,
    ) -> Option<()> {
        static RE: LazyRegex = LazyRegex::new(|| {
            Regex::new(&format!(
                r"(?s)^VAL_TABLE_\s+(?P<name>{IDENT})(?P<pairs>.*?)\s*;?\s*$"
            ))
            .unwrap()
        });

        let caps = RE.captures(statement)?;
        let table = parse_value_pairs(caps.name("pairs")?.as_str())?;
        builder.add_value_table(caps.name("name")?.as_str(), table);
        Some(())
    }
}

/// Parses a `<int> "<label>"` sequence. `None` if anything else is in there.
pub(crate) fn parse_value_pairs(body: &str) -> Option<BTreeMap<i64, String>> {
    static PAIR: LazyRegex = LazyRegex::new(|| {
        Regex::new(&format!(
            r#"(?P<value>{NUM})\s+"(?P<label>(?:[^"\\]|\\.)*)""#
        ))
        .unwrap()
    });
    static ALL_PAIRS: LazyRegex = LazyRegex::new(|| {
        Regex::new(&format!(
            r#"^(?:\s*{NUM}\s+"(?:[^"\\]|\\.)*")*\s*$"#
        ))
        .unwrap()
    });

    if !ALL_PAIRS.is_match(body) {
        return None;
    }
    let mut table: BTreeMap<i64, String> = BTreeMap::new();
    for caps in PAIR.captures_iter(body) {
        let value: i64 = parse_integer(caps.name("value")?.as_str())?;
        table.insert(value, unescape(caps.name("label")?.as_str()));
    }
    Some(table)
}
