use regex::Regex;

use crate::dbc::builder::DbcBuilder;
use crate::dbc::core::{LazyRegex, StatementDecoder, strings::NUM};
use crate::dbc::statements::StatementReader;
use crate::dbc::types::{attributes::PropertyLiteral, errors::StatementKind};

/// Regex fragment for a property value: a quoted string or a number.
pub(crate) fn value_fragment() -> String {
    format!(r#""(?:[^"\\]|\\.)*"|{NUM}"#)
}

/// `BA_DEF_DEF_ "<name>" <value>;` applies to every scope defining `<name>`.
pub(crate) struct PropertyDefaultDecoder;

impl StatementDecoder for PropertyDefaultDecoder {
    fn keyword(&self) -> &'static str {
        "BA_DEF_DEF_ "
    }

    fn kind(&self) -> StatementKind {
        StatementKind::PropertyDefault
    }

    fn decode(
        &self,
        statement: &str,
        builder: &mut DbcBuilder<'_>,
        _statements: &mut StatementReader<'_>,
    ) -> Option<()> {
        static RE: LazyRegex = LazyRegex::new(|| {
            Regex::new(&format!(
                r#"(?s)^BA_DEF_DEF_\s+"(?P<name>[^"]*)"\s+(?P<value>{})\s*;?\s*$"#,
                value_fragment()
            ))
            .unwrap()
        });

        let caps = RE.captures(statement)?;
        let literal = PropertyLiteral::from_token(caps.name("value")?.as_str());
        builder.set_property_default(caps.name("name")?.as_str(), &literal);
        Some(())
    }
}
