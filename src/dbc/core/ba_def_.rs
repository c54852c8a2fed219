use regex::Regex;

use crate::dbc::builder::DbcBuilder;
use crate::dbc::core::{
    LazyRegex, StatementDecoder,
    strings::{NUM, collect_all_quoted, parse_float, parse_integer},
};
use crate::dbc::statements::StatementReader;
use crate::dbc::types::{
    attributes::{CustomPropertyDefinition, PropertyScope, PropertyType},
    errors::StatementKind,
};

/// `BA_DEF_` custom property definition. Without an object keyword the
/// property is global.
///
/// Examples:
/// - `BA_DEF_ BO_ "GenMsgCycleTime" INT 0 65535;`
/// - `BA_DEF_ SG_ "GenSigStartValue" FLOAT -1e9 1e9;`
/// - `BA_DEF_ "BusType" STRING ;`
/// - `BA_DEF_ BU_ "NmNode" ENUM "No","Yes";`
pub(crate) struct PropertyDefinitionDecoder;

impl StatementDecoder for PropertyDefinitionDecoder {
    fn keyword(&self) -> &'static str {
        "BA_DEF_ "
    }

    fn kind(&self) -> StatementKind {
        StatementKind::PropertyDefinition
    }

    fn decode(
        &self,
        statement: &str,
        builder: &mut DbcBuilder<'_>,
        _statements: &mut StatementReader<'_>,
    ) -> Option<()> {
        static RE: LazyRegex = LazyRegex::new(|| {
            Regex::new(
                r#"(?s)^BA_DEF_\s+(?:(?P<scope>BU_|BO_|SG_|EV_)\s+)?"(?P<name>[^"]*)"\s+(?P<kind>INT|HEX|FLOAT|STRING|ENUM)(?P<rest>.*?)\s*;?\s*$"#,
            )
            .unwrap()
        });
        static BOUNDS: LazyRegex = LazyRegex::new(|| {
            Regex::new(&format!(r"^\s+(?P<min>{NUM})\s+(?P<max>{NUM})$")).unwrap()
        });
        static ENUM_VALUES: LazyRegex = LazyRegex::new(|| {
            Regex::new(r#"^\s*(?:"(?:[^"\\]|\\.)*"\s*,?\s*)*$"#).unwrap()
        });

        let caps = RE.captures(statement)?;
        let scope = PropertyScope::from_keyword(caps.name("scope").map(|m| m.as_str()))?;
        let rest: &str = caps.name("rest")?.as_str();
        let bounds = || BOUNDS.captures(rest);

        let data: PropertyType = match caps.name("kind")?.as_str() {
            "INT" | "HEX" => {
                let b = bounds()?;
                let min: i64 = parse_integer(b.name("min")?.as_str())?;
                let max: i64 = parse_integer(b.name("max")?.as_str())?;
                if caps.name("kind")?.as_str() == "HEX" {
                    PropertyType::Hex {
                        min,
                        max,
                        default: None,
                    }
                } else {
                    PropertyType::Integer {
                        min,
                        max,
                        default: None,
                    }
                }
            }
            "FLOAT" => {
                let b = bounds()?;
                PropertyType::Float {
                    min: parse_float(b.name("min")?.as_str())?,
                    max: parse_float(b.name("max")?.as_str())?,
                    default: None,
                }
            }
            "STRING" if rest.trim().is_empty() => PropertyType::String { default: None },
            "ENUM" if ENUM_VALUES.is_match(rest) => PropertyType::Enum {
                values: collect_all_quoted(rest),
                default: None,
            },
            _ => return None,
        };

        builder.add_property_definition(CustomPropertyDefinition {
            name: caps.name("name")?.as_str().to_string(),
            scope,
            data,
        });
        Some(())
    }
}
