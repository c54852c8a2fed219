use regex::Regex;
use std::collections::BTreeMap;

use crate::dbc::builder::DbcBuilder;
use crate::dbc::core::{
    LazyRegex, StatementDecoder,
    strings::{IDENT, NUM, parse_float, parse_integer, split_names, unescape},
};
use crate::dbc::statements::StatementReader;
use crate::dbc::types::{
    env_var::{EnvAccess, EnvVarData, EnvironmentVariable},
    errors::StatementKind,
};

/// `EV_` environment variable.
///
/// `EV_ <name>: <kind> [<min>|<max>] "<unit>" <initial> <id> DUMMY_NODE_VECTOR<access> <nodes>;`
///
/// `<kind>` is 0 (integer), 1 (float) or 2 (string). The access suffix is a
/// digit 0-3, optionally preceded by `800` which marks a string variable
/// whatever `<kind>` says.
pub(crate) struct EnvironmentVariableDecoder;

impl StatementDecoder for EnvironmentVariableDecoder {
    fn keyword(&self) -> &'static str {
        "EV_ "
    }

    fn kind(&self) -> StatementKind {
        StatementKind::EnvironmentVariable
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
                    r"(?s)^EV_\s+(?P<name>{ident})\s*:\s*(?P<kind>\d+)\s*",
                    r"\[\s*(?P<min>{num})\s*\|\s*(?P<max>{num})\s*\]\s*",
                    r#""(?P<unit>(?:[^"\\]|\\.)*)"\s*(?P<initial>{num})\s+(?P<id>\d+)\s+"#,
                    r"DUMMY_NODE_VECTOR(?P<marker>800)?(?P<access>[0-3])",
                    r"(?P<nodes>[\w\s,]*?)\s*;?\s*$",
                ),
                ident = IDENT,
                num = NUM,
            ))
            .unwrap()
        });

        let caps = RE.captures(statement)?;
        let text = |group: &str| caps.name(group).map(|m| m.as_str());

        let is_string: bool = caps.name("marker").is_some();
        let data: EnvVarData = match text("kind")? {
            _ if is_string => EnvVarData::String {
                default: String::new(),
            },
            "0" => EnvVarData::Integer {
                min: parse_integer(text("min")?)?,
                max: parse_integer(text("max")?)?,
                default: parse_integer(text("initial")?)?,
            },
            "1" => EnvVarData::Float {
                min: parse_float(text("min")?)?,
                max: parse_float(text("max")?)?,
                default: parse_float(text("initial")?)?,
            },
            "2" => EnvVarData::String {
                default: String::new(),
            },
            _ => return None,
        };

        builder.add_environment_variable(EnvironmentVariable {
            name: text("name")?.to_string(),
            id: text("id")?.parse().ok()?,
            unit: unescape(text("unit")?),
            access: EnvAccess::from_digit(text("access")?.chars().next()?)?,
            data,
            nodes: split_names(text("nodes")?).map(str::to_string).collect(),
            comment: String::new(),
            value_table: BTreeMap::new(),
            properties: BTreeMap::new(),
        });
        Some(())
    }
}

#[cfg(test)]
mod tests {
    use crate::dbc::core::testing::parse;
    use crate::dbc::observer::CollectingObserver;
    use crate::dbc::parse::Parser;
    use crate::dbc::types::{
        env_var::{EnvAccess, EnvVarData, EnvVarKind},
        errors::{Diagnostic, StatementKind},
    };

    #[test]
    fn test_environment_variable_kinds() {
        let text = r#"BU_: ECU1 ECU2
EV_ EnvInt: 0 [-10|1e2] "rpm" 5 1 DUMMY_NODE_VECTOR1 ECU1,ECU2;
EV_ EnvFloat: 1 [0|1.5] "" 0.25 2 DUMMY_NODE_VECTOR3 Vector__XXX;
EV_ EnvText: 0 [0|0] "" 0 3 DUMMY_NODE_VECTOR8002 ECU2;
EV_ EnvBad: 7 [0|0] "" 0 4 DUMMY_NODE_VECTOR0 ECU1;
"#;
        let (dbc, diagnostics) = parse(text);
        assert_eq!(
            diagnostics,
            vec![Diagnostic::SyntaxError {
                statement: StatementKind::EnvironmentVariable
            }]
        );

        let int = dbc.environment_variable("EnvInt").unwrap();
        assert_eq!(
            int.data,
            EnvVarData::Integer {
                min: -10,
                max: 100,
                default: 5
            }
        );
        assert_eq!(int.access, EnvAccess::Read);
        assert_eq!(int.unit, "rpm");
        assert_eq!(int.nodes, vec!["ECU1", "ECU2"]);

        let float = dbc.environment_variable("EnvFloat").unwrap();
        assert_eq!(float.kind(), EnvVarKind::Float);
        assert_eq!(float.access, EnvAccess::ReadWrite);

        let text_var = dbc.environment_variable("EnvText").unwrap();
        assert_eq!(text_var.kind(), EnvVarKind::String);
        assert_eq!(text_var.access, EnvAccess::Write);

        assert_eq!(
            dbc.node("ECU2").unwrap().environment_variables,
            vec!["EnvInt", "EnvText"]
        );
        assert!(dbc.environment_variable("EnvBad").is_none());
    }

    #[test]
    fn test_owners_declared_after_variable() {
        let text = "EV_ EnvEarly: 0 [0|1] \"\" 0 1 DUMMY_NODE_VECTOR0 ECU1,Ghost;\nBU_: ECU1\n";
        let mut observer = CollectingObserver::new();
        let dbc = Parser::new().observer(&mut observer).parse_str(text);

        assert_eq!(
            dbc.node("ECU1").unwrap().environment_variables,
            vec!["EnvEarly"]
        );
        let failures: Vec<(usize, Diagnostic)> = observer
            .into_failures()
            .into_iter()
            .map(|f| (f.line, f.diagnostic))
            .collect();
        assert_eq!(
            failures,
            vec![(
                1,
                Diagnostic::NodeReferenceNotFound {
                    name: "Ghost".into()
                }
            )]
        );
    }
}
