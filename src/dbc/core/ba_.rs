use regex::Regex;

use crate::dbc::builder::{DbcBuilder, PropertyTarget};
use crate::dbc::core::{
    LazyRegex, StatementDecoder, ba_def_def_::value_fragment, message_id, strings::IDENT,
};
use crate::dbc::statements::StatementReader;
use crate::dbc::types::{attributes::PropertyLiteral, errors::StatementKind};

/// `BA_` custom property value.
///
/// Examples:
/// - `BA_ "BusType" "CAN";`
/// - `BA_ "NmNode" BU_ ECU1 1;`
/// - `BA_ "GenMsgCycleTime" BO_ 1041 100;`
/// - `BA_ "GenSigStartValue" SG_ 1041 DoorState 2;`
/// - `BA_ "Mask" EV_ EnvGear 255;`
pub(crate) struct PropertyDecoder;

impl StatementDecoder for PropertyDecoder {
    fn keyword(&self) -> &'static str {
        "BA_ "
    }

    fn kind(&self) -> StatementKind {
        StatementKind::Property
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
                    r#"(?s)^BA_\s+"(?P<name>[^"]*)"\s+"#,
                    r"(?:BU_\s+(?P<node>{ident})\s+",
                    r"|BO_\s+(?P<msg>\d+)\s+",
                    r"|SG_\s+(?P<sig_msg>\d+)\s+(?P<signal>{ident})\s+",
                    r"|EV_\s+(?P<var>{ident})\s+)?",
                    r"(?P<value>{value})\s*;?\s*$",
                ),
                ident = IDENT,
                value = value_fragment(),
            ))
            .unwrap()
        });

        let caps = RE.captures(statement)?;
        let target: PropertyTarget = if let Some(node) = caps.name("node") {
            PropertyTarget::Node(node.as_str().to_string())
        } else if let Some(id) = caps.name("msg") {
            PropertyTarget::Message(message_id(id.as_str())?)
        } else if let Some(id) = caps.name("sig_msg") {
            PropertyTarget::Signal(
                message_id(id.as_str())?,
                caps.name("signal")?.as_str().to_string(),
            )
        } else if let Some(var) = caps.name("var") {
            PropertyTarget::EnvironmentVariable(var.as_str().to_string())
        } else {
            PropertyTarget::Global
        };

        let literal = PropertyLiteral::from_token(caps.name("value")?.as_str());
        builder.add_property_value(caps.name("name")?.as_str(), target, &literal);
        Some(())
    }
}
