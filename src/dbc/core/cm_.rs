use regex::Regex;

use crate::dbc::builder::DbcBuilder;
use crate::dbc::core::{
    LazyRegex, StatementDecoder, message_id,
    strings::{IDENT, count_unescaped_quotes, unescape},
};
use crate::dbc::statements::{Statement, StatementReader};
use crate::dbc::types::errors::StatementKind;

/// `CM_` comments. Expected formats:
/// - `CM_ "Comment regarding the network";`
/// - `CM_ BU_ <node> "<text>";`
/// - `CM_ BO_ <id> "<text>";`
/// - `CM_ SG_ <id> <signal> "<text>";`
/// - `CM_ EV_ <variable> "<text>";`
///
/// The text may span several lines. When a line inside the text looks like a
/// statement keyword the reassembler cuts the comment short, so the decoder
/// pulls statements until the quotes balance or a pulled statement ends in
/// `";`. Text that is still open after that is a syntax error, and the
/// pulled statements go back to the reader to be parsed on their own.
pub(crate) struct CommentDecoder;

impl StatementDecoder for CommentDecoder {
    fn keyword(&self) -> &'static str {
        "CM_ "
    }

    fn kind(&self) -> StatementKind {
        StatementKind::Comment
    }

    fn decode(
        &self,
        statement: &str,
        builder: &mut DbcBuilder<'_>,
        statements: &mut StatementReader<'_>,
    ) -> Option<()> {
        static SIGNAL: LazyRegex = LazyRegex::new(|| {
            Regex::new(&format!(
                r#"(?s)^CM_\s+SG_\s+(?P<id>\d+)\s+(?P<name>{IDENT})\s+"(?P<text>.*)"\s*;?\s*$"#
            ))
            .unwrap()
        });
        static MESSAGE: LazyRegex = LazyRegex::new(|| {
            Regex::new(r#"(?s)^CM_\s+BO_\s+(?P<id>\d+)\s+"(?P<text>.*)"\s*;?\s*$"#).unwrap()
        });
        static NODE: LazyRegex = LazyRegex::new(|| {
            Regex::new(&format!(
                r#"(?s)^CM_\s+BU_\s+(?P<name>{IDENT})\s+"(?P<text>.*)"\s*;?\s*$"#
            ))
            .unwrap()
        });
        static VARIABLE: LazyRegex = LazyRegex::new(|| {
            Regex::new(&format!(
                r#"(?s)^CM_\s+EV_\s+(?P<name>{IDENT})\s+"(?P<text>.*)"\s*;?\s*$"#
            ))
            .unwrap()
        });
        static NETWORK: LazyRegex =
            LazyRegex::new(|| Regex::new(r#"(?s)^CM_\s+"(?P<text>.*)"\s*;?\s*$"#).unwrap());

        let mut full: String = statement.to_string();
        let mut pulled: Vec<Statement> = Vec::new();
        while count_unescaped_quotes(&full) % 2 != 0 {
            let Some(next) = statements.next_statement() else {
                break;
            };
            full.push('\n');
            full.push_str(&next.text);
            let closes: bool = next.text.trim_end().ends_with("\";");
            pulled.push(next);
            if closes {
                break;
            }
        }
        if count_unescaped_quotes(&full) % 2 != 0 {
            for next in pulled.into_iter().rev() {
                statements.push_back(next);
            }
            return None;
        }

        if let Some(caps) = SIGNAL.captures(&full) {
            let id: u32 = message_id(caps.name("id")?.as_str())?;
            let text: String = unescape(caps.name("text")?.as_str());
            builder.add_signal_comment(id, caps.name("name")?.as_str(), text);
        } else if let Some(caps) = MESSAGE.captures(&full) {
            let id: u32 = message_id(caps.name("id")?.as_str())?;
            builder.add_message_comment(id, unescape(caps.name("text")?.as_str()));
        } else if let Some(caps) = NODE.captures(&full) {
            let text: String = unescape(caps.name("text")?.as_str());
            builder.add_node_comment(caps.name("name")?.as_str(), text);
        } else if let Some(caps) = VARIABLE.captures(&full) {
            let text: String = unescape(caps.name("text")?.as_str());
            builder.add_env_var_comment(caps.name("name")?.as_str(), text);
        } else {
            let caps = NETWORK.captures(&full)?;
            builder.set_network_comment(unescape(caps.name("text")?.as_str()));
        }
        Some(())
    }
}
