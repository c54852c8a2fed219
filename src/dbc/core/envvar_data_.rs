use regex::Regex;

use crate::dbc::builder::DbcBuilder;
use crate::dbc::core::{LazyRegex, StatementDecoder, strings::IDENT};
use crate::dbc::statements::StatementReader;
use crate::dbc::types::errors::StatementKind;

/// `ENVVAR_DATA_ <name>: <size>;` turns a declared variable into a data buffer.
pub(crate) struct EnvironmentDataDecoder;

impl StatementDecoder for EnvironmentDataDecoder {
    fn keyword(&self) -> &'static str {
        "ENVVAR_DATA_ "
    }

    fn kind(&self) -> StatementKind {
        StatementKind::EnvironmentData
    }

    fn decode(
        &self,
        statement: &str,
        builder: &mut DbcBuilder<'_>,
        _statements: &mut StatementReader<'_>,
    ) -> Option<()> {
        static RE: LazyRegex = LazyRegex::new(|| {
            Regex::new(&format!(
                r"^ENVVAR_DATA_\s+(?P<name>{IDENT})\s*:\s*(?P<size>\d+)\s*;?\s*$"
            ))
            .unwrap()
        });

        let caps = RE.captures(statement)?;
        let size: u32 = caps.name("size")?.as_str().parse().ok()?;
        builder.set_env_var_data_size(caps.name("name")?.as_str(), size);
        Some(())
    }
}
