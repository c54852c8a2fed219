use std::borrow::Cow;
use std::ffi::OsStr;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use encoding_rs::{Encoding, WINDOWS_1252};

use crate::dbc::builder::DbcBuilder;
use crate::dbc::core;
use crate::dbc::observer::{FailureObserver, SilentObserver};
use crate::dbc::statements::StatementReader;
use crate::dbc::types::{database::Dbc, errors::DbcParseError};

/// Runtime configuration of a [`Parser`].
#[derive(Clone, Copy, Debug)]
pub struct ParserOptions {
    /// Encoding used to decode byte input. A byte order mark overrides it.
    /// DBC editors write Windows-1252, which is the default.
    pub encoding: &'static Encoding,
    /// Replace German umlauts, `ß` and `¿` with ASCII fallbacks (`ü` -> `u`,
    /// `ß` -> `ss`, ...) to keep downstream consumers ASCII-only.
    pub transliterate: bool,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            encoding: WINDOWS_1252,
            transliterate: false,
        }
    }
}

/// DBC parser: options plus the observer receiving diagnostics.
///
/// ```no_run
/// use candbc_parser::{CollectingObserver, Parser};
///
/// let mut failures = CollectingObserver::new();
/// let db = Parser::new()
///     .observer(&mut failures)
///     .parse_path("vehicle.dbc")?;
/// for failure in failures.failures() {
///     eprintln!("{failure}");
/// }
/// println!("{} messages", db.message_count());
/// # Ok::<(), candbc_parser::DbcParseError>(())
/// ```
#[derive(Default)]
pub struct Parser<'o> {
    options: ParserOptions,
    observer: Option<&'o mut dyn FailureObserver>,
}

impl<'o> Parser<'o> {
    /// Parser with default options and a silent observer.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ParserOptions) -> Self {
        Self {
            options,
            observer: None,
        }
    }

    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    /// Sends every diagnostic to `observer`.
    pub fn observer(mut self, observer: &'o mut dyn FailureObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Parses a `.dbc` file from disk.
    ///
    /// # Errors
    /// Returns an `Err(DbcParseError)` if:
    /// - The path does not end in `.dbc` (any case).
    /// - The file cannot be opened.
    /// - There are I/O errors while reading.
    ///
    /// Problems inside the file are reported to the observer and never fail the call.
    pub fn parse_path(&mut self, path: impl AsRef<Path>) -> Result<Dbc, DbcParseError> {
        let path: &Path = path.as_ref();
        let is_dbc: bool = path
            .extension()
            .and_then(OsStr::to_str)
            .is_some_and(|ext| ext.eq_ignore_ascii_case("dbc"));
        if !is_dbc {
            return Err(DbcParseError::InvalidExtension {
                path: path.display().to_string(),
            });
        }

        let file: File = File::open(path).map_err(|source| DbcParseError::OpenFile {
            path: path.display().to_string(),
            source,
        })?;
        let mut bytes: Vec<u8> = Vec::new();
        BufReader::new(file)
            .read_to_end(&mut bytes)
            .map_err(|source| DbcParseError::Read {
                path: path.display().to_string(),
                source,
            })?;
        Ok(self.parse_bytes(&bytes))
    }

    /// Reads `reader` to the end and parses its content.
    pub fn parse_reader<R: Read>(&mut self, mut reader: R) -> Result<Dbc, DbcParseError> {
        let mut bytes: Vec<u8> = Vec::new();
        reader
            .read_to_end(&mut bytes)
            .map_err(|source| DbcParseError::ReadStream { source })?;
        Ok(self.parse_bytes(&bytes))
    }

    /// Decodes `bytes` with the configured encoding and parses the text.
    pub fn parse_bytes(&mut self, bytes: &[u8]) -> Dbc {
        let (text, used, had_errors) = self.options.encoding.decode(bytes);
        if had_errors {
            tracing::debug!(encoding = used.name(), "malformed sequences replaced while decoding");
        }
        self.parse_str(&text)
    }

    /// Parses text that is already decoded.
    pub fn parse_str(&mut self, text: &str) -> Dbc {
        let text: Cow<'_, str> = if self.options.transliterate {
            Cow::Owned(transliterate(text))
        } else {
            Cow::Borrowed(text)
        };
        match &mut self.observer {
            Some(observer) => parse_text(&text, &mut **observer),
            None => parse_text(&text, &mut SilentObserver),
        }
    }
}

fn parse_text(text: &str, observer: &mut dyn FailureObserver) -> Dbc {
    tracing::debug!(bytes = text.len(), "parsing DBC text");

    let mut builder = DbcBuilder::new(observer);
    let mut statements = StatementReader::from_text(text);
    core::run(&mut statements, &mut builder);
    let lines: usize = statements.line();
    let reported: usize = builder.observer().reported();
    let dbc: Dbc = builder.finalize();

    tracing::info!(
        lines,
        nodes = dbc.nodes().len(),
        messages = dbc.message_count(),
        signals = dbc.signals().count(),
        environment_variables = dbc.environment_variables().len(),
        diagnostics = reported,
        "parsed DBC"
    );
    dbc
}

// For each line, transform german characters in ASCII compatible characters
fn transliterate(src: &str) -> String {
    let mut out: String = String::with_capacity(src.len());
    for ch in src.chars() {
        match ch {
            'ü' => out.push('u'),
            'ö' => out.push('o'),
            'ä' => out.push('a'),
            'ß' => out.push_str("ss"),
            'Ü' => out.push('U'),
            'Ö' => out.push('O'),
            'Ä' => out.push('A'),
            '¿' => out.push('?'),
            _ => out.push(ch),
        }
    }
    out
}
