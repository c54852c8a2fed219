//! # dbc
//!
//! `dbc` is the module to work with .dbc files.
//!
//! Input is reassembled into logical statements, each statement is handed to
//! a chain of recognizers that fill a staging builder, and the builder is
//! finally frozen into an immutable [`Dbc`]. Problems found in the text are
//! reported to a [`FailureObserver`](observer::FailureObserver) and never stop
//! the parse.

pub mod observer;
pub mod parse;
pub mod types;

pub(crate) mod builder;
pub(crate) mod core;
pub(crate) mod statements;

use std::io::Read;
use std::path::Path;

use crate::dbc::parse::Parser;
use crate::dbc::types::{database::Dbc, errors::DbcParseError};

/// Parses a DBC file with default options, discarding diagnostics.
///
/// # Parameters
/// - `path`: Path to the `.dbc` file to parse.
///
/// # Returns
/// - `Ok(Dbc)` once the whole file was processed.
/// - `Err(DbcParseError)` if the file could not be opened or read.
///
/// # Errors
/// Returns an `Err` if:
/// - The file extension is not `.dbc`.
/// - The file cannot be opened.
/// - There are I/O errors while reading.
///
/// Use [`Parser`] with an observer to see what was skipped inside the file.
pub fn from_file(path: impl AsRef<Path>) -> Result<Dbc, DbcParseError> {
    Parser::new().parse_path(path)
}

/// Parses everything `reader` yields with default options.
pub fn from_reader<R: Read>(reader: R) -> Result<Dbc, DbcParseError> {
    Parser::new().parse_reader(reader)
}

/// Parses DBC text with default options.
pub fn from_str(text: &str) -> Dbc {
    Parser::new().parse_str(text)
}
