//! # candbc_parser
//!
//! Rust utilities for loading **DBC** (CAN database) files and working with their signals.
//!
//! ## Highlights
//! - **DBC parser**: turns a `.dbc` file, reader or string into an immutable [`Dbc`] model
//!   with nodes, messages, signals, environment variables and custom properties.
//! - **Tolerant**: malformed statements never abort a parse. Every problem is reported to a
//!   [`FailureObserver`] tagged with the input line it came from.
//! - **Signal codec**: bit-exact [`codec::pack`]/[`codec::unpack`] for Intel and Motorola
//!   signals, signed/unsigned/IEEE float/IEEE double encodings, on `u64` frames or byte buffers.
//!
//! ```no_run
//! use candbc_parser::{codec, dbc};
//!
//! let db = dbc::from_file("vehicle.dbc").expect("failed to read vehicle.dbc");
//! if let Some(msg) = db.message(0x123) {
//!     for sig in &msg.signals {
//!         println!("{} = {}", sig.name, codec::unpack(0x0102_0304_0506_0708, sig));
//!     }
//! }
//! ```

#[cfg(feature = "codec")]
pub mod codec;
#[cfg(feature = "dbc")]
pub mod dbc;

// Top-level re-exports
#[cfg(feature = "dbc")]
#[doc(inline)]
pub use crate::dbc::{
    observer::{
        CollectingObserver, FailureObserver, LineCountingObserver, SilentObserver,
        TracingObserver,
    },
    parse::{Parser, ParserOptions},
    types::{
        attributes::{
            CustomProperty, CustomPropertyDefinition, PropertyKind, PropertyScope, PropertyType,
            PropertyValue,
        },
        database::Dbc,
        env_var::{EnvAccess, EnvVarData, EnvVarKind, EnvironmentVariable},
        errors::{DbcParseError, Diagnostic, Failure, StatementKind},
        message::Message,
        node::Node,
        signal::{ByteOrder, ExtendedMultiplexing, MultiplexingInfo, MuxRange, MuxRole, Signal, ValueKind},
    },
};
