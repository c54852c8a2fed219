use serde_derive::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::dbc::types::attributes::CustomProperty;

/// Access type encoded in the `DUMMY_NODE_VECTOR` suffix of `EV_`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnvAccess {
    #[default]
    Unrestricted,
    Read,
    Write,
    ReadWrite,
}

impl EnvAccess {
    pub(crate) fn from_digit(digit: char) -> Option<Self> {
        match digit {
            '0' => Some(EnvAccess::Unrestricted),
            '1' => Some(EnvAccess::Read),
            '2' => Some(EnvAccess::Write),
            '3' => Some(EnvAccess::ReadWrite),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnvVarKind {
    Integer,
    Float,
    String,
    Data,
}

/// Kind-specific payload of an environment variable.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum EnvVarData {
    Integer { min: i64, max: i64, default: i64 },
    Float { min: f64, max: f64, default: f64 },
    String { default: String },
    /// Set by `ENVVAR_DATA_`.
    Data { length: u32 },
}

/// Environment variable (`EV_`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentVariable {
    pub name: String,
    /// Identifier written after the initial value.
    pub id: u32,
    pub unit: String,
    pub access: EnvAccess,
    pub data: EnvVarData,
    /// Owning node names.
    pub nodes: Vec<String>,
    pub comment: String,
    pub value_table: BTreeMap<i64, String>,
    pub properties: BTreeMap<String, CustomProperty>,
}

impl EnvironmentVariable {
    pub fn kind(&self) -> EnvVarKind {
        match self.data {
            EnvVarData::Integer { .. } => EnvVarKind::Integer,
            EnvVarData::Float { .. } => EnvVarKind::Float,
            EnvVarData::String { .. } => EnvVarKind::String,
            EnvVarData::Data { .. } => EnvVarKind::Data,
        }
    }
}
