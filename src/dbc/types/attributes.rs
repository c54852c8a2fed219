use serde_derive::{Deserialize, Serialize};
use std::fmt;

use crate::dbc::core::strings::{parse_float, parse_integer};
use crate::dbc::types::errors::Diagnostic;

/// Which kind of object a custom property (`BA_DEF_`) applies to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PropertyScope {
    /// No object keyword in `BA_DEF_`: the property belongs to the network.
    #[default]
    Global,
    Node,
    Message,
    Signal,
    EnvironmentVariable,
}

impl PropertyScope {
    /// Maps the object keyword of a `BA_DEF_` line (`BU_`, `BO_`, `SG_`, `EV_`).
    pub(crate) fn from_keyword(keyword: Option<&str>) -> Option<Self> {
        match keyword {
            None => Some(PropertyScope::Global),
            Some("BU_") => Some(PropertyScope::Node),
            Some("BO_") => Some(PropertyScope::Message),
            Some("SG_") => Some(PropertyScope::Signal),
            Some("EV_") => Some(PropertyScope::EnvironmentVariable),
            Some(_) => None,
        }
    }
}

impl fmt::Display for PropertyScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PropertyScope::Global => "Global",
            PropertyScope::Node => "Node",
            PropertyScope::Message => "Message",
            PropertyScope::Signal => "Signal",
            PropertyScope::EnvironmentVariable => "EnvironmentVariable",
        })
    }
}

/// Property value kinds as declared by `BA_DEF_` lines.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertyKind {
    Integer,
    Hex,
    Float,
    #[default]
    String,
    Enum,
}

impl fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PropertyKind::Integer => "INT",
            PropertyKind::Hex => "HEX",
            PropertyKind::Float => "FLOAT",
            PropertyKind::String => "STRING",
            PropertyKind::Enum => "ENUM",
        })
    }
}

/// Type, bounds and default of a property definition.
///
/// Numeric bounds of `0 0` mean "unbounded", which is how DBC editors write
/// properties without limits.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum PropertyType {
    Integer {
        min: i64,
        max: i64,
        default: Option<i64>,
    },
    Hex {
        min: i64,
        max: i64,
        default: Option<i64>,
    },
    Float {
        min: f64,
        max: f64,
        default: Option<f64>,
    },
    String {
        default: Option<String>,
    },
    Enum {
        values: Vec<String>,
        default: Option<String>,
    },
}

/// Concrete value stored on an entity. The variant always matches the
/// [`PropertyKind`] of the definition it was built from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum PropertyValue {
    Integer(i64),
    Hex(i64),
    Float(f64),
    String(String),
    Enum(String),
}

impl PropertyValue {
    pub fn kind(&self) -> PropertyKind {
        match self {
            PropertyValue::Integer(_) => PropertyKind::Integer,
            PropertyValue::Hex(_) => PropertyKind::Hex,
            PropertyValue::Float(_) => PropertyKind::Float,
            PropertyValue::String(_) => PropertyKind::String,
            PropertyValue::Enum(_) => PropertyKind::Enum,
        }
    }

    /// Numeric view of the value (`None` for strings and enums).
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PropertyValue::Integer(v) | PropertyValue::Hex(v) => Some(*v as f64),
            PropertyValue::Float(v) => Some(*v),
            PropertyValue::String(_) | PropertyValue::Enum(_) => None,
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Integer(v) => write!(f, "{}", v),
            PropertyValue::Hex(v) => write!(f, "0x{:X}", v),
            PropertyValue::Float(v) => write!(f, "{}", v),
            PropertyValue::String(s) | PropertyValue::Enum(s) => f.write_str(s),
        }
    }
}

/// A value literal as it appears after the property name in `BA_` / `BA_DEF_DEF_`.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum PropertyLiteral {
    Quoted(String),
    Bare(String),
}

impl PropertyLiteral {
    /// Splits `"text"` from bare numeric tokens.
    pub(crate) fn from_token(token: &str) -> Self {
        match token.strip_prefix('"').and_then(|t| t.strip_suffix('"')) {
            Some(inner) => PropertyLiteral::Quoted(inner.to_string()),
            None => PropertyLiteral::Bare(token.to_string()),
        }
    }

    pub(crate) fn text(&self) -> &str {
        match self {
            PropertyLiteral::Quoted(s) | PropertyLiteral::Bare(s) => s,
        }
    }
}

/// A custom property declared with `BA_DEF_`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CustomPropertyDefinition {
    pub name: String,
    pub scope: PropertyScope,
    pub data: PropertyType,
}

impl CustomPropertyDefinition {
    pub fn kind(&self) -> PropertyKind {
        match self.data {
            PropertyType::Integer { .. } => PropertyKind::Integer,
            PropertyType::Hex { .. } => PropertyKind::Hex,
            PropertyType::Float { .. } => PropertyKind::Float,
            PropertyType::String { .. } => PropertyKind::String,
            PropertyType::Enum { .. } => PropertyKind::Enum,
        }
    }

    /// Value given to every entity that never received an explicit `BA_`.
    ///
    /// Falls back to zero, the empty string or the first enum entry when no
    /// `BA_DEF_DEF_` was seen.
    pub fn default_value(&self) -> PropertyValue {
        match &self.data {
            PropertyType::Integer { default, .. } => PropertyValue::Integer(default.unwrap_or(0)),
            PropertyType::Hex { default, .. } => PropertyValue::Hex(default.unwrap_or(0)),
            PropertyType::Float { default, .. } => PropertyValue::Float(default.unwrap_or(0.0)),
            PropertyType::String { default } => {
                PropertyValue::String(default.clone().unwrap_or_default())
            }
            PropertyType::Enum { values, default } => PropertyValue::Enum(
                default
                    .clone()
                    .or_else(|| values.first().cloned())
                    .unwrap_or_default(),
            ),
        }
    }

    /// Builds a property instance carrying `value`.
    pub fn instantiate(&self, value: PropertyValue) -> CustomProperty {
        CustomProperty {
            definition: self.clone(),
            value,
        }
    }

    /// Validates a literal against the type and bounds of this definition.
    pub(crate) fn parse_value(&self, literal: &PropertyLiteral) -> Result<PropertyValue, Diagnostic> {
        let text: &str = literal.text();
        let syntax = || Diagnostic::PropertyValueSyntaxError {
            name: self.name.clone(),
            value: text.to_string(),
        };
        let out_of_bound = || Diagnostic::PropertyValueOutOfBound {
            name: self.name.clone(),
            value: text.to_string(),
        };

        match &self.data {
            PropertyType::Integer { min, max, .. } | PropertyType::Hex { min, max, .. } => {
                let value: i64 = parse_integer(text).ok_or_else(syntax)?;
                if bounded(*min as f64, *max as f64) && (value < *min || value > *max) {
                    return Err(out_of_bound());
                }
                Ok(match self.kind() {
                    PropertyKind::Hex => PropertyValue::Hex(value),
                    _ => PropertyValue::Integer(value),
                })
            }
            PropertyType::Float { min, max, .. } => {
                let value: f64 = parse_float(text).ok_or_else(syntax)?;
                if bounded(*min, *max) && (value < *min || value > *max) {
                    return Err(out_of_bound());
                }
                Ok(PropertyValue::Float(value))
            }
            PropertyType::String { .. } => Ok(PropertyValue::String(text.to_string())),
            PropertyType::Enum { values, .. } => {
                let out_of_index = || Diagnostic::PropertyValueOutOfIndex {
                    name: self.name.clone(),
                    value: text.to_string(),
                };
                // Quoted literals name the entry, bare ones index it.
                match literal {
                    PropertyLiteral::Quoted(label) => values
                        .iter()
                        .find(|v| *v == label)
                        .map(|v| PropertyValue::Enum(v.clone()))
                        .ok_or_else(out_of_index),
                    PropertyLiteral::Bare(index) => {
                        let idx: i64 = parse_integer(index).ok_or_else(syntax)?;
                        usize::try_from(idx)
                            .ok()
                            .and_then(|i| values.get(i))
                            .map(|v| PropertyValue::Enum(v.clone()))
                            .ok_or_else(out_of_index)
                    }
                }
            }
        }
    }

    /// Applies a `BA_DEF_DEF_` literal.
    pub(crate) fn set_default(&mut self, literal: &PropertyLiteral) -> Result<(), Diagnostic> {
        let value: PropertyValue = self.parse_value(literal)?;
        match (&mut self.data, value) {
            (PropertyType::Integer { default, .. }, PropertyValue::Integer(v))
            | (PropertyType::Hex { default, .. }, PropertyValue::Hex(v)) => *default = Some(v),
            (PropertyType::Float { default, .. }, PropertyValue::Float(v)) => *default = Some(v),
            (PropertyType::String { default }, PropertyValue::String(v))
            | (PropertyType::Enum { default, .. }, PropertyValue::Enum(v)) => *default = Some(v),
            // parse_value always returns the variant of its own kind
            _ => {}
        }
        Ok(())
    }
}

fn bounded(min: f64, max: f64) -> bool {
    !(min == 0.0 && max == 0.0) && min <= max
}

/// A property value attached to a node, message, signal, environment variable
/// or to the network, together with the definition it was validated against.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CustomProperty {
    pub definition: CustomPropertyDefinition,
    pub value: PropertyValue,
}

impl CustomProperty {
    pub fn name(&self) -> &str {
        &self.definition.name
    }
}
