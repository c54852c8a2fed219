use serde_derive::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::dbc::types::attributes::CustomProperty;

/// Definition of a signal within a CAN message (DBC `SG_`).
///
/// Describes position/bit-length, byte order, value encoding, scaling (factor/offset),
/// valid range, unit of measure, value table, receivers and multiplexing.
#[derive(Default, Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct Signal {
    /// ID of the owning message (extended marker bit already cleared).
    pub message_id: u32,
    /// Signal name, unique within its message.
    pub name: String,
    /// Start bit as written in the DBC (MSB for Motorola, LSB for Intel).
    pub start_bit: u16,
    /// Bit length.
    pub length: u16,
    pub byte_order: ByteOrder,
    pub value_kind: ValueKind,
    /// Scaling factor.
    pub factor: f64,
    /// Scaling offset.
    pub offset: f64,
    /// Minimum physical value.
    pub min: f64,
    /// Maximum physical value.
    pub max: f64,
    pub unit: String,
    /// Receiver node names, as listed (may contain `Vector__XXX`).
    pub receivers: Vec<String>,
    /// Raw-value-to-text mapping (`VAL_`).
    pub value_table: BTreeMap<i64, String>,
    /// Raw multiplexing tag (`M`, `m3`, `m3M`), if any.
    pub multiplexing: Option<String>,
    /// Link created by `SG_MUL_VAL_`.
    pub extended_multiplexing: Option<ExtendedMultiplexing>,
    /// Associated comment (`CM_ SG_`).
    pub comment: String,
    /// Physical start value derived from the `GenSigStartValue` property.
    pub initial_value: Option<f64>,
    pub properties: BTreeMap<String, CustomProperty>,
}

impl Signal {
    /// Classifies the raw multiplexing tag.
    pub fn multiplexing_info(&self) -> MultiplexingInfo {
        MultiplexingInfo::from_tag(self.multiplexing.as_deref())
    }

    pub fn is_signed(&self) -> bool {
        self.value_kind == ValueKind::Signed
    }

    pub fn is_little_endian(&self) -> bool {
        self.byte_order == ByteOrder::Intel
    }

    /// Returns the value-table label of a raw value.
    pub fn value_label(&self, raw: i64) -> Option<&str> {
        self.value_table.get(&raw).map(String::as_str)
    }
}

/// Bit numbering of a signal inside its frame.
#[derive(Default, Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum ByteOrder {
    /// Big-endian, `@0`.
    #[default]
    Motorola,
    /// Little-endian, `@1`.
    Intel,
}

/// Encoding of the raw bits of a signal.
#[derive(Default, Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum ValueKind {
    /// `+` in `SG_`
    #[default]
    Unsigned,
    /// `-` in `SG_`
    Signed,
    /// `SIG_VALTYPE_ ... 1`
    IeeeFloat,
    /// `SIG_VALTYPE_ ... 2`
    IeeeDouble,
}

/// What role (if any) a signal plays in multiplexing.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MuxRole {
    /// Not multiplexed (always present).
    #[default]
    None,
    /// The multiplexer switch (`M`).
    Multiplexor,
    /// Gated by a multiplexer value (`mX`).
    Multiplexed,
    /// Gated by a multiplexer value and itself a switch (`mXM`).
    MultiplexedMultiplexor,
    /// The tag could not be understood.
    Unknown,
}

/// Multiplexing metadata derived from a signal's raw tag.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiplexingInfo {
    pub role: MuxRole,
    /// Switch value for `mX` / `mXM` tags.
    pub group: Option<u64>,
}

impl MultiplexingInfo {
    pub fn from_tag(tag: Option<&str>) -> Self {
        let tag: &str = match tag.map(str::trim) {
            None | Some("") => return Self::default(),
            Some(t) => t,
        };
        if tag == "M" {
            return Self {
                role: MuxRole::Multiplexor,
                group: None,
            };
        }

        let unknown = Self {
            role: MuxRole::Unknown,
            group: None,
        };
        let Some(rest) = tag.strip_prefix('m') else {
            return unknown;
        };
        let (digits, role) = match rest.strip_suffix('M') {
            Some(d) => (d, MuxRole::MultiplexedMultiplexor),
            None => (rest, MuxRole::Multiplexed),
        };
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return unknown;
        }
        match digits.parse::<u64>() {
            Ok(group) => Self {
                role,
                group: Some(group),
            },
            Err(_) => unknown,
        }
    }
}

/// Closed range of multiplexer values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MuxRange {
    pub min: u64,
    pub max: u64,
}

/// Extended multiplexing (`SG_MUL_VAL_`): the signal is valid when `multiplexor`
/// takes any value of the union of `ranges`.
///
/// Ranges are kept sorted, non-overlapping and non-adjacent, so the union is
/// represented exactly without materializing every value.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtendedMultiplexing {
    pub multiplexor: String,
    ranges: Vec<MuxRange>,
}

impl ExtendedMultiplexing {
    pub fn new(multiplexor: impl Into<String>, ranges: impl IntoIterator<Item = MuxRange>) -> Self {
        let mut out = Self {
            multiplexor: multiplexor.into(),
            ranges: Vec::new(),
        };
        out.extend(ranges);
        out
    }

    /// Adds ranges to the union.
    pub fn extend(&mut self, ranges: impl IntoIterator<Item = MuxRange>) {
        self.ranges.extend(ranges.into_iter().map(|r| MuxRange {
            min: r.min.min(r.max),
            max: r.min.max(r.max),
        }));
        self.ranges.sort_unstable();

        let mut merged: Vec<MuxRange> = Vec::with_capacity(self.ranges.len());
        for r in self.ranges.drain(..) {
            match merged.last_mut() {
                Some(last) if r.min <= last.max.saturating_add(1) => last.max = last.max.max(r.max),
                _ => merged.push(r),
            }
        }
        self.ranges = merged;
    }

    pub fn ranges(&self) -> &[MuxRange] {
        &self.ranges
    }

    pub fn contains(&self, value: u64) -> bool {
        self.ranges
            .binary_search_by(|r| {
                if r.max < value {
                    std::cmp::Ordering::Less
                } else if r.min > value {
                    std::cmp::Ordering::Greater
                } else {
                    std::cmp::Ordering::Equal
                }
            })
            .is_ok()
    }

    /// Every multiplexer value in the union, ascending.
    pub fn values(&self) -> impl Iterator<Item = u64> + '_ {
        self.ranges.iter().flat_map(|r| r.min..=r.max)
    }
}
