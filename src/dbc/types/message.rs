use serde_derive::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::dbc::types::{
    attributes::CustomProperty,
    signal::{MuxRole, Signal},
};

/// Bit 31 of the `BO_` identifier marks an extended (29-bit) frame.
pub(crate) const EXTENDED_ID_FLAG: u32 = 0x8000_0000;

/// Splits a raw DBC message identifier into `(id, is_extended)`.
pub(crate) fn split_raw_id(raw: u32) -> (u32, bool) {
    (raw & !EXTENDED_ID_FLAG, raw & EXTENDED_ID_FLAG != 0)
}

/// CAN message defined in the database (`BO_`).
///
/// `id` never carries the extended marker bit; use [`Message::raw_id`] to get
/// the identifier as written in a DBC file.
#[derive(Default, Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct Message {
    /// Numeric CAN ID.
    pub id: u32,
    /// `true` for 29-bit identifiers.
    pub is_ext_id: bool,
    /// Message name.
    pub name: String,
    /// Payload length in bytes.
    pub dlc: u16,
    /// Transmitting node.
    pub transmitter: String,
    /// Further transmitters listed by `BO_TX_BU_`.
    pub additional_transmitters: Vec<String>,
    /// Associated comment (`CM_ BO_`).
    pub comment: String,
    /// Cycle time in ms, derived from the `GenMsgCycleTime` property.
    pub cycle_time: Option<u32>,
    /// Signals in declaration order.
    pub signals: Vec<Signal>,
    pub properties: BTreeMap<String, CustomProperty>,
}

impl Message {
    /// Identifier as written in the DBC (`id` with bit 31 set for extended frames).
    pub fn raw_id(&self) -> u32 {
        if self.is_ext_id {
            self.id | EXTENDED_ID_FLAG
        } else {
            self.id
        }
    }

    /// Uppercase hexadecimal ID, e.g. `0x1A5`.
    pub fn id_hex(&self) -> String {
        format!("0x{:X}", self.id)
    }

    pub fn signal(&self, name: &str) -> Option<&Signal> {
        self.signals.iter().find(|s| s.name == name)
    }

    /// The switch signal (`M`) of a multiplexed message.
    pub fn multiplexor(&self) -> Option<&Signal> {
        self.signals
            .iter()
            .find(|s| s.multiplexing_info().role == MuxRole::Multiplexor)
    }

    pub fn is_multiplexed(&self) -> bool {
        self.multiplexor().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_raw_id() {
        assert_eq!(split_raw_id(1041), (1041, false));
        assert_eq!(split_raw_id(2_527_679_645), (0x16A9_549D, true));
    }

    #[test]
    fn test_raw_id_and_multiplexor() {
        let msg = Message {
            id: 0x16A9_549D,
            is_ext_id: true,
            signals: vec![
                Signal {
                    name: "Payload".into(),
                    multiplexing: Some("m1".into()),
                    ..Default::default()
                },
                Signal {
                    name: "Switch".into(),
                    multiplexing: Some("M".into()),
                    ..Default::default()
                },
            ],
            ..Default::default()
        };
        assert_eq!(msg.raw_id(), 2_527_679_645);
        assert_eq!(msg.id_hex(), "0x16A9549D");
        assert!(msg.is_multiplexed());
        assert_eq!(msg.multiplexor().map(|s| s.name.as_str()), Some("Switch"));
        assert!(msg.signal("Payload").is_some());
        assert!(msg.signal("payload").is_none());
    }
}
