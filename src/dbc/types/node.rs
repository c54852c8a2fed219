use serde_derive::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::dbc::types::attributes::CustomProperty;

/// Node/ECU defined in the database (`BU_`).
#[derive(Default, Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct Node {
    /// Node/ECU name.
    pub name: String,
    /// Associated comment (`CM_ BU_`).
    pub comment: String,
    /// Environment variables this node is listed as owner of (`EV_`).
    pub environment_variables: Vec<String>,
    pub properties: BTreeMap<String, CustomProperty>,
}
