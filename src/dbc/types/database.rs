//! Final, read-only DBC model.
//!
//! A [`Dbc`] is produced once by the parser and never changes afterwards.
//! Nodes and environment variables keep their declaration order, messages are
//! keyed (and ordered) by their numeric ID.

use serde_derive::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::dbc::types::{
    attributes::{CustomProperty, CustomPropertyDefinition},
    env_var::EnvironmentVariable,
    message::Message,
    node::Node,
    signal::Signal,
};

/// In-memory representation of a CAN database.
#[derive(Default, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Dbc {
    comment: String,
    nodes: Vec<Node>,
    messages: BTreeMap<u32, Message>,
    environment_variables: Vec<EnvironmentVariable>,
    global_properties: BTreeMap<String, CustomProperty>,
    property_definitions: Vec<CustomPropertyDefinition>,
}

impl Dbc {
    pub(crate) fn new(
        comment: String,
        nodes: Vec<Node>,
        messages: BTreeMap<u32, Message>,
        environment_variables: Vec<EnvironmentVariable>,
        global_properties: BTreeMap<String, CustomProperty>,
        property_definitions: Vec<CustomPropertyDefinition>,
    ) -> Self {
        Self {
            comment,
            nodes,
            messages,
            environment_variables,
            global_properties,
            property_definitions,
        }
    }

    /// Network comment (`CM_ "..."`).
    pub fn comment(&self) -> &str {
        &self.comment
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Messages ordered by ID.
    pub fn messages(&self) -> impl ExactSizeIterator<Item = &Message> + '_ {
        self.messages.values()
    }

    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    pub fn environment_variables(&self) -> &[EnvironmentVariable] {
        &self.environment_variables
    }

    /// Network-level properties, including defaults of unassigned ones.
    pub fn global_properties(&self) -> &BTreeMap<String, CustomProperty> {
        &self.global_properties
    }

    /// Every `BA_DEF_` seen, ordered by scope then name.
    pub fn property_definitions(&self) -> &[CustomPropertyDefinition] {
        &self.property_definitions
    }

    pub fn node(&self, name: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.name == name)
    }

    /// Message by numeric ID (without the extended marker bit).
    pub fn message(&self, id: u32) -> Option<&Message> {
        self.messages.get(&id)
    }

    pub fn message_by_name(&self, name: &str) -> Option<&Message> {
        self.messages.values().find(|m| m.name == name)
    }

    pub fn environment_variable(&self, name: &str) -> Option<&EnvironmentVariable> {
        self.environment_variables.iter().find(|e| e.name == name)
    }

    /// All signals of all messages, message by message.
    pub fn signals(&self) -> impl Iterator<Item = &Signal> + '_ {
        self.messages.values().flat_map(|m| m.signals.iter())
    }
}
