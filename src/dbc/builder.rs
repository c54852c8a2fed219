//! Mutable staging model filled by the statement recognizers.
//!
//! Storage follows the arena layout used for the public database in earlier
//! versions of this crate: [`SlotMap`] arenas with stable keys, order vectors
//! for presentation and hash maps for name/ID lookups. Nothing in here leaves
//! the module except through [`DbcBuilder::finalize`].
//!
//! Every lookup failure, duplicate or malformed value is reported through the
//! observer and the offending fact is dropped. Builder methods never fail.

use slotmap::{SecondaryMap, SlotMap, new_key_type};
use std::collections::{BTreeMap, HashMap};

use crate::dbc::observer::{FailureObserver, LineCountingObserver};
use crate::dbc::types::{
    attributes::{CustomProperty, CustomPropertyDefinition, PropertyLiteral, PropertyScope},
    database::Dbc,
    env_var::{EnvVarData, EnvironmentVariable},
    message::Message,
    node::Node,
    signal::{ExtendedMultiplexing, MuxRange, Signal, ValueKind},
};

new_key_type! { struct NodeKey; }
new_key_type! { struct MessageKey; }
new_key_type! { struct EnvVarKey; }

/// Placeholder node name DBC editors write when a list has no real node.
pub(crate) const PLACEHOLDER_NODE: &str = "Vector__XXX";

const CYCLE_TIME_PROPERTY: &str = "GenMsgCycleTime";
const START_VALUE_PROPERTY: &str = "GenSigStartValue";

/// Where the labels of a `VAL_` statement come from.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum ValueSource {
    Inline(BTreeMap<i64, String>),
    Named(String),
}

/// Object a `BA_` statement assigns to.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum PropertyTarget {
    Global,
    Node(String),
    Message(u32),
    Signal(u32, String),
    EnvironmentVariable(String),
}

impl PropertyTarget {
    fn scope(&self) -> PropertyScope {
        match self {
            PropertyTarget::Global => PropertyScope::Global,
            PropertyTarget::Node(_) => PropertyScope::Node,
            PropertyTarget::Message(_) => PropertyScope::Message,
            PropertyTarget::Signal(..) => PropertyScope::Signal,
            PropertyTarget::EnvironmentVariable(_) => PropertyScope::EnvironmentVariable,
        }
    }
}

struct MessageStage {
    message: Message,
    signals: Vec<Signal>,
    signal_index: HashMap<String, usize>,
}

impl MessageStage {
    fn signal_mut(&mut self, name: &str) -> Option<&mut Signal> {
        let idx = *self.signal_index.get(name)?;
        self.signals.get_mut(idx)
    }
}

pub(crate) struct DbcBuilder<'o> {
    observer: LineCountingObserver<'o>,

    comment: String,

    nodes: SlotMap<NodeKey, Node>,
    nodes_order: Vec<NodeKey>,
    node_key_by_name: HashMap<String, NodeKey>,

    messages: SlotMap<MessageKey, MessageStage>,
    msg_key_by_id: HashMap<u32, MessageKey>,

    env_vars: SlotMap<EnvVarKey, EnvironmentVariable>,
    env_vars_order: Vec<EnvVarKey>,
    env_var_key_by_name: HashMap<String, EnvVarKey>,
    // EV_ line, for owner diagnostics raised at finalize
    env_var_lines: SecondaryMap<EnvVarKey, usize>,

    value_tables: HashMap<String, BTreeMap<i64, String>>,

    definitions: BTreeMap<PropertyScope, BTreeMap<String, CustomPropertyDefinition>>,
    global_properties: BTreeMap<String, CustomProperty>,

    // last BO_ seen, owner of the following SG_ lines
    current_msg: Option<MessageKey>,
}

impl<'o> DbcBuilder<'o> {
    pub(crate) fn new(observer: &'o mut dyn FailureObserver) -> Self {
        Self {
            observer: LineCountingObserver::new(observer),
            comment: String::new(),
            nodes: SlotMap::with_key(),
            nodes_order: Vec::new(),
            node_key_by_name: HashMap::new(),
            messages: SlotMap::with_key(),
            msg_key_by_id: HashMap::new(),
            env_vars: SlotMap::with_key(),
            env_vars_order: Vec::new(),
            env_var_key_by_name: HashMap::new(),
            env_var_lines: SecondaryMap::new(),
            value_tables: HashMap::new(),
            definitions: BTreeMap::new(),
            global_properties: BTreeMap::new(),
            current_msg: None,
        }
    }

    pub(crate) fn observer(&mut self) -> &mut LineCountingObserver<'o> {
        &mut self.observer
    }

    // --------- Nodes ---------

    pub(crate) fn add_node(&mut self, name: &str) {
        if self.node_key_by_name.contains_key(name) {
            self.observer.duplicated_node(name);
            return;
        }
        let key = self.nodes.insert(Node {
            name: name.to_string(),
            ..Default::default()
        });
        self.nodes_order.push(key);
        self.node_key_by_name.insert(name.to_string(), key);
    }

    fn node_mut(&mut self, name: &str) -> Option<&mut Node> {
        match self.node_key_by_name.get(name) {
            Some(key) => self.nodes.get_mut(*key),
            None => {
                self.observer.node_reference_not_found(name);
                None
            }
        }
    }

    // --------- Messages & signals ---------

    /// Registers a message and makes it the owner of the following signals.
    /// A duplicate ID is reported and the existing message becomes current.
    pub(crate) fn add_message(&mut self, message: Message) {
        if let Some(key) = self.msg_key_by_id.get(&message.id) {
            self.observer.duplicated_message(message.id);
            self.current_msg = Some(*key);
            return;
        }
        let id = message.id;
        let key = self.messages.insert(MessageStage {
            message,
            signals: Vec::new(),
            signal_index: HashMap::new(),
        });
        self.msg_key_by_id.insert(id, key);
        self.current_msg = Some(key);
    }

    pub(crate) fn add_signal(&mut self, mut signal: Signal) {
        let Some(stage) = self.current_msg.and_then(|k| self.messages.get_mut(k)) else {
            self.observer.no_message_found();
            return;
        };
        let message_id = stage.message.id;
        if stage.signal_index.contains_key(&signal.name) {
            self.observer
                .duplicated_signal_in_message(message_id, &signal.name);
            return;
        }
        signal.message_id = message_id;
        stage
            .signal_index
            .insert(signal.name.clone(), stage.signals.len());
        stage.signals.push(signal);
    }

    fn message_mut(&mut self, id: u32) -> Option<&mut MessageStage> {
        match self.msg_key_by_id.get(&id) {
            Some(key) => self.messages.get_mut(*key),
            None => {
                self.observer.message_id_not_found(id);
                None
            }
        }
    }

    fn signal_mut(&mut self, message_id: u32, name: &str) -> Option<&mut Signal> {
        let key = match self.msg_key_by_id.get(&message_id) {
            Some(key) => *key,
            None => {
                self.observer.message_id_not_found(message_id);
                return None;
            }
        };
        let found: bool = self
            .messages
            .get(key)
            .is_some_and(|m| m.signal_index.contains_key(name));
        if !found {
            self.observer.signal_name_not_found(message_id, name);
            return None;
        }
        self.messages.get_mut(key)?.signal_mut(name)
    }

    pub(crate) fn add_additional_transmitters(&mut self, message_id: u32, nodes: &[&str]) {
        let Some(stage) = self.message_mut(message_id) else {
            return;
        };
        let mut duplicates: Vec<&str> = Vec::new();
        for node in nodes {
            let list = &mut stage.message.additional_transmitters;
            if list.iter().any(|n| n == node) {
                duplicates.push(*node);
            } else {
                list.push((*node).to_string());
            }
        }
        for node in duplicates {
            self.observer
                .duplicated_transmitter_in_message(message_id, node);
        }
    }

    /// The reference is checked even when `kind` is `None`.
    pub(crate) fn set_signal_value_kind(
        &mut self,
        message_id: u32,
        signal: &str,
        kind: Option<ValueKind>,
    ) {
        if let Some(sig) = self.signal_mut(message_id, signal) {
            if let Some(kind) = kind {
                sig.value_kind = kind;
            }
        }
    }

    /// Links a signal to its multiplexor (`SG_MUL_VAL_`). Ranges for the same
    /// multiplexor accumulate, a different multiplexor replaces the link.
    pub(crate) fn add_extended_multiplexing(
        &mut self,
        message_id: u32,
        signal: &str,
        multiplexor: &str,
        ranges: Vec<MuxRange>,
    ) {
        let Some(key) = self.msg_key_by_id.get(&message_id).copied() else {
            self.observer.message_id_not_found(message_id);
            return;
        };
        let Some(stage) = self.messages.get_mut(key) else {
            return;
        };
        if !stage.signal_index.contains_key(multiplexor) {
            self.observer.signal_name_not_found(message_id, multiplexor);
            return;
        }
        let Some(sig) = stage.signal_mut(signal) else {
            self.observer.signal_name_not_found(message_id, signal);
            return;
        };
        match sig.extended_multiplexing.as_mut() {
            Some(ext) if ext.multiplexor == multiplexor => ext.extend(ranges),
            _ => sig.extended_multiplexing = Some(ExtendedMultiplexing::new(multiplexor, ranges)),
        }
    }

    // --------- Environment variables ---------

    pub(crate) fn add_environment_variable(&mut self, variable: EnvironmentVariable) {
        if self.env_var_key_by_name.contains_key(&variable.name) {
            self.observer
                .duplicated_environment_variable(&variable.name);
            return;
        }
        let name = variable.name.clone();
        let key = self.env_vars.insert(variable);
        self.env_vars_order.push(key);
        self.env_var_key_by_name.insert(name, key);
        self.env_var_lines.insert(key, self.observer.line());
    }

    /// Adds every variable to its owner nodes. Runs at finalize because `EV_`
    /// may come before the `BU_` line that declares the owners.
    fn link_environment_variable_owners(&mut self) {
        for key in &self.env_vars_order {
            let Some(var) = self.env_vars.get(*key) else {
                continue;
            };
            if let Some(line) = self.env_var_lines.get(*key) {
                self.observer.set_current_line(*line);
            }
            for node_name in &var.nodes {
                if node_name == PLACEHOLDER_NODE {
                    continue;
                }
                match self
                    .node_key_by_name
                    .get(node_name)
                    .and_then(|k| self.nodes.get_mut(*k))
                {
                    Some(node) => node.environment_variables.push(var.name.clone()),
                    None => self.observer.node_reference_not_found(node_name),
                }
            }
        }
    }

    fn env_var_mut(&mut self, name: &str) -> Option<&mut EnvironmentVariable> {
        match self.env_var_key_by_name.get(name) {
            Some(key) => self.env_vars.get_mut(*key),
            None => {
                self.observer.environment_variable_not_found(name);
                None
            }
        }
    }

    /// `ENVVAR_DATA_`: turns the variable into a raw data buffer of `length` bytes.
    pub(crate) fn set_env_var_data_size(&mut self, name: &str, length: u32) {
        if let Some(var) = self.env_var_mut(name) {
            var.data = EnvVarData::Data { length };
        }
    }

    // --------- Comments ---------

    pub(crate) fn set_network_comment(&mut self, text: String) {
        self.comment = text;
    }

    pub(crate) fn add_node_comment(&mut self, name: &str, text: String) {
        if let Some(node) = self.node_mut(name) {
            node.comment = text;
        }
    }

    pub(crate) fn add_message_comment(&mut self, id: u32, text: String) {
        if let Some(stage) = self.message_mut(id) {
            stage.message.comment = text;
        }
    }

    pub(crate) fn add_signal_comment(&mut self, message_id: u32, signal: &str, text: String) {
        if let Some(sig) = self.signal_mut(message_id, signal) {
            sig.comment = text;
        }
    }

    pub(crate) fn add_env_var_comment(&mut self, name: &str, text: String) {
        if let Some(var) = self.env_var_mut(name) {
            var.comment = text;
        }
    }

    // --------- Value tables ---------

    /// `VAL_TABLE_`. Redefinitions are reported and replace the earlier table.
    pub(crate) fn add_value_table(&mut self, name: &str, table: BTreeMap<i64, String>) {
        if self.value_tables.insert(name.to_string(), table).is_some() {
            self.observer.duplicated_value_table(name);
        }
    }

    fn resolve_values(&mut self, source: ValueSource) -> Option<BTreeMap<i64, String>> {
        match source {
            ValueSource::Inline(table) => Some(table),
            ValueSource::Named(name) => match self.value_tables.get(&name) {
                Some(table) => Some(table.clone()),
                None => {
                    self.observer.value_table_not_found(&name);
                    None
                }
            },
        }
    }

    pub(crate) fn link_signal_values(&mut self, message_id: u32, signal: &str, source: ValueSource) {
        let Some(table) = self.resolve_values(source) else {
            return;
        };
        if let Some(sig) = self.signal_mut(message_id, signal) {
            sig.value_table = table;
        }
    }

    pub(crate) fn link_env_var_values(&mut self, name: &str, source: ValueSource) {
        let Some(table) = self.resolve_values(source) else {
            return;
        };
        if let Some(var) = self.env_var_mut(name) {
            var.value_table = table;
        }
    }

    // --------- Custom properties ---------

    pub(crate) fn add_property_definition(&mut self, definition: CustomPropertyDefinition) {
        let scoped = self.definitions.entry(definition.scope).or_default();
        if scoped.contains_key(&definition.name) {
            self.observer
                .duplicated_property_definition(&definition.name, definition.scope);
            return;
        }
        scoped.insert(definition.name.clone(), definition);
    }

    /// `BA_DEF_DEF_`: sets the default of every definition named `name`,
    /// whatever its scope.
    pub(crate) fn set_property_default(&mut self, name: &str, literal: &PropertyLiteral) {
        let mut found = false;
        let mut failures = Vec::new();
        for scoped in self.definitions.values_mut() {
            if let Some(def) = scoped.get_mut(name) {
                found = true;
                if let Err(diagnostic) = def.set_default(literal) {
                    failures.push(diagnostic);
                }
            }
        }
        if !found {
            self.observer
                .property_name_not_found(name, PropertyScope::Global);
        }
        for diagnostic in failures {
            self.observer.report(diagnostic);
        }
    }

    /// `BA_`: validates `literal` against the definition of `name` in the scope
    /// of `target` and stores it. The first assignment wins.
    pub(crate) fn add_property_value(
        &mut self,
        name: &str,
        target: PropertyTarget,
        literal: &PropertyLiteral,
    ) {
        let scope = target.scope();
        let Some(definition) = self.definitions.get(&scope).and_then(|d| d.get(name)) else {
            self.observer.property_name_not_found(name, scope);
            return;
        };
        let property: CustomProperty = match definition.parse_value(literal) {
            Ok(value) => definition.instantiate(value),
            Err(diagnostic) => {
                self.observer.report(diagnostic);
                return;
            }
        };

        match target {
            PropertyTarget::Global => {
                if self.global_properties.contains_key(name) {
                    self.observer.duplicated_global_property(name);
                } else {
                    self.global_properties.insert(name.to_string(), property);
                }
            }
            PropertyTarget::Node(node_name) => {
                let Some(node) = self.node_mut(&node_name) else {
                    return;
                };
                if node.properties.contains_key(name) {
                    self.observer.duplicated_property_in_node(name, &node_name);
                } else {
                    node.properties.insert(name.to_string(), property);
                }
            }
            PropertyTarget::Message(id) => {
                let Some(stage) = self.message_mut(id) else {
                    return;
                };
                if stage.message.properties.contains_key(name) {
                    self.observer.duplicated_property_in_message(name, id);
                } else {
                    stage.message.properties.insert(name.to_string(), property);
                }
            }
            PropertyTarget::Signal(id, signal) => {
                let Some(sig) = self.signal_mut(id, &signal) else {
                    return;
                };
                if sig.properties.contains_key(name) {
                    self.observer.duplicated_property_in_signal(name, id, &signal);
                } else {
                    sig.properties.insert(name.to_string(), property);
                }
            }
            PropertyTarget::EnvironmentVariable(var_name) => {
                let Some(var) = self.env_var_mut(&var_name) else {
                    return;
                };
                if var.properties.contains_key(name) {
                    self.observer
                        .duplicated_property_in_environment_variable(name, &var_name);
                } else {
                    var.properties.insert(name.to_string(), property);
                }
            }
        }
    }

    // --------- Finalize ---------

    /// Fills property defaults, derives cycle times and start values and
    /// freezes everything into a [`Dbc`].
    pub(crate) fn finalize(mut self) -> Dbc {
        self.link_environment_variable_owners();

        let definitions = std::mem::take(&mut self.definitions);
        let scoped = |scope: PropertyScope| definitions.get(&scope);
        let mut filled: usize = 0;

        let mut nodes: Vec<Node> = Vec::with_capacity(self.nodes_order.len());
        for key in &self.nodes_order {
            if let Some(mut node) = self.nodes.remove(*key) {
                filled += fill_defaults(&mut node.properties, scoped(PropertyScope::Node));
                nodes.push(node);
            }
        }

        let mut messages: BTreeMap<u32, Message> = BTreeMap::new();
        for (_, stage) in self.messages.drain() {
            let MessageStage {
                mut message,
                mut signals,
                ..
            } = stage;
            filled += fill_defaults(&mut message.properties, scoped(PropertyScope::Message));
            message.cycle_time = message
                .properties
                .get(CYCLE_TIME_PROPERTY)
                .and_then(|p| p.value.as_f64())
                .filter(|v| v.is_finite() && *v >= 0.0 && *v <= u32::MAX as f64)
                .map(|v| v.round() as u32);

            for signal in &mut signals {
                filled += fill_defaults(&mut signal.properties, scoped(PropertyScope::Signal));
                signal.initial_value = signal
                    .properties
                    .get(START_VALUE_PROPERTY)
                    .and_then(|p| p.value.as_f64())
                    .map(|raw| raw * signal.factor + signal.offset);
            }
            message.signals = signals;
            messages.insert(message.id, message);
        }

        let mut environment_variables: Vec<EnvironmentVariable> =
            Vec::with_capacity(self.env_vars_order.len());
        for key in &self.env_vars_order {
            if let Some(mut var) = self.env_vars.remove(*key) {
                filled += fill_defaults(
                    &mut var.properties,
                    scoped(PropertyScope::EnvironmentVariable),
                );
                environment_variables.push(var);
            }
        }

        let mut global_properties = std::mem::take(&mut self.global_properties);
        filled += fill_defaults(&mut global_properties, scoped(PropertyScope::Global));

        tracing::debug!(filled, "filled default property values");

        let property_definitions: Vec<CustomPropertyDefinition> = definitions
            .into_values()
            .flat_map(BTreeMap::into_values)
            .collect();

        Dbc::new(
            self.comment,
            nodes,
            messages,
            environment_variables,
            global_properties,
            property_definitions,
        )
    }
}

/// Gives every definition missing from `properties` its default value.
/// Returns how many values were added.
fn fill_defaults(
    properties: &mut BTreeMap<String, CustomProperty>,
    definitions: Option<&BTreeMap<String, CustomPropertyDefinition>>,
) -> usize {
    let Some(definitions) = definitions else {
        return 0;
    };
    let mut filled = 0;
    for (name, def) in definitions {
        if !properties.contains_key(name) {
            properties.insert(name.clone(), def.instantiate(def.default_value()));
            filled += 1;
        }
    }
    filled
}
