//! Per-component collection of resolved ports.

use crate::runtime::port::{InputPort, OutputPort};
use std::collections::HashMap;

/// All ports of one component, by name, plus flat lists in build order.
#[derive(Debug, Default)]
pub struct PortSet {
    inputs: HashMap<String, InputPort>,
    input_arrays: HashMap<String, Vec<InputPort>>,
    outputs: HashMap<String, OutputPort>,
    output_arrays: HashMap<String, Vec<OutputPort>>,
    all_inputs: Vec<InputPort>,
    all_outputs: Vec<OutputPort>,
}

impl PortSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert_input(&mut self, name: &str, port: InputPort) {
        self.all_inputs.push(port.clone());
        self.inputs.insert(name.to_string(), port);
    }

    pub(crate) fn insert_input_array(&mut self, name: &str, ports: Vec<InputPort>) {
        self.all_inputs.extend(ports.iter().cloned());
        self.input_arrays.insert(name.to_string(), ports);
    }

    pub(crate) fn insert_output(&mut self, name: &str, port: OutputPort) {
        self.all_outputs.push(port.clone());
        self.outputs.insert(name.to_string(), port);
    }

    pub(crate) fn insert_output_array(&mut self, name: &str, ports: Vec<OutputPort>) {
        self.all_outputs.extend(ports.iter().cloned());
        self.output_arrays.insert(name.to_string(), ports);
    }

    pub fn input(&self, name: &str) -> Option<&InputPort> {
        self.inputs.get(name)
    }

    pub fn input_array(&self, name: &str) -> Option<&[InputPort]> {
        self.input_arrays.get(name).map(Vec::as_slice)
    }

    pub fn output(&self, name: &str) -> Option<&OutputPort> {
        self.outputs.get(name)
    }

    pub fn output_array(&self, name: &str) -> Option<&[OutputPort]> {
        self.output_arrays.get(name).map(Vec::as_slice)
    }

    /// Every input slot, single and array.
    pub fn inputs(&self) -> &[InputPort] {
        &self.all_inputs
    }

    /// Every output slot, single and array.
    pub fn outputs(&self) -> &[OutputPort] {
        &self.all_outputs
    }

    pub fn all_closed(&self) -> bool {
        self.all_inputs.iter().all(InputPort::is_closed)
            && self.all_outputs.iter().all(OutputPort::is_closed)
    }
}
