//! Reads a design snapshot from JSON into a [`Context`].
//!
//! A snapshot lists circuits and externally described entities. Circuits may be listed in any
//! order and may instantiate circuits listed after them.
//!
//! ```json
//! {
//!   "top": "main",
//!   "circuits": [
//!     {
//!       "name": "main",
//!       "wires": [1, 1],
//!       "components": [
//!         { "type": "input_pin", "label": "a", "width": 1, "connections": [0] },
//!         { "type": "output_pin", "label": "y", "width": 1, "connections": [1] },
//!         { "type": "not", "connections": [1, 0] }
//!       ]
//!     }
//!   ]
//! }
//! ```

use crate::graph::*;
use crate::hdl::Dialect;

use serde::Deserialize;
use thiserror::Error;

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to read design file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse design: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid design: {0}")]
    Invalid(String),
}

fn invalid<T>(message: String) -> Result<T, LoadError> {
    Err(LoadError::Invalid(message))
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Snapshot {
    pub top: String,
    pub circuits: Vec<CircuitSnapshot>,
    #[serde(default)]
    pub entities: Vec<EntitySnapshot>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EntitySnapshot {
    pub name: String,
    pub dialect: Dialect,
    #[serde(default)]
    pub ports: Vec<PortSnapshot>,
    #[serde(default)]
    pub body: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PortSnapshot {
    pub name: String,
    pub direction: Direction,
    pub width: u32,
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BitSnapshot {
    pub wire: usize,
    pub bit: u32,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CircuitSnapshot {
    pub name: String,
    /// Width of each wire, indexed by wire number.
    #[serde(default)]
    pub wires: Vec<u32>,
    #[serde(default)]
    pub joins: Vec<(usize, usize)>,
    #[serde(default)]
    pub splices: Vec<(BitSnapshot, BitSnapshot)>,
    #[serde(default)]
    pub components: Vec<ComponentSnapshot>,
    #[serde(default)]
    pub custom_bodies: HashMap<Dialect, String>,
}

/// What one end is attached to: nothing, a whole wire, or individual wire bits.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ConnectionSnapshot {
    Wire(usize),
    Bits { bits: Vec<Option<BitSnapshot>> },
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComponentSnapshot {
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub attributes: Attributes,
    /// One entry per end, in end order. Missing trailing entries are unconnected.
    #[serde(default)]
    pub connections: Vec<Option<ConnectionSnapshot>>,
    /// Instantiated circuit, for `circuit` components.
    #[serde(default)]
    pub circuit: Option<String>,
    /// Instantiated entity, for `entity` components.
    #[serde(default)]
    pub entity: Option<String>,
    /// Pin width, for `input_pin`, `output_pin` and `inout_pin`.
    #[serde(default)]
    pub width: Option<u32>,
    /// End layout of a component type with no HDL counterpart.
    #[serde(default)]
    pub ends: Option<Vec<PortSnapshot>>,
}

impl Snapshot {
    pub fn parse(text: &str) -> Result<Snapshot, LoadError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn read(path: &Path) -> Result<Snapshot, LoadError> {
        let text = fs::read_to_string(path).map_err(|source| LoadError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Snapshot::parse(&text)
    }

    /// Builds every circuit and entity into `c` and returns the top circuit.
    ///
    /// The whole snapshot is checked before anything is created, so a bad snapshot leaves `c`
    /// untouched.
    pub fn build<'a>(&self, c: &'a Context<'a>) -> Result<&'a Circuit<'a>, LoadError> {
        self.validate()?;

        let mut entities = HashMap::new();
        for entity in self.entities.iter() {
            let ports = entity
                .ports
                .iter()
                .map(|port| EntityPort::new(port.name.clone(), port.direction, port.width))
                .collect();
            entities.insert(
                entity.name.as_str(),
                c.entity(entity.name.clone(), entity.dialect, ports, entity.body.clone()),
            );
        }

        let mut circuits = HashMap::new();
        for circuit in self.circuits.iter() {
            circuits.insert(circuit.name.as_str(), c.circuit(circuit.name.clone()));
        }

        for snapshot in self.circuits.iter() {
            let circuit = circuits[snapshot.name.as_str()];
            let wires = snapshot
                .wires
                .iter()
                .map(|width| circuit.wire(*width))
                .collect::<Vec<_>>();
            let bit = |b: BitSnapshot| wires[b.wire].bit(b.bit);
            for (a, b) in snapshot.joins.iter() {
                circuit.join(wires[*a], wires[*b]);
            }
            for (a, b) in snapshot.splices.iter() {
                circuit.splice(bit(*a), bit(*b));
            }
            for component in snapshot.components.iter() {
                let placed = match component.type_name.as_str() {
                    "input_pin" | "output_pin" | "inout_pin" => {
                        let name = component.label.clone().unwrap_or_default();
                        let width = component.width.unwrap_or(1);
                        match component.type_name.as_str() {
                            "input_pin" => circuit.input_pin(name, width),
                            "output_pin" => circuit.output_pin(name, width),
                            _ => circuit.inout_pin(name, width),
                        }
                    }
                    "clock" => circuit.clock(component.attributes.clone()),
                    "circuit" => {
                        let name = component.circuit.as_deref().unwrap_or_default();
                        circuit.instance(circuits[name])
                    }
                    "entity" => {
                        let name = component.entity.as_deref().unwrap_or_default();
                        circuit.entity_instance(entities[name])
                    }
                    type_name => match LeafType::from_key(type_name) {
                        Some(leaf) => circuit.leaf(leaf, component.attributes.clone()),
                        None => circuit.unknown(
                            type_name,
                            end_specs(component.ends.as_deref().unwrap_or_default()),
                            component.attributes.clone(),
                        ),
                    },
                };
                if let Some(label) = &component.label {
                    if !is_pin(&component.type_name) {
                        let _ = placed.set_label(label.clone());
                    }
                }
                for (end, connection) in component.connections.iter().enumerate() {
                    match connection {
                        None => (),
                        Some(ConnectionSnapshot::Wire(wire)) => {
                            let _ = placed.connect(end, wires[*wire]);
                        }
                        Some(ConnectionSnapshot::Bits { bits }) => {
                            let _ = placed.connect_bits(end, bits.iter().map(|b| b.map(bit)));
                        }
                    }
                }
            }
            for (dialect, body) in snapshot.custom_bodies.iter() {
                circuit.set_custom_body(*dialect, body.clone());
            }
        }

        Ok(circuits[self.top.as_str()])
    }

    /// Checks everything the graph construction methods would panic on.
    pub fn validate(&self) -> Result<(), LoadError> {
        let mut circuit_names = HashMap::new();
        for circuit in self.circuits.iter() {
            if circuit_names.insert(circuit.name.as_str(), circuit).is_some() {
                return invalid(format!("circuit \"{}\" is defined more than once", circuit.name));
            }
        }
        let mut entity_names = HashMap::new();
        for entity in self.entities.iter() {
            if entity_names.insert(entity.name.as_str(), entity).is_some() {
                return invalid(format!("entity \"{}\" is defined more than once", entity.name));
            }
            for port in entity.ports.iter() {
                check_width(port.width, || {
                    format!("port \"{}\" of entity \"{}\"", port.name, entity.name)
                })?;
            }
        }
        if !circuit_names.contains_key(self.top.as_str()) {
            return invalid(format!("top circuit \"{}\" is not defined", self.top));
        }

        for circuit in self.circuits.iter() {
            let scope = |what: String| format!("{} in circuit \"{}\"", what, circuit.name);
            for (index, width) in circuit.wires.iter().enumerate() {
                check_width(*width, || scope(format!("wire {}", index)))?;
            }
            let check_wire = |wire: usize| {
                if wire >= circuit.wires.len() {
                    return invalid(scope(format!("wire {} does not exist", wire)));
                }
                Ok(())
            };
            let check_bit = |b: BitSnapshot| {
                check_wire(b.wire)?;
                if b.bit >= circuit.wires[b.wire] {
                    return invalid(scope(format!(
                        "bit {} of wire {} does not exist",
                        b.bit, b.wire
                    )));
                }
                Ok(())
            };
            for (a, b) in circuit.joins.iter() {
                check_wire(*a)?;
                check_wire(*b)?;
            }
            for (a, b) in circuit.splices.iter() {
                check_bit(*a)?;
                check_bit(*b)?;
            }

            for (index, component) in circuit.components.iter().enumerate() {
                let what = || scope(format!("component {} ({})", index, component.type_name));
                let num_ends = match component.type_name.as_str() {
                    "input_pin" | "output_pin" | "inout_pin" => {
                        check_width(component.width.unwrap_or(1), what)?;
                        1
                    }
                    "clock" => 1,
                    "circuit" => {
                        let name = component.circuit.as_deref().unwrap_or_default();
                        match circuit_names.get(name) {
                            Some(child) => child
                                .components
                                .iter()
                                .filter(|c| is_pin(&c.type_name))
                                .count(),
                            None => {
                                return invalid(format!(
                                    "{} instantiates unknown circuit \"{}\"",
                                    what(),
                                    name
                                ))
                            }
                        }
                    }
                    "entity" => {
                        let name = component.entity.as_deref().unwrap_or_default();
                        match entity_names.get(name) {
                            Some(entity) => entity.ports.len(),
                            None => {
                                return invalid(format!(
                                    "{} instantiates unknown entity \"{}\"",
                                    what(),
                                    name
                                ))
                            }
                        }
                    }
                    type_name => match LeafType::from_key(type_name) {
                        Some(leaf) => {
                            if let Err(message) = leaf.check_attributes(&component.attributes) {
                                return invalid(format!("{}: {}", what(), message));
                            }
                            leaf.ends(&component.attributes).len()
                        }
                        None => match &component.ends {
                            Some(ends) => {
                                for end in ends.iter() {
                                    check_width(end.width, what)?;
                                }
                                ends.len()
                            }
                            None => {
                                return invalid(format!(
                                    "{} has an unknown type and no end layout",
                                    what()
                                ))
                            }
                        },
                    },
                };
                if component.connections.len() > num_ends {
                    return invalid(format!(
                        "{} has {} connection(s) but only {} end(s)",
                        what(),
                        component.connections.len(),
                        num_ends
                    ));
                }
                for connection in component.connections.iter().flatten() {
                    match connection {
                        ConnectionSnapshot::Wire(wire) => check_wire(*wire)?,
                        ConnectionSnapshot::Bits { bits } => {
                            for b in bits.iter().flatten() {
                                check_bit(*b)?;
                            }
                        }
                    }
                }
            }
        }

        Ok(())
    }
}

fn is_pin(type_name: &str) -> bool {
    matches!(type_name, "input_pin" | "output_pin" | "inout_pin")
}

fn check_width(width: u32, what: impl FnOnce() -> String) -> Result<(), LoadError> {
    if !(MIN_BIT_WIDTH..=MAX_BIT_WIDTH).contains(&width) {
        return invalid(format!(
            "{} is {} bit(s) wide, must be between {} and {}",
            what(),
            width,
            MIN_BIT_WIDTH,
            MAX_BIT_WIDTH
        ));
    }
    Ok(())
}

fn end_specs(ends: &[PortSnapshot]) -> Vec<EndSpec> {
    ends.iter()
        .map(|end| EndSpec {
            direction: end.direction,
            width: end.width,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::netlist::Design;

    const HALF_ADDER: &str = r#"{
        "top": "main",
        "circuits": [
            {
                "name": "half_adder",
                "wires": [1, 1, 1, 1],
                "components": [
                    { "type": "input_pin", "label": "a", "connections": [0] },
                    { "type": "input_pin", "label": "b", "connections": [1] },
                    { "type": "output_pin", "label": "sum", "connections": [2] },
                    { "type": "output_pin", "label": "carry", "connections": [3] },
                    { "type": "xor", "connections": [2, 0, 1] },
                    { "type": "and", "label": "carry gate", "connections": [3, 0, 1] }
                ]
            },
            {
                "name": "main",
                "wires": [2, 1, 1],
                "splices": [[{ "wire": 0, "bit": 0 }, { "wire": 1, "bit": 0 }]],
                "components": [
                    { "type": "input_pin", "label": "ab", "width": 2, "connections": [0] },
                    { "type": "output_pin", "label": "s", "connections": [2] },
                    {
                        "type": "circuit",
                        "circuit": "half_adder",
                        "connections": [1, { "bits": [{ "wire": 0, "bit": 1 }] }, 2]
                    }
                ],
                "custom_bodies": { "verilog": "// hand written" }
            }
        ]
    }"#;

    #[test]
    fn builds_circuits_in_any_order() {
        let c = Context::new();

        let top = Snapshot::parse(HALF_ADDER).unwrap().build(&c).unwrap();

        assert_eq!(top.name(), "main");
        assert_eq!(c.circuits().len(), 2);
        assert_eq!(top.components().len(), 3);
        assert_eq!(top.custom_body(Dialect::Verilog).as_deref(), Some("// hand written"));
        let adder = c.find_circuit("half_adder").unwrap();
        assert_eq!(adder.components()[5].label().as_deref(), Some("carry gate"));

        assert!(Design::analyze(top).is_ok());
    }

    fn load_error(text: &str) -> String {
        let c = Context::new();
        match Snapshot::parse(text).and_then(|snapshot| snapshot.build(&c).map(|_| ())) {
            Err(LoadError::Invalid(message)) => message,
            other => panic!("expected an invalid design, got {:?}", other.err()),
        }
    }

    #[test]
    fn missing_top() {
        assert_eq!(
            load_error(r#"{ "top": "x", "circuits": [] }"#),
            "top circuit \"x\" is not defined"
        );
    }

    #[test]
    fn bad_wire_reference() {
        assert_eq!(
            load_error(
                r#"{ "top": "m", "circuits": [{ "name": "m", "wires": [1], "components": [
                    { "type": "not", "connections": [0, 3] }
                ] }] }"#
            ),
            "wire 3 does not exist in circuit \"m\""
        );
    }

    #[test]
    fn bad_leaf_attributes() {
        assert_eq!(
            load_error(
                r#"{ "top": "m", "circuits": [{ "name": "m", "components": [
                    { "type": "multiplexer", "attributes": { "select": 9 } }
                ] }] }"#
            ),
            "component 0 (multiplexer) in circuit \"m\": Multiplexer select width must be between 1 and 5 bit(s), not 9"
        );
    }

    #[test]
    fn unknown_types_need_an_end_layout() {
        assert_eq!(
            load_error(
                r#"{ "top": "m", "circuits": [{ "name": "m", "components": [{ "type": "tty" }] }] }"#
            ),
            "component 0 (tty) in circuit \"m\" has an unknown type and no end layout"
        );

        let c = Context::new();
        let top = Snapshot::parse(
            r#"{ "top": "m", "circuits": [{ "name": "m", "components": [
                { "type": "tty", "ends": [{ "name": "data", "direction": "input", "width": 7 }] }
            ] }] }"#,
        )
        .unwrap()
        .build(&c)
        .unwrap();
        assert_eq!(top.components()[0].type_name(), "tty");
    }

    #[test]
    fn syntax_errors_are_parse_errors() {
        assert!(matches!(
            Snapshot::parse("{ \"top\": "),
            Err(LoadError::Parse(_))
        ));
    }
}
