use super::attributes::Attributes;
use super::circuit::*;
use super::entity::*;
use super::leaf::*;

use serde::{Deserialize, Serialize};

use std::cell::RefCell;
use std::collections::BTreeMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Input,
    Output,
    Inout,
}

/// Direction and width of one end of a component.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EndSpec {
    pub direction: Direction,
    pub width: u32,
}

pub enum ComponentKind<'a> {
    Leaf(LeafType),
    /// A boundary pin of the enclosing circuit. `Input` pins drive their net.
    Pin(Direction),
    Clock,
    Subcircuit(&'a Circuit<'a>),
    Entity(&'a HdlEntity),
    /// A component the snapshot producer knows the shape of, but that has no HDL counterpart.
    Unknown {
        type_name: String,
        ends: Vec<EndSpec>,
    },
}

/// What one end of a component is attached to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Connection {
    Wire(WireId),
    /// One entry per end bit, least significant first.
    Bits(Vec<Option<WireBit>>),
}

/// A component placed in a [`Circuit`], created by one of the circuit's placement methods.
///
/// Ends are left unconnected until [`connect`](Component::connect) or
/// [`connect_bits`](Component::connect_bits) attaches them.
#[must_use]
pub struct Component<'a> {
    pub(crate) circuit: &'a Circuit<'a>,
    pub(crate) index: usize,
    pub(crate) kind: ComponentKind<'a>,
    pub(crate) attributes: Attributes,
    pub(crate) label: RefCell<Option<String>>,
    pub(crate) connections: RefCell<BTreeMap<usize, Connection>>,
}

impl<'a> Component<'a> {
    pub fn kind(&self) -> &ComponentKind<'a> {
        &self.kind
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Position of this component in its circuit.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn label(&self) -> Option<String> {
        self.label.borrow().clone()
    }

    pub fn set_label(&'a self, label: impl Into<String>) -> &'a Component<'a> {
        *self.label.borrow_mut() = Some(label.into());
        self
    }

    /// The ends of this component, in end-index order.
    ///
    /// A sub-circuit instance has one end per pin of the instantiated circuit, in pin order.
    pub fn ends(&self) -> Vec<EndSpec> {
        match &self.kind {
            ComponentKind::Leaf(leaf) => leaf.ends(&self.attributes),
            ComponentKind::Pin(direction) => {
                let width = self.attributes.width();
                vec![match direction {
                    Direction::Input => EndSpec::output(width),
                    Direction::Output => EndSpec::input(width),
                    Direction::Inout => EndSpec {
                        direction: Direction::Inout,
                        width,
                    },
                }]
            }
            ComponentKind::Clock => vec![EndSpec::output(1)],
            ComponentKind::Subcircuit(circuit) => circuit
                .pins()
                .iter()
                .map(|pin| EndSpec {
                    direction: match pin.kind {
                        ComponentKind::Pin(direction) => direction,
                        _ => unreachable!(),
                    },
                    width: pin.attributes.width(),
                })
                .collect(),
            ComponentKind::Entity(entity) => entity
                .ports
                .iter()
                .map(|port| EndSpec {
                    direction: port.direction,
                    width: port.width,
                })
                .collect(),
            ComponentKind::Unknown { ends, .. } => ends.clone(),
        }
    }

    /// Human-readable type name, used in diagnostics.
    pub fn type_name(&self) -> String {
        match &self.kind {
            ComponentKind::Leaf(leaf) => leaf.name().to_string(),
            ComponentKind::Pin(Direction::Input) => "Input Pin".to_string(),
            ComponentKind::Pin(Direction::Output) => "Output Pin".to_string(),
            ComponentKind::Pin(Direction::Inout) => "Inout Pin".to_string(),
            ComponentKind::Clock => "Clock".to_string(),
            ComponentKind::Subcircuit(circuit) => format!("Circuit \"{}\"", circuit.name),
            ComponentKind::Entity(entity) => format!("Entity \"{}\"", entity.name),
            ComponentKind::Unknown { type_name, .. } => type_name.clone(),
        }
    }

    /// Type name plus label or position, e.g. `Multiplexer "sel_mux"`.
    pub fn describe(&self) -> String {
        match self.label() {
            Some(label) if !label.trim().is_empty() => {
                format!("{} \"{}\"", self.type_name(), label)
            }
            _ => format!("{} #{}", self.type_name(), self.index),
        }
    }

    /// Attaches end `end` to every bit of `wire`, in bit order.
    ///
    /// A wire whose width differs from the end's width is accepted here and reported when the
    /// circuit is analyzed.
    ///
    /// # Panics
    ///
    /// Panics if this component has no end `end`, or if `wire` doesn't belong to this component's circuit.
    pub fn connect(&'a self, end: usize, wire: WireId) -> &'a Component<'a> {
        self.check_end(end);
        self.circuit.check_wire(wire);
        self.connections
            .borrow_mut()
            .insert(end, Connection::Wire(wire));
        self
    }

    /// Attaches each bit of end `end` to a single wire bit, or leaves it unconnected (`None`).
    ///
    /// # Panics
    ///
    /// Panics if this component has no end `end`, or if any bit doesn't belong to this component's circuit.
    pub fn connect_bits(
        &'a self,
        end: usize,
        bits: impl IntoIterator<Item = Option<WireBit>>,
    ) -> &'a Component<'a> {
        self.check_end(end);
        let bits = bits.into_iter().collect::<Vec<_>>();
        for bit in bits.iter().flatten() {
            self.circuit.check_wire_bit(*bit);
        }
        self.connections
            .borrow_mut()
            .insert(end, Connection::Bits(bits));
        self
    }

    pub fn connection(&self, end: usize) -> Option<Connection> {
        self.connections.borrow().get(&end).cloned()
    }

    fn check_end(&self, end: usize) {
        let num_ends = self.ends().len();
        if end >= num_ends {
            panic!(
                "Cannot connect end {} of {} in circuit \"{}\" because it only has {} end(s).",
                end,
                self.describe(),
                self.circuit.name,
                num_ends
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::*;

    #[test]
    fn pin_ends_face_into_the_circuit() {
        let c = Context::new();

        let m = c.circuit("m");
        let a = m.input_pin("a", 4);
        let q = m.output_pin("q", 2);

        assert_eq!(a.ends(), vec![EndSpec::output(4)]);
        assert_eq!(q.ends(), vec![EndSpec::input(2)]);
    }

    #[test]
    fn subcircuit_ends_follow_pin_order() {
        let c = Context::new();

        let inner = c.circuit("inner");
        let _ = inner.input_pin("a", 3);
        let _ = inner.clock(Attributes::new());
        let _ = inner.output_pin("q", 1);

        let outer = c.circuit("outer");
        let i = outer.instance(inner);

        assert_eq!(i.ends(), vec![EndSpec::input(3), EndSpec::output(1)]);
    }

    #[test]
    fn describe_uses_label_or_index() {
        let c = Context::new();

        let m = c.circuit("m");
        let n = m.leaf(LeafType::Not, Attributes::new());
        assert_eq!(n.describe(), "NOT Gate #0");

        n.set_label("inv");
        assert_eq!(n.describe(), "NOT Gate \"inv\"");
    }

    #[test]
    #[should_panic(
        expected = "Cannot connect end 2 of NOT Gate #0 in circuit \"m\" because it only has 2 end(s)."
    )]
    fn connect_missing_end_error() {
        let c = Context::new();

        let m = c.circuit("m");
        let w = m.wire(1);
        let n = m.leaf(LeafType::Not, Attributes::new());

        // Panic
        let _ = n.connect(2, w);
    }

    #[test]
    #[should_panic(expected = "Cannot use a wire of circuit \"a\" in circuit \"b\".")]
    fn foreign_wire_error() {
        let c = Context::new();

        let a = c.circuit("a");
        let w = a.wire(1);
        let b = c.circuit("b");
        let _ = b.wire(1);
        let pin = b.input_pin("i", 1);

        // Panic
        let _ = pin.connect(0, w);
    }
}
