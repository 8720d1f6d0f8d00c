use super::attributes::{self, Attributes};
use super::component::*;
use super::context::*;
use super::entity::*;
use super::leaf::*;

use crate::hdl::Dialect;

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::ptr;

/// A wire segment of a [`Circuit`], created by [`Circuit::wire`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WireId {
    pub(crate) circuit: usize,
    pub(crate) index: usize,
}

impl WireId {
    pub fn bit(self, bit: u32) -> WireBit {
        WireBit { wire: self, bit }
    }

    pub fn index(self) -> usize {
        self.index
    }
}

/// A single bit of a wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WireBit {
    pub wire: WireId,
    pub bit: u32,
}

/// A circuit definition, created by the [`Context`]::[`circuit`] method.
///
/// A circuit is a flat list of wires and placed components. Wires that touch are recorded with
/// [`join`](Circuit::join) and end up in the same net; single bits tapped by a splitter are tied
/// together with [`splice`](Circuit::splice).
///
/// # Examples
///
/// ```
/// use hdlgen::*;
///
/// let c = Context::new();
///
/// let inverter = c.circuit("inverter");
/// let i = inverter.wire(1);
/// let o = inverter.wire(1);
/// let _ = inverter.input_pin("i", 1).connect(0, i);
/// let _ = inverter.output_pin("o", 1).connect(0, o);
/// let not = inverter.leaf(LeafType::Not, Attributes::new());
/// let _ = not.connect(0, o).connect(1, i);
/// ```
///
/// [`Context`]: ./struct.Context.html
/// [`circuit`]: ./struct.Context.html#method.circuit
#[must_use]
pub struct Circuit<'a> {
    pub(crate) context: &'a Context<'a>,
    pub(crate) index: usize,
    pub(crate) name: String,

    pub(crate) wires: RefCell<Vec<u32>>,
    pub(crate) joins: RefCell<Vec<(WireId, WireId)>>,
    pub(crate) splices: RefCell<Vec<(WireBit, WireBit)>>,
    pub(crate) components: RefCell<Vec<&'a Component<'a>>>,
    pub(crate) custom_bodies: RefCell<HashMap<Dialect, String>>,
}

impl<'a> Circuit<'a> {
    pub(super) fn new(context: &'a Context<'a>, index: usize, name: String) -> Circuit<'a> {
        Circuit {
            context,
            index,
            name,

            wires: RefCell::new(Vec::new()),
            joins: RefCell::new(Vec::new()),
            splices: RefCell::new(Vec::new()),
            components: RefCell::new(Vec::new()),
            custom_bodies: RefCell::new(HashMap::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Position of this circuit in its [`Context`].
    pub fn index(&self) -> usize {
        self.index
    }

    /// Creates a wire with `width` bits.
    ///
    /// # Panics
    ///
    /// Panics if `width` is less than [`MIN_BIT_WIDTH`] or greater than [`MAX_BIT_WIDTH`], respectively.
    pub fn wire(&'a self, width: u32) -> WireId {
        if width < MIN_BIT_WIDTH {
            panic!(
                "Cannot create a wire with {} bit(s). Wires must not be narrower than {} bit(s).",
                width, MIN_BIT_WIDTH
            );
        }
        if width > MAX_BIT_WIDTH {
            panic!(
                "Cannot create a wire with {} bit(s). Wires must not be wider than {} bit(s).",
                width, MAX_BIT_WIDTH
            );
        }
        let mut wires = self.wires.borrow_mut();
        wires.push(width);
        WireId {
            circuit: self.index,
            index: wires.len() - 1,
        }
    }

    pub fn wire_width(&self, wire: WireId) -> u32 {
        self.check_wire(wire);
        self.wires.borrow()[wire.index]
    }

    /// Records that `a` and `b` touch, so they carry the same signal bit for bit.
    ///
    /// Joined wires must have the same width; this is checked when the circuit is analyzed.
    pub fn join(&'a self, a: WireId, b: WireId) {
        self.check_wire(a);
        self.check_wire(b);
        self.joins.borrow_mut().push((a, b));
    }

    /// Ties two single bits together, as a splitter does.
    pub fn splice(&'a self, a: WireBit, b: WireBit) {
        self.check_wire_bit(a);
        self.check_wire_bit(b);
        self.splices.borrow_mut().push((a, b));
    }

    /// Places a built-in component.
    ///
    /// # Panics
    ///
    /// Panics if `attributes` are outside the ranges [`LeafType::check_attributes`] accepts.
    pub fn leaf(&'a self, leaf: LeafType, attributes: Attributes) -> &'a Component<'a> {
        if let Err(message) = leaf.check_attributes(&attributes) {
            panic!(
                "Cannot place a {} in circuit \"{}\": {}.",
                leaf.name(),
                self.name,
                message
            );
        }
        self.place(ComponentKind::Leaf(leaf), attributes, None)
    }

    pub fn input_pin(&'a self, name: impl Into<String>, width: u32) -> &'a Component<'a> {
        self.pin(Direction::Input, name.into(), width)
    }

    pub fn output_pin(&'a self, name: impl Into<String>, width: u32) -> &'a Component<'a> {
        self.pin(Direction::Output, name.into(), width)
    }

    pub fn inout_pin(&'a self, name: impl Into<String>, width: u32) -> &'a Component<'a> {
        self.pin(Direction::Inout, name.into(), width)
    }

    fn pin(&'a self, direction: Direction, name: String, width: u32) -> &'a Component<'a> {
        if !(MIN_BIT_WIDTH..=MAX_BIT_WIDTH).contains(&width) {
            panic!(
                "Cannot create pin \"{}\" with {} bit(s) in circuit \"{}\". Pins must be between {} and {} bit(s) wide.",
                name, width, self.name, MIN_BIT_WIDTH, MAX_BIT_WIDTH
            );
        }
        self.place(
            ComponentKind::Pin(direction),
            Attributes::new().with(attributes::WIDTH, width),
            Some(name),
        )
    }

    /// Places a clock source. `attributes` may carry `high_ticks`, `low_ticks` and `phase`.
    pub fn clock(&'a self, attributes: Attributes) -> &'a Component<'a> {
        self.place(ComponentKind::Clock, attributes, None)
    }

    /// Places an instance of `circuit`.
    ///
    /// # Panics
    ///
    /// Panics if `circuit` belongs to a different [`Context`].
    pub fn instance(&'a self, circuit: &'a Circuit<'a>) -> &'a Component<'a> {
        if !ptr::eq(self.context, circuit.context) {
            panic!(
                "Cannot instantiate circuit \"{}\" in circuit \"{}\" because they belong to different contexts.",
                circuit.name, self.name
            );
        }
        self.place(ComponentKind::Subcircuit(circuit), Attributes::new(), None)
    }

    /// Places an instance of an externally described entity.
    pub fn entity_instance(&'a self, entity: &'a HdlEntity) -> &'a Component<'a> {
        self.place(ComponentKind::Entity(entity), Attributes::new(), None)
    }

    /// Places a component that has no HDL counterpart. Generation fails if it is reachable.
    pub fn unknown(
        &'a self,
        type_name: impl Into<String>,
        ends: Vec<EndSpec>,
        attributes: Attributes,
    ) -> &'a Component<'a> {
        self.place(
            ComponentKind::Unknown {
                type_name: type_name.into(),
                ends,
            },
            attributes,
            None,
        )
    }

    /// Supplies a hand-written architecture body for `dialect`, used instead of the generated one.
    ///
    /// The entity header and every instantiation of this circuit are still generated.
    pub fn set_custom_body(&'a self, dialect: Dialect, body: impl Into<String>) {
        self.custom_bodies.borrow_mut().insert(dialect, body.into());
    }

    pub fn custom_body(&self, dialect: Dialect) -> Option<String> {
        self.custom_bodies.borrow().get(&dialect).cloned()
    }

    pub fn components(&self) -> Vec<&'a Component<'a>> {
        self.components.borrow().clone()
    }

    /// Boundary pins in placement order.
    pub fn pins(&self) -> Vec<&'a Component<'a>> {
        self.components
            .borrow()
            .iter()
            .copied()
            .filter(|component| matches!(component.kind, ComponentKind::Pin(_)))
            .collect()
    }

    /// Widths of all wires, indexed by wire position.
    pub(crate) fn wire_widths(&self) -> Vec<u32> {
        self.wires.borrow().clone()
    }

    pub(crate) fn check_wire(&self, wire: WireId) {
        if wire.circuit != self.index {
            let owner = self
                .context
                .circuits
                .borrow()
                .get(wire.circuit)
                .map(|circuit| circuit.name.clone())
                .unwrap_or_default();
            panic!(
                "Cannot use a wire of circuit \"{}\" in circuit \"{}\".",
                owner, self.name
            );
        }
        let num_wires = self.wires.borrow().len();
        if wire.index >= num_wires {
            panic!(
                "Cannot use wire {} in circuit \"{}\" because it only has {} wire(s).",
                wire.index, self.name, num_wires
            );
        }
    }

    pub(crate) fn check_wire_bit(&self, bit: WireBit) {
        let width = self.wire_width(bit.wire);
        if bit.bit >= width {
            panic!(
                "Cannot use bit {} of wire {} in circuit \"{}\" because the wire is only {} bit(s) wide.",
                bit.bit, bit.wire.index, self.name, width
            );
        }
    }

    fn place(
        &'a self,
        kind: ComponentKind<'a>,
        attributes: Attributes,
        label: Option<String>,
    ) -> &'a Component<'a> {
        let mut components = self.components.borrow_mut();
        let component = self.context.component_arena.alloc(Component {
            circuit: self,
            index: components.len(),
            kind,
            attributes,
            label: RefCell::new(label),
            connections: RefCell::new(BTreeMap::new()),
        });
        components.push(component);
        component
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wires_are_numbered_in_creation_order() {
        let c = Context::new();

        let m = c.circuit("m");
        let a = m.wire(1);
        let b = m.wire(8);

        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);
        assert_eq!(m.wire_width(b), 8);
    }

    #[test]
    #[should_panic(
        expected = "Cannot create a wire with 0 bit(s). Wires must not be narrower than 1 bit(s)."
    )]
    fn wire_width_lt_min_error() {
        let c = Context::new();

        let m = c.circuit("m");

        // Panic
        let _ = m.wire(0);
    }

    #[test]
    #[should_panic(
        expected = "Cannot create a wire with 65 bit(s). Wires must not be wider than 64 bit(s)."
    )]
    fn wire_width_gt_max_error() {
        let c = Context::new();

        let m = c.circuit("m");

        // Panic
        let _ = m.wire(65);
    }

    #[test]
    #[should_panic(
        expected = "Cannot use bit 4 of wire 0 in circuit \"m\" because the wire is only 4 bit(s) wide."
    )]
    fn splice_bit_out_of_range_error() {
        let c = Context::new();

        let m = c.circuit("m");
        let a = m.wire(4);
        let b = m.wire(1);

        // Panic
        m.splice(a.bit(4), b.bit(0));
    }

    #[test]
    #[should_panic(
        expected = "Cannot place a Multiplexer in circuit \"m\": Multiplexer select width must be between 1 and 5 bit(s), not 0."
    )]
    fn invalid_leaf_attributes_error() {
        let c = Context::new();

        let m = c.circuit("m");

        // Panic
        let _ = m.leaf(
            LeafType::Multiplexer,
            Attributes::new().with(attributes::SELECT, 0u32),
        );
    }

    #[test]
    #[should_panic(
        expected = "Cannot instantiate circuit \"b\" in circuit \"a\" because they belong to different contexts."
    )]
    fn instance_from_other_context_error() {
        let c1 = Context::new();
        let c2 = Context::new();

        let a = c1.circuit("a");
        let b = c2.circuit("b");

        // Panic
        let _ = a.instance(b);
    }

    #[test]
    fn custom_bodies_are_per_dialect() {
        let c = Context::new();

        let m = c.circuit("m");
        m.set_custom_body(Dialect::Vhdl, "q <= a;");

        assert_eq!(m.custom_body(Dialect::Vhdl), Some("q <= a;".to_string()));
        assert_eq!(m.custom_body(Dialect::Verilog), None);
    }
}
