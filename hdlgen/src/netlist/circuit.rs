use super::bubbles::*;
use super::clock_tree::*;
use super::component::*;
use super::net_model::*;

use crate::error::{GenerationError, Result};
use crate::graph::{Circuit, Component, ComponentKind, Connection, Direction, WireBit};
use crate::hdl::Expr;
use crate::options::ClockMode;
use crate::sanitize::sanitize;

use log::trace;

use std::collections::{BTreeSet, HashMap};

/// The analyzed form of one circuit definition.
///
/// Built once per definition per generation run, bottom-up, so every sub-circuit a netlist
/// instantiates already has a netlist of its own.
pub struct Netlist<'a> {
    pub(crate) circuit: &'a Circuit<'a>,
    pub(crate) name: String,
    pub(crate) nets: NetModel,
    pub(crate) components: Vec<NetlistComponent<'a>>,
    pub(crate) bubbles: BubbleCounts,
    pub(crate) clock_trees: BTreeSet<usize>,
    /// Points carrying a clock tree: driven by a local clock source, by a clock output of a
    /// sub-circuit, or by an input pin every instance feeds from the same tree.
    pub(crate) clock_points: HashMap<ConnectionPoint, usize>,
    /// Pins carrying a clock tree across this circuit's boundary, by component index.
    pub(crate) pin_clocks: HashMap<usize, usize>,
}

impl<'a> Netlist<'a> {
    pub(crate) fn build(
        circuit: &'a Circuit<'a>,
        children: &HashMap<usize, &Netlist<'a>>,
        registry: &mut ClockTreeRegistry,
        warnings: &mut Vec<String>,
    ) -> Result<Netlist<'a>> {
        trace!("Analyzing circuit \"{}\"", circuit.name());

        let mut builder = NetModelBuilder::new(circuit.name(), circuit.wire_widths());
        for (a, b) in circuit.joins.borrow().iter() {
            builder.join(*a, *b)?;
        }
        for (a, b) in circuit.splices.borrow().iter() {
            builder.merge(*a, *b)?;
        }
        let mut nets = builder.build();

        let mut components = Vec::new();
        for component in circuit.components() {
            let ends = resolve_ends(circuit, component, &mut nets)?;
            components.push(NetlistComponent {
                component,
                category: Category::of(component),
                ends,
                bubbles: BubbleRanges::default(),
                clock_tree: None,
                port_name: None,
            });
        }

        let mut allocator = BubbleAllocator::new(circuit.name());
        let mut port_names: HashMap<String, String> = HashMap::new();
        for component in components.iter_mut() {
            if !component.category.is_pin() {
                continue;
            }
            let end = &component.ends[0];
            if end.is_unconnected() {
                let kind = BubbleKind::of(pin_direction(component.component));
                let width = end.width();
                let range = allocator.allocate(kind, width)?;
                match kind {
                    BubbleKind::Input => component.bubbles.input = range,
                    BubbleKind::Output => component.bubbles.output = range,
                    BubbleKind::Inout => component.bubbles.inout = range,
                }
                continue;
            }
            let label = component.component.label().unwrap_or_default();
            let name = sanitize(&label, &component.index().to_string());
            let description = component.component.describe();
            if let Some(first) = port_names.insert(name.to_ascii_lowercase(), description.clone())
            {
                return Err(GenerationError::IdentifierCollision {
                    identifier: name,
                    scope: circuit.name().to_string(),
                    first,
                    second: description,
                });
            }
            component.port_name = Some(name);
        }

        let mut clock_trees = BTreeSet::new();
        for component in components.iter_mut() {
            match component.component.kind() {
                ComponentKind::Subcircuit(child) => {
                    let netlist = children.get(&child.index()).ok_or_else(|| {
                        GenerationError::internal(format!(
                            "Circuit \"{}\" was not analyzed before its parent \"{}\".",
                            child.name(),
                            circuit.name()
                        ))
                    })?;
                    component.bubbles = allocator.allocate_all(netlist.bubbles)?;
                    clock_trees.extend(netlist.clock_trees.iter().copied());
                }
                ComponentKind::Clock => {
                    let id = registry.register(circuit, component.component);
                    component.clock_tree = Some(id);
                    clock_trees.insert(id);
                }
                _ => (),
            }
        }
        let bubbles = allocator.seal();

        let mut clock_points = HashMap::new();
        for component in components.iter() {
            let trees = match component.component.kind() {
                ComponentKind::Clock => vec![component.clock_tree],
                ComponentKind::Subcircuit(child) => match children.get(&child.index()) {
                    Some(netlist) => netlist
                        .pins()
                        .map(|pin| netlist.pin_clocks.get(&pin.index()).copied())
                        .collect(),
                    None => Vec::new(),
                },
                _ => continue,
            };
            for (end, tree) in component.ends.iter().zip(trees) {
                if let Some(tree) = tree {
                    for point in end.points.iter().flatten() {
                        clock_points.insert(*point, tree);
                    }
                }
            }
        }

        let mut pin_clocks = HashMap::new();
        for component in components.iter() {
            if component.category != Category::OutputPin || component.port_name.is_none() {
                continue;
            }
            if let Some([Some(point)]) = component.ends.first().map(|end| end.points.as_slice()) {
                if let Some(tree) = clock_points.get(point) {
                    pin_clocks.insert(component.index(), *tree);
                }
            }
        }

        for (point, count) in nets.multiply_driven() {
            warnings.push(format!(
                "Net {} in circuit \"{}\" has {} drivers on bit {}.",
                nets.net(point.net).name(),
                circuit.name(),
                count,
                point.bit
            ));
        }
        for (net, bits) in nets.undriven() {
            warnings.push(format!(
                "Net {} in circuit \"{}\" is read but never driven on bit(s) {}.",
                nets.net(net).name(),
                circuit.name(),
                bits.iter()
                    .map(u32::to_string)
                    .collect::<Vec<_>>()
                    .join(", ")
            ));
        }

        Ok(Netlist {
            circuit,
            name: sanitize(circuit.name(), &circuit.index().to_string()),
            nets,
            components,
            bubbles,
            clock_trees,
            clock_points,
            pin_clocks,
        })
    }

    pub fn circuit(&self) -> &'a Circuit<'a> {
        self.circuit
    }

    /// Sanitized circuit name, used as the entity/module name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn nets(&self) -> &NetModel {
        &self.nets
    }

    pub fn components(&self) -> &[NetlistComponent<'a>] {
        &self.components
    }

    pub fn component(&self, index: usize) -> Option<&NetlistComponent<'a>> {
        self.components.get(index)
    }

    /// Boundary pins, in the order sub-circuit instances number their ends.
    pub fn pins(&self) -> impl Iterator<Item = &NetlistComponent<'a>> {
        self.components
            .iter()
            .filter(|component| component.category.is_pin())
    }

    pub fn bubble_counts(&self) -> BubbleCounts {
        self.bubbles
    }

    /// Clock trees used by this circuit or anything below it.
    pub fn clock_trees(&self) -> &BTreeSet<usize> {
        &self.clock_trees
    }

    pub fn requires_global_tick(&self, mode: ClockMode) -> bool {
        mode == ClockMode::GlobalTick && !self.clock_trees.is_empty()
    }

    /// The clock tree `point` carries, if any.
    pub fn clock_tree_of(&self, point: ConnectionPoint) -> Option<usize> {
        self.clock_points.get(&point).copied()
    }

    /// Records that every instance feeds input pin `pin` from clock tree `tree`.
    pub(crate) fn inherit_clock(&mut self, pin: usize, tree: usize) {
        if let Some(component) = self.components.get(pin) {
            for point in component.ends.iter().flat_map(|end| end.points.iter().flatten()) {
                self.clock_points.insert(*point, tree);
            }
            self.pin_clocks.insert(pin, tree);
            self.clock_trees.insert(tree);
        }
    }

    pub fn point_expr(&self, point: ConnectionPoint) -> Expr {
        let net = self.nets.net(point.net);
        if net.width() == 1 {
            Expr::name(net.name())
        } else {
            Expr::index(net.name(), point.bit)
        }
    }

    /// `width` bits of `net`, starting at bit `low`.
    pub fn slice_expr(&self, net: usize, low: u32, width: u32) -> Expr {
        let net = self.nets.net(net);
        if low == 0 && width == net.width() {
            Expr::name(net.name())
        } else {
            Expr::slice(net.name(), low + width - 1, low)
        }
    }

    /// The whole of `end` as one expression, if it is a continuous bus.
    pub fn end_expr(&self, end: &ConnectionEnd) -> Option<Expr> {
        end.continuous_slice()
            .map(|(net, base)| self.slice_expr(net, base, end.width()))
    }

    pub fn bubble_expr(&self, kind: BubbleKind, range: BubbleRange) -> Expr {
        if self.bubbles.get(kind) == 1 {
            Expr::name(kind.port_name())
        } else {
            Expr::slice(kind.port_name(), range.end, range.start)
        }
    }
}

fn pin_direction(component: &Component<'_>) -> Direction {
    match component.kind() {
        ComponentKind::Pin(direction) => *direction,
        _ => Direction::Input,
    }
}

fn resolve_ends<'a>(
    circuit: &'a Circuit<'a>,
    component: &'a Component<'a>,
    nets: &mut NetModel,
) -> Result<Vec<ConnectionEnd>> {
    let mut ends = Vec::new();
    for (index, spec) in component.ends().into_iter().enumerate() {
        let points = match component.connection(index) {
            None => vec![None; spec.width as usize],
            Some(Connection::Wire(wire)) => {
                let width = circuit.wire_width(wire);
                if width != spec.width {
                    return Err(GenerationError::WidthMismatch {
                        circuit: circuit.name().to_string(),
                        what: format!(
                            "end {} of {} is connected to wire {}",
                            index,
                            component.describe(),
                            wire.index()
                        ),
                        expected: spec.width,
                        found: width,
                    });
                }
                (0..width)
                    .map(|bit| canonical_point(circuit, nets, wire.bit(bit)).map(Some))
                    .collect::<Result<Vec<_>>>()?
            }
            Some(Connection::Bits(bits)) => {
                if bits.len() != spec.width as usize {
                    return Err(GenerationError::WidthMismatch {
                        circuit: circuit.name().to_string(),
                        what: format!(
                            "end {} of {} is connected bit by bit",
                            index,
                            component.describe()
                        ),
                        expected: spec.width,
                        found: bits.len() as u32,
                    });
                }
                bits.iter()
                    .map(|bit| match bit {
                        Some(bit) => canonical_point(circuit, nets, *bit).map(Some),
                        None => Ok(None),
                    })
                    .collect::<Result<Vec<_>>>()?
            }
        };

        for (bit, point) in points.iter().enumerate() {
            if let Some(point) = point {
                let bit = bit as u32;
                match spec.direction {
                    Direction::Input => nets.add_sink(*point, component.index(), index, bit),
                    Direction::Output => nets.add_source(*point, component.index(), index, bit),
                    Direction::Inout => {
                        nets.add_source(*point, component.index(), index, bit);
                        nets.add_sink(*point, component.index(), index, bit);
                    }
                }
            }
        }

        ends.push(ConnectionEnd {
            direction: spec.direction,
            points,
        });
    }
    Ok(ends)
}

fn canonical_point(
    circuit: &Circuit<'_>,
    nets: &NetModel,
    bit: WireBit,
) -> Result<ConnectionPoint> {
    nets.canonical(bit).ok_or_else(|| {
        GenerationError::internal(format!(
            "Bit {} of wire {} is not part of circuit \"{}\".",
            bit.bit,
            bit.wire.index(),
            circuit.name()
        ))
    })
}
