use super::circuit::*;
use super::clock_tree::*;
use super::component::Category;

use crate::error::{GenerationError, Result};
use crate::graph::{Circuit, ComponentKind};

use log::debug;

use std::collections::HashMap;

/// Every circuit definition reachable from a top circuit, analyzed bottom-up.
pub struct Design<'a> {
    netlists: Vec<Netlist<'a>>,
    index: HashMap<usize, usize>,
    top: usize,
    clock_trees: ClockTreeRegistry,
    warnings: Vec<String>,
}

impl<'a> Design<'a> {
    /// Analyzes `top` and every circuit it instantiates, directly or indirectly.
    ///
    /// Fails on the first structural error: a width mismatch, a pin name collision, or a circuit
    /// that instantiates itself.
    pub fn analyze(top: &'a Circuit<'a>) -> Result<Design<'a>> {
        let mut design = Design {
            netlists: Vec::new(),
            index: HashMap::new(),
            top: 0,
            clock_trees: ClockTreeRegistry::new(),
            warnings: Vec::new(),
        };
        design.top = design.visit(top, &mut Vec::new())?;
        design.propagate_clocks();
        debug!(
            "Analyzed {} circuit definition(s) below \"{}\"",
            design.netlists.len(),
            top.name()
        );
        Ok(design)
    }

    fn visit(&mut self, circuit: &'a Circuit<'a>, path: &mut Vec<(usize, String)>) -> Result<usize> {
        if let Some(index) = self.index.get(&circuit.index()) {
            return Ok(*index);
        }
        if let Some(start) = path.iter().position(|(owner, _)| *owner == circuit.index()) {
            return Err(GenerationError::RecursiveCircuit {
                circuit: circuit.name().to_string(),
                path: path[start..]
                    .iter()
                    .map(|(_, step)| step.as_str())
                    .collect::<Vec<_>>()
                    .join(" -> "),
            });
        }

        for component in circuit.components() {
            if let ComponentKind::Subcircuit(child) = component.kind() {
                let instance = match component.label() {
                    Some(label) if !label.trim().is_empty() => format!("instance \"{}\"", label),
                    _ => format!("instance #{}", component.index()),
                };
                path.push((
                    circuit.index(),
                    format!("{} in \"{}\"", instance, circuit.name()),
                ));
                let result = self.visit(child, path);
                path.pop();
                result?;
            }
        }

        let netlist = {
            let children = self
                .index
                .iter()
                .map(|(circuit, index)| (*circuit, &self.netlists[*index]))
                .collect::<HashMap<_, _>>();
            Netlist::build(circuit, &children, &mut self.clock_trees, &mut self.warnings)?
        };
        self.netlists.push(netlist);
        let index = self.netlists.len() - 1;
        self.index.insert(circuit.index(), index);
        Ok(index)
    }

    /// Hands clock trees down through input pins, parents first.
    ///
    /// A one-bit named input pin joins a tree when every instance of its circuit, in every
    /// parent, feeds it from that same tree. Reverse analysis order visits every parent of a
    /// circuit before the circuit itself.
    fn propagate_clocks(&mut self) {
        let mut feeds: HashMap<(usize, usize), Option<usize>> = HashMap::new();
        for position in (0..self.netlists.len()).rev() {
            let inherited = feeds
                .iter()
                .filter(|((netlist, _), _)| *netlist == position)
                .filter_map(|((_, pin), tree)| tree.map(|tree| (*pin, tree)))
                .collect::<Vec<_>>();
            for (pin, tree) in inherited {
                self.netlists[position].inherit_clock(pin, tree);
            }

            let netlist = &self.netlists[position];
            for component in netlist.components() {
                let child = match component.component().kind() {
                    ComponentKind::Subcircuit(child) => child,
                    _ => continue,
                };
                let child_position = match self.index.get(&child.index()) {
                    Some(child_position) => *child_position,
                    None => continue,
                };
                let child_netlist = &self.netlists[child_position];
                for (end, pin) in component.ends().iter().zip(child_netlist.pins()) {
                    if pin.category() != Category::InputPin || pin.port_name().is_none() {
                        continue;
                    }
                    let tree = match end.points.as_slice() {
                        [Some(point)] => netlist.clock_tree_of(*point),
                        _ => None,
                    };
                    feeds
                        .entry((child_position, pin.index()))
                        .and_modify(|current| {
                            if *current != tree {
                                *current = None;
                            }
                        })
                        .or_insert(tree);
                }
            }
        }
    }

    /// Netlists in analysis order: every circuit comes after everything it instantiates.
    pub fn netlists(&self) -> &[Netlist<'a>] {
        &self.netlists
    }

    pub fn netlist_of(&self, circuit: &Circuit<'a>) -> Result<&Netlist<'a>> {
        self.index
            .get(&circuit.index())
            .map(|index| &self.netlists[*index])
            .ok_or_else(|| {
                GenerationError::internal(format!(
                    "Circuit \"{}\" is not part of the analyzed design.",
                    circuit.name()
                ))
            })
    }

    pub fn top(&self) -> &Netlist<'a> {
        &self.netlists[self.top]
    }

    pub fn clock_trees(&self) -> &ClockTreeRegistry {
        &self.clock_trees
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::netlist::bubbles::*;
    use crate::options::ClockMode;
    use crate::*;

    fn assert_recursive(result: Result<Design<'_>>, circuit: &str, path: &str) {
        match result {
            Err(GenerationError::RecursiveCircuit {
                circuit: found_circuit,
                path: found_path,
            }) => {
                assert_eq!(found_circuit, circuit);
                assert_eq!(found_path, path);
            }
            Err(error) => panic!("unexpected error: {}", error),
            Ok(_) => panic!("expected a recursive definition error"),
        }
    }

    #[test]
    fn recursive_circuit_definition_error1() {
        let c = Context::new();

        let a = c.circuit("A");
        let _ = a.instance(a).set_label("a");

        assert_recursive(Design::analyze(a), "A", "instance \"a\" in \"A\"");
    }

    #[test]
    fn recursive_circuit_definition_error2() {
        let c = Context::new();

        let a = c.circuit("A");
        let b = c.circuit("B");
        let _ = a.instance(b).set_label("b");
        let _ = b.instance(a).set_label("a");

        assert_recursive(
            Design::analyze(a),
            "A",
            "instance \"b\" in \"A\" -> instance \"a\" in \"B\"",
        );
    }

    #[test]
    fn shared_definitions_are_analyzed_once() {
        let c = Context::new();

        let leaf = c.circuit("leaf");
        let mid = c.circuit("mid");
        let _ = mid.instance(leaf);
        let _ = mid.instance(leaf);
        let top = c.circuit("top");
        let _ = top.instance(mid);
        let _ = top.instance(leaf);

        let design = Design::analyze(top).unwrap();

        let names = design
            .netlists()
            .iter()
            .map(|netlist| netlist.name())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["leaf", "mid", "top"]);
        assert_eq!(design.top().name(), "top");
    }

    #[test]
    fn end_width_mismatch_error() {
        let c = Context::new();

        let m = c.circuit("m");
        let w = m.wire(3);
        let _ = m.leaf(LeafType::Not, Attributes::new()).connect(1, w);

        match Design::analyze(m) {
            Err(GenerationError::WidthMismatch {
                expected, found, ..
            }) => {
                assert_eq!(expected, 1);
                assert_eq!(found, 3);
            }
            _ => panic!("expected a width mismatch"),
        }
    }

    #[test]
    fn pin_name_collision_error() {
        let c = Context::new();

        let m = c.circuit("m");
        let a = m.wire(1);
        let b = m.wire(1);
        let _ = m.input_pin("Data", 1).connect(0, a);
        let _ = m.output_pin("data", 1).connect(0, b);

        match Design::analyze(m) {
            Err(GenerationError::IdentifierCollision {
                identifier, scope, ..
            }) => {
                assert_eq!(identifier, "data");
                assert_eq!(scope, "m");
            }
            _ => panic!("expected an identifier collision"),
        }
    }

    #[test]
    fn bubble_conservation() {
        let c = Context::new();

        // Three unconnected single-bit inputs, one connected input
        let child = c.circuit("child");
        let w = child.wire(1);
        let _ = child.input_pin("a", 1);
        let _ = child.input_pin("b", 1);
        let _ = child.input_pin("c", 1).connect(0, w);
        let _ = child.input_pin("d", 1);
        let _ = child.output_pin("q", 1).connect(0, w);

        let parent = c.circuit("parent");
        let _ = parent.input_pin("own", 1);
        let _ = parent.instance(child);

        let design = Design::analyze(parent).unwrap();
        let child_netlist = design.netlist_of(child).unwrap();
        let parent_netlist = design.top();

        assert_eq!(child_netlist.bubble_counts().input, 3);
        assert_eq!(child_netlist.bubble_counts().output, 0);
        assert_eq!(parent_netlist.bubble_counts().input, 3 + 1);

        let instance = &parent_netlist.components()[1];
        assert_eq!(instance.category(), Category::Subcircuit);
        assert_eq!(
            instance.bubbles().input,
            Some(BubbleRange { start: 1, end: 3 })
        );

        let named = child_netlist
            .pins()
            .filter_map(|pin| pin.port_name())
            .collect::<Vec<_>>();
        assert_eq!(named, vec!["c", "q"]);
    }

    #[test]
    fn fully_connected_design_has_no_bubbles() {
        let c = Context::new();

        let child = c.circuit("child");
        let w = child.wire(1);
        let _ = child.input_pin("i", 1).connect(0, w);
        let _ = child.output_pin("o", 1).connect(0, w);

        let parent = c.circuit("parent");
        let _ = parent.instance(child);

        let design = Design::analyze(parent).unwrap();
        assert!(design.top().bubble_counts().is_empty());
        assert_eq!(design.top().components()[0].bubbles(), BubbleRanges::default());
    }

    #[test]
    fn clock_trees_are_shared_between_instances() {
        let c = Context::new();

        let counter = c.circuit("counter");
        let clk = counter.wire(1);
        let _ = counter.clock(Attributes::new()).connect(0, clk);
        let _ = counter
            .leaf(LeafType::Register, Attributes::new())
            .connect(register_ends::CLOCK, clk);

        let top = c.circuit("top");
        let _ = top.instance(counter);
        let _ = top.instance(counter);

        let design = Design::analyze(top).unwrap();
        assert_eq!(design.clock_trees().trees().len(), 1);
        assert_eq!(design.top().clock_trees().len(), 1);
        assert!(design.top().requires_global_tick(ClockMode::GlobalTick));
        assert!(!design.top().requires_global_tick(ClockMode::Derived));

        let counter_netlist = design.netlist_of(counter).unwrap();
        let clock_point = counter_netlist.components()[1].ends()[register_ends::CLOCK].points[0]
            .unwrap();
        assert_eq!(counter_netlist.clock_tree_of(clock_point), Some(0));
    }

    #[test]
    fn multiple_drivers_warn() {
        let c = Context::new();

        let m = c.circuit("m");
        let w = m.wire(1);
        let _ = m.leaf(LeafType::Constant, Attributes::new()).connect(0, w);
        let _ = m.leaf(LeafType::Constant, Attributes::new()).connect(0, w);

        let design = Design::analyze(m).unwrap();
        assert_eq!(
            design.warnings(),
            &["Net s_LOGISIM_NET_0 in circuit \"m\" has 2 drivers on bit 0.".to_string()]
        );
    }

    #[test]
    fn undriven_nets_warn() {
        let c = Context::new();

        let m = c.circuit("m");
        let bus = m.wire(3);
        let zero = m.wire(1);
        let _ = m.output_pin("y", 3).connect(0, bus);
        let _ = m.leaf(LeafType::Constant, Attributes::new()).connect(0, zero);
        m.splice(zero.bit(0), bus.bit(1));

        let design = Design::analyze(m).unwrap();
        assert_eq!(
            design.warnings(),
            &["Net s_LOGISIM_BUS_0 in circuit \"m\" is read but never driven on bit(s) 0, 2."
                .to_string()]
        );
    }

    #[test]
    fn clock_trees_follow_input_pins() {
        let c = Context::new();

        let counter = c.circuit("counter");
        let clk = counter.wire(1);
        let q = counter.wire(1);
        let _ = counter.input_pin("clk", 1).connect(0, clk);
        let _ = counter.output_pin("q", 1).connect(0, q);
        let _ = counter
            .leaf(LeafType::Register, Attributes::new())
            .connect(register_ends::CLOCK, clk)
            .connect(register_ends::Q, q);

        // Passes its clock pin through to a counter and exports the counter's clock
        let wrapper = c.circuit("wrapper");
        let clk = wrapper.wire(1);
        let q = wrapper.wire(1);
        let _ = wrapper.input_pin("clk", 1).connect(0, clk);
        let _ = wrapper.output_pin("q", 1).connect(0, q);
        let _ = wrapper.instance(counter).connect(0, clk).connect(1, q);

        let top = c.circuit("top");
        let clk = top.wire(1);
        let q = top.wire(1);
        let _ = top.clock(Attributes::new()).connect(0, clk);
        let _ = top.output_pin("q", 1).connect(0, q);
        let _ = top.instance(wrapper).connect(0, clk).connect(1, q);

        let design = Design::analyze(top).unwrap();
        assert!(design.warnings().is_empty());
        for circuit in [wrapper, counter] {
            let netlist = design.netlist_of(circuit).unwrap();
            assert_eq!(netlist.clock_trees().iter().copied().collect::<Vec<_>>(), vec![0]);
        }

        let counter_netlist = design.netlist_of(counter).unwrap();
        let clock_point = counter_netlist.components()[2].ends()[register_ends::CLOCK].points[0]
            .unwrap();
        assert_eq!(counter_netlist.clock_tree_of(clock_point), Some(0));
        let q_point = counter_netlist.components()[1].ends()[0].points[0].unwrap();
        assert_eq!(counter_netlist.clock_tree_of(q_point), None);
    }

    #[test]
    fn disagreeing_instances_keep_a_plain_input() {
        let c = Context::new();

        let counter = c.circuit("counter");
        let clk = counter.wire(1);
        let _ = counter.input_pin("clk", 1).connect(0, clk);
        let _ = counter
            .leaf(LeafType::Register, Attributes::new())
            .connect(register_ends::CLOCK, clk);

        let top = c.circuit("top");
        let clk = top.wire(1);
        let enable = top.wire(1);
        let _ = top.clock(Attributes::new()).connect(0, clk);
        let _ = top.input_pin("enable", 1).connect(0, enable);
        let _ = top.instance(counter).connect(0, clk);
        let _ = top.instance(counter).connect(0, enable);

        let design = Design::analyze(top).unwrap();
        let counter_netlist = design.netlist_of(counter).unwrap();
        assert!(counter_netlist.clock_trees().is_empty());
        let clock_point = counter_netlist.components()[1].ends()[register_ends::CLOCK].points[0]
            .unwrap();
        assert_eq!(counter_netlist.clock_tree_of(clock_point), None);
    }
}
