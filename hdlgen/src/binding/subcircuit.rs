use super::*;

use crate::generator;
use crate::netlist::clock_tree::{self, CLOCK_TREE_WIDTH};
use crate::netlist::{Category, Netlist, GLOBAL_CLOCK_NAME};
use crate::options::ClockMode;

const SUBCIRCUIT: &str = "SUBCIRCUIT";
const CIRCUIT_DIR: &str = "circuit";

/// A circuit definition, instantiated by its parents.
///
/// Ports come in a fixed order: clock trees, the global clock, bubble busses, then the named
/// boundary pins in pin order.
pub struct SubcircuitBinding<'d, 'a> {
    netlist: &'d Netlist<'a>,
    clock_mode: ClockMode,
}

impl<'d, 'a> SubcircuitBinding<'d, 'a> {
    pub fn new(netlist: &'d Netlist<'a>, clock_mode: ClockMode) -> SubcircuitBinding<'d, 'a> {
        SubcircuitBinding {
            netlist,
            clock_mode,
        }
    }

    pub fn netlist(&self) -> &'d Netlist<'a> {
        self.netlist
    }

    fn bubble_port(&self, kind: BubbleKind) -> Option<Port> {
        let count = self.netlist.bubble_counts().get(kind);
        if count == 0 {
            return None;
        }
        Some(Port::new(
            kind.port_name(),
            count,
            PortConnection::Bubbles(kind),
        ))
    }

    fn pin_ports(&self, category: Category) -> Vec<Port> {
        self.netlist
            .pins()
            .enumerate()
            .filter(|(_, pin)| pin.category() == category)
            .filter_map(|(end, pin)| {
                let name = pin.port_name()?;
                let width = pin.end(0).map(|end| end.width()).unwrap_or(1);
                Some(Port::new(name, width, PortConnection::End(end)))
            })
            .collect()
    }
}

impl<'d, 'a> ComponentBinding<'a> for SubcircuitBinding<'d, 'a> {
    fn type_key(&self, _attrs: &Attributes) -> String {
        self.netlist.name().to_string()
    }

    fn origin(&self) -> String {
        format!("circuit \"{}\"", self.netlist.circuit().name())
    }

    fn identifier(&self) -> &str {
        SUBCIRCUIT
    }

    fn sub_dir(&self) -> &'static str {
        CIRCUIT_DIR
    }

    /// Inout pins can only be reached through the inout bubble bus.
    fn supports(&self, _dialect: Dialect, _attrs: &Attributes) -> bool {
        !self
            .netlist
            .pins()
            .any(|pin| pin.category() == Category::InoutPin && pin.port_name().is_some())
    }

    fn input_ports(&self, _attrs: &Attributes) -> Vec<Port> {
        let mut ports = self
            .netlist
            .clock_trees()
            .iter()
            .map(|tree| {
                let name = clock_tree::signal_name(*tree);
                Port::new(
                    name.clone(),
                    CLOCK_TREE_WIDTH,
                    PortConnection::Fixed(Expr::name(name)),
                )
            })
            .collect::<Vec<_>>();
        if self.netlist.requires_global_tick(self.clock_mode) {
            ports.push(Port::new(
                GLOBAL_CLOCK_NAME,
                1,
                PortConnection::Fixed(Expr::name(GLOBAL_CLOCK_NAME)),
            ));
        }
        ports.extend(self.bubble_port(BubbleKind::Input));
        ports.extend(self.pin_ports(Category::InputPin));
        ports
    }

    fn output_ports(&self, _attrs: &Attributes) -> Vec<Port> {
        let mut ports = Vec::new();
        ports.extend(self.bubble_port(BubbleKind::Output));
        ports.extend(self.pin_ports(Category::OutputPin));
        ports
    }

    fn inout_ports(&self, _attrs: &Attributes) -> Vec<Port> {
        self.bubble_port(BubbleKind::Inout).into_iter().collect()
    }

    fn body(&self, _attrs: &Attributes, ctx: &mut GenerationContext<'_, 'a>) -> Result<Body> {
        generator::emit_circuit_body(ctx, self.netlist)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::graph::Context;
    use crate::netlist::Design;

    fn names(ports: &[Port]) -> Vec<&str> {
        ports.iter().map(|port| port.name.as_str()).collect()
    }

    #[test]
    fn port_order() {
        let c = Context::new();

        let inner = c.circuit("inner");
        let d = inner.wire(1);
        let q = inner.wire(1);
        let clk = inner.wire(1);
        let _ = inner.input_pin("d", 1).connect(0, d);
        let _ = inner.output_pin("q", 1).connect(0, q);
        let _ = inner.output_pin("spare", 1);
        let _ = inner.clock(Attributes::new()).connect(0, clk);
        let _ = inner
            .leaf(crate::graph::LeafType::Register, Attributes::new())
            .connect(0, q)
            .connect(1, d)
            .connect(2, clk);

        let top = c.circuit("top");
        let _ = top.instance(inner);

        let design = Design::analyze(top).unwrap();
        let netlist = design.netlist_of(inner).unwrap();

        let derived = SubcircuitBinding::new(netlist, ClockMode::Derived);
        let attrs = Attributes::new();
        assert_eq!(
            names(&derived.input_ports(&attrs)),
            vec!["LOGISIM_CLOCK_TREE_0", "d"]
        );
        assert_eq!(
            names(&derived.output_ports(&attrs)),
            vec!["LOGISIM_OUTPUT_BUBBLES", "q"]
        );
        assert_eq!(derived.input_ports(&attrs)[1].connection, PortConnection::End(0));

        let global = SubcircuitBinding::new(netlist, ClockMode::GlobalTick);
        assert_eq!(
            names(&global.input_ports(&attrs)),
            vec!["LOGISIM_CLOCK_TREE_0", "FPGA_GlobalClock", "d"]
        );
    }

    #[test]
    fn named_inout_pins_are_unsupported() {
        let c = Context::new();

        let m = c.circuit("m");
        let w = m.wire(2);
        let _ = m.inout_pin("bus", 2).connect(0, w);

        let design = Design::analyze(m).unwrap();
        let binding = SubcircuitBinding::new(design.top(), ClockMode::Derived);

        assert!(!binding.supports(Dialect::Vhdl, &Attributes::new()));
    }
}
