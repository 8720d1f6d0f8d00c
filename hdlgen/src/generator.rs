//! Hierarchical emission: walks the circuit hierarchy depth-first, emits one file per distinct
//! definition and the top circuit's file last.

mod circuit_body;
mod context;
mod writer;

pub use context::GenerationContext;

use crate::binding::{BindingTable, Body, ComponentBinding, SubcircuitBinding};
use crate::error::{GenerationError, Result};
use crate::graph::{Attributes, Circuit};
use crate::netlist::{Category, Design, Netlist};
use crate::options::GenerationOptions;
use crate::report::{GenerationSummary, Reporter, Severity};

use log::info;

/// Generates `top` and everything it instantiates into `options.output_dir`.
///
/// Warnings are handed to `reporter` only once the whole run succeeded; a failed run reports
/// nothing and returns the error. Files written before the failure are left in place.
///
/// # Examples
///
/// ```no_run
/// use hdlgen::*;
///
/// let c = Context::new();
///
/// let inverter = c.circuit("inverter");
/// let a = inverter.wire(1);
/// let y = inverter.wire(1);
/// let _ = inverter.input_pin("a", 1).connect(0, a);
/// let _ = inverter.output_pin("y", 1).connect(0, y);
/// let _ = inverter
///     .leaf(LeafType::Not, Attributes::new())
///     .connect(0, y)
///     .connect(1, a);
///
/// let summary = generate(inverter, &GenerationOptions::default(), &LogReporter).unwrap();
/// assert_eq!(summary.files.len(), 1);
/// ```
pub fn generate<'a>(
    top: &'a Circuit<'a>,
    options: &GenerationOptions,
    reporter: &dyn Reporter,
) -> Result<GenerationSummary> {
    info!(
        "Generating {} for circuit \"{}\" into {}",
        options.dialect,
        top.name(),
        options.output_dir.display()
    );

    let design = Design::analyze(top)?;
    let bindings = BindingTable::new(options.clock_mode);
    let mut ctx = GenerationContext::new(&design, &bindings, options);
    for warning in design.warnings() {
        ctx.warn(warning.clone());
    }

    let attrs = Attributes::new();
    let binding = SubcircuitBinding::new(design.top(), options.clock_mode);
    if !binding.supports(options.dialect, &attrs) {
        return Err(GenerationError::UnsupportedComponent {
            component: format!("Circuit \"{}\"", top.name()),
            attributes: attrs.summary(),
            dialect: options.dialect,
        });
    }
    emit_definition(&mut ctx, &binding, &attrs, design.top().name())?;

    let summary = ctx.finish();
    for warning in summary.warnings.iter() {
        reporter.report(Severity::Warning, warning);
    }
    info!(
        "Wrote {} {} file(s) with {} warning(s)",
        summary.files.len(),
        summary.dialect,
        summary.warnings.len()
    );
    Ok(summary)
}

/// Emits the definition behind `binding` unless an equal one was already emitted.
fn emit_definition<'a>(
    ctx: &mut GenerationContext<'_, 'a>,
    binding: &dyn ComponentBinding<'a>,
    attrs: &Attributes,
    label: &str,
) -> Result<()> {
    let key = binding.type_key(attrs);
    if !ctx.mark_handled(&key, &binding.origin())? {
        return Ok(());
    }

    let body = ctx.with_level(label, |ctx| binding.body(attrs, ctx))?;

    let entity = binding.entity(attrs, body);
    let path = writer::write_entity(
        &ctx.options().output_dir,
        ctx.dialect(),
        binding.sub_dir(),
        &entity,
    )?;
    ctx.record_file(path);
    Ok(())
}

/// Emits every definition `netlist` instantiates, then builds its own body.
///
/// A hand-written body set with [`Circuit::set_custom_body`] replaces the generated one; the
/// definitions it may instantiate are still emitted.
pub fn emit_circuit_body<'a>(
    ctx: &mut GenerationContext<'_, 'a>,
    netlist: &Netlist<'a>,
) -> Result<Body> {
    let dialect = ctx.dialect();
    let design = ctx.design();
    let bindings = ctx.bindings();
    for component in netlist.components() {
        if !matches!(
            component.category(),
            Category::Normal | Category::Subcircuit
        ) {
            continue;
        }
        let binding = bindings.resolve(design, component, dialect)?;
        if binding.is_inline_only(dialect) {
            continue;
        }
        let inner = component.component();
        let label = inner.label().unwrap_or_else(|| inner.describe());
        emit_definition(ctx, &*binding, inner.attributes(), &label)?;
    }

    ctx.reset_instance_counters();
    match netlist.circuit().custom_body(dialect) {
        Some(text) => Ok(Body::raw(text)),
        None => circuit_body::build(ctx, netlist),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::graph::*;
    use crate::hdl::Dialect;
    use crate::options::ClockMode;
    use crate::report::{CollectingReporter, LogReporter};

    use pretty_assertions::assert_eq;

    use std::fs;
    use std::path::Path;

    fn options(dir: &Path, dialect: Dialect) -> GenerationOptions {
        GenerationOptions {
            dialect,
            output_dir: dir.to_path_buf(),
            clock_mode: ClockMode::Derived,
        }
    }

    fn relative(summary: &GenerationSummary) -> Vec<String> {
        summary
            .files
            .iter()
            .map(|path| {
                path.strip_prefix(&summary.output_dir)
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect()
    }

    #[test]
    fn inverter_vhdl() {
        let dir = tempfile::tempdir().unwrap();
        let c = Context::new();

        let inverter = c.circuit("inverter");
        let a = inverter.wire(1);
        let y = inverter.wire(1);
        let _ = inverter.input_pin("a", 1).connect(0, a);
        let _ = inverter.output_pin("y", 1).connect(0, y);
        let _ = inverter
            .leaf(LeafType::Not, Attributes::new())
            .connect(0, y)
            .connect(1, a);

        let reporter = CollectingReporter::new();
        let summary = generate(inverter, &options(dir.path(), Dialect::Vhdl), &reporter).unwrap();

        assert_eq!(relative(&summary), vec!["circuit/inverter.vhd"]);
        assert!(summary.warnings.is_empty());
        assert!(reporter.entries().is_empty());

        let text = fs::read_to_string(&summary.files[0]).unwrap();
        assert!(text.contains("ENTITY inverter IS"));
        assert!(text.contains("a : IN std_logic"));
        assert!(text.contains("y : OUT std_logic"));
        assert!(text.contains("SIGNAL s_LOGISIM_NET_0 : std_logic;"));
        assert!(text.contains("s_LOGISIM_NET_0 <= a;"));
        assert!(text.contains("y <= s_LOGISIM_NET_1;"));
        assert!(text.contains("s_LOGISIM_NET_1 <= NOT(s_LOGISIM_NET_0);"));
    }

    #[test]
    fn structural_sharing_and_top_last() {
        let dir = tempfile::tempdir().unwrap();
        let c = Context::new();

        let top = c.circuit("top");
        let sel = top.wire(1);
        let _ = top.input_pin("sel", 1).connect(0, sel);
        for i in 0..3 {
            let q = top.wire(4);
            let _ = top.output_pin(format!("q{}", i), 4).connect(0, q);
            let _ = top
                .leaf(
                    LeafType::Multiplexer,
                    Attributes::new().with(attributes::WIDTH, 4u32),
                )
                .connect(2, sel)
                .connect(3, q);
        }

        let summary = generate(top, &options(dir.path(), Dialect::Vhdl), &LogReporter).unwrap();

        assert_eq!(
            relative(&summary),
            vec!["plexers/Multiplexer_bus_2.vhd", "circuit/top.vhd"]
        );
        let text = fs::read_to_string(&summary.files[1]).unwrap();
        assert_eq!(text.matches(": ENTITY work.Multiplexer_bus_2").count(), 3);
        assert!(text.contains("PLEXERS_1 : ENTITY work.Multiplexer_bus_2"));
        assert!(text.contains("PLEXERS_3 : ENTITY work.Multiplexer_bus_2"));
        assert!(text.contains("MuxIn_0 => \"0000\""));
    }

    #[test]
    fn warnings_are_reported_after_success() {
        let dir = tempfile::tempdir().unwrap();
        let c = Context::new();

        let m = c.circuit("m");
        let _ = m.output_pin("dangling", 2);

        let reporter = CollectingReporter::new();
        let summary = generate(m, &options(dir.path(), Dialect::Verilog), &reporter).unwrap();

        assert_eq!(
            reporter.messages(Severity::Warning),
            vec!["m: Found an unconnected output pin, tied the pin to ground! (Output Pin \"dangling\")"]
        );
        let text = fs::read_to_string(&summary.files[0]).unwrap();
        assert!(text.contains("output wire [1:0] LOGISIM_OUTPUT_BUBBLES"));
        assert!(text.contains("assign LOGISIM_OUTPUT_BUBBLES[1:0] = 2'd0;"));
    }

    #[test]
    fn failed_runs_report_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let c = Context::new();

        let m = c.circuit("m");
        let _ = m.output_pin("dangling", 1);
        let _ = m.unknown("Joystick", vec![EndSpec::output(4)], Attributes::new());

        let reporter = CollectingReporter::new();
        let result = generate(m, &options(dir.path(), Dialect::Vhdl), &reporter);

        assert!(matches!(
            result,
            Err(GenerationError::UnsupportedComponent { .. })
        ));
        assert!(reporter.entries().is_empty());
    }

    #[test]
    fn custom_body_replaces_generated_body() {
        let dir = tempfile::tempdir().unwrap();
        let c = Context::new();

        let m = c.circuit("blinker");
        let led = m.wire(1);
        let _ = m.output_pin("led", 1).connect(0, led);
        m.set_custom_body(Dialect::Vhdl, "led <= '1';");

        let summary = generate(m, &options(dir.path(), Dialect::Vhdl), &LogReporter).unwrap();

        let text = fs::read_to_string(&summary.files[0]).unwrap();
        assert!(text.contains("led : OUT std_logic"));
        assert!(text.contains("   led <= '1';\n"));
        assert!(!text.contains("s_LOGISIM_NET_0"));
    }

    #[test]
    fn clock_through_a_pin_keeps_its_tree() {
        let dir = tempfile::tempdir().unwrap();
        let c = Context::new();

        let child = c.circuit("child");
        let clk = child.wire(1);
        let q = child.wire(1);
        let _ = child.input_pin("clk", 1).connect(0, clk);
        let _ = child.output_pin("q", 1).connect(0, q);
        let _ = child
            .leaf(LeafType::Register, Attributes::new())
            .connect(register_ends::Q, q)
            .connect(register_ends::CLOCK, clk);

        let top = c.circuit("top");
        let clk = top.wire(1);
        let q = top.wire(1);
        let _ = top.clock(Attributes::new()).connect(0, clk);
        let _ = top.instance(child).connect(0, clk).connect(1, q);
        let _ = top.output_pin("q", 1).connect(0, q);

        let options = GenerationOptions {
            clock_mode: ClockMode::GlobalTick,
            ..options(dir.path(), Dialect::Vhdl)
        };
        let summary = generate(top, &options, &LogReporter).unwrap();

        assert_eq!(
            relative(&summary),
            vec![
                "memory/Register_bit.vhd",
                "circuit/child.vhd",
                "circuit/top.vhd"
            ]
        );
        assert!(!summary
            .warnings
            .iter()
            .any(|warning| warning.contains("gated clock")));

        let child_text = fs::read_to_string(&summary.files[1]).unwrap();
        assert!(child_text.contains("LOGISIM_CLOCK_TREE_0 : IN std_logic_vector( 4 DOWNTO 0 )"));
        assert!(child_text.contains("FPGA_GlobalClock : IN std_logic"));
        assert!(child_text.contains("Tick => LOGISIM_CLOCK_TREE_0(2)"));
        assert!(child_text.contains("Clock => FPGA_GlobalClock"));
        assert!(!child_text.contains("Tick => '1'"));

        let top_text = fs::read_to_string(&summary.files[2]).unwrap();
        assert!(top_text.contains("LOGISIM_CLOCK_TREE_0 => LOGISIM_CLOCK_TREE_0"));
        assert!(top_text.contains("FPGA_GlobalClock => FPGA_GlobalClock"));
    }

    #[test]
    fn bubbled_child_outputs_are_tied_in_the_parent() {
        let dir = tempfile::tempdir().unwrap();
        let c = Context::new();

        let child = c.circuit("child");
        let _ = child.output_pin("y", 1);

        let top = c.circuit("top");
        let w = top.wire(1);
        let _ = top.instance(child).connect(0, w);
        let _ = top.output_pin("out", 1).connect(0, w);

        let reporter = CollectingReporter::new();
        let summary = generate(top, &options(dir.path(), Dialect::Verilog), &reporter).unwrap();

        assert_eq!(relative(&summary), vec!["circuit/child.v", "circuit/top.v"]);
        let text = fs::read_to_string(&summary.files[1]).unwrap();
        assert!(text.contains("assign s_LOGISIM_NET_0 = 1'b0;"));
        assert_eq!(
            reporter.messages(Severity::Warning),
            vec![
                "top/Circuit \"child\" #0: Found an unconnected output pin, tied the pin to ground! (Output Pin \"y\")",
                "top: Found an unconnected output pin, tied the pin to ground! (Output Pin \"y\" of Circuit \"child\" #0)",
            ]
        );
    }
}
