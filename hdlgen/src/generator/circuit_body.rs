use super::context::GenerationContext;

use crate::binding::{Body, ComponentBinding, Site, SubcircuitBinding};
use crate::error::{GenerationError, Result};
use crate::graph::{Attributes, ComponentKind};
use crate::hdl::{Bit, Expr, SignalDecl, Stmt, Width};
use crate::netlist::clock_tree::{self, DERIVED_CLOCK_INDEX};
use crate::netlist::{BubbleKind, Category, Netlist, NetlistComponent, GLOBAL_CLOCK_NAME};
use crate::options::ClockMode;
use crate::sanitize::sanitize;

use std::collections::HashMap;

/// Identifiers declared in one architecture, compared case-insensitively.
struct ScopeNames {
    scope: String,
    names: HashMap<String, String>,
}

impl ScopeNames {
    fn new(scope: &str) -> ScopeNames {
        ScopeNames {
            scope: scope.to_string(),
            names: HashMap::new(),
        }
    }

    fn claim(&mut self, name: &str, what: String) -> Result<()> {
        if let Some(first) = self.names.get(&name.to_ascii_lowercase()) {
            return Err(GenerationError::IdentifierCollision {
                identifier: name.to_string(),
                scope: self.scope.clone(),
                first: first.clone(),
                second: what,
            });
        }
        self.names.insert(name.to_ascii_lowercase(), what);
        Ok(())
    }
}

/// Statements collected for one section of the body, emitted under a remark when non-empty.
struct Section {
    title: &'static str,
    statements: Vec<Stmt>,
}

impl Section {
    fn new(title: &'static str) -> Section {
        Section {
            title,
            statements: Vec::new(),
        }
    }
}

fn unconnected_output_warning(component: &NetlistComponent<'_>) -> String {
    format!(
        "Found an unconnected output pin, tied the pin to ground! ({})",
        component.component().describe()
    )
}

/// Ties to zero the parent nets wired to outputs that became bubbles inside the instantiated
/// circuit, since nothing behind those outputs drives them.
fn tie_bubbled_outputs(
    netlist: &Netlist<'_>,
    instance: &NetlistComponent<'_>,
    child: &Netlist<'_>,
    section: &mut Section,
    warnings: &mut Vec<String>,
) {
    for (end, pin) in instance.ends().iter().zip(child.pins()) {
        if pin.category() != Category::OutputPin
            || pin.port_name().is_some()
            || end.is_unconnected()
        {
            continue;
        }
        match netlist.end_expr(end) {
            Some(target) => section.statements.push(Stmt::Assign {
                target,
                value: Expr::filled(Bit::Zero, end.width()),
            }),
            None => {
                for point in end.points.iter().flatten() {
                    section.statements.push(Stmt::Assign {
                        target: netlist.point_expr(*point),
                        value: Expr::bit(Bit::Zero),
                    });
                }
            }
        }
        warnings.push(format!(
            "Found an unconnected output pin, tied the pin to ground! ({} of {})",
            pin.component().describe(),
            instance.component().describe()
        ));
    }
}

/// Bit `bit` of a port `width` bits wide.
fn port_bit(name: &str, width: u32, bit: u32) -> Expr {
    if width == 1 {
        Expr::name(name)
    } else {
        Expr::index(name, bit)
    }
}

/// The structural architecture of `netlist`: net declarations, clock and pin hookup, net wiring,
/// inlined components and one instantiation per remaining component.
///
/// Every definition the body instantiates must already have been emitted.
pub fn build<'a>(ctx: &mut GenerationContext<'_, 'a>, netlist: &Netlist<'a>) -> Result<Body> {
    let dialect = ctx.dialect();
    let clock_mode = ctx.clock_mode();
    let design = ctx.design();
    let bindings = ctx.bindings();
    let no_attributes = Attributes::new();

    let mut names = ScopeNames::new(netlist.name());
    let own = SubcircuitBinding::new(netlist, clock_mode);
    for port in own
        .input_ports(&no_attributes)
        .into_iter()
        .chain(own.output_ports(&no_attributes))
        .chain(own.inout_ports(&no_attributes))
    {
        names.claim(&port.name, format!("port \"{}\"", port.name))?;
    }

    let mut signals = Vec::new();
    for net in netlist.nets().root_nets() {
        let name = net.name();
        names.claim(&name, format!("net {}", name))?;
        signals.push(SignalDecl::wire(name, Width::Fixed(net.width())));
    }

    let mut warnings = Vec::new();
    let mut open_wires = Vec::new();

    let mut clocks = Section::new("Here all clock sources are connected");
    let mut wiring = Section::new("Here all wiring is defined");
    let mut pins = Section::new("Here all boundary pins are connected");
    let mut inlined = Section::new("Here all in-lined components are defined");
    let mut normal = Section::new("Here all normal components are defined");
    let mut subcircuits = Section::new("Here all sub-circuits are defined");

    for component in netlist.components() {
        match component.category() {
            Category::ClockSource => {
                let point = component
                    .end(0)
                    .and_then(|end| end.points.first().copied().flatten());
                let (point, tree) = match (point, component.clock_tree()) {
                    (Some(point), Some(tree)) => (point, tree),
                    _ => {
                        warnings.push(format!(
                            "Found an unconnected {}, it is ignored.",
                            component.component().describe()
                        ));
                        continue;
                    }
                };
                let value = match clock_mode {
                    ClockMode::Derived => {
                        Expr::index(clock_tree::signal_name(tree), DERIVED_CLOCK_INDEX)
                    }
                    ClockMode::GlobalTick => Expr::name(GLOBAL_CLOCK_NAME),
                };
                clocks.statements.push(Stmt::Assign {
                    target: netlist.point_expr(point),
                    value,
                });
            }
            Category::InputPin => {
                let (name, end) = match (component.port_name(), component.end(0)) {
                    (Some(name), Some(end)) => (name, end),
                    _ => continue,
                };
                if let Some(target) = netlist.end_expr(end) {
                    pins.statements.push(Stmt::Assign {
                        target,
                        value: Expr::name(name),
                    });
                    continue;
                }
                for (bit, point) in end.points.iter().enumerate() {
                    if let Some(point) = point {
                        pins.statements.push(Stmt::Assign {
                            target: netlist.point_expr(*point),
                            value: port_bit(name, end.width(), bit as u32),
                        });
                    }
                }
            }
            Category::OutputPin => {
                let end = match component.end(0) {
                    Some(end) => end,
                    None => continue,
                };
                let name = match component.port_name() {
                    Some(name) => name,
                    None => {
                        if let Some(range) = component.bubbles().output {
                            warnings.push(unconnected_output_warning(component));
                            pins.statements.push(Stmt::Assign {
                                target: netlist.bubble_expr(BubbleKind::Output, range),
                                value: Expr::filled(Bit::Zero, range.len()),
                            });
                        }
                        continue;
                    }
                };
                if let Some(value) = netlist.end_expr(end) {
                    pins.statements.push(Stmt::Assign {
                        target: Expr::name(name),
                        value,
                    });
                    continue;
                }
                for (bit, point) in end.points.iter().enumerate() {
                    let value = match point {
                        Some(point) => netlist.point_expr(*point),
                        None => Expr::bit(Bit::Zero),
                    };
                    pins.statements.push(Stmt::Assign {
                        target: port_bit(name, end.width(), bit as u32),
                        value,
                    });
                }
                if !end.is_fully_connected() {
                    warnings.push(unconnected_output_warning(component));
                }
            }
            Category::InoutPin => (),
            Category::Normal | Category::Subcircuit => {
                let binding = bindings.resolve(design, component, dialect)?;
                if binding.is_inline_only(dialect) {
                    let mut site = Site::new(
                        netlist,
                        component,
                        String::new(),
                        dialect,
                        clock_mode,
                        &mut warnings,
                        &mut open_wires,
                    );
                    inlined.statements.extend(binding.inline_body(&mut site)?);
                    continue;
                }

                let label = match component.component().label() {
                    Some(label) if !label.trim().is_empty() => {
                        sanitize(&label, &component.index().to_string())
                    }
                    _ => ctx.next_instance_label(binding.identifier()),
                };
                names.claim(&label, component.component().describe())?;
                let mut site = Site::new(
                    netlist,
                    component,
                    label,
                    dialect,
                    clock_mode,
                    &mut warnings,
                    &mut open_wires,
                );
                let instance = binding.instantiate(&mut site)?;
                if let ComponentKind::Subcircuit(child) = component.component().kind() {
                    subcircuits.statements.push(instance);
                    let child = design.netlist_of(child)?;
                    tie_bubbled_outputs(
                        netlist,
                        component,
                        child,
                        &mut subcircuits,
                        &mut warnings,
                    );
                } else {
                    normal.statements.push(instance);
                }
            }
        }
    }

    for run in netlist.nets().wiring() {
        wiring.statements.push(Stmt::Assign {
            target: netlist.slice_expr(run.target.net, run.target.bit, run.width),
            value: netlist.slice_expr(run.source.net, run.source.bit, run.width),
        });
    }

    for name in open_wires.iter() {
        names.claim(name, format!("open wire {}", name))?;
        signals.push(SignalDecl::wire(name.clone(), Width::Fixed(1)));
    }
    for warning in warnings {
        ctx.warn(warning);
    }

    let mut statements = Vec::new();
    for section in [clocks, wiring, pins, inlined, normal, subcircuits] {
        if section.statements.is_empty() {
            continue;
        }
        if !statements.is_empty() {
            statements.push(Stmt::Blank);
        }
        statements.push(Stmt::Remark(vec![section.title.to_string()]));
        statements.extend(section.statements);
    }

    Ok(Body {
        signals,
        statements,
    })
}
