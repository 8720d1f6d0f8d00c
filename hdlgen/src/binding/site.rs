use super::{Port, PortConnection};

use crate::error::{GenerationError, Result};
use crate::graph::Attributes;
use crate::hdl::{Actual, Bit, Dialect, Expr, Width};
use crate::netlist::clock_tree::{self, DERIVED_CLOCK_INDEX, POSITIVE_EDGE_TICK_INDEX};
use crate::netlist::{BubbleKind, ConnectionEnd, Netlist, NetlistComponent, GLOBAL_CLOCK_NAME};
use crate::options::ClockMode;

/// What a clock end is driven by.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClockSource {
    Tree(usize),
    /// An ordinary net, e.g. the output of a gate or a clock brought in through a pin.
    Gated(Expr),
    Unconnected,
}

/// One placed component, seen from the body of the circuit it is placed in.
pub struct Site<'s, 'a> {
    netlist: &'s Netlist<'a>,
    component: &'s NetlistComponent<'a>,
    label: String,
    dialect: Dialect,
    clock_mode: ClockMode,
    warnings: &'s mut Vec<String>,
    open_wires: &'s mut Vec<String>,
}

impl<'s, 'a> Site<'s, 'a> {
    pub fn new(
        netlist: &'s Netlist<'a>,
        component: &'s NetlistComponent<'a>,
        label: String,
        dialect: Dialect,
        clock_mode: ClockMode,
        warnings: &'s mut Vec<String>,
        open_wires: &'s mut Vec<String>,
    ) -> Site<'s, 'a> {
        Site {
            netlist,
            component,
            label,
            dialect,
            clock_mode,
            warnings,
            open_wires,
        }
    }

    pub fn netlist(&self) -> &'s Netlist<'a> {
        self.netlist
    }

    pub fn component(&self) -> &'s NetlistComponent<'a> {
        self.component
    }

    pub fn attributes(&self) -> &'a Attributes {
        self.component.component().attributes()
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn clock_mode(&self) -> ClockMode {
        self.clock_mode
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    pub fn end(&self, end: usize) -> Result<&'s ConnectionEnd> {
        self.component.end(end).ok_or_else(|| {
            GenerationError::internal(format!(
                "{} in circuit \"{}\" has no end {}.",
                self.component.component().describe(),
                self.netlist.circuit().name(),
                end
            ))
        })
    }

    pub fn is_unconnected(&self, end: usize) -> Result<bool> {
        Ok(self.end(end)?.is_unconnected())
    }

    /// The whole end as one expression, if it is a continuous bus.
    pub fn whole(&self, end: usize) -> Result<Option<Expr>> {
        Ok(self.netlist.end_expr(self.end(end)?))
    }

    /// Bit `bit` of the end, if it is connected.
    pub fn bit(&self, end: usize, bit: u32) -> Result<Option<Expr>> {
        Ok(self
            .end(end)?
            .points
            .get(bit as usize)
            .copied()
            .flatten()
            .map(|point| self.netlist.point_expr(point)))
    }

    /// Actual for an input formal fed by `end`. Unconnected bits read `unconnected`.
    pub fn input(&self, end: usize, unconnected: Bit) -> Result<Actual> {
        let connection = self.end(end)?;
        if connection.is_unconnected() {
            return Ok(Actual::Expr(Expr::Filled {
                bit: unconnected,
                width: Width::Fixed(connection.width()),
            }));
        }
        if let Some(expr) = self.netlist.end_expr(connection) {
            return Ok(Actual::Expr(expr));
        }
        Ok(Actual::PerBit(
            connection
                .points
                .iter()
                .map(|point| match point {
                    Some(point) => self.netlist.point_expr(*point),
                    None => Expr::bit(unconnected),
                })
                .collect(),
        ))
    }

    /// Actual for an output formal driving `end`. Holes in a partially connected end are filled
    /// with fresh dangling wires.
    pub fn output(&mut self, end: usize) -> Result<Actual> {
        let connection = self.end(end)?;
        if connection.is_unconnected() {
            return Ok(Actual::Open);
        }
        if let Some(expr) = self.netlist.end_expr(connection) {
            return Ok(Actual::Expr(expr));
        }
        let mut bits = Vec::with_capacity(connection.points.len());
        for point in connection.points.iter() {
            bits.push(match point {
                Some(point) => self.netlist.point_expr(*point),
                None => self.open_wire(),
            });
        }
        Ok(Actual::PerBit(bits))
    }

    fn open_wire(&mut self) -> Expr {
        let name = format!("s_LOGISIM_OPEN_{}", self.open_wires.len());
        self.open_wires.push(name.clone());
        Expr::name(name)
    }

    pub fn clock_source(&self, end: usize) -> Result<ClockSource> {
        let point = match self.end(end)?.points.first().copied().flatten() {
            Some(point) => point,
            None => return Ok(ClockSource::Unconnected),
        };
        Ok(match self.netlist.clock_tree_of(point) {
            Some(tree) => ClockSource::Tree(tree),
            None => ClockSource::Gated(self.netlist.point_expr(point)),
        })
    }

    /// The clock and tick expressions for the clock end `end`.
    pub fn clock_and_tick(&self, end: usize) -> Result<(Expr, Expr)> {
        Ok(match self.clock_source(end)? {
            ClockSource::Tree(tree) => {
                let tree = clock_tree::signal_name(tree);
                match self.clock_mode {
                    ClockMode::Derived => (
                        Expr::index(tree, DERIVED_CLOCK_INDEX),
                        Expr::bit(Bit::One),
                    ),
                    ClockMode::GlobalTick => (
                        Expr::name(GLOBAL_CLOCK_NAME),
                        Expr::index(tree, POSITIVE_EDGE_TICK_INDEX),
                    ),
                }
            }
            ClockSource::Gated(net) => (net, Expr::bit(Bit::One)),
            ClockSource::Unconnected => (Expr::bit(Bit::Zero), Expr::bit(Bit::Zero)),
        })
    }

    pub fn input_actual(&mut self, port: &Port) -> Result<Actual> {
        match &port.connection {
            PortConnection::End(end) => self.input(*end, port.unconnected),
            PortConnection::Ends(ends) => {
                let mut bits = Vec::with_capacity(ends.len());
                for end in ends.iter() {
                    bits.push(self.bit(*end, 0)?);
                }
                if bits.iter().all(Option::is_none) {
                    return Ok(Actual::Expr(Expr::Filled {
                        bit: port.unconnected,
                        width: Width::Fixed(port.width),
                    }));
                }
                Ok(Actual::PerBit(
                    bits.into_iter()
                        .map(|bit| bit.unwrap_or_else(|| Expr::bit(port.unconnected)))
                        .collect(),
                ))
            }
            PortConnection::ClockOf(end) => {
                let description = self.component.component().describe();
                match self.clock_source(*end)? {
                    ClockSource::Gated(_) => self.warn(format!(
                        "Found a gated clock on {}; it is clocked by an ordinary net.",
                        description
                    )),
                    ClockSource::Unconnected => self.warn(format!(
                        "The clock input of {} is not connected, tied it to '0'.",
                        description
                    )),
                    ClockSource::Tree(_) => (),
                }
                Ok(Actual::Expr(self.clock_and_tick(*end)?.0))
            }
            PortConnection::TickOf(end) => Ok(Actual::Expr(self.clock_and_tick(*end)?.1)),
            PortConnection::Bubbles(kind) => Ok(Actual::Expr(self.bubbles(*kind)?)),
            PortConnection::Fixed(expr) => Ok(Actual::Expr(expr.clone())),
        }
    }

    pub fn output_actual(&mut self, port: &Port) -> Result<Actual> {
        match &port.connection {
            PortConnection::End(end) => self.output(*end),
            PortConnection::Ends(ends) => {
                if ends
                    .iter()
                    .all(|end| self.is_unconnected(*end).unwrap_or(true))
                {
                    return Ok(Actual::Open);
                }
                let mut bits = Vec::with_capacity(ends.len());
                for end in ends.iter() {
                    let bit = match self.bit(*end, 0)? {
                        Some(bit) => bit,
                        None => self.open_wire(),
                    };
                    bits.push(bit);
                }
                Ok(Actual::PerBit(bits))
            }
            PortConnection::Bubbles(kind) => Ok(Actual::Expr(self.bubbles(*kind)?)),
            connection => Err(GenerationError::internal(format!(
                "Output port \"{}\" of {} cannot be driven by {:?}.",
                port.name,
                self.component.component().describe(),
                connection
            ))),
        }
    }

    fn bubbles(&self, kind: BubbleKind) -> Result<Expr> {
        let range = self.component.bubbles().get(kind).ok_or_else(|| {
            GenerationError::internal(format!(
                "{} has no {} range on the bubble bus of \"{}\".",
                self.component.component().describe(),
                kind.port_name(),
                self.netlist.name()
            ))
        })?;
        Ok(self.netlist.bubble_expr(kind, range))
    }
}
