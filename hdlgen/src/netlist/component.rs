use super::bubbles::BubbleRanges;
use super::net_model::{continuous_base, ConnectionPoint};

use crate::graph::{Component, ComponentKind, Direction};

/// Classification of a placed component within its circuit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Category {
    Normal,
    Subcircuit,
    ClockSource,
    InputPin,
    OutputPin,
    InoutPin,
}

impl Category {
    pub fn of(component: &Component<'_>) -> Category {
        match component.kind() {
            ComponentKind::Leaf(_) | ComponentKind::Entity(_) | ComponentKind::Unknown { .. } => {
                Category::Normal
            }
            ComponentKind::Subcircuit(_) => Category::Subcircuit,
            ComponentKind::Clock => Category::ClockSource,
            ComponentKind::Pin(Direction::Input) => Category::InputPin,
            ComponentKind::Pin(Direction::Output) => Category::OutputPin,
            ComponentKind::Pin(Direction::Inout) => Category::InoutPin,
        }
    }

    pub fn is_pin(self) -> bool {
        matches!(
            self,
            Category::InputPin | Category::OutputPin | Category::InoutPin
        )
    }
}

/// One end of a placed component, resolved to canonical net locations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConnectionEnd {
    pub direction: Direction,
    /// One entry per end bit, least significant first.
    pub points: Vec<Option<ConnectionPoint>>,
}

impl ConnectionEnd {
    pub fn width(&self) -> u32 {
        self.points.len() as u32
    }

    pub fn is_unconnected(&self) -> bool {
        self.points.iter().all(Option::is_none)
    }

    pub fn is_fully_connected(&self) -> bool {
        self.points.iter().all(Option::is_some)
    }

    /// `(net, base)` when this end is a contiguous slice of one net.
    pub fn continuous_slice(&self) -> Option<(usize, u32)> {
        continuous_base(&self.points)
    }
}

/// A component of an analyzed circuit.
pub struct NetlistComponent<'a> {
    pub(crate) component: &'a Component<'a>,
    pub(crate) category: Category,
    pub(crate) ends: Vec<ConnectionEnd>,
    pub(crate) bubbles: BubbleRanges,
    pub(crate) clock_tree: Option<usize>,
    pub(crate) port_name: Option<String>,
}

impl<'a> NetlistComponent<'a> {
    pub fn component(&self) -> &'a Component<'a> {
        self.component
    }

    pub fn index(&self) -> usize {
        self.component.index()
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn ends(&self) -> &[ConnectionEnd] {
        &self.ends
    }

    pub fn end(&self, end: usize) -> Option<&ConnectionEnd> {
        self.ends.get(end)
    }

    pub fn bubbles(&self) -> BubbleRanges {
        self.bubbles
    }

    /// The clock tree this component is the source of.
    pub fn clock_tree(&self) -> Option<usize> {
        self.clock_tree
    }

    /// The named port of a boundary pin; `None` for pins that became bubbles.
    pub fn port_name(&self) -> Option<&str> {
        self.port_name.as_deref()
    }

    pub fn is_connected(&self) -> bool {
        self.ends.iter().any(|end| !end.is_unconnected())
    }
}
