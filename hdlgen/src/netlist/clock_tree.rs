use crate::graph::{attributes, Circuit, Component};

use std::collections::HashMap;

/// Width of every clock tree signal.
pub const CLOCK_TREE_WIDTH: u32 = 5;
pub const DERIVED_CLOCK_INDEX: u32 = 0;
pub const INVERTED_DERIVED_CLOCK_INDEX: u32 = 1;
pub const POSITIVE_EDGE_TICK_INDEX: u32 = 2;
pub const NEGATIVE_EDGE_TICK_INDEX: u32 = 3;
pub const GLOBAL_CLOCK_INDEX: u32 = 4;

/// Name of the single external clock input used in global tick mode.
pub const GLOBAL_CLOCK_NAME: &str = "FPGA_GlobalClock";

/// One clock shape, and the first clock source that generates it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClockTree {
    pub id: usize,
    /// Circuit of the first source registered for this tree.
    pub circuit: String,
    pub source: String,
    pub high_ticks: u64,
    pub low_ticks: u64,
    pub phase: u64,
}

impl ClockTree {
    pub fn signal_name(&self) -> String {
        signal_name(self.id)
    }
}

pub fn signal_name(id: usize) -> String {
    format!("LOGISIM_CLOCK_TREE_{}", id)
}

/// Design-wide registry of clock trees, one per distinct `(high_ticks, low_ticks, phase)`.
///
/// Clock sources with the same shape share a tree wherever they are placed, and a circuit
/// instantiated several times shares its trees between all instances.
#[derive(Default)]
pub struct ClockTreeRegistry {
    trees: Vec<ClockTree>,
    index: HashMap<(u64, u64, u64), usize>,
}

impl ClockTreeRegistry {
    pub fn new() -> ClockTreeRegistry {
        ClockTreeRegistry::default()
    }

    /// Returns the id of the tree `source` belongs to, registering it on first use.
    pub fn register<'a>(&mut self, circuit: &'a Circuit<'a>, source: &'a Component<'a>) -> usize {
        let attrs = source.attributes();
        let key = (
            attrs.int(attributes::HIGH_TICKS, 1),
            attrs.int(attributes::LOW_TICKS, 1),
            attrs.int(attributes::PHASE, 0),
        );
        if let Some(id) = self.index.get(&key) {
            return *id;
        }
        let id = self.trees.len();
        self.trees.push(ClockTree {
            id,
            circuit: circuit.name().to_string(),
            source: source.describe(),
            high_ticks: key.0,
            low_ticks: key.1,
            phase: key.2,
        });
        self.index.insert(key, id);
        id
    }

    pub fn trees(&self) -> &[ClockTree] {
        &self.trees
    }

    pub fn get(&self, id: usize) -> Option<&ClockTree> {
        self.trees.get(id)
    }

    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }
}
