//! Static analysis of circuit definitions: nets, boundary bubbles and clock trees.

pub mod bubbles;
mod circuit;
pub mod clock_tree;
mod component;
mod design;
mod net_model;

pub use bubbles::{BubbleCounts, BubbleKind, BubbleRange, BubbleRanges};
pub use circuit::*;
pub use clock_tree::{ClockTree, ClockTreeRegistry, GLOBAL_CLOCK_NAME};
pub use component::*;
pub use design::*;
pub use net_model::*;
