pub mod attributes;
mod circuit;
mod component;
mod context;
mod entity;
mod leaf;

pub use attributes::{AttributeValue, Attributes, DisabledPolicy};
pub use circuit::*;
pub use component::*;
pub use context::*;
pub use entity::*;
pub use leaf::*;
