use super::component::Direction;

use crate::hdl::Dialect;

/// A port of an [`HdlEntity`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntityPort {
    pub name: String,
    pub direction: Direction,
    pub width: u32,
}

impl EntityPort {
    pub fn new(name: impl Into<String>, direction: Direction, width: u32) -> EntityPort {
        EntityPort {
            name: name.into(),
            direction,
            width,
        }
    }
}

/// A component described directly in HDL, created by the [`Context`]::[`entity`] method.
///
/// The body text is copied verbatim between the generated entity header and footer, and only
/// the dialect it was written in can generate it.
///
/// [`Context`]: ./struct.Context.html
/// [`entity`]: ./struct.Context.html#method.entity
pub struct HdlEntity {
    pub(crate) index: usize,
    pub(crate) name: String,
    pub(crate) dialect: Dialect,
    pub(crate) ports: Vec<EntityPort>,
    pub(crate) body: String,
}

impl HdlEntity {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn ports(&self) -> &[EntityPort] {
        &self.ports
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// Position of this entity in its context.
    pub fn index(&self) -> usize {
        self.index
    }
}
