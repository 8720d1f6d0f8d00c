use super::circuit::*;
use super::component::*;
use super::entity::*;

use crate::hdl::Dialect;

use typed_arena::Arena;

use std::cell::RefCell;

/// A top-level container/owner object for a [`Circuit`] graph.
///
/// A `Context` owns all circuits, components and entities of a design, and provides an API for creating
/// [`Circuit`] and [`HdlEntity`] objects.
///
/// # Examples
///
/// ```
/// use hdlgen::*;
///
/// let c = Context::new();
///
/// let m = c.circuit("main");
/// let w = m.wire(1);
/// let _ = m.input_pin("in", 1).connect(0, w);
/// let _ = m.output_pin("out", 1).connect(0, w);
/// ```
#[must_use]
pub struct Context<'a> {
    pub(super) circuit_arena: Arena<Circuit<'a>>,
    pub(super) component_arena: Arena<Component<'a>>,
    pub(super) entity_arena: Arena<HdlEntity>,

    pub(super) circuits: RefCell<Vec<&'a Circuit<'a>>>,
    pub(super) entities: RefCell<Vec<&'a HdlEntity>>,
}

impl<'a> Context<'a> {
    /// Creates a new, empty `Context`.
    pub fn new() -> Context<'a> {
        Context {
            circuit_arena: Arena::new(),
            component_arena: Arena::new(),
            entity_arena: Arena::new(),

            circuits: RefCell::new(Vec::new()),
            entities: RefCell::new(Vec::new()),
        }
    }

    /// Creates a new [`Circuit`] called `name` in this `Context`.
    ///
    /// # Panics
    ///
    /// Panics if a [`Circuit`] with the same `name` already exists in this `Context`.
    ///
    /// # Examples
    ///
    /// ```should_panic
    /// use hdlgen::*;
    ///
    /// let c = Context::new();
    ///
    /// let _ = c.circuit("a"); // Unique name, OK
    /// let _ = c.circuit("b"); // Unique name, OK
    ///
    /// let _ = c.circuit("a"); // Non-unique name, panic!
    /// ```
    pub fn circuit(&'a self, name: impl Into<String>) -> &'a Circuit<'a> {
        let name = name.into();
        if self.find_circuit(&name).is_some() {
            panic!(
                "A circuit called \"{}\" already exists in this context.",
                name
            );
        }
        let index = self.circuits.borrow().len();
        let circuit = self.circuit_arena.alloc(Circuit::new(self, index, name));
        self.circuits.borrow_mut().push(circuit);
        circuit
    }

    /// Declares an entity whose architecture is given as `body` text in `dialect`.
    pub fn entity(
        &'a self,
        name: impl Into<String>,
        dialect: Dialect,
        ports: Vec<EntityPort>,
        body: impl Into<String>,
    ) -> &'a HdlEntity {
        let index = self.entities.borrow().len();
        let entity = self.entity_arena.alloc(HdlEntity {
            index,
            name: name.into(),
            dialect,
            ports,
            body: body.into(),
        });
        self.entities.borrow_mut().push(entity);
        entity
    }

    pub fn find_circuit(&self, name: &str) -> Option<&'a Circuit<'a>> {
        self.circuits
            .borrow()
            .iter()
            .copied()
            .find(|circuit| circuit.name == name)
    }

    pub fn circuits(&self) -> Vec<&'a Circuit<'a>> {
        self.circuits.borrow().clone()
    }
}

impl<'a> Default for Context<'a> {
    fn default() -> Context<'a> {
        Context::new()
    }
}
