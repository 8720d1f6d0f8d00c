//! The capability every emittable component type implements: ports, parameters, a body and an
//! instantiation.

mod entity;
mod gates;
mod plexers;
mod register;
mod site;
mod subcircuit;
mod table;

pub use entity::*;
pub use gates::*;
pub use plexers::*;
pub use register::*;
pub use site::*;
pub use subcircuit::*;
pub use table::*;

use crate::error::{GenerationError, Result};
use crate::generator::GenerationContext;
use crate::graph::{Attributes, Direction};
use crate::hdl::{Bit, Dialect, Entity, Expr, Instance, PortDecl, PortMap, SignalDecl, Stmt, Width};
use crate::netlist::BubbleKind;

/// Where the actual of a port comes from when a component is instantiated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PortConnection {
    /// The whole of one component end.
    End(usize),
    /// Bit `i` of the port is the single bit of the `i`th listed end.
    Ends(Vec<usize>),
    /// The clock signal feeding the clock end.
    ClockOf(usize),
    /// The clock-enable tick belonging to the clock end.
    TickOf(usize),
    /// This instance's slice of the parent's bubble bus.
    Bubbles(BubbleKind),
    Fixed(Expr),
}

/// A port of an emitted entity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Port {
    pub name: String,
    /// Width in this configuration.
    pub width: u32,
    /// Width as declared by the entity, possibly through a generic.
    pub decl: Width,
    pub connection: PortConnection,
    /// Value tied to unconnected input bits.
    pub unconnected: Bit,
}

impl Port {
    pub fn new(name: impl Into<String>, width: u32, connection: PortConnection) -> Port {
        Port {
            name: name.into(),
            width,
            decl: Width::Fixed(width),
            connection,
            unconnected: Bit::Zero,
        }
    }

    /// Declares the port through `generic` when it is wider than one bit.
    pub fn sized_by(mut self, generic: &str) -> Port {
        self.decl = Width::fixed_or_generic(self.width, generic);
        self
    }

    pub fn tie(mut self, bit: Bit) -> Port {
        self.unconnected = bit;
        self
    }

    pub fn decl(&self, direction: Direction) -> PortDecl {
        PortDecl {
            name: self.name.clone(),
            direction,
            width: self.decl.clone(),
        }
    }
}

/// Declarations and statements of an architecture.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Body {
    pub signals: Vec<SignalDecl>,
    pub statements: Vec<Stmt>,
}

impl Body {
    pub fn raw(text: impl Into<String>) -> Body {
        Body {
            signals: Vec::new(),
            statements: vec![Stmt::Raw(text.into())],
        }
    }
}

/// Emits one kind of component.
///
/// Implementations are stateless with respect to a generation run; everything that varies per
/// placement comes in through the attributes or the [`Site`].
pub trait ComponentBinding<'a> {
    /// Name of the emitted entity for this configuration. Configurations with equal keys share
    /// one definition.
    fn type_key(&self, attrs: &Attributes) -> String;

    /// What the key was derived from, for collision diagnostics.
    fn origin(&self) -> String;

    /// Prefix of generated instance labels.
    fn identifier(&self) -> &str;

    /// Output sub-directory of the emitted file.
    fn sub_dir(&self) -> &'static str;

    fn supports(&self, _dialect: Dialect, _attrs: &Attributes) -> bool {
        true
    }

    fn input_ports(&self, attrs: &Attributes) -> Vec<Port>;

    fn output_ports(&self, attrs: &Attributes) -> Vec<Port>;

    fn inout_ports(&self, _attrs: &Attributes) -> Vec<Port> {
        Vec::new()
    }

    fn parameters(&self, _attrs: &Attributes) -> Vec<(String, u64)> {
        Vec::new()
    }

    /// Inline-only components never get an entity of their own; their statements are spliced
    /// into the parent body by [`inline_body`](ComponentBinding::inline_body).
    fn is_inline_only(&self, _dialect: Dialect) -> bool {
        false
    }

    fn body(&self, _attrs: &Attributes, _ctx: &mut GenerationContext<'_, 'a>) -> Result<Body> {
        Err(GenerationError::internal(format!(
            "\"{}\" has no body of its own.",
            self.origin()
        )))
    }

    fn inline_body(&self, _site: &mut Site<'_, 'a>) -> Result<Vec<Stmt>> {
        Err(GenerationError::internal(format!(
            "\"{}\" cannot be inlined.",
            self.origin()
        )))
    }

    fn instantiate(&self, site: &mut Site<'_, 'a>) -> Result<Stmt> {
        let attrs = site.attributes();
        let mut ports = Vec::new();
        for port in self.input_ports(attrs) {
            ports.push(PortMap {
                actual: site.input_actual(&port)?,
                formal: port.name,
            });
        }
        for port in self
            .output_ports(attrs)
            .into_iter()
            .chain(self.inout_ports(attrs))
        {
            ports.push(PortMap {
                actual: site.output_actual(&port)?,
                formal: port.name,
            });
        }
        Ok(Stmt::Instance(Instance {
            label: site.label().to_string(),
            entity: self.type_key(attrs),
            generics: self.parameters(attrs),
            ports,
        }))
    }

    /// The complete definition, with `body` as its architecture.
    fn entity(&self, attrs: &Attributes, body: Body) -> Entity {
        let mut ports = Vec::new();
        ports.extend(
            self.input_ports(attrs)
                .iter()
                .map(|port| port.decl(Direction::Input)),
        );
        ports.extend(
            self.output_ports(attrs)
                .iter()
                .map(|port| port.decl(Direction::Output)),
        );
        ports.extend(
            self.inout_ports(attrs)
                .iter()
                .map(|port| port.decl(Direction::Inout)),
        );
        Entity {
            name: self.type_key(attrs),
            generics: self
                .parameters(attrs)
                .into_iter()
                .map(|(name, _)| name)
                .collect(),
            ports,
            signals: body.signals,
            statements: body.statements,
        }
    }
}

/// `name = '0'`
pub(crate) fn is_low(name: &str) -> Expr {
    Expr::equals(Expr::name(name), Expr::bit(Bit::Zero))
}
