use super::*;

use crate::graph::{ComponentKind, LeafType};
use crate::netlist::{Design, NetlistComponent};
use crate::options::ClockMode;

use std::collections::HashMap;
use std::ops::Deref;

/// A binding looked up for one placed component.
pub enum Resolved<'r, 'a> {
    Shared(&'r dyn ComponentBinding<'a>),
    Owned(Box<dyn ComponentBinding<'a> + 'r>),
}

impl<'r, 'a> Deref for Resolved<'r, 'a> {
    type Target = dyn ComponentBinding<'a> + 'r;

    fn deref(&self) -> &Self::Target {
        match self {
            Resolved::Shared(binding) => *binding,
            Resolved::Owned(binding) => binding.as_ref(),
        }
    }
}

/// Every leaf type's binding, keyed by type. Sub-circuit and entity bindings wrap the definition
/// they stand for and are built on lookup.
pub struct BindingTable<'a> {
    leaves: HashMap<LeafType, Box<dyn ComponentBinding<'a>>>,
    clock_mode: ClockMode,
}

impl<'a> BindingTable<'a> {
    pub fn new(clock_mode: ClockMode) -> BindingTable<'a> {
        let mut leaves: HashMap<LeafType, Box<dyn ComponentBinding<'a>>> = HashMap::new();
        for leaf in LeafType::ALL.iter().copied() {
            let binding: Box<dyn ComponentBinding<'a>> = match leaf {
                LeafType::Multiplexer => Box::new(MultiplexerBinding),
                LeafType::Demultiplexer => Box::new(DemultiplexerBinding),
                LeafType::Decoder => Box::new(DecoderBinding),
                LeafType::PriorityEncoder => Box::new(PriorityEncoderBinding),
                LeafType::Register => Box::new(RegisterBinding),
                _ => Box::new(GatesBinding::new(leaf)),
            };
            leaves.insert(leaf, binding);
        }
        BindingTable { leaves, clock_mode }
    }

    pub fn clock_mode(&self) -> ClockMode {
        self.clock_mode
    }

    /// The binding that emits `component` in `dialect`.
    ///
    /// Fails with [`GenerationError::UnsupportedComponent`] if nothing can emit it.
    pub fn resolve<'r>(
        &'r self,
        design: &'r Design<'a>,
        component: &NetlistComponent<'a>,
        dialect: Dialect,
    ) -> Result<Resolved<'r, 'a>> {
        let inner = component.component();
        let resolved = match inner.kind() {
            ComponentKind::Leaf(leaf) => match self.leaves.get(leaf) {
                Some(binding) => Resolved::Shared(binding.as_ref()),
                None => return Err(unsupported(component, dialect)),
            },
            ComponentKind::Subcircuit(circuit) => Resolved::Owned(Box::new(
                SubcircuitBinding::new(design.netlist_of(circuit)?, self.clock_mode),
            )),
            ComponentKind::Entity(entity) => Resolved::Owned(Box::new(EntityBinding::new(entity))),
            ComponentKind::Unknown { .. } => return Err(unsupported(component, dialect)),
            ComponentKind::Pin(_) | ComponentKind::Clock => {
                return Err(GenerationError::internal(format!(
                    "{} is handled by its circuit and has no binding.",
                    inner.describe()
                )))
            }
        };
        if !resolved.supports(dialect, inner.attributes()) {
            return Err(unsupported(component, dialect));
        }
        Ok(resolved)
    }
}

fn unsupported(component: &NetlistComponent<'_>, dialect: Dialect) -> GenerationError {
    let inner = component.component();
    GenerationError::UnsupportedComponent {
        component: inner.describe(),
        attributes: inner.attributes().summary(),
        dialect,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::graph::{Context, EndSpec, EntityPort};

    #[test]
    fn leaves_resolve_to_shared_bindings() {
        let c = Context::new();

        let m = c.circuit("m");
        let _ = m.leaf(LeafType::Multiplexer, Attributes::new());
        let _ = m.leaf(LeafType::Xor, Attributes::new());

        let design = Design::analyze(m).unwrap();
        let table = BindingTable::new(ClockMode::Derived);
        let netlist = design.top();

        let mux = table
            .resolve(&design, &netlist.components()[0], Dialect::Vhdl)
            .unwrap();
        assert_eq!(mux.type_key(&Attributes::new()), "Multiplexer_2");
        assert!(!mux.is_inline_only(Dialect::Vhdl));

        let xor = table
            .resolve(&design, &netlist.components()[1], Dialect::Verilog)
            .unwrap();
        assert!(xor.is_inline_only(Dialect::Verilog));
    }

    #[test]
    fn unknown_components_are_unsupported() {
        let c = Context::new();

        let m = c.circuit("m");
        let _ = m.unknown(
            "Keyboard",
            vec![EndSpec::output(7)],
            Attributes::new().with("buffer", 32u32),
        );

        let design = Design::analyze(m).unwrap();
        let table = BindingTable::new(ClockMode::Derived);

        match table.resolve(&design, &design.top().components()[0], Dialect::Vhdl) {
            Err(GenerationError::UnsupportedComponent {
                component, dialect, ..
            }) => {
                assert_eq!(component, "Keyboard #0");
                assert_eq!(dialect, Dialect::Vhdl);
            }
            _ => panic!("expected an unsupported component error"),
        };
    }

    #[test]
    fn entities_resolve_only_in_their_dialect() {
        let c = Context::new();
        let e = c.entity(
            "blink",
            Dialect::Verilog,
            vec![EntityPort::new("led", Direction::Output, 1)],
            "assign led = 1'b1;",
        );

        let m = c.circuit("m");
        let _ = m.entity_instance(e);

        let design = Design::analyze(m).unwrap();
        let table = BindingTable::new(ClockMode::Derived);
        let component = &design.top().components()[0];

        assert!(table.resolve(&design, component, Dialect::Verilog).is_ok());
        assert!(matches!(
            table.resolve(&design, component, Dialect::Vhdl),
            Err(GenerationError::UnsupportedComponent { .. })
        ));
    }
}
