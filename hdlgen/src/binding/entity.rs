use super::*;

use crate::graph::HdlEntity;
use crate::sanitize::sanitize;

const HDL_ENTITY: &str = "HDL_ENTITY";
const HDL_DIR: &str = "hdl";

/// A component described directly in HDL. Its body is copied verbatim, so it only generates in
/// the dialect it was written in.
pub struct EntityBinding<'a> {
    entity: &'a HdlEntity,
}

impl<'a> EntityBinding<'a> {
    pub fn new(entity: &'a HdlEntity) -> EntityBinding<'a> {
        EntityBinding { entity }
    }

    fn ports(&self, direction: Direction) -> Vec<Port> {
        self.entity
            .ports()
            .iter()
            .enumerate()
            .filter(|(_, port)| port.direction == direction)
            .map(|(end, port)| Port::new(port.name.clone(), port.width, PortConnection::End(end)))
            .collect()
    }
}

impl<'a> ComponentBinding<'a> for EntityBinding<'a> {
    fn type_key(&self, _attrs: &Attributes) -> String {
        sanitize(self.entity.name(), &self.entity.index().to_string())
    }

    fn origin(&self) -> String {
        format!("entity \"{}\"", self.entity.name())
    }

    fn identifier(&self) -> &str {
        HDL_ENTITY
    }

    fn sub_dir(&self) -> &'static str {
        HDL_DIR
    }

    fn supports(&self, dialect: Dialect, _attrs: &Attributes) -> bool {
        dialect == self.entity.dialect()
    }

    fn input_ports(&self, _attrs: &Attributes) -> Vec<Port> {
        self.ports(Direction::Input)
    }

    fn output_ports(&self, _attrs: &Attributes) -> Vec<Port> {
        self.ports(Direction::Output)
    }

    fn inout_ports(&self, _attrs: &Attributes) -> Vec<Port> {
        self.ports(Direction::Inout)
    }

    fn body(&self, _attrs: &Attributes, _ctx: &mut GenerationContext<'_, 'a>) -> Result<Body> {
        Ok(Body::raw(self.entity.body()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::graph::{Context, EntityPort};

    #[test]
    fn ports_keep_end_indices() {
        let c = Context::new();
        let e = c.entity(
            "my counter",
            Dialect::Vhdl,
            vec![
                EntityPort::new("clk", Direction::Input, 1),
                EntityPort::new("count", Direction::Output, 8),
                EntityPort::new("load", Direction::Input, 8),
            ],
            "count <= load;",
        );
        let binding = EntityBinding::new(e);
        let attrs = Attributes::new();

        let inputs = binding.input_ports(&attrs);
        assert_eq!(inputs.len(), 2);
        assert_eq!(inputs[1].name, "load");
        assert_eq!(inputs[1].connection, PortConnection::End(2));
        assert_eq!(binding.output_ports(&attrs)[0].width, 8);
        assert_eq!(binding.type_key(&attrs), "my_counter_0");
    }

    #[test]
    fn only_its_own_dialect() {
        let c = Context::new();
        let e = c.entity("blink", Dialect::Verilog, Vec::new(), "");
        let binding = EntityBinding::new(e);

        assert!(binding.supports(Dialect::Verilog, &Attributes::new()));
        assert!(!binding.supports(Dialect::Vhdl, &Attributes::new()));
    }
}
