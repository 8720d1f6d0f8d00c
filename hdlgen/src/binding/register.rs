use super::*;

use crate::graph::register_ends::{CLOCK, D, ENABLE, Q, RESET};

const REGISTER_FILE: &str = "REGISTER_FILE";
const MEMORY_DIR: &str = "memory";
const NR_OF_BITS: &str = "NrOfBits";
const STATE: &str = "s_state_reg";

/// Rising-edge register with asynchronous reset and clock enable.
pub struct RegisterBinding;

impl RegisterBinding {
    fn build_body(attrs: &Attributes) -> Body {
        let width = Width::fixed_or_generic(attrs.width(), NR_OF_BITS);
        Body {
            signals: vec![SignalDecl::reg(STATE, width.clone())],
            statements: vec![
                Stmt::RegisterUpdate {
                    target: STATE.to_string(),
                    width,
                    clock: "Clock".to_string(),
                    reset: "Reset".to_string(),
                    tick: "Tick".to_string(),
                    enable: "Enable".to_string(),
                    next: Expr::name("D"),
                },
                Stmt::Assign {
                    target: Expr::name("Q"),
                    value: Expr::name(STATE),
                },
            ],
        }
    }
}

impl<'a> ComponentBinding<'a> for RegisterBinding {
    fn type_key(&self, attrs: &Attributes) -> String {
        if attrs.width() > 1 {
            "Register_bus".to_string()
        } else {
            "Register_bit".to_string()
        }
    }

    fn origin(&self) -> String {
        "Register".to_string()
    }

    fn identifier(&self) -> &str {
        REGISTER_FILE
    }

    fn sub_dir(&self) -> &'static str {
        MEMORY_DIR
    }

    fn input_ports(&self, attrs: &Attributes) -> Vec<Port> {
        vec![
            Port::new("Reset", 1, PortConnection::End(RESET)),
            Port::new("Enable", 1, PortConnection::End(ENABLE)).tie(Bit::One),
            Port::new("Tick", 1, PortConnection::TickOf(CLOCK)),
            Port::new("Clock", 1, PortConnection::ClockOf(CLOCK)),
            Port::new("D", attrs.width(), PortConnection::End(D)).sized_by(NR_OF_BITS),
        ]
    }

    fn output_ports(&self, attrs: &Attributes) -> Vec<Port> {
        vec![Port::new("Q", attrs.width(), PortConnection::End(Q)).sized_by(NR_OF_BITS)]
    }

    fn parameters(&self, attrs: &Attributes) -> Vec<(String, u64)> {
        let width = attrs.width();
        if width > 1 {
            vec![(NR_OF_BITS.to_string(), width as u64)]
        } else {
            Vec::new()
        }
    }

    fn body(&self, attrs: &Attributes, _ctx: &mut GenerationContext<'_, 'a>) -> Result<Body> {
        Ok(RegisterBinding::build_body(attrs))
    }
}
