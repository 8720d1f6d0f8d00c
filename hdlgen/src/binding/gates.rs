use super::*;

use crate::graph::attributes::{INPUTS, VALUE};
use crate::graph::LeafType;
use crate::hdl::BinOp;

const GATES: &str = "GATES";
const GATES_DIR: &str = "gates";
const OUTPUT_END: usize = 0;

/// The combinational primitives: logic gates, NOT and constants.
///
/// These never get an entity of their own. Each placement becomes one or more assignments in the
/// body of the enclosing circuit. Unconnected gate inputs are left out of the expression rather
/// than tied to a constant.
pub struct GatesBinding {
    leaf: LeafType,
}

impl GatesBinding {
    pub fn new(leaf: LeafType) -> GatesBinding {
        GatesBinding { leaf }
    }

    fn input_count(&self, attrs: &Attributes) -> usize {
        match self.leaf {
            LeafType::Not => 1,
            LeafType::Constant => 0,
            _ => attrs.int(INPUTS, 2) as usize,
        }
    }

    fn combine(&self, mut operands: Vec<Expr>) -> Expr {
        let (op, negated) = match self.leaf {
            LeafType::Or => (BinOp::Or, false),
            LeafType::Xor => (BinOp::Xor, false),
            LeafType::Nand => (BinOp::And, true),
            LeafType::Nor => (BinOp::Or, true),
            LeafType::Xnor => (BinOp::Xor, true),
            LeafType::Not => (BinOp::And, true),
            _ => (BinOp::And, false),
        };
        let base = if operands.len() == 1 {
            operands.remove(0)
        } else {
            Expr::BinOp { op, operands }
        };
        if negated {
            Expr::negate(base)
        } else {
            base
        }
    }

    fn constant_body(&self, site: &mut Site<'_, '_>) -> Result<Vec<Stmt>> {
        let attrs = site.attributes();
        let width = attrs.width();
        let value = attrs.int(VALUE, 0) & mask(width);
        if let Some(target) = site.whole(OUTPUT_END)? {
            return Ok(vec![Stmt::Assign {
                target,
                value: Expr::Const { value, width },
            }]);
        }
        let mut statements = Vec::new();
        for bit in 0..width {
            if let Some(target) = site.bit(OUTPUT_END, bit)? {
                let bit = if (value >> bit) & 1 == 1 {
                    Bit::One
                } else {
                    Bit::Zero
                };
                statements.push(Stmt::Assign {
                    target,
                    value: Expr::bit(bit),
                });
            }
        }
        Ok(statements)
    }

    fn gate_body(&self, site: &mut Site<'_, '_>) -> Result<Vec<Stmt>> {
        let attrs = site.attributes();
        let width = attrs.width();
        let mut inputs = Vec::new();
        for end in 1..=self.input_count(attrs) {
            if !site.is_unconnected(end)? {
                inputs.push(end);
            }
        }
        if inputs.is_empty() {
            let description = site.component().component().describe();
            site.warn(format!(
                "{} has no connected inputs, its output is left undriven.",
                description
            ));
            return Ok(Vec::new());
        }

        if let Some(target) = site.whole(OUTPUT_END)? {
            let mut operands = Vec::with_capacity(inputs.len());
            for end in inputs.iter() {
                match site.whole(*end)? {
                    Some(operand) => operands.push(operand),
                    None => break,
                }
            }
            if operands.len() == inputs.len() {
                return Ok(vec![Stmt::Assign {
                    target,
                    value: self.combine(operands),
                }]);
            }
        }

        let mut statements = Vec::new();
        for bit in 0..width {
            let target = match site.bit(OUTPUT_END, bit)? {
                Some(target) => target,
                None => continue,
            };
            let mut operands = Vec::new();
            for end in inputs.iter() {
                if let Some(operand) = site.bit(*end, bit)? {
                    operands.push(operand);
                }
            }
            if operands.is_empty() {
                continue;
            }
            statements.push(Stmt::Assign {
                target,
                value: self.combine(operands),
            });
        }
        Ok(statements)
    }
}

fn mask(width: u32) -> u64 {
    if width >= 64 {
        u64::MAX
    } else {
        (1 << width) - 1
    }
}

impl<'a> ComponentBinding<'a> for GatesBinding {
    fn type_key(&self, attrs: &Attributes) -> String {
        let name = self.leaf.key().to_ascii_uppercase();
        let bus = if attrs.width() > 1 { "_BUS" } else { "" };
        match self.leaf {
            LeafType::Not | LeafType::Constant => format!("{}{}", name, bus),
            _ => format!("{}_GATE_{}_INPUTS{}", name, self.input_count(attrs), bus),
        }
    }

    fn origin(&self) -> String {
        self.leaf.name().to_string()
    }

    fn identifier(&self) -> &str {
        GATES
    }

    fn sub_dir(&self) -> &'static str {
        GATES_DIR
    }

    fn input_ports(&self, attrs: &Attributes) -> Vec<Port> {
        let width = attrs.width();
        (1..=self.input_count(attrs))
            .map(|end| Port::new(format!("Input_{}", end), width, PortConnection::End(end)))
            .collect()
    }

    fn output_ports(&self, attrs: &Attributes) -> Vec<Port> {
        vec![Port::new(
            "Result",
            attrs.width(),
            PortConnection::End(OUTPUT_END),
        )]
    }

    fn is_inline_only(&self, _dialect: Dialect) -> bool {
        true
    }

    fn inline_body(&self, site: &mut Site<'_, 'a>) -> Result<Vec<Stmt>> {
        if site.is_unconnected(OUTPUT_END)? {
            return Ok(Vec::new());
        }
        match self.leaf {
            LeafType::Constant => self.constant_body(site),
            _ => self.gate_body(site),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::graph::attributes::WIDTH;

    use test_case::test_case;

    #[test_case(LeafType::And, Attributes::new(), "AND_GATE_2_INPUTS" ; "two input and")]
    #[test_case(LeafType::Nor, Attributes::new().with(INPUTS, 3u32).with(WIDTH, 4u32), "NOR_GATE_3_INPUTS_BUS" ; "bus nor")]
    #[test_case(LeafType::Not, Attributes::new(), "NOT" ; "not")]
    #[test_case(LeafType::Constant, Attributes::new().with(WIDTH, 8u32), "CONSTANT_BUS" ; "bus constant")]
    fn type_keys(leaf: LeafType, attrs: Attributes, expected: &str) {
        let binding = GatesBinding::new(leaf);

        assert_eq!(ComponentBinding::<'static>::type_key(&binding, &attrs), expected);
    }

    #[test]
    fn negated_gates_wrap_their_base() {
        let operands = vec![Expr::name("a"), Expr::name("b")];

        assert_eq!(
            GatesBinding::new(LeafType::Xnor)
                .combine(operands.clone())
                .render(Dialect::Vhdl),
            "NOT(a XOR b)"
        );
        assert_eq!(
            GatesBinding::new(LeafType::Or)
                .combine(operands)
                .render(Dialect::Verilog),
            "a | b"
        );
        assert_eq!(
            GatesBinding::new(LeafType::Not)
                .combine(vec![Expr::name("a")])
                .render(Dialect::Verilog),
            "~(a)"
        );
    }

    #[test]
    fn single_connected_input_passes_through() {
        assert_eq!(
            GatesBinding::new(LeafType::And).combine(vec![Expr::index("s_LOGISIM_BUS_1", 2)]),
            Expr::index("s_LOGISIM_BUS_1", 2)
        );
    }

    #[test]
    fn masks() {
        assert_eq!(mask(1), 1);
        assert_eq!(mask(8), 0xff);
        assert_eq!(mask(64), u64::MAX);
    }
}
