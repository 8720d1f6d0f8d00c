use super::ir::*;
use super::Dialect;

use crate::code_writer::CodeWriter;
use crate::error::{GenerationError, Result};
use crate::graph::Direction;

use std::io::Write;

const BAR_WIDTH: usize = 78;

impl Width {
    fn vhdl_type(&self) -> String {
        match self {
            Width::Fixed(1) => "std_logic".to_string(),
            Width::Fixed(width) => format!("std_logic_vector( {} DOWNTO 0 )", width - 1),
            Width::Generic(name) => format!("std_logic_vector( {}-1 DOWNTO 0 )", name),
        }
    }

    fn verilog_range(&self) -> String {
        match self {
            Width::Fixed(1) => String::new(),
            Width::Fixed(width) => format!("[{}:0] ", width - 1),
            Width::Generic(name) => format!("[{}-1:0] ", name),
        }
    }
}

fn direction_keyword(direction: Direction, dialect: Dialect) -> &'static str {
    match (dialect, direction) {
        (Dialect::Vhdl, Direction::Input) => "IN",
        (Dialect::Vhdl, Direction::Output) => "OUT",
        (Dialect::Vhdl, Direction::Inout) => "INOUT",
        (Dialect::Verilog, Direction::Input) => "input",
        (Dialect::Verilog, Direction::Output) => "output",
        (Dialect::Verilog, Direction::Inout) => "inout",
    }
}

fn binary_digits(value: u64, width: u32) -> String {
    (0..width)
        .rev()
        .map(|bit| {
            if bit < 64 && (value >> bit) & 1 == 1 {
                '1'
            } else {
                '0'
            }
        })
        .collect()
}

fn vhdl_bit(bit: Bit) -> char {
    match bit {
        Bit::Zero => '0',
        Bit::One => '1',
        Bit::HighZ => 'Z',
    }
}

fn verilog_bit(bit: Bit) -> char {
    match bit {
        Bit::Zero => '0',
        Bit::One => '1',
        Bit::HighZ => 'z',
    }
}

impl Expr {
    pub fn render(&self, dialect: Dialect) -> String {
        let syntax = dialect.syntax();
        match self {
            Expr::Ref(name) => name.clone(),
            Expr::Index { name, index } => format!(
                "{}{}{}{}",
                name, syntax.open_bracket, index, syntax.close_bracket
            ),
            Expr::Slice { name, high, low } => format!(
                "{}{}{}{}{}{}",
                name,
                syntax.open_bracket,
                high,
                syntax.range_separator,
                low,
                syntax.close_bracket
            ),
            Expr::Const { value, width } => match dialect {
                Dialect::Vhdl if *width == 1 => format!("'{}'", value & 1),
                Dialect::Vhdl => format!("\"{}\"", binary_digits(*value, *width)),
                Dialect::Verilog => format!("{}'d{}", width, value),
            },
            Expr::Filled { bit, width } => match (dialect, width) {
                (Dialect::Vhdl, Width::Fixed(1)) => format!("'{}'", vhdl_bit(*bit)),
                (Dialect::Vhdl, Width::Fixed(width)) => {
                    let digit = vhdl_bit(*bit).to_string();
                    format!("\"{}\"", digit.repeat(*width as usize))
                }
                (Dialect::Vhdl, Width::Generic(_)) => format!("(OTHERS => '{}')", vhdl_bit(*bit)),
                (Dialect::Verilog, Width::Fixed(1)) => format!("1'b{}", verilog_bit(*bit)),
                (Dialect::Verilog, Width::Fixed(width)) => match bit {
                    Bit::Zero => format!("{}'d0", width),
                    Bit::HighZ => format!("{}'bz", width),
                    Bit::One => format!("{{{}{{1'b1}}}}", width),
                },
                (Dialect::Verilog, Width::Generic(name)) => {
                    format!("{{{}{{1'b{}}}}}", name, verilog_bit(*bit))
                }
            },
            Expr::Concat(parts) => match dialect {
                Dialect::Vhdl => parts
                    .iter()
                    .map(|part| part.render_operand(dialect))
                    .collect::<Vec<_>>()
                    .join(" & "),
                Dialect::Verilog => format!(
                    "{{{}}}",
                    parts
                        .iter()
                        .map(|part| part.render(dialect))
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            },
            Expr::Not(source) => format!("{}({})", syntax.not_operator, source.render(dialect)),
            Expr::BinOp { op, operands } => {
                let operator = match op {
                    BinOp::And => syntax.and_operator,
                    BinOp::Or => syntax.or_operator,
                    BinOp::Xor => syntax.xor_operator,
                };
                operands
                    .iter()
                    .map(|operand| operand.render_operand(dialect))
                    .collect::<Vec<_>>()
                    .join(&format!(" {} ", operator))
            }
            Expr::Eq { lhs, rhs } => format!(
                "({} {} {})",
                lhs.render(dialect),
                syntax.equals_operator,
                rhs.render(dialect)
            ),
        }
    }

    fn render_operand(&self, dialect: Dialect) -> String {
        match self {
            Expr::BinOp { operands, .. } if operands.len() > 1 => {
                format!("({})", self.render(dialect))
            }
            Expr::Concat(parts) if parts.len() > 1 => format!("({})", self.render(dialect)),
            _ => self.render(dialect),
        }
    }
}

fn write_remark<W: Write>(lines: &[String], dialect: Dialect, w: &mut CodeWriter<W>) -> Result<()> {
    let prefix = dialect.syntax().comment_prefix;
    let bar = format!("{}{}", prefix, "-".repeat(BAR_WIDTH - prefix.len()));
    w.append_line(&bar)?;
    for line in lines.iter() {
        w.append_line(&format!("{} {}", prefix, line))?;
    }
    w.append_line(&bar)?;
    Ok(())
}

impl Stmt {
    pub fn write<W: Write>(&self, dialect: Dialect, w: &mut CodeWriter<W>) -> Result<()> {
        let syntax = dialect.syntax();
        match self {
            Stmt::Remark(lines) => write_remark(lines, dialect, w)?,
            Stmt::Blank => w.append_newline()?,
            Stmt::Assign { target, value } => {
                let prefix = match dialect {
                    Dialect::Vhdl => "",
                    Dialect::Verilog => "assign ",
                };
                w.append_line(&format!(
                    "{}{}{}{};",
                    prefix,
                    target.render(dialect),
                    syntax.assignment,
                    value.render(dialect)
                ))?;
            }
            Stmt::ConditionalAssign {
                target,
                arms,
                otherwise,
            } => {
                let target = target.render(dialect);
                let head = match dialect {
                    Dialect::Vhdl => format!("{}{}", target, syntax.assignment),
                    Dialect::Verilog => format!("assign {}{}", target, syntax.assignment),
                };
                if arms.is_empty() {
                    w.append_line(&format!("{}{};", head, otherwise.render(dialect)))?;
                    return Ok(());
                }
                for (i, (cond, value)) in arms.iter().enumerate() {
                    let arm = match dialect {
                        Dialect::Vhdl => format!(
                            "{} WHEN {} ELSE",
                            value.render(dialect),
                            cond.render(dialect)
                        ),
                        Dialect::Verilog => format!(
                            "{} ? {} :",
                            cond.render(dialect),
                            value.render(dialect)
                        ),
                    };
                    if i == 0 {
                        w.append_line(&format!("{}{}", head, arm))?;
                        w.indent();
                    } else {
                        w.append_line(&arm)?;
                    }
                }
                w.append_line(&format!("{};", otherwise.render(dialect)))?;
                w.unindent()?;
            }
            Stmt::Select {
                target,
                selector,
                selector_width,
                arms,
                otherwise,
            } => {
                let label = |value: u64| Expr::Const {
                    value,
                    width: *selector_width,
                };
                match dialect {
                    Dialect::Vhdl => {
                        w.append_line(&format!("WITH ({}) SELECT {} <=", selector, target))?;
                        w.indent();
                        for (value, expr) in arms.iter() {
                            w.append_line(&format!(
                                "{} WHEN {},",
                                expr.render(dialect),
                                label(*value).render(dialect)
                            ))?;
                        }
                        w.append_line(&format!(
                            "{} {};",
                            otherwise.render(dialect),
                            syntax.default_case_label
                        ))?;
                        w.unindent()?;
                    }
                    Dialect::Verilog => {
                        w.append_line("always @(*)")?;
                        w.indent();
                        w.append_line(&format!("case ({})", selector))?;
                        w.indent();
                        for (value, expr) in arms.iter() {
                            w.append_line(&format!(
                                "{}: {} = {};",
                                label(*value).render(dialect),
                                target,
                                expr.render(dialect)
                            ))?;
                        }
                        w.append_line(&format!(
                            "{} {} = {};",
                            syntax.default_case_label,
                            target,
                            otherwise.render(dialect)
                        ))?;
                        w.unindent()?;
                        w.append_line("endcase")?;
                        w.unindent()?;
                    }
                }
            }
            Stmt::RegisterUpdate {
                target,
                width,
                clock,
                reset,
                tick,
                enable,
                next,
            } => {
                let zero = Expr::Filled {
                    bit: Bit::Zero,
                    width: width.clone(),
                }
                .render(dialect);
                let next = next.render(dialect);
                match dialect {
                    Dialect::Vhdl => {
                        w.append_line(&format!(
                            "make_{} : PROCESS( {}, {} )",
                            target, clock, reset
                        ))?;
                        w.append_line("BEGIN")?;
                        w.indent();
                        w.append_line(&format!("IF ({} = '1') THEN", reset))?;
                        w.indent();
                        w.append_line(&format!("{} <= {};", target, zero))?;
                        w.unindent()?;
                        w.append_line(&format!("ELSIF (rising_edge({})) THEN", clock))?;
                        w.indent();
                        w.append_line(&format!(
                            "IF ({} = '1' AND {} = '1') THEN",
                            tick, enable
                        ))?;
                        w.indent();
                        w.append_line(&format!("{} <= {};", target, next))?;
                        w.unindent()?;
                        w.append_line("END IF;")?;
                        w.unindent()?;
                        w.append_line("END IF;")?;
                        w.unindent()?;
                        w.append_line(&format!("END PROCESS make_{};", target))?;
                    }
                    Dialect::Verilog => {
                        w.append_line(&format!(
                            "always @(posedge {} or posedge {})",
                            clock, reset
                        ))?;
                        w.append_line("begin")?;
                        w.indent();
                        w.append_line(&format!("if ({} == 1'b1)", reset))?;
                        w.indent();
                        w.append_line(&format!("{} <= {};", target, zero))?;
                        w.unindent()?;
                        w.append_line(&format!(
                            "else if (({} == 1'b1) & ({} == 1'b1))",
                            tick, enable
                        ))?;
                        w.indent();
                        w.append_line(&format!("{} <= {};", target, next))?;
                        w.unindent()?;
                        w.unindent()?;
                        w.append_line("end")?;
                    }
                }
            }
            Stmt::Instance(instance) => instance.write(dialect, w)?,
            Stmt::Raw(text) => {
                for line in text.lines() {
                    let line = line.trim_end();
                    if line.is_empty() {
                        w.append_newline()?;
                    } else {
                        w.append_line(line)?;
                    }
                }
            }
        }

        Ok(())
    }
}

/// Writes `items` one per line, separated by `separator`.
fn write_list<W: Write>(items: &[String], separator: &str, w: &mut CodeWriter<W>) -> Result<()> {
    for (i, item) in items.iter().enumerate() {
        if i + 1 < items.len() {
            w.append_line(&format!("{}{}", item, separator))?;
        } else {
            w.append_line(item)?;
        }
    }
    Ok(())
}

impl Instance {
    fn port_associations(&self, dialect: Dialect) -> Result<Vec<String>> {
        let mut associations = Vec::new();
        for port in self.ports.iter() {
            match (&port.actual, dialect) {
                (Actual::Expr(expr), Dialect::Vhdl) => {
                    associations.push(format!("{} => {}", port.formal, expr.render(dialect)))
                }
                (Actual::Expr(expr), Dialect::Verilog) => {
                    associations.push(format!(".{}({})", port.formal, expr.render(dialect)))
                }
                (Actual::Open, Dialect::Vhdl) => associations.push(format!("{} => OPEN", port.formal)),
                (Actual::Open, Dialect::Verilog) => associations.push(format!(".{}()", port.formal)),
                (Actual::PerBit(bits), _) if bits.is_empty() => {
                    return Err(GenerationError::internal(format!(
                        "empty per-bit port map for \"{}\" of instance \"{}\"",
                        port.formal, self.label
                    )));
                }
                (Actual::PerBit(bits), Dialect::Vhdl) => {
                    for (i, bit) in bits.iter().enumerate() {
                        associations.push(format!(
                            "{}({}) => {}",
                            port.formal,
                            i,
                            bit.render(dialect)
                        ));
                    }
                }
                (Actual::PerBit(bits), Dialect::Verilog) => {
                    let concat = Expr::Concat(bits.iter().rev().cloned().collect());
                    associations.push(format!(".{}({})", port.formal, concat.render(dialect)));
                }
            }
        }
        Ok(associations)
    }

    pub fn write<W: Write>(&self, dialect: Dialect, w: &mut CodeWriter<W>) -> Result<()> {
        let ports = self.port_associations(dialect)?;
        match dialect {
            Dialect::Vhdl => {
                let generics = self
                    .generics
                    .iter()
                    .map(|(name, value)| format!("{} => {}", name, value))
                    .collect::<Vec<_>>();
                if generics.is_empty() && ports.is_empty() {
                    w.append_line(&format!("{} : ENTITY work.{};", self.label, self.entity))?;
                    return Ok(());
                }
                w.append_line(&format!("{} : ENTITY work.{}", self.label, self.entity))?;
                w.indent();
                if !generics.is_empty() {
                    w.append_line("GENERIC MAP (")?;
                    w.indent();
                    write_list(&generics, ",", w)?;
                    w.unindent()?;
                    w.append_line(if ports.is_empty() { ");" } else { ")" })?;
                }
                if !ports.is_empty() {
                    w.append_line("PORT MAP (")?;
                    w.indent();
                    write_list(&ports, ",", w)?;
                    w.unindent()?;
                    w.append_line(");")?;
                }
                w.unindent()?;
            }
            Dialect::Verilog => {
                let generics = self
                    .generics
                    .iter()
                    .map(|(name, value)| format!(".{}({})", name, value))
                    .collect::<Vec<_>>();
                if generics.is_empty() {
                    w.append_line(&format!("{} {} (", self.entity, self.label))?;
                } else {
                    w.append_line(&format!("{} #(", self.entity))?;
                    w.indent();
                    write_list(&generics, ",", w)?;
                    w.unindent()?;
                    w.append_line(&format!(") {} (", self.label))?;
                }
                w.indent();
                write_list(&ports, ",", w)?;
                w.unindent()?;
                w.append_line(");")?;
            }
        }
        Ok(())
    }
}

impl Entity {
    pub fn write<W: Write>(&self, dialect: Dialect, w: &mut CodeWriter<W>) -> Result<()> {
        let prefix = dialect.syntax().comment_prefix;
        let bar = format!("{}{}", prefix, "=".repeat(BAR_WIDTH - prefix.len()));
        w.append_line(&bar)?;
        w.append_line(&format!("{}== Generated by hdlgen, do not edit", prefix))?;
        w.append_line(&format!("{}== Component : {}", prefix, self.name))?;
        w.append_line(&bar)?;
        w.append_newline()?;

        match dialect {
            Dialect::Vhdl => self.write_vhdl(w),
            Dialect::Verilog => self.write_verilog(w),
        }
    }

    fn write_vhdl<W: Write>(&self, w: &mut CodeWriter<W>) -> Result<()> {
        let dialect = Dialect::Vhdl;
        w.append_line("LIBRARY ieee;")?;
        w.append_line("USE ieee.std_logic_1164.all;")?;
        w.append_newline()?;

        w.append_line(&format!("ENTITY {} IS", self.name))?;
        w.indent();
        if !self.generics.is_empty() {
            w.append_line("GENERIC (")?;
            w.indent();
            let generics = self
                .generics
                .iter()
                .map(|name| format!("{} : INTEGER", name))
                .collect::<Vec<_>>();
            write_list(&generics, ";", w)?;
            w.unindent()?;
            w.append_line(");")?;
        }
        if !self.ports.is_empty() {
            w.append_line("PORT (")?;
            w.indent();
            let ports = self
                .ports
                .iter()
                .map(|port| {
                    format!(
                        "{} : {} {}",
                        port.name,
                        direction_keyword(port.direction, dialect),
                        port.width.vhdl_type()
                    )
                })
                .collect::<Vec<_>>();
            write_list(&ports, ";", w)?;
            w.unindent()?;
            w.append_line(");")?;
        }
        w.unindent()?;
        w.append_line(&format!("END ENTITY {};", self.name))?;
        w.append_newline()?;

        w.append_line(&format!("ARCHITECTURE PlatformIndependent OF {} IS", self.name))?;
        w.indent();
        if !self.signals.is_empty() {
            w.append_newline()?;
            for signal in self.signals.iter() {
                w.append_line(&format!(
                    "SIGNAL {} : {};",
                    signal.name,
                    signal.width.vhdl_type()
                ))?;
            }
        }
        w.unindent()?;
        w.append_newline()?;
        w.append_line("BEGIN")?;
        self.write_statements(dialect, w)?;
        w.append_line("END PlatformIndependent;")?;

        Ok(())
    }

    fn write_verilog<W: Write>(&self, w: &mut CodeWriter<W>) -> Result<()> {
        let dialect = Dialect::Verilog;
        if self.generics.is_empty() {
            w.append_line(&format!("module {} (", self.name))?;
        } else {
            w.append_line(&format!("module {} #(", self.name))?;
            w.indent();
            let generics = self
                .generics
                .iter()
                .map(|name| format!("parameter {} = 1", name))
                .collect::<Vec<_>>();
            write_list(&generics, ",", w)?;
            w.unindent()?;
            w.append_line(") (")?;
        }
        w.indent();
        let ports = self
            .ports
            .iter()
            .map(|port| {
                format!(
                    "{} wire {}{}",
                    direction_keyword(port.direction, dialect),
                    port.width.verilog_range(),
                    port.name
                )
            })
            .collect::<Vec<_>>();
        write_list(&ports, ",", w)?;
        w.unindent()?;
        w.append_line(");")?;

        if !self.signals.is_empty() {
            w.append_newline()?;
            w.indent();
            for signal in self.signals.iter() {
                let kind = match signal.kind {
                    SignalKind::Wire => "wire",
                    SignalKind::Reg => "reg",
                };
                w.append_line(&format!(
                    "{} {}{};",
                    kind,
                    signal.width.verilog_range(),
                    signal.name
                ))?;
            }
            w.unindent()?;
        }
        w.append_newline()?;
        self.write_statements(dialect, w)?;
        w.append_line("endmodule")?;

        Ok(())
    }

    fn write_statements<W: Write>(&self, dialect: Dialect, w: &mut CodeWriter<W>) -> Result<()> {
        w.indent();
        for statement in self.statements.iter() {
            statement.write(dialect, w)?;
        }
        w.unindent()?;
        if !self.statements.is_empty() && self.statements.last() != Some(&Stmt::Blank) {
            w.append_newline()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    fn render_stmt(stmt: &Stmt, dialect: Dialect) -> String {
        let mut w = CodeWriter::new(Vec::new(), "   ");
        stmt.write(dialect, &mut w).unwrap();
        String::from_utf8(w.into_inner()).unwrap()
    }

    fn render_entity(entity: &Entity, dialect: Dialect) -> String {
        let mut w = CodeWriter::new(Vec::new(), "   ");
        entity.write(dialect, &mut w).unwrap();
        String::from_utf8(w.into_inner()).unwrap()
    }

    #[test]
    fn expressions() {
        let cases = [
            (Expr::index("s_LOGISIM_BUS_3", 2), "s_LOGISIM_BUS_3(2)", "s_LOGISIM_BUS_3[2]"),
            (
                Expr::slice("s_LOGISIM_BUS_3", 7, 4),
                "s_LOGISIM_BUS_3(7 DOWNTO 4)",
                "s_LOGISIM_BUS_3[7:4]",
            ),
            (Expr::slice("b", 3, 3), "b(3)", "b[3]"),
            (Expr::Const { value: 5, width: 4 }, "\"0101\"", "4'd5"),
            (Expr::Const { value: 1, width: 1 }, "'1'", "1'd1"),
            (Expr::filled(Bit::Zero, 3), "\"000\"", "3'd0"),
            (Expr::filled(Bit::HighZ, 2), "\"ZZ\"", "2'bz"),
            (Expr::filled(Bit::One, 2), "\"11\"", "{2{1'b1}}"),
            (Expr::bit(Bit::One), "'1'", "1'b1"),
            (
                Expr::Filled {
                    bit: Bit::Zero,
                    width: Width::generic("NrOfBits"),
                },
                "(OTHERS => '0')",
                "{NrOfBits{1'b0}}",
            ),
            (
                Expr::Concat(vec![Expr::name("a"), Expr::index("b", 0)]),
                "a & b(0)",
                "{a, b[0]}",
            ),
            (
                Expr::negate(Expr::and(vec![Expr::name("a"), Expr::name("b")])),
                "NOT(a AND b)",
                "~(a & b)",
            ),
            (
                Expr::BinOp {
                    op: BinOp::Xor,
                    operands: vec![
                        Expr::name("a"),
                        Expr::BinOp {
                            op: BinOp::Or,
                            operands: vec![Expr::name("b"), Expr::name("c")],
                        },
                    ],
                },
                "a XOR (b OR c)",
                "a ^ (b | c)",
            ),
            (
                Expr::and(vec![
                    Expr::is_high("Enable"),
                    Expr::equals(Expr::name("Sel"), Expr::Const { value: 2, width: 2 }),
                ]),
                "(Enable = '1') AND (Sel = \"10\")",
                "(Enable == 1'b1) & (Sel == 2'd2)",
            ),
        ];
        for (expr, vhdl, verilog) in cases.iter() {
            assert_eq!(expr.render(Dialect::Vhdl), *vhdl);
            assert_eq!(expr.render(Dialect::Verilog), *verilog);
        }
    }

    #[test]
    fn assignments() {
        let stmt = Stmt::Assign {
            target: Expr::name("q"),
            value: Expr::index("s_LOGISIM_BUS_1", 0),
        };
        assert_eq!(render_stmt(&stmt, Dialect::Vhdl), "q <= s_LOGISIM_BUS_1(0);\n");
        assert_eq!(
            render_stmt(&stmt, Dialect::Verilog),
            "assign q = s_LOGISIM_BUS_1[0];\n"
        );
    }

    #[test]
    fn conditional_assignment() {
        let stmt = Stmt::ConditionalAssign {
            target: Expr::name("o"),
            arms: vec![
                (Expr::is_high("a"), Expr::Const { value: 1, width: 2 }),
                (Expr::is_high("b"), Expr::Const { value: 2, width: 2 }),
            ],
            otherwise: Expr::filled(Bit::Zero, 2),
        };
        assert_eq!(
            render_stmt(&stmt, Dialect::Vhdl),
            "o <= \"01\" WHEN (a = '1') ELSE\n   \"10\" WHEN (b = '1') ELSE\n   \"00\";\n"
        );
        assert_eq!(
            render_stmt(&stmt, Dialect::Verilog),
            "assign o = (a == 1'b1) ? 2'd1 :\n   (b == 1'b1) ? 2'd2 :\n   2'd0;\n"
        );
    }

    #[test]
    fn select_uses_default_arm() {
        let stmt = Stmt::Select {
            target: "s_selected".to_string(),
            selector: "Sel".to_string(),
            selector_width: 1,
            arms: vec![(0, Expr::name("MuxIn_0"))],
            otherwise: Expr::name("MuxIn_1"),
        };
        assert_eq!(
            render_stmt(&stmt, Dialect::Vhdl),
            "WITH (Sel) SELECT s_selected <=\n   MuxIn_0 WHEN '0',\n   MuxIn_1 WHEN OTHERS;\n"
        );
        assert_eq!(
            render_stmt(&stmt, Dialect::Verilog),
            "always @(*)\n   case (Sel)\n      1'd0: s_selected = MuxIn_0;\n      default: s_selected = MuxIn_1;\n   endcase\n"
        );
    }

    #[test]
    fn instances() {
        let stmt = Stmt::Instance(Instance {
            label: "PLEXERS_1".to_string(),
            entity: "Multiplexer_bus_2".to_string(),
            generics: vec![("NrOfBits".to_string(), 4)],
            ports: vec![
                PortMap {
                    formal: "MuxIn_0".to_string(),
                    actual: Actual::Expr(Expr::name("s_LOGISIM_BUS_0")),
                },
                PortMap {
                    formal: "Sel".to_string(),
                    actual: Actual::PerBit(vec![Expr::name("s_LOGISIM_NET_1")]),
                },
                PortMap {
                    formal: "MuxIn_1".to_string(),
                    actual: Actual::PerBit(vec![
                        Expr::index("s_LOGISIM_BUS_2", 1),
                        Expr::bit(Bit::Zero),
                    ]),
                },
                PortMap {
                    formal: "MuxOut".to_string(),
                    actual: Actual::Open,
                },
            ],
        });
        assert_eq!(
            render_stmt(&stmt, Dialect::Vhdl),
            "PLEXERS_1 : ENTITY work.Multiplexer_bus_2
   GENERIC MAP (
      NrOfBits => 4
   )
   PORT MAP (
      MuxIn_0 => s_LOGISIM_BUS_0,
      Sel(0) => s_LOGISIM_NET_1,
      MuxIn_1(0) => s_LOGISIM_BUS_2(1),
      MuxIn_1(1) => '0',
      MuxOut => OPEN
   );
"
        );
        assert_eq!(
            render_stmt(&stmt, Dialect::Verilog),
            "Multiplexer_bus_2 #(
   .NrOfBits(4)
) PLEXERS_1 (
   .MuxIn_0(s_LOGISIM_BUS_0),
   .Sel({s_LOGISIM_NET_1}),
   .MuxIn_1({1'b0, s_LOGISIM_BUS_2[1]}),
   .MuxOut()
);
"
        );
    }

    #[test]
    fn instance_without_ports_or_generics() {
        let stmt = Stmt::Instance(Instance {
            label: "Empty_1".to_string(),
            entity: "Empty".to_string(),
            generics: Vec::new(),
            ports: Vec::new(),
        });
        assert_eq!(render_stmt(&stmt, Dialect::Vhdl), "Empty_1 : ENTITY work.Empty;\n");
        assert_eq!(render_stmt(&stmt, Dialect::Verilog), "Empty Empty_1 (\n);\n");
    }

    #[test]
    fn empty_per_bit_map_is_internal_error() {
        let stmt = Stmt::Instance(Instance {
            label: "i".to_string(),
            entity: "E".to_string(),
            generics: Vec::new(),
            ports: vec![PortMap {
                formal: "p".to_string(),
                actual: Actual::PerBit(Vec::new()),
            }],
        });
        let mut w = CodeWriter::new(Vec::new(), "   ");
        match stmt.write(Dialect::Vhdl, &mut w) {
            Err(GenerationError::Internal(_)) => (),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    fn inverter() -> Entity {
        Entity {
            name: "Inverter".to_string(),
            generics: vec!["NrOfBits".to_string()],
            ports: vec![
                PortDecl {
                    name: "A".to_string(),
                    direction: Direction::Input,
                    width: Width::generic("NrOfBits"),
                },
                PortDecl {
                    name: "Q".to_string(),
                    direction: Direction::Output,
                    width: Width::generic("NrOfBits"),
                },
            ],
            signals: vec![SignalDecl::wire("s_inv", Width::generic("NrOfBits"))],
            statements: vec![
                Stmt::Assign {
                    target: Expr::name("s_inv"),
                    value: Expr::negate(Expr::name("A")),
                },
                Stmt::Assign {
                    target: Expr::name("Q"),
                    value: Expr::name("s_inv"),
                },
            ],
        }
    }

    #[test]
    fn vhdl_entity() {
        assert_eq!(
            render_entity(&inverter(), Dialect::Vhdl),
            "--============================================================================
--== Generated by hdlgen, do not edit
--== Component : Inverter
--============================================================================

LIBRARY ieee;
USE ieee.std_logic_1164.all;

ENTITY Inverter IS
   GENERIC (
      NrOfBits : INTEGER
   );
   PORT (
      A : IN std_logic_vector( NrOfBits-1 DOWNTO 0 );
      Q : OUT std_logic_vector( NrOfBits-1 DOWNTO 0 )
   );
END ENTITY Inverter;

ARCHITECTURE PlatformIndependent OF Inverter IS

   SIGNAL s_inv : std_logic_vector( NrOfBits-1 DOWNTO 0 );

BEGIN
   s_inv <= NOT(A);
   Q <= s_inv;

END PlatformIndependent;
"
        );
    }

    #[test]
    fn verilog_module() {
        assert_eq!(
            render_entity(&inverter(), Dialect::Verilog),
            "//============================================================================
//== Generated by hdlgen, do not edit
//== Component : Inverter
//============================================================================

module Inverter #(
   parameter NrOfBits = 1
) (
   input wire [NrOfBits-1:0] A,
   output wire [NrOfBits-1:0] Q
);

   wire [NrOfBits-1:0] s_inv;

   assign s_inv = ~(A);
   assign Q = s_inv;

endmodule
"
        );
    }

    #[test]
    fn register_update() {
        let stmt = Stmt::RegisterUpdate {
            target: "s_state".to_string(),
            width: Width::Fixed(1),
            clock: "Clock".to_string(),
            reset: "Reset".to_string(),
            tick: "Tick".to_string(),
            enable: "Enable".to_string(),
            next: Expr::name("D"),
        };
        assert_eq!(
            render_stmt(&stmt, Dialect::Vhdl),
            "make_s_state : PROCESS( Clock, Reset )
BEGIN
   IF (Reset = '1') THEN
      s_state <= '0';
   ELSIF (rising_edge(Clock)) THEN
      IF (Tick = '1' AND Enable = '1') THEN
         s_state <= D;
      END IF;
   END IF;
END PROCESS make_s_state;
"
        );
        assert_eq!(
            render_stmt(&stmt, Dialect::Verilog),
            "always @(posedge Clock or posedge Reset)
begin
   if (Reset == 1'b1)
      s_state <= 1'b0;
   else if ((Tick == 1'b1) & (Enable == 1'b1))
      s_state <= D;
end
"
        );
    }
}
