use super::*;

use crate::graph::DisabledPolicy;

const PLEXERS: &str = "PLEXERS";
const PLEXERS_DIR: &str = "plexers";
const NR_OF_BITS: &str = "NrOfBits";

/// Shape shared by the whole plexer family.
struct Plexer {
    select: u32,
    width: u32,
    enable: bool,
    disabled: Bit,
}

impl Plexer {
    fn of(attrs: &Attributes) -> Plexer {
        Plexer {
            select: attrs.select_bits(),
            width: attrs.width(),
            enable: attrs.has_enable(),
            disabled: match attrs.disabled_policy() {
                DisabledPolicy::Zero => Bit::Zero,
                DisabledPolicy::Floating => Bit::HighZ,
            },
        }
    }

    fn count(&self) -> usize {
        1 << self.select
    }

    /// End index of the enable input, which follows the select input when present.
    fn enable_port(&self, enable_end: usize) -> Port {
        let connection = if self.enable {
            PortConnection::End(enable_end)
        } else {
            PortConnection::Fixed(Expr::bit(Bit::One))
        };
        Port::new("Enable", 1, connection).tie(Bit::One)
    }

    /// What unselected outputs carry: high impedance when the component is tristate.
    fn unselected(attrs: &Attributes) -> Bit {
        if attrs.is_tristate() {
            Bit::HighZ
        } else {
            Bit::Zero
        }
    }

    fn tristate_suffix(attrs: &Attributes) -> &'static str {
        if attrs.is_tristate() {
            "_tristate"
        } else {
            ""
        }
    }

    fn floating_suffix(&self) -> &'static str {
        match self.disabled {
            Bit::HighZ => "_floating",
            _ => "",
        }
    }

    fn width_parameters(&self) -> Vec<(String, u64)> {
        if self.width > 1 {
            vec![(NR_OF_BITS.to_string(), self.width as u64)]
        } else {
            Vec::new()
        }
    }

    fn data_width(&self) -> Width {
        Width::fixed_or_generic(self.width, NR_OF_BITS)
    }

    fn selects(&self, index: usize) -> Expr {
        Expr::equals(
            Expr::name("Sel"),
            Expr::Const {
                value: index as u64,
                width: self.select,
            },
        )
    }
}

/// `Multiplexer[_bus]_<N>`: routes one of `N` data inputs to its output.
pub struct MultiplexerBinding;

impl MultiplexerBinding {
    fn build_body(attrs: &Attributes) -> Body {
        let plexer = Plexer::of(attrs);
        let count = plexer.count();
        let last = count - 1;
        Body {
            signals: vec![SignalDecl::reg("s_selected_vector", plexer.data_width())],
            statements: vec![
                Stmt::Select {
                    target: "s_selected_vector".to_string(),
                    selector: "Sel".to_string(),
                    selector_width: plexer.select,
                    arms: (0..last)
                        .map(|i| (i as u64, Expr::name(format!("MuxIn_{}", i))))
                        .collect(),
                    otherwise: Expr::name(format!("MuxIn_{}", last)),
                },
                Stmt::ConditionalAssign {
                    target: Expr::name("MuxOut"),
                    arms: vec![(
                        is_low("Enable"),
                        Expr::Filled {
                            bit: plexer.disabled,
                            width: plexer.data_width(),
                        },
                    )],
                    otherwise: Expr::name("s_selected_vector"),
                },
            ],
        }
    }
}

impl<'a> ComponentBinding<'a> for MultiplexerBinding {
    fn type_key(&self, attrs: &Attributes) -> String {
        let plexer = Plexer::of(attrs);
        format!(
            "Multiplexer{}_{}{}",
            if plexer.width > 1 { "_bus" } else { "" },
            plexer.count(),
            plexer.floating_suffix()
        )
    }

    fn origin(&self) -> String {
        "Multiplexer".to_string()
    }

    fn identifier(&self) -> &str {
        PLEXERS
    }

    fn sub_dir(&self) -> &'static str {
        PLEXERS_DIR
    }

    fn input_ports(&self, attrs: &Attributes) -> Vec<Port> {
        let plexer = Plexer::of(attrs);
        let count = plexer.count();
        let mut ports = (0..count)
            .map(|i| {
                Port::new(format!("MuxIn_{}", i), plexer.width, PortConnection::End(i))
                    .sized_by(NR_OF_BITS)
            })
            .collect::<Vec<_>>();
        ports.push(Port::new("Sel", plexer.select, PortConnection::End(count)));
        ports.push(plexer.enable_port(count + 1));
        ports
    }

    fn output_ports(&self, attrs: &Attributes) -> Vec<Port> {
        let plexer = Plexer::of(attrs);
        let out = plexer.count() + 1 + plexer.enable as usize;
        vec![Port::new("MuxOut", plexer.width, PortConnection::End(out)).sized_by(NR_OF_BITS)]
    }

    fn parameters(&self, attrs: &Attributes) -> Vec<(String, u64)> {
        Plexer::of(attrs).width_parameters()
    }

    fn body(&self, attrs: &Attributes, _ctx: &mut GenerationContext<'_, 'a>) -> Result<Body> {
        Ok(MultiplexerBinding::build_body(attrs))
    }
}

/// `Demultiplexer[_bus]_<N>`: routes its data input to one of `N` outputs.
///
/// Unselected outputs are driven low, or float when the demultiplexer is tristate.
pub struct DemultiplexerBinding;

impl DemultiplexerBinding {
    fn build_body(attrs: &Attributes) -> Body {
        let plexer = Plexer::of(attrs);
        let unselected = Plexer::unselected(attrs);
        let statements = (0..plexer.count())
            .map(|i| Stmt::ConditionalAssign {
                target: Expr::name(format!("DemuxOut_{}", i)),
                arms: vec![
                    (
                        is_low("Enable"),
                        Expr::Filled {
                            bit: plexer.disabled,
                            width: plexer.data_width(),
                        },
                    ),
                    (plexer.selects(i), Expr::name("DemuxIn")),
                ],
                otherwise: Expr::Filled {
                    bit: unselected,
                    width: plexer.data_width(),
                },
            })
            .collect();
        Body {
            signals: Vec::new(),
            statements,
        }
    }
}

impl<'a> ComponentBinding<'a> for DemultiplexerBinding {
    fn type_key(&self, attrs: &Attributes) -> String {
        let plexer = Plexer::of(attrs);
        format!(
            "Demultiplexer{}_{}{}{}",
            if plexer.width > 1 { "_bus" } else { "" },
            plexer.count(),
            Plexer::tristate_suffix(attrs),
            plexer.floating_suffix()
        )
    }

    fn origin(&self) -> String {
        "Demultiplexer".to_string()
    }

    fn identifier(&self) -> &str {
        PLEXERS
    }

    fn sub_dir(&self) -> &'static str {
        PLEXERS_DIR
    }

    fn input_ports(&self, attrs: &Attributes) -> Vec<Port> {
        let plexer = Plexer::of(attrs);
        let count = plexer.count();
        let data = count + 1 + plexer.enable as usize;
        vec![
            Port::new("DemuxIn", plexer.width, PortConnection::End(data)).sized_by(NR_OF_BITS),
            Port::new("Sel", plexer.select, PortConnection::End(count)),
            plexer.enable_port(count + 1),
        ]
    }

    fn output_ports(&self, attrs: &Attributes) -> Vec<Port> {
        let plexer = Plexer::of(attrs);
        (0..plexer.count())
            .map(|i| {
                Port::new(format!("DemuxOut_{}", i), plexer.width, PortConnection::End(i))
                    .sized_by(NR_OF_BITS)
            })
            .collect()
    }

    fn parameters(&self, attrs: &Attributes) -> Vec<(String, u64)> {
        Plexer::of(attrs).width_parameters()
    }

    fn body(&self, attrs: &Attributes, _ctx: &mut GenerationContext<'_, 'a>) -> Result<Body> {
        Ok(DemultiplexerBinding::build_body(attrs))
    }
}

/// `Decoder_<N>`: drives the output selected by `Sel` high.
///
/// A tristate decoder floats its unselected outputs instead of driving them low.
pub struct DecoderBinding;

impl DecoderBinding {
    fn build_body(attrs: &Attributes) -> Body {
        let plexer = Plexer::of(attrs);
        let unselected = Plexer::unselected(attrs);
        let statements = (0..plexer.count())
            .map(|i| Stmt::ConditionalAssign {
                target: Expr::name(format!("DecoderOut_{}", i)),
                arms: vec![
                    (is_low("Enable"), Expr::bit(plexer.disabled)),
                    (plexer.selects(i), Expr::bit(Bit::One)),
                ],
                otherwise: Expr::bit(unselected),
            })
            .collect();
        Body {
            signals: Vec::new(),
            statements,
        }
    }
}

impl<'a> ComponentBinding<'a> for DecoderBinding {
    fn type_key(&self, attrs: &Attributes) -> String {
        let plexer = Plexer::of(attrs);
        format!(
            "Decoder_{}{}{}",
            plexer.count(),
            Plexer::tristate_suffix(attrs),
            plexer.floating_suffix()
        )
    }

    fn origin(&self) -> String {
        "Decoder".to_string()
    }

    fn identifier(&self) -> &str {
        PLEXERS
    }

    fn sub_dir(&self) -> &'static str {
        PLEXERS_DIR
    }

    fn input_ports(&self, attrs: &Attributes) -> Vec<Port> {
        let plexer = Plexer::of(attrs);
        let count = plexer.count();
        vec![
            Port::new("Sel", plexer.select, PortConnection::End(count)),
            plexer.enable_port(count + 1),
        ]
    }

    fn output_ports(&self, attrs: &Attributes) -> Vec<Port> {
        (0..Plexer::of(attrs).count())
            .map(|i| Port::new(format!("DecoderOut_{}", i), 1, PortConnection::End(i)))
            .collect()
    }

    fn body(&self, attrs: &Attributes, _ctx: &mut GenerationContext<'_, 'a>) -> Result<Body> {
        Ok(DecoderBinding::build_body(attrs))
    }
}

/// `Priority_Encoder_<N>`: the index of the highest active input.
pub struct PriorityEncoderBinding;

impl PriorityEncoderBinding {
    fn build_body(attrs: &Attributes) -> Body {
        let plexer = Plexer::of(attrs);
        let count = plexer.count();
        let address = |value: usize| Expr::Const {
            value: value as u64,
            width: plexer.select,
        };
        let any_low = Expr::equals(Expr::name("s_any"), Expr::bit(Bit::Zero));
        Body {
            signals: vec![
                SignalDecl::wire("s_address", Width::Fixed(plexer.select)),
                SignalDecl::wire("s_any", Width::Fixed(1)),
            ],
            statements: vec![
                Stmt::ConditionalAssign {
                    target: Expr::name("s_address"),
                    arms: (1..count)
                        .rev()
                        .map(|i| {
                            (
                                Expr::equals(
                                    Expr::index("input_vector", i as u32),
                                    Expr::bit(Bit::One),
                                ),
                                address(i),
                            )
                        })
                        .collect(),
                    otherwise: address(0),
                },
                Stmt::ConditionalAssign {
                    target: Expr::name("s_any"),
                    arms: vec![(
                        Expr::equals(
                            Expr::name("input_vector"),
                            Expr::filled(Bit::Zero, count as u32),
                        ),
                        Expr::bit(Bit::Zero),
                    )],
                    otherwise: Expr::bit(Bit::One),
                },
                Stmt::ConditionalAssign {
                    target: Expr::name("Address"),
                    arms: vec![
                        (
                            is_low("Enable"),
                            Expr::filled(plexer.disabled, plexer.select),
                        ),
                        (any_low.clone(), Expr::filled(plexer.disabled, plexer.select)),
                    ],
                    otherwise: Expr::name("s_address"),
                },
                Stmt::ConditionalAssign {
                    target: Expr::name("EnableOut"),
                    arms: vec![(
                        Expr::and(vec![Expr::is_high("Enable"), any_low]),
                        Expr::bit(Bit::One),
                    )],
                    otherwise: Expr::bit(Bit::Zero),
                },
                Stmt::ConditionalAssign {
                    target: Expr::name("GroupSelect"),
                    arms: vec![(
                        Expr::and(vec![Expr::is_high("Enable"), Expr::is_high("s_any")]),
                        Expr::bit(Bit::One),
                    )],
                    otherwise: Expr::bit(Bit::Zero),
                },
            ],
        }
    }
}

impl<'a> ComponentBinding<'a> for PriorityEncoderBinding {
    fn type_key(&self, attrs: &Attributes) -> String {
        let plexer = Plexer::of(attrs);
        format!(
            "Priority_Encoder_{}{}",
            plexer.count(),
            plexer.floating_suffix()
        )
    }

    fn origin(&self) -> String {
        "Priority Encoder".to_string()
    }

    fn identifier(&self) -> &str {
        PLEXERS
    }

    fn sub_dir(&self) -> &'static str {
        PLEXERS_DIR
    }

    fn input_ports(&self, attrs: &Attributes) -> Vec<Port> {
        let plexer = Plexer::of(attrs);
        let count = plexer.count();
        vec![
            Port::new(
                "input_vector",
                count as u32,
                PortConnection::Ends((0..count).collect()),
            ),
            Port::new("Enable", 1, PortConnection::End(count + 1)).tie(Bit::One),
        ]
    }

    fn output_ports(&self, attrs: &Attributes) -> Vec<Port> {
        let plexer = Plexer::of(attrs);
        let count = plexer.count();
        vec![
            Port::new("Address", plexer.select, PortConnection::End(count)),
            Port::new("EnableOut", 1, PortConnection::End(count + 2)),
            Port::new("GroupSelect", 1, PortConnection::End(count + 3)),
        ]
    }

    fn body(&self, attrs: &Attributes, _ctx: &mut GenerationContext<'_, 'a>) -> Result<Body> {
        Ok(PriorityEncoderBinding::build_body(attrs))
    }
}
