use super::attributes::{self, Attributes};
use super::component::{Direction, EndSpec};

pub const MIN_BIT_WIDTH: u32 = 1;
pub const MAX_BIT_WIDTH: u32 = 64;
pub const MAX_SELECT_BITS: u32 = 5;
pub const MIN_GATE_INPUTS: u32 = 2;
pub const MAX_GATE_INPUTS: u32 = 32;

/// Built-in component types with a fixed end layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LeafType {
    Multiplexer,
    Demultiplexer,
    Decoder,
    PriorityEncoder,
    And,
    Or,
    Xor,
    Nand,
    Nor,
    Xnor,
    Not,
    Constant,
    Register,
}

impl LeafType {
    pub const ALL: [LeafType; 13] = [
        LeafType::Multiplexer,
        LeafType::Demultiplexer,
        LeafType::Decoder,
        LeafType::PriorityEncoder,
        LeafType::And,
        LeafType::Or,
        LeafType::Xor,
        LeafType::Nand,
        LeafType::Nor,
        LeafType::Xnor,
        LeafType::Not,
        LeafType::Constant,
        LeafType::Register,
    ];

    pub fn name(self) -> &'static str {
        match self {
            LeafType::Multiplexer => "Multiplexer",
            LeafType::Demultiplexer => "Demultiplexer",
            LeafType::Decoder => "Decoder",
            LeafType::PriorityEncoder => "Priority Encoder",
            LeafType::And => "AND Gate",
            LeafType::Or => "OR Gate",
            LeafType::Xor => "XOR Gate",
            LeafType::Nand => "NAND Gate",
            LeafType::Nor => "NOR Gate",
            LeafType::Xnor => "XNOR Gate",
            LeafType::Not => "NOT Gate",
            LeafType::Constant => "Constant",
            LeafType::Register => "Register",
        }
    }

    /// The snake_case spelling used by snapshot files.
    pub fn key(self) -> &'static str {
        match self {
            LeafType::Multiplexer => "multiplexer",
            LeafType::Demultiplexer => "demultiplexer",
            LeafType::Decoder => "decoder",
            LeafType::PriorityEncoder => "priority_encoder",
            LeafType::And => "and",
            LeafType::Or => "or",
            LeafType::Xor => "xor",
            LeafType::Nand => "nand",
            LeafType::Nor => "nor",
            LeafType::Xnor => "xnor",
            LeafType::Not => "not",
            LeafType::Constant => "constant",
            LeafType::Register => "register",
        }
    }

    pub fn from_key(key: &str) -> Option<LeafType> {
        LeafType::ALL.iter().copied().find(|leaf| leaf.key() == key)
    }

    pub fn is_plexer(self) -> bool {
        matches!(
            self,
            LeafType::Multiplexer
                | LeafType::Demultiplexer
                | LeafType::Decoder
                | LeafType::PriorityEncoder
        )
    }

    pub fn is_gate(self) -> bool {
        matches!(
            self,
            LeafType::And
                | LeafType::Or
                | LeafType::Xor
                | LeafType::Nand
                | LeafType::Nor
                | LeafType::Xnor
        )
    }

    /// Checks that `attrs` describe a shape this type can have.
    pub fn check_attributes(self, attrs: &Attributes) -> Result<(), String> {
        let width = attrs.int(attributes::WIDTH, 1);
        let check_width = || {
            if width < MIN_BIT_WIDTH as u64 || width > MAX_BIT_WIDTH as u64 {
                Err(format!(
                    "{} width must be between {} and {} bit(s), not {}",
                    self.name(),
                    MIN_BIT_WIDTH,
                    MAX_BIT_WIDTH,
                    width
                ))
            } else {
                Ok(())
            }
        };

        if self.is_plexer() {
            let select = attrs.int(attributes::SELECT, 1);
            if select < 1 || select > MAX_SELECT_BITS as u64 {
                return Err(format!(
                    "{} select width must be between 1 and {} bit(s), not {}",
                    self.name(),
                    MAX_SELECT_BITS,
                    select
                ));
            }
            if let Some(disabled) = attrs.get(attributes::DISABLED) {
                if !matches!(attrs.text(attributes::DISABLED), Some("zero") | Some("floating")) {
                    return Err(format!(
                        "{} disabled output must be \"zero\" or \"floating\", not {}",
                        self.name(),
                        disabled
                    ));
                }
            }
        }

        match self {
            LeafType::Multiplexer | LeafType::Demultiplexer | LeafType::Register | LeafType::Not => {
                check_width()
            }
            LeafType::Decoder | LeafType::PriorityEncoder => Ok(()),
            LeafType::And
            | LeafType::Or
            | LeafType::Xor
            | LeafType::Nand
            | LeafType::Nor
            | LeafType::Xnor => {
                check_width()?;
                let inputs = attrs.int(attributes::INPUTS, 2);
                if inputs < MIN_GATE_INPUTS as u64 || inputs > MAX_GATE_INPUTS as u64 {
                    return Err(format!(
                        "{} must have between {} and {} inputs, not {}",
                        self.name(),
                        MIN_GATE_INPUTS,
                        MAX_GATE_INPUTS,
                        inputs
                    ));
                }
                Ok(())
            }
            LeafType::Constant => {
                check_width()?;
                let value = attrs.int(attributes::VALUE, 0);
                if width < 64 && value >> width != 0 {
                    return Err(format!(
                        "Constant value {} doesn't fit into {} bit(s)",
                        value, width
                    ));
                }
                Ok(())
            }
        }
    }

    /// The ends of a component of this type, in end-index order.
    ///
    /// `attrs` must have passed [`check_attributes`](LeafType::check_attributes).
    pub fn ends(self, attrs: &Attributes) -> Vec<EndSpec> {
        let width = attrs.width();
        let select = attrs.select_bits();
        let count = 1usize << select;
        let mut ends = Vec::new();
        match self {
            LeafType::Multiplexer => {
                ends.extend((0..count).map(|_| EndSpec::input(width)));
                ends.push(EndSpec::input(select));
                if attrs.has_enable() {
                    ends.push(EndSpec::input(1));
                }
                ends.push(EndSpec::output(width));
            }
            LeafType::Demultiplexer => {
                ends.extend((0..count).map(|_| EndSpec::output(width)));
                ends.push(EndSpec::input(select));
                if attrs.has_enable() {
                    ends.push(EndSpec::input(1));
                }
                ends.push(EndSpec::input(width));
            }
            LeafType::Decoder => {
                ends.extend((0..count).map(|_| EndSpec::output(1)));
                ends.push(EndSpec::input(select));
                if attrs.has_enable() {
                    ends.push(EndSpec::input(1));
                }
            }
            LeafType::PriorityEncoder => {
                ends.extend((0..count).map(|_| EndSpec::input(1)));
                ends.push(EndSpec::output(select));
                ends.push(EndSpec::input(1));
                ends.push(EndSpec::output(1));
                ends.push(EndSpec::output(1));
            }
            LeafType::And
            | LeafType::Or
            | LeafType::Xor
            | LeafType::Nand
            | LeafType::Nor
            | LeafType::Xnor => {
                let inputs = attrs.int(attributes::INPUTS, 2) as usize;
                ends.push(EndSpec::output(width));
                ends.extend((0..inputs).map(|_| EndSpec::input(width)));
            }
            LeafType::Not => {
                ends.push(EndSpec::output(width));
                ends.push(EndSpec::input(width));
            }
            LeafType::Constant => ends.push(EndSpec::output(width)),
            LeafType::Register => {
                ends.push(EndSpec::output(width));
                ends.push(EndSpec::input(width));
                ends.push(EndSpec::input(1));
                ends.push(EndSpec::input(1));
                ends.push(EndSpec::input(1));
            }
        }
        ends
    }
}

/// End indices of a register.
pub mod register_ends {
    pub const Q: usize = 0;
    pub const D: usize = 1;
    pub const CLOCK: usize = 2;
    pub const RESET: usize = 3;
    pub const ENABLE: usize = 4;
}

impl EndSpec {
    pub fn input(width: u32) -> EndSpec {
        EndSpec {
            direction: Direction::Input,
            width,
        }
    }

    pub fn output(width: u32) -> EndSpec {
        EndSpec {
            direction: Direction::Output,
            width,
        }
    }
}
