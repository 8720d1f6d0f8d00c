use crate::graph::Direction;

/// Bit width of a declared port or signal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Width {
    Fixed(u32),
    /// Sized by a generic/parameter of the enclosing entity.
    Generic(String),
}

impl Width {
    pub fn generic(name: &str) -> Width {
        Width::Generic(name.to_string())
    }

    pub fn fixed_or_generic(width: u32, generic: &str) -> Width {
        if width > 1 {
            Width::generic(generic)
        } else {
            Width::Fixed(1)
        }
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, Width::Fixed(1))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bit {
    Zero,
    One,
    HighZ,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinOp {
    And,
    Or,
    Xor,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Expr {
    Ref(String),
    Index {
        name: String,
        index: u32,
    },
    Slice {
        name: String,
        high: u32,
        low: u32,
    },
    Const {
        value: u64,
        width: u32,
    },
    /// Every bit set to `bit`.
    Filled {
        bit: Bit,
        width: Width,
    },
    /// Most significant part first.
    Concat(Vec<Expr>),
    Not(Box<Expr>),
    BinOp {
        op: BinOp,
        operands: Vec<Expr>,
    },
    Eq {
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
}

impl Expr {
    pub fn name(name: impl Into<String>) -> Expr {
        Expr::Ref(name.into())
    }

    pub fn bit(bit: Bit) -> Expr {
        Expr::Filled {
            bit,
            width: Width::Fixed(1),
        }
    }

    pub fn filled(bit: Bit, width: u32) -> Expr {
        Expr::Filled {
            bit,
            width: Width::Fixed(width),
        }
    }

    pub fn index(name: impl Into<String>, index: u32) -> Expr {
        Expr::Index {
            name: name.into(),
            index,
        }
    }

    /// `name(high downto low)`, collapsing to an index when the range is a single bit.
    pub fn slice(name: impl Into<String>, high: u32, low: u32) -> Expr {
        if high == low {
            Expr::index(name, low)
        } else {
            Expr::Slice {
                name: name.into(),
                high,
                low,
            }
        }
    }

    pub fn equals(lhs: Expr, rhs: Expr) -> Expr {
        Expr::Eq {
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn and(operands: Vec<Expr>) -> Expr {
        Expr::BinOp {
            op: BinOp::And,
            operands,
        }
    }

    pub fn negate(source: Expr) -> Expr {
        Expr::Not(Box::new(source))
    }

    /// `name == '1'`
    pub fn is_high(name: impl Into<String>) -> Expr {
        Expr::equals(Expr::name(name), Expr::bit(Bit::One))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SignalKind {
    Wire,
    /// Assigned from a procedural block; only matters for Verilog.
    Reg,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignalDecl {
    pub name: String,
    pub width: Width,
    pub kind: SignalKind,
}

impl SignalDecl {
    pub fn wire(name: impl Into<String>, width: Width) -> SignalDecl {
        SignalDecl {
            name: name.into(),
            width,
            kind: SignalKind::Wire,
        }
    }

    pub fn reg(name: impl Into<String>, width: Width) -> SignalDecl {
        SignalDecl {
            name: name.into(),
            width,
            kind: SignalKind::Reg,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PortDecl {
    pub name: String,
    pub direction: Direction,
    pub width: Width,
}

/// The value bound to one formal port of an instance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Actual {
    Expr(Expr),
    /// One expression per formal bit, least significant first.
    PerBit(Vec<Expr>),
    Open,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PortMap {
    pub formal: String,
    pub actual: Actual,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Instance {
    pub label: String,
    pub entity: String,
    pub generics: Vec<(String, u64)>,
    pub ports: Vec<PortMap>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Stmt {
    Remark(Vec<String>),
    Blank,
    Assign {
        target: Expr,
        value: Expr,
    },
    /// Prioritized `value WHEN cond ELSE ...` chain.
    ConditionalAssign {
        target: Expr,
        arms: Vec<(Expr, Expr)>,
        otherwise: Expr,
    },
    /// Selection on a constant-compared selector; the last value is the default arm.
    Select {
        target: String,
        selector: String,
        selector_width: u32,
        arms: Vec<(u64, Expr)>,
        otherwise: Expr,
    },
    /// Asynchronously reset, tick-and-enable qualified rising edge register.
    RegisterUpdate {
        target: String,
        width: Width,
        clock: String,
        reset: String,
        tick: String,
        enable: String,
        next: Expr,
    },
    Instance(Instance),
    /// Hand-authored text, written verbatim line by line.
    Raw(String),
}

/// A complete design unit: header plus architecture.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entity {
    pub name: String,
    pub generics: Vec<String>,
    pub ports: Vec<PortDecl>,
    pub signals: Vec<SignalDecl>,
    pub statements: Vec<Stmt>,
}
