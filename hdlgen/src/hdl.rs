//! Dialect-agnostic HDL statements and declarations, and their textual rendering.

mod ir;
mod render;

pub use ir::*;

use serde::{Deserialize, Serialize};

use std::fmt;

/// The two target grammars.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    Vhdl,
    Verilog,
}

/// Tokens that differ between the dialects but are otherwise used the same way.
pub struct Syntax {
    pub open_bracket: &'static str,
    pub close_bracket: &'static str,
    pub range_separator: &'static str,
    pub assignment: &'static str,
    pub default_case_label: &'static str,
    pub comment_prefix: &'static str,
    pub not_operator: &'static str,
    pub and_operator: &'static str,
    pub or_operator: &'static str,
    pub xor_operator: &'static str,
    pub equals_operator: &'static str,
}

const VHDL_SYNTAX: Syntax = Syntax {
    open_bracket: "(",
    close_bracket: ")",
    range_separator: " DOWNTO ",
    assignment: " <= ",
    default_case_label: "WHEN OTHERS",
    comment_prefix: "--",
    not_operator: "NOT",
    and_operator: "AND",
    or_operator: "OR",
    xor_operator: "XOR",
    equals_operator: "=",
};

const VERILOG_SYNTAX: Syntax = Syntax {
    open_bracket: "[",
    close_bracket: "]",
    range_separator: ":",
    assignment: " = ",
    default_case_label: "default:",
    comment_prefix: "//",
    not_operator: "~",
    and_operator: "&",
    or_operator: "|",
    xor_operator: "^",
    equals_operator: "==",
};

impl Dialect {
    pub const ALL: [Dialect; 2] = [Dialect::Vhdl, Dialect::Verilog];

    pub fn syntax(self) -> &'static Syntax {
        match self {
            Dialect::Vhdl => &VHDL_SYNTAX,
            Dialect::Verilog => &VERILOG_SYNTAX,
        }
    }

    pub fn file_extension(self) -> &'static str {
        match self {
            Dialect::Vhdl => "vhd",
            Dialect::Verilog => "v",
        }
    }

    /// Short lowercase name, used for per-dialect output directories.
    pub fn short_name(self) -> &'static str {
        match self {
            Dialect::Vhdl => "vhdl",
            Dialect::Verilog => "verilog",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Dialect::Vhdl => "VHDL",
            Dialect::Verilog => "Verilog",
        })
    }
}
