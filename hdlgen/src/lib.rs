//! Structural [VHDL](https://en.wikipedia.org/wiki/VHDL) and [Verilog](https://en.wikipedia.org/wiki/Verilog) generation from hierarchical schematic netlists.
//!
//! hdlgen takes a frozen snapshot of a schematic design ([`Circuit`]s made of wires and placed [`Component`]s, owned by a [`Context`]) and turns it into one HDL file per distinct definition, plus one file per circuit in the hierarchy.
//! Wires that touch become nets, unconnected boundary pins are collected onto flat "bubble" busses, clock sources become clock trees that are threaded through the hierarchy, and every component type is emitted by a binding that knows its ports and body.
//!
//! Malformed snapshots (foreign wires, out-of-range widths, duplicate circuit names) are programming errors of whoever builds the snapshot and panic, the way misuse of a builder API does.
//! Anything that can only be found out by analyzing the design (width mismatches, identifier collisions, unsupported components, recursion) is returned as a [`GenerationError`].
//!
//! # Usage
//!
//! ```toml
//! [dependencies]
//! hdlgen = "0.1"
//! ```
//!
//! # Examples
//!
//! ```rust,no_run
//! # fn main() -> Result<(), hdlgen::GenerationError> {
//! use hdlgen::*;
//!
//! // Create a context, which will contain our circuit(s)
//! let c = Context::new();
//!
//! // A 2:1 multiplexer with its select line and output on pins
//! let top = c.circuit("top");
//! let a = top.wire(4);
//! let b = top.wire(4);
//! let sel = top.wire(1);
//! let q = top.wire(4);
//! let _ = top.input_pin("a", 4).connect(0, a);
//! let _ = top.input_pin("b", 4).connect(0, b);
//! let _ = top.input_pin("sel", 1).connect(0, sel);
//! let _ = top.output_pin("q", 4).connect(0, q);
//! let _ = top
//!     .leaf(LeafType::Multiplexer, Attributes::new().with(attributes::WIDTH, 4u32))
//!     .connect(0, a)
//!     .connect(1, b)
//!     .connect(2, sel)
//!     .connect(3, q);
//!
//! // Generate VHDL into ./hdl_out
//! let summary = generate(top, &GenerationOptions::default(), &LogReporter)?;
//! for file in summary.files.iter() {
//!     println!("{}", file.display());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! [`Circuit`]: ./struct.Circuit.html
//! [`Component`]: ./struct.Component.html
//! [`Context`]: ./struct.Context.html
//! [`GenerationError`]: ./enum.GenerationError.html

// Must be kept up-to-date with version in Cargo.toml
#![doc(html_root_url = "https://docs.rs/hdlgen/0.1.0")]

pub mod binding;
mod code_writer;
mod error;
pub mod generator;
mod graph;
pub mod hdl;
pub mod loader;
pub mod netlist;
pub mod options;
pub mod report;
pub mod sanitize;

pub use error::*;
pub use generator::generate;
pub use graph::*;
pub use hdl::Dialect;
pub use options::{ClockMode, GenerationOptions};
pub use report::{CollectingReporter, GenerationSummary, LogReporter, Reporter, Severity};
