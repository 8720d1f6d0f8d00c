use hdlgen::*;

use std::env;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::result::Result;

fn main() -> Result<(), GenerationError> {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    for dialect in Dialect::ALL {
        let c = Context::new();
        generate_into(
            counter_bank(&c),
            &out_dir.join("counter_bank").join(dialect.short_name()),
            dialect,
            ClockMode::Derived,
        )?;

        let c = Context::new();
        generate_into(
            selector(&c),
            &out_dir.join("selector").join(dialect.short_name()),
            dialect,
            ClockMode::Derived,
        )?;
    }

    let c = Context::new();
    generate_into(
        counter_bank(&c),
        &out_dir.join("counter_bank_global_tick"),
        Dialect::Verilog,
        ClockMode::GlobalTick,
    )?;

    println!("cargo:rerun-if-changed=build.rs");

    Ok(())
}

/// Generates `top` into `dir`, next to a `files.txt` and `warnings.txt` listing what the run
/// produced.
fn generate_into<'a>(
    top: &'a Circuit<'a>,
    dir: &Path,
    dialect: Dialect,
    clock_mode: ClockMode,
) -> Result<(), GenerationError> {
    if dir.exists() {
        fs::remove_dir_all(dir)?;
    }

    let reporter = CollectingReporter::new();
    let options = GenerationOptions {
        dialect,
        output_dir: dir.to_path_buf(),
        clock_mode,
    };
    let summary = generate(top, &options, &reporter)?;

    let mut files = String::new();
    for file in summary.files.iter() {
        let relative = file.strip_prefix(dir).unwrap_or(file);
        writeln!(files, "{}", relative.to_string_lossy().replace('\\', "/")).unwrap();
    }
    fs::write(dir.join("files.txt"), files)?;

    let mut warnings = String::new();
    for message in reporter.messages(Severity::Warning) {
        writeln!(warnings, "{}", message).unwrap();
    }
    fs::write(dir.join("warnings.txt"), warnings)?;

    Ok(())
}

/// A one-bit toggle flip-flop running on its own clock source.
fn toggle<'a>(c: &'a Context<'a>) -> &'a Circuit<'a> {
    let m = c.circuit("toggle");

    let q = m.wire(1);
    let nq = m.wire(1);
    let clk = m.wire(1);
    let _ = m.output_pin("q", 1).connect(0, q);
    let _ = m.clock(Attributes::new()).connect(0, clk);
    let _ = m
        .leaf(LeafType::Register, Attributes::new())
        .connect(register_ends::Q, q)
        .connect(register_ends::D, nq)
        .connect(register_ends::CLOCK, clk);
    let _ = m
        .leaf(LeafType::Not, Attributes::new())
        .connect(0, nq)
        .connect(1, q);

    m
}

/// Two toggles side by side, plus an output pin nothing drives.
fn counter_bank<'a>(c: &'a Context<'a>) -> &'a Circuit<'a> {
    let inner = toggle(c);
    let m = c.circuit("counter_bank");

    for i in 0..2 {
        let q = m.wire(1);
        let _ = m.output_pin(format!("q{}", i), 1).connect(0, q);
        let _ = m.instance(inner).connect(0, q);
    }
    let _ = m.output_pin("unused", 1);

    m
}

/// A byte-wide 4:1 multiplexer next to a 2-to-4 decoder sharing its select line.
fn selector<'a>(c: &'a Context<'a>) -> &'a Circuit<'a> {
    let m = c.circuit("selector");

    let sel = m.wire(2);
    let _ = m.input_pin("sel", 2).connect(0, sel);

    let mux = m.leaf(
        LeafType::Multiplexer,
        Attributes::new()
            .with(attributes::SELECT, 2u32)
            .with(attributes::WIDTH, 8u32),
    );
    for i in 0..4 {
        let data = m.wire(8);
        let _ = m.input_pin(format!("data{}", i), 8).connect(0, data);
        let _ = mux.connect(i, data);
    }
    let y = m.wire(8);
    let _ = mux.connect(4, sel).connect(5, y);
    let _ = m.output_pin("y", 8).connect(0, y);

    let decoder = m.leaf(
        LeafType::Decoder,
        Attributes::new().with(attributes::SELECT, 2u32),
    );
    for i in 0..4 {
        let line = m.wire(1);
        let _ = decoder.connect(i, line);
        let _ = m.output_pin(format!("line{}", i), 1).connect(0, line);
    }
    let _ = decoder.connect(4, sel);

    m
}
