use crate::binding::BindingTable;
use crate::error::{GenerationError, Result};
use crate::hdl::Dialect;
use crate::netlist::Design;
use crate::options::{ClockMode, GenerationOptions};
use crate::report::GenerationSummary;

use std::collections::HashMap;
use std::path::PathBuf;

/// Mutable state of one generation run for one dialect.
///
/// Tracks which definitions were already emitted, where in the instance hierarchy emission
/// currently is, the warnings collected so far and the files written.
pub struct GenerationContext<'d, 'a> {
    design: &'d Design<'a>,
    bindings: &'d BindingTable<'a>,
    options: &'d GenerationOptions,
    // Lowercased type key -> (type key, origin)
    handled_types: HashMap<String, (String, String)>,
    hierarchy: Vec<String>,
    instance_counters: HashMap<String, usize>,
    warnings: Vec<String>,
    files: Vec<PathBuf>,
}

impl<'d, 'a> GenerationContext<'d, 'a> {
    pub fn new(
        design: &'d Design<'a>,
        bindings: &'d BindingTable<'a>,
        options: &'d GenerationOptions,
    ) -> GenerationContext<'d, 'a> {
        GenerationContext {
            design,
            bindings,
            options,
            handled_types: HashMap::new(),
            hierarchy: Vec::new(),
            instance_counters: HashMap::new(),
            warnings: Vec::new(),
            files: Vec::new(),
        }
    }

    pub fn design(&self) -> &'d Design<'a> {
        self.design
    }

    pub fn bindings(&self) -> &'d BindingTable<'a> {
        self.bindings
    }

    pub fn options(&self) -> &'d GenerationOptions {
        self.options
    }

    pub fn dialect(&self) -> Dialect {
        self.options.dialect
    }

    pub fn clock_mode(&self) -> ClockMode {
        self.options.clock_mode
    }

    /// Records that the definition `key` is being emitted. Returns `false` if it already was.
    ///
    /// Keys are compared case-insensitively since VHDL identifiers are; two different origins
    /// claiming the same key are an [`IdentifierCollision`](GenerationError::IdentifierCollision).
    pub fn mark_handled(&mut self, key: &str, origin: &str) -> Result<bool> {
        let lower = key.to_ascii_lowercase();
        if let Some((first_key, first_origin)) = self.handled_types.get(&lower) {
            if first_origin == origin && first_key == key {
                return Ok(false);
            }
            return Err(GenerationError::IdentifierCollision {
                identifier: key.to_string(),
                scope: format!("{} library", self.dialect()),
                first: first_origin.clone(),
                second: origin.to_string(),
            });
        }
        self.handled_types
            .insert(lower, (key.to_string(), origin.to_string()));
        Ok(true)
    }

    pub fn is_handled(&self, key: &str) -> bool {
        self.handled_types.contains_key(&key.to_ascii_lowercase())
    }

    /// Runs `f` one hierarchy level below the current one, labelled `label`.
    ///
    /// The level is popped again whether or not `f` fails.
    pub fn with_level<T>(
        &mut self,
        label: impl Into<String>,
        f: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        self.push_level(label);
        let result = f(self);
        self.pop_level()?;
        result
    }

    fn push_level(&mut self, label: impl Into<String>) {
        self.hierarchy.push(label.into());
    }

    fn pop_level(&mut self) -> Result<()> {
        match self.hierarchy.pop() {
            Some(_) => Ok(()),
            None => Err(GenerationError::internal(
                "Popped a hierarchy level that was never pushed.",
            )),
        }
    }

    pub fn hierarchy_path(&self) -> String {
        self.hierarchy.join("/")
    }

    pub fn reset_instance_counters(&mut self) {
        self.instance_counters.clear();
    }

    /// A fresh `<identifier>_<n>` label, numbered from 1 per identifier.
    pub fn next_instance_label(&mut self, identifier: &str) -> String {
        let counter = self
            .instance_counters
            .entry(identifier.to_string())
            .or_insert(0);
        *counter += 1;
        format!("{}_{}", identifier, counter)
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        if self.hierarchy.is_empty() {
            self.warnings.push(message);
        } else {
            self.warnings
                .push(format!("{}: {}", self.hierarchy_path(), message));
        }
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn record_file(&mut self, path: PathBuf) {
        self.files.push(path);
    }

    pub fn finish(self) -> GenerationSummary {
        GenerationSummary {
            dialect: self.options.dialect,
            output_dir: self.options.output_dir.clone(),
            files: self.files,
            warnings: self.warnings,
        }
    }
}
