use crate::error::{GenerationError, Result};

use std::io;

pub struct CodeWriter<W: io::Write> {
    w: W,
    indent_level: u32,
    indent: &'static str,
}

impl<W: io::Write> CodeWriter<W> {
    pub fn new(w: W, indent: &'static str) -> CodeWriter<W> {
        CodeWriter {
            w,
            indent_level: 0,
            indent,
        }
    }

    pub fn indent(&mut self) {
        self.indent_level += 1;
    }

    pub fn unindent(&mut self) -> Result<()> {
        if self.indent_level == 0 {
            return Err(GenerationError::internal("code writer indent level underflow"));
        }
        self.indent_level -= 1;
        Ok(())
    }

    pub fn append_indent(&mut self) -> Result<()> {
        for _ in 0..self.indent_level {
            write!(self.w, "{}", self.indent)?;
        }
        Ok(())
    }

    pub fn append_newline(&mut self) -> Result<()> {
        writeln!(self.w)?;
        Ok(())
    }

    pub fn append(&mut self, s: &str) -> Result<()> {
        write!(self.w, "{}", s)?;
        Ok(())
    }

    pub fn append_line(&mut self, s: &str) -> Result<()> {
        self.append_indent()?;
        self.append(s)?;
        self.append_newline()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.w
    }
}
