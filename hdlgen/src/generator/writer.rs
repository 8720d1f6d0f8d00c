use crate::code_writer::CodeWriter;
use crate::error::Result;
use crate::hdl::{Dialect, Entity};

use log::debug;

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Writes `entity` to `<output_dir>/<sub_dir>/<name>.<ext>`, creating directories as needed.
pub fn write_entity(
    output_dir: &Path,
    dialect: Dialect,
    sub_dir: &str,
    entity: &Entity,
) -> Result<PathBuf> {
    let dir = output_dir.join(sub_dir);
    fs::create_dir_all(&dir)?;
    let path = dir.join(format!("{}.{}", entity.name, dialect.file_extension()));

    let file = BufWriter::new(File::create(&path)?);
    let mut w = CodeWriter::new(file, "   ");
    entity.write(dialect, &mut w)?;
    w.into_inner().flush()?;

    debug!("Wrote {} {}", dialect, path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn files_land_in_their_sub_directory() {
        let dir = tempfile::tempdir().unwrap();
        let entity = Entity {
            name: "Empty".to_string(),
            generics: Vec::new(),
            ports: Vec::new(),
            signals: Vec::new(),
            statements: Vec::new(),
        };

        let path = write_entity(dir.path(), Dialect::Verilog, "circuit", &entity).unwrap();

        assert_eq!(path, dir.path().join("circuit").join("Empty.v"));
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("module Empty"));
        assert!(text.contains("endmodule"));
    }
}
