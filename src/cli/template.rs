use std::path::Path;

use crate::error::Result;
use crate::importer::write_template;

pub fn run(file: &Path) -> Result<()> {
    write_template(file)?;
    println!("Wrote sample import file to {}", file.display());
    Ok(())
}
