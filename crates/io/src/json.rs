// JSON export of a full budget package

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use grantbudget_engine::BudgetPackage;

pub fn write_package<W: Write>(package: &BudgetPackage, writer: W) -> Result<(), String> {
    serde_json::to_writer_pretty(writer, package).map_err(|e| e.to_string())
}

pub fn export(package: &BudgetPackage, path: &Path) -> Result<(), String> {
    let file = File::create(path).map_err(|e| format!("cannot create {}: {}", path.display(), e))?;
    let mut writer = BufWriter::new(file);
    write_package(package, &mut writer)?;
    writer.flush().map_err(|e| e.to_string())
}
