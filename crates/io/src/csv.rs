// CSV export/import of budget tables

use std::io::{Read, Write};
use std::path::Path;

use grantbudget_engine::model::{FederalRow, OperatingRow, ProgramRow};
use grantbudget_engine::money::{format_decimal, parse_money_string};

pub const OPERATING_HEADERS: [&str; 3] = ["Category", "Amount", "Percentage"];
pub const PROGRAM_HEADERS: [&str; 4] = ["Line Item", "Units", "Unit Cost", "Total"];
pub const FEDERAL_HEADERS: [&str; 4] = ["Budget Category", "Federal Share", "Non-Federal Share", "Total"];

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

pub fn write_operating<W: Write>(rows: &[OperatingRow], writer: W) -> Result<(), String> {
    write_table(
        writer,
        &OPERATING_HEADERS,
        rows.iter().map(|r| {
            vec![
                r.category.clone(),
                format_decimal(r.amount_cents),
                format!("{:.1}", r.percentage),
            ]
        }),
    )
}

pub fn write_program<W: Write>(rows: &[ProgramRow], writer: W) -> Result<(), String> {
    write_table(
        writer,
        &PROGRAM_HEADERS,
        rows.iter().map(|r| {
            vec![
                r.line_item.clone(),
                format_units(r.units),
                format_decimal(r.unit_cost_cents),
                format_decimal(r.total_cents),
            ]
        }),
    )
}

pub fn write_federal<W: Write>(rows: &[FederalRow], writer: W) -> Result<(), String> {
    write_table(
        writer,
        &FEDERAL_HEADERS,
        rows.iter().map(|r| {
            vec![
                r.category.label().to_string(),
                format_decimal(r.federal_cents),
                format_decimal(r.non_federal_cents),
                format_decimal(r.total_cents),
            ]
        }),
    )
}

pub fn export_operating(rows: &[OperatingRow], path: &Path) -> Result<(), String> {
    write_operating(rows, create(path)?)
}

pub fn export_program(rows: &[ProgramRow], path: &Path) -> Result<(), String> {
    write_program(rows, create(path)?)
}

pub fn export_federal(rows: &[FederalRow], path: &Path) -> Result<(), String> {
    write_federal(rows, create(path)?)
}

fn create(path: &Path) -> Result<std::io::BufWriter<std::fs::File>, String> {
    let file = std::fs::File::create(path)
        .map_err(|e| format!("cannot create {}: {}", path.display(), e))?;
    Ok(std::io::BufWriter::new(file))
}

/// Header row first, always, even with zero rows.
fn write_table<W: Write>(
    writer: W,
    headers: &[&str],
    records: impl Iterator<Item = Vec<String>>,
) -> Result<(), String> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    writer.write_record(headers).map_err(|e| e.to_string())?;
    for record in records {
        writer.write_record(&record).map_err(|e| e.to_string())?;
    }
    writer.flush().map_err(|e| e.to_string())?;
    Ok(())
}

/// Whole units print without a fractional part.
fn format_units(units: f64) -> String {
    if units.fract() == 0.0 {
        format!("{:.0}", units)
    } else {
        units.to_string()
    }
}

// ---------------------------------------------------------------------------
// Import (edited program tables)
// ---------------------------------------------------------------------------

/// Read file and convert to UTF-8 if needed (handles Windows-1252, Latin-1, etc.)
pub fn read_file_as_utf8(path: &Path) -> Result<String, String> {
    let mut file = std::fs::File::open(path)
        .map_err(|e| format!("cannot open {}: {}", path.display(), e))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(|e| e.to_string())?;

    // Try UTF-8 first; on failure, recover the buffer from the error
    match String::from_utf8(bytes) {
        Ok(s) => Ok(s),
        Err(e) => {
            let bytes = e.into_bytes();
            // Fall back to Windows-1252 (common for Excel-exported CSVs)
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            log::debug!("{} is not UTF-8, decoded as Windows-1252", path.display());
            Ok(decoded.into_owned())
        }
    }
}

pub fn import_program(path: &Path) -> Result<Vec<ProgramRow>, String> {
    let content = read_file_as_utf8(path)?;
    parse_program_csv(&content)
}

/// Parse an edited program table. Columns are located by header name, so
/// reordered columns are fine. Blank rows are skipped; blank numbers read as 0.
///
/// Totals are taken as written. The engine re-asserts them before use, keeping
/// an edited total only on one-unit rows.
pub fn parse_program_csv(content: &str) -> Result<Vec<ProgramRow>, String> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.trim_start_matches('\u{feff}').as_bytes());

    let headers = reader.headers().map_err(|e| e.to_string())?.clone();
    let column = |name: &str| -> Result<usize, String> {
        headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
            .ok_or_else(|| format!("missing column '{name}'"))
    };
    let item_col = column(PROGRAM_HEADERS[0])?;
    let units_col = column(PROGRAM_HEADERS[1])?;
    let cost_col = column(PROGRAM_HEADERS[2])?;
    let total_col = column(PROGRAM_HEADERS[3]).ok();

    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let record = result.map_err(|e| e.to_string())?;
        if record.iter().all(|f| f.is_empty()) {
            continue;
        }
        // Header is line 1.
        let line = idx + 2;
        let field = |col: usize| record.get(col).unwrap_or("");

        let units = match field(units_col) {
            "" => 0.0,
            s => s
                .parse::<f64>()
                .map_err(|_| format!("line {line}: cannot parse units '{s}'"))?,
        };
        let unit_cost_cents = parse_amount(field(cost_col), line, "unit cost")?;
        let total_cents = match total_col {
            Some(col) => parse_amount(field(col), line, "total")?,
            None => 0,
        };

        rows.push(ProgramRow {
            line_item: field(item_col).to_string(),
            units,
            unit_cost_cents,
            total_cents,
        });
    }

    Ok(rows)
}

fn parse_amount(s: &str, line: usize, what: &str) -> Result<i64, String> {
    if s.is_empty() {
        return Ok(0);
    }
    parse_money_string(s).map_err(|e| format!("line {line}: cannot parse {what} '{s}': {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use grantbudget_engine::formula::{generate_operating, generate_program};
    use grantbudget_engine::locality::LocalityFactor;
    use grantbudget_engine::model::FederalCategory;
    use tempfile::tempdir;

    fn to_string<F>(write: F) -> String
    where
        F: FnOnce(&mut Vec<u8>) -> Result<(), String>,
    {
        let mut buf = Vec::new();
        write(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn operating_csv_layout() {
        let rows = generate_operating(LocalityFactor::BASELINE);
        let out = to_string(|buf| write_operating(&rows, buf));
        let mut lines = out.lines();
        assert_eq!(lines.next(), Some("Category,Amount,Percentage"));
        assert_eq!(lines.next(), Some("Personnel (Salaries),450000.00,53.6"));
        assert_eq!(out.lines().count(), 10);
    }

    #[test]
    fn program_csv_quotes_only_when_needed() {
        let rows = generate_program(LocalityFactor::BASELINE);
        let out = to_string(|buf| write_program(&rows, buf));
        assert!(out.starts_with("Line Item,Units,Unit Cost,Total\n"));
        assert!(out.contains("Program Director (1.0 FTE),12,6500.00,78000.00\n"));
        assert!(out.contains("Indirect Costs (10%),1,29554.00,29554.00\n"));
    }

    #[test]
    fn federal_csv_labels() {
        let rows = vec![FederalRow::new(FederalCategory::TotalProjectCosts, 150, 50)];
        let out = to_string(|buf| write_federal(&rows, buf));
        assert_eq!(
            out,
            "Budget Category,Federal Share,Non-Federal Share,Total\nTOTAL PROJECT COSTS,1.50,0.50,2.00\n"
        );
    }

    #[test]
    fn empty_table_still_has_header() {
        let out = to_string(|buf| write_federal(&[], buf));
        assert_eq!(out, "Budget Category,Federal Share,Non-Federal Share,Total\n");
    }

    #[test]
    fn program_export_then_import() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("program_budget.csv");
        let rows = generate_program(LocalityFactor::new(1.23).unwrap());
        export_program(&rows, &path).unwrap();
        let back = import_program(&path).unwrap();
        assert_eq!(back, rows);
    }

    #[test]
    fn import_edited_table() {
        let content = "\u{feff}Unit Cost,Line Item,Units,Total\n\
                       \"6,500.00\",Program Director (1.0 FTE),10,78000.00\n\
                       ,,,\n\
                       $25,Client Transportation,,\n";
        let rows = parse_program_csv(content).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].line_item, "Program Director (1.0 FTE)");
        assert_eq!(rows[0].units, 10.0);
        assert_eq!(rows[0].unit_cost_cents, 650_000);
        // Stale total kept as written; the engine re-asserts it.
        assert_eq!(rows[0].total_cents, 7_800_000);
        assert_eq!(rows[1].units, 0.0);
        assert_eq!(rows[1].total_cents, 0);
    }

    #[test]
    fn import_reports_bad_values() {
        let err = parse_program_csv("Line Item,Units,Unit Cost\nX,many,1\n").unwrap_err();
        assert!(err.contains("line 2"), "{err}");
        let err = parse_program_csv("Line Item,Unit Cost\nX,1\n").unwrap_err();
        assert!(err.contains("missing column 'Units'"));
    }

    #[test]
    fn windows_1252_fallback() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("latin.csv");
        // "Caf\xe9 Supplies" in Windows-1252
        let mut bytes = b"Line Item,Units,Unit Cost,Total\nCaf".to_vec();
        bytes.push(0xE9);
        bytes.extend_from_slice(b" Supplies,2,10.00,20.00\n");
        std::fs::write(&path, bytes).unwrap();
        let rows = import_program(&path).unwrap();
        assert_eq!(rows[0].line_item, "Caf\u{e9} Supplies");
    }
}
