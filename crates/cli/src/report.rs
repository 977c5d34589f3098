// Human-readable output for stdout.

use std::fmt::Write as _;

use grantbudget_engine::config::OrganizationInfo;
use grantbudget_engine::model::{BudgetPackage, FederalRow, MatchSplit};
use grantbudget_engine::money::{format_decimal, format_whole_dollars};

use crate::request::LocalitySource;

const LABEL_WIDTH: usize = 32;

/// "Generated on YYYY-MM-DD HH:MM" in local time.
pub fn generated_on() -> String {
    format!("Generated on {}", chrono::Local::now().format("%Y-%m-%d %H:%M"))
}

pub fn budget_summary(
    org: &OrganizationInfo,
    package: &BudgetPackage,
    place: Option<String>,
    source: &LocalitySource,
    generated: &str,
) -> String {
    let s = &package.summary;
    let meta = &package.meta;
    let mut out = String::new();

    if !org.name.is_empty() {
        line(&mut out, "Organization", &org.name);
    }
    if !org.program_title.is_empty() {
        line(&mut out, "Program", &org.program_title);
    }
    if !org.grant_period.is_empty() {
        line(&mut out, "Grant period", &org.grant_period);
    }

    let locality = match place {
        Some(place) => format!("{:.2} ({place}, {source})", meta.locality_factor),
        None => format!("{:.2} ({source})", meta.locality_factor),
    };
    line(&mut out, "Locality factor", &locality);
    line(
        &mut out,
        "Match rule",
        &format!("{} {}%", meta.match_mode, percent(meta.match_fraction * 100.0)),
    );
    out.push('\n');

    line(&mut out, "Total annual operating budget", &format_whole_dollars(s.total_operating_cents));
    line(&mut out, "Total program budget", &format_whole_dollars(s.total_program_cents));
    line(&mut out, "Federal share", &format_whole_dollars(meta.split.federal_cents));
    line(&mut out, "Non-federal match", &format_whole_dollars(meta.split.match_cents));
    line(&mut out, "Federal request (SF-424A total)", &format_whole_dollars(s.federal_request_cents));
    out.push('\n');
    out.push_str(generated);
    out.push('\n');
    out
}

/// The federal table as aligned text.
pub fn federal_table(rows: &[FederalRow]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<28} {:>14} {:>18} {:>14}",
        "Budget Category", "Federal Share", "Non-Federal Share", "Total"
    );
    let _ = writeln!(out, "{}", "-".repeat(28 + 14 + 18 + 14 + 3));
    for row in rows {
        let _ = writeln!(
            out,
            "{:<28} {:>14} {:>18} {:>14}",
            row.category.label(),
            format_whole_dollars(row.federal_cents),
            format_whole_dollars(row.non_federal_cents),
            format_whole_dollars(row.total_cents)
        );
    }
    out
}

pub fn split(split: &MatchSplit) -> String {
    format!(
        "Federal: {}\nMatch:   {}\nTotal:   {}\n",
        format_decimal(split.federal_cents),
        format_decimal(split.match_cents),
        format_decimal(split.total_cents)
    )
}

fn line(out: &mut String, label: &str, value: &str) {
    let _ = writeln!(out, "{:<width$} {}", format!("{label}:"), value, width = LABEL_WIDTH);
}

/// 25.0 -> "25", 12.5 -> "12.5"
pub fn percent(p: f64) -> String {
    let s = format!("{:.2}", p);
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use grantbudget_engine::model::FederalCategory;

    #[test]
    fn split_lines() {
        let out = split(&MatchSplit {
            federal_cents: 75_000,
            match_cents: 25_000,
            total_cents: 100_000,
        });
        assert_eq!(out, "Federal: 750.00\nMatch:   250.00\nTotal:   1000.00\n");
    }

    #[test]
    fn table_alignment() {
        let out = federal_table(&[FederalRow::new(FederalCategory::Personnel, 19_680_000, 4_920_000)]);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].len(), lines[2].len());
        assert!(lines[2].starts_with("Personnel"));
        assert!(lines[2].ends_with("$246,000"));
    }

    #[test]
    fn percent_trimming() {
        assert_eq!(percent(25.0), "25");
        assert_eq!(percent(12.5), "12.5");
        assert_eq!(percent(0.0), "0");
    }

    #[test]
    fn footer_format() {
        let g = generated_on();
        assert!(g.starts_with("Generated on "));
        // YYYY-MM-DD HH:MM
        assert_eq!(g.len(), "Generated on ".len() + 16);
    }
}
