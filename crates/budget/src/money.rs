//! Currency helpers. All amounts are carried as `i64` minor units (cents).

/// Round a dollar amount to the nearest cent.
pub fn to_cents(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

/// Cents back to dollars, for ratio and formula work.
pub fn to_dollars(cents: i64) -> f64 {
    cents as f64 / 100.0
}

/// Format cents as a plain decimal string: `1234.56`, `-0.05`.
pub fn format_decimal(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}

/// Format cents as whole dollars with thousands separators: `$1,234`.
///
/// Exact halves round to the even dollar (`$2.50` -> `$2`, `$3.50` -> `$4`).
pub fn format_whole_dollars(cents: i64) -> String {
    let abs = cents.unsigned_abs();
    let (mut dollars, rem) = (abs / 100, abs % 100);
    if rem > 50 || (rem == 50 && dollars % 2 == 1) {
        dollars += 1;
    }
    let digits = dollars.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if cents < 0 && dollars > 0 {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}

/// Parse a decimal amount string to cents.
/// Handles "1234.56", "1234.5", "1234", "-1234.56", "$1,234.56".
pub fn parse_money_string(s: &str) -> Result<i64, String> {
    let cleaned: String = s.trim().chars().filter(|c| *c != ',' && *c != '$').collect();
    let negative = cleaned.starts_with('-');
    let s = cleaned.trim_start_matches('-');
    if s.is_empty() {
        return Err("empty amount".to_string());
    }
    let (dollars, cents) = if let Some(dot) = s.find('.') {
        let d: i64 = if dot == 0 {
            0
        } else {
            s[..dot].parse().map_err(|e| format!("bad dollars: {}", e))?
        };
        let frac = &s[dot + 1..];
        let c: i64 = match frac.len() {
            0 => 0,
            1 => frac.parse::<i64>().map_err(|e| format!("bad cents: {}", e))? * 10,
            2 => frac.parse().map_err(|e| format!("bad cents: {}", e))?,
            _ => return Err(format!("too many decimal places: {}", s)),
        };
        (d, c)
    } else {
        (s.parse().map_err(|e| format!("bad amount: {}", e))?, 0)
    };
    let minor = dollars * 100 + cents;
    Ok(if negative { -minor } else { minor })
}
