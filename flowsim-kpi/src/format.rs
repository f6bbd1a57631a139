//! Number formatting for exports and reports.

/// Currency symbol used in human-readable reports.
pub const CURRENCY_SYMBOL: &str = "€";

/// Fixed-decimal rendering without a negative sign on zero.
pub fn fixed(value: f64, decimals: usize) -> String {
    let rendered = format!("{:.*}", decimals, value);
    match rendered.strip_prefix('-') {
        Some(unsigned) if unsigned.chars().all(|c| c == '0' || c == '.') => unsigned.to_string(),
        _ => rendered,
    }
}

/// Ratio as a percentage, e.g. `0.431` → `43.1%`.
pub fn percent(ratio: f64, decimals: usize) -> String {
    format!("{}%", fixed(ratio * 100.0, decimals))
}

/// Ratio difference in percentage points, e.g. `0.032` → `3.2pp`.
pub fn points(ratio_delta: f64, decimals: usize) -> String {
    format!("{}pp", fixed(ratio_delta * 100.0, decimals))
}

/// Same as [`points`] with an explicit `+` on gains.
pub fn signed_points(ratio_delta: f64, decimals: usize) -> String {
    with_sign(points(ratio_delta, decimals))
}

/// Nearest whole number, halves away from zero.
pub fn rounded(value: f64) -> String {
    fixed(value.round(), 0)
}

/// Rounded whole number with thousands separators, e.g. `-1234567` → `-1,234,567`.
pub fn grouped(value: f64) -> String {
    let digits = rounded(value);
    let (sign, digits) = match digits.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", digits.as_str()),
    };

    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    format!("{}{}", sign, out)
}

/// Same as [`grouped`] with an explicit `+` on gains.
pub fn signed_grouped(value: f64) -> String {
    with_sign(grouped(value))
}

/// Currency amount, e.g. `1350000.4` → `€1,350,000`.
pub fn money(value: f64) -> String {
    let amount = grouped(value);
    match amount.strip_prefix('-') {
        Some(unsigned) => format!("-{}{}", CURRENCY_SYMBOL, unsigned),
        None => format!("{}{}", CURRENCY_SYMBOL, amount),
    }
}

/// Currency amount with an explicit `+` on gains.
pub fn signed_money(value: f64) -> String {
    with_sign(money(value))
}

fn with_sign(rendered: String) -> String {
    let is_zero = rendered
        .chars()
        .filter(|c| c.is_ascii_digit())
        .all(|c| c == '0');
    if rendered.starts_with('-') || is_zero {
        rendered
    } else {
        format!("+{}", rendered)
    }
}
