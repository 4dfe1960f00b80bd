//! Presentation rounding. Money and percentages are rounded here and nowhere
//! else; JSON output keeps full precision.

/// `1234.5` → `"1234.50"`.
pub fn money(value: f64) -> String {
    format!("{value:.2}")
}

/// `1234.5` → `"$1,234.50"`, negative values as `"-$12.00"`.
pub fn dollars(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (whole, frac) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{sign}${grouped}.{frac}")
}

/// A percentage already expressed in percent units: `2.5` → `"2.50%"`.
pub fn percent(value: f64) -> String {
    format!("{value:.2}%")
}

/// A fraction as a percentage: `0.25` → `"25%"`, `0.125` → `"12.5%"`.
pub fn fraction_pct(fraction: f64) -> String {
    let pct = fraction * 100.0;
    if (pct - pct.round()).abs() < 1e-9 {
        format!("{:.0}%", pct.round())
    } else {
        let s = format!("{pct:.2}");
        format!("{}%", s.trim_end_matches('0').trim_end_matches('.'))
    }
}
