/// Two-decimal amount with `,` thousands grouping. Missing or non-finite input renders as `0.00`.
pub fn format_currency(value: Option<f64>) -> String {
    let Some(value) = value.filter(|v| v.is_finite()) else {
        return "0.00".to_string();
    };
    let fixed = to_fixed_2(value);
    let (sign, digits) = match fixed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", fixed.as_str()),
    };
    let (integer, fraction) = digits.split_once('.').unwrap_or((digits, "00"));
    format!("{sign}{}.{fraction}", group_thousands(integer))
}

/// Two-decimal percentage such as `12.35%`. Missing or non-finite input renders as `0.00%`.
pub fn format_percentage(value: Option<f64>) -> String {
    match value.filter(|v| v.is_finite()) {
        Some(value) => format!("{}%", to_fixed_2(value)),
        None => "0.00%".to_string(),
    }
}

// Rounds half away from zero at the second decimal.
fn to_fixed_2(value: f64) -> String {
    let scaled = value * 100.0;
    let rounded = if scaled.is_finite() {
        scaled.round() / 100.0
    } else {
        value
    };
    let text = format!("{rounded:.2}");
    if text.trim_start_matches('-').chars().all(|c| c == '0' || c == '.') {
        // -0.00
        return text.trim_start_matches('-').to_string();
    }
    text
}

fn group_thousands(integer: &str) -> String {
    let len = integer.len();
    let mut out = String::with_capacity(len + len / 3);
    for (idx, ch) in integer.chars().enumerate() {
        if idx > 0 && (len - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_integer_digits() {
        assert_eq!(group_thousands("1"), "1");
        assert_eq!(group_thousands("123"), "123");
        assert_eq!(group_thousands("1234"), "1,234");
        assert_eq!(group_thousands("1234567"), "1,234,567");
    }

    #[test]
    fn negative_zero_drops_sign() {
        assert_eq!(to_fixed_2(-0.001), "0.00");
        assert_eq!(to_fixed_2(-0.0), "0.00");
    }
}
