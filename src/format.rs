//! Text formatting for CLI output.

/// Group digits with commas ("12,345", "-1,200").
pub fn format_number(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    if n < 0 {
        format!("-{}", out)
    } else {
        out
    }
}

/// "62.5%"; `None` renders as an em dash placeholder.
pub fn format_percentage(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) => format!("{:.*}%", decimals, v),
        None => "\u{2014}".to_string(),
    }
}

/// "1st", "2nd", "3rd", "4th", "11th", "22nd".
pub fn format_ordinal(n: u32) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{}{}", n, suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1234567), "1,234,567");
        assert_eq!(format_number(-1200), "-1,200");
    }

    #[test]
    fn test_format_percentage() {
        assert_eq!(format_percentage(Some(62.5), 1), "62.5%");
        assert_eq!(format_percentage(Some(66.666), 0), "67%");
        assert_eq!(format_percentage(None, 1), "\u{2014}");
    }

    #[test]
    fn test_format_ordinal() {
        let cases = [
            (1, "1st"),
            (2, "2nd"),
            (3, "3rd"),
            (4, "4th"),
            (11, "11th"),
            (12, "12th"),
            (13, "13th"),
            (21, "21st"),
            (22, "22nd"),
            (101, "101st"),
            (111, "111th"),
        ];
        for (n, expected) in cases {
            assert_eq!(format_ordinal(n), expected);
        }
    }
}
