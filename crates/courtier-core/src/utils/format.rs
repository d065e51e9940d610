use chrono::NaiveDate;

/// Format a phone number for display
/// Handles various input formats and normalizes to XX XX XX XX XX
pub fn format_phone(phone: &str) -> String {
    // Extract just the digits
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();

    let national = match digits.len() {
        10 if digits.starts_with('0') => digits,
        // +33 6 ... -> 06 ...
        11 if digits.starts_with("33") => format!("0{}", &digits[2..]),
        _ => return phone.to_string(), // Return original if can't format
    };

    national
        .as_bytes()
        .chunks(2)
        .map(|pair| String::from_utf8_lossy(pair).into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Format a date as DD/MM/YYYY
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Format a decimal amount in euros: "1200.5" -> "1 200,50 €"
pub fn format_amount(amount: &str) -> String {
    let amount = amount.trim();
    let (integer, fraction) = amount.split_once('.').unwrap_or((amount, ""));
    if integer.is_empty() || !integer.chars().all(|c| c.is_ascii_digit()) {
        return amount.to_string();
    }

    let mut grouped = String::new();
    for (i, c) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(c);
    }

    let cents: String = fraction.chars().chain("00".chars()).take(2).collect();
    format!("{},{} €", grouped, cents)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_phone() {
        assert_eq!(format_phone("0601020304"), "06 01 02 03 04");
        assert_eq!(format_phone("+33601020304"), "06 01 02 03 04");
        assert_eq!(format_phone("06.01.02.03.04"), "06 01 02 03 04");
        assert_eq!(format_phone("123"), "123"); // Too short, return as-is
    }

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("Hello", 10), "Hello");
        assert_eq!(truncate_string("Hello World", 8), "Hello...");
        assert_eq!(truncate_string("Hi", 2), "Hi");
        assert_eq!(truncate_string("Société Générale", 10), "Société...");
    }

    #[test]
    fn test_format_date() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 7).unwrap();
        assert_eq!(format_date(date), "07/03/2025");
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount("1200.00"), "1 200,00 €");
        assert_eq!(format_amount("1234567.5"), "1 234 567,50 €");
        assert_eq!(format_amount("85"), "85,00 €");
        assert_eq!(format_amount("n/a"), "n/a");
    }
}
