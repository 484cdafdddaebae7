use chrono::NaiveDate;

use crate::domain::AppError;

/// Glyph rendered for missing values, matching the grid placeholder.
pub const PLACEHOLDER: &str = "-";

/// Sentinel label that empty cells normalize to in facets and filters,
/// so "no value" is selectable like any other value.
pub const EMPTY_SENTINEL: &str = "(vazio)";

/// Mask a raw 11 digit CPF as 123.456.789-01.
/// Anything that is not exactly 11 digits is passed through unchanged.
pub fn format_cpf(raw: &str) -> String {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() != 11 || digits.len() != raw.trim().len() {
        return raw.to_string();
    }
    format!(
        "{}.{}.{}-{}",
        &digits[0..3],
        &digits[3..6],
        &digits[6..9],
        &digits[9..11]
    )
}

/// Reduce a possibly masked CPF back to its digits for storage.
pub fn strip_cpf(masked: &str) -> String {
    let digits: String = masked.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() == 11 {
        digits
    } else {
        masked.trim().to_string()
    }
}

/// Render a date as dd/mm/yyyy.
pub fn format_date(date: &NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Parse a date from dd/mm/yyyy or yyyy-mm-dd. Empty input means no date.
pub fn parse_date_opt(value: &str) -> Result<Option<NaiveDate>, AppError> {
    let v = value.trim();
    if v.is_empty() || v == PLACEHOLDER {
        return Ok(None);
    }
    NaiveDate::parse_from_str(v, "%d/%m/%Y")
        .or_else(|_| NaiveDate::parse_from_str(v, "%Y-%m-%d"))
        .map(Some)
        .map_err(|_| AppError::InvalidDate(v.to_string()))
}

/// Parse a number accepting a decimal comma.
pub fn parse_number(value: &str) -> Result<f64, AppError> {
    let v = value.trim().replace(',', ".");
    v.parse::<f64>()
        .map_err(|_| AppError::InvalidNumber(value.trim().to_string()))
}

/// Group a number with dots every three integer digits, decimal comma.
/// Whole numbers render without a fraction part.
pub fn format_number(value: f64) -> String {
    // Round to one decimal up front so the carry reaches the integer part.
    let tenths = (value.abs() * 10.0).round() as u64;
    let negative = value < 0.0 && tenths > 0;
    let integer = tenths / 10;
    let frac_digit = tenths % 10;

    let digits = integer.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&grouped);
    if frac_digit > 0 {
        out.push(',');
        out.push((b'0' + frac_digit as u8) as char);
    }
    out
}

/// Scrub embedded line breaks so a value stays on one grid row.
pub fn scrub(value: &str) -> String {
    value.replace("\r\n", " ↵ ").replace('\n', " ↵ ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cpf_masks_eleven_digits() {
        assert_eq!(format_cpf("12345678901"), "123.456.789-01");
    }

    #[test]
    fn cpf_passes_through_on_length_mismatch() {
        assert_eq!(format_cpf("123456789"), "123456789");
        assert_eq!(format_cpf(""), "");
    }

    #[test]
    fn cpf_passes_through_mixed_content() {
        // 11 digits buried in other characters is not a bare CPF.
        assert_eq!(format_cpf("id:12345678901"), "id:12345678901");
    }

    #[test]
    fn strip_cpf_inverts_the_mask() {
        assert_eq!(strip_cpf("123.456.789-01"), "12345678901");
        assert_eq!(strip_cpf("not a cpf"), "not a cpf");
    }

    #[test]
    fn dates_render_as_dd_mm_yyyy() {
        let d = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        assert_eq!(format_date(&d), "04/03/2024");
    }

    #[test]
    fn dates_parse_from_both_formats() {
        let d = NaiveDate::from_ymd_opt(2024, 3, 4);
        assert_eq!(parse_date_opt("04/03/2024").unwrap(), d);
        assert_eq!(parse_date_opt("2024-03-04").unwrap(), d);
        assert_eq!(parse_date_opt("").unwrap(), None);
        assert!(parse_date_opt("31/31/2024").is_err());
    }

    #[test]
    fn numbers_group_thousands() {
        assert_eq!(format_number(0.0), "0");
        assert_eq!(format_number(1234.0), "1.234");
        assert_eq!(format_number(1234567.0), "1.234.567");
        assert_eq!(format_number(-1234.5), "-1.234,5");
    }

    #[test]
    fn number_rounding_carries_into_the_integer_part() {
        assert_eq!(format_number(1.96), "2");
        assert_eq!(format_number(1234.96), "1.235");
        assert_eq!(format_number(1.94), "1,9");
        assert_eq!(format_number(-0.04), "0");
    }

    #[test]
    fn numbers_parse_with_decimal_comma() {
        assert_eq!(parse_number("1,5").unwrap(), 1.5);
        assert_eq!(parse_number("3").unwrap(), 3.0);
        assert!(parse_number("abc").is_err());
    }

    #[test]
    fn scrub_keeps_values_on_one_row() {
        assert_eq!(scrub("a\nb"), "a ↵ b");
        assert_eq!(scrub("a\r\nb"), "a ↵ b");
    }
}
