use once_cell::sync::Lazy;
use regex::Regex;

static IDENTITY_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(\d{4})(\d{8})(\d{4})\b").expect("valid regex"));

static SIXTEEN_DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{16}$").expect("valid regex"));

/// True for a well-formed NIK or family card number.
pub fn is_identity_number(value: &str) -> bool {
    SIXTEEN_DIGITS.is_match(value)
}

/// Masks every 16-digit identity number in `input`, keeping the region
/// prefix and the last four digits: `3201********0001`.
pub fn mask_identity_numbers(input: &str) -> String {
    if input.is_empty() {
        return String::new();
    }
    IDENTITY_NUMBER
        .replace_all(input, |caps: &regex::Captures<'_>| {
            format!("{}********{}", &caps[1], &caps[3])
        })
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::{is_identity_number, mask_identity_numbers};

    #[test]
    fn masks_family_card_number() {
        assert_eq!(mask_identity_numbers("3201234567890001"), "3201********0001");
        assert_eq!(
            mask_identity_numbers("KK 3201234567890002 saved"),
            "KK 3201********0002 saved"
        );
    }

    #[test]
    fn leaves_other_numbers_alone() {
        assert_eq!(mask_identity_numbers("001/RT01-RW05/8/2024"), "001/RT01-RW05/8/2024");
        assert_eq!(mask_identity_numbers("12345678901234567"), "12345678901234567");
    }

    #[test]
    fn validates_sixteen_digit_numbers() {
        assert!(is_identity_number("3201234567890001"));
        assert!(!is_identity_number("320123456789000"));
        assert!(!is_identity_number("32012345678900AB"));
    }
}
