use passwords::PasswordGenerator;

pub const PIN_LENGTH: usize = 5;

pub const UNIQUE_CODE_LENGTH: usize = 20;

pub fn is_valid_pin(pin: &str) -> bool {
    pin.len() == PIN_LENGTH && pin.chars().all(|c| c.is_ascii_digit())
}

/// Provisioned ids look like `YYYYMMDD-NNNN-NNNN`.
pub fn is_valid_id_format(id: &str) -> bool {
    let parts: Vec<&str> = id.split('-').collect();
    let [date, first, second] = parts.as_slice() else {
        return false;
    };
    let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    date.len() == 8
        && first.len() == 4
        && second.len() == 4
        && all_digits(date)
        && all_digits(first)
        && all_digits(second)
}

pub fn generate_pin() -> String {
    let pin_gen = PasswordGenerator::new()
        .length(PIN_LENGTH)
        .numbers(true)
        .lowercase_letters(false)
        .uppercase_letters(false)
        .spaces(false)
        .symbols(false)
        .strict(true);
    pin_gen.generate_one().expect("Failed to generate PIN")
}

/// Public sharing keys are 20 characters of lowercase letters and digits,
/// independent of the profile id.
pub fn generate_unique_code() -> String {
    let code_gen = PasswordGenerator::new()
        .length(UNIQUE_CODE_LENGTH)
        .numbers(true)
        .lowercase_letters(true)
        .uppercase_letters(false)
        .spaces(false)
        .symbols(false)
        .strict(true);
    code_gen
        .generate_one()
        .expect("Failed to generate unique code")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pin_validation() {
        assert!(is_valid_pin("12345"));
        assert!(is_valid_pin("00000"));
        assert!(!is_valid_pin("1234"));
        assert!(!is_valid_pin("123456"));
        assert!(!is_valid_pin("12a45"));
        assert!(!is_valid_pin(""));
        assert!(!is_valid_pin("１２３４５"));
    }

    #[test]
    fn test_id_format_validation() {
        assert!(is_valid_id_format("20251001-0000-0001"));
        assert!(!is_valid_id_format("20251001-0000"));
        assert!(!is_valid_id_format("2025101-0000-0001"));
        assert!(!is_valid_id_format("20251001-00a0-0001"));
        assert!(!is_valid_id_format(""));
    }

    #[test]
    fn test_generated_credentials_shape() {
        let pin = generate_pin();
        assert!(is_valid_pin(&pin));
        let code = generate_unique_code();
        assert_eq!(code.len(), UNIQUE_CODE_LENGTH);
        assert!(code.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
        assert_ne!(generate_unique_code(), code);
    }
}
