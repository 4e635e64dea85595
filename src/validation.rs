use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

// Digits, spaces and phone punctuation, at least 10 of them.
static PHONE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9\s\-+()]{10,}$").expect("phone pattern compiles"));

pub fn validate_email(email: &str) -> bool {
    EMAIL.is_match(email)
}

pub fn validate_phone(phone: &str) -> bool {
    PHONE.is_match(phone)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emails() {
        for ok in ["ana@example.com", "a@b.c", "first.last@mail.example.org"] {
            assert!(validate_email(ok), "{ok}");
        }
        for bad in ["", "ana", "ana@example", "ana @example.com", "@example.com", "a@@b.c"] {
            assert!(!validate_email(bad), "{bad}");
        }
    }

    #[test]
    fn phones() {
        for ok in ["+34 912 345 678", "(555) 123-4567", "0123456789"] {
            assert!(validate_phone(ok), "{ok}");
        }
        for bad in ["123-4567", "555 CALL NOW", "+34 912 345 67x"] {
            assert!(!validate_phone(bad), "{bad}");
        }
    }
}
