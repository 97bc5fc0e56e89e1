/// Input validators module - protects signup input and search queries
/// Features:
/// 1. DoS Protection: Input length limits
/// 2. Data Theft Protection: Input sanitization
/// 3. Phishing Protection: Email validation
/// 4. SQL Injection Prevention: Query validation

use regex::Regex;
use lazy_static::lazy_static;

use crate::error::ValidationError;

const MAX_EMAIL_LENGTH: usize = 254; // RFC 5321
const MIN_EMAIL_LENGTH: usize = 5;   // Minimum valid email length
const MIN_NICKNAME_LENGTH: usize = 2;
const MAX_NICKNAME_LENGTH: usize = 16;

lazy_static! {
    // RFC 5322 simplified email regex (practical validation)
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$"
    ).unwrap();

    // Regex to detect potentially malicious SQL patterns
    static ref SQL_INJECTION_PATTERNS: [Regex; 6] = [
        // Union-based SQL injection
        Regex::new(r"(?i)\s+UNION\s+").unwrap(),
        // Comment-based injection
        Regex::new(r"(--|;|/\*|\*/|xp_|sp_)").unwrap(),
        // Stacked queries
        Regex::new(r"(?i);\s*(INSERT|UPDATE|DELETE|DROP|CREATE|ALTER)").unwrap(),
        // Time-based blind injection
        Regex::new(r"(?i)(SLEEP|WAITFOR|BENCHMARK|DBMS_LOCK)").unwrap(),
        // Boolean-based injection - quotes handled with character class
        Regex::new(r#"(?i)(\bOR\b|\bAND\b)\s*(['"][0-9]*['"]|[0-9]*)\s*=\s*(['"][0-9]*['"]|[0-9]*|True|False)"#).unwrap(),
        // Function-based injection
        Regex::new(r"(?i)(CAST|CONVERT|SUBSTRING|CONCAT|LOAD_FILE)").unwrap(),
    ];
}

/// Validates email address
/// - Checks format using RFC 5322 simplified regex
/// - Verifies length constraints
/// - Detects potential phishing patterns
pub fn is_valid_email(email: &str) -> Result<String, ValidationError> {
    let trimmed = email.trim();

    // Length validation - prevent DoS attacks with extremely long inputs
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField("email".to_string()));
    }

    if trimmed.len() < MIN_EMAIL_LENGTH {
        return Err(ValidationError::TooShort("email".to_string(), MIN_EMAIL_LENGTH));
    }

    if trimmed.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::TooLong("email".to_string(), MAX_EMAIL_LENGTH));
    }

    // Format validation - RFC 5322 simplified
    if !EMAIL_REGEX.is_match(trimmed) {
        return Err(ValidationError::InvalidFormat("email".to_string()));
    }

    // Check for suspicious patterns (phishing protection)
    if has_suspicious_email_patterns(trimmed) {
        return Err(ValidationError::SuspiciousContent("email".to_string()));
    }

    // Check for SQL injection patterns in email
    if contains_sql_injection_patterns(trimmed) {
        return Err(ValidationError::PossibleSQLInjection);
    }

    Ok(trimmed.to_string())
}

/// Validates a member nickname
/// - Checks length constraints
/// - Validates against control characters
/// - Detects SQL injection patterns
pub fn is_valid_nickname(nickname: &str) -> Result<String, ValidationError> {
    let trimmed = nickname.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField("nickname".to_string()));
    }

    // Count characters, not bytes; nicknames are frequently Hangul
    let char_count = trimmed.chars().count();

    if char_count < MIN_NICKNAME_LENGTH {
        return Err(ValidationError::TooShort(
            "nickname".to_string(),
            MIN_NICKNAME_LENGTH,
        ));
    }

    if char_count > MAX_NICKNAME_LENGTH {
        return Err(ValidationError::TooLong(
            "nickname".to_string(),
            MAX_NICKNAME_LENGTH,
        ));
    }

    if has_suspicious_nickname_patterns(trimmed) {
        return Err(ValidationError::SuspiciousContent("nickname".to_string()));
    }

    if contains_sql_injection_patterns(trimmed) {
        return Err(ValidationError::PossibleSQLInjection);
    }

    Ok(trimmed.to_string())
}

/// Detects suspicious patterns in email addresses that might indicate phishing
fn has_suspicious_email_patterns(email: &str) -> bool {
    // Check for extremely long local part (before @) - phishing indicator
    if let Some(at_pos) = email.find('@') {
        let local_part = &email[..at_pos];
        if local_part.len() > 64 {
            return true;
        }
    }

    // Check for multiple @ symbols
    if email.matches('@').count() != 1 {
        return true;
    }

    // Check for null bytes
    if email.contains('\0') {
        return true;
    }

    false
}

/// Detects suspicious patterns in nicknames
fn has_suspicious_nickname_patterns(nickname: &str) -> bool {
    // Check for null bytes (data theft protection)
    if nickname.contains('\0') {
        return true;
    }

    // Check for control characters
    if nickname.chars().any(|c| c.is_control()) {
        return true;
    }

    // Whitespace inside a nickname is not allowed
    if nickname.chars().any(|c| c.is_whitespace()) {
        return true;
    }

    // Check for special characters (potential injection)
    nickname
        .chars()
        .any(|c| !c.is_alphanumeric() && c != '-' && c != '_')
}

/// Checks if input contains SQL injection patterns
fn contains_sql_injection_patterns(input: &str) -> bool {
    SQL_INJECTION_PATTERNS.iter().any(|pattern| pattern.is_match(input))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_email() {
        assert!(is_valid_email("user@example.com").is_ok());
        assert!(is_valid_email("test.email@domain.co.uk").is_ok());
        assert!(is_valid_email("user+tag@example.com").is_ok());
    }

    #[test]
    fn test_invalid_email_format() {
        assert!(is_valid_email("invalid").is_err());
        assert!(is_valid_email("user@").is_err());
        assert!(is_valid_email("@example.com").is_err());
        assert!(is_valid_email("user@@example.com").is_err());
    }

    #[test]
    fn test_email_length_limits() {
        let too_long = format!("{}@example.com", "a".repeat(250));
        assert!(is_valid_email(&too_long).is_err());

        assert!(is_valid_email("a@a.com").is_err()); // Too short
    }

    #[test]
    fn test_sql_injection_in_email() {
        assert!(is_valid_email("user' OR '1'='1@example.com").is_err());
        assert!(is_valid_email("user; DROP TABLE@example.com").is_err());
    }

    #[test]
    fn test_valid_nickname() {
        assert!(is_valid_nickname("cinephile42").is_ok());
        assert!(is_valid_nickname("고양이1234").is_ok());
        assert!(is_valid_nickname("film_noir").is_ok());
    }

    #[test]
    fn test_nickname_length_limits() {
        assert!(is_valid_nickname("a").is_err());
        assert!(is_valid_nickname(&"a".repeat(17)).is_err());
        assert!(is_valid_nickname("").is_err());
    }

    #[test]
    fn test_nickname_rejects_whitespace_and_specials() {
        assert!(is_valid_nickname("two words").is_err());
        assert!(is_valid_nickname("nick!name").is_err());
        assert!(is_valid_nickname("nick\0name").is_err());
    }

    #[test]
    fn test_sql_injection_in_nickname() {
        assert!(is_valid_nickname("nick;DROP").is_err());
    }
}
