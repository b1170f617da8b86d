use chrono::NaiveDate;

/// Validate an email: must contain '@' and '.', max 254 chars.
pub fn validate_email(email: &str) -> Option<String> {
    let trimmed = email.trim();
    if trimmed.is_empty() {
        return Some("Email is required".to_string());
    }
    if trimmed.len() > 254 {
        return Some("Email must be at most 254 characters".to_string());
    }
    if !trimmed.contains('@') || !trimmed.contains('.') {
        return Some("Email must be a valid address (contain '@' and '.')".to_string());
    }
    None
}

/// Validate a password: min 8 chars on create/change.
pub fn validate_password(password: &str) -> Option<String> {
    if password.is_empty() {
        return Some("Password is required".to_string());
    }
    if password.len() < 8 {
        return Some("Password must be at least 8 characters".to_string());
    }
    None
}

/// Validate a required text field with a max length.
pub fn validate_required(value: &str, field_name: &str, max_len: usize) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Some(format!("{field_name} is required"));
    }
    if trimmed.len() > max_len {
        return Some(format!("{field_name} must be at most {max_len} characters"));
    }
    None
}

/// Validate an optional text field with a max length (empty is OK).
pub fn validate_optional(value: &str, field_name: &str, max_len: usize) -> Option<String> {
    let trimmed = value.trim();
    if !trimmed.is_empty() && trimmed.len() > max_len {
        return Some(format!("{field_name} must be at most {max_len} characters"));
    }
    None
}

/// Validate a calendar date in YYYY-MM-DD form.
pub fn validate_date(value: &str, field_name: &str) -> Option<String> {
    if NaiveDate::parse_from_str(value, "%Y-%m-%d").is_err() {
        return Some(format!("{field_name} must be a date in YYYY-MM-DD form"));
    }
    None
}

/// Validate a time of day in HH:MM form.
pub fn validate_time(value: &str, field_name: &str) -> Option<String> {
    let valid = match value.split_once(':') {
        Some((h, m)) => {
            h.len() == 2
                && m.len() == 2
                && h.parse::<u32>().map(|h| h < 24).unwrap_or(false)
                && m.parse::<u32>().map(|m| m < 60).unwrap_or(false)
        }
        None => false,
    };
    if !valid {
        return Some(format!("{field_name} must be a time in HH:MM form"));
    }
    None
}
