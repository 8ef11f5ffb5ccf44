use super::UserError;

/// The longest allowed username or organization name
const MAX_NAME_LENGTH: usize = 39;

/// Check if the argument is a valid identifier
pub fn identifier(raw: &str) -> bool {
    raw.chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Check that a unique name is usable, returning the problem if not
pub fn name(field: &'static [&'static str], raw: &str) -> Option<UserError> {
    if raw.is_empty() {
        Some(UserError::new(field, "cannot be empty"))
    } else if raw.len() > MAX_NAME_LENGTH {
        Some(UserError::new(
            field,
            format!("cannot be longer than {MAX_NAME_LENGTH} characters"),
        ))
    } else if !identifier(raw) {
        Some(UserError::new(
            field,
            "can only contain letters, numbers, dashes and underscores",
        ))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::{identifier, name};

    #[test]
    fn identifiers() {
        assert!(identifier("acme-corp_2"));
        assert!(!identifier("acme corp"));
        assert!(!identifier("acmé"));
    }

    #[test]
    fn names() {
        assert!(name(&["name"], "acme").is_none());
        assert!(name(&["name"], "").is_some());
        assert!(name(&["name"], &"a".repeat(40)).is_some());
        assert!(name(&["name"], "a/b").is_some());
    }
}
