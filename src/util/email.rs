/// Permissive email detection, equivalent to the `text@text.text` pattern the
/// original SDK used to decide whether a user id doubles as an email address.
pub fn is_email(input: &str) -> bool {
    let Some(at) = input.find('@') else {
        return false;
    };
    let local = &input[..at];
    let domain = &input[at + 1..];
    if local.is_empty() {
        return false;
    }
    match domain.rfind('.') {
        Some(dot) => dot > 0 && dot + 1 < domain.len(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_common_addresses() {
        assert!(is_email("user@example.com"));
        assert!(is_email("first.last@sub.example.co"));
    }

    #[test]
    fn rejects_non_addresses() {
        assert!(!is_email("user-123"));
        assert!(!is_email("@example.com"));
        assert!(!is_email("user@example"));
        assert!(!is_email("user@.com"));
        assert!(!is_email("user@example."));
    }
}
