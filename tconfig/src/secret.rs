//! Redacting wrapper for the model API key.

#[derive(PartialEq, Eq)]
pub struct SecretString {
    value: String,
}

impl SecretString {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    /// Trims the raw value and treats blank input as absent.
    pub fn from_raw(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self::new(trimmed))
        }
    }

    pub fn expose(&self) -> &str {
        self.value.as_str()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}

impl Clone for SecretString {
    fn clone(&self) -> Self {
        Self::new(self.value.clone())
    }
}

impl std::fmt::Debug for SecretString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl Drop for SecretString {
    fn drop(&mut self) {
        // Zero bytes are valid UTF-8, so the string stays well-formed.
        unsafe {
            self.value.as_mut_vec().fill(0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::SecretString;

    #[test]
    fn debug_output_hides_value() {
        let secret = SecretString::new("AIza-very-secret");
        assert_eq!(format!("{secret:?}"), "[REDACTED]");
        assert_eq!(secret.expose(), "AIza-very-secret");
    }

    #[test]
    fn from_raw_trims_and_rejects_blank() {
        assert!(SecretString::from_raw("   ").is_none());
        assert!(SecretString::from_raw("").is_none());

        let secret = SecretString::from_raw("  key-1 \n").expect("key should be kept");
        assert_eq!(secret.expose(), "key-1");
    }
}
