//! Input checks applied before a turn touches history or the model.

use crate::ChatError;

pub const MAX_MESSAGE_LENGTH: usize = 1000;

/// Rejects blank text and text longer than `max_length` characters.
pub fn validate_message(text: &str, max_length: usize) -> Result<(), ChatError> {
    if text.trim().is_empty() {
        return Err(ChatError::empty_message("Tin nhắn không được để trống"));
    }

    if text.chars().count() > max_length {
        return Err(ChatError::message_too_long(format!(
            "Tin nhắn quá dài. Tối đa {max_length} ký tự"
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ChatErrorKind;

    #[test]
    fn blank_text_is_empty_message() {
        for text in ["", "   ", "\n\t"] {
            let err = validate_message(text, MAX_MESSAGE_LENGTH).expect_err("blank should fail");
            assert_eq!(err.kind, ChatErrorKind::EmptyMessage);
        }
    }

    #[test]
    fn length_boundary_counts_characters() {
        let at_limit = "ă".repeat(MAX_MESSAGE_LENGTH);
        assert!(validate_message(&at_limit, MAX_MESSAGE_LENGTH).is_ok());

        let over = "a".repeat(MAX_MESSAGE_LENGTH + 1);
        let err = validate_message(&over, MAX_MESSAGE_LENGTH).expect_err("1001 chars should fail");
        assert_eq!(err.kind, ChatErrorKind::MessageTooLong);
        assert_eq!(err.message, "Tin nhắn quá dài. Tối đa 1000 ký tự");
    }
}
