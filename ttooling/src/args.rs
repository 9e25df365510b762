//! Typed decoding of model-supplied tool arguments.
//!
//! ```rust
//! use serde::Deserialize;
//! use ttooling::parse_arguments;
//!
//! #[derive(Deserialize)]
//! struct Args {
//!     story: String,
//! }
//!
//! let args: Args = parse_arguments(r#"{"story":"Ngày xưa"}"#).expect("args should parse");
//! assert_eq!(args.story, "Ngày xưa");
//! ```

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::ToolError;

pub fn parse_arguments<T: DeserializeOwned>(args_json: &str) -> Result<T, ToolError> {
    let value: Value = serde_json::from_str(args_json)
        .map_err(|err| ToolError::invalid_arguments(format!("invalid JSON arguments: {err}")))?;

    if !value.is_object() {
        return Err(ToolError::invalid_arguments("expected JSON object arguments"));
    }

    serde_json::from_value(value)
        .map_err(|err| ToolError::invalid_arguments(format!("arguments do not match schema: {err}")))
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;
    use crate::ToolErrorKind;

    #[derive(Debug, Deserialize)]
    struct NameOnly {
        #[allow(dead_code)]
        name: String,
    }

    #[test]
    fn invalid_json_and_non_objects_are_rejected() {
        let broken = parse_arguments::<NameOnly>("{").expect_err("json should fail");
        assert_eq!(broken.kind, ToolErrorKind::InvalidArguments);

        let array = parse_arguments::<NameOnly>("[1]").expect_err("array should fail");
        assert_eq!(array.message, "expected JSON object arguments");
    }

    #[test]
    fn missing_required_field_is_invalid_arguments() {
        let error = parse_arguments::<NameOnly>("{}").expect_err("missing field should fail");
        assert_eq!(error.kind, ToolErrorKind::InvalidArguments);
        assert!(error.message.contains("name"));
    }
}
