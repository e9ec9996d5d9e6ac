//! Identifier syntax shared by variables, storage items and callable actor references

use crate::domain::error::FlowError;

/// Start of a padded variable reference
pub const VAR_START: &str = "@{";

/// End of a padded variable reference
pub const VAR_END: &str = "}";

/// Whether the character may appear in an identifier
pub fn is_valid_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

/// Whether the string is a non-empty identifier made of letters, digits, '-' and '_'
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(is_valid_char)
}

/// Validates an identifier, naming its kind in the error message
pub fn validate_name(kind: &str, name: &str) -> Result<(), FlowError> {
    if is_valid_name(name) {
        Ok(())
    } else {
        Err(FlowError::Configuration(format!(
            "Invalid {} name '{}', allowed characters: letters, digits, '-' and '_'",
            kind, name
        )))
    }
}

/// Whether the string is a padded variable reference like `@{name}`
///
/// Templates such as `@{a}-@{b}` are not references, the padded part has to be a valid name.
pub fn is_var(s: &str) -> bool {
    s.len() >= VAR_START.len() + VAR_END.len()
        && s.starts_with(VAR_START)
        && s.ends_with(VAR_END)
        && is_valid_name(&s[VAR_START.len()..s.len() - VAR_END.len()])
}

/// Surrounds a variable name with the reference markers
pub fn pad_var(name: &str) -> String {
    format!("{}{}{}", VAR_START, name, VAR_END)
}

/// Strips the reference markers, returning the string unchanged if it isn't padded
pub fn unpad_var(s: &str) -> &str {
    if is_var(s) { &s[VAR_START.len()..s.len() - VAR_END.len()] } else { s }
}
