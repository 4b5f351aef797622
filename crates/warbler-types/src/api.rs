use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

// -- Session Claims --

/// Claims carried by the session cookie. `sub` is the logged-in user's id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub username: String,
    pub exp: usize,
}

// -- Auth forms --

#[derive(Debug, Default, Clone, Serialize, Deserialize, Validate)]
pub struct SignupForm {
    #[serde(default)]
    #[validate(length(min = 1, max = 64, message = "Username is required."))]
    pub username: String,
    #[serde(default)]
    #[validate(email(message = "Invalid email address."))]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 6, message = "Password must be at least 6 characters."))]
    pub password: String,
    #[serde(default)]
    pub image_url: String,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize, Validate)]
pub struct LoginForm {
    #[serde(default)]
    #[validate(length(min = 1, message = "Username is required."))]
    pub username: String,
    #[serde(default)]
    #[validate(length(min = 6, message = "Password must be at least 6 characters."))]
    pub password: String,
}

// -- Profile --

#[derive(Debug, Default, Clone, Serialize, Deserialize, Validate)]
pub struct EditProfileForm {
    #[serde(default)]
    #[validate(length(min = 1, max = 64, message = "Username is required."))]
    pub username: String,
    #[serde(default)]
    #[validate(email(message = "Invalid email address."))]
    pub email: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub header_image_url: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub location: String,
    /// Current password, re-checked before any change is saved.
    #[serde(default, skip_serializing)]
    pub password: String,
}

// -- Messages --

#[derive(Debug, Default, Clone, Serialize, Deserialize, Validate)]
pub struct MessageForm {
    #[serde(default)]
    #[validate(length(min = 1, max = 140, message = "Messages are 1 to 140 characters."))]
    pub text: String,
}

// -- Search --

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

/// Flattens validator output into `field -> messages` for templates.
pub fn field_errors(errors: &ValidationErrors) -> BTreeMap<String, Vec<String>> {
    errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| {
            let messages = errs
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid {}.", field))
                })
                .collect();
            (field.to_string(), messages)
        })
        .collect()
}

/// Empty form inputs mean "not provided".
pub fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
