//! User domain types and request payload parsing.
//!
//! These types represent validated domain objects separate from database row
//! types and raw JSON bodies.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use user_directory_core::{Email, EmailError, UserId, Username, UsernameError};

/// A directory user as stored and returned over HTTP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// System-assigned, never reused.
    pub id: UserId,
    /// Unique handle.
    pub username: Username,
    /// Unique email address.
    pub email: Email,
}

/// A validated user that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: Username,
    pub email: Email,
}

/// A partial update. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserChanges {
    pub username: Option<Username>,
    pub email: Option<Email>,
}

/// Body of a create request, resolved once at the HTTP boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateUsers {
    /// `{"username": ..., "email": ...}`
    Single(NewUser),
    /// `[{...}, {...}]` with invalid entries already dropped.
    Bulk(Vec<NewUser>),
}

/// Errors raised while turning a JSON body into domain types.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PayloadError {
    #[error("request body must be a JSON object")]
    NotAnObject,

    #[error("request body must be a JSON object or array")]
    NotAnObjectOrArray,

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("field {0} must be a string")]
    InvalidType(&'static str),

    #[error(transparent)]
    Username(#[from] UsernameError),

    #[error(transparent)]
    Email(#[from] EmailError),
}

impl NewUser {
    /// Validate a single JSON object carrying both fields.
    ///
    /// A field set to `null` counts as missing.
    ///
    /// # Errors
    ///
    /// Returns `PayloadError` if the value is not an object, a field is
    /// missing or not a string, or a field fails validation.
    pub fn from_json(value: &Value) -> Result<Self, PayloadError> {
        let object = value.as_object().ok_or(PayloadError::NotAnObject)?;

        let username = required_str(object, "username")?;
        let email = required_str(object, "email")?;

        Ok(Self {
            username: Username::parse(username)?,
            email: Email::parse(email)?,
        })
    }
}

impl UserChanges {
    /// Validate an update body; only the fields present are collected.
    ///
    /// # Errors
    ///
    /// Returns `PayloadError` if the body is not an object, or a present
    /// field is not a string or fails validation.
    pub fn from_json(value: &Value) -> Result<Self, PayloadError> {
        let object = value.as_object().ok_or(PayloadError::NotAnObject)?;

        let username = optional_str(object, "username")?
            .map(Username::parse)
            .transpose()?;
        let email = optional_str(object, "email")?
            .map(Email::parse)
            .transpose()?;

        Ok(Self { username, email })
    }

    /// Whether the update touches no field at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.username.is_none() && self.email.is_none()
    }
}

impl CreateUsers {
    /// Decide between single and bulk creation from the body's shape.
    ///
    /// Bulk entries that fail validation are skipped, not reported.
    ///
    /// # Errors
    ///
    /// Returns `PayloadError` for a body that is neither an object nor an
    /// array, or for an invalid single object.
    pub fn from_json(value: &Value) -> Result<Self, PayloadError> {
        match value {
            Value::Array(items) => {
                let users = items
                    .iter()
                    .enumerate()
                    .filter_map(|(index, item)| match NewUser::from_json(item) {
                        Ok(user) => Some(user),
                        Err(e) => {
                            tracing::debug!(index, error = %e, "Skipping invalid bulk entry");
                            None
                        }
                    })
                    .collect();
                Ok(Self::Bulk(users))
            }
            Value::Object(_) => NewUser::from_json(value).map(Self::Single),
            _ => Err(PayloadError::NotAnObjectOrArray),
        }
    }
}

fn required_str<'v>(
    object: &'v Map<String, Value>,
    field: &'static str,
) -> Result<&'v str, PayloadError> {
    match object.get(field) {
        None | Some(Value::Null) => Err(PayloadError::MissingField(field)),
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(PayloadError::InvalidType(field)),
    }
}

fn optional_str<'v>(
    object: &'v Map<String, Value>,
    field: &'static str,
) -> Result<Option<&'v str>, PayloadError> {
    match object.get(field) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(_) => Err(PayloadError::InvalidType(field)),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_single_object_resolves_to_single() {
        let payload =
            CreateUsers::from_json(&json!({"username": "a", "email": "a@x.com"})).unwrap();
        let CreateUsers::Single(user) = payload else {
            panic!("expected single payload");
        };
        assert_eq!(user.username.as_str(), "a");
        assert_eq!(user.email.as_str(), "a@x.com");
    }

    #[test]
    fn test_single_missing_field() {
        let err = CreateUsers::from_json(&json!({"username": "a"})).unwrap_err();
        assert_eq!(err, PayloadError::MissingField("email"));

        let err =
            CreateUsers::from_json(&json!({"email": "a@x.com", "username": null})).unwrap_err();
        assert_eq!(err, PayloadError::MissingField("username"));
    }

    #[test]
    fn test_single_wrong_type() {
        let err = CreateUsers::from_json(&json!({"username": 5, "email": "a@x.com"})).unwrap_err();
        assert_eq!(err, PayloadError::InvalidType("username"));
    }

    #[test]
    fn test_single_too_long() {
        let err = CreateUsers::from_json(&json!({"username": "u".repeat(81), "email": "a@x.com"}))
            .unwrap_err();
        assert!(matches!(err, PayloadError::Username(UsernameError::TooLong { .. })));
    }

    #[test]
    fn test_scalar_body_rejected() {
        assert_eq!(
            CreateUsers::from_json(&json!("alice")).unwrap_err(),
            PayloadError::NotAnObjectOrArray
        );
    }

    #[test]
    fn test_bulk_drops_invalid_entries_in_order() {
        let payload = CreateUsers::from_json(&json!([
            {"username": "a", "email": "a@x.com"},
            {"username": "b"},
            "not an object",
            {"username": "", "email": "c@x.com"},
            {"username": "d", "email": "d@x.com"}
        ]))
        .unwrap();

        let CreateUsers::Bulk(users) = payload else {
            panic!("expected bulk payload");
        };
        let names: Vec<&str> = users.iter().map(|u| u.username.as_str()).collect();
        assert_eq!(names, ["a", "d"]);
    }

    #[test]
    fn test_bulk_empty_array() {
        assert_eq!(
            CreateUsers::from_json(&json!([])).unwrap(),
            CreateUsers::Bulk(Vec::new())
        );
    }

    #[test]
    fn test_changes_only_present_fields() {
        let changes = UserChanges::from_json(&json!({"email": "new@x.com"})).unwrap();
        assert_eq!(changes.username, None);
        assert_eq!(changes.email.unwrap().as_str(), "new@x.com");
    }

    #[test]
    fn test_changes_empty_and_unknown_fields() {
        let changes = UserChanges::from_json(&json!({"nickname": "z"})).unwrap();
        assert!(changes.is_empty());
    }

    #[test]
    fn test_changes_reject_null_and_non_object() {
        assert_eq!(
            UserChanges::from_json(&json!({"username": null})).unwrap_err(),
            PayloadError::InvalidType("username")
        );
        assert_eq!(
            UserChanges::from_json(&json!([1, 2])).unwrap_err(),
            PayloadError::NotAnObject
        );
    }

    #[test]
    fn test_user_json_shape() {
        let user = User {
            id: UserId::new(1),
            username: Username::parse("alice").unwrap(),
            email: Email::parse("alice@x.com").unwrap(),
        };
        assert_eq!(
            serde_json::to_value(&user).unwrap(),
            json!({"id": 1, "username": "alice", "email": "alice@x.com"})
        );
    }
}
