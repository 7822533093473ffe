//! Accounts and authentication payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::envelope::{null_as_default, string_or_number};
use crate::status::{Role, Status};

/// Account record as returned by the profile and user-management endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "UserWire")]
pub struct User {
    /// Server identifier.
    #[serde(rename = "_id")]
    pub id: String,
    /// Display name when the server provides one directly.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Given name.
    #[serde(rename = "firstName", skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    /// Family name.
    #[serde(rename = "lastName", skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// Contact email.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Contact phone number.
    #[serde(rename = "phoneNumber", skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    /// Access role.
    pub role: Role,
    /// Account lifecycle status.
    pub status: Status,
    /// Registration timestamp.
    #[serde(rename = "createdAt", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl User {
    /// Best available human-readable name.
    #[must_use]
    pub fn display_name(&self) -> String {
        if let Some(name) = self.name.as_deref().filter(|name| !name.trim().is_empty()) {
            return name.to_string();
        }
        let joined = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|part| !part.trim().is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if joined.is_empty() {
            self.email.clone().unwrap_or_else(|| self.id.clone())
        } else {
            joined
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserWire {
    #[serde(rename = "_id", default)]
    underscore_id: Option<String>,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    last_name: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    phone_number: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    role: Role,
    #[serde(default, deserialize_with = "null_as_default")]
    status: Status,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
}

impl From<UserWire> for User {
    fn from(wire: UserWire) -> Self {
        Self {
            id: wire.underscore_id.or(wire.id).unwrap_or_default(),
            name: wire.name,
            first_name: wire.first_name,
            last_name: wire.last_name,
            email: wire.email,
            phone_number: wire.phone_number,
            role: wire.role,
            status: wire.status,
            created_at: wire.created_at,
        }
    }
}

/// Reference to a user that the server may send either as a bare id or as a
/// populated document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum UserRef {
    /// Unpopulated identifier.
    Id(String),
    /// Populated user document.
    User(Box<User>),
}

impl UserRef {
    /// Identifier regardless of population.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Id(id) => id,
            Self::User(user) => &user.id,
        }
    }

    /// Human-readable label, falling back to the id.
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::Id(id) => id.clone(),
            Self::User(user) => user.display_name(),
        }
    }
}

/// `POST api/auth/login` body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoginRequest {
    /// Account email.
    pub email: String,
    /// Account password.
    pub password: String,
}

/// `POST api/auth/login` response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoginResponse {
    /// Bearer token; absent on failed logins.
    #[serde(default)]
    pub token: Option<String>,
    /// Authenticated user.
    #[serde(default)]
    pub user: Option<User>,
    /// Server message.
    #[serde(default)]
    pub message: Option<String>,
}

/// `POST api/auth/register` body.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Account email.
    pub email: String,
    /// Contact phone number.
    pub phone_number: String,
    /// Self-declared gender.
    pub gender: String,
    /// Six-digit postal code.
    pub pincode: String,
    /// State resolved from the pincode.
    pub state: String,
    /// City resolved from the pincode.
    pub city: String,
    /// Chosen password.
    pub password: String,
    /// Password confirmation; must equal `password`.
    pub confirm_password: String,
}

/// `POST api/auth/register` response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    /// Server-reported outcome.
    #[serde(default)]
    pub success: bool,
    /// Server message.
    #[serde(default)]
    pub message: Option<String>,
    /// Identifier of the pending account, needed for OTP verification.
    #[serde(default)]
    pub user_id: Option<String>,
    /// OTP echoed back by development servers.
    #[serde(default, deserialize_with = "string_or_number")]
    pub otp: Option<String>,
}

/// `POST api/auth/verify-otp` body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOtpRequest {
    /// Pending account identifier.
    pub user_id: String,
    /// Six-digit one-time password.
    pub otp: String,
}

/// `POST api/auth/verify-otp` response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOtpResponse {
    /// Server-reported outcome.
    #[serde(default)]
    pub success: bool,
    /// Bearer token for the now-verified account.
    #[serde(default)]
    pub token: Option<String>,
    /// Verified account identifier.
    #[serde(default)]
    pub user_id: Option<String>,
    /// Server message.
    #[serde(default)]
    pub message: Option<String>,
}

/// `GET api/auth/profile` response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProfileResponse {
    /// Current user; absent when the payload is malformed.
    #[serde(default)]
    pub user: Option<User>,
}

/// `PUT api/auth/change-password` body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    /// Current password.
    pub old_password: String,
    /// Replacement password.
    pub new_password: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn user_accepts_either_id_spelling() {
        let mongo: User = serde_json::from_value(json!({
            "_id": "u1",
            "id": "u1",
            "email": "a@example.com",
            "role": "moderator"
        }))
        .expect("user");
        assert_eq!(mongo.id, "u1");
        assert_eq!(mongo.role, Role::Moderator);
        assert_eq!(mongo.status, Status::Pending);

        let plain: User =
            serde_json::from_value(json!({"id": "u2", "role": null})).expect("user");
        assert_eq!(plain.id, "u2");
        assert_eq!(plain.role, Role::User);
    }

    #[test]
    fn display_name_prefers_name_then_parts_then_email() {
        let mut user: User = serde_json::from_value(json!({
            "_id": "u1",
            "firstName": "Asha",
            "lastName": "Rao",
            "email": "asha@example.com"
        }))
        .expect("user");
        assert_eq!(user.display_name(), "Asha Rao");
        user.name = Some("Asha R.".into());
        assert_eq!(user.display_name(), "Asha R.");
        user.name = None;
        user.first_name = None;
        user.last_name = None;
        assert_eq!(user.display_name(), "asha@example.com");
    }

    #[test]
    fn user_ref_handles_bare_and_populated() {
        let bare: UserRef = serde_json::from_value(json!("u9")).expect("ref");
        assert_eq!(bare.id(), "u9");
        let populated: UserRef =
            serde_json::from_value(json!({"_id": "u3", "name": "Ravi"})).expect("ref");
        assert_eq!(populated.id(), "u3");
        assert_eq!(populated.label(), "Ravi");
    }

    #[test]
    fn register_request_uses_camel_case() {
        let request = RegisterRequest {
            first_name: "A".into(),
            confirm_password: "x".into(),
            ..RegisterRequest::default()
        };
        let value = serde_json::to_value(&request).expect("serialize");
        assert_eq!(value["firstName"], "A");
        assert_eq!(value["confirmPassword"], "x");
        assert!(value.get("first_name").is_none());
    }

    #[test]
    fn register_response_accepts_numeric_otp() {
        let response: RegisterResponse = serde_json::from_value(json!({
            "success": true,
            "userId": "u1",
            "otp": 123_456
        }))
        .expect("response");
        assert_eq!(response.otp.as_deref(), Some("123456"));
    }
}
