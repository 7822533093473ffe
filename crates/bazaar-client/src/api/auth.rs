//! Account endpoints under `api/auth`.

use std::path::Path;

use bazaar_api_models::{
    Ack, ChangePasswordRequest, LoginRequest, LoginResponse, ProfileResponse, RegisterRequest,
    RegisterResponse, User, VerifyOtpRequest, VerifyOtpResponse,
};
use reqwest::Method;

use crate::error::{ApiError, ApiResult};
use crate::http::{ApiClient, ensure_success, file_part, text_form};

/// Length of a one-time password.
pub const OTP_LENGTH: usize = 6;

/// Whether `otp` is exactly six ASCII digits.
#[must_use]
pub fn is_valid_otp(otp: &str) -> bool {
    otp.len() == OTP_LENGTH && otp.bytes().all(|byte| byte.is_ascii_digit())
}

impl ApiClient {
    /// `POST api/auth/login`.
    ///
    /// # Errors
    ///
    /// Propagates transport and HTTP failures.
    pub async fn login(&self, request: &LoginRequest) -> ApiResult<LoginResponse> {
        self.post_json("api/auth/login", request).await
    }

    /// `POST api/auth/register`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] when the passwords differ, otherwise
    /// propagates transport and HTTP failures.
    pub async fn register(&self, request: &RegisterRequest) -> ApiResult<RegisterResponse> {
        if request.password != request.confirm_password {
            return Err(ApiError::validation("Passwords do not match"));
        }
        self.post_json("api/auth/register", request).await
    }

    /// `POST api/auth/verify-otp`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] unless the OTP is six digits,
    /// otherwise propagates transport and HTTP failures.
    pub async fn verify_otp(&self, request: &VerifyOtpRequest) -> ApiResult<VerifyOtpResponse> {
        if !is_valid_otp(&request.otp) {
            return Err(ApiError::validation("Please enter a complete 6-digit OTP"));
        }
        self.post_json("api/auth/verify-otp", request).await
    }

    /// `GET api/auth/profile`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Rejected`] when the payload carries no user.
    pub async fn profile(&self) -> ApiResult<User> {
        let response: ProfileResponse = self.get("api/auth/profile").await?;
        response.user.ok_or(ApiError::Rejected {
            message: Some("Invalid user data format".to_string()),
        })
    }

    /// `PUT api/auth/profile` with text fields and an optional new image.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::File`] when the image cannot be read, otherwise
    /// propagates transport and HTTP failures.
    pub async fn update_profile(
        &self,
        fields: &[(String, String)],
        image: Option<&Path>,
    ) -> ApiResult<Ack> {
        let mut form = text_form(
            fields
                .iter()
                .map(|(name, value)| (name.as_str(), value.as_str())),
        );
        if let Some(image) = image {
            form = form.part("profileImage", file_part(image).await?);
        }
        let ack: Ack = self.send_form(Method::PUT, "api/auth/profile", form).await?;
        ensure_success(ack)
    }

    /// `PUT api/auth/change-password`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] for an empty new password, otherwise
    /// propagates transport and HTTP failures.
    pub async fn change_password(&self, request: &ChangePasswordRequest) -> ApiResult<Ack> {
        if request.new_password.trim().is_empty() {
            return Err(ApiError::validation("New password must not be empty"));
        }
        let ack: Ack = self.put_json("api/auth/change-password", request).await?;
        ensure_success(ack)
    }

    /// `POST api/auth/upload-profile-image` (multipart field `profileImage`).
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::File`] when the image cannot be read, otherwise
    /// propagates transport and HTTP failures.
    pub async fn upload_profile_image(&self, image: &Path) -> ApiResult<Ack> {
        let form = reqwest::multipart::Form::new().part("profileImage", file_part(image).await?);
        let ack: Ack = self
            .send_form(Method::POST, "api/auth/upload-profile-image", form)
            .await?;
        ensure_success(ack)
    }
}
