//! Constraint sets for the authentication operations.
//!
//! Each operation owns one request type whose `validator` attributes are the
//! complete rule set for that operation. [`AUTH_SCHEMAS`] indexes them by
//! operation so routes can look a schema up by name.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use validator::{Validate, ValidationError};

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthOperation {
    Register,
    Login,
    GoogleAuth,
    UpdateDetails,
    UpdatePassword,
    RequestPasswordChangeOtp,
    ForgotPassword,
    ResetPassword,
    VerifyEmail,
    ResendVerification,
    UserId,
}

/// Where the validated input of an operation lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSource {
    Body,
    Path,
}

impl AuthOperation {
    pub const ALL: [AuthOperation; 11] = [
        AuthOperation::Register,
        AuthOperation::Login,
        AuthOperation::GoogleAuth,
        AuthOperation::UpdateDetails,
        AuthOperation::UpdatePassword,
        AuthOperation::RequestPasswordChangeOtp,
        AuthOperation::ForgotPassword,
        AuthOperation::ResetPassword,
        AuthOperation::VerifyEmail,
        AuthOperation::ResendVerification,
        AuthOperation::UserId,
    ];

    pub fn name(self) -> &'static str {
        match self {
            AuthOperation::Register => "register",
            AuthOperation::Login => "login",
            AuthOperation::GoogleAuth => "googleAuth",
            AuthOperation::UpdateDetails => "updateDetails",
            AuthOperation::UpdatePassword => "updatePassword",
            AuthOperation::RequestPasswordChangeOtp => "requestPasswordChangeOtp",
            AuthOperation::ForgotPassword => "forgotPassword",
            AuthOperation::ResetPassword => "resetPassword",
            AuthOperation::VerifyEmail => "verifyEmail",
            AuthOperation::ResendVerification => "resendVerification",
            AuthOperation::UserId => "userId",
        }
    }

    pub fn source(self) -> InputSource {
        match self {
            AuthOperation::UserId => InputSource::Path,
            _ => InputSource::Body,
        }
    }

    pub fn schema(self) -> &'static OperationSchema {
        // AUTH_SCHEMAS is declared in the same order as the enum.
        &AUTH_SCHEMAS[self as usize]
    }
}

impl fmt::Display for AuthOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AuthOperation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AuthOperation::ALL
            .into_iter()
            .find(|op| op.name() == s)
            .ok_or_else(|| format!("Unknown auth operation: {}", s))
    }
}

pub struct OperationSchema {
    pub operation: AuthOperation,
    /// Fields the operation reads; anything else in the input is ignored.
    pub fields: &'static [&'static str],
    check: fn(&Value) -> Result<(), AppError>,
}

impl OperationSchema {
    /// Runs the operation's constraints against a JSON object.
    pub fn validate(&self, input: &Value) -> Result<(), AppError> {
        (self.check)(input)
    }
}

impl fmt::Debug for OperationSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationSchema")
            .field("operation", &self.operation)
            .field("fields", &self.fields)
            .finish()
    }
}

fn check_as<T>(input: &Value) -> Result<(), AppError>
where
    T: DeserializeOwned + Validate,
{
    if !input.is_object() {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "Request body must be a JSON object"
        )));
    }
    let request: T = T::deserialize(input)
        .map_err(|e| AppError::BadRequest(anyhow::anyhow!("Invalid request body: {}", e)))?;
    request.validate()?;
    Ok(())
}

pub static AUTH_SCHEMAS: [OperationSchema; 11] = [
    OperationSchema {
        operation: AuthOperation::Register,
        fields: &["name", "email", "password", "phone", "role"],
        check: check_as::<RegisterRequest>,
    },
    OperationSchema {
        operation: AuthOperation::Login,
        fields: &["email", "password"],
        check: check_as::<LoginRequest>,
    },
    OperationSchema {
        operation: AuthOperation::GoogleAuth,
        fields: &["email", "googleId", "name", "picture"],
        check: check_as::<GoogleAuthRequest>,
    },
    OperationSchema {
        operation: AuthOperation::UpdateDetails,
        fields: &["name", "email", "phone"],
        check: check_as::<UpdateDetailsRequest>,
    },
    OperationSchema {
        operation: AuthOperation::UpdatePassword,
        fields: &["otp", "newPassword"],
        check: check_as::<UpdatePasswordRequest>,
    },
    OperationSchema {
        operation: AuthOperation::RequestPasswordChangeOtp,
        fields: &["currentPassword"],
        check: check_as::<PasswordChangeOtpRequest>,
    },
    OperationSchema {
        operation: AuthOperation::ForgotPassword,
        fields: &["email"],
        check: check_as::<ForgotPasswordRequest>,
    },
    OperationSchema {
        operation: AuthOperation::ResetPassword,
        fields: &["token", "password"],
        check: check_as::<ResetPasswordRequest>,
    },
    OperationSchema {
        operation: AuthOperation::VerifyEmail,
        fields: &["token"],
        check: check_as::<VerifyEmailRequest>,
    },
    OperationSchema {
        operation: AuthOperation::ResendVerification,
        fields: &["email"],
        check: check_as::<ResendVerificationRequest>,
    },
    OperationSchema {
        operation: AuthOperation::UserId,
        fields: &["id"],
        check: check_as::<UserIdParams>,
    },
];

/// Looks a schema up by its operation name (`"register"`, `"googleAuth"`, ...).
pub fn schema_for(name: &str) -> Option<&'static OperationSchema> {
    name.parse::<AuthOperation>().ok().map(AuthOperation::schema)
}

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

fn all_digits(value: &str, len: usize) -> bool {
    value.len() == len && value.bytes().all(|b| b.is_ascii_digit())
}

/// Empty means "not supplied".
fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    if phone.is_empty() || all_digits(phone, 10) {
        Ok(())
    } else {
        Err(invalid("phone", "Please add a valid 10-digit phone number"))
    }
}

/// Admins are never self-registered.
fn validate_role(role: &str) -> Result<(), ValidationError> {
    match role {
        "user" | "volunteer" => Ok(()),
        _ => Err(invalid("role", "Role must be either user or volunteer")),
    }
}

fn validate_otp(otp: &str) -> Result<(), ValidationError> {
    if all_digits(otp, 6) {
        Ok(())
    } else {
        Err(invalid("otp", "Code must be 6 digits"))
    }
}

fn validate_object_id(id: &str) -> Result<(), ValidationError> {
    if id.len() == 24 && id.bytes().all(|b| b.is_ascii_hexdigit()) {
        Ok(())
    } else {
        Err(invalid("object_id", "Invalid user id"))
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 50, message = "Name must be 1-50 characters"))]
    pub name: String,

    #[validate(email(message = "Please add a valid email"))]
    pub email: String,

    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,

    #[validate(custom(function = "validate_phone"))]
    pub phone: Option<String>,

    #[validate(custom(function = "validate_role"))]
    pub role: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct LoginRequest {
    #[validate(email(message = "Please add a valid email"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct GoogleAuthRequest {
    #[validate(email(message = "Please provide email and Google ID"))]
    pub email: String,

    #[validate(length(min = 1, message = "Please provide email and Google ID"))]
    pub google_id: String,

    #[validate(length(max = 50, message = "Name cannot be more than 50 characters"))]
    pub name: Option<String>,

    #[validate(url(message = "Picture must be a URL"))]
    pub picture: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateDetailsRequest {
    #[validate(length(min = 1, max = 50, message = "Name must be 1-50 characters"))]
    pub name: Option<String>,

    #[validate(email(message = "Please add a valid email"))]
    pub email: Option<String>,

    #[validate(custom(function = "validate_phone"))]
    pub phone: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdatePasswordRequest {
    #[validate(custom(function = "validate_otp"))]
    pub otp: String,

    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub new_password: String,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct PasswordChangeOtpRequest {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct ForgotPasswordRequest {
    #[validate(email(message = "Please add a valid email"))]
    pub email: String,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    #[validate(length(min = 1, message = "Please provide token and new password"))]
    pub token: String,

    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct VerifyEmailRequest {
    #[validate(custom(function = "validate_otp"))]
    pub token: String,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct ResendVerificationRequest {
    #[validate(email(message = "Please add a valid email"))]
    pub email: String,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct UserIdParams {
    #[validate(custom(function = "validate_object_id"))]
    pub id: String,
}
