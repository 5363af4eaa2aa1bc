//! Client-side input validation. Everything here runs before any network call.

use crate::date::parse_event_date;
use crate::event::EventFields;

/// Minimum password length accepted at sign-up.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Rejected form input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("title is required")]
    MissingTitle,
    #[error("event date is required")]
    MissingEventDate,
    #[error("event date must be a valid YYYY-MM-DD date")]
    InvalidEventDate,
    #[error("photo must not exceed 5MB")]
    PhotoTooLarge { size: usize },
    #[error("photo must be an image, got {content_type:?}")]
    UnsupportedPhotoType { content_type: String },
    #[error("email is required")]
    MissingEmail,
    #[error("password is required")]
    MissingPassword,
    #[error("passwords do not match")]
    PasswordMismatch,
    #[error("password must be at least 8 characters")]
    PasswordTooShort,
}

impl ValidationError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingTitle => "MISSING_TITLE",
            Self::MissingEventDate => "MISSING_EVENT_DATE",
            Self::InvalidEventDate => "INVALID_EVENT_DATE",
            Self::PhotoTooLarge { .. } => "PHOTO_TOO_LARGE",
            Self::UnsupportedPhotoType { .. } => "UNSUPPORTED_PHOTO_TYPE",
            Self::MissingEmail => "MISSING_EMAIL",
            Self::MissingPassword => "MISSING_PASSWORD",
            Self::PasswordMismatch => "PASSWORD_MISMATCH",
            Self::PasswordTooShort => "PASSWORD_TOO_SHORT",
        }
    }
}

/// Validate the required fields of the create/edit form.
///
/// The title is trimmed and must be non-empty; a blank description becomes `None`.
pub fn validate_event_fields(
    title: &str,
    event_date: Option<&str>,
    description: Option<&str>,
) -> Result<EventFields, ValidationError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ValidationError::MissingTitle);
    }
    let event_date = match event_date.map(str::trim) {
        None | Some("") => return Err(ValidationError::MissingEventDate),
        Some(raw) => parse_event_date(raw).map_err(|_| ValidationError::InvalidEventDate)?,
    };
    let description = description
        .filter(|d| !d.trim().is_empty())
        .map(str::to_owned);
    Ok(EventFields {
        title: title.to_owned(),
        event_date,
        description,
    })
}

/// Validate sign-in input.
pub fn validate_sign_in(email: &str, password: &str) -> Result<(), ValidationError> {
    if email.trim().is_empty() {
        return Err(ValidationError::MissingEmail);
    }
    if password.is_empty() {
        return Err(ValidationError::MissingPassword);
    }
    Ok(())
}

/// Validate sign-up input. The confirmation is compared first, then the length.
pub fn validate_sign_up(
    email: &str,
    password: &str,
    confirm_password: &str,
) -> Result<(), ValidationError> {
    if email.trim().is_empty() {
        return Err(ValidationError::MissingEmail);
    }
    if password != confirm_password {
        return Err(ValidationError::PasswordMismatch);
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort);
    }
    Ok(())
}
