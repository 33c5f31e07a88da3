//! Field-level validation for registration and profile edits.
//!
//! Every rule runs, and every failure is reported, so a client can show all
//! problems with a form at once. Failures convert into an
//! [`ErrorCode::InvalidRequest`](super::ErrorCode) error whose details carry
//! `{"fields": [{"field", "code", "message"}, ...]}`.

use serde::Serialize;
use serde_json::json;
use zeroize::Zeroizing;

use super::{DisplayName, EmailAddress, Error, User, UserValidationError};

/// Minimum password length, in characters.
pub const PASSWORD_MIN: usize = 6;

/// One rejected field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Request field name, as the client sent it.
    pub field: &'static str,
    /// Machine-readable rule identifier such as `blank` or `too_long`.
    pub code: &'static str,
    /// Human-readable explanation.
    pub message: String,
}

impl FieldError {
    /// Describe one failed rule.
    pub fn new(field: &'static str, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            code,
            message: message.into(),
        }
    }
}

/// Non-empty list of rejected fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    /// Record another failure.
    pub fn push(&mut self, error: FieldError) {
        self.0.push(error);
    }

    /// Whether every rule passed.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Failures in the order the rules ran.
    pub fn fields(&self) -> &[FieldError] {
        &self.0
    }

    /// Whether any error concerns `field`.
    pub fn has(&self, field: &str) -> bool {
        self.0.iter().any(|error| error.field == field)
    }

    /// Single-field shortcut used for the email uniqueness check.
    pub fn email_taken() -> Self {
        Self(vec![FieldError::new(
            "email",
            "taken",
            "email has already been taken",
        )])
    }

    fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

impl From<ValidationErrors> for Error {
    fn from(value: ValidationErrors) -> Self {
        Error::invalid_request("validation failed").with_details(json!({ "fields": value.0 }))
    }
}

/// Registration form as received from a client.
#[derive(Debug, Clone)]
pub struct RegistrationRequest {
    pub name: String,
    pub email: String,
    pub password: Zeroizing<String>,
    /// Must equal `password` when present.
    pub password_confirmation: Option<Zeroizing<String>>,
}

/// Registration that passed every field rule.
#[derive(Debug, Clone)]
pub struct ValidRegistration {
    pub name: DisplayName,
    pub email: EmailAddress,
    pub password: Zeroizing<String>,
}

/// Profile edit. Absent fields keep their current value.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<Zeroizing<String>>,
    pub password_confirmation: Option<Zeroizing<String>>,
}

/// Profile edit with every supplied field validated.
#[derive(Debug, Clone)]
pub struct ValidProfileUpdate {
    pub name: DisplayName,
    pub email: EmailAddress,
    pub password: Option<Zeroizing<String>>,
}

impl ValidProfileUpdate {
    /// Whether the edit changes the login address.
    pub fn changes_email(&self, current: &User) -> bool {
        &self.email != current.email()
    }
}

/// Check a registration form.
///
/// # Examples
/// ```
/// use micropost::domain::validation::{RegistrationRequest, validate_registration};
/// use zeroize::Zeroizing;
///
/// let request = RegistrationRequest {
///     name: String::new(),
///     email: "bad".into(),
///     password: Zeroizing::new("foo".into()),
///     password_confirmation: None,
/// };
/// let errors = validate_registration(request).unwrap_err();
/// assert_eq!(errors.fields().len(), 4);
/// ```
pub fn validate_registration(
    request: RegistrationRequest,
) -> Result<ValidRegistration, ValidationErrors> {
    let mut errors = ValidationErrors::default();
    let name = collect(&mut errors, "name", DisplayName::new(request.name));
    let email = collect(&mut errors, "email", EmailAddress::new(&request.email));
    check_password(
        &mut errors,
        &request.password,
        request.password_confirmation.as_deref().map(String::as_str),
    );

    match (name, email) {
        (Some(name), Some(email)) => errors.into_result(ValidRegistration {
            name,
            email,
            password: request.password,
        }),
        _ => Err(errors),
    }
}

/// Check a profile edit against the user's current profile.
pub fn validate_profile_update(
    current: &User,
    update: ProfileUpdate,
) -> Result<ValidProfileUpdate, ValidationErrors> {
    let mut errors = ValidationErrors::default();
    let name = match update.name {
        Some(raw) => collect(&mut errors, "name", DisplayName::new(raw)),
        None => Some(current.name().clone()),
    };
    let email = match update.email {
        Some(raw) => collect(&mut errors, "email", EmailAddress::new(raw)),
        None => Some(current.email().clone()),
    };
    let confirmation = update.password_confirmation.as_deref().map(String::as_str);
    match update.password.as_deref() {
        Some(password) => check_password(&mut errors, password, confirmation),
        None if confirmation.is_some() => errors.push(FieldError::new(
            "password",
            "blank",
            "password can't be blank",
        )),
        None => {}
    }

    match (name, email) {
        (Some(name), Some(email)) => errors.into_result(ValidProfileUpdate {
            name,
            email,
            password: update.password,
        }),
        _ => Err(errors),
    }
}

fn collect<T>(
    errors: &mut ValidationErrors,
    field: &'static str,
    result: Result<T, UserValidationError>,
) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(error) => {
            errors.push(FieldError::new(field, user_error_code(&error), error.to_string()));
            None
        }
    }
}

fn user_error_code(error: &UserValidationError) -> &'static str {
    match error {
        UserValidationError::EmptyName | UserValidationError::EmptyEmail => "blank",
        UserValidationError::NameTooLong { .. } => "too_long",
        UserValidationError::InvalidId | UserValidationError::InvalidEmail => "invalid",
    }
}

fn check_password(errors: &mut ValidationErrors, password: &str, confirmation: Option<&str>) {
    if password.trim().is_empty() {
        errors.push(FieldError::new("password", "blank", "password can't be blank"));
    } else if password.chars().count() < PASSWORD_MIN {
        errors.push(FieldError::new(
            "password",
            "too_short",
            format!("password is too short (minimum is {PASSWORD_MIN} characters)"),
        ));
    }

    match confirmation {
        None => errors.push(FieldError::new(
            "password_confirmation",
            "blank",
            "password confirmation can't be blank",
        )),
        Some(confirmation) if confirmation != password => errors.push(FieldError::new(
            "password_confirmation",
            "confirmation",
            "password confirmation doesn't match password",
        )),
        Some(_) => {}
    }
}

#[cfg(test)]
mod tests {
    //! Field rules for the registration and profile forms.
    use super::*;
    use crate::test_support::sample_user;
    use rstest::{fixture, rstest};

    #[fixture]
    fn valid_request() -> RegistrationRequest {
        RegistrationRequest {
            name: "Example User".into(),
            email: "user@example.com".into(),
            password: Zeroizing::new("foobar".into()),
            password_confirmation: Some(Zeroizing::new("foobar".into())),
        }
    }

    #[rstest]
    fn accepts_a_valid_registration(valid_request: RegistrationRequest) {
        let valid = validate_registration(valid_request).expect("request is valid");
        assert_eq!(valid.email.as_ref(), "user@example.com");
    }

    #[rstest]
    #[case::blank_name(|r: &mut RegistrationRequest| r.name = " ".into(), "name", "blank")]
    #[case::long_name(|r: &mut RegistrationRequest| r.name = "a".repeat(51), "name", "too_long")]
    #[case::blank_email(|r: &mut RegistrationRequest| r.email = " ".into(), "email", "blank")]
    #[case::bad_email(|r: &mut RegistrationRequest| r.email = "user@foo,com".into(), "email", "invalid")]
    #[case::blank_password(
        |r: &mut RegistrationRequest| {
            r.password = Zeroizing::new("      ".into());
            r.password_confirmation = Some(Zeroizing::new("      ".into()));
        },
        "password",
        "blank"
    )]
    #[case::short_password(
        |r: &mut RegistrationRequest| {
            r.password = Zeroizing::new("aaaaa".into());
            r.password_confirmation = Some(Zeroizing::new("aaaaa".into()));
        },
        "password",
        "too_short"
    )]
    #[case::mismatch(
        |r: &mut RegistrationRequest| r.password_confirmation = Some(Zeroizing::new("mismatch".into())),
        "password_confirmation",
        "confirmation"
    )]
    #[case::missing_confirmation(
        |r: &mut RegistrationRequest| r.password_confirmation = None,
        "password_confirmation",
        "blank"
    )]
    fn rejects_invalid_fields(
        valid_request: RegistrationRequest,
        #[case] mutate: fn(&mut RegistrationRequest),
        #[case] field: &str,
        #[case] code: &str,
    ) {
        let mut request = valid_request;
        mutate(&mut request);
        let errors = validate_registration(request).expect_err("request is invalid");
        assert_eq!(errors.fields().len(), 1);
        assert_eq!(errors.fields()[0].field, field);
        assert_eq!(errors.fields()[0].code, code);
    }

    #[rstest]
    fn reports_every_failing_field() {
        let request = RegistrationRequest {
            name: String::new(),
            email: String::new(),
            password: Zeroizing::new(String::new()),
            password_confirmation: None,
        };
        let errors = validate_registration(request).expect_err("request is invalid");
        for field in ["name", "email", "password", "password_confirmation"] {
            assert!(errors.has(field), "missing error for {field}");
        }
    }

    #[rstest]
    fn converts_into_invalid_request_with_field_details() {
        let error = Error::from(ValidationErrors::email_taken());
        assert_eq!(error.code(), crate::domain::ErrorCode::InvalidRequest);
        let details = error.details().expect("details are attached");
        assert_eq!(details["fields"][0]["field"], "email");
        assert_eq!(details["fields"][0]["code"], "taken");
    }

    #[rstest]
    fn empty_profile_update_keeps_current_values() {
        let user = sample_user("Ada", "ada@example.com");
        let valid = validate_profile_update(&user, ProfileUpdate::default()).expect("valid");
        assert_eq!(&valid.name, user.name());
        assert!(!valid.changes_email(&user));
        assert!(valid.password.is_none());
    }

    #[rstest]
    fn profile_update_checks_supplied_password() {
        let user = sample_user("Ada", "ada@example.com");
        let update = ProfileUpdate {
            password: Some(Zeroizing::new("foobar".into())),
            ..ProfileUpdate::default()
        };
        let errors = validate_profile_update(&user, update).expect_err("confirmation missing");
        assert!(errors.has("password_confirmation"));
    }

    #[rstest]
    fn profile_update_detects_changed_email() {
        let user = sample_user("Ada", "ada@example.com");
        let update = ProfileUpdate {
            email: Some("Lovelace@Example.com".into()),
            ..ProfileUpdate::default()
        };
        let valid = validate_profile_update(&user, update).expect("valid");
        assert!(valid.changes_email(&user));
        assert_eq!(valid.email.as_ref(), "lovelace@example.com");
    }
}
