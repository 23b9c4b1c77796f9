//! User body validation. Turns a raw `UserPayload` into a `NewUser` or a `UserPatch`.

use crate::error::AppError;
use crate::model::{NewUser, UserPatch, UserPayload};
use regex::Regex;

#[derive(Clone, Copy, Debug)]
enum Format {
    Email,
}

#[derive(Clone, Copy, Debug)]
struct FieldRule {
    min_length: usize,
    max_length: usize,
    format: Option<Format>,
}

const NAME_RULE: FieldRule = FieldRule {
    min_length: 1,
    max_length: 120,
    format: None,
};

const EMAIL_RULE: FieldRule = FieldRule {
    min_length: 3,
    max_length: 254,
    format: Some(Format::Email),
};

const PASSWORD_RULE: FieldRule = FieldRule {
    min_length: 1,
    max_length: 256,
    format: None,
};

const EMAIL_PATTERN: &str = r"^[^@\s]+@[^@\s]+$";

pub struct RequestValidator;

impl RequestValidator {
    /// All of name, email and password must be present and well formed.
    pub fn validate_new(payload: UserPayload) -> Result<NewUser, AppError> {
        let name = required("name", payload.name)?;
        let email = required("email", payload.email)?;
        let password = required("password", payload.password)?;
        validate_field("name", &name, &NAME_RULE)?;
        validate_field("email", &email, &EMAIL_RULE)?;
        validate_field("password", &password, &PASSWORD_RULE)?;
        Ok(NewUser { name, email, password })
    }

    /// Only the fields present are checked; absent ones stay absent in the patch.
    pub fn validate_patch(payload: UserPayload) -> Result<UserPatch, AppError> {
        if let Some(name) = &payload.name {
            validate_field("name", name, &NAME_RULE)?;
        }
        if let Some(email) = &payload.email {
            validate_field("email", email, &EMAIL_RULE)?;
        }
        if let Some(password) = &payload.password {
            validate_field("password", password, &PASSWORD_RULE)?;
        }
        Ok(UserPatch {
            name: payload.name,
            email: payload.email,
            password: payload.password,
        })
    }
}

fn required(field: &str, value: Option<String>) -> Result<String, AppError> {
    value.ok_or_else(|| AppError::Validation(format!("{} is required", field)))
}

fn validate_field(field: &str, value: &str, rule: &FieldRule) -> Result<(), AppError> {
    let len = value.chars().count();
    if len < rule.min_length {
        return Err(AppError::Validation(format!(
            "{} must be at least {} characters",
            field, rule.min_length
        )));
    }
    if len > rule.max_length {
        return Err(AppError::Validation(format!(
            "{} must be at most {} characters",
            field, rule.max_length
        )));
    }
    if let Some(Format::Email) = rule.format {
        let re = Regex::new(EMAIL_PATTERN)
            .map_err(|_| AppError::Validation(format!("invalid pattern for {}", field)))?;
        if !re.is_match(value) {
            return Err(AppError::Validation(format!("{} must be a valid email", field)));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(name: Option<&str>, email: Option<&str>, password: Option<&str>) -> UserPayload {
        UserPayload {
            name: name.map(String::from),
            email: email.map(String::from),
            password: password.map(String::from),
        }
    }

    #[test]
    fn each_required_field_is_reported() {
        let cases = [
            (payload(None, Some("a@b.c"), Some("x")), "name is required"),
            (payload(Some("Luke"), None, Some("x")), "email is required"),
            (payload(Some("Luke"), Some("a@b.c"), None), "password is required"),
        ];
        for (p, msg) in cases {
            match RequestValidator::validate_new(p) {
                Err(AppError::Validation(m)) => assert_eq!(m, msg),
                other => panic!("expected validation error, got {:?}", other.map(|u| u.name)),
            }
        }
    }

    #[test]
    fn email_format_is_checked() {
        let err = RequestValidator::validate_new(payload(Some("Luke"), Some("luke.rebels.org"), Some("x")));
        assert!(matches!(err, Err(AppError::Validation(m)) if m.contains("valid email")));
    }

    #[test]
    fn patch_keeps_absent_fields_absent() {
        let patch = RequestValidator::validate_patch(payload(None, Some("luke@jedi.org"), None)).unwrap();
        assert_eq!(patch.name, None);
        assert_eq!(patch.email.as_deref(), Some("luke@jedi.org"));
        assert_eq!(patch.password, None);
    }

    #[test]
    fn patch_rejects_empty_name() {
        let err = RequestValidator::validate_patch(payload(Some(""), None, None));
        assert!(matches!(err, Err(AppError::Validation(_))));
    }
}
