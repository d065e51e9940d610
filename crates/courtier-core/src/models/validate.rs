//! Checks run on write forms before they are sent to the server.

use crate::api::error::{ApiError, FieldErrors};

pub trait Validate {
    fn validate(&self) -> Result<(), ApiError>;
}

/// Collects per-field problems, then turns them into a single error.
#[derive(Debug, Default)]
pub struct Checker {
    errors: FieldErrors,
    first_message: Option<String>,
}

impl Checker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail(&mut self, field: &str, message: &str) {
        if self.first_message.is_none() {
            self.first_message = Some(message.to_string());
        }
        self.errors
            .entry(field.to_string())
            .or_default()
            .push(message.to_string());
    }

    pub fn required(&mut self, field: &str, value: &str) {
        if value.trim().is_empty() {
            self.fail(field, &format!("Le champ {} est requis", field));
        }
    }

    pub fn email(&mut self, field: &str, value: &str) {
        let value = value.trim();
        if value.is_empty() {
            self.required(field, value);
            return;
        }
        let valid = match value.split_once('@') {
            Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
            None => false,
        };
        if !valid {
            self.fail(field, "Adresse email invalide");
        }
    }

    pub fn positive_id(&mut self, field: &str, value: i64) {
        if value <= 0 {
            self.fail(field, &format!("Le champ {} doit référencer un identifiant valide", field));
        }
    }

    pub fn finish(self) -> Result<(), ApiError> {
        match self.first_message {
            None => Ok(()),
            Some(message) => Err(ApiError::Validation {
                message,
                field_errors: self.errors,
            }),
        }
    }
}
