use super::models::{CreateUserRequest, UpdateUserRequest};
use crate::common::validation::{check_password, is_valid_email};
use crate::common::{ValidationResult, Validator};

impl Validator<CreateUserRequest> for CreateUserRequest {
    fn validate(&self, data: &CreateUserRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        if data.nombre.trim().is_empty() {
            result.add_error("nombre", "Name is required");
        } else if data.nombre.len() > 255 {
            result.add_error("nombre", "Name must not exceed 255 characters");
        }

        if !is_valid_email(&data.email) {
            result.add_error("email", "Email format is invalid");
        }

        check_password(&mut result, "password", &data.password);
        result
    }
}

impl Validator<UpdateUserRequest> for UpdateUserRequest {
    fn validate(&self, data: &UpdateUserRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        if let Some(nombre) = &data.nombre {
            if nombre.trim().is_empty() {
                result.add_error("nombre", "Name must not be empty");
            } else if nombre.len() > 255 {
                result.add_error("nombre", "Name must not exceed 255 characters");
            }
        }

        if let Some(email) = &data.email {
            if !is_valid_email(email) {
                result.add_error("email", "Email format is invalid");
            }
        }

        result
    }
}
