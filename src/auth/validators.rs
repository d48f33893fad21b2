use super::models::{
    ChangePasswordRequest, ForgotPasswordRequest, LoginRequest, RegisterRequest,
    ResetPasswordRequest,
};
use crate::common::validation::{check_password, is_valid_email};
use crate::common::{ValidationResult, Validator};

fn check_email(result: &mut ValidationResult, email: &str) {
    if email.trim().is_empty() {
        result.add_error("email", "Email is required");
    } else if !is_valid_email(email) {
        result.add_error("email", "Email format is invalid");
    }
}

impl Validator<LoginRequest> for LoginRequest {
    fn validate(&self, data: &LoginRequest) -> ValidationResult {
        let mut result = ValidationResult::new();
        check_email(&mut result, &data.email);
        // No policy check here: old passwords may predate the current rules
        if data.password.is_empty() {
            result.add_error("password", "Password is required");
        }
        result
    }
}

impl Validator<RegisterRequest> for RegisterRequest {
    fn validate(&self, data: &RegisterRequest) -> ValidationResult {
        let mut result = ValidationResult::new();
        if data.nombre.trim().is_empty() {
            result.add_error("nombre", "Name is required");
        } else if data.nombre.len() > 255 {
            result.add_error("nombre", "Name must not exceed 255 characters");
        }
        check_email(&mut result, &data.email);
        check_password(&mut result, "password", &data.password);
        result
    }
}

impl Validator<ForgotPasswordRequest> for ForgotPasswordRequest {
    fn validate(&self, data: &ForgotPasswordRequest) -> ValidationResult {
        let mut result = ValidationResult::new();
        check_email(&mut result, &data.email);
        result
    }
}

impl Validator<ResetPasswordRequest> for ResetPasswordRequest {
    fn validate(&self, data: &ResetPasswordRequest) -> ValidationResult {
        let mut result = ValidationResult::new();
        if data.token.trim().is_empty() {
            result.add_error("token", "Reset token is required");
        }
        check_password(&mut result, "password", &data.password);
        result
    }
}

impl Validator<ChangePasswordRequest> for ChangePasswordRequest {
    fn validate(&self, data: &ChangePasswordRequest) -> ValidationResult {
        let mut result = ValidationResult::new();
        if data.current_password.is_empty() {
            result.add_error("current_password", "Current password is required");
        }
        check_password(&mut result, "new_password", &data.new_password);
        result
    }
}
