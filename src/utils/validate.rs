use crate::error::{AppError, AppResult};
use regex::Regex;

/// 验证国际格式手机号 (E.164)
pub fn validate_phone(phone: &str) -> AppResult<()> {
    let phone_regex = Regex::new(r"^\+\d{8,15}$").unwrap();

    if !phone_regex.is_match(phone) {
        return Err(AppError::ValidationError(
            "Phone must be in international format (+573001234567)".to_string(),
        ));
    }

    Ok(())
}

/// 验证邮箱格式
pub fn validate_email(email: &str) -> AppResult<()> {
    let email_regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();

    if !email_regex.is_match(email) {
        return Err(AppError::ValidationError(
            "Invalid email address".to_string(),
        ));
    }

    Ok(())
}

/// 验证NIT（税号），只允许数字和连字符
pub fn validate_nit(nit: &str) -> AppResult<()> {
    let nit_regex = Regex::new(r"^\d{5,15}(-\d)?$").unwrap();

    if !nit_regex.is_match(nit) {
        return Err(AppError::ValidationError(
            "NIT must be 5-15 digits with an optional check digit".to_string(),
        ));
    }

    Ok(())
}
