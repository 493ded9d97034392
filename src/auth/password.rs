use crate::errors::{AuthError, AuthResult};

const MIN_PASSWORD_LEN: usize = 8;

pub fn validate_password(password: &str) -> AuthResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::WeakPassword(format!(
            "must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

pub fn hash_password(password: &str) -> AuthResult<String> {
    Ok(bcrypt::hash(password, bcrypt::DEFAULT_COST)?)
}

pub fn verify_password(password: &str, hash: &str) -> AuthResult<()> {
    if bcrypt::verify(password, hash)? {
        Ok(())
    } else {
        Err(AuthError::InvalidCredentials)
    }
}
