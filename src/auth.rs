//! Client for the small auth backend. The backend itself is an
//! external collaborator; this only maps its two routes onto an
//! `AuthResult`.

use serde::Serialize;

use crate::api::{self, ApiError};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AuthResult {
    Ok,
    InvalidCredentials,
    Conflict,
}

impl AuthResult {
    /// The user-facing message for a rejected attempt, if any.
    pub fn rejection_message(self) -> Option<&'static str> {
        match self {
            AuthResult::Ok => None,
            AuthResult::InvalidCredentials => Some("Invalid username or password"),
            AuthResult::Conflict => Some("User already exists"),
        }
    }
}

#[derive(Serialize)]
struct Credentials<'a> {
    username: &'a str,
    password: &'a str,
}

pub async fn login(base_url: &str, username: &str, password: &str) -> Result<AuthResult, ApiError> {
    post_credentials(&format!("{base_url}/api/login"), username, password, 401).await
}

pub async fn register(
    base_url: &str,
    username: &str,
    password: &str,
) -> Result<AuthResult, ApiError> {
    post_credentials(&format!("{base_url}/api/register"), username, password, 409).await
}

async fn post_credentials(
    url: &str,
    username: &str,
    password: &str,
    rejection_status: u16,
) -> Result<AuthResult, ApiError> {
    let response = api::http_client()
        .post(url)
        .json(&Credentials { username, password })
        .send()
        .await
        .map_err(ApiError::Network)?;

    let status = response.status().as_u16();
    if response.status().is_success() {
        return Ok(AuthResult::Ok);
    }
    if status == rejection_status {
        return Ok(match rejection_status {
            409 => AuthResult::Conflict,
            _ => AuthResult::InvalidCredentials,
        });
    }
    Err(ApiError::Upstream { status })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_messages() {
        assert_eq!(AuthResult::Ok.rejection_message(), None);
        assert_eq!(
            AuthResult::InvalidCredentials.rejection_message(),
            Some("Invalid username or password")
        );
        assert_eq!(
            AuthResult::Conflict.rejection_message(),
            Some("User already exists")
        );
    }
}
