use serde::{Deserialize, Serialize};

use crate::auth::repo::Role;

/// Form body for `POST /auth/token` (OAuth2 password flow style).
#[derive(Debug, Deserialize)]
pub struct TokenForm {
    pub username: String,
    pub password: String,
}

/// Response returned after a successful login.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

/// Public part of the user returned to the client.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: i32,
    pub username: String,
    pub role: Role,
    pub is_active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_response_shape() {
        let resp = TokenResponse {
            access_token: "abc.def.ghi".into(),
            token_type: "bearer".into(),
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"access_token\":\"abc.def.ghi\""));
        assert!(json.contains("\"token_type\":\"bearer\""));
    }

    #[test]
    fn public_user_shape() {
        let user = PublicUser {
            id: 1,
            username: "admin".into(),
            role: Role::Admin,
            is_active: true,
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(json.contains("\"role\":\"admin\""));
        assert!(json.contains("\"is_active\":true"));
    }
}
