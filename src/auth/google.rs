use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::Deserialize;

use super::AuthError;

/// Identity claims read from a Google ID token.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GoogleProfile {
    pub name: String,
    pub email: String,
    /// Google account id.
    pub sub: String,
}

impl GoogleProfile {
    /// Decodes the payload segment of a JWT. The signature is not verified.
    pub fn from_id_token(token: &str) -> Result<Self, AuthError> {
        let payload = token
            .split('.')
            .nth(1)
            .ok_or_else(|| AuthError::InvalidToken("missing payload segment".to_string()))?;
        let bytes = URL_SAFE_NO_PAD
            .decode(payload.trim_end_matches('='))
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|e| AuthError::InvalidToken(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(claims: &str) -> String {
        format!("eyJhbGciOiJSUzI1NiJ9.{}.sig", URL_SAFE_NO_PAD.encode(claims))
    }

    #[test]
    fn test_decodes_payload() {
        let profile =
            GoogleProfile::from_id_token(&token(r#"{"name":"Ada","email":"ada@x.io","sub":"1234","iss":"google"}"#))
                .unwrap();
        assert_eq!(profile.name, "Ada");
        assert_eq!(profile.email, "ada@x.io");
        assert_eq!(profile.sub, "1234");
    }

    #[test]
    fn test_rejects_malformed_tokens() {
        assert!(matches!(GoogleProfile::from_id_token("no-dots"), Err(AuthError::InvalidToken(_))));
        assert!(GoogleProfile::from_id_token("a.!!!.c").is_err());
        assert!(GoogleProfile::from_id_token(&token(r#"{"name":"Ada"}"#)).is_err());
    }
}
