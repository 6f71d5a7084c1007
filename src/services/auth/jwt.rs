/*
 * Responsibility
 * - EdDSA (Ed25519) で access / refresh token を署名・検証
 * - exp は自前で検証し, 期限切れでも claims を返す (access → TokenExpired, refresh → Unauthorized の判別用)
 */
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::{error::Error as StdError, fmt};
use uuid::Uuid;

use crate::services::auth::claims::{Claims, RawClaims, TokenType};

// Errors returned by token signing / verification.
#[derive(Debug)]
pub enum TokenError {
    InvalidKey(jsonwebtoken::errors::Error),
    Sign(jsonwebtoken::errors::Error),
    // Bad signature, wrong issuer, missing claims, not a JWT at all.
    Malformed(jsonwebtoken::errors::Error),
    UnknownType(u8),
    // Authentic but past `exp` (+ leeway). Carries the claims so callers can
    // tell an expired access token from an expired refresh token.
    Expired(Claims),
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidKey(e) => write!(f, "invalid ed25519 key pem: {}", e),
            Self::Sign(e) => write!(f, "failed to sign jwt: {}", e),
            Self::Malformed(e) => write!(f, "jwt verification failed: {}", e),
            Self::UnknownType(code) => write!(f, "unknown token_type {}", code),
            Self::Expired(claims) => write!(f, "token expired for user {}", claims.user_id),
        }
    }
}

impl StdError for TokenError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::InvalidKey(e) | Self::Sign(e) | Self::Malformed(e) => Some(e),
            _ => None,
        }
    }
}

/// EdDSA (Ed25519) signer + verifier for access and refresh tokens.
///
/// - Key material is intentionally not printable via Debug.
#[derive(Clone)]
pub struct JwtCodec {
    issuer: String,
    leeway_seconds: u64,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for JwtCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtCodec")
            .field("issuer", &self.issuer)
            .field("leeway_seconds", &self.leeway_seconds)
            .finish()
    }
}

impl JwtCodec {
    /// `private_key_pem` must be Ed25519 PKCS#8, `public_key_pem` the matching SPKI.
    pub fn new(
        private_key_pem: &str,
        public_key_pem: &str,
        issuer: impl Into<String>,
        leeway_seconds: u64,
    ) -> Result<Self, TokenError> {
        let issuer = issuer.into();

        let encoding_key =
            EncodingKey::from_ed_pem(private_key_pem.as_bytes()).map_err(TokenError::InvalidKey)?;
        let decoding_key =
            DecodingKey::from_ed_pem(public_key_pem.as_bytes()).map_err(TokenError::InvalidKey)?;

        // `exp` is checked by hand in `verify` so an expired token still yields its claims.
        let mut validation = Validation::new(Algorithm::EdDSA);
        validation.set_issuer(&[issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss"]);
        validation.validate_exp = false;

        Ok(Self {
            issuer,
            leeway_seconds,
            encoding_key,
            decoding_key,
            validation,
        })
    }

    pub fn sign(
        &self,
        user_id: i64,
        token_type: TokenType,
        ttl_seconds: u64,
    ) -> Result<String, TokenError> {
        let now = chrono::Utc::now().timestamp();

        let claims = RawClaims {
            iss: self.issuer.clone(),
            user_id,
            token_type: token_type.as_code(),
            iat: now,
            exp: now.saturating_add(i64::try_from(ttl_seconds).unwrap_or(i64::MAX)),
            jti: Uuid::new_v4().to_string(),
        };

        let mut header = Header::new(Algorithm::EdDSA);
        header.typ = Some("JWT".to_string());
        jsonwebtoken::encode(&header, &claims, &self.encoding_key).map_err(TokenError::Sign)
    }

    /// Verify signature, issuer and claim shape, then the token type and expiry.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let data = jsonwebtoken::decode::<RawClaims>(token, &self.decoding_key, &self.validation)
            .map_err(TokenError::Malformed)?;
        let raw = data.claims;

        let token_type =
            TokenType::from_code(raw.token_type).ok_or(TokenError::UnknownType(raw.token_type))?;
        let claims = Claims {
            user_id: raw.user_id,
            token_type,
        };

        let now = chrono::Utc::now().timestamp();
        let leeway = i64::try_from(self.leeway_seconds).unwrap_or(i64::MAX);
        if now > raw.exp.saturating_add(leeway) {
            return Err(TokenError::Expired(claims));
        }

        Ok(claims)
    }
}


#[cfg(test)]
mod tests {
    use super::test_keys::*;
    use super::*;

    fn sign_raw(pem: &str, claims: &RawClaims) -> String {
        let key = EncodingKey::from_ed_pem(pem.as_bytes()).unwrap();
        jsonwebtoken::encode(&Header::new(Algorithm::EdDSA), claims, &key).unwrap()
    }

    fn raw(token_type: u8, exp_offset: i64) -> RawClaims {
        let now = chrono::Utc::now().timestamp();
        RawClaims {
            iss: ISSUER.to_string(),
            user_id: 42,
            token_type,
            iat: now,
            exp: now + exp_offset,
            jti: "fixed".to_string(),
        }
    }

    #[test]
    fn signed_tokens_verify_with_their_type() {
        let codec = codec();

        let access = codec.sign(7, TokenType::Access, 60).unwrap();
        let refresh = codec.sign(7, TokenType::Refresh, 60).unwrap();

        assert_eq!(
            codec.verify(&access).unwrap(),
            Claims {
                user_id: 7,
                token_type: TokenType::Access
            }
        );
        assert_eq!(codec.verify(&refresh).unwrap().token_type, TokenType::Refresh);
    }

    #[test]
    fn tokens_minted_back_to_back_differ() {
        let codec = codec();
        let a = codec.sign(7, TokenType::Access, 60).unwrap();
        let b = codec.sign(7, TokenType::Access, 60).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn oversized_ttl_saturates_instead_of_wrapping() {
        let codec = codec();
        for ttl in [u64::MAX, i64::MAX as u64] {
            let token = codec.sign(7, TokenType::Access, ttl).unwrap();
            assert_eq!(codec.verify(&token).unwrap().user_id, 7, "ttl {ttl}");
        }
    }

    #[test]
    fn garbage_is_malformed() {
        assert!(matches!(
            codec().verify("not-a-jwt"),
            Err(TokenError::Malformed(_))
        ));
    }

    #[test]
    fn foreign_signature_is_malformed() {
        let token = sign_raw(FOREIGN_PRIVATE_PEM, &raw(0, 60));
        assert!(matches!(codec().verify(&token), Err(TokenError::Malformed(_))));
    }

    #[test]
    fn wrong_issuer_is_malformed() {
        let mut claims = raw(0, 60);
        claims.iss = "someone-else".to_string();
        let token = sign_raw(PRIVATE_PEM, &claims);
        assert!(matches!(codec().verify(&token), Err(TokenError::Malformed(_))));
    }

    #[test]
    fn unknown_type_is_reported() {
        let token = sign_raw(PRIVATE_PEM, &raw(9, 60));
        assert!(matches!(
            codec().verify(&token),
            Err(TokenError::UnknownType(9))
        ));
    }

    #[test]
    fn expired_token_keeps_its_claims() {
        let token = sign_raw(PRIVATE_PEM, &raw(0, -120));
        match codec().verify(&token) {
            Err(TokenError::Expired(claims)) => {
                assert_eq!(claims.user_id, 42);
                assert_eq!(claims.token_type, TokenType::Access);
            }
            other => panic!("expected Expired, got {other:?}"),
        }
    }
}
