/*
 * Responsibility
 * - JWT payload (wire 上の形) と, middleware に渡す検証済み claims
 */
use serde::{Deserialize, Serialize};

/// Which credential a token represents.
///
/// Encoded as an integer in the JWT payload (`0` access, `1` refresh).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
    Access,
    Refresh,
}

impl TokenType {
    pub fn as_code(self) -> u8 {
        match self {
            Self::Access => 0,
            Self::Refresh => 1,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Access),
            1 => Some(Self::Refresh),
            _ => None,
        }
    }
}

/// JWT payload as signed by `JwtCodec`.
///
/// `jti` makes every minted token unique, which the single-current-token
/// rule in the session cache depends on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawClaims {
    pub iss: String,
    pub user_id: i64,
    pub token_type: u8,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

/// Verified claims: the only two facts the authorization flow relies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Claims {
    pub user_id: i64,
    pub token_type: TokenType,
}
