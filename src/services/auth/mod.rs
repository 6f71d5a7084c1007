pub mod claims;
pub mod directory;
pub mod jwt;
pub mod policy;
pub mod role;
pub mod session;
pub mod token_issuer;

pub use claims::{Claims, TokenType};
pub use directory::{PgUserDirectory, UserDirectory};
pub use jwt::{JwtCodec, TokenError};
pub use policy::{AuthorizationPolicy, PolicyTable};
pub use session::{CachedSessionStore, SessionCache};
pub use token_issuer::TokenIssuer;
