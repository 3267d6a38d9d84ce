pub mod jwt;
pub mod password;

pub use jwt::{JwtCodec, JwtError, TokenScope};
pub use password::PasswordHasher;
