/// Session security core
///
/// Provides the security primitives behind login, logout, and request
/// authentication:
/// - JWT session token issuance and verification (HS256)
/// - Password hashing and verification (Argon2id)
/// - In-memory token revocation with lazy expiry and a periodic sweep
/// - Sliding-window failed-login tracking with timed blocks
///
/// All state lives in process memory and is owned by the store instances
/// constructed at startup; nothing here survives a restart.
pub mod attempts;
pub mod clock;
pub mod password;
pub mod revocation;
pub mod token;

pub use attempts::AttemptTracker;
pub use clock::{Clock, SystemClock};
pub use revocation::RevocationStore;
pub use token::{Claims, TokenCodec, VerifyError};
