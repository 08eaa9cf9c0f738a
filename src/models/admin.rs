use serde::Serialize;
use uuid::Uuid;

/// The only role this platform knows. Kept as a claim value rather than an
/// enum so the gate can reject tokens carrying anything else.
pub const ROLE_ADMINISTRATOR: &str = "administrator";

/// An administrator account as the account store hands it out.
///
/// `password_hash` is the PHC-formatted argon2 hash and must never be
/// serialized into a response; API handlers return [`AdminInfo`] instead.
#[derive(Debug, Clone)]
pub struct Admin {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub role: String,
}

/// Public projection of an account, safe to put on the wire.
#[derive(Debug, Serialize)]
pub struct AdminInfo {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: String,
}

impl From<&Admin> for AdminInfo {
    fn from(admin: &Admin) -> Self {
        Self {
            id: admin.id.to_string(),
            email: admin.email.clone(),
            name: admin.name.clone(),
            role: admin.role.clone(),
        }
    }
}
