use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    pub security: SecurityConfig,
    pub admin: AdminConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub expiry_hours: i64,
}

/// Brute-force mitigation knobs. The attempt window (how long failures
/// accumulate before the counter resets) and the lockout duration (how long
/// an engaged block lasts) are independent settings.
#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    pub max_login_attempts: u32,
    pub attempt_window_minutes: i64,
    pub lockout_duration_minutes: i64,
    pub revocation_sweep_minutes: u64,
}

/// Bootstrap administrator seeded into the account store at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminConfig {
    pub email: String,
    pub name: String,
    pub password: String,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::Environment::default().separator("__"))
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("jwt.secret", "")?
            .set_default("jwt.expiry_hours", 24)?
            .set_default("security.max_login_attempts", 5)?
            .set_default("security.attempt_window_minutes", 15)?
            .set_default("security.lockout_duration_minutes", 60)?
            .set_default("security.revocation_sweep_minutes", 60)?
            .set_default("admin.email", "admin@townpost.local")?
            .set_default("admin.name", "Administrator")?
            .set_default("admin.password", "")?
            .build()?;

        let config: Self = config.try_deserialize()?;

        // No token can ever be safely issued without a signing secret, so
        // a missing one aborts startup instead of surfacing per request.
        if config.jwt.secret.trim().is_empty() {
            anyhow::bail!("jwt.secret is not set (JWT__SECRET); refusing to start without a signing secret");
        }

        Ok(config)
    }
}
