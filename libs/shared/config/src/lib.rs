use std::env;
use tracing::warn;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_STAFF_ROLES: &str = "admin,staff";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub supabase_jwt_secret: String,
    pub server_port: u16,
    /// Roles allowed into the staff portal.
    pub staff_roles: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            supabase_url: env::var("SUPABASE_URL")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_URL not set, using empty value");
                    String::new()
                }),
            supabase_anon_key: env::var("SUPABASE_ANON_PUBLIC_KEY")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_ANON_PUBLIC_KEY not set, using empty value");
                    String::new()
                }),
            supabase_jwt_secret: env::var("SUPABASE_JWT_SECRET")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_JWT_SECRET not set, using empty value");
                    String::new()
                }),
            server_port: env::var("PORT")
                .ok()
                .and_then(|raw| match raw.parse::<u16>() {
                    Ok(port) => Some(port),
                    Err(_) => {
                        warn!("PORT is not a valid port number ({}), using default", raw);
                        None
                    }
                })
                .unwrap_or(DEFAULT_PORT),
            staff_roles: parse_roles(
                &env::var("STAFF_ROLES").unwrap_or_else(|_| DEFAULT_STAFF_ROLES.to_string()),
            ),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.supabase_url.is_empty()
            && !self.supabase_anon_key.is_empty()
            && !self.supabase_jwt_secret.is_empty()
    }

    pub fn is_staff_role(&self, role: &str) -> bool {
        self.staff_roles.iter().any(|allowed| allowed == role)
    }
}

/// Splits a comma separated role list, dropping blanks.
pub fn parse_roles(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|role| !role.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_are_trimmed_and_blanks_dropped() {
        assert_eq!(parse_roles(" admin, staff ,,"), vec!["admin", "staff"]);
        assert!(parse_roles("").is_empty());
    }

    #[test]
    fn staff_role_membership() {
        let config = AppConfig {
            supabase_url: String::new(),
            supabase_anon_key: String::new(),
            supabase_jwt_secret: String::new(),
            server_port: DEFAULT_PORT,
            staff_roles: parse_roles(DEFAULT_STAFF_ROLES),
        };

        assert!(config.is_staff_role("staff"));
        assert!(config.is_staff_role("admin"));
        assert!(!config.is_staff_role("patient"));
        assert!(!config.is_configured());
    }
}
