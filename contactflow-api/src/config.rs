//! Application settings read from the Rocket figment.
//!
//! Keys live at the top level of `Rocket.toml` profiles, or come from
//! `ROCKET_`/`CONTACTFLOW_` prefixed environment variables:
//!
//! ```toml
//! [default]
//! public_origin = "https://contacts.example.com"
//! seed_file = "global_contacts.toml"
//! secure_cookies = true
//! ```

use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Origin used when building share links.
    pub public_origin: String,
    /// TOML file of global contacts merged in at ignition.
    pub seed_file: Option<PathBuf>,
    /// Whether cookies carry the `Secure` attribute.
    pub secure_cookies: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            public_origin: "http://localhost:8000".to_string(),
            seed_file: None,
            secure_cookies: true,
        }
    }
}

impl AppConfig {
    /// `<origin>/contact/<session id>`
    pub fn share_link(&self, session_id: &str) -> String {
        format!(
            "{}/contact/{}",
            self.public_origin.trim_end_matches('/'),
            session_id
        )
    }
}
