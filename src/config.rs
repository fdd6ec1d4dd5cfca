use serde::{Deserialize, Serialize};

/// Password-flow token endpoint of the Hilo B2C directory.
pub const TOKEN_URL: &str = "https://hilodirectoryb2c.b2clogin.com/hilodirectoryb2c.onmicrosoft.com/oauth2/v2.0/token?p=B2C_1A_B2C_1_PasswordFlow";

/// Root of the automation API; every resource path hangs off it.
pub const API_BASE_URL: &str = "https://apim.hiloenergie.com/Automation/v1/api";

pub const CLIENT_ID: &str = "9870f087-25f8-43b6-9cad-d4b74ce512e1";

pub const SCOPE: &str = "openid 9870f087-25f8-43b6-9cad-d4b74ce512e1 offline_access";

/// API gateway key identifying this application (not the user).
pub const SUBSCRIPTION_KEY: &str = "20eeaedcb86945afa3fe792cea89b8bf";

pub const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";

/// Where the client sends its requests.
///
/// `Config::default()` points at the production Hilo services. Fields missing
/// from a serialized config fall back to those values, so a partial override
/// (say, only `api_base_url`) is enough to redirect the client. The client id,
/// scope and subscription key are compiled in and cannot be overridden.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub token_url: String,
    pub api_base_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            token_url: TOKEN_URL.to_string(),
            api_base_url: API_BASE_URL.to_string(),
        }
    }
}

impl Config {
    /// Production identity provider with a different API base.
    pub fn with_api_base_url(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            ..Self::default()
        }
    }

    /// Base URL without a trailing slash, ready for `format!("{}{}", base, path)`.
    pub(crate) fn api_base(&self) -> &str {
        self.api_base_url.trim_end_matches('/')
    }
}
