//! Runtime application configuration loaded from the environment.

/// Runtime configuration populated from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub channel: String,
    pub server_port: u16,
    pub client_id: String,
    pub access_token: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            channel: String::new(),
            server_port: 8080,
            client_id: String::new(),
            access_token: String::new(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the environment (after `.env`, if present).
    pub fn load() -> Self {
        let g = |key: &str| -> String { std::env::var(key).unwrap_or_default() };

        Self {
            channel: normalize_channel(&g("CHANNEL")),
            server_port: parse_u16(&g("SERVER_PORT"), 8080),
            client_id: g("CLIENT_ID"),
            access_token: g("ACCESS_TOKEN"),
        }
    }

    /// Whether Helix badge lookups are configured.
    ///
    /// Without credentials the badge cache runs without a fetcher and
    /// messages are rendered without badges.
    pub fn badge_lookup_enabled(&self) -> bool {
        !self.client_id.is_empty() && !self.access_token.is_empty()
    }
}

/// Trim a channel name, strip a leading `#`, and lowercase it.
pub fn normalize_channel(raw: &str) -> String {
    raw.trim().trim_start_matches('#').to_lowercase()
}

fn parse_u16(s: &str, default: u16) -> u16 {
    if s.is_empty() {
        return default;
    }
    s.parse().unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::{AppConfig, normalize_channel, parse_u16};

    #[test]
    fn normalizes_channel_names() {
        assert_eq!(normalize_channel("  #SomeChannel "), "somechannel");
        assert_eq!(normalize_channel("already_clean"), "already_clean");
        assert_eq!(normalize_channel(""), "");
    }

    #[test]
    fn port_parsing_falls_back_to_default() {
        assert_eq!(parse_u16("", 8080), 8080);
        assert_eq!(parse_u16("not a port", 8080), 8080);
        assert_eq!(parse_u16("9000", 8080), 9000);
    }

    #[test]
    fn badge_lookup_requires_both_credentials() {
        let mut config = AppConfig::default();
        assert!(!config.badge_lookup_enabled());

        config.client_id = "abc".into();
        assert!(!config.badge_lookup_enabled());

        config.access_token = "xyz".into();
        assert!(config.badge_lookup_enabled());
    }
}
