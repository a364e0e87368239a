//! Environment-sourced runtime configuration.

use std::time::Duration;

use url::Url;

use crate::{Error, Result};

const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:4444";
const DEFAULT_CYCLE_DELAY_SECS: u64 = 600;

const DEFAULT_URL_MAIN: &str = "https://ep.knou.ac.kr/";
const DEFAULT_URL_LOGIN: &str = "https://ep.knou.ac.kr/login.do";
const DEFAULT_URL_LANDING: &str = "https://ep.knou.ac.kr/main.do";
const DEFAULT_URL_LECTURE: &str = "https://ucampus.knou.ac.kr/ekp/user/study/retrieveUMYStudy.sdo";

/// Portal navigation URLs, overridable per environment.
#[derive(Debug, Clone)]
pub struct PortalUrls {
    /// Entry page; navigating here redirects to the login page when signed out.
    pub main: String,
    /// Login page the portal bounces unauthenticated sessions to.
    pub login: String,
    /// Expected URL after a successful login.
    pub landing: String,
    /// Progress page listing subjects and lectures.
    pub lecture: String,
}

/// Runtime configuration, sourced from the process environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub univ_id: String,
    pub univ_pw: String,
    pub telegram_token: String,
    pub telegram_chat_id: i64,
    pub webdriver_url: String,
    pub headless: bool,
    /// Pause between full passes in continuous mode.
    pub cycle_delay: Duration,
    pub urls: PortalUrls,
}

impl Config {
    /// Build a config from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from a key-lookup function. Split out from
    /// [`Config::from_env`] so tests never touch the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| Error::Config(format!("{key} is not set")))
        };
        let or_default =
            |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let chat_id_raw = required("TELEGRAM_CHAT_ID")?;
        let telegram_chat_id = chat_id_raw
            .parse::<i64>()
            .map_err(|_| Error::Config(format!("invalid TELEGRAM_CHAT_ID: {chat_id_raw}")))?;

        let headless = match lookup("HEADLESS") {
            None => false,
            Some(v) => parse_bool(&v).ok_or_else(|| Error::Config(format!("invalid HEADLESS: {v}")))?,
        };

        let cycle_delay = match lookup("CYCLE_DELAY_SECS") {
            None => Duration::from_secs(DEFAULT_CYCLE_DELAY_SECS),
            Some(v) => Duration::from_secs(
                v.parse::<u64>()
                    .map_err(|_| Error::Config(format!("invalid CYCLE_DELAY_SECS: {v}")))?,
            ),
        };

        let config = Self {
            univ_id: required("UNIV_ID")?,
            univ_pw: required("UNIV_PW")?,
            telegram_token: required("TELEGRAM_API_TOKEN")?,
            telegram_chat_id,
            webdriver_url: or_default("WEBDRIVER_URL", DEFAULT_WEBDRIVER_URL),
            headless,
            cycle_delay,
            urls: PortalUrls {
                main: or_default("URL_MAIN", DEFAULT_URL_MAIN),
                login: or_default("URL_LOGIN", DEFAULT_URL_LOGIN),
                landing: or_default("URL_LANDING", DEFAULT_URL_LANDING),
                lecture: or_default("URL_LECTURE", DEFAULT_URL_LECTURE),
            },
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let urls = [
            ("WEBDRIVER_URL", &self.webdriver_url),
            ("URL_MAIN", &self.urls.main),
            ("URL_LOGIN", &self.urls.login),
            ("URL_LANDING", &self.urls.landing),
            ("URL_LECTURE", &self.urls.lecture),
        ];
        for (key, value) in urls {
            Url::parse(value)
                .map_err(|_| Error::Config(format!("{key} is not a valid url: {value}")))?;
        }
        Ok(())
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn base_env() -> HashMap<String, String> {
        [
            ("UNIV_ID", "student1"),
            ("UNIV_PW", "secret"),
            ("TELEGRAM_API_TOKEN", "123:abc"),
            ("TELEGRAM_CHAT_ID", "5538533245"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    fn from_map(env: &HashMap<String, String>) -> Result<Config> {
        Config::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_minimal_env() {
        let config = from_map(&base_env()).unwrap();
        assert_eq!(config.univ_id, "student1");
        assert_eq!(config.telegram_chat_id, 5538533245);
        assert_eq!(config.webdriver_url, DEFAULT_WEBDRIVER_URL);
        assert!(!config.headless);
        assert_eq!(config.cycle_delay, Duration::from_secs(600));
        assert_eq!(config.urls.landing, DEFAULT_URL_LANDING);
    }

    #[test]
    fn test_missing_required_key() {
        let mut env = base_env();
        env.remove("UNIV_PW");
        let err = from_map(&env).unwrap_err();
        assert!(err.to_string().contains("UNIV_PW"));
    }

    #[test]
    fn test_invalid_chat_id() {
        let mut env = base_env();
        env.insert("TELEGRAM_CHAT_ID".into(), "not-a-number".into());
        let err = from_map(&env).unwrap_err();
        assert!(err.to_string().contains("TELEGRAM_CHAT_ID"));
    }

    #[test]
    fn test_overrides() {
        let mut env = base_env();
        env.insert("WEBDRIVER_URL".into(), "http://selenium:4444".into());
        env.insert("HEADLESS".into(), "true".into());
        env.insert("CYCLE_DELAY_SECS".into(), "30".into());
        let config = from_map(&env).unwrap();
        assert_eq!(config.webdriver_url, "http://selenium:4444");
        assert!(config.headless);
        assert_eq!(config.cycle_delay, Duration::from_secs(30));
    }

    #[test]
    fn test_invalid_headless_flag() {
        let mut env = base_env();
        env.insert("HEADLESS".into(), "maybe".into());
        assert!(from_map(&env).is_err());
    }

    #[test]
    fn test_invalid_url_override() {
        let mut env = base_env();
        env.insert("URL_LECTURE".into(), "not a url".into());
        let err = from_map(&env).unwrap_err();
        assert!(err.to_string().contains("URL_LECTURE"));
    }
}
