use std::fmt;
use chrono::{DateTime, Utc};

/// The shared low-privilege key NASA hands out for trying the API.
pub const DEFAULT_API_KEY: &str = "DEMO_KEY";

/// An api.nasa.gov key. Formatting never reveals more than the
/// first and last four characters.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey
{
    key: String,
}

impl ApiKey
{
    pub fn new<T: Into<String>>(key: T) -> Self
    {
        ApiKey { key: key.into() }
    }

    pub fn default_key() -> Self
    {
        ApiKey::new(DEFAULT_API_KEY)
    }

    pub fn is_default(&self) -> bool
    {
        self.key == DEFAULT_API_KEY
    }

    pub(crate) fn secret(&self) -> &str
    {
        &self.key
    }
}

impl fmt::Display for ApiKey
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        if self.is_default()
        {
            return write!(f, "{}", DEFAULT_API_KEY);
        }

        let chars = self.key.chars().collect::<Vec<char>>();

        if chars.len() <= 8
        {
            write!(f, "****")
        }
        else
        {
            let head = chars[..4].iter().collect::<String>();
            let tail = chars[(chars.len() - 4)..].iter().collect::<String>();

            write!(f, "{}...{}", head, tail)
        }
    }
}

impl fmt::Debug for ApiKey
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "ApiKey({})", self)
    }
}

/// Which key requests go out with, and whether the service
/// has told us to back off.
#[derive(Debug, Clone)]
pub struct CredentialState
{
    configured: ApiKey,
    preferred: ApiKey,
    fallback: ApiKey,
    throttled_until: Option<DateTime<Utc>>,
}

impl CredentialState
{
    /// A missing or blank configured key means the fallback is used from the start.
    pub fn new(configured: Option<String>) -> Self
    {
        let fallback = ApiKey::default_key();

        let preferred = configured
            .map(|k| k.trim().to_owned())
            .filter(|k| !k.is_empty())
            .map(ApiKey::new)
            .unwrap_or_else(|| fallback.clone());

        CredentialState
        {
            configured: preferred.clone(),
            preferred,
            fallback,
            throttled_until: None,
        }
    }

    /// The key the process was started with. Demotion never changes it.
    pub fn configured(&self) -> &ApiKey
    {
        &self.configured
    }

    pub fn preferred(&self) -> &ApiKey
    {
        &self.preferred
    }

    pub fn fallback(&self) -> &ApiKey
    {
        &self.fallback
    }

    pub fn is_using_fallback(&self) -> bool
    {
        self.preferred == self.fallback
    }

    pub fn throttled_until(&self) -> Option<DateTime<Utc>>
    {
        self.throttled_until
    }

    /// How long requests must still wait, or `None` once the window has passed.
    pub fn remaining_throttle(&self, now: DateTime<Utc>) -> Option<std::time::Duration>
    {
        match self.throttled_until
        {
            Some(until) if now < until => Some((until - now).to_std().unwrap_or_default()),
            _ => None,
        }
    }

    pub(crate) fn record_throttle(&mut self, until: DateTime<Utc>)
    {
        self.throttled_until = Some(until);
    }

    /// Switches to the fallback key. Returns false if it was already in use.
    pub(crate) fn demote(&mut self) -> bool
    {
        if self.is_using_fallback()
        {
            return false;
        }

        self.preferred = self.fallback.clone();
        true
    }
}

#[cfg(test)]
mod tests
{
    use chrono::{Duration, TimeZone, Utc};
    use super::*;

    #[test]
    fn test_key_is_redacted()
    {
        let key = ApiKey::new("abcdEFGHijklMNOP");
        assert_eq!(key.to_string(), "abcd...MNOP");
        assert_eq!(format!("{:?}", key), "ApiKey(abcd...MNOP)");

        assert_eq!(ApiKey::new("short").to_string(), "****");
        assert_eq!(ApiKey::default_key().to_string(), "DEMO_KEY");
    }

    #[test]
    fn test_blank_configuration_uses_fallback()
    {
        assert!(CredentialState::new(None).is_using_fallback());
        assert!(CredentialState::new(Some("   ".to_owned())).is_using_fallback());
        assert!(CredentialState::new(Some(DEFAULT_API_KEY.to_owned())).is_using_fallback());

        let state = CredentialState::new(Some(" personal-key-1234 ".to_owned()));
        assert!(!state.is_using_fallback());
        assert_eq!(state.preferred().secret(), "personal-key-1234");
    }

    #[test]
    fn test_demote_only_once()
    {
        let mut state = CredentialState::new(Some("personal-key-1234".to_owned()));

        assert!(state.demote());
        assert!(state.is_using_fallback());
        assert!(!state.demote());
        assert!(state.preferred().is_default());
        assert_eq!(state.configured().secret(), "personal-key-1234");
    }

    #[test]
    fn test_remaining_throttle()
    {
        let mut state = CredentialState::new(None);
        let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();

        assert_eq!(state.remaining_throttle(now), None);

        state.record_throttle(now + Duration::seconds(90));

        assert_eq!(state.remaining_throttle(now), Some(std::time::Duration::from_secs(90)));
        assert_eq!(state.remaining_throttle(now + Duration::seconds(90)), None);
        assert_eq!(state.remaining_throttle(now + Duration::seconds(91)), None);
    }
}
