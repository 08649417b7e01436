use std::env;
use tracing::info;
use url::Url;

use crate::credential::CredentialState;

pub const DEFAULT_ENDPOINT: &str = "https://api.nasa.gov/planetary/apod";

pub const API_KEY_VAR: &str = "NASA_API_KEY";
pub const ENDPOINT_VAR: &str = "APOD_ENDPOINT";

/// Read once when the process starts.
#[derive(Debug, Clone)]
pub struct ApodConfig
{
    pub endpoint: Url,
    pub api_key: Option<String>,
}

impl ApodConfig
{
    pub fn new(api_key: Option<String>) -> Self
    {
        ApodConfig
        {
            endpoint: DEFAULT_ENDPOINT.parse().expect("Can't decode hard-coded URL"),
            api_key,
        }
    }

    pub fn from_env() -> Result<Self, url::ParseError>
    {
        let config = ApodConfig::new(env::var(API_KEY_VAR).ok());

        match env::var(ENDPOINT_VAR)
        {
            Ok(endpoint) => config.with_endpoint(&endpoint),
            Err(_) => Ok(config),
        }
    }

    pub fn with_endpoint(mut self, endpoint: &str) -> Result<Self, url::ParseError>
    {
        self.endpoint = endpoint.trim().parse()?;
        Ok(self)
    }

    pub fn credentials(&self) -> CredentialState
    {
        let credentials = CredentialState::new(self.api_key.clone());

        info!("Using NASA API Key: {}", credentials.preferred());

        credentials
    }
}
