use std::time::Duration;
use snafu::Snafu;
use snafu::IntoError;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ApodError
{
    #[snafu(display("Rate limited, try again in {}s", ceil_secs(retry_after)))]
    Throttled{ retry_after: Duration },
    #[snafu(display("NASA API request failed ({}): {}", status, message))]
    Upstream{ status: u32, message: String },
    #[snafu(display("curl error: {:?}", source))]
    Transport{ source: curl::Error },
    #[snafu(display("JSON error: {:?}", source))]
    Decode{ source: serde_json::error::Error },
}

impl ApodError
{
    pub fn is_throttled(&self) -> bool
    {
        matches!(self, ApodError::Throttled{..})
    }

    pub fn retry_after(&self) -> Option<Duration>
    {
        match self
        {
            ApodError::Throttled{retry_after} => Some(*retry_after),
            _ => None,
        }
    }

    /// The HTTP status the service answered with, if it answered at all.
    pub fn status(&self) -> Option<u32>
    {
        match self
        {
            ApodError::Throttled{..} => Some(429),
            ApodError::Upstream{status, ..} => Some(*status),
            _ => None,
        }
    }
}

fn ceil_secs(duration: &Duration) -> u64
{
    if duration.subsec_nanos() > 0
    {
        duration.as_secs() + 1
    }
    else
    {
        duration.as_secs()
    }
}

impl From<curl::Error> for ApodError
{
    fn from(source: curl::Error) -> Self
    {
        TransportSnafu{}.into_error(source)
    }
}

impl From<serde_json::error::Error> for ApodError
{
    fn from(source: serde_json::error::Error) -> Self
    {
        DecodeSnafu{}.into_error(source)
    }
}
