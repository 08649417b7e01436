use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

use crate::api::raw::{self, CurlTransport, Query, RawResponse, Transport};
use crate::api::{ApodError, OneOrMany, PictureRecord, ThrottledSnafu, UpstreamSnafu};
use crate::config::ApodConfig;
use crate::credential::{ApiKey, CredentialState};
use crate::dates::{CandidateDate, DateBounds};

/// Source of the current time; the date bounds and throttle
/// window are both measured against it.
pub trait Clock
{
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock
{
    fn now(&self) -> DateTime<Utc>
    {
        Utc::now()
    }
}

/// Result of probing the configured key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CredentialHealth
{
    pub working: bool,
    pub using_default: bool,
    pub reason: Option<String>,
}

pub struct ApodClient<T = CurlTransport, C = SystemClock>
{
    endpoint: Url,
    credentials: CredentialState,
    transport: T,
    clock: C,
}

impl ApodClient<CurlTransport, SystemClock>
{
    pub fn new(config: &ApodConfig) -> Self
    {
        ApodClient::with_parts(config.endpoint.clone(), config.credentials(), CurlTransport, SystemClock)
    }
}

impl<T, C> ApodClient<T, C>
    where T: Transport,
        C: Clock
{
    pub fn with_parts(endpoint: Url, credentials: CredentialState, transport: T, clock: C) -> Self
    {
        ApodClient
        {
            endpoint,
            credentials,
            transport,
            clock,
        }
    }

    pub fn credentials(&self) -> &CredentialState
    {
        &self.credentials
    }

    pub fn today(&self) -> NaiveDate
    {
        self.clock.now().naive_utc().date()
    }

    pub fn bounds(&self) -> DateBounds
    {
        DateBounds::as_of(self.today())
    }

    /// The most recent picture.
    pub fn fetch_latest(&mut self) -> Result<PictureRecord, ApodError>
    {
        self.fetch_one::<NaiveDate>(None)
    }

    /// The picture for `date`, moved into the published range if needed,
    /// or the most recent picture when no date is given.
    pub fn fetch_one<D>(&mut self, date: Option<&D>) -> Result<PictureRecord, ApodError>
        where D: CandidateDate + ?Sized
    {
        let bounds = self.bounds();
        let date = date.map(|d| d.resolve(&bounds));

        let response = self.execute(Query::Single(date))?;

        let record = serde_json::from_slice::<PictureRecord>(&response.body)?;

        Ok(record)
    }

    /// All pictures between the two dates, inclusive, in the order
    /// the service returns them.
    pub fn fetch_range<A, B>(&mut self, start: &A, end: &B) -> Result<Vec<PictureRecord>, ApodError>
        where A: CandidateDate + ?Sized,
            B: CandidateDate + ?Sized
    {
        let bounds = self.bounds();
        let mut start = start.resolve(&bounds);
        let mut end = end.resolve(&bounds);

        if start > end
        {
            warn!("Start date {} is after end date {}, swapping them", start, end);
            std::mem::swap(&mut start, &mut end);
        }

        let response = self.execute(Query::Range{ start, end })?;

        let records = serde_json::from_slice::<OneOrMany>(&response.body)?.into_vec();

        Ok(records)
    }

    /// Checks the configured key, even after requests have fallen back
    /// to the default one. Never records a throttle window and never
    /// switches keys, whatever the answer.
    pub fn check_credential_health(&mut self) -> CredentialHealth
    {
        let key = self.credentials.configured().clone();
        let using_default = key.is_default();

        let sample = Query::Single(NaiveDate::from_ymd_opt(2023, 1, 1));

        match self.send(sample, &key)
        {
            Ok(response) if response.is_success() =>
            {
                CredentialHealth { working: true, using_default, reason: None }
            },
            Ok(response) =>
            {
                let reason = response.json_error_message().unwrap_or_else(||
                {
                    if response.is_auth_failure()
                    {
                        "Invalid or unauthorized API key".to_owned()
                    }
                    else
                    {
                        format!("Unexpected error: {}", raw::status_text(response.status))
                    }
                });

                debug!("Key check response: {} {:?}", response.status, reason);

                CredentialHealth { working: false, using_default, reason: Some(reason) }
            },
            Err(err) =>
            {
                warn!("Error checking NASA API key: {}", err);

                CredentialHealth { working: false, using_default, reason: Some(err.to_string()) }
            },
        }
    }

    fn execute(&mut self, query: Query) -> Result<RawResponse, ApodError>
    {
        if let Some(retry_after) = self.credentials.remaining_throttle(self.clock.now())
        {
            warn!("Rate limited, retry after {:?}", self.credentials.throttled_until());
            return ThrottledSnafu{ retry_after }.fail();
        }

        let key = self.credentials.preferred().clone();
        let response = self.send(query, &key)?;

        if response.is_auth_failure() && !key.is_default() && self.credentials.demote()
        {
            warn!("API key failed ({}), falling back to {}", response.status, self.credentials.fallback());

            let fallback = self.credentials.preferred().clone();
            let response = self.send(query, &fallback)?;

            return self.check(response);
        }

        self.check(response)
    }

    fn send(&mut self, query: Query, key: &ApiKey) -> Result<RawResponse, ApodError>
    {
        let url = query.to_url(&self.endpoint, key);

        debug!("GET {} using key {}", self.endpoint, key);

        self.transport.get(&url)
    }

    fn check(&mut self, response: RawResponse) -> Result<RawResponse, ApodError>
    {
        if response.status == 429
        {
            let now = self.clock.now();

            let until = response.header("X-RateLimit-Reset")
                .and_then(|v| v.trim().parse::<i64>().ok())
                .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
                .unwrap_or_else(|| now + Duration::hours(1));

            self.credentials.record_throttle(until);

            let retry_after = (until - now).to_std().unwrap_or_default();

            warn!("Rate limited until {}", until);

            return ThrottledSnafu{ retry_after }.fail();
        }

        if !response.is_success()
        {
            let message = response.error_message();

            warn!("NASA API error response: {} {}", response.status, message);

            return UpstreamSnafu{ status: response.status, message }.fail();
        }

        if let Some(remaining) = response.header("X-RateLimit-Remaining")
        {
            debug!("NASA API requests remaining: {}", remaining);
        }

        Ok(response)
    }
}

#[cfg(test)]
mod tests
{
    use std::time::Duration as StdDuration;
    use chrono::{Duration, NaiveDate};

    use crate::api::ApodError;
    use crate::credential::CredentialState;
    use crate::testing::*;
    use super::*;

    fn date(s: &str) -> NaiveDate
    {
        s.parse().unwrap()
    }

    #[test]
    fn test_fetch_one_before_inception_returns_first_day()
    {
        let (mut client, log, _clock) = client(None, vec![ok(record("1995-06-16", "image"))]);

        let record = client.fetch_one(Some("1990-01-01")).unwrap();

        assert_eq!(record.date, date("1995-06-16"));
        assert_eq!(log.urls(), vec![
            "https://api.example.test/apod?api_key=DEMO_KEY&date=1995-06-16".to_owned(),
        ]);
    }

    #[test]
    fn test_fetch_latest_sends_no_date()
    {
        let (mut client, log, _clock) = client(Some("personal-key-1234"), vec![ok(record("2024-03-20", "image"))]);

        let record = client.fetch_latest().unwrap();

        assert_eq!(record.date, date("2024-03-20"));
        assert_eq!(log.urls(), vec!["https://api.example.test/apod?api_key=personal-key-1234".to_owned()]);
    }

    #[test]
    fn test_fetch_one_future_date_clamps_to_today()
    {
        let (mut client, log, _clock) = client(None, vec![ok(record("2024-03-20", "image"))]);

        client.fetch_one(Some(&date("2030-01-01"))).unwrap();

        assert!(log.urls()[0].ends_with("&date=2024-03-20"));
    }

    #[test]
    fn test_fetch_range_swaps_reversed_bounds()
    {
        let window = records(&[("2024-03-18", "image"), ("2024-03-19", "image"), ("2024-03-20", "image")]);
        let (mut client, log, _clock) = client(None, vec![ok(window.clone()), ok(window)]);

        let forward = client.fetch_range("2024-03-18", "2024-03-20").unwrap();
        let backward = client.fetch_range("2024-03-20", "2024-03-18").unwrap();

        let forward_dates = forward.iter().map(|r| r.date).collect::<Vec<_>>();
        let backward_dates = backward.iter().map(|r| r.date).collect::<Vec<_>>();
        assert_eq!(forward_dates, backward_dates);

        let urls = log.urls();
        assert_eq!(urls[0], urls[1]);
        assert!(urls[0].ends_with("&start_date=2024-03-18&end_date=2024-03-20"));
    }

    #[test]
    fn test_fetch_range_clamps_each_bound()
    {
        let (mut client, log, _clock) = client(None, vec![ok(records(&[]))]);

        client.fetch_range("1980-01-01", "2100-01-01").unwrap();

        assert!(log.urls()[0].ends_with("&start_date=1995-06-16&end_date=2024-03-20"));
    }

    #[test]
    fn test_fetch_range_normalizes_single_object()
    {
        let (mut client, _log, _clock) = client(None, vec![ok(record("2024-03-20", "image"))]);

        let records = client.fetch_range("2024-03-20", "2024-03-20").unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].date, date("2024-03-20"));
    }

    #[test]
    fn test_auth_failure_falls_back_once()
    {
        let (mut client, log, _clock) = client(Some("personal-key-1234"), vec![
            status(403, r#"{"error":{"code":"API_KEY_INVALID","message":"An invalid api_key was supplied."}}"#),
            ok(record("2024-03-20", "image")),
        ]);

        let record = client.fetch_one(Some("2024-03-20")).unwrap();

        assert_eq!(record.date, date("2024-03-20"));
        assert_eq!(log.urls(), vec![
            "https://api.example.test/apod?api_key=personal-key-1234&date=2024-03-20".to_owned(),
            "https://api.example.test/apod?api_key=DEMO_KEY&date=2024-03-20".to_owned(),
        ]);
        assert!(client.credentials().is_using_fallback());
    }

    #[test]
    fn test_fallback_failure_surfaces_fallback_error()
    {
        let (mut client, log, _clock) = client(Some("personal-key-1234"), vec![
            status(401, r#"{"error":{"message":"personal key rejected"}}"#),
            status(500, r#"{"msg":"fallback exploded"}"#),
        ]);

        let err = client.fetch_one(Some("2024-03-20")).unwrap_err();

        match err
        {
            ApodError::Upstream{status, message} =>
            {
                assert_eq!(status, 500);
                assert_eq!(message, "fallback exploded");
            },
            other => panic!("unexpected error {:?}", other),
        }

        assert_eq!(log.len(), 2);
    }

    #[test]
    fn test_fallback_rejection_is_not_retried_again()
    {
        let (mut client, log, _clock) = client(Some("personal-key-1234"), vec![
            status(403, ""),
            status(403, r#"{"error":{"message":"demo key rejected"}}"#),
        ]);

        let err = client.fetch_one(Some("2024-03-20")).unwrap_err();

        assert_eq!(err.status(), Some(403));
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn test_default_key_auth_failure_is_not_retried()
    {
        let (mut client, log, _clock) = client(None, vec![status(403, "")]);

        let err = client.fetch_one(Some("2024-03-20")).unwrap_err();

        assert_eq!(err.status(), Some(403));
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_throttle_uses_reset_header_and_short_circuits()
    {
        let reset = at(12, 10);
        let (mut client, log, clock) = client(None, vec![
            throttled(Some(reset.timestamp())),
            ok(record("2024-03-20", "image")),
        ]);

        let err = client.fetch_latest().unwrap_err();
        assert_eq!(err.retry_after(), Some(StdDuration::from_secs(600)));
        assert_eq!(client.credentials().throttled_until(), Some(reset));
        assert_eq!(log.len(), 1);

        // Still inside the window: no request goes out
        clock.advance(Duration::minutes(5));
        let err = client.fetch_range("2024-03-10", "2024-03-20").unwrap_err();
        assert_eq!(err.retry_after(), Some(StdDuration::from_secs(300)));
        assert_eq!(log.len(), 1);

        // After the window: requests resume
        clock.advance(Duration::minutes(5));
        client.fetch_latest().unwrap();
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn test_throttle_without_header_defaults_to_one_hour()
    {
        let (mut client, _log, clock) = client(None, vec![throttled(None)]);

        let err = client.fetch_latest().unwrap_err();

        assert!(err.is_throttled());
        assert_eq!(err.retry_after(), Some(StdDuration::from_secs(3600)));
        assert_eq!(client.credentials().throttled_until(), Some(clock.now() + Duration::hours(1)));
    }

    #[test]
    fn test_throttle_after_fallback_is_recorded()
    {
        let (mut client, log, _clock) = client(Some("personal-key-1234"), vec![status(403, ""), throttled(None)]);

        assert!(client.fetch_latest().unwrap_err().is_throttled());
        assert!(client.fetch_latest().unwrap_err().is_throttled());
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn test_other_failures_are_upstream_errors()
    {
        let (mut client, _log, _clock) = client(None, vec![status(503, "")]);

        match client.fetch_latest().unwrap_err()
        {
            ApodError::Upstream{status, message} =>
            {
                assert_eq!(status, 503);
                assert_eq!(message, "Service Unavailable");
            },
            other => panic!("unexpected error {:?}", other),
        }

        assert!(client.credentials().throttled_until().is_none());
    }

    #[test]
    fn test_transport_errors_propagate()
    {
        let (mut client, _log, _clock) = client(None, vec![Err(transport_error())]);

        match client.fetch_latest().unwrap_err()
        {
            ApodError::Transport{..} => {},
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_malformed_payload_is_decode_error()
    {
        let (mut client, _log, _clock) = client(None, vec![status(200, "[not json")]);

        match client.fetch_latest().unwrap_err()
        {
            ApodError::Decode{..} => {},
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_health_check_reports_and_never_mutates()
    {
        let (mut client, log, _clock) = client(Some("personal-key-1234"), vec![
            throttled(None),
            status(403, r#"{"error":{"message":"An invalid api_key was supplied."}}"#),
            status(403, ""),
            status(500, ""),
            ok(record("2023-01-01", "image")),
        ]);

        let health = client.check_credential_health();
        assert!(!health.working);
        assert_eq!(health.reason.as_deref(), Some("Unexpected error: Too Many Requests"));

        let health = client.check_credential_health();
        assert_eq!(health, CredentialHealth
        {
            working: false,
            using_default: false,
            reason: Some("An invalid api_key was supplied.".to_owned()),
        });

        let health = client.check_credential_health();
        assert_eq!(health.reason.as_deref(), Some("Invalid or unauthorized API key"));

        let health = client.check_credential_health();
        assert_eq!(health.reason.as_deref(), Some("Unexpected error: Internal Server Error"));

        let health = client.check_credential_health();
        assert_eq!(health, CredentialHealth { working: true, using_default: false, reason: None });

        // One request each, no fallback retries, no throttle recorded
        assert_eq!(log.len(), 5);
        assert!(log.urls().iter().all(|u| u.contains("api_key=personal-key-1234&date=2023-01-01")));
        assert!(!client.credentials().is_using_fallback());
        assert!(client.credentials().throttled_until().is_none());
    }

    #[test]
    fn test_health_check_uses_configured_key_after_fallback()
    {
        let (mut client, log, _clock) = client(Some("personal-key-1234"), vec![
            status(403, r#"{"error":{"code":"API_KEY_INVALID","message":"An invalid api_key was supplied."}}"#),
            ok(record("2024-03-20", "image")),
            status(403, r#"{"error":{"code":"API_KEY_INVALID","message":"An invalid api_key was supplied."}}"#),
        ]);

        client.fetch_one(Some("2024-03-20")).unwrap();
        assert!(client.credentials().is_using_fallback());

        let health = client.check_credential_health();

        assert_eq!(health, CredentialHealth
        {
            working: false,
            using_default: false,
            reason: Some("An invalid api_key was supplied.".to_owned()),
        });
        assert_eq!(log.urls()[2], "https://api.example.test/apod?api_key=personal-key-1234&date=2023-01-01");
        assert!(client.credentials().is_using_fallback());
    }

    #[test]
    fn test_health_check_ignores_throttle_window()
    {
        let mut credentials = CredentialState::new(None);
        credentials.record_throttle(at(13, 0));

        let log = RequestLog::default();
        let clock = ManualClock::starting_at(at(12, 0));
        let mut client = ApodClient::with_parts(
            endpoint(),
            credentials,
            ScriptedTransport::new(vec![status(503, ""), ok(record("2023-01-01", "image"))], log.clone()),
            clock);

        let health = client.check_credential_health();
        assert!(health.using_default);
        assert!(!health.working);

        assert!(client.check_credential_health().working);
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn test_health_check_transport_failure()
    {
        let (mut client, _log, _clock) = client(None, vec![Err(transport_error())]);

        let health = client.check_credential_health();

        assert!(!health.working);
        assert!(health.using_default);
        assert!(health.reason.unwrap().starts_with("curl error"));
    }
}
