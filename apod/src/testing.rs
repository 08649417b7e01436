use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::{json, Value};
use url::Url;

use crate::api::raw::{RawResponse, Transport};
use crate::api::ApodError;
use crate::client::{ApodClient, Clock};
use crate::credential::CredentialState;

pub type TestClient = ApodClient<ScriptedTransport, ManualClock>;

/// A time on 2024-03-20, the "today" of every test.
pub fn at(hour: u32, minute: u32) -> DateTime<Utc>
{
    Utc.with_ymd_and_hms(2024, 3, 20, hour, minute, 0).unwrap()
}

pub fn endpoint() -> Url
{
    "https://api.example.test/apod".parse().unwrap()
}

#[derive(Clone, Default)]
pub struct RequestLog
{
    urls: Rc<RefCell<Vec<String>>>,
}

impl RequestLog
{
    pub fn urls(&self) -> Vec<String>
    {
        self.urls.borrow().clone()
    }

    pub fn len(&self) -> usize
    {
        self.urls.borrow().len()
    }
}

/// Replays canned responses in order and remembers every URL asked for.
pub struct ScriptedTransport
{
    responses: VecDeque<Result<RawResponse, ApodError>>,
    log: RequestLog,
}

impl ScriptedTransport
{
    pub fn new(responses: Vec<Result<RawResponse, ApodError>>, log: RequestLog) -> Self
    {
        ScriptedTransport
        {
            responses: responses.into_iter().collect(),
            log,
        }
    }
}

impl Transport for ScriptedTransport
{
    fn get(&mut self, url: &Url) -> Result<RawResponse, ApodError>
    {
        self.log.urls.borrow_mut().push(url.to_string());

        match self.responses.pop_front()
        {
            Some(response) => response,
            None => panic!("unexpected request {}", url),
        }
    }
}

#[derive(Clone)]
pub struct ManualClock
{
    now: Rc<Cell<DateTime<Utc>>>,
}

impl ManualClock
{
    pub fn starting_at(now: DateTime<Utc>) -> Self
    {
        ManualClock { now: Rc::new(Cell::new(now)) }
    }

    pub fn advance(&self, by: Duration)
    {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock
{
    fn now(&self) -> DateTime<Utc>
    {
        self.now.get()
    }
}

pub fn client(key: Option<&str>, responses: Vec<Result<RawResponse, ApodError>>) -> (TestClient, RequestLog, ManualClock)
{
    let log = RequestLog::default();
    let clock = ManualClock::starting_at(at(12, 0));

    let client = ApodClient::with_parts(
        endpoint(),
        CredentialState::new(key.map(|k| k.to_owned())),
        ScriptedTransport::new(responses, log.clone()),
        clock.clone());

    (client, log, clock)
}

pub fn record(date: &str, media_type: &str) -> Value
{
    json!({
        "date": date,
        "title": format!("Picture of {}", date),
        "explanation": "Somewhere in the sky.",
        "media_type": media_type,
        "url": format!("https://apod.nasa.gov/apod/image/{}.jpg", date),
        "service_version": "v1"
    })
}

pub fn records(entries: &[(&str, &str)]) -> Value
{
    Value::Array(entries
        .iter()
        .map(|(date, media_type)| record(date, media_type))
        .collect())
}

pub fn status(code: u32, body: &str) -> Result<RawResponse, ApodError>
{
    Ok(RawResponse
    {
        status: code,
        headers: vec![("Content-Type".to_owned(), "application/json".to_owned())],
        body: body.as_bytes().to_vec(),
    })
}

pub fn ok(body: Value) -> Result<RawResponse, ApodError>
{
    status(200, &body.to_string())
}

pub fn throttled(reset_epoch_secs: Option<i64>) -> Result<RawResponse, ApodError>
{
    let mut headers = Vec::new();

    if let Some(reset) = reset_epoch_secs
    {
        headers.push(("x-ratelimit-reset".to_owned(), reset.to_string()));
    }

    Ok(RawResponse { status: 429, headers, body: Vec::new() })
}

pub fn transport_error() -> ApodError
{
    // CURLE_COULDNT_CONNECT
    curl::Error::new(7).into()
}
