use chrono::NaiveDate;
use curl::easy::{Easy, List};
use url::Url;

use crate::credential::ApiKey;
use super::msgs::ErrorBody;
use super::ApodError;

/// The two query shapes the APOD endpoint understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Query
{
    Single(Option<NaiveDate>),
    Range{ start: NaiveDate, end: NaiveDate },
}

impl Query
{
    pub fn to_url(&self, endpoint: &Url, api_key: &ApiKey) -> Url
    {
        let mut url = endpoint.clone();

        url.query_pairs_mut().append_pair("api_key", api_key.secret());

        match self
        {
            Query::Single(None) => {},
            Query::Single(Some(date)) =>
            {
                url.query_pairs_mut().append_pair("date", &format_date(date));
            },
            Query::Range{start, end} =>
            {
                url.query_pairs_mut()
                    .append_pair("start_date", &format_date(start))
                    .append_pair("end_date", &format_date(end));
            },
        }

        url
    }
}

fn format_date(date: &NaiveDate) -> String
{
    date.format("%Y-%m-%d").to_string()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse
{
    pub status: u32,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl RawResponse
{
    pub fn is_success(&self) -> bool
    {
        (200..300).contains(&self.status)
    }

    pub fn is_auth_failure(&self) -> bool
    {
        self.status == 401 || self.status == 403
    }

    pub fn header(&self, name: &str) -> Option<&str>
    {
        self.headers
            .iter()
            .rev()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// The message the service put in a JSON error body, if any.
    pub fn json_error_message(&self) -> Option<String>
    {
        serde_json::from_slice::<ErrorBody>(&self.body)
            .ok()
            .and_then(|b| b.message())
    }

    /// Best-effort human readable reason for a failed response.
    pub fn error_message(&self) -> String
    {
        if let Some(msg) = self.json_error_message()
        {
            return msg;
        }

        let text = String::from_utf8_lossy(&self.body);
        let text = text.trim();

        if !text.is_empty() && !text.starts_with('<')
        {
            return text.chars().take(200).collect();
        }

        status_text(self.status).to_owned()
    }
}

pub fn status_text(status: u32) -> &'static str
{
    match status
    {
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        _ => "Unknown error",
    }
}

/// Issues one GET request. The client owns its transport, so a
/// transport never sees two requests at once.
pub trait Transport
{
    fn get(&mut self, url: &Url) -> Result<RawResponse, ApodError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CurlTransport;

impl Transport for CurlTransport
{
    fn get(&mut self, url: &Url) -> Result<RawResponse, ApodError>
    {
        let mut list = List::new();
        list.append("Accept: application/json")?;

        let mut body = Vec::new();
        let mut headers = Vec::new();
        let mut handle = Easy::new();
        handle.url(url.as_str())?;
        handle.http_headers(list)?;
        {
            let mut transfer = handle.transfer();
            transfer.write_function(|new_data| {
                body.extend_from_slice(new_data);
                Ok(new_data.len())
            })?;
            transfer.header_function(|line| {
                if let Some(header) = parse_header_line(line)
                {
                    headers.push(header);
                }
                true
            })?;
            transfer.perform()?;
        }

        let status = handle.response_code()?;

        Ok(RawResponse{ status, headers, body })
    }
}

fn parse_header_line(line: &[u8]) -> Option<(String, String)>
{
    let line = std::str::from_utf8(line).ok()?;
    let colon = line.find(':')?;

    let name = line[..colon].trim();
    let value = line[(colon + 1)..].trim();

    if name.is_empty()
    {
        return None;
    }

    Some((name.to_owned(), value.to_owned()))
}
