use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

/// One day's published entry, as returned by the APOD service.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct PictureRecord
{
    pub date: NaiveDate,
    pub title: String,
    #[serde(default)]
    pub explanation: String,
    #[serde(rename = "media_type", default)]
    pub media_kind: MediaKind,
    #[serde(rename = "url", default)]
    pub display_url: Option<String>,
    #[serde(rename = "hdurl", default)]
    pub high_definition_url: Option<String>,
    #[serde(rename = "copyright", default, deserialize_with = "trimmed_text")]
    pub attribution: Option<String>,
    #[serde(default)]
    pub service_version: Option<String>,
}

impl PictureRecord
{
    pub fn is_image(&self) -> bool
    {
        self.media_kind == MediaKind::Image
    }

    /// The page for this date on apod.nasa.gov
    pub fn permalink(&self) -> String
    {
        format!("https://apod.nasa.gov/apod/ap{}.html", self.date.format("%y%m%d"))
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(from = "String", into = "String")]
pub enum MediaKind
{
    Image,
    Video,
    Other,
}

impl Default for MediaKind
{
    fn default() -> Self
    {
        MediaKind::Other
    }
}

impl From<String> for MediaKind
{
    fn from(s: String) -> Self
    {
        match s.as_str()
        {
            "image" => MediaKind::Image,
            "video" => MediaKind::Video,
            _ => MediaKind::Other,
        }
    }
}

impl From<MediaKind> for String
{
    fn from(kind: MediaKind) -> Self
    {
        match kind
        {
            MediaKind::Image => "image".to_owned(),
            MediaKind::Video => "video".to_owned(),
            MediaKind::Other => "other".to_owned(),
        }
    }
}

// A date range normally comes back as an array, but the service
// answers a one-day range with a bare object.
#[derive(Deserialize, Debug)]
#[serde(untagged)]
pub(crate) enum OneOrMany
{
    Many(Vec<PictureRecord>),
    One(PictureRecord),
}

impl OneOrMany
{
    pub(crate) fn into_vec(self) -> Vec<PictureRecord>
    {
        match self
        {
            OneOrMany::Many(records) => records,
            OneOrMany::One(record) => vec![record],
        }
    }
}

#[derive(Deserialize, Debug, Default)]
pub(crate) struct ErrorBody
{
    pub error: Option<ErrorDetail>,
    pub msg: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(untagged)]
pub(crate) enum ErrorDetail
{
    Structured{ message: Option<String> },
    Text(String),
}

impl ErrorBody
{
    pub(crate) fn message(self) -> Option<String>
    {
        let from_error = match self.error
        {
            Some(ErrorDetail::Structured{message}) => message,
            Some(ErrorDetail::Text(text)) => Some(text),
            None => None,
        };

        from_error
            .or(self.msg)
            .filter(|m| !m.trim().is_empty())
    }
}

fn trimmed_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where D: Deserializer<'de>
{
    let text = Option::<String>::deserialize(deserializer)?;

    Ok(text
        .map(|t| t.trim().to_owned())
        .filter(|t| !t.is_empty()))
}
