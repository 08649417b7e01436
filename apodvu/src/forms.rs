use chrono::NaiveDate;
use serde::Deserialize;

#[derive(Deserialize, Debug, Default)]
pub struct DateQuery
{
    pub date: Option<String>,
}

impl DateQuery
{
    /// Blank values are treated as absent.
    pub fn text(&self) -> Option<&str>
    {
        self.date
            .as_deref()
            .map(|d| d.trim())
            .filter(|d| !d.is_empty())
    }

    pub fn parsed(&self) -> Option<NaiveDate>
    {
        self.text().and_then(apod::dates::parse_date)
    }
}
