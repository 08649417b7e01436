use chrono::{DateTime, Duration, NaiveDate};
use tracing::warn;

/// The first day the service published a picture.
pub fn first_published() -> NaiveDate
{
    NaiveDate::from_ymd_opt(1995, 6, 16).expect("first APOD date is a valid date")
}

/// The interval of dates the service can answer for:
/// from the first published day up to and including "today".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateBounds
{
    first: NaiveDate,
    last: NaiveDate,
}

impl DateBounds
{
    pub fn as_of(today: NaiveDate) -> Self
    {
        let first = first_published();
        let last = if today < first { first } else { today };

        DateBounds { first, last }
    }

    pub fn first(&self) -> NaiveDate
    {
        self.first
    }

    pub fn last(&self) -> NaiveDate
    {
        self.last
    }

    pub fn contains(&self, date: NaiveDate) -> bool
    {
        (date >= self.first) && (date <= self.last)
    }

    /// Substitutes the nearest bound for any date outside the interval.
    pub fn clamp(&self, date: NaiveDate) -> NaiveDate
    {
        if date < self.first
        {
            warn!("Date {} is before APOD start date, using {}", date, self.first);
            self.first
        }
        else if date > self.last
        {
            warn!("Date {} is after current date, using {}", date, self.last);
            self.last
        }
        else
        {
            date
        }
    }

    /// Like `clamp`, but for user supplied text. Text that isn't
    /// a date at all resolves to the most recent day.
    pub fn clamp_str(&self, s: &str) -> NaiveDate
    {
        match parse_date(s)
        {
            Some(date) => self.clamp(date),
            None =>
            {
                warn!("Date {:?} could not be parsed, using {}", s, self.last);
                self.last
            },
        }
    }

    /// The `days` long window that ends on `end`, cut short at the first published day.
    pub fn window_ending(&self, end: NaiveDate, days: u32) -> (NaiveDate, NaiveDate)
    {
        let end = self.clamp(end);
        let span = Duration::days(i64::from(days.max(1)) - 1);

        let start = end
            .checked_sub_signed(span)
            .unwrap_or(self.first);

        (if start < self.first { self.first } else { start }, end)
    }
}

/// Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp.
pub fn parse_date(s: &str) -> Option<NaiveDate>
{
    let s = s.trim();

    if let Ok(date) = s.parse::<NaiveDate>()
    {
        return Some(date);
    }

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(s)
    {
        return Some(timestamp.naive_local().date());
    }

    None
}

/// Anything that can be turned into an in-range request date.
pub trait CandidateDate
{
    fn resolve(&self, bounds: &DateBounds) -> NaiveDate;
}

impl CandidateDate for NaiveDate
{
    fn resolve(&self, bounds: &DateBounds) -> NaiveDate
    {
        bounds.clamp(*self)
    }
}

impl CandidateDate for str
{
    fn resolve(&self, bounds: &DateBounds) -> NaiveDate
    {
        bounds.clamp_str(self)
    }
}

impl CandidateDate for String
{
    fn resolve(&self, bounds: &DateBounds) -> NaiveDate
    {
        bounds.clamp_str(self)
    }
}
