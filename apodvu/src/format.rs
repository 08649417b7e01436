use std::time::Duration;
use chrono::NaiveDate;

/// "March 20, 2024"
pub fn date_to_str(date: &NaiveDate) -> String
{
    date.format("%B %-d, %Y").to_string()
}

/// "Mar 20, 2024"
pub fn date_to_short_str(date: &NaiveDate) -> String
{
    date.format("%b %-d, %Y").to_string()
}

pub fn wait_to_str(wait: Duration) -> String
{
    let minutes = (wait.as_secs() + 59) / 60;

    if minutes <= 1
    {
        "a minute".to_owned()
    }
    else if minutes < 90
    {
        format!("{} minutes", minutes)
    }
    else
    {
        format!("{} hours", (minutes + 30) / 60)
    }
}

/// The first paragraph worth of text, cut at a word boundary.
pub fn summary(text: &str, max_chars: usize) -> String
{
    let text = text.trim();

    if text.chars().count() <= max_chars
    {
        return text.to_owned();
    }

    let cut = text.char_indices()
        .nth(max_chars)
        .map(|(i, _)| i)
        .unwrap_or(text.len());

    let head = &text[..cut];
    let head = match head.rfind(char::is_whitespace)
    {
        Some(space) => &head[..space],
        None => head,
    };

    format!("{}...", head.trim_end_matches(|c: char| c.is_whitespace() || c == ',' || c == '.'))
}
