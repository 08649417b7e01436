use std::collections::HashSet;
use chrono::NaiveDate;
use snafu::Snafu;
use tracing::{debug, warn};

use crate::api::raw::Transport;
use crate::api::{ApodError, PictureRecord};
use crate::client::{ApodClient, Clock};
use crate::dates::{first_published, DateBounds};

/// Days covered by each window.
pub const DEFAULT_WINDOW_DAYS: u32 = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GalleryState
{
    Initial,
    Loading,
    HasMore,
    Exhausted,
    Failed,
}

/// A window handed out by `begin_window`. It must be given back to
/// `complete_window` together with the fetch result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowRequest
{
    generation: u64,
    start: NaiveDate,
    end: NaiveDate,
}

impl WindowRequest
{
    pub fn generation(&self) -> u64
    {
        self.generation
    }

    pub fn start(&self) -> NaiveDate
    {
        self.start
    }

    pub fn end(&self) -> NaiveDate
    {
        self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowOutcome
{
    pub added: usize,
    pub has_more: bool,
}

#[derive(Debug, Snafu)]
pub enum GalleryError
{
    #[snafu(display("A gallery window is already loading"))]
    Busy,
    #[snafu(display("No earlier pictures are available"))]
    Exhausted,
    #[snafu(display("Gallery response belongs to an abandoned session"))]
    Stale,
    #[snafu(display("Failed to fetch astronomy pictures: {}", message))]
    Failed{ message: String },
}

/// Backward-chronological, de-duplicated stream of image pictures,
/// fetched one window of days at a time.
#[derive(Debug)]
pub struct GalleryLoader
{
    anchor: Option<NaiveDate>,
    window_days: u32,
    records: Vec<PictureRecord>,
    dates: HashSet<NaiveDate>,
    state: GalleryState,
    error: Option<ApodError>,
    generation: u64,
    pending: Option<WindowRequest>,
    failed: Option<WindowRequest>,
    reached_first_day: bool,
}

impl GalleryLoader
{
    pub fn new(anchor: Option<NaiveDate>, window_days: u32) -> Self
    {
        GalleryLoader
        {
            anchor,
            window_days: window_days.max(1),
            records: Vec::new(),
            dates: HashSet::new(),
            state: GalleryState::Initial,
            error: None,
            generation: 0,
            pending: None,
            failed: None,
            reached_first_day: false,
        }
    }

    /// Drops everything held and starts over. Windows handed out before
    /// the reset are rejected as stale when they complete.
    pub fn reset(&mut self, anchor: Option<NaiveDate>)
    {
        self.anchor = anchor;
        self.records.clear();
        self.dates.clear();
        self.state = GalleryState::Initial;
        self.error = None;
        self.generation += 1;
        self.pending = None;
        self.failed = None;
        self.reached_first_day = false;
    }

    pub fn anchor(&self) -> Option<NaiveDate>
    {
        self.anchor
    }

    pub fn window_days(&self) -> u32
    {
        self.window_days
    }

    pub fn generation(&self) -> u64
    {
        self.generation
    }

    pub fn state(&self) -> GalleryState
    {
        self.state
    }

    /// Newest first, no two with the same date.
    pub fn records(&self) -> &[PictureRecord]
    {
        &self.records
    }

    pub fn last_error(&self) -> Option<&ApodError>
    {
        self.error.as_ref()
    }

    pub fn has_more(&self) -> bool
    {
        self.state != GalleryState::Exhausted
    }

    pub fn is_loading(&self) -> bool
    {
        self.state == GalleryState::Loading
    }

    /// True once the stream has run back to the first published day,
    /// as opposed to stopping on a short window.
    pub fn reached_first_day(&self) -> bool
    {
        self.reached_first_day
    }

    /// Claims the next window. Only one window can be outstanding;
    /// after a failure the same window is handed out again.
    pub fn begin_window(&mut self, today: NaiveDate) -> Result<WindowRequest, GalleryError>
    {
        match self.state
        {
            GalleryState::Loading => return Err(GalleryError::Busy),
            GalleryState::Exhausted => return Err(GalleryError::Exhausted),
            _ => {},
        }

        let request = match (self.state, self.failed)
        {
            (GalleryState::Failed, Some(failed)) => failed,
            _ =>
            {
                let bounds = DateBounds::as_of(today);

                let end = match self.records.last()
                {
                    Some(oldest) => oldest.date.pred_opt(),
                    None => Some(bounds.clamp(self.anchor.unwrap_or(today))),
                };

                let end = match end
                {
                    Some(end) if end >= bounds.first() => end,
                    _ =>
                    {
                        self.state = GalleryState::Exhausted;
                        self.reached_first_day = true;
                        return Err(GalleryError::Exhausted);
                    },
                };

                let (start, end) = bounds.window_ending(end, self.window_days);

                WindowRequest { generation: self.generation, start, end }
            },
        };

        debug!("Gallery window {} to {}", request.start, request.end);

        self.state = GalleryState::Loading;
        self.pending = Some(request);

        Ok(request)
    }

    /// Folds the result of a window fetch into the gallery.
    pub fn complete_window(&mut self, request: WindowRequest, result: Result<Vec<PictureRecord>, ApodError>) -> Result<WindowOutcome, GalleryError>
    {
        if self.pending != Some(request)
        {
            debug!("Discarding gallery window {} to {} from generation {}", request.start, request.end, request.generation);
            return Err(GalleryError::Stale);
        }

        self.pending = None;

        let fetched = match result
        {
            Ok(fetched) => fetched,
            Err(err) =>
            {
                warn!("Error fetching APODs: {}", err);

                let message = err.to_string();

                self.error = Some(err);
                self.failed = Some(request);
                self.state = GalleryState::Failed;

                return Err(GalleryError::Failed{ message });
            },
        };

        self.error = None;
        self.failed = None;

        let images = fetched
            .into_iter()
            .filter(|r| r.is_image())
            .collect::<Vec<_>>();

        let image_count = images.len();
        let oldest_fetched = images.iter().map(|r| r.date).min();

        let mut added = 0;

        for record in images
        {
            if self.dates.insert(record.date)
            {
                self.records.push(record);
                added += 1;
            }
        }

        self.records.sort_by(|a, b| b.date.cmp(&a.date));

        let floor = first_published();
        let reached_floor = (request.start <= floor)
            || oldest_fetched.map_or(false, |d| d <= floor);

        let has_more = (image_count >= self.window_days as usize) && !reached_floor;

        self.reached_first_day = reached_floor;

        self.state = if has_more { GalleryState::HasMore } else { GalleryState::Exhausted };

        Ok(WindowOutcome { added, has_more })
    }

    /// Gives back a window whose fetch never produced a result, so
    /// the same window can be claimed again.
    pub fn abandon_window(&mut self, request: WindowRequest) -> bool
    {
        if self.pending != Some(request)
        {
            return false;
        }

        self.pending = None;

        self.state = if self.failed.is_some()
        {
            GalleryState::Failed
        }
        else if self.records.is_empty()
        {
            GalleryState::Initial
        }
        else
        {
            GalleryState::HasMore
        };

        true
    }

    /// Fetches the next window with `client` and folds it in.
    pub fn load_next<T, C>(&mut self, client: &mut ApodClient<T, C>) -> Result<WindowOutcome, GalleryError>
        where T: Transport,
            C: Clock
    {
        let request = self.begin_window(client.today())?;

        let result = client.fetch_range(&request.start(), &request.end());

        self.complete_window(request, result)
    }
}

impl Default for GalleryLoader
{
    fn default() -> Self
    {
        GalleryLoader::new(None, DEFAULT_WINDOW_DAYS)
    }
}
