use actix_web::{web, HttpRequest, HttpResponse};
use actix_web::error::BlockingError;
use actix_web::http::StatusCode;
use chrono::NaiveDate;
use horrorshow::{owned_html, Raw, Template};
use serde::Deserialize;
use tracing::{debug, info};

use apod::dates::parse_date;
use apod::{ApodError, GalleryError, GalleryLoader, GalleryState, PictureRecord, WindowRequest};

use crate::forms::DateQuery;
use crate::format;
use crate::icons::{Icon, IconSize};
use crate::pages::{self, PageResources, PageResourcesBuilder};
use crate::pages::templates::picture;
use crate::view;
use crate::State;

#[allow(dead_code)]
pub struct GalleryPage
{
}

impl GalleryPage
{
    pub fn path_for(anchor: Option<NaiveDate>) -> String
    {
        match anchor
        {
            Some(date) => format!("/gallery?date={}", date.format("%Y-%m-%d")),
            None => "/gallery".to_owned(),
        }
    }

    pub fn more_path() -> String
    {
        "/gallery/more".to_owned()
    }
}

impl PageResources for GalleryPage
{
    fn page_resources(builder: &mut PageResourcesBuilder)
    {
        builder
            .add_header_link("/gallery", "Gallery", Icon::Images, 200)
            .route_view("/gallery", web::get().to(get_gallery))
            .route_other("/gallery/more", web::post().to(post_more));
    }
}

/// Posted by the "Load more" and "Try again" buttons. Carries the
/// session the page was rendered from.
#[derive(Deserialize, Debug)]
pub struct MoreForm
{
    pub generation: u64,
    pub date: Option<String>,
}

impl MoreForm
{
    pub fn anchor(&self) -> Option<NaiveDate>
    {
        self.date.as_deref().and_then(parse_date)
    }
}

async fn get_gallery(state: web::Data<State>, query: web::Query<DateQuery>, req: HttpRequest) -> Result<HttpResponse, view::ErrorResponder>
{
    let anchor = query.parsed();

    let needs_first_window =
    {
        let mut gallery = state.gallery.lock().unwrap();

        if gallery.anchor() != anchor
        {
            info!("Starting new gallery session at {:?}", anchor);
            gallery.reset(anchor);
        }

        gallery.state() == GalleryState::Initial
    };

    if needs_first_window
    {
        load_window(&state, None).await?;
    }

    let contents =
    {
        let gallery = state.gallery.lock().unwrap();

        render_gallery(&gallery)
    };

    Ok(view::html_page(&req, &state, "Gallery", Icon::Images, &contents))
}

async fn post_more(state: web::Data<State>, form: web::Form<MoreForm>) -> Result<HttpResponse, view::ErrorResponder>
{
    load_window(&state, Some(form.generation)).await?;

    Ok(view::redirect(GalleryPage::path_for(form.anchor())))
}

/// Claims the next window, fetches it on a worker thread with the
/// gallery unlocked, and folds the answer back in. Fetch failures are
/// kept by the loader and shown on the page rather than returned here.
async fn load_window(state: &State, generation: Option<u64>) -> Result<(), view::ErrorResponder>
{
    let request =
    {
        let mut gallery = state.gallery.lock().unwrap();

        match claim_window(&mut gallery, generation, pages::today())
        {
            Some(request) => request,
            None => return Ok(()),
        }
    };

    let client = state.client.clone();

    let result = web::block(move || -> Result<Result<Vec<PictureRecord>, ApodError>, ApodError>
    {
        Ok(client.lock().unwrap().fetch_range(&request.start(), &request.end()))
    }).await;

    let mut gallery = state.gallery.lock().unwrap();

    finish_window(&mut gallery, request, result)
}

/// Hands out the next window, unless the page asking for it was
/// rendered from a session that has since been replaced.
fn claim_window(gallery: &mut GalleryLoader, generation: Option<u64>, today: NaiveDate) -> Option<WindowRequest>
{
    if let Some(generation) = generation
    {
        if generation != gallery.generation()
        {
            info!("Ignoring load for gallery session {}, current is {}", generation, gallery.generation());
            return None;
        }
    }

    match gallery.begin_window(today)
    {
        Ok(request) => Some(request),
        Err(err) =>
        {
            debug!("Not loading gallery window: {}", err);
            None
        },
    }
}

fn finish_window(gallery: &mut GalleryLoader, request: WindowRequest, result: Result<Result<Vec<PictureRecord>, ApodError>, BlockingError<ApodError>>) -> Result<(), view::ErrorResponder>
{
    match result
    {
        Ok(fetched) =>
        {
            match gallery.complete_window(request, fetched)
            {
                Ok(outcome) =>
                {
                    debug!("Gallery window added {} pictures, more: {}", outcome.added, outcome.has_more);
                    Ok(())
                },
                Err(GalleryError::Failed{..})
                    | Err(GalleryError::Stale) => Ok(()),
                Err(err) => Err(err.into()),
            }
        },
        Err(BlockingError::Error(err)) =>
        {
            gallery.abandon_window(request);
            Err(err.into())
        },
        Err(BlockingError::Canceled) =>
        {
            gallery.abandon_window(request);
            Err(view::ErrorResponder::new(StatusCode::INTERNAL_SERVER_ERROR, "Gallery request was cancelled"))
        },
    }
}

fn more_form(label: &'static str, generation: u64, anchor: Option<NaiveDate>) -> Raw<String>
{
    let date = anchor.map(|d| d.format("%Y-%m-%d").to_string());

    let html = owned_html!
    {
        form(method="POST", action=GalleryPage::more_path(), class="load-more")
        {
            input(type="hidden", name="generation", value=generation.to_string());
            @if let Some(date) = &date
            {
                input(type="hidden", name="date", value=date);
            }
            input(type="submit", value=label);
        }
    }.into_string().unwrap();

    Raw(html)
}

fn render_gallery(gallery: &GalleryLoader) -> String
{
    let records = gallery.records().to_vec();
    let state = gallery.state();
    let anchor = gallery.anchor();
    let error = gallery.last_error().map(|e| e.to_string());
    let wait = gallery.last_error().and_then(|e| e.retry_after()).map(format::wait_to_str);
    let at_beginning = gallery.reached_first_day();
    let generation = gallery.generation();

    owned_html!
    {
        @if let Some(anchor) = anchor
        {
            h2
            {
                : Icon::Calendar.render(IconSize::Size16x16);
                : format!(" Pictures up to {}", format::date_to_str(&anchor));
            }
        }

        @if records.is_empty() && (state == GalleryState::Exhausted)
        {
            div(class="notice")
            {
                @if let Some(anchor) = anchor
                {
                    p: format!("No astronomy pictures available for {}.", format::date_to_str(&anchor));
                }
                else
                {
                    p: "No images found.";
                }
                a(href=GalleryPage::path_for(None)): "View recent pictures";
            }
        }
        else
        {
            div(class="gallery")
            {
                @for record in records.iter()
                {
                    : picture::render_card(record);
                }
            }
        }

        @if state == GalleryState::Failed
        {
            div(class="notice")
            {
                p(class="error-message")
                {
                    : Icon::Warning.render(IconSize::Size16x16);
                    : " ";
                    : error.clone().unwrap_or_else(|| "Failed to fetch astronomy pictures".to_owned());
                }
                @if let Some(wait) = &wait
                {
                    p: format!("Try again in {}.", wait);
                }
                : more_form("Try again", generation, anchor);
            }
        }

        @if (state == GalleryState::HasMore) || (state == GalleryState::Initial)
        {
            : more_form("Load more", generation, anchor);
        }

        @if state == GalleryState::Loading
        {
            p(class="notice")
            {
                : Icon::Hourglass.render(IconSize::Size16x16);
                : " Loading more pictures...";
            }
        }

        @if (state == GalleryState::Exhausted) && !records.is_empty()
        {
            p(class="notice")
            {
                @if at_beginning
                {
                    : "You've reached the beginning. These are the earliest astronomy pictures available (since June 16, 1995).";
                }
                else
                {
                    : "No more pictures to load.";
                }
            }
        }
    }.into_string().unwrap()
}
