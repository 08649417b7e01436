use actix_web::{web, HttpRequest, HttpResponse};
use chrono::NaiveDate;
use horrorshow::{owned_html, Template};

use apod::dates::{parse_date, DateBounds};
use apod::{MediaKind, PictureRecord};

use crate::format;
use crate::icons::Icon;
use crate::pages::{self, PageResources, PageResourcesBuilder};
use crate::pages::templates::picture;
use crate::view;
use crate::State;

#[allow(dead_code)]
pub struct DetailsPage
{
}

impl DetailsPage
{
    pub fn path_for(date: &NaiveDate) -> String
    {
        format!("/apod/{}", date.format("%Y-%m-%d"))
    }
}

impl PageResources for DetailsPage
{
    fn page_resources(builder: &mut PageResourcesBuilder)
    {
        builder
            .route_view("/apod/{date}", web::get().to(get_details));
    }
}

/// Neighbouring days that can still be asked for.
fn day_links(date: NaiveDate, bounds: &DateBounds) -> (Option<NaiveDate>, Option<NaiveDate>)
{
    let prev = date.pred_opt().filter(|d| bounds.contains(*d));
    let next = date.succ_opt().filter(|d| bounds.contains(*d));

    (prev, next)
}

fn media_kind_str(kind: MediaKind) -> &'static str
{
    match kind
    {
        MediaKind::Image => "Image",
        MediaKind::Video => "Video",
        MediaKind::Other => "Other",
    }
}

/// The HD image when there is one, else the regular image.
fn full_size_url(record: &PictureRecord) -> Option<String>
{
    record.high_definition_url.clone()
        .or_else(|| if record.is_image() { record.display_url.clone() } else { None })
}

async fn get_details(state: web::Data<State>, date: web::Path<String>, req: HttpRequest) -> Result<HttpResponse, view::ErrorResponder>
{
    let requested = match parse_date(&date)
    {
        Some(d) => d,
        None => return Ok(view::err(HttpResponse::NotFound(), "Picture not found")),
    };

    let bounds = DateBounds::as_of(pages::today());

    if !bounds.contains(requested)
    {
        return Ok(view::redirect(DetailsPage::path_for(&bounds.clamp(requested))));
    }

    let client = state.client.clone();

    let record = web::block(move ||
    {
        client.lock().unwrap().fetch_one(Some(&requested))
    }).await?;

    let contents = render_details(&record, &bounds);

    Ok(view::html_page(&req, &state, &record.title, Icon::Telescope, &contents))
}

fn render_details(record: &PictureRecord, bounds: &DateBounds) -> String
{
    let (prev, next) = day_links(record.date, bounds);
    let full_size = full_size_url(record);
    let record = record.clone();

    owned_html!
    {
        p(class="date"): format::date_to_str(&record.date);

        : picture::render_media(&record, full_size.clone());
        : picture::render_attribution(&record);

        p(class="explanation"): &record.explanation;

        table(class="details")
        {
            tr
            {
                td: "Date";
                td: record.date.to_string();
            }
            tr
            {
                td: "Media";
                td: media_kind_str(record.media_kind);
            }
            @if let Some(hd) = &full_size
            {
                tr
                {
                    td: "High resolution";
                    td
                    {
                        a(href=hd): "Full size image";
                    }
                }
            }
            @if let Some(version) = &record.service_version
            {
                tr
                {
                    td: "Service version";
                    td: version;
                }
            }
        }

        div(class="day-links")
        {
            @if let Some(prev) = prev
            {
                a(href=DetailsPage::path_for(&prev)): "\u{2190} Previous day";
            }
            @if let Some(next) = next
            {
                a(href=DetailsPage::path_for(&next)): "Next day \u{2192}";
            }
            a(href=record.permalink()): "View on apod.nasa.gov";
            a(href=pages::gallery::GalleryPage::path_for(Some(record.date))): "Gallery from this day";
        }
    }.into_string().unwrap()
}
