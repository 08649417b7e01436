use actix_web::{web, HttpRequest, HttpResponse};
use horrorshow::{owned_html, Template};
use tracing::warn;

use apod::dates::first_published;
use apod::PictureRecord;

use crate::forms::DateQuery;
use crate::format;
use crate::icons::{Icon, IconSize};
use crate::pages::{self, PageResources, PageResourcesBuilder};
use crate::pages::details::DetailsPage;
use crate::pages::gallery::GalleryPage;
use crate::pages::templates::picture;
use crate::view;
use crate::State;

#[allow(dead_code)]
pub struct HeroPage
{
}

impl HeroPage
{
    pub fn path() -> String
    {
        "/".to_owned()
    }
}

impl PageResources for HeroPage
{
    fn page_resources(builder: &mut PageResourcesBuilder)
    {
        builder
            .add_header_link("/", "Today", Icon::Telescope, 100)
            .route_view("/", web::get().to(get_hero));
    }
}

async fn get_hero(state: web::Data<State>, query: web::Query<DateQuery>, req: HttpRequest) -> Result<HttpResponse, view::ErrorResponder>
{
    if let Err(err) = pages::status::ensure_checked(&state).await
    {
        warn!("Could not check NASA API key: {}", err);
    }

    let client = state.client.clone();
    let date = query.text().map(|d| d.to_owned());

    let record = web::block(move ||
    {
        client.lock().unwrap().fetch_one(date.as_ref())
    }).await?;

    let contents = render_hero(&record);

    Ok(view::html_page(&req, &state, "Astronomy Picture of the Day", Icon::Telescope, &contents))
}

fn render_hero(record: &PictureRecord) -> String
{
    let record = record.clone();
    let details = DetailsPage::path_for(&record.date);
    let today = pages::today();

    owned_html!
    {
        h2: &record.title;
        p(class="date"): format::date_to_str(&record.date);

        : picture::render_media(&record, Some(details.clone()));
        : picture::render_attribution(&record);

        p(class="explanation")
        {
            : format::summary(&record.explanation, 400);
            : " ";
            a(href=&details): "Read more";
        }

        form(method="GET", action=HeroPage::path(), enctype="application/x-www-form-urlencoded")
        {
            : Icon::Calendar.render(IconSize::Size16x16);
            : " Pick another day ";
            input(type="date", id="date", name="date",
                  value=record.date.to_string(),
                  min=first_published().to_string(),
                  max=today.to_string());
            input(type="submit", value="Show");
        }

        p
        {
            a(href=GalleryPage::path_for(None)): "Explore the gallery";
            : " ";
            a(href=pages::status::StatusPage::path()): "API status";
        }
    }.into_string().unwrap()
}
