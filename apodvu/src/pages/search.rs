use actix_web::{web, HttpResponse};

use apod::dates::DateBounds;

use crate::forms::DateQuery;
use crate::pages::{self, PageResources, PageResourcesBuilder};
use crate::pages::gallery::GalleryPage;
use crate::view;

#[allow(dead_code)]
pub struct SearchPage
{
}

impl SearchPage
{
    pub fn path() -> String
    {
        "/view/search".to_owned()
    }
}

impl PageResources for SearchPage
{
    fn page_resources(builder: &mut PageResourcesBuilder)
    {
        builder
            .route_view("/view/search", web::get().to(get_search));
    }
}

/// Where a date search lands: the gallery anchored on that
/// day, or the most recent pictures when nothing was picked.
fn search_target(query: &DateQuery, bounds: &DateBounds) -> String
{
    match query.text()
    {
        Some(text) => GalleryPage::path_for(Some(bounds.clamp_str(text))),
        None => GalleryPage::path_for(None),
    }
}

async fn get_search(query: web::Query<DateQuery>) -> HttpResponse
{
    let bounds = DateBounds::as_of(pages::today());

    view::redirect(search_target(&query, &bounds))
}
