use horrorshow::{owned_html, Raw, Template};

use apod::{MediaKind, PictureRecord};

use crate::format;
use crate::icons::{Icon, IconSize};
use crate::pages::details::DetailsPage;

/// The picture itself, or an embedded player for video days.
pub fn render_media(record: &PictureRecord, href: Option<String>) -> Raw<String>
{
    let title = record.title.clone();
    let permalink = record.permalink();

    let image_url = if record.is_image() { record.display_url.clone() } else { None };
    let video_url = if record.media_kind == MediaKind::Video { record.display_url.clone() } else { None };

    Raw(owned_html!
    {
        div(class="media")
        {
            @if let Some(url) = image_url
            {
                @if let Some(href) = href
                {
                    a(href=href)
                    {
                        img(src=&url, alt=&title);
                    }
                }
                else
                {
                    img(src=&url, alt=&title);
                }
            }
            else
            {
                @if let Some(url) = video_url
                {
                    iframe(src=url, title=&title, allowfullscreen="true");
                }
                else
                {
                    p
                    {
                        : Icon::Info.render(IconSize::Size16x16);
                        : "This day's media can't be shown here. ";
                        a(href=permalink): "View it on apod.nasa.gov";
                    }
                }
            }
        }
    }.into_string().unwrap())
}

pub fn render_attribution(record: &PictureRecord) -> Raw<String>
{
    let attribution = record.attribution.clone();

    Raw(owned_html!
    {
        @if let Some(attribution) = attribution
        {
            p(class="attribution"): format!("\u{a9} {}", attribution);
        }
    }.into_string().unwrap())
}

/// Gallery grid entry linking to the detail page.
pub fn render_card(record: &PictureRecord) -> Raw<String>
{
    let href = DetailsPage::path_for(&record.date);
    let date = format::date_to_short_str(&record.date);
    let title = record.title.clone();
    let url = record.display_url.clone().unwrap_or_default();

    Raw(owned_html!
    {
        div(class="card")
        {
            a(href=&href)
            {
                img(src=url, alt=&title, loading="lazy");
            }
            h3
            {
                a(href=&href): &title;
            }
            p
            {
                : Icon::Calendar.render(IconSize::Size16x16);
                : " ";
                : date;
            }
        }
    }.into_string().unwrap())
}
