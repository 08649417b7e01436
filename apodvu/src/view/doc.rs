use actix_web::{HttpRequest, HttpResponse};
use actix_web::dev::HttpResponseBuilder;
use actix_web::http::header::{CacheControl, CacheDirective, ContentType};

use horrorshow::{owned_html, Raw, Template};

use crate::icons::{Icon, IconSize};
use crate::pages::status::render_banner;
use crate::State;

#[derive(Clone)]
pub struct Title
{
    pub text: String,
    pub html: Raw<String>,
}

impl<T> From<T> for Title
    where T: Into<String>
{
    fn from(s: T) -> Self
    {
        let text: String = s.into();
        let text2 = text.clone();

        let html = Raw(owned_html!{ : text2 }.into_string().unwrap());

        Title { text, html }
    }
}

pub fn err(builder: HttpResponseBuilder, message: &str) -> HttpResponse
{
    let message = message.to_owned();

    let body = owned_html!{
        div(class="error-page")
        {
            h1
            {
                : Icon::Warning.render(IconSize::Size32x32);
                : "Something went wrong";
            }
            p(class="error-message"): message;
            a(href="/"): "Back to today's picture";
        }
    }.into_string().unwrap();

    html_response(builder, "Error", &body)
}

pub fn redirect(path: String) -> HttpResponse
{
    HttpResponse::Found()
        .header(actix_web::http::header::LOCATION, path)
        .finish()
}

pub fn html_response<T: Into<Title>>(builder: HttpResponseBuilder, title: T, body: &str) -> HttpResponse
{
    let title: Title = title.into();

    let mut builder = builder;

    let body = owned_html!
    {
        : Raw("<!DOCTYPE html>");

        html(lang="en")
        {
            head
            {
                meta(charset="utf-8");
                meta(name="viewport", content="width=device-width, initial-scale=1");
                link(rel="stylesheet", href="/assets/style.css");

                title : title.html
            }
            body
            {
                : Raw(body)
            }
        }
    }.into_string().unwrap();

    builder
        .set(ContentType::html())
        .set(CacheControl(vec![
            CacheDirective::NoStore,
        ]))
        .body(body)
}

pub fn html_page<T: Into<Title>>(req: &HttpRequest, state: &State, title: T, icon: Icon, content: &str) -> HttpResponse
{
    let title: Title = title.into();
    let title_text = format!("{} - Astronomy Picture of the Day", title.text);

    let body = owned_html!{
        : header(&title, icon, req, state);
        div(class="content")
        {
            : Raw(content)
        }
    }.into_string().unwrap();

    html_response(HttpResponse::Ok(), title_text, &body)
}

fn header(title: &Title, icon: Icon, req: &HttpRequest, state: &State) -> Raw<String>
{
    let title = title.clone();
    let banner = render_banner(state.status.lock().unwrap().as_ref());
    let links = state.header_links.by_order();
    let path = req.path().to_owned();

    let html = owned_html!{

        div(class="header")
        {
            h1
            {
                : icon.render(IconSize::Size32x32);
                : &title.html;
            }

            div(class="header-links")
            {
                @for header in links.iter()
                {
                    a(href=(&header.path),
                      class=(if header.path == path { Some("header-link-selected") } else { None }))
                    {
                        : header.icon.render(IconSize::Size16x16);
                        : &header.label;
                    }
                }

                form(method="GET", action=crate::pages::search::SearchPage::path(), enctype="application/x-www-form-urlencoded")
                {
                    : Icon::Search.render(IconSize::Size16x16);
                    input(type="date", name="date", min=apod::dates::first_published().to_string());
                    input(type="submit", value="Go");
                }
            }

            : banner;
        }

    }.into_string().unwrap();

    Raw(html)
}
