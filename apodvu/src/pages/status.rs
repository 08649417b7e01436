use actix_web::{web, HttpResponse};
use horrorshow::{owned_html, Raw, Template};
use tracing::info;

use apod::{ApodError, CredentialHealth};

use crate::icons::{Icon, IconSize};
use crate::pages::{PageResources, PageResourcesBuilder};
use crate::view;
use crate::State;

#[allow(dead_code)]
pub struct StatusPage
{
}

impl StatusPage
{
    pub fn path() -> String
    {
        "/status".to_owned()
    }
}

impl PageResources for StatusPage
{
    fn page_resources(builder: &mut PageResourcesBuilder)
    {
        builder
            .route_other("/status", web::get().to(get_status));
    }
}

async fn get_status(state: web::Data<State>) -> Result<HttpResponse, view::ErrorResponder>
{
    let health = refresh(&state).await?;

    Ok(HttpResponse::Ok().json(&health))
}

/// Checks the key in a worker thread and remembers the answer for the banner.
pub async fn refresh(state: &State) -> Result<CredentialHealth, view::ErrorResponder>
{
    let client = state.client.clone();

    let health = web::block(move || -> Result<CredentialHealth, ApodError>
    {
        Ok(client.lock().unwrap().check_credential_health())
    }).await?;

    info!("NASA API key check: working={} using_default={}", health.working, health.using_default);

    *state.status.lock().unwrap() = Some(health.clone());

    Ok(health)
}

/// Checks only if nothing has been learned about the key yet.
pub async fn ensure_checked(state: &State) -> Result<(), view::ErrorResponder>
{
    if state.status.lock().unwrap().is_none()
    {
        refresh(state).await?;
    }

    Ok(())
}

pub fn banner_text(status: Option<&CredentialHealth>) -> (&'static str, String)
{
    match status
    {
        None =>
        {
            ("banner-unknown", "Checking NASA API...".to_owned())
        },
        Some(health) if !health.working =>
        {
            let reason = health.reason.clone().unwrap_or_else(|| "API key issue".to_owned());

            ("banner-error", format!("NASA API unavailable: {}", reason))
        },
        Some(health) if health.using_default =>
        {
            ("banner-demo", "Using DEMO_KEY, which is heavily rate limited. Set NASA_API_KEY for your own quota.".to_owned())
        },
        Some(_) =>
        {
            ("banner-ok", "NASA API connected".to_owned())
        },
    }
}

pub fn render_banner(status: Option<&CredentialHealth>) -> Raw<String>
{
    let (class, text) = banner_text(status);

    let icon = match class
    {
        "banner-ok" => Icon::Check,
        "banner-demo" => Icon::Key,
        "banner-error" => Icon::Warning,
        _ => Icon::Hourglass,
    };

    Raw(owned_html!
    {
        div(class=format!("banner {}", class))
        {
            : icon.render(IconSize::Size16x16);
            : text;
        }
    }.into_string().unwrap())
}
