extern crate actix_rt;
use std::io;
use std::sync::{Arc, Mutex};
use actix_web::{middleware, web, App, HttpServer};
use structopt::StructOpt;
use tracing::info;
use tracing_subscriber::EnvFilter;

use apod::{ApodClient, ApodConfig, CredentialHealth, GalleryLoader};

mod assets;
mod format;
mod forms;
mod icons;
mod pages;
mod view;

use pages::{HeaderLinkCollection, PageResources, PageResourcesBuilder};

#[derive(Debug, StructOpt)]
#[structopt(name = "apodvu", about = "Browse NASA's Astronomy Picture of the Day")]
struct Opt
{
    /// Address to serve on
    #[structopt(long, default_value = "127.0.0.1:8080")]
    bind: String,

    /// NASA API key. Falls back to NASA_API_KEY, then to DEMO_KEY
    #[structopt(long)]
    api_key: Option<String>,

    /// APOD endpoint. Falls back to APOD_ENDPOINT
    #[structopt(long)]
    endpoint: Option<String>,

    /// Days fetched per gallery window
    #[structopt(long, default_value = "9")]
    window_days: u32,
}

pub struct State
{
    pub client: Arc<Mutex<ApodClient>>,
    pub gallery: Arc<Mutex<GalleryLoader>>,
    pub status: Arc<Mutex<Option<CredentialHealth>>>,
    pub header_links: HeaderLinkCollection,
}

fn load_config(opt: &Opt) -> io::Result<ApodConfig>
{
    let invalid = |e: url::ParseError| io::Error::new(io::ErrorKind::InvalidInput, format!("Invalid APOD endpoint: {}", e));

    let mut config = ApodConfig::from_env().map_err(invalid)?;

    if let Some(api_key) = &opt.api_key
    {
        config.api_key = Some(api_key.clone());
    }

    if let Some(endpoint) = &opt.endpoint
    {
        config = config.with_endpoint(endpoint).map_err(invalid)?;
    }

    Ok(config)
}

#[actix_rt::main]
async fn main() -> io::Result<()>
{
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let opt = Opt::from_args();
    let config = load_config(&opt)?;

    info!("Serving APOD from {} on http://{}", config.endpoint, opt.bind);

    let client = Arc::new(Mutex::new(ApodClient::new(&config)));
    let gallery = Arc::new(Mutex::new(GalleryLoader::new(None, opt.window_days)));
    let status = Arc::new(Mutex::new(None));

    HttpServer::new(move ||
    {
        let mut builder = PageResourcesBuilder::new();

        pages::hero::HeroPage::page_resources(&mut builder);
        pages::details::DetailsPage::page_resources(&mut builder);
        pages::gallery::GalleryPage::page_resources(&mut builder);
        pages::search::SearchPage::page_resources(&mut builder);
        pages::status::StatusPage::page_resources(&mut builder);

        let PageResourcesBuilder { header_links, view_resources, other_resources } = builder;

        let state = State
        {
            client: client.clone(),
            gallery: gallery.clone(),
            status: status.clone(),
            header_links,
        };

        let mut app = App::new()
            .wrap(middleware::Logger::default())
            .data(state)
            .route("/assets/{_:.*}", web::get().to(assets::handle_embedded_file));

        for resource in view_resources.into_iter().chain(other_resources.into_iter())
        {
            app = app.service(resource);
        }

        app
    })
    .bind(&opt.bind)?
    .run()
    .await
}
