use std::fmt;
use actix_web::{HttpResponse, ResponseError};
use actix_web::error::BlockingError;
use actix_web::http::StatusCode;

use apod::{ApodError, GalleryError};

mod doc;

pub use doc::{err, html_page, redirect};

/// Any failure a page handler can hit, rendered as an HTML error page.
#[derive(Debug)]
pub struct ErrorResponder
{
    status: StatusCode,
    message: String,
}

impl ErrorResponder
{
    pub fn new<T: Into<String>>(status: StatusCode, message: T) -> Self
    {
        ErrorResponder { status, message: message.into() }
    }
}

impl fmt::Display for ErrorResponder
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "{}", self.message)
    }
}

impl ResponseError for ErrorResponder
{
    fn status_code(&self) -> StatusCode
    {
        self.status
    }

    fn error_response(&self) -> HttpResponse
    {
        doc::err(HttpResponse::build(self.status), &self.message)
    }
}

fn apod_status(err: &ApodError) -> StatusCode
{
    match err
    {
        ApodError::Throttled{..} => StatusCode::TOO_MANY_REQUESTS,
        ApodError::Upstream{..} => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<ApodError> for ErrorResponder
{
    fn from(err: ApodError) -> Self
    {
        ErrorResponder::new(apod_status(&err), err.to_string())
    }
}

impl From<GalleryError> for ErrorResponder
{
    fn from(err: GalleryError) -> Self
    {
        let status = match err
        {
            GalleryError::Busy
                | GalleryError::Stale => StatusCode::CONFLICT,
            GalleryError::Exhausted => StatusCode::NOT_FOUND,
            GalleryError::Failed{..} => StatusCode::BAD_GATEWAY,
        };

        ErrorResponder::new(status, err.to_string())
    }
}

impl<E> From<BlockingError<E>> for ErrorResponder
    where E: Into<ErrorResponder> + fmt::Debug
{
    fn from(err: BlockingError<E>) -> Self
    {
        match err
        {
            BlockingError::Error(e) => e.into(),
            BlockingError::Canceled => ErrorResponder::new(StatusCode::INTERNAL_SERVER_ERROR, "Background request was cancelled"),
        }
    }
}
