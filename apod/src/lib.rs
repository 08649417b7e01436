//! Client for NASA's Astronomy Picture of the Day service, plus the
//! paging logic behind an endless gallery of past pictures.

pub mod api;
pub mod config;
pub mod dates;
pub mod gallery;

mod client;
mod credential;

#[cfg(test)]
mod testing;

pub use api::{ApodError, MediaKind, PictureRecord};
pub use client::{ApodClient, Clock, CredentialHealth, SystemClock};
pub use config::ApodConfig;
pub use credential::{ApiKey, CredentialState, DEFAULT_API_KEY};
pub use gallery::{GalleryError, GalleryLoader, GalleryState, WindowOutcome, WindowRequest};
