mod err;
mod msgs;
pub mod raw;

pub use err::ApodError;
pub use msgs::{MediaKind, PictureRecord};

pub(crate) use err::{ThrottledSnafu, UpstreamSnafu};
pub(crate) use msgs::OneOrMany;
