//! Policy Module
//!
//! Request model and the router that picks a strategy per request.

mod request;
mod router;

pub use request::{
    normalize_url, request_key, Destination, InterceptedRequest, FETCH_DEST_HEADER,
    FETCH_MODE_HEADER,
};
pub use router::{classify, Bypass, Route, Strategy};
