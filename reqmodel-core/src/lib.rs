// Core library for reqmodel
// HTTP request/response types, the middleware chain and logging setup that
// request validation plugs into.

pub mod error;
pub mod extensions;
pub mod http;
pub mod logging;
pub mod middleware;
pub mod query;
pub mod status;

pub use error::*;
pub use extensions::Extensions;
pub use http::*;
pub use middleware::*;
pub use status::*;
