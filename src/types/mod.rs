//! Core value types shared by calls, transports and stores.

mod args;
mod method;
mod response;

pub use args::CallArgs;
pub use method::Method;
pub use response::{JsonResponse, Response};
