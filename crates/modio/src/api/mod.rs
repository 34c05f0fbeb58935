//! HTTP side of the client
//!
//! [`Client`] is the facade, [`dispatcher`] executes requests, [`rate_gate`]
//! tracks the server's rate limit headers and [`classify`] turns failed
//! responses into [`ModioError`](crate::ModioError) variants.

pub mod classify;
pub mod client;
pub mod dispatcher;
pub mod rate_gate;


pub use client::{Client, ClientBuilder};
pub use dispatcher::{ApiRequest, ClientHandle, Dispatcher, Response};
pub use rate_gate::RateLimitStatus;
