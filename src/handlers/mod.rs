//! Request handlers.
//!
//! | Route      | Method | Handler                      |
//! |------------|--------|------------------------------|
//! | `/health`  | GET    | [`health::health_check`]     |
//! | `/`        | GET    | [`compute::standard_get`]    |
//! | `/json`    | POST   | [`echo::json_echo`]          |
//! | `/jsonapi` | POST   | [`document::create_document`] |
//!
//! Each route accepts any method and answers 405 itself for the wrong one.

pub mod compute;
pub mod document;
pub mod echo;
pub mod health;
