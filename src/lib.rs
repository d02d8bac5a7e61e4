//! Storefront Client Library
//!
//! Client-side counterpart of the storefront API: a [`CartSession`] that
//! mirrors the server-authoritative shopping cart across add / remove /
//! update / checkout round trips, and an [`AdminClient`] for the admin
//! console's product CRUD.
//!
//! The server is always the source of truth. Every successful mutation
//! replaces the local cart wholesale with the server's response; rejected
//! or failed calls leave the mirror untouched. Renderers subscribe to
//! [`CartEvent`] notifications instead of being wired into the mutation
//! path.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod admin;
pub mod api;
pub mod config;
pub mod errors;
pub mod events;
pub mod models;
pub mod session;

pub use admin::AdminClient;
pub use api::{HttpApi, StoreApi};
pub use config::StoreConfig;
pub use errors::{Severity, StoreError};
pub use events::{CartEvent, EventSender};
pub use models::{Cart, CatalogStats, LineItem, Product, ProductInput};
pub use session::CartSession;
