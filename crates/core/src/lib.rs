#![warn(clippy::all, missing_docs)]

//! Core controller for the InsightIQ competitor-intelligence client.
//!
//! This crate hosts the data models, configuration handling, the remote
//! data gateway, durable selection state, the page router and renderers,
//! and the modal state machines used by the terminal UI and any future
//! frontends.

pub mod config;
pub mod controller;
pub mod gateway;
pub mod modal;
pub mod models;
pub mod pages;
pub mod router;
pub mod selection;
pub mod storage;
pub mod view;

pub use config::AppConfig;
pub use controller::{AppController, Job, Outcome};
pub use gateway::{Gateway, GatewayError, HttpTransport, Transport};
pub use models::{Competitor, CompetitorRef, Domain, FeedItem, ForecastPoint, InsightReport};
pub use router::{Page, Router};
pub use selection::SelectionStore;
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use view::View;
