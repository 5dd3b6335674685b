//! Overlay state machines: the competitor insight panel and the domain picker.

pub mod insight;
pub mod picker;

pub use insight::{InsightData, InsightPanel, InsightPanelView, InsightRequest, InsightTab};
pub use picker::{DomainPicker, DomainTile};
