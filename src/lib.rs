//! Mais Chat Viewer: browse contacts, their tickets ("atendimentos") and the
//! transcript of each ticket from the Mais Chat backend.

pub mod api;
pub mod app;
pub mod calendar;
pub mod debounce;
pub mod files;
pub mod format;
pub mod panels;
pub mod session;
pub mod storage;
pub mod utils;

#[cfg(feature = "gui")]
pub mod ui;
