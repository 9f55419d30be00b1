//! Minimal terminal runtime: an event loop that feeds an [`App`] with
//! elapsed-time ticks, render requests and crossterm events.

pub use self::{app::App, runtime::Runtime};

mod app;
mod event;
mod event_loop;
mod runtime;
