#![forbid(unsafe_code)]

//! Scrollback display engine for MUD clients.
//!
//! This crate ties the lower crates together: a [`DisplayEngine`] owns a
//! [`Tabpage`] of stacked windows over shared scrollback buffers and draws
//! it onto a [`DisplaySurface`] once per render transaction.
//!
//! # Example
//!
//! ```
//! use mudterm::prelude::*;
//!
//! let mut engine = DisplayEngine::new(EngineConfig::default(), 20, 8);
//! engine.append_line(&StyledText::plain("Welcome!"));
//! let side = engine.split(Orientation::Rows, SplitSize::Rows(2)).unwrap();
//!
//! assert_eq!(engine.tabpage().current_window_id(), side);
//! let lines = engine.display_lines();
//! assert_eq!(lines.len(), 8);
//! assert!(lines.iter().any(|line| line == "Welcome!"));
//! ```

pub mod config;
pub mod engine;
pub mod error;
#[cfg(feature = "tracing-subscriber")]
pub mod logging;
pub mod primary;
pub mod tabpage;
pub mod viewport;
pub mod window;

pub use config::EngineConfig;
pub use engine::DisplayEngine;
pub use error::{Error, Result, TransactionError, WindowError};
pub use primary::PrimaryWindow;
pub use tabpage::Tabpage;
pub use viewport::{SearchOutcome, Viewport};
pub use window::{Window, fit_status_line};

// --- Lower crate re-exports ------------------------------------------------

pub use mudterm_layout::{LayoutError, LayoutTree, Orientation, SplitSize, WindowId};
pub use mudterm_render::{Cell, DisplaySurface};
pub use mudterm_scrollback::{BufferId, PersistError, ScrollbackBuffer, SharedBuffer};
pub use mudterm_style::{Color, Flavor};
pub use mudterm_text::StyledText;

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Color, DisplayEngine, EngineConfig, Error, Flavor, Orientation, Result,
        ScrollbackBuffer, SearchOutcome, SplitSize, StyledText, Viewport, WindowId,
    };

    pub use crate::{layout, render, scrollback, style, text};
}

pub use mudterm_layout as layout;
pub use mudterm_render as render;
pub use mudterm_scrollback as scrollback;
pub use mudterm_style as style;
pub use mudterm_text as text;
