#![forbid(unsafe_code)]

//! Character flavors for the mudterm display engine.
//!
//! A [`Flavor`] carries the attribute flags and colors of one character of
//! scrollback text. The [`sgr`] module converts between flavors and SGR escape
//! parameters, which is how styled text is persisted and how it is written to
//! a real terminal.
//!
//! # Example
//!
//! ```
//! use mudterm_style::{Color, Flavor, sgr};
//!
//! let warning = Flavor::new().bold().fg(Color::simple(3));
//! assert_eq!(sgr::transition(Flavor::DEFAULT, warning), "\x1b[1;33m");
//!
//! let mut decoded = Flavor::DEFAULT;
//! decoded.apply_sgr(&[1, 33]);
//! assert_eq!(decoded, warning);
//! ```

pub mod flavor;
pub mod sgr;

pub use flavor::{Color, Flavor, FlavorFlags};
pub use sgr::{SgrChange, parse_sgr, transition, write_transition};
