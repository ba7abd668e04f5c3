//! The library code for the `adocblog` static blog generator. A build is a
//! single pass through four stages, connected by plain in-memory data:
//!
//! 1. Discovering AsciiDoc sources under the content directory
//!    ([`crate::scan`])
//! 2. Converting each source into an HTML page and recording its title, link,
//!    and date ([`crate::page`])
//! 3. Loading the optional list of talks ([`crate::talk`])
//! 4. Rendering the index page ([`crate::index`])
//!
//! [`crate::build`] runs the stages in order. Conversion itself is delegated
//! to an external tool through the [`crate::convert::Converter`] trait, which
//! lets every stage be exercised without `asciidoctor` installed.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod build;
pub mod config;
pub mod convert;
pub mod index;
pub mod logging;
pub mod page;
pub mod scan;
pub mod talk;
mod util;
