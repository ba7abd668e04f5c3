//! Exports the [`build_site`] function which stitches together the high-level
//! steps of building the output static site: discovering the sources
//! ([`crate::scan`]), converting them into pages ([`crate::page`]), loading
//! the talks ([`crate::talk`]), and rendering the index page
//! ([`crate::index`]).

use crate::config::Config;
use crate::convert::Converter;
use crate::index::{self, parse_template, sort_posts, write_index, IndexPage, INDEX_TEMPLATE};
use crate::page::{self, PageBuilder};
use crate::scan::scan_sources;
use crate::talk::load_talks;
use chrono::{DateTime, Local};
use log::{info, warn};
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

/// What a successful build produced.
#[derive(Debug, PartialEq)]
pub struct BuildSummary {
    /// The number of post pages written (the index isn't counted).
    pub pages: usize,
    pub output_directory: PathBuf,
}

/// Builds the site from a [`Config`] object, stamping the index with the
/// current time. See [`build_site_at`].
pub fn build_site(config: &Config, converter: &dyn Converter) -> Result<BuildSummary> {
    build_site_at(config, converter, Local::now())
}

/// Builds the site in a single pass: every source document under the content
/// directory becomes a page in the output directory, then the index is
/// written to `{output_directory}/index.html`. Existing files are overwritten
/// and files from earlier builds are left alone.
///
/// An empty content directory and a malformed talks file only produce
/// warnings. Everything else (a failed conversion, a missing about-fragment,
/// an I/O error) aborts the build.
pub fn build_site_at(
    config: &Config,
    converter: &dyn Converter,
    generated_at: DateTime<Local>,
) -> Result<BuildSummary> {
    std::fs::create_dir_all(&config.output_directory).map_err(|err| Error::Io {
        path: config.output_directory.clone(),
        err,
    })?;

    let sources = scan_sources(&config.content_directory)?;
    if sources.is_empty() {
        warn!(
            "No source documents found in '{}'",
            config.content_directory.display()
        );
    }

    let options = config.convert_options();
    let builder = PageBuilder::new(
        &config.content_directory,
        &config.output_directory,
        converter,
        &options,
    );
    let mut posts = builder.build_pages(&sources)?;
    sort_posts(&mut posts);

    let talks = load_talks(&config.talks_file);
    info!("Loaded {} talk(s)", talks.len());

    // The about-fragment is required; there is no fallback.
    let about = std::fs::read_to_string(&config.about_file).map_err(|err| Error::ReadAbout {
        path: config.about_file.clone(),
        err,
    })?;

    let template = parse_template(INDEX_TEMPLATE)?;
    let index_path = config.output_directory.join("index.html");
    let io_error = |err| Error::Io {
        path: index_path.clone(),
        err,
    };
    let mut w = BufWriter::new(File::create(&index_path).map_err(io_error)?);
    write_index(
        &template,
        &IndexPage {
            about: &about,
            posts: &posts,
            talks: &talks,
            generated_at,
        },
        &mut w,
    )?;
    w.flush().map_err(io_error)?;

    Ok(BuildSummary {
        pages: posts.len(),
        output_directory: config.output_directory.clone(),
    })
}

type Result<T> = std::result::Result<T, Error>;

/// The error type for building a site. Errors can be during scanning,
/// building pages, reading the about-fragment, rendering the index, and other
/// I/O.
#[derive(Debug)]
pub enum Error {
    /// Returned when the content directory can't be walked.
    Scan(walkdir::Error),

    /// Returned for errors converting a source document.
    Page(page::Error),

    /// Returned when the about-fragment can't be read.
    ReadAbout { path: PathBuf, err: std::io::Error },

    /// Returned for errors rendering the index page.
    Index(index::Error),

    /// Returned for I/O problems creating output directories and files.
    Io { path: PathBuf, err: std::io::Error },
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Scan(_) => write!(f, "Scanning content directory"),
            Error::Page(err) => err.fmt(f),
            Error::ReadAbout { path, err: _ } => {
                write!(f, "Reading about-fragment '{}'", path.display())
            }
            Error::Index(err) => err.fmt(f),
            Error::Io { path, err: _ } => write!(f, "Writing '{}'", path.display()),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Scan(err) => Some(err),
            // `Page` and `Index` display as the wrapped error itself
            Error::Page(err) => std::error::Error::source(err),
            Error::ReadAbout { path: _, err } => Some(err),
            Error::Index(err) => std::error::Error::source(err),
            Error::Io { path: _, err } => Some(err),
        }
    }
}

impl From<walkdir::Error> for Error {
    /// Converts [`walkdir::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: walkdir::Error) -> Error {
        Error::Scan(err)
    }
}

impl From<page::Error> for Error {
    /// Converts [`page::Error`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: page::Error) -> Error {
        Error::Page(err)
    }
}

impl From<index::Error> for Error {
    /// Converts [`index::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: index::Error) -> Error {
        Error::Index(err)
    }
}
