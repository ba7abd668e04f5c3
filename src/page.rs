//! Defines the [`PageMetadata`], [`PageBuilder`], and [`Error`] types. The
//! builder converts each source document into an HTML page in the output
//! directory and records the metadata the index needs: the title, the link to
//! the page, and the date. See [`resolve_title`] and [`resolve_date`] for how
//! missing titles and dates are filled in.

use crate::convert::{self, ConvertOptions, Converter};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use gtmpl::Value;
use log::info;
use std::fmt;
use std::path::{Component, Path, PathBuf};

/// What the index knows about a built page.
#[derive(Clone, Debug, PartialEq)]
pub struct PageMetadata {
    pub title: String,

    /// The output file relative to the output directory, always `/`-separated
    /// (e.g., `notes/foo.html`).
    pub link: String,

    /// The declared revision date, or the source's modification time.
    pub date: Option<DateTime<Utc>>,
}

impl From<&PageMetadata> for Value {
    /// Converts [`PageMetadata`] into a [`Value`] for templating. The `date`
    /// field is formatted as `YYYY-MM-DD`, or nil when there is no date.
    fn from(page: &PageMetadata) -> Value {
        use std::collections::HashMap;
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("title".to_owned(), Value::String(page.title.clone()));
        m.insert("link".to_owned(), Value::String(page.link.clone()));
        m.insert(
            "date".to_owned(),
            match page.date {
                Some(date) => Value::String(date.format("%Y-%m-%d").to_string()),
                None => Value::Nil,
            },
        );
        Value::Object(m)
    }
}

/// Builds HTML pages from source documents.
pub struct PageBuilder<'a> {
    /// The directory the sources live in. Output paths mirror each source's
    /// position relative to this directory.
    content_directory: &'a Path,

    /// The directory pages are written to.
    output_directory: &'a Path,

    converter: &'a dyn Converter,

    /// The options every page is converted with.
    options: &'a ConvertOptions,
}

impl<'a> PageBuilder<'a> {
    /// Constructs a new builder. See fields on [`PageBuilder`] for argument
    /// descriptions.
    pub fn new(
        content_directory: &'a Path,
        output_directory: &'a Path,
        converter: &'a dyn Converter,
        options: &'a ConvertOptions,
    ) -> PageBuilder<'a> {
        PageBuilder {
            content_directory,
            output_directory,
            converter,
            options,
        }
    }

    /// Builds a page for every source, in order. The first failure aborts the
    /// whole build.
    pub fn build_pages(&self, sources: &[PathBuf]) -> Result<Vec<PageMetadata>> {
        sources.iter().map(|source| self.build_page(source)).collect()
    }

    /// Converts a single source document and returns its [`PageMetadata`].
    pub fn build_page(&self, source: &Path) -> Result<PageMetadata> {
        match self._build_page(source) {
            Ok(page) => Ok(page),
            Err(e) => Err(Error::Annotated(
                format!("building page '{}'", source.display()),
                Box::new(e),
            )),
        }
    }

    fn _build_page(&self, source: &Path) -> Result<PageMetadata> {
        let header = self.converter.load(source)?;
        let title = resolve_title(header.title.as_deref(), source);
        let date = resolve_date(header.revdate(), source);

        let relative_path = source
            .strip_prefix(self.content_directory)
            .map_err(|_| Error::OutsideContentDirectory(source.to_owned()))?
            .with_extension("html");
        let target = self.output_directory.join(&relative_path);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent).map_err(|err| Error::CreateDirectory {
                path: parent.to_owned(),
                err,
            })?;
        }

        info!("Converting {} -> {}", source.display(), target.display());
        self.converter.convert(source, &target, self.options)?;

        Ok(PageMetadata {
            title,
            link: link(&relative_path)?,
            date,
        })
    }
}

/// Returns the declared title, or the source's file name without its
/// extension when the title is missing or blank.
pub fn resolve_title(declared: Option<&str>, source: &Path) -> String {
    match declared.map(str::trim) {
        Some(title) if !title.is_empty() => title.to_owned(),
        _ => source
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default(),
    }
}

/// Parses the declared revision date, falling back to the source file's
/// modification time. Never fails: the result is `None` only when neither is
/// available.
pub fn resolve_date(revdate: Option<&str>, source: &Path) -> Option<DateTime<Utc>> {
    revdate.and_then(parse_date).or_else(|| modified(source))
}

fn modified(source: &Path) -> Option<DateTime<Utc>> {
    let modified = std::fs::metadata(source).and_then(|m| m.modified()).ok()?;
    Some(DateTime::<Utc>::from(modified))
}

/// Parses a revision date. Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS`,
/// `YYYY-MM-DD HH:MM`, `YYYY-MM-DD`, `June 1, 2024`, and `1 June 2024`. Dates
/// without an offset are taken as UTC.
pub fn parse_date(input: &str) -> Option<DateTime<Utc>> {
    const DATE_TIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];
    const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%B %d, %Y", "%d %B %Y"];

    let input = input.trim();
    if let Ok(date) = DateTime::parse_from_rfc3339(input) {
        return Some(date.with_timezone(&Utc));
    }
    for format in DATE_TIME_FORMATS {
        if let Ok(date) = NaiveDateTime::parse_from_str(input, format) {
            return Some(Utc.from_utc_datetime(&date));
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(input, format) {
            return Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?));
        }
    }
    None
}

/// Joins the components of a relative output path with `/`, whatever the host
/// separator.
fn link(relative_path: &Path) -> Result<String> {
    let mut parts = Vec::new();
    for component in relative_path.components() {
        match component {
            Component::Normal(part) => parts.push(
                part.to_str()
                    .ok_or_else(|| Error::InvalidFileName(relative_path.to_owned()))?,
            ),
            Component::CurDir => {}
            _ => return Err(Error::InvalidFileName(relative_path.to_owned())),
        }
    }
    Ok(parts.join("/"))
}

/// Represents the result of a page-building operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error building a page.
#[derive(Debug)]
pub enum Error {
    /// Returned when the converter fails to load or convert the document.
    Convert(convert::Error),

    /// Returned when an output directory can't be created.
    CreateDirectory { path: PathBuf, err: std::io::Error },

    /// Returned when a source isn't inside the content directory.
    OutsideContentDirectory(PathBuf),

    /// Returned when an output path can't be expressed as a link (e.g., it
    /// isn't valid UTF-8).
    InvalidFileName(PathBuf),

    /// An error with an annotation.
    Annotated(String, Box<Error>),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Convert(err) => err.fmt(f),
            Error::CreateDirectory { path, err: _ } => {
                write!(f, "Creating directory '{}'", path.display())
            }
            Error::OutsideContentDirectory(path) => {
                write!(f, "'{}' is not in the content directory", path.display())
            }
            Error::InvalidFileName(path) => write!(f, "invalid file name: {:?}", path),
            Error::Annotated(annotation, _) => f.write_str(annotation),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            // `Convert` displays as the converter error itself
            Error::Convert(err) => std::error::Error::source(err),
            Error::CreateDirectory { path: _, err } => Some(err),
            Error::OutsideContentDirectory(_) => None,
            Error::InvalidFileName(_) => None,
            Error::Annotated(_, err) => Some(err),
        }
    }
}

impl From<convert::Error> for Error {
    /// Converts a [`convert::Error`] into an [`Error`]. It allows us to use
    /// the `?` operator for converter calls.
    fn from(err: convert::Error) -> Error {
        Error::Convert(err)
    }
}
