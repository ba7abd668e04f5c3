//! Renders the index page: the about-fragment, every post (most recent
//! first), the talks, and the time of the build. The page is produced from a
//! Go-style template ([`INDEX_TEMPLATE`]) which receives the fields described
//! on [`IndexPage::to_value`]. Nothing is HTML-escaped; titles and links come
//! from the author's own content.

use crate::page::PageMetadata;
use crate::talk::Talk;
use chrono::{DateTime, Local, Utc};
use gtmpl::{Template, Value};
use std::fmt;
use std::io;

/// The template for the index page.
pub const INDEX_TEMPLATE: &str = include_str!("../templates/index.html");

/// Everything rendered into the index page.
pub struct IndexPage<'a> {
    /// Raw HTML inserted verbatim into the about section.
    pub about: &'a str,

    /// The posts, in display order (see [`sort_posts`]).
    pub posts: &'a [PageMetadata],

    pub talks: &'a [Talk],

    /// When the site was built.
    pub generated_at: DateTime<Local>,
}

impl IndexPage<'_> {
    /// Converts an [`IndexPage`] into a [`Value`]. The result is a
    /// [`Value::Object`] with fields `about`, `posts`, `talks`, and
    /// `generated_at` (formatted `YYYY-MM-DD HH:MM`).
    pub fn to_value(&self) -> Value {
        use std::collections::HashMap;

        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("about".to_owned(), Value::String(self.about.to_owned()));
        m.insert(
            "posts".to_owned(),
            Value::Array(self.posts.iter().map(Value::from).collect()),
        );
        m.insert(
            "talks".to_owned(),
            Value::Array(self.talks.iter().map(Value::from).collect()),
        );
        m.insert(
            "generated_at".to_owned(),
            Value::String(self.generated_at.format("%Y-%m-%d %H:%M").to_string()),
        );
        Value::Object(m)
    }
}

/// Orders posts most recent first. Posts without a date sort as if dated at
/// the epoch, so they end up last.
pub fn sort_posts(posts: &mut [PageMetadata]) {
    let epoch = DateTime::<Utc>::from(std::time::UNIX_EPOCH);
    posts.sort_by_key(|post| post.date.unwrap_or(epoch));
    posts.reverse();
}

/// Parses the index template.
pub fn parse_template(contents: &str) -> Result<Template> {
    let mut template = Template::default();
    template.parse(contents).map_err(Error::ParseTemplate)?;
    Ok(template)
}

/// Applies `template` to `page` and writes the result to `w`.
pub fn write_index<W: io::Write>(template: &Template, page: &IndexPage, w: &mut W) -> Result<()> {
    template.execute(w, &gtmpl::Context::from(page.to_value())?)?;
    Ok(())
}

/// The result of a fallible index-rendering operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error rendering the index page.
#[derive(Debug)]
pub enum Error {
    /// An error parsing the template.
    ParseTemplate(String),

    /// An error during templating.
    Template(String),

    /// An error writing the output.
    Io(io::Error),
}

impl From<io::Error> for Error {
    /// Converts an [`io::Error`] into an [`Error`]. This allows us to use the
    /// `?` operator for fallible I/O operations.
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<String> for Error {
    /// Converts a template error message ([`String`]) into an [`Error`]. This
    /// allows us to use the `?` operator for fallible template operations.
    fn from(err: String) -> Error {
        Error::Template(err)
    }
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as presentable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::ParseTemplate(err) => write!(f, "Parsing index template: {}", err),
            Error::Template(err) => write!(f, "Rendering index: {}", err),
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::ParseTemplate(_) => None,
            Error::Template(_) => None,
            Error::Io(err) => std::error::Error::source(err),
        }
    }
}
