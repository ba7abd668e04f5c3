//! Defines the [`Talk`] type and loading of the optional talks side file.

use gtmpl::Value;
use log::warn;
use serde::Deserialize;
use std::path::Path;

/// A talk or presentation listed on the index page.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Talk {
    pub title: String,
    pub url: String,

    /// The event the talk was given at.
    #[serde(default)]
    pub event: Option<String>,

    /// Free-form; rendered exactly as written.
    #[serde(default)]
    pub date: Option<String>,
}

impl From<&Talk> for Value {
    /// Converts a [`Talk`] into a [`Value`] for templating. Missing `event` and
    /// `date` fields become nil.
    fn from(talk: &Talk) -> Value {
        use std::collections::HashMap;
        let optional = |field: &Option<String>| match field {
            Some(s) => Value::String(s.clone()),
            None => Value::Nil,
        };

        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("title".to_owned(), Value::String(talk.title.clone()));
        m.insert("url".to_owned(), Value::String(talk.url.clone()));
        m.insert("event".to_owned(), optional(&talk.event));
        m.insert("date".to_owned(), optional(&talk.date));
        Value::Object(m)
    }
}

/// Loads the talks listed in `path`, a YAML sequence of talk records:
///
/// ```yaml
/// - title: Writing a blog generator
///   url: https://example.org/slides.pdf
///   event: RustConf
///   date: 2024-09-10
/// ```
///
/// A missing file means there are no talks. An unreadable or malformed file
/// (including a record without a `title` or `url`) is logged as a warning and
/// also yields no talks; it never fails the build.
pub fn load_talks(path: &Path) -> Vec<Talk> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
        Err(e) => {
            warn!("Ignoring talks file '{}': {}", path.display(), e);
            return Vec::new();
        }
    };

    match parse_talks(&contents) {
        Ok(talks) => talks,
        Err(e) => {
            warn!("Ignoring malformed talks file '{}': {}", path.display(), e);
            Vec::new()
        }
    }
}

/// Parses a YAML sequence of talk records. An empty document is an empty
/// list.
pub fn parse_talks(input: &str) -> Result<Vec<Talk>, serde_yaml::Error> {
    if input.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_yaml::from_str(input)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::logging::capture;

    #[test]
    fn test_parse_talks() -> Result<(), serde_yaml::Error> {
        let talks = parse_talks(
            "- title: Static Sites\n  url: https://example.org/static\n  event: LocalConf\n  date: '2024-05-02'\n\
             - title: Bare Talk\n  url: https://example.org/bare\n",
        )?;
        assert_eq!(
            vec![
                Talk {
                    title: String::from("Static Sites"),
                    url: String::from("https://example.org/static"),
                    event: Some(String::from("LocalConf")),
                    date: Some(String::from("2024-05-02")),
                },
                Talk {
                    title: String::from("Bare Talk"),
                    url: String::from("https://example.org/bare"),
                    event: None,
                    date: None,
                },
            ],
            talks
        );
        Ok(())
    }

    #[test]
    fn test_parse_talks_requires_title_and_url() {
        assert!(parse_talks("- title: No URL\n").is_err());
        assert!(parse_talks("- url: https://example.org\n").is_err());
    }

    #[test]
    fn test_load_talks_missing_file() -> std::io::Result<()> {
        capture::install();
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("talks.yml");
        assert!(load_talks(&path).is_empty());
        assert!(capture::warnings_mentioning(&path.display().to_string()).is_empty());
        Ok(())
    }

    #[test]
    fn test_load_talks_malformed_file() -> std::io::Result<()> {
        capture::install();
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("talks.yml");
        std::fs::write(&path, "- title: [unterminated\n  url: {\n")?;
        assert!(load_talks(&path).is_empty());

        std::fs::write(&path, "title: not a list\n")?;
        assert!(load_talks(&path).is_empty());
        assert_eq!(2, capture::warnings_mentioning(&path.display().to_string()).len());
        Ok(())
    }

    #[test]
    fn test_load_talks_empty_file() -> std::io::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("talks.yml");
        std::fs::write(&path, "\n")?;
        assert!(load_talks(&path).is_empty());
        Ok(())
    }
}
