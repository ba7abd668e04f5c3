//! Defines the [`Converter`] trait, which is the boundary between the build
//! and the AsciiDoc converter, and [`Asciidoctor`], the implementation used by
//! the binary. [`Asciidoctor`] reads document headers itself (see
//! [`parse_header`]) and shells out to the `asciidoctor` executable to render
//! HTML.

use log::{debug, warn};
use std::collections::HashMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

/// The header of a markup document as returned by [`Converter::load`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DocumentHeader {
    /// The document title (`= Title`), if the document declares one.
    pub title: Option<String>,

    /// The attribute entries declared in the header (`:name: value`).
    pub attributes: HashMap<String, String>,
}

impl DocumentHeader {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// The declared revision date, either from a `:revdate:` entry or from
    /// the header's revision line.
    pub fn revdate(&self) -> Option<&str> {
        self.attribute("revdate")
    }
}

/// Converts markup documents to HTML. The build only ever talks to the
/// converter through this trait.
pub trait Converter {
    /// Loads the document header without writing any output.
    fn load(&self, source: &Path) -> Result<DocumentHeader>;

    /// Renders `source` to an HTML file at `target`. The parent directory of
    /// `target` must already exist.
    fn convert(&self, source: &Path, target: &Path, options: &ConvertOptions) -> Result<()>;
}

/// Where the converter places the table of contents.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TocPlacement {
    Auto,
    Left,
    Right,
    Preamble,
}

impl TocPlacement {
    fn as_str(self) -> &'static str {
        match self {
            TocPlacement::Auto => "auto",
            TocPlacement::Left => "left",
            TocPlacement::Right => "right",
            TocPlacement::Preamble => "preamble",
        }
    }
}

/// The named options passed to the converter when writing a page.
#[derive(Clone, Debug, PartialEq)]
pub struct ConvertOptions {
    pub toc: TocPlacement,

    /// Emit anchors next to section titles.
    pub section_anchors: bool,

    /// The name of the syntax highlighting engine, e.g. `rouge`.
    pub source_highlighter: String,

    /// A custom stylesheet. Empty selects the converter's built-in default.
    pub stylesheet: String,

    /// Inject the shared docinfo file (`docinfo.html`) into every page.
    pub shared_docinfo: bool,

    /// The directory the shared docinfo file is looked up in.
    pub docinfo_directory: Option<PathBuf>,
}

impl ConvertOptions {
    /// The fixed configuration every post is rendered with.
    pub fn standard(docinfo_directory: &Path) -> ConvertOptions {
        ConvertOptions {
            toc: TocPlacement::Left,
            section_anchors: true,
            source_highlighter: String::from("rouge"),
            stylesheet: String::new(),
            shared_docinfo: true,
            docinfo_directory: Some(docinfo_directory.to_owned()),
        }
    }

    /// Renders the options as `asciidoctor` attribute assignments (the
    /// arguments to `-a`).
    pub fn attributes(&self) -> Vec<String> {
        let mut attributes = vec![format!("toc={}", self.toc.as_str())];
        if self.section_anchors {
            attributes.push(String::from("sectanchors"));
        }
        attributes.push(format!("source-highlighter={}", self.source_highlighter));
        attributes.push(format!("stylesheet={}", self.stylesheet));
        if self.shared_docinfo {
            attributes.push(String::from("docinfo=shared"));
            if let Some(dir) = &self.docinfo_directory {
                attributes.push(format!("docinfodir={}", dir.display()));
            }
        }
        attributes
    }
}

/// Converts documents with the `asciidoctor` command line tool.
pub struct Asciidoctor {
    executable: PathBuf,
}

impl Asciidoctor {
    pub fn new<P: Into<PathBuf>>(executable: P) -> Asciidoctor {
        Asciidoctor {
            executable: executable.into(),
        }
    }
}

impl Converter for Asciidoctor {
    fn load(&self, source: &Path) -> Result<DocumentHeader> {
        let contents = std::fs::read_to_string(source).map_err(|err| Error::Read {
            path: source.to_owned(),
            err,
        })?;
        Ok(parse_header(&contents))
    }

    fn convert(&self, source: &Path, target: &Path, options: &ConvertOptions) -> Result<()> {
        let mut command = Command::new(&self.executable);
        for attribute in options.attributes() {
            command.arg("-a").arg(attribute);
        }
        command.arg("-o").arg(target).arg(source);

        debug!("Running {:?}", command);
        let output = command.output().map_err(|err| Error::Spawn {
            executable: self.executable.clone(),
            err,
        })?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !output.status.success() {
            return Err(Error::Failed {
                path: source.to_owned(),
                status: output.status,
                stderr: stderr.trim().to_owned(),
            });
        }

        // asciidoctor still exits 0 for things like unresolved includes.
        for line in stderr.lines().filter(|line| !line.trim().is_empty()) {
            warn!("{}", line);
        }
        Ok(())
    }
}

/// Reads the header of an AsciiDoc document.
///
/// The header ends at the first blank line after the title, or at the first
/// body line when there is no title. It may contain:
///
/// 1. Attribute entries (`:name: value`, or `:name!:` to unset)
/// 2. The document title (`= Title`)
/// 3. An author line directly after the title
/// 4. A revision line after the author line (`v1.0, 2024-01-01: remark`)
///
/// Comment lines (`//`) and comment blocks (`////`) are skipped. The date from
/// the revision line is exposed as the `revdate` attribute unless an explicit
/// `:revdate:` entry is present. A `:doctitle:` entry supplies the title when
/// there is no title line.
pub fn parse_header(input: &str) -> DocumentHeader {
    let mut header = DocumentHeader::default();
    let mut in_comment_block = false;
    let mut seen_title = false;
    let mut lines_after_title = 0;
    let mut revision_date = None;

    for line in input.lines() {
        let line = line.trim_end();
        if line == "////" {
            in_comment_block = !in_comment_block;
            continue;
        }
        if in_comment_block || line.starts_with("//") {
            continue;
        }
        if line.is_empty() {
            // attribute entries above the title may be separated from it
            if seen_title {
                break;
            }
            continue;
        }

        if let Some((name, value)) = parse_attribute_entry(line) {
            match value {
                Some(value) => {
                    header.attributes.insert(name, value);
                }
                None => {
                    header.attributes.remove(&name);
                }
            }
            continue;
        }

        if !seen_title {
            match line.strip_prefix("= ").or_else(|| line.strip_prefix("# ")) {
                Some(title) => {
                    header.title = Some(title.trim().to_owned());
                    seen_title = true;
                    continue;
                }
                // body content without a document title
                None => break,
            }
        }

        match lines_after_title {
            0 => {} // author line
            1 => revision_date = parse_revision_line(line),
            _ => break,
        }
        lines_after_title += 1;
    }

    if let Some(date) = revision_date {
        header
            .attributes
            .entry(String::from("revdate"))
            .or_insert(date);
    }
    if header.title.is_none() {
        header.title = header.attributes.get("doctitle").cloned();
    }
    header
}

// Parses `:name: value`, returning `None` for the value when the entry unsets
// the attribute (`:name!:` or `:!name:`).
fn parse_attribute_entry(line: &str) -> Option<(String, Option<String>)> {
    let rest = line.strip_prefix(':')?;
    let end = rest.find(':')?;
    let name = &rest[..end];
    let value = rest[end + 1..].trim();

    let (name, unset) = match (name.strip_prefix('!'), name.strip_suffix('!')) {
        (Some(name), _) | (None, Some(name)) => (name, true),
        (None, None) => (name, false),
    };
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !valid {
        return None;
    }

    let name = name.to_ascii_lowercase();
    match unset {
        true => Some((name, None)),
        false => Some((name, Some(value.to_owned()))),
    }
}

// Extracts the date from a revision line. The forms are `v1.0, date: remark`,
// `date: remark`, `date`, and `v1.0` (which carries no date).
fn parse_revision_line(line: &str) -> Option<String> {
    let date = match line.find(',') {
        Some(i) => &line[i + 1..],
        None => {
            let mut chars = line.chars();
            if chars.next() == Some('v') && chars.next().map_or(false, |c| c.is_ascii_digit()) {
                return None;
            }
            line
        }
    };
    let date = match date.find(": ") {
        Some(i) => &date[..i],
        None => date,
    };
    let date = date.trim().trim_end_matches(':').trim();
    match date.is_empty() {
        true => None,
        false => Some(date.to_owned()),
    }
}

/// The result of a fallible conversion operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error loading or converting a document.
#[derive(Debug)]
pub enum Error {
    /// Returned when the source document can't be read.
    Read { path: PathBuf, err: io::Error },

    /// Returned when the converter executable can't be started.
    Spawn { executable: PathBuf, err: io::Error },

    /// Returned when the converter exits unsuccessfully.
    Failed {
        path: PathBuf,
        status: ExitStatus,
        stderr: String,
    },
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Read { path, err: _ } => {
                write!(f, "Reading document '{}'", path.display())
            }
            Error::Spawn { executable, err: _ } => {
                write!(f, "Running '{}'", executable.display())
            }
            Error::Failed {
                path,
                status,
                stderr,
            } => {
                write!(f, "Converting '{}' failed ({})", path.display(), status)?;
                if !stderr.is_empty() {
                    write!(f, ": {}", stderr)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Read { path: _, err } => Some(err),
            Error::Spawn { executable: _, err } => Some(err),
            Error::Failed { .. } => None,
        }
    }
}


#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_header_title_and_attributes() {
        let header = parse_header(
            "= Hello, World\n:revdate: 2024-06-01\n:toc:\n\nBody text.\n:ignored: yes\n",
        );
        assert_eq!(Some("Hello, World"), header.title.as_deref());
        assert_eq!(Some("2024-06-01"), header.revdate());
        assert_eq!(Some(""), header.attribute("toc"));
        assert_eq!(None, header.attribute("ignored"));
    }

    #[test]
    fn test_parse_header_attributes_above_title() {
        let header = parse_header(":toc: left\n:revdate: 2024-06-01\n\n= Real Title\n\nBody\n");
        assert_eq!(Some("Real Title"), header.title.as_deref());
        assert_eq!(Some("left"), header.attribute("toc"));
        assert_eq!(Some("2024-06-01"), header.revdate());

        let header = parse_header(":toc: left\n\nBody without a title.\n\n= Too late\n");
        assert_eq!(None, header.title);
        assert_eq!(Some("left"), header.attribute("toc"));
    }

    #[test]
    fn test_parse_header_revision_line() {
        let header = parse_header("= Notes\nJane Doe <jane@example.org>\nv1.2, 2024-01-01: First draft\n\nBody");
        assert_eq!(Some("2024-01-01"), header.revdate());

        let header = parse_header("= Notes\nJane Doe\n2023-12-24\n");
        assert_eq!(Some("2023-12-24"), header.revdate());

        let header = parse_header("= Notes\nJane Doe\nv3.0\n");
        assert_eq!(None, header.revdate());
    }

    #[test]
    fn test_parse_header_explicit_revdate_wins() {
        let header = parse_header("= Notes\nJane Doe\nv1.0, 2020-01-01\n:revdate: 2021-02-02\n");
        assert_eq!(Some("2021-02-02"), header.revdate());
    }

    #[test]
    fn test_parse_header_skips_comments() {
        let header = parse_header(
            "// a leading comment\n////\n= Not the title\n////\n\n= Real Title\n:revdate: 2022-03-04\n",
        );
        assert_eq!(Some("Real Title"), header.title.as_deref());
        assert_eq!(Some("2022-03-04"), header.revdate());
    }

    #[test]
    fn test_parse_header_without_title() {
        let header = parse_header("Just a paragraph.\n\n= Too late\n");
        assert_eq!(DocumentHeader::default(), header);

        let header = parse_header(":doctitle: From Attribute\n:revdate!:\n\nBody\n");
        assert_eq!(Some("From Attribute"), header.title.as_deref());
        assert_eq!(None, header.revdate());
    }

    #[test]
    fn test_parse_header_section_title_is_not_document_title() {
        let header = parse_header("== Section\n\nBody\n");
        assert_eq!(None, header.title);
    }

    #[test]
    fn test_standard_options_attributes() {
        let options = ConvertOptions::standard(Path::new("content"));
        assert_eq!(
            vec![
                "toc=left",
                "sectanchors",
                "source-highlighter=rouge",
                "stylesheet=",
                "docinfo=shared",
                "docinfodir=content",
            ],
            options.attributes()
        );
    }

    #[test]
    fn test_convert_missing_executable() {
        let converter = Asciidoctor::new("./definitely-not-asciidoctor");
        let result = converter.convert(
            Path::new("post.adoc"),
            Path::new("post.html"),
            &ConvertOptions::standard(Path::new(".")),
        );
        match result {
            Err(Error::Spawn { executable, .. }) => {
                assert_eq!(PathBuf::from("./definitely-not-asciidoctor"), executable)
            }
            other => panic!("expected a spawn error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_missing_file() {
        let converter = Asciidoctor::new("asciidoctor");
        match converter.load(Path::new("./no/such/post.adoc")) {
            Err(Error::Read { .. }) => {}
            other => panic!("expected a read error, got {:?}", other),
        }
    }
}
