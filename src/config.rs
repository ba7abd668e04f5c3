use crate::convert::ConvertOptions;
use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// The optional project file in the project root.
pub const PROJECT_FILE: &str = "blog.yaml";

/// Overrides read from the project file. Relative directories are resolved
/// against the project root, as is `asciidoctor` when it is a path rather than
/// a bare command name.
#[derive(Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct Project {
    #[serde(default)]
    content_directory: Option<PathBuf>,

    #[serde(default)]
    output_directory: Option<PathBuf>,

    #[serde(default)]
    asciidoctor: Option<PathBuf>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub content_directory: PathBuf,
    pub output_directory: PathBuf,

    /// Raw HTML for the index page's about section. Must exist.
    pub about_file: PathBuf,

    /// The optional YAML list of talks.
    pub talks_file: PathBuf,

    /// Where the converter looks for the shared `docinfo.html`.
    pub docinfo_directory: PathBuf,

    /// The `asciidoctor` executable.
    pub asciidoctor: PathBuf,
}

impl Config {
    /// Lays out a project around `content_directory`: the about-fragment,
    /// talks file, and docinfo all live inside it.
    pub fn new(content_directory: PathBuf, output_directory: PathBuf) -> Config {
        Config {
            about_file: content_directory.join("about.html"),
            talks_file: content_directory.join("talks.yml"),
            docinfo_directory: content_directory.clone(),
            content_directory,
            output_directory,
            asciidoctor: PathBuf::from("asciidoctor"),
        }
    }

    /// Loads the configuration for the project rooted at `dir`. Content is
    /// read from `{dir}/content` and written to `{dir}/build` unless
    /// `{dir}/blog.yaml` says otherwise. The `ASCIIDOCTOR` environment
    /// variable overrides the converter executable and is used as given.
    pub fn from_directory(dir: &Path) -> Result<Config> {
        let path = dir.join(PROJECT_FILE);
        let project = if path.exists() {
            Config::load_project_file(&path)
                .map_err(|e| anyhow!("Loading configuration: {:#}", e))?
        } else {
            Project::default()
        };

        let resolve = |path: Option<PathBuf>, default: &str| match path {
            Some(path) => dir.join(path),
            None => dir.join(default),
        };
        let mut config = Config::new(
            resolve(project.content_directory, "content"),
            resolve(project.output_directory, "build"),
        );
        if let Some(asciidoctor) = project.asciidoctor {
            // bare names are looked up on PATH
            config.asciidoctor = match asciidoctor.components().count() {
                1 => asciidoctor,
                _ => dir.join(asciidoctor),
            };
        }
        if let Some(asciidoctor) = std::env::var_os("ASCIIDOCTOR") {
            config.asciidoctor = PathBuf::from(asciidoctor);
        }
        Ok(config)
    }

    fn load_project_file(path: &Path) -> Result<Project> {
        use crate::util::read_file;
        let contents = read_file(path, "project")?;
        if contents.trim().is_empty() {
            return Ok(Project::default());
        }
        Ok(serde_yaml::from_str(&contents)?)
    }

    /// The fixed options every page is converted with.
    pub fn convert_options(&self) -> ConvertOptions {
        ConvertOptions::standard(&self.docinfo_directory)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_from_directory_defaults() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let config = Config::from_directory(dir.path())?;
        assert_eq!(dir.path().join("content"), config.content_directory);
        assert_eq!(dir.path().join("build"), config.output_directory);
        assert_eq!(dir.path().join("content/about.html"), config.about_file);
        assert_eq!(dir.path().join("content/talks.yml"), config.talks_file);
        assert_eq!(dir.path().join("content"), config.docinfo_directory);
        Ok(())
    }

    #[test]
    fn test_from_directory_project_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        std::fs::write(
            dir.path().join(PROJECT_FILE),
            "content_directory: posts\noutput_directory: /tmp/site\n",
        )?;
        let config = Config::from_directory(dir.path())?;
        assert_eq!(dir.path().join("posts"), config.content_directory);
        assert_eq!(PathBuf::from("/tmp/site"), config.output_directory);
        assert_eq!(dir.path().join("posts/about.html"), config.about_file);
        Ok(())
    }

    #[test]
    fn test_from_directory_project_file_asciidoctor() -> Result<()> {
        if std::env::var_os("ASCIIDOCTOR").is_some() {
            return Ok(());
        }
        let dir = tempfile::tempdir()?;
        let project_file = dir.path().join(PROJECT_FILE);

        std::fs::write(&project_file, "asciidoctor: bin/asciidoctor\n")?;
        let config = Config::from_directory(dir.path())?;
        assert_eq!(dir.path().join("bin/asciidoctor"), config.asciidoctor);

        std::fs::write(&project_file, "asciidoctor: asciidoctor-next\n")?;
        let config = Config::from_directory(dir.path())?;
        assert_eq!(PathBuf::from("asciidoctor-next"), config.asciidoctor);
        Ok(())
    }

    #[test]
    fn test_from_directory_malformed_project_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        std::fs::write(dir.path().join(PROJECT_FILE), "content_dir: typo\n")?;
        assert!(Config::from_directory(dir.path()).is_err());
        Ok(())
    }

    #[test]
    fn test_from_directory_empty_project_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        std::fs::write(dir.path().join(PROJECT_FILE), "\n")?;
        let config = Config::from_directory(dir.path())?;
        assert_eq!(dir.path().join("content"), config.content_directory);
        Ok(())
    }

    #[test]
    fn test_convert_options_use_docinfo_directory() {
        let config = Config::new(PathBuf::from("site/content"), PathBuf::from("site/build"));
        assert_eq!(
            Some(PathBuf::from("site/content")),
            config.convert_options().docinfo_directory
        );
    }
}
