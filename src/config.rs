//! Loads the project file (`arpeggios.yaml`) into a [`Config`].

use crate::base_path::BasePathStrategy;
use crate::feed::FeedMetadata;
use crate::render::Dialect;
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs::File;
use std::path::{Path, PathBuf};
use url::Url;

pub const PROJECT_FILE: &str = "arpeggios.yaml";

#[derive(Deserialize)]
struct ContentDirectory(PathBuf);
impl Default for ContentDirectory {
    fn default() -> Self {
        ContentDirectory(PathBuf::from("posts"))
    }
}

#[derive(Deserialize)]
struct Project {
    #[serde(default)]
    pub site: Option<Url>,

    #[serde(default)]
    pub content_directory: ContentDirectory,

    #[serde(default)]
    pub base_path: BasePathStrategy,

    pub feed: Feed,
}

#[derive(Deserialize)]
struct Feed {
    title: String,

    #[serde(default)]
    description: String,

    #[serde(default)]
    dialect: Dialect,

    #[serde(default)]
    output: Option<PathBuf>,

    #[serde(default)]
    max_entries: Option<usize>,

    #[serde(default)]
    require_entries: bool,
}

pub struct Config {
    pub site_origin: Option<Url>,
    pub content_directory: PathBuf,
    pub base_path: BasePathStrategy,
    pub metadata: FeedMetadata,
    pub dialect: Dialect,
    pub output_file: PathBuf,
    pub max_entries: Option<usize>,
    pub require_entries: bool,
}

impl Config {
    /// Looks for `arpeggios.yaml` in `dir` and then in each of its ancestors.
    /// `dir` is canonicalized first, so a relative start such as `.` still
    /// climbs past the current directory.
    pub fn from_directory(
        dir: &Path,
        output_directory: &Path,
        dialect: Option<Dialect>,
    ) -> Result<Config> {
        let start = dir
            .canonicalize()
            .with_context(|| format!("Resolving project directory `{}`", dir.display()))?;
        for dir in start.ancestors() {
            let path = dir.join(PROJECT_FILE);
            if path.exists() {
                return Config::from_project_file(&path, output_directory, dialect)
                    .with_context(|| format!("Loading configuration `{}`", path.display()));
            }
        }
        Err(anyhow!(
            "Could not find `{}` in any parent directory of `{}`",
            PROJECT_FILE,
            start.display()
        ))
    }

    /// Loads a specific project file. `dialect`, when given, overrides the
    /// one in the file.
    pub fn from_project_file(
        path: &Path,
        output_directory: &Path,
        dialect: Option<Dialect>,
    ) -> Result<Config> {
        let file = File::open(path)
            .with_context(|| format!("Opening project file `{}`", path.display()))?;
        let project: Project = serde_yaml::from_reader(file)?;
        let project_root = path.parent().ok_or_else(|| {
            anyhow!(
                "Can't get parent directory for provided project file path '{:?}'",
                path
            )
        })?;

        let dialect = dialect.unwrap_or(project.feed.dialect);
        let output = project
            .feed
            .output
            .unwrap_or_else(|| PathBuf::from(dialect.default_file_name()));

        Ok(Config {
            site_origin: project.site,
            content_directory: project_root.join(project.content_directory.0),
            base_path: project.base_path,
            metadata: FeedMetadata {
                title: project.feed.title,
                description: project.feed.description,
            },
            dialect,
            output_file: output_directory.join(output),
            max_entries: project.feed.max_entries,
            require_entries: project.feed.require_entries,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() -> Result<()> {
        let dir = TempDir::new()?;
        fs::write(dir.path().join(PROJECT_FILE), "feed:\n  title: arpeggio's\n")?;
        let config = Config::from_directory(dir.path(), Path::new("dist"), None)?;
        assert_eq!(None, config.site_origin);
        assert_eq!(dir.path().canonicalize()?.join("posts"), config.content_directory);
        assert_eq!(BasePathStrategy::default(), config.base_path);
        assert_eq!("", config.metadata.description);
        assert_eq!(Dialect::Rss, config.dialect);
        assert_eq!(PathBuf::from("dist/rss.xml"), config.output_file);
        assert_eq!(None, config.max_entries);
        assert!(!config.require_entries);
        Ok(())
    }

    #[test]
    fn test_full_project_from_subdirectory() -> Result<()> {
        let dir = TempDir::new()?;
        fs::write(
            dir.path().join(PROJECT_FILE),
            r#"
site: https://tiagovicente2.github.io
content_directory: src/content/posts
base_path:
  strategy: fixed
  path: /arpeggios/
feed:
  title: "arpeggio's"
  description: "Thoughts, notes, and findings"
  dialect: atom
  output: feeds/all.atom
  max_entries: 20
  require_entries: true
"#,
        )?;
        let nested = dir.path().join("src").join("content");
        fs::create_dir_all(&nested)?;

        let config = Config::from_directory(&nested, Path::new("out"), None)?;
        assert_eq!(
            Some(Url::parse("https://tiagovicente2.github.io")?),
            config.site_origin
        );
        assert_eq!(
            dir.path().canonicalize()?.join("src/content/posts"),
            config.content_directory
        );
        assert_eq!(
            BasePathStrategy::Fixed {
                path: "/arpeggios/".to_owned()
            },
            config.base_path
        );
        assert_eq!(Dialect::Atom, config.dialect);
        assert_eq!(PathBuf::from("out/feeds/all.atom"), config.output_file);
        assert_eq!(Some(20), config.max_entries);
        assert!(config.require_entries);
        Ok(())
    }

    #[test]
    fn test_dialect_override_picks_file_name() -> Result<()> {
        let dir = TempDir::new()?;
        fs::write(dir.path().join(PROJECT_FILE), "feed:\n  title: t\n")?;
        let config = Config::from_directory(dir.path(), Path::new("dist"), Some(Dialect::Atom))?;
        assert_eq!(Dialect::Atom, config.dialect);
        assert_eq!(PathBuf::from("dist/feed.atom"), config.output_file);
        Ok(())
    }

    #[test]
    fn test_missing_project_file() -> Result<()> {
        let dir = TempDir::new()?;
        let err = Config::from_directory(&dir.path().join("absent"), Path::new("dist"), None)
            .err()
            .ok_or_else(|| anyhow!("expected an error"))?;
        assert!(err.to_string().starts_with("Resolving project directory"));
        Ok(())
    }

    #[test]
    fn test_invalid_project_file() -> Result<()> {
        let dir = TempDir::new()?;
        fs::write(dir.path().join(PROJECT_FILE), "feed: [not, a, map]\n")?;
        let err = Config::from_directory(dir.path(), Path::new("dist"), None)
            .err()
            .ok_or_else(|| anyhow!("expected an error"))?;
        assert!(err.to_string().starts_with("Loading configuration"));
        Ok(())
    }
}
