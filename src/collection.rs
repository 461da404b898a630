//! Defines the [`ContentSource`] trait through which the feed gets its posts,
//! and [`Directory`], a source that reads Markdown files with YAML
//! frontmatter from disk.

use crate::item::{parse_date, ContentItem, MalformedItem, RawItem};
use serde::Deserialize;
use std::convert::TryFrom;
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const EXTENSIONS: &[&str] = &["md", "mdx"];
const BUNDLE_STEM: &str = "index";

/// Supplies the content collection. Errors propagate to the caller unchanged;
/// a source never retries and never returns a partial collection.
pub trait ContentSource {
    fn load(&self) -> Result<Vec<ContentItem>>;
}

impl ContentSource for Vec<ContentItem> {
    fn load(&self) -> Result<Vec<ContentItem>> {
        Ok(self.clone())
    }
}

/// Loads posts from a directory tree. Each post source file must be
/// structured as follows:
///
/// 1. Initial frontmatter fence (`---`)
/// 2. YAML frontmatter with fields `title`, `date`, and optionally
///    `description` and `slug`
/// 3. Terminal frontmatter fence (`---`)
/// 4. Post body (ignored)
///
/// For example:
///
/// ```md
/// ---
/// title: Hello, world!
/// description: A greeting
/// date: 2024-04-16
/// ---
/// # Hello
/// ```
///
/// When `slug` is absent, it is derived from the file's path relative to the
/// directory (`notes/Hello World.md` becomes `notes/hello-world`, and a
/// bundle such as `notes/index.md` becomes `notes`).
pub struct Directory {
    root: PathBuf,
}

impl Directory {
    pub fn new<P: Into<PathBuf>>(root: P) -> Directory {
        Directory { root: root.into() }
    }

    fn parse_item(&self, path: &Path) -> Result<ContentItem> {
        match self._parse_item(path) {
            Ok(item) => Ok(item),
            Err(e) => Err(Error::Annotated(
                format!("parsing post `{}`", path.display()),
                Box::new(e),
            )),
        }
    }

    fn _parse_item(&self, path: &Path) -> Result<ContentItem> {
        fn frontmatter_indices(input: &str) -> Result<(usize, usize)> {
            const FENCE: &str = "---";
            if !input.starts_with(FENCE) {
                return Err(Error::FrontmatterMissingStartFence);
            }
            match input[FENCE.len()..].find(FENCE) {
                None => Err(Error::FrontmatterMissingEndFence),
                Some(offset) => Ok((
                    FENCE.len(),          // yaml_start
                    FENCE.len() + offset, // yaml_stop
                )),
            }
        }

        use std::io::Read;
        let mut contents = String::new();
        File::open(path)?.read_to_string(&mut contents)?;
        let input = contents.trim_start_matches('\u{feff}');

        let (yaml_start, yaml_stop) = frontmatter_indices(input)?;
        let frontmatter: Frontmatter = serde_yaml::from_str(&input[yaml_start..yaml_stop])?;

        let slug = match frontmatter.slug {
            Some(slug) => slug,
            None => self.derive_slug(path)?,
        };
        let publish_date = match frontmatter.date {
            Some(date) => Some(parse_date(&date).map_err(|err| Error::DateTimeParse {
                input: date.clone(),
                err,
            })?),
            None => None,
        };

        Ok(ContentItem::try_from(RawItem {
            slug: Some(slug),
            title: frontmatter.title,
            description: frontmatter.description,
            publish_date,
        })?)
    }

    fn derive_slug(&self, path: &Path) -> Result<String> {
        let relative = path
            .strip_prefix(&self.root)
            .map_err(|_| InvalidFileNameError(path.to_owned()))?
            .with_extension("");
        let mut components = relative
            .iter()
            .map(|component| {
                component
                    .to_str()
                    .map(slug::slugify)
                    .ok_or_else(|| InvalidFileNameError(path.to_owned()))
            })
            .collect::<std::result::Result<Vec<String>, _>>()?;
        if components.len() > 1 && components.last().map(String::as_str) == Some(BUNDLE_STEM) {
            components.pop();
        }
        Ok(components.join("/"))
    }

    fn is_post(path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| EXTENSIONS.contains(&ext))
            .unwrap_or(false)
    }
}

impl ContentSource for Directory {
    /// Walks the directory and parses every post file. Entries are visited in
    /// file-name order so that the collection's order doesn't depend on the
    /// file system.
    fn load(&self) -> Result<Vec<ContentItem>> {
        let mut items = Vec::new();
        for result in WalkDir::new(&self.root).sort_by(|a, b| a.file_name().cmp(b.file_name())) {
            let entry = result?;
            if entry.file_type().is_file() && Self::is_post(entry.path()) {
                items.push(self.parse_item(entry.path())?);
            }
        }
        log::debug!("Loaded {} posts from `{}`", items.len(), self.root.display());
        Ok(items)
    }
}

#[derive(Deserialize)]
struct Frontmatter {
    #[serde(default)]
    title: Option<String>,

    #[serde(default)]
    description: Option<String>,

    /// Kept as a string so that both bare dates and full timestamps parse.
    #[serde(default)]
    date: Option<String>,

    #[serde(default)]
    slug: Option<String>,
}

#[derive(Debug)]
pub struct InvalidFileNameError(PathBuf);

impl fmt::Display for InvalidFileNameError {
    /// Displays an [`InvalidFileNameError`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "invalid file name: {:?}", &self.0)
    }
}

impl std::error::Error for InvalidFileNameError {}

/// Represents the result of loading a collection.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error loading a collection.
#[derive(Debug)]
pub enum Error {
    /// Returned when a post source file is missing its starting frontmatter
    /// fence (`---`).
    FrontmatterMissingStartFence,

    /// Returned when a post source file is missing its terminal frontmatter
    /// fence.
    FrontmatterMissingEndFence,

    /// Returned when there was an error parsing the frontmatter as YAML.
    DeserializeYaml(serde_yaml::Error),

    /// Returned when a post's date can't be parsed.
    DateTimeParse {
        input: String,
        err: chrono::ParseError,
    },

    /// Returned when a post lacks a required field.
    MalformedItem(MalformedItem),

    /// Returned for other I/O errors.
    Io(std::io::Error),

    /// Returned for WalkDir I/O errors.
    WalkDir(walkdir::Error),

    /// Returned when a source file's name isn't valid UTF-8.
    InvalidFileName(InvalidFileNameError),

    /// An error with an annotation.
    Annotated(String, Box<Error>),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::FrontmatterMissingStartFence => {
                write!(f, "Post must begin with `---`")
            }
            Error::FrontmatterMissingEndFence => {
                write!(f, "Missing closing `---`")
            }
            Error::DeserializeYaml(err) => err.fmt(f),
            Error::DateTimeParse { input, err } => {
                write!(f, "Parsing date `{}`: {}", input, err)
            }
            Error::MalformedItem(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
            Error::WalkDir(err) => err.fmt(f),
            Error::InvalidFileName(err) => err.fmt(f),
            Error::Annotated(annotation, err) => {
                write!(f, "{}: {}", &annotation, err)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    /// Each variant's message already includes the wrapped error, so the
    /// source is that error's own source.
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::FrontmatterMissingStartFence => None,
            Error::FrontmatterMissingEndFence => None,
            Error::DeserializeYaml(err) => std::error::Error::source(err),
            Error::DateTimeParse { input: _, err } => std::error::Error::source(err),
            Error::MalformedItem(err) => std::error::Error::source(err),
            Error::Io(err) => std::error::Error::source(err),
            Error::WalkDir(err) => std::error::Error::source(err),
            Error::InvalidFileName(err) => std::error::Error::source(err),
            Error::Annotated(_, err) => std::error::Error::source(err.as_ref()),
        }
    }
}

impl From<InvalidFileNameError> for Error {
    fn from(err: InvalidFileNameError) -> Error {
        Error::InvalidFileName(err)
    }
}

impl From<MalformedItem> for Error {
    fn from(err: MalformedItem) -> Error {
        Error::MalformedItem(err)
    }
}

impl From<serde_yaml::Error> for Error {
    /// Converts a [`serde_yaml::Error`] into an [`Error`]. It allows us to use
    /// the `?` operator for [`serde_yaml`] deserialization functions.
    fn from(err: serde_yaml::Error) -> Error {
        Error::DeserializeYaml(err)
    }
}

impl From<walkdir::Error> for Error {
    /// Converts a [`walkdir::Error`] into an [`Error`]. It allows us to
    /// use the `?` operator while walking the directory.
    fn from(err: walkdir::Error) -> Error {
        Error::WalkDir(err)
    }
}

impl From<std::io::Error> for Error {
    /// Converts a [`std::io::Error`] into an [`Error`]. It allows us to
    /// use the `?` operator for fallible I/O functions.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::item::Field;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, relative: &str, contents: &str) {
        let path = dir.path().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn root_error(err: &Error) -> &Error {
        match err {
            Error::Annotated(_, inner) => root_error(inner),
            err => err,
        }
    }

    #[test]
    fn test_load_posts() -> Result<()> {
        let dir = TempDir::new()?;
        write(
            &dir,
            "first-post.md",
            "---\ntitle: First\ndescription: The first\ndate: 2024-01-01\n---\n# Body\n",
        );
        write(
            &dir,
            "notes/Second Post.mdx",
            "---\ntitle: Second\ndate: 2024-03-01T08:00:00Z\n---\n",
        );
        write(&dir, "bundle/index.md", "---\ntitle: Bundle\ndate: 2024-02-01\n---\n");
        write(
            &dir,
            "custom.md",
            "---\ntitle: Custom\nslug: my-custom-slug\ndate: 2024-02-02\n---\n",
        );
        write(&dir, "README.txt", "not a post");

        let items = Directory::new(dir.path()).load()?;
        let slugs: Vec<&str> = items.iter().map(|i| i.slug.as_str()).collect();
        assert_eq!(
            vec!["bundle", "my-custom-slug", "first-post", "notes/second-post"],
            slugs
        );
        assert_eq!("The first", items[2].description);
        assert_eq!("", items[3].description);
        assert_eq!(parse_date("2024-03-01T08:00:00Z").unwrap(), items[3].publish_date);
        Ok(())
    }

    #[test]
    fn test_missing_title_is_malformed() -> Result<()> {
        let dir = TempDir::new()?;
        write(&dir, "untitled.md", "---\ndate: 2024-01-01\n---\n");
        let err = Directory::new(dir.path()).load().unwrap_err();
        match root_error(&err) {
            Error::MalformedItem(err) => {
                assert_eq!(Field::Title, err.field);
                assert_eq!(Some("untitled".to_owned()), err.slug);
            }
            other => panic!("expected a malformed item, got {:?}", other),
        }
        assert!(err.to_string().contains("untitled.md"));
        assert!(std::error::Error::source(&err).is_none());
        Ok(())
    }

    #[test]
    fn test_missing_date_is_malformed() -> Result<()> {
        let dir = TempDir::new()?;
        write(&dir, "undated.md", "---\ntitle: Undated\n---\n");
        let err = Directory::new(dir.path()).load().unwrap_err();
        match root_error(&err) {
            Error::MalformedItem(err) => assert_eq!(Field::PublishDate, err.field),
            other => panic!("expected a malformed item, got {:?}", other),
        }
        Ok(())
    }

    #[test]
    fn test_bad_date() -> Result<()> {
        let dir = TempDir::new()?;
        write(&dir, "post.md", "---\ntitle: Post\ndate: someday\n---\n");
        let err = Directory::new(dir.path()).load().unwrap_err();
        assert!(matches!(root_error(&err), Error::DateTimeParse { .. }));
        Ok(())
    }

    #[test]
    fn test_missing_fences() -> Result<()> {
        let dir = TempDir::new()?;
        write(&dir, "a.md", "title: A\n");
        let err = Directory::new(dir.path()).load().unwrap_err();
        assert!(matches!(root_error(&err), Error::FrontmatterMissingStartFence));

        let dir = TempDir::new()?;
        write(&dir, "a.md", "---\ntitle: A\n");
        let err = Directory::new(dir.path()).load().unwrap_err();
        assert!(matches!(root_error(&err), Error::FrontmatterMissingEndFence));
        Ok(())
    }

    #[test]
    fn test_missing_directory() {
        let err = Directory::new("/definitely/not/a/real/directory").load().unwrap_err();
        assert!(matches!(err, Error::WalkDir(_)));
    }

    #[test]
    fn test_in_memory_source() -> Result<()> {
        let items: Vec<ContentItem> = Vec::new();
        assert!(items.load()?.is_empty());
        Ok(())
    }
}
