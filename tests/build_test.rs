use arpeggios::base_path::{Environment, Mode};
use arpeggios::build::build_feed;
use arpeggios::config::{Config, PROJECT_FILE};
use arpeggios::render::Dialect;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

fn write(root: &Path, relative: &str, contents: &str) -> Result<()> {
    let path = root.join(relative);
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    fs::write(path, contents)?;
    Ok(())
}

fn project(root: &Path, base_path: &str) -> Result<()> {
    write(
        root,
        PROJECT_FILE,
        &format!(
            "site: https://example.com\ncontent_directory: content/posts\n{}feed:\n  title: \"arpeggio's\"\n  description: Thoughts, notes, and findings\n",
            base_path
        ),
    )?;
    write(
        root,
        "content/posts/a.md",
        "---\ntitle: A\ndescription: da\ndate: 2024-01-01\n---\nbody\n",
    )?;
    write(
        root,
        "content/posts/b.md",
        "---\ntitle: B\ndescription: db\ndate: 2024-03-01\n---\nbody\n",
    )
}

#[test]
fn test_rss_feed_from_env_base_path() -> Result<()> {
    let dir = TempDir::new()?;
    project(dir.path(), "")?;
    let output = dir.path().join("dist");

    let config = Config::from_directory(dir.path(), &output, None)?;
    let env = Environment::new(Mode::Production).with_var("BASE_PATH", "/arpeggios/");
    build_feed(&config, &env)?;

    let xml = fs::read_to_string(output.join("rss.xml"))?;
    let b = xml
        .find("https://example.com/arpeggios/posts/b/")
        .ok_or("missing b")?;
    let a = xml
        .find("https://example.com/arpeggios/posts/a/")
        .ok_or("missing a")?;
    assert!(b < a, "most recent post should come first");
    assert!(xml.contains("<title>arpeggio&apos;s</title>") || xml.contains("<title>arpeggio's</title>"));
    Ok(())
}

#[test]
fn test_atom_feed_is_reproducible() -> Result<()> {
    let dir = TempDir::new()?;
    project(
        dir.path(),
        "base_path:\n  strategy: mode\n  production: /arpeggios/\n",
    )?;
    let output = dir.path().join("dist");
    let config = Config::from_directory(dir.path(), &output, Some(Dialect::Atom))?;

    build_feed(&config, &Environment::new(Mode::Development))?;
    let first = fs::read(output.join("feed.atom"))?;
    build_feed(&config, &Environment::new(Mode::Development))?;
    let second = fs::read(output.join("feed.atom"))?;

    assert_eq!(first, second);
    let xml = String::from_utf8(first)?;
    assert!(xml.contains("https://example.com/posts/b/"));
    assert!(!xml.contains("/arpeggios/"));
    Ok(())
}

#[test]
fn test_malformed_post_fails_build() -> Result<()> {
    let dir = TempDir::new()?;
    project(dir.path(), "")?;
    write(dir.path(), "content/posts/c.md", "---\ndate: 2024-05-01\n---\n")?;
    let output = dir.path().join("dist");

    let config = Config::from_directory(dir.path(), &output, None)?;
    let err = build_feed(&config, &Environment::default())
        .err()
        .ok_or("expected the build to fail")?;
    assert!(err.to_string().contains("missing its title"));
    let chain = format!("{:#}", anyhow::Error::from(err));
    assert_eq!(1, chain.matches("missing its title").count(), "{}", chain);
    assert_eq!(1, chain.matches("c.md").count(), "{}", chain);
    assert!(!output.join("rss.xml").exists());
    Ok(())
}
