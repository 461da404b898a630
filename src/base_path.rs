//! Resolves the site's base path: the root under which the site is served
//! (e.g. `/` or `/arpeggios/`). Which policy applies is a single
//! [`BasePathStrategy`] value chosen in the project file, and resolution reads
//! from an explicit [`Environment`] rather than from the process directly.

use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use url::Url;

const ROOT: &str = "/";
const DEFAULT_VARIABLE: &str = "BASE_PATH";

/// Whether the site is being built for development or production.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Development,
    Production,
}

impl Default for Mode {
    fn default() -> Self {
        Mode::Production
    }
}

impl FromStr for Mode {
    type Err = UnknownMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "development" | "dev" => Ok(Mode::Development),
            "production" | "prod" => Ok(Mode::Production),
            _ => Err(UnknownMode(s.to_owned())),
        }
    }
}

/// Returned when parsing a [`Mode`] from an unrecognized string.
#[derive(Debug)]
pub struct UnknownMode(String);

impl fmt::Display for UnknownMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "unknown mode `{}` (expected `development` or `production`)",
            self.0
        )
    }
}

impl std::error::Error for UnknownMode {}

/// A snapshot of the process configuration the resolver may consult.
/// Captured once by the driver; tests build one directly.
#[derive(Clone, Debug, Default)]
pub struct Environment {
    vars: HashMap<String, String>,
    mode: Mode,
}

impl Environment {
    /// Creates an empty environment in the given mode.
    pub fn new(mode: Mode) -> Environment {
        Environment {
            vars: HashMap::new(),
            mode,
        }
    }

    /// Captures the current process's environment variables.
    pub fn from_process(mode: Mode) -> Environment {
        Environment {
            vars: std::env::vars().collect(),
            mode,
        }
    }

    /// Sets a variable, replacing any previous value.
    pub fn with_var(mut self, name: &str, value: &str) -> Environment {
        self.vars.insert(name.to_owned(), value.to_owned());
        self
    }

    /// Returns the named variable, treating a blank value as unset.
    pub fn var(&self, name: &str) -> Option<&str> {
        self.vars
            .get(name)
            .map(String::as_str)
            .filter(|value| !value.trim().is_empty())
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }
}

/// How the base path is derived. Deserialized from the `base_path` block of
/// the project file, tagged by `strategy`:
///
/// ```yaml
/// base_path:
///   strategy: mode
///   production: /arpeggios/
/// ```
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "strategy", rename_all = "kebab-case")]
pub enum BasePathStrategy {
    /// Always the given path.
    Fixed { path: String },

    /// The value of an environment variable, or `default` when it is unset.
    Env {
        #[serde(default = "default_variable")]
        name: String,
        #[serde(default = "root")]
        default: String,
    },

    /// One path for development builds and another for production builds.
    Mode {
        #[serde(default = "root")]
        development: String,
        production: String,
    },

    /// `path` resolved against `origin`, yielding a fully-qualified URL.
    SiteRelative {
        origin: String,
        #[serde(default = "root")]
        path: String,
    },
}

fn default_variable() -> String {
    DEFAULT_VARIABLE.to_owned()
}

fn root() -> String {
    ROOT.to_owned()
}

impl Default for BasePathStrategy {
    fn default() -> Self {
        BasePathStrategy::Env {
            name: default_variable(),
            default: root(),
        }
    }
}

impl BasePathStrategy {
    /// Resolves the base path. Never fails: every strategy has a usable
    /// fallback. The result always ends with `/`; bare paths also start with
    /// exactly one `/`.
    pub fn resolve(&self, env: &Environment) -> String {
        let resolved = match self {
            BasePathStrategy::Fixed { path } => normalize(path),
            BasePathStrategy::Env { name, default } => {
                normalize(env.var(name).unwrap_or(default))
            }
            BasePathStrategy::Mode {
                development,
                production,
            } => normalize(match env.mode() {
                Mode::Development => development,
                Mode::Production => production,
            }),
            BasePathStrategy::SiteRelative { origin, path } => {
                match Url::parse(origin).and_then(|origin| origin.join(path)) {
                    Ok(url) => with_trailing_slash(url.into()),
                    Err(e) => {
                        log::warn!(
                            "Resolving `{}` against origin `{}`: {}; using the bare path",
                            path,
                            origin,
                            e
                        );
                        normalize(path)
                    }
                }
            }
        };
        log::debug!("Resolved base path `{}` from {:?}", resolved, self);
        resolved
    }
}

/// Collapses a path to `/seg/seg/` form: one leading `/`, one trailing `/`,
/// no empty segments. An empty path becomes `/`.
pub fn normalize(path: &str) -> String {
    let segments: Vec<&str> = path
        .trim()
        .split('/')
        .filter(|segment| !segment.is_empty())
        .collect();
    if segments.is_empty() {
        root()
    } else {
        format!("/{}/", segments.join("/"))
    }
}

fn with_trailing_slash(mut url: String) -> String {
    if !url.ends_with('/') {
        url.push('/');
    }
    url
}
