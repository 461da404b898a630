//! Builds feed links out of a site origin, a base path, and path segments.
//! Parts are split on `/` and empty segments are dropped, so a link never
//! contains a doubled `/` after its origin and always ends with `/`.

use url::Url;

/// The literal segment under which post pages live.
pub const POSTS_SEGMENT: &str = "posts";

/// Returns the link to a post, e.g. `https://example.com/arpeggios/posts/foo/`
/// or, without an origin, `/arpeggios/posts/foo/`.
pub fn post_link(site_origin: Option<&Url>, base_path: &str, slug: &str) -> String {
    let mut link = Link::new(site_origin, base_path);
    link.push(POSTS_SEGMENT);
    link.push(slug);
    link.finish()
}

/// Returns the link to the site's home page (the base path, qualified with
/// the origin if there is one).
pub fn home_link(site_origin: Option<&Url>, base_path: &str) -> String {
    Link::new(site_origin, base_path).finish()
}

struct Link {
    origin: String,
    segments: Vec<String>,
}

/// The site origin without its query, fragment, or trailing `/`.
fn origin_prefix(site_origin: &Url) -> String {
    let mut origin = site_origin.clone();
    origin.set_query(None);
    origin.set_fragment(None);
    origin.as_str().trim_end_matches('/').to_owned()
}

impl Link {
    /// Constructs a new `Link`.
    ///
    /// # Arguments
    ///
    /// * `site_origin` - prefixed onto the link if present.
    /// * `base_path` - the first path segments. If it is already a
    ///   fully-qualified URL, it carries its own origin and `site_origin` is
    ///   ignored.
    fn new(site_origin: Option<&Url>, base_path: &str) -> Link {
        let (origin, path) = match Url::parse(base_path) {
            Ok(url) if url.has_host() => (
                url.origin().ascii_serialization(),
                url.path().to_owned(),
            ),
            _ => (
                site_origin.map(origin_prefix).unwrap_or_default(),
                base_path.to_owned(),
            ),
        };
        let mut link = Link {
            origin,
            segments: Vec::new(),
        };
        link.push(&path);
        link
    }

    fn push(&mut self, part: &str) {
        self.segments.extend(
            part.split('/')
                .map(str::trim)
                .filter(|segment| !segment.is_empty())
                .map(str::to_owned),
        );
    }

    fn finish(self) -> String {
        let mut out = self.origin;
        out.push('/');
        if !self.segments.is_empty() {
            out.push_str(&self.segments.join("/"));
            out.push('/');
        }
        out
    }
}
