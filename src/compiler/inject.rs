//! `<link>` and `<script>` tag injection into finished pages.
//!
//! # Placement
//!
//! | Tags                 | Inserted before        |
//! |----------------------|------------------------|
//! | style links          | first `</head>`        |
//! | `inject = "head"`    | first `</head>`, after the links |
//! | `inject = "body"`    | last `</body>`         |
//!
//! A missing closing tag skips that group. Within each group tags keep
//! their order: shared-injection references first, then the page's own.

use std::fmt::Write;

use super::StyleHashIndex;
use crate::config::{AttrValue, Inject, ScriptRef, StyleRef};
use crate::core::ChunkMap;
use crate::debug;
use crate::utils::html::{escape_attr, insert_before_first, insert_before_last};
use crate::utils::path::url_path;

const HEAD_CLOSE: &str = "</head>";
const BODY_CLOSE: &str = "</body>";

/// Everything injected into one page, in final order.
#[derive(Debug, Default)]
pub struct Injection<'a> {
    pub styles: Vec<&'a StyleRef>,
    pub scripts: Vec<&'a ScriptRef>,
}

impl<'a> Injection<'a> {
    /// Append another entry's references after the ones already queued.
    pub fn extend(&mut self, styles: &'a [StyleRef], scripts: &'a [ScriptRef]) {
        self.styles.extend(styles);
        self.scripts.extend(scripts);
    }
}

/// Inject `injection` into `html`.
///
/// Style hrefs prefer the hashed filename last recorded for the import and
/// fall back to the configured filename. Scripts whose chunk the bundler did
/// not emit are skipped.
pub fn inject(
    html: &mut String,
    injection: &Injection<'_>,
    hashes: &StyleHashIndex,
    chunks: &ChunkMap,
) {
    let mut head = String::new();
    for style in &injection.styles {
        let filename = hashes.get(&style.import).unwrap_or(style.filename.as_str());
        let _ = write!(
            head,
            r#"<link rel="stylesheet" href="{}">"#,
            escape_attr(&url_path(filename))
        );
    }

    let mut body = String::new();
    for script in &injection.scripts {
        let Some(file) = chunks.first_file(&script.name) else {
            debug!("inject"; "chunk `{}` was not emitted, skipping its script tag", script.name);
            continue;
        };
        let tag = render_script(script, file);
        match script.inject {
            Inject::Head => head.push_str(&tag),
            Inject::Body => body.push_str(&tag),
        }
    }

    if !head.is_empty() && !insert_before_first(html, HEAD_CLOSE, &head) {
        debug!("inject"; "no {} found, skipping head tags", HEAD_CLOSE);
    }
    if !body.is_empty() && !insert_before_last(html, BODY_CLOSE, &body) {
        debug!("inject"; "no {} found, skipping body scripts", BODY_CLOSE);
    }
}

/// `<script id="x" defer src="/js/a.js"></script>`
fn render_script(script: &ScriptRef, file: &str) -> String {
    let mut tag = String::from("<script");
    for (name, value) in &script.attributes {
        match value {
            // Any boolean renders bare, `false` included.
            AttrValue::Flag(_) => {
                let _ = write!(tag, " {name}");
            }
            AttrValue::Text(text) => {
                let _ = write!(tag, r#" {name}="{}""#, escape_attr(text));
            }
        }
    }
    let _ = write!(tag, r#" src="{}"></script>"#, escape_attr(&url_path(file)));
    tag
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::{Path, PathBuf};

    const PAGE: &str = "<html><head><title>T</title></head><body><p>x</p></body></html>";

    fn style(import: &str, filename: &str) -> StyleRef {
        StyleRef {
            import: PathBuf::from(import),
            filename: filename.to_string(),
        }
    }

    fn script(name: &str, inject: Inject, attributes: Vec<(&str, AttrValue)>) -> ScriptRef {
        ScriptRef {
            name: name.to_string(),
            inject,
            attributes: attributes
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        }
    }

    fn chunks() -> ChunkMap {
        let mut chunks = ChunkMap::new();
        chunks.insert("index", vec!["js/index.js".into(), "js/index.js.map".into()]);
        chunks.insert("vendor", vec!["js/vendor.js".into()]);
        chunks.insert("lib", vec!["/js//lib.js".into()]);
        chunks
    }

    #[test]
    fn test_global_styles_precede_page_styles() {
        let global = [style("/s/g1.scss", "css/g1.css"), style("/s/g2.scss", "css/g2.css")];
        let own = [style("/s/p1.scss", "css/p1.css")];

        let mut injection = Injection::default();
        injection.extend(&global, &[]);
        injection.extend(&own, &[]);

        let mut html = PAGE.to_string();
        inject(&mut html, &injection, &StyleHashIndex::new(), &ChunkMap::new());

        assert_eq!(
            html,
            "<html><head><title>T</title>\
             <link rel=\"stylesheet\" href=\"/css/g1.css\">\
             <link rel=\"stylesheet\" href=\"/css/g2.css\">\
             <link rel=\"stylesheet\" href=\"/css/p1.css\">\
             </head><body><p>x</p></body></html>"
        );
    }

    #[test]
    fn test_hashed_name_preferred_and_separators_collapsed() {
        let styles = [
            style("/s/app.scss", "css/[contenthash].css"),
            style("/s/lib.scss", "//css\\\\lib.css"),
        ];
        let mut hashes = StyleHashIndex::new();
        hashes.record(Path::new("/s/app.scss"), "css/0123456789ab.css".into());

        let mut injection = Injection::default();
        injection.extend(&styles, &[]);

        let mut html = PAGE.to_string();
        inject(&mut html, &injection, &hashes, &ChunkMap::new());

        assert!(html.contains(r#"href="/css/0123456789ab.css""#));
        assert!(html.contains(r#"href="/css/lib.css""#));
    }

    #[test]
    fn test_scripts_grouped_by_injection_point() {
        let scripts = [
            script("index", Inject::Body, vec![]),
            script("vendor", Inject::Head, vec![]),
            script("lib", Inject::Body, vec![]),
        ];
        let styles = [style("/s/a.scss", "a.css")];

        let mut injection = Injection::default();
        injection.extend(&styles, &scripts);

        let mut html = PAGE.to_string();
        inject(&mut html, &injection, &StyleHashIndex::new(), &chunks());

        assert_eq!(
            html,
            "<html><head><title>T</title>\
             <link rel=\"stylesheet\" href=\"/a.css\">\
             <script src=\"/js/vendor.js\"></script>\
             </head><body><p>x</p>\
             <script src=\"/js/index.js\"></script>\
             <script src=\"/js/lib.js\"></script>\
             </body></html>"
        );
    }

    #[test]
    fn test_body_scripts_go_before_last_body_close() {
        let scripts = [script("index", Inject::Body, vec![])];
        let mut injection = Injection::default();
        injection.extend(&[], &scripts);

        let mut html = "<head></head><body><template></body></template></body>".to_string();
        inject(&mut html, &injection, &StyleHashIndex::new(), &chunks());

        assert_eq!(
            html,
            "<head></head><body><template></body></template>\
             <script src=\"/js/index.js\"></script></body>"
        );
    }

    #[test]
    fn test_attributes_render_in_order() {
        let scripts = [script(
            "index",
            Inject::Body,
            vec![
                ("id", AttrValue::Text("the\"Id".into())),
                ("defer", AttrValue::Flag(true)),
                ("async", AttrValue::Flag(false)),
                ("type", AttrValue::Text("module".into())),
            ],
        )];
        let mut injection = Injection::default();
        injection.extend(&[], &scripts);

        let mut html = PAGE.to_string();
        inject(&mut html, &injection, &StyleHashIndex::new(), &chunks());

        assert!(html.contains(
            r#"<script id="the&quot;Id" defer async type="module" src="/js/index.js"></script></body>"#
        ));
    }

    #[test]
    fn test_unknown_chunk_and_missing_markers_are_skipped() {
        let scripts = [
            script("missing", Inject::Body, vec![]),
            script("vendor", Inject::Head, vec![]),
        ];
        let styles = [style("/s/a.scss", "a.css")];
        let mut injection = Injection::default();
        injection.extend(&styles, &scripts);

        let mut html = "<p>fragment</p>".to_string();
        inject(&mut html, &injection, &StyleHashIndex::new(), &chunks());
        assert_eq!(html, "<p>fragment</p>");

        let mut html = PAGE.to_string();
        inject(&mut html, &injection, &StyleHashIndex::new(), &chunks());
        assert!(!html.contains("missing"));
        assert_eq!(html.matches("<script").count(), 1);
    }
}
