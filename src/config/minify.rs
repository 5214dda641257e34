//! `[html_minify]` section.
//!
//! Options for the production HTML minifier. Whitespace collapsing and the
//! short doctype are always applied and are not configurable.

use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HtmlMinifyOptions {
    /// Turn HTML minification off entirely, even in production.
    pub enable: bool,

    #[serde(alias = "removeComments")]
    pub remove_comments: bool,

    #[serde(alias = "minifyCSS", alias = "minifyCss")]
    pub minify_css: bool,

    #[serde(alias = "minifyJS", alias = "minifyJs")]
    pub minify_js: bool,

    /// Drop `<!...>` bang declarations other than the doctype.
    #[serde(alias = "removeBangs")]
    pub remove_bangs: bool,

    #[serde(alias = "removeProcessingInstructions")]
    pub remove_processing_instructions: bool,
}

impl Default for HtmlMinifyOptions {
    fn default() -> Self {
        Self {
            enable: true,
            remove_comments: true,
            minify_css: true,
            minify_js: true,
            remove_bangs: true,
            remove_processing_instructions: true,
        }
    }
}
