//! Production minification for HTML pages and compiled CSS.
//!
//! Uses minify-html for pages and lightningcss for style sheets.

use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};
use lightningcss::targets::{Browsers, Targets};

use crate::config::HtmlMinifyOptions;

/// Browsers the production CSS is prefixed for.
fn css_targets() -> Targets {
    // lightningcss encodes versions as `major << 16 | minor << 8 | patch`
    Targets::from(Browsers {
        chrome: Some(80 << 16),
        edge: Some(80 << 16),
        firefox: Some(72 << 16),
        safari: Some(13 << 16),
        ios_saf: Some(13 << 16),
        ..Browsers::default()
    })
}

/// Add vendor prefixes and minify CSS.
pub fn minify_css(source: &str) -> Result<String, String> {
    let targets = css_targets();

    let mut stylesheet =
        StyleSheet::parse(source, ParserOptions::default()).map_err(|e| e.to_string())?;
    stylesheet
        .minify(MinifyOptions {
            targets,
            ..MinifyOptions::default()
        })
        .map_err(|e| e.to_string())?;

    let result = stylesheet
        .to_css(PrinterOptions {
            minify: true,
            targets,
            ..PrinterOptions::default()
        })
        .map_err(|e| e.to_string())?;
    Ok(result.code)
}

/// Minify a finished page.
///
/// Closing `</head>` and `</body>` tags are always kept so tags can still be
/// injected after minification.
pub fn minify_html(html: &str, options: &HtmlMinifyOptions) -> String {
    if !options.enable {
        return html.to_string();
    }

    let mut cfg = minify_html::Cfg::new();
    cfg.keep_closing_tags = true;
    cfg.keep_html_and_head_opening_tags = true;
    cfg.keep_comments = !options.remove_comments;
    cfg.minify_css = options.minify_css;
    cfg.minify_js = options.minify_js;
    cfg.remove_bangs = options.remove_bangs;
    cfg.remove_processing_instructions = options.remove_processing_instructions;

    let bytes = minify_html::minify(html.as_bytes(), &cfg);
    String::from_utf8_lossy(&bytes).into_owned()
}
