//! Build mode for production/development passes.

use clap::ValueEnum;

/// Build mode reported by the host for each pass.
///
/// Production enables compressed SCSS output, vendor prefixing, HTML
/// minification and JSON compaction in copied folders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum BuildMode {
    #[default]
    Development,
    Production,
}

impl BuildMode {
    #[inline]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }
}
