//! Row classification for visual grouping
//!
//! A row's category is decided from its path string alone: a trailing `/`
//! marks a directory aggregate, otherwise the file extension decides.

use std::fmt;

use serde::Serialize;

/// Extensions treated as configuration formats
const CONFIG_EXTENSIONS: &[&str] = &["yaml", "yml", "toml", "json", "ini", "cfg"];

/// Extensions treated as source code
const SOURCE_EXTENSIONS: &[&str] = &[
    "py", "rs", "go", "java", "kt", "scala", "js", "jsx", "ts", "tsx", "c", "h", "cc", "cpp",
    "hpp", "cs", "rb", "php", "swift", "sh",
];

/// Category of a hotspot row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    ConfigFormat,
    Source,
    Directory,
    Other,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::ConfigFormat,
        Category::Source,
        Category::Directory,
        Category::Other,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Category::ConfigFormat => "config-format",
            Category::Source => "source",
            Category::Directory => "directory",
            Category::Other => "other",
        }
    }

    /// Marker colour used by the scatter view
    pub fn color(&self) -> &'static str {
        match self {
            Category::ConfigFormat => "#e6a23c",
            Category::Source => "#409eff",
            Category::Directory => "#67c23a",
            Category::Other => "#909399",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Classify a row by its path string
pub fn classify(path: &str) -> Category {
    if path.ends_with('/') || path.ends_with(std::path::MAIN_SEPARATOR) {
        return Category::Directory;
    }

    let name = path.rsplit(['/', std::path::MAIN_SEPARATOR]).next().unwrap_or(path);
    let extension = match name.rsplit_once('.') {
        // dotfiles such as `.gitignore` have no extension
        Some((stem, ext)) if !stem.is_empty() => ext.to_ascii_lowercase(),
        _ => return Category::Other,
    };

    if CONFIG_EXTENSIONS.contains(&extension.as_str()) {
        Category::ConfigFormat
    } else if SOURCE_EXTENSIONS.contains(&extension.as_str()) {
        Category::Source
    } else {
        Category::Other
    }
}
