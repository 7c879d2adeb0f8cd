//! Compression spec module - archive extensions and their tar filters

use std::error::Error;
use std::fmt;

/// Extension used when `compress` is declared without a parameter
pub const DEFAULT_EXTENSION: &str = ".tar.gz";

/// Compression filter applied by the archiving tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompressionFilter {
    /// gzip (`.gz`)
    Gzip,

    /// bzip2 (`.bz2`)
    Bzip2,

    /// xz (`.xz`)
    Xz,

    /// Plain tar archive, no filter
    None,
}

impl CompressionFilter {
    /// Map a bare extension (without the dot) to its filter
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "gz" => Some(CompressionFilter::Gzip),
            "bz2" => Some(CompressionFilter::Bzip2),
            "xz" => Some(CompressionFilter::Xz),
            "tar" => Some(CompressionFilter::None),
            _ => None,
        }
    }

    /// The tar flag selecting this filter (empty for plain tar)
    pub fn tar_flag(&self) -> &'static str {
        match self {
            CompressionFilter::Gzip => "z",
            CompressionFilter::Bzip2 => "j",
            CompressionFilter::Xz => "J",
            CompressionFilter::None => "",
        }
    }
}

/// Unsupported compression extension
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressionError {
    /// The extension as configured
    pub extension: String,
}

impl fmt::Display for CompressionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} unsupported as compress extension", self.extension)
    }
}

impl Error for CompressionError {}

/// A resolved compression configuration
///
/// # Examples
///
/// ```
/// use logrotor_domain::{CompressionFilter, CompressionSpec};
///
/// let spec = CompressionSpec::resolve(".tar.bz2").unwrap();
/// assert_eq!(spec.filter(), CompressionFilter::Bzip2);
/// assert_eq!(spec.filter().tar_flag(), "j");
///
/// assert!(CompressionSpec::resolve(".zip").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressionSpec {
    extension: String,
    filter: CompressionFilter,
}

impl CompressionSpec {
    /// Resolve an extension such as `.tar.gz`
    ///
    /// Only the final dot-extension selects the filter. A missing leading dot is
    /// added so that artifacts are always named `<file>.<ext>`.
    pub fn resolve(extension: &str) -> Result<Self, CompressionError> {
        let trimmed = extension.trim();
        let last = trimmed.rsplit('.').next().unwrap_or(trimmed);
        let filter = CompressionFilter::from_extension(last).ok_or_else(|| CompressionError {
            extension: extension.to_string(),
        })?;

        let extension = if trimmed.starts_with('.') {
            trimmed.to_string()
        } else {
            format!(".{}", trimmed)
        };
        Ok(Self { extension, filter })
    }

    /// Resolve the parameter of a `compress` directive, empty meaning the default
    pub fn from_directive(param: &str) -> Result<Self, CompressionError> {
        if param.trim().is_empty() {
            Self::resolve(DEFAULT_EXTENSION)
        } else {
            Self::resolve(param)
        }
    }

    /// The artifact extension, always starting with a dot
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// The filter selected by the extension
    pub fn filter(&self) -> CompressionFilter {
        self.filter
    }
}
