//! Naming of rotated generations
//!
//! A rotated file lives next to its primary as `<path>.<generation>`, the
//! generation zero-padded to the digit count of the `rotate` count, optionally
//! followed by the compression extension (`app.log.07.tar.gz`).

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Digit count of the highest retained generation
///
/// ```
/// use logrotor_domain::artifact::generation_width;
///
/// assert_eq!(generation_width(3), 1);
/// assert_eq!(generation_width(10), 2);
/// assert_eq!(generation_width(365), 3);
/// ```
pub fn generation_width(rotate: u32) -> usize {
    rotate.to_string().len()
}

/// English ordinal suffix for a generation number (`st`, `nd`, `rd`, `th`)
pub fn ordinal_suffix(n: u64) -> &'static str {
    match (n % 10, n % 100) {
        (1, 11) => "th",
        (2, 12) => "th",
        (3, 13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}

/// Append a raw suffix to a path without touching its existing extension
pub fn append_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut raw: OsString = path.as_os_str().to_owned();
    raw.push(suffix);
    PathBuf::from(raw)
}

/// A path recognized as a rotated generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactMatch {
    /// The primary file this artifact was rotated from
    pub primary: PathBuf,

    /// Generation number
    pub generation: u64,

    /// Whether the artifact carries the compression extension
    pub compressed: bool,
}

/// Artifact naming scheme of one entry
///
/// # Examples
///
/// ```
/// use logrotor_domain::ArtifactNaming;
/// use std::path::Path;
///
/// let naming = ArtifactNaming::new(10, Some(".tar.gz"));
/// let slot = naming.slot(Path::new("/var/log/app.log"), 2);
/// assert_eq!(slot, Path::new("/var/log/app.log.02"));
/// assert_eq!(
///     naming.compressed(&slot).unwrap(),
///     Path::new("/var/log/app.log.02.tar.gz")
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactNaming {
    width: usize,
    extension: Option<String>,
}

impl ArtifactNaming {
    /// Naming for a `rotate` count and an optional compression extension
    pub fn new(rotate: u32, extension: Option<&str>) -> Self {
        Self {
            width: generation_width(rotate),
            extension: extension.map(str::to_string),
        }
    }

    /// Zero-padding width of generation numbers
    pub fn width(&self) -> usize {
        self.width
    }

    /// Compression extension, if any
    pub fn extension(&self) -> Option<&str> {
        self.extension.as_deref()
    }

    /// Uncompressed path of a generation slot
    pub fn slot(&self, primary: &Path, generation: u32) -> PathBuf {
        append_suffix(primary, &format!(".{:0width$}", generation, width = self.width))
    }

    /// Compressed counterpart of a slot path, when compression is configured
    pub fn compressed(&self, slot: &Path) -> Option<PathBuf> {
        self.extension.as_deref().map(|ext| append_suffix(slot, ext))
    }

    /// Recognize a rotated generation
    ///
    /// Accepts any run of digits after the final dot, optionally followed by the
    /// configured compression extension. Returns `None` for primary files.
    pub fn matches(&self, path: &Path) -> Option<ArtifactMatch> {
        let name = path.to_str()?;

        let (stem, compressed) = match self.extension.as_deref() {
            Some(ext) if name.len() > ext.len() && name.ends_with(ext) => {
                (&name[..name.len() - ext.len()], true)
            }
            _ => (name, false),
        };

        let (primary, digits) = stem.rsplit_once('.')?;
        if primary.is_empty() || primary.ends_with('/') || digits.is_empty() {
            return None;
        }
        if !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }

        Some(ArtifactMatch {
            primary: PathBuf::from(primary),
            generation: digits.parse().unwrap_or(u64::MAX),
            compressed,
        })
    }
}
