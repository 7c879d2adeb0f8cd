//! Rotation entry module - one configuration stanza

use std::fmt;

/// Script triggers a stanza may declare
///
/// Each trigger opens a multi-line body in the configuration language that is
/// closed by `endscript`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ScriptKind {
    /// Fired before the generation shift of a rotated file
    PreRotate,

    /// Fired after a file has been rotated (and compressed)
    PostRotate,

    /// Fired before a file without retention is deleted
    PreRemove,
}

impl ScriptKind {
    /// All script kinds, in declaration order of the configuration language
    pub const ALL: [ScriptKind; 3] = [ScriptKind::PreRotate, ScriptKind::PostRotate, ScriptKind::PreRemove];

    /// Get the directive name for this script kind
    pub fn as_str(&self) -> &'static str {
        match self {
            ScriptKind::PreRotate => "prerotate",
            ScriptKind::PostRotate => "postrotate",
            ScriptKind::PreRemove => "preremove",
        }
    }

    /// Parse a script kind from its directive name (exact, case-sensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "prerotate" => Some(ScriptKind::PreRotate),
            "postrotate" => Some(ScriptKind::PostRotate),
            "preremove" => Some(ScriptKind::PreRemove),
            _ => None,
        }
    }
}

impl fmt::Display for ScriptKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value stored under a directive name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectiveValue {
    /// Plain directive parameter (possibly empty for bare flags like `recursive`)
    Scalar(String),

    /// Ordered command lines of a script body
    Script(Vec<String>),
}

impl DirectiveValue {
    /// Get the scalar parameter, if this is a scalar directive
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            DirectiveValue::Scalar(value) => Some(value),
            DirectiveValue::Script(_) => None,
        }
    }

    /// Get the script commands, if this is a script directive
    pub fn as_script(&self) -> Option<&[String]> {
        match self {
            DirectiveValue::Scalar(_) => None,
            DirectiveValue::Script(commands) => Some(commands),
        }
    }
}

/// One stanza of the rotation configuration
///
/// Holds the stanza's target paths in declaration order and its directives in
/// insertion order. Re-declaring a directive overwrites its value but keeps its
/// original position.
///
/// # Examples
///
/// ```
/// use logrotor_domain::{RotationEntry, ScriptKind};
///
/// let mut entry = RotationEntry::new(vec!["/var/log/app.log".to_string()]);
/// entry.set_scalar("rotate", "3");
/// entry.open_script(ScriptKind::PostRotate);
/// entry.push_script_line(ScriptKind::PostRotate, "kill -HUP 1");
///
/// assert_eq!(entry.scalar("rotate"), Some("3"));
/// assert_eq!(entry.script(ScriptKind::PostRotate), ["kill -HUP 1".to_string()]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RotationEntry {
    /// Target paths, in declaration order
    pub paths: Vec<String>,

    directives: Vec<(String, DirectiveValue)>,
}

impl RotationEntry {
    /// Create an entry for the given paths with no directives
    pub fn new(paths: Vec<String>) -> Self {
        Self {
            paths,
            directives: Vec::new(),
        }
    }

    /// Append target paths
    pub fn add_paths<I>(&mut self, paths: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.paths.extend(paths);
    }

    /// Store a scalar directive (last write wins)
    pub fn set_scalar(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.upsert(name.into(), DirectiveValue::Scalar(value.into()));
    }

    /// Open (or reset) the body of a script directive
    pub fn open_script(&mut self, kind: ScriptKind) {
        self.upsert(kind.as_str().to_string(), DirectiveValue::Script(Vec::new()));
    }

    /// Append one command line to an opened script body
    ///
    /// Returns `false` when the script has not been opened.
    pub fn push_script_line(&mut self, kind: ScriptKind, line: impl Into<String>) -> bool {
        match self.get_mut(kind.as_str()) {
            Some(DirectiveValue::Script(commands)) => {
                commands.push(line.into());
                true
            }
            _ => false,
        }
    }

    /// Look up a directive value by name
    pub fn get(&self, name: &str) -> Option<&DirectiveValue> {
        self.directives
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    /// Look up a scalar directive parameter by name
    pub fn scalar(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(DirectiveValue::as_scalar)
    }

    /// Whether a directive was declared, whatever its value
    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Commands recorded for a script (empty when not declared)
    pub fn script(&self, kind: ScriptKind) -> &[String] {
        self.get(kind.as_str())
            .and_then(DirectiveValue::as_script)
            .unwrap_or(&[])
    }

    /// Iterate over directives in insertion order
    pub fn directives(&self) -> impl Iterator<Item = (&str, &DirectiveValue)> {
        self.directives.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Number of declared directives
    pub fn directive_count(&self) -> usize {
        self.directives.len()
    }

    fn get_mut(&mut self, name: &str) -> Option<&mut DirectiveValue> {
        self.directives
            .iter_mut()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    fn upsert(&mut self, name: String, value: DirectiveValue) {
        match self.get_mut(&name) {
            Some(existing) => *existing = value,
            None => self.directives.push((name, value)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_kind_names() {
        for kind in ScriptKind::ALL {
            assert_eq!(ScriptKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(ScriptKind::parse("endscript"), None);
        assert_eq!(ScriptKind::parse("PostRotate"), None);
    }

    #[test]
    fn test_last_write_wins_keeps_position() {
        let mut entry = RotationEntry::new(vec!["/var/log/a".to_string()]);
        entry.set_scalar("rotate", "3");
        entry.set_scalar("compress", "");
        entry.set_scalar("rotate", "5");

        let names: Vec<&str> = entry.directives().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["rotate", "compress"]);
        assert_eq!(entry.scalar("rotate"), Some("5"));
        assert_eq!(entry.directive_count(), 2);
    }

    #[test]
    fn test_push_to_unopened_script() {
        let mut entry = RotationEntry::default();
        assert!(!entry.push_script_line(ScriptKind::PreRemove, "rm -f /tmp/x"));
        assert!(entry.script(ScriptKind::PreRemove).is_empty());
    }

    #[test]
    fn test_reopening_script_resets_body() {
        let mut entry = RotationEntry::default();
        entry.open_script(ScriptKind::PreRotate);
        entry.push_script_line(ScriptKind::PreRotate, "echo one");
        entry.open_script(ScriptKind::PreRotate);

        assert!(entry.has("prerotate"));
        assert!(entry.script(ScriptKind::PreRotate).is_empty());
    }

    #[test]
    fn test_scalar_lookup_on_script_is_none() {
        let mut entry = RotationEntry::default();
        entry.open_script(ScriptKind::PostRotate);
        assert_eq!(entry.scalar("postrotate"), None);
        assert!(entry.has("postrotate"));
    }
}
