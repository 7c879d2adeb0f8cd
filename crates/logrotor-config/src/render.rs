//! Serialize entries back into the configuration language

use logrotor_domain::{DirectiveValue, RotationEntry};
use std::fmt;

const INDENT: &str = "    ";

/// Render entries as configuration text
///
/// Parsing the output yields the same entries.
///
/// # Examples
///
/// ```
/// use logrotor_config::{parse_config, render};
///
/// let entries = parse_config("/var/log/a.log {\nrotate=3\n}\n").unwrap();
/// assert_eq!(render(&entries), "/var/log/a.log {\n    rotate 3\n}\n");
/// ```
pub fn render(entries: &[RotationEntry]) -> String {
    Rendered(entries).to_string()
}

struct Rendered<'a>(&'a [RotationEntry]);

impl fmt::Display for Rendered<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, entry) in self.0.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            render_entry(f, entry)?;
        }
        Ok(())
    }
}

fn render_entry(f: &mut fmt::Formatter<'_>, entry: &RotationEntry) -> fmt::Result {
    if entry.paths.is_empty() {
        writeln!(f, "{{")?;
    } else {
        writeln!(f, "{} {{", entry.paths.join(" "))?;
    }

    for (name, value) in entry.directives() {
        match value {
            DirectiveValue::Scalar(param) if param.is_empty() => writeln!(f, "{INDENT}{name}")?,
            DirectiveValue::Scalar(param) => writeln!(f, "{INDENT}{name} {param}")?,
            DirectiveValue::Script(commands) => {
                writeln!(f, "{INDENT}{name}")?;
                for command in commands {
                    writeln!(f, "{INDENT}{INDENT}{command}")?;
                }
                writeln!(f, "{INDENT}endscript")?;
            }
        }
    }

    writeln!(f, "}}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_config;
    use logrotor_domain::ScriptKind;

    #[test]
    fn test_render_scripts_and_flags() {
        let mut entry = RotationEntry::new(vec!["/var/log/a".to_string(), "/var/log/b".to_string()]);
        entry.set_scalar("recursive", "");
        entry.open_script(ScriptKind::PostRotate);
        entry.push_script_line(ScriptKind::PostRotate, "kill -HUP 1");

        let text = render(&[entry]);
        assert_eq!(
            text,
            "/var/log/a /var/log/b {\n    recursive\n    postrotate\n        kill -HUP 1\n    endscript\n}\n"
        );
    }

    #[test]
    fn test_render_separates_entries_and_pathless_stanzas() {
        let mut first = RotationEntry::new(vec!["/a".to_string()]);
        first.set_scalar("rotate", "2");
        let second = RotationEntry::new(Vec::new());

        assert_eq!(render(&[first, second]), "/a {\n    rotate 2\n}\n\n{\n}\n");
        assert_eq!(render(&[]), "");
    }

    #[test]
    fn test_reparse_is_idempotent() {
        let text = "\
# daily app logs
/var/log/app.log
/var/log/worker.log {
    rotate=5
    compress .tar.xz
    sharedscripts
    prerotate
        echo before
    endscript
    postrotate
        systemctl reload app
    endscript
    maxage 7
}
/srv/logs {
    recursive
    nomissingok
}
";
        let first = parse_config(text).unwrap();
        let second = parse_config(&render(&first)).unwrap();
        assert_eq!(first, second);
    }
}
