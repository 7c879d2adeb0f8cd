//! Line-oriented parser for the stanza configuration language

use crate::error::ConfigError;
use logrotor_domain::{RotationEntry, ScriptKind};
use std::io::BufRead;
use std::path::Path;
use tracing::{debug, info, warn};

/// Keyword that closes a script body
const END_SCRIPT: &str = "endscript";

/// Where the parser currently is
#[derive(Debug)]
enum State {
    /// Between stanzas
    NoStanza,

    /// Inside a stanza opened on `line`
    InStanza { entry: RotationEntry, line: usize },

    /// Inside a script body of a stanza opened on `line`
    InScript {
        entry: RotationEntry,
        line: usize,
        kind: ScriptKind,
        script_line: usize,
    },
}

/// Incremental configuration parser
///
/// Feed lines in order with [`ConfigParser::feed_line`], then call
/// [`ConfigParser::finish`] to obtain the sealed entries.
///
/// # Examples
///
/// ```
/// use logrotor_config::ConfigParser;
///
/// let mut parser = ConfigParser::new();
/// for line in ["/var/log/a.log {", "rotate 2", "}"] {
///     parser.feed_line(line).unwrap();
/// }
/// let entries = parser.finish().unwrap();
/// assert_eq!(entries[0].scalar("rotate"), Some("2"));
/// ```
#[derive(Debug)]
pub struct ConfigParser {
    state: State,
    pending_paths: Vec<String>,
    entries: Vec<RotationEntry>,
    line: usize,
}

impl Default for ConfigParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigParser {
    /// Create a parser with no stanzas
    pub fn new() -> Self {
        Self {
            state: State::NoStanza,
            pending_paths: Vec::new(),
            entries: Vec::new(),
            line: 0,
        }
    }

    /// Consume one line of configuration text
    pub fn feed_line(&mut self, raw: &str) -> Result<(), ConfigError> {
        self.line += 1;
        let line = raw.trim();

        if line.is_empty() {
            return Ok(());
        }
        if line.starts_with('#') {
            info!("Ignoring comment: {}", line);
            return Ok(());
        }

        let state = std::mem::replace(&mut self.state, State::NoStanza);
        self.state = match state {
            State::InScript {
                mut entry,
                line: opened,
                kind,
                script_line,
            } => {
                if line.split_whitespace().next() == Some(END_SCRIPT) {
                    debug!("Closing {} script", kind);
                    State::InStanza { entry, line: opened }
                } else {
                    entry.push_script_line(kind, line);
                    State::InScript {
                        entry,
                        line: opened,
                        kind,
                        script_line,
                    }
                }
            }
            other if line.contains('{') => self.open_stanza(other, line)?,
            State::InStanza { mut entry, line: opened } if line.starts_with('/') => {
                let paths = path_tokens(line);
                debug!("Paths: {}", paths.join(" "));
                entry.add_paths(paths);
                State::InStanza { entry, line: opened }
            }
            State::NoStanza if line.starts_with('/') => {
                let paths = path_tokens(line);
                debug!("Paths: {}", paths.join(" "));
                self.pending_paths.extend(paths);
                State::NoStanza
            }
            State::InStanza { entry, .. } if line.starts_with('}') => {
                debug!("Closing stanza for {}", entry.paths.join(","));
                if entry.paths.is_empty() {
                    warn!("line {}: stanza has no paths and will never match", self.line);
                }
                self.entries.push(entry);
                State::NoStanza
            }
            State::NoStanza if line.starts_with('}') => {
                return Err(ConfigError::UnexpectedClose { line: self.line });
            }
            State::InStanza { entry, line: opened } => self.directive(entry, opened, line)?,
            State::NoStanza => return Err(ConfigError::NoStanza { line: self.line }),
        };

        Ok(())
    }

    /// Seal parsing and return the entries in declaration order
    pub fn finish(self) -> Result<Vec<RotationEntry>, ConfigError> {
        match self.state {
            State::NoStanza => {}
            State::InStanza { line, .. } => return Err(ConfigError::UnterminatedStanza { line }),
            State::InScript {
                kind, script_line, ..
            } => {
                return Err(ConfigError::UnterminatedScript {
                    kind,
                    line: script_line,
                })
            }
        }
        if !self.pending_paths.is_empty() {
            warn!(
                "Ignoring paths without a stanza: {}",
                self.pending_paths.join(" ")
            );
        }
        Ok(self.entries)
    }

    fn open_stanza(&mut self, state: State, line: &str) -> Result<State, ConfigError> {
        if let State::InStanza { line: opened, .. } = state {
            return Err(ConfigError::NestedStanza {
                line: self.line,
                opened,
            });
        }

        let mut paths = std::mem::take(&mut self.pending_paths);
        paths.extend(path_tokens(line));
        debug!("Opening stanza for {}", paths.join(","));

        Ok(State::InStanza {
            entry: RotationEntry::new(paths),
            line: self.line,
        })
    }

    fn directive(
        &mut self,
        mut entry: RotationEntry,
        opened: usize,
        line: &str,
    ) -> Result<State, ConfigError> {
        if entry.paths.is_empty() {
            return Err(ConfigError::NoStanza { line: self.line });
        }

        let (name, params) = split_directive(line);
        debug!("Directive: {}; params: {}", name, params);

        if let Some(kind) = ScriptKind::parse(name) {
            entry.open_script(kind);
            return Ok(State::InScript {
                entry,
                line: opened,
                kind,
                script_line: self.line,
            });
        }

        if name == END_SCRIPT {
            warn!("line {}: {} without an open script, ignoring", self.line, END_SCRIPT);
        } else {
            entry.set_scalar(name, params);
        }
        Ok(State::InStanza { entry, line: opened })
    }
}

/// Split a directive line into its name and parameter string
///
/// The name ends at the first whitespace or `=`; any run of `=` and whitespace
/// after it is a separator.
fn split_directive(line: &str) -> (&str, &str) {
    let end = line
        .find(|c: char| c == '=' || c.is_whitespace())
        .unwrap_or(line.len());
    let (name, rest) = line.split_at(end);
    let params = rest
        .trim_start_matches(|c: char| c == '=' || c.is_whitespace())
        .trim_end();
    (name, params)
}

/// Every `/`-prefixed token on a line
fn path_tokens(line: &str) -> Vec<String> {
    line.split_whitespace()
        .filter(|token| token.starts_with('/'))
        .map(|token| token.trim_end_matches('{').to_string())
        .filter(|token| !token.is_empty())
        .collect()
}

/// Parse configuration text into rotation entries
pub fn parse_config(text: &str) -> Result<Vec<RotationEntry>, ConfigError> {
    let mut parser = ConfigParser::new();
    for line in text.lines() {
        parser.feed_line(line)?;
    }
    parser.finish()
}

/// Parse configuration from a buffered reader
pub fn parse_reader<R: BufRead>(reader: R) -> Result<Vec<RotationEntry>, ConfigError> {
    let mut parser = ConfigParser::new();
    for line in reader.lines() {
        parser.feed_line(&line?)?;
    }
    parser.finish()
}

/// Load and parse a configuration file
pub fn load<P: AsRef<Path>>(path: P) -> Result<Vec<RotationEntry>, ConfigError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }
    let file = std::fs::File::open(path)?;
    parse_reader(std::io::BufReader::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_stanza() {
        let entries = parse_config(
            "/var/log/app.log {\n    rotate 3\n    maxsize=10k\n    compress\n}\n",
        )
        .unwrap();
        assert_eq!(entries.len(), 1);
        let entry = &entries[0];
        assert_eq!(entry.paths, vec!["/var/log/app.log"]);
        assert_eq!(entry.scalar("rotate"), Some("3"));
        assert_eq!(entry.scalar("maxsize"), Some("10k"));
        assert_eq!(entry.scalar("compress"), Some(""));
    }

    #[test]
    fn test_paths_before_open_line() {
        let text = "/var/log/a.log\n/var/log/b.log /var/log/c.log\n{\nrotate 1\n}\n";
        let entries = parse_config(text).unwrap();
        assert_eq!(entries[0].paths, vec!["/var/log/a.log", "/var/log/b.log", "/var/log/c.log"]);
    }

    #[test]
    fn test_paths_inside_stanza() {
        let text = "/var/log/a.log {\n/var/log/b.log\nrotate 1\n}\n";
        let entries = parse_config(text).unwrap();
        assert_eq!(entries[0].paths, vec!["/var/log/a.log", "/var/log/b.log"]);
    }

    #[test]
    fn test_script_body() {
        let text = "\
/var/log/a.log {
    postrotate
        /usr/bin/killall -HUP syslogd
        echo rotated=yes
    endscript
    rotate 2
}
";
        let entries = parse_config(text).unwrap();
        let entry = &entries[0];
        assert_eq!(
            entry.script(ScriptKind::PostRotate),
            ["/usr/bin/killall -HUP syslogd".to_string(), "echo rotated=yes".to_string()]
        );
        assert_eq!(entry.paths, vec!["/var/log/a.log"]);
        assert_eq!(entry.scalar("rotate"), Some("2"));
    }

    #[test]
    fn test_closing_brace_does_not_end_script() {
        let text = "/var/log/a.log {\nprerotate\nawk '{print}' x\n}\nendscript\n}\n";
        let entries = parse_config(text).unwrap();
        assert_eq!(
            entries[0].script(ScriptKind::PreRotate),
            ["awk '{print}' x".to_string(), "}".to_string()]
        );
    }

    #[test]
    fn test_last_write_wins() {
        let entries = parse_config("/a {\nrotate 3\nrotate 7\n}\n").unwrap();
        assert_eq!(entries[0].scalar("rotate"), Some("7"));
        assert_eq!(entries[0].directive_count(), 1);
    }

    #[test]
    fn test_comments_and_blank_lines() {
        let text = "# header\n\n/a {\n  # inner comment\n  recursive\n}\n";
        let entries = parse_config(text).unwrap();
        assert_eq!(entries[0].directive_count(), 1);
        assert!(entries[0].has("recursive"));
    }

    #[test]
    fn test_directive_without_stanza() {
        let err = parse_config("rotate 3\n").unwrap_err();
        assert!(matches!(err, ConfigError::NoStanza { line: 1 }));
        assert!(err.to_string().contains("No paths provided ahead of stanza"));
    }

    #[test]
    fn test_directive_before_any_path() {
        let err = parse_config("{\nrotate 3\n}\n").unwrap_err();
        assert!(matches!(err, ConfigError::NoStanza { line: 2 }));
    }

    #[test]
    fn test_unbalanced_braces() {
        assert!(matches!(
            parse_config("}\n").unwrap_err(),
            ConfigError::UnexpectedClose { line: 1 }
        ));
        assert!(matches!(
            parse_config("/a {\n/b {\n}\n").unwrap_err(),
            ConfigError::NestedStanza { line: 2, opened: 1 }
        ));
        assert!(matches!(
            parse_config("/a {\nrotate 1\n").unwrap_err(),
            ConfigError::UnterminatedStanza { line: 1 }
        ));
    }

    #[test]
    fn test_unterminated_script() {
        let err = parse_config("/a {\npreremove\necho bye\n}\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::UnterminatedScript {
                kind: ScriptKind::PreRemove,
                line: 2
            }
        ));
    }

    #[test]
    fn test_split_directive() {
        assert_eq!(split_directive("rotate 3"), ("rotate", "3"));
        assert_eq!(split_directive("rotate=3"), ("rotate", "3"));
        assert_eq!(split_directive("rotate = 3 "), ("rotate", "3"));
        assert_eq!(split_directive("recursive"), ("recursive", ""));
        assert_eq!(split_directive("compress .tar.bz2"), ("compress", ".tar.bz2"));
    }

    #[test]
    fn test_open_line_with_attached_brace() {
        let entries = parse_config("/var/log/a.log{\n}\n").unwrap();
        assert_eq!(entries[0].paths, vec!["/var/log/a.log"]);
    }

    #[test]
    fn test_multiple_stanzas_in_order() {
        let text = "/a {\nrotate 1\n}\n/b {\nrotate 2\n}\n";
        let entries = parse_config(text).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].paths, vec!["/a"]);
        assert_eq!(entries[1].paths, vec!["/b"]);
    }
}
