//! Rotation criteria
//!
//! Criteria are conjunctive. A file with no declared criteria is always
//! eligible.

use crate::policy::EntryPolicy;
use chrono::{DateTime, TimeZone, Utc};
use std::path::Path;

/// What the evaluator needs to know about a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileFacts {
    /// Size in bytes
    pub size: u64,

    /// Last modification time
    pub modified: DateTime<Utc>,

    /// Modification time of the newest retained generation, if any
    pub last_rotation: Option<DateTime<Utc>>,
}

/// Outcome of evaluating a file against its entry's criteria
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    /// Whether the file should be rotated (or deleted)
    pub eligible: bool,

    /// One justification per declared criterion
    pub reasons: Vec<String>,
}

/// Evaluate the declared criteria of `policy` for one file
///
/// # Examples
///
/// ```
/// use chrono::{Local, Utc};
/// use logrotor_config::parse_config;
/// use logrotor_engine::criteria::{evaluate, FileFacts};
/// use logrotor_engine::EntryPolicy;
/// use std::path::Path;
///
/// let entries = parse_config("/var/log/a.log {\n maxsize 10k\n}\n").unwrap();
/// let policy = EntryPolicy::resolve(&entries[0]).unwrap();
/// let facts = FileFacts { size: 10241, modified: Utc::now(), last_rotation: None };
///
/// let verdict = evaluate(Path::new("/var/log/a.log"), &policy, &facts, &Local::now());
/// assert!(verdict.eligible);
/// assert_eq!(verdict.reasons, ["/var/log/a.log larger than 10 kilobytes (by 1 byte)"]);
/// ```
pub fn evaluate<Tz: TimeZone>(
    path: &Path,
    policy: &EntryPolicy,
    facts: &FileFacts,
    now: &DateTime<Tz>,
) -> Verdict {
    let mut eligible = true;
    let mut reasons = Vec::new();
    let shown = path.display();

    if let Some(maxsize) = &policy.maxsize {
        let diff = facts.size as f64 - maxsize.total();
        let larger = diff > 0.0;
        eligible &= larger;

        let bytes = diff.abs().round() as u64;
        reasons.push(format!(
            "{} {} than {} (by {} byte{})",
            shown,
            if larger { "larger" } else { "smaller" },
            maxsize,
            bytes,
            if bytes == 1 { "" } else { "s" }
        ));
    }

    if let Some(maxage) = &policy.maxage {
        let now_utc = now.with_timezone(&Utc);
        let elapsed = (now_utc - facts.modified).num_milliseconds() as f64 / 1000.0;
        let older = elapsed > maxage.total();
        eligible &= older;

        reasons.push(format!(
            "{} {} than {} ({:.2} seconds)",
            shown,
            if older { "older" } else { "not older" },
            maxage,
            elapsed
        ));
    }

    for frequency in &policy.frequencies {
        let boundary = frequency.period_start(now).with_timezone(&Utc);
        let reference = if policy.rotate.is_some() {
            facts.last_rotation
        } else {
            Some(facts.modified)
        };

        match reference {
            None => reasons.push(format!(
                "{} has no {} rotation yet",
                shown,
                frequency.as_str()
            )),
            Some(last) if last < boundary => reasons.push(format!(
                "{} last rotated {} before the {} boundary {}",
                shown,
                last.format("%Y-%m-%d %H:%M:%S"),
                frequency.as_str(),
                boundary.format("%Y-%m-%d %H:%M:%S")
            )),
            Some(last) => {
                eligible = false;
                reasons.push(format!(
                    "{} already rotated {} at {}",
                    shown,
                    frequency.as_str(),
                    last.format("%Y-%m-%d %H:%M:%S")
                ));
            }
        }
    }

    Verdict { eligible, reasons }
}
