//! Typed view of an entry's directives
//!
//! Every directive value is validated here, before anything touches the
//! filesystem, so a bad `compress` extension or `maxsize` aborts the run
//! while the files of that entry are still untouched.

use crate::error::{EngineError, Result};
use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveTime, TimeZone, Timelike};
use logrotor_domain::units::{parse_age, parse_size};
use logrotor_domain::{ArtifactNaming, CompressionSpec, DirectiveValue, Quantity, RotationEntry, ScriptKind};
use std::collections::BTreeMap;
use std::path::PathBuf;

const KNOWN_DIRECTIVES: [&str; 19] = [
    "create",
    "compress",
    "start",
    "prerotate",
    "postrotate",
    "preremove",
    "scratchdir",
    "recursive",
    "rotate",
    "maxsize",
    "maxage",
    "nosharedscripts",
    "sharedscripts",
    "nomissingok",
    "hourly",
    "daily",
    "weekly",
    "monthly",
    "yearly",
];

/// Calendar period of a frequency criterion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Frequency {
    /// Top of every hour
    Hourly,
    /// Local midnight
    Daily,
    /// Monday 00:00 of the ISO week
    Weekly,
    /// First day of the month
    Monthly,
    /// January 1st
    Yearly,
}

impl Frequency {
    /// All frequencies in directive order
    pub const ALL: [Frequency; 5] = [
        Frequency::Hourly,
        Frequency::Daily,
        Frequency::Weekly,
        Frequency::Monthly,
        Frequency::Yearly,
    ];

    /// Directive name
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Hourly => "hourly",
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
            Frequency::Yearly => "yearly",
        }
    }

    /// Start of the calendar period containing `now`
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::{TimeZone, Utc};
    /// use logrotor_engine::Frequency;
    ///
    /// // Thursday afternoon
    /// let now = Utc.with_ymd_and_hms(2024, 5, 16, 14, 30, 0).unwrap();
    /// assert_eq!(
    ///     Frequency::Weekly.period_start(&now),
    ///     Utc.with_ymd_and_hms(2024, 5, 13, 0, 0, 0).unwrap()
    /// );
    /// ```
    pub fn period_start<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> DateTime<Tz> {
        let date = now.date_naive();
        let day_start = |date: NaiveDate| {
            now.timezone()
                .from_local_datetime(&date.and_time(NaiveTime::MIN))
                .earliest()
        };

        let start = match self {
            Frequency::Hourly => now
                .with_minute(0)
                .and_then(|t| t.with_second(0))
                .and_then(|t| t.with_nanosecond(0)),
            Frequency::Daily => day_start(date),
            Frequency::Weekly => {
                let back = u64::from(date.weekday().num_days_from_monday());
                date.checked_sub_days(Days::new(back)).and_then(day_start)
            }
            Frequency::Monthly => date.with_day(1).and_then(day_start),
            Frequency::Yearly => NaiveDate::from_ymd_opt(date.year(), 1, 1).and_then(day_start),
        };

        // A boundary that falls in a DST gap has no local representation
        start.unwrap_or_else(|| now.clone())
    }
}

/// Resolved rotation policy of one entry
#[derive(Debug, Clone)]
pub struct EntryPolicy {
    /// Target paths in declaration order
    pub paths: Vec<PathBuf>,

    /// Generations to retain; `None` deletes instead of rotating
    pub rotate: Option<u32>,

    /// Generation the primary is renamed into
    pub start: u32,

    /// Compression of rotated generations
    pub compression: Option<CompressionSpec>,

    /// Working directory for the archiving tool
    pub scratchdir: Option<PathBuf>,

    /// Descend into directories
    pub recursive: bool,

    /// Create an empty primary after rotation
    pub create: bool,

    /// Missing paths are skipped rather than ending the entry
    pub missing_ok: bool,

    /// Scripts fire once per entry per run
    pub shared_scripts: bool,

    /// Rotate only files larger than this
    pub maxsize: Option<Quantity>,

    /// Rotate only files older than this
    pub maxage: Option<Quantity>,

    /// Calendar-period criteria
    pub frequencies: Vec<Frequency>,

    /// Artifact naming for this entry
    pub naming: ArtifactNaming,

    scripts: BTreeMap<ScriptKind, Vec<String>>,
}

impl EntryPolicy {
    /// Validate and resolve the directives of an entry
    ///
    /// # Errors
    ///
    /// Returns an error for an unsupported compression extension or a
    /// malformed number, size or age.
    pub fn resolve(entry: &RotationEntry) -> Result<Self> {
        for (name, _) in entry.directives() {
            if !KNOWN_DIRECTIVES.contains(&name) {
                tracing::warn!("Unknown directive '{}' for {}", name, entry.paths.join(" "));
            }
        }

        let rotate = match entry.scalar("rotate") {
            Some(value) => match parse_count("rotate", value)? {
                0 => None,
                n => Some(n),
            },
            None => None,
        };

        let start = match entry.scalar("start") {
            Some(value) => parse_count("start", value)?,
            None => 1,
        };

        let compression = entry
            .scalar("compress")
            .map(CompressionSpec::from_directive)
            .transpose()?;

        let maxsize = entry
            .scalar("maxsize")
            .map(|v| parse_size(v).map_err(|e| EngineError::Config(format!("maxsize: {}", e))))
            .transpose()?;

        let maxage = entry
            .scalar("maxage")
            .map(|v| parse_age(v).map_err(|e| EngineError::Config(format!("maxage: {}", e))))
            .transpose()?;

        let scratchdir = entry
            .scalar("scratchdir")
            .filter(|dir| !dir.trim().is_empty())
            .map(|dir| PathBuf::from(dir.trim()));

        let frequencies = Frequency::ALL
            .into_iter()
            .filter(|f| entry.has(f.as_str()))
            .collect();

        let scripts = entry
            .directives()
            .filter_map(|(name, value)| match value {
                DirectiveValue::Script(commands) => {
                    ScriptKind::parse(name).map(|kind| (kind, commands.clone()))
                }
                DirectiveValue::Scalar(_) => None,
            })
            .collect();

        let naming = ArtifactNaming::new(
            rotate.unwrap_or(1),
            compression.as_ref().map(CompressionSpec::extension),
        );

        Ok(Self {
            paths: entry.paths.iter().map(PathBuf::from).collect(),
            rotate,
            start,
            compression,
            scratchdir,
            recursive: entry.has("recursive"),
            create: entry.has("create"),
            missing_ok: !entry.has("nomissingok"),
            shared_scripts: entry.has("sharedscripts") && !entry.has("nosharedscripts"),
            maxsize,
            maxage,
            frequencies,
            naming,
            scripts,
        })
    }

    /// Commands of a script, empty when the script is not declared
    pub fn script(&self, kind: ScriptKind) -> &[String] {
        self.scripts.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether any rotation criterion is declared
    pub fn has_criteria(&self) -> bool {
        self.maxsize.is_some() || self.maxage.is_some() || !self.frequencies.is_empty()
    }
}

fn parse_count(name: &str, value: &str) -> Result<u32> {
    value
        .trim()
        .parse()
        .map_err(|_| EngineError::Config(format!("{} expects a non-negative integer, got '{}'", name, value)))
}
