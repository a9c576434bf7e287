//! Deterministic ZIP assembly of the package.
//!
//! Every entry gets the same timestamp, taken once per build from a
//! [`TimestampPolicy`], and the same permission bits. With a fixed clock two
//! builds over the same inputs produce identical bytes.

use std::{
    fmt::{Display, Formatter},
    fs,
    io::{Cursor, Seek, Write},
    path::Path,
    str::FromStr,
};

use chrono::{DateTime, Datelike, Days, Local, Months, NaiveDate, NaiveDateTime, Timelike};
use indoc::indoc;
use zip::{CompressionMethod, ZipWriter, write::SimpleFileOptions};

use crate::error::Error;

/// Permission bits of every entry (`rw-rw-r--`).
pub const DEFAULT_PERMISSIONS: u32 = 0o664;

pub const DICTIONARY_CONFIG_PATH: &str = "dictionaries.xcu";
pub const DESCRIPTION_PATH: &str = "description.xml";
pub const LICENSE_PATH: &str = "LICENSES-en.txt";
pub const MANIFEST_PATH: &str = "META-INF/manifest.xml";

pub const LICENSE_TEXT: &str = indoc! {"
    LICENSES:
    Spell checker: MIT

    https://opensource.org/licenses/MIT
"};

pub const MANIFEST_XML: &str = indoc! {r#"
    <?xml version="1.0" encoding="UTF-8"?>
    <!DOCTYPE manifest:manifest PUBLIC "-//OpenOffice.org//DTD Manifest 1.0//EN" "Manifest.dtd">
    <manifest:manifest xmlns:manifest="http://openoffice.org/2001/manifest">
        <manifest:file-entry manifest:media-type="application/vnd.sun.star.configuration-data" manifest:full-path="dictionaries.xcu"/>
    </manifest:manifest>
"#};

/// Archive path of the affix file for `langtag`.
pub fn affix_path(langtag: &str) -> String {
    format!("dictionaries/{}.aff", langtag)
}

/// Archive path of the dictionary file for `langtag`.
pub fn dictionary_path(langtag: &str) -> String {
    format!("dictionaries/{}.dic", langtag)
}

/// Where the entry timestamp of a build comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimestampPolicy {
    /// Local wall-clock time at build start.
    #[default]
    BuildTime,
    /// A fixed time, for reproducible builds.
    Fixed(NaiveDateTime),
    /// Build time moved forward by one month and one day.
    LegacyShift,
}

impl TimestampPolicy {
    /// A fixed timestamp from seconds since the Unix epoch, as in
    /// `SOURCE_DATE_EPOCH`. The time is taken as UTC.
    pub fn from_epoch(seconds: i64) -> Result<Self, Error> {
        DateTime::from_timestamp(seconds, 0)
            .map(|dt| TimestampPolicy::Fixed(dt.naive_utc()))
            .ok_or_else(|| Error::Timestamp(format!("epoch {} is out of range", seconds)))
    }

    /// The entry timestamp for a build started now.
    pub fn resolve(&self) -> Result<NaiveDateTime, Error> {
        self.resolve_at(Local::now().naive_local())
    }

    /// The entry timestamp for a build started at `now`.
    pub fn resolve_at(&self, now: NaiveDateTime) -> Result<NaiveDateTime, Error> {
        match self {
            TimestampPolicy::BuildTime => Ok(now),
            TimestampPolicy::Fixed(fixed) => Ok(*fixed),
            TimestampPolicy::LegacyShift => now
                .checked_add_months(Months::new(1))
                .and_then(|dt| dt.checked_add_days(Days::new(1)))
                .ok_or_else(|| Error::Timestamp(format!("cannot shift {}", now))),
        }
    }
}

impl Display for TimestampPolicy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TimestampPolicy::BuildTime => write!(f, "build"),
            TimestampPolicy::Fixed(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S")),
            TimestampPolicy::LegacyShift => write!(f, "legacy"),
        }
    }
}

/// Accepts `build`, `legacy`, an RFC 3339 date-time (its wall-clock part is
/// used) or `YYYY-MM-DDTHH:MM:SS`.
impl FromStr for TimestampPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.to_ascii_lowercase().as_str() {
            "build" | "now" => return Ok(TimestampPolicy::BuildTime),
            "legacy" => return Ok(TimestampPolicy::LegacyShift),
            _ => {}
        }
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok(TimestampPolicy::Fixed(dt.naive_local()));
        }
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
            .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S"))
            .map(TimestampPolicy::Fixed)
            .map_err(|_| {
                Error::Timestamp(format!(
                    "`{}` is not `build`, `legacy` or a date-time like 2024-01-31T12:00:00",
                    s
                ))
            })
    }
}

/// Converts to a ZIP timestamp. Times before 1980 are clamped to the ZIP
/// epoch; times after 2107 cannot be stored.
pub fn zip_datetime(dt: NaiveDateTime) -> Result<zip::DateTime, Error> {
    let dt = if dt.year() < 1980 {
        zip_epoch()
    } else {
        dt
    };
    let out_of_range = || Error::Timestamp(format!("{} does not fit in a ZIP archive", dt));
    let year = u16::try_from(dt.year()).map_err(|_| out_of_range())?;
    zip::DateTime::from_date_and_time(
        year,
        dt.month() as u8,
        dt.day() as u8,
        dt.hour() as u8,
        dt.minute() as u8,
        dt.second() as u8,
    )
    .map_err(|_| out_of_range())
}

fn zip_epoch() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1980, 1, 1)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

/// One archive member, fully materialized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub path: String,
    pub content: Vec<u8>,
    pub modified: NaiveDateTime,
    pub permissions: u32,
}

/// Archive members in insertion order, with unique paths.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PackageManifest {
    entries: Vec<ManifestEntry>,
}

impl PackageManifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `entry`; a path already present is [`Error::DuplicateEntry`].
    pub fn push(&mut self, entry: ManifestEntry) -> Result<(), Error> {
        if self.contains(&entry.path) {
            return Err(Error::DuplicateEntry(entry.path));
        }
        self.entries.push(entry);
        Ok(())
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.iter().any(|entry| entry.path == path)
    }

    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    pub fn paths(&self) -> Vec<String> {
        self.entries.iter().map(|entry| entry.path.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Collects package entries and writes them as one ZIP archive.
#[derive(Debug, Clone)]
pub struct ArchiveBuilder {
    manifest: PackageManifest,
    modified: NaiveDateTime,
}

impl ArchiveBuilder {
    /// Starts an archive whose entries are all stamped with `modified`.
    pub fn new(modified: NaiveDateTime) -> Self {
        Self {
            manifest: PackageManifest::new(),
            modified,
        }
    }

    /// Starts an archive stamped according to `policy`, evaluated once, now.
    pub fn with_policy(policy: TimestampPolicy) -> Result<Self, Error> {
        Ok(Self::new(policy.resolve()?))
    }

    pub fn modified(&self) -> NaiveDateTime {
        self.modified
    }

    pub fn manifest(&self) -> &PackageManifest {
        &self.manifest
    }

    /// Adds an entry with the build timestamp and [`DEFAULT_PERMISSIONS`].
    pub fn add(&mut self, path: impl Into<String>, content: impl Into<Vec<u8>>) -> Result<(), Error> {
        self.manifest.push(ManifestEntry {
            path: path.into(),
            content: content.into(),
            modified: self.modified,
            permissions: DEFAULT_PERMISSIONS,
        })
    }

    /// Adds the fixed license notice and `META-INF/manifest.xml`.
    pub fn add_fixed_entries(&mut self) -> Result<(), Error> {
        self.add(LICENSE_PATH, LICENSE_TEXT)?;
        self.add(MANIFEST_PATH, MANIFEST_XML)
    }

    /// Writes the archive to `writer` and returns it.
    pub fn write<W: Write + Seek>(&self, writer: W) -> Result<W, Error> {
        let mut zip = ZipWriter::new(writer);
        for entry in self.manifest.entries() {
            let options = SimpleFileOptions::default()
                .compression_method(CompressionMethod::Deflated)
                .unix_permissions(entry.permissions)
                .last_modified_time(zip_datetime(entry.modified)?);
            zip.start_file(entry.path.as_str(), options)?;
            zip.write_all(&entry.content)?;
        }
        Ok(zip.finish()?)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        Ok(self.write(Cursor::new(Vec::new()))?.into_inner())
    }

    /// Writes the archive to `path`. The archive is assembled in memory first,
    /// so a failed build leaves no partial file behind.
    pub fn write_to_path(&self, path: &Path) -> Result<(), Error> {
        let bytes = self.to_bytes()?;
        fs::write(path, &bytes).map_err(|e| Error::file_io(path, e))?;
        tracing::info!(
            path = %path.display(),
            entries = self.manifest.len(),
            bytes = bytes.len(),
            "wrote package"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use zip::ZipArchive;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    #[test]
    fn test_duplicate_path_is_rejected() {
        let mut builder = ArchiveBuilder::new(at(2024, 5, 1, 0, 0, 0));
        builder.add("a.txt", "one").unwrap();
        let err = builder.add("a.txt", "two").unwrap_err();
        assert!(matches!(err, Error::DuplicateEntry(path) if path == "a.txt"));
        assert_eq!(builder.manifest().len(), 1);
    }

    #[test]
    fn test_legacy_shift_is_calendar_checked() {
        let policy = TimestampPolicy::LegacyShift;
        assert_eq!(
            policy.resolve_at(at(2024, 1, 31, 10, 0, 0)).unwrap(),
            at(2024, 3, 1, 10, 0, 0)
        );
        assert_eq!(
            policy.resolve_at(at(2023, 12, 31, 23, 59, 58)).unwrap(),
            at(2024, 2, 1, 23, 59, 58)
        );
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("legacy".parse::<TimestampPolicy>().unwrap(), TimestampPolicy::LegacyShift);
        assert_eq!("BUILD".parse::<TimestampPolicy>().unwrap(), TimestampPolicy::BuildTime);
        assert_eq!(
            "2024-02-03T04:05:06+02:00".parse::<TimestampPolicy>().unwrap(),
            TimestampPolicy::Fixed(at(2024, 2, 3, 4, 5, 6))
        );
        assert_eq!(
            "2024-02-03T04:05:06".parse::<TimestampPolicy>().unwrap(),
            TimestampPolicy::Fixed(at(2024, 2, 3, 4, 5, 6))
        );
        assert!(matches!(
            "yesterday".parse::<TimestampPolicy>(),
            Err(Error::Timestamp(_))
        ));
    }

    #[test]
    fn test_from_epoch() {
        assert_eq!(
            TimestampPolicy::from_epoch(0).unwrap(),
            TimestampPolicy::Fixed(at(1970, 1, 1, 0, 0, 0))
        );
    }

    #[test]
    fn test_zip_datetime_clamps_and_rejects() {
        let clamped = zip_datetime(at(1970, 6, 1, 12, 0, 0)).unwrap();
        assert_eq!(
            (clamped.year(), clamped.month(), clamped.day(), clamped.hour()),
            (1980, 1, 1, 0)
        );
        assert!(matches!(
            zip_datetime(at(2200, 1, 1, 0, 0, 0)),
            Err(Error::Timestamp(_))
        ));
    }

    #[test]
    fn test_zip_datetime_rejects_years_past_u16() {
        // 67616 wraps to 2080 when narrowed to 16 bits
        assert!(matches!(
            zip_datetime(at(67616, 1, 1, 0, 0, 0)),
            Err(Error::Timestamp(_))
        ));
    }

    #[test]
    fn test_entries_keep_order_permissions_and_time() {
        let mut builder = ArchiveBuilder::new(at(2024, 5, 6, 7, 8, 10));
        builder.add("b.txt", "bee").unwrap();
        builder.add_fixed_entries().unwrap();
        builder.add("a/a.txt", "ay").unwrap();

        let bytes = builder.to_bytes().unwrap();
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let names: Vec<String> = archive.file_names().map(str::to_string).collect();
        assert_eq!(names.len(), 4);

        let expected = ["b.txt", LICENSE_PATH, MANIFEST_PATH, "a/a.txt"];
        for (index, name) in expected.iter().enumerate() {
            let mut file = archive.by_index(index).unwrap();
            assert_eq!(file.name(), *name);
            assert_eq!(file.compression(), CompressionMethod::Deflated);
            assert_eq!(file.unix_mode().map(|mode| mode & 0o777), Some(0o664));
            let modified = file.last_modified().unwrap();
            assert_eq!(
                (modified.year(), modified.month(), modified.day(), modified.minute()),
                (2024, 5, 6, 8)
            );
            let mut content = String::new();
            file.read_to_string(&mut content).unwrap();
            if *name == LICENSE_PATH {
                assert!(content.starts_with("LICENSES:\nSpell checker: MIT\n"));
            }
        }
    }

    #[test]
    fn test_same_time_same_bytes() {
        let build = || {
            let mut builder = ArchiveBuilder::new(at(2020, 1, 1, 0, 0, 0));
            builder.add("x.txt", "same").unwrap();
            builder.add_fixed_entries().unwrap();
            builder.to_bytes().unwrap()
        };
        assert_eq!(build(), build());
    }

    #[test]
    fn test_write_to_unwritable_path_names_it() {
        let builder = ArchiveBuilder::new(at(2020, 1, 1, 0, 0, 0));
        let err = builder
            .write_to_path(Path::new("/nonexistent-dir/out.oxt"))
            .unwrap_err();
        assert!(err.to_string().contains("/nonexistent-dir/out.oxt"));
    }
}
