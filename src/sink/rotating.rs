//! Size-bounded log file with timestamped backups.
//!
//! # Responsibilities
//! - Append to the active file, opening it lazily on first write
//! - Move the active file aside on rotation and start a new one
//! - Keep at most `max_backups` rotated files, dropping the oldest
//!
//! Backups live next to the active file as
//! `<stem>-<UTC %Y-%m-%dT%H-%M-%S%.3f>.<ext>`.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, NaiveDateTime, SubsecRound, Utc};

use crate::config::SinkConfig;
use crate::sink::Sink;

const BACKUP_TIME_FORMAT: &str = "%Y-%m-%dT%H-%M-%S%.3f";

/// A log file that rotates on demand or when it outgrows `max_size`.
#[derive(Debug)]
pub struct RotatingFile {
    path: PathBuf,
    max_backups: usize,
    max_size: u64,
    file: Option<File>,
    size: u64,
    /// Stamp of the newest backup this sink created.
    last_backup: Option<DateTime<Utc>>,
}

impl RotatingFile {
    /// Create a sink for `config.path`. Nothing touches the disk until the
    /// first write or rotation.
    pub fn new(config: &SinkConfig) -> Self {
        Self::with_limits(&config.path, config.max_backups, config.max_size_bytes())
    }

    /// `max_backups == 0` keeps every backup.
    pub fn with_limits(path: impl Into<PathBuf>, max_backups: usize, max_size: u64) -> Self {
        Self {
            path: path.into(),
            max_backups,
            max_size,
            file: None,
            size: 0,
            last_backup: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rotated files currently on disk, newest first.
    pub fn backups(&self) -> io::Result<Vec<PathBuf>> {
        let dir = self.dir();
        let (prefix, suffix) = self.backup_affixes();

        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        let mut backups: Vec<(NaiveDateTime, PathBuf)> = Vec::new();
        for entry in entries {
            let entry = entry?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            let Some(stamp) = name
                .strip_prefix(prefix.as_str())
                .and_then(|rest| rest.strip_suffix(suffix.as_str()))
            else {
                continue;
            };
            if let Ok(ts) = NaiveDateTime::parse_from_str(stamp, BACKUP_TIME_FORMAT) {
                backups.push((ts, entry.path()));
            }
        }

        backups.sort_by(|a, b| b.0.cmp(&a.0));
        Ok(backups.into_iter().map(|(_, path)| path).collect())
    }

    fn dir(&self) -> &Path {
        match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        }
    }

    fn backup_affixes(&self) -> (String, String) {
        let stem = self
            .path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let suffix = self
            .path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();
        (format!("{stem}-"), suffix)
    }

    /// Name for the next backup. Stamps strictly increase within a sink, so
    /// a name freed by pruning is never handed out again.
    fn backup_path(&mut self, now: DateTime<Utc>) -> PathBuf {
        let (prefix, suffix) = self.backup_affixes();
        let mut at = now.trunc_subsecs(3);
        if let Some(last) = self.last_backup {
            at = at.max(last + Duration::milliseconds(1));
        }
        loop {
            let candidate = self
                .dir()
                .join(format!("{prefix}{}{suffix}", at.format(BACKUP_TIME_FORMAT)));
            if !candidate.exists() {
                self.last_backup = Some(at);
                return candidate;
            }
            at += Duration::milliseconds(1);
        }
    }

    /// Open the existing active file for append, rotating first if `incoming`
    /// would not fit.
    fn open_existing_or_new(&mut self, incoming: u64) -> io::Result<()> {
        let size = match fs::metadata(&self.path) {
            Ok(meta) => meta.len(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => return self.open_new(),
            Err(e) => return Err(e),
        };
        if size + incoming > self.max_size {
            return self.rotate();
        }

        let file = OpenOptions::new().append(true).open(&self.path)?;
        self.file = Some(file);
        self.size = size;
        Ok(())
    }

    /// Move any active file aside and create an empty one in its place.
    fn open_new(&mut self) -> io::Result<()> {
        fs::create_dir_all(self.dir())?;

        if self.path.exists() {
            let backup = self.backup_path(Utc::now());
            fs::rename(&self.path, &backup)?;
            tracing::debug!(backup = %backup.display(), "Moved log file aside");
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&self.path)?;
        self.file = Some(file);
        self.size = 0;
        Ok(())
    }

    fn prune(&self) -> io::Result<()> {
        if self.max_backups == 0 {
            return Ok(());
        }
        for stale in self.backups()?.into_iter().skip(self.max_backups) {
            fs::remove_file(&stale)?;
            tracing::debug!(backup = %stale.display(), "Removed old log file");
        }
        Ok(())
    }
}

impl Sink for RotatingFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<()> {
        let len = buf.len() as u64;
        if len > self.max_size {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("write of {len} bytes exceeds max file size {}", self.max_size),
            ));
        }

        if self.file.is_none() {
            self.open_existing_or_new(len)?;
        } else if self.size + len > self.max_size {
            self.rotate()?;
        }

        let file = self
            .file
            .as_mut()
            .ok_or_else(|| io::Error::other("log file not open"))?;
        file.write_all(buf)?;
        self.size += len;
        Ok(())
    }

    fn rotate(&mut self) -> io::Result<()> {
        self.close()?;
        self.open_new()?;
        if let Err(e) = self.prune() {
            tracing::warn!(error = %e, "Failed to remove old log files");
        }
        Ok(())
    }

    fn close(&mut self) -> io::Result<()> {
        if let Some(mut file) = self.file.take() {
            file.flush()?;
            file.sync_all()?;
        }
        Ok(())
    }
}

impl Drop for RotatingFile {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sink_in(dir: &Path, max_backups: usize, max_size: u64) -> RotatingFile {
        RotatingFile::with_limits(dir.join("alerts.log"), max_backups, max_size)
    }

    #[test]
    fn creates_parent_dirs_lazily() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/logs/alerts.log");
        let mut sink = RotatingFile::with_limits(&path, 3, 1024);
        assert!(!path.exists());

        sink.write(b"{\"a\":1}\n").unwrap();
        sink.close().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "{\"a\":1}\n");
    }

    #[test]
    fn appends_to_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("alerts.log");
        fs::write(&path, "old\n").unwrap();

        let mut sink = sink_in(dir.path(), 3, 1024);
        sink.write(b"new\n").unwrap();
        sink.close().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "old\nnew\n");
    }

    #[test]
    fn rotate_moves_file_aside() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = sink_in(dir.path(), 3, 1024);

        sink.write(b"first\n").unwrap();
        sink.rotate().unwrap();
        sink.write(b"second\n").unwrap();
        sink.close().unwrap();

        let backups = sink.backups().unwrap();
        assert_eq!(backups.len(), 1);
        assert_eq!(fs::read_to_string(&backups[0]).unwrap(), "first\n");
        assert_eq!(fs::read_to_string(sink.path()).unwrap(), "second\n");

        let name = backups[0].file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("alerts-") && name.ends_with(".log"), "{name}");
    }

    #[test]
    fn keeps_only_max_backups() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = sink_in(dir.path(), 3, 1024);

        for i in 0..6 {
            sink.write(format!("{i}\n").as_bytes()).unwrap();
            sink.rotate().unwrap();
        }
        sink.close().unwrap();

        let backups = sink.backups().unwrap();
        assert_eq!(backups.len(), 3);
        // Newest first: the last three records written before each rotation.
        let contents: Vec<String> = backups
            .iter()
            .map(|p| fs::read_to_string(p).unwrap())
            .collect();
        assert_eq!(contents, vec!["5\n", "4\n", "3\n"]);
    }

    #[test]
    fn backup_names_always_increase() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = sink_in(dir.path(), 2, 1024);

        let mut names = Vec::new();
        for i in 0..20 {
            sink.write(format!("{i}\n").as_bytes()).unwrap();
            sink.rotate().unwrap();
            names.push(sink.backups().unwrap()[0].clone());
        }

        assert!(names.windows(2).all(|w| w[0] < w[1]), "{names:?}");
        let contents: Vec<String> = sink
            .backups()
            .unwrap()
            .iter()
            .map(|p| fs::read_to_string(p).unwrap())
            .collect();
        assert_eq!(contents, vec!["19\n", "18\n"]);
    }

    #[test]
    fn skips_names_already_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = sink_in(dir.path(), 0, 1024);
        let now = Utc::now();
        let taken = sink.backup_path(now);
        fs::write(&taken, "earlier\n").unwrap();
        sink.last_backup = None;

        let next = sink.backup_path(now);
        assert_ne!(next, taken);
        assert!(next > taken);
    }

    #[test]
    fn rotates_when_size_exceeded() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = sink_in(dir.path(), 3, 10);

        sink.write(b"12345\n").unwrap();
        sink.write(b"67890\n").unwrap();
        sink.close().unwrap();

        assert_eq!(sink.backups().unwrap().len(), 1);
        assert_eq!(fs::read_to_string(sink.path()).unwrap(), "67890\n");
    }

    #[test]
    fn rejects_oversized_write() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = sink_in(dir.path(), 3, 4);

        let err = sink.write(b"too long\n").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn write_after_close_reopens() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = sink_in(dir.path(), 3, 1024);

        sink.write(b"a\n").unwrap();
        sink.close().unwrap();
        sink.write(b"b\n").unwrap();
        sink.close().unwrap();

        assert_eq!(fs::read_to_string(sink.path()).unwrap(), "a\nb\n");
    }
}
