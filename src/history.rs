use crate::client::Weather;
use crate::clock::{Clock, SystemClock, format_timestamp};
use crate::format::format_weather;

use serde::{Deserialize, Serialize};
use serde_json::Serializer;
use serde_json::ser::PrettyFormatter;

use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Something that can durably keep a weather reading
pub trait Storage {
    fn save(&self, weather: &Weather) -> Result<(), StorageError>;
}

/// Save a weather reading into whichever storage the caller picked.
pub fn save_weather<S: Storage + ?Sized>(
    weather: &Weather,
    storage: &S,
) -> Result<(), StorageError> {
    storage.save(weather)
}

/// A single entry of the JSON history
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HistoryRecord {
    /// When the reading was saved
    pub date: String,
    /// The reading as rendered by `format_weather`
    pub weather: String,
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("History file {} is not a JSON array of records: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Unable to serialize history: {0}")]
    Serialize(#[source] serde_json::Error),
}

impl StorageError {
    fn io(path: &Path) -> impl FnOnce(io::Error) -> StorageError + '_ {
        move |source| StorageError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Appends each reading to a human-readable log file.
pub struct PlainTextStorage<C: Clock = SystemClock> {
    path: PathBuf,
    clock: C,
}

impl PlainTextStorage {
    pub fn new<P: Into<PathBuf>>(path: P) -> PlainTextStorage {
        PlainTextStorage::with_clock(path, SystemClock)
    }
}

impl<C: Clock> PlainTextStorage<C> {
    pub fn with_clock<P: Into<PathBuf>>(path: P, clock: C) -> PlainTextStorage<C> {
        PlainTextStorage {
            path: path.into(),
            clock,
        }
    }
}

impl<C: Clock> Storage for PlainTextStorage<C> {
    fn save(&self, weather: &Weather) -> Result<(), StorageError> {
        let now = format_timestamp(self.clock.now());
        let formatted = format_weather(weather);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(StorageError::io(&self.path))?;
        write!(file, "{now}\n {formatted}\n").map_err(StorageError::io(&self.path))?;

        debug!("Appended reading from {now} to {}", self.path.display());
        Ok(())
    }
}

/// Keeps the whole history as a pretty-printed JSON array, rewritten on every save.
pub struct JsonArrayStorage<C: Clock = SystemClock> {
    path: PathBuf,
    clock: C,
}

impl JsonArrayStorage {
    /// Open the history at `path`, creating it as an empty array if it does not exist yet.
    pub fn open_or_create<P: Into<PathBuf>>(path: P) -> Result<JsonArrayStorage, StorageError> {
        JsonArrayStorage::open_or_create_with_clock(path, SystemClock)
    }
}

impl<C: Clock> JsonArrayStorage<C> {
    pub fn open_or_create_with_clock<P: Into<PathBuf>>(
        path: P,
        clock: C,
    ) -> Result<JsonArrayStorage<C>, StorageError> {
        let path = path.into();
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut file) => {
                file.write_all(b"[]").map_err(StorageError::io(&path))?;
                info!("Initialized empty history in {}", path.display());
            }
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
                debug!("Using existing history in {}", path.display());
            }
            Err(err) => return Err(StorageError::io(&path)(err)),
        }

        Ok(JsonArrayStorage { path, clock })
    }

    fn read_history(&self) -> Result<Vec<HistoryRecord>, StorageError> {
        let raw = fs::read_to_string(&self.path).map_err(StorageError::io(&self.path))?;
        serde_json::from_str(&raw).map_err(|source| StorageError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    /// Replace the history on disk with `history`.  The new content goes to a synced sibling temp
    /// file and is renamed over the old one, so readers never see a half-written array.  A
    /// symlinked history is followed: the link stays in place and its target is replaced, keeping
    /// the target's permissions.
    fn write_history(&self, history: &[HistoryRecord]) -> Result<(), StorageError> {
        let mut buf = Vec::new();
        let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
        history
            .serialize(&mut ser)
            .map_err(StorageError::Serialize)?;

        let target = fs::canonicalize(&self.path).map_err(StorageError::io(&self.path))?;
        let permissions = fs::metadata(&target)
            .map_err(StorageError::io(&target))?
            .permissions();
        let tmp_path = tmp_path_for(&target);
        if let Err(err) = write_synced(&tmp_path, &buf, permissions) {
            let _ = fs::remove_file(&tmp_path);
            return Err(StorageError::io(&tmp_path)(err));
        }
        fs::rename(&tmp_path, &target).map_err(|err| {
            let _ = fs::remove_file(&tmp_path);
            StorageError::io(&target)(err)
        })
    }
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

fn write_synced(path: &Path, contents: &[u8], permissions: fs::Permissions) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(contents)?;
    file.set_permissions(permissions)?;
    file.sync_all()
}

impl<C: Clock> Storage for JsonArrayStorage<C> {
    fn save(&self, weather: &Weather) -> Result<(), StorageError> {
        let mut history = self.read_history()?;
        history.push(HistoryRecord {
            date: format_timestamp(self.clock.now()),
            weather: format_weather(weather),
        });
        self.write_history(&history)?;

        debug!(
            "Saved reading #{} to {}",
            history.len(),
            self.path.display()
        );
        Ok(())
    }
}
