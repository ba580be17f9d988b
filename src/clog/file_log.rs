use std::fs::File;
use std::io::BufReader;
use std::io::BufWriter;
use std::io::ErrorKind;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use parking_lot::Mutex;
use tracing::debug;
use tracing::warn;

use super::ChangeLog;
use super::LogOp;
use super::LogRecord;
use crate::utils::file_io::open_file_for_append;
use crate::Result;
use crate::StorageError;
use crate::UserName;

/// Change log stored as a sequence of bincode-encoded [`LogRecord`]s.
pub struct FileChangeLog {
    path: PathBuf,
    writer: Mutex<BufWriter<File>>,
}

impl FileChangeLog {
    /// Opens `path` for appending, creating it and its parent directory if
    /// needed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = open_file_for_append(&path)?;
        debug!(path = %path.display(), "change log opened");
        Ok(FileChangeLog {
            path,
            writer: Mutex::new(BufWriter::new(file)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads every record in `path`.
    ///
    /// A missing file is an empty log. Reading stops at the first record that
    /// cannot be decoded, which covers a tail torn by a crash mid-append.
    pub fn replay(path: impl AsRef<Path>) -> Result<Vec<LogRecord>> {
        let path = path.as_ref();
        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(StorageError::PathError {
                    path: path.to_path_buf(),
                    source: e,
                }
                .into())
            }
        };

        let mut reader = BufReader::new(file);
        let mut records = Vec::new();
        loop {
            match bincode::deserialize_from::<_, LogRecord>(&mut reader) {
                Ok(record) => records.push(record),
                Err(e) => {
                    if !matches!(&*e, bincode::ErrorKind::Io(io) if io.kind() == ErrorKind::UnexpectedEof) {
                        warn!(path = %path.display(), "change log replay stopped early: {}", e);
                    }
                    break;
                }
            }
        }
        debug!(path = %path.display(), count = records.len(), "change log replayed");
        Ok(records)
    }
}

impl ChangeLog for FileChangeLog {
    fn append(
        &self,
        record: LogRecord,
    ) -> Result<()> {
        let mut writer = self.writer.lock();
        bincode::serialize_into(&mut *writer, &record).map_err(StorageError::from)?;
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        let mut writer = self.writer.lock();
        writer.flush().map_err(StorageError::from)?;
        writer.get_ref().sync_data().map_err(StorageError::from)?;
        Ok(())
    }

    fn wipe(
        &self,
        user: &UserName,
    ) -> Result<()> {
        self.append(LogRecord::new(LogOp::Wipe, user.root(), None, 0))
    }
}
