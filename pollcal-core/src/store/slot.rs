//! Persisted slots: the single durable location holding the event list.

use std::path::PathBuf;
use std::sync::Mutex;

use crate::error::{PollCalError, PollCalResult};

/// A named durable location holding one serialized value.
pub trait Slot {
    /// Current contents, or `None` if nothing was ever written.
    fn read(&self) -> PollCalResult<Option<String>>;

    /// Replace the contents.
    fn write(&self, contents: &str) -> PollCalResult<()>;
}

impl<S: Slot + ?Sized> Slot for &S {
    fn read(&self) -> PollCalResult<Option<String>> {
        (**self).read()
    }

    fn write(&self, contents: &str) -> PollCalResult<()> {
        (**self).write(contents)
    }
}

/// A JSON file on disk.
#[derive(Debug, Clone)]
pub struct FileSlot {
    path: PathBuf,
}

impl FileSlot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileSlot { path: path.into() }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl Slot for FileSlot {
    fn read(&self) -> PollCalResult<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, contents: &str) -> PollCalResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // Readers only ever see the old or the new list
        let temp = self.temp_path();
        std::fs::write(&temp, contents)?;
        std::fs::rename(&temp, &self.path)?;
        Ok(())
    }
}

/// In-process slot, for tests and embedding.
#[derive(Debug, Default)]
pub struct MemorySlot {
    contents: Mutex<Option<String>>,
    fail_writes: bool,
}

impl MemorySlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// A slot that starts out holding `contents`.
    pub fn with_contents(contents: impl Into<String>) -> Self {
        MemorySlot {
            contents: Mutex::new(Some(contents.into())),
            fail_writes: false,
        }
    }

    /// A slot whose writes always fail, like storage that is full or disabled.
    pub fn failing() -> Self {
        MemorySlot {
            contents: Mutex::new(None),
            fail_writes: true,
        }
    }

    /// Contents as last written, for assertions.
    pub fn contents(&self) -> Option<String> {
        self.contents.lock().ok().and_then(|guard| guard.clone())
    }
}

impl Slot for MemorySlot {
    fn read(&self) -> PollCalResult<Option<String>> {
        let guard = self
            .contents
            .lock()
            .map_err(|_| PollCalError::Unavailable("memory slot lock poisoned".into()))?;
        Ok(guard.clone())
    }

    fn write(&self, contents: &str) -> PollCalResult<()> {
        if self.fail_writes {
            return Err(PollCalError::Unavailable("quota exceeded".into()));
        }
        let mut guard = self
            .contents
            .lock()
            .map_err(|_| PollCalError::Unavailable("memory slot lock poisoned".into()))?;
        *guard = Some(contents.to_string());
        Ok(())
    }
}
