use crate::errors::RiskEngineError;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

pub trait Clock: Send + Sync {
    fn now(&self) -> SystemTime;
}

pub trait FileSystem: Send + Sync {
    fn read_to_string(&self, path: &Path) -> Result<String, RiskEngineError>;
    fn write_string(&self, path: &Path, contents: &str) -> Result<(), RiskEngineError>;
    fn create_dir_all(&self, path: &Path) -> Result<(), RiskEngineError>;
    fn exists(&self, path: &Path) -> bool;
}

pub trait Terminal: Send + Sync {
    fn write_line(&self, line: &str) -> Result<(), RiskEngineError>;
}

pub struct ProductionClock;

impl Clock for ProductionClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

pub struct ProductionFileSystem;

impl FileSystem for ProductionFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String, RiskEngineError> {
        std::fs::read_to_string(path)
            .map_err(|e| RiskEngineError::Io(format!("{}: {e}", path.display())))
    }

    fn write_string(&self, path: &Path, contents: &str) -> Result<(), RiskEngineError> {
        std::fs::write(path, contents)
            .map_err(|e| RiskEngineError::Io(format!("{}: {e}", path.display())))
    }

    fn create_dir_all(&self, path: &Path) -> Result<(), RiskEngineError> {
        std::fs::create_dir_all(path).map_err(|e| RiskEngineError::Io(e.to_string()))
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

pub struct ProductionTerminal;

impl Terminal for ProductionTerminal {
    fn write_line(&self, line: &str) -> Result<(), RiskEngineError> {
        use std::io::Write;
        let mut out = std::io::stdout();
        writeln!(out, "{line}").map_err(|e| RiskEngineError::Io(e.to_string()))
    }
}

pub struct ProductionRuntime {
    pub clock: Arc<dyn Clock>,
    pub file_system: Arc<dyn FileSystem>,
    pub terminal: Arc<dyn Terminal>,
}

impl ProductionRuntime {
    pub fn new() -> Self {
        Self {
            clock: Arc::new(ProductionClock),
            file_system: Arc::new(ProductionFileSystem),
            terminal: Arc::new(ProductionTerminal),
        }
    }
}

impl Default for ProductionRuntime {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Copy)]
pub struct FakeClock {
    now: SystemTime,
}

impl FakeClock {
    pub fn new(now: SystemTime) -> Self {
        Self { now }
    }
}

impl Clock for FakeClock {
    fn now(&self) -> SystemTime {
        self.now
    }
}

#[derive(Default, Clone)]
pub struct FakeFileSystem {
    files: Arc<Mutex<HashMap<PathBuf, String>>>,
    dirs: Arc<Mutex<Vec<PathBuf>>>,
    write_failure: Arc<Mutex<Option<RiskEngineError>>>,
}

impl FakeFileSystem {
    pub fn with_file(path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        let fs = Self::default();
        fs.files
            .lock()
            .expect("files lock")
            .insert(path.into(), contents.into());
        fs
    }

    /// The next `write_string` returns `error` instead of storing the file.
    pub fn fail_next_write(&self, error: RiskEngineError) {
        *self.write_failure.lock().expect("fail lock") = Some(error);
    }

    pub fn contents(&self, path: &Path) -> Option<String> {
        self.files.lock().expect("files lock").get(path).cloned()
    }

    pub fn created_dirs(&self) -> Vec<PathBuf> {
        self.dirs.lock().expect("dirs lock").clone()
    }
}

impl FileSystem for FakeFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String, RiskEngineError> {
        self.files
            .lock()
            .expect("files lock")
            .get(path)
            .cloned()
            .ok_or_else(|| RiskEngineError::Io(format!("missing file {}", path.display())))
    }

    fn write_string(&self, path: &Path, contents: &str) -> Result<(), RiskEngineError> {
        if let Some(err) = self.write_failure.lock().expect("fail lock").take() {
            return Err(err);
        }
        self.files
            .lock()
            .expect("files lock")
            .insert(path.to_path_buf(), contents.to_string());
        Ok(())
    }

    fn create_dir_all(&self, path: &Path) -> Result<(), RiskEngineError> {
        self.dirs
            .lock()
            .expect("dirs lock")
            .push(path.to_path_buf());
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.lock().expect("files lock").contains_key(path)
    }
}

#[derive(Default, Clone)]
pub struct FakeTerminal {
    writes: Arc<Mutex<Vec<String>>>,
}

impl FakeTerminal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn written_lines(&self) -> Vec<String> {
        self.writes.lock().expect("writes lock").clone()
    }
}

impl Terminal for FakeTerminal {
    fn write_line(&self, line: &str) -> Result<(), RiskEngineError> {
        self.writes
            .lock()
            .expect("writes lock")
            .push(line.to_string());
        Ok(())
    }
}
