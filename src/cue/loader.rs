use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};

/// Background read of the custom cue file.
///
/// The worker publishes its result through a shared cell; the tick loop
/// polls [`take_result`](Self::take_result) and never blocks on it.
pub struct CueClipLoader {
    state: Arc<Mutex<Option<Result<Vec<u8>>>>>,
    path: PathBuf,
}

impl CueClipLoader {
    /// Start reading `path` on a worker thread.
    pub fn start(path: PathBuf) -> Self {
        let state: Arc<Mutex<Option<Result<Vec<u8>>>>> = Arc::new(Mutex::new(None));

        let state_clone = state.clone();
        let read_path = path.clone();
        std::thread::spawn(move || {
            let result = std::fs::read(&read_path)
                .with_context(|| format!("failed to read cue file {}", read_path.display()));
            *state_clone.lock().unwrap() = Some(result);
        });

        Self { state, path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Take the published bytes, if the worker has finished.
    /// Returns `None` while the read is still in flight.
    pub fn take_result(&self) -> Option<Result<Vec<u8>>> {
        self.state.lock().unwrap().take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;

    fn wait_for(loader: &CueClipLoader) -> Result<Vec<u8>> {
        for _ in 0..100 {
            if let Some(result) = loader.take_result() {
                return result;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        panic!("loader did not publish a result");
    }

    #[test]
    fn reads_existing_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"RIFF fake wav").unwrap();

        let loader = CueClipLoader::start(file.path().to_path_buf());
        let bytes = wait_for(&loader).unwrap();
        assert_eq!(bytes, b"RIFF fake wav");
    }

    #[test]
    fn missing_file_publishes_error() {
        let loader = CueClipLoader::start(PathBuf::from("/nonexistent/cue.wav"));
        assert!(wait_for(&loader).is_err());
    }

    #[test]
    fn result_is_taken_once() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"x").unwrap();

        let loader = CueClipLoader::start(file.path().to_path_buf());
        wait_for(&loader).unwrap();
        assert!(loader.take_result().is_none());
    }
}
