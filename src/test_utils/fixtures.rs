use std::path::PathBuf;

use tempfile::TempDir;

/// Test fixture providing an isolated directory for config and log files.
pub struct UnitTestFixture {
    pub temp_dir: TempDir,
    pub data_path: PathBuf,
}

impl Default for UnitTestFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl UnitTestFixture {
    #[must_use]
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let data_path = temp_dir.path().to_path_buf();

        println!("[FIXTURE] Created temp directory: {data_path:?}");

        Self {
            temp_dir,
            data_path,
        }
    }

    /// Create a test file with content.
    #[must_use]
    pub fn create_file(&self, relative_path: &str, content: &str) -> PathBuf {
        let full_path = self.data_path.join(relative_path);
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent dirs");
        }
        std::fs::write(&full_path, content).expect("Failed to write file");
        println!(
            "[FIXTURE] Created file: {:?} ({} bytes)",
            full_path,
            content.len()
        );
        full_path
    }

    /// Write a `backup.yaml` pointing at `host:port`.
    #[must_use]
    pub fn create_config(&self, host: &str, port: u16, repository: &str) -> PathBuf {
        let log_file = self.data_path.join("esbackup.log");
        self.create_file(
            "backup.yaml",
            &format!(
                "elasticsearch_host: {host}\n\
                 elasticsearch_port: {port}\n\
                 backup_repository: {repository}\n\
                 logging_level: DEBUG\n\
                 log_file: {}\n",
                log_file.display()
            ),
        )
    }
}

impl Drop for UnitTestFixture {
    fn drop(&mut self) {
        println!("[FIXTURE] Cleaning up temp directory: {:?}", self.data_path);
    }
}
