/*!
 * Common test utilities for the yamtwai test suite
 */

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use yamtwai::app_config::Config;

pub mod mock_backends;

/// Route library logs to the test output, once
pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Default config translating English into `targets`
pub fn config_for(targets: &[&str]) -> Config {
    Config {
        target_languages: targets.iter().map(|t| t.to_string()).collect(),
        ..Config::default()
    }
}

/// A small blog post touching every kind of line
pub const SAMPLE_POST: &str = r#"---
title: "Writing a translator"
date: 2024-05-01
tags: [rust, markdown]
---
# Writing a translator

Translating Markdown one line at a time.

![diagram](img/pipeline.png)

```rust
fn main() {}
```

## Why lines

See [the guide](https://example.com/guide) for details.
"#;
