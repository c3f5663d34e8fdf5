//! @ai:module:intent Resolve the input cases handed to the external tool
//! @ai:module:layer infrastructure
//! @ai:module:public_api CaseLoader, CaseLoaderTrait
//! @ai:module:stateless true

use crate::config::RunConfig;
use crate::error::{ProfileError, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// @ai:intent Trait for loading the case list
pub trait CaseLoaderTrait: Send + Sync {
    /// @ai:intent Collect explicit cases plus any discovered in the cases directory
    fn load(&self, run: &RunConfig) -> Result<Vec<PathBuf>>;
}

/// @ai:intent Loads cases from configuration and the filesystem
pub struct CaseLoader {
    require_existing: bool,
}

impl CaseLoader {
    /// @ai:intent Create a loader that rejects missing case files
    /// @ai:effects pure
    pub fn new() -> Self {
        Self {
            require_existing: true,
        }
    }

    /// @ai:intent Create a loader that accepts case paths without checking them
    /// @ai:effects pure
    pub fn lenient() -> Self {
        Self {
            require_existing: false,
        }
    }

    /// @ai:intent Find case files by extension under a directory, sorted
    /// @ai:effects fs:read
    fn discover(dir: &Path, extensions: &[String]) -> Vec<PathBuf> {
        let mut found: Vec<PathBuf> = WalkDir::new(dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| {
                e.path()
                    .extension()
                    .map(|ext| extensions.iter().any(|wanted| ext == wanted.as_str()))
                    .unwrap_or(false)
            })
            .map(|e| e.path().to_path_buf())
            .collect();

        found.sort();
        found
    }
}

impl Default for CaseLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl CaseLoaderTrait for CaseLoader {
    /// @ai:intent Explicit cases first, then discovered ones, without duplicates
    /// @ai:effects fs:read
    fn load(&self, run: &RunConfig) -> Result<Vec<PathBuf>> {
        let mut cases: Vec<PathBuf> = Vec::new();

        for case in &run.cases {
            if self.require_existing && !case.is_file() {
                return Err(ProfileError::CaseNotFound(case.clone()));
            }

            if !cases.contains(case) {
                cases.push(case.clone());
            }
        }

        if let Some(dir) = &run.cases_dir {
            if self.require_existing && !dir.is_dir() {
                return Err(ProfileError::CaseNotFound(dir.clone()));
            }

            for case in Self::discover(dir, &run.extensions) {
                if !cases.contains(&case) {
                    cases.push(case);
                }
            }
        }

        tracing::debug!("Resolved {} cases", cases.len());
        Ok(cases)
    }
}
