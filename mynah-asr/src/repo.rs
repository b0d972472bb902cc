//! Model repository sources.

use eyre::{OptionExt, Result, WrapErr};
use hf_hub::CacheRepo;
use hf_hub::api::sync::ApiRepo;
use std::path::PathBuf;

/// Where model files come from.
#[derive(Debug)]
pub enum ModelRepo {
    /// Local filesystem path
    Path(PathBuf),
    /// HuggingFace cache repository
    Cache(CacheRepo),
    /// HuggingFace API repository
    Api(ApiRepo),
}

impl ModelRepo {
    /// Resolve a file name to its full path in this repository.
    pub fn resolve(&self, file_name: &str) -> Result<PathBuf> {
        match self {
            ModelRepo::Path(path) => path
                .join(file_name)
                .canonicalize()
                .wrap_err(format!("failed to resolve model file: {file_name}")),
            ModelRepo::Cache(cache_repo) => cache_repo
                .get(file_name)
                .ok_or_eyre(format!("model file not found in cache: {file_name}")),
            ModelRepo::Api(api_repo) => api_repo
                .get(file_name)
                .wrap_err(format!("failed to download from api: {file_name}")),
        }
    }

    /// Try resolving multiple file names, return first successful match.
    pub fn resolve_any(&self, candidates: &[&str]) -> Result<PathBuf> {
        candidates
            .iter()
            .find_map(|name| self.resolve(name).ok())
            .ok_or_eyre("no model found from candidates")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_repo_resolves_existing_file() {
        let dir = std::env::temp_dir().join("mynah_repo_test");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("vocab.txt"), "a\nb\n").unwrap();

        let repo = ModelRepo::Path(dir.clone());

        assert!(repo.resolve("vocab.txt").is_ok());
        assert!(repo.resolve("missing.onnx").is_err());

        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn resolve_any_falls_through_candidates() {
        let dir = std::env::temp_dir().join("mynah_repo_any_test");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("encoder.onnx"), b"stub").unwrap();

        let repo = ModelRepo::Path(dir.clone());

        let resolved = repo
            .resolve_any(&["encoder-model.onnx", "encoder.onnx"])
            .unwrap();
        assert!(resolved.ends_with("encoder.onnx"));

        assert!(repo.resolve_any(&["a.onnx", "b.onnx"]).is_err());

        std::fs::remove_dir_all(dir).ok();
    }
}
