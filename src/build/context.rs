//! Shared build context
//!
//! Resolved once per build from the request, the configuration, and the
//! product descriptor; read-only afterwards.

use crate::build::request::BuildRequest;
use crate::config::Config;
use crate::error::{StagehandError, StagehandResult};
use crate::product::{ArtifactSpec, ProductsFile};
use std::path::PathBuf;

/// Immutable context shared by every task of one build
#[derive(Debug, Clone)]
pub struct BuildContext {
    /// Source checkout root
    pub project_root: PathBuf,

    /// Compiled classes root
    pub classes_root: PathBuf,

    /// Root under which per-product run directories live
    pub out_root: PathBuf,

    /// Externally-defined artifacts following the run directory
    pub artifacts: Vec<ArtifactSpec>,
}

impl BuildContext {
    /// Resolve the context for one request
    pub async fn create(
        request: &BuildRequest,
        descriptor: &ProductsFile,
        config: &Config,
    ) -> StagehandResult<Self> {
        if !request.classes_root.is_dir() {
            return Err(StagehandError::ClassesRootMissing(
                request.classes_root.clone(),
            ));
        }

        let out_root = request
            .out_root
            .clone()
            .or_else(|| config.build.out_root.clone())
            .unwrap_or_else(|| request.project_root.join("out").join("dev-run"));

        Ok(Self {
            project_root: request.project_root.clone(),
            classes_root: request.classes_root.clone(),
            out_root,
            artifacts: descriptor.artifacts.clone(),
        })
    }

    /// Run directory for a product
    pub fn run_dir(&self, product: &str) -> PathBuf {
        self.out_root.join(format!("{product}-dev"))
    }

    /// Plugin cache root for a product
    pub fn cache_root(&self, product: &str) -> PathBuf {
        self.out_root.join(format!("{product}-plugin-cache"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn missing_classes_root_rejected() {
        let dir = TempDir::new().unwrap();
        let request = BuildRequest::new("idea", dir.path(), dir.path().join("nope"));

        let err = BuildContext::create(&request, &ProductsFile::default(), &Config::default())
            .await
            .unwrap_err();
        assert!(matches!(err, StagehandError::ClassesRootMissing(_)));
    }

    #[tokio::test]
    async fn out_root_defaults_under_project() {
        let dir = TempDir::new().unwrap();
        let classes = dir.path().join("classes");
        std::fs::create_dir_all(&classes).unwrap();
        let request = BuildRequest::new("idea", dir.path(), &classes);

        let ctx = BuildContext::create(&request, &ProductsFile::default(), &Config::default())
            .await
            .unwrap();

        assert_eq!(ctx.out_root, dir.path().join("out/dev-run"));
        assert_eq!(ctx.run_dir("idea"), dir.path().join("out/dev-run/idea-dev"));
        assert_eq!(
            ctx.cache_root("idea"),
            dir.path().join("out/dev-run/idea-plugin-cache")
        );
    }

    #[tokio::test]
    async fn request_out_root_wins() {
        let dir = TempDir::new().unwrap();
        let classes = dir.path().join("classes");
        std::fs::create_dir_all(&classes).unwrap();
        let request =
            BuildRequest::new("idea", dir.path(), &classes).with_out_root(dir.path().join("o"));

        let ctx = BuildContext::create(&request, &ProductsFile::default(), &Config::default())
            .await
            .unwrap();
        assert_eq!(ctx.out_root, dir.path().join("o"));
    }
}
