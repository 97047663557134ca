//! Product properties resolution
//!
//! The descriptor names a factory key; the registry maps that key to an
//! implementation that turns the descriptor's property seed into the
//! concrete [`ProductProperties`] a build consumes. Factories may read from
//! the checkout (build number files), so callers wrap resolution in a hard
//! timeout.

use crate::error::{StagehandError, StagehandResult};
use crate::product::PropertySeed;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;

/// Fallback build number when neither the seed nor the checkout provides one
const SNAPSHOT_BUILD_NUMBER: &str = "999.SNAPSHOT";

/// Resolved properties for one product
#[derive(Debug, Clone)]
pub struct ProductProperties {
    /// Application display name
    pub name: String,

    /// Platform prefix the launcher uses to locate the properties file
    pub platform_prefix: String,

    /// Build number written to `build.txt`
    pub build_number: String,

    /// Properties file name written under `bin/`
    pub properties_file: String,

    /// VM options file name written one level above the run directory
    pub vm_options_file: String,

    /// Extra plugin directories copied verbatim into the plugins dir,
    /// relative to the project root; never subject to caching
    pub additional_plugin_dirs: Vec<PathBuf>,
}

/// Creates [`ProductProperties`] for a product code
#[async_trait]
pub trait ProductPropertiesFactory: Send + Sync {
    async fn create(
        &self,
        product_code: &str,
        seed: &PropertySeed,
        project_root: &Path,
    ) -> StagehandResult<ProductProperties>;
}

/// Resolve a factory key to an implementation
pub fn resolve_factory(key: &str) -> StagehandResult<Arc<dyn ProductPropertiesFactory>> {
    match key {
        "default" => Ok(Arc::new(DefaultPropertiesFactory)),
        other => Err(StagehandError::FactoryUnknown(other.to_string())),
    }
}

/// Factory deriving everything from the descriptor seed and checkout files
struct DefaultPropertiesFactory;

#[async_trait]
impl ProductPropertiesFactory for DefaultPropertiesFactory {
    async fn create(
        &self,
        product_code: &str,
        seed: &PropertySeed,
        project_root: &Path,
    ) -> StagehandResult<ProductProperties> {
        let build_number = match &seed.build_number {
            Some(number) => number.clone(),
            None => read_build_number(project_root).await,
        };

        let name = seed
            .name
            .clone()
            .unwrap_or_else(|| product_code.to_string());

        Ok(ProductProperties {
            platform_prefix: product_code.to_string(),
            build_number,
            properties_file: seed
                .properties_file
                .clone()
                .unwrap_or_else(|| format!("{product_code}.properties")),
            vm_options_file: seed
                .vm_options_file
                .clone()
                .unwrap_or_else(|| format!("{product_code}.vmoptions")),
            additional_plugin_dirs: seed.additional_plugin_dirs.clone(),
            name,
        })
    }
}

/// Read the checkout's build number, falling back to a snapshot marker
async fn read_build_number(project_root: &Path) -> String {
    match fs::read_to_string(project_root.join("build.txt")).await {
        Ok(content) => content.trim().to_string(),
        Err(_) => SNAPSHOT_BUILD_NUMBER.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn unknown_factory_rejected() {
        assert!(matches!(
            resolve_factory("bespoke"),
            Err(StagehandError::FactoryUnknown(_))
        ));
    }

    #[tokio::test]
    async fn default_factory_fills_names() {
        let dir = TempDir::new().unwrap();
        let factory = resolve_factory("default").unwrap();

        let props = factory
            .create("idea", &PropertySeed::default(), dir.path())
            .await
            .unwrap();

        assert_eq!(props.platform_prefix, "idea");
        assert_eq!(props.properties_file, "idea.properties");
        assert_eq!(props.vm_options_file, "idea.vmoptions");
        assert_eq!(props.build_number, SNAPSHOT_BUILD_NUMBER);
    }

    #[tokio::test]
    async fn build_number_read_from_checkout() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("build.txt"), "241.1234\n").unwrap();

        let factory = resolve_factory("default").unwrap();
        let props = factory
            .create("idea", &PropertySeed::default(), dir.path())
            .await
            .unwrap();

        assert_eq!(props.build_number, "241.1234");
    }

    #[tokio::test]
    async fn seed_overrides_win() {
        let dir = TempDir::new().unwrap();
        let seed = PropertySeed {
            name: Some("Workbench".into()),
            build_number: Some("7.0".into()),
            properties_file: Some("wb.properties".into()),
            ..Default::default()
        };

        let factory = resolve_factory("default").unwrap();
        let props = factory.create("wb", &seed, dir.path()).await.unwrap();

        assert_eq!(props.name, "Workbench");
        assert_eq!(props.build_number, "7.0");
        assert_eq!(props.properties_file, "wb.properties");
    }
}
