//! Product descriptor model
//!
//! A checkout carries a small TOML descriptor (`products.toml`) mapping each
//! product code to its platform module list, bundled plugin set, and a
//! properties-factory key. The descriptor also declares the static layout of
//! every known plugin. The descriptor is loaded once and shared read-only
//! across builds.

pub mod properties;

pub use properties::{resolve_factory, ProductProperties, ProductPropertiesFactory};

use crate::error::{StagehandError, StagehandResult};
use crate::layout::PluginSpec;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// The parsed product descriptor file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ProductsFile {
    /// Product code -> configuration
    pub products: BTreeMap<String, ProductConfiguration>,

    /// Plugin id -> static layout description
    pub plugins: BTreeMap<String, PluginSpec>,

    /// Externally-defined build artifacts whose output paths follow the run
    pub artifacts: Vec<ArtifactSpec>,
}

/// One product's configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ProductConfiguration {
    /// Properties-factory key, resolved through the factory registry
    pub factory: String,

    /// Modules forming the shared platform layer
    pub platform_modules: Vec<String>,

    /// Plugin ids bundled with this product by default
    #[serde(default)]
    pub bundled_plugins: Vec<String>,

    /// Inputs for the properties factory
    #[serde(default)]
    pub properties: PropertySeed,
}

/// Raw inputs the properties factory turns into [`ProductProperties`]
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct PropertySeed {
    /// Application display name
    pub name: Option<String>,

    /// Build number; read from `<project_root>/build.txt` when absent
    pub build_number: Option<String>,

    /// Name of the properties file written under `bin/`
    pub properties_file: Option<String>,

    /// Name of the vm-options file written above the run directory
    pub vm_options_file: Option<String>,

    /// Extra plugin directories copied verbatim, relative to the project root
    pub additional_plugin_dirs: Vec<PathBuf>,
}

/// An externally-defined build artifact
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ArtifactSpec {
    /// Artifact name
    pub name: String,

    /// Output path relative to the run directory
    pub output: PathBuf,
}

impl ProductsFile {
    /// Load and parse the descriptor file
    pub async fn load(path: &Path) -> StagehandResult<Self> {
        if !path.exists() {
            return Err(StagehandError::DescriptorMissing(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).await.map_err(|e| {
            StagehandError::io(format!("reading product descriptor {}", path.display()), e)
        })?;

        let parsed: Self =
            toml::from_str(&content).map_err(|e| StagehandError::DescriptorInvalid {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        debug!(
            "Loaded descriptor: {} products, {} plugins",
            parsed.products.len(),
            parsed.plugins.len()
        );
        Ok(parsed)
    }

    /// Look up a product by code
    pub fn product(&self, code: &str) -> StagehandResult<&ProductConfiguration> {
        self.products
            .get(code)
            .ok_or_else(|| StagehandError::ProductUnknown(code.to_string()))
    }

    /// Look up a plugin's static layout by id
    pub fn plugin(&self, id: &str) -> StagehandResult<&PluginSpec> {
        self.plugins
            .get(id)
            .ok_or_else(|| StagehandError::PluginUnknown(id.to_string()))
    }

    /// Plugin ids applicable to one build: the product's bundled set plus
    /// any extra requested ids, deduplicated in declaration order, filtered
    /// by the current OS/architecture bundling restrictions.
    pub fn applicable_plugins(
        &self,
        product: &ProductConfiguration,
        extra: &[String],
    ) -> StagehandResult<Vec<(String, PluginSpec)>> {
        let mut seen = Vec::new();
        for id in product.bundled_plugins.iter().chain(extra.iter()) {
            if seen.iter().any(|(existing, _)| existing == id) {
                continue;
            }
            let spec = self.plugin(id)?;
            if !spec.bundling_allowed() {
                debug!("Skipping plugin {id}: restricted to another OS/arch");
                continue;
            }
            seen.push((id.clone(), spec.clone()));
        }
        Ok(seen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DESCRIPTOR: &str = r#"
        [products.idea]
        factory = "default"
        platform-modules = ["app.main", "app.core"]
        bundled-plugins = ["plugin.vcs"]

        [products.idea.properties]
        name = "Idea"
        properties-file = "idea.properties"

        [plugins."plugin.vcs"]
        directory = "vcs"
        modules = ["plugin.vcs", "plugin.vcs.backend"]

        [plugins."plugin.extra"]
        directory = "extra"
        modules = ["plugin.extra"]

        [[artifacts]]
        name = "searchable-options"
        output = "artifacts/searchable-options"
    "#;

    #[test]
    fn descriptor_parses() {
        let parsed: ProductsFile = toml::from_str(DESCRIPTOR).unwrap();
        let product = parsed.product("idea").unwrap();
        assert_eq!(product.platform_modules.len(), 2);
        assert_eq!(product.bundled_plugins, vec!["plugin.vcs"]);
        assert_eq!(product.properties.name.as_deref(), Some("Idea"));
        assert_eq!(parsed.artifacts.len(), 1);
    }

    #[test]
    fn unknown_product_rejected() {
        let parsed: ProductsFile = toml::from_str(DESCRIPTOR).unwrap();
        assert!(matches!(
            parsed.product("nope"),
            Err(StagehandError::ProductUnknown(_))
        ));
    }

    #[test]
    fn applicable_plugins_dedup_and_extras() {
        let parsed: ProductsFile = toml::from_str(DESCRIPTOR).unwrap();
        let product = parsed.product("idea").unwrap();

        let plugins = parsed
            .applicable_plugins(product, &["plugin.extra".into(), "plugin.vcs".into()])
            .unwrap();

        let ids: Vec<_> = plugins.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["plugin.vcs", "plugin.extra"]);
    }

    #[test]
    fn unknown_extra_plugin_rejected() {
        let parsed: ProductsFile = toml::from_str(DESCRIPTOR).unwrap();
        let product = parsed.product("idea").unwrap();
        assert!(matches!(
            parsed.applicable_plugins(product, &["plugin.ghost".into()]),
            Err(StagehandError::PluginUnknown(_))
        ));
    }

    #[tokio::test]
    async fn missing_descriptor_file() {
        let err = ProductsFile::load(Path::new("/nonexistent/products.toml"))
            .await
            .unwrap_err();
        assert!(matches!(err, StagehandError::DescriptorMissing(_)));
    }
}
