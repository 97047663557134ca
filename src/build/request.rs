//! Build request
//!
//! One immutable value per build invocation, consumed read-only by the
//! whole task graph.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Callback receiving the computed platform classpath and the run directory
pub type ClasspathSink = Arc<dyn Fn(&[PathBuf], &Path) + Send + Sync>;

/// A single build invocation
#[derive(Clone)]
pub struct BuildRequest {
    /// Target product code
    pub product: String,

    /// Extra plugin ids to include beyond the product's bundled set
    pub extra_plugins: Vec<String>,

    /// Source checkout root
    pub project_root: PathBuf,

    /// Compiled classes root
    pub classes_root: PathBuf,

    /// Output root override; falls back to configuration, then to
    /// `<project_root>/out/dev-run`
    pub out_root: Option<PathBuf>,

    /// Keep the build context warm for subsequent requests (server mode)
    pub keep_context_warm: bool,

    /// Generate the runtime module repository from the assembled entries
    pub generate_module_repository: bool,

    /// Invoked with the platform classpath once it is computed
    pub on_classpath: Option<ClasspathSink>,
}

impl BuildRequest {
    /// Create a request with defaults for the optional pieces
    pub fn new(
        product: impl Into<String>,
        project_root: impl Into<PathBuf>,
        classes_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            product: product.into(),
            extra_plugins: Vec::new(),
            project_root: project_root.into(),
            classes_root: classes_root.into(),
            out_root: None,
            keep_context_warm: false,
            generate_module_repository: false,
            on_classpath: None,
        }
    }

    /// Add extra plugin ids
    pub fn with_extra_plugins(mut self, plugins: Vec<String>) -> Self {
        self.extra_plugins = plugins;
        self
    }

    /// Override the output root
    pub fn with_out_root(mut self, out_root: PathBuf) -> Self {
        self.out_root = Some(out_root);
        self
    }

    /// Request runtime module repository generation
    pub fn with_module_repository(mut self, generate: bool) -> Self {
        self.generate_module_repository = generate;
        self
    }

    /// Keep the build context warm across requests
    pub fn with_warm_context(mut self, keep: bool) -> Self {
        self.keep_context_warm = keep;
        self
    }

    /// Register a classpath callback
    pub fn with_classpath_sink(mut self, sink: ClasspathSink) -> Self {
        self.on_classpath = Some(sink);
        self
    }
}

impl fmt::Debug for BuildRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuildRequest")
            .field("product", &self.product)
            .field("extra_plugins", &self.extra_plugins)
            .field("project_root", &self.project_root)
            .field("classes_root", &self.classes_root)
            .field("out_root", &self.out_root)
            .field("keep_context_warm", &self.keep_context_warm)
            .field("generate_module_repository", &self.generate_module_repository)
            .field("on_classpath", &self.on_classpath.as_ref().map(|_| "<sink>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_methods_compose() {
        let request = BuildRequest::new("idea", "/src", "/classes")
            .with_extra_plugins(vec!["plugin.extra".into()])
            .with_module_repository(true)
            .with_out_root("/out".into());

        assert_eq!(request.product, "idea");
        assert_eq!(request.extra_plugins, vec!["plugin.extra"]);
        assert!(request.generate_module_repository);
        assert_eq!(request.out_root.as_deref(), Some(Path::new("/out")));
    }

    #[test]
    fn debug_elides_callback() {
        let request = BuildRequest::new("idea", "/src", "/classes")
            .with_classpath_sink(Arc::new(|_, _| {}));
        let rendered = format!("{request:?}");
        assert!(rendered.contains("<sink>"));
    }
}
