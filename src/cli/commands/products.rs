//! Products command - list products from the descriptor

use crate::cli::args::ProductsArgs;
use crate::config::Config;
use crate::error::StagehandResult;
use crate::product::ProductsFile;
use console::style;
use std::path::PathBuf;

/// Execute the products command
pub async fn execute(args: ProductsArgs, config: &Config) -> StagehandResult<()> {
    let project_root = args
        .project_root
        .clone()
        .or_else(|| config.build.project_root.clone())
        .unwrap_or_else(|| PathBuf::from("."));
    let path = project_root.join(&config.build.products_file);

    let descriptor = ProductsFile::load(&path).await?;

    if descriptor.products.is_empty() {
        println!("No products defined in {}", path.display());
        return Ok(());
    }

    for (code, product) in &descriptor.products {
        println!(
            "{}  {} platform modules, {} bundled plugins",
            style(code).cyan().bold(),
            product.platform_modules.len(),
            product.bundled_plugins.len()
        );
    }

    Ok(())
}
