//! Build command - assemble a development build once

use crate::build::{BuildOrchestrator, BuildRequest};
use crate::cli::args::BuildArgs;
use crate::config::Config;
use crate::error::StagehandResult;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Execute the build command
pub async fn execute(args: BuildArgs, config: &Config) -> StagehandResult<()> {
    let project_root = resolve_project_root(&args, config);
    let classes_root = args
        .classes_dir
        .clone()
        .or_else(|| config.build.classes_dir.clone())
        .unwrap_or_else(|| project_root.join("out").join("classes"));
    debug!("Project root: {}", project_root.display());
    debug!("Classes root: {}", classes_root.display());

    let mut request = BuildRequest::new(&args.product, project_root, classes_root)
        .with_extra_plugins(args.plugins.clone())
        .with_module_repository(args.module_repository);
    if let Some(out) = &args.out {
        request = request.with_out_root(out.clone());
    }
    if args.print_classpath {
        request = request.with_classpath_sink(Arc::new(|classpath, _run_dir| {
            for root in classpath {
                println!("{}", root.display());
            }
        }));
    }

    // Configuration problems (unknown product, bad descriptor) surface
    // here, before any build work starts
    let orchestrator = BuildOrchestrator::new(config, &request).await?;

    let pb = create_progress_bar(&format!("Assembling {}...", args.product));
    let outcome = match orchestrator.build(&request).await {
        Ok(outcome) => outcome,
        Err(e) => {
            pb.finish_and_clear();
            return Err(e);
        }
    };
    pb.finish_and_clear();

    println!(
        "{} {} assembled: {}",
        style("✓").green(),
        style(&args.product).cyan(),
        outcome.summary()
    );
    if outcome.reused_plugins > 0 {
        println!(
            "  {} of {} plugins reused from the previous run",
            outcome.reused_plugins, outcome.total_plugins
        );
    }

    Ok(())
}

fn resolve_project_root(args: &BuildArgs, config: &Config) -> PathBuf {
    args.project_root
        .clone()
        .or_else(|| config.build.project_root.clone())
        .unwrap_or_else(|| PathBuf::from("."))
}

fn create_progress_bar(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
