//! Integration tests for Stagehand

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use serial_test::serial;
    use std::fs;
    use tempfile::TempDir;

    const DESCRIPTOR: &str = r#"
        [products.idea]
        factory = "default"
        platform-modules = ["app.main"]
        bundled-plugins = ["plugin.vcs"]

        [plugins."plugin.vcs"]
        directory = "vcs"
        modules = ["plugin.vcs"]
    "#;

    fn stagehand() -> Command {
        let mut cmd = cargo_bin_cmd!("stagehand");
        cmd.arg("--no-local");
        cmd
    }

    fn write_project(dir: &TempDir) {
        fs::write(dir.path().join("products.toml"), DESCRIPTOR).unwrap();
        for module in ["app.main", "plugin.vcs"] {
            let out = dir.path().join("out/classes/production").join(module);
            fs::create_dir_all(&out).unwrap();
            fs::write(out.join("Impl.class"), module).unwrap();
        }
        let meta = dir
            .path()
            .join("out/classes/production/plugin.vcs/META-INF");
        fs::create_dir_all(&meta).unwrap();
        fs::write(meta.join("plugin.xml"), "<plugin/>").unwrap();
    }

    #[test]
    fn help_displays() {
        stagehand()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains(
                "Incremental development build assembler",
            ));
    }

    #[test]
    fn version_displays() {
        stagehand()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("stagehand"));
    }

    #[test]
    fn products_lists_descriptor() {
        let dir = TempDir::new().unwrap();
        write_project(&dir);

        stagehand()
            .args(["products", "--project-root"])
            .arg(dir.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("idea"));
    }

    #[test]
    fn products_without_descriptor_fails() {
        let dir = TempDir::new().unwrap();

        stagehand()
            .args(["products", "--project-root"])
            .arg(dir.path())
            .assert()
            .failure()
            .stderr(predicate::str::contains("Product descriptor not found"));
    }

    // Builds append to the shared history log in the state dir
    #[test]
    #[serial]
    fn build_assembles_run_directory() {
        let dir = TempDir::new().unwrap();
        write_project(&dir);

        stagehand()
            .args(["build", "--product", "idea", "--project-root"])
            .arg(dir.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("assembled"));

        let run = dir.path().join("out/dev-run/idea-dev");
        assert!(run.join("core-classpath.txt").is_file());
        assert!(run.join("fingerprint.txt").is_file());
        assert!(run.join("plugin-classpath.txt").is_file());
        assert!(run.join("plugins/vcs/plugin.vcs/Impl.class").is_file());
    }

    #[test]
    #[serial]
    fn build_unknown_product_exits_nonzero() {
        let dir = TempDir::new().unwrap();
        write_project(&dir);

        stagehand()
            .args(["build", "--product", "ghost", "--project-root"])
            .arg(dir.path())
            .assert()
            .failure()
            .stderr(predicate::str::contains("Unknown product"));
    }

    #[test]
    fn config_path_prints_location() {
        stagehand()
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }
}
