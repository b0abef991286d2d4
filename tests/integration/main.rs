//! Integration tests for buildmemo

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use tempfile::TempDir;

    fn buildmemo() -> Command {
        cargo_bin_cmd!("buildmemo")
    }

    /// Write a config whose version tool is `sh -c <script>`
    fn sh_config(dir: &TempDir, script: &str) -> std::path::PathBuf {
        let mut config = buildmemo::config::Config::default();
        config.tool.program = "sh".to_string();
        config.tool.args = vec!["-c".to_string(), script.to_string(), "tool".to_string()];
        config.tool.timeout_secs = 30;

        let path = dir.path().join("config.toml");
        std::fs::write(&path, toml::to_string_pretty(&config).unwrap()).unwrap();
        path
    }

    #[test]
    fn help_displays() {
        buildmemo()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Build-scoped memoization"));
    }

    #[test]
    fn version_flag_displays() {
        buildmemo()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("buildmemo"));
    }

    #[test]
    fn config_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.toml");
        buildmemo()
            .args(["--config", path.to_str().unwrap(), "config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("custom.toml"));
    }

    #[test]
    fn config_show() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.toml");
        buildmemo()
            .args(["--config", path.to_str().unwrap(), "config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[tool]"));
    }

    #[test]
    fn config_init_writes_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        buildmemo()
            .args(["--config", path.to_str().unwrap(), "config", "init"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Configuration initialized"));
        assert!(path.exists());

        buildmemo()
            .args(["--config", path.to_str().unwrap(), "config", "init"])
            .assert()
            .success()
            .stdout(predicate::str::contains("already exists"));
    }

    #[cfg(unix)]
    #[test]
    fn version_prints_tool_result() {
        let dir = TempDir::new().unwrap();
        let config = sh_config(&dir, "echo MinVer: Using default version; echo 1.2.0");
        buildmemo()
            .args(["--config", config.to_str().unwrap(), "version", "--tag-prefix", "v"])
            .assert()
            .success()
            .stdout(predicate::eq("1.2.0\n"));
    }

    #[cfg(unix)]
    #[test]
    fn version_json_includes_parts() {
        let dir = TempDir::new().unwrap();
        let config = sh_config(&dir, "echo 1.2.0-alpha.0.3");
        buildmemo()
            .args(["--config", config.to_str().unwrap(), "version", "--format", "json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"version\": \"1.2.0-alpha.0.3\""))
            .stdout(predicate::str::contains("\"cached\": false"))
            .stdout(predicate::str::contains("\"minor\": 2"));
    }

    #[cfg(unix)]
    #[test]
    fn version_tool_failure_propagates() {
        let dir = TempDir::new().unwrap();
        let config = sh_config(&dir, "echo 1.2.0; exit 4");
        buildmemo()
            .args(["--config", config.to_str().unwrap(), "version"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("exit code: 4"));
    }

    #[cfg(unix)]
    #[test]
    fn version_without_version_line_fails() {
        let dir = TempDir::new().unwrap();
        let config = sh_config(&dir, "echo MinVer: nothing to report");
        buildmemo()
            .args(["--config", config.to_str().unwrap(), "version"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("no version line"))
            .stderr(predicate::str::contains("Hint:"));
    }

    #[test]
    fn version_missing_program() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.toml");
        buildmemo()
            .args([
                "--config",
                path.to_str().unwrap(),
                "version",
                "--program",
                "buildmemo-no-such-tool",
            ])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Version tool not found"));
    }

    #[test]
    fn build_missing_plan() {
        let dir = TempDir::new().unwrap();
        let config = dir.path().join("missing.toml");
        let plan = dir.path().join("plan.toml");
        buildmemo()
            .args([
                "--config",
                config.to_str().unwrap(),
                "build",
                plan.to_str().unwrap(),
            ])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Build plan not found"));
    }

    #[cfg(unix)]
    #[test]
    fn build_runs_tool_once_per_distinct_key() {
        let dir = TempDir::new().unwrap();
        let counter = dir.path().join("calls");
        let config = sh_config(
            &dir,
            &format!("echo run >> {}; echo 1.2.0", counter.display()),
        );
        let plan = dir.path().join("plan.toml");
        std::fs::write(
            &plan,
            r#"
            [defaults]
            auto_increment = "minor"
            ignore_height = "true"

            [[stage]]
            name = "first"
            [[stage.task]]
            kind = "version"
            tag_prefix = "v"
            [[stage.task]]
            kind = "version"
            tag_prefix = "v"
            [[stage.task]]
            kind = "cache-set"
            key = "channel"
            value = "stable"

            [[stage]]
            name = "second"
            [[stage.task]]
            kind = "version"
            tag_prefix = "v"
            [[stage.task]]
            kind = "version"
            tag_prefix = "release-"
            [[stage.task]]
            kind = "cache-get"
            key = "channel"
            [[stage.task]]
            kind = "cache-get"
            key = "unset"
            "#,
        )
        .unwrap();

        buildmemo()
            .args([
                "--config",
                config.to_str().unwrap(),
                "build",
                plan.to_str().unwrap(),
                "--format",
                "plain",
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains("first/0 version 1.2.0"))
            .stdout(predicate::str::contains("second/1 version 1.2.0"))
            .stdout(predicate::str::contains("second/2 cache-get channel = stable"))
            .stdout(predicate::str::contains("second/3 cache-get unset (absent)"));

        let calls = std::fs::read_to_string(&counter).unwrap();
        assert_eq!(calls.lines().count(), 2);
    }

    #[cfg(unix)]
    #[test]
    fn each_build_is_a_new_scope() {
        let dir = TempDir::new().unwrap();
        let counter = dir.path().join("calls");
        let config = sh_config(
            &dir,
            &format!("echo run >> {}; echo 1.2.0", counter.display()),
        );
        let plan = dir.path().join("plan.toml");
        std::fs::write(
            &plan,
            "[[stage]]\n[[stage.task]]\nkind = \"version\"\ntag_prefix = \"v\"\n",
        )
        .unwrap();

        for _ in 0..2 {
            buildmemo()
                .args([
                    "--config",
                    config.to_str().unwrap(),
                    "build",
                    plan.to_str().unwrap(),
                    "--format",
                    "json",
                ])
                .assert()
                .success()
                .stdout(predicate::str::contains("\"cached\": false"));
        }

        let calls = std::fs::read_to_string(&counter).unwrap();
        assert_eq!(calls.lines().count(), 2);
    }
}
