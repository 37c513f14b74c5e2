use assert_cmd::cargo::{cargo_bin, cargo_bin_cmd};
use assert_cmd::prelude::*;
use std::process::Command;
use tempfile::TempDir;

/// Builds a `blogpress-admin` command pointed at a database in `dir`
fn admin(dir: &TempDir) -> Command {
    let mut cmd = Command::new(cargo_bin!("blogpress-admin"));
    cmd.arg("--database-url").arg(dir.path().join("blog.db"));
    cmd
}

fn stdout_of(cmd: &mut Command) -> String {
    let assert = cmd.assert().success();
    String::from_utf8_lossy(&assert.get_output().stdout).to_string()
}

/// Tests that `--help` is handled successfully by the CLI.
///
/// This test verifies:
/// 1. Running `blogpress-admin --help` exits successfully
/// 2. The help text is written to stdout
/// 3. No unexpected stderr output is produced
#[test]
fn test_admin_help_success() {
    let mut cmd = cargo_bin_cmd!("blogpress-admin");

    let assert = cmd.arg("--help").assert().success();

    let out = assert.get_output();
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("create-user"), "unexpected help text:\n{stdout}");
    assert!(
        out.stderr.is_empty(),
        "expected empty stderr for --help, got:\n{}",
        String::from_utf8_lossy(&out.stderr)
    );
}

/// Tests creating a user, posting as them and listing the post
#[test]
fn test_admin_create_user_post_and_list() {
    let dir = tempfile::tempdir().unwrap();

    let id = stdout_of(admin(&dir).args(["--quiet", "create-user", "--username", "alice", "--password", "hunter22hunter"]));
    assert_eq!(id.trim(), "1");

    let out = stdout_of(admin(&dir).args([
        "post",
        "--author",
        "alice",
        "--title",
        "Hello from the shell",
        "--content",
        "Written without a browser",
        "--tags",
        "cli, rust",
    ]));
    assert!(out.contains("Hello from the shell"));
    assert!(out.contains("cli, rust"));
    assert!(out.contains("/post/1/"));

    let listing = stdout_of(admin(&dir).args(["--format", "json", "list"]));
    let posts: serde_json::Value = serde_json::from_str(&listing).unwrap();
    let posts = posts.as_array().unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0]["author"], "alice");
    assert_eq!(posts[0]["post"]["title"], "Hello from the shell");
    assert_eq!(posts[0]["tags"].as_array().unwrap().len(), 2);
}

/// Tests that private posts only show up with `--private`
#[test]
fn test_admin_private_posts() {
    let dir = tempfile::tempdir().unwrap();
    admin(&dir)
        .args(["create-user", "--username", "alice", "--password", "hunter22hunter"])
        .assert()
        .success();
    admin(&dir)
        .args(["post", "--author", "alice", "--title", "Diary", "--content", "Dear diary", "--private"])
        .assert()
        .success();

    let public = stdout_of(admin(&dir).arg("list"));
    assert!(public.contains("No posts found."));

    let private = stdout_of(admin(&dir).args(["list", "--private"]));
    assert!(private.contains("Diary"));
}

/// Tests the tag counts and deleting posts and users
#[test]
fn test_admin_tags_and_deletes() {
    let dir = tempfile::tempdir().unwrap();
    admin(&dir)
        .args(["create-user", "--username", "bob", "--password", "hunter22hunter"])
        .assert()
        .success();
    for title in ["One", "Two"] {
        admin(&dir)
            .args(["post", "--author", "bob", "--title", title, "--content", "x", "--tags", "shared"])
            .assert()
            .success();
    }

    let tags = stdout_of(admin(&dir).arg("tags"));
    assert!(tags.contains("2  shared"), "unexpected tags output:\n{tags}");

    admin(&dir).args(["delete", "1"]).assert().success();
    let ids = stdout_of(admin(&dir).args(["--quiet", "list"]));
    assert_eq!(ids.trim(), "2");

    admin(&dir).args(["delete-user", "bob"]).assert().success();
    let listing = stdout_of(admin(&dir).arg("list"));
    assert!(listing.contains("No posts found."));
}

/// Tests that failures exit non-zero with a message on stderr
#[test]
fn test_admin_errors() {
    let dir = tempfile::tempdir().unwrap();

    let assert = admin(&dir)
        .args(["post", "--author", "ghost", "--title", "t", "--content", "c"])
        .assert()
        .failure()
        .code(1);
    let stderr = String::from_utf8_lossy(&assert.get_output().stderr).to_string();
    assert!(stderr.contains("No user named \"ghost\""), "unexpected stderr:\n{stderr}");

    admin(&dir).args(["delete", "42"]).assert().failure().code(1);

    admin(&dir)
        .args(["create-user", "--username", "dup", "--password", "hunter22hunter"])
        .assert()
        .success();
    admin(&dir)
        .args(["create-user", "--username", "dup", "--password", "hunter22hunter"])
        .assert()
        .failure();
}

/// Tests that posts and accounts go through the same checks as the web forms
#[test]
fn test_admin_rejects_invalid_input() {
    let dir = tempfile::tempdir().unwrap();
    admin(&dir)
        .args(["create-user", "--username", "alice", "--password", "hunter22hunter"])
        .assert()
        .success();

    let long_title = "x".repeat(150);
    let assert = admin(&dir)
        .args(["post", "--author", "alice", "--title", &long_title, "--content", ""])
        .assert()
        .failure()
        .code(1);
    let stderr = String::from_utf8_lossy(&assert.get_output().stderr).to_string();
    assert!(stderr.contains("Invalid post"), "unexpected stderr:\n{stderr}");
    assert!(stderr.contains("(it has 150)"), "unexpected stderr:\n{stderr}");
    assert!(stderr.contains("content: This field is required."), "unexpected stderr:\n{stderr}");

    admin(&dir)
        .args(["post", "--author", "alice", "--title", "   ", "--content", "body"])
        .assert()
        .failure()
        .code(1);

    let listing = stdout_of(admin(&dir).arg("list"));
    assert!(listing.contains("No posts found."));

    let assert = admin(&dir)
        .args(["create-user", "--username", "bad name", "--password", "hunter22hunter"])
        .assert()
        .failure()
        .code(1);
    let stderr = String::from_utf8_lossy(&assert.get_output().stderr).to_string();
    assert!(stderr.contains("Invalid user"), "unexpected stderr:\n{stderr}");

    admin(&dir)
        .args(["create-user", "--username", "carol", "--password", "short"])
        .assert()
        .failure()
        .code(1);
}

/// Tests that a broken config file is reported instead of silently ignored
#[cfg(target_os = "linux")]
#[test]
fn test_admin_reports_bad_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let config_home = tempfile::tempdir().unwrap();
    let app_dir = config_home.path().join("blogpress");
    std::fs::create_dir_all(&app_dir).unwrap();
    std::fs::write(app_dir.join("config.toml"), "media_dir = [unterminated").unwrap();

    let assert = admin(&dir)
        .env("XDG_CONFIG_HOME", config_home.path())
        .env_remove("RUST_LOG")
        .arg("list")
        .assert()
        .success();
    let stderr = String::from_utf8_lossy(&assert.get_output().stderr).to_string();
    assert!(stderr.contains("WARN"), "unexpected stderr:\n{stderr}");
    assert!(stderr.contains("Failed to parse config file"), "unexpected stderr:\n{stderr}");

    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    assert!(stdout.contains("No posts found."));
}
