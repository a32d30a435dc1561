use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn repocat() -> Command {
    Command::cargo_bin("repocat").unwrap()
}

fn create_sample_tree(root: &Path) {
    fs::write(root.join("a.txt"), "plain text").unwrap();
    fs::create_dir(root.join("sub")).unwrap();
    fs::write(root.join("sub").join("b.java"), "class B {}").unwrap();
    fs::create_dir(root.join(".git")).unwrap();
    fs::write(root.join(".git").join("c.java"), "metadata").unwrap();
}

#[test]
fn exports_only_matching_files_outside_excluded_subtrees() {
    let temp = TempDir::new().unwrap();
    let tree = temp.path().join("tree");
    fs::create_dir(&tree).unwrap();
    create_sample_tree(&tree);

    repocat()
        .current_dir(temp.path())
        .args(["tree", "--output", "export.txt"])
        .assert()
        .success()
        .stdout(predicate::str::contains("All done! Exported to export.txt"));

    let output = fs::read_to_string(temp.path().join("export.txt")).unwrap();
    assert_eq!(output, "\n\n===== sub/b.java =====\nclass B {}");
}

#[test]
fn preserves_traversal_order() {
    let temp = TempDir::new().unwrap();
    let tree = temp.path().join("tree");
    fs::create_dir(&tree).unwrap();
    fs::write(tree.join("alpha.java"), "alpha").unwrap();
    fs::write(tree.join("beta.java"), "beta").unwrap();
    fs::create_dir(tree.join("sub")).unwrap();
    fs::write(tree.join("sub").join("gamma.java"), "gamma").unwrap();

    repocat()
        .current_dir(temp.path())
        .args(["tree", "--output", "export.txt"])
        .assert()
        .success();

    let output = fs::read_to_string(temp.path().join("export.txt")).unwrap();
    let alpha = output.find("===== alpha.java =====").unwrap();
    let beta = output.find("===== beta.java =====").unwrap();
    let gamma = output.find("===== sub/gamma.java =====").unwrap();
    assert!(alpha < beta);
    assert!(beta < gamma);
}

#[test]
fn repeated_runs_are_byte_identical() {
    let temp = TempDir::new().unwrap();
    let tree = temp.path().join("tree");
    fs::create_dir(&tree).unwrap();
    create_sample_tree(&tree);

    repocat()
        .current_dir(temp.path())
        .args(["tree", "--output", "export.txt"])
        .assert()
        .success();
    let first_run = fs::read(temp.path().join("export.txt")).unwrap();

    repocat()
        .current_dir(temp.path())
        .args(["tree", "--output", "export.txt"])
        .assert()
        .success();
    let second_run = fs::read(temp.path().join("export.txt")).unwrap();

    assert_eq!(first_run, second_run);
}

#[test]
fn empty_allow_set_creates_empty_artifact() {
    let temp = TempDir::new().unwrap();
    let tree = temp.path().join("tree");
    fs::create_dir(&tree).unwrap();
    create_sample_tree(&tree);

    repocat()
        .current_dir(temp.path())
        .args(["tree", "--formats", "", "--output", "export.txt"])
        .assert()
        .success();

    let artifact = temp.path().join("export.txt");
    assert!(artifact.exists());
    assert_eq!(fs::metadata(&artifact).unwrap().len(), 0);
}

#[test]
fn formats_flag_overrides_allow_set() {
    let temp = TempDir::new().unwrap();
    let tree = temp.path().join("tree");
    fs::create_dir(&tree).unwrap();
    fs::write(tree.join("a.txt"), "text file").unwrap();
    fs::write(tree.join("b.java"), "class B {}").unwrap();

    repocat()
        .current_dir(temp.path())
        .args(["tree", "--formats", ".txt", "--output", "export.txt"])
        .assert()
        .success();

    let output = fs::read_to_string(temp.path().join("export.txt")).unwrap();
    assert!(output.contains("===== a.txt =====\ntext file"));
    assert!(!output.contains("b.java"));
}

#[test]
fn custom_delimiter_appears_in_headers() {
    let temp = TempDir::new().unwrap();
    let tree = temp.path().join("tree");
    fs::create_dir(&tree).unwrap();
    fs::write(tree.join("a.java"), "a").unwrap();

    repocat()
        .current_dir(temp.path())
        .args(["tree", "--delimiter", "#####", "--output", "export.txt"])
        .assert()
        .success();

    let output = fs::read_to_string(temp.path().join("export.txt")).unwrap();
    assert!(output.starts_with("\n\n##### a.java #####\n"));
}

#[test]
fn dry_run_lists_files_without_writing() {
    let temp = TempDir::new().unwrap();
    let tree = temp.path().join("tree");
    fs::create_dir(&tree).unwrap();
    create_sample_tree(&tree);

    repocat()
        .current_dir(temp.path())
        .args(["tree", "--dry-run", "--output", "export.txt"])
        .assert()
        .success()
        .stdout(predicate::str::contains("sub/b.java"))
        .stdout(predicate::str::contains("1 files would be exported"));

    assert!(!temp.path().join("export.txt").exists());
}

#[test]
fn missing_root_fails_with_distinct_exit_code() {
    let temp = TempDir::new().unwrap();

    repocat()
        .current_dir(temp.path())
        .args(["no/such/dir", "--output", "export.txt"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Invalid path"));
}

#[test]
fn unwritable_output_location_is_fatal() {
    let temp = TempDir::new().unwrap();
    let tree = temp.path().join("tree");
    fs::create_dir(&tree).unwrap();
    fs::write(tree.join("a.java"), "a").unwrap();

    repocat()
        .current_dir(temp.path())
        .args(["tree", "--output", "missing_dir/export.txt"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Configuration error"));
}

#[test]
fn generate_config_writes_sample_file() {
    let temp = TempDir::new().unwrap();

    repocat()
        .current_dir(temp.path())
        .arg("--generate-config")
        .assert()
        .success()
        .stdout(predicate::str::contains("repocat.toml"));

    let content = fs::read_to_string(temp.path().join("repocat.toml")).unwrap();
    assert!(content.contains("[filters]"));
    assert!(content.contains("[output]"));
}

#[test]
fn config_file_drives_the_run() {
    let temp = TempDir::new().unwrap();
    let tree = temp.path().join("tree");
    fs::create_dir(&tree).unwrap();
    fs::write(tree.join("a.rs"), "fn main() {}").unwrap();
    fs::write(tree.join("b.java"), "class B {}").unwrap();

    let config = r#"
[filters]
extensions = ["rs"]
exclude_dirs = [".git"]
exclude_patterns = []

[output]
path = "from_config.txt"
delimiter = "====="
decode = "replace"
"#;
    fs::write(temp.path().join("custom.toml"), config).unwrap();

    repocat()
        .current_dir(temp.path())
        .args(["tree", "--config", "custom.toml"])
        .assert()
        .success();

    let output = fs::read_to_string(temp.path().join("from_config.txt")).unwrap();
    assert!(output.contains("===== a.rs =====\nfn main() {}"));
    assert!(!output.contains("b.java"));
}

#[test]
fn json_output_mode_emits_report() {
    let temp = TempDir::new().unwrap();
    let tree = temp.path().join("tree");
    fs::create_dir(&tree).unwrap();
    fs::write(tree.join("a.java"), "class A {}").unwrap();

    repocat()
        .current_dir(temp.path())
        .args(["tree", "--output", "export.txt", "--output-format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"output_path\""))
        .stdout(predicate::str::contains("\"files_by_extension\""));
}

#[test]
fn invalid_utf8_is_replaced_by_default() {
    let temp = TempDir::new().unwrap();
    let tree = temp.path().join("tree");
    fs::create_dir(&tree).unwrap();
    fs::write(tree.join("bad.java"), b"abc\xFFdef").unwrap();

    repocat()
        .current_dir(temp.path())
        .args(["tree", "--output", "export.txt"])
        .assert()
        .success();

    let output = fs::read_to_string(temp.path().join("export.txt")).unwrap();
    assert!(output.contains("abc\u{FFFD}def"));
}

#[test]
fn strict_decode_records_inline_diagnostic() {
    let temp = TempDir::new().unwrap();
    let tree = temp.path().join("tree");
    fs::create_dir(&tree).unwrap();
    fs::write(tree.join("bad.java"), b"abc\xFFdef").unwrap();
    fs::write(tree.join("good.java"), "class Good {}").unwrap();

    repocat()
        .current_dir(temp.path())
        .args(["tree", "--decode", "strict", "--output", "export.txt"])
        .assert()
        .success();

    let output = fs::read_to_string(temp.path().join("export.txt")).unwrap();
    assert!(output.contains("===== bad.java ====="));
    assert!(output.contains("[Error reading bad.java:"));
    assert!(output.contains("class Good {}"));
}
