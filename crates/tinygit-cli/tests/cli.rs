//! End-to-end coverage of the command dispatcher (spec.md §8's concrete scenarios), driving
//! the built `tinygit` binary the way a real CLI's own integration suite would.

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn tinygit(dir: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("tinygit").unwrap();
    cmd.current_dir(dir);
    cmd
}

#[test]
fn init_creates_the_git_skeleton() {
    let dir = TempDir::new().unwrap();
    tinygit(dir.path()).arg("init").assert().success();

    assert!(dir.path().join(".git/objects").is_dir());
    assert!(dir.path().join(".git/refs/heads").is_dir());
    let head = fs::read_to_string(dir.path().join(".git/HEAD")).unwrap();
    assert_eq!(head, "ref: refs/heads/main\n");
}

#[test]
fn init_twice_fails_with_already_exists() {
    let dir = TempDir::new().unwrap();
    tinygit(dir.path()).arg("init").assert().success();
    tinygit(dir.path())
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn empty_blob_hashes_to_the_well_known_oid() {
    let dir = TempDir::new().unwrap();
    tinygit(dir.path()).arg("init").assert().success();
    fs::write(dir.path().join("f"), b"").unwrap();

    tinygit(dir.path())
        .args(["hash-object", "-w", "f"])
        .assert()
        .success()
        .stdout("e69de29bb2d1d6434b8b29ae775ad8c2e48c5391\n");
}

#[test]
fn hello_blob_hashes_to_the_canonical_sha1() {
    let dir = TempDir::new().unwrap();
    tinygit(dir.path()).arg("init").assert().success();
    fs::write(dir.path().join("f"), b"hello\n").unwrap();

    tinygit(dir.path())
        .args(["hash-object", "-w", "f"])
        .assert()
        .success()
        .stdout("ce013625030ba8dba906f756967f9e9ca394464a\n");
}

#[test]
fn cat_file_prints_the_stored_payload_with_no_added_newline() {
    let dir = TempDir::new().unwrap();
    tinygit(dir.path()).arg("init").assert().success();
    fs::write(dir.path().join("f"), b"hello\n").unwrap();
    let oid = tinygit(dir.path())
        .args(["hash-object", "-w", "f"])
        .output()
        .unwrap();
    let oid = String::from_utf8(oid.stdout).unwrap();
    let oid = oid.trim();

    tinygit(dir.path())
        .args(["cat-file", "-p", oid])
        .assert()
        .success()
        .stdout("hello\n");
}

#[test]
fn write_tree_sorts_two_files_by_name() {
    let dir = TempDir::new().unwrap();
    tinygit(dir.path()).arg("init").assert().success();
    fs::write(dir.path().join("a"), b"A\n").unwrap();
    fs::write(dir.path().join("b"), b"B\n").unwrap();

    let tree_oid = tinygit(dir.path()).arg("write-tree").output().unwrap();
    let tree_oid = String::from_utf8(tree_oid.stdout).unwrap();
    let tree_oid = tree_oid.trim();

    tinygit(dir.path())
        .args(["ls-tree", "--name-only", tree_oid])
        .assert()
        .success()
        .stdout("a\nb\n");
}

#[test]
fn write_tree_is_stable_across_runs() {
    let dir = TempDir::new().unwrap();
    tinygit(dir.path()).arg("init").assert().success();
    fs::write(dir.path().join("a"), b"A\n").unwrap();
    fs::write(dir.path().join("b"), b"B\n").unwrap();

    let first = tinygit(dir.path()).arg("write-tree").output().unwrap().stdout;
    let second = tinygit(dir.path()).arg("write-tree").output().unwrap().stdout;
    assert_eq!(first, second);
}

#[test]
fn commit_chain_links_parent_to_child() {
    let dir = TempDir::new().unwrap();
    tinygit(dir.path()).arg("init").assert().success();
    fs::write(dir.path().join("f"), b"hi\n").unwrap();
    let tree = tinygit(dir.path()).arg("write-tree").output().unwrap().stdout;
    let tree = String::from_utf8(tree).unwrap();
    let tree = tree.trim();

    let c1 = tinygit(dir.path())
        .args(["commit-tree", tree, "-m", "one"])
        .output()
        .unwrap()
        .stdout;
    let c1 = String::from_utf8(c1).unwrap();
    let c1 = c1.trim();

    let c2 = tinygit(dir.path())
        .args(["commit-tree", tree, "-p", c1, "-m", "two"])
        .output()
        .unwrap()
        .stdout;
    let c2 = String::from_utf8(c2).unwrap();
    let c2 = c2.trim();

    tinygit(dir.path())
        .args(["cat-file", "-p", c2])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(format!("tree {tree}\nparent {c1}\nauthor ")));
}

#[test]
fn unknown_subcommand_is_a_usage_error() {
    let dir = TempDir::new().unwrap();
    tinygit(dir.path()).arg("frobnicate").assert().failure();
}
