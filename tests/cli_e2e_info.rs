//! End-to-end tests for the `info` command
//!
//! These tests invoke the actual CLI binary and validate its behavior
//! from a user's perspective.

mod common;

use common::prelude::*;

/// Test that --help flag shows help information
#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_info_help() {
    let mut cmd = cargo_bin_cmd!("vcs-batch");

    cmd.arg("info")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Show working-copy metadata"));
}

/// Metadata of a versioned SVN file is printed field by field.
#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_info_shows_svn_file_metadata() {
    let fixture = TestFixture::new().with_svn_checkout_files(
        "repo",
        "http://svn.example.com/svn/repo",
        &[("a.py", "11", "2024-01-10T09:00:00.000000Z", "bob")],
    );

    let mut cmd = cargo_bin_cmd!("vcs-batch");
    cmd.arg("info")
        .arg(fixture.path().join("repo").join("a.py"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Revision: 11"))
        .stdout(predicate::str::contains("Author:   bob"))
        .stdout(predicate::str::contains("svn.example.com"));
}

/// CVS files report their dotted revision and root.
#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_info_shows_cvs_file_metadata() {
    let fixture = TestFixture::new()
        .with_cvs_checkout(
            "wc",
            "/a.py/1.5/Mon Jan 15 10:00:00 2024//\n",
            ":pserver:anon@cvs.example.com:/cvsroot\n",
        )
        .with_file("wc/a.py", "");

    let mut cmd = cargo_bin_cmd!("vcs-batch");
    cmd.arg("info")
        .arg(fixture.path().join("wc").join("a.py"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Revision: 1.5"))
        .stdout(predicate::str::contains("pserver"));
}

/// A file inside a checkout but unknown to it is reported as not added.
#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_info_reports_unadded_file() {
    let fixture = TestFixture::new()
        .with_svn_checkout("repo", "http://svn.example.com/svn/repo")
        .with_file("repo/new.py", "");

    let mut cmd = cargo_bin_cmd!("vcs-batch");
    cmd.arg("info")
        .arg(fixture.path().join("repo").join("new.py"))
        .assert()
        .success()
        .stdout(predicate::str::contains("not added"));
}

/// Outside any checkout, detection fails cleanly.
#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_info_outside_checkout_with_explicit_vcs() {
    let fixture = TestFixture::new().with_file("stray.py", "");

    let mut cmd = cargo_bin_cmd!("vcs-batch");
    cmd.arg("info")
        .arg("--vcs")
        .arg("svn")
        .arg(fixture.path().join("stray.py"))
        .assert()
        .success()
        .stdout(predicate::str::contains("not under SVN control"));
}
