use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

fn bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_pastebox"))
}

fn command(root: &Path) -> Command {
    let mut cmd = Command::new(bin());
    cmd.arg("--root")
        .arg(root)
        .env("PASTEBOX_CONFIG", root.join("no-such-config.toml"))
        .env_remove("PASTEBOX_ROOT")
        .env_remove("RUST_LOG");
    cmd
}

fn run(root: &Path, args: &[&str]) -> Output {
    command(root)
        .args(args)
        .stdin(Stdio::null())
        .output()
        .expect("run pastebox")
}

fn run_with_stdin(root: &Path, args: &[&str], input: &[u8]) -> Output {
    let mut child = command(root)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn pastebox");
    child
        .stdin
        .take()
        .expect("stdin")
        .write_all(input)
        .expect("write stdin");
    child.wait_with_output().expect("wait pastebox")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

#[test]
fn test_put_get_exists_delete_flow() {
    let dir = TempDir::new().expect("tempdir");
    let root = dir.path();

    let put = run_with_stdin(
        root,
        &["put", "--id", "testpaste123", "--expire", "1week", "--formatter", "markdown"],
        b"encrypted_data_here",
    );
    assert!(put.status.success(), "put failed: {:?}", put);
    assert!(stdout(&put).contains("testpaste123"));

    let get = run(root, &["--quiet", "get", "testpaste123"]);
    assert!(get.status.success());
    assert_eq!(get.stdout, b"encrypted_data_here");

    let json = run(root, &["get", "testpaste123", "--json"]);
    assert!(json.status.success());
    let value: serde_json::Value = serde_json::from_slice(&json.stdout).expect("json output");
    assert_eq!(value["id"], "testpaste123");
    assert_eq!(value["meta"]["formatter"], "markdown");
    assert_eq!(value["meta"]["expire_interval"], 604_800);

    let exists = run(root, &["exists", "testpaste123"]);
    assert!(exists.status.success());
    assert_eq!(stdout(&exists).trim(), "true");

    let delete = run(root, &["delete", "testpaste123"]);
    assert!(delete.status.success());
    let again = run(root, &["delete", "testpaste123"]);
    assert!(again.status.success());

    let exists = run(root, &["exists", "testpaste123"]);
    assert_eq!(exists.status.code(), Some(3));
    assert_eq!(stdout(&exists).trim(), "false");

    let get = run(root, &["get", "testpaste123"]);
    assert_eq!(get.status.code(), Some(3));
}

#[test]
fn test_put_conflict_and_invalid_id() {
    let dir = TempDir::new().expect("tempdir");
    let root = dir.path();

    let first = run_with_stdin(root, &["put", "--id", "taken001"], b"one");
    assert!(first.status.success());
    let second = run_with_stdin(root, &["put", "--id", "taken001"], b"two");
    assert_eq!(second.status.code(), Some(4));

    let get = run(root, &["--quiet", "get", "taken001"]);
    assert_eq!(get.stdout, b"one");

    let invalid = run(root, &["get", "NOT/VALID"]);
    assert_eq!(invalid.status.code(), Some(4));

    let bad_expire = run_with_stdin(root, &["put", "--expire", "5 minutes"], b"x");
    assert_eq!(bad_expire.status.code(), Some(4));
}

#[test]
fn test_burn_after_reading_is_enforced_by_get() {
    let dir = TempDir::new().expect("tempdir");
    let root = dir.path();

    let put = run_with_stdin(
        root,
        &["--quiet", "put", "--id", "burnme01", "--burn-after-reading"],
        b"secret",
    );
    assert!(put.status.success());

    let first = run(root, &["--quiet", "get", "burnme01"]);
    assert!(first.status.success());
    assert_eq!(first.stdout, b"secret");

    let second = run(root, &["get", "burnme01"]);
    assert_eq!(second.status.code(), Some(3));
}

#[test]
fn test_generated_id_list_and_comments() {
    let dir = TempDir::new().expect("tempdir");
    let root = dir.path();

    let put = run_with_stdin(root, &["--quiet", "put", "--open-discussion"], b"data");
    assert!(put.status.success());
    let id = stdout(&put).trim().to_string();
    assert_eq!(id.len(), 16);

    let list = run(root, &["list", "--json"]);
    let ids: Vec<String> = serde_json::from_slice(&list.stdout).expect("list json");
    assert_eq!(ids, vec![id.clone()]);

    let comment = run_with_stdin(
        root,
        &["comment", "add", &id, "--id", "comment01", "--icon", "vizhash"],
        b"first!",
    );
    assert!(comment.status.success(), "comment failed: {:?}", comment);

    let comments = run(root, &["comment", "list", &id, "--json"]);
    let values: Vec<serde_json::Value> =
        serde_json::from_slice(&comments.stdout).expect("comment json");
    assert_eq!(values.len(), 1);
    assert_eq!(values[0]["id"], "comment01");
    assert_eq!(values[0]["parent_id"], id.as_str());
    assert_eq!(values[0]["meta"]["icon"], "vizhash");

    let orphan = run_with_stdin(root, &["comment", "add", "missing01"], b"x");
    assert_eq!(orphan.status.code(), Some(3));
}

#[test]
fn test_purge_removes_expired_pastes() {
    let dir = TempDir::new().expect("tempdir");
    let root = dir.path();

    let old = run_with_stdin(
        root,
        &["put", "--id", "stale001", "--expire", "5min", "--created", "2020-01-01T00:00:00Z"],
        b"old",
    );
    assert!(old.status.success());
    let fresh = run_with_stdin(root, &["put", "--id", "fresh001"], b"new");
    assert!(fresh.status.success());

    let purge = run(root, &["purge", "--batch", "10"]);
    assert!(purge.status.success());
    assert!(stdout(&purge).contains("Purged 1"));

    assert!(!root.join("st").join("al").join("stale001.json").exists());
    let list = run(root, &["--quiet", "list"]);
    assert_eq!(stdout(&list).trim(), "fresh001");
}

#[test]
fn test_get_reclaims_expired_paste_before_exit() {
    let dir = TempDir::new().expect("tempdir");
    let root = dir.path();

    for n in 0..5 {
        let paste_id = format!("expired{:02}", n);
        let put = run_with_stdin(
            root,
            &["put", "--id", &paste_id, "--expire", "5min", "--created", "2020-01-01T00:00:00Z"],
            b"old",
        );
        assert!(put.status.success());
        let record = root.join("ex").join("pi").join(format!("{}.json", paste_id));
        assert!(record.exists());

        let get = run(root, &["get", &paste_id]);
        assert_eq!(get.status.code(), Some(3));
        assert!(!record.exists(), "{} still on disk after get", paste_id);
    }
}
