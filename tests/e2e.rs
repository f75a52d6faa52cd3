use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::Command;
use tempfile::tempdir;

fn write_dump(path: &Path, users: usize) {
    let mut f = fs::File::create(path).unwrap();
    writeln!(f, "# extended LDIF").unwrap();
    writeln!(f).unwrap();
    for i in 0..users {
        writeln!(f, "dn: CN=User{i},CN=Users,DC=corp,DC=local").unwrap();
        writeln!(f, "sAMAccountName: user{i}").unwrap();
        writeln!(f, "memberOf: CN=Staff,DC=corp,DC=local").unwrap();
        if i == 0 {
            writeln!(f, "adminCount: 1").unwrap();
        }
        if i == 3 {
            writeln!(f, "info: temp password is").unwrap();
            writeln!(f, "Welcome123").unwrap();
        }
        writeln!(f).unwrap();
    }
}

fn ldapscout() -> Command {
    let mut cmd = Command::cargo_bin("ldapscout").unwrap();
    cmd.arg("--color").arg("never");
    cmd
}

#[test]
fn e2e_reports_non_standard_and_rare_fields() {
    let tmp = tempdir().unwrap();
    let dump = tmp.path().join("users.ldif");
    write_dump(&dump, 20);

    ldapscout()
        .arg(&dump)
        .assert()
        .success()
        .stdout(predicate::str::contains("Users Shown: 2/20"))
        .stdout(predicate::str::contains("User: user0"))
        .stdout(predicate::str::contains(
            "Rare Standard Field: adminCount -> 1",
        ))
        .stdout(predicate::str::contains(
            "Non-Standard Field: info -> temp password is Welcome123",
        ))
        .stdout(predicate::str::contains("User: user5").not());
}

#[test]
fn exclude_and_include_all_flags() {
    let tmp = tempdir().unwrap();
    let dump = tmp.path().join("users.ldif");
    write_dump(&dump, 20);

    ldapscout()
        .arg(&dump)
        .arg("--exclude=info,adminCount")
        .assert()
        .success()
        .stdout(predicate::str::contains("Users Shown: 0/20"))
        .stdout(predicate::str::contains("Excluding fields: adminCount, info"));

    ldapscout()
        .arg(&dump)
        .arg("--include-all")
        .arg("memberOf")
        .assert()
        .success()
        .stdout(predicate::str::contains("Users Shown: 20/20"))
        .stdout(predicate::str::contains(
            "Include-All Field: memberOf -> CN=Staff,DC=corp,DC=local",
        ));
}

#[test]
fn listing_modes() {
    let tmp = tempdir().unwrap();
    let dump = tmp.path().join("users.ldif");
    write_dump(&dump, 10);

    ldapscout()
        .arg(&dump)
        .arg("--list-fields")
        .assert()
        .success()
        .stdout(predicate::str::contains("Fields Found"))
        .stdout(predicate::str::contains("  memberOf: 10/10 (100.00%)"))
        .stdout(predicate::str::contains(
            "  info: 1/10 (10.00%) - Non-Standard Field",
        ));

    ldapscout()
        .arg(&dump)
        .arg("--list-users")
        .assert()
        .success()
        .stdout(predicate::str::contains("  user3 (Non-Standard Field)"))
        .stdout(predicate::str::contains("  user0 (Rare Standard Field)"));

    ldapscout()
        .arg(&dump)
        .arg("--list-users")
        .arg("--list-fields")
        .assert()
        .failure();
}

#[test]
fn invalid_level_is_a_configuration_error() {
    let tmp = tempdir().unwrap();
    let dump = tmp.path().join("users.ldif");
    write_dump(&dump, 3);
    ldapscout()
        .arg(&dump)
        .arg("--level")
        .arg("6")
        .assert()
        .code(4)
        .stdout(predicate::str::contains("Search Summary").not());
}

#[test]
fn missing_input_causes_non_zero_exit() {
    let tmp = tempdir().unwrap();
    ldapscout()
        .arg(tmp.path().join("missing.ldif"))
        .assert()
        .code(2);
}

#[test]
fn empty_input_reports_zero_users() {
    let tmp = tempdir().unwrap();
    let dump = tmp.path().join("empty.ldif");
    fs::write(&dump, "").unwrap();
    ldapscout()
        .arg(&dump)
        .assert()
        .success()
        .stdout(predicate::str::contains("Users Shown: 0/0"));
}

#[test]
fn registry_file_extends_standard_fields() {
    let tmp = tempdir().unwrap();
    let dump = tmp.path().join("users.ldif");
    let registry = tmp.path().join("schema.txt");
    write_dump(&dump, 20);
    fs::write(&registry, "# site schema\ninfo\n").unwrap();
    ldapscout()
        .arg(&dump)
        .arg("--registry")
        .arg(&registry)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Rare Standard Field: info -> temp password is Welcome123",
        ));
}

#[test]
fn missing_registry_file_falls_back_to_built_in_fields() {
    let tmp = tempdir().unwrap();
    let dump = tmp.path().join("users.ldif");
    write_dump(&dump, 20);
    ldapscout()
        .arg(&dump)
        .arg("--registry")
        .arg(tmp.path().join("missing-schema.txt"))
        .arg("--replace-registry")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Rare Standard Field: adminCount -> 1",
        ))
        .stdout(predicate::str::contains(
            "Non-Standard Field: info -> temp password is Welcome123",
        ))
        .stderr(predicate::str::contains("registry file not found"));
}

#[test]
fn writes_csv_export() {
    let tmp = tempdir().unwrap();
    let dump = tmp.path().join("users.ldif");
    let outdir = tmp.path().join("out");
    write_dump(&dump, 20);
    ldapscout()
        .arg(&dump)
        .arg("-q")
        .arg("-o")
        .arg(&outdir)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let files: Vec<_> = fs::read_dir(&outdir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    assert_eq!(files.len(), 1);
    let content = fs::read_to_string(&files[0]).unwrap();
    assert!(content.starts_with("User,Field,Class,Reason,Value\n"));
    assert!(content.contains("user3,info,NonStandard,Flagged,temp password is Welcome123"));
}

#[test]
fn export_failure_causes_non_zero_exit() {
    let tmp = tempdir().unwrap();
    let dump = tmp.path().join("users.ldif");
    write_dump(&dump, 2);
    let outdir = tmp.path().join("out");
    fs::write(&outdir, b"not a dir").unwrap();
    ldapscout()
        .arg(&dump)
        .arg("-o")
        .arg(&outdir)
        .assert()
        .failure();
}

#[test]
fn mmap_threshold_streaming_matches_library() {
    let tmp = tempdir().unwrap();
    let dump = tmp.path().join("big.ldif");
    write_dump(&dump, 50);

    let mut e = ldapscout::engine::Engine::new();
    e.load_from_file_paths_with_threshold(&[&dump], 32).unwrap();
    assert_eq!(e.entries.len(), 50);
    assert_eq!(
        e.frequencies().get("adminCount").unwrap().occurrence_count,
        1
    );

    ldapscout()
        .arg(&dump)
        .arg("--mmap-threshold")
        .arg("32")
        .assert()
        .success()
        .stdout(predicate::str::contains("Users Shown: 2/50"));
}
