use assert_cmd::Command;
use predicates::prelude::predicate;

#[test]
fn rejects_both_mapping_directions() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("graft")?;
    cmd.args([
        "pull",
        "--from",
        "../elsewhere",
        "--source-dir",
        "lib",
        "--target-dir",
        "vendor",
    ]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));

    Ok(())
}

#[test]
fn requires_a_source_repository() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("graft")?;
    cmd.arg("pull");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("--from"));

    Ok(())
}

#[test]
fn requires_a_subcommand() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("graft")?;

    cmd.assert().failure();

    Ok(())
}

#[test]
fn pull_help_documents_the_mapping_flags() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("graft")?;
    cmd.args(["pull", "--help"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("--source-dir"))
        .stdout(predicate::str::contains("--target-dir"))
        .stdout(predicate::str::contains("--initial"));

    Ok(())
}
