mod common;

use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use common::*;
use crossborder::interfaces::xml::codec::{PAYMENT_REQUEST_ROOT, QUOTE_REQUEST_ROOT};
use crossborder::interfaces::xml::to_xml;
use predicates::prelude::*;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

const ENV_VARS: [&str; 5] = [
    "CROSSBORDER_PARTNER_ID",
    "CROSSBORDER_BASE_URL",
    "CROSSBORDER_ENCRYPTION_ENABLED",
    "CROSSBORDER_PAYLOAD_KEY",
    "CROSSBORDER_TIMEOUT_SECS",
];

fn command(config: &Path) -> Command {
    let mut cmd = Command::new(cargo_bin!("crossborder"));
    for name in ENV_VARS {
        cmd.env_remove(name);
    }
    cmd.arg("--config").arg(config).arg("--sandbox");
    cmd
}

fn write_config(dir: &TempDir, content: &str) -> std::path::PathBuf {
    let path = dir.path().join("crossborder.toml");
    std::fs::write(&path, content).unwrap();
    path
}

fn full_config(dir: &TempDir) -> std::path::PathBuf {
    write_config(
        dir,
        &format!(
            "partner_id = \"{PARTNER_ID}\"\npayload_key = \"{}\"\n",
            BASE64.encode(PAYLOAD_KEY)
        ),
    )
}

#[test]
fn test_cli_quote() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let config = full_config(&dir);
    let request = dir.path().join("quote.xml");
    std::fs::write(&request, to_xml(QUOTE_REQUEST_ROOT, &forward_quote("cli-quote-1"))?)?;

    command(&config)
        .arg("quote")
        .arg(&request)
        .assert()
        .success()
        .stdout(predicate::str::contains("<quote>"))
        .stdout(predicate::str::contains("cli-quote-1"))
        .stdout(predicate::str::contains("pen_"));

    Ok(())
}

#[test]
fn test_cli_encrypted_payment() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let config = full_config(&dir);
    let request = dir.path().join("payment.xml");
    std::fs::write(&request, to_xml(PAYMENT_REQUEST_ROOT, &one_shot_forward("cli-pay-1"))?)?;

    command(&config)
        .arg("pay")
        .arg(&request)
        .arg("--encrypt")
        .assert()
        .success()
        .stdout(predicate::str::contains("<payment>"))
        .stdout(predicate::str::contains("rem_cli-pay-1"));

    Ok(())
}

#[test]
fn test_cli_rejected_payment_fails() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let config = full_config(&dir);
    let request = dir.path().join("payment.xml");
    std::fs::write(
        &request,
        to_xml(PAYMENT_REQUEST_ROOT, &payment_with_quote("cli-pay-2", "pen_unknown"))?,
    )?;

    command(&config)
        .arg("pay")
        .arg(&request)
        .assert()
        .failure()
        .stderr(predicate::str::contains("proposal_id"));

    Ok(())
}

#[test]
fn test_cli_without_partner_id() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let config = write_config(&dir, "timeout_secs = 5\n");
    let request = dir.path().join("quote.xml");
    std::fs::write(&request, to_xml(QUOTE_REQUEST_ROOT, &forward_quote("cli-quote-2"))?)?;

    command(&config)
        .arg("quote")
        .arg(&request)
        .assert()
        .failure()
        .stderr(predicate::str::contains("partner id"));

    Ok(())
}
