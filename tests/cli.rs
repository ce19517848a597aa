// Command-line behaviour through a pseudo terminal
mod common;

use rexpect::session::spawn_command;
use std::process::Command;

const TIMEOUT_MS: u64 = 10000;

fn sumtopic() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_sumtopic"));
    cmd.env("SUMTOPIC_CONFIG", "/nonexistent/sumtopic.toml");
    cmd
}

fn words(n: usize) -> String {
    vec!["word"; n].join(" ")
}

#[test]
fn help_lists_subcommands() {
    let mut cmd = sumtopic();
    cmd.arg("--help");
    let mut p = spawn_command(cmd, Some(TIMEOUT_MS)).unwrap();
    p.exp_string("analyze").unwrap();
    p.exp_string("stats").unwrap();
    p.exp_eof().unwrap();
}

#[test]
fn stats_reports_counts_and_budget() {
    let mut cmd = sumtopic();
    cmd.args(["stats", "--text", &words(350)]);
    let mut p = spawn_command(cmd, Some(TIMEOUT_MS)).unwrap();
    p.exp_string("Word Count: 350").unwrap();
    p.exp_string("Character Count: 1749").unwrap();
    p.exp_string("Length budget: min 60, max 150").unwrap();
    p.exp_eof().unwrap();
}

#[test]
fn stats_warns_on_short_text() {
    let mut cmd = sumtopic();
    cmd.args(["stats", "--text", &words(12)]);
    let mut p = spawn_command(cmd, Some(TIMEOUT_MS)).unwrap();
    p.exp_string("Please provide at least 50 words.").unwrap();
    p.exp_eof().unwrap();
}

#[test]
fn analyze_short_text_warns_without_models() {
    let mut cmd = sumtopic();
    cmd.env("SUMTOPIC_MODELS_DIR", "/nonexistent/models");
    cmd.args(["analyze", "--text", &words(5)]);
    let mut p = spawn_command(cmd, Some(TIMEOUT_MS)).unwrap();
    p.exp_string("Please provide at least 50 words.").unwrap();
    p.exp_eof().unwrap();
}

#[test]
fn analyze_without_models_fails_gracefully() {
    let mut cmd = sumtopic();
    cmd.env("SUMTOPIC_MODELS_DIR", "/nonexistent/models");
    cmd.args(["analyze", "--format", "json", "--text", &words(60)]);
    let mut p = spawn_command(cmd, Some(TIMEOUT_MS)).unwrap();
    p.exp_string("\"status\": \"failed\"").unwrap();
    p.exp_string("An error occurred during processing.").unwrap();
    p.exp_eof().unwrap();
}

#[test]
fn stats_reports_pdf_page_count() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("two.pdf");
    std::fs::write(&path, common::pdf_with_pages(&["alpha beta", "gamma"])).unwrap();

    let mut cmd = sumtopic();
    cmd.arg("stats").arg("--pdf").arg(&path);
    let mut p = spawn_command(cmd, Some(TIMEOUT_MS)).unwrap();
    p.exp_string("Pages: 2").unwrap();
    p.exp_string("Word Count: ").unwrap();
    p.exp_string("Please provide at least 50 words.").unwrap();
    p.exp_eof().unwrap();
}
