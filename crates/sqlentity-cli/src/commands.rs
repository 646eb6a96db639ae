//! Subcommand execution.

use std::io::Read;

use anyhow::Context;
use tracing::debug;

use sqlentity_core::{classify, statement_tag, ClassifyError, TreeBuilder};

use crate::cli::{Cli, Commands, InputArgs};

/// Runs the selected subcommand and returns what it prints.
pub fn run(cli: &Cli, stdin: impl Read) -> anyhow::Result<String> {
    match &cli.command {
        Commands::Classify(input) => {
            let sql = read_input(input, stdin)?;
            let entity = classify(&sql).map_err(|e| locate(e, &sql))?;
            let json = if cli.pretty {
                serde_json::to_string_pretty(&entity)?
            } else {
                serde_json::to_string(&entity)?
            };
            Ok(json)
        }

        Commands::Tag(input) => {
            let sql = read_input(input, stdin)?;
            statement_tag(&sql).map_err(|e| locate(e, &sql))
        }

        Commands::Tree(input) => {
            let sql = read_input(input, stdin)?;
            let root = TreeBuilder::new(&sql)
                .build()
                .map_err(|e| locate(e.into(), &sql))?;
            Ok(root.to_string().trim_end().to_string())
        }
    }
}

/// Points parse errors at the text they concern.
fn locate(err: ClassifyError, sql: &str) -> anyhow::Error {
    let near = match &err {
        ClassifyError::Parse(parse) => parse.span.slice(sql).map(str::trim),
        _ => None,
    };
    match near {
        Some(text) if !text.is_empty() => {
            let context = format!("Invalid SQL near '{text}'");
            anyhow::Error::new(err).context(context)
        }
        _ => err.into(),
    }
}

fn read_input(input: &InputArgs, mut stdin: impl Read) -> anyhow::Result<String> {
    if let Some(sql) = &input.sql {
        return Ok(sql.clone());
    }
    if let Some(path) = &input.file {
        debug!(path = %path.display(), "Reading statement from file");
        return std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()));
    }

    debug!("Reading statement from stdin");
    let mut sql = String::new();
    stdin
        .read_to_string(&mut sql)
        .context("Failed to read stdin")?;
    Ok(sql)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use clap::Parser;

    use super::*;

    fn run_args(args: &[&str], stdin: &str) -> anyhow::Result<String> {
        let cli = Cli::try_parse_from(args).unwrap();
        run(&cli, stdin.as_bytes())
    }

    #[test]
    fn test_classify_argument() {
        let output = run_args(&["sqlentity", "classify", "DROP TABLE Persons"], "").unwrap();
        let json: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(json["entity"], "table");
        assert_eq!(json["name"], "Persons");
        assert_eq!(json["action"], "DROP");
        assert_eq!(json["columns"], serde_json::json!([]));
    }

    #[test]
    fn test_classify_pretty() {
        let output = run_args(
            &["sqlentity", "--pretty", "classify", "CREATE DATABASE testDB"],
            "",
        )
        .unwrap();
        assert!(output.contains('\n'));
        let json: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(json["entity"], "database");
        assert_eq!(json["name"], "testDB");
    }

    #[test]
    fn test_classify_from_stdin() {
        let output = run_args(
            &["sqlentity", "classify"],
            "UPDATE Persons SET City = 'Oslo' WHERE ID = 1;",
        )
        .unwrap();
        let json: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(json["action"], "UPDATE");
        assert_eq!(json["columns"][0]["value"], "Oslo");
        assert_eq!(json["filter"][0]["AND"][0]["column"], "ID");
    }

    #[test]
    fn test_classify_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "ALTER TABLE Persons DROP COLUMN DateOfBirth;").unwrap();
        let path = file.path().to_str().unwrap();

        let output = run_args(&["sqlentity", "classify", "--file", path], "").unwrap();
        let json: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(json["columns"][0]["action"], "DROPCOLUMN");
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.sql");
        let err = run_args(
            &["sqlentity", "tag", "--file", path.to_str().unwrap()],
            "",
        )
        .unwrap_err();
        assert!(err.to_string().starts_with("Failed to read"));
    }

    #[test]
    fn test_tag() {
        let output = run_args(
            &["sqlentity", "tag", "CREATE TABLE IF NOT EXISTS t (a int)"],
            "",
        )
        .unwrap();
        assert_eq!(output, "CREATETABLE");
    }

    #[test]
    fn test_tree() {
        let output = run_args(&["sqlentity", "tree", "DROP TABLE Persons"], "").unwrap();
        assert_eq!(
            output,
            "Statement\n  Keyword(Drop) DROP\n  Keyword(Table) TABLE\n  NameRef\n    Name Persons"
        );
    }

    #[test]
    fn test_unsupported_statement_fails() {
        let err = run_args(&["sqlentity", "classify", "GRANT SELECT ON t TO bob"], "").unwrap_err();
        assert_eq!(err.to_string(), "Unsupported statement: SELECTTO");
    }

    #[test]
    fn test_parse_error_points_at_text() {
        let err = run_args(&["sqlentity", "tag", "DROP TABLE t)"], "").unwrap_err();
        assert_eq!(err.to_string(), "Invalid SQL near ')'");
        assert_eq!(
            err.root_cause().to_string(),
            "Unbalanced ')' at 12..13"
        );
    }

    #[test]
    fn test_sql_and_file_conflict() {
        assert!(Cli::try_parse_from(["sqlentity", "tag", "DROP TABLE t", "--file", "x.sql"]).is_err());
    }
}
