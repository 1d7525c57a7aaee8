//! Conformance cases in JSON-Schema-Test-Suite layout
//!
//! Every `tests/fixtures/<draft>/*.json` file holds an array of groups, each
//! a schema plus instances with their expected verdicts. Remote references
//! to `http://localhost:1234/` are served from `tests/fixtures/remotes`.

use anyhow::{Context, Result};
use draftcheck::{Draft, StaticFetcher, Validator, ValidatorConfig};
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const REMOTE_BASE: &str = "http://localhost:1234";

#[derive(Debug, Deserialize)]
struct SuiteGroup {
    description: String,
    schema: Value,
    tests: Vec<SuiteCase>,
}

#[derive(Debug, Deserialize)]
struct SuiteCase {
    description: String,
    data: Value,
    valid: bool,
}

fn fixtures() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures")
}

fn json_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("reading {}", dir.display()))? {
        let path = entry?.path();
        if path.is_dir() {
            files.extend(json_files(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "json") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn remote_fetcher() -> Result<Arc<StaticFetcher>> {
    let root = fixtures().join("remotes");
    let mut fetcher = StaticFetcher::new();
    for path in json_files(&root)? {
        let relative = path.strip_prefix(&root)?.to_string_lossy().replace('\\', "/");
        fetcher = fetcher.with_document(format!("{}/{}", REMOTE_BASE, relative), fs::read(&path)?);
    }
    Ok(Arc::new(fetcher))
}

/// Run every group of a draft directory; returns the failures
fn run_suite(draft: Draft, dir: &str) -> Result<(usize, Vec<String>)> {
    let fetcher = remote_fetcher()?;
    let mut failures = Vec::new();
    let mut cases = 0;

    for file in json_files(&fixtures().join(dir))? {
        let text = fs::read_to_string(&file)?;
        let groups: Vec<SuiteGroup> =
            serde_json::from_str(&text).with_context(|| format!("parsing {}", file.display()))?;
        let name = file.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();

        for group in groups {
            let config = ValidatorConfig::new()
                .with_shared_fetcher(fetcher.clone())
                .with_draft(draft);
            let validator = match Validator::from_value(&group.schema, config) {
                Ok(validator) => validator,
                Err(e) => {
                    failures.push(format!("{} / {}: compile failed: {}", name, group.description, e));
                    continue;
                }
            };

            for case in &group.tests {
                cases += 1;
                if validator.is_valid(&case.data) != case.valid {
                    failures.push(format!(
                        "{} / {} / {}: expected valid={}",
                        name, group.description, case.description, case.valid
                    ));
                }
            }
        }
    }
    Ok((cases, failures))
}

#[test]
fn test_draft4_suite() -> Result<()> {
    let (cases, failures) = run_suite(Draft::Draft4, "draft4")?;
    assert!(cases > 100, "only {} cases found", cases);
    assert!(failures.is_empty(), "failures:\n{}", failures.join("\n"));
    Ok(())
}

#[test]
fn test_draft3_suite() -> Result<()> {
    let (cases, failures) = run_suite(Draft::Draft3, "draft3")?;
    assert!(cases > 0);
    assert!(failures.is_empty(), "failures:\n{}", failures.join("\n"));
    Ok(())
}
