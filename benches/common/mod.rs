#![allow(dead_code)]
use std::fs;
use std::path::{Path, PathBuf};

use ember::ast::Program;
use ember::{lexer, parser};
use test_support::load_cases;

/// Fixture cases marked `bench.enabled`, labelled `<case>_<tag>`.
pub fn workloads() -> Vec<(String, PathBuf)> {
    let cases = load_cases(Path::new("tests/programs")).unwrap_or_else(|err| panic!("{err:#}"));
    cases
        .into_iter()
        .filter(|case| case.spec.bench.enabled)
        .map(|case| {
            let tag = case.spec.bench.tags.join("_");
            (format!("{}_{tag}", case.name), case.program_path)
        })
        .collect()
}

pub fn load_source(path: &Path) -> String {
    fs::read_to_string(path).unwrap_or_else(|err| panic!("read {}: {err}", path.display()))
}

pub fn load_program(path: &Path) -> Program {
    let source = load_source(path);
    let tokens = lexer::tokenize(&source)
        .unwrap_or_else(|err| panic!("tokenize {}: {err}", path.display()));
    parser::parse_tokens(tokens).unwrap_or_else(|err| panic!("parse {}: {err}", path.display()))
}
