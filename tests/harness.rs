use anyhow::{Context, Result, ensure};
use std::path::Path;

use ember::{Completion, Engine, ExitStatus};
use test_support::{Case, CaseClass, load_cases, normalize_output, run_binary};

fn exit_code(completion: &Completion) -> i32 {
    i32::from(completion.exit_code())
}

fn check_stdout(case: &Case, actual: &str) -> Result<()> {
    if let Some(expected) = case.expected_stdout()? {
        assert_eq!(
            normalize_output(actual),
            normalize_output(&expected),
            "stdout mismatch for {}",
            case.name
        );
    }
    Ok(())
}

fn run_case_in_process(engine: &Engine, case: &Case) -> Result<()> {
    let source = case.source()?;
    let mut output = Vec::new();
    let result = engine.run(&source, &mut output);
    let stdout = String::from_utf8(output).context("stdout is not UTF-8")?;

    match case.spec.class {
        CaseClass::RuntimeSuccess => {
            let completion =
                result.with_context(|| format!("Case {} failed unexpectedly", case.name))?;
            ensure!(
                exit_code(&completion) == case.spec.expected.exit_code,
                "Case {} exited with {}, expected {}",
                case.name,
                exit_code(&completion),
                case.spec.expected.exit_code
            );
            check_stdout(case, &stdout)?;
        }
        CaseClass::FrontendError | CaseClass::RuntimeError => {
            let expected_status = if case.spec.class == CaseClass::FrontendError {
                ExitStatus::SyntaxErrorOccurred
            } else {
                ExitStatus::RuntimeErrorOccurred
            };
            let Err(error) = result else {
                anyhow::bail!("Expected an error in {}, but the program succeeded", case.name);
            };
            ensure!(
                error.status() == expected_status,
                "Case {} reported {:?}, expected {:?}: {error}",
                case.name,
                error.status(),
                expected_status
            );
            let expected_error = case.expected_error()?;
            let actual = error.to_string();
            ensure!(
                actual.contains(&expected_error),
                "Expected error containing '{expected_error}' in {}, got '{actual}'",
                case.name
            );
            check_stdout(case, &stdout)?;
        }
    }
    Ok(())
}

#[test]
fn runs_programs_in_process() -> Result<()> {
    let engine = Engine::new();
    for case in load_cases(Path::new("tests/programs"))? {
        if case.spec.bench.enabled {
            ensure!(
                !case.spec.bench.tags.is_empty(),
                "Case {} has bench enabled but no tags",
                case.name
            );
        }
        run_case_in_process(&engine, &case)?;
    }
    Ok(())
}

#[test]
fn runs_programs_through_cli() -> Result<()> {
    let binary = Path::new(env!("CARGO_BIN_EXE_ember"));
    for case in load_cases(Path::new("tests/programs"))? {
        let expected_code = case.spec.expected.exit_code;
        if case.spec.class != CaseClass::RuntimeSuccess {
            ensure!(
                expected_code == case.spec.class.default_exit_code(),
                "Case {} expected exit code must be {} for {:?}",
                case.name,
                case.spec.class.default_exit_code(),
                case.spec.class
            );
        }
        let output = run_binary(binary, &case.program_path)?;
        ensure!(
            output.exit_code == Some(expected_code),
            "CLI exit code {:?} for {}, expected {expected_code}; stderr: {}",
            output.exit_code,
            case.name,
            output.stderr
        );
        check_stdout(&case, &output.stdout)?;
        if case.spec.class != CaseClass::RuntimeSuccess {
            let expected_error = case.expected_error()?;
            ensure!(
                output.stderr.contains(&expected_error),
                "Expected stderr containing '{expected_error}' in {}, got '{}'",
                case.name,
                output.stderr
            );
        }
    }
    Ok(())
}
