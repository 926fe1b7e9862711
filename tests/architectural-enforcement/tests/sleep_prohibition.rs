//! Integration Test: Sleep Prohibition
//!
//! **Policy**: Production code in the core and the shell MUST NOT call sleep
//! methods. Delays go through the timer service so tests can drive them.
//! **Exceptions**: `core/src/timers.rs` (the timer service itself), test code

use std::fs;
use std::path::Path;

use architectural_enforcement::workspace_root;

/// Files allowed to sleep: they implement the timer service
const TIMER_SERVICE: &[&str] = &["timers.rs"];

#[test]
fn test_no_sleep_in_production_code() {
    let root = workspace_root();
    let mut violations = Vec::new();

    for dir in ["core/src", "shell/src"] {
        check_directory(&root.join(dir), &mut violations);
    }

    if !violations.is_empty() {
        eprintln!("\n❌ Sleep calls found in production code!\n");
        for violation in &violations {
            eprintln!("  ❌ {violation}");
        }
        eprintln!("\n✅ Use TimerService (TokioTimers / ManualTimers) or timers::defer instead");

        panic!("Found {} sleep violation(s) in production code", violations.len());
    }
}

#[test]
fn test_scanned_directories_exist() {
    let root = workspace_root();
    for dir in ["core/src", "shell/src"] {
        assert!(root.join(dir).is_dir(), "missing {dir}");
    }
}

fn check_directory(dir: &Path, violations: &mut Vec<String>) {
    for entry in walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
    {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) != Some("rs") {
            continue;
        }
        let is_timer_service = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|name| TIMER_SERVICE.contains(&name));
        if is_timer_service {
            continue;
        }
        check_file(path, violations);
    }
}

fn check_file(path: &Path, violations: &mut Vec<String>) {
    let Ok(content) = fs::read_to_string(path) else {
        return;
    };
    let lines: Vec<&str> = content.lines().collect();

    for (idx, line) in lines.iter().enumerate() {
        let code_part = line.split("//").next().unwrap_or(line);
        if !(code_part.contains("::sleep(") || code_part.contains(".sleep(")) {
            continue;
        }
        if is_in_test_code(&lines, idx) {
            continue;
        }
        violations.push(format!("{}:{} - {}", path.display(), idx + 1, line.trim()));
    }
}

/// Whether a line sits in a test function or a `#[cfg(test)]` module
fn is_in_test_code(lines: &[&str], current_idx: usize) -> bool {
    if lines[..current_idx]
        .iter()
        .any(|line| line.trim().starts_with("#[cfg(test)]"))
    {
        return true;
    }

    for line in lines[..current_idx].iter().rev() {
        let line = line.trim();
        if line.starts_with("#[test]") || line.starts_with("#[tokio::test") {
            return true;
        }
        if line.starts_with("fn ") || line.starts_with("pub fn ") || line.starts_with("mod ") {
            return false;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sleep_outside_tests_is_flagged() {
        let code = [
            "pub async fn poll() {",
            "    tokio::time::sleep(Duration::from_millis(10)).await;",
            "}",
        ];
        assert!(!is_in_test_code(&code, 1));
    }

    #[test]
    fn test_sleep_in_test_module_is_allowed() {
        let code = [
            "#[cfg(test)]",
            "mod tests {",
            "    async fn helper() {",
            "        tokio::time::sleep(Duration::from_millis(10)).await;",
            "    }",
            "}",
        ];
        assert!(is_in_test_code(&code, 3));
    }

    #[test]
    fn test_sleep_in_tokio_test_is_allowed() {
        let code = [
            "#[tokio::test(start_paused = true)]",
            "async fn test_talks() {",
            "    tokio::time::sleep(Duration::from_millis(10)).await;",
            "}",
        ];
        assert!(is_in_test_code(&code, 2));
    }
}
