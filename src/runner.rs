use anyhow::{Context, Result};
use declarative::CommandOutput;
use std::process::{Command, Stdio};

/// Run a command and capture output, whatever its exit status
pub fn run_output(cmd: &str, args: &[&str]) -> Result<CommandOutput> {
    let output = Command::new(cmd)
        .args(args)
        .stdin(Stdio::null())
        .output()
        .with_context(|| format!("Failed to execute: {} {}", cmd, args.join(" ")))?;
    Ok(output.into())
}

/// Run a command and capture output
pub fn run_capture(cmd: &str, args: &[&str]) -> Result<String> {
    let output = run_output(cmd, args)?;

    if output.success {
        Ok(output.stdout_str().trim().to_string())
    } else {
        anyhow::bail!("Command failed: {}", output.stderr_str().trim())
    }
}

/// Build the argv that runs `command` through `sh -c`, switching user if needed
///
/// Root switches with `runuser`; anyone else goes through non-interactive
/// `sudo`, which fails rather than prompting.
pub fn shell_argv(command: &str, user: Option<&str>, is_root: bool) -> Vec<String> {
    let shell = ["sh".to_string(), "-c".to_string(), command.to_string()];

    match user {
        None => shell.to_vec(),
        Some("root") if is_root => shell.to_vec(),
        Some("root") => ["sudo", "-n", "--"]
            .iter()
            .map(ToString::to_string)
            .chain(shell)
            .collect(),
        Some(user) if is_root => ["runuser", "-u", user, "--"]
            .iter()
            .map(ToString::to_string)
            .chain(shell)
            .collect(),
        Some(user) => ["sudo", "-n", "-u", user, "--"]
            .iter()
            .map(ToString::to_string)
            .chain(shell)
            .collect(),
    }
}

/// Run a shell command, optionally as another user
pub fn run_shell(command: &str, user: Option<&str>) -> Result<CommandOutput> {
    let argv = shell_argv(command, user, is_root());
    let args: Vec<&str> = argv[1..].iter().map(String::as_str).collect();
    log::debug!("Running {}", argv.join(" "));
    run_output(&argv[0], &args)
}

/// Whether the process runs with an effective uid of 0
pub fn is_root() -> bool {
    // SAFETY: geteuid has no preconditions and cannot fail
    unsafe { libc::geteuid() == 0 }
}

/// Check if a command exists
pub fn command_exists(cmd: &str) -> bool {
    which::which(cmd).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shell_argv_plain() {
        assert_eq!(shell_argv("true", None, false), vec!["sh", "-c", "true"]);
    }

    #[test]
    fn test_shell_argv_root_as_root() {
        assert_eq!(
            shell_argv("yum -y update", Some("root"), true),
            vec!["sh", "-c", "yum -y update"]
        );
    }

    #[test]
    fn test_shell_argv_root_via_sudo() {
        assert_eq!(
            shell_argv("yum -y update", Some("root"), false),
            vec!["sudo", "-n", "--", "sh", "-c", "yum -y update"]
        );
    }

    #[test]
    fn test_shell_argv_other_user() {
        assert_eq!(
            shell_argv("id", Some("dd-agent"), true),
            vec!["runuser", "-u", "dd-agent", "--", "sh", "-c", "id"]
        );
        assert_eq!(
            shell_argv("id", Some("dd-agent"), false),
            vec!["sudo", "-n", "-u", "dd-agent", "--", "sh", "-c", "id"]
        );
    }

    #[test]
    fn test_run_capture() {
        assert_eq!(run_capture("sh", &["-c", "echo hello"]).unwrap(), "hello");
        assert!(run_capture("sh", &["-c", "exit 3"]).is_err());
    }

    #[test]
    fn test_run_shell_reports_exit_code() {
        let output = run_shell("echo oops >&2; exit 4", None).unwrap();
        assert!(!output.success);
        assert_eq!(output.code, Some(4));
        assert_eq!(output.stderr_str().trim(), "oops");
    }
}
