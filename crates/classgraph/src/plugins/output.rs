//! Artifact output
//!
//! Writes exporter output to `<file>.<format>`. DOT source whose configured
//! format is something else (`png`, `svg`, `pdf`, ...) is piped through the
//! Graphviz `dot` binary instead.

use anyhow::{anyhow, bail, Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, info, span, Level};

use crate::core::DiagramSection;

/// Write `content` produced in `native_format` to the path `section` names
///
/// Returns the path written.
pub fn write_artifact(content: &str, native_format: &str, section: &DiagramSection) -> Result<PathBuf> {
    let path = section.output_path(native_format);
    let write_span = span!(Level::INFO, "write_artifact", path = %path.display());
    let _enter = write_span.enter();

    match section.format.as_deref() {
        Some(format) if native_format == "dot" && format != "dot" => {
            render_with_dot(content, format, &path)?;
        }
        _ => {
            std::fs::write(&path, content)
                .with_context(|| format!("Failed to write {}", path.display()))?;
        }
    }

    info!(bytes = content.len(), "Wrote diagram");
    Ok(path)
}

fn render_with_dot(source: &str, format: &str, path: &Path) -> Result<()> {
    debug!(format, "Rendering through dot");
    let mut dot = Command::new("dot");
    dot.arg(format!("-T{}", format)).arg("-o").arg(path);
    pipe_through(dot, source.as_bytes()).context("Failed to run `dot`; is Graphviz installed?")
}

/// Feed `input` to `command` on stdin and wait for it to exit successfully
///
/// Stdin is written from a scoped thread while stderr is drained, so a child
/// that reports a lot before reading all of its input cannot stall either side.
fn pipe_through(mut command: Command, input: &[u8]) -> Result<()> {
    let program = command.get_program().to_string_lossy().into_owned();
    let mut child = command
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("Failed to start {}", program))?;
    let mut stdin = child
        .stdin
        .take()
        .with_context(|| format!("{} stdin unavailable", program))?;

    std::thread::scope(|scope| {
        let writer = scope.spawn(move || stdin.write_all(input));
        let output = child
            .wait_with_output()
            .with_context(|| format!("{} did not finish", program))?;
        let written = writer
            .join()
            .map_err(|_| anyhow!("Writer for {} panicked", program))?;

        if !output.status.success() {
            bail!(
                "{} exited with {}: {}",
                program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        written.with_context(|| format!("Failed to send input to {}", program))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writes_native_format() {
        let dir = tempfile::tempdir().unwrap();
        let section = DiagramSection {
            file: dir.path().join("classes").to_string_lossy().into_owned(),
            ..Default::default()
        };

        let path = write_artifact("digraph {}\n", "dot", &section).unwrap();
        assert_eq!(path, dir.path().join("classes.dot"));
        assert_eq!(std::fs::read_to_string(path).unwrap(), "digraph {}\n");
    }

    #[test]
    fn test_text_exporters_ignore_dot() {
        let dir = tempfile::tempdir().unwrap();
        let section = DiagramSection {
            file: dir.path().join("summary").to_string_lossy().into_owned(),
            format: Some("log".to_string()),
            ..Default::default()
        };

        let path = write_artifact("Application: X\n", "txt", &section).unwrap();
        assert_eq!(path, dir.path().join("summary.log"));
        assert!(path.exists());
    }

    #[test]
    fn test_missing_directory_is_reported() {
        let section = DiagramSection {
            file: "/nonexistent-dir/for/classes".to_string(),
            ..Default::default()
        };
        let err = write_artifact("x", "txt", &section).unwrap_err();
        assert!(err.to_string().contains("Failed to write"));
    }

    #[cfg(unix)]
    #[test]
    fn test_large_input_with_chatty_stderr_completes() {
        let input = "x".repeat(1 << 20);
        let mut echo = Command::new("sh");
        echo.arg("-c").arg("cat 1>&2; exit 3");

        let err = pipe_through(echo, input.as_bytes()).unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with("sh exited with"));
        assert!(message.ends_with("xxxx"));
    }

    #[cfg(unix)]
    #[test]
    fn test_successful_pipe() {
        let mut sink = Command::new("sh");
        sink.arg("-c").arg("cat >/dev/null");
        pipe_through(sink, b"digraph {}\n").unwrap();
    }
}
