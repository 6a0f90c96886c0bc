//! Turn what a test case process printed into a [CaseOutcome].
//!
//! A test case may print a single JSON object as its last non-empty line of stdout. On success
//! that object is the result document. On failure it may describe a backend error with a numeric
//! `code`, a `name` (or `codeName`) and a `message` (or `errmsg`).

use dance_core::prelude::{CaseOutcome, CommandError, Document, Failure, Value};

use crate::process::ProcessOutput;

/// Lines of stderr kept in a [Failure::NonZeroExit].
const STDERR_TAIL_LINES: usize = 20;

pub(crate) fn outcome_from_output(output: &ProcessOutput) -> CaseOutcome {
    let payload = last_json_object(&output.stdout);

    if output.success {
        return match payload {
            // A reply with `ok: 0` is an error even if the process itself exited cleanly.
            Some(doc) if is_error_reply(&doc) => match command_error(&doc) {
                Some(err) => CaseOutcome::Failed(Failure::Command(err)),
                None => CaseOutcome::Succeeded(doc),
            },
            Some(doc) => CaseOutcome::Succeeded(doc),
            None => CaseOutcome::Succeeded(Document::new()),
        };
    }

    match payload.as_ref().and_then(command_error) {
        Some(err) => CaseOutcome::Failed(Failure::Command(err)),
        None => CaseOutcome::Failed(Failure::NonZeroExit {
            code: output.code,
            stderr: stderr_tail(&output.stderr),
        }),
    }
}

fn last_json_object(stdout: &str) -> Option<Document> {
    let line = stdout.lines().rev().find(|l| !l.trim().is_empty())?;

    let json: serde_json::Value = serde_json::from_str(line.trim()).ok()?;
    Document::from_json(json)
}

fn is_error_reply(doc: &Document) -> bool {
    match doc.get("ok") {
        Some(Value::Int32(0)) | Some(Value::Int64(0)) | Some(Value::Bool(false)) => true,
        Some(Value::Double(d)) => *d == 0.0,
        _ => false,
    }
}

fn command_error(doc: &Document) -> Option<CommandError> {
    let code = match doc.get("code")? {
        Value::Int32(c) => *c,
        Value::Int64(c) => i32::try_from(*c).ok()?,
        Value::Double(c)
            if c.fract() == 0.0 && (f64::from(i32::MIN)..=f64::from(i32::MAX)).contains(c) =>
        {
            *c as i32
        }
        _ => return None,
    };
    let name = string_field(doc, &["name", "codeName"])?;
    let message = string_field(doc, &["message", "errmsg"])?;

    Some(CommandError::new(code, name, message))
}

fn string_field(doc: &Document, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match doc.get(key) {
        Some(Value::String(s)) => Some(s.clone()),
        _ => None,
    })
}

fn stderr_tail(stderr: &str) -> String {
    let lines: Vec<&str> = stderr.trim_end().lines().collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);

    lines[start..].join("\n")
}
