//! Outcome rendering for the terminal.

use crate::error::PipelineError;
use crate::pipeline::Outcome;

const NO_SCRIPT: &str = "(no script generated)";

const TROUBLESHOOTING: &str = "### Troubleshooting
- Make sure Excel is open with a workbook
- Check that cells/ranges exist
- Try a simpler command first";

fn seconds(outcome: &Outcome) -> String {
    format!("{:.1}", outcome.elapsed().as_secs_f64())
}

/// Markdown report: heading, result and script.
pub fn detail(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Success {
            result,
            script,
            source,
            ..
        } => {
            let mut out = format!("## ✅ Done ({}s)\n\n", seconds(outcome));
            if !result.is_empty() && result != "Done" {
                out.push_str(&format!("**Result:** `{}`\n\n", result));
            }
            out.push_str(&format!(
                "### Script Executed ({})\n```applescript\n{}\n```",
                source, script
            ));
            out
        }
        Outcome::Failed { error, script, .. } => format!(
            "## ❌ Error ({}s)\n\n```\n{}\n```\n\n### Script Attempted\n```applescript\n{}\n```\n\n{}",
            seconds(outcome),
            error,
            script.as_deref().unwrap_or(NO_SCRIPT),
            TROUBLESHOOTING
        ),
    }
}

/// One-line answer, for callers that only want a status.
pub fn brief(outcome: &Outcome, instruction: &str) -> String {
    match outcome {
        Outcome::Success { result, .. } => {
            let result = result.trim();
            if !result.is_empty() && result != "missing value" {
                format!("✓ Done. Result: {}", result)
            } else {
                format!("✓ Executed: \"{}\"", instruction)
            }
        }
        Outcome::Failed {
            error: PipelineError::ScriptReported(result),
            ..
        } => format!("❌ Failed: {}", result),
        Outcome::Failed { error, .. } => format!("Error: {}", error),
    }
}
