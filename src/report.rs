//! # Report Rendering
//!
//! Turning a [`CommandReport`] into the text block shown to the user: what
//! ran and where, stderr ahead of stdout (VCS clients put the interesting
//! failures there), and exit information only when something went wrong.
//!
//! Diff-shaped operations get special treatment: a clean exit with no output
//! means "no differences", which deserves saying explicitly rather than
//! printing an empty results section.

use crate::runner::CommandReport;

const HEADER: &str = "************************************************************";
const DIVIDER: &str = "============================================================";

/// Render a report as the standard block.
pub fn render(tool: &str, report: &CommandReport) -> String {
    if report.op.is_diff() && no_differences(report) {
        return render_no_differences(tool, report);
    }

    let mut out = String::new();
    out.push_str(HEADER);
    out.push('\n');
    out.push_str(&format!("Executing: {} {}\n", tool, report.args.join(" ")));
    out.push_str(&format!("In: {}\n", report.dir.display()));

    if report.timed_out {
        out.push_str("** Command timed out and was terminated **\n");
    }

    if !report.outcome.stderr.is_empty() {
        out.push_str("Errors/Warnings (stderr):\n\n");
        out.push_str(report.outcome.stderr.trim_end());
        out.push('\n');
        out.push_str(DIVIDER);
        out.push('\n');
    }

    out.push_str("Results (stdout):\n\n");
    if report.outcome.stdout.is_empty() {
        out.push_str("(no output)\n");
    } else {
        out.push_str(report.outcome.stdout.trim_end());
        out.push('\n');
    }

    if let Some(errno) = report.outcome.errno {
        out.push_str(&format!("Could not start command (os error {})\n", errno));
    } else if report.outcome.status.is_some_and(|code| code != 0) {
        out.push_str(&format!(
            "Command exited with status {}\n",
            report.outcome.status.unwrap_or_default()
        ));
    } else if report.outcome.status.is_none() && !report.timed_out {
        out.push_str("Command was terminated by a signal\n");
    }

    if let Some(hint) = &report.hint {
        out.push_str(&format!("hint: {}\n", hint));
    }
    out
}

/// A diff that produced nothing on a clean exit found no changes.
fn no_differences(report: &CommandReport) -> bool {
    report.success()
        && report.outcome.stdout.trim().is_empty()
        && report.outcome.stderr.trim().is_empty()
}

fn render_no_differences(tool: &str, report: &CommandReport) -> String {
    format!(
        "No differences found ({} {} in {})\n",
        tool,
        report.args.join(" "),
        report.dir.display()
    )
}
