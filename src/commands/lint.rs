//! Lint command implementation

use tracing::info;

use crate::cli::LintArgs;
use crate::commands::Context;
use crate::error::Result;
use crate::output::format_findings;

/// Run the lint command
pub fn run(ctx: &Context, args: LintArgs) -> Result<()> {
    let (label, findings) = match args.file {
        Some(file) => {
            let filename = ctx.load(&file)?;
            let snapshot = ctx.session.store().snapshot(ctx.buffer());
            let findings = snapshot.map(|s| s.findings.clone()).unwrap_or_default();
            (filename, findings)
        }
        None => {
            let result = ctx.session.project_diagnostics(&ctx.root)?;
            info!(root = %ctx.root.display(), findings = result.findings.len(), "Project diagnostics");
            (ctx.root.display().to_string(), result.findings)
        }
    };

    println!("{}", format_findings(&label, &findings, ctx.format));
    Ok(())
}
