//! Project-wide commands: `namespaces` and `stats`

use crate::analysis::AnalysisSnapshot;
use crate::commands::Context;
use crate::error::Result;
use crate::output::{format_namespaces, format_stats};

pub fn namespaces(ctx: &Context) -> Result<()> {
    let mut namespaces = ctx.session.project_namespaces(&ctx.root)?;
    namespaces.sort_by(|a, b| a.name.cmp(&b.name));
    println!("{}", format_namespaces(&namespaces, ctx.format));
    Ok(())
}

pub fn stats(ctx: &Context) -> Result<()> {
    let snapshot = AnalysisSnapshot::build(ctx.session.project_analysis(&ctx.root)?);
    println!("{}", format_stats(&snapshot.stats(), ctx.format));
    Ok(())
}
