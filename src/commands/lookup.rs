//! Position lookups: `at`, `usages` and `definition`

use crate::cli::PositionArgs;
use crate::commands::{cursor, Context};
use crate::error::Result;
use crate::output::{format_location, format_occurrences, format_thingy};

pub fn at(ctx: &Context, args: PositionArgs) -> Result<()> {
    ctx.load(&args.file)?;
    let thingy = ctx.session.thingy_at(ctx.buffer(), &cursor(&args));
    println!("{}", format_thingy(thingy.as_ref(), ctx.format));
    Ok(())
}

pub fn usages(ctx: &Context, args: PositionArgs) -> Result<()> {
    ctx.load(&args.file)?;
    let occurrences = ctx.session.find_usages(ctx.buffer(), &cursor(&args));
    println!("{}", format_occurrences(occurrences.as_ref(), ctx.format));
    Ok(())
}

pub fn definition(ctx: &Context, args: PositionArgs) -> Result<()> {
    let filename = ctx.load(&args.file)?;
    let mut location =
        ctx.session
            .locate_definition(ctx.buffer(), &cursor(&args), &ctx.root, &filename);

    // Definitions found in the buffer itself carry no filename
    if let Some(location) = location.as_mut() {
        location.filename.get_or_insert(filename);
    }
    println!("{}", format_location(location.as_ref(), ctx.format));
    Ok(())
}
