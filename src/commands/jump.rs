//! Jump command implementation

use crate::analysis::Direction;
use crate::cli::JumpArgs;
use crate::commands::{cursor, Context};
use crate::error::Result;
use crate::output::format_location;
use crate::session::Location;

/// Run the jump command
pub fn run(ctx: &Context, args: JumpArgs) -> Result<()> {
    let filename = ctx.load(&args.position.file)?;
    let direction = if args.back {
        Direction::Back
    } else {
        Direction::Forward
    };

    let mut span = cursor(&args.position);
    let mut moved = false;
    for _ in 0..args.steps {
        match ctx.session.jump(ctx.buffer(), &span, direction) {
            Some(next) => {
                span = next;
                moved = true;
            }
            None => break,
        }
    }

    let location = moved.then(|| Location {
        filename: Some(filename),
        span,
    });
    println!("{}", format_location(location.as_ref(), ctx.format));
    Ok(())
}
