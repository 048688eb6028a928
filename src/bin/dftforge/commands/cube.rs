use anyhow::{Context, Result};
use tracing::info;

use crate::cli::CubeArgs;
use crate::display::{Context as DisplayContext, Progress};
use crate::io::read_values;

const TOTAL_STEPS: u8 = 3;

pub fn run_cube(args: CubeArgs, ctx: DisplayContext) -> Result<()> {
    let mut progress = Progress::new(ctx.interactive, TOTAL_STEPS);
    let mut system = super::build_system(&args.input, ctx, &mut progress)?;

    progress.step("Writing cube files");
    let predictions = read_values(&args.predictions)?;
    info!(count = predictions.len(), "read predictions");
    for value in predictions {
        system.store_output(value);
    }

    let (out_path, in_path) = system
        .write_cube(&args.base)
        .context("Failed to write cube files")?;
    progress.complete_step(
        "Writing cube files",
        &[
            format!("Predictions → {}", out_path.display()),
            format!("Density → {}", in_path.display()),
        ],
    );

    progress.finish();
    Ok(())
}
