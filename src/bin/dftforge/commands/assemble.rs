use std::io::Write;

use anyhow::{Context, Result, bail};

use crate::cli::AssembleArgs;
use crate::display::{Context as DisplayContext, Progress};
use crate::io::{create_output, stdout_is_tty};

const TOTAL_STEPS: u8 = 3;

pub fn run_assemble(args: AssembleArgs, ctx: DisplayContext) -> Result<()> {
    if args.output.is_none() && stdout_is_tty() {
        bail!(
            "No output file specified and stdout is a terminal.\n\n\
             Usage: dftforge assemble -c <PARAMS> -o <OUTPUT> or pipe output."
        );
    }

    let mut progress = Progress::new(ctx.interactive, TOTAL_STEPS);
    let system = super::build_system(&args.input, ctx, &mut progress)?;

    progress.step("Writing example");
    let mut writer = create_output(args.output.as_deref())?;
    serde_json::to_writer_pretty(&mut writer, &system.example())
        .context("Failed to serialize example")?;
    writeln!(writer).context("Failed to write example")?;
    writer.flush().context("Failed to write example")?;

    let target = args
        .output
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "stdout".to_string());
    progress.complete_step("Writing example", &[format!("Write JSON → {target}")]);

    progress.finish();
    Ok(())
}
