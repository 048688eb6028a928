mod assemble;
mod cube;

use assemble::run_assemble;
use cube::run_cube;

use anyhow::{Context, Result};

use dft_forge::System;

use crate::cli::{Command, InputOptions};
use crate::config::{build_file_map, load_params};
use crate::display::{
    Context as DisplayContext, Progress, print_example_summary, print_feature_table,
};

pub fn dispatch(command: Command, ctx: DisplayContext) -> Result<()> {
    match command {
        Command::Assemble(args) => run_assemble(args, ctx),
        Command::Cube(args) => run_cube(args, ctx),
    }
}

/// Loads the configuration and assembles one example; shared by every
/// command.
fn build_system(
    opts: &InputOptions,
    ctx: DisplayContext,
    progress: &mut Progress,
) -> Result<System> {
    progress.step("Loading configuration");
    let params = load_params(&opts.config)?;
    let files = build_file_map(opts)?;
    let code = files.code().unwrap_or("?").to_string();
    progress.complete_step(
        "Loading configuration",
        &[
            format!("{} inputs → target '{}'", params.inputs.len(), params.output),
            format!("{} file roles, code '{code}'", files.len()),
        ],
    );

    progress.step("Assembling example");
    let system = System::build(&files, &params).context("Failed to assemble example")?;
    let details: Vec<String> = system
        .features()
        .map(|f| format!("{} ({} values)", f.name, f.values.len()))
        .collect();
    progress.complete_step("Assembling example", &details);

    if ctx.interactive {
        print_example_summary(&system, &code);
        print_feature_table(&system);
    }

    Ok(system)
}
