//! Implementation of `lectern sections`.

use std::process::ExitCode;

use crate::cli::{
    args::SectionsCommand,
    context::{CommandContext, runtime},
    output::output_sections,
};

/// Prints a collection's sections and fragment counts.
pub fn run(ctx: &CommandContext, cmd: &SectionsCommand) -> ExitCode {
    let store = match ctx.shard_store() {
        Ok(store) => store,
        Err(code) => return code,
    };
    let runtime = match runtime() {
        Ok(runtime) => runtime,
        Err(code) => return code,
    };

    let info = runtime.block_on(store.collection_info(&cmd.collection));
    if info.sections.is_empty() {
        eprintln!(
            "error: no section metadata for collection '{}'",
            cmd.collection
        );
        return ExitCode::FAILURE;
    }

    output_sections(&info, cmd.json)
}
