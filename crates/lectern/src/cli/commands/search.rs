//! Implementation of `lectern search`.

use std::process::ExitCode;

use lectern_index::SearchRequest;
use tracing::info;

use crate::cli::{
    args::SearchCommand,
    context::{CommandContext, runtime},
    output::{LogReporter, output_search_results},
};

/// Runs one search end to end and prints the verified fragments.
pub fn run(ctx: &CommandContext, cmd: &SearchCommand) -> ExitCode {
    let engine = match ctx.engine() {
        Ok(engine) => engine,
        Err(code) => return code,
    };
    let runtime = match runtime() {
        Ok(runtime) => runtime,
        Err(code) => return code,
    };

    let divisions = ctx.divisions(&cmd.collection, &cmd.divisions);
    let request = SearchRequest::new(&cmd.collection, cmd.query_text()).with_divisions(divisions);
    info!(
        collection = %request.collection_id,
        query = %request.query,
        divisions = ?request.divisions.codes(),
        "searching"
    );

    let outcome = match runtime.block_on(engine.run(&request, &mut LogReporter)) {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("error: search failed: {e}");
            return ExitCode::FAILURE;
        }
    };

    output_search_results(
        &outcome,
        &request.query,
        cmd.output.mode(),
        &ctx.config.search.highlight_class,
    )
}
