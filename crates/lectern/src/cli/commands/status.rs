//! Implementation of `lectern status`.

use std::process::ExitCode;

use lectern_config::discover_config_files;

use crate::cli::{
    context::CommandContext,
    output::{dim, header, subheader, warning},
};

/// Shows discovered configuration files, effective sources and validation warnings.
pub fn run(ctx: &CommandContext) -> ExitCode {
    let config_files = discover_config_files(&ctx.cwd);
    let config = &ctx.config;

    println!("{}", header("Configuration"));
    println!();

    if config_files.is_empty() {
        println!("{}", dim("No configuration files found."));
        println!();
        println!("Run 'lectern init' to create a configuration file.");
        return ExitCode::SUCCESS;
    }

    println!("{}", subheader("Config files (highest precedence first):"));
    for path in &config_files {
        println!("  {}", path.display());
    }
    println!();

    println!("{}", subheader("Sources:"));
    let base = config.search.base_path.as_deref().unwrap_or("(not set)");
    println!("  base_path  {base}");
    if let Some(url) = config.search.server_url.as_deref() {
        let timeout = format!("({} ms)", config.search.server_timeout_ms);
        println!("  server     {url} {}", dim(&timeout));
    }
    println!(
        "  stemming   {}",
        if config.search.stemming { "on" } else { "off" }
    );
    println!();

    println!("{}", subheader("Collections:"));
    if config.collections.is_empty() {
        println!("  {}", dim("(none defined)"));
    }
    for collection in &config.collections {
        let scope = if collection.is_global { "global" } else { "local" };
        let divisions = if collection.divisions.is_empty() {
            "all divisions".to_string()
        } else {
            collection.divisions.join(", ")
        };
        println!(
            "  {} {} {}",
            collection.id,
            dim(&format!("({scope})")),
            dim(&format!("-> {divisions}"))
        );
    }
    println!();

    let warnings = config.validate();
    if warnings.is_empty() {
        println!("{}", dim("No problems found."));
    } else {
        println!("{}", subheader("Warnings:"));
        for w in &warnings {
            println!("  {}", warning(&w.to_string()));
        }
    }

    ExitCode::SUCCESS
}
