//! Outline Queries
//!
//! Navigate a reconstructed outline: levels, section context, and the repairs
//! made to messy numbering.
//!
//! ```bash
//! cargo run --example outline_queries
//! ```

use strata::{ChunkingConfig, HierarchyParser};
use tracing_subscriber::EnvFilter;

fn main() -> strata::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("strata=debug"))
        .init();

    // "1.1" is never written and the second "1)" restarts the count.
    let document = "1. General\n\
        1.1.1 Purpose\n\
        \tSets out the rules.\n\
        2. Obligations\n\
        \t1) Notify the owner\n\
        \t1) Keep a log\n\
        3. Annex";

    let parser = HierarchyParser::new(ChunkingConfig::default())?;
    let outline = parser.parse(document);

    println!("Outline:");
    for node in &outline {
        let indent = "  ".repeat(node.level - 1);
        let marker = if node.is_placeholder() { " (placeholder)" } else { "" };
        println!("{indent}{} {}{marker}", node.number, node.title);
    }

    println!("\nLevel 2:");
    for node in outline.sections_at_level(2) {
        println!("  {}", node.number);
    }

    if let Ok(ctx) = outline.section_context("2.2") {
        println!("\nSection {} '{}' under '{}'", ctx.number, ctx.title, ctx.parent_title());
        for sibling in &ctx.siblings {
            println!("  sibling {} {}", sibling.number, sibling.title);
        }
    }

    let diagnostics = outline.diagnostics();
    println!("\nPlaceholders inserted: {}", diagnostics.synthetic_ancestors_inserted);
    for issue in &diagnostics.malformed {
        println!("  {issue}");
    }

    match outline.section_context("9") {
        Ok(_) => println!("unexpected section 9"),
        Err(e) => println!("\nLookup failed: {e}"),
    }
    Ok(())
}
