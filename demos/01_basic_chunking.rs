//! Basic Section Chunking
//!
//! The minimal example: restore a numbered document's outline and chunk it
//! for embedding.
//!
//! ```bash
//! RUST_LOG=strata=debug cargo run --example 01_basic_chunking
//! ```

use strata::{ChunkingConfig, ChunkingPipeline};
use tracing_subscriber::EnvFilter;

fn main() -> strata::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let document = "Data Handling Policy\n\
        1) Scope\n\
        \tThis policy applies to all staff and contractors.\n\
        2) Requirements\n\
        \t1) Storage\n\
        \t\ta) Records are kept for five years.\n\
        \t\tb) Backups are encrypted at rest.\n\
        \t2) Access\n\
        \t\tAccess is granted per role.\n\
        \t\t- read-only for auditors\n\
        \t\t- read-write for owners\n\
        3) Definitions\n\
        \tRecord means any stored document.";

    let pipeline = ChunkingPipeline::new(ChunkingConfig::new(2, 200))?;
    let doc = pipeline.process(document);

    println!("Sections: {}, depth {}", doc.outline.len(), doc.outline.depth());
    println!("Chunks: {}\n", doc.chunks.len());

    for chunk in &doc.chunks {
        let path: Vec<&str> = chunk
            .parent_path
            .iter()
            .flatten()
            .map(|p| p.title.as_str())
            .collect();
        println!("[{}] {} chars, under {:?}", chunk.id, chunk.char_length, path);
        println!("{}\n", chunk.text);
    }

    // Each chunk is one section with its subsections, small enough to embed
    // and labelled with where it sits in the document.
    Ok(())
}
