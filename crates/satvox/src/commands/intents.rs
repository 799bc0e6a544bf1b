//! Intents handler: show the remote intent catalog.

use tabled::Tabled;

use satvox_core::IntentCatalog;

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

use super::Workspace;

#[derive(Tabled)]
struct CatalogRow {
    #[tabled(rename = "Kind")]
    kind: &'static str,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Values")]
    values: String,
}

pub async fn handle(workspace: &Workspace, global: &GlobalOpts) -> Result<(), CliError> {
    let catalog = workspace.fetch_catalog().await?;
    let rendered = match global.output {
        OutputFormat::Table => output::render_table(&rows(&catalog)),
        OutputFormat::Plain => rows(&catalog)
            .iter()
            .map(|r| format!("{}\t{}\t{}", r.kind, r.name, r.values))
            .collect::<Vec<_>>()
            .join("\n"),
        _ => output::render_single(&global.output, &catalog, |_| String::new())?,
    };
    output::print_output(&rendered, global.quiet);
    Ok(())
}

fn rows(catalog: &IntentCatalog) -> Vec<CatalogRow> {
    let intents = catalog.intents.iter().flat_map(|(intent, sentences)| {
        sentences.iter().map(move |s| CatalogRow {
            kind: "sentence",
            name: intent.clone(),
            values: s.clone(),
        })
    });
    let expansions = catalog.expansions.iter().map(|(token, alternatives)| CatalogRow {
        kind: "expansion",
        name: token.clone(),
        values: alternatives.join(" | "),
    });
    intents.chain(expansions).collect()
}
