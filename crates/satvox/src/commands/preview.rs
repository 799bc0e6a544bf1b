//! Preview handler: build and validate batches without broker I/O.

use serde::Serialize;
use tabled::Tabled;

use satvox_core::SiteBatch;

use crate::cli::{GlobalOpts, PreviewArgs};
use crate::error::CliError;
use crate::output;

use super::Workspace;

#[derive(Serialize)]
struct PreviewEntry<'a> {
    site: &'a str,
    index: usize,
    text: &'a str,
    phonetic: &'a str,
}

#[derive(Tabled)]
struct PreviewRow {
    #[tabled(rename = "Site")]
    site: String,
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Phrase")]
    text: String,
    #[tabled(rename = "Phonetic")]
    phonetic: String,
}

pub fn handle(workspace: &Workspace, args: &PreviewArgs, global: &GlobalOpts) -> Result<(), CliError> {
    // Every site is validated even when only one is shown.
    let batches = workspace.build_batches()?;
    let selected = select(&batches, args.site.as_deref())?;

    let entries: Vec<PreviewEntry<'_>> = selected
        .iter()
        .flat_map(|batch| {
            batch
                .entries()
                .iter()
                .enumerate()
                .map(|(i, entry)| PreviewEntry {
                    site: batch.site_id(),
                    index: i + 1,
                    text: &entry.text,
                    phonetic: &entry.phonetic,
                })
        })
        .collect();

    let rendered = output::render_list(
        &global.output,
        &entries,
        |e| PreviewRow {
            site: e.site.to_owned(),
            index: e.index,
            text: e.text.to_owned(),
            phonetic: e.phonetic.to_owned(),
        },
        |e| format!("{}\t{}\t{}", e.site, e.text, e.phonetic),
    )?;
    output::print_output(&rendered, global.quiet);
    Ok(())
}

fn select<'a>(batches: &'a [SiteBatch], site: Option<&str>) -> Result<Vec<&'a SiteBatch>, CliError> {
    let Some(site) = site else {
        return Ok(batches.iter().collect());
    };

    match batches.iter().find(|b| b.site_id() == site) {
        Some(batch) => Ok(vec![batch]),
        None => Err(CliError::SiteNotFound {
            site: site.to_owned(),
            available: batches
                .iter()
                .map(SiteBatch::site_id)
                .collect::<Vec<_>>()
                .join(", "),
        }),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn batches() -> Vec<SiteBatch> {
        vec![
            SiteBatch::from_parts("kitchen", vec!["a".into()], vec!["A".into()]).unwrap(),
            SiteBatch::from_parts("porch", vec!["b".into()], vec!["B".into()]).unwrap(),
        ]
    }

    #[test]
    fn select_all_without_filter() {
        let batches = batches();
        assert_eq!(select(&batches, None).unwrap().len(), 2);
    }

    #[test]
    fn select_unknown_site_lists_available() {
        let batches = batches();
        let err = select(&batches, Some("attic")).unwrap_err();
        assert!(
            matches!(err, CliError::SiteNotFound { ref available, .. } if available == "kitchen, porch"),
            "got {err:?}"
        );
    }
}
