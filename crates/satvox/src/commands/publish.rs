//! Publish handler: fetch intents, build batches, push them to the broker.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use tracing::{debug, info};

use satvox_api::BrokerClient;
use satvox_core::{PublishReport, Publisher, SiteBatch};

use crate::cli::{GlobalOpts, PublishArgs};
use crate::error::CliError;
use crate::output;

use super::Workspace;

pub async fn handle(
    workspace: &Workspace,
    args: PublishArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let config = &workspace.config;

    // Startup: the catalog must load before any site is processed.
    if config.intents.enabled {
        let catalog = workspace.fetch_catalog().await?;
        for (intent, sentences) in &catalog.intents {
            debug!(intent = %intent, sentences = sentences.len(), "intent sentences");
        }
    }

    let batches = workspace.build_batches()?;

    let publisher_config = config.publisher_config(args.reset);
    let total = batches.iter().map(SiteBatch::len).sum::<usize>()
        + if args.reset { batches.len() } else { 0 };

    info!(
        host = %config.mqtt.host,
        port = config.mqtt.port,
        topic = %publisher_config.topic,
        messages = total,
        "publishing vocabularies"
    );

    let broker = BrokerClient::new(&config.broker_options());
    let publisher = Publisher::new(broker, publisher_config);

    let progress = progress_bar(total, global.quiet);
    let run = publisher.run(&batches, |sent| {
        if sent.reset {
            progress.set_message(format!("{} cleared", sent.site_id));
        } else {
            progress.set_message(format!("{} {}", sent.site_id, sent.text));
        }
        progress.inc(1);
    });

    let report = tokio::select! {
        result = run => result,
        _ = tokio::signal::ctrl_c() => {
            progress.abandon();
            return Err(CliError::Interrupted);
        }
    };

    match report {
        Ok(report) => {
            progress.finish_and_clear();
            print_report(&report, global)
        }
        Err(e) => {
            progress.abandon();
            Err(e.into())
        }
    }
}

fn progress_bar(total: usize, quiet: bool) -> ProgressBar {
    let pb = ProgressBar::new(u64::try_from(total).unwrap_or(u64::MAX));
    if quiet {
        pb.set_draw_target(ProgressDrawTarget::hidden());
        return pb;
    }
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {wide_msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb
}

fn print_report(report: &PublishReport, global: &GlobalOpts) -> Result<(), CliError> {
    let color = output::should_color(&global.color);
    let rendered = output::render_single(&global.output, report, |r| {
        let mut line = output::success(
            &format!("Published {} commands to {} site(s)", r.messages, r.sites),
            color,
        );
        if r.resets > 0 {
            line.push(' ');
            line.push_str(&output::muted(&format!("({} cleared first)", r.resets), color));
        }
        line
    })?;
    output::print_output(&rendered, global.quiet);
    Ok(())
}
