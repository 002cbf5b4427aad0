use anyhow::{anyhow, Context};
use clap::Parser;
use tracing_subscriber::prelude::*;
use tracing::level_filters::LevelFilter;
use odl_lab_lib::actions;
use odl_lab_lib::OdlController;
use odl_lab_schemas::cli_models::{Opts, SubCommand};
use odl_lab_schemas::settings::LabConfig;
use tokio_util::sync::CancellationToken;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    std::process::exit(match run_app().await {
        Ok(_) => 0,
        Err(err) => {
            tracing::error!("ERROR: {}", err);
            err.chain().skip(1).for_each(|cause| tracing::error!("because: {}", cause));
            1
        }
    });
}

fn log_level(s: &str) -> anyhow::Result<LevelFilter> {
    match s.to_lowercase().as_str() {
        "error" => Ok(LevelFilter::ERROR),
        "warn" => Ok(LevelFilter::WARN),
        "info" => Ok(LevelFilter::INFO),
        "debug" => Ok(LevelFilter::DEBUG),
        "trace" => Ok(LevelFilter::TRACE),
        _ => Err(anyhow!("Unknown Log LevelFilter {}", s)),
    }
}

/// Parse the CLI options, set up logging and run the command
pub async fn run_app() -> anyhow::Result<()> {
    let opts: Opts = Opts::parse();
    let mut e = None;
    let level = match &opts.verbosity {
        None => LevelFilter::INFO,
        Some(x) => match log_level(x) {
            Ok(l) => l,
            Err(err) => {
                e = Some(err);
                LevelFilter::INFO
            }
        },
    };

    // logs go to stderr so command output on stdout can be piped
    let stderr_log = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
    tracing_subscriber::registry()
        .with(stderr_log.with_filter(level))
        .init();
    if let Some(e) = e {
        tracing::warn!("{}", e);
    }

    parse_command(opts).await
}

/// This is the entrypoint for all commands
pub async fn parse_command(opts: Opts) -> anyhow::Result<()> {
    let cmd_name = opts.sub_command.name();
    tracing::debug!("running {cmd_name} command");

    let mut config = LabConfig::read(opts.config.as_deref()).await
        .context("reading lab config")?;
    config.apply_overrides(&opts.connection);
    tracing::trace!("lab config = {config}");

    let controller = OdlController::new(config.controller.clone())
        .context("creating controller client")?;

    // ctrl-c stops whatever command is running
    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupted, cancelling");
            ctrl_c.cancel();
        }
    });

    let command = async {
        match &opts.sub_command {
            SubCommand::Wait(wait_cmd) => {
                let discovery = actions::discovery_config(&config.discovery, wait_cmd);
                actions::wait_action(&controller, &discovery, &cancel).await
                    .map(|found| tracing::info!("{} is ready with {} nodes and {} links", found.topology_id, found.nodes, found.links))
            }
            SubCommand::Topology => actions::topology_action(&controller).await,
            SubCommand::Nodes => actions::nodes_action(&controller).await,
            SubCommand::Connectors(arg) => actions::connectors_action(&controller, &arg.node).await,
            SubCommand::Flows(arg) => actions::flows_action(&controller, &arg.node).await,
            SubCommand::Stats(arg) => actions::stats_action(&controller, &arg.node).await,
            SubCommand::InstallFlow(install_cmd) => actions::install_flow_action(&controller, install_cmd).await
                .map(|flow_id| println!("{flow_id}")),
            SubCommand::DeleteFlow(delete_cmd) => actions::delete_flow_action(&controller, delete_cmd).await,
            SubCommand::Demo(wait_cmd) => {
                let discovery = actions::discovery_config(&config.discovery, wait_cmd);
                actions::demo_action(&controller, &discovery, &cancel).await
                    .map(|report| tracing::info!("demo finished: {report:?}"))
            }
        }
    };
    let sub_command = actions::until_cancelled(&cancel, command).await;
    sub_command
        .with_context(|| format!("running {cmd_name} command"))?;
    Ok(())
}
