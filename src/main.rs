//! rc-handle-demo: run the ownership walkthroughs and log what they saw.

use anyhow::Context;
use clap::Parser;
use rc_handle::observability::{init_tracing, LogFormat};
use rc_handle::scenarios::Scenario;

#[derive(Parser, Debug)]
#[command(version, about = "Walk through owning/observing handle lifecycles")]
struct Cli {
    /// Scenario to run; all of them when omitted.
    #[arg(long, value_enum, env = "RC_HANDLE_SCENARIO")]
    scenario: Option<Scenario>,

    /// Log output format.
    #[arg(long, value_enum, env = "RC_HANDLE_LOG_FORMAT", default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    let selected: Vec<Scenario> = match cli.scenario {
        Some(s) => vec![s],
        None => Scenario::ALL.to_vec(),
    };

    for scenario in selected {
        let report = scenario
            .run()
            .with_context(|| format!("scenario {} failed", scenario.name()))?;
        tracing::info!(scenario = scenario.name(), report = ?report, "scenario finished");
    }
    Ok(())
}
