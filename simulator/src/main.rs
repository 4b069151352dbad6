use anyhow::Context;
use clap::Parser;
use generator::profile::build_survey;
use std::path::PathBuf;
use workflow::config::WorkflowConfig;
use workflow::runner::Runner;
use workflow::survey::write_survey;

mod generator;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Two-pass swath beam-geometry recalculation driver")]
struct Args {
    /// Load a workflow config from YAML
    #[arg(long)]
    workflow: Option<PathBuf>,
    /// Survey to correct, one JSON record per line
    #[arg(long)]
    input: Option<PathBuf>,
    /// Write a synthetic survey to this path before correcting it
    #[arg(long)]
    generate: Option<PathBuf>,
    /// Half-space sound velocity when no profile file is given
    #[arg(long, default_value_t = 1500.0)]
    sound_velocity: f64,
    /// Two-column depth/velocity profile
    #[arg(long)]
    svp: Option<PathBuf>,
    /// Constant sensor time latency, seconds
    #[arg(long)]
    latency: Option<f64>,
    #[arg(long, default_value = "swath")]
    output: PathBuf,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let workflow_config = if let Some(path) = args.workflow {
        WorkflowConfig::load(path)?
    } else {
        WorkflowConfig::from_args(args.sound_velocity, args.svp, args.latency, args.output)
    };

    if let Some(path) = &args.generate {
        let profile = workflow_config.sound_velocity_profile()?;
        let records = build_survey(&workflow_config.generator, &profile)
            .context("generating synthetic survey")?;
        write_survey(path, &records)?;
        println!("Generated {} survey records -> {}", records.len(), path.display());
    }

    let input = args
        .input
        .or(args.generate)
        .context("no survey given; pass --input or --generate")?;

    let runner = Runner::new(workflow_config);
    let result = runner.execute(&input)?;

    println!(
        "Corrected {} pings -> valid beams {}, convergence failures {}, ray terminations {}, sensor gaps {}",
        result.pings,
        result.valid_beams,
        result.metrics.convergence_failures,
        result.metrics.ray_terminations,
        result.metrics.sensor_gaps
    );
    for path in &result.outputs {
        println!("  wrote {}", path.display());
    }

    Ok(())
}
