//! pkg-script: run a command as a build/lint/test script
//!
//! Usage: `pkg-script <build|lint|test|run> [quiet|--quiet|-q] -- <program> [args...]`

use anyhow::{bail, Context, Result};
use std::io;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use pkg_script::{ActivityKind, Reporting, ScriptConfig, ScriptContext, ScriptRunner, Shell};

const USAGE: &str = "usage: pkg-script <build|lint|test|run> [quiet] -- <program> [args...]";

/// Parsed command line
#[derive(Debug, PartialEq)]
struct Invocation {
    reporting: Reporting,
    flags: Vec<String>,
    program: String,
    program_args: Vec<String>,
}

fn parse_invocation(args: &[String]) -> Result<Invocation> {
    let Some((activity, rest)) = args.split_first() else {
        bail!(USAGE);
    };

    let reporting = match activity.as_str() {
        "run" => Reporting::Silent,
        other => Reporting::Announce(
            other
                .parse::<ActivityKind>()
                .map_err(anyhow::Error::msg)
                .context(USAGE)?,
        ),
    };

    let Some(separator) = rest.iter().position(|arg| arg == "--") else {
        bail!(USAGE);
    };
    let (flags, command) = rest.split_at(separator);
    let Some((program, program_args)) = command[1..].split_first() else {
        bail!(USAGE);
    };

    Ok(Invocation {
        reporting,
        flags: flags.to_vec(),
        program: program.clone(),
        program_args: program_args.to_vec(),
    })
}

/// Initialize logging with RUST_LOG environment variable support
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let invocation = parse_invocation(&args)?;

    let config = ScriptConfig::load()?;
    let start_dir = std::env::current_dir().context("Failed to read current directory")?;
    // Only the wrapper's own flags count towards quiet mode.
    let ctx = ScriptContext::new(start_dir, invocation.flags.clone());

    tracing::info!("Starting {} in {:?}", invocation.program, ctx.start_dir);

    let shell = Shell::new();
    let mut runner = ScriptRunner::from_config(&config, io::stdout());
    runner
        .run(&shell, &ctx, invocation.reporting, || async {
            shell
                .run_inherited(&invocation.program, &invocation.program_args)
                .await
                .map_err(anyhow::Error::from)
        })
        .await?;

    Ok(())
}
