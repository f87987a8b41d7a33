use clap::Parser;
use filter_targets::{require_targets, TargetError, Targets};
use ftargets::cli::Cli;
use ftargets::constants::load_constants;
use ftargets::output::Output;

fn main() -> anyhow::Result<()> {
    // Reset SIGPIPE handler to default (terminate) so piping to head/tail works correctly
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    let cli = Cli::parse();

    let use_color = !cli.no_color && atty::is(atty::Stream::Stdout);
    let mut output = Output::new(use_color);

    let filter = filter_expr::parse(&cli.filter).map_err(ftargets::error::Error::from)?;
    let constants = load_constants(&cli.defines, cli.constants_file.as_deref())?;
    // No definitions at all means no constant table, not an empty one.
    let constants = (!constants.is_empty()).then_some(&constants);

    let targets = match cli.kind {
        Some(kind) => require_targets(&filter, constants, kind)?,
        None => Targets::extract(&filter, constants)
            .ok_or_else(|| TargetError::NoTargets(filter.to_string()))?,
    };

    if cli.json {
        output.print_json(&targets)?;
    } else {
        output.print_targets(&targets)?;
    }

    Ok(())
}
