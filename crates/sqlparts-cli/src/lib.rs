mod cli;
mod compile;
mod config;
mod exec;

use sqlparts::DialectKind;

pub async fn run(args: Vec<String>) -> anyhow::Result<()> {
    let cmd = cli::parse_args(&args)?;
    match cmd {
        cli::Command::Help(topic) => {
            cli::print_help(topic);
            Ok(())
        }
        cli::Command::Dialects => {
            for name in DialectKind::NAMES {
                println!("{name}");
            }
            Ok(())
        }
        cli::Command::Compile(args) => {
            init_logging(args.verbose);
            compile::run(args)
        }
        cli::Command::Exec(args) => {
            init_logging(args.compile.verbose);
            exec::run(args).await
        }
    }
}

/// Log to stderr; `RUST_LOG` wins over `--verbose`.
fn init_logging(verbose: bool) {
    let default = if verbose { "sqlparts=debug" } else { "warn" };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .try_init();
}
