use sqlparts::ident::check_ident;
use sqlparts::{AggFn, Column};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelpTopic {
    Root,
    Compile,
    Exec,
    Dialects,
}

#[derive(Debug, Clone)]
pub enum Command {
    Help(HelpTopic),
    Compile(CompileArgs),
    Exec(ExecArgs),
    Dialects,
}

/// `--aggregate <fn>:<column>`
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateSpec {
    pub func: AggFn,
    pub column: Column,
}

impl AggregateSpec {
    fn parse(s: &str) -> anyhow::Result<Self> {
        let Some((func, column)) = s.split_once(':') else {
            anyhow::bail!("--aggregate expects <fn>:<column>, got '{s}'");
        };
        let column = column.trim();
        check_ident("--aggregate column", column)?;
        Ok(Self {
            func: func.parse()?,
            column: Column::new(column),
        })
    }
}

#[derive(Debug, Clone)]
pub struct CompileArgs {
    pub config: PathBuf,
    /// JSON query file; `-` reads stdin.
    pub query: PathBuf,
    pub aggregate: Option<AggregateSpec>,
    pub verbose: bool,
}

#[derive(Debug, Clone)]
pub struct ExecArgs {
    pub compile: CompileArgs,
    pub database: Option<String>,
}

pub fn parse_args(args: &[String]) -> anyhow::Result<Command> {
    let mut it = args.iter().skip(1);
    let Some(first) = it.next() else {
        return Ok(Command::Help(HelpTopic::Root));
    };

    match first.as_str() {
        "-h" | "--help" => Ok(Command::Help(HelpTopic::Root)),
        "compile" => parse_compile(it.map(|s| s.as_str()), false),
        "exec" => parse_compile(it.map(|s| s.as_str()), true),
        "dialects" => {
            if it.any(|s| s == "-h" || s == "--help") {
                return Ok(Command::Help(HelpTopic::Dialects));
            }
            Ok(Command::Dialects)
        }
        _ => anyhow::bail!("unknown command: {first}"),
    }
}

fn parse_compile<'a>(mut it: impl Iterator<Item = &'a str>, exec: bool) -> anyhow::Result<Command> {
    let mut config = PathBuf::from("sqlparts.toml");
    let mut query: Option<PathBuf> = None;
    let mut aggregate: Option<AggregateSpec> = None;
    let mut database: Option<String> = None;
    let mut verbose = false;

    while let Some(token) = it.next() {
        match token {
            "-h" | "--help" => {
                return Ok(Command::Help(if exec {
                    HelpTopic::Exec
                } else {
                    HelpTopic::Compile
                }));
            }
            "-v" | "--verbose" => verbose = true,
            "--config" => {
                let Some(v) = it.next() else {
                    anyhow::bail!("--config requires a value");
                };
                config = PathBuf::from(v);
            }
            _ if token.starts_with("--config=") => {
                config = PathBuf::from(token.trim_start_matches("--config="));
            }
            "--query" => {
                let Some(v) = it.next() else {
                    anyhow::bail!("--query requires a value");
                };
                query = Some(PathBuf::from(v));
            }
            _ if token.starts_with("--query=") => {
                query = Some(PathBuf::from(token.trim_start_matches("--query=")));
            }
            "--aggregate" => {
                let Some(v) = it.next() else {
                    anyhow::bail!("--aggregate requires a value");
                };
                aggregate = Some(AggregateSpec::parse(v)?);
            }
            _ if token.starts_with("--aggregate=") => {
                aggregate = Some(AggregateSpec::parse(token.trim_start_matches("--aggregate="))?);
            }
            "--database" if exec => {
                let Some(v) = it.next() else {
                    anyhow::bail!("--database requires a value");
                };
                database = Some(v.to_string());
            }
            _ if exec && token.starts_with("--database=") => {
                database = Some(token.trim_start_matches("--database=").to_string());
            }
            other => anyhow::bail!("unexpected argument: {other}"),
        }
    }

    let Some(query) = query else {
        anyhow::bail!("--query is required");
    };

    let compile = CompileArgs {
        config,
        query,
        aggregate,
        verbose,
    };
    Ok(if exec {
        Command::Exec(ExecArgs { compile, database })
    } else {
        Command::Compile(compile)
    })
}

pub fn print_help(topic: HelpTopic) {
    match topic {
        HelpTopic::Root => {
            println!(
                "\
sqlparts - compile abstract query descriptions to parameterized SQL

USAGE:
  sqlparts <COMMAND> [OPTIONS]

COMMANDS:
  compile       Print the SQL and arguments for a JSON query
  exec          Run a JSON query against PostgreSQL
  dialects      List supported dialect names

Run `sqlparts <command> --help` for more."
            );
        }
        HelpTopic::Compile => {
            println!(
                "\
USAGE:
  sqlparts compile --query <FILE> [OPTIONS]

OPTIONS:
  --config <FILE>          Config file path (default: sqlparts.toml)
  --query <FILE>           JSON query description (`-` for stdin)
  --aggregate <FN:COLUMN>  Compile an aggregate instead (sum, count, avg, min, max)
  -v, --verbose            Log compiled statements to stderr
  -h, --help               Print help"
            );
        }
        HelpTopic::Exec => {
            println!(
                "\
USAGE:
  sqlparts exec --query <FILE> [OPTIONS]

OPTIONS:
  --config <FILE>          Config file path (default: sqlparts.toml)
  --database <URL>         Override database.url from config
  --query <FILE>           JSON query description (`-` for stdin)
  --aggregate <FN:COLUMN>  Run an aggregate instead (sum, count, avg, min, max)
  -v, --verbose            Log compiled statements to stderr
  -h, --help               Print help"
            );
        }
        HelpTopic::Dialects => {
            println!(
                "\
USAGE:
  sqlparts dialects

Prints every accepted value of database.dialect."
            );
        }
    }
}
