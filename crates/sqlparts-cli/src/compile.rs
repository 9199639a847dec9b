use crate::cli::{AggregateSpec, CompileArgs};
use crate::config::ProjectConfig;
use sqlparts::{Compiled, Compiler, QueryArgs};

pub fn run(args: CompileArgs) -> anyhow::Result<()> {
    let project = ProjectConfig::load(args.config)?;
    let compiler = project.compiler()?;
    let query = project.load_query(&args.query)?;

    let compiled = compile(&compiler, &query, args.aggregate.as_ref());
    println!("{}", compiled.sql);
    println!("{}", serde_json::to_string(&compiled.args)?);
    Ok(())
}

/// Row query, or the aggregate when one was requested.
pub fn compile(compiler: &Compiler, query: &QueryArgs, aggregate: Option<&AggregateSpec>) -> Compiled {
    match aggregate {
        Some(agg) => compiler.compile_aggregate(&agg.column, agg.func, query),
        None => compiler.compile_query(query),
    }
}
