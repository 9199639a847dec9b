use crate::cli::ExecArgs;
use crate::config::ProjectConfig;
use sqlparts::pg::row_values;
use sqlparts::{DialectKind, Executor, SqlError};

pub async fn run(args: ExecArgs) -> anyhow::Result<()> {
    let project = ProjectConfig::load(args.compile.config)?;
    let compiler = project.compiler()?;
    if compiler.dialect().kind() != DialectKind::Postgres {
        anyhow::bail!(
            "exec only supports postgres (config dialect: {})",
            compiler.dialect().name()
        );
    }
    let query = project.load_query(&args.compile.query)?;
    let url = project.database_url(args.database.as_deref())?;

    let (client, connection) = tokio_postgres::connect(&url, tokio_postgres::NoTls)
        .await
        .map_err(|e| anyhow::anyhow!("failed to connect to database: {e}"))?;
    tokio::spawn(async move {
        if let Err(e) = connection.await {
            tracing::error!(error = %e, "connection error");
        }
    });

    let exec = Executor::new(compiler, &client);

    if let Some(agg) = &args.compile.aggregate {
        match exec.aggregate(&agg.column, agg.func, &query).await {
            Ok(value) => println!("{}", serde_json::to_string(&value)?),
            Err(SqlError::NoData(_)) => println!("no data"),
            Err(e) => return Err(e.into()),
        }
        return Ok(());
    }

    let rows = exec.query_rows(&query).await?;
    for row in &rows {
        println!("{}", serde_json::to_string(&row_values(row)?)?);
    }
    println!("({} rows)", rows.len());
    Ok(())
}
