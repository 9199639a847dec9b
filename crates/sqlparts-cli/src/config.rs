use serde::Deserialize;
use sqlparts::ident::check_ident;
use sqlparts::{Compiler, DialectKind, QueryArgs, WhereCompiler};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct ProjectConfig {
    pub config_path: PathBuf,
    pub file: ConfigFile,
}

impl ProjectConfig {
    pub fn load(config_path: PathBuf) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(&config_path).map_err(|e| {
            anyhow::anyhow!(
                "failed to read config file {}: {e}",
                config_path.display()
            )
        })?;

        let file = ConfigFile::parse(&raw).map_err(|e| {
            anyhow::anyhow!("invalid config file {}: {e:#}", config_path.display())
        })?;

        tracing::debug!(
            config = %config_path.display(),
            dialect = %file.database.dialect,
            "loaded config"
        );

        Ok(Self { config_path, file })
    }

    /// Compiler for the configured dialect and WHERE rules.
    pub fn compiler(&self) -> anyhow::Result<Compiler> {
        let compiler = Compiler::new(&self.file.database.dialect)?;
        Ok(match &self.file.compile.nullable_upper_bounds {
            Some(columns) => compiler.where_compiler(WhereCompiler::with_nullable_upper_bounds(
                columns.iter().map(String::as_str),
            )),
            None => compiler,
        })
    }

    /// Read a JSON query description; `-` reads stdin.
    ///
    /// A query without a table gets `compile.table`.
    pub fn load_query(&self, path: &Path) -> anyhow::Result<QueryArgs> {
        let raw = if path == Path::new("-") {
            std::io::read_to_string(std::io::stdin())
                .map_err(|e| anyhow::anyhow!("failed to read query from stdin: {e}"))?
        } else {
            std::fs::read_to_string(path)
                .map_err(|e| anyhow::anyhow!("failed to read query file {}: {e}", path.display()))?
        };
        self.parse_query(&raw)
            .map_err(|e| anyhow::anyhow!("invalid query {}: {e:#}", path.display()))
    }

    fn parse_query(&self, raw: &str) -> anyhow::Result<QueryArgs> {
        let mut args: QueryArgs = serde_json::from_str(raw)?;
        if args.table.is_empty() {
            let Some(table) = &self.file.compile.table else {
                anyhow::bail!("query has no table and compile.table is not set");
            };
            args.table = table.as_str().into();
        }
        // Identifiers are pasted into SQL as text.
        args.validate()?;
        Ok(args)
    }

    /// Connection string: `--database` wins over `database.url`.
    pub fn database_url(&self, cli_override: Option<&str>) -> anyhow::Result<String> {
        match cli_override.or(self.file.database.url.as_deref()) {
            Some(url) if !url.trim().is_empty() => Ok(url.to_string()),
            _ => anyhow::bail!(
                "no database url: pass --database or set database.url in {}",
                self.config_path.display()
            ),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub compile: CompileConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_dialect")]
    pub dialect: String,
    pub url: Option<String>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            dialect: default_dialect(),
            url: None,
        }
    }
}

fn default_dialect() -> String {
    DialectKind::Postgres.name().to_string()
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompileConfig {
    /// Table used when a query does not name one.
    pub table: Option<String>,
    /// Columns whose `<=` comparisons are null-guarded (default: `end_date`).
    pub nullable_upper_bounds: Option<Vec<String>>,
}

impl ConfigFile {
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        let mut file: ConfigFile =
            toml::from_str(raw).map_err(|e| anyhow::anyhow!("failed to parse TOML: {e}"))?;
        file.expand_env()?;
        file.validate()?;
        Ok(file)
    }

    fn expand_env(&mut self) -> anyhow::Result<()> {
        self.database.dialect = expand_env_vars(&self.database.dialect)?;
        if let Some(url) = self.database.url.as_mut() {
            *url = expand_env_vars(url)?;
        }
        if let Some(table) = self.compile.table.as_mut() {
            *table = expand_env_vars(table)?;
        }
        Ok(())
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.version.trim() != "1" {
            anyhow::bail!("unsupported config version: {}", self.version);
        }

        self.database.dialect.parse::<DialectKind>()?;

        if let Some(table) = &self.compile.table {
            check_ident("compile.table", table)?;
        }
        if let Some(columns) = &self.compile.nullable_upper_bounds {
            for c in columns {
                check_ident("compile.nullable_upper_bounds", c)?;
            }
        }

        Ok(())
    }
}

fn expand_env_vars(input: &str) -> anyhow::Result<String> {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '$' && chars.peek() == Some(&'{') {
            chars.next(); // consume '{'

            let mut key = String::new();
            let mut closed = false;
            for ch in chars.by_ref() {
                if ch == '}' {
                    closed = true;
                    break;
                }
                key.push(ch);
            }

            if !closed {
                anyhow::bail!("unterminated env var reference: ${{{key}");
            }
            if key.is_empty() {
                anyhow::bail!("invalid env var reference: ${{}}");
            }

            let v = std::env::var(&key)
                .map_err(|_| anyhow::anyhow!("missing env var for config expansion: {key}"))?;
            out.push_str(&v);
            continue;
        }

        out.push(c);
    }

    Ok(out)
}
