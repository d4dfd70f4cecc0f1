use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tnsconnect::{
    CloudConfig, ConnectParams, Defaults, DescriptionList, DriverMode, ParamName, ParamsUpdate,
    Sources,
};

#[derive(Parser, Debug)]
#[command(name = "tnsconnect")]
#[command(about = "Resolve Oracle Database connect strings and aliases", long_about = None)]
#[command(version)]
struct Args {
    /// Directory holding tnsnames.ora
    #[arg(long, global = true, env = "TNS_ADMIN")]
    config_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable JSON logging output
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve a connect string, alias or DSN and print the result
    Resolve {
        /// Easy Connect string, descriptor, alias or user/password@dsn
        dsn: Option<String>,

        /// JSON or TOML configuration file applied after the connect string
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Parameter override as name=value (repeatable)
        #[arg(short, long = "set", value_name = "NAME=VALUE")]
        overrides: Vec<String>,

        /// Report parameters the given client mode ignores
        #[arg(long, value_enum, default_value_t = Mode::Thin)]
        mode: Mode,

        /// Print the full resolution as JSON instead of the descriptor
        #[arg(long)]
        json: bool,
    },
    /// List the aliases defined in tnsnames.ora
    Names,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Mode {
    Thin,
    Thick,
}

impl From<Mode> for DriverMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Thin => Self::Thin,
            Mode::Thick => Self::Thick,
        }
    }
}

#[derive(Serialize)]
struct Resolution<'a> {
    user: Option<&'a str>,
    proxy_user: Option<&'a str>,
    connect_string: String,
    description_list: &'a DescriptionList,
    ignored: Vec<&'static str>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose, args.json_logs);

    let mut defaults = Defaults::from_env();
    if let Some(dir) = args.config_dir {
        defaults = defaults.with_config_dir(dir);
    }

    match args.command {
        Command::Resolve {
            dsn,
            config,
            overrides,
            mode,
            json,
        } => {
            let config = config
                .map(|path| CloudConfig::load(&path))
                .transpose()
                .context("failed to load configuration")?;
            let update = parse_overrides(&overrides)?;
            let params = resolve(defaults, dsn.as_deref(), config.as_ref(), update)?;
            print_resolution(&params, mode.into(), json)?;
        }
        Command::Names => {
            let params = ConnectParams::new(defaults);
            for name in params.get_network_service_names()? {
                println!("{name}");
            }
        }
    }
    Ok(())
}

fn init_logging(verbose: bool, json_logs: bool) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;
    use tracing_subscriber::{EnvFilter, Layer};

    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let fmt_layer = if json_logs {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

fn parse_overrides(overrides: &[String]) -> anyhow::Result<Option<ParamsUpdate>> {
    if overrides.is_empty() {
        return Ok(None);
    }
    let mut update = ParamsUpdate::new();
    for item in overrides {
        let (name, value) = item
            .split_once('=')
            .with_context(|| format!("expected NAME=VALUE, got \"{item}\""))?;
        let name: ParamName = name.trim().parse()?;
        update = update.with_text(name, value.trim())?;
    }
    Ok(Some(update))
}

fn resolve(
    defaults: Defaults,
    dsn: Option<&str>,
    config: Option<&CloudConfig>,
    update: Option<ParamsUpdate>,
) -> anyhow::Result<ConnectParams> {
    let params = ConnectParams::resolve(
        defaults,
        Sources {
            connect_string: dsn,
            config,
            update,
        },
    )
    .context("failed to resolve connect parameters")?;
    tracing::debug!(?params, "resolved connect parameters");
    Ok(params)
}

fn print_resolution(params: &ConnectParams, mode: DriverMode, json: bool) -> anyhow::Result<()> {
    let ignored: Vec<&'static str> = params
        .ignored_fields(mode)
        .into_iter()
        .map(ParamName::as_str)
        .collect();

    if json {
        let resolution = Resolution {
            user: params.user(),
            proxy_user: params.proxy_user(),
            connect_string: params.get_connect_string(),
            description_list: params.description_list(),
            ignored,
        };
        println!("{}", serde_json::to_string_pretty(&resolution)?);
    } else {
        println!("{}", params.get_connect_string());
        for name in ignored {
            tracing::warn!(parameter = name, "ignored in {mode:?} mode");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;
    use tnsconnect::OneOrMany;

    use super::*;

    #[test]
    fn test_args_parse() {
        let args = Args::try_parse_from([
            "tnsconnect",
            "resolve",
            "dbhost/svc",
            "--set",
            "retry_count=3",
            "--mode",
            "thick",
        ])
        .unwrap();
        let Command::Resolve {
            dsn, overrides, ..
        } = args.command
        else {
            panic!("expected resolve");
        };
        assert_eq!(dsn.as_deref(), Some("dbhost/svc"));
        assert_eq!(overrides, ["retry_count=3"]);
    }

    #[test]
    fn test_parse_overrides() {
        let update = parse_overrides(&["expire_time = 4".to_string()])
            .unwrap()
            .unwrap();
        let mut params = ConnectParams::new(Defaults::default());
        params.set(update).unwrap();
        assert_eq!(params.expire_time(), OneOrMany::Scalar(4));

        assert!(parse_overrides(&[]).unwrap().is_none());
        assert!(parse_overrides(&["no_equals".to_string()]).is_err());
        assert!(parse_overrides(&["bogus=1".to_string()]).is_err());
    }

    #[test]
    fn test_resolve_dsn_and_overrides() {
        let update = parse_overrides(&["port=1600".to_string()]).unwrap();
        let params = resolve(
            Defaults::default(),
            Some("scott/tiger@dbhost:1521/svc"),
            None,
            update,
        )
        .unwrap();
        assert_eq!(params.user(), Some("scott"));
        assert_eq!(params.port(), OneOrMany::Scalar(1600));
    }

    #[test]
    fn test_resolve_alias_from_config_dir() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("tnsnames.ora"), "SALES = sales-host/sales\n").unwrap();
        let defaults = Defaults::default().with_config_dir(dir.path());

        let params = resolve(defaults, Some("sales"), None, None).unwrap();
        assert_eq!(params.host(), OneOrMany::Scalar("sales-host".to_string()));
    }
}
