use anyhow::{bail, Context};
use elasticache_session::cluster::NodeList;
use elasticache_session::logging::{self, LogFormat};
use elasticache_session::{
    ClientConfig, ElasticacheSessionManager, ResolvedClusterConfig, SessionManager, Settings,
    StrategyRegistry,
};
use tracing::info;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Command line arguments structure
#[derive(Default)]
struct CliArgs {
    config_path: Option<String>,
    nodes: Option<String>,
    load_balancer: Option<String>,
    log_format: Option<LogFormat>,
    json: bool,
    show_help: bool,
    show_version: bool,
}

fn print_help() {
    println!(
        "elasticache-session v{} - ElastiCache session-store configurator",
        VERSION
    );
    println!();
    println!("USAGE:");
    println!("    elasticache-session [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    -c, --config <FILE>          Path to settings file (TOML format)");
    println!("    -n, --nodes <NODES>          Space-separated node list, overrides the file");
    println!("    -l, --load-balancer <NAME>   Load balancer name (\"\" for runtime default)");
    println!("        --log-format <FORMAT>    Log output format: text or json");
    println!("        --json                   Print the resolved configuration as JSON");
    println!("    -h, --help                   Print help information");
    println!("    -v, --version                Print version information");
    println!();
    println!("EXAMPLES:");
    println!("    elasticache-session -c config/elasticache.toml");
    println!("    elasticache-session -n \"node1.com:6379 node2.com:6379\" -l random");
    println!();
    println!("LOAD BALANCERS:");
    for name in StrategyRegistry::with_defaults().names() {
        println!("    {}", name);
    }
}

fn next_value(args: &[String], i: usize, what: &str) -> anyhow::Result<String> {
    match args.get(i + 1) {
        Some(value) => Ok(value.clone()),
        None => bail!("{} requires {} argument", args[i], what),
    }
}

/// Parse command line arguments
fn parse_args(args: &[String]) -> anyhow::Result<CliArgs> {
    let mut cli = CliArgs::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                cli.show_help = true;
                return Ok(cli);
            }
            "-v" | "--version" => {
                cli.show_version = true;
                return Ok(cli);
            }
            "-c" | "--config" => {
                cli.config_path = Some(next_value(args, i, "a file path")?);
                i += 1;
            }
            "-n" | "--nodes" => {
                cli.nodes = Some(next_value(args, i, "a node list")?);
                i += 1;
            }
            "-l" | "--load-balancer" => {
                cli.load_balancer = Some(next_value(args, i, "a name")?);
                i += 1;
            }
            "--log-format" => {
                let value = next_value(args, i, "a format")?;
                match LogFormat::parse(&value) {
                    Some(format) => cli.log_format = Some(format),
                    None => bail!("Invalid log format '{}'. Expected text or json.", value),
                }
                i += 1;
            }
            "--json" => cli.json = true,
            arg => bail!("Unknown option '{}'. Use --help for usage.", arg),
        }
        i += 1;
    }

    Ok(cli)
}

/// Load settings from file and apply CLI overrides
fn load_settings(cli: &CliArgs) -> anyhow::Result<Settings> {
    let mut settings = match cli.config_path {
        Some(ref path) => Settings::from_file(path)
            .with_context(|| format!("Failed to load settings file '{}'", path))?,
        None => Settings::default(),
    };

    if let Some(ref nodes) = cli.nodes {
        settings.elasticache.nodes = NodeList::from(nodes.as_str());
    }
    if let Some(ref name) = cli.load_balancer {
        settings.elasticache.load_balancer = name.clone();
    }
    if let Some(format) = cli.log_format {
        settings.logging.format = format;
    }

    Ok(settings)
}

fn print_text(resolved: &ResolvedClusterConfig) {
    let summary = resolved.summary();
    println!("nodes:                  {}", summary.nodes.join(" "));
    println!("database:               {}", summary.database);
    println!(
        "password:               {}",
        summary.password.as_deref().unwrap_or("(none)")
    );
    println!("timeout:                {}ms", summary.timeout_ms);
    println!("ping timeout:           {}ms", summary.ping_timeout_ms);
    println!(
        "retry:                  {} attempts every {}ms",
        summary.retry_attempts, summary.retry_interval_ms
    );
    println!(
        "pool size:              master {} / replica {}",
        summary.master_connection_pool_size, summary.slave_connection_pool_size
    );
    println!("scan interval:          {}ms", summary.scan_interval_ms);
    println!("read mode:              {:?}", summary.read_mode);
    println!(
        "load balancer:          {}",
        summary.load_balancer.as_deref().unwrap_or("(runtime default)")
    );
}

fn run(cli: CliArgs) -> anyhow::Result<()> {
    let settings = load_settings(&cli)?;
    logging::init(&settings.logging);

    let manager = ElasticacheSessionManager::new(settings.elasticache);
    let config = manager
        .configure(ClientConfig::new())
        .context("Failed to configure session manager")?;
    let resolved = config
        .elasticache_servers()
        .context("Session manager did not install ElastiCache servers")?;
    info!(nodes = resolved.nodes().len(), "Client configuration ready");

    // Validates every node against the redis client without connecting
    resolved.open_clients()?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&resolved.summary())?);
    } else {
        print_text(resolved);
    }
    Ok(())
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let cli = match parse_args(&args) {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    if cli.show_help {
        print_help();
        return;
    }
    if cli.show_version {
        println!("elasticache-session {}", VERSION);
        return;
    }

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
