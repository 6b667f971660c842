use anyhow::{bail, Result};
use argus::agents::PROFILES;
use argus::cli::init::{self, InitConfig, InitResult};
use argus::cli::output::Output;
use argus::cli::{AgentCommands, Cli, Commands};
use argus::reporting::{ReportFormat, ReportWriter};
use argus::utils::toml_config::{ArgusConfig, DEFAULT_CONFIG_FILE};
use argus::workflows::{run_recon, ScanOptions, Target, PLACEHOLDER};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let cli = Cli::parse_args();
    init_tracing(cli.verbose);

    let output = if cli.no_color {
        Output::no_color()
    } else {
        Output::new()
    };

    if let Err(e) = run(cli, &output).await {
        output.error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

/// `RUST_LOG` wins; otherwise `info` with `--verbose` and `warn` without.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();
}

async fn run(cli: Cli, output: &Output) -> Result<()> {
    let config_path = cli.config.clone();

    match cli.command {
        Commands::Scan {
            target,
            format,
            output_dir,
            no_llm,
            deadline,
        } => {
            let config = ArgusConfig::load(config_path.as_deref())?;
            scan(config, &target, format, output_dir, no_llm, deadline, output).await
        }
        Commands::Init { path, force } => match init::run(InitConfig { path, force }, output) {
            InitResult::Success | InitResult::AlreadyExists => Ok(()),
            InitResult::Error(e) => bail!("init failed: {}", e),
        },
        Commands::Config { validate } => {
            let config = ArgusConfig::load(config_path.as_deref())?;
            show_config(&config, config_path, validate, output)
        }
        Commands::Agent(AgentCommands::List) => {
            let config = ArgusConfig::load(config_path.as_deref())?;
            list_agents(&config, output);
            Ok(())
        }
    }
}

async fn scan(
    config: ArgusConfig,
    target: &str,
    format: Option<ReportFormat>,
    output_dir: Option<PathBuf>,
    no_llm: bool,
    deadline: Option<u64>,
    output: &Output,
) -> Result<()> {
    let mut options = ScanOptions::from_config(&config);
    if no_llm {
        options.use_llm = false;
    }
    match deadline {
        Some(0) => bail!("--deadline must be greater than zero"),
        Some(secs) => options.deadline = Some(Duration::from_secs(secs)),
        None => {}
    }
    let format = format.unwrap_or(config.output.format);
    let dir = output_dir.unwrap_or_else(|| config.output.dir.clone());

    let parsed = Target::parse(target)?;

    output.banner();
    output.header(&format!("Scanning {}", parsed));
    output.kv("Agents", &config.enabled_agents().join(", "));
    output.kv(
        "Mode",
        if options.use_llm {
            config.llm.model.as_str()
        } else {
            "direct (no LLM)"
        },
    );
    if let Some(deadline) = options.deadline {
        output.kv("Deadline", &format!("{}s", deadline.as_secs()));
    }

    let result = run_recon(&config, target, &options).await?;

    output.subheader("Sections");
    for section in &result.report.sections {
        output.section(&section.title, section.content != PLACEHOLDER);
    }

    if !result.errors.is_empty() {
        output.subheader("Errors");
        for error in &result.errors {
            output.task_error(error);
        }
    }

    output.subheader("Reports");
    let writer = ReportWriter::new(&dir, format);
    for path in writer.write(&result.report, &parsed.sanitized())? {
        output.created("report", &path.display().to_string());
    }

    output.complete(&format!(
        "Scan finished in {:.1}s: {}/{} sections populated",
        result.duration_ms as f64 / 1000.0,
        result.report.populated_sections(),
        result.report.sections.len()
    ));
    Ok(())
}

fn show_config(
    config: &ArgusConfig,
    path: Option<PathBuf>,
    validate: bool,
    output: &Output,
) -> Result<()> {
    output.header("Configuration");
    let source = path
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| DEFAULT_CONFIG_FILE.to_string());
    output.kv("File", &source);

    output.subheader("LLM");
    output.kv("Enabled", &config.llm.enabled.to_string());
    output.kv("Model", &config.llm.model);
    output.kv("API base", &config.llm.api_base);
    output.kv("API key env", &config.llm.api_key_env);

    output.subheader("Workflow");
    output.kv(
        "Deadline",
        &config
            .workflow
            .deadline_secs
            .map(|s| format!("{}s", s))
            .unwrap_or_else(|| "none".to_string()),
    );
    output.kv("Report dir", &config.output.dir.display().to_string());
    output.kv("Report format", &format!("{:?}", config.output.format).to_lowercase());

    output.subheader("Agents");
    for name in config.enabled_agents() {
        output.list_item(&format!("{} ({})", name, config.agent_tools(name).join(", ")));
    }

    if validate {
        let warnings = config.validate_with_warnings()?;
        output.newline();
        for warning in &warnings {
            output.warning(&warning.message);
        }
        output.success("Configuration is valid");
    }
    Ok(())
}

fn list_agents(config: &ArgusConfig, output: &Output) {
    output.header("Agents");
    output.table_header(&["Agent", "Section", "Status"]);
    let enabled = config.enabled_agents();
    for profile in PROFILES {
        let status = if enabled.contains(&profile.name) {
            "enabled"
        } else {
            "disabled"
        };
        output.table_row(&[profile.name, profile.field.section_label(), status]);
    }

    output.subheader("Tools");
    for profile in PROFILES {
        output.kv(profile.name, &config.agent_tools(profile.name).join(", "));
    }
}
