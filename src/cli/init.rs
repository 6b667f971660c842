//! Init command implementation
//!
//! Scaffolds an Argus working directory: `argus.toml`, `.env.example` and a
//! `.gitignore` that keeps secrets and reports out of version control.

use super::output::Output;
use crate::agents::PROFILES;
use std::fs;
use std::path::{Path, PathBuf};

/// Result of the init command
#[derive(Debug, PartialEq, Eq)]
pub enum InitResult {
    Success,
    /// `argus.toml` exists and `--force` was not given
    AlreadyExists,
    Error(String),
}

pub struct InitConfig {
    pub path: PathBuf,
    pub force: bool,
}

pub fn run(config: InitConfig, output: &Output) -> InitResult {
    output.banner();
    output.header("Initializing Argus");

    let base_path = &config.path;

    let config_path = base_path.join("argus.toml");
    if config_path.exists() && !config.force {
        output.warning("argus.toml already exists!");
        output.hint("Use --force to overwrite existing files");
        return InitResult::AlreadyExists;
    }

    if !base_path.exists() {
        if let Err(e) = fs::create_dir_all(base_path) {
            output.error(&format!("Failed to create {}: {}", base_path.display(), e));
            return InitResult::Error(e.to_string());
        }
    }

    output.subheader("Creating configuration files");

    if let Err(e) = write_file(&config_path, &generate_argus_toml(), config.force) {
        output.error(&format!("Failed to create argus.toml: {}", e));
        return InitResult::Error(e.to_string());
    }
    output.created("config", "argus.toml");

    let env_example_path = base_path.join(".env.example");
    match write_file(&env_example_path, &generate_env_example(), config.force) {
        Ok(true) => output.created("env", ".env.example"),
        Ok(false) => output.skipped(".env.example", "already exists"),
        Err(e) => {
            output.error(&format!("Failed to create .env.example: {}", e));
            return InitResult::Error(e.to_string());
        }
    }

    let gitignore_path = base_path.join(".gitignore");
    match write_file(&gitignore_path, &generate_gitignore(), false) {
        Ok(true) => output.created("file", ".gitignore"),
        Ok(false) => output.skipped(".gitignore", "already exists"),
        Err(e) => output.warning(&format!("Failed to create .gitignore: {}", e)),
    }

    output.complete("Argus initialized successfully!");

    output.header("Next Steps");
    output.newline();
    output.info("1. Set up environment variables:");
    output.command("cp .env.example .env");
    output.command("# Edit .env and set OPENAI_API_KEY (and SHODAN_API_KEY if available)");
    output.newline();
    output.info("2. Check the configuration:");
    output.command("argus config --validate");
    output.newline();
    output.info("3. Run a scan:");
    output.command("argus scan example.com");

    output.hint("Without an API key, run the tools directly with: argus scan example.com --no-llm");
    output.hint("Only scan targets you are authorized to test.");

    InitResult::Success
}

/// Write `content` unless the file exists and `force` is off. Returns whether it was written.
fn write_file(path: &Path, content: &str, force: bool) -> std::io::Result<bool> {
    if path.exists() && !force {
        return Ok(false);
    }
    fs::write(path, content)?;
    Ok(true)
}

fn generate_argus_toml() -> String {
    let mut agents = String::new();
    for profile in PROFILES {
        let tools = profile
            .tools
            .iter()
            .map(|t| format!("\"{}\"", t))
            .collect::<Vec<_>>()
            .join(", ");
        agents.push_str(&format!(
            "# {}\n[agents.{}]\nenabled = true\ntools = [{}]\nmax_tool_iterations = 10\ntimeout_secs = 300\n\n",
            profile.role, profile.name, tools
        ));
    }

    format!(
        r#"# Argus Configuration
# ===================
# Generated by: argus init
#
# REQUIRED: set OPENAI_API_KEY (see .env.example), or run scans with --no-llm.

# =============================================================================
# LLM
# =============================================================================
# Any OpenAI-compatible chat completions endpoint works.

[llm]
enabled = true
api_base = "https://api.openai.com/v1"
api_key_env = "OPENAI_API_KEY"
model = "gpt-4o-mini"
temperature = 0.7
timeout_secs = 120

# =============================================================================
# Workflow
# =============================================================================

[workflow]
# Abort agents still running after this many seconds. Unset waits for all.
# deadline_secs = 600

# =============================================================================
# Reports
# =============================================================================

[output]
dir = "reports"
# json, pdf, markdown, both (json + pdf) or all
format = "both"

# =============================================================================
# Agents
# =============================================================================

{agents}# =============================================================================
# Tools
# =============================================================================

[tools.directory_brute_force]
timeout_secs = 10

[tools.dns_lookup]
base_url = "https://dns.google/resolve"

[tools.whois_lookup]
server = "whois.iana.org"

[tools.ssl_certificate_info]
port = 443

[tools.shodan_lookup]
api_key_env = "SHODAN_API_KEY"

[tools.nmap_port_scanner]
binary = "nmap"
timeout_secs = 300
"#
    )
}

fn generate_env_example() -> String {
    r#"# Argus environment
# Copy to .env and fill in the values.

# LLM API key (name configurable via [llm] api_key_env)
OPENAI_API_KEY=

# Optional: enables the shodan_lookup tool
SHODAN_API_KEY=

# Log filter, e.g. info, argus=debug
RUST_LOG=info
"#
    .to_string()
}

fn generate_gitignore() -> String {
    r#"# Argus
.env
reports/
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::toml_config::ArgusConfig;
    use tempfile::TempDir;

    fn init_config(temp_dir: &TempDir, force: bool) -> InitConfig {
        InitConfig {
            path: temp_dir.path().to_path_buf(),
            force,
        }
    }

    #[test]
    fn test_generated_toml_parses() {
        let config = ArgusConfig::from_toml_str(&generate_argus_toml()).unwrap();
        assert!(config.llm.enabled);
        assert_eq!(config.agents.len(), PROFILES.len());
        assert_eq!(
            config.agent_tools("vuln_scan"),
            vec!["nmap_port_scanner".to_string(), "shodan_lookup".to_string()]
        );
        assert_eq!(config.tool("whois_lookup").extra_str("server"), Some("whois.iana.org"));

        // Valid apart from the API key
        let mut config = config;
        config.llm.enabled = false;
        config.validate().unwrap();
    }

    #[test]
    fn test_generate_env_example() {
        let content = generate_env_example();
        assert!(content.contains("OPENAI_API_KEY="));
        assert!(content.contains("SHODAN_API_KEY="));
    }

    #[test]
    fn test_write_file_skips_existing_without_force() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("existing.txt");
        fs::write(&path, "original").unwrap();

        assert!(!write_file(&path, "new", false).unwrap());
        assert_eq!(fs::read_to_string(&path).unwrap(), "original");

        assert!(write_file(&path, "new", true).unwrap());
        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
    }

    #[test]
    fn test_run_creates_all_files() {
        let temp_dir = TempDir::new().unwrap();
        let result = run(init_config(&temp_dir, false), &Output::no_color());

        assert_eq!(result, InitResult::Success);
        assert!(temp_dir.path().join("argus.toml").exists());
        assert!(temp_dir.path().join(".env.example").exists());
        assert!(temp_dir.path().join(".gitignore").exists());
    }

    #[test]
    fn test_run_already_exists_without_force() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("argus.toml"), "# mine").unwrap();

        let result = run(init_config(&temp_dir, false), &Output::no_color());
        assert_eq!(result, InitResult::AlreadyExists);
        assert_eq!(
            fs::read_to_string(temp_dir.path().join("argus.toml")).unwrap(),
            "# mine"
        );
    }

    #[test]
    fn test_run_force_overwrites() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("argus.toml"), "# mine").unwrap();

        let result = run(init_config(&temp_dir, true), &Output::no_color());
        assert_eq!(result, InitResult::Success);
        let content = fs::read_to_string(temp_dir.path().join("argus.toml")).unwrap();
        assert!(content.contains("[llm]"));
    }
}
