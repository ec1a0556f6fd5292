use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::*;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use crate::domain::GroupStat;
use crate::infra::config::{Language, UserConfig};
use crate::infra::ConfigManager;
use crate::llm::SummaryClient;
use crate::prompts::{
    MSG_API_KEY_INSTRUCTION, MSG_CONFIG_CREATED, MSG_CONFIG_EXISTS, MSG_NO_API_KEY, MSG_NO_SUMMARY,
};

#[derive(Parser)]
#[command(name = "newsdigest")]
#[command(about = "Summarize grouped news headlines with an LLM", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Show debug logs
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Summarize grouped statistics (JSON) through the chat API
    Summarize {
        /// Statistics file, or `-` for stdin
        input: Option<PathBuf>,

        #[command(flatten)]
        overrides: Overrides,
    },

    /// Print the prompt that would be sent, without calling the API
    Prompt {
        /// Statistics file, or `-` for stdin
        input: Option<PathBuf>,

        #[command(flatten)]
        overrides: Overrides,
    },

    /// Write a default .newsdigest.yml in the current directory
    Init,

    /// Show the effective configuration
    Health,
}

#[derive(Args, Debug, Default, Clone)]
pub struct Overrides {
    /// Chat API base URL
    #[arg(long)]
    pub base_url: Option<String>,

    /// Model identifier
    #[arg(long)]
    pub model: Option<String>,

    /// Prompt language (zh, en)
    #[arg(long, value_parser = parse_language)]
    pub lang: Option<Language>,
}

impl Overrides {
    fn apply(&self, mut config: UserConfig) -> UserConfig {
        if let Some(base_url) = &self.base_url {
            config.base_url = base_url.clone();
        }
        if let Some(model) = &self.model {
            config.model = model.clone();
        }
        if let Some(language) = self.lang {
            config.language = language;
        }
        config
    }
}

fn parse_language(value: &str) -> Result<Language, String> {
    Language::from_code(value)
        .ok_or_else(|| format!("unsupported language '{}' (expected zh or en)", value))
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Summarize { input, overrides } => summarize_command(input, &overrides),
        Commands::Prompt { input, overrides } => prompt_command(input, &overrides),
        Commands::Init => init_command(),
        Commands::Health => health_command(),
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn summarize_command(input: Option<PathBuf>, overrides: &Overrides) -> Result<()> {
    let config = overrides.apply(load_config()?);

    if config.api_key().is_none() {
        anyhow::bail!("{}\n\n{}", MSG_NO_API_KEY, MSG_API_KEY_INSTRUCTION);
    }

    let groups = read_groups(input.as_deref())?;
    let client = SummaryClient::from_config(&config);
    let summary = client.summarize(&groups);

    if summary.is_empty() {
        eprintln!("{} {}", "⚠️".yellow(), MSG_NO_SUMMARY);
    } else {
        println!("{}", summary);
    }

    Ok(())
}

fn prompt_command(input: Option<PathBuf>, overrides: &Overrides) -> Result<()> {
    let config = overrides.apply(load_config()?);
    let groups = read_groups(input.as_deref())?;
    let client = SummaryClient::from_config(&config);

    match client.build_prompt(&groups) {
        Some(prompt) => print!("{}", prompt),
        None => eprintln!("{} No news titles in input", "⚠️".yellow()),
    }

    Ok(())
}

fn init_command() -> Result<()> {
    let cwd = std::env::current_dir().context("Failed to read current directory")?;

    if ConfigManager::create_default(&cwd)? {
        println!("{}", MSG_CONFIG_CREATED.green());
    } else {
        println!("{} {}", "⚠️".yellow(), MSG_CONFIG_EXISTS);
    }

    Ok(())
}

fn health_command() -> Result<()> {
    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    let manager = ConfigManager::new(&cwd)?;
    let config = manager.get();

    println!("{}", "🏥 Checking newsdigest configuration...".bold());
    match manager.source() {
        Some(path) => println!("✓ Config file: {}", path.display()),
        None => println!("  No config file, using defaults"),
    }
    println!("  Base URL: {}", config.base_url);
    println!("  Model: {}", config.model);
    println!("  Language: {}", config.language.code());

    if config.api_key().is_some() {
        println!("\n{}", "✅ API key configured".green().bold());
    } else {
        println!("\n{} {}", "⚠️".yellow(), MSG_NO_API_KEY);
        println!("{}", MSG_API_KEY_INSTRUCTION);
    }

    Ok(())
}

// Helper functions

fn load_config() -> Result<UserConfig> {
    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    Ok(ConfigManager::new(&cwd)?.get())
}

/// Read grouped statistics from a file, or stdin when `input` is `None` or `-`.
pub fn read_groups(input: Option<&Path>) -> Result<Vec<GroupStat>> {
    let contents = match input {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        _ => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read stdin")?;
            buffer
        }
    };

    serde_json::from_str(&contents).context("Input is not a JSON array of groups")
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn reads_groups_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stats.json");
        std::fs::write(
            &path,
            r#"[{"word":"AI","titles":[{"title":"t","source_name":"s"}]}]"#,
        )
        .unwrap();

        let groups = read_groups(Some(&path)).unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].word, "AI");
    }

    #[test]
    fn rejects_non_array_input() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stats.json");
        std::fs::write(&path, r#"{"word":"AI"}"#).unwrap();

        assert!(read_groups(Some(&path)).is_err());
    }

    #[test]
    fn overrides_replace_config_values() {
        let cli = Cli::try_parse_from([
            "newsdigest", "prompt", "stats.json", "--model", "m", "--lang", "en",
        ])
        .unwrap();

        let Commands::Prompt { input, overrides } = cli.command else {
            panic!("expected prompt command");
        };
        assert_eq!(input, Some(PathBuf::from("stats.json")));

        let config = overrides.apply(UserConfig::default());
        assert_eq!(config.model, "m");
        assert_eq!(config.language, Language::En);
        assert_eq!(config.base_url, UserConfig::default().base_url);
    }

    #[test]
    fn unknown_language_flag_is_rejected() {
        assert!(Cli::try_parse_from(["newsdigest", "prompt", "--lang", "fr"]).is_err());
    }
}
