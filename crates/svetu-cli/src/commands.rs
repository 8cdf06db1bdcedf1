//! Command implementations.
//!
//! Commands write their results to the supplied writer so they can be
//! exercised without a terminal. Logs go through `tracing`.

use crate::cli::{Cli, Command};
use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;
use svetu_config::{Config, ConfigLoader};
use svetu_i18n::{
    check_completeness, fix_namespace_files, Locale, MessageLoader, ModuleCache, ProviderRegistry,
};
use tracing::{debug, info};

/// How a command finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Everything succeeded.
    Success,
    /// The completeness check found problems.
    Incomplete,
}

impl Outcome {
    /// Process exit code for the outcome.
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::Incomplete => 1,
        }
    }
}

/// Resolves the configuration: the file given on the command line (or
/// defaults), then environment overrides, then command line overrides.
///
/// # Errors
///
/// Fails if the file cannot be loaded or the result does not validate.
pub async fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => ConfigLoader::new(path)
            .read()
            .await
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => Config::default(),
    };

    config.apply_env_overrides();
    if let Some(dir) = &cli.messages_dir {
        config.i18n.messages_dir.clone_from(dir);
    }
    if let Some(level) = &cli.log_level {
        config.logging.level.clone_from(level);
    }

    config.validate().context("invalid configuration")?;
    Ok(config)
}

/// Runs the selected command.
///
/// # Errors
///
/// Propagates loading, I/O and validation failures.
pub async fn run(cli: &Cli, config: &Config, out: &mut dyn Write) -> Result<Outcome> {
    debug!("Running {:?}", cli.command);

    match &cli.command {
        Command::Load { locale, modules } => {
            let loader = loader(config, true).await?;
            let locale = locale_or_default(locale.as_deref(), &loader);
            let messages = loader.load_messages(&locale, modules).await?;
            write!(out, "{}", messages.to_json_pretty()?)?;
        }

        Command::Route { path } => {
            let loader = loader(config, false).await?;
            for module in &loader.required_modules(path) {
                writeln!(out, "{module}")?;
            }
        }

        Command::RouteLoad { locale, path } => {
            let loader = loader(config, true).await?;
            let locale: Locale = locale_or_default(locale.as_deref(), &loader).parse()?;
            let messages = loader.load_for_route(locale, path).await?;
            write!(out, "{}", messages.to_json_pretty()?)?;
        }

        Command::Check { reference, json } => {
            let registry = registry(&config.i18n.messages_dir).await?;
            let reference: Locale = reference
                .as_deref()
                .unwrap_or(&config.i18n.default_locale)
                .parse()?;
            let report = check_completeness(registry.into(), reference).await?;

            if *json {
                writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
            } else {
                write!(out, "{report}")?;
            }
            if !report.is_complete() {
                return Ok(Outcome::Incomplete);
            }
        }

        Command::FixNamespaces { dry_run } => {
            let fixed = fix_namespace_files(&config.i18n.messages_dir, *dry_run).await?;
            let verb = if *dry_run { "would fix" } else { "fixed" };
            for path in &fixed {
                writeln!(out, "{verb} {}", path.display())?;
            }
            info!("{} bundle files {}", fixed.len(), verb);
        }

        Command::Modules { locale } => {
            let loader = loader(config, true).await?;
            let locale: Locale = locale_or_default(locale.as_deref(), &loader).parse()?;
            let modules = loader.registry().modules_for(locale);
            writeln!(
                out,
                "{} ({}): {} modules",
                locale.display_name(),
                locale.to_language_identifier()?,
                modules.len()
            )?;
            for module in modules {
                writeln!(out, "  {module}")?;
            }
        }

        Command::InitConfig { path } => {
            ConfigLoader::new(path)
                .save(&Config::default())
                .await
                .with_context(|| format!("failed to write {}", path.display()))?;
            writeln!(out, "wrote {}", path.display())?;
        }
    }

    Ok(Outcome::Success)
}

async fn registry(dir: &Path) -> Result<ProviderRegistry> {
    ProviderRegistry::from_directory(dir)
        .await
        .with_context(|| format!("failed to read bundles from {}", dir.display()))
}

/// Builds a loader; `with_bundles` scans the messages directory first.
async fn loader(config: &Config, with_bundles: bool) -> Result<MessageLoader> {
    let registry = if with_bundles {
        registry(&config.i18n.messages_dir).await?
    } else {
        ProviderRegistry::new()
    };
    Ok(MessageLoader::from_config(config, registry, ModuleCache::shared())?)
}

fn locale_or_default(locale: Option<&str>, loader: &MessageLoader) -> String {
    locale.map_or_else(|| loader.default_locale().code().to_string(), ToString::to_string)
}
