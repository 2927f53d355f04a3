//! Configuration management commands.

use anyhow::{bail, Context as _, Result};
use feed_core::FeedConfig;

use super::{ConfigArgs, ConfigCommand};
use crate::context::Context;

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(ctx),
        ConfigCommand::Init { path, force } => init_config(&path, force, ctx),
        ConfigCommand::Validate => validate_config(ctx),
    }
}

fn show_config(ctx: &Context) -> Result<()> {
    if ctx.output.is_json() {
        ctx.output.json(&ctx.config);
        return Ok(());
    }

    match &ctx.config_path {
        Some(path) => ctx.output.info(&format!("Loaded from {}", path.display())),
        None => ctx.output.info("No config file found, using defaults"),
    }
    let rendered = toml::to_string_pretty(&ctx.config).context("Failed to render config")?;
    println!("\n{rendered}");
    Ok(())
}

fn init_config(path: &str, force: bool, ctx: &Context) -> Result<()> {
    let config_path = ctx.resolve_path(path);

    if config_path.exists() && !force {
        bail!(
            "Config file already exists: {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    FeedConfig::default()
        .save(&config_path)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    ctx.output
        .success(&format!("Created: {}", config_path.display()));
    Ok(())
}

fn validate_config(ctx: &Context) -> Result<()> {
    let (errors, warnings) = check(&ctx.config);

    if ctx.output.is_json() {
        ctx.output.json(&serde_json::json!({
            "valid": errors.is_empty(),
            "errors": errors,
            "warnings": warnings,
        }));
    } else {
        ctx.output.header("Validating configuration");
        for warning in &warnings {
            ctx.output.warn(warning);
        }
        for error in &errors {
            ctx.output.error(error);
        }
    }

    if !errors.is_empty() {
        bail!("Configuration has {} error(s)", errors.len());
    }
    ctx.output.success("Configuration is valid");
    Ok(())
}

fn check(config: &FeedConfig) -> (Vec<String>, Vec<String>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if !(config.provider.base_url.starts_with("http://")
        || config.provider.base_url.starts_with("https://"))
    {
        errors.push(format!(
            "provider.base_url must be http(s): {}",
            config.provider.base_url
        ));
    }
    if std::env::var(&config.provider.api_key_env).is_err() {
        warnings.push(format!(
            "{} is not set; only --offline runs will work",
            config.provider.api_key_env
        ));
    }
    if config.images.capacity == 0 {
        errors.push("images.capacity must be at least 1".to_string());
    }
    if config.images.batch_size == 0 {
        errors.push("images.batch_size must be at least 1".to_string());
    }
    if config.reveal.initial_batch == 0 {
        errors.push("reveal.initial_batch must be at least 1".to_string());
    }
    if config.reveal.subsequent_batch == 0 {
        warnings.push("reveal.subsequent_batch is 0; reveal advances one item per tick".to_string());
    }
    if config.reveal.interval.is_zero() {
        errors.push("reveal.interval_ms must be positive".to_string());
    }
    if config.scroll.threshold_px < 0.0 {
        errors.push("scroll.threshold_px must not be negative".to_string());
    }

    (errors, warnings)
}
