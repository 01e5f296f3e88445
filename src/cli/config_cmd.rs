use anyhow::Result;

use crate::cli::output::OutputOptions;
use crate::core::config::{AppConfig, BILLING_TOKEN_VAR, MAIL_KEY_VAR};

pub fn init(_opts: &OutputOptions) -> Result<()> {
    let path = AppConfig::config_path();
    if path.exists() {
        eprintln!("Config file already exists at {}", path.display());
        eprintln!("Remove it first if you want to regenerate.");
        return Ok(());
    }

    match AppConfig::default().save() {
        Ok(path) => {
            println!("Generated config at {}", path.display());
            println!("  Fill in email.sender_email and the recipient lists before running.");
            println!(
                "  Secrets are read from the {} and {} environment variables.",
                BILLING_TOKEN_VAR, MAIL_KEY_VAR
            );
        }
        Err(e) => {
            eprintln!("Failed to generate config: {}", e);
            std::process::exit(1);
        }
    }
    Ok(())
}

pub fn check(_opts: &OutputOptions) -> Result<()> {
    let path = AppConfig::config_path();
    if !path.exists() {
        eprintln!("No config file found at {}", path.display());
        eprintln!("Run `costwatch config init` to create one.");
        return Ok(());
    }

    let config = match AppConfig::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {}", e);
            std::process::exit(1);
        }
    };

    let issues = config.validate();
    if issues.is_empty() {
        println!("Config is valid: {}", path.display());
        println!(
            "  {} daily recipient(s), {} weekly recipient(s)",
            config.email.daily_recipients.len(),
            config.email.weekly_recipients.len()
        );
        println!("  Billing endpoint: {}", config.billing.endpoint);
    } else {
        eprintln!("Config issues found in {}:", path.display());
        for issue in &issues {
            eprintln!("  - {}", issue);
        }
        std::process::exit(1);
    }
    Ok(())
}
