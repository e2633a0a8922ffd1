//! `coscribe doctor` — Diagnose configuration health.

use coscribe_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 Coscribe Doctor — Configuration Diagnostics");
    println!("==============================================\n");

    let mut issues = 0;

    println!("  ✅ Rust binary running");

    let config_path = AppConfig::config_dir().join("config.toml");
    if config_path.exists() {
        match AppConfig::load() {
            Ok(config) => {
                println!("  ✅ Config file valid");

                if config.has_api_key() {
                    println!("  ✅ Provider API key configured ({})", config.provider.model);
                } else {
                    println!(
                        "  ⚠️  No provider API key — set COSCRIBE_API_KEY or add provider.api_key"
                    );
                    issues += 1;
                }

                if config.research.enabled && config.research.api_key.is_some() {
                    println!("  ✅ Research tool configured ({})", config.research.model);
                } else {
                    println!("  Research tool not configured — set PERPLEXITY_API_KEY to enable it");
                }

                if config.webhook.url.is_some() {
                    println!("  ✅ Workflow webhook configured");
                } else {
                    println!(
                        "  Workflow webhook not configured — {} will go to the model instead",
                        config.command.prefix
                    );
                }
            }
            Err(e) => {
                println!("  ❌ Config file invalid: {e}");
                issues += 1;
            }
        }
    } else {
        println!("  ❌ No config file — run `coscribe onboard`");
        issues += 1;
    }

    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
