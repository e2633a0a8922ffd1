//! `coscribe onboard` — First-time setup.

use coscribe_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config_dir = AppConfig::config_dir();
    let config_path = config_dir.join("config.toml");

    println!("📝 Coscribe — First-Time Setup");
    println!("==============================\n");

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)?;
        println!("✅ Created config directory: {}", config_dir.display());
    } else {
        println!("  Config directory exists: {}", config_dir.display());
    }

    if config_path.exists() {
        println!("\n⚠️  Config already exists at: {}", config_path.display());
        println!("   Edit it manually or delete and re-run onboard.\n");
    } else {
        let default_toml = AppConfig::default_toml();
        std::fs::write(&config_path, &default_toml)?;
        println!("✅ Created config.toml at: {}", config_path.display());
        println!("\n📝 Next steps:");
        println!("   1. Edit {} and add your API key", config_path.display());
        println!("      (or set OPENROUTER_API_KEY / COSCRIBE_API_KEY)");
        println!("   2. Optional: set PERPLEXITY_API_KEY so the model can research");
        println!("   3. Optional: set COSCRIBE_WEBHOOK_URL for /research commands");
        println!("   4. Run: coscribe chat\n");
    }

    println!("🎉 Setup complete! Run `coscribe chat` to start writing.\n");

    Ok(())
}
