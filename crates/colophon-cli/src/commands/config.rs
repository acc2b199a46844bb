use anyhow::{Context, Result};

use colophon_etl::{config, Config};

const STRING_KEYS: &[&str] = &[
    "database_path",
    "public_dir",
    "model_cache_dir",
    "default_language",
    "default_format",
    "excerpt_marker",
];
const INTEGER_KEYS: &[&str] = &["provider_delay_ms", "enrich_batch_size"];

fn valid_keys() -> String {
    STRING_KEYS
        .iter()
        .chain(INTEGER_KEYS.iter())
        .copied()
        .collect::<Vec<_>>()
        .join(", ")
}

/// Show the current effective configuration.
pub fn show_config() -> Result<()> {
    let config = Config::load()?;

    println!("Current Configuration");
    println!("=====================\n");

    println!("Config file: {}", config::config_file_path().display());

    let exists = config::config_file_path().exists();
    println!(
        "File exists: {}\n",
        if exists { "yes" } else { "no (using defaults)" }
    );

    println!("Settings:");
    println!("  database_path: {}", config.database_path.display());
    println!("  public_dir: {}", config.public_dir.display());
    println!("  model_cache_dir: {}", config.model_cache_dir.display());
    println!("  default_language: {}", config.default_language);
    println!("  default_format: {}", config.default_format);
    println!("  excerpt_marker: {}", config.excerpt_marker);
    println!("  noise_tokens: {}", config.noise_tokens.join(", "));
    println!("  provider_delay_ms: {}", config.provider_delay_ms);
    println!("  enrich_batch_size: {}", config.enrich_batch_size);

    println!("\nPriority: CLI args > ENV vars (COLOPHON_*) > Config file > Defaults");

    Ok(())
}

/// Get a specific config value.
pub fn get_config(key: Option<String>) -> Result<()> {
    if let Some(key) = key {
        let config = Config::load()?;

        match key.as_str() {
            "database_path" => println!("{}", config.database_path.display()),
            "public_dir" => println!("{}", config.public_dir.display()),
            "model_cache_dir" => println!("{}", config.model_cache_dir.display()),
            "default_language" => println!("{}", config.default_language),
            "default_format" => println!("{}", config.default_format),
            "excerpt_marker" => println!("{}", config.excerpt_marker),
            "noise_tokens" => println!("{}", config.noise_tokens.join(", ")),
            "provider_delay_ms" => println!("{}", config.provider_delay_ms),
            "enrich_batch_size" => println!("{}", config.enrich_batch_size),
            _ => {
                anyhow::bail!(
                    "Unknown config key: {}\n\nValid keys: {}, noise_tokens",
                    key,
                    valid_keys()
                );
            }
        }
    } else {
        // No key provided, show entire config file contents
        let config_path = config::config_file_path();

        if config_path.exists() {
            let contents =
                std::fs::read_to_string(&config_path).context("Failed to read config file")?;
            print!("{}", contents);
        } else {
            println!("Config file does not exist: {}", config_path.display());
            println!("\nRun 'colophon config init' to create it.");
        }
    }

    Ok(())
}

/// Replace the key's line in the file contents, or append one.
///
/// Commented-out example lines are left untouched.
fn upsert_key(contents: &str, key: &str, rendered_value: &str) -> String {
    let mut new_lines = Vec::new();
    let mut found = false;

    for line in contents.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with(key) && !trimmed.starts_with('#') {
            new_lines.push(format!("{} = {}", key, rendered_value));
            found = true;
        } else {
            new_lines.push(line.to_string());
        }
    }

    if !found {
        new_lines.push(format!("\n{} = {}", key, rendered_value));
    }

    new_lines.join("\n")
}

/// Set a config value.
pub fn set_config(key: String, value: String) -> Result<()> {
    let config_path = config::config_file_path();

    // Ensure config file exists
    config::ensure_config_file()?;

    let contents = std::fs::read_to_string(&config_path).context("Failed to read config file")?;

    let rendered = if INTEGER_KEYS.contains(&key.as_str()) {
        value
            .parse::<u64>()
            .with_context(|| format!("{} must be an integer", key))?;
        value.clone()
    } else if STRING_KEYS.contains(&key.as_str()) {
        format!("\"{}\"", value)
    } else {
        anyhow::bail!(
            "Unknown or unsupported config key: {}\n\nValid keys: {}\n(noise_tokens is a list; edit the config file directly)",
            key,
            valid_keys()
        );
    };

    let updated = upsert_key(&contents, &key, &rendered);
    std::fs::write(&config_path, updated).context("Failed to write config file")?;

    println!("✓ Updated {} = {}", key, value);
    println!("  in {}", config_path.display());

    Ok(())
}

/// Show the config file path.
pub fn show_path() -> Result<()> {
    let config_path = config::config_file_path();
    println!("{}", config_path.display());
    Ok(())
}

/// Show example configuration.
pub fn show_example() -> Result<()> {
    print!("{}", config::example_config());
    Ok(())
}

/// Initialize config file with defaults.
pub fn init_config() -> Result<()> {
    let created = config::ensure_config_file()?;
    let config_path = config::config_file_path();

    if created {
        println!("✓ Created config file: {}", config_path.display());
        println!("\nEdit this file to configure colophon.");
    } else {
        println!("Config file already exists: {}", config_path.display());
    }

    Ok(())
}
