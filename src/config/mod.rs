/// Configuration system for promconsole.
///
/// Provides a layered configuration hierarchy:
///
/// 1. **Built-in defaults**: [`schema::ConsoleConfig::default()`]
/// 2. **User global config**: `~/.promconsole/config.toml`
/// 3. **Project local config**: `.promconsole.toml` in the current directory
/// 4. **Environment variables**: `PROMCONSOLE_*` overrides
///
/// File layers are merged key by key: a project file that only sets
/// `backend.url` keeps every other value from the global file. The CLI
/// applies `--url` on top of the result.
///
/// # Usage
///
/// ```rust,ignore
/// use promconsole::config;
///
/// let cfg = config::load();
/// println!("{}", cfg.backend.origin());
/// ```
pub mod schema;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub use schema::ConsoleConfig;

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the fully resolved console configuration.
pub fn load() -> ConsoleConfig {
    let layers = [global_config_path(), project_config_path()];
    let mut config = load_layers(layers.iter().flatten().map(PathBuf::as_path));
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    config
}

/// Merge the given TOML files over the defaults, in order.
///
/// Missing or malformed files are skipped one at a time: a layer that does
/// not parse, or that would leave the merged settings with a wrong-typed
/// value, is dropped while earlier layers stay in effect.
pub fn load_layers<'a>(paths: impl IntoIterator<Item = &'a Path>) -> ConsoleConfig {
    let mut merged = match toml::Value::try_from(ConsoleConfig::default()) {
        Ok(value) => value,
        Err(_) => return ConsoleConfig::default(),
    };
    let mut config = ConsoleConfig::default();

    for path in paths {
        let Some(layer) = load_toml_value(path) else {
            continue;
        };
        let mut candidate = merged.clone();
        merge_values(&mut candidate, layer);
        let resolved: Result<ConsoleConfig, _> = candidate.clone().try_into();
        if let Ok(resolved) = resolved {
            merged = candidate;
            config = resolved;
        }
    }

    config
}

fn load_toml_value(path: &Path) -> Option<toml::Value> {
    let content = fs::read_to_string(path).ok()?;
    toml::from_str(&content).ok()
}

/// Deep-merge `overlay` into `base`: tables recurse, everything else replaces.
fn merge_values(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
            for (key, value) in overlay_table {
                match base_table.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base_table.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

// ---------------------------------------------------------------------------
// File paths
// ---------------------------------------------------------------------------

/// Path to the user global config: `~/.promconsole/config.toml`.
fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".promconsole").join("config.toml"))
}

/// Path to the project local config: `.promconsole.toml` in the current directory.
fn project_config_path() -> Option<PathBuf> {
    std::env::current_dir()
        .ok()
        .map(|cwd| cwd.join(".promconsole.toml"))
}

/// Return the path to the global config file for display/init purposes.
pub fn global_config_file() -> Option<PathBuf> {
    global_config_path()
}

/// Return the path to the project config file for display purposes.
pub fn project_config_file() -> Option<PathBuf> {
    project_config_path()
}

/// Expand a leading `~` to the home directory.
pub fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix("~") {
        Some(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest.trim_start_matches(['/', '\\'])),
            None => PathBuf::from(path),
        },
        None => PathBuf::from(path),
    }
}

// ---------------------------------------------------------------------------
// Environment variable overrides
// ---------------------------------------------------------------------------

/// Apply environment variable overrides (highest file-independent layer).
///
/// Supported variables:
/// - `PROMCONSOLE_URL`: backend origin
/// - `PROMCONSOLE_TIMEOUT_MS`: request timeout
/// - `PROMCONSOLE_BANNER_MS`: banner lifetime
/// - `PROMCONSOLE_EDITOR`: editor command
/// - `PROMCONSOLE_OUTPUT_DIR`: export output directory
/// - `PROMCONSOLE_LOGGING`: activity log on/off (`1`/`true`/`yes`/`on`)
/// - `PROMCONSOLE_LOG_LEVEL`: minimum activity log level
/// - `NO_COLOR`: disables colored banners when set
pub fn apply_env_overrides(config: &mut ConsoleConfig, env: impl Fn(&str) -> Option<String>) {
    if let Some(val) = env("PROMCONSOLE_URL")
        && !val.is_empty()
    {
        config.backend.url = val;
    }
    if let Some(val) = env("PROMCONSOLE_TIMEOUT_MS")
        && let Ok(ms) = val.parse::<u64>()
    {
        config.backend.timeout_ms = ms;
    }
    if let Some(val) = env("PROMCONSOLE_BANNER_MS")
        && let Ok(ms) = val.parse::<u64>()
    {
        config.notifications.banner_ms = ms;
    }
    if let Some(val) = env("PROMCONSOLE_EDITOR")
        && !val.is_empty()
    {
        config.editor.command = val;
    }
    if let Some(val) = env("PROMCONSOLE_OUTPUT_DIR")
        && !val.is_empty()
    {
        config.export.output_dir = val;
    }
    if let Some(val) = env("PROMCONSOLE_LOGGING") {
        config.logging.enabled = is_truthy(&val);
    }
    if let Some(val) = env("PROMCONSOLE_LOG_LEVEL")
        && crate::activity::Level::parse(&val).is_some()
    {
        config.logging.level = val.to_ascii_lowercase();
    }
    if env("NO_COLOR").is_some() {
        config.notifications.color = false;
    }
}

/// Check if a string value represents a truthy boolean.
fn is_truthy(val: &str) -> bool {
    matches!(
        val.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

// ---------------------------------------------------------------------------
// Config init / set / reset
// ---------------------------------------------------------------------------

/// Write the default annotated config to `~/.promconsole/config.toml`.
///
/// Returns an error if the file already exists (use `force = true` to
/// overwrite).
pub fn init_config(force: bool) -> Result<PathBuf> {
    let path = global_config_path().context("could not determine home directory")?;
    write_default_config(&path, force)?;
    Ok(path)
}

fn write_default_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create config directory")?;
    }

    fs::write(path, ConsoleConfig::default_toml()).context("failed to write config file")
}

/// Set a single config key in the global config file.
///
/// Supports dotted keys like `backend.url`. The existing value's type
/// decides how `value` is parsed.
pub fn set_config_value(key: &str, value: &str) -> Result<()> {
    let path = global_config_path().context("could not determine home directory")?;
    set_config_value_at(&path, key, value)
}

fn set_config_value_at(path: &Path, key: &str, value: &str) -> Result<()> {
    let root: toml::Value = if path.exists() {
        let content = fs::read_to_string(path).context("failed to read config file")?;
        let mut existing: toml::Value =
            toml::from_str(&content).context("failed to parse config as TOML value")?;
        // Fill in keys the file omits so any known key can be set.
        let mut full = toml::Value::try_from(ConsoleConfig::default())
            .context("failed to serialize default config")?;
        merge_values(&mut full, existing.clone());
        if set_toml_value(&mut existing, key, value).is_err() {
            set_toml_value(&mut full, key, value)?;
            existing = full;
        }
        existing
    } else {
        let mut full = toml::Value::try_from(ConsoleConfig::default())
            .context("failed to serialize default config")?;
        set_toml_value(&mut full, key, value)?;
        full
    };

    // The result must still be a valid config.
    let _: ConsoleConfig = root
        .clone()
        .try_into()
        .with_context(|| format!("invalid value for '{key}': {value}"))?;

    let output = toml::to_string_pretty(&root).context("failed to serialize updated config")?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create config directory")?;
    }
    fs::write(path, output).context("failed to write config file")
}

/// Set a value in a TOML value tree using a dotted key path.
fn set_toml_value(root: &mut toml::Value, key: &str, raw_value: &str) -> Result<()> {
    let parts: Vec<&str> = key.split('.').filter(|p| !p.is_empty()).collect();
    let Some((leaf, sections)) = parts.split_last() else {
        anyhow::bail!("empty config key");
    };

    let mut current = root;
    for &part in sections {
        current = current
            .get_mut(part)
            .with_context(|| format!("config key not found: section '{part}' in '{key}'"))?;
    }

    let table = current
        .as_table_mut()
        .with_context(|| format!("expected a section above '{leaf}' in '{key}'"))?;

    let new_value = match table.get(*leaf) {
        Some(toml::Value::Boolean(_)) => toml::Value::Boolean(is_truthy(raw_value)),
        Some(toml::Value::Integer(_)) => {
            let n: i64 = raw_value
                .parse()
                .with_context(|| format!("expected integer for '{key}', got '{raw_value}'"))?;
            toml::Value::Integer(n)
        }
        Some(toml::Value::String(_)) => toml::Value::String(raw_value.to_string()),
        Some(_) => anyhow::bail!("'{key}' is a section, not a value"),
        None => anyhow::bail!("unknown config key: '{key}'"),
    };

    table.insert(leaf.to_string(), new_value);
    Ok(())
}

/// Reset the global config to defaults (overwrite the file).
pub fn reset_config() -> Result<PathBuf> {
    init_config(true)
}

/// Show the effective (fully resolved) config as TOML.
pub fn show_effective_config() -> Result<String> {
    let config = load();
    toml::to_string_pretty(&config).context("failed to serialize effective config")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
