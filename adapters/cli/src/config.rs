//! Scene configuration loading.

use std::{fs, path::Path};

use anyhow::{Context, Result as AnyResult};
use moonbound_rendering::SceneConfig;

/// Reads the scene from a TOML file, or falls back to the device defaults.
pub(crate) fn load(path: Option<&Path>) -> AnyResult<SceneConfig> {
    let Some(path) = path else {
        log::info!("no configuration file given, using device defaults");
        return Ok(SceneConfig::default());
    };

    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read configuration from {}", path.display()))?;
    parse(&text).with_context(|| format!("failed to parse configuration in {}", path.display()))
}

fn parse(text: &str) -> AnyResult<SceneConfig> {
    Ok(toml::from_str(text)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_config_matches_defaults() {
        let bundled = parse(include_str!("../moonbound.toml")).expect("bundled config parses");
        assert_eq!(bundled, SceneConfig::default());
    }

    #[test]
    fn missing_tables_fall_back_to_defaults() {
        let config = parse(
            r#"
            [particles]
            capacity = 8
            "#,
        )
        .expect("partial config parses");

        assert_eq!(config.particles.capacity, 8);
        assert_eq!(config.particles.width, 480);
        assert_eq!(config.shuttle, SceneConfig::default().shuttle);
    }

    #[test]
    fn unreadable_file_names_the_path() {
        let error = load(Some(Path::new("/nonexistent/moonbound.toml")))
            .expect_err("missing file must fail");
        assert!(error.to_string().contains("/nonexistent/moonbound.toml"));
    }

    #[test]
    fn malformed_values_are_rejected() {
        assert!(parse("[particles]\ncapacity = \"many\"").is_err());
    }
}
