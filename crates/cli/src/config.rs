//! Parser settings from a TOML file, overridden by command-line flags.

use std::path::Path;

use serde::Deserialize;
use smali_syntax::ParserConfig;

/// On-disk layout: a single `[parser]` table whose keys mirror
/// [`ParserConfig`]. Missing keys take their defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    parser: ParserConfig,
}

/// Settings given on the command line. `None`/`false` leaves the file or
/// default value in place.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct Overrides {
    pub verbose_errors: bool,
    pub allow_odex: bool,
    pub api_level: Option<u32>,
    pub max_depth: Option<usize>,
}

pub(crate) fn load(path: &Path) -> Result<ParserConfig, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("could not read '{}': {}", path.display(), e))?;
    parse(&content).map_err(|e| format!("could not parse '{}': {}", path.display(), e))
}

fn parse(content: &str) -> Result<ParserConfig, toml::de::Error> {
    let file: ConfigFile = toml::from_str(content)?;
    Ok(file.parser)
}

/// Resolve the effective configuration: defaults, then the file, then flags.
pub(crate) fn resolve(file: Option<&Path>, overrides: Overrides) -> Result<ParserConfig, String> {
    let mut config = match file {
        Some(path) => load(path)?,
        None => ParserConfig::default(),
    };
    if overrides.verbose_errors {
        config.verbose_errors = true;
    }
    if overrides.allow_odex {
        config.allow_legacy_encodings = true;
    }
    if let Some(api) = overrides.api_level {
        config.api_level = api;
    }
    if let Some(depth) = overrides.max_depth {
        config.max_depth = depth;
    }
    log::debug!("effective parser config: {:?}", config);
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        assert_eq!(parse("").unwrap(), ParserConfig::default());
    }

    #[test]
    fn parser_table_is_read() {
        let config = parse("[parser]\nallow_legacy_encodings = true\napi_level = 10\n").unwrap();
        assert!(config.allow_legacy_encodings);
        assert_eq!(config.api_level, 10);
        assert_eq!(config.max_depth, ParserConfig::default().max_depth);
    }

    #[test]
    fn unknown_table_is_rejected() {
        assert!(parse("[lexer]\nfoo = 1\n").is_err());
    }

    #[test]
    fn flags_win_over_defaults() {
        let config = resolve(
            None,
            Overrides {
                allow_odex: true,
                api_level: Some(12),
                ..Overrides::default()
            },
        )
        .unwrap();
        assert!(config.allow_legacy_encodings);
        assert_eq!(config.api_level, 12);
        assert!(!config.verbose_errors);
    }
}
