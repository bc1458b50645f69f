//! User configuration (`config.toml`).
//!
//! ```toml
//! [eval]
//! max_depth = 256
//!
//! [output]
//! pretty = true
//! ```

use crate::error::{Result, SheetcalcError};
use directories::ProjectDirs;
use serde::Deserialize;
use sheetcalc_engine::engine::EvalOptions;
use std::path::{Path, PathBuf};

const MAX_CONFIG_FILE_BYTES: u64 = 1_048_576; // 1 MiB

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub eval: EvalConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EvalConfig {
    /// Ceiling on nested formula references; absent means unbounded.
    pub max_depth: Option<usize>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    #[serde(default)]
    pub pretty: bool,
}

impl Config {
    pub fn eval_options(&self) -> EvalOptions {
        EvalOptions {
            max_depth: self.eval.max_depth,
        }
    }
}

/// Parse config text. `path` is only used for error messages.
pub fn parse_config(content: &str, path: &Path) -> Result<Config> {
    let config: Config = toml::from_str(content).map_err(|err| SheetcalcError::Config {
        path: path.to_path_buf(),
        message: err.to_string(),
    })?;
    if config.eval.max_depth == Some(0) {
        return Err(SheetcalcError::Config {
            path: path.to_path_buf(),
            message: "eval.max_depth must be at least 1".to_string(),
        });
    }
    Ok(config)
}

fn read_config_file(path: &Path) -> Result<Config> {
    let meta = std::fs::metadata(path)?;
    if meta.len() > MAX_CONFIG_FILE_BYTES {
        return Err(SheetcalcError::FileTooLarge {
            path: path.to_path_buf(),
            size: meta.len(),
            max: MAX_CONFIG_FILE_BYTES,
        });
    }
    let content = std::fs::read_to_string(path)?;
    parse_config(&content, path)
}

/// Load configuration from `explicit` or the user config directory.
///
/// Never fails: problems are returned as warnings and defaults are used.
/// A missing default file is silently ignored; a missing explicit file is
/// reported.
pub fn load_config(explicit: Option<&Path>) -> (Config, Vec<String>) {
    let mut warnings = Vec::new();
    let path = explicit.map(Path::to_path_buf).or_else(user_config_path);

    let Some(path) = path else {
        return (Config::default(), warnings);
    };

    if !path.exists() {
        if explicit.is_some() {
            warnings.push(format!("Config file not found: {}", path.display()));
        }
        return (Config::default(), warnings);
    }

    match read_config_file(&path) {
        Ok(config) => (config, warnings),
        Err(err) => {
            warnings.push(format!("Ignoring {}: {}", path.display(), err));
            (Config::default(), warnings)
        }
    }
}

/// Default config location, e.g. `~/.config/sheetcalc/config.toml`.
pub fn user_config_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("", "", "sheetcalc")?;
    Some(proj.config_dir().join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_config_full() {
        let config = parse_config(
            "[eval]\nmax_depth = 32\n\n[output]\npretty = true\n",
            Path::new("config.toml"),
        )
        .unwrap();
        assert_eq!(config.eval.max_depth, Some(32));
        assert!(config.output.pretty);
        assert_eq!(config.eval_options().max_depth, Some(32));
    }

    #[test]
    fn test_parse_config_empty_is_default() {
        let config = parse_config("", Path::new("config.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.eval_options(), EvalOptions::default());
    }

    #[test]
    fn test_parse_config_rejects_unknown_keys() {
        let err = parse_config("[eval]\nmax_dept = 3\n", Path::new("c.toml")).unwrap_err();
        assert!(matches!(err, SheetcalcError::Config { .. }));
    }

    #[test]
    fn test_parse_config_rejects_zero_depth() {
        assert!(parse_config("[eval]\nmax_depth = 0\n", Path::new("c.toml")).is_err());
    }

    #[test]
    fn test_load_config_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[output]\npretty = true").unwrap();
        let (config, warnings) = load_config(Some(file.path()));
        assert!(warnings.is_empty());
        assert!(config.output.pretty);
    }

    #[test]
    fn test_load_config_missing_explicit_file_warns() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        let (config, warnings) = load_config(Some(&missing));
        assert_eq!(config, Config::default());
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_load_config_invalid_file_warns() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "not = [valid").unwrap();
        let (config, warnings) = load_config(Some(file.path()));
        assert_eq!(config, Config::default());
        assert_eq!(warnings.len(), 1);
    }
}
