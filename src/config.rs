use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::render::ViewId;

/// Flags that can be persisted with `--save`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigFlags {
    pub watch: bool,
    pub tree: bool,
    pub perf: bool,
    pub view: Option<ViewId>,
    pub throttle_ms: Option<u64>,
    pub render_debug_log: Option<PathBuf>,
}

impl ConfigFlags {
    /// Merge `other` over `self`: switches accumulate, options in `other` win.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            watch: self.watch || other.watch,
            tree: self.tree || other.tree,
            perf: self.perf || other.perf,
            view: other.view.or(self.view),
            throttle_ms: other.throttle_ms.or(self.throttle_ms),
            render_debug_log: other
                .render_debug_log
                .clone()
                .or_else(|| self.render_debug_log.clone()),
        }
    }
}

pub fn global_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join("orgpad").join("config");
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("orgpad")
                .join("config");
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join("orgpad").join("config");
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home).join(".config").join("orgpad").join("config");
        }
    }

    local_override_path()
}

pub fn local_override_path() -> PathBuf {
    PathBuf::from(".orgpadrc")
}

/// Read a flag file. A missing file yields the defaults.
///
/// # Errors
/// Returns an error if the file exists but cannot be read.
pub fn load_config_flags(path: &Path) -> Result<ConfigFlags> {
    if !path.exists() {
        return Ok(ConfigFlags::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let tokens = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .flat_map(|line| line.split_whitespace().map(ToOwned::to_owned))
        .collect::<Vec<_>>();
    Ok(parse_flag_tokens(&tokens))
}

/// # Errors
/// Returns an error if the directory or file cannot be written.
pub fn save_config_flags(path: &Path, flags: &ConfigFlags) -> Result<()> {
    let mut lines = vec!["# orgpad defaults (saved with --save)".to_string()];
    if flags.watch {
        lines.push("--watch".to_string());
    }
    if flags.tree {
        lines.push("--tree".to_string());
    }
    if flags.perf {
        lines.push("--perf".to_string());
    }
    if let Some(view) = flags.view {
        lines.push(format!("--view {view}"));
    }
    if let Some(ms) = flags.throttle_ms {
        lines.push(format!("--throttle-ms {ms}"));
    }
    if let Some(path) = &flags.render_debug_log {
        lines.push(format!("--render-debug-log {}", path.display()));
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
    }
    fs::write(path, format!("{}\n", lines.join("\n")))
        .with_context(|| format!("Failed to write config {}", path.display()))
}

/// # Errors
/// Returns an error if the file exists but cannot be removed.
pub fn clear_config_flags(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    Ok(())
}

/// Pick the known flags out of `tokens`, accepting `--flag value` and
/// `--flag=value`. Unknown tokens and unparsable values are skipped.
pub fn parse_flag_tokens(tokens: &[String]) -> ConfigFlags {
    let mut flags = ConfigFlags::default();
    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i].as_str();
        let (name, inline) = match token.split_once('=') {
            Some((name, value)) => (name, Some(value)),
            None => (token, None),
        };
        let mut value = || {
            inline.or_else(|| {
                let next = tokens.get(i + 1).map(String::as_str);
                if next.is_some() {
                    i += 1;
                }
                next
            })
        };
        match name {
            "--watch" => flags.watch = true,
            "--tree" => flags.tree = true,
            "--perf" => flags.perf = true,
            "--view" => {
                if let Some(view) = value().and_then(ViewId::parse) {
                    flags.view = Some(view);
                }
            }
            "--throttle-ms" => {
                if let Some(ms) = value().and_then(|v| v.parse().ok()) {
                    flags.throttle_ms = Some(ms);
                }
            }
            "--render-debug-log" => {
                if let Some(path) = value() {
                    flags.render_debug_log = Some(PathBuf::from(path));
                }
            }
            _ => {}
        }
        i += 1;
    }
    flags
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn tokens(args: &[&str]) -> Vec<String> {
        args.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_parse_flag_tokens_extracts_known_flags() {
        let flags = parse_flag_tokens(&tokens(&[
            "orgpad",
            "--watch",
            "--view",
            "raw",
            "--throttle-ms=50",
            "--render-debug-log=render.log",
            "notes.org",
        ]));
        assert!(flags.watch);
        assert!(!flags.tree);
        assert_eq!(flags.view, Some(ViewId::Raw));
        assert_eq!(flags.throttle_ms, Some(50));
        assert_eq!(flags.render_debug_log, Some(PathBuf::from("render.log")));
    }

    #[test]
    fn test_parse_flag_tokens_skips_bad_values() {
        let flags = parse_flag_tokens(&tokens(&["--view", "tree", "--throttle-ms", "soon"]));
        assert_eq!(flags.view, None);
        assert_eq!(flags.throttle_ms, None);
    }

    #[test]
    fn test_config_union_merges_cli_over_file_for_options() {
        let file = ConfigFlags {
            watch: true,
            view: Some(ViewId::Org),
            throttle_ms: Some(100),
            ..ConfigFlags::default()
        };
        let cli = ConfigFlags {
            tree: true,
            view: Some(ViewId::Rendered),
            ..ConfigFlags::default()
        };
        let merged = file.union(&cli);
        assert!(merged.watch);
        assert!(merged.tree);
        assert_eq!(merged.view, Some(ViewId::Rendered));
        assert_eq!(merged.throttle_ms, Some(100));
    }

    #[test]
    fn test_save_load_and_clear_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join(".orgpadrc");
        let flags = ConfigFlags {
            watch: true,
            tree: true,
            perf: true,
            view: Some(ViewId::Raw),
            throttle_ms: Some(20),
            render_debug_log: Some(PathBuf::from("render.log")),
        };

        save_config_flags(&path, &flags).unwrap();
        assert_eq!(load_config_flags(&path).unwrap(), flags);

        clear_config_flags(&path).unwrap();
        assert!(!path.exists());
        assert_eq!(load_config_flags(&path).unwrap(), ConfigFlags::default());
    }
}
