use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};

use crate::channel::HostMessage;
use crate::limits::MAX_CONTENT_SIZE_BYTES;

pub const DEFAULT_SAVE_DEBOUNCE_MS: u64 = 50;
pub const DEFAULT_HOST_DEBOUNCE_MS: u64 = 100;
pub const DEFAULT_COOLDOWN_MS: u64 = 500;
pub const DEFAULT_SCROLL_THROTTLE_MS: u64 = 100;

/// Flags as written on the command line or in an rc file. `None` means the
/// flag was not given.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigFlags {
    pub auto_reload: Option<bool>,
    pub show_syntax_on_focus: bool,
    pub save_debounce_ms: Option<u64>,
    pub host_debounce_ms: Option<u64>,
    pub cooldown_ms: Option<u64>,
    pub scroll_throttle_ms: Option<u64>,
    pub max_content_bytes: Option<usize>,
    pub perf: bool,
    pub sync_debug_log: Option<PathBuf>,
}

impl ConfigFlags {
    /// Merge two flag sets; values in `other` win.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            auto_reload: other.auto_reload.or(self.auto_reload),
            show_syntax_on_focus: self.show_syntax_on_focus || other.show_syntax_on_focus,
            save_debounce_ms: other.save_debounce_ms.or(self.save_debounce_ms),
            host_debounce_ms: other.host_debounce_ms.or(self.host_debounce_ms),
            cooldown_ms: other.cooldown_ms.or(self.cooldown_ms),
            scroll_throttle_ms: other.scroll_throttle_ms.or(self.scroll_throttle_ms),
            max_content_bytes: other.max_content_bytes.or(self.max_content_bytes),
            perf: self.perf || other.perf,
            sync_debug_log: other
                .sync_debug_log
                .clone()
                .or_else(|| self.sync_debug_log.clone()),
        }
    }
}

/// Resolved sync policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    /// Reload the editor when the file changes underneath it.
    pub auto_reload: bool,
    pub show_syntax_on_focus: bool,
    /// Quiet period before an editor edit is written to the host.
    pub save_debounce_ms: u64,
    /// Quiet period before a host change is examined.
    pub host_debounce_ms: u64,
    /// How long after a self-write host changes are treated as echoes.
    pub cooldown_ms: u64,
    pub scroll_throttle_ms: u64,
    pub max_content_bytes: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            auto_reload: true,
            show_syntax_on_focus: false,
            save_debounce_ms: DEFAULT_SAVE_DEBOUNCE_MS,
            host_debounce_ms: DEFAULT_HOST_DEBOUNCE_MS,
            cooldown_ms: DEFAULT_COOLDOWN_MS,
            scroll_throttle_ms: DEFAULT_SCROLL_THROTTLE_MS,
            max_content_bytes: MAX_CONTENT_SIZE_BYTES,
        }
    }
}

impl Settings {
    pub fn from_flags(flags: &ConfigFlags) -> Self {
        let defaults = Self::default();
        Self {
            auto_reload: flags.auto_reload.unwrap_or(defaults.auto_reload),
            show_syntax_on_focus: flags.show_syntax_on_focus,
            save_debounce_ms: flags.save_debounce_ms.unwrap_or(defaults.save_debounce_ms),
            host_debounce_ms: flags.host_debounce_ms.unwrap_or(defaults.host_debounce_ms),
            cooldown_ms: flags.cooldown_ms.unwrap_or(defaults.cooldown_ms),
            scroll_throttle_ms: flags
                .scroll_throttle_ms
                .unwrap_or(defaults.scroll_throttle_ms),
            max_content_bytes: flags
                .max_content_bytes
                .unwrap_or(defaults.max_content_bytes),
        }
    }

    /// The part of the settings the rendering side needs.
    pub const fn editor_config(&self) -> HostMessage {
        HostMessage::Config {
            show_syntax_on_focus: self.show_syntax_on_focus,
        }
    }
}

pub fn global_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join("velvet").join("config");
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("velvet")
                .join("config");
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join("velvet").join("config");
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home).join(".config").join("velvet").join("config");
        }
    }

    PathBuf::from(".velvetrc")
}

pub fn local_override_path() -> PathBuf {
    PathBuf::from(".velvetrc")
}

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

pub fn save_config_flags(path: &Path, flags: &ConfigFlags) -> Result<()> {
    let mut lines = Vec::new();
    lines.push("# velvet defaults (saved with --save)".to_string());
    match flags.auto_reload {
        Some(true) => lines.push("--auto-reload".to_string()),
        Some(false) => lines.push("--no-auto-reload".to_string()),
        None => {}
    }
    if flags.show_syntax_on_focus {
        lines.push("--show-syntax-on-focus".to_string());
    }
    if let Some(ms) = flags.save_debounce_ms {
        lines.push(format!("--save-debounce-ms {ms}"));
    }
    if let Some(ms) = flags.host_debounce_ms {
        lines.push(format!("--host-debounce-ms {ms}"));
    }
    if let Some(ms) = flags.cooldown_ms {
        lines.push(format!("--cooldown-ms {ms}"));
    }
    if let Some(ms) = flags.scroll_throttle_ms {
        lines.push(format!("--scroll-throttle-ms {ms}"));
    }
    if let Some(bytes) = flags.max_content_bytes {
        lines.push(format!("--max-content-bytes {bytes}"));
    }
    if flags.perf {
        lines.push("--perf".to_string());
    }
    if let Some(path) = &flags.sync_debug_log {
        lines.push(format!("--sync-debug-log {}", path.display()));
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
    }
    fs::write(path, format!("{}\n", lines.join("\n")))
        .with_context(|| format!("Failed to write config {}", path.display()))
}

pub fn clear_config_flags(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    Ok(())
}

/// Pull known flags out of a token list. Unknown tokens and unparsable
/// values are ignored.
pub fn parse_flag_tokens(tokens: &[String]) -> ConfigFlags {
    let mut flags = ConfigFlags::default();
    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i].as_str();
        let (name, inline) = match token.split_once('=') {
            Some((name, value)) => (name, Some(value)),
            None => (token, None),
        };
        let takes_value = matches!(
            name,
            "--save-debounce-ms"
                | "--host-debounce-ms"
                | "--cooldown-ms"
                | "--scroll-throttle-ms"
                | "--max-content-bytes"
                | "--sync-debug-log"
        );
        let value = if takes_value && inline.is_none() {
            let next = tokens.get(i + 1).map(String::as_str);
            if next.is_some() {
                i += 1;
            }
            next
        } else {
            inline
        };

        match name {
            "--auto-reload" => flags.auto_reload = Some(true),
            "--no-auto-reload" => flags.auto_reload = Some(false),
            "--show-syntax-on-focus" => flags.show_syntax_on_focus = true,
            "--perf" => flags.perf = true,
            "--save-debounce-ms" => flags.save_debounce_ms = parse_number(value),
            "--host-debounce-ms" => flags.host_debounce_ms = parse_number(value),
            "--cooldown-ms" => flags.cooldown_ms = parse_number(value),
            "--scroll-throttle-ms" => flags.scroll_throttle_ms = parse_number(value),
            "--max-content-bytes" => flags.max_content_bytes = parse_number(value),
            "--sync-debug-log" => flags.sync_debug_log = value.map(PathBuf::from),
            _ => {}
        }
        i += 1;
    }
    flags
}

fn parse_number<T: FromStr>(value: Option<&str>) -> Option<T> {
    value.and_then(|v| v.parse().ok())
}
