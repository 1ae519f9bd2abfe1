//! Configuration for where FormatString nodes read and write files.

use log::warn;
use std::env;
use std::path::{Path, PathBuf};

/// Environment variable naming the editor's installation directory.
pub const COMFYUI_PATH_ENV: &str = "COMFYUI_PATH";

/// Environment variable overriding the directory saved states are written under.
pub const OUTPUT_DIR_ENV: &str = "FORMAT_STRING_OUTPUT_DIR";

/// File locations used by the node.
///
/// # Examples
///
/// ```rust
/// use format_string::FormatStringConfig;
///
/// let config = FormatStringConfig::with_comfy_path("/opt/ComfyUI");
/// assert_eq!(config.output_dir, std::path::Path::new("/opt/ComfyUI/output"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatStringConfig {
    /// Base installation directory of the editor.
    pub comfy_path: PathBuf,

    /// Directory relative save paths are resolved against.
    ///
    /// **Default:** `<comfy_path>/output`
    pub output_dir: PathBuf,
}

impl FormatStringConfig {
    pub fn with_comfy_path(comfy_path: impl Into<PathBuf>) -> Self {
        let comfy_path = comfy_path.into();
        Self {
            output_dir: comfy_path.join("output"),
            comfy_path,
        }
    }

    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    /// Reads [`COMFYUI_PATH_ENV`] and [`OUTPUT_DIR_ENV`].
    ///
    /// When the installation path is unset a warning is logged and it defaults
    /// to two directories above the running executable.
    pub fn from_env() -> Self {
        let comfy_path = match env::var_os(COMFYUI_PATH_ENV) {
            Some(path) if !path.is_empty() => PathBuf::from(path),
            _ => {
                let fallback = default_comfy_path();
                warn!(
                    "The `{}` environment variable is not set. Assuming `{}` as the ComfyUI path.",
                    COMFYUI_PATH_ENV,
                    fallback.display()
                );
                fallback
            }
        };

        let config = Self::with_comfy_path(comfy_path);
        match env::var_os(OUTPUT_DIR_ENV) {
            Some(dir) if !dir.is_empty() => config.with_output_dir(dir),
            _ => config,
        }
    }
}

fn default_comfy_path() -> PathBuf {
    let exe_dir = env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."));
    exe_dir.join("..").join("..")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_dir_defaults_under_comfy_path() {
        let config = FormatStringConfig::with_comfy_path("/srv/comfy");
        assert_eq!(config.comfy_path, PathBuf::from("/srv/comfy"));
        assert_eq!(config.output_dir, PathBuf::from("/srv/comfy/output"));
    }

    #[test]
    fn test_output_dir_override() {
        let config = FormatStringConfig::with_comfy_path("/srv/comfy").with_output_dir("/tmp/out");
        assert_eq!(config.output_dir, PathBuf::from("/tmp/out"));
    }

    #[test]
    fn test_default_comfy_path_is_relative_to_executable() {
        let path = default_comfy_path();
        assert!(path.ends_with(Path::new("..").join("..")));
    }
}
