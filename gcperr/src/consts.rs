use std::{
    env::current_exe,
    path::{Path, PathBuf},
};

use lazy_static::lazy_static;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const TARGET_OS_DISPLAY: &str = env!("GCPERR_TARGET_OS_DISPLAY");
pub const TARGET_ARCH_DISPLAY: &str = env!("GCPERR_TARGET_ARCH_DISPLAY");

/// Environment variable holding an OAuth2 access token for the API calls.
pub const ACCESS_TOKEN_ENV: &str = "GOOGLE_OAUTH_ACCESS_TOKEN";

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "GCPERR_LOG";

lazy_static! {
    /// The path to the directory where the executable is located.
    pub static ref EXE_DIR: PathBuf = {
        current_exe()
            .ok()
            .and_then(|path| path.parent().map(Path::to_path_buf))
            .unwrap_or_else(|| PathBuf::from("."))
    };

    /// The name of the executable, without the path.
    pub static ref EXE_NAME: String = {
        current_exe()
            .ok()
            .and_then(|path| {
                path.file_stem().map(|n| n.to_string_lossy().into_owned())
            })
            .unwrap_or_else(|| "gcperr".into())
    };
}
