use std::path::PathBuf;
use std::time::Duration;

/// Application-level constants
pub const APP_NAME: &str = "Pillbox";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Port the local web UI binds to (loopback only)
pub const DEFAULT_PORT: u16 = 7455;

/// Largest label photo the scan endpoint accepts
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Flat mock price for every refill line in the shop
pub const UNIT_PRICE_CENTS: i64 = 1500;

/// Simulated payment-processing time for the mock checkout
pub const CHECKOUT_DELAY: Duration = Duration::from_secs(2);

/// Local Ollama endpoint used for label text recognition
pub const OLLAMA_BASE_URL: &str = "http://localhost:11434";

/// Vision-capable model asked to transcribe label photos
pub const VISION_MODEL: &str = "llava";

/// Recognition request timeout (vision models can be slow on CPU)
pub const OLLAMA_TIMEOUT_SECS: u64 = 120;

/// Get the application data directory
/// ~/Pillbox/ on all platforms (user-visible, user-deletable)
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("Pillbox")
}

/// Get the path of the medication list file
pub fn store_path() -> PathBuf {
    app_data_dir().join("meds.json")
}

/// Default `RUST_LOG`-style filter when the env var is unset
pub fn default_log_filter() -> &'static str {
    "info,pillbox_lib=debug"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_data_dir_under_home() {
        let dir = app_data_dir();
        let home = dirs::home_dir().unwrap();
        assert!(dir.starts_with(home));
        assert!(dir.ends_with("Pillbox"));
    }

    #[test]
    fn store_path_under_app_data() {
        let store = store_path();
        let app = app_data_dir();
        assert!(store.starts_with(app));
        assert!(store.ends_with("meds.json"));
    }

    #[test]
    fn app_name_is_pillbox() {
        assert_eq!(APP_NAME, "Pillbox");
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.3.0");
    }

    #[test]
    fn checkout_delay_is_two_seconds() {
        assert_eq!(CHECKOUT_DELAY, Duration::from_secs(2));
    }
}
