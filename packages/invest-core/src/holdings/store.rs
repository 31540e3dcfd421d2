//! Holdings file store.

use crate::types::Holdings;
use crate::{Error, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Reads and writes the holdings JSON file.
///
/// There is no locking: two processes running `update` at the same time can
/// each read the old file and the second rename wins, dropping the first
/// change. Writes themselves are atomic, so a crash never leaves a truncated
/// file behind.
#[derive(Debug, Clone)]
pub struct HoldingsStore {
    /// Path to the holdings JSON file
    path: PathBuf,
}

impl HoldingsStore {
    /// Create a store backed by the given file.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Get the default holdings file path.
    ///
    /// Default path: `~/.invest/holdings.json`, or `holdings.json` in the
    /// working directory when no home directory can be resolved.
    pub fn default_path() -> PathBuf {
        directories::BaseDirs::new()
            .map(|dirs| dirs.home_dir().join(".invest/holdings.json"))
            .unwrap_or_else(|| PathBuf::from("holdings.json"))
    }

    /// Get the current path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load holdings from disk.
    ///
    /// Returns an empty mapping when the file does not exist yet.
    pub fn load(&self) -> Result<Holdings> {
        if !self.path.exists() {
            return Ok(Holdings::new());
        }

        let content = fs::read_to_string(&self.path)?;
        let holdings = parse_holdings(&content)?;
        tracing::debug!(path = %self.path.display(), count = holdings.len(), "loaded holdings");
        Ok(holdings)
    }

    /// Save the full mapping, replacing whatever was stored before.
    ///
    /// The JSON is written to a temporary file next to the target and then
    /// renamed over it.
    pub fn save(&self, holdings: &Holdings) -> Result<()> {
        if let Some((ticker, quantity)) = holdings.iter().find(|(_, q)| !q.is_finite()) {
            return Err(Error::InvalidInput(format!(
                "quantity for {ticker} must be finite, got {quantity}"
            )));
        }

        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&parent)?;

        let content = serde_json::to_string_pretty(holdings)?;
        let mut tmp = NamedTempFile::new_in(&parent)?;
        tmp.write_all(content.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!(path = %self.path.display(), count = holdings.len(), "saved holdings");
        Ok(())
    }

    /// Insert or overwrite one ticker's quantity and persist.
    ///
    /// Returns the holdings as written.
    pub fn update(&self, ticker: &str, quantity: f64) -> Result<Holdings> {
        if ticker.is_empty() {
            return Err(Error::InvalidInput("ticker must not be empty".to_string()));
        }
        if !quantity.is_finite() {
            return Err(Error::InvalidInput(format!(
                "quantity for {ticker} must be finite, got {quantity}"
            )));
        }

        let mut holdings = self.load()?;
        holdings.insert(ticker.to_string(), quantity);
        self.save(&holdings)?;
        Ok(holdings)
    }

    /// Remove a ticker and persist.
    ///
    /// Returns the removed quantity, or `None` if the ticker was not held (the
    /// file is left untouched in that case).
    pub fn remove(&self, ticker: &str) -> Result<Option<f64>> {
        let mut holdings = self.load()?;
        let removed = holdings.remove(ticker);
        if removed.is_some() {
            self.save(&holdings)?;
        }
        Ok(removed)
    }
}

/// Parse a flat `{"TICKER": number, ...}` object.
fn parse_holdings(content: &str) -> Result<Holdings> {
    let data: serde_json::Value = serde_json::from_str(content)
        .map_err(|e| Error::Storage(format!("holdings file is not valid JSON: {e}")))?;

    let object = data.as_object().ok_or_else(|| {
        Error::Storage("holdings file must contain a JSON object of ticker to quantity".to_string())
    })?;

    let mut holdings = Holdings::new();
    for (ticker, value) in object {
        if ticker.is_empty() {
            return Err(Error::Storage("holdings file contains an empty ticker".to_string()));
        }
        let quantity = value.as_f64().ok_or_else(|| {
            Error::Storage(format!("quantity for {ticker} is not a number: {value}"))
        })?;
        holdings.insert(ticker.clone(), quantity);
    }

    Ok(holdings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample_holdings() -> Holdings {
        let mut holdings = Holdings::new();
        holdings.insert("AAPL".to_string(), 10.0);
        holdings.insert("MSFT".to_string(), 2.5);
        holdings.insert("VWCE.DE".to_string(), 0.125);
        holdings
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let store = HoldingsStore::with_path(dir.path().join("holdings.json"));

        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_round_trip() {
        let dir = tempdir().unwrap();
        let store = HoldingsStore::with_path(dir.path().join("holdings.json"));
        let holdings = sample_holdings();

        store.save(&holdings).unwrap();
        assert_eq!(store.load().unwrap(), holdings);
    }

    #[test]
    fn test_save_pretty_prints_with_two_spaces() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("holdings.json");
        let store = HoldingsStore::with_path(&path);

        let mut holdings = Holdings::new();
        holdings.insert("AAPL".to_string(), 1.5);
        store.save(&holdings).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "{\n  \"AAPL\": 1.5\n}");
    }

    #[test]
    fn test_save_creates_parent_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/deeper/holdings.json");
        let store = HoldingsStore::with_path(&path);

        store.save(&sample_holdings()).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_save_leaves_no_temp_files() {
        let dir = tempdir().unwrap();
        let store = HoldingsStore::with_path(dir.path().join("holdings.json"));

        store.save(&sample_holdings()).unwrap();
        store.update("GOOG", 3.0).unwrap();

        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_save_rejects_non_finite_quantity() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("holdings.json");
        let store = HoldingsStore::with_path(&path);

        let mut holdings = Holdings::new();
        holdings.insert("AAPL".to_string(), f64::NAN);

        assert!(matches!(store.save(&holdings), Err(Error::InvalidInput(_))));
        assert!(!path.exists());
    }

    #[test]
    fn test_update_inserts_and_overwrites() {
        let dir = tempdir().unwrap();
        let store = HoldingsStore::with_path(dir.path().join("holdings.json"));

        store.update("AAPL", 10.0).unwrap();
        store.update("MSFT", 5.0).unwrap();
        let holdings = store.update("AAPL", 12.5).unwrap();

        assert_eq!(holdings.len(), 2);
        assert_eq!(holdings["AAPL"], 12.5);
        assert_eq!(store.load().unwrap(), holdings);
    }

    #[test]
    fn test_update_is_case_sensitive() {
        let dir = tempdir().unwrap();
        let store = HoldingsStore::with_path(dir.path().join("holdings.json"));

        store.update("AAPL", 1.0).unwrap();
        let holdings = store.update("aapl", 2.0).unwrap();

        assert_eq!(holdings.len(), 2);
    }

    #[test]
    fn test_update_accepts_zero_and_negative() {
        let dir = tempdir().unwrap();
        let store = HoldingsStore::with_path(dir.path().join("holdings.json"));

        store.update("AAPL", 0.0).unwrap();
        let holdings = store.update("MSFT", -3.0).unwrap();

        assert_eq!(holdings["AAPL"], 0.0);
        assert_eq!(holdings["MSFT"], -3.0);
    }

    #[test]
    fn test_update_rejects_bad_input() {
        let dir = tempdir().unwrap();
        let store = HoldingsStore::with_path(dir.path().join("holdings.json"));

        assert!(matches!(store.update("", 1.0), Err(Error::InvalidInput(_))));
        assert!(matches!(
            store.update("AAPL", f64::INFINITY),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_remove() {
        let dir = tempdir().unwrap();
        let store = HoldingsStore::with_path(dir.path().join("holdings.json"));
        store.save(&sample_holdings()).unwrap();

        assert_eq!(store.remove("AAPL").unwrap(), Some(10.0));
        assert_eq!(store.remove("AAPL").unwrap(), None);
        assert!(!store.load().unwrap().contains_key("AAPL"));
    }

    #[test]
    fn test_load_accepts_integer_quantities() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("holdings.json");
        fs::write(&path, r#"{"AAPL": 10, "MSFT": 2.5}"#).unwrap();

        let holdings = HoldingsStore::with_path(&path).load().unwrap();
        assert_eq!(holdings["AAPL"], 10.0);
        assert_eq!(holdings["MSFT"], 2.5);
    }

    #[test]
    fn test_load_rejects_malformed_files() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("holdings.json");
        let store = HoldingsStore::with_path(&path);

        for content in [
            "not json",
            r#"["AAPL", 10]"#,
            r#"{"AAPL": "10"}"#,
            r#"{"AAPL": {"qty": 10}}"#,
            r#"{"AAPL": null}"#,
            r#"{"": 1}"#,
            "42",
        ] {
            fs::write(&path, content).unwrap();
            assert!(
                matches!(store.load(), Err(Error::Storage(_))),
                "expected storage error for {content}"
            );
        }
    }
}
