use crate::domain::model::Theme;
use crate::domain::ports::ThemeStore;
use crate::utils::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredState {
    theme: Option<Theme>,
}

/// 以 JSON 檔案保存 `{"theme": "dark"}`，相當於瀏覽器 localStorage 的單一鍵
#[derive(Debug, Clone)]
pub struct FileThemeStore {
    path: PathBuf,
}

impl FileThemeStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ThemeStore for FileThemeStore {
    fn get(&self) -> Result<Option<Theme>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(None);
        }
        let state: StoredState = serde_json::from_str(&content)?;
        Ok(state.theme)
    }

    fn set(&mut self, theme: Theme) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let data = serde_json::to_string(&StoredState { theme: Some(theme) })?;
        fs::write(&self.path, data)?;
        tracing::debug!("Theme '{}' written to {}", theme, self.path.display());
        Ok(())
    }
}

/// 記憶體內的主題儲存，clone 之後共用同一份資料
#[derive(Debug, Clone, Default)]
pub struct MemoryThemeStore {
    theme: Arc<Mutex<Option<Theme>>>,
}

impl MemoryThemeStore {
    pub fn with_theme(theme: Theme) -> Self {
        Self {
            theme: Arc::new(Mutex::new(Some(theme))),
        }
    }
}

impl ThemeStore for MemoryThemeStore {
    fn get(&self) -> Result<Option<Theme>> {
        match self.theme.lock() {
            Ok(guard) => Ok(*guard),
            Err(poisoned) => Ok(*poisoned.into_inner()),
        }
    }

    fn set(&mut self, theme: Theme) -> Result<()> {
        match self.theme.lock() {
            Ok(mut guard) => *guard = Some(theme),
            Err(poisoned) => *poisoned.into_inner() = Some(theme),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_store_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("theme.json");
        let mut store = FileThemeStore::new(&path);

        assert_eq!(store.get().unwrap(), None);
        store.set(Theme::Dark).unwrap();
        assert_eq!(store.get().unwrap(), Some(Theme::Dark));
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            r#"{"theme":"dark"}"#
        );
    }

    #[test]
    fn test_file_store_rejects_unknown_value() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("theme.json");
        std::fs::write(&path, r#"{"theme":"sepia"}"#).unwrap();

        let store = FileThemeStore::new(&path);
        assert!(store.get().is_err());
    }

    /// 其他執行緒持有鎖時 panic，讀寫仍然有效
    #[test]
    fn test_memory_store_survives_poisoned_lock() {
        let store = MemoryThemeStore::with_theme(Theme::Light);
        let shared = store.theme.clone();
        let result = std::thread::spawn(move || {
            let _guard = shared.lock().unwrap();
            panic!("poison the theme lock");
        })
        .join();
        assert!(result.is_err());
        assert!(store.theme.is_poisoned());

        let mut writer = store.clone();
        writer.set(Theme::Dark).unwrap();
        assert_eq!(store.get().unwrap(), Some(Theme::Dark));
    }
}
