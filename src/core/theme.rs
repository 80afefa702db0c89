use crate::domain::document::Document;
use crate::domain::model::Theme;
use crate::domain::ports::ThemeStore;
use crate::utils::error::Result;

pub struct ThemeController {
    store: Box<dyn ThemeStore>,
    current: Theme,
}

impl ThemeController {
    /// 啟動時讀取一次儲存的主題；讀取失敗或沒有值時使用 `fallback`
    pub fn init(store: Box<dyn ThemeStore>, fallback: Theme, document: &mut Document) -> Self {
        let current = match store.get() {
            Ok(Some(theme)) => theme,
            Ok(None) => fallback,
            Err(e) => {
                tracing::warn!("⚠️ Stored theme unreadable, using {}: {}", fallback, e);
                fallback
            }
        };
        let controller = Self { store, current };
        controller.apply(document);
        tracing::debug!("Theme initialized: {}", current);
        controller
    }

    pub fn current(&self) -> Theme {
        self.current
    }

    /// 切換主題並寫入儲存；寫入失敗時畫面仍會切換
    pub fn toggle(&mut self, document: &mut Document) -> Result<Theme> {
        self.current = self.current.toggled();
        self.apply(document);
        self.store.set(self.current)?;
        tracing::info!("🎨 Theme switched to {}", self.current);
        Ok(self.current)
    }

    fn apply(&self, document: &mut Document) {
        let root = document.root();
        document.set_attribute(root, "data-theme", self.current.as_str());
    }
}
