use crate::domain::model::{AnimationRequest, ContactMessage, SubmissionReceipt, Theme};
use crate::utils::error::Result;
use async_trait::async_trait;

/// 單一鍵值的主題儲存 (對應瀏覽器的 localStorage `theme`)
pub trait ThemeStore: Send {
    fn get(&self) -> Result<Option<Theme>>;
    fn set(&mut self, theme: Theme) -> Result<()>;
}

#[async_trait]
pub trait ContactSubmitter: Send + Sync {
    async fn submit(&self, message: &ContactMessage) -> Result<SubmissionReceipt>;
}

/// 動畫函式庫的觸發點，只送出請求不等待結果
pub trait Animator: Send {
    fn play(&mut self, request: AnimationRequest);
}
