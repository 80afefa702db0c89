use crate::domain::document::NodeId;
use crate::utils::error::PortfolioError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = PortfolioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(PortfolioError::InvalidConfigValueError {
                field: "theme".to_string(),
                value: other.to_string(),
                reason: "Expected 'light' or 'dark'".to_string(),
            }),
        }
    }
}

/// 文件座標中的矩形 (相對於頁面頂端，而非可視區域)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn center(&self) -> (f64, f64) {
        (self.left + self.width / 2.0, self.top + self.height / 2.0)
    }

    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.left && x <= self.right() && y >= self.top && y <= self.bottom()
    }
}

/// 頁面事件。座標皆為文件座標。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UiEvent {
    Click {
        target: Option<NodeId>,
        #[serde(default)]
        x: f64,
        #[serde(default)]
        y: f64,
    },
    KeyDown {
        key: String,
        #[serde(default)]
        target: Option<NodeId>,
    },
    Scroll {
        offset: f64,
    },
    Resize {
        width: f64,
        height: f64,
    },
    PointerMove {
        x: f64,
        y: f64,
    },
    PointerEnter {
        target: NodeId,
    },
    PointerLeave {
        target: NodeId,
    },
    /// 一個動畫幀，`now_ms` 為頁面啟動後的毫秒數
    Frame {
        now_ms: u64,
    },
    DomChanged,
}

/// 交給動畫函式庫的補間參數
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tween {
    pub props: BTreeMap<String, serde_json::Value>,
    pub duration: f64,
    pub delay: f64,
    pub ease: Option<String>,
    /// `props` 是起始值，元素從這裡補間回原本的狀態
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub from: bool,
}

impl Tween {
    pub fn set() -> Self {
        Self {
            props: BTreeMap::new(),
            duration: 0.0,
            delay: 0.0,
            ease: None,
            from: false,
        }
    }

    pub fn to(duration: f64, ease: &str) -> Self {
        Self {
            props: BTreeMap::new(),
            duration,
            delay: 0.0,
            ease: Some(ease.to_string()),
            from: false,
        }
    }

    pub fn from(duration: f64, ease: &str) -> Self {
        Self {
            from: true,
            ..Self::to(duration, ease)
        }
    }

    pub fn prop(mut self, name: &str, value: impl Into<serde_json::Value>) -> Self {
        self.props.insert(name.to_string(), value.into());
        self
    }

    pub fn delay(mut self, delay: f64) -> Self {
        self.delay = delay;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationRequest {
    pub effect: String,
    pub target: NodeId,
    pub tween: Tween,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionReceipt {
    pub status: u16,
    pub text: String,
    pub sent_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_parse_and_toggle() {
        assert_eq!("dark".parse::<Theme>().unwrap(), Theme::Dark);
        assert_eq!(" light ".parse::<Theme>().unwrap(), Theme::Light);
        assert!("sepia".parse::<Theme>().is_err());
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
        assert_eq!(Theme::Dark.toggled().toggled(), Theme::Dark);
    }

    #[test]
    fn test_ui_event_json_shape() {
        let event: UiEvent = serde_json::from_str(r#"{"type":"key_down","key":"Escape"}"#).unwrap();
        assert_eq!(
            event,
            UiEvent::KeyDown {
                key: "Escape".to_string(),
                target: None
            }
        );
    }
}
