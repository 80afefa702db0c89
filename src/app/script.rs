//! 事件腳本
//!
//! CLI 用 JSON 描述一連串使用者操作，目標以元素 id、class 加索引，
//! 或卡片群組加索引指定，重播時才解析成 [`NodeId`]。

use crate::app::page::{DispatchOutcome, Page};
use crate::core::contact::SubmitOutcome;
use crate::domain::document::NodeId;
use crate::domain::model::UiEvent;
use crate::utils::error::{PortfolioError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TargetRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    /// 卡片群組名稱；解析成該卡片的標題
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card: Option<String>,
    #[serde(default)]
    pub index: usize,
}

impl TargetRef {
    pub fn id(id: &str) -> Self {
        Self {
            id: Some(id.to_string()),
            ..Self::default()
        }
    }

    pub fn class(class: &str, index: usize) -> Self {
        Self {
            class: Some(class.to_string()),
            index,
            ..Self::default()
        }
    }

    pub fn card(group: &str, index: usize) -> Self {
        Self {
            card: Some(group.to_string()),
            index,
            ..Self::default()
        }
    }

    pub fn resolve(&self, page: &Page) -> Result<NodeId> {
        let document = page.document();
        let found = if let Some(id) = &self.id {
            document.element_by_id(id)
        } else if let Some(class) = &self.class {
            document.elements_with_class(class).get(self.index).copied()
        } else if let Some(group) = &self.card {
            page.cards()
                .card_in_group(group, self.index)
                .and_then(|card| page.cards().card(card))
                .map(|card| card.title())
        } else {
            None
        };
        found.ok_or_else(|| PortfolioError::DocumentError {
            message: format!("Script target not found: {:?}", self),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScriptStep {
    Click {
        #[serde(default)]
        target: Option<TargetRef>,
        #[serde(default)]
        x: f64,
        #[serde(default)]
        y: f64,
    },
    Key {
        key: String,
        #[serde(default)]
        target: Option<TargetRef>,
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
        target: TargetRef,
    },
    PointerLeave {
        target: TargetRef,
    },
    /// 讓時鐘前進並送出一個動畫幀
    Wait {
        ms: u64,
    },
    DomChanged,
    SubmitContact {
        name: String,
        email: String,
        message: String,
    },
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ScriptReport {
    pub steps: usize,
    pub outcomes: Vec<DispatchOutcome>,
    pub submissions: Vec<SubmitOutcome>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventScript {
    pub steps: Vec<ScriptStep>,
}

impl EventScript {
    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    fn to_event(step: &ScriptStep, page: &Page) -> Result<Option<UiEvent>> {
        let resolve = |target: &Option<TargetRef>| -> Result<Option<NodeId>> {
            target.as_ref().map(|t| t.resolve(page)).transpose()
        };
        let event = match step {
            ScriptStep::Click { target, x, y } => UiEvent::Click {
                target: resolve(target)?,
                x: *x,
                y: *y,
            },
            ScriptStep::Key { key, target } => UiEvent::KeyDown {
                key: key.clone(),
                target: resolve(target)?,
            },
            ScriptStep::Scroll { offset } => UiEvent::Scroll { offset: *offset },
            ScriptStep::Resize { width, height } => UiEvent::Resize {
                width: *width,
                height: *height,
            },
            ScriptStep::PointerMove { x, y } => UiEvent::PointerMove { x: *x, y: *y },
            ScriptStep::PointerEnter { target } => UiEvent::PointerEnter {
                target: target.resolve(page)?,
            },
            ScriptStep::PointerLeave { target } => UiEvent::PointerLeave {
                target: target.resolve(page)?,
            },
            ScriptStep::Wait { ms } => UiEvent::Frame {
                now_ms: page.now().as_millis() as u64 + ms,
            },
            ScriptStep::DomChanged => UiEvent::DomChanged,
            ScriptStep::SubmitContact { .. } => return Ok(None),
        };
        Ok(Some(event))
    }

    /// 依序重播；找不到目標時中止並回傳錯誤
    pub async fn run(&self, page: &mut Page) -> Result<ScriptReport> {
        let mut report = ScriptReport::default();
        for (index, step) in self.steps.iter().enumerate() {
            tracing::debug!("Step {}: {:?}", index + 1, step);
            if let ScriptStep::SubmitContact {
                name,
                email,
                message,
            } = step
            {
                let outcome = page.submit_contact(name, email, message).await;
                report.submissions.push(outcome);
            } else if let Some(event) = Self::to_event(step, page)? {
                let outcome = page.dispatch(event);
                if !outcome.is_empty() {
                    report.outcomes.push(outcome);
                }
            }
            report.steps += 1;
        }
        tracing::info!("▶️ Replayed {} step(s)", report.steps);
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_script() {
        let script = EventScript::from_json_str(
            r#"[
                {"type": "click", "target": {"card": "projects", "index": 1}},
                {"type": "key", "key": "Escape"},
                {"type": "scroll", "offset": 300},
                {"type": "wait", "ms": 250},
                {"type": "dom_changed"},
                {"type": "submit_contact", "name": "Ada", "email": "ada@example.com", "message": "Hi"}
            ]"#,
        )
        .unwrap();

        assert_eq!(script.steps.len(), 6);
        assert_eq!(
            script.steps[0],
            ScriptStep::Click {
                target: Some(TargetRef::card("projects", 1)),
                x: 0.0,
                y: 0.0,
            }
        );
        assert_eq!(script.steps[3], ScriptStep::Wait { ms: 250 });
    }

    #[test]
    fn test_unknown_step_type_is_rejected() {
        let result = EventScript::from_json_str(r#"[{"type": "teleport"}]"#);
        assert!(matches!(result, Err(PortfolioError::SerializationError(_))));
    }
}
