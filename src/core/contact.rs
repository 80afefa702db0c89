//! 聯絡表單
//!
//! 表單驗證與送出按鈕狀態。實際寄送透過 [`ContactSubmitter`](crate::domain::ports::ContactSubmitter)
//! 完成，這裡只處理送出前後的頁面狀態，不會碰到卡片。

use crate::config::ContactConfig;
use crate::domain::document::{Document, NodeId};
use crate::domain::model::{ContactMessage, SubmissionReceipt};
use crate::utils::error::{PortfolioError, Result};
use regex::Regex;
use serde::Serialize;

const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";
const SENDING_LABEL: &str = "Sending...";

pub const MISSING_FIELDS_MESSAGE: &str = "Please fill in all fields.";
pub const INVALID_EMAIL_MESSAGE: &str = "Please enter a valid email address.";
pub const SUCCESS_MESSAGE: &str = "Thank you for your message! I'll get back to you soon.";

/// 單次送出的結果，會直接顯示給使用者
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SubmitOutcome {
    Sent {
        notice: String,
        receipt: SubmissionReceipt,
    },
    Rejected {
        notice: String,
    },
    Failed {
        notice: String,
        reason: String,
    },
    Unavailable {
        notice: String,
    },
}

impl SubmitOutcome {
    pub fn notice(&self) -> &str {
        match self {
            SubmitOutcome::Sent { notice, .. }
            | SubmitOutcome::Rejected { notice }
            | SubmitOutcome::Failed { notice, .. }
            | SubmitOutcome::Unavailable { notice } => notice,
        }
    }

    pub fn is_sent(&self) -> bool {
        matches!(self, SubmitOutcome::Sent { .. })
    }
}

#[derive(Debug, Clone)]
pub struct ContactValidator {
    email: Regex,
}

impl ContactValidator {
    pub fn new() -> Result<Self> {
        let email = Regex::new(EMAIL_PATTERN).map_err(|e| PortfolioError::ConfigError {
            message: format!("Invalid e-mail pattern: {}", e),
        })?;
        Ok(Self { email })
    }

    /// 去除前後空白後驗證三個欄位
    pub fn validate(&self, name: &str, email: &str, message: &str) -> Result<ContactMessage> {
        let (name, email, message) = (name.trim(), email.trim(), message.trim());
        if name.is_empty() || email.is_empty() || message.is_empty() {
            return Err(PortfolioError::ValidationError {
                message: MISSING_FIELDS_MESSAGE.to_string(),
            });
        }
        if !self.email.is_match(email) {
            return Err(PortfolioError::ValidationError {
                message: INVALID_EMAIL_MESSAGE.to_string(),
            });
        }
        Ok(ContactMessage {
            name: name.to_string(),
            email: email.to_string(),
            message: message.to_string(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct ContactForm {
    form: NodeId,
    name_field: Option<NodeId>,
    email_field: Option<NodeId>,
    message_field: Option<NodeId>,
    submit_button: Option<NodeId>,
    original_label: Option<String>,
    fallback_email: String,
    validator: ContactValidator,
}

fn field_named(document: &Document, form: NodeId, name: &str) -> Option<NodeId> {
    document
        .descendants(form)
        .into_iter()
        .find(|&node| document.attribute(node, "name") == Some(name))
}

impl ContactForm {
    /// 頁面上沒有表單時回傳 `Ok(None)`
    pub fn locate(
        document: &Document,
        config: &ContactConfig,
        fallback_email: &str,
    ) -> Result<Option<Self>> {
        let Some(form) = document.element_by_id(&config.form_id) else {
            tracing::debug!("No contact form '#{}' on the page", config.form_id);
            return Ok(None);
        };

        let submit_button = document.descendants(form).into_iter().find(|&node| {
            document.has_class(node, "btn")
                || document.get(node).map(|e| e.tag == "button").unwrap_or(false)
        });

        Ok(Some(Self {
            form,
            name_field: field_named(document, form, "from_name"),
            email_field: field_named(document, form, "reply_to"),
            message_field: field_named(document, form, "message"),
            submit_button,
            original_label: None,
            fallback_email: fallback_email.to_string(),
            validator: ContactValidator::new()?,
        }))
    }

    pub fn form(&self) -> NodeId {
        self.form
    }

    pub fn is_sending(&self) -> bool {
        self.original_label.is_some()
    }

    fn fields(&self) -> [Option<NodeId>; 3] {
        [self.name_field, self.email_field, self.message_field]
    }

    /// 欄位值存放在 `value` 屬性
    pub fn fill(&self, document: &mut Document, name: &str, email: &str, message: &str) {
        for (field, value) in self.fields().into_iter().zip([name, email, message]) {
            if let Some(field) = field {
                document.set_attribute(field, "value", value);
            }
        }
    }

    pub fn values(&self, document: &Document) -> (String, String, String) {
        let read = |field: Option<NodeId>| {
            field
                .and_then(|node| document.attribute(node, "value"))
                .unwrap_or_default()
                .to_string()
        };
        (
            read(self.name_field),
            read(self.email_field),
            read(self.message_field),
        )
    }

    pub fn validate(&self, document: &Document) -> Result<ContactMessage> {
        let (name, email, message) = self.values(document);
        self.validator.validate(&name, &email, &message)
    }

    /// 按鈕改成 "Sending..." 並停用
    pub fn begin(&mut self, document: &mut Document) {
        let Some(button) = self.submit_button else {
            self.original_label = Some(String::new());
            return;
        };
        if self.original_label.is_none() {
            self.original_label = Some(document.text_content(button));
        }
        document.set_text(button, SENDING_LABEL);
        document.set_attribute(button, "disabled", "");
    }

    /// 還原按鈕；成功時清空欄位
    pub fn finish(&mut self, document: &mut Document, succeeded: bool) {
        let label = self.original_label.take().unwrap_or_default();
        if let Some(button) = self.submit_button {
            document.set_text(button, &label);
            document.remove_attribute(button, "disabled");
        }
        if succeeded {
            for field in self.fields().into_iter().flatten() {
                document.set_attribute(field, "value", "");
            }
        }
    }

    pub fn failure_notice(&self) -> String {
        format!(
            "Failed to send message. Please try again or email me directly at {}",
            self.fallback_email
        )
    }

    pub fn unavailable_notice(&self) -> String {
        format!(
            "Email service is currently unavailable. Please email me directly at {}",
            self.fallback_email
        )
    }
}
