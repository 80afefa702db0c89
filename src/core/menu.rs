use crate::config::MenuConfig;
use crate::domain::document::{Document, NodeId};
use crate::domain::selector::Selector;
use crate::utils::debounce::Debouncer;
use crate::utils::error::Result;
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MenuChange {
    Opened,
    Closed,
}

/// 行動版側邊選單
#[derive(Debug)]
pub struct MobileMenu {
    hamburger: Option<NodeId>,
    panel: Option<NodeId>,
    close_button: Option<NodeId>,
    links: Vec<NodeId>,
    open: bool,
    desktop_breakpoint: f64,
    pending_width: f64,
    resize: Debouncer,
}

impl MobileMenu {
    pub fn init(document: &Document, config: &MenuConfig) -> Result<Self> {
        let hamburger = document.query(&Selector::parse(&config.hamburger_selector)?);
        let panel = document.query(&Selector::parse(&config.menu_selector)?);
        let close_button = document.query(&Selector::parse(&config.close_selector)?);
        let links = match panel {
            Some(panel) => document
                .descendants(panel)
                .into_iter()
                .filter(|id| document.get(*id).is_some_and(|e| e.tag == "a"))
                .collect(),
            None => Vec::new(),
        };
        if hamburger.is_none() || panel.is_none() {
            tracing::debug!("No off-canvas menu on this page");
        }

        Ok(Self {
            hamburger,
            panel,
            close_button,
            links,
            open: false,
            desktop_breakpoint: config.desktop_breakpoint,
            pending_width: 0.0,
            resize: Debouncer::new(Duration::from_millis(config.resize_debounce_ms)),
        })
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn links(&self) -> &[NodeId] {
        &self.links
    }

    pub fn open(&mut self, document: &mut Document) -> Option<MenuChange> {
        let (hamburger, panel) = (self.hamburger?, self.panel?);
        if self.open {
            return None;
        }
        document.add_class(hamburger, "active");
        document.add_class(panel, "active");
        let body = document.body();
        document.add_class(body, "no-scroll");
        self.open = true;
        Some(MenuChange::Opened)
    }

    pub fn close(&mut self, document: &mut Document) -> Option<MenuChange> {
        let (hamburger, panel) = (self.hamburger?, self.panel?);
        if !self.open {
            return None;
        }
        document.remove_class(hamburger, "active");
        document.remove_class(panel, "active");
        let body = document.body();
        document.remove_class(body, "no-scroll");
        self.open = false;
        Some(MenuChange::Closed)
    }

    /// 處理點擊；回傳 true 表示這次點擊由選單本身消化 (漢堡鈕、關閉鈕)
    pub fn handle_click(
        &mut self,
        document: &mut Document,
        target: Option<NodeId>,
    ) -> (bool, Option<MenuChange>) {
        let on_hamburger = within(document, self.hamburger, target);
        let on_close = within(document, self.close_button, target);
        let on_link = self
            .links
            .iter()
            .any(|&link| within(document, Some(link), target));
        let in_panel = within(document, self.panel, target);

        if on_hamburger {
            let change = if self.open {
                self.close(document)
            } else {
                self.open(document)
            };
            return (true, change);
        }
        if on_close {
            return (true, self.close(document));
        }
        if on_link {
            // 連結照常導覽，只是順便關閉選單
            return (false, self.close(document));
        }
        if self.open && !in_panel {
            return (false, self.close(document));
        }
        (false, None)
    }

    pub fn handle_escape(&mut self, document: &mut Document) -> Option<MenuChange> {
        self.close(document)
    }

    pub fn note_resize(&mut self, width: f64, now: Duration) {
        self.pending_width = width;
        self.resize.trigger(now);
    }

    /// 去抖動後的 resize：視窗變成桌面寬度時關閉選單
    pub fn on_frame(&mut self, document: &mut Document, now: Duration) -> Option<MenuChange> {
        if self.resize.fire_if_due(now) && self.pending_width > self.desktop_breakpoint {
            return self.close(document);
        }
        None
    }
}

fn within(document: &Document, container: Option<NodeId>, target: Option<NodeId>) -> bool {
    match (container, target) {
        (Some(container), Some(target)) => document.contains(container, target),
        _ => false,
    }
}
