use crate::config::{MenuConfig, ScrollConfig};
use crate::domain::document::{Document, NodeId};
use crate::domain::selector::Selector;
use crate::utils::error::Result;
use crate::utils::viewport::{intersection_ratio, RootMargin, Viewport};
use serde::Serialize;
use std::time::Duration;

/// 捲動相關效果：導覽列狀態、進度條、目前區段、進場動畫與延遲載入圖片
#[derive(Debug)]
pub struct ScrollEffects {
    config: ScrollConfig,
    navbar: Option<NodeId>,
    progress_bar: NodeId,
    sections: Vec<SectionLink>,
    observed: Vec<NodeId>,
    pending_reveals: Vec<(Duration, NodeId)>,
    lazy_images: Vec<NodeId>,
}

#[derive(Debug, Clone)]
struct SectionLink {
    section: NodeId,
    anchor: String,
    links: Vec<NodeId>,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct ScrollUpdate {
    pub navbar_scrolled: bool,
    pub progress: f64,
    pub active_section: Option<String>,
    pub loaded_images: Vec<NodeId>,
}

impl ScrollEffects {
    pub fn init(document: &mut Document, config: &ScrollConfig, menu: &MenuConfig) -> Result<Self> {
        let navbar = document.query(&Selector::parse(&config.navbar_selector)?);
        let observed = document.query_all(&Selector::parse(&config.reveal_selector)?);
        let lazy_images = document.query_all(&Selector::parse(&config.lazy_image_selector)?);

        let menu_links: Vec<NodeId> = match document.query(&Selector::parse(&menu.menu_selector)?) {
            Some(panel) => document
                .descendants(panel)
                .into_iter()
                .filter(|id| document.get(*id).is_some_and(|e| e.tag == "a"))
                .collect(),
            None => Vec::new(),
        };
        let sections: Vec<SectionLink> = document
            .select(|e| e.tag == "section" && e.attribute("id").is_some())
            .into_iter()
            .filter_map(|section| {
                let anchor = format!("#{}", document.attribute(section, "id")?);
                let links = menu_links
                    .iter()
                    .copied()
                    .filter(|link| document.attribute(*link, "href") == Some(anchor.as_str()))
                    .collect();
                Some(SectionLink {
                    section,
                    anchor,
                    links,
                })
            })
            .collect();

        let body = document.body();
        let progress_bar = match document.append_child(body, "div") {
            Some(bar) => bar,
            None => body,
        };
        document.add_class(progress_bar, "scroll-progress");
        document.set_attribute(progress_bar, "style", "width: 0%");

        tracing::debug!(
            "Scroll effects: {} reveal target(s), {} lazy image(s), {} section(s)",
            observed.len(),
            lazy_images.len(),
            sections.len()
        );

        Ok(Self {
            config: config.clone(),
            navbar,
            progress_bar,
            sections,
            observed,
            pending_reveals: Vec::new(),
            lazy_images,
        })
    }

    pub fn on_scroll(&mut self, document: &mut Document, viewport: &Viewport, now: Duration) -> ScrollUpdate {
        let navbar_scrolled = viewport.scroll_y > self.config.navbar_threshold;
        if let Some(navbar) = self.navbar {
            document.toggle_class(navbar, "scrolled", navbar_scrolled);
        }

        let progress = scroll_progress(document, viewport);
        document.set_attribute(self.progress_bar, "style", &format!("width: {:.2}%", progress));

        let active_section = self.highlight_sections(document, viewport.scroll_y);
        self.observe_reveals(document, viewport, now);
        let loaded_images = self.load_visible_images(document, viewport);

        ScrollUpdate {
            navbar_scrolled,
            progress,
            active_section,
            loaded_images,
        }
    }

    /// 套用已到時間的進場動畫，回傳本次顯示的元素
    pub fn on_frame(&mut self, document: &mut Document, now: Duration) -> Vec<NodeId> {
        let (due, waiting): (Vec<_>, Vec<_>) = self
            .pending_reveals
            .drain(..)
            .partition(|(at, _)| *at <= now);
        self.pending_reveals = waiting;
        due.into_iter()
            .map(|(_, node)| {
                document.add_class(node, "visible");
                node
            })
            .collect()
    }

    /// 錨點連結的捲動目標；`#` 與 `#home` 回到頂端，找不到目標時回傳 None
    pub fn scroll_target(&self, document: &Document, href: &str) -> Option<f64> {
        if href == "#" || href == "#home" {
            return Some(0.0);
        }
        let target = document.element_by_id(href.strip_prefix('#')?)?;
        let navbar_height = self
            .navbar
            .and_then(|navbar| document.rect(navbar))
            .map(|rect| rect.height)
            .unwrap_or(0.0);
        let top = document.rect(target)?.top;
        Some((top - navbar_height).max(0.0))
    }

    pub fn pending_reveal_count(&self) -> usize {
        self.pending_reveals.len()
    }

    fn highlight_sections(&self, document: &mut Document, scroll_y: f64) -> Option<String> {
        let mut active = None;
        for entry in &self.sections {
            let Some(rect) = document.rect(entry.section) else {
                continue;
            };
            let top = rect.top - self.config.section_offset;
            let is_active = scroll_y > top && scroll_y <= top + rect.height;
            for &link in &entry.links {
                document.toggle_class(link, "current", is_active);
            }
            if is_active && active.is_none() {
                active = Some(entry.anchor.clone());
            }
        }
        active
    }

    fn observe_reveals(&mut self, document: &Document, viewport: &Viewport, now: Duration) {
        let margin = RootMargin {
            top: 0.0,
            bottom: -self.config.reveal_bottom_margin,
        };
        let threshold = self.config.reveal_threshold;
        let mut batch_index = 0u32;
        let stagger = Duration::from_millis(self.config.reveal_stagger_ms);

        self.observed.retain(|&node| {
            let Some(rect) = document.rect(node) else {
                return true;
            };
            let ratio = intersection_ratio(&rect, viewport, margin);
            if ratio > 0.0 && ratio >= threshold {
                // 同一批進入畫面的元素依序錯開，之後不再觀察
                self.pending_reveals.push((now + stagger * batch_index, node));
                batch_index += 1;
                false
            } else {
                true
            }
        });
    }

    fn load_visible_images(&mut self, document: &mut Document, viewport: &Viewport) -> Vec<NodeId> {
        let mut loaded = Vec::new();
        self.lazy_images.retain(|&img| {
            let visible = document
                .rect(img)
                .is_some_and(|rect| intersection_ratio(&rect, viewport, RootMargin::default()) > 0.0);
            if !visible {
                return true;
            }
            if let Some(src) = document.remove_attribute(img, "data-src") {
                document.set_attribute(img, "src", &src);
                loaded.push(img);
            }
            false
        });
        loaded
    }
}

/// 捲動百分比 (0..=100)，頁面不需捲動時為 0
pub fn scroll_progress(document: &Document, viewport: &Viewport) -> f64 {
    let scroll_height = document
        .descendants(document.root())
        .into_iter()
        .filter_map(|id| document.rect(id))
        .map(|rect| rect.bottom())
        .fold(0.0_f64, f64::max);
    let scrollable = scroll_height - viewport.height;
    if scrollable <= 0.0 {
        return 0.0;
    }
    (viewport.scroll_y / scrollable * 100.0).clamp(0.0, 100.0)
}
