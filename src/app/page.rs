//! 頁面組裝
//!
//! [`Page`] 擁有文件與所有控制器，並以固定順序分派事件。
//! 卡片狀態只經由 [`CardCoordinator`] 改變；其他控制器只看得到文件。

use crate::config::SiteConfig;
use crate::core::cards::{CardCoordinator, CardId, DocumentView, ToggleOutcome};
use crate::core::contact::{ContactForm, SubmitOutcome, SUCCESS_MESSAGE};
use crate::core::discovery::{discover_cards, DiscoveryReport};
use crate::core::effects::{success_glow, EffectContext, EffectRegistry};
use crate::core::intro::{IntroUpdate, PageIntro};
use crate::core::menu::{MenuChange, MobileMenu};
use crate::core::scroll::{ScrollEffects, ScrollUpdate};
use crate::core::theme::ThemeController;
use crate::domain::document::{Document, NodeId};
use crate::domain::model::{Theme, UiEvent};
use crate::domain::ports::{Animator, ContactSubmitter, ThemeStore};
use crate::utils::error::{PortfolioError, Result};
use crate::utils::viewport::Viewport;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// 一次分派造成的變化
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DispatchOutcome {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub toggled: Option<ToggleOutcome>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub collapsed: Vec<CardId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub menu: Option<MenuChange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<Theme>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scroll_to: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scroll: Option<ScrollUpdate>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub revealed: Vec<NodeId>,
    #[serde(skip_serializing_if = "IntroUpdate::is_empty")]
    pub intro: IntroUpdate,
    #[serde(skip_serializing_if = "is_zero")]
    pub effects_attached: usize,
}

fn is_zero(value: &usize) -> bool {
    *value == 0
}

impl DispatchOutcome {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CardSnapshot {
    pub title: String,
    pub expanded: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupSnapshot {
    pub name: String,
    pub cards: Vec<CardSnapshot>,
}

/// 可序列化的頁面狀態，CLI 最後輸出的就是這個
#[derive(Debug, Clone, Serialize)]
pub struct PageSnapshot {
    pub theme: Theme,
    pub loaded: bool,
    pub menu_open: bool,
    pub page_expanded: bool,
    pub scroll_y: f64,
    pub groups: Vec<GroupSnapshot>,
    pub effects: Vec<String>,
    pub pending_reveals: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_notice: Option<String>,
}

pub struct Page {
    document: Document,
    config: SiteConfig,
    cards: CardCoordinator,
    theme: ThemeController,
    menu: MobileMenu,
    scroll: ScrollEffects,
    effects: EffectRegistry,
    intro: PageIntro,
    contact: Option<ContactForm>,
    submitter: Option<Arc<dyn ContactSubmitter>>,
    animator: Box<dyn Animator>,
    viewport: Viewport,
    now: Duration,
    last_notice: Option<String>,
}

impl Page {
    /// 建立所有控制器。探索卡片時發現的問題放在報告裡，不會讓初始化失敗。
    pub fn init(
        mut document: Document,
        config: &SiteConfig,
        theme_store: Box<dyn ThemeStore>,
        animator: Box<dyn Animator>,
    ) -> Result<(Self, DiscoveryReport)> {
        let theme = ThemeController::init(theme_store, config.theme.default, &mut document);

        let report = discover_cards(&document, &config.cards);
        for issue in &report.issues {
            tracing::warn!("⚠️ {}", issue);
        }
        let cards =
            CardCoordinator::new(report.groups.clone()).with_scope(config.cards.accordion_scope);
        {
            let mut view = DocumentView::new(&mut document, &config.cards.page_expanded_class);
            for card in cards.cards() {
                view.prepare_card(card);
            }
            cards.render_all(&mut view);
        }

        let menu = MobileMenu::init(&document, &config.menu)?;
        let scroll = ScrollEffects::init(&mut document, &config.scroll, &config.menu)?;
        let effects = EffectRegistry::from_config(&config.effects)?;
        let intro = PageIntro::init(&document, &config.intro)?;
        let contact = ContactForm::locate(&document, &config.contact, &config.site.owner_email)?;

        let mut page = Self {
            document,
            config: config.clone(),
            cards,
            theme,
            menu,
            scroll,
            effects,
            intro,
            contact,
            submitter: None,
            animator,
            viewport: Viewport::default(),
            now: Duration::ZERO,
            last_notice: None,
        };
        let attached = page.with_effects(|effects, ctx| effects.attach_all(ctx));
        page.with_intro(|intro, ctx| intro.on_load(ctx));

        tracing::info!(
            "🚀 Page ready: {} card(s) in {} group(s), {} effect instance(s)",
            report.card_count(),
            page.cards.groups().len(),
            attached
        );
        Ok((page, report))
    }

    pub fn with_submitter(mut self, submitter: Arc<dyn ContactSubmitter>) -> Self {
        self.submitter = Some(submitter);
        self
    }

    pub fn set_submitter(&mut self, submitter: Arc<dyn ContactSubmitter>) {
        self.submitter = Some(submitter);
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn cards(&self) -> &CardCoordinator {
        &self.cards
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    pub fn theme(&self) -> Theme {
        self.theme.current()
    }

    pub fn menu_open(&self) -> bool {
        self.menu.is_open()
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn effect_names(&self) -> Vec<&'static str> {
        self.effects.names()
    }

    /// 依固定順序把事件交給各控制器
    pub fn dispatch(&mut self, event: UiEvent) -> DispatchOutcome {
        let mut outcome = DispatchOutcome::default();
        match event {
            UiEvent::Click { target, x, y } => self.on_click(target, x, y, &mut outcome),
            UiEvent::KeyDown { key, target } => self.on_key(&key, target, &mut outcome),
            UiEvent::Scroll { offset } => {
                self.viewport.scroll_y = offset.max(0.0);
                let viewport = self.viewport;
                let update = self.scroll.on_scroll(&mut self.document, &viewport, self.now);
                self.with_effects(|effects, ctx| effects.scroll(ctx));
                outcome.intro = self.with_intro(|intro, ctx| intro.on_scroll(ctx));
                outcome.scroll = Some(update);
            }
            UiEvent::Resize { width, height } => {
                self.viewport.width = width;
                self.viewport.height = height;
                self.menu.note_resize(width, self.now);
            }
            UiEvent::PointerMove { x, y } => {
                self.with_effects(|effects, ctx| effects.pointer_move(x, y, ctx));
            }
            UiEvent::PointerEnter { target } => {
                self.with_effects(|effects, ctx| effects.pointer_enter(target, ctx));
            }
            UiEvent::PointerLeave { target } => {
                self.with_effects(|effects, ctx| effects.pointer_leave(target, ctx));
            }
            UiEvent::Frame { now_ms } => {
                // 時鐘只會往前走
                self.now = self.now.max(Duration::from_millis(now_ms));
                outcome.menu = self.menu.on_frame(&mut self.document, self.now);
                outcome.revealed = self.scroll.on_frame(&mut self.document, self.now);
                self.with_effects(|effects, ctx| effects.frame(ctx));
                self.with_intro(|intro, ctx| intro.on_frame(ctx));
            }
            UiEvent::DomChanged => {
                outcome.effects_attached = self.with_effects(|effects, ctx| effects.attach_all(ctx));
            }
        }
        outcome
    }

    fn on_click(&mut self, target: Option<NodeId>, x: f64, y: f64, outcome: &mut DispatchOutcome) {
        let (consumed, change) = self.menu.handle_click(&mut self.document, target);
        outcome.menu = change;
        if consumed {
            return;
        }

        let Some(target) = target else {
            outcome.collapsed = self.collapse_if_expanded();
            return;
        };

        if self.is_theme_toggle(target) {
            outcome.theme = Some(self.toggle_theme());
            return;
        }

        if let Some(card) = self.cards.card_for_title(&self.document, target) {
            outcome.toggled = self.toggle_card(card);
        } else if !self.cards.is_inside_card(&self.document, target) {
            outcome.collapsed = self.collapse_if_expanded();
        }

        if let Some(href) = self.anchor_href(target) {
            outcome.scroll_to = self.scroll.scroll_target(&self.document, &href);
        }

        self.with_effects(|effects, ctx| effects.click(target, x, y, ctx));
    }

    fn on_key(&mut self, key: &str, target: Option<NodeId>, outcome: &mut DispatchOutcome) {
        match key {
            "Escape" => {
                outcome.collapsed = self.cards.collapse_all(&mut DocumentView::new(
                    &mut self.document,
                    &self.config.cards.page_expanded_class,
                ));
                outcome.menu = self.menu.handle_escape(&mut self.document);
            }
            "Enter" | " " | "Space" => {
                let Some(target) = target else {
                    return;
                };
                if self.is_theme_toggle(target) {
                    outcome.theme = Some(self.toggle_theme());
                } else if let Some(card) = self.cards.card_for_title(&self.document, target) {
                    outcome.toggled = self.toggle_card(card);
                }
            }
            _ => {}
        }
    }

    pub fn toggle_card(&mut self, card: CardId) -> Option<ToggleOutcome> {
        let mut view = DocumentView::new(&mut self.document, &self.config.cards.page_expanded_class);
        self.cards.toggle(card, &mut view)
    }

    pub fn collapse_all(&mut self) -> Vec<CardId> {
        let mut view = DocumentView::new(&mut self.document, &self.config.cards.page_expanded_class);
        self.cards.collapse_all(&mut view)
    }

    fn collapse_if_expanded(&mut self) -> Vec<CardId> {
        if self.cards.page_expanded() {
            self.collapse_all()
        } else {
            Vec::new()
        }
    }

    fn toggle_theme(&mut self) -> Theme {
        match self.theme.toggle(&mut self.document) {
            Ok(theme) => theme,
            Err(e) => {
                tracing::warn!("⚠️ Theme switched but not saved: {}", e);
                self.theme.current()
            }
        }
    }

    fn is_theme_toggle(&self, target: NodeId) -> bool {
        self.document
            .element_by_id(&self.config.theme.toggle_id)
            .is_some_and(|toggle| self.document.contains(toggle, target))
    }

    fn anchor_href(&self, target: NodeId) -> Option<String> {
        let anchor = self.document.closest(target, |e| {
            e.tag == "a" && e.attribute("href").is_some_and(|href| href.starts_with('#'))
        })?;
        self.document.attribute(anchor, "href").map(str::to_string)
    }

    fn with_effects<R>(
        &mut self,
        run: impl FnOnce(&mut EffectRegistry, &mut EffectContext<'_>) -> R,
    ) -> R {
        let mut ctx = EffectContext {
            document: &mut self.document,
            animator: &mut *self.animator,
            viewport: self.viewport,
            now: self.now,
        };
        run(&mut self.effects, &mut ctx)
    }

    fn with_intro<R>(&mut self, run: impl FnOnce(&mut PageIntro, &mut EffectContext<'_>) -> R) -> R {
        let mut ctx = EffectContext {
            document: &mut self.document,
            animator: &mut *self.animator,
            viewport: self.viewport,
            now: self.now,
        };
        run(&mut self.intro, &mut ctx)
    }

    /// 驗證並送出聯絡表單。結果都以值回傳，不會影響卡片狀態。
    pub async fn submit_contact(&mut self, name: &str, email: &str, message: &str) -> SubmitOutcome {
        let outcome = self.send_contact(name, email, message).await;
        tracing::info!("📨 Contact form: {}", outcome.notice());
        self.last_notice = Some(outcome.notice().to_string());
        outcome
    }

    async fn send_contact(&mut self, name: &str, email: &str, message: &str) -> SubmitOutcome {
        let Some(form) = self.contact.as_mut() else {
            return SubmitOutcome::Unavailable {
                notice: format!(
                    "Email service is currently unavailable. Please email me directly at {}",
                    self.config.site.owner_email
                ),
            };
        };

        form.fill(&mut self.document, name, email, message);
        let contact_message = match form.validate(&self.document) {
            Ok(contact_message) => contact_message,
            Err(PortfolioError::ValidationError { message }) => {
                return SubmitOutcome::Rejected { notice: message };
            }
            Err(e) => return SubmitOutcome::Rejected { notice: e.to_string() },
        };

        let Some(submitter) = self.submitter.clone() else {
            return SubmitOutcome::Unavailable {
                notice: form.unavailable_notice(),
            };
        };

        form.begin(&mut self.document);
        let result = submitter.submit(&contact_message).await;
        form.finish(&mut self.document, result.is_ok());

        match result {
            Ok(receipt) => {
                let form_node = form.form();
                self.with_effects(|_, ctx| success_glow(ctx, form_node));
                SubmitOutcome::Sent {
                    notice: SUCCESS_MESSAGE.to_string(),
                    receipt,
                }
            }
            Err(e) => {
                tracing::error!("❌ Failed to send message: {}", e);
                tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
                SubmitOutcome::Failed {
                    notice: form.failure_notice(),
                    reason: e.to_string(),
                }
            }
        }
    }

    pub fn snapshot(&self) -> PageSnapshot {
        let groups = self
            .cards
            .groups()
            .iter()
            .map(|group| GroupSnapshot {
                name: group.name().to_string(),
                cards: group
                    .cards()
                    .iter()
                    .filter_map(|&id| self.cards.card(id))
                    .map(|card| CardSnapshot {
                        title: card.title_text().to_string(),
                        expanded: card.is_expanded(),
                    })
                    .collect(),
            })
            .collect();

        PageSnapshot {
            theme: self.theme.current(),
            loaded: self.intro.is_loaded(),
            menu_open: self.menu.is_open(),
            page_expanded: self.cards.page_expanded(),
            scroll_y: self.viewport.scroll_y,
            groups,
            effects: self.effects.names().into_iter().map(str::to_string).collect(),
            pending_reveals: self.scroll.pending_reveal_count(),
            last_notice: self.last_notice.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::animator::RecordingAnimator;
    use crate::adapters::theme_store::MemoryThemeStore;
    use crate::domain::document::ElementSpec;

    fn card(class: &str, title: &str) -> ElementSpec {
        ElementSpec::new("div")
            .class(class)
            .child(ElementSpec::new("h3").text(title))
            .child(ElementSpec::new("p").text("details"))
    }

    fn page() -> Page {
        let document = Document::from_spec(
            ElementSpec::new("html").child(
                ElementSpec::new("body")
                    .child(ElementSpec::new("div").id("pull-cord"))
                    .child(card("portfolio-box", "Alpha"))
                    .child(card("portfolio-box", "Beta"))
                    .child(ElementSpec::new("p").class("outside").text("background")),
            ),
        );
        let (page, report) = Page::init(
            document,
            &SiteConfig::default(),
            Box::new(MemoryThemeStore::default()),
            Box::new(RecordingAnimator::new()),
        )
        .unwrap();
        assert!(report.issues.iter().all(|issue| matches!(issue, PortfolioError::ConfigError { .. })));
        page
    }

    fn title(page: &Page, index: usize) -> NodeId {
        let id = page.cards().card_in_group("projects", index).unwrap();
        page.cards().card(id).unwrap().title()
    }

    #[test]
    fn test_title_click_toggles_once() {
        let mut page = page();
        let alpha = title(&page, 0);

        let outcome = page.dispatch(UiEvent::Click { target: Some(alpha), x: 0.0, y: 0.0 });
        assert!(outcome.toggled.as_ref().is_some_and(|t| t.expanded));
        assert!(outcome.collapsed.is_empty());
        assert!(page.cards().page_expanded());

        let outcome = page.dispatch(UiEvent::Click { target: Some(alpha), x: 0.0, y: 0.0 });
        assert!(outcome.toggled.as_ref().is_some_and(|t| !t.expanded));
        assert!(!page.cards().page_expanded());
    }

    #[test]
    fn test_background_click_collapses() {
        let mut page = page();
        let alpha = title(&page, 0);
        page.dispatch(UiEvent::Click { target: Some(alpha), x: 0.0, y: 0.0 });

        let outside = page.document().elements_with_class("outside")[0];
        let outcome = page.dispatch(UiEvent::Click { target: Some(outside), x: 0.0, y: 0.0 });
        assert_eq!(outcome.collapsed.len(), 1);
        assert!(!page.cards().any_expanded());
    }

    #[test]
    fn test_theme_toggle_by_keyboard() {
        let mut page = page();
        let cord = page.document().element_by_id("pull-cord").unwrap();
        let outcome = page.dispatch(UiEvent::KeyDown {
            key: "Enter".to_string(),
            target: Some(cord),
        });
        assert_eq!(outcome.theme, Some(Theme::Dark));
        let root = page.document().root();
        assert_eq!(page.document().attribute(root, "data-theme"), Some("dark"));
    }

    #[test]
    fn test_frame_clock_is_monotonic() {
        let mut page = page();
        page.dispatch(UiEvent::Frame { now_ms: 500 });
        page.dispatch(UiEvent::Frame { now_ms: 100 });
        assert_eq!(page.now(), Duration::from_millis(500));
    }

    /// 載入動畫、捲動進場與打字效果都經由 Animator 與文件輸出
    #[test]
    fn test_intro_runs_on_load_scroll_and_frames() {
        let document = Document::from_spec(
            ElementSpec::new("html").child(
                ElementSpec::new("body")
                    .child(ElementSpec::new("div").class("loader"))
                    .child(
                        ElementSpec::new("div")
                            .class("home-info")
                            .child(ElementSpec::new("h1").text("Hello"))
                            .child(
                                ElementSpec::new("h2")
                                    .child(ElementSpec::new("span").attr("data-text", "Engineer")),
                            )
                            .child(ElementSpec::new("h3").text("Welcome")),
                    )
                    .child(ElementSpec::new("a").class("btn-sci"))
                    .child(ElementSpec::new("img").class("home-img"))
                    .child(card("portfolio-box", "Alpha").rect(1200.0, 0.0, 300.0, 200.0)),
            ),
        );
        let animator = RecordingAnimator::new();
        let (mut page, _) = Page::init(
            document,
            &SiteConfig::default(),
            Box::new(MemoryThemeStore::default()),
            Box::new(animator.clone()),
        )
        .unwrap();

        assert!(page.snapshot().loaded);
        assert!(page.document().has_class(page.document().body(), "loaded"));
        assert_eq!(animator.count_for("intro"), 4);

        let outcome = page.dispatch(UiEvent::Scroll { offset: 600.0 });
        let alpha = page.cards().card_in_group("projects", 0).unwrap();
        let element = page.cards().card(alpha).unwrap().element();
        assert_eq!(outcome.intro.entered, vec![element]);
        let entrance = animator
            .requests()
            .into_iter()
            .filter(|request| request.effect == "intro")
            .next_back()
            .unwrap();
        assert_eq!(entrance.target, element);
        assert!(entrance.tween.from);
        assert_eq!(entrance.tween.duration, 0.8);

        page.dispatch(UiEvent::Frame { now_ms: 300 });
        let role = page.document().select(|e| e.attribute("data-text").is_some())[0];
        assert_eq!(page.document().text_content(role), "Engi");
        page.dispatch(UiEvent::Frame { now_ms: 600 });
        let loader = page.document().elements_with_class("loader")[0];
        assert_eq!(page.document().attribute(loader, "style"), Some("opacity: 0; display: none"));
    }

    #[tokio::test]
    async fn test_contact_without_form_is_unavailable() {
        let mut page = page();
        let outcome = page.submit_contact("Ada", "ada@example.com", "Hi").await;
        assert!(matches!(outcome, SubmitOutcome::Unavailable { .. }));
        assert!(page.snapshot().last_notice.is_some());
    }
}
