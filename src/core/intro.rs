//! 頁面載入動畫
//!
//! 載入完成時：body 加上 `loaded`、淡出 loader、首頁文字與圖片進場、開始打字效果。
//! 之後隨捲動播放區塊進場動畫 (離開時反向)，數字在完整進入畫面時開始遞增。

use crate::config::IntroConfig;
use crate::core::effects::EffectContext;
use crate::domain::document::{Document, NodeId};
use crate::domain::model::Tween;
use crate::domain::selector::Selector;
use crate::utils::animation::{CounterAnimation, TypingSchedule};
use crate::utils::error::Result;
use crate::utils::viewport::is_in_viewport;
use serde::Serialize;
use std::time::Duration;

const EFFECT_NAME: &str = "intro";

/// 首頁進場：(選擇器, 位移軸, 位移距離, 秒數, 延遲)
const HOME_TWEENS: [(&str, &str, f64, f64, f64); 4] = [
    (".home-info h1", "y", 50.0, 1.0, 0.0),
    (".home-info h3", "y", 30.0, 1.0, 0.3),
    (".btn-sci", "y", 30.0, 1.0, 0.5),
    (".home-img", "x", 100.0, 1.2, 0.7),
];
const HOME_EASE: &str = "power3.out";

const ENTRANCE_EASE: &str = "power2.out";
const ENTRANCE_DURATION: f64 = 0.8;
const ENTRANCE_OFFSET: f64 = 50.0;
const ENTRANCE_STAGGER: f64 = 0.1;

#[derive(Debug, Clone)]
struct Entrance {
    element: NodeId,
    index: usize,
    entered: bool,
}

#[derive(Debug, Clone)]
struct TypedRole {
    element: NodeId,
    text: String,
    index: usize,
}

#[derive(Debug, Clone)]
struct Counter {
    element: NodeId,
    target: f64,
    animation: Option<CounterAnimation>,
}

/// 一次載入或捲動觸發的進場變化
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IntroUpdate {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub entered: Vec<NodeId>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub left: Vec<NodeId>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub counters_started: Vec<NodeId>,
}

impl IntroUpdate {
    pub fn is_empty(&self) -> bool {
        self.entered.is_empty() && self.left.is_empty() && self.counters_started.is_empty()
    }
}

#[derive(Debug)]
pub struct PageIntro {
    config: IntroConfig,
    home: Vec<(NodeId, Tween)>,
    loader: Option<NodeId>,
    loader_hide_at: Option<Duration>,
    loaded: bool,
    entrances: Vec<Entrance>,
    roles: Vec<TypedRole>,
    schedule: TypingSchedule,
    typing_since: Option<Duration>,
    counters: Vec<Counter>,
}

impl PageIntro {
    pub fn init(document: &Document, config: &IntroConfig) -> Result<Self> {
        let mut home = Vec::new();
        for (selector, axis, distance, duration, delay) in HOME_TWEENS {
            let tween = Tween::from(duration, HOME_EASE)
                .prop(axis, distance)
                .prop("opacity", 0.0)
                .delay(delay);
            for element in document.query_all(&Selector::parse(selector)?) {
                home.push((element, tween.clone()));
            }
        }

        let entrances = document
            .query_all(&Selector::parse(&config.entrance_selector)?)
            .into_iter()
            .enumerate()
            .map(|(index, element)| Entrance {
                element,
                index,
                entered: false,
            })
            .collect();

        let roles = document
            .query_all(&Selector::parse(&config.typing_selector)?)
            .into_iter()
            .filter_map(|element| {
                let text = document.attribute(element, "data-text")?.to_string();
                Some((element, text))
            })
            .enumerate()
            .map(|(index, (element, text))| TypedRole {
                element,
                text,
                index,
            })
            .collect();

        let counters = document
            .query_all(&Selector::parse(&config.counter_selector)?)
            .into_iter()
            .filter_map(|element| {
                let raw = document.attribute(element, "data-count")?;
                match raw.trim().parse::<f64>() {
                    Ok(target) => Some(Counter {
                        element,
                        target,
                        animation: None,
                    }),
                    Err(_) => {
                        tracing::warn!("⚠️ Ignoring counter with non-numeric data-count '{}'", raw);
                        None
                    }
                }
            })
            .collect();

        Ok(Self {
            config: config.clone(),
            home,
            loader: document.query(&Selector::parse(&config.loader_selector)?),
            loader_hide_at: None,
            loaded: false,
            entrances,
            roles,
            schedule: TypingSchedule::default(),
            typing_since: None,
            counters,
        })
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// 頁面載入完成；只會生效一次
    pub fn on_load(&mut self, ctx: &mut EffectContext<'_>) -> IntroUpdate {
        if self.loaded || !self.config.enabled {
            return IntroUpdate::default();
        }
        self.loaded = true;

        let body = ctx.document.body();
        ctx.document.add_class(body, &self.config.loaded_class);
        if let Some(loader) = self.loader {
            ctx.document.set_style(loader, "opacity", "0");
            self.loader_hide_at = Some(ctx.now + Duration::from_millis(self.config.loader_fade_ms));
        }

        for (element, tween) in &self.home {
            ctx.play(EFFECT_NAME, *element, tween.clone());
        }

        self.typing_since = Some(ctx.now);
        self.type_roles(ctx);

        tracing::debug!(
            "Intro: {} home tween(s), {} entrance target(s), {} typed role(s), {} counter(s)",
            self.home.len(),
            self.entrances.len(),
            self.roles.len(),
            self.counters.len()
        );
        self.on_scroll(ctx)
    }

    /// 檢查進場觸發線與數字計數器
    pub fn on_scroll(&mut self, ctx: &mut EffectContext<'_>) -> IntroUpdate {
        let mut update = IntroUpdate::default();
        if !self.loaded {
            return update;
        }

        let viewport = ctx.viewport;
        let trigger_line = viewport.scroll_y + viewport.height * self.config.entrance_start;
        for entrance in &mut self.entrances {
            let Some(rect) = ctx.document.rect(entrance.element) else {
                continue;
            };
            let reached = rect.top <= trigger_line;
            if reached && !entrance.entered {
                entrance.entered = true;
                ctx.play(
                    EFFECT_NAME,
                    entrance.element,
                    Tween::from(ENTRANCE_DURATION, ENTRANCE_EASE)
                        .prop("y", ENTRANCE_OFFSET)
                        .prop("opacity", 0.0)
                        .delay(entrance.index as f64 * ENTRANCE_STAGGER),
                );
                update.entered.push(entrance.element);
            } else if !reached && entrance.entered {
                // 往回捲過觸發線時反向播放
                entrance.entered = false;
                ctx.play(
                    EFFECT_NAME,
                    entrance.element,
                    Tween::to(ENTRANCE_DURATION, ENTRANCE_EASE)
                        .prop("y", ENTRANCE_OFFSET)
                        .prop("opacity", 0.0),
                );
                update.left.push(entrance.element);
            }
        }

        let duration = Duration::from_millis(self.config.counter_duration_ms);
        for counter in &mut self.counters {
            if counter.animation.is_some() {
                continue;
            }
            let visible = ctx
                .document
                .rect(counter.element)
                .is_some_and(|rect| is_in_viewport(&rect, &viewport));
            if visible {
                counter.animation = Some(CounterAnimation::new(counter.target, duration));
                update.counters_started.push(counter.element);
            }
        }
        update
    }

    pub fn on_frame(&mut self, ctx: &mut EffectContext<'_>) {
        if let Some(hide_at) = self.loader_hide_at {
            if ctx.now >= hide_at {
                if let Some(loader) = self.loader {
                    ctx.document.set_style(loader, "display", "none");
                }
                self.loader_hide_at = None;
            }
        }

        self.type_roles(ctx);

        for counter in &mut self.counters {
            let Some(animation) = counter.animation.as_mut() else {
                continue;
            };
            if animation.is_finished() {
                continue;
            }
            let text = animation.step();
            ctx.document.set_text(counter.element, &text);
        }
    }

    fn type_roles(&self, ctx: &mut EffectContext<'_>) {
        let Some(since) = self.typing_since else {
            return;
        };
        let elapsed = ctx.now.saturating_sub(since);
        for role in &self.roles {
            let visible = self.schedule.visible_prefix(&role.text, role.index, elapsed);
            let current = ctx.document.get(role.element).map(|element| element.text.as_str());
            if current != Some(visible) {
                ctx.document.set_text(role.element, visible);
            }
        }
    }
}
