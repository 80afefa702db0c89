//! 裝飾性效果
//!
//! 所有效果都實作 [`Effect`]，由 [`EffectRegistry`] 依名稱保存並套用到符合
//! 選擇器的元素。新增效果只需要註冊，不會動到卡片協調器。

pub mod fluid_reveal;
pub mod magnetic;
pub mod parallax;
pub mod ripple;
pub mod tilt;
pub mod typography;

use crate::config::EffectsConfig;
use crate::domain::document::{Document, NodeId};
use crate::domain::model::{AnimationRequest, Tween};
use crate::domain::ports::Animator;
use crate::domain::selector::Selector;
use crate::utils::error::Result;
use crate::utils::viewport::Viewport;
use std::time::Duration;

pub use fluid_reveal::FluidRevealEffect;
pub use magnetic::MagneticEffect;
pub use parallax::ParallaxEffect;
pub use ripple::RippleEffect;
pub use tilt::TiltEffect;
pub use typography::TypographyEffect;

/// 效果執行時可以接觸的頁面資源
pub struct EffectContext<'a> {
    pub document: &'a mut Document,
    pub animator: &'a mut dyn Animator,
    pub viewport: Viewport,
    pub now: Duration,
}

impl EffectContext<'_> {
    pub fn play(&mut self, effect: &str, target: NodeId, tween: Tween) {
        self.animator.play(AnimationRequest {
            effect: effect.to_string(),
            target,
            tween,
        });
    }
}

pub trait Effect: Send {
    fn name(&self) -> &'static str;

    /// 把效果掛到單一元素上；同一元素只會被呼叫一次
    fn attach(&mut self, element: NodeId, ctx: &mut EffectContext<'_>);

    fn on_pointer_move(&mut self, _x: f64, _y: f64, _ctx: &mut EffectContext<'_>) {}

    fn on_pointer_enter(&mut self, _target: NodeId, _ctx: &mut EffectContext<'_>) {}

    fn on_pointer_leave(&mut self, _target: NodeId, _ctx: &mut EffectContext<'_>) {}

    fn on_click(&mut self, _target: NodeId, _x: f64, _y: f64, _ctx: &mut EffectContext<'_>) {}

    fn on_scroll(&mut self, _ctx: &mut EffectContext<'_>) {}

    fn on_frame(&mut self, _ctx: &mut EffectContext<'_>) {}
}

struct EffectEntry {
    effect: Box<dyn Effect>,
    selector: Selector,
}

impl EffectEntry {
    fn marker(&self) -> String {
        format!("{}-init", self.effect.name())
    }
}

#[derive(Default)]
pub struct EffectRegistry {
    entries: Vec<EffectEntry>,
}

impl EffectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 依設定建立預設效果組合；停用的效果不會註冊
    pub fn from_config(config: &EffectsConfig) -> Result<Self> {
        let mut registry = Self::new();
        if config.magnetic.enabled {
            registry.register(
                Box::new(MagneticEffect::new(&config.magnetic)),
                Selector::parse(&config.magnetic.selector)?,
            );
        }
        if config.tilt.enabled {
            registry.register(
                Box::new(TiltEffect::new(config.tilt.max_angle)),
                Selector::parse(&config.tilt.selector)?,
            );
        }
        if config.fluid_reveal.enabled {
            registry.register(
                Box::new(FluidRevealEffect::default()),
                Selector::parse(&config.fluid_reveal.selector)?,
            );
        }
        if config.ripple.enabled {
            registry.register(
                Box::new(RippleEffect::default()),
                Selector::parse(&config.ripple.selector)?,
            );
        }
        if config.typography.enabled {
            registry.register(
                Box::new(TypographyEffect::default()),
                Selector::parse(&config.typography.selector)?,
            );
        }
        if config.parallax.enabled {
            registry.register(
                Box::new(ParallaxEffect::new(
                    config.parallax.slow_distance,
                    config.parallax.fast_distance,
                )),
                Selector::parse(&config.parallax.selector)?,
            );
        }
        Ok(registry)
    }

    /// 註冊效果；同名效果會被取代
    pub fn register(&mut self, effect: Box<dyn Effect>, selector: Selector) {
        let name = effect.name();
        self.entries.retain(|entry| entry.effect.name() != name);
        self.entries.push(EffectEntry { effect, selector });
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.entries.iter().map(|entry| entry.effect.name()).collect()
    }

    /// 把每個效果套到尚未初始化的元素上，回傳新增的套用次數。
    /// 頁面內容變動後再次呼叫即可涵蓋新元素。
    pub fn attach_all(&mut self, ctx: &mut EffectContext<'_>) -> usize {
        let mut attached = 0;
        for entry in &mut self.entries {
            let marker = entry.marker();
            for element in ctx.document.query_all(&entry.selector) {
                if ctx.document.has_class(element, &marker) {
                    continue;
                }
                entry.effect.attach(element, ctx);
                ctx.document.add_class(element, &marker);
                attached += 1;
            }
        }
        if attached > 0 {
            tracing::debug!("Attached {} decorative effect instance(s)", attached);
        }
        attached
    }

    pub fn pointer_move(&mut self, x: f64, y: f64, ctx: &mut EffectContext<'_>) {
        for entry in &mut self.entries {
            entry.effect.on_pointer_move(x, y, ctx);
        }
    }

    pub fn pointer_enter(&mut self, target: NodeId, ctx: &mut EffectContext<'_>) {
        for entry in &mut self.entries {
            entry.effect.on_pointer_enter(target, ctx);
        }
    }

    pub fn pointer_leave(&mut self, target: NodeId, ctx: &mut EffectContext<'_>) {
        for entry in &mut self.entries {
            entry.effect.on_pointer_leave(target, ctx);
        }
    }

    pub fn click(&mut self, target: NodeId, x: f64, y: f64, ctx: &mut EffectContext<'_>) {
        for entry in &mut self.entries {
            entry.effect.on_click(target, x, y, ctx);
        }
    }

    pub fn scroll(&mut self, ctx: &mut EffectContext<'_>) {
        for entry in &mut self.entries {
            entry.effect.on_scroll(ctx);
        }
    }

    pub fn frame(&mut self, ctx: &mut EffectContext<'_>) {
        for entry in &mut self.entries {
            entry.effect.on_frame(ctx);
        }
    }
}

/// 由 `target` 往上找第一個已套用效果的元素
pub(crate) fn attached_ancestor(
    document: &Document,
    attached: &[NodeId],
    target: NodeId,
) -> Option<NodeId> {
    let mut current = Some(target);
    while let Some(node) = current {
        if attached.contains(&node) {
            return Some(node);
        }
        current = document.parent(node);
    }
    None
}

/// 成功送出後的一次性光暈
pub fn success_glow(ctx: &mut EffectContext<'_>, element: NodeId) -> Option<NodeId> {
    let glow = ctx.document.append_child(element, "div")?;
    ctx.document.add_class(glow, "success-glow");
    ctx.play("success-glow", glow, Tween::to(0.3, "power2.out").prop("opacity", 1.0));
    ctx.play(
        "success-glow",
        glow,
        Tween::to(0.5, "power2.out").prop("opacity", 0.0).delay(0.5),
    );
    Some(glow)
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::domain::model::AnimationRequest;
    use crate::domain::ports::Animator;

    #[derive(Default)]
    pub struct Recorder {
        pub requests: Vec<AnimationRequest>,
    }

    impl Animator for Recorder {
        fn play(&mut self, request: AnimationRequest) {
            self.requests.push(request);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::Recorder;
    use super::*;
    use crate::domain::document::ElementSpec;

    fn page() -> Document {
        Document::from_spec(
            ElementSpec::new("html").child(
                ElementSpec::new("body")
                    .child(ElementSpec::new("a").class("btn").rect(0.0, 0.0, 100.0, 40.0))
                    .child(
                        ElementSpec::new("section")
                            .child(ElementSpec::new("h2").text("Skills"))
                            .child(ElementSpec::new("div").class("parallax-slow").rect(500.0, 0.0, 100.0, 100.0)),
                    ),
            ),
        )
    }

    #[test]
    fn test_default_registry_names() {
        let registry = EffectRegistry::from_config(&EffectsConfig::default()).unwrap();
        assert_eq!(
            registry.names(),
            vec!["magnetic", "fluid-reveal", "ripple", "typography", "parallax"]
        );
    }

    #[test]
    fn test_attach_all_marks_elements_once() {
        let mut document = page();
        let mut recorder = Recorder::default();
        let mut registry = EffectRegistry::from_config(&EffectsConfig::default()).unwrap();

        let mut ctx = EffectContext {
            document: &mut document,
            animator: &mut recorder,
            viewport: Viewport::default(),
            now: Duration::ZERO,
        };
        // btn: magnetic + ripple；h2: typography；parallax-slow: parallax
        assert_eq!(registry.attach_all(&mut ctx), 4);
        assert_eq!(registry.attach_all(&mut ctx), 0);

        let btn = document.elements_with_class("btn")[0];
        assert!(document.has_class(btn, "magnetic-init"));
        assert!(document.has_class(btn, "ripple-init"));
    }

    #[test]
    fn test_register_replaces_same_name() {
        let mut registry = EffectRegistry::new();
        registry.register(Box::new(TiltEffect::new(5.0)), Selector::parse(".a").unwrap());
        registry.register(Box::new(TiltEffect::new(15.0)), Selector::parse(".b").unwrap());
        assert_eq!(registry.names(), vec!["tilt"]);
    }

    #[test]
    fn test_success_glow() {
        let mut document = page();
        let mut recorder = Recorder::default();
        let body = document.body();
        let mut ctx = EffectContext {
            document: &mut document,
            animator: &mut recorder,
            viewport: Viewport::default(),
            now: Duration::ZERO,
        };
        let glow = success_glow(&mut ctx, body).unwrap();
        assert!(document.has_class(glow, "success-glow"));
        assert_eq!(recorder.requests.len(), 2);
        assert_eq!(recorder.requests[1].tween.delay, 0.5);
    }
}
