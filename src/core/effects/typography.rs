use super::{Effect, EffectContext};
use crate::domain::document::NodeId;
use crate::domain::model::Tween;

const CHAR_STAGGER: f64 = 0.05;
const HOLD: f64 = 0.8;

#[derive(Debug, Clone)]
struct SplitHeading {
    heading: NodeId,
    chars: Vec<NodeId>,
}

/// 把標題拆成單一字元，滑鼠移入時逐字彈跳再還原
#[derive(Debug, Clone, Default)]
pub struct TypographyEffect {
    headings: Vec<SplitHeading>,
}

impl TypographyEffect {
    pub fn char_count(&self, heading: NodeId) -> Option<usize> {
        self.headings
            .iter()
            .find(|split| split.heading == heading)
            .map(|split| split.chars.len())
    }
}

impl Effect for TypographyEffect {
    fn name(&self) -> &'static str {
        "typography"
    }

    fn attach(&mut self, element: NodeId, ctx: &mut EffectContext<'_>) {
        let text = ctx.document.text_content(element);
        ctx.document.set_text(element, "");
        ctx.document.clear_children(element);

        let mut chars = Vec::new();
        for (index, ch) in text.chars().enumerate() {
            let Some(span) = ctx.document.append_child(element, "span") else {
                continue;
            };
            ctx.document.set_text(span, &ch.to_string());
            ctx.document.add_class(span, "reactive-char");
            ctx.document.set_attribute(span, "data-index", &index.to_string());
            chars.push(span);
        }
        self.headings.push(SplitHeading {
            heading: element,
            chars,
        });
    }

    fn on_pointer_enter(&mut self, target: NodeId, ctx: &mut EffectContext<'_>) {
        let Some(split) = self
            .headings
            .iter()
            .find(|split| ctx.document.contains(split.heading, target))
        else {
            return;
        };
        for (index, &ch) in split.chars.iter().enumerate() {
            let delay = index as f64 * CHAR_STAGGER;
            ctx.play(
                "typography",
                ch,
                Tween::to(0.4, "elastic.out(1.2, 0.4)")
                    .prop("y", -8.0)
                    .prop("fontWeight", 700)
                    .prop("color", "var(--accent-primary)")
                    .delay(delay),
            );
            ctx.play(
                "typography",
                ch,
                Tween::to(0.4, "cubic.inOut")
                    .prop("y", 0.0)
                    .prop("fontWeight", 400)
                    .prop("color", "inherit")
                    .delay(delay + HOLD),
            );
        }
    }
}
