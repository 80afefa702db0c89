//! 可展開卡片的協調器
//!
//! 每個群組維持「最多一張展開」的手風琴規則，並同步頁面層級的展開旗標。
//! 卡片的 `expanded` 狀態只能透過 [`CardCoordinator::toggle`] 與
//! [`CardCoordinator::collapse_all`] 改變；每次改變都會在同一個步驟內
//! 更新 [`ExpansionView`]，因此 aria 屬性與狀態不會有不同步的時間點。

use crate::config::AccordionScope;
use crate::domain::document::{Document, NodeId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CardId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroupId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardState {
    #[default]
    Collapsed,
    Expanded,
}

/// 探索階段產生的卡片組成
#[derive(Debug, Clone, PartialEq)]
pub struct CardParts {
    pub element: NodeId,
    pub title: NodeId,
    pub title_text: String,
    pub body: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveredGroup {
    pub name: String,
    pub cards: Vec<CardParts>,
}

#[derive(Debug, Clone)]
pub struct Card {
    id: CardId,
    group: GroupId,
    parts: CardParts,
    state: CardState,
}

impl Card {
    pub fn id(&self) -> CardId {
        self.id
    }

    pub fn group(&self) -> GroupId {
        self.group
    }

    pub fn element(&self) -> NodeId {
        self.parts.element
    }

    pub fn title(&self) -> NodeId {
        self.parts.title
    }

    pub fn title_text(&self) -> &str {
        &self.parts.title_text
    }

    pub fn body(&self) -> &[NodeId] {
        &self.parts.body
    }

    pub fn state(&self) -> CardState {
        self.state
    }

    pub fn is_expanded(&self) -> bool {
        self.state == CardState::Expanded
    }
}

#[derive(Debug, Clone)]
pub struct CardGroup {
    id: GroupId,
    name: String,
    cards: Vec<CardId>,
}

impl CardGroup {
    pub fn id(&self) -> GroupId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cards(&self) -> &[CardId] {
        &self.cards
    }
}

/// 協調器的輸出端：呈現卡片狀態與頁面展開旗標
pub trait ExpansionView {
    fn show_card(&mut self, card: &Card);
    fn show_page_expanded(&mut self, expanded: bool);
}

/// 把狀態寫回文件：標題的 `aria-expanded`、內容的 `hidden`、body 上的遮罩 class
pub struct DocumentView<'a> {
    document: &'a mut Document,
    page_expanded_class: &'a str,
}

impl<'a> DocumentView<'a> {
    pub fn new(document: &'a mut Document, page_expanded_class: &'a str) -> Self {
        Self {
            document,
            page_expanded_class,
        }
    }

    /// 初始化時讓標題成為可聚焦的按鈕
    pub fn prepare_card(&mut self, card: &Card) {
        self.document.set_attribute(card.title(), "role", "button");
        if self.document.attribute(card.title(), "tabindex").is_none() {
            self.document.set_attribute(card.title(), "tabindex", "0");
        }
        self.show_card(card);
    }
}

impl ExpansionView for DocumentView<'_> {
    fn show_card(&mut self, card: &Card) {
        let expanded = card.is_expanded();
        self.document.set_attribute(
            card.title(),
            "aria-expanded",
            if expanded { "true" } else { "false" },
        );
        self.document.toggle_class(card.element(), "expanded", expanded);
        for &body in card.body() {
            if expanded {
                self.document.remove_attribute(body, "hidden");
            } else {
                self.document.set_attribute(body, "hidden", "");
            }
        }
    }

    fn show_page_expanded(&mut self, expanded: bool) {
        let body = self.document.body();
        self.document
            .toggle_class(body, self.page_expanded_class, expanded);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToggleOutcome {
    pub card: CardId,
    pub expanded: bool,
    pub collapsed_siblings: Vec<CardId>,
    pub page_expanded: bool,
}

#[derive(Debug, Clone, Default)]
pub struct CardCoordinator {
    groups: Vec<CardGroup>,
    cards: Vec<Card>,
    scope: AccordionScope,
    page_expanded: bool,
}

impl CardCoordinator {
    pub fn new(discovered: Vec<DiscoveredGroup>) -> Self {
        let mut coordinator = Self::default();
        for group in discovered {
            let group_id = GroupId(coordinator.groups.len());
            let mut members = Vec::with_capacity(group.cards.len());
            for parts in group.cards {
                let card_id = CardId(coordinator.cards.len());
                coordinator.cards.push(Card {
                    id: card_id,
                    group: group_id,
                    parts,
                    state: CardState::Collapsed,
                });
                members.push(card_id);
            }
            coordinator.groups.push(CardGroup {
                id: group_id,
                name: group.name,
                cards: members,
            });
        }
        coordinator
    }

    pub fn with_scope(mut self, scope: AccordionScope) -> Self {
        self.scope = scope;
        self
    }

    pub fn scope(&self) -> AccordionScope {
        self.scope
    }

    /// 把初始狀態 (全部收合) 推給呈現端
    pub fn render_all(&self, view: &mut impl ExpansionView) {
        for card in &self.cards {
            view.show_card(card);
        }
        view.show_page_expanded(self.page_expanded);
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn groups(&self) -> &[CardGroup] {
        &self.groups
    }

    pub fn card(&self, id: CardId) -> Option<&Card> {
        self.cards.get(id.0)
    }

    pub fn group_by_name(&self, name: &str) -> Option<&CardGroup> {
        self.groups.iter().find(|group| group.name == name)
    }

    /// 群組內第 `index` 張卡片
    pub fn card_in_group(&self, name: &str, index: usize) -> Option<CardId> {
        self.group_by_name(name)
            .and_then(|group| group.cards.get(index).copied())
    }

    pub fn expanded_in(&self, group: GroupId) -> Option<CardId> {
        self.groups
            .get(group.0)?
            .cards
            .iter()
            .copied()
            .find(|id| self.cards[id.0].is_expanded())
    }

    pub fn page_expanded(&self) -> bool {
        self.page_expanded
    }

    pub fn any_expanded(&self) -> bool {
        self.cards.iter().any(Card::is_expanded)
    }

    /// 點擊目標所在的卡片標題
    pub fn card_for_title(&self, document: &Document, target: NodeId) -> Option<CardId> {
        self.cards
            .iter()
            .find(|card| document.contains(card.title(), target))
            .map(Card::id)
    }

    /// 點擊目標是否位於任何卡片內
    pub fn is_inside_card(&self, document: &Document, target: NodeId) -> bool {
        self.cards
            .iter()
            .any(|card| document.contains(card.element(), target))
    }

    pub fn toggle(&mut self, id: CardId, view: &mut impl ExpansionView) -> Option<ToggleOutcome> {
        let Some(card) = self.cards.get(id.0) else {
            tracing::warn!("Ignoring toggle for unknown card {:?}", id);
            return None;
        };
        let group = card.group;

        if card.is_expanded() {
            self.set_state(id, CardState::Collapsed, view);
            self.sync_page_flag(view);
            tracing::debug!("Card {:?} collapsed", id);
            return Some(ToggleOutcome {
                card: id,
                expanded: false,
                collapsed_siblings: Vec::new(),
                page_expanded: self.page_expanded,
            });
        }

        // 先收合同一範圍內的其他卡片，再展開目標，最後更新頁面旗標
        let candidates: Vec<CardId> = match self.scope {
            AccordionScope::Group => self.groups[group.0].cards.clone(),
            AccordionScope::Page => self.cards.iter().map(Card::id).collect(),
        };
        let siblings: Vec<CardId> = candidates
            .into_iter()
            .filter(|&other| other != id && self.cards[other.0].is_expanded())
            .collect();
        for &sibling in &siblings {
            self.set_state(sibling, CardState::Collapsed, view);
        }
        self.set_state(id, CardState::Expanded, view);
        self.sync_page_flag(view);

        tracing::debug!(
            "Card {:?} expanded in group '{}' ({} sibling(s) collapsed)",
            id,
            self.groups[group.0].name,
            siblings.len()
        );
        Some(ToggleOutcome {
            card: id,
            expanded: true,
            collapsed_siblings: siblings,
            page_expanded: self.page_expanded,
        })
    }

    /// 收合所有群組的所有卡片，回傳實際被收合的卡片
    pub fn collapse_all(&mut self, view: &mut impl ExpansionView) -> Vec<CardId> {
        let expanded: Vec<CardId> = self
            .cards
            .iter()
            .filter(|card| card.is_expanded())
            .map(Card::id)
            .collect();
        for &id in &expanded {
            self.set_state(id, CardState::Collapsed, view);
        }
        self.sync_page_flag(view);
        if !expanded.is_empty() {
            tracing::debug!("Collapsed {} card(s)", expanded.len());
        }
        expanded
    }

    // 唯一會改變卡片狀態的地方
    fn set_state(&mut self, id: CardId, state: CardState, view: &mut impl ExpansionView) {
        let card = &mut self.cards[id.0];
        card.state = state;
        view.show_card(card);
    }

    fn sync_page_flag(&mut self, view: &mut impl ExpansionView) {
        let expanded = self.any_expanded();
        if expanded != self.page_expanded {
            self.page_expanded = expanded;
            view.show_page_expanded(expanded);
        }
    }
}
