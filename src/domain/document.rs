//! 頁面文件樹
//!
//! 以 arena 方式保存元素，`NodeId` 在整個頁面生命週期內穩定 (元素只會新增，
//! 移除時僅從父節點解除連結)。可以用程式建構，也可以從 JSON 描述載入。

use crate::domain::model::Rect;
use crate::utils::error::{PortfolioError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

#[derive(Debug, Clone, Default, Serialize)]
pub struct Element {
    pub tag: String,
    pub classes: Vec<String>,
    pub attributes: BTreeMap<String, String>,
    pub text: String,
    pub rect: Option<Rect>,
    #[serde(skip)]
    parent: Option<NodeId>,
    #[serde(skip)]
    children: Vec<NodeId>,
}

impl Element {
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn is_heading(&self) -> bool {
        matches!(self.tag.as_str(), "h1" | "h2" | "h3" | "h4" | "h5" | "h6")
    }
}

/// JSON 形式的元素描述
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ElementSpec {
    pub tag: String,
    #[serde(default)]
    pub id: Option<String>,
    /// 以空白分隔的 class 清單
    #[serde(default)]
    pub class: Option<String>,
    #[serde(default)]
    pub attrs: BTreeMap<String, String>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub rect: Option<Rect>,
    #[serde(default)]
    pub children: Vec<ElementSpec>,
}

impl ElementSpec {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            ..Default::default()
        }
    }

    pub fn id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn class(mut self, class: &str) -> Self {
        self.class = Some(class.to_string());
        self
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.insert(name.to_string(), value.to_string());
        self
    }

    pub fn text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    pub fn rect(mut self, top: f64, left: f64, width: f64, height: f64) -> Self {
        self.rect = Some(Rect {
            top,
            left,
            width,
            height,
        });
        self
    }

    pub fn child(mut self, child: ElementSpec) -> Self {
        self.children.push(child);
        self
    }
}

#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Element>,
    root: NodeId,
    body: NodeId,
    // 已移除、可重用的 arena 位置
    free: Vec<NodeId>,
}

impl Document {
    pub fn from_spec(spec: ElementSpec) -> Self {
        let mut document = Self {
            nodes: Vec::new(),
            root: NodeId(0),
            body: NodeId(0),
            free: Vec::new(),
        };
        document.root = document.insert_spec(spec, None);
        document.body = document
            .descendants(document.root)
            .into_iter()
            .find(|id| document.nodes[id.0].tag == "body")
            .unwrap_or(document.root);
        document
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let spec: ElementSpec = serde_json::from_str(content)?;
        if spec.tag.trim().is_empty() {
            return Err(PortfolioError::DocumentError {
                message: "Root element has no tag".to_string(),
            });
        }
        Ok(Self::from_spec(spec))
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    fn insert_spec(&mut self, spec: ElementSpec, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        let mut attributes = spec.attrs;
        if let Some(element_id) = spec.id {
            attributes.insert("id".to_string(), element_id);
        }
        self.nodes.push(Element {
            tag: spec.tag.to_ascii_lowercase(),
            classes: spec
                .class
                .as_deref()
                .unwrap_or_default()
                .split_whitespace()
                .map(str::to_string)
                .collect(),
            attributes,
            text: spec.text,
            rect: spec.rect,
            parent,
            children: Vec::new(),
        });
        for child in spec.children {
            let child_id = self.insert_spec(child, Some(id));
            self.nodes[id.0].children.push(child_id);
        }
        id
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    pub fn get(&self, id: NodeId) -> Option<&Element> {
        self.nodes.get(id.0)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id.0)
            .map(|node| node.children.as_slice())
            .unwrap_or_default()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.0).and_then(|node| node.parent)
    }

    /// 前序走訪 (包含 `from` 本身)，結果即文件順序
    pub fn descendants(&self, from: NodeId) -> Vec<NodeId> {
        let mut ordered = Vec::new();
        let mut stack = vec![from];
        while let Some(id) = stack.pop() {
            if id.0 >= self.nodes.len() {
                continue;
            }
            ordered.push(id);
            stack.extend(self.nodes[id.0].children.iter().rev().copied());
        }
        ordered
    }

    pub fn element_by_id(&self, element_id: &str) -> Option<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .find(|id| self.nodes[id.0].attribute("id") == Some(element_id))
    }

    pub fn elements_with_class(&self, class: &str) -> Vec<NodeId> {
        self.select(|element| element.has_class(class))
    }

    pub fn elements_with_tag(&self, tag: &str) -> Vec<NodeId> {
        self.select(|element| element.tag == tag)
    }

    pub fn select<F>(&self, predicate: F) -> Vec<NodeId>
    where
        F: Fn(&Element) -> bool,
    {
        self.descendants(self.root)
            .into_iter()
            .filter(|id| predicate(&self.nodes[id.0]))
            .collect()
    }

    /// `node` 是否為 `ancestor` 本身或其子孫
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// 由 `node` 往上找第一個符合條件的元素 (包含自己)
    pub fn closest<F>(&self, node: NodeId, predicate: F) -> Option<NodeId>
    where
        F: Fn(&Element) -> bool,
    {
        let mut current = Some(node);
        while let Some(id) = current {
            let element = self.nodes.get(id.0)?;
            if predicate(element) {
                return Some(id);
            }
            current = element.parent;
        }
        None
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.get(id).is_some_and(|element| element.has_class(class))
    }

    /// 回傳是否有變更
    pub fn add_class(&mut self, id: NodeId, class: &str) -> bool {
        match self.nodes.get_mut(id.0) {
            Some(element) if !element.has_class(class) => {
                element.classes.push(class.to_string());
                true
            }
            _ => false,
        }
    }

    pub fn remove_class(&mut self, id: NodeId, class: &str) -> bool {
        match self.nodes.get_mut(id.0) {
            Some(element) => {
                let before = element.classes.len();
                element.classes.retain(|c| c != class);
                before != element.classes.len()
            }
            None => false,
        }
    }

    pub fn toggle_class(&mut self, id: NodeId, class: &str, on: bool) -> bool {
        if on {
            self.add_class(id, class)
        } else {
            self.remove_class(id, class)
        }
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.get(id).and_then(|element| element.attribute(name))
    }

    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) {
        if let Some(element) = self.nodes.get_mut(id.0) {
            element.attributes.insert(name.to_string(), value.to_string());
        }
    }

    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> Option<String> {
        self.nodes
            .get_mut(id.0)
            .and_then(|element| element.attributes.remove(name))
    }

    /// 元素及其子孫的文字內容
    pub fn text_content(&self, id: NodeId) -> String {
        self.descendants(id)
            .into_iter()
            .map(|node| self.nodes[node.0].text.as_str())
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn set_text(&mut self, id: NodeId, text: &str) {
        if let Some(element) = self.nodes.get_mut(id.0) {
            element.text = text.to_string();
        }
    }

    /// 更新 `style` 屬性中的單一宣告，其他宣告保持原本順序
    pub fn set_style(&mut self, id: NodeId, property: &str, value: &str) {
        let Some(element) = self.nodes.get_mut(id.0) else {
            return;
        };
        let mut declarations: Vec<(String, String)> = element
            .attribute("style")
            .unwrap_or_default()
            .split(';')
            .filter_map(|declaration| {
                let (name, value) = declaration.split_once(':')?;
                Some((name.trim().to_string(), value.trim().to_string()))
            })
            .filter(|(name, _)| !name.is_empty())
            .collect();
        match declarations.iter_mut().find(|(name, _)| name == property) {
            Some(declaration) => declaration.1 = value.to_string(),
            None => declarations.push((property.to_string(), value.to_string())),
        }
        let style = declarations
            .iter()
            .map(|(name, value)| format!("{}: {}", name, value))
            .collect::<Vec<_>>()
            .join("; ");
        element.attributes.insert("style".to_string(), style);
    }

    pub fn rect(&self, id: NodeId) -> Option<Rect> {
        self.get(id).and_then(|element| element.rect)
    }

    /// 新增空白子元素，優先重用 [`Document::remove`] 釋出的位置
    pub fn append_child(&mut self, parent: NodeId, tag: &str) -> Option<NodeId> {
        if parent.0 >= self.nodes.len() || self.free.contains(&parent) {
            return None;
        }
        let element = Element {
            tag: tag.to_string(),
            parent: Some(parent),
            ..Default::default()
        };
        let id = match self.free.pop() {
            Some(id) => {
                self.nodes[id.0] = element;
                id
            }
            None => {
                self.nodes.push(element);
                NodeId(self.nodes.len() - 1)
            }
        };
        self.nodes[parent.0].children.push(id);
        Some(id)
    }

    /// 移除元素與其子孫並釋出 arena 位置；之後不可再使用這些 NodeId
    pub fn remove(&mut self, id: NodeId) {
        if id == self.root || id == self.body || id.0 >= self.nodes.len() || self.free.contains(&id) {
            return;
        }
        self.detach(id);
        for node in self.descendants(id) {
            self.nodes[node.0] = Element::default();
            self.free.push(node);
        }
    }

    /// 從父節點移除；之後走訪不會再找到它
    pub fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.parent(id) else {
            return;
        };
        self.nodes[parent.0].children.retain(|child| *child != id);
        self.nodes[id.0].parent = None;
    }

    /// 解除所有子節點的連結，arena 中的資料保留
    pub fn clear_children(&mut self, id: NodeId) {
        if let Some(element) = self.nodes.get_mut(id.0) {
            let children = std::mem::take(&mut element.children);
            for child in children {
                self.nodes[child.0].parent = None;
            }
        }
    }

    /// arena 佔用的位置數 (包含等待重用的位置)
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Document {
        Document::from_spec(
            ElementSpec::new("html").child(
                ElementSpec::new("body")
                    .child(ElementSpec::new("nav").class("navbar").id("nav"))
                    .child(
                        ElementSpec::new("div")
                            .class("portfolio-box card")
                            .child(ElementSpec::new("h3").text("Compiler"))
                            .child(ElementSpec::new("p").text("A toy compiler")),
                    ),
            ),
        )
    }

    #[test]
    fn test_body_and_lookup() {
        let doc = sample();
        assert_eq!(doc.get(doc.body()).unwrap().tag, "body");
        let nav = doc.element_by_id("nav").unwrap();
        assert!(doc.has_class(nav, "navbar"));
        assert_eq!(doc.elements_with_class("card").len(), 1);
    }

    #[test]
    fn test_contains_and_closest() {
        let doc = sample();
        let card = doc.elements_with_class("portfolio-box")[0];
        let heading = doc.children(card)[0];
        assert!(doc.contains(card, heading));
        assert!(!doc.contains(heading, card));
        assert_eq!(doc.closest(heading, |e| e.has_class("card")), Some(card));
        assert_eq!(doc.text_content(card), "Compiler A toy compiler");
    }

    #[test]
    fn test_class_mutation_reports_changes() {
        let mut doc = sample();
        let body = doc.body();
        assert!(doc.add_class(body, "loaded"));
        assert!(!doc.add_class(body, "loaded"));
        assert!(doc.remove_class(body, "loaded"));
        assert!(!doc.remove_class(body, "loaded"));
    }

    #[test]
    fn test_from_json() {
        let doc = Document::from_json_str(
            r#"{"tag":"html","children":[{"tag":"body","class":"a b","children":[{"tag":"img","attrs":{"data-src":"me.png"}}]}]}"#,
        )
        .unwrap();
        assert!(doc.has_class(doc.body(), "b"));
        let img = doc.elements_with_tag("img")[0];
        assert_eq!(doc.attribute(img, "data-src"), Some("me.png"));
        assert!(Document::from_json_str("{}").is_err());
    }

    #[test]
    fn test_removed_slots_are_reused() {
        let mut doc = sample();
        let body = doc.body();
        let before = doc.len();

        for _ in 0..20 {
            let span = doc.append_child(body, "span").unwrap();
            let inner = doc.append_child(span, "i").unwrap();
            doc.set_text(inner, "x");
            doc.remove(span);
        }
        assert_eq!(doc.len(), before + 2);
        assert_eq!(doc.elements_with_tag("span").len(), 0);

        let fresh = doc.append_child(body, "em").unwrap();
        assert_eq!(doc.get(fresh).unwrap().tag, "em");
        assert!(doc.children(fresh).is_empty());
        assert_eq!(doc.text_content(fresh), "");

        // 根節點與 body 不會被移除
        doc.remove(doc.root());
        doc.remove(body);
        assert_eq!(doc.get(doc.body()).unwrap().tag, "body");
    }

    #[test]
    fn test_set_style_keeps_other_declarations() {
        let mut doc = sample();
        let nav = doc.element_by_id("nav").unwrap();
        doc.set_attribute(nav, "style", "color: red; transform: scale(1)");

        doc.set_style(nav, "position", "relative");
        doc.set_style(nav, "color", "blue");
        assert_eq!(
            doc.attribute(nav, "style"),
            Some("color: blue; transform: scale(1); position: relative")
        );
    }
}
