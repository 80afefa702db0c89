//! 簡易 CSS 選擇器
//!
//! 支援 `tag`、`.class`、`tag.class`、`[attr]`、後代 (`a b`)、子代 (`a > b`)
//! 以及逗號分隔的多個選擇器。設定檔中的元素標記都用這個格式。

use crate::domain::document::{Document, Element, NodeId};
use crate::utils::error::{PortfolioError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct Compound {
    tag: Option<String>,
    classes: Vec<String>,
    attributes: Vec<String>,
}

impl Compound {
    fn parse(token: &str) -> Result<Self> {
        let mut compound = Compound::default();
        let mut rest = token;

        let tag_end = rest.find(['.', '[']).unwrap_or(rest.len());
        if tag_end > 0 {
            compound.tag = Some(rest[..tag_end].to_ascii_lowercase());
        }
        rest = &rest[tag_end..];

        while !rest.is_empty() {
            if let Some(stripped) = rest.strip_prefix('.') {
                let end = stripped.find(['.', '[']).unwrap_or(stripped.len());
                if end == 0 {
                    return Err(invalid(token, "empty class name"));
                }
                compound.classes.push(stripped[..end].to_string());
                rest = &stripped[end..];
            } else if let Some(stripped) = rest.strip_prefix('[') {
                let end = stripped
                    .find(']')
                    .ok_or_else(|| invalid(token, "unclosed attribute selector"))?;
                compound.attributes.push(stripped[..end].to_string());
                rest = &stripped[end + 1..];
            } else {
                return Err(invalid(token, "unexpected character"));
            }
        }

        if compound == Compound::default() {
            return Err(invalid(token, "empty selector"));
        }
        Ok(compound)
    }

    fn matches(&self, element: &Element) -> bool {
        self.tag.as_ref().is_none_or(|tag| &element.tag == tag)
            && self.classes.iter().all(|class| element.has_class(class))
            && self
                .attributes
                .iter()
                .all(|attr| element.attribute(attr).is_some())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

/// 單一複合鏈，例如 `section > h2`
#[derive(Debug, Clone, PartialEq, Eq)]
struct Chain {
    // 最右邊的是主體；其餘依序往左，每段附帶與右邊的連接方式
    subject: Compound,
    ancestors: Vec<(Combinator, Compound)>,
}

impl Chain {
    fn parse(text: &str) -> Result<Self> {
        let spaced = text.replace('>', " > ");
        let mut parts: Vec<(Combinator, Compound)> = Vec::new();
        let mut pending = Combinator::Descendant;
        for token in spaced.split_whitespace() {
            if token == ">" {
                if parts.is_empty() {
                    return Err(invalid(text, "combinator without left side"));
                }
                pending = Combinator::Child;
                continue;
            }
            parts.push((pending, Compound::parse(token)?));
            pending = Combinator::Descendant;
        }
        if pending == Combinator::Child {
            return Err(invalid(text, "combinator without right side"));
        }

        // parts[i].0 是 parts[i] 與左邊元素的連接方式，轉成與右邊的連接方式
        let (mut link_to_right, subject) = parts
            .pop()
            .ok_or_else(|| invalid(text, "empty selector"))?;
        let mut ancestors = Vec::with_capacity(parts.len());
        while let Some((link_to_left, compound)) = parts.pop() {
            ancestors.push((link_to_right, compound));
            link_to_right = link_to_left;
        }
        Ok(Self { subject, ancestors })
    }

    fn matches(&self, document: &Document, node: NodeId) -> bool {
        match document.get(node) {
            Some(element) if self.subject.matches(element) => {
                Self::match_ancestors(document, node, &self.ancestors)
            }
            _ => false,
        }
    }

    fn match_ancestors(
        document: &Document,
        node: NodeId,
        ancestors: &[(Combinator, Compound)],
    ) -> bool {
        let Some(((combinator, compound), rest)) = ancestors.split_first() else {
            return true;
        };
        let mut current = document.parent(node);
        while let Some(candidate) = current {
            let element_matches = document
                .get(candidate)
                .is_some_and(|element| compound.matches(element));
            if element_matches && Self::match_ancestors(document, candidate, rest) {
                return true;
            }
            if *combinator == Combinator::Child {
                return false;
            }
            current = document.parent(candidate);
        }
        false
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    source: String,
    chains: Vec<Chain>,
}

impl Selector {
    pub fn parse(text: &str) -> Result<Self> {
        let chains = text
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(Chain::parse)
            .collect::<Result<Vec<_>>>()?;
        if chains.is_empty() {
            return Err(invalid(text, "empty selector"));
        }
        Ok(Self {
            source: text.trim().to_string(),
            chains,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn matches(&self, document: &Document, node: NodeId) -> bool {
        self.chains.iter().any(|chain| chain.matches(document, node))
    }
}

fn invalid(selector: &str, reason: &str) -> PortfolioError {
    PortfolioError::InvalidConfigValueError {
        field: "selector".to_string(),
        value: selector.to_string(),
        reason: reason.to_string(),
    }
}

impl Document {
    /// 依文件順序回傳所有符合的元素
    pub fn query_all(&self, selector: &Selector) -> Vec<NodeId> {
        self.descendants(self.root())
            .into_iter()
            .filter(|id| selector.matches(self, *id))
            .collect()
    }

    pub fn query(&self, selector: &Selector) -> Option<NodeId> {
        self.descendants(self.root())
            .into_iter()
            .find(|id| selector.matches(self, *id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::document::ElementSpec;

    fn page() -> Document {
        Document::from_spec(
            ElementSpec::new("html").child(
                ElementSpec::new("body")
                    .child(
                        ElementSpec::new("section")
                            .id("about")
                            .child(ElementSpec::new("h2").text("About"))
                            .child(
                                ElementSpec::new("div")
                                    .class("skill-box")
                                    .child(ElementSpec::new("h3").text("Rust")),
                            ),
                    )
                    .child(
                        ElementSpec::new("div")
                            .class("portfolio-box")
                            .child(ElementSpec::new("h3").text("Site"))
                            .child(ElementSpec::new("img").attr("data-src", "site.png")),
                    ),
            ),
        )
    }

    #[test]
    fn test_compound_and_list() {
        let doc = page();
        let selector = Selector::parse(".portfolio-box, .skill-box").unwrap();
        assert_eq!(doc.query_all(&selector).len(), 2);

        let images = Selector::parse("img[data-src]").unwrap();
        assert_eq!(doc.query_all(&images).len(), 1);
    }

    #[test]
    fn test_child_combinator() {
        let doc = page();
        let direct = Selector::parse("section > h2").unwrap();
        assert_eq!(doc.query_all(&direct).len(), 1);

        let direct_h3 = Selector::parse("section > h3").unwrap();
        assert!(doc.query_all(&direct_h3).is_empty());

        let nested_h3 = Selector::parse("section h3").unwrap();
        assert_eq!(doc.query_all(&nested_h3).len(), 1);
    }

    #[test]
    fn test_descendant_list_like_heading_config() {
        let doc = page();
        let selector = Selector::parse("section > h2, .portfolio-box h3, .skill-box h3").unwrap();
        let texts: Vec<String> = doc
            .query_all(&selector)
            .into_iter()
            .map(|id| doc.text_content(id))
            .collect();
        assert_eq!(texts, vec!["About", "Rust", "Site"]);
    }

    #[test]
    fn test_invalid_selectors() {
        assert!(Selector::parse("").is_err());
        assert!(Selector::parse("> h2").is_err());
        assert!(Selector::parse("section >").is_err());
        assert!(Selector::parse(".").is_err());
        assert!(Selector::parse("img[alt").is_err());
    }
}
