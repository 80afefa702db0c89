use crate::config::CardsConfig;
use crate::core::cards::{CardParts, DiscoveredGroup};
use crate::domain::document::{Document, NodeId};
use crate::domain::selector::Selector;
use crate::utils::error::PortfolioError;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct DiscoveryReport {
    pub groups: Vec<DiscoveredGroup>,
    /// 初始化時發現的設定錯誤；對應的卡片或群組已被略過
    pub issues: Vec<PortfolioError>,
}

impl DiscoveryReport {
    pub fn card_count(&self) -> usize {
        self.groups.iter().map(|group| group.cards.len()).sum()
    }
}

/// 依設定的群組標記找出所有卡片，拆成標題與內容
pub fn discover_cards(document: &Document, config: &CardsConfig) -> DiscoveryReport {
    let mut report = DiscoveryReport::default();
    // 每張卡片只屬於一個群組；先出現的群組優先
    let mut claimed: HashMap<NodeId, &str> = HashMap::new();

    for group_config in &config.groups {
        let selector = match Selector::parse(&group_config.selector) {
            Ok(selector) => selector,
            Err(e) => {
                tracing::warn!("⚠️ Card group '{}' skipped: {}", group_config.name, e);
                report.issues.push(e);
                continue;
            }
        };

        let mut cards = Vec::new();
        for (index, element) in document.query_all(&selector).into_iter().enumerate() {
            let parts = match claimed.get(&element) {
                Some(owner) => Err(format!("card already belongs to group '{}'", owner)),
                None => split_card(document, element, &config.title_class),
            };
            match parts {
                Ok(parts) => {
                    claimed.insert(element, group_config.name.as_str());
                    cards.push(parts);
                }
                Err(reason) => {
                    let issue = PortfolioError::MalformedCard {
                        group: group_config.name.clone(),
                        index,
                        reason,
                    };
                    tracing::warn!("⚠️ {}", issue);
                    report.issues.push(issue);
                }
            }
        }

        if cards.is_empty() {
            let issue = PortfolioError::ConfigError {
                message: format!(
                    "Card group '{}' ({}) has no valid cards",
                    group_config.name, group_config.selector
                ),
            };
            tracing::warn!("⚠️ {}", issue);
            report.issues.push(issue);
            continue;
        }

        tracing::debug!(
            "Discovered {} card(s) in group '{}'",
            cards.len(),
            group_config.name
        );
        report.groups.push(DiscoveredGroup {
            name: group_config.name.clone(),
            cards,
        });
    }

    report
}

fn split_card(
    document: &Document,
    element: NodeId,
    title_class: &str,
) -> std::result::Result<CardParts, String> {
    let children = document.children(element);
    let title_position = children
        .iter()
        .position(|&child| {
            document
                .get(child)
                .is_some_and(|e| e.is_heading() || e.has_class(title_class))
        })
        .ok_or_else(|| "card has no title element".to_string())?;

    let title = children[title_position];
    let body: Vec<NodeId> = children
        .iter()
        .enumerate()
        .filter(|(position, _)| *position != title_position)
        .map(|(_, &child)| child)
        .collect();
    if body.is_empty() {
        return Err("card has no body content".to_string());
    }

    let title_text = document.text_content(title);
    if title_text.trim().is_empty() {
        return Err("card title is empty".to_string());
    }

    Ok(CardParts {
        element,
        title,
        title_text: title_text.trim().to_string(),
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CardGroupConfig;
    use crate::domain::document::ElementSpec;

    fn card(class: &str, title: Option<&str>, body: usize) -> ElementSpec {
        let mut spec = ElementSpec::new("div").class(class);
        if let Some(title) = title {
            spec = spec.child(ElementSpec::new("h4").text(title));
        }
        for i in 0..body {
            spec = spec.child(ElementSpec::new("p").text(&format!("detail {}", i)));
        }
        spec
    }

    fn page(cards: Vec<ElementSpec>) -> Document {
        let mut body = ElementSpec::new("body");
        for card in cards {
            body = body.child(card);
        }
        Document::from_spec(ElementSpec::new("html").child(body))
    }

    #[test]
    fn test_discovers_groups_in_document_order() {
        let doc = page(vec![
            card("portfolio-box", Some("Compiler"), 2),
            card("cert-box", Some("AWS"), 1),
            card("portfolio-box", Some("Game"), 1),
        ]);
        let report = discover_cards(&doc, &CardsConfig::default());

        assert!(report.issues.is_empty());
        assert_eq!(report.groups.len(), 2);
        let projects = &report.groups[0];
        assert_eq!(projects.name, "projects");
        let titles: Vec<&str> = projects.cards.iter().map(|c| c.title_text.as_str()).collect();
        assert_eq!(titles, vec!["Compiler", "Game"]);
        assert_eq!(projects.cards[0].body.len(), 2);
        assert_eq!(report.card_count(), 3);
    }

    #[test]
    fn test_malformed_cards_are_skipped() {
        let doc = page(vec![
            card("portfolio-box", None, 2),
            card("portfolio-box", Some("Only title"), 0),
            card("portfolio-box", Some("Good"), 1),
            card("cert-box", Some("Cert"), 1),
        ]);
        let report = discover_cards(&doc, &CardsConfig::default());

        assert_eq!(report.groups[0].cards.len(), 1);
        assert_eq!(report.groups[0].cards[0].title_text, "Good");
        let malformed: Vec<usize> = report
            .issues
            .iter()
            .filter_map(|issue| match issue {
                PortfolioError::MalformedCard { index, .. } => Some(*index),
                _ => None,
            })
            .collect();
        assert_eq!(malformed, vec![0, 1]);
    }

    #[test]
    fn test_empty_group_is_reported_and_omitted() {
        let doc = page(vec![card("portfolio-box", Some("Solo"), 1)]);
        let report = discover_cards(&doc, &CardsConfig::default());

        assert_eq!(report.groups.len(), 1);
        assert!(matches!(
            report.issues.as_slice(),
            [PortfolioError::ConfigError { .. }]
        ));
    }

    #[test]
    fn test_card_matching_two_groups_stays_in_first() {
        let doc = page(vec![
            card("portfolio-box", Some("P1"), 1),
            card("portfolio-box cert-box", Some("Both"), 1),
            card("cert-box", Some("C1"), 1),
        ]);
        let report = discover_cards(&doc, &CardsConfig::default());

        let titles = |group: usize| -> Vec<String> {
            report.groups[group]
                .cards
                .iter()
                .map(|c| c.title_text.clone())
                .collect()
        };
        assert_eq!(titles(0), vec!["P1", "Both"]);
        assert_eq!(titles(1), vec!["C1"]);
        match report.issues.as_slice() {
            [PortfolioError::MalformedCard { group, index, reason }] => {
                assert_eq!(group, "certifications");
                assert_eq!(*index, 0);
                assert_eq!(reason, "card already belongs to group 'projects'");
            }
            other => panic!("unexpected issues: {:?}", other),
        }
    }

    #[test]
    fn test_title_class_marks_non_heading_title() {
        let doc = page(vec![ElementSpec::new("article")
            .class("talk")
            .child(ElementSpec::new("div").class("media"))
            .child(ElementSpec::new("button").class("card-title").text("RustConf"))]);
        let config = CardsConfig {
            groups: vec![CardGroupConfig {
                name: "talks".to_string(),
                selector: "article.talk".to_string(),
            }],
            ..CardsConfig::default()
        };
        let report = discover_cards(&doc, &config);

        let parts = &report.groups[0].cards[0];
        assert_eq!(parts.title_text, "RustConf");
        assert_eq!(parts.body.len(), 1);
    }
}
