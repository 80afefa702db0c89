#[cfg(feature = "cli")]
pub mod cli;

use crate::domain::model::Theme;
use crate::domain::selector::Selector;
use crate::utils::error::{PortfolioError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub site: SiteInfo,
    pub theme: ThemeConfig,
    pub cards: CardsConfig,
    pub menu: MenuConfig,
    pub scroll: ScrollConfig,
    pub contact: ContactConfig,
    pub effects: EffectsConfig,
    pub intro: IntroConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteInfo {
    pub name: String,
    pub owner_email: String,
}

impl Default for SiteInfo {
    fn default() -> Self {
        Self {
            name: "portfolio".to_string(),
            owner_email: "owner@example.com".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    pub storage_path: String,
    pub default: Theme,
    /// 主題切換拉繩的元素 id
    pub toggle_id: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            storage_path: "theme.json".to_string(),
            default: Theme::Light,
            toggle_id: "pull-cord".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardGroupConfig {
    pub name: String,
    pub selector: String,
}

/// 手風琴規則的範圍：每個群組各自最多一張展開，或整頁最多一張
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccordionScope {
    #[default]
    Group,
    Page,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CardsConfig {
    pub groups: Vec<CardGroupConfig>,
    pub accordion_scope: AccordionScope,
    /// 非 heading 元素也可以用這個 class 當作標題
    pub title_class: String,
    /// 有卡片展開時加在 body 上的 class，給背景遮罩使用
    pub page_expanded_class: String,
}

impl Default for CardsConfig {
    fn default() -> Self {
        Self {
            groups: vec![
                CardGroupConfig {
                    name: "projects".to_string(),
                    selector: ".portfolio-box".to_string(),
                },
                CardGroupConfig {
                    name: "certifications".to_string(),
                    selector: ".cert-box".to_string(),
                },
            ],
            accordion_scope: AccordionScope::Group,
            title_class: "card-title".to_string(),
            page_expanded_class: "cards-expanded".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuConfig {
    pub hamburger_selector: String,
    pub menu_selector: String,
    pub close_selector: String,
    pub desktop_breakpoint: f64,
    pub resize_debounce_ms: u64,
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            hamburger_selector: ".ham-menu".to_string(),
            menu_selector: ".off-screen-menu".to_string(),
            close_selector: ".menu-close".to_string(),
            desktop_breakpoint: 968.0,
            resize_debounce_ms: 250,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollConfig {
    pub navbar_selector: String,
    pub navbar_threshold: f64,
    pub section_offset: f64,
    pub reveal_selector: String,
    pub reveal_threshold: f64,
    pub reveal_bottom_margin: f64,
    pub reveal_stagger_ms: u64,
    pub lazy_image_selector: String,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            navbar_selector: ".navbar".to_string(),
            navbar_threshold: 50.0,
            section_offset: 100.0,
            reveal_selector: ".skill-card, .exp-box, .portfolio-box, .edu-card, .cert-box"
                .to_string(),
            reveal_threshold: 0.1,
            reveal_bottom_margin: 50.0,
            reveal_stagger_ms: 100,
            lazy_image_selector: "img[data-src]".to_string(),
        }
    }
}

/// 載入動畫與捲動觸發的進場動畫
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IntroConfig {
    pub enabled: bool,
    pub loader_selector: String,
    pub loaded_class: String,
    pub loader_fade_ms: u64,
    pub entrance_selector: String,
    /// 元素頂端進入可視高度的這個比例時播放進場動畫
    pub entrance_start: f64,
    pub typing_selector: String,
    pub counter_selector: String,
    pub counter_duration_ms: u64,
}

impl Default for IntroConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            loader_selector: ".loader".to_string(),
            loaded_class: "loaded".to_string(),
            loader_fade_ms: 500,
            entrance_selector: ".skill-card, .exp-box, .portfolio-box, .edu-card, .cert-box"
                .to_string(),
            entrance_start: 0.85,
            typing_selector: ".home-info h2 span[data-text]".to_string(),
            counter_selector: "[data-count]".to_string(),
            counter_duration_ms: 2000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactConfig {
    pub endpoint: String,
    pub service_id: Option<String>,
    pub template_id: Option<String>,
    pub public_key: Option<String>,
    pub timeout_seconds: u64,
    pub form_id: String,
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.emailjs.com/api/v1.0/email/send".to_string(),
            service_id: None,
            template_id: None,
            public_key: None,
            timeout_seconds: 15,
            form_id: "contact-form".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectsConfig {
    pub magnetic: MagneticConfig,
    pub tilt: TiltConfig,
    pub ripple: EffectTarget,
    pub fluid_reveal: EffectTarget,
    pub typography: EffectTarget,
    pub parallax: ParallaxConfig,
}

impl Default for EffectsConfig {
    fn default() -> Self {
        Self {
            magnetic: MagneticConfig::default(),
            tilt: TiltConfig::default(),
            ripple: EffectTarget::new(".btn, .portfolio-box, .skill-box, .cert-box, a, button"),
            fluid_reveal: EffectTarget::new(".portfolio-box, .cert-box, .skill-box, .about-box"),
            typography: EffectTarget::new("section > h2, .portfolio-box h3, .skill-box h3"),
            parallax: ParallaxConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectTarget {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    pub selector: String,
}

fn default_enabled() -> bool {
    true
}

impl EffectTarget {
    pub fn new(selector: &str) -> Self {
        Self {
            enabled: true,
            selector: selector.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MagneticConfig {
    pub enabled: bool,
    pub selector: String,
    pub strength: f64,
    pub ease: f64,
    pub radius: f64,
}

impl Default for MagneticConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            selector: ".btn, .portfolio-box, .cert-box, .skill-box".to_string(),
            strength: 0.3,
            ease: 0.3,
            radius: 100.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TiltConfig {
    pub enabled: bool,
    pub selector: String,
    pub max_angle: f64,
}

impl Default for TiltConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            selector: ".skill-card".to_string(),
            max_angle: 10.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParallaxConfig {
    pub enabled: bool,
    pub selector: String,
    pub slow_distance: f64,
    pub fast_distance: f64,
}

impl Default for ParallaxConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            selector: ".parallax-slow, .parallax-fast".to_string(),
            slow_distance: 100.0,
            fast_distance: 200.0,
        }
    }
}

impl SiteConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置，未填寫的區段使用預設值
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| PortfolioError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${EMAILJS_PUBLIC_KEY})，找不到的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| PortfolioError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 是否已設定寄信服務的所有憑證
    pub fn contact_enabled(&self) -> bool {
        self.contact.service_id.is_some()
            && self.contact.template_id.is_some()
            && self.contact.public_key.is_some()
    }

    fn validate_selectors(&self) -> Result<()> {
        let mut selectors = vec![
            ("menu.hamburger_selector", &self.menu.hamburger_selector),
            ("menu.menu_selector", &self.menu.menu_selector),
            ("menu.close_selector", &self.menu.close_selector),
            ("scroll.navbar_selector", &self.scroll.navbar_selector),
            ("scroll.reveal_selector", &self.scroll.reveal_selector),
            ("scroll.lazy_image_selector", &self.scroll.lazy_image_selector),
            ("effects.magnetic.selector", &self.effects.magnetic.selector),
            ("effects.tilt.selector", &self.effects.tilt.selector),
            ("effects.ripple.selector", &self.effects.ripple.selector),
            ("effects.fluid_reveal.selector", &self.effects.fluid_reveal.selector),
            ("effects.typography.selector", &self.effects.typography.selector),
            ("effects.parallax.selector", &self.effects.parallax.selector),
            ("intro.loader_selector", &self.intro.loader_selector),
            ("intro.entrance_selector", &self.intro.entrance_selector),
            ("intro.typing_selector", &self.intro.typing_selector),
            ("intro.counter_selector", &self.intro.counter_selector),
        ];
        selectors.extend(
            self.cards
                .groups
                .iter()
                .map(|group| ("cards.groups.selector", &group.selector)),
        );

        for (field, selector) in selectors {
            Selector::parse(selector).map_err(|e| PortfolioError::InvalidConfigValueError {
                field: field.to_string(),
                value: selector.clone(),
                reason: e.to_string(),
            })?;
        }
        Ok(())
    }
}

impl Validate for SiteConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("theme.storage_path", &self.theme.storage_path)?;
        validation::validate_non_empty_string("theme.toggle_id", &self.theme.toggle_id)?;

        validation::validate_unique_names(
            "cards.groups.name",
            self.cards.groups.iter().map(|group| group.name.as_str()),
        )?;
        for group in &self.cards.groups {
            validation::validate_non_empty_string("cards.groups.name", &group.name)?;
        }
        validation::validate_class_name("cards.title_class", &self.cards.title_class)?;
        validation::validate_class_name("cards.page_expanded_class", &self.cards.page_expanded_class)?;

        validation::validate_range("menu.desktop_breakpoint", self.menu.desktop_breakpoint, 1.0, 10_000.0)?;
        validation::validate_range("scroll.reveal_threshold", self.scroll.reveal_threshold, 0.0, 1.0)?;
        validation::validate_range("effects.magnetic.strength", self.effects.magnetic.strength, 0.0, 1.0)?;
        validation::validate_range("effects.magnetic.ease", self.effects.magnetic.ease, 0.01, 1.0)?;
        validation::validate_range("effects.tilt.max_angle", self.effects.tilt.max_angle, 0.0, 90.0)?;
        validation::validate_range("intro.entrance_start", self.intro.entrance_start, 0.0, 1.0)?;
        validation::validate_class_name("intro.loaded_class", &self.intro.loaded_class)?;

        validation::validate_url("contact.endpoint", &self.contact.endpoint)?;
        validation::validate_positive_number("contact.timeout_seconds", self.contact.timeout_seconds, 1)?;

        self.validate_selectors()
    }
}
