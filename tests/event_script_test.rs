use anyhow::Result;
use portfolio_ui::core::menu::MenuChange;
use portfolio_ui::{
    Document, DryRunSubmitter, EventScript, FileThemeStore, Page, RecordingAnimator, SiteConfig,
    Theme,
};
use std::sync::Arc;
use tempfile::TempDir;

const PAGE_JSON: &str = r##"
{
  "tag": "html",
  "children": [
    {
      "tag": "body",
      "children": [
        {
          "tag": "nav", "class": "navbar", "rect": {"top": 0, "left": 0, "width": 1280, "height": 80},
          "children": [
            {"tag": "div", "class": "ham-menu"},
            {"tag": "div", "id": "pull-cord"},
            {
              "tag": "div", "class": "off-screen-menu",
              "children": [
                {"tag": "span", "class": "menu-close"},
                {"tag": "a", "class": "menu-link", "attrs": {"href": "#about"}, "text": "About"},
                {"tag": "a", "class": "menu-link", "attrs": {"href": "#portfolio"}, "text": "Work"}
              ]
            }
          ]
        },
        {"tag": "section", "id": "home", "rect": {"top": 0, "left": 0, "width": 1280, "height": 800}},
        {"tag": "section", "id": "about", "rect": {"top": 800, "left": 0, "width": 1280, "height": 800}},
        {
          "tag": "section", "id": "portfolio", "rect": {"top": 1600, "left": 0, "width": 1280, "height": 1000},
          "children": [
            {
              "tag": "div", "class": "portfolio-box", "rect": {"top": 1700, "left": 0, "width": 400, "height": 300},
              "children": [
                {"tag": "h3", "text": "Compiler"},
                {"tag": "p", "text": "A toy compiler"}
              ]
            },
            {
              "tag": "div", "class": "portfolio-box", "rect": {"top": 1700, "left": 420, "width": 400, "height": 300},
              "children": [
                {"tag": "h3", "text": "Database"},
                {"tag": "p", "text": "A key-value store"}
              ]
            }
          ]
        },
        {
          "tag": "section", "id": "contact",
          "children": [
            {
              "tag": "form", "id": "contact-form",
              "children": [
                {"tag": "input", "attrs": {"name": "from_name"}},
                {"tag": "input", "attrs": {"name": "reply_to"}},
                {"tag": "textarea", "attrs": {"name": "message"}},
                {"tag": "button", "class": "btn", "text": "Send Message"}
              ]
            }
          ]
        }
      ]
    }
  ]
}
"##;

const EVENTS_JSON: &str = r#"
[
  {"type": "click", "target": {"class": "ham-menu"}},
  {"type": "click", "target": {"class": "menu-link", "index": 0}},
  {"type": "scroll", "offset": 1200},
  {"type": "wait", "ms": 300},
  {"type": "click", "target": {"card": "projects", "index": 1}},
  {"type": "click", "target": {"id": "pull-cord"}},
  {"type": "key", "key": "Escape"},
  {"type": "submit_contact", "name": "Ada", "email": "ada@example.com", "message": "Hi"}
]
"#;

async fn setup(temp_dir: &TempDir) -> Result<(String, String, String)> {
    let page_path = temp_dir.path().join("page.json");
    let events_path = temp_dir.path().join("events.json");
    let theme_path = temp_dir.path().join("state").join("theme.json");
    tokio::fs::write(&page_path, PAGE_JSON).await?;
    tokio::fs::write(&events_path, EVENTS_JSON).await?;
    Ok((
        page_path.to_string_lossy().to_string(),
        events_path.to_string_lossy().to_string(),
        theme_path.to_string_lossy().to_string(),
    ))
}

/// 從檔案載入頁面與腳本並完整重播
#[tokio::test]
async fn test_replay_script_from_files() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let (page_path, events_path, theme_path) = setup(&temp_dir).await?;

    let config = SiteConfig::default();
    let animator = RecordingAnimator::new();
    let (page, report) = Page::init(
        Document::from_file(&page_path)?,
        &config,
        Box::new(FileThemeStore::new(&theme_path)),
        Box::new(animator.clone()),
    )?;
    // 頁面上沒有 certifications 群組
    assert_eq!(report.issues.len(), 1);
    let mut page = page.with_submitter(Arc::new(DryRunSubmitter));

    let script = EventScript::from_file(&events_path)?;
    let replay = script.run(&mut page).await?;
    assert_eq!(replay.steps, 8);

    // 漢堡鈕開啟選單，選單連結關閉選單並捲到區段 (區段頂端減去導覽列高度)
    assert_eq!(replay.outcomes[0].menu, Some(MenuChange::Opened));
    assert_eq!(replay.outcomes[1].menu, Some(MenuChange::Closed));
    assert_eq!(replay.outcomes[1].scroll_to, Some(720.0));

    let scroll = replay.outcomes[2].scroll.as_ref().unwrap();
    assert!(scroll.navbar_scrolled);
    assert_eq!(scroll.active_section.as_deref(), Some("#about"));
    assert!((scroll.progress - 66.666).abs() < 0.01);

    // 兩張卡片進場，間隔 100 ms，300 ms 時都已顯示
    assert_eq!(replay.outcomes[3].revealed.len(), 2);

    assert_eq!(replay.submissions.len(), 1);
    assert!(replay.submissions[0].is_sent());

    let snapshot = page.snapshot();
    assert_eq!(snapshot.theme, Theme::Dark);
    assert!(!snapshot.menu_open);
    assert!(!snapshot.page_expanded);
    assert_eq!(snapshot.scroll_y, 1200.0);
    assert_eq!(snapshot.pending_reveals, 0);
    assert_eq!(snapshot.groups.len(), 1);
    assert_eq!(snapshot.groups[0].cards[1].title, "Database");
    assert!(snapshot.groups[0].cards.iter().all(|card| !card.expanded));

    let json = serde_json::to_value(&snapshot)?;
    assert_eq!(json["theme"], "dark");
    assert_eq!(json["groups"][0]["name"], "projects");

    assert!(!animator.is_empty());
    Ok(())
}

/// 主題寫入檔案後，下次載入頁面會沿用
#[tokio::test]
async fn test_theme_persists_between_sessions() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let (page_path, events_path, theme_path) = setup(&temp_dir).await?;
    let config = SiteConfig::default();

    {
        let (mut page, _) = Page::init(
            Document::from_file(&page_path)?,
            &config,
            Box::new(FileThemeStore::new(&theme_path)),
            Box::new(RecordingAnimator::new()),
        )?;
        EventScript::from_file(&events_path)?.run(&mut page).await?;
        assert_eq!(page.theme(), Theme::Dark);
    }

    let stored = tokio::fs::read_to_string(&theme_path).await?;
    assert!(stored.contains("dark"));

    let (page, _) = Page::init(
        Document::from_file(&page_path)?,
        &config,
        Box::new(FileThemeStore::new(&theme_path)),
        Box::new(RecordingAnimator::new()),
    )?;
    assert_eq!(page.theme(), Theme::Dark);
    let root = page.document().root();
    assert_eq!(page.document().attribute(root, "data-theme"), Some("dark"));
    Ok(())
}

#[tokio::test]
async fn test_missing_target_aborts_replay() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let (page_path, _, theme_path) = setup(&temp_dir).await?;

    let (mut page, _) = Page::init(
        Document::from_file(&page_path)?,
        &SiteConfig::default(),
        Box::new(FileThemeStore::new(&theme_path)),
        Box::new(RecordingAnimator::new()),
    )?;
    let script = EventScript::from_json_str(
        r#"[{"type": "click", "target": {"card": "certifications", "index": 0}}]"#,
    )?;

    let result = script.run(&mut page).await;
    assert!(result.is_err());
    Ok(())
}
