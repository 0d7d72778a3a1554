//! Integration tests for the crawler
//!
//! These tests drive the full login, crawl, persist and index cycle through
//! the scripted renderer and an on-disk SQLite store.

use huddle_mapper::config::{parse_config, Config};
use huddle_mapper::session::{AuthState, RendererCall, ScriptedRenderer};
use huddle_mapper::tree::{listing_url, ROOT_ID};
use huddle_mapper::{index, snapshot, Crawler, PageCache, Session, SqliteStore, Store};
use std::path::Path;
use tempfile::TempDir;

const BASE: &str = "https://my.huddle.net/";
const LOGIN_URL: &str = "https://login.huddle.net/authorize?client=huddle";

/// Creates a test configuration writing to `db_path`
fn create_test_config(db_path: &Path) -> Config {
    let content = format!(
        r#"
[site]
base-url = "{}"
login-host = "https://login.huddle.net"

[credentials]
username = "mapper@example.com"
password = "hunter2"

[crawler]
login-settle-ms = 0
selector-timeout-ms = 1000

[output]
database-path = "{}"
"#,
        BASE,
        db_path.display()
    );
    parse_config(&content, |_| None).unwrap()
}

fn listing(folders: &[(&str, &str)], files: &[(&str, &str)]) -> String {
    let mut html = String::from("<html><body><ul class=\"files-list\">");
    for (label, href) in folders {
        html.push_str(&format!(
            r#"<li class="files-list__item--folder"><a class="files-list__label" href="{}">{}<span class="meta">folder</span></a></li>"#,
            href, label
        ));
    }
    for (label, href) in files {
        html.push_str(&format!(
            r#"<li class="files-list__item--file"><a class="files-list__label" href="{}">{}<span class="meta">file</span></a></li>"#,
            href, label
        ));
    }
    html.push_str("</ul></body></html>");
    html
}

/// A workspace of three folders and four files behind a login form
fn workspace(config: &Config) -> ScriptedRenderer {
    let pages = [
        (
            "root",
            listing(
                &[("3 Reports", "#/folder/3/list"), ("Budgets", "#/folder/4/list")],
                &[("Q1.pdf", "#/9001")],
            ),
        ),
        (
            "3",
            listing(
                &[("12 Archive", "#/folder/12/list?sort=name")],
                &[("annual.pdf", "#/9002")],
            ),
        ),
        ("12", listing(&[], &[("old.pdf", "#/9003")])),
        ("4", listing(&[], &[("plan.xlsx", "#/9004")])),
    ];

    let mut renderer = ScriptedRenderer::new(config.selectors.clone()).requiring_login(LOGIN_URL);
    for (id, markup) in &pages {
        renderer = renderer.with_page(&listing_url(BASE, id), markup);
    }
    renderer
}

fn create_crawler(config: &Config) -> Crawler<ScriptedRenderer, SqliteStore> {
    let store = SqliteStore::new(Path::new(&config.output.database_path)).unwrap();
    let session = Session::new(workspace(config), config);
    let cache = PageCache::new(session, store, config);
    Crawler::new(cache, config)
}

#[tokio::test]
async fn test_first_level_listing_after_login() {
    let temp_dir = TempDir::new().unwrap();
    let config = create_test_config(&temp_dir.path().join("huddle.db"));
    let mut crawler = create_crawler(&config);

    let root = crawler.crawl_root().await.unwrap();

    let names: Vec<&str> = root.subfolders.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["Reports (3)", "Budgets"]);
    assert_eq!(root.files.len(), 1);
    assert_eq!(root.files[0].name, "Q1.pdf");
    assert_eq!(root.files[0].parent_id, ROOT_ID);

    let session = crawler.cache().session();
    assert_eq!(session.state(), AuthState::Authenticated);

    let typed: Vec<(String, String)> = session
        .renderer()
        .calls()
        .iter()
        .filter_map(|call| match call {
            RendererCall::Type { selector, text } => Some((selector.clone(), text.clone())),
            _ => None,
        })
        .collect();
    assert_eq!(
        typed,
        vec![
            (
                config.selectors.username_field.clone(),
                "mapper@example.com".to_string()
            ),
            (config.selectors.password_field.clone(), "hunter2".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_full_crawl_persists_to_disk() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("huddle.db");
    let config = create_test_config(&db_path);

    let (record, tree) = {
        let mut crawler = create_crawler(&config);
        crawler.crawl_root().await.unwrap();
        let record = crawler.expand_all().await.unwrap();

        assert_eq!(
            crawler.cache().session().renderer().navigations(),
            vec![
                listing_url(BASE, "root"),
                listing_url(BASE, "3"),
                listing_url(BASE, "12"),
                listing_url(BASE, "4"),
            ]
        );
        (record, crawler.into_tree())
    };

    assert_eq!(tree.root.folder_count(), 3);
    assert_eq!(tree.root.file_count(), 4);
    let archive = &tree.root.subfolders[0].subfolders[0];
    assert_eq!(archive.id, "12");
    assert_eq!(archive.name, "Archive (12)");
    assert_eq!(archive.parent_id, "3");

    let store = SqliteStore::new(&db_path).unwrap();
    assert_eq!(snapshot::load_current(&store).unwrap(), Some(tree.clone()));
    assert_eq!(snapshot::history(&store).unwrap(), vec![record.clone()]);
    assert_eq!(snapshot::load_at(&store, record.timestamp).unwrap(), Some(tree));

    // every listing markup is cached
    assert_eq!(store.keys_with_prefix("folder-html:").unwrap().len(), 4);
}

#[tokio::test]
async fn test_second_run_uses_cache_and_extends_history() {
    let temp_dir = TempDir::new().unwrap();
    let config = create_test_config(&temp_dir.path().join("huddle.db"));

    let first = {
        let mut crawler = create_crawler(&config);
        crawler.expand_all().await.unwrap()
    };

    let mut crawler = create_crawler(&config);
    let second = crawler.expand_all().await.unwrap();

    // nothing is fetched, so the second session never logs in
    assert!(crawler.cache().session().renderer().calls().is_empty());
    assert_eq!(crawler.cache().session().state(), AuthState::Unauthenticated);
    assert_eq!(crawler.cache_stats().hits, 4);

    assert!(second.timestamp > first.timestamp);
    let history = snapshot::history(crawler.cache().store()).unwrap();
    assert_eq!(history, vec![first, second]);
}

#[tokio::test]
async fn test_force_refetch_visits_every_folder_again() {
    let temp_dir = TempDir::new().unwrap();
    let mut config = create_test_config(&temp_dir.path().join("huddle.db"));

    {
        let mut crawler = create_crawler(&config);
        crawler.expand_all().await.unwrap();
    }

    config.crawler.force_refetch = true;
    let mut crawler = create_crawler(&config);
    crawler.expand_all().await.unwrap();

    assert_eq!(crawler.cache().session().renderer().navigations().len(), 4);
    assert_eq!(crawler.cache_stats().fetches, 4);
    assert_eq!(crawler.cache_stats().hits, 0);
}

#[tokio::test]
async fn test_index_from_current_snapshot() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("huddle.db");
    let config = create_test_config(&db_path);

    {
        let mut crawler = create_crawler(&config);
        crawler.expand_all().await.unwrap();
    }

    let mut store = SqliteStore::new(&db_path).unwrap();
    let tree = snapshot::load_current(&store).unwrap().unwrap();
    let summary = index::store_records(&mut store, &tree.root, false).unwrap();

    assert_eq!(summary.folders_written, 4);
    assert_eq!(summary.files_written, 4);

    let ids: Vec<String> = index::folder_records(&store)
        .unwrap()
        .into_iter()
        .map(|record| record.id)
        .collect();
    assert_eq!(ids, vec!["12", "3", "4", "root"]);

    let old = index::file_record(&store, "9003").unwrap().unwrap();
    assert_eq!(old.name, "old.pdf");
    assert_eq!(old.parent_id, "12");

    let again = index::store_records(&mut store, &tree.root, false).unwrap();
    assert_eq!(again.folders_skipped, 4);
    assert_eq!(again.files_skipped, 4);
}

#[tokio::test]
async fn test_missing_listing_aborts_crawl() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("huddle.db");
    let config = create_test_config(&db_path);

    let renderer = ScriptedRenderer::new(config.selectors.clone()).with_page(
        &listing_url(BASE, "root"),
        &listing(&[("Ghost", "#/folder/99/list")], &[]),
    );
    let store = SqliteStore::new(&db_path).unwrap();
    let cache = PageCache::new(Session::new(renderer, &config), store, &config);
    let mut crawler = Crawler::new(cache, &config);

    assert!(crawler.expand_all().await.is_err());
    assert!(snapshot::load_current(crawler.cache().store())
        .unwrap()
        .is_none());
}
