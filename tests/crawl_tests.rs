//! End-to-end crawl tests
//!
//! These tests run the full coordinator against a wiremock server and
//! verify the on-disk layout: one directory per post with sequentially
//! numbered images and an `info.json` in the legacy schema.

use dripgrab::config::Config;
use dripgrab::crawler::Coordinator;
use dripgrab::output::{FailureCategory, MemoryFailureLog};
use image::ImageFormat;
use std::io::Cursor;
use std::sync::Arc;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_config(listing_url: &str, download_root: &TempDir) -> Config {
    let mut config = Config::default();
    config.board.listing_url = listing_url.to_string();
    config.crawl.start_page = 1;
    config.crawl.end_page = 1;
    config.crawl.max_concurrent_posts = 2;
    config.output.download_root = download_root.path().to_path_buf();
    config
}

fn png_bytes() -> Vec<u8> {
    let img = image::ImageBuffer::from_pixel(2, 2, image::Rgb::<u8>([0, 128, 255]));
    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

fn listing_page(rows: &str) -> String {
    format!(
        r#"<html><body><table><tbody>
             <tr><td>number</td><td>title</td></tr>
             {rows}
           </tbody></table></body></html>"#
    )
}

fn post_row(number: &str, srl: &str, title: &str) -> String {
    format!(
        r#"<tr>
             <td class="ed no">{number}</td>
             <td>
               <a href="/index.php?mid=board&document_srl={srl}">
                 <span class="ed title-link">{title}</span>
               </a>
               <span class="ed text-primary">1</span>
               <span class="ed print-icon margin-left-xxsmall"></span>
             </td>
             <td class="author">writer</td>
             <td class="time">2024-01-02</td>
             <td class="ed voteNum text-primary">4</td>
             <td class="readNum">77</td>
           </tr>"#
    )
}

fn pinned_row() -> &'static str {
    r#"<tr><td class="ed no">공지</td><td>board notice</td></tr>"#
}

fn post_page(srl: &str, images: &[&str]) -> String {
    let imgs: String = images
        .iter()
        .map(|src| format!(r#"<img src="{src}">"#))
        .collect();
    format!(
        r#"<html><body>
             <div class="ed clearfix margin-vertical-large">
               <div class="xe_content">Hello world</div>
               <div class="xe_content">   </div>
             </div>
             <div class="document_{srl}_0">{imgs}</div>
             <div class="comment-list">
               <div class="comment-item">
                 <span><span>alice</span></span>
                 <span class="text-xsmall">2024.01.02</span>
                 <div class="ed margin-bottom-xxsmall margin-left-xsmall">@testuser1 thanks for this</div>
               </div>
             </div>
           </body></html>"#
    )
}

async fn mount_png(server: &MockServer, file_path: &str) {
    Mock::given(method("GET"))
        .and(path(file_path))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(png_bytes()))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_crawl_materializes_post_directory() {
    let server = MockServer::start().await;

    let rows = format!(
        "{}{}{}",
        pinned_row(),
        pinned_row(),
        post_row("101", "236491770", "A/B: Test?")
    );
    Mock::given(method("GET"))
        .and(path("/index.php"))
        .and(query_param("mid", "board"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(&rows)))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/236491770"))
        .respond_with(ResponseTemplate::new(200).set_body_string(post_page(
            "236491770",
            &["/files/zebra.png", "/files/apple.png", "/files/mango.png"],
        )))
        .mount(&server)
        .await;

    mount_png(&server, "/files/zebra.png").await;
    mount_png(&server, "/files/apple.png").await;
    mount_png(&server, "/files/mango.png").await;

    let root = TempDir::new().unwrap();
    let config = test_config(&format!("{}/index.php?mid=board", server.uri()), &root);
    let failures = Arc::new(MemoryFailureLog::new());

    let coordinator = Coordinator::new(config, failures.clone()).unwrap();
    let summary = coordinator.run().await.unwrap();

    assert_eq!(summary.pages_processed, 1);
    assert_eq!(summary.posts_processed, 1);
    assert_eq!(summary.posts_failed, 0);
    assert_eq!(summary.images_downloaded, 3);
    assert_eq!(summary.images_failed, 0);
    assert!(failures.entries().is_empty());

    // Sanitized directory name; punctuation deleted, not replaced
    let post_dir = root.path().join("AB Test");
    assert!(post_dir.is_dir());

    // Sequential 1-based image names in document order
    for name in ["1.png", "2.png", "3.png"] {
        assert!(post_dir.join(name).is_file(), "missing {name}");
    }

    let info: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(post_dir.join("info.json")).unwrap())
            .unwrap();

    // Title is preserved verbatim even though the directory is sanitized
    assert_eq!(info["title"], "A/B: Test?");
    assert_eq!(info["postnum"], "101");
    assert_eq!(info["poster"], "writer");
    assert_eq!(info["num_of_thumup"], "4");
    assert_eq!(info["views"], "77");
    assert_eq!(info["num_comments"], "1");
    assert_eq!(info["image"], "1");
    assert_eq!(info["url"], format!("{}/236491770", server.uri()));

    assert_eq!(info["post_content"][0], "Hello world");
    assert_eq!(info["post_content"][1], serde_json::Value::Null);

    let comment = &info["post_comment_lst"][0];
    assert_eq!(comment["commentor"], "alice");
    assert_eq!(comment["comment"], "thanks for this");
    assert_eq!(comment["reply_to"], "testuser1");
    assert_eq!(comment["dogdrip_con"], "");
}

#[tokio::test]
async fn test_post_failure_does_not_abort_siblings() {
    let server = MockServer::start().await;

    let rows = format!(
        "{}{}",
        post_row("1", "111", "good post"),
        post_row("2", "222", "broken post")
    );
    Mock::given(method("GET"))
        .and(path("/index.php"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(&rows)))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/111"))
        .respond_with(ResponseTemplate::new(200).set_body_string(post_page("111", &[])))
        .mount(&server)
        .await;

    // The broken post's page never loads
    Mock::given(method("GET"))
        .and(path("/222"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let root = TempDir::new().unwrap();
    let config = test_config(&format!("{}/index.php?mid=board", server.uri()), &root);
    let failures = Arc::new(MemoryFailureLog::new());

    let coordinator = Coordinator::new(config, failures.clone()).unwrap();
    let summary = coordinator.run().await.unwrap();

    assert_eq!(summary.posts_processed, 1);
    assert_eq!(summary.posts_failed, 1);

    let good = root.path().join("good post");
    assert!(good.join("info.json").is_file());

    // The broken post got a directory but no artifact
    let broken = root.path().join("broken post");
    assert!(broken.is_dir());
    assert!(!broken.join("info.json").exists());

    // The image pass and the metadata pass each logged the dead page
    let entries = failures.entries();
    assert!(entries
        .iter()
        .any(|(category, _)| *category == FailureCategory::WriteJson));
}

#[tokio::test]
async fn test_image_failure_keeps_metadata_and_siblings() {
    let server = MockServer::start().await;

    let rows = post_row("1", "333", "half images");
    Mock::given(method("GET"))
        .and(path("/index.php"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(&rows)))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/333"))
        .respond_with(ResponseTemplate::new(200).set_body_string(post_page(
            "333",
            &["/files/ok.png", "/files/gone.png"],
        )))
        .mount(&server)
        .await;

    mount_png(&server, "/files/ok.png").await;
    Mock::given(method("GET"))
        .and(path("/files/gone.png"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let root = TempDir::new().unwrap();
    let config = test_config(&format!("{}/index.php?mid=board", server.uri()), &root);
    let failures = Arc::new(MemoryFailureLog::new());

    let coordinator = Coordinator::new(config, failures.clone()).unwrap();
    let summary = coordinator.run().await.unwrap();

    // The post still counts as processed; only the image failed
    assert_eq!(summary.posts_processed, 1);
    assert_eq!(summary.posts_failed, 0);
    assert_eq!(summary.images_downloaded, 1);
    assert_eq!(summary.images_failed, 1);

    let dir = root.path().join("half images");
    assert!(dir.join("1.png").is_file());
    assert!(dir.join("info.json").is_file());

    let entries = failures.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].0, FailureCategory::Get);
    assert!(entries[0].1.ends_with("/files/gone.png"));
}

#[tokio::test]
async fn test_unrecognized_listing_url_aborts_before_fetching() {
    let root = TempDir::new().unwrap();
    let mut config = Config::default();
    config.board.listing_url = "https://example.test/a/b/c".to_string();
    config.output.download_root = root.path().to_path_buf();

    let coordinator = Coordinator::new(config, Arc::new(MemoryFailureLog::new())).unwrap();
    assert!(coordinator.run().await.is_err());
}

#[tokio::test]
async fn test_colliding_titles_across_one_run() {
    let server = MockServer::start().await;

    // Two posts whose titles sanitize to the same directory name
    let rows = format!(
        "{}{}",
        post_row("1", "444", "same.title"),
        post_row("2", "555", "same/title")
    );
    Mock::given(method("GET"))
        .and(path("/index.php"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(&rows)))
        .mount(&server)
        .await;

    for srl in ["444", "555"] {
        Mock::given(method("GET"))
            .and(path(format!("/{srl}")))
            .respond_with(ResponseTemplate::new(200).set_body_string(post_page(srl, &[])))
            .mount(&server)
            .await;
    }

    let root = TempDir::new().unwrap();
    let config = test_config(&format!("{}/index.php?mid=board", server.uri()), &root);

    let coordinator = Coordinator::new(config, Arc::new(MemoryFailureLog::new())).unwrap();
    let summary = coordinator.run().await.unwrap();

    assert_eq!(summary.posts_processed, 2);
    assert!(root.path().join("sametitle").join("info.json").is_file());
    assert!(root.path().join("sametitle-1").join("info.json").is_file());
}
