//! Detail fetcher runs over saved product pages.

mod common;

use std::sync::atomic::Ordering;

use catalog_harvest::automation::SnapshotPage;
use catalog_harvest::config::{Config, Pacing, SiteProfile};
use catalog_harvest::details::{DetailError, DetailEvent, DetailFetcher, RecordStage};
use catalog_harvest::models::{DetailItem, ListingItem};
use catalog_harvest::output::write_records;
use tokio::sync::mpsc;

use common::{product_html, FlakyPage};

const URL_1: &str = "https://www.michaelkors.com/tote/1.html";
const URL_2: &str = "https://www.michaelkors.com/clutch/2.html";
const URL_3: &str = "https://www.michaelkors.com/wallet/3.html";

fn product_pages() -> SnapshotPage {
    SnapshotPage::new()
        .with_page(URL_1, product_html("Tote", "$98.00", "Saffiano leather tote."))
        .with_page(URL_2, product_html("Clutch", "$150.00", "Evening clutch."))
        .with_page(URL_3, product_html("Wallet", "$78.00", "Zip-around wallet."))
}

fn listing(urls: &[&str]) -> Vec<ListingItem> {
    urls.iter()
        .enumerate()
        .map(|(i, url)| ListingItem {
            name: format!("Item {}", i + 1),
            price: String::new(),
            product_url: url.to_string(),
        })
        .collect()
}

fn handbags() -> SiteProfile {
    Config::default().site("handbags").unwrap()
}

#[tokio::test]
async fn extracts_every_field() {
    let site = handbags();
    let pacing = Pacing::instant();
    let page = product_pages();

    let record = DetailFetcher::new(&site, &pacing)
        .fetch_one(&page, 0, URL_1)
        .await
        .unwrap();

    assert_eq!(
        record,
        DetailItem {
            name: "Tote".to_string(),
            price: "$98.00".to_string(),
            image_url: "https://img.test/Tote.jpg".to_string(),
            description: "Saffiano leather tote.".to_string(),
            product_url: URL_1.to_string(),
        }
    );
}

#[tokio::test]
async fn navigation_timeout_drops_only_that_record() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("handbags.json");
    let output = dir.path().join("handbags_detailed.json");
    write_records(&input, &listing(&[URL_1, URL_2, URL_3]))
        .await
        .unwrap();

    let site = handbags();
    let pacing = Pacing::instant();
    let page = FlakyPage::new(product_pages(), URL_2);

    let summary = DetailFetcher::new(&site, &pacing)
        .run(&page, &input, &output)
        .await
        .unwrap();

    assert_eq!(page.navigations.load(Ordering::SeqCst), 3);
    assert_eq!(summary.failed.len(), 1);
    assert_eq!(summary.failed[0].index, 1);
    assert_eq!(summary.failed[0].error.stage, RecordStage::Navigated);
    assert!(summary.failed[0].error.source.is_timeout());

    let written: Vec<DetailItem> =
        serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    let names: Vec<&str> = written.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, ["Tote", "Wallet"]);
    assert_eq!(written[0].product_url, URL_1);
    assert_eq!(written[1].product_url, URL_3);
}

#[tokio::test]
async fn items_without_urls_are_skipped() {
    let site = handbags();
    let pacing = Pacing::instant();
    let page = product_pages();

    let mut items = listing(&[URL_1, "", URL_3]);
    items.push(ListingItem::default());

    let summary = DetailFetcher::new(&site, &pacing)
        .fetch_all(&page, &items)
        .await;

    assert_eq!(summary.skipped, vec![1, 3]);
    assert_eq!(summary.records.len(), 2);
    assert!(summary.records.len() <= items.len());
    assert!(summary.failed.is_empty());
}

#[tokio::test]
async fn missing_price_fails_the_record() {
    let site = handbags();
    let pacing = Pacing::instant();
    let url = "https://www.michaelkors.com/sold-out/9.html";
    let page = SnapshotPage::new().with_page(
        url,
        r#"<html><body><h1 class="product-name overflow-hidden">Sold Out Bag</h1></body></html>"#,
    );

    let err = DetailFetcher::new(&site, &pacing)
        .fetch_one(&page, 0, url)
        .await
        .unwrap_err();
    assert_eq!(err.stage, RecordStage::DetailsExtracted);
}

#[tokio::test]
async fn missing_name_fails_only_that_record() {
    let site = handbags();
    let pacing = Pacing::instant();
    let page = product_pages().with_page(
        URL_2,
        r#"<html><body><span class="value">$150.00</span><p>Page moved</p></body></html>"#,
    );

    let summary = DetailFetcher::new(&site, &pacing)
        .fetch_all(&page, &listing(&[URL_1, URL_2, URL_3]))
        .await;

    assert_eq!(summary.failed.len(), 1);
    assert_eq!(summary.failed[0].index, 1);
    assert_eq!(summary.failed[0].error.stage, RecordStage::DetailsExtracted);
    assert!(summary.failed[0].error.source.is_timeout());

    let names: Vec<&str> = summary.records.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, ["Tote", "Wallet"]);
}

#[tokio::test]
async fn optional_fields_default_to_empty() {
    let site = handbags();
    let pacing = Pacing::instant();
    let url = "https://www.michaelkors.com/plain/7.html";
    let page = SnapshotPage::new().with_page(
        url,
        r#"<html><body>
            <h1 class="product-name overflow-hidden">Plain Bag</h1>
            <span class="value">$10.00</span>
        </body></html>"#,
    );

    let record = DetailFetcher::new(&site, &pacing)
        .fetch_one(&page, 0, url)
        .await
        .unwrap();
    assert_eq!(record.image_url, "");
    assert_eq!(record.description, "");
    assert_eq!(record.price, "$10.00");
}

#[tokio::test]
async fn unavailable_screenshots_do_not_drop_records() {
    let dir = tempfile::tempdir().unwrap();
    let site = handbags();
    let pacing = Pacing::instant();
    let page = product_pages();

    let summary = DetailFetcher::new(&site, &pacing)
        .with_screenshots(dir.path().join("screenshots"))
        .fetch_all(&page, &listing(&[URL_1, URL_2]))
        .await;

    assert_eq!(summary.records.len(), 2);
}

#[tokio::test]
async fn unreadable_input_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let site = handbags();
    let pacing = Pacing::instant();
    let output = dir.path().join("out.json");

    let err = DetailFetcher::new(&site, &pacing)
        .run(
            &product_pages(),
            &dir.path().join("missing.json"),
            &output,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, DetailError::Input(_)));
    assert!(!output.exists());
}

#[tokio::test]
async fn progress_events_follow_the_run() {
    let site = handbags();
    let pacing = Pacing::instant();
    let page = FlakyPage::new(product_pages(), URL_2);
    let (tx, mut rx) = mpsc::channel(32);

    let fetcher = DetailFetcher::new(&site, &pacing).with_events(tx);
    fetcher
        .fetch_all(&page, &listing(&[URL_1, "", URL_2]))
        .await;
    drop(fetcher);

    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }

    assert!(matches!(events[0], DetailEvent::Loaded { total: 3 }));
    assert!(matches!(events[1], DetailEvent::Started { index: 0, .. }));
    assert!(matches!(events[2], DetailEvent::Saved { index: 0, .. }));
    assert!(matches!(events[3], DetailEvent::Skipped { index: 1 }));
    assert!(matches!(events[4], DetailEvent::Started { index: 2, .. }));
    assert!(matches!(events[5], DetailEvent::Failed { index: 2, .. }));
    assert!(matches!(
        events[6],
        DetailEvent::Finished {
            saved: 1,
            skipped: 1,
            failed: 1
        }
    ));
    assert_eq!(events.len(), 7);
}

#[tokio::test]
async fn csv_output_is_supported() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("handbags.json");
    let output = dir.path().join("handbags_detailed.csv");
    write_records(&input, &listing(&[URL_3])).await.unwrap();

    let site = handbags();
    let pacing = Pacing::instant();
    DetailFetcher::new(&site, &pacing)
        .run(&product_pages(), &input, &output)
        .await
        .unwrap();

    let text = std::fs::read_to_string(&output).unwrap();
    let mut lines = text.lines();
    assert_eq!(
        lines.next(),
        Some("name,price,image_url,description,product_url")
    );
    assert_eq!(
        lines.next(),
        Some("Wallet,$78.00,https://img.test/Wallet.jpg,Zip-around wallet.,https://www.michaelkors.com/wallet/3.html")
    );
}
