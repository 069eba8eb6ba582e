mod common;

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use common::simple_pdf;
use ingest_core::{BatchResult, ContentEntry, ContentKind, Locator, SourceKind};
use ingest_engine::{
    scan_directory, FetchSettings, IngestConfig, Pipeline, ReqwestFetcher, RobotsSettings,
    REASON_NO_RESTRICTIONS,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_config(output: &Path, workers: usize) -> IngestConfig {
    IngestConfig {
        workers,
        fetch: FetchSettings::without_delay(),
        robots: RobotsSettings {
            scheme: "http".to_string(),
            timeout: Duration::from_secs(2),
            ..RobotsSettings::default()
        },
        ..IngestConfig::default_with_output(output)
    }
}

async fn mount(server: &MockServer, route: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(response)
        .mount(server)
        .await;
}

fn read_artifact(path: &Path) -> Vec<BatchResult> {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

const PRICING: &str = r#"<html><head><title>Pricing</title></head><body>
<p> Starter is free. </p><p>Team is paid.</p>
<a href="/signup">Sign up</a><a href="mailto:sales@example.com">Sales</a>
</body></html>"#;

#[tokio::test]
async fn html_entry_is_extracted_and_persisted() {
    engine_logging::initialize_for_tests();
    let server = MockServer::start().await;
    mount(
        &server,
        "/pricing.html",
        ResponseTemplate::new(200).set_body_raw(PRICING, "text/html"),
    )
    .await;
    let output = TempDir::new().unwrap();
    let pipeline = Pipeline::new(test_config(output.path(), 1));
    let url = format!("{}/pricing.html", server.uri());

    let report = pipeline
        .run(vec![ContentEntry::remote("Pricing", url.clone())])
        .await
        .unwrap();

    assert_eq!(report.summary.remote.successful, 1);
    assert_eq!(report.summary.success_rate(), 100.0);
    assert_eq!(report.artifact_path, output.path().join("scraped_results.json"));

    let results = read_artifact(&report.artifact_path);
    assert_eq!(results.len(), 1);
    let result = &results[0];
    assert_eq!(result.content_name, "Pricing");
    assert_eq!(result.locator, Locator::Url(url.clone()));
    assert_eq!(result.source, SourceKind::Url);
    assert_eq!(result.content.kind, ContentKind::Html);
    assert_eq!(result.content.text, "Starter is free. Team is paid.");
    assert_eq!(
        result.content.links,
        vec!["/signup", "mailto:sales@example.com"]
    );
    assert_eq!(result.content.robots_status, REASON_NO_RESTRICTIONS);
    assert_eq!(result.content.final_url, url);
    assert!(Path::new(result.content.saved_filepath.as_ref().unwrap()).exists());
}

#[tokio::test]
async fn presentation_without_pdf_sibling_fails_the_entry() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/deck.ppt",
        ResponseTemplate::new(200).set_body_raw(&b"\xD0\xCF\x11\xE0deck"[..], "application/vnd.ms-powerpoint"),
    )
    .await;
    mount(&server, "/deck.pdf", ResponseTemplate::new(404)).await;
    let output = TempDir::new().unwrap();
    let pipeline = Pipeline::new(test_config(output.path(), 1));

    let report = pipeline
        .run(vec![ContentEntry::remote(
            "Deck",
            format!("{}/deck.ppt", server.uri()),
        )])
        .await
        .unwrap();

    assert_eq!(report.summary.remote.total, 1);
    assert_eq!(report.summary.remote.failed, 1);
    assert_eq!(report.summary.success_rate(), 0.0);
    assert!(read_artifact(&report.artifact_path).is_empty());
}

#[tokio::test]
async fn presentation_uses_pdf_sibling_when_present() {
    let server = MockServer::start().await;
    mount(&server, "/q1.pptx", ResponseTemplate::new(200).set_body_string("pptx")).await;
    mount(
        &server,
        "/q1.pdf",
        ResponseTemplate::new(200).set_body_raw(simple_pdf("Quarter one"), "application/pdf"),
    )
    .await;
    let output = TempDir::new().unwrap();
    let pipeline = Pipeline::new(test_config(output.path(), 1));

    let report = pipeline
        .run(vec![ContentEntry::remote("Q1", format!("{}/q1.pptx", server.uri()))])
        .await
        .unwrap();

    let record = &report.results[0].content;
    assert_eq!(record.kind, ContentKind::Pdf);
    assert!(record.text.contains("Quarter one"));
    assert_eq!(record.final_url, format!("{}/q1.pdf", server.uri()));
}

#[tokio::test]
async fn unknown_binary_body_falls_back_to_pdf_suffix() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/brochure",
        ResponseTemplate::new(200).set_body_raw(simple_pdf("ignored"), "application/octet-stream"),
    )
    .await;
    mount(
        &server,
        "/brochure.pdf",
        ResponseTemplate::new(200).set_body_raw(simple_pdf("Brochure"), "application/pdf"),
    )
    .await;
    let output = TempDir::new().unwrap();
    let pipeline = Pipeline::new(test_config(output.path(), 1));

    let report = pipeline
        .run(vec![ContentEntry::remote(
            "Brochure",
            format!("{}/brochure", server.uri()),
        )])
        .await
        .unwrap();

    assert_eq!(report.summary.remote.successful, 1);
    let record = &report.results[0].content;
    assert_eq!(record.kind, ContentKind::Pdf);
    assert_eq!(record.title, "brochure.pdf");
    assert!(record.text.contains("Brochure"));
    assert_eq!(record.final_url, format!("{}/brochure.pdf", server.uri()));
}

#[tokio::test]
async fn unknown_text_body_is_parsed_as_html() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/about",
        ResponseTemplate::new(200)
            .insert_header("Last-Modified", "Tue, 05 Mar 2024 14:07:09 GMT")
            .set_body_raw("<p>About us</p>", "text/plain"),
    )
    .await;
    let output = TempDir::new().unwrap();
    let pipeline = Pipeline::new(test_config(output.path(), 1));

    let report = pipeline
        .run(vec![ContentEntry::remote("About", format!("{}/about", server.uri()))])
        .await
        .unwrap();

    let record = &report.results[0].content;
    assert_eq!(record.kind, ContentKind::Html);
    assert_eq!(record.text, "About us");
    assert_eq!(record.last_modified.as_deref(), Some("2024-03-05 14:07:09"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn html_pages_parse_off_the_async_workers() {
    let server = MockServer::start().await;
    for i in 0..4 {
        let body = format!("<title>Page {i}</title><p>Caf\u{e9} {i}</p>").into_bytes();
        mount(
            &server,
            &format!("/menu{i}.html"),
            ResponseTemplate::new(200).set_body_raw(body, "text/html"),
        )
        .await;
    }
    mount(
        &server,
        "/latin1.html",
        ResponseTemplate::new(200).set_body_raw(
            b"<title>Caf\xE9</title><p>menu</p>".to_vec(),
            "text/html; charset=utf-8",
        ),
    )
    .await;
    let output = TempDir::new().unwrap();
    let pipeline = Pipeline::new(test_config(output.path(), 3));

    let mut entries: Vec<ContentEntry> = (0..4)
        .map(|i| ContentEntry::remote(format!("Menu{i}"), format!("{}/menu{i}.html", server.uri())))
        .collect();
    entries.push(ContentEntry::remote("Latin", format!("{}/latin1.html", server.uri())));
    let report = pipeline.run(entries).await.unwrap();

    assert_eq!(report.summary.remote.successful, 5);
    let titles: Vec<&str> = report.results.iter().map(|r| r.content.title.as_str()).collect();
    assert_eq!(
        titles,
        vec!["Page 0", "Page 1", "Page 2", "Page 3", "Caf\u{FFFD}"]
    );
    assert_eq!(fs::read_dir(output.path().join("html")).unwrap().count(), 5);
}

#[tokio::test]
async fn disallowed_and_failing_entries_do_not_stop_the_batch() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/robots.txt",
        ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /private/\n"),
    )
    .await;
    mount(
        &server,
        "/ok.html",
        ResponseTemplate::new(200).set_body_raw("<title>Ok</title><p>ok</p>", "text/html"),
    )
    .await;
    mount(&server, "/gone.html", ResponseTemplate::new(500)).await;
    let output = TempDir::new().unwrap();
    let pipeline = Pipeline::new(test_config(output.path(), 3));

    let report = pipeline
        .run(vec![
            ContentEntry::remote("Secret", format!("{}/private/a.html", server.uri())),
            ContentEntry::remote("Gone", format!("{}/gone.html", server.uri())),
            ContentEntry::remote("Ok", format!("{}/ok.html", server.uri())),
        ])
        .await
        .unwrap();

    assert_eq!(report.summary.remote.total, 3);
    assert_eq!(report.summary.remote.successful, 1);
    assert_eq!(report.summary.remote.failed, 2);
    let results = read_artifact(&report.artifact_path);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].content_name, "Ok");
    assert_eq!(results[0].content.robots_status, "Allowed by robots.txt");
}

#[tokio::test]
async fn worker_pool_keeps_input_order() {
    let server = MockServer::start().await;
    for i in 0..6 {
        mount(
            &server,
            &format!("/p{i}.html"),
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(60 - i * 10))
                .set_body_raw(format!("<title>P{i}</title>"), "text/html"),
        )
        .await;
    }
    let output = TempDir::new().unwrap();
    let pipeline = Pipeline::new(test_config(output.path(), 4));
    let entries = (0..6)
        .map(|i| ContentEntry::remote(format!("P{i}"), format!("{}/p{i}.html", server.uri())))
        .collect();

    let report = pipeline.run(entries).await.unwrap();

    let titles: Vec<&str> = report
        .results
        .iter()
        .map(|r| r.content.title.as_str())
        .collect();
    assert_eq!(titles, vec!["P0", "P1", "P2", "P3", "P4", "P5"]);
}

#[tokio::test]
async fn remote_entries_precede_local_ones() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/page.html",
        ResponseTemplate::new(200).set_body_raw("<title>Remote</title>", "text/html"),
    )
    .await;
    let input = TempDir::new().unwrap();
    fs::write(input.path().join("notes.txt"), "local notes").unwrap();
    let output = TempDir::new().unwrap();
    let pipeline = Pipeline::new(test_config(output.path(), 2));

    let mut entries = scan_directory(input.path());
    entries.push(ContentEntry::remote("Remote", format!("{}/page.html", server.uri())));
    let report = pipeline.run(entries).await.unwrap();

    let sources: Vec<SourceKind> = report.results.iter().map(|r| r.source).collect();
    assert_eq!(sources, vec![SourceKind::Url, SourceKind::LocalFile]);
    assert_eq!(report.summary.local.successful, 1);
    assert_eq!(report.summary.remote.successful, 1);
    assert!(matches!(&report.results[1].locator, Locator::FilePath(p) if p.ends_with("notes.txt")));
}

#[tokio::test]
async fn rerunning_unchanged_inputs_rewrites_the_same_artifact() {
    let input = TempDir::new().unwrap();
    fs::write(input.path().join("a.txt"), "alpha").unwrap();
    fs::write(input.path().join("b.docx"), "beta").unwrap();
    let output = TempDir::new().unwrap();
    let fetcher = Arc::new(ReqwestFetcher::new(FetchSettings::without_delay()));
    let pipeline = Pipeline::with_fetcher(test_config(output.path(), 1), fetcher);

    let first = pipeline.run(scan_directory(input.path())).await.unwrap();
    let first_bytes = fs::read(&first.artifact_path).unwrap();
    let second = pipeline.run(scan_directory(input.path())).await.unwrap();
    let second_bytes = fs::read(&second.artifact_path).unwrap();

    assert_eq!(first.summary, second.summary);
    assert_eq!(first_bytes, second_bytes);
}

#[tokio::test]
async fn empty_run_still_writes_artifact() {
    let output = TempDir::new().unwrap();
    let pipeline = Pipeline::new(test_config(output.path(), 1));

    let report = pipeline.run(Vec::new()).await.unwrap();

    assert_eq!(report.summary.total(), 0);
    assert_eq!(report.summary.success_rate(), 0.0);
    assert_eq!(fs::read_to_string(report.artifact_path).unwrap(), "[]\n");
    assert!(output.path().join("html").is_dir());
    assert!(output.path().join("pdf").is_dir());
}
