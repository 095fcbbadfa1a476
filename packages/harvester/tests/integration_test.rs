//! End-to-end harvesting tests against a mock OAI-PMH repository.
//!
//! The harvester uses a blocking HTTP client, so each scenario runs inside
//! `spawn_blocking` while wiremock serves canned fixture pages.

use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

use pretty_assertions::assert_eq;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crosswalk_core::mapping::{transforms, Class, Mapping, ValueSource};
use crosswalk_core::parser::Parser;
use crosswalk_core::value::Navigate;
use crosswalk_harvester::{
    Harvester, HarvesterError, HttpOaiClient, ListOptions, OaiHarvester, SourceType,
};

/// Load fixture file content.
fn load_fixture(name: &str) -> String {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("Failed to load {}: {}", path.display(), e))
}

fn xml_response(fixture: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(load_fixture(fixture), "text/xml; charset=utf-8")
}

fn harvester(endpoint: &str, options: ListOptions) -> OaiHarvester<HttpOaiClient> {
    OaiHarvester::new(HttpOaiClient::new(endpoint).unwrap(), options).unwrap()
}

/// Mount the two-page `ListRecords` listing.
async fn mount_records(server: &MockServer, second_page_hits: u64) {
    Mock::given(method("GET"))
        .and(path("/oai"))
        .and(query_param("verb", "ListRecords"))
        .and(query_param("metadataPrefix", "oai_dc"))
        .respond_with(xml_response("list_records_page1.xml"))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/oai"))
        .and(query_param("verb", "ListRecords"))
        .and(query_param("resumptionToken", "page2"))
        .respond_with(xml_response("list_records_page2.xml"))
        .expect(second_page_hits)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_records_follow_resumption_token() {
    let server = MockServer::start().await;
    mount_records(&server, 1).await;
    let endpoint = format!("{}/oai", server.uri());

    let names = tokio::task::spawn_blocking(move || {
        harvester(&endpoint, ListOptions::new("oai_dc"))
            .records()
            .map(|record| record.map(|r| r.local_name().unwrap_or_default().to_string()))
            .collect::<Result<Vec<_>, _>>()
    })
    .await
    .unwrap()
    .unwrap();

    assert_eq!(
        names,
        vec![
            "oai:archive.example.org:1",
            "oai:archive.example.org:2",
            "oai:archive.example.org:4",
        ]
    );
}

#[tokio::test]
async fn test_taking_first_page_only_fetches_one_page() {
    let server = MockServer::start().await;
    mount_records(&server, 0).await;
    let endpoint = format!("{}/oai", server.uri());

    let taken = tokio::task::spawn_blocking(move || {
        harvester(&endpoint, ListOptions::new("oai_dc"))
            .records()
            .take(2)
            .count()
    })
    .await
    .unwrap();

    assert_eq!(taken, 2);
}

#[tokio::test]
async fn test_identifiers_across_pages() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("verb", "ListIdentifiers"))
        .and(query_param("metadataPrefix", "oai_dc"))
        .and(query_param("set", "novels"))
        .respond_with(xml_response("list_identifiers_page1.xml"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("verb", "ListIdentifiers"))
        .and(query_param("resumptionToken", "ids-page2"))
        .respond_with(xml_response("list_identifiers_page2.xml"))
        .expect(1)
        .mount(&server)
        .await;
    let endpoint = format!("{}/oai", server.uri());

    let ids = tokio::task::spawn_blocking(move || {
        harvester(&endpoint, ListOptions::new("oai_dc").with_set("novels"))
            .record_ids()
            .collect::<Result<Vec<_>, _>>()
    })
    .await
    .unwrap()
    .unwrap();

    assert_eq!(ids.len(), 4);
    assert_eq!(ids[2], "oai:archive.example.org:3");
}

#[tokio::test]
async fn test_get_record() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("verb", "GetRecord"))
        .and(query_param("identifier", "oai:archive.example.org:2"))
        .respond_with(xml_response("get_record.xml"))
        .expect(1)
        .mount(&server)
        .await;
    let endpoint = format!("{}/oai", server.uri());

    let record = tokio::task::spawn_blocking(move || {
        harvester(&endpoint, ListOptions::new("oai_dc")).get_record("oai:archive.example.org:2")
    })
    .await
    .unwrap()
    .unwrap();

    assert_eq!(record.local_name(), Some("oai:archive.example.org:2"));
    let parser = Parser::parse(&record, &SourceType::OaiDc.parser_config()).unwrap();
    assert_eq!(parser.root().name(), "oai_dc:dc");
}

#[tokio::test]
async fn test_no_records_match_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("verb", "ListRecords"))
        .respond_with(xml_response("no_records_match.xml"))
        .expect(1)
        .mount(&server)
        .await;
    let endpoint = format!("{}/oai", server.uri());

    let count = tokio::task::spawn_blocking(move || {
        harvester(&endpoint, ListOptions::new("oai_dc").with_set("empty"))
            .records()
            .count()
    })
    .await
    .unwrap();

    assert_eq!(count, 0);
}

#[tokio::test]
async fn test_protocol_error_surfaces() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(xml_response("bad_argument.xml"))
        .mount(&server)
        .await;
    let endpoint = format!("{}/oai", server.uri());

    let results = tokio::task::spawn_blocking(move || {
        harvester(&endpoint, ListOptions::new("mods"))
            .record_ids()
            .collect::<Vec<_>>()
    })
    .await
    .unwrap();

    assert_eq!(results.len(), 1);
    match &results[0] {
        Err(HarvesterError::OaiProtocol { code, .. }) => {
            assert_eq!(code, "cannotDisseminateFormat");
        }
        other => panic!("expected protocol error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_server_errors_exhaust_retries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;
    let endpoint = format!("{}/oai", server.uri());

    let err = tokio::task::spawn_blocking(move || {
        harvester(&endpoint, ListOptions::new("oai_dc"))
            .get_record("oai:archive.example.org:1")
            .unwrap_err()
    })
    .await
    .unwrap();

    assert!(matches!(
        err,
        HarvesterError::RetriesExhausted { attempts: 3, .. }
    ));
}

#[tokio::test]
async fn test_service_unavailable_waits_for_retry_after() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("verb", "GetRecord"))
        .respond_with(ResponseTemplate::new(503).insert_header("Retry-After", "1"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("verb", "GetRecord"))
        .respond_with(xml_response("get_record.xml"))
        .expect(1)
        .mount(&server)
        .await;
    let endpoint = format!("{}/oai", server.uri());

    let (record, elapsed) = tokio::task::spawn_blocking(move || {
        let started = Instant::now();
        let record = harvester(&endpoint, ListOptions::new("oai_dc"))
            .get_record("oai:archive.example.org:2");
        (record, started.elapsed())
    })
    .await
    .unwrap();

    assert_eq!(
        record.unwrap().local_name(),
        Some("oai:archive.example.org:2")
    );
    assert!(
        elapsed >= Duration::from_secs(1),
        "retried after {elapsed:?}, before the requested delay"
    );
}

#[tokio::test]
async fn test_non_xml_response_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw("<html>Maintenance</html>", "text/html"),
        )
        .expect(1)
        .mount(&server)
        .await;
    let endpoint = format!("{}/oai", server.uri());

    let err = tokio::task::spawn_blocking(move || {
        harvester(&endpoint, ListOptions::new("oai_dc"))
            .get_record("oai:archive.example.org:1")
            .unwrap_err()
    })
    .await
    .unwrap();

    match err {
        HarvesterError::ContentType { content_type, .. } => assert_eq!(content_type, "text/html"),
        other => panic!("expected content type error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_harvested_records_map_to_aggregations() {
    let server = MockServer::start().await;
    mount_records(&server, 1).await;
    let endpoint = format!("{}/oai", server.uri());

    let dates = tokio::task::spawn_blocking(move || {
        let config = SourceType::OaiDc.parser_config();
        harvester(&endpoint, ListOptions::new("oai_dc"))
            .records()
            .map(|record| {
                let parser = Parser::parse(&record.unwrap(), &config).unwrap();

                let mut mapping = Mapping::new(Class::Aggregation);
                mapping.uri(ValueSource::header_field(["oai:identifier"]))
                    .child("sourceResource", Class::SourceResource, |source| {
                        source.property_with(
                            "date",
                            ValueSource::field(["dc:date"]),
                            transforms::edtf_date,
                        );
                    });
                let aggregation = mapping.process_record(&parser).unwrap();
                let source = aggregation.children("sourceResource")[0];
                (
                    aggregation.subject().unwrap_or_default().to_string(),
                    source.dates("date")[0].to_string(),
                )
            })
            .collect::<Vec<_>>()
    })
    .await
    .unwrap();

    assert_eq!(
        dates,
        vec![
            ("oai:archive.example.org:1".to_string(), "1946~".to_string()),
            ("oai:archive.example.org:2".to_string(), "1948".to_string()),
            ("oai:archive.example.org:4".to_string(), "1952/1953".to_string()),
        ]
    );
}
