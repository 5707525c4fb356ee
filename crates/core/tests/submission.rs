//! Fetching, link resolution, and the submission loop against a local stub.

#![cfg(feature = "fetch")]

mod common;

use formfill_core::fetch::{self, FetchConfig};
use formfill_core::fields::{FieldDescriptor, FieldKind};
use formfill_core::link;
use formfill_core::submit::{run_batch, submit_once, RunReport};
use formfill_core::synth::{AnswerMode, Synthesizer};
use formfill_core::Error;
use pretty_assertions::assert_eq;

fn client() -> fetch::Client {
    fetch::build_client(&FetchConfig::default()).expect("client")
}

fn sample_fields() -> Vec<FieldDescriptor> {
    vec![
        FieldDescriptor {
            name: "entry.1".to_string(),
            kind: FieldKind::Text,
            question: None,
        },
        FieldDescriptor {
            name: "entry.2".to_string(),
            kind: FieldKind::SingleChoice {
                options: vec!["A".to_string(), "B".to_string()],
            },
            question: None,
        },
        FieldDescriptor {
            name: "entry.3".to_string(),
            kind: FieldKind::Fixed {
                preset: Some("v".to_string()),
            },
            question: None,
        },
    ]
}

#[test]
fn a_batch_against_an_ok_server_succeeds_every_round() {
    let server = common::spawn(200, "ok".to_string());
    let client = client();
    let fields = sample_fields();
    let synth = Synthesizer::new(AnswerMode::Random);
    let submit_url = format!("http://{}/formResponse", server.addr);

    let mut rounds_seen = 0;
    let report = run_batch(&client, &submit_url, &fields, &synth, 3, &mut |status| {
        rounds_seen += 1;
        assert_eq!(status.round, rounds_seen);
        assert_eq!(status.total, 3);
        assert!(status.result.ok);
        assert_eq!(status.result.status, Some(200));
    });

    assert_eq!(
        report,
        RunReport {
            attempted: 3,
            succeeded: 3
        }
    );
    assert_eq!(server.hits(), 3);

    // Every POST covers every detected field.
    let bodies = server.bodies();
    assert_eq!(bodies.len(), 3);
    for body in &bodies {
        assert!(body.contains("entry.1="));
        assert!(body.contains("entry.2="));
        assert!(body.contains("entry.3=v"));
    }
}

#[test]
fn failed_rounds_are_counted_but_never_abort_the_batch() {
    let server = common::spawn(400, "x".repeat(600));
    let client = client();
    let fields = sample_fields();
    let synth = Synthesizer::new(AnswerMode::Random);
    let submit_url = format!("http://{}/formResponse", server.addr);

    let report = run_batch(&client, &submit_url, &fields, &synth, 3, &mut |status| {
        assert!(!status.result.ok);
        assert_eq!(status.result.status, Some(400));
        // Diagnostic body is kept, truncated.
        assert_eq!(status.result.detail.as_ref().map(String::len), Some(500));
    });

    assert_eq!(
        report,
        RunReport {
            attempted: 3,
            succeeded: 0
        }
    );
    assert_eq!(server.hits(), 3);
}

#[test]
fn a_transport_failure_is_a_failed_round_not_a_panic() {
    let unused_port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let client = client();

    let result = submit_once(
        &client,
        &format!("http://127.0.0.1:{}/formResponse", unused_port),
        &[("entry.1".to_string(), "x".to_string())],
    );

    assert!(!result.ok);
    assert_eq!(result.status, None);
    assert!(result.detail.is_some());
}

#[test]
fn fetch_html_returns_the_body() {
    let server = common::spawn(200, "<html><body>hello</body></html>".to_string());
    let html = fetch::fetch_html(&client(), &format!("http://{}/page", server.addr)).unwrap();

    assert!(html.contains("hello"));
}

#[test]
fn fetch_html_surfaces_http_errors() {
    let server = common::spawn(500, "boom".to_string());
    let err = fetch::fetch_html(&client(), &format!("http://{}/page", server.addr)).unwrap_err();

    assert!(matches!(err, Error::Http(500)));
}

#[test]
fn fetch_html_rejects_unparseable_urls() {
    let err = fetch::fetch_html(&client(), "not a url").unwrap_err();

    assert!(matches!(err, Error::InvalidUrl(_)));
}

#[test]
fn short_links_resolve_through_their_redirect() {
    let server = common::spawn_with(|path| {
        if path.starts_with("/forms.gle") {
            (
                302,
                vec![("Location".to_string(), "/d/e/abc123/edit".to_string())],
                String::new(),
            )
        } else {
            (200, Vec::new(), "ok".to_string())
        }
    });
    let client = client();

    let link = link::resolve(&client, &format!("http://{}/forms.gle/xyz", server.addr)).unwrap();

    assert!(link.view_url.ends_with("/d/e/abc123/viewform"));
    assert!(link.submit_url.ends_with("/d/e/abc123/formResponse"));
    assert_eq!(server.hits(), 2);
}

#[test]
fn unrecognized_links_fail_before_any_network_call() {
    let server = common::spawn(200, "ok".to_string());
    let client = client();

    let err = link::resolve(&client, &format!("http://{}/just-a-page", server.addr)).unwrap_err();

    assert!(matches!(err, Error::InvalidUrl(_)));
    assert_eq!(server.hits(), 0);
}

const FORM_HTML: &str = r#"
<html><body><form action="/formResponse">
    <div>
        <div>Your name</div>
        <input type="text" name="entry.1" />
    </div>
    <div>
        <div>Pick one</div>
        <input type="radio" name="entry.2" value="A" />
        <input type="radio" name="entry.2" value="B" />
    </div>
    <input type="hidden" name="entry.3_sentinel" value="decoy" />
</form></body></html>
"#;

#[test]
fn inspect_detects_fields_end_to_end() {
    let server = common::spawn_with(|path| {
        if path.contains("viewform") {
            (200, Vec::new(), FORM_HTML.to_string())
        } else {
            (404, Vec::new(), String::new())
        }
    });
    let client = client();
    let url = format!(
        "http://{}/docs.google.com/forms/d/e/abc/viewform",
        server.addr
    );

    let inspection = formfill_core::inspect(&client, &url).unwrap();

    assert_eq!(inspection.fields.len(), 2);
    assert_eq!(inspection.fields[0].name, "entry.1");
    assert_eq!(inspection.fields[0].question.as_deref(), Some("Your name"));
    assert_eq!(inspection.fields[1].name, "entry.2");
    assert!(inspection.link.submit_url.contains("formResponse"));
    assert!(!inspection.html_snippet.is_empty());
}
