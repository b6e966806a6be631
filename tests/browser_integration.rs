use std::sync::{Arc, Mutex};
use std::time::Duration;
use threads_scraper::extract::extract_hidden_data;
use threads_scraper::{BrowserDriver, BrowserSession, LaunchOptions};

fn data_url(html: &str) -> String {
    format!("data:text/html,{}", urlencoding::encode(html))
}

fn launch() -> BrowserSession {
    BrowserSession::launch(&LaunchOptions::new().headless(true)).expect("Failed to launch browser")
}

#[test]
#[ignore] // Requires Chrome to be installed
fn test_hidden_data_from_rendered_page() {
    let session = launch();

    let html = r#"<html><body>
        <div data-pressable-container="true">post</div>
        <script type="application/json" data-sjs>
            {"require":[["ScheduledServerJS",{"thread_items":[{"post":{"id":"1"}}]}]]}
        </script>
    </body></html>"#;

    session.navigate(&data_url(html), Duration::from_secs(10)).expect("Failed to navigate");
    session
        .wait_for_visible("[data-pressable-container=true]", Duration::from_secs(5))
        .expect("Content never became visible");

    let content = session.html().expect("Failed to read HTML");
    let datasets = extract_hidden_data(&content);
    assert_eq!(datasets.len(), 1);

    session.close().expect("Failed to close session");
}

#[test]
#[ignore]
fn test_wait_for_hidden_element_times_out() {
    let session = launch();

    let html = r#"<html><body><div data-pressable-container="true" style="display:none">x</div></body></html>"#;
    session.navigate(&data_url(html), Duration::from_secs(10)).expect("Failed to navigate");

    let err = session
        .wait_for_visible("[data-pressable-container=true]", Duration::from_millis(500))
        .unwrap_err();
    assert!(err.is_timeout());
}

#[test]
#[ignore]
fn test_scroll_and_evaluate() {
    let session = launch();

    let html = r#"<html><body><div style="height:5000px">tall</div></body></html>"#;
    session.navigate(&data_url(html), Duration::from_secs(10)).expect("Failed to navigate");

    session.scroll_to_bottom().expect("Failed to scroll");
    let offset = session.evaluate("window.scrollY").expect("Failed to evaluate");
    assert!(offset.as_f64().unwrap_or(0.0) > 0.0);
}

#[test]
#[ignore]
fn test_passthrough_routing_keeps_pages_loading() {
    let session = launch();

    session.install_passthrough_routing().expect("Failed to install routing");
    session
        .navigate(&data_url("<html><body><p>still loads</p></body></html>"), Duration::from_secs(10))
        .expect("Failed to navigate");

    assert!(session.html().expect("Failed to read HTML").contains("still loads"));
}

#[test]
#[ignore]
fn test_response_bodies_are_captured() {
    let session = launch();
    let captured = Arc::new(Mutex::new(Vec::new()));
    let sink = captured.clone();

    session
        .on_response(
            Box::new(|url, status| url.starts_with("data:") && status == 200),
            Box::new(move |response| sink.lock().unwrap().push(response.body)),
        )
        .expect("Failed to register response handler");
    session
        .navigate(&data_url("<html><body><p>captured body</p></body></html>"), Duration::from_secs(10))
        .expect("Failed to navigate");
    session.wait(Duration::from_millis(500));

    let bodies = captured.lock().unwrap();
    assert!(bodies.iter().any(|body| body.contains("captured body")));
}
