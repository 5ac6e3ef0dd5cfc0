//! CDP session integration tests
//!
//! Drive a real Chromium through the session traits. Requires Chrome or
//! Chromium to be installed.
//!
//! Run with:
//! ```bash
//! export EVALFILL_USE_REAL_CHROME=1
//! export EVALFILL_CHROME=/usr/bin/google-chrome  # or path to chrome
//! cargo test -p cdp-adapter --test integration_tests -- --nocapture
//! ```

use action_primitives::{activate, ActionError, ActivationMethod, BrowserSession, Query};
use cdp_adapter::{BrowserSettings, CdpSession};
use std::env;
use tempfile::TempDir;

fn should_run_real_tests() -> bool {
    env::var("EVALFILL_USE_REAL_CHROME")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

/// Headless settings with an isolated temporary profile directory.
fn test_settings() -> (BrowserSettings, TempDir) {
    let profile = tempfile::tempdir().expect("create temporary chrome profile");
    let settings = BrowserSettings {
        headless: true,
        user_data_dir: Some(profile.path().into()),
        extra_args: vec!["--no-sandbox".into()],
        close_on_exit: true,
        ..BrowserSettings::default()
    };
    (settings, profile)
}

const PAGE: &str = "data:text/html,\
<table id='sheetTable'><tbody>\
<tr><td>1</td><td>Computing</td><td>Algorithms - Dr. X</td>\
<td><a href='#' id='go' onclick='this.textContent=\"done\"'>review</a></td></tr>\
</tbody></table>\
<div style='position:relative'><button id='covered'>submit</button>\
<div style='position:absolute;top:0;left:0;width:200px;height:60px'></div></div>\
<input id='comment' value='x'>";

#[tokio::test]
async fn queries_and_element_operations() {
    if !should_run_real_tests() {
        println!("Skipping real browser test (EVALFILL_USE_REAL_CHROME not set)");
        return;
    }

    let (settings, _profile) = test_settings();
    let session = CdpSession::launch(&settings).await.expect("launch browser");
    session.navigate(PAGE).await.expect("load page");

    let rows = session
        .find_all(&Query::text_contains("tr", ["Algorithms", "Dr. X"]))
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);

    let cell = rows[0].find(&Query::xpath("./td[3]")).await.unwrap().unwrap();
    assert_eq!(cell.text().await.unwrap(), "Algorithms - Dr. X");

    let link = session.find(&Query::css("#go")).await.unwrap().unwrap();
    assert!(link.is_visible().await.unwrap());
    let report = activate(&link).await.unwrap();
    assert_eq!(report.method, ActivationMethod::Direct);
    assert_eq!(link.text().await.unwrap(), "done");

    let covered = session.find(&Query::css("#covered")).await.unwrap().unwrap();
    assert!(matches!(
        covered.click().await,
        Err(ActionError::NotInteractable(_))
    ));

    let comment = session.find(&Query::css("#comment")).await.unwrap().unwrap();
    comment.clear().await.unwrap();
    comment.set_text("none").await.unwrap();

    let invalid = session.find_all(&Query::xpath("//*[")).await;
    assert!(matches!(invalid, Err(ActionError::InvalidQuery(_))));

    session.close().await.expect("close browser");
}
