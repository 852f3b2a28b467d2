/*!
 * Tests for the DSBmobile protocol helpers
 */

use dsb_bot::errors::DsbError;
use dsb_bot::dsb_client::{decode_payload, encode_payload, extract_plan_links, MenuResponse};
use serde_json::json;

fn menu(value: serde_json::Value) -> MenuResponse {
    serde_json::from_value(value).unwrap()
}

fn plan_entry(title: &str, date: &str, detail: &str) -> serde_json::Value {
    json!({ "Title": title, "Date": date, "Childs": [{ "Detail": detail }] })
}

/// Test that plan links come from Inhalte > Pläne > Root
#[test]
fn test_extractPlanLinks_shouldFollowMenuTree() {
    let response = menu(json!({
        "Resultcode": 0,
        "ResultStatusInfo": "",
        "ResultMenuItems": [
            { "Title": "News", "Childs": [] },
            { "Title": "Inhalte", "Childs": [
                { "Title": "Aushänge", "Root": { "Childs": [plan_entry("x", "", "https://dsb/x.jpg")] } },
                { "Title": "Pläne", "Root": { "Childs": [
                    plan_entry("Heute", "03.11.2025 07:00", "https://light.dsbcontrol.de/a/subst_001.htm"),
                    plan_entry("Bild", "03.11.2025 07:00", "https://light.dsbcontrol.de/a/plan.png"),
                    { "Title": "Leer", "Childs": [] },
                    plan_entry("Morgen", "03.11.2025 07:00", "https://light.dsbcontrol.de/b/subst_002.html")
                ] } }
            ] }
        ]
    }));

    let links = extract_plan_links(&response);

    assert_eq!(links.len(), 2);
    assert_eq!(links[0].detail, "https://light.dsbcontrol.de/a/subst_001.htm");
    assert_eq!(links[0].title.as_deref(), Some("Heute"));
    assert_eq!(links[0].date.as_deref(), Some("03.11.2025 07:00"));
    assert_eq!(links[1].detail, "https://light.dsbcontrol.de/b/subst_002.html");
}

/// Test that a menu without the expected items yields nothing
#[test]
fn test_extractPlanLinks_withMissingItems_shouldReturnEmpty() {
    assert!(extract_plan_links(&menu(json!({ "ResultMenuItems": [] }))).is_empty());
    assert!(extract_plan_links(&menu(json!({
        "ResultMenuItems": [{ "Title": "Inhalte", "Childs": [{ "Title": "Aushänge" }] }]
    })))
    .is_empty());
    assert!(extract_plan_links(&menu(json!({
        "ResultMenuItems": [{ "Title": "Inhalte", "Childs": [{ "Title": "Pläne" }] }]
    })))
    .is_empty());
}

/// Test that a compressed GetData answer decodes into the menu tree
#[test]
fn test_menuResponse_fromCompressedPayload() {
    let body = json!({
        "Resultcode": 0,
        "ResultStatusInfo": "",
        "ResultMenuItems": [{ "Title": "Inhalte", "Childs": [{ "Title": "Pläne", "Root": { "Childs": [
            plan_entry("Heute", "03.11.2025 07:00", "https://light.dsbcontrol.de/a/subst_001.htm")
        ] } }] }]
    })
    .to_string();

    let decoded = decode_payload(&encode_payload(&body).unwrap()).unwrap();
    let response: MenuResponse = serde_json::from_str(&decoded).unwrap();

    assert_eq!(response.resultcode, Some(0));
    assert_eq!(extract_plan_links(&response).len(), 1);
}

/// Test that only an explicit Resultcode 0 counts as success
#[test]
fn test_intoSuccess_withMissingOrNonZeroCode_shouldFail() {
    assert!(menu(json!({ "Resultcode": 0, "ResultMenuItems": [] })).into_success().is_ok());

    let missing = menu(json!({ "ResultMenuItems": [] })).into_success();
    assert!(matches!(missing, Err(DsbError::MissingResultcode)));

    let failed = menu(json!({ "Resultcode": 1, "ResultStatusInfo": "Login fehlgeschlagen" })).into_success();
    match failed {
        Err(DsbError::Api { code, message }) => {
            assert_eq!(code, 1);
            assert_eq!(message, "Login fehlgeschlagen");
        }
        other => panic!("expected API error, got {:?}", other),
    }
}
