/*!
 * Tests for Discord payloads and temperature warnings
 */

use std::collections::HashSet;

use dsb_bot::bot::PlanEntry;
use dsb_bot::notifier::{build_plan_update_payload, build_warning_payload, DiscordNotifier, Notifier};
use dsb_bot::system_monitor::check_temperature;

use crate::common::mocks::MockNotifier;

fn plans() -> Vec<PlanEntry> {
    vec![
        PlanEntry {
            title: "3.11.2025 Montag".to_string(),
            url: "https://light.dsbcontrol.de/a/subst_001.htm".to_string(),
        },
        PlanEntry {
            title: "4.11.2025 Dienstag".to_string(),
            url: "https://light.dsbcontrol.de/b/subst_001.htm".to_string(),
        },
    ]
}

/// Test the role mention prefix
#[test]
fn test_buildWarningPayload_withRole_shouldMention() {
    let payload = build_warning_payload("Bot gestartet", "987");
    assert_eq!(payload.content, "<@&987> Bot gestartet");
    assert_eq!(payload.username, "DSB-Monitor");
    assert!(payload.embeds.is_empty());

    let plain = build_warning_payload("Bot gestartet", "");
    assert_eq!(plain.content, "Bot gestartet");
}

/// Test that new plans are marked and every plan is linked
#[test]
fn test_buildPlanUpdatePayload_shouldMarkNewPlans() {
    let new_keys: HashSet<String> = ["4.11.2025 Dienstag".to_string()].into_iter().collect();

    let payload = build_plan_update_payload(&plans(), &new_keys, Some(47.23));

    assert_eq!(payload.username, "DSB-Bot");
    assert_eq!(payload.content, "Neue Vertretungspläne verfügbar.");
    let embed = &payload.embeds[0];
    assert_eq!(embed.title, "Aktuelle Vertretungspläne");
    assert_eq!(embed.color, 0x1abc9c);
    assert_eq!(embed.fields.len(), 2);
    assert_eq!(embed.fields[0].name, "3.11.2025 Montag");
    assert_eq!(embed.fields[1].name, "4.11.2025 Dienstag 🌟 (neu)");
    assert_eq!(
        embed.fields[0].value,
        "[Vertretungsplan öffnen](https://light.dsbcontrol.de/a/subst_001.htm)"
    );
    assert!(!embed.fields[1].inline);
    assert_eq!(embed.footer.text, "System Temp: 47.2°C");
}

/// Test the footer when the temperature is unknown, and the JSON shape
#[test]
fn test_buildPlanUpdatePayload_withoutTemperature() {
    let payload = build_plan_update_payload(&plans(), &HashSet::new(), None);
    assert_eq!(payload.embeds[0].footer.text, "System Temp: ?");

    let json = serde_json::to_value(&payload).unwrap();
    assert_eq!(json["embeds"][0]["fields"][1]["inline"], false);
    assert!(json["avatar_url"].is_string());

    let warning = serde_json::to_value(build_warning_payload("x", "")).unwrap();
    assert!(warning.get("embeds").is_none());
    assert!(warning.get("avatar_url").is_none());
}

/// Test that an unconfigured notifier only logs
#[tokio::test]
async fn test_discordNotifier_withoutWebhooks_shouldNotFail() {
    let notifier = DiscordNotifier::new(None, Some(String::new()), "");
    notifier.send_warning("nur im Log").await;
    notifier.send_plan_update(&plans(), &HashSet::new()).await;
}

/// Test that heat warnings fire only above the threshold
#[tokio::test]
async fn test_checkTemperature_shouldWarnAboveThreshold() {
    let notifier = MockNotifier::new();

    assert!(!check_temperature(&notifier, None, 75.0).await);
    assert!(!check_temperature(&notifier, Some(75.0), 75.0).await);
    assert!(check_temperature(&notifier, Some(81.04), 75.0).await);

    assert_eq!(notifier.warnings(), vec!["⚠️ Hitzewarnung: 81.0°C".to_string()]);
}
