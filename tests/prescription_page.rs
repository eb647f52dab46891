//! Prescription page flows driven through stubbed API and dialogs.

#[path = "support/fixtures.rs"]
mod fixtures;

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rstest::rstest;
use serde_json::json;

use schooldesk_portal::countdown::COUNTDOWN_ELEMENT;
use schooldesk_portal::dialog::{DialogKind, DialogOptions};
use schooldesk_portal::err::Error;
use schooldesk_portal::models::{
    AvailabilityStatus, History, PrescribeContext, PrescribeReply, PrescribeRequest, ThisWeek,
    TimeUntilNext,
};
use schooldesk_portal::page::Page;
use schooldesk_portal::prescriptions::{
    CreateState, PrescriptionPage, CATEGORY_FIELD, HISTORY_CONTENT, ISSUE_FIELD,
    LOADING_OVERLAY, RESULTS_CONTENT, RESULTS_MODAL, STATUS_BANNER, SUBMIT_BUTTON, TREND_FIELD,
};
use schooldesk_portal::tabs::Tab;
use schooldesk_portal::test_support::{
    ApiCall, DialogEvent, MutableClock, RecordingDialog, RecordingHost, StubApi,
};
use schooldesk_portal::views::prescriptions::{render_prescription, SHOW_HISTORY_DETAIL};

use fixtures::{record, record_json, utc};

const BLOCKED_MESSAGE: &str = "You have already created a prescription this week";

struct Harness {
    api: Arc<StubApi>,
    dialog: Arc<RecordingDialog>,
    host: Arc<RecordingHost>,
    clock: Arc<MutableClock>,
    controller: Arc<PrescriptionPage>,
}

impl Harness {
    fn new(now: DateTime<Utc>) -> Self {
        let api = StubApi::new();
        api.set_this_week(Ok(ThisWeek {
            success: true,
            prescription: None,
        }));
        let dialog = RecordingDialog::new();
        let host = RecordingHost::new();
        let clock = MutableClock::new(now);
        let controller =
            PrescriptionPage::new(api.clone(), host.page(), dialog.notifier(), clock.clone());
        Self {
            api,
            dialog,
            host,
            clock,
            controller,
        }
    }

    fn page(&self) -> &Page {
        self.controller.page()
    }
}

fn allowed() -> AvailabilityStatus {
    AvailabilityStatus {
        allowed: true,
        time_until_next: None,
        last_prescription_date: None,
        current_week: None,
    }
}

fn blocked_until(next_monday: DateTime<Utc>) -> AvailabilityStatus {
    AvailabilityStatus {
        allowed: false,
        time_until_next: Some(TimeUntilNext { next_monday }),
        last_prescription_date: Some(utc(2024, 1, 2, 9, 0, 0)),
        current_week: None,
    }
}

#[tokio::test(start_paused = true)]
async fn blocked_week_disables_submit_and_counts_down_to_reload() {
    let next_monday = utc(2024, 1, 8, 0, 0, 0);
    let harness = Harness::new(utc(2024, 1, 7, 23, 59, 50));
    harness.api.set_availability(Ok(blocked_until(next_monday)));

    harness.controller.mount().await;

    assert!(harness.page().read(|doc| doc.is_disabled(SUBMIT_BUTTON)));
    assert!(harness.page().render(STATUS_BANNER).contains("Weekly Limit Reached"));
    assert_eq!(harness.controller.countdown().live_tickers(), 1);

    tokio::time::sleep(Duration::from_millis(1_100)).await;
    assert_eq!(
        harness.page().read(|doc| doc.text(COUNTDOWN_ELEMENT)).as_deref(),
        Some("0d 0h 0m 10s")
    );
    assert_eq!(harness.host.reloads(), 0);

    harness.clock.set(next_monday);
    tokio::time::sleep(Duration::from_millis(1_100)).await;

    assert_eq!(harness.host.reloads(), 1);
    assert!(!harness.controller.countdown().is_running().await);
    assert_eq!(harness.controller.countdown().live_tickers(), 0);
}

#[tokio::test(start_paused = true)]
async fn closing_the_page_cancels_its_countdown() {
    let next_monday = utc(2024, 1, 8, 0, 0, 0);
    let harness = Harness::new(utc(2024, 1, 7, 23, 59, 50));
    harness.api.set_availability(Ok(blocked_until(next_monday)));
    harness.controller.mount().await;
    let Harness {
        host,
        clock,
        controller,
        ..
    } = harness;

    drop(controller);
    clock.set(next_monday);
    tokio::time::sleep(Duration::from_millis(1_100)).await;

    assert_eq!(host.reloads(), 0);
}

#[tokio::test(start_paused = true)]
async fn repeated_checks_keep_a_single_ticker() {
    let harness = Harness::new(utc(2024, 1, 3, 12, 0, 0));
    harness
        .api
        .set_availability(Ok(blocked_until(utc(2024, 1, 8, 0, 0, 0))));

    for _ in 0..3 {
        harness.controller.check_availability().await;
        assert_eq!(harness.controller.countdown().live_tickers(), 1);
    }

    tokio::time::sleep(Duration::from_millis(3_500)).await;
    assert_eq!(harness.controller.countdown().live_tickers(), 1);
    assert_eq!(harness.host.reloads(), 0);

    harness.clock.advance_seconds(5 * 86_400);
    tokio::time::sleep(Duration::from_millis(3_000)).await;
    assert_eq!(harness.host.reloads(), 1);
    assert_eq!(harness.controller.countdown().live_tickers(), 0);
}

#[tokio::test(start_paused = true)]
async fn allowed_week_enables_submit_and_stops_the_countdown() {
    let harness = Harness::new(utc(2024, 1, 3, 12, 0, 0));
    harness
        .api
        .set_availability(Ok(blocked_until(utc(2024, 1, 8, 0, 0, 0))));
    harness.controller.check_availability().await;
    assert!(harness.controller.countdown().is_running().await);

    harness.api.set_availability(Ok(allowed()));
    harness.controller.check_availability().await;

    assert!(!harness.page().read(|doc| doc.is_disabled(SUBMIT_BUTTON)));
    assert!(!harness.controller.countdown().is_running().await);
    assert!(harness.page().render(STATUS_BANNER).contains("Week of 1/3/2024"));
}

#[tokio::test]
async fn availability_failure_is_reported() {
    let harness = Harness::new(utc(2024, 1, 3, 12, 0, 0));
    harness.api.set_availability(Err(Error::network("connection reset")));

    harness.controller.check_availability().await;

    assert_eq!(
        harness.dialog.events(),
        vec![DialogEvent::Error(
            "Failed to check availability. Please try again.".to_string()
        )]
    );
    assert!(!harness.controller.countdown().is_running().await);
}

#[tokio::test]
async fn blocked_prescribe_shows_the_server_message_and_keeps_the_form() {
    let harness = Harness::new(utc(2024, 1, 3, 12, 0, 0));
    harness.api.set_availability(Ok(allowed()));
    harness.controller.mount().await;
    harness.api.set_prescribe(Ok(PrescribeReply::Blocked {
        message: BLOCKED_MESSAGE.to_string(),
    }));
    harness.api.clear_calls();
    harness
        .page()
        .update(|doc| doc.set_value(ISSUE_FIELD, "Students skipping lunch"));

    let state = harness.controller.prescribe().await;

    assert_eq!(state, CreateState::Blocked);
    assert_eq!(
        harness.dialog.events(),
        vec![DialogEvent::Show(
            DialogOptions::new(DialogKind::Info, BLOCKED_MESSAGE).title("Weekly Limit Reached")
        )]
    );
    harness.page().read(|doc| {
        assert_eq!(doc.value(ISSUE_FIELD), "Students skipping lunch");
        assert!(!doc.is_disabled(SUBMIT_BUTTON));
        assert!(!doc.is_shown(LOADING_OVERLAY));
        assert!(!doc.is_shown(RESULTS_MODAL));
    });
    assert_eq!(harness.api.calls().len(), 1);
}

#[tokio::test]
async fn created_prescription_opens_results_and_resets_the_form() {
    let harness = Harness::new(utc(2024, 1, 9, 8, 0, 0));
    let created = record(2, "Phones in class");
    harness.api.set_availability(Ok(allowed()));
    harness
        .api
        .set_prescribe(Ok(PrescribeReply::Created(created.clone())));
    harness.page().update(|doc| {
        doc.set_value(ISSUE_FIELD, "  Phones in class ");
        doc.set_value(TREND_FIELD, "increasing");
        doc.set_value(CATEGORY_FIELD, "");
    });

    let state = harness.controller.prescribe().await;

    assert_eq!(state, CreateState::Success);
    assert_eq!(harness.controller.create_state(), CreateState::Success);
    assert_eq!(
        harness.api.calls(),
        vec![
            ApiCall::Prescribe(PrescribeRequest {
                issue: "Phones in class".to_string(),
                context: PrescribeContext {
                    trend: Some("increasing".to_string()),
                    ..PrescribeContext::default()
                },
            }),
            ApiCall::CheckAvailability,
        ]
    );
    assert!(harness.dialog.events().contains(&DialogEvent::Success(
        "✅ Weekly prescription created successfully!".to_string()
    )));
    harness.page().read(|doc| {
        assert!(doc.is_shown(RESULTS_MODAL));
        assert!(!doc.is_shown(LOADING_OVERLAY));
        assert_eq!(doc.value(ISSUE_FIELD), "");
        assert_eq!(doc.value(TREND_FIELD), "");
        assert_eq!(
            doc.render(RESULTS_CONTENT),
            render_prescription(&created).render()
        );
    });
}

#[rstest]
#[case::failed_reply(
    Ok(PrescribeReply::Failed { error: Some("Model offline".to_string()) }),
    "Model offline"
)]
#[case::failed_without_text(
    Ok(PrescribeReply::Failed { error: None }),
    "Failed to create prescription"
)]
#[case::transport(
    Err(Error::network("timed out")),
    "Failed to create prescription. Please try again."
)]
#[tokio::test]
async fn failed_prescribe_reports_an_error(
    #[case] answer: Result<PrescribeReply, Error>,
    #[case] expected: &str,
) {
    let harness = Harness::new(utc(2024, 1, 9, 8, 0, 0));
    harness.api.set_prescribe(answer);
    harness
        .page()
        .update(|doc| doc.set_value(ISSUE_FIELD, "Vandalism"));

    assert_eq!(harness.controller.prescribe().await, CreateState::Failed);
    assert_eq!(
        harness.dialog.events(),
        vec![DialogEvent::Error(expected.to_string())]
    );
    assert_eq!(
        harness.page().read(|doc| doc.value(ISSUE_FIELD)),
        "Vandalism"
    );
}

#[tokio::test]
async fn blank_issue_is_rejected_before_any_request() {
    let harness = Harness::new(utc(2024, 1, 9, 8, 0, 0));
    harness
        .page()
        .update(|doc| doc.set_value(ISSUE_FIELD, "   "));

    assert_eq!(harness.controller.prescribe().await, CreateState::Idle);
    assert!(harness.api.calls().is_empty());
    assert_eq!(
        harness.dialog.events(),
        vec![DialogEvent::Error("Please describe the issue".to_string())]
    );
}

#[tokio::test]
async fn only_data_backed_tabs_fetch_on_switch() {
    let harness = Harness::new(utc(2024, 1, 9, 8, 0, 0));
    harness.api.set_history(Ok(History {
        prescriptions: Vec::new(),
        total: 0,
    }));

    harness.controller.switch_tab(Tab::New).await;
    assert!(harness.api.calls().is_empty());
    assert_eq!(harness.controller.active_tab(), Tab::New);
    harness.page().read(|doc| {
        assert!(doc.is_active("tab-new"));
        assert!(doc.is_active("tab-button-new"));
        assert!(!doc.is_active("tab-current"));
    });

    harness.controller.switch_tab(Tab::History).await;
    harness.controller.switch_tab(Tab::Current).await;
    assert_eq!(
        harness.api.calls(),
        vec![ApiCall::History, ApiCall::ThisWeek]
    );
    assert!(harness
        .page()
        .render(HISTORY_CONTENT)
        .contains("No History Yet"));
}

#[tokio::test]
async fn history_detail_matches_a_fresh_render() {
    let harness = Harness::new(utc(2024, 1, 9, 8, 0, 0));
    let older = record(1, "Late arrivals");
    let newer = record(2, "Phones in class");
    harness.api.set_history(Ok(History {
        prescriptions: vec![newer.clone(), older.clone()],
        total: 2,
    }));

    harness.controller.switch_tab(Tab::History).await;
    let listing = harness.page().render(HISTORY_CONTENT);
    assert!(listing.contains("📚 Past Prescriptions (2)"));
    assert!(listing.contains("data-action=\"showHistoryDetail\" data-index=\"1\""));

    assert!(harness.controller.show_history_detail(1));
    assert_eq!(
        harness.page().render(RESULTS_CONTENT),
        render_prescription(&older).render()
    );
    assert!(harness.page().read(|doc| doc.is_shown(RESULTS_MODAL)));

    assert!(!harness.controller.show_history_detail(7));
    harness.controller.close_modal();

    assert!(harness.controller.click(SHOW_HISTORY_DETAIL, 0).await);
    assert_eq!(
        harness.page().render(RESULTS_CONTENT),
        render_prescription(&newer).render()
    );
    assert!(harness.page().read(|doc| doc.is_shown(RESULTS_MODAL)));
    assert!(!harness.controller.click(SHOW_HISTORY_DETAIL, 2).await);
    assert!(!harness.controller.click("deleteHistory", 0).await);

    harness.controller.click_outside("resultsContent");
    assert!(harness.page().read(|doc| doc.is_shown(RESULTS_MODAL)));
    harness.controller.click_outside(RESULTS_MODAL);
    assert!(!harness.page().read(|doc| doc.is_shown(RESULTS_MODAL)));
}

#[tokio::test]
async fn unknown_severity_does_not_hide_the_history() {
    let harness = Harness::new(utc(2024, 1, 9, 8, 0, 0));
    let mut unrated = record_json(3, "Noise in the library");
    unrated["solution"]["severity"] = json!("moderate");
    let history: History = serde_json::from_value(json!({
        "prescriptions": [record_json(2, "Phones in class"), unrated],
        "total": 2
    }))
    .expect("history should decode");
    harness.api.set_history(Ok(history));

    harness.controller.switch_tab(Tab::History).await;

    let listing = harness.page().render(HISTORY_CONTENT);
    assert!(listing.contains("📚 Past Prescriptions (2)"));
    assert!(listing.contains("severity-badge severity-moderate"));
    assert!(listing.contains("MODERATE"));
    assert!(!listing.contains("Failed to load history"));
}
