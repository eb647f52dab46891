//! Weekly AI prescription page: availability gate, tabs, history and the
//! create form.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use mockable::Clock;

use crate::actions::{ActionRegistry, ActionTarget};
use crate::api::PortalApi;
use crate::countdown::Countdown;
use crate::dialog::{DialogKind, Notifier};
use crate::err::Error;
use crate::models::{
    AvailabilityStatus, PrescribeContext, PrescribeReply, PrescribeRequest, PrescriptionRecord,
};
use crate::page::Page;
use crate::tabs::Tab;
use crate::views::prescriptions::{
    render_history, render_prescription, render_status_banner, render_this_week,
    SHOW_HISTORY_DETAIL,
};
use crate::views::{error_message, loading};

pub const STATUS_BANNER: &str = "statusBanner";
pub const SUBMIT_BUTTON: &str = "submitBtn";
pub const CURRENT_WEEK_CONTENT: &str = "currentWeekContent";
pub const HISTORY_CONTENT: &str = "historyContent";
pub const RESULTS_MODAL: &str = "resultsModal";
pub const RESULTS_CONTENT: &str = "resultsContent";
pub const LOADING_OVERLAY: &str = "loadingOverlay";

pub const ISSUE_FIELD: &str = "issue";
pub const AFFECTED_GRADE_FIELD: &str = "affectedGrade";
pub const NUMBER_OF_CASES_FIELD: &str = "numberOfCases";
pub const TREND_FIELD: &str = "trend";
pub const CATEGORY_FIELD: &str = "category";

const PRESCRIBE_FORM: [&str; 5] = [
    ISSUE_FIELD,
    AFFECTED_GRADE_FIELD,
    NUMBER_OF_CASES_FIELD,
    TREND_FIELD,
    CATEGORY_FIELD,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateState {
    Idle,
    Submitting,
    Success,
    Blocked,
    Failed,
}

struct Session {
    tab: Tab,
    history: Vec<PrescriptionRecord>,
    create: CreateState,
}

pub struct PrescriptionPage {
    api: Arc<dyn PortalApi>,
    page: Page,
    notifier: Notifier,
    clock: Arc<dyn Clock + Send + Sync>,
    countdown: Countdown,
    session: Mutex<Session>,
    actions: ActionRegistry<PrescriptionPage>,
}

impl PrescriptionPage {
    pub fn new(
        api: Arc<dyn PortalApi>,
        page: Page,
        notifier: Notifier,
        clock: Arc<dyn Clock + Send + Sync>,
    ) -> Arc<Self> {
        let mut actions = ActionRegistry::new();
        actions.register(
            SHOW_HISTORY_DETAIL,
            |prescriptions: Arc<PrescriptionPage>, target| async move {
                prescriptions.open_history_item(&target)
            },
        );

        let countdown = Countdown::new(page.clone(), Arc::clone(&clock));
        Arc::new(Self {
            api,
            page,
            notifier,
            clock,
            countdown,
            session: Mutex::new(Session {
                tab: Tab::Current,
                history: Vec::new(),
                create: CreateState::Idle,
            }),
            actions,
        })
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn countdown(&self) -> &Countdown {
        &self.countdown
    }

    pub fn active_tab(&self) -> Tab {
        self.session().tab
    }

    pub fn create_state(&self) -> CreateState {
        self.session().create
    }

    pub async fn mount(&self) {
        log::info!("Mounting prescription page");
        self.check_availability().await;
        self.switch_tab(Tab::Current).await;
    }

    pub async fn check_availability(&self) {
        match self.api.check_availability().await {
            Ok(status) => self.apply_availability(&status).await,
            Err(err) => {
                log::error!("Error checking availability: {}", err);
                self.notifier
                    .error("Failed to check availability. Please try again.")
                    .await;
            }
        }
    }

    async fn apply_availability(&self, status: &AvailabilityStatus) {
        let today = self.clock.utc();
        self.page.update(|doc| {
            doc.set_content(STATUS_BANNER, render_status_banner(status, today));
            doc.set_disabled(SUBMIT_BUTTON, !status.allowed);
        });

        if status.allowed {
            self.countdown.stop().await;
            return;
        }
        match &status.time_until_next {
            Some(next) => self.countdown.start(next.next_monday).await,
            None => log::warn!("Weekly limit reached but no next slot was given"),
        }
    }

    pub async fn switch_tab(&self, tab: Tab) {
        log::debug!("Switching to tab {}", tab);
        self.session().tab = tab;
        self.page.update(|doc| tab.activate(doc));
        if !tab.is_data_backed() {
            return;
        }
        if tab == Tab::History {
            self.load_history().await;
        } else {
            self.load_this_week().await;
        }
    }

    pub async fn load_this_week(&self) {
        self.page
            .update(|doc| doc.set_content(CURRENT_WEEK_CONTENT, loading("Loading...")));
        let content = match self.api.this_week().await {
            Ok(this_week) => render_this_week(&this_week),
            Err(err) => {
                log::error!("Error loading this week: {}", err);
                error_message("Failed to load data")
            }
        };
        self.page
            .update(|doc| doc.set_content(CURRENT_WEEK_CONTENT, content));
    }

    pub async fn load_history(&self) {
        self.page
            .update(|doc| doc.set_content(HISTORY_CONTENT, loading("Loading...")));
        let content = match self.api.history().await {
            Ok(history) => {
                let content = render_history(&history);
                self.session().history = history.prescriptions;
                content
            }
            Err(err) => {
                log::error!("Error loading history: {}", err);
                error_message("Failed to load history")
            }
        };
        self.page.update(|doc| doc.set_content(HISTORY_CONTENT, content));
    }

    /// Opens the detail modal for the history entry at `index`.
    pub fn show_history_detail(&self, index: usize) -> bool {
        let record = self.session().history.get(index).cloned();
        match record {
            Some(record) => {
                self.show_results(&record);
                true
            }
            None => false,
        }
    }

    /// Click on a rendered history item, found by its action name and
    /// position. Returns false when no such item is rendered or handled.
    pub async fn click(self: &Arc<Self>, action: &str, index: usize) -> bool {
        let index = index.to_string();
        let target = self.page.read(|doc| {
            doc.content(HISTORY_CONTENT)
                .and_then(|history| {
                    history.find(&|e| {
                        e.get_attr("data-action") == Some(action)
                            && e.get_attr("data-index") == Some(index.as_str())
                    })
                })
                .and_then(ActionTarget::from_element)
        });
        match target {
            Some(target) => self.dispatch(target).await,
            None => false,
        }
    }

    pub async fn dispatch(self: &Arc<Self>, target: ActionTarget) -> bool {
        match self.actions.dispatch(Arc::clone(self), target).await {
            None => false,
            Some(Ok(())) => true,
            Some(Err(err)) => {
                log::error!("History action failed: {}", err);
                false
            }
        }
    }

    fn open_history_item(&self, target: &ActionTarget) -> Result<(), Error> {
        let index = target
            .get("index")
            .and_then(|index| index.parse::<usize>().ok())
            .ok_or_else(|| Error::validation("History item has no index"))?;
        if self.show_history_detail(index) {
            Ok(())
        } else {
            Err(Error::validation(format!("No history entry at {}", index)))
        }
    }

    fn show_results(&self, record: &PrescriptionRecord) {
        self.page.update(|doc| {
            doc.set_content(RESULTS_CONTENT, render_prescription(record));
            doc.show(RESULTS_MODAL);
        });
    }

    pub fn close_modal(&self) {
        self.page.update(|doc| doc.hide(RESULTS_MODAL));
    }

    /// Click that landed on `target`. A click on the modal backdrop closes it.
    pub fn click_outside(&self, target: &str) {
        if target == RESULTS_MODAL {
            self.close_modal();
        }
    }

    /// Submits the prescribe form with the values currently in the page.
    pub async fn prescribe(&self) -> CreateState {
        let (issue, context) = self.page.read(|doc| {
            (
                doc.value(ISSUE_FIELD).trim().to_string(),
                PrescribeContext::from_fields(
                    &doc.value(AFFECTED_GRADE_FIELD),
                    &doc.value(NUMBER_OF_CASES_FIELD),
                    &doc.value(TREND_FIELD),
                    &doc.value(CATEGORY_FIELD),
                ),
            )
        });
        if issue.is_empty() {
            self.notifier.error("Please describe the issue").await;
            return self.create_state();
        }

        self.session().create = CreateState::Submitting;
        self.page.update(|doc| doc.show(LOADING_OVERLAY));
        let result = self.api.prescribe(&PrescribeRequest { issue, context }).await;
        self.page.update(|doc| doc.hide(LOADING_OVERLAY));

        let state = match result {
            Ok(PrescribeReply::Created(record)) => {
                self.show_results(&record);
                self.check_availability().await;
                self.notifier
                    .success("✅ Weekly prescription created successfully!")
                    .await;
                self.page.update(|doc| doc.reset_fields(&PRESCRIBE_FORM));
                CreateState::Success
            }
            Ok(PrescribeReply::Blocked { message }) => {
                log::warn!("Prescription blocked: {}", message);
                let message = if message.is_empty() {
                    "A prescription has already been created this week".to_string()
                } else {
                    message
                };
                self.notifier
                    .alert("Weekly Limit Reached", &message, DialogKind::Info)
                    .await;
                CreateState::Blocked
            }
            Ok(PrescribeReply::Failed { error }) => {
                let message = error
                    .filter(|e| !e.is_empty())
                    .unwrap_or_else(|| "Failed to create prescription".to_string());
                log::error!("Prescription rejected: {}", message);
                self.notifier.error(&message).await;
                CreateState::Failed
            }
            Err(err) => {
                log::error!("Error creating prescription: {}", err);
                self.notifier
                    .error("Failed to create prescription. Please try again.")
                    .await;
                CreateState::Failed
            }
        };
        self.session().create = state;
        state
    }

    fn session(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
