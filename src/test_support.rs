//! Test doubles shared by unit and integration tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Local, Utc};
use mockable::Clock;
use serde_json::Value;

use crate::api::PortalApi;
use crate::dialog::{Dialog, DialogOptions, Notifier};
use crate::err::Error;
use crate::models::{
    AvailabilityStatus, History, NewUser, PrescribeReply, PrescribeRequest, ThisWeek, UserProfile,
    UserRecord,
};
use crate::page::{Page, PageHost};
use crate::Payload;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Clone, PartialEq)]
pub enum ApiCall {
    CheckAvailability,
    ThisWeek,
    History,
    Prescribe(PrescribeRequest),
    UserProfile,
    ListUsers,
    CreateUser(NewUser),
    ToggleUserStatus { user_id: String, is_active: bool },
    ResetPassword { user_id: String, new_password: String },
    DeleteUser(String),
}

/// One scripted answer per endpoint, handed out on every call. An endpoint
/// with no answer fails like an unreachable server.
#[derive(Default)]
pub struct StubApi {
    calls: Mutex<Vec<ApiCall>>,
    availability: Mutex<Option<Result<AvailabilityStatus, Error>>>,
    this_week: Mutex<Option<Result<ThisWeek, Error>>>,
    history: Mutex<Option<Result<History, Error>>>,
    prescribe: Mutex<Option<Result<PrescribeReply, Error>>>,
    profile: Mutex<Option<Payload<UserProfile>>>,
    users: Mutex<Option<Payload<Vec<UserRecord>>>>,
    mutation: Mutex<Option<Payload<Value>>>,
}

impl StubApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        lock(&self.calls).clone()
    }

    pub fn clear_calls(&self) {
        lock(&self.calls).clear();
    }

    pub fn set_availability(&self, answer: Result<AvailabilityStatus, Error>) {
        *lock(&self.availability) = Some(answer);
    }

    pub fn set_this_week(&self, answer: Result<ThisWeek, Error>) {
        *lock(&self.this_week) = Some(answer);
    }

    pub fn set_history(&self, answer: Result<History, Error>) {
        *lock(&self.history) = Some(answer);
    }

    pub fn set_prescribe(&self, answer: Result<PrescribeReply, Error>) {
        *lock(&self.prescribe) = Some(answer);
    }

    pub fn set_profile(&self, answer: Payload<UserProfile>) {
        *lock(&self.profile) = Some(answer);
    }

    pub fn set_users(&self, answer: Payload<Vec<UserRecord>>) {
        *lock(&self.users) = Some(answer);
    }

    /// Answer for create, toggle, reset and delete.
    pub fn set_mutation(&self, answer: Payload<Value>) {
        *lock(&self.mutation) = Some(answer);
    }

    fn answer<T: Clone>(
        &self,
        call: ApiCall,
        slot: &Mutex<Option<Result<T, Error>>>,
    ) -> Result<T, Error> {
        lock(&self.calls).push(call);
        lock(slot)
            .clone()
            .unwrap_or_else(|| Err(Error::network("no stubbed answer")))
    }
}

#[async_trait]
impl PortalApi for StubApi {
    async fn check_availability(&self) -> Result<AvailabilityStatus, Error> {
        self.answer(ApiCall::CheckAvailability, &self.availability)
    }

    async fn this_week(&self) -> Result<ThisWeek, Error> {
        self.answer(ApiCall::ThisWeek, &self.this_week)
    }

    async fn history(&self) -> Result<History, Error> {
        self.answer(ApiCall::History, &self.history)
    }

    async fn prescribe(&self, request: &PrescribeRequest) -> Result<PrescribeReply, Error> {
        self.answer(ApiCall::Prescribe(request.clone()), &self.prescribe)
    }

    async fn user_profile(&self) -> Payload<UserProfile> {
        self.answer(ApiCall::UserProfile, &self.profile)
    }

    async fn list_users(&self) -> Payload<Vec<UserRecord>> {
        self.answer(ApiCall::ListUsers, &self.users)
    }

    async fn create_user(&self, user: &NewUser) -> Payload<Value> {
        self.answer(ApiCall::CreateUser(user.clone()), &self.mutation)
    }

    async fn toggle_user_status(&self, user_id: &str, is_active: bool) -> Payload<Value> {
        let call = ApiCall::ToggleUserStatus {
            user_id: user_id.to_string(),
            is_active,
        };
        self.answer(call, &self.mutation)
    }

    async fn reset_password(&self, user_id: &str, new_password: &str) -> Payload<Value> {
        let call = ApiCall::ResetPassword {
            user_id: user_id.to_string(),
            new_password: new_password.to_string(),
        };
        self.answer(call, &self.mutation)
    }

    async fn delete_user(&self, user_id: &str) -> Payload<Value> {
        self.answer(ApiCall::DeleteUser(user_id.to_string()), &self.mutation)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogEvent {
    Success(String),
    Error(String),
    Confirm(String),
    Show(DialogOptions),
    Prompt(String),
}

/// Records what was shown and answers confirmations and prompts from a
/// script.
#[derive(Default)]
pub struct RecordingDialog {
    events: Mutex<Vec<DialogEvent>>,
    confirm: Mutex<bool>,
    prompts: Mutex<VecDeque<String>>,
}

impl RecordingDialog {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn accept_confirmations(&self, accept: bool) {
        *lock(&self.confirm) = accept;
    }

    pub fn answer_prompt<S: Into<String>>(&self, answer: S) {
        lock(&self.prompts).push_back(answer.into());
    }

    pub fn events(&self) -> Vec<DialogEvent> {
        lock(&self.events).clone()
    }

    pub fn notifier(self: &Arc<Self>) -> Notifier {
        Notifier::new(Some(Arc::clone(self) as Arc<dyn Dialog>))
    }

    fn record(&self, event: DialogEvent) {
        lock(&self.events).push(event);
    }
}

#[async_trait]
impl Dialog for RecordingDialog {
    async fn success(&self, message: &str, _title: Option<&str>) {
        self.record(DialogEvent::Success(message.to_string()));
    }

    async fn error(&self, message: &str, _title: Option<&str>) {
        self.record(DialogEvent::Error(message.to_string()));
    }

    async fn confirm(&self, message: &str, _title: Option<&str>) -> bool {
        self.record(DialogEvent::Confirm(message.to_string()));
        *lock(&self.confirm)
    }

    async fn show(&self, options: DialogOptions) -> bool {
        let asks = options.asks();
        self.record(DialogEvent::Show(options));
        asks && *lock(&self.confirm)
    }

    async fn prompt(&self, message: &str) -> Option<String> {
        self.record(DialogEvent::Prompt(message.to_string()));
        lock(&self.prompts).pop_front()
    }
}

#[derive(Default)]
pub struct RecordingHost {
    reloads: AtomicUsize,
}

impl RecordingHost {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn reloads(&self) -> usize {
        self.reloads.load(Ordering::SeqCst)
    }

    pub fn page(self: &Arc<Self>) -> Page {
        Page::new(Arc::clone(self) as Arc<dyn PageHost>)
    }
}

impl PageHost for RecordingHost {
    fn reload(&self) {
        self.reloads.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    pub fn new(now: DateTime<Utc>) -> Arc<Self> {
        Arc::new(Self(Mutex::new(now)))
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *lock(&self.0) = now;
    }

    pub fn advance_seconds(&self, seconds: i64) {
        *lock(&self.0) += Duration::seconds(seconds);
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *lock(&self.0)
    }
}
