//! User management page: the users table, its search box, row actions and
//! the create-user modal.

use std::sync::Arc;

use crate::actions::{ActionRegistry, ActionTarget};
use crate::api::PortalApi;
use crate::dialog::{DialogKind, DialogOptions, Notifier};
use crate::err::Error;
use crate::models::{NewUser, Role};
use crate::page::Page;
use crate::profile::ProfileHeader;
use crate::views::users::{
    filter_rows, placeholder_row, render_user_rows, DELETE_USER, RESET_PASSWORD, TOGGLE_STATUS,
};

pub const USERS_TABLE_BODY: &str = "usersTableBody";
pub const SEARCH_INPUT: &str = "searchInput";
pub const CREATE_USER_MODAL: &str = "createUserModal";

pub const FULL_NAME_FIELD: &str = "fullName";
pub const EMAIL_FIELD: &str = "email";
pub const USERNAME_FIELD: &str = "username";
pub const ROLE_FIELD: &str = "role";
pub const DEPARTMENT_FIELD: &str = "department";
pub const PASSWORD_FIELD: &str = "temporaryPassword";

const CREATE_USER_FORM: [&str; 6] = [
    FULL_NAME_FIELD,
    EMAIL_FIELD,
    USERNAME_FIELD,
    ROLE_FIELD,
    DEPARTMENT_FIELD,
    PASSWORD_FIELD,
];

const MIN_PASSWORD_LEN: usize = 6;
const UNEXPECTED: &str = "An unexpected error occurred";

pub struct UsersPage {
    api: Arc<dyn PortalApi>,
    page: Page,
    notifier: Notifier,
    profile: ProfileHeader,
    actions: ActionRegistry<UsersPage>,
}

impl UsersPage {
    pub fn new(api: Arc<dyn PortalApi>, page: Page, notifier: Notifier) -> Arc<Self> {
        let mut actions = ActionRegistry::new();
        actions.register(TOGGLE_STATUS, |users: Arc<UsersPage>, target| async move {
            users.toggle_status(&target).await
        });
        actions.register(RESET_PASSWORD, |users: Arc<UsersPage>, target| async move {
            users.reset_password(&target).await
        });
        actions.register(DELETE_USER, |users: Arc<UsersPage>, target| async move {
            users.delete_user(&target).await
        });

        let profile = ProfileHeader::new(Arc::clone(&api), page.clone());
        Arc::new(Self {
            api,
            page,
            notifier,
            profile,
            actions,
        })
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn profile(&self) -> &ProfileHeader {
        &self.profile
    }

    pub async fn mount(&self) {
        log::info!("Mounting user management page");
        self.profile.load().await;
        self.load_users().await;
    }

    /// Refetches every user and replaces the table body.
    pub async fn load_users(&self) {
        self.page
            .update(|doc| doc.set_content(USERS_TABLE_BODY, placeholder_row("Loading users...")));

        let body = match self.api.list_users().await {
            Ok(reply) if reply.success => render_user_rows(reply.data.as_deref().unwrap_or(&[])),
            Ok(reply) => {
                log::warn!(
                    "User list rejected: {}",
                    reply.failure_text().unwrap_or("no message")
                );
                placeholder_row("No users found")
            }
            Err(err) => {
                log::error!("Error loading users: {}", err);
                self.notifier.error("Failed to load users").await;
                placeholder_row("Error loading users")
            }
        };
        self.page.update(|doc| doc.set_content(USERS_TABLE_BODY, body));
    }

    /// Filters the rendered rows as the search box changes. Returns the
    /// number of rows left visible.
    pub fn search(&self, term: &str) -> usize {
        self.page.update(|doc| {
            doc.set_value(SEARCH_INPUT, term);
            match doc.content_mut(USERS_TABLE_BODY) {
                Some(body) => filter_rows(body, term),
                None => 0,
            }
        })
    }

    pub fn open_create_user_modal(&self) {
        self.page.update(|doc| doc.show(CREATE_USER_MODAL));
    }

    pub fn close_create_user_modal(&self) {
        self.page.update(|doc| {
            doc.hide(CREATE_USER_MODAL);
            doc.reset_fields(&CREATE_USER_FORM);
        });
    }

    pub fn click_outside(&self, target: &str) {
        if target == CREATE_USER_MODAL {
            self.close_create_user_modal();
        }
    }

    /// Submits the create-user form. Every outcome has already been shown
    /// to the user when this returns.
    pub async fn create_user(&self) -> Result<(), Error> {
        let user = self.page.read(|doc| NewUser {
            full_name: doc.value(FULL_NAME_FIELD).trim().to_string(),
            email: doc.value(EMAIL_FIELD).trim().to_string(),
            username: doc.value(USERNAME_FIELD).trim().to_string(),
            role: doc.value(ROLE_FIELD),
            department: doc.value(DEPARTMENT_FIELD).trim().to_string(),
            password: doc.value(PASSWORD_FIELD),
            require_password_change: true,
        });

        if let Err(err) = validate_new_user(&user) {
            self.notifier.error(err.user_message(UNEXPECTED)).await;
            return Err(err);
        }

        let reply = match self.api.create_user(&user).await {
            Ok(reply) => reply,
            Err(err) => {
                log::error!("Error creating user: {}", err);
                self.notifier
                    .error(err.user_message("Failed to create user"))
                    .await;
                return Err(err);
            }
        };

        if !reply.success {
            let message = reply.failure_text().unwrap_or("Failed to create user").to_string();
            self.notifier.error(&message).await;
            return Err(Error::ApplicationError {
                message: Some(message),
            });
        }

        let mut message =
            "User created successfully! A temporary password email was sent.".to_string();
        if Role::from(user.role.clone()) == Role::Teacher {
            message.push_str(
                " This teacher is now available as an adviser in the Counselor portal.",
            );
        }
        log::info!("Created user {}", user.username);
        self.notifier.success(&message).await;
        self.close_create_user_modal();
        self.load_users().await;
        Ok(())
    }

    /// Click on a row button, found by its action name and user id.
    /// Returns false when no such button is rendered.
    pub async fn click(self: &Arc<Self>, action: &str, user_id: &str) -> bool {
        let target = self.page.read(|doc| {
            doc.content(USERS_TABLE_BODY)
                .and_then(|body| {
                    body.find(&|e| {
                        e.get_attr("data-action") == Some(action)
                            && e.get_attr("data-user-id") == Some(user_id)
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
                log::error!("User action failed: {}", err);
                self.notifier.error(err.user_message(UNEXPECTED)).await;
                true
            }
        }
    }

    async fn toggle_status(&self, target: &ActionTarget) -> Result<(), Error> {
        let user_id = target_user(target)?;
        let active = target.get("currentStatus") == Some("true");
        let verb = if active { "deactivate" } else { "activate" };

        let question = format!("Are you sure you want to {} this user?", verb);
        if !self.notifier.confirm("Confirm Action", &question).await {
            return Ok(());
        }

        let reply = self.api.toggle_user_status(user_id, !active).await?;
        if reply.success {
            self.notifier
                .success(&format!("User {}d successfully", verb))
                .await;
            self.load_users().await;
        } else {
            self.notifier
                .error(reply.failure_text().unwrap_or("Failed"))
                .await;
        }
        Ok(())
    }

    async fn reset_password(&self, target: &ActionTarget) -> Result<(), Error> {
        let user_id = target_user(target)?;
        let password = self
            .notifier
            .prompt("Enter new temporary password (min 6 characters):")
            .await
            .filter(|password| password.chars().count() >= MIN_PASSWORD_LEN);
        let Some(password) = password else {
            self.notifier
                .error("Password must be at least 6 characters")
                .await;
            return Ok(());
        };

        let reply = self.api.reset_password(user_id, &password).await?;
        if reply.success {
            self.notifier
                .success("Password reset successfully. Email sent to user.")
                .await;
            self.load_users().await;
        } else {
            self.notifier
                .error(reply.failure_text().unwrap_or("Failed to reset password"))
                .await;
        }
        Ok(())
    }

    async fn delete_user(&self, target: &ActionTarget) -> Result<(), Error> {
        let user_id = target_user(target)?;
        let name = target.get("userName").unwrap_or_default();
        let options = DialogOptions::new(
            DialogKind::Warning,
            format!("Delete \"{}\"? This action cannot be undone.", name),
        )
        .title("Delete User")
        .buttons("Delete", "Cancel");
        if !self.notifier.show(options).await {
            return Ok(());
        }

        let reply = self.api.delete_user(user_id).await?;
        if reply.success {
            self.notifier.success("User deleted successfully").await;
            self.load_users().await;
        } else {
            self.notifier
                .error(reply.failure_text().unwrap_or("Failed to delete user"))
                .await;
        }
        Ok(())
    }
}

fn target_user(target: &ActionTarget) -> Result<&str, Error> {
    target
        .get("userId")
        .filter(|id| !id.is_empty())
        .ok_or_else(|| Error::validation("This row has no user id"))
}

fn validate_new_user(user: &NewUser) -> Result<(), Error> {
    let required = [
        &user.full_name,
        &user.email,
        &user.username,
        &user.role,
        &user.password,
    ];
    if required.iter().any(|value| value.is_empty()) {
        return Err(Error::validation("Please fill in all required fields"));
    }
    Ok(())
}
