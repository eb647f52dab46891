use std::sync::Arc;

use crate::api::PortalApi;
use crate::page::Page;
use crate::views::users::initials;

pub const WELCOME_TITLE: &str = "welcomeTitle";
pub const PROFILE_BUTTON: &str = "profileButton";
pub const PROFILE_DROPDOWN: &str = "profileDropdown";

const FALLBACK_INITIALS: &str = "U";

/// Avatar button and dropdown in the page header.
#[derive(Clone)]
pub struct ProfileHeader {
    api: Arc<dyn PortalApi>,
    page: Page,
}

impl ProfileHeader {
    pub fn new(api: Arc<dyn PortalApi>, page: Page) -> Self {
        Self { api, page }
    }

    /// Fetches the signed-in user and fills in the greeting and avatar.
    /// Returns the initials shown.
    pub async fn load(&self) -> String {
        let profile = match self.api.user_profile().await {
            Ok(reply) if reply.success => reply.data,
            Ok(reply) => {
                log::warn!(
                    "Profile request rejected: {}",
                    reply.failure_text().unwrap_or("no message")
                );
                None
            }
            Err(err) => {
                log::error!("Error loading user profile: {}", err);
                None
            }
        };

        let Some(profile) = profile else {
            self.page
                .update(|doc| doc.set_content(PROFILE_BUTTON, FALLBACK_INITIALS));
            return FALLBACK_INITIALS.to_string();
        };

        let name = profile.display_name().unwrap_or("User").to_string();
        let mut avatar = initials(&name);
        if avatar.is_empty() {
            avatar = FALLBACK_INITIALS.to_string();
        }
        log::debug!("Avatar created with initials {}", avatar);
        self.page.update(|doc| {
            doc.set_content(WELCOME_TITLE, format!("Welcome back, {}", name));
            doc.set_content(PROFILE_BUTTON, avatar.as_str());
        });
        avatar
    }

    pub fn toggle(&self) -> bool {
        self.page.update(|doc| doc.toggle(PROFILE_DROPDOWN))
    }

    /// Any click elsewhere on the page closes the dropdown.
    pub fn window_click(&self, inside_dropdown: bool) {
        if !inside_dropdown {
            self.page.update(|doc| doc.hide(PROFILE_DROPDOWN));
        }
    }
}
