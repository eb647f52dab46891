use crate::markup::{el, Element, Node};
use crate::models::UserRecord;
use crate::views::format_date;

pub const TOGGLE_STATUS: &str = "toggleStatus";
pub const RESET_PASSWORD: &str = "resetPassword";
pub const DELETE_USER: &str = "deleteUser";

const COLUMNS: &str = "8";

/// Single full-width row used for loading, empty and error states.
pub fn placeholder_row(message: &str) -> Node {
    el("tr")
        .child(
            el("td")
                .attr("colspan", COLUMNS)
                .class("empty-state")
                .text(message),
        )
        .into()
}

pub fn render_user_rows(users: &[UserRecord]) -> Node {
    if users.is_empty() {
        return placeholder_row("No users found");
    }
    Node::Fragment(users.iter().map(|user| Node::from(user_row(user))).collect())
}

fn user_row(user: &UserRecord) -> Element {
    let role = user.role.as_str();
    let (status_class, status_text) = if user.is_active {
        ("status-active", "Active")
    } else {
        ("status-inactive", "Inactive")
    };

    el("tr")
        .child(el("td").text(user.full_name.as_str()))
        .child(el("td").text(user.username.as_str()))
        .child(el("td").text(user.email.as_str()))
        .child(
            el("td").child(
                el("span")
                    .class(format!("badge badge-{}", role.to_lowercase()))
                    .text(role),
            ),
        )
        .child(
            el("td").text(
                user.department
                    .as_deref()
                    .filter(|d| !d.is_empty())
                    .unwrap_or("N/A"),
            ),
        )
        .child(el("td").child(el("span").class(status_class).text(status_text)))
        .child(el("td").text(format_date(user.created_at)))
        .child(
            el("td")
                .child(
                    action_button(TOGGLE_STATUS, &user.id)
                        .attr("data-current-status", user.is_active.to_string())
                        .attr("title", if user.is_active { "Deactivate" } else { "Activate" })
                        .child(icon(if user.is_active { "block" } else { "check_circle" })),
                )
                .child(
                    action_button(RESET_PASSWORD, &user.id)
                        .attr("title", "Reset Password")
                        .child(icon("lock_reset")),
                )
                .child(
                    action_button(DELETE_USER, &user.id)
                        .class("btn-action delete")
                        .attr("data-user-name", user.full_name.as_str())
                        .attr("title", "Delete User")
                        .child(icon("delete")),
                ),
        )
}

fn action_button(action: &str, user_id: &str) -> Element {
    el("button")
        .class("btn-action")
        .attr("data-action", action)
        .attr("data-user-id", user_id)
}

fn icon(name: &str) -> Element {
    el("span").class("material-symbols-outlined").text(name)
}

/// Hides every row whose text does not contain `term`, case-insensitively.
/// Returns how many rows stay visible.
pub fn filter_rows(body: &mut Node, term: &str) -> usize {
    let term = term.to_lowercase();
    let mut visible = 0;
    for row in body.elements_mut() {
        if row.text_content().to_lowercase().contains(&term) {
            row.remove_attr("hidden");
            visible += 1;
        } else {
            row.set_attr("hidden", "hidden");
        }
    }
    visible
}

/// Initials for the avatar: first letter of each name part, at most two.
pub fn initials(name: &str) -> String {
    let letters: String = name
        .split_whitespace()
        .filter_map(|part| part.chars().next())
        .collect();
    letters.to_uppercase().chars().take(2).collect()
}
