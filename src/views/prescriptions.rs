use chrono::{DateTime, Utc};

use crate::countdown::COUNTDOWN_ELEMENT;
use crate::markup::{el, fragment, Element, Node};
use crate::models::{AvailabilityStatus, History, PrescriptionRecord, SolutionStep, ThisWeek};
use crate::views::{empty_state, format_date, format_timestamp};

pub const SHOW_HISTORY_DETAIL: &str = "showHistoryDetail";

pub fn render_status_banner(status: &AvailabilityStatus, today: DateTime<Utc>) -> Node {
    if status.allowed {
        return el("div")
            .class("status-banner available")
            .child(el("h2").text("✅ Ready to Prescribe"))
            .child(el("p").text("You can create a prescription for this week!"))
            .child(
                el("p")
                    .class("status-date")
                    .text(format!("Week of {}", format_date(today))),
            )
            .into();
    }

    let last = status
        .last_prescription_date
        .map(format_timestamp)
        .unwrap_or_else(|| "unknown".to_string());
    let week = status
        .current_week
        .as_ref()
        .map(|week| format!("{} - {}", format_date(week.start), format_date(week.end)))
        .unwrap_or_else(|| "unknown".to_string());

    el("div")
        .class("status-banner blocked")
        .child(el("h2").text("⛔ Weekly Limit Reached"))
        .child(el("p").text("A prescription has already been created this week"))
        .child(
            el("div")
                .class("countdown")
                .id(COUNTDOWN_ELEMENT)
                .text("Calculating..."),
        )
        .child(el("p").class("countdown-label").text("Until next prescription"))
        .child(
            el("p")
                .class("status-info")
                .text(format!("Last prescription: {}", last))
                .child(el("br"))
                .text(format!("Current week: {}", week)),
        )
        .into()
}

/// Detail card for one prescription. Used for fresh results and for history
/// entries alike.
pub fn render_prescription(p: &PrescriptionRecord) -> Node {
    let severity = p.solution.severity.as_str();
    let mut card = el("div")
        .class("prescription-card")
        .child(
            el("div")
                .class("week-info")
                .child(el("strong").text(format!("📅 Week {} ({})", p.week, p.year)))
                .child(
                    el("span")
                        .class("week-date")
                        .text(format!("Prescribed on {}", format_timestamp(p.timestamp))),
                ),
        )
        .child(el("h2").class("issue-title").text(format!("📋 {}", p.issue)))
        .child(
            el("span")
                .class(format!("severity-badge severity-{}", severity))
                .text(format!("🚨 {} Severity", severity.to_uppercase())),
        )
        .child(
            el("div")
                .class("root-cause")
                .child(el("strong").text("📌 Root Cause:"))
                .child(el("p").text(p.solution.root_cause.as_str())),
        )
        .child(el("h3").text("💡 Solutions"))
        .children(
            p.solution
                .solutions
                .iter()
                .enumerate()
                .map(|(i, solution)| solution_card(i + 1, solution)),
        );

    if let Some(wins) = p.solution.quick_wins.as_ref().filter(|w| !w.is_empty()) {
        card = card.child(
            el("div")
                .class("quick-wins")
                .child(el("h4").text("⚡ Quick Wins"))
                .child(el("ul").children(wins.iter().map(|win| el("li").text(win.as_str())))),
        );
    }
    card.into()
}

fn solution_card(number: usize, solution: &SolutionStep) -> Element {
    el("div")
        .class("solution-card")
        .child(el("h4").text(format!("{}. {}", number, solution.title)))
        .child(
            el("ul")
                .class("steps-list")
                .children(solution.steps.iter().map(|step| el("li").text(step.as_str()))),
        )
        .child(
            el("div")
                .class("impact")
                .child(el("strong").text("Impact:"))
                .text(format!(" {}", solution.impact)),
        )
}

pub fn render_this_week(this_week: &ThisWeek) -> Node {
    match (this_week.success, &this_week.prescription) {
        (true, Some(prescription)) => render_prescription(prescription),
        _ => empty_state(
            "📭 No Prescription Yet",
            "Create one in the \"New Prescription\" tab!",
        ),
    }
}

pub fn render_history(history: &History) -> Node {
    if history.prescriptions.is_empty() {
        return empty_state(
            "📭 No History Yet",
            "Your prescription history will appear here",
        );
    }

    let title: Node = el("h3")
        .class("history-title")
        .text(format!("📚 Past Prescriptions ({})", history.total))
        .into();
    fragment(
        std::iter::once(title).chain(
            history
                .prescriptions
                .iter()
                .enumerate()
                .map(|(index, p)| Node::from(history_item(index, p))),
        ),
    )
}

fn history_item(index: usize, p: &PrescriptionRecord) -> Element {
    let severity = p.solution.severity.as_str();
    el("div")
        .class("history-item")
        .attr("data-action", SHOW_HISTORY_DETAIL)
        .attr("data-index", index.to_string())
        .child(
            el("div")
                .class("history-header")
                .child(
                    el("span")
                        .class("history-week")
                        .text(format!("Week {} ({})", p.week, p.year)),
                )
                .child(el("span").class("history-date").text(format_date(p.timestamp))),
        )
        .child(el("div").class("history-issue").text(p.issue.as_str()))
        .child(
            el("div")
                .class("history-meta")
                .child(
                    el("span")
                        .class(format!("severity-badge severity-{}", severity))
                        .text(severity.to_uppercase()),
                )
                .child(el("span").class("history-cost").text(format!("Cost: ${}", p.cost))),
        )
}
