use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use mockable::DefaultClock;
use tokio::sync::Notify;

use schooldesk_portal::config::{Config, ConfigArgs};
use schooldesk_portal::countdown::COUNTDOWN_ELEMENT;
use schooldesk_portal::dialog::Notifier;
use schooldesk_portal::page::{Page, PageHost};
use schooldesk_portal::prescriptions::{
    self, CreateState, PrescriptionPage, AFFECTED_GRADE_FIELD, CATEGORY_FIELD, ISSUE_FIELD,
    NUMBER_OF_CASES_FIELD, TREND_FIELD,
};
use schooldesk_portal::profile::WELCOME_TITLE;
use schooldesk_portal::storage::save_token;
use schooldesk_portal::tabs::Tab;
use schooldesk_portal::users::{self, UsersPage};
use schooldesk_portal::views::prescriptions::SHOW_HISTORY_DETAIL;
use schooldesk_portal::views::users::{DELETE_USER, RESET_PASSWORD, TOGGLE_STATUS};

#[derive(Parser)]
#[command(name = "schooldesk")]
#[command(about = "Terminal host for the school administration portal", long_about = None)]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Store the bearer token sent with API requests
    Login { token: String },
    /// Manage portal users
    Users {
        #[command(subcommand)]
        command: UserCommands,
    },
    /// Weekly AI prescriptions
    Prescriptions {
        #[command(subcommand)]
        command: PrescriptionCommands,
    },
}

#[derive(Subcommand)]
enum UserCommands {
    /// Print the users table
    List {
        #[arg(long)]
        search: Option<String>,
    },
    /// Create a user with a temporary password
    Create {
        #[arg(long)]
        full_name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        username: String,
        #[arg(long)]
        role: String,
        #[arg(long, default_value = "")]
        department: String,
        #[arg(long)]
        password: String,
    },
    /// Activate or deactivate a user
    Toggle { user_id: String },
    /// Set a new temporary password
    ResetPassword { user_id: String },
    /// Delete a user
    Delete { user_id: String },
}

#[derive(Subcommand)]
enum PrescriptionCommands {
    /// Show whether a prescription can be created this week
    Status,
    /// Follow the weekly limit countdown, starting over when it runs out
    Watch,
    /// Print this week's prescription
    ThisWeek,
    /// Print past prescriptions
    History,
    /// Print one past prescription by its position in the history
    Show { index: usize },
    /// Ask for a new prescription
    Prescribe {
        #[arg(long)]
        issue: String,
        #[arg(long, default_value = "")]
        grade: String,
        #[arg(long, default_value = "")]
        cases: String,
        #[arg(long, default_value = "")]
        trend: String,
        #[arg(long, default_value = "")]
        category: String,
    },
}

/// Page host for a terminal: a reload request wakes whoever waits on it.
#[derive(Default)]
struct TerminalHost {
    reload: Notify,
}

impl PageHost for TerminalHost {
    fn reload(&self) {
        self.reload.notify_one();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();
    let cli = Cli::parse();

    let config = Config::from_args(cli.config).context("invalid portal configuration")?;
    log::info!("Using portal API at {}", config.api_base);

    match cli.command {
        Commands::Login { token } => {
            save_token(&config.token_file, &token)
                .await
                .with_context(|| {
                    format!("failed to store token in {}", config.token_file.display())
                })?;
            println!("Token saved to {}.", config.token_file.display());
        }
        Commands::Users { command } => run_users(&config, command).await?,
        Commands::Prescriptions { command } => run_prescriptions(&config, command).await?,
    }
    Ok(())
}

async fn run_users(config: &Config, command: UserCommands) -> anyhow::Result<()> {
    let api = schooldesk_portal::connect(config)?;
    let host = Arc::new(TerminalHost::default());
    let page = Page::new(host);
    let users = UsersPage::new(api, page.clone(), Notifier::new(None));
    users.mount().await;

    match command {
        UserCommands::List { search } => {
            if let Some(term) = search {
                let visible = users.search(&term);
                log::info!("{} rows match `{}`", visible, term);
            }
            if let Some(welcome) = page.read(|doc| doc.text(WELCOME_TITLE)) {
                println!("{}", welcome);
            }
            println!("{}", page.render(users::USERS_TABLE_BODY));
        }
        UserCommands::Create {
            full_name,
            email,
            username,
            role,
            department,
            password,
        } => {
            users.open_create_user_modal();
            page.update(|doc| {
                doc.set_value(users::FULL_NAME_FIELD, full_name);
                doc.set_value(users::EMAIL_FIELD, email);
                doc.set_value(users::USERNAME_FIELD, username);
                doc.set_value(users::ROLE_FIELD, role);
                doc.set_value(users::DEPARTMENT_FIELD, department);
                doc.set_value(users::PASSWORD_FIELD, password);
            });
            users.create_user().await?;
            println!("{}", page.render(users::USERS_TABLE_BODY));
        }
        UserCommands::Toggle { user_id } => click(&users, TOGGLE_STATUS, &user_id).await?,
        UserCommands::ResetPassword { user_id } => click(&users, RESET_PASSWORD, &user_id).await?,
        UserCommands::Delete { user_id } => click(&users, DELETE_USER, &user_id).await?,
    }
    Ok(())
}

async fn click(users: &Arc<UsersPage>, action: &str, user_id: &str) -> anyhow::Result<()> {
    if !users.click(action, user_id).await {
        bail!("No user with id `{}` is listed", user_id);
    }
    Ok(())
}

async fn run_prescriptions(config: &Config, command: PrescriptionCommands) -> anyhow::Result<()> {
    let api = schooldesk_portal::connect(config)?;
    let host = Arc::new(TerminalHost::default());

    if let PrescriptionCommands::Watch = command {
        loop {
            let page = Page::new(host.clone());
            let controller = PrescriptionPage::new(
                Arc::clone(&api),
                page.clone(),
                Notifier::new(None),
                Arc::new(DefaultClock),
            );
            controller.mount().await;
            println!("{}", page.render(prescriptions::STATUS_BANNER));
            if !controller.countdown().is_running().await {
                return Ok(());
            }

            let mut ticker = tokio::time::interval(Duration::from_secs(1));
            loop {
                tokio::select! {
                    _ = host.reload.notified() => break,
                    _ = ticker.tick() => {
                        if let Some(remaining) = page.read(|doc| doc.text(COUNTDOWN_ELEMENT)) {
                            println!("{}", remaining);
                        }
                    }
                }
            }
            log::info!("Countdown finished, reloading");
        }
    }

    let page = Page::new(host);
    let controller = PrescriptionPage::new(
        api,
        page.clone(),
        Notifier::new(None),
        Arc::new(DefaultClock),
    );
    controller.mount().await;

    match command {
        PrescriptionCommands::Status => {
            println!("{}", page.render(prescriptions::STATUS_BANNER));
        }
        PrescriptionCommands::ThisWeek => {
            println!("{}", page.render(prescriptions::CURRENT_WEEK_CONTENT));
        }
        PrescriptionCommands::History => {
            controller.switch_tab(Tab::History).await;
            println!("{}", page.render(prescriptions::HISTORY_CONTENT));
        }
        PrescriptionCommands::Show { index } => {
            controller.switch_tab(Tab::History).await;
            if !controller.click(SHOW_HISTORY_DETAIL, index).await {
                bail!("No prescription at position {} in the history", index);
            }
            println!("{}", page.render(prescriptions::RESULTS_CONTENT));
        }
        PrescriptionCommands::Prescribe {
            issue,
            grade,
            cases,
            trend,
            category,
        } => {
            controller.switch_tab(Tab::New).await;
            if page.read(|doc| doc.is_disabled(prescriptions::SUBMIT_BUTTON)) {
                controller.countdown().stop().await;
                bail!("A prescription has already been created this week");
            }
            page.update(|doc| {
                doc.set_value(ISSUE_FIELD, issue);
                doc.set_value(AFFECTED_GRADE_FIELD, grade);
                doc.set_value(NUMBER_OF_CASES_FIELD, cases);
                doc.set_value(TREND_FIELD, trend);
                doc.set_value(CATEGORY_FIELD, category);
            });
            if controller.prescribe().await == CreateState::Success {
                println!("{}", page.render(prescriptions::RESULTS_CONTENT));
            }
        }
        PrescriptionCommands::Watch => {}
    }
    controller.countdown().stop().await;
    Ok(())
}
