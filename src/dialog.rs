//! Alert, confirm and prompt capability used by every controller.
//!
//! Controllers never look a dialog up on their own; they are handed a
//! [`Notifier`] which wraps an injected [`Dialog`] or, when none is given,
//! the blocking [`NativeDialog`].

use std::io::{self, BufRead, Write};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogKind {
    Success,
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogOptions {
    pub kind: DialogKind,
    pub title: Option<String>,
    pub message: String,
    pub confirm_text: Option<String>,
    pub cancel_text: Option<String>,
}

impl DialogOptions {
    pub fn new<S: Into<String>>(kind: DialogKind, message: S) -> Self {
        Self {
            kind,
            title: None,
            message: message.into(),
            confirm_text: None,
            cancel_text: None,
        }
    }

    pub fn title<S: Into<String>>(mut self, title: S) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn buttons<C: Into<String>, X: Into<String>>(mut self, confirm: C, cancel: X) -> Self {
        self.confirm_text = Some(confirm.into());
        self.cancel_text = Some(cancel.into());
        self
    }

    /// A dialog with a confirm button waits for an answer.
    pub fn asks(&self) -> bool {
        self.confirm_text.is_some()
    }
}

#[async_trait]
pub trait Dialog: Send + Sync {
    async fn success(&self, message: &str, title: Option<&str>);

    async fn error(&self, message: &str, title: Option<&str>);

    /// Resolves to true when the user accepted.
    async fn confirm(&self, message: &str, title: Option<&str>) -> bool;

    /// Generic dialog. Resolves to true when a confirmation was accepted,
    /// false for plain notices.
    async fn show(&self, options: DialogOptions) -> bool;

    async fn prompt(&self, message: &str) -> Option<String>;
}

/// Line-oriented alert/confirm/prompt on a terminal. Blocks the calling
/// task until the user answers.
pub struct NativeDialog {
    input: Mutex<Box<dyn BufRead + Send>>,
    output: Mutex<Box<dyn Write + Send>>,
}

impl NativeDialog {
    pub fn new(input: Box<dyn BufRead + Send>, output: Box<dyn Write + Send>) -> Self {
        Self {
            input: Mutex::new(input),
            output: Mutex::new(output),
        }
    }

    pub fn stdio() -> Self {
        Self::new(
            Box::new(io::BufReader::new(io::stdin())),
            Box::new(io::stderr()),
        )
    }

    fn alert(&self, message: &str, title: Option<&str>) {
        let line = match title {
            Some(title) => format!("{}: {}", title, message),
            None => message.to_string(),
        };
        self.write_line(&line, true);
    }

    fn ask(&self, question: &str) -> Option<String> {
        self.write_line(question, false);
        let mut answer = String::new();
        let mut input = self.input.lock().unwrap_or_else(PoisonError::into_inner);
        match input.read_line(&mut answer) {
            Ok(0) => None,
            Ok(_) => Some(answer.trim_end_matches(['\r', '\n']).to_string()),
            Err(err) => {
                log::error!("Failed to read dialog answer: {}", err);
                None
            }
        }
    }

    fn write_line(&self, line: &str, newline: bool) {
        let mut output = self.output.lock().unwrap_or_else(PoisonError::into_inner);
        let written = if newline {
            writeln!(output, "{}", line)
        } else {
            write!(output, "{} ", line)
        };
        if let Err(err) = written.and_then(|_| output.flush()) {
            log::error!("Failed to write dialog text: {}", err);
        }
    }
}

#[async_trait]
impl Dialog for NativeDialog {
    async fn success(&self, message: &str, title: Option<&str>) {
        self.alert(message, title);
    }

    async fn error(&self, message: &str, title: Option<&str>) {
        self.alert(message, title);
    }

    async fn confirm(&self, message: &str, title: Option<&str>) -> bool {
        let question = match title {
            Some(title) => format!("{}: {} [y/N]", title, message),
            None => format!("{} [y/N]", message),
        };
        self.ask(&question)
            .map(|answer| matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
            .unwrap_or(false)
    }

    async fn show(&self, options: DialogOptions) -> bool {
        if options.asks() {
            return self
                .confirm(&options.message, options.title.as_deref())
                .await;
        }
        self.alert(&options.message, options.title.as_deref());
        false
    }

    async fn prompt(&self, message: &str) -> Option<String> {
        self.ask(message).filter(|answer| !answer.is_empty())
    }
}

/// What the controllers talk to.
#[derive(Clone)]
pub struct Notifier {
    dialog: Arc<dyn Dialog>,
}

impl Notifier {
    /// Uses `dialog` when one is available, the native console otherwise.
    pub fn new(dialog: Option<Arc<dyn Dialog>>) -> Self {
        let dialog = dialog.unwrap_or_else(|| Arc::new(NativeDialog::stdio()));
        Self { dialog }
    }

    pub async fn success(&self, message: &str) {
        self.dialog.success(message, None).await;
    }

    pub async fn error(&self, message: &str) {
        self.dialog.error(message, None).await;
    }

    pub async fn show(&self, options: DialogOptions) -> bool {
        self.dialog.show(options).await
    }

    pub async fn prompt(&self, message: &str) -> Option<String> {
        self.dialog.prompt(message).await
    }

    /// Titled notice of any kind.
    pub async fn alert(&self, title: &str, message: &str, kind: DialogKind) {
        match kind {
            DialogKind::Success => self.dialog.success(message, Some(title)).await,
            DialogKind::Error => self.dialog.error(message, Some(title)).await,
            DialogKind::Warning | DialogKind::Info => {
                self.dialog
                    .show(DialogOptions::new(kind, message).title(title))
                    .await;
            }
        }
    }

    pub async fn confirm(&self, title: &str, message: &str) -> bool {
        self.dialog.confirm(message, Some(title)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuffer {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap_or_else(PoisonError::into_inner))
                .into_owned()
        }
    }

    fn native(answers: &str) -> (NativeDialog, SharedBuffer) {
        let output = SharedBuffer::default();
        let dialog = NativeDialog::new(
            Box::new(Cursor::new(answers.as_bytes().to_vec())),
            Box::new(output.clone()),
        );
        (dialog, output)
    }

    #[tokio::test]
    async fn native_confirm_accepts_yes() {
        let (dialog, output) = native("yes\n");
        assert!(dialog.confirm("Delete user?", Some("Confirm Action")).await);
        assert_eq!(output.contents(), "Confirm Action: Delete user? [y/N] ");
    }

    #[tokio::test]
    async fn native_show_keeps_the_title_when_asking() {
        let (dialog, output) = native("y\n");
        let options = DialogOptions::new(DialogKind::Warning, "Delete \"Mai Tran\"?")
            .title("Delete User")
            .buttons("Delete", "Cancel");
        assert!(dialog.show(options).await);
        assert_eq!(output.contents(), "Delete User: Delete \"Mai Tran\"? [y/N] ");
    }

    #[tokio::test]
    async fn native_confirm_defaults_to_no_on_eof() {
        let (dialog, _) = native("");
        assert!(!dialog.confirm("Delete user?", None).await);
    }

    #[tokio::test]
    async fn native_prompt_treats_blank_as_cancel() {
        let (dialog, _) = native("\n");
        assert_eq!(dialog.prompt("New password:").await, None);

        let (dialog, _) = native("hunter22\n");
        assert_eq!(dialog.prompt("New password:").await.as_deref(), Some("hunter22"));
    }

    #[tokio::test]
    async fn notifier_alert_prefixes_title_on_console() {
        let (dialog, output) = native("");
        let notifier = Notifier::new(Some(Arc::new(dialog)));
        notifier
            .alert("Logout", "You have been signed out", DialogKind::Success)
            .await;
        assert_eq!(output.contents(), "Logout: You have been signed out\n");
    }
}
