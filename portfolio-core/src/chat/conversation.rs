use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

use crate::submission::ContactSubmission;

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex should compile")
});

pub fn is_valid_email(value: &str) -> bool {
    EMAIL_REGEX.is_match(value)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    Name,
    Email,
    Subject,
    Message,
    Complete,
}

impl Step {
    pub fn as_str(&self) -> &'static str {
        match self {
            Step::Name => "name",
            Step::Email => "email",
            Step::Subject => "subject",
            Step::Message => "message",
            Step::Complete => "complete",
        }
    }
}

/// Predefined answers offered at the subject step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum QuickReply {
    Hiring,
    Collaboration,
    Question,
}

impl QuickReply {
    pub const ALL: [QuickReply; 3] = [
        QuickReply::Hiring,
        QuickReply::Collaboration,
        QuickReply::Question,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            QuickReply::Hiring => "Hiring",
            QuickReply::Collaboration => "Collaboration",
            QuickReply::Question => "Question",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Collected {
    pub name: Option<String>,
    pub email: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
}

impl Collected {
    fn to_submission(&self) -> ContactSubmission {
        ContactSubmission {
            name: self.name.clone().unwrap_or_default(),
            email: self.email.clone().unwrap_or_default(),
            subject: self.subject.clone().unwrap_or_default(),
            message: self.message.clone().unwrap_or_default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Transition {
    /// Blank input, or input after completion. Nothing is recorded.
    Ignored,
    Advanced { from: Step, to: Step },
    EmailRejected,
    /// The message step was answered; the submission must be sent and its
    /// outcome reported through [`ConversationState::resolve_submission`].
    Submit(ContactSubmission),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConversationState {
    current_step: Step,
    collected: Collected,
    pending_error: Option<String>,
}

impl Default for ConversationState {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationState {
    pub fn new() -> Self {
        Self {
            current_step: Step::Name,
            collected: Collected::default(),
            pending_error: None,
        }
    }

    pub fn current_step(&self) -> Step {
        self.current_step
    }

    pub fn collected(&self) -> &Collected {
        &self.collected
    }

    pub fn pending_error(&self) -> Option<&str> {
        self.pending_error.as_deref()
    }

    pub fn accepts_input(&self) -> bool {
        self.current_step != Step::Complete
    }

    pub fn accept(&mut self, input: &str) -> Transition {
        let value = input.trim();
        if value.is_empty() || !self.accepts_input() {
            return Transition::Ignored;
        }

        let from = self.current_step;
        match from {
            Step::Name => {
                self.collected.name = Some(value.to_string());
                self.advance(Step::Email)
            }
            Step::Email if is_valid_email(value) => {
                self.collected.email = Some(value.to_string());
                self.advance(Step::Subject)
            }
            Step::Email => {
                self.pending_error = Some(format!("\"{value}\" is not a valid email address"));
                Transition::EmailRejected
            }
            Step::Subject => {
                self.collected.subject = Some(value.to_string());
                self.advance(Step::Message)
            }
            Step::Message => {
                self.collected.message = Some(value.to_string());
                self.pending_error = None;
                Transition::Submit(self.collected.to_submission())
            }
            Step::Complete => Transition::Ignored,
        }
    }

    /// Applies the outcome of the submission emitted by the message step.
    pub fn resolve_submission(&mut self, result: Result<(), String>) -> Transition {
        if self.current_step != Step::Message {
            return Transition::Ignored;
        }
        match result {
            Ok(()) => self.advance(Step::Complete),
            Err(reason) => {
                self.pending_error = Some(reason);
                Transition::Ignored
            }
        }
    }

    fn advance(&mut self, to: Step) -> Transition {
        let from = self.current_step;
        self.current_step = to;
        self.pending_error = None;
        Transition::Advanced { from, to }
    }
}
