//! Scripted contact chat.
//!
//! [`ContactChat`] walks a visitor through name, email, subject and message
//! one prompt at a time, pacing each bot reply behind a typing indicator, and
//! posts the collected fields through a [`FormSubmitter`] once the message
//! step is answered. Every public operation runs to completion on the
//! caller's task; dropping an in-flight future cancels its pending delay and
//! request and republishes the snapshot with the typing indicator cleared.

pub mod conversation;
pub mod message;

pub use conversation::{Collected, ConversationState, QuickReply, Step, Transition, is_valid_email};
pub use message::{ChatMessage, Role, Transcript};

use rand::Rng;
use serde::Serialize;
use serde_json::json;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::sleep;

use crate::config::{ContactConfig, Pacing};
use crate::logger::Logger;
use crate::submission::{FormSubmitter, SubmitError};

const GREETING: &str = "Hi there! Thanks for stopping by. What's your name?";
const SUBJECT_PROMPT: &str =
    "Got it. What's this about? Pick one of the options below or type your own.";
const MESSAGE_PROMPT: &str = "Great. What would you like to tell me?";
const INVALID_EMAIL: &str =
    "Hmm, that doesn't look like a valid email address. Could you double-check it?";

/// What a single visitor turn did to the conversation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TurnOutcome {
    Ignored,
    Advanced(Step),
    EmailRejected,
    Submitted,
    SubmissionFailed,
}

/// Render-relevant view of the chat, published after every change.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSnapshot {
    pub activated: bool,
    pub step: Step,
    pub messages: Vec<ChatMessage>,
    pub typing: bool,
    pub input_enabled: bool,
    pub quick_replies: Vec<QuickReply>,
    pub collected: Collected,
    pub pending_error: Option<String>,
    /// Newest bot message; views scroll it into view.
    pub scroll_anchor: Option<String>,
}

pub struct ContactChat {
    state: ConversationState,
    transcript: Transcript,
    activated: bool,
    typing: bool,
    submitter: Arc<dyn FormSubmitter>,
    config: ContactConfig,
    logger: Logger,
    snapshots: watch::Sender<ChatSnapshot>,
}

impl ContactChat {
    pub fn new(config: ContactConfig, submitter: Arc<dyn FormSubmitter>, logger: Logger) -> Self {
        let state = ConversationState::new();
        let transcript = Transcript::default();
        let initial = build_snapshot(&state, &transcript, false, false);
        let (snapshots, _) = watch::channel(initial);
        Self {
            state,
            transcript,
            activated: false,
            typing: false,
            submitter,
            config,
            logger,
            snapshots,
        }
    }

    pub fn state(&self) -> &ConversationState {
        &self.state
    }

    pub fn messages(&self) -> &[ChatMessage] {
        self.transcript.messages()
    }

    pub fn is_activated(&self) -> bool {
        self.activated
    }

    pub fn snapshot(&self) -> ChatSnapshot {
        build_snapshot(&self.state, &self.transcript, self.activated, self.typing)
    }

    pub fn subscribe(&self) -> watch::Receiver<ChatSnapshot> {
        self.snapshots.subscribe()
    }

    /// Fired when the chat section first becomes visible. Only the first
    /// call that gets the greeting out starts the conversation; it returns
    /// `false` afterwards. A call dropped before the greeting lands leaves the
    /// chat inactive.
    pub async fn activate(&mut self) -> bool {
        self.typing = false;
        if self.activated {
            return false;
        }
        self.bot_reply(GREETING.to_string()).await;
        self.activated = true;
        self.publish();
        self.logger.info(
            "chat.activated",
            json!({ "step": self.state.current_step().as_str() }),
        );
        true
    }

    pub async fn submit(&mut self, text: &str) -> TurnOutcome {
        self.typing = false;
        if !self.activated {
            self.logger
                .debug("chat.input_before_activation", json!({ "length": text.len() }));
            return TurnOutcome::Ignored;
        }

        let transition = self.state.accept(text);
        if transition == Transition::Ignored {
            return TurnOutcome::Ignored;
        }

        self.transcript.push_user(text.trim());
        self.publish();

        match transition {
            Transition::Advanced { from, to } => {
                self.logger.info(
                    "chat.step_advanced",
                    json!({ "from": from.as_str(), "to": to.as_str() }),
                );
                let reply = self.prompt_for(to);
                self.bot_reply(reply).await;
                TurnOutcome::Advanced(to)
            }
            Transition::EmailRejected => {
                self.logger.info(
                    "chat.email_rejected",
                    json!({ "length": text.trim().len() }),
                );
                self.bot_reply(INVALID_EMAIL.to_string()).await;
                TurnOutcome::EmailRejected
            }
            Transition::Submit(submission) => {
                let mut chat = Typing::start(self);
                let submitter = chat.submitter.clone();
                let timeout = chat.config.submit_timeout;
                let send = async move {
                    match tokio::time::timeout(timeout, submitter.submit(&submission)).await {
                        Ok(result) => result,
                        Err(_) => Err(SubmitError::Timeout(timeout)),
                    }
                };
                let (result, _) = tokio::join!(send, sleep(chat.reply_delay()));
                chat.finish_submission(result)
            }
            Transition::Ignored => TurnOutcome::Ignored,
        }
    }

    /// Same as typing the option's label; only offered at the subject step.
    pub async fn choose_quick_reply(&mut self, option: QuickReply) -> TurnOutcome {
        if self.state.current_step() != Step::Subject {
            return TurnOutcome::Ignored;
        }
        self.submit(option.label()).await
    }

    /// "Send another message": drops the transcript and greets again.
    pub async fn start_over(&mut self) {
        if !self.activated {
            return;
        }
        self.state = ConversationState::new();
        self.transcript = Transcript::default();
        self.typing = false;
        self.publish();
        self.logger.info("chat.restarted", json!({}));
        self.bot_reply(GREETING.to_string()).await;
    }

    fn finish_submission(&mut self, result: Result<(), SubmitError>) -> TurnOutcome {
        let name = self.state.collected().name.clone().unwrap_or_default();
        match result {
            Ok(()) => {
                self.state.resolve_submission(Ok(()));
                self.logger.info(
                    "contact.submitted",
                    json!({ "subject": self.state.collected().subject }),
                );
                self.transcript.push_bot(format!(
                    "Thanks, {name}! Your message is on its way. I'll respond within one business day."
                ));
                TurnOutcome::Submitted
            }
            Err(error) => {
                self.logger.warn(
                    "contact.submit_failed",
                    json!({ "kind": error.kind(), "error": error.to_string() }),
                );
                self.state.resolve_submission(Err(error.to_string()));
                self.transcript.push_bot(format!(
                    "Sorry, something went wrong while sending your message. Please try again, or email me directly at {}.",
                    self.config.fallback_email
                ));
                TurnOutcome::SubmissionFailed
            }
        }
    }

    fn prompt_for(&self, step: Step) -> String {
        match step {
            Step::Name => GREETING.to_string(),
            Step::Email => {
                let name = self.state.collected().name.as_deref().unwrap_or("there");
                format!("Nice to meet you, {name}! What's the best email address to reach you at?")
            }
            Step::Subject => SUBJECT_PROMPT.to_string(),
            Step::Message => MESSAGE_PROMPT.to_string(),
            Step::Complete => String::new(),
        }
    }

    async fn bot_reply(&mut self, text: String) {
        let mut chat = Typing::start(self);
        sleep(chat.reply_delay()).await;
        chat.transcript.push_bot(text);
    }

    fn reply_delay(&self) -> Duration {
        sample_delay(&self.config.pacing)
    }

    fn publish(&self) {
        self.snapshots.send_replace(self.snapshot());
    }
}

/// Shows the typing indicator while held. Dropping it, whether the reply
/// landed or the future was cancelled, clears the indicator and publishes.
struct Typing<'a> {
    chat: &'a mut ContactChat,
}

impl<'a> Typing<'a> {
    fn start(chat: &'a mut ContactChat) -> Self {
        chat.typing = true;
        chat.publish();
        Self { chat }
    }
}

impl Deref for Typing<'_> {
    type Target = ContactChat;

    fn deref(&self) -> &ContactChat {
        self.chat
    }
}

impl DerefMut for Typing<'_> {
    fn deref_mut(&mut self) -> &mut ContactChat {
        self.chat
    }
}

impl Drop for Typing<'_> {
    fn drop(&mut self) {
        self.chat.typing = false;
        self.chat.publish();
    }
}

fn sample_delay(pacing: &Pacing) -> Duration {
    let min = pacing.reply_delay_min.as_millis() as u64;
    let max = pacing.reply_delay_max.as_millis() as u64;
    if max <= min {
        return pacing.reply_delay_min;
    }
    Duration::from_millis(rand::rng().random_range(min..=max))
}

fn build_snapshot(
    state: &ConversationState,
    transcript: &Transcript,
    activated: bool,
    typing: bool,
) -> ChatSnapshot {
    let step = state.current_step();
    ChatSnapshot {
        activated,
        step,
        messages: transcript.messages().to_vec(),
        typing,
        input_enabled: activated && !typing && state.accepts_input(),
        quick_replies: if step == Step::Subject && !typing {
            QuickReply::ALL.to_vec()
        } else {
            Vec::new()
        },
        collected: state.collected().clone(),
        pending_error: state.pending_error().map(str::to_string),
        scroll_anchor: transcript.last_bot().map(|message| message.id.clone()),
    }
}
