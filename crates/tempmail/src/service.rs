//! Mailbox session orchestration
//!
//! [`MailboxService`] owns everything a front-end needs for one disposable
//! mailbox: the persisted session, the in-memory inbox, the expiry
//! countdown and the poll schedule. Front-ends drive it with one-second
//! ticks and render from its accessors; all provider traffic funnels
//! through here.

use anyhow::{Context, Result, bail};
use chrono::Utc;
use log::{info, warn};
use std::sync::Arc;

use crate::countdown::Countdown;
use crate::inbox::Inbox;
use crate::models::{MessageDetail, MessageId, MessageSummary};
use crate::poll::PollSchedule;
use crate::provider::{MailProvider, UnauthorizedError};
use crate::provision::provision_mailbox;
use crate::session::{Session, SessionStore};
use crate::settings::Settings;

/// Facade over one disposable mailbox
pub struct MailboxService {
    provider: Arc<dyn MailProvider>,
    store: Arc<dyn SessionStore>,
    settings: Settings,
    session: Option<Session>,
    inbox: Inbox,
    countdown: Countdown,
    schedule: PollSchedule,
}

impl MailboxService {
    /// Create a service; call [`start`](Self::start) before ticking
    pub fn new(
        provider: Arc<dyn MailProvider>,
        store: Arc<dyn SessionStore>,
        settings: Settings,
    ) -> Self {
        let countdown = Countdown::new(settings.mailbox_ttl_secs);
        let schedule = PollSchedule::new(settings.poll_interval_secs);
        Self {
            provider,
            store,
            settings,
            session: None,
            inbox: Inbox::new(),
            countdown,
            schedule,
        }
    }

    /// Restore the stored session, or provision a fresh mailbox.
    ///
    /// A restored session is polled once right away; if the provider
    /// rejects its token the credentials are discarded and the service is
    /// left without an account (provisioning happens on the next start or
    /// an explicit [`regenerate`](Self::regenerate)).
    pub fn start(&mut self) -> Result<()> {
        match self.store.load() {
            Ok(Some(session)) => {
                info!("Restored mailbox {}", session.account.address);
                self.session = Some(session);
                if self.schedule.begin_immediate(Utc::now()) {
                    let result = self.poll_once();
                    self.schedule.finish();
                    result?;
                }
                Ok(())
            }
            Ok(None) => self.provision_new(),
            Err(e) => {
                warn!("Failed to load stored session: {:#}", e);
                self.provision_new()
            }
        }
    }

    /// Discard the current mailbox (account, token and loaded messages)
    /// and provision a fresh one.
    pub fn regenerate(&mut self) -> Result<()> {
        self.store
            .clear()
            .context("Failed to discard stored session")?;
        self.session = None;
        self.inbox.clear();
        self.provision_new()
    }

    /// Advance one second: decrement the countdown and run the periodic
    /// poll when it is due. Returns newly arrived messages, if any.
    ///
    /// The periodic poll stops once the countdown expires; extending the
    /// countdown resumes it.
    pub fn tick(&mut self) -> Result<Vec<MessageSummary>> {
        self.countdown.tick();
        if self.countdown.is_expired() || self.session.is_none() {
            return Ok(Vec::new());
        }
        if !self.schedule.try_begin(Utc::now()) {
            return Ok(Vec::new());
        }
        let result = self.poll_once();
        self.schedule.finish();
        result
    }

    /// Poll right now (manual refresh), regardless of countdown state.
    /// Restarts the periodic cadence.
    pub fn refresh(&mut self) -> Result<Vec<MessageSummary>> {
        if self.session.is_none() {
            return Ok(Vec::new());
        }
        if !self.schedule.begin_immediate(Utc::now()) {
            return Ok(Vec::new());
        }
        let result = self.poll_once();
        self.schedule.finish();
        result
    }

    /// Fetch a message in full, flag it seen on the provider, and flip the
    /// list entry's seen flag without re-fetching the list.
    ///
    /// A failed seen-flag update is logged and ignored; the fetched detail
    /// is still returned.
    pub fn open_message(&mut self, id: &MessageId) -> Result<MessageDetail> {
        let Some(session) = &self.session else {
            bail!("No active mailbox");
        };

        let detail = self
            .provider
            .get_message(&session.token, id)
            .context("Failed to load message")?;

        if let Err(e) = self.provider.mark_seen(&session.token, id) {
            warn!("Failed to flag message {} as seen: {:#}", id.as_str(), e);
        }
        self.inbox.mark_seen(id);

        Ok(detail)
    }

    /// Add time to the countdown (display only; the provider keeps its own
    /// retention schedule)
    pub fn extend(&mut self, secs: u64) {
        self.countdown.extend(secs);
    }

    /// Stop the periodic poll for teardown
    pub fn stop(&mut self) {
        self.schedule.cancel();
    }

    /// Address of the active mailbox, if a session exists
    pub fn address(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.account.address.as_str())
    }

    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    /// Current message list in provider order
    pub fn messages(&self) -> &[MessageSummary] {
        self.inbox.messages()
    }

    pub fn unseen_count(&self) -> usize {
        self.inbox.unseen_count()
    }

    pub fn remaining_secs(&self) -> u64 {
        self.countdown.remaining_secs()
    }

    pub fn is_expired(&self) -> bool {
        self.countdown.is_expired()
    }

    /// Countdown formatted as "M:SS"
    pub fn countdown_display(&self) -> String {
        self.countdown.display()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    fn provision_new(&mut self) -> Result<()> {
        self.inbox.clear();
        let session = provision_mailbox(
            self.provider.as_ref(),
            &self.settings.local_part_prefix,
        )?;
        self.store
            .save(&session)
            .context("Failed to persist session")?;
        self.session = Some(session);
        self.countdown.reset(self.settings.mailbox_ttl_secs);
        if self.schedule.is_cancelled() {
            self.schedule.resume(Utc::now());
        }
        Ok(())
    }

    fn poll_once(&mut self) -> Result<Vec<MessageSummary>> {
        let Some(session) = &self.session else {
            return Ok(Vec::new());
        };

        match self.provider.list_messages(&session.token, 1) {
            Ok(messages) => Ok(self.inbox.replace(messages)),
            Err(e) if e.downcast_ref::<UnauthorizedError>().is_some() => {
                warn!("Provider rejected the bearer token; discarding stored credentials");
                self.store
                    .clear()
                    .context("Failed to clear stored session")?;
                self.session = None;
                Ok(Vec::new())
            }
            Err(e) => {
                // Transient or otherwise: keep the previous list
                warn!("Inbox poll failed: {:#}", e);
                Ok(Vec::new())
            }
        }
    }
}
