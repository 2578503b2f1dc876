use std::time::Duration;

use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::api::{ApiError, AuthToken, Authenticator};

use super::timer::ExpiryTimer;

/// Inactivity window for an admin session (5 minutes).
pub const SESSION_TIMEOUT: Duration = Duration::from_millis(300_000);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Credenciais inválidas.")]
    InvalidCredentials,

    #[error("Não foi possível contatar o servidor. Tente novamente mais tarde.")]
    Unavailable(String),

    #[error("Já existe uma sessão administrativa ativa.")]
    AlreadyLoggedIn,
}

/// Why a privileged session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutReason {
    Manual,
    Expired,
}

/// State changes announced to the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionTransition {
    EnteredPrivileged,
    LeftPrivileged(LogoutReason),
}

/// Privileged session data. The token exists only while logged in, so the
/// flag and the token cannot disagree.
#[derive(Debug, Default)]
struct Session {
    token: Option<AuthToken>,
}

impl Session {
    fn is_privileged(&self) -> bool {
        self.token.is_some()
    }
}

/// Owns the admin session and its inactivity timer.
///
/// All mutation goes through `login`, `logout`, `note_activity` and
/// `check_expiry`. Every transition bumps `epoch`, which callers stamp on
/// in-flight requests to detect responses from a previous session state.
pub struct SessionController {
    session: Session,
    timer: Option<ExpiryTimer>,
    idle_timeout: Duration,
    epoch: u64,
    next_generation: u64,
    fired_tx: mpsc::UnboundedSender<u64>,
    fired_rx: mpsc::UnboundedReceiver<u64>,
    transitions: mpsc::UnboundedSender<SessionTransition>,
}

impl SessionController {
    pub fn new(transitions: mpsc::UnboundedSender<SessionTransition>) -> Self {
        Self::with_timeout(SESSION_TIMEOUT, transitions)
    }

    pub fn with_timeout(
        idle_timeout: Duration,
        transitions: mpsc::UnboundedSender<SessionTransition>,
    ) -> Self {
        let (fired_tx, fired_rx) = mpsc::unbounded_channel();
        Self {
            session: Session::default(),
            timer: None,
            idle_timeout,
            epoch: 0,
            next_generation: 0,
            fired_tx,
            fired_rx,
            transitions,
        }
    }

    pub fn is_privileged(&self) -> bool {
        self.session.is_privileged()
    }

    pub fn token(&self) -> Option<&AuthToken> {
        self.session.token.as_ref()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// True when nothing has changed since `epoch` was observed.
    pub fn is_current(&self, epoch: u64) -> bool {
        self.epoch == epoch
    }

    pub fn has_timer(&self) -> bool {
        self.timer.is_some()
    }

    /// Time left before the session expires, if one is active.
    pub fn time_remaining(&self) -> Option<Duration> {
        self.timer.as_ref().map(ExpiryTimer::remaining)
    }

    /// Authenticate and enter privileged mode.
    pub async fn login<A: Authenticator>(
        &mut self,
        api: &A,
        username: &str,
        password: &str,
    ) -> Result<(), AuthError> {
        if self.is_privileged() {
            warn!("Login attempted while already privileged");
            return Err(AuthError::AlreadyLoggedIn);
        }

        match api.authenticate(username, password).await {
            Ok(token) => {
                self.session.token = Some(token);
                self.epoch += 1;
                self.rearm();
                info!(username, "Admin session started");
                self.emit(SessionTransition::EnteredPrivileged);
                Ok(())
            }
            Err(ApiError::AuthFailure) => {
                info!(username, "Admin login rejected");
                Err(AuthError::InvalidCredentials)
            }
            Err(e) => {
                warn!(username, error = %e, "Admin login failed");
                Err(AuthError::Unavailable(e.to_string()))
            }
        }
    }

    /// Leave privileged mode. Safe to call when already logged out.
    pub fn logout(&mut self) {
        self.end_session(LogoutReason::Manual);
    }

    /// Restart the inactivity window. Ignored while logged out.
    ///
    /// Activity reported after the deadline cannot revive the session: a due
    /// timer expires it first.
    pub fn note_activity(&mut self) {
        if self.check_expiry() {
            debug!("Activity arrived after the session deadline");
            return;
        }
        if self.is_privileged() {
            self.rearm();
        }
    }

    /// Drain timer fires and expire the session if the live timer elapsed.
    ///
    /// A live timer past its deadline counts as elapsed even if its fire has
    /// not been delivered yet. Returns true when this call ended the session.
    pub fn check_expiry(&mut self) -> bool {
        let mut due = false;
        while let Ok(generation) = self.fired_rx.try_recv() {
            let live = self.timer.as_ref().map(ExpiryTimer::generation);
            if live == Some(generation) {
                due = true;
            } else {
                debug!(generation, ?live, "Ignoring stale timer fire");
            }
        }
        due |= self.timer.as_ref().is_some_and(ExpiryTimer::is_due);

        if due && self.is_privileged() {
            info!("Admin session expired after inactivity");
            self.end_session(LogoutReason::Expired);
            return true;
        }
        false
    }

    fn end_session(&mut self, reason: LogoutReason) {
        // Cancel before clearing so no fire can outlive the session
        if let Some(timer) = self.timer.take() {
            timer.cancel();
        }
        if self.session.token.take().is_none() {
            return;
        }
        self.epoch += 1;
        if reason == LogoutReason::Manual {
            info!("Admin logged out");
        }
        self.emit(SessionTransition::LeftPrivileged(reason));
    }

    fn rearm(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.cancel();
        }
        self.next_generation += 1;
        self.timer = Some(ExpiryTimer::arm(
            self.idle_timeout,
            self.next_generation,
            self.fired_tx.clone(),
        ));
    }

    fn emit(&self, transition: SessionTransition) {
        if self.transitions.send(transition).is_err() {
            debug!(?transition, "No listener for session transition");
        }
    }
}
