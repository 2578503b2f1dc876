//! User-visible notices.
//!
//! Every action boundary (login, search, add-agent) ends in exactly one
//! notice. Notices dismiss themselves after their lifetime; a new notice
//! replaces the current one.

use std::time::{Duration, Instant};

use crate::api::ApiError;
use crate::auth::{AuthError, LogoutReason};
use crate::models::{AgentRecord, ValidationError};

/// Default lifetime of a notice.
pub const DEFAULT_NOTICE_LIFETIME: Duration = Duration::from_millis(5_000);

/// The expiry notice stays up longer so a returning admin still sees it.
pub const EXPIRY_NOTICE_LIFETIME: Duration = Duration::from_millis(10_000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
    pub lifetime: Duration,
}

impl Notice {
    pub fn new(kind: NoticeKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            lifetime: DEFAULT_NOTICE_LIFETIME,
        }
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self::new(NoticeKind::Info, text)
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self::new(NoticeKind::Success, text)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(NoticeKind::Error, text)
    }

    pub fn with_lifetime(mut self, lifetime: Duration) -> Self {
        self.lifetime = lifetime;
        self
    }

    // ===== Session =====

    pub fn login_succeeded() -> Self {
        Self::success("Login Administrativo realizado com sucesso!")
    }

    pub fn login_failed(err: &AuthError) -> Self {
        Self::error(err.to_string())
    }

    pub fn logged_out(reason: LogoutReason) -> Self {
        match reason {
            LogoutReason::Manual => Self::info("Logout administrativo realizado."),
            LogoutReason::Expired => Self::error(
                "Sessão administrativa expirada por inatividade (5 minutos). \
                 Por favor, faça login novamente.",
            )
            .with_lifetime(EXPIRY_NOTICE_LIFETIME),
        }
    }

    // ===== Lookup =====

    pub fn empty_extension() -> Self {
        Self::error("Por favor, digite um número de Ramal.")
    }

    pub fn lookup_while_privileged() -> Self {
        Self::info("Faça logout do modo Admin para usar a busca de Agente.")
    }

    pub fn agent_found(record: &AgentRecord) -> Self {
        Self::success(format!(
            "Acessos encontrados para {}.",
            record.name_or_placeholder()
        ))
    }

    pub fn agent_not_found(extension: &str) -> Self {
        Self::error(format!(
            "Ramal {} não encontrado ou inativo. Verifique o número e tente novamente.",
            extension
        ))
    }

    pub fn lookup_failed() -> Self {
        Self::error(
            "Ocorreu um erro na comunicação com o servidor. Tente novamente mais tarde.",
        )
    }

    // ===== Add agent =====

    pub fn add_denied() -> Self {
        Self::error("Acesso negado. Faça login como administrador para adicionar um agente.")
    }

    pub fn draft_rejected(err: &ValidationError) -> Self {
        Self::error(err.to_string())
    }

    pub fn agent_added(record: &AgentRecord) -> Self {
        Self::success(format!(
            "SUCESSO! O Agente {} (Ramal {}) foi adicionado ao sistema.",
            record.display_name, record.extension
        ))
    }

    pub fn add_failed(err: &ApiError) -> Self {
        Self::error(format!("ERRO: {}", err.user_message()))
    }
}

/// Holds the single visible notice and drops it once its lifetime is over.
#[derive(Debug, Default)]
pub struct NoticeBoard {
    current: Option<(Notice, Instant)>,
}

impl NoticeBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&mut self, notice: Notice) {
        self.show_at(notice, Instant::now());
    }

    pub fn show_at(&mut self, notice: Notice, shown_at: Instant) {
        self.current = Some((notice, shown_at));
    }

    /// The notice still visible at `now`, if any.
    pub fn visible_at(&self, now: Instant) -> Option<&Notice> {
        self.current
            .as_ref()
            .filter(|(notice, shown_at)| now.saturating_duration_since(*shown_at) < notice.lifetime)
            .map(|(notice, _)| notice)
    }

    pub fn visible(&self) -> Option<&Notice> {
        self.visible_at(Instant::now())
    }

    /// Forget an expired notice. Returns true if something was dismissed.
    pub fn prune_at(&mut self, now: Instant) -> bool {
        if self.current.is_some() && self.visible_at(now).is_none() {
            self.current = None;
            return true;
        }
        false
    }

    pub fn clear(&mut self) {
        self.current = None;
    }
}
