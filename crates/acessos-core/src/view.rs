/// Which panel the portal shows. Derived from the session, never stored
/// independently of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    AgentView,
    AdminView,
}

impl ViewMode {
    pub fn for_session(privileged: bool) -> Self {
        if privileged {
            ViewMode::AdminView
        } else {
            ViewMode::AgentView
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ViewMode::AgentView => "Consulta de Credenciais",
            ViewMode::AdminView => "Painel de Inclusão de Acessos",
        }
    }

    pub fn subtitle(&self) -> &'static str {
        match self {
            ViewMode::AgentView => "Consulte seus logins dos sistemas corporativos.",
            ViewMode::AdminView => "Adicione novos colaboradores e credenciais. (Sessão: 5 min)",
        }
    }

    /// Label of the admin toggle in this mode.
    pub fn admin_action(&self) -> &'static str {
        match self {
            ViewMode::AgentView => "Login Admin",
            ViewMode::AdminView => "Logout Admin",
        }
    }
}
