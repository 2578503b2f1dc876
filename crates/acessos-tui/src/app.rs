//! Application state management for the credential portal.
//!
//! `App` ties the session controller to the terminal front-end: it holds the
//! form state of both panels, dispatches network calls as background tasks,
//! and reacts to session transitions by switching the view.

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use acessos_core::api::{ApiClient, ApiError, LookupOutcome};
use acessos_core::auth::{SessionController, SessionTransition};
use acessos_core::models::{AgentDraft, AgentRecord};
use acessos_core::notice::{Notice, NoticeBoard};
use acessos_core::view::ViewMode;
use acessos_core::Config;

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background task message channel.
/// At most one lookup and one add are in flight, so this never fills.
const CHANNEL_BUFFER_SIZE: usize = 8;

/// Maximum length for username input.
const MAX_USERNAME_LENGTH: usize = 50;

/// Maximum length for password and other free-text input.
/// 128 chars accommodates password managers and passphrases.
const MAX_TEXT_LENGTH: usize = 128;

/// Maximum number of digits in an extension.
const MAX_EXTENSION_LENGTH: usize = 10;

// ============================================================================
// UI State Types
// ============================================================================

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    ShowingHelp,
    LoggingIn,
    ConfirmingQuit,
    Quitting,
}

/// Login form focus state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginFocus {
    Username,
    Password,
    Button,
}

/// Fields of the add-agent form, in tab order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Extension,
    Name,
    ChannelsUser,
    GestaoUser,
    BlipUser,
    Email,
    ChannelsPass,
    GestaoPass,
    BlipPass,
    Submit,
}

impl FormField {
    pub const ALL: [FormField; 10] = [
        FormField::Extension,
        FormField::Name,
        FormField::ChannelsUser,
        FormField::GestaoUser,
        FormField::BlipUser,
        FormField::Email,
        FormField::ChannelsPass,
        FormField::GestaoPass,
        FormField::BlipPass,
        FormField::Submit,
    ];

    fn index(&self) -> usize {
        Self::ALL.iter().position(|f| f == self).unwrap_or(0)
    }

    /// Get the next field (wrapping around)
    pub fn next(&self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    /// Get the previous field (wrapping around)
    pub fn prev(&self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    pub fn label(&self) -> &'static str {
        match self {
            FormField::Extension => "Ramal",
            FormField::Name => "Nome",
            FormField::ChannelsUser => "Channels (Usuário)",
            FormField::GestaoUser => "Gestão (Usuário)",
            FormField::BlipUser => "Blip (Usuário)",
            FormField::Email => "Email",
            FormField::ChannelsPass => "Channels (Senha)",
            FormField::GestaoPass => "Gestão (Senha)",
            FormField::BlipPass => "Blip (Senha)",
            FormField::Submit => "Adicionar Agente",
        }
    }

    pub fn is_secret(&self) -> bool {
        matches!(
            self,
            FormField::ChannelsPass | FormField::GestaoPass | FormField::BlipPass
        )
    }

    /// The draft string backing this field; `Submit` has none.
    pub fn value<'a>(&self, draft: &'a AgentDraft) -> Option<&'a String> {
        match self {
            FormField::Extension => Some(&draft.extension),
            FormField::Name => Some(&draft.name),
            FormField::ChannelsUser => Some(&draft.channels_user),
            FormField::GestaoUser => Some(&draft.gestao_user),
            FormField::BlipUser => Some(&draft.blip_user),
            FormField::Email => Some(&draft.email),
            FormField::ChannelsPass => Some(&draft.channels_pass),
            FormField::GestaoPass => Some(&draft.gestao_pass),
            FormField::BlipPass => Some(&draft.blip_pass),
            FormField::Submit => None,
        }
    }

    pub fn value_mut<'a>(&self, draft: &'a mut AgentDraft) -> Option<&'a mut String> {
        match self {
            FormField::Extension => Some(&mut draft.extension),
            FormField::Name => Some(&mut draft.name),
            FormField::ChannelsUser => Some(&mut draft.channels_user),
            FormField::GestaoUser => Some(&mut draft.gestao_user),
            FormField::BlipUser => Some(&mut draft.blip_user),
            FormField::Email => Some(&mut draft.email),
            FormField::ChannelsPass => Some(&mut draft.channels_pass),
            FormField::GestaoPass => Some(&mut draft.gestao_pass),
            FormField::BlipPass => Some(&mut draft.blip_pass),
            FormField::Submit => None,
        }
    }
}

// ============================================================================
// Background Task Results
// ============================================================================

/// Results sent back from spawned network calls.
///
/// Each carries the session epoch observed when the call was dispatched, so
/// a response that outlived a login or logout can be recognised.
#[derive(Debug)]
pub enum TaskResult {
    Lookup {
        epoch: u64,
        extension: String,
        outcome: Result<LookupOutcome, ApiError>,
    },
    AddRecord {
        epoch: u64,
        record: AgentRecord,
        outcome: Result<(), ApiError>,
    },
}

/// A record currently on screen, with the extension the agent typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayedRecord {
    pub extension: String,
    pub record: AgentRecord,
}

// ============================================================================
// Main Application Struct
// ============================================================================

pub struct App {
    // Core services
    pub api: ApiClient,
    pub session: SessionController,
    transitions_rx: mpsc::UnboundedReceiver<SessionTransition>,

    // UI State
    pub state: AppState,
    pub view: ViewMode,
    pub notices: NoticeBoard,

    // Agent panel
    pub extension_input: String,
    pub lookup_in_flight: bool,
    pub lookup_result: Option<DisplayedRecord>,

    // Admin panel
    pub draft: AgentDraft,
    pub form_focus: FormField,
    pub add_in_flight: bool,

    // Login form state
    pub login_username: String,
    pub login_password: String,
    pub login_focus: LoginFocus,
    pub login_error: Option<String>,

    // Background task channel
    task_rx: mpsc::Receiver<TaskResult>,
    task_tx: mpsc::Sender<TaskResult>,
}

impl App {
    /// Create a new application instance
    pub fn new(config: Config) -> Result<Self> {
        let base = config.api_base()?;
        debug!(%base, "API base resolved");
        let api = ApiClient::new(base)?;

        let (transitions_tx, transitions_rx) = mpsc::unbounded_channel();
        let session = SessionController::new(transitions_tx);
        let (task_tx, task_rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        let login_username = config.admin_username.unwrap_or_default();

        Ok(Self {
            api,
            session,
            transitions_rx,

            state: AppState::Normal,
            view: ViewMode::AgentView,
            notices: NoticeBoard::new(),

            extension_input: String::new(),
            lookup_in_flight: false,
            lookup_result: None,

            draft: AgentDraft::default(),
            form_focus: FormField::Extension,
            add_in_flight: false,

            login_username,
            login_password: String::new(),
            login_focus: LoginFocus::Username,
            login_error: None,

            task_rx,
            task_tx,
        })
    }

    /// Any key press, mouse movement or click while the admin is logged in
    /// restarts the inactivity window.
    pub fn note_activity(&mut self) {
        self.session.note_activity();
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    /// Admin button: log out when privileged, otherwise open the login form.
    pub fn toggle_admin(&mut self) {
        if self.session.is_privileged() {
            self.session.logout();
        } else {
            self.start_login();
        }
    }

    /// Start the login process (show login overlay)
    pub fn start_login(&mut self) {
        self.state = AppState::LoggingIn;
        self.login_focus = if self.login_username.is_empty() {
            LoginFocus::Username
        } else {
            LoginFocus::Password
        };
        self.login_error = None;
    }

    pub fn cancel_login(&mut self) {
        self.login_password.clear();
        self.login_error = None;
        self.state = AppState::Normal;
    }

    /// Attempt login with the credentials from the login form
    pub async fn attempt_login(&mut self) {
        if self.session.is_privileged() {
            // The login form is unreachable while privileged
            self.state = AppState::Normal;
            return;
        }

        let username = self.login_username.trim().to_string();
        let password = self.login_password.clone();

        if username.is_empty() || password.is_empty() {
            self.login_error = Some("Informe usuário e senha.".to_string());
            return;
        }

        self.login_error = None;

        match self.session.login(&self.api, &username, &password).await {
            Ok(()) => {
                self.login_password.clear();
                self.state = AppState::Normal;
            }
            Err(e) => {
                let notice = Notice::login_failed(&e);
                self.login_error = Some(notice.text.clone());
                self.notices.show(notice);
            }
        }
    }

    // =========================================================================
    // Agent lookup
    // =========================================================================

    pub fn push_extension_char(&mut self, c: char) {
        if can_add_extension_char(self.extension_input.len(), c) {
            self.extension_input.push(c);
        }
    }

    /// Search for the typed extension in the background.
    pub fn submit_search(&mut self) {
        if self.lookup_in_flight {
            return;
        }

        let extension = self.extension_input.trim().to_string();

        self.lookup_result = None;
        self.notices.clear();

        if extension.is_empty() {
            self.notices.show(Notice::empty_extension());
            return;
        }

        if self.session.is_privileged() {
            self.notices.show(Notice::lookup_while_privileged());
            return;
        }

        self.lookup_in_flight = true;
        let epoch = self.session.epoch();
        let api = self.api.clone();
        let tx = self.task_tx.clone();

        debug!(%extension, epoch, "Dispatching lookup");
        tokio::spawn(async move {
            let outcome = api.lookup(&extension).await;
            Self::send_result(&tx, TaskResult::Lookup { epoch, extension, outcome }).await;
        });
    }

    // =========================================================================
    // Admin: add agent
    // =========================================================================

    pub fn push_form_char(&mut self, c: char) {
        let field = self.form_focus;
        if let Some(value) = field.value_mut(&mut self.draft) {
            let allowed = if field == FormField::Extension {
                can_add_extension_char(value.len(), c)
            } else {
                can_add_text_char(value.len(), c)
            };
            if allowed {
                value.push(c);
            }
        }
    }

    pub fn pop_form_char(&mut self) {
        if let Some(value) = self.form_focus.value_mut(&mut self.draft) {
            value.pop();
        }
    }

    /// Validate the draft and submit it in the background.
    pub fn submit_draft(&mut self) {
        let token = match (self.session.is_privileged(), self.session.token()) {
            (true, Some(token)) => token.clone(),
            _ => {
                self.notices.show(Notice::add_denied());
                return;
            }
        };

        if self.add_in_flight {
            return;
        }

        self.session.note_activity();

        let record = match self.draft.validate() {
            Ok(record) => record,
            Err(e) => {
                debug!(error = %e, "Draft rejected before submit");
                self.notices.show(Notice::draft_rejected(&e));
                return;
            }
        };

        self.add_in_flight = true;
        let epoch = self.session.epoch();
        let api = self.api.clone();
        let tx = self.task_tx.clone();

        info!(extension = record.extension, "Submitting new agent");
        tokio::spawn(async move {
            let outcome = api.add_record(&record, &token).await;
            Self::send_result(&tx, TaskResult::AddRecord { epoch, record, outcome }).await;
        });
    }

    fn reset_draft(&mut self) {
        self.draft = AgentDraft::default();
        self.form_focus = FormField::Extension;
    }

    // =========================================================================
    // Background processing
    // =========================================================================

    /// Send a result to the main loop, logging if the channel is closed.
    async fn send_result(tx: &mpsc::Sender<TaskResult>, result: TaskResult) {
        if tx.send(result).await.is_err() {
            debug!("Receiver dropped before task result was delivered");
        }
    }

    /// Per-tick housekeeping: timer fires, session transitions, task
    /// results and notice expiry.
    pub fn check_background_tasks(&mut self) {
        self.session.check_expiry();

        while let Ok(transition) = self.transitions_rx.try_recv() {
            self.apply_transition(transition);
        }

        let mut results = Vec::new();
        while let Ok(result) = self.task_rx.try_recv() {
            results.push(result);
        }
        for result in results {
            self.process_task_result(result);
        }

        self.notices.prune_at(std::time::Instant::now());
    }

    /// React to a session state change: pick the view and tell the user.
    fn apply_transition(&mut self, transition: SessionTransition) {
        self.view = ViewMode::for_session(self.session.is_privileged());
        // Whatever was on screen belonged to the previous mode
        self.lookup_result = None;

        match transition {
            SessionTransition::EnteredPrivileged => {
                self.state = AppState::Normal;
                self.notices.show(Notice::login_succeeded());
            }
            SessionTransition::LeftPrivileged(reason) => {
                self.reset_draft();
                if self.state == AppState::LoggingIn {
                    self.state = AppState::Normal;
                }
                self.notices.show(Notice::logged_out(reason));
            }
        }
    }

    fn process_task_result(&mut self, result: TaskResult) {
        match result {
            TaskResult::Lookup {
                epoch,
                extension,
                outcome,
            } => {
                self.lookup_in_flight = false;

                if !self.session.is_current(epoch) || self.view != ViewMode::AgentView {
                    debug!(%extension, epoch, current = self.session.epoch(), "Dropping stale lookup result");
                    return;
                }

                match outcome {
                    Ok(LookupOutcome::Found(record)) => {
                        self.notices.show(Notice::agent_found(&record));
                        self.lookup_result = Some(DisplayedRecord { extension, record });
                    }
                    Ok(LookupOutcome::NotFound) => {
                        self.notices.show(Notice::agent_not_found(&extension));
                    }
                    Err(e) => {
                        warn!(%extension, error = %e, "Lookup failed");
                        self.notices.show(Notice::lookup_failed());
                    }
                }
            }
            TaskResult::AddRecord {
                epoch,
                record,
                outcome,
            } => {
                self.add_in_flight = false;
                let current = self.session.is_current(epoch);

                match outcome {
                    Ok(()) => {
                        info!(extension = record.extension, "Agent added");
                        self.notices.show(Notice::agent_added(&record));
                        if current {
                            self.reset_draft();
                        }
                    }
                    Err(e) => {
                        self.notices.show(Notice::add_failed(&e));
                    }
                }
            }
        }
    }
}

// ============================================================================
// Input validation helpers (exported for use in input.rs)
// ============================================================================

/// Check if a character is valid for input (no control characters)
fn is_valid_input_char(c: char) -> bool {
    !c.is_control()
}

/// Check if a username character should be accepted
pub fn can_add_username_char(current_len: usize, c: char) -> bool {
    current_len < MAX_USERNAME_LENGTH && is_valid_input_char(c)
}

/// Check if a password or free-text character should be accepted
pub fn can_add_text_char(current_len: usize, c: char) -> bool {
    current_len < MAX_TEXT_LENGTH && is_valid_input_char(c)
}

/// Extensions are digits only
pub fn can_add_extension_char(current_len: usize, c: char) -> bool {
    current_len < MAX_EXTENSION_LENGTH && c.is_ascii_digit()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use acessos_core::api::{AuthToken, Authenticator};
    use acessos_core::models::SystemUsernames;
    use acessos_core::notice::NoticeKind;

    struct FakeAuth;

    impl Authenticator for FakeAuth {
        async fn authenticate(&self, _username: &str, password: &str) -> Result<AuthToken, ApiError> {
            if password == "right" {
                Ok(AuthToken::new("jwt").expect("token"))
            } else {
                Err(ApiError::AuthFailure)
            }
        }
    }

    fn app() -> App {
        App::new(Config::default()).expect("app")
    }

    async fn admin_app() -> App {
        let mut app = app();
        app.session.login(&FakeAuth, "admin", "right").await.expect("login");
        app.check_background_tasks();
        app
    }

    fn record(extension: u64) -> AgentRecord {
        AgentRecord {
            extension,
            display_name: "João Silva".to_string(),
            usernames: SystemUsernames::default(),
            email: String::new(),
            unified_password: "abc123".to_string(),
        }
    }

    fn notice_text(app: &App) -> Option<String> {
        app.notices.visible().map(|n| n.text.clone())
    }

    // -------------------------------------------------------------------------
    // FormField Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_form_field_cycle() {
        assert_eq!(FormField::Extension.next(), FormField::Name);
        assert_eq!(FormField::BlipPass.next(), FormField::Submit);
        assert_eq!(FormField::Submit.next(), FormField::Extension); // Wraps around
        assert_eq!(FormField::Extension.prev(), FormField::Submit); // Wraps around
        assert_eq!(FormField::Name.prev(), FormField::Extension);
    }

    #[test]
    fn test_form_field_secret() {
        assert!(FormField::GestaoPass.is_secret());
        assert!(!FormField::GestaoUser.is_secret());
        assert!(FormField::Submit.value(&AgentDraft::default()).is_none());
    }

    // -------------------------------------------------------------------------
    // Session / view Tests
    // -------------------------------------------------------------------------

    #[tokio::test(start_paused = true)]
    async fn test_login_switches_to_admin_view() {
        let app = admin_app().await;
        assert_eq!(app.view, ViewMode::AdminView);
        assert!(app.session.has_timer());
        assert_eq!(
            notice_text(&app).as_deref(),
            Some("Login Administrativo realizado com sucesso!")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_toggle_admin_logs_out() {
        let mut app = admin_app().await;
        app.draft.name = "rascunho".to_string();
        app.toggle_admin();
        app.check_background_tasks();

        assert_eq!(app.view, ViewMode::AgentView);
        assert!(app.draft.name.is_empty());
        assert_eq!(notice_text(&app).as_deref(), Some("Logout administrativo realizado."));

        // Logged out: the toggle opens the login form instead
        app.toggle_admin();
        assert_eq!(app.state, AppState::LoggingIn);
    }

    #[tokio::test(start_paused = true)]
    async fn test_inactivity_returns_to_agent_view() {
        let mut app = admin_app().await;

        tokio::time::sleep(Duration::from_millis(300_001)).await;
        app.check_background_tasks();

        assert_eq!(app.view, ViewMode::AgentView);
        assert!(!app.session.is_privileged());
        let notice = app.notices.visible().expect("expiry notice");
        assert_eq!(notice.kind, NoticeKind::Error);
        assert!(notice.text.contains("expirada por inatividade"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_activity_defers_expiry() {
        let mut app = admin_app().await;

        tokio::time::sleep(Duration::from_millis(250_000)).await;
        app.note_activity();
        tokio::time::sleep(Duration::from_millis(250_000)).await;
        app.check_background_tasks();

        assert_eq!(app.view, ViewMode::AdminView);
    }

    #[tokio::test(start_paused = true)]
    async fn test_key_after_deadline_still_logs_out() {
        let mut app = admin_app().await;

        tokio::time::sleep(Duration::from_millis(300_050)).await;
        app.note_activity();
        app.check_background_tasks();

        assert_eq!(app.view, ViewMode::AgentView);
        assert!(!app.session.is_privileged());
        assert!(notice_text(&app).unwrap().contains("expirada por inatividade"));
    }

    // -------------------------------------------------------------------------
    // Lookup Tests
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_search_ignored_while_lookup_in_flight() {
        let mut app = app();
        app.lookup_in_flight = true;
        app.extension_input = "1234".to_string();
        app.lookup_result = Some(DisplayedRecord {
            extension: "1234".to_string(),
            record: record(1234),
        });
        app.notices.show(Notice::agent_found(&record(1234)));

        app.submit_search();
        tokio::task::yield_now().await;

        assert!(app.lookup_in_flight);
        assert!(app.lookup_result.is_some());
        assert_eq!(
            notice_text(&app).as_deref(),
            Some("Acessos encontrados para João Silva.")
        );
        assert!(app.task_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_empty_search_is_rejected_locally() {
        let mut app = app();
        app.extension_input = "   ".to_string();
        app.submit_search();

        assert!(!app.lookup_in_flight);
        assert_eq!(
            notice_text(&app).as_deref(),
            Some("Por favor, digite um número de Ramal.")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_search_while_admin_is_refused() {
        let mut app = admin_app().await;
        app.extension_input = "1234".to_string();
        app.submit_search();

        assert!(!app.lookup_in_flight);
        assert_eq!(
            notice_text(&app).as_deref(),
            Some("Faça logout do modo Admin para usar a busca de Agente.")
        );
    }

    #[tokio::test]
    async fn test_lookup_results_render() {
        let mut app = app();
        let epoch = app.session.epoch();

        app.process_task_result(TaskResult::Lookup {
            epoch,
            extension: "1234".to_string(),
            outcome: Ok(LookupOutcome::Found(record(1234))),
        });
        assert_eq!(app.lookup_result.as_ref().map(|d| d.extension.as_str()), Some("1234"));
        assert_eq!(
            notice_text(&app).as_deref(),
            Some("Acessos encontrados para João Silva.")
        );

        app.process_task_result(TaskResult::Lookup {
            epoch,
            extension: "9999".to_string(),
            outcome: Ok(LookupOutcome::NotFound),
        });
        let text = notice_text(&app).expect("notice");
        assert!(text.starts_with("Ramal 9999 não encontrado"));

        app.process_task_result(TaskResult::Lookup {
            epoch,
            extension: "1234".to_string(),
            outcome: Err(ApiError::Transient("boom".to_string())),
        });
        assert!(notice_text(&app).unwrap().starts_with("Ocorreu um erro na comunicação"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_lookup_is_not_rendered() {
        let mut app = app();
        let dispatched_at = app.session.epoch();
        app.lookup_in_flight = true;

        // Admin logs in while the lookup is still on the wire
        app.session.login(&FakeAuth, "admin", "right").await.unwrap();
        app.check_background_tasks();

        app.process_task_result(TaskResult::Lookup {
            epoch: dispatched_at,
            extension: "1234".to_string(),
            outcome: Ok(LookupOutcome::Found(record(1234))),
        });

        assert!(app.lookup_result.is_none());
        assert!(!app.lookup_in_flight);
        assert_eq!(app.view, ViewMode::AdminView);
    }

    // -------------------------------------------------------------------------
    // Add agent Tests
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_add_requires_admin() {
        let mut app = app();
        app.submit_draft();
        assert!(!app.add_in_flight);
        assert!(notice_text(&app).unwrap().starts_with("Acesso negado."));
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_ignored_while_add_in_flight() {
        let mut app = admin_app().await;
        app.draft = AgentDraft {
            extension: "4321".to_string(),
            name: "Maria".to_string(),
            channels_pass: "s3nha".to_string(),
            gestao_pass: "s3nha".to_string(),
            blip_pass: "s3nha".to_string(),
            ..AgentDraft::default()
        };
        app.form_focus = FormField::Submit;
        app.add_in_flight = true;
        let before = notice_text(&app);

        app.submit_draft();
        tokio::task::yield_now().await;

        assert!(app.add_in_flight);
        assert_eq!(app.draft.name, "Maria");
        assert_eq!(app.form_focus, FormField::Submit);
        assert_eq!(notice_text(&app), before);
        assert!(app.task_rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_mismatched_passwords_rejected_before_network() {
        let mut app = admin_app().await;
        app.draft = AgentDraft {
            extension: "4321".to_string(),
            name: "Maria".to_string(),
            channels_pass: "a".to_string(),
            gestao_pass: "b".to_string(),
            blip_pass: "a".to_string(),
            ..AgentDraft::default()
        };
        app.submit_draft();

        assert!(!app.add_in_flight);
        assert_eq!(
            notice_text(&app).as_deref(),
            Some("ERRO: As senhas dos sistemas Channels, Gestão e Blip devem ser as mesmas.")
        );
        // The form is kept so the admin can fix it
        assert_eq!(app.draft.gestao_pass, "b");
    }

    #[tokio::test(start_paused = true)]
    async fn test_add_success_resets_form() {
        let mut app = admin_app().await;
        app.draft.name = "Maria".to_string();
        app.form_focus = FormField::Submit;
        app.add_in_flight = true;

        app.process_task_result(TaskResult::AddRecord {
            epoch: app.session.epoch(),
            record: record(4321),
            outcome: Ok(()),
        });

        assert!(!app.add_in_flight);
        assert_eq!(app.draft, AgentDraft::default());
        assert_eq!(app.form_focus, FormField::Extension);
        assert_eq!(
            notice_text(&app).as_deref(),
            Some("SUCESSO! O Agente João Silva (Ramal 4321) foi adicionado ao sistema.")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_add_failure_keeps_form() {
        let mut app = admin_app().await;
        app.draft.name = "Maria".to_string();

        app.process_task_result(TaskResult::AddRecord {
            epoch: app.session.epoch(),
            record: record(1234),
            outcome: Err(ApiError::Validation("Ramal já cadastrado.".to_string())),
        });

        assert_eq!(app.draft.name, "Maria");
        assert_eq!(notice_text(&app).as_deref(), Some("ERRO: Ramal já cadastrado."));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_add_outcome_leaves_new_form_alone() {
        let mut app = admin_app().await;
        let dispatched_at = app.session.epoch();

        app.session.logout();
        app.check_background_tasks();
        app.session.login(&FakeAuth, "admin", "right").await.unwrap();
        app.check_background_tasks();
        app.draft.name = "Outro".to_string();

        app.process_task_result(TaskResult::AddRecord {
            epoch: dispatched_at,
            record: record(4321),
            outcome: Ok(()),
        });

        assert_eq!(app.draft.name, "Outro");
        assert!(notice_text(&app).unwrap().starts_with("SUCESSO!"));
    }

    // -------------------------------------------------------------------------
    // Input Validation Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_can_add_extension_char() {
        assert!(can_add_extension_char(0, '1'));
        assert!(can_add_extension_char(9, '0'));
        assert!(!can_add_extension_char(10, '1'));
        assert!(!can_add_extension_char(0, 'a'));
        assert!(!can_add_extension_char(0, ' '));
    }

    #[test]
    fn test_can_add_username_char() {
        assert!(can_add_username_char(0, 'a'));
        assert!(can_add_username_char(49, 'z'));
        assert!(!can_add_username_char(50, 'a'));
        assert!(!can_add_username_char(0, '\x00'));
        assert!(!can_add_username_char(0, '\n'));
    }

    #[test]
    fn test_can_add_text_char() {
        assert!(can_add_text_char(0, 'ã'));
        assert!(can_add_text_char(127, '!'));
        assert!(!can_add_text_char(128, 'a'));
        assert!(!can_add_text_char(0, '\r'));
    }
}
