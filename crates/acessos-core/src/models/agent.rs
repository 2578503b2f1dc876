use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Placeholder shown for fields the API left empty
pub const NOT_AVAILABLE: &str = "N/D";

/// Downstream corporate systems an agent has a login for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum System {
    Channels,
    Gestao,
    Blip,
}

impl System {
    pub const ALL: [System; 3] = [System::Channels, System::Gestao, System::Blip];

    pub fn display_name(&self) -> &'static str {
        match self {
            System::Channels => "Channels",
            System::Gestao => "Gestão",
            System::Blip => "Blip",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemUsernames {
    #[serde(rename = "Channels (Usuário)", default)]
    pub channels: String,
    #[serde(rename = "Gestão (Usuário)", default)]
    pub gestao: String,
    #[serde(rename = "Blip (Usuário)", default)]
    pub blip: String,
}

impl SystemUsernames {
    pub fn get(&self, system: System) -> &str {
        match system {
            System::Channels => &self.channels,
            System::Gestao => &self.gestao,
            System::Blip => &self.blip,
        }
    }
}

/// An agent's credentials, keyed by extension.
///
/// Field names on the wire are the column names of the backing table and are
/// shared by the lookup response and the add-agent request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentRecord {
    #[serde(rename = "Ramal", deserialize_with = "extension_from_json")]
    pub extension: u64,
    #[serde(rename = "Nome", default)]
    pub display_name: String,
    #[serde(flatten)]
    pub usernames: SystemUsernames,
    #[serde(rename = "Email", default)]
    pub email: String,
    #[serde(rename = "Senha (Unificada)", default)]
    pub unified_password: String,
}

/// One labelled line of the credential card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialRow {
    pub title: String,
    pub value: String,
}

impl AgentRecord {
    /// Rows in display order: user and password for each system, then e-mail.
    /// Every system password is the unified password.
    pub fn credential_rows(&self) -> Vec<CredentialRow> {
        let mut rows = Vec::with_capacity(7);
        for system in System::ALL {
            rows.push(CredentialRow {
                title: format!("{} (Usuário)", system.display_name()),
                value: or_not_available(self.usernames.get(system)),
            });
            rows.push(CredentialRow {
                title: format!("{} (Senha)", system.display_name()),
                value: or_not_available(&self.unified_password),
            });
        }
        rows.push(CredentialRow {
            title: "E-mail Corporativo".to_string(),
            value: or_not_available(&self.email),
        });
        rows
    }

    pub fn name_or_placeholder(&self) -> &str {
        if self.display_name.trim().is_empty() {
            NOT_AVAILABLE
        } else {
            &self.display_name
        }
    }
}

fn or_not_available(value: &str) -> String {
    if value.trim().is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        value.to_string()
    }
}

/// The table stores Ramal as a number, but older rows were typed in as text.
/// Digits only; `str::parse` would also take a leading `+`.
fn parse_extension(s: &str) -> Option<u64> {
    let s = s.trim();
    if s.is_empty() || !s.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

fn extension_from_json<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrText {
        Number(u64),
        Text(String),
    }

    match NumberOrText::deserialize(deserializer)? {
        NumberOrText::Number(n) => Ok(n),
        NumberOrText::Text(s) => parse_extension(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid Ramal: {:?}", s))),
    }
}

// ============================================================================
// Admin form
// ============================================================================

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("ERRO: As senhas dos sistemas Channels, Gestão e Blip devem ser as mesmas.")]
    PasswordMismatch,

    #[error("ERRO: O Ramal deve ser um número válido.")]
    InvalidExtension,

    #[error("ERRO: O nome do agente é obrigatório.")]
    MissingName,
}

/// Raw contents of the add-agent form, one string per field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgentDraft {
    pub extension: String,
    pub name: String,
    pub channels_user: String,
    pub gestao_user: String,
    pub blip_user: String,
    pub email: String,
    pub channels_pass: String,
    pub gestao_pass: String,
    pub blip_pass: String,
}

impl AgentDraft {
    /// Check the draft client-side and build the record to submit.
    ///
    /// Runs before any network call; a draft whose three passwords differ is
    /// never sent.
    pub fn validate(&self) -> Result<AgentRecord, ValidationError> {
        let channels_pass = self.channels_pass.trim();
        if channels_pass != self.gestao_pass.trim() || channels_pass != self.blip_pass.trim() {
            return Err(ValidationError::PasswordMismatch);
        }

        let extension =
            parse_extension(&self.extension).ok_or(ValidationError::InvalidExtension)?;

        let name = self.name.trim();
        if name.is_empty() {
            return Err(ValidationError::MissingName);
        }

        Ok(AgentRecord {
            extension,
            display_name: name.to_string(),
            usernames: SystemUsernames {
                channels: self.channels_user.trim().to_string(),
                gestao: self.gestao_user.trim().to_string(),
                blip: self.blip_user.trim().to_string(),
            },
            email: self.email.trim().to_string(),
            unified_password: channels_pass.to_string(),
        })
    }
}
