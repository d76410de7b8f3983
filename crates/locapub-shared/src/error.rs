use std::fmt;

use thiserror::Error;

/// Failures of a single call to the webhook backend.
///
/// `Display` yields the resolved, user-facing message: for non-2xx answers
/// this is the JSON `message` field, else the raw body, else the status line.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("{0}")]
    Transport(String),

    #[error("{message}")]
    Status { status: u16, message: String },

    #[error("Failed to parse JSON response from server.")]
    MalformedJson { detail: String },

    #[error("La réponse de l'API ne contient pas de support valide.")]
    MissingPayload,

    #[error("Failed to encode request: {0}")]
    Encode(String),
}

impl GatewayError {
    /// HTTP status of a rejected call, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            GatewayError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_malformed_json(&self) -> bool {
        matches!(self, GatewayError::MalformedJson { .. })
    }
}

/// A required form input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Title,
    Description,
    Kind,
    Channel,
    Support,
    GeneratedContent,
}

impl Field {
    pub fn label(&self) -> &'static str {
        match self {
            Field::Title => "titre",
            Field::Description => "description",
            Field::Kind => "type de support",
            Field::Channel => "canal de diffusion",
            Field::Support => "support",
            Field::GeneratedContent => "contenu généré",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Veuillez remplir tous les champs obligatoires ({}).", join_fields(.missing))]
    Incomplete { missing: Vec<Field> },

    #[error("Veuillez générer du contenu avant de valider.")]
    ContentNotGenerated,

    #[error("Une opération est déjà en cours.")]
    Busy,

    #[error("Aucune modification détectée.")]
    NoChange,
}

fn join_fields(fields: &[Field]) -> String {
    fields
        .iter()
        .map(Field::label)
        .collect::<Vec<_>>()
        .join(", ")
}
