use super::FieldValue;
use super::SignupEmail;
use super::SignupName;

/// A submission that passed validation. Consent is not stored: a `NewSignup`
/// cannot exist without it.
#[derive(Debug, Clone)]
pub struct NewSignup {
    pub name: SignupName,
    pub email: SignupEmail,
    pub tool_usage: ToolUsage,
}

/// Whether the submitter already uses Claude Code. This only ever selects email
/// content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolUsage {
    ExistingUser,
    NewUser,
}

impl ToolUsage {
    /// Only the literal answer `yes` counts; `Yes`, `true`, `1` etc are all new
    /// users
    pub fn from_answer(answer: &FieldValue) -> Self {
        match answer.as_text() {
            Some("yes") => Self::ExistingUser,
            _ => Self::NewUser,
        }
    }

    pub fn is_existing_user(&self) -> bool { matches!(self, Self::ExistingUser) }

    /// As displayed in the admin notification
    pub fn yes_no(&self) -> &'static str {
        match self {
            Self::ExistingUser => "Yes",
            Self::NewUser => "No",
        }
    }
}
