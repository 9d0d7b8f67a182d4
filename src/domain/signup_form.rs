use super::NewSignup;
use super::SignupEmail;
use super::SignupName;
use super::ToolUsage;

/// A single decoded form field. Url-encoded bodies only ever produce `Text`;
/// json bodies may carry any value, which is kept as-is so that e.g.
/// `"consent_emails": true` can be told apart from `"consent_emails": "true"`.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Other(serde_json::Value),
}

impl FieldValue {
    /// `null` is treated like a missing key
    pub fn from_json(value: serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) => Some(Self::Text(s)),
            v => Some(Self::Other(v)),
        }
    }

    /// Falsy values (`""`, `false`, `0`) count as missing
    pub fn is_present(&self) -> bool {
        match self {
            Self::Text(s) => !s.is_empty(),
            Self::Other(serde_json::Value::Bool(b)) => *b,
            Self::Other(serde_json::Value::Number(n)) => n.as_f64() != Some(0.0),
            Self::Other(_) => true,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Other(_) => None,
        }
    }

    fn into_text(self) -> Option<String> {
        match self {
            Self::Text(s) => Some(s),
            Self::Other(_) => None,
        }
    }
}

/// The four logical fields of the waitlist form, independent of the wire
/// format they arrived in. Nothing has been validated yet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignupForm {
    pub name: Option<FieldValue>,
    pub email: Option<FieldValue>,
    pub uses_claude_code: Option<FieldValue>,
    pub consent_emails: Option<FieldValue>,
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum SignupRejection {
    #[error("Missing required fields")]
    MissingFields,
    #[error("Email consent is required")]
    ConsentRequired,
}

fn required(field: Option<FieldValue>) -> Result<FieldValue, SignupRejection> {
    field
        .filter(FieldValue::is_present)
        .ok_or(SignupRejection::MissingFields)
}

/// All fields are checked for presence before consent is looked at, so a form
/// missing both a name and consent is reported as `MissingFields`.
impl TryFrom<SignupForm> for NewSignup {
    type Error = SignupRejection;
    fn try_from(form: SignupForm) -> Result<Self, Self::Error> {
        let name = required(form.name)?;
        let email = required(form.email)?;
        let uses_claude_code = required(form.uses_claude_code)?;
        let consent = required(form.consent_emails)?;

        // name and email end up in headers and html; anything but text is unusable
        let name = name
            .into_text()
            .and_then(|n| SignupName::parse(n).ok())
            .ok_or(SignupRejection::MissingFields)?;
        let email = email
            .into_text()
            .and_then(|e| SignupEmail::parse(e).ok())
            .ok_or(SignupRejection::MissingFields)?;

        if consent.as_text() != Some("true") {
            return Err(SignupRejection::ConsentRequired);
        }

        Ok(NewSignup {
            name,
            email,
            tool_usage: ToolUsage::from_answer(&uses_claude_code),
        })
    }
}
