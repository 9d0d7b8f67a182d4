/// The submitter's name, as typed. Only emptiness is rejected; the name is
/// echoed back in emails and split into first/last for the contact list.
///
/// Must be instantiated with `SignupName::parse`.
#[derive(Debug, Clone)]
pub struct SignupName(String);

impl SignupName {
    pub fn parse(name: String) -> Result<Self, String> {
        match name.is_empty() {
            true => Err("Name cannot be empty".to_string()),
            false => Ok(Self(name)),
        }
    }

    /// First whitespace-delimited token; empty if the name is all whitespace
    pub fn first_name(&self) -> &str { self.0.split_whitespace().next().unwrap_or_default() }

    /// Everything after the first token, joined with single spaces (possibly
    /// empty)
    pub fn last_name(&self) -> String {
        self.0
            .split_whitespace()
            .skip(1)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl AsRef<str> for SignupName {
    fn as_ref(&self) -> &str { &self.0 }
}
