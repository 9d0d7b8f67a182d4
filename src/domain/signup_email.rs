/// Recipient address of the welcome email. Unlike a newsletter subscription,
/// the address is not checked for format, only for presence; the signup page
/// relies on the browser's own `type="email"` validation.
#[derive(Debug, Clone)]
pub struct SignupEmail(String);

impl SignupEmail {
    pub fn parse(email: String) -> Result<Self, String> {
        match email.is_empty() {
            true => Err("Email cannot be empty".to_string()),
            false => Ok(Self(email)),
        }
    }
}

impl AsRef<str> for SignupEmail {
    fn as_ref(&self) -> &str { &self.0 }
}

impl std::fmt::Display for SignupEmail {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
