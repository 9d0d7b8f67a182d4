mod new_signup;
mod signup_email;
mod signup_form;
mod signup_name;
// allow external `use` statements to skip `new_signup` etc
pub use new_signup::NewSignup;
pub use new_signup::ToolUsage;
pub use signup_email::SignupEmail;
pub use signup_form::FieldValue;
pub use signup_form::SignupForm;
pub use signup_form::SignupRejection;
pub use signup_name::SignupName;
