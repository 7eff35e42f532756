use crate::config::settings::USER_NAME_PLACEHOLDER;

/// Builds the system message that leads every upstream payload.
pub struct PromptBuilder {
    default_template: String,
}

impl PromptBuilder {
    pub fn new(default_template: String) -> Self {
        Self { default_template }
    }

    /// `personality` wins verbatim when non-empty; otherwise the default
    /// template with the user name filled in. A template without the
    /// placeholder gets the name appended so it is always present.
    pub fn system_instruction(&self, user_name: &str, personality: &str) -> String {
        if !personality.is_empty() {
            return personality.to_string();
        }

        let template = self.default_template.trim();
        if template.contains(USER_NAME_PLACEHOLDER) {
            template.replace(USER_NAME_PLACEHOLDER, user_name)
        } else {
            format!("{}\nKullanıcı adı: {}.", template, user_name)
        }
    }
}
