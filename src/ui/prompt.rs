//! Interactive password prompt used when `--password`/`--no-password`
//! were not given on the command line.

use anyhow::{Result, ensure};
use dialoguer::Password;
use dialoguer::theme::ColorfulTheme;

pub struct Prompt {
    theme: ColorfulTheme,
}

impl Prompt {
    pub fn new() -> Self {
        Self { theme: ColorfulTheme::default() }
    }

    /// Double-entry password prompt, used when hiding a file: a typo here
    /// would make the hidden data unrecoverable later.
    pub fn prompt_hide_password(&self) -> Result<String> {
        let password = self.prompt_password("Enter password")?;
        let confirmation = self.prompt_password("Confirm password")?;
        ensure!(password == confirmation, "passwords do not match");
        Ok(password)
    }

    /// Single-entry prompt, used for extract/check: there is nothing to
    /// confirm against, only the cover image itself.
    pub fn prompt_read_password(&self) -> Result<String> {
        self.prompt_password("Enter password")
    }

    fn prompt_password(&self, label: &str) -> Result<String> {
        Password::with_theme(&self.theme)
            .with_prompt(label)
            .allow_empty_password(true)
            .interact()
            .map_err(Into::into)
    }
}

impl Default for Prompt {
    fn default() -> Self {
        Self::new()
    }
}
