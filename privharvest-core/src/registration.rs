//! Do-not-call registration helper.
//!
//! Collects phone numbers and a confirmation email, validates them, and
//! writes a timestamped JSON file the user takes to the official registry.

use crate::error::{CoreError, Result, ValidationError};
use chrono::{DateTime, Local};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::debug;

pub const REGISTRY_URL: &str = "https://www.donotcall.gov/register.html";

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap());

/// Strip everything but digits; exactly ten must remain.
pub fn validate_phone(input: &str) -> std::result::Result<String, ValidationError> {
    let digits: String = input.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() != 10 {
        return Err(ValidationError::PhoneLength {
            digits: digits.len(),
        });
    }
    Ok(digits)
}

/// `(AAA) BBB-CCCC` for a validated number; anything else is returned as is.
pub fn format_phone(digits: &str) -> String {
    if digits.len() != 10 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return digits.to_string();
    }
    format!("({}) {}-{}", &digits[..3], &digits[3..6], &digits[6..])
}

pub fn validate_email(input: &str) -> std::result::Result<String, ValidationError> {
    if !EMAIL_RE.is_match(input) {
        return Err(ValidationError::InvalidEmail(input.to_string()));
    }
    Ok(input.to_string())
}

pub fn registration_filename(at: &DateTime<Local>) -> String {
    format!("registration_{}.json", at.format("%Y%m%d_%H%M%S"))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistrationType {
    #[default]
    Personal,
    Business,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddPhoneOutcome {
    Added(String),
    AlreadyPresent(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    phone_numbers: Vec<String>,
    email: String,
    registration_type: RegistrationType,
}

impl Registration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_phone_number(
        &mut self,
        input: &str,
    ) -> std::result::Result<AddPhoneOutcome, ValidationError> {
        let phone = validate_phone(input)?;
        if self.phone_numbers.contains(&phone) {
            return Ok(AddPhoneOutcome::AlreadyPresent(phone));
        }
        self.phone_numbers.push(phone.clone());
        Ok(AddPhoneOutcome::Added(phone))
    }

    pub fn set_email(&mut self, input: &str) -> std::result::Result<&str, ValidationError> {
        self.email = validate_email(input)?;
        Ok(&self.email)
    }

    pub fn phone_numbers(&self) -> &[String] {
        &self.phone_numbers
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn registration_type(&self) -> RegistrationType {
        self.registration_type
    }

    pub fn is_complete(&self) -> bool {
        !self.phone_numbers.is_empty() && !self.email.is_empty()
    }

    /// Write to `dir/registration_<timestamp>.json` using the current local time.
    pub fn save(&self, dir: &Path) -> Result<PathBuf> {
        self.save_at(dir, &Local::now())
    }

    pub fn save_at(&self, dir: &Path, at: &DateTime<Local>) -> Result<PathBuf> {
        if !self.is_complete() {
            return Err(ValidationError::Incomplete.into());
        }

        let path = dir.join(registration_filename(at));
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, json).map_err(|e| CoreError::io(&path, e))?;

        debug!("Registration data saved to {}", path.display());
        Ok(path)
    }

    pub fn summary(&self) -> String {
        let mut out = String::new();
        out.push_str("\nCurrent Registration Information:\n");
        out.push_str(&format!("{}\n", "-".repeat(30)));
        out.push_str(&format!("Email: {}\n", self.email));
        out.push_str("Phone Numbers:\n");
        for phone in &self.phone_numbers {
            out.push_str(&format!("  • {}\n", format_phone(phone)));
        }
        out.push_str(&format!("{}\n", "-".repeat(30)));
        out
    }
}

const MENU: &str = "\nOptions:
1. Add phone number
2. Set email address
3. View current information
4. Save and submit registration
5. Exit
";

fn next_steps() -> String {
    format!(
        "\nIMPORTANT: Next Steps
1. Visit {}
2. Enter the phone number(s) and email from the saved registration file
3. Complete the registration process on the website

Note: Your registration will be effective within 31 days of your registration date
",
        REGISTRY_URL
    )
}

fn prompt<R: BufRead, W: Write>(input: &mut R, output: &mut W, msg: &str) -> Result<Option<String>> {
    write!(output, "{}", msg)?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// Menu-driven registration over any line source. Returns the saved file,
/// or `None` when the user exits (or input ends) without saving.
pub fn run_interactive<R: BufRead, W: Write>(
    mut input: R,
    mut output: W,
    dir: &Path,
) -> Result<Option<PathBuf>> {
    let mut registration = Registration::new();

    writeln!(output, "Do Not Call List Registration")?;
    writeln!(output, "{}", "=".repeat(30))?;

    loop {
        write!(output, "{}", MENU)?;
        let Some(choice) = prompt(&mut input, &mut output, "\nEnter your choice (1-5): ")? else {
            writeln!(output)?;
            return Ok(None);
        };

        match choice.as_str() {
            "1" => {
                let Some(phone) = prompt(&mut input, &mut output, "Enter phone number (10 digits): ")?
                else {
                    return Ok(None);
                };
                match registration.add_phone_number(&phone) {
                    Ok(AddPhoneOutcome::Added(p)) => {
                        writeln!(output, "Added phone number: {}", format_phone(&p))?
                    }
                    Ok(AddPhoneOutcome::AlreadyPresent(_)) => {
                        writeln!(output, "Phone number already added")?
                    }
                    Err(e) => writeln!(output, "Error: {}", e)?,
                }
            }
            "2" => {
                let Some(email) = prompt(&mut input, &mut output, "Enter email address: ")? else {
                    return Ok(None);
                };
                match registration.set_email(&email) {
                    Ok(email) => writeln!(output, "Email set to: {}", email)?,
                    Err(e) => writeln!(output, "Error: {}", e)?,
                }
            }
            "3" => write!(output, "{}", registration.summary())?,
            "4" => match registration.save(dir) {
                Ok(path) => {
                    writeln!(output, "\nRegistration data saved to {}", path.display())?;
                    write!(output, "{}", next_steps())?;
                    return Ok(Some(path));
                }
                Err(CoreError::Validation(e)) => writeln!(output, "Error: {}", e)?,
                Err(e) => writeln!(output, "Error saving registration: {}", e)?,
            },
            "5" => {
                writeln!(output, "Exiting registration process")?;
                return Ok(None);
            }
            _ => writeln!(output, "Invalid choice. Please try again.")?,
        }
    }
}
