// ============================================================================
// Domain Model
// ============================================================================
//
// Field domains for donor and recipient records. Rows carry canonical strings;
// these enums validate and normalize input at the API boundary:
// - BloodGroup: the eight ABO/Rh groups, exact spelling ("A+", "O-", ...)
// - Urgency: low | medium | high, accepted case-insensitively
// - Availability: yes | no
// - Role: donor | recipient, as declared on the user record and in token claims
// - RecipientStatus: pending | fulfilled
//
// ============================================================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AppError;

/// The eight supported blood groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BloodGroup {
    APositive,
    ANegative,
    BPositive,
    BNegative,
    AbPositive,
    AbNegative,
    OPositive,
    ONegative,
}

impl BloodGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            BloodGroup::APositive => "A+",
            BloodGroup::ANegative => "A-",
            BloodGroup::BPositive => "B+",
            BloodGroup::BNegative => "B-",
            BloodGroup::AbPositive => "AB+",
            BloodGroup::AbNegative => "AB-",
            BloodGroup::OPositive => "O+",
            BloodGroup::ONegative => "O-",
        }
    }
}

impl FromStr for BloodGroup {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "A+" => Ok(BloodGroup::APositive),
            "A-" => Ok(BloodGroup::ANegative),
            "B+" => Ok(BloodGroup::BPositive),
            "B-" => Ok(BloodGroup::BNegative),
            "AB+" => Ok(BloodGroup::AbPositive),
            "AB-" => Ok(BloodGroup::AbNegative),
            "O+" => Ok(BloodGroup::OPositive),
            "O-" => Ok(BloodGroup::ONegative),
            _ => Err(AppError::validation("Invalid blood group")),
        }
    }
}

impl fmt::Display for BloodGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Urgency of a blood request. Stored lowercase; input is normalized
/// case-insensitively so "High" and "high" both parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Urgency {
    Low,
    Medium,
    High,
}

impl Urgency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::Low => "low",
            Urgency::Medium => "medium",
            Urgency::High => "high",
        }
    }
}

impl FromStr for Urgency {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Urgency::Low),
            "medium" => Ok(Urgency::Medium),
            "high" => Ok(Urgency::High),
            _ => Err(AppError::validation(
                "Urgency must be \"low\", \"medium\" or \"high\"",
            )),
        }
    }
}

/// Donor availability flag. Only the literal values "yes" and "no" are
/// accepted; anything else is a validation error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    Yes,
    No,
}

impl Availability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Availability::Yes => "yes",
            Availability::No => "no",
        }
    }
}

impl FromStr for Availability {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "yes" => Ok(Availability::Yes),
            "no" => Ok(Availability::No),
            _ => Err(AppError::validation(
                "Availability must be \"yes\" or \"no\"",
            )),
        }
    }
}

/// Declared role of a user, carried in token claims and on the user record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Donor,
    Recipient,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Donor => "donor",
            Role::Recipient => "recipient",
        }
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "donor" => Ok(Role::Donor),
            "recipient" => Ok(Role::Recipient),
            _ => Err(AppError::validation("Invalid role")),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of a posted blood request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecipientStatus {
    Pending,
    Fulfilled,
}

impl RecipientStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecipientStatus::Pending => "pending",
            RecipientStatus::Fulfilled => "fulfilled",
        }
    }
}

/// Validates a contact number: exactly 10 decimal digits.
pub fn validate_contact_number(contact_number: &str) -> Result<(), AppError> {
    if contact_number.len() == 10 && contact_number.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err(AppError::validation(
            "Please enter a valid 10-digit phone number",
        ))
    }
}
