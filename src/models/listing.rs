use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// A property's welcome page as stored
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct Listing {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub address: String,
    pub check_in: Option<String>,
    pub check_out: Option<String>,
    pub wifi_network: Option<String>,
    pub wifi_password: Option<String>,
    pub house_rules: Vec<String>,
    pub before_you_leave: Vec<String>,
    pub host_name: Option<String>,
    pub host_about: Option<String>,
    pub host_email: Option<String>,
    pub host_phone: Option<String>,
    pub image_url: Option<String>,
    pub directions: Option<String>,
    pub check_in_method: Option<String>,
    pub check_in_instructions: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Editable listing fields, used for both create and full update
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct ListingInput {
    pub title: String,
    pub address: String,
    #[serde(default)]
    pub check_in: Option<String>,
    #[serde(default)]
    pub check_out: Option<String>,
    #[serde(default)]
    pub wifi_network: Option<String>,
    #[serde(default)]
    pub wifi_password: Option<String>,
    #[serde(default)]
    pub house_rules: Vec<String>,
    #[serde(default)]
    pub before_you_leave: Vec<String>,
    #[serde(default)]
    pub host_name: Option<String>,
    #[serde(default)]
    pub host_about: Option<String>,
    #[serde(default)]
    pub host_email: Option<String>,
    #[serde(default)]
    pub host_phone: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub directions: Option<String>,
    #[serde(default)]
    pub check_in_method: Option<String>,
    #[serde(default)]
    pub check_in_instructions: Option<String>,
}

impl ListingInput {
    /// Validates and normalizes the input
    ///
    /// Trims every string, turns blank optionals into `None` and drops blank
    /// entries from the ordered lists. Check-in and check-out must be `HH:MM`.
    pub fn normalize(self) -> AppResult<Self> {
        let title = self.title.trim().to_string();
        if title.is_empty() {
            return Err(AppError::InvalidInput("Title cannot be empty".to_string()));
        }

        let address = self.address.trim().to_string();
        if address.is_empty() {
            return Err(AppError::InvalidInput("Address cannot be empty".to_string()));
        }

        let check_in = blank_to_none(self.check_in);
        let check_out = blank_to_none(self.check_out);
        for (field, value) in [("check_in", &check_in), ("check_out", &check_out)] {
            if let Some(time) = value {
                NaiveTime::parse_from_str(time, "%H:%M").map_err(|_| {
                    AppError::InvalidInput(format!("{} must be formatted as HH:MM", field))
                })?;
            }
        }

        Ok(Self {
            title,
            address,
            check_in,
            check_out,
            wifi_network: blank_to_none(self.wifi_network),
            wifi_password: blank_to_none(self.wifi_password),
            house_rules: clean_list(self.house_rules),
            before_you_leave: clean_list(self.before_you_leave),
            host_name: blank_to_none(self.host_name),
            host_about: blank_to_none(self.host_about),
            host_email: blank_to_none(self.host_email),
            host_phone: blank_to_none(self.host_phone),
            image_url: blank_to_none(self.image_url),
            directions: blank_to_none(self.directions),
            check_in_method: blank_to_none(self.check_in_method),
            check_in_instructions: blank_to_none(self.check_in_instructions),
        })
    }
}

impl Listing {
    /// Builds a new listing owned by `owner_id` from validated input
    pub fn new(owner_id: Uuid, input: ListingInput) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner_id,
            title: input.title,
            address: input.address,
            check_in: input.check_in,
            check_out: input.check_out,
            wifi_network: input.wifi_network,
            wifi_password: input.wifi_password,
            house_rules: input.house_rules,
            before_you_leave: input.before_you_leave,
            host_name: input.host_name,
            host_about: input.host_about,
            host_email: input.host_email,
            host_phone: input.host_phone,
            image_url: input.image_url,
            directions: input.directions,
            check_in_method: input.check_in_method,
            check_in_instructions: input.check_in_instructions,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replaces every editable field with `input`
    pub fn apply(&mut self, input: ListingInput) {
        self.title = input.title;
        self.address = input.address;
        self.check_in = input.check_in;
        self.check_out = input.check_out;
        self.wifi_network = input.wifi_network;
        self.wifi_password = input.wifi_password;
        self.house_rules = input.house_rules;
        self.before_you_leave = input.before_you_leave;
        self.host_name = input.host_name;
        self.host_about = input.host_about;
        self.host_email = input.host_email;
        self.host_phone = input.host_phone;
        self.image_url = input.image_url;
        self.directions = input.directions;
        self.check_in_method = input.check_in_method;
        self.check_in_instructions = input.check_in_instructions;
        self.updated_at = Utc::now();
    }
}

/// The guest-facing view of a listing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GuestListing {
    pub id: Uuid,
    pub title: String,
    pub address: String,
    pub check_in: Option<String>,
    pub check_out: Option<String>,
    pub wifi_network: Option<String>,
    pub wifi_password: Option<String>,
    pub house_rules: Vec<String>,
    pub before_you_leave: Vec<String>,
    pub host_name: Option<String>,
    pub host_about: Option<String>,
    pub host_email: Option<String>,
    pub host_phone: Option<String>,
    pub image_url: Option<String>,
    pub directions: Option<String>,
    pub check_in_method: Option<String>,
    pub check_in_instructions: Option<String>,
}

impl From<Listing> for GuestListing {
    fn from(listing: Listing) -> Self {
        Self {
            id: listing.id,
            title: listing.title,
            address: listing.address,
            check_in: listing.check_in,
            check_out: listing.check_out,
            wifi_network: listing.wifi_network,
            wifi_password: listing.wifi_password,
            house_rules: listing.house_rules,
            before_you_leave: listing.before_you_leave,
            host_name: listing.host_name,
            host_about: listing.host_about,
            host_email: listing.host_email,
            host_phone: listing.host_phone,
            image_url: listing.image_url,
            directions: listing.directions,
            check_in_method: listing.check_in_method,
            check_in_instructions: listing.check_in_instructions,
        }
    }
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn clean_list(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}
