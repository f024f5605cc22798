// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User and profile models for storage and API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User account stored in Firestore.
///
/// Credentials and verification secrets live with the authentication
/// provider and are never stored on this record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// User ID (also used as document ID)
    pub id: u64,
    /// Display name
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// Short public code users share to find each other
    pub user_code: Option<String>,
    /// Height in centimeters
    pub height: Option<f64>,
    /// Weight in kilograms
    pub weight: Option<f64>,
    /// Profile picture URL
    pub headshot: Option<String>,
    #[serde(with = "firestore::serialize_as_timestamp")]
    pub created_at: DateTime<Utc>,
    /// Soft-delete marker
    #[serde(default, with = "firestore::serialize_as_optional_timestamp")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Per-user profile details, one document per user.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Profile {
    /// Owning user ID (also used as document ID)
    pub user_id: u64,
    pub gender: Option<String>,
    /// Date of birth (YYYY-MM-DD)
    pub dob: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub bio: Option<String>,
    pub address: Option<String>,
}

/// Location fields of a profile used on leaderboards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileLocation {
    pub city: Option<String>,
    pub country: Option<String>,
    pub address: Option<String>,
}

impl From<&Profile> for ProfileLocation {
    fn from(profile: &Profile) -> Self {
        Self {
            city: profile.city.clone(),
            country: profile.country.clone(),
            address: profile.address.clone(),
        }
    }
}

/// Display snapshot of a user, joined with their profile location.
#[derive(Debug, Clone, PartialEq)]
pub struct UserSummary {
    pub id: u64,
    pub name: String,
    pub headshot: Option<String>,
    /// `None` when the user has no profile document
    pub location: Option<ProfileLocation>,
}

impl UserSummary {
    pub fn from_parts(user: &User, profile: Option<&Profile>) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            headshot: user.headshot.clone(),
            location: profile.map(ProfileLocation::from),
        }
    }
}
