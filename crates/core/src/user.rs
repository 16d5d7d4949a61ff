// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The signed-in user and the family they belong to.

use serde::{Deserialize, Serialize};

/// Light/dark appearance preference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterfaceStyle {
    #[default]
    System,
    Light,
    Dark,
}

/// User-editable settings pushed with the profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserConfiguration {
    pub notifications_enabled: bool,
    pub snooze_length_secs: u64,
    pub interface_style: InterfaceStyle,
}

impl Default for UserConfiguration {
    fn default() -> Self {
        UserConfiguration {
            notifications_enabled: true,
            snooze_length_secs: 5 * 60,
            interface_style: InterfaceStyle::System,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub configuration: UserConfiguration,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyMember {
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub is_head: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Family {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family_id: Option<String>,
    pub members: Vec<FamilyMember>,
    pub is_paused: bool,
}
