//! Site settings document.
//!
//! Settings are a single typed record with optional sections. Partial
//! updates are applied with explicit per-field overlays: a field that is
//! absent (or null) in the update keeps its stored value.

use serde::{Deserialize, Serialize};

/// Access code assumed when none has ever been stored.
pub const DEFAULT_ADMIN_CODE: &str = "krua2026";

/// Public settings document. Never carries the admin access code.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SiteSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restaurant: Option<RestaurantInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub about: Option<AboutSection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub founder: Option<FounderProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeline: Option<Vec<TimelineEntry>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tagline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub founded_year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opening_hours: Option<OpeningHours>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facebook: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instagram: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_embed: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OpeningHours {
    #[serde(default, alias = "weekday", skip_serializing_if = "Option::is_none")]
    pub weekdays: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weekend: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AboutSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub story: Option<String>,
    /// Feature cards rendered on the about page; shape is owned by the
    /// front end.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<Vec<serde_json::Value>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FounderProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quote: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub year: i32,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
}

/// Body of `PUT /api/settings`: any subset of the public sections plus an
/// optional new admin access code.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingsUpdate {
    #[serde(flatten)]
    pub sections: SiteSettings,
    #[serde(default, rename = "adminCode")]
    pub admin_code: Option<String>,
}

/// Settings as persisted, including the protected access code.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredSettings {
    pub public: SiteSettings,
    pub admin_code: String,
}

impl Default for StoredSettings {
    fn default() -> Self {
        Self {
            public: SiteSettings::default(),
            admin_code: DEFAULT_ADMIN_CODE.to_string(),
        }
    }
}

impl StoredSettings {
    pub fn apply(&mut self, update: SettingsUpdate) {
        self.public.overlay(update.sections);
        if let Some(code) = update.admin_code.filter(|c| !c.is_empty()) {
            self.admin_code = code;
        }
    }
}

fn overlay_field<T>(slot: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *slot = value;
    }
}

fn overlay_section<T: Default>(
    slot: &mut Option<T>,
    patch: Option<T>,
    overlay: impl FnOnce(&mut T, T),
) {
    if let Some(patch) = patch {
        overlay(slot.get_or_insert_with(T::default), patch);
    }
}

impl SiteSettings {
    /// Restaurant, about and founder merge field by field; the timeline is
    /// replaced wholesale.
    pub fn overlay(&mut self, patch: SiteSettings) {
        overlay_section(
            &mut self.restaurant,
            patch.restaurant,
            RestaurantInfo::overlay,
        );
        overlay_section(&mut self.about, patch.about, AboutSection::overlay);
        overlay_section(&mut self.founder, patch.founder, FounderProfile::overlay);
        overlay_field(&mut self.timeline, patch.timeline);
    }
}

impl RestaurantInfo {
    pub fn overlay(&mut self, patch: RestaurantInfo) {
        overlay_field(&mut self.name, patch.name);
        overlay_field(&mut self.tagline, patch.tagline);
        overlay_field(&mut self.founded_year, patch.founded_year);
        overlay_field(&mut self.description, patch.description);
        overlay_field(&mut self.phone, patch.phone);
        overlay_field(&mut self.mobile, patch.mobile);
        overlay_field(&mut self.email, patch.email);
        overlay_field(&mut self.address, patch.address);
        overlay_section(
            &mut self.opening_hours,
            patch.opening_hours,
            OpeningHours::overlay,
        );
        overlay_field(&mut self.line_id, patch.line_id);
        overlay_field(&mut self.line_url, patch.line_url);
        overlay_field(&mut self.facebook, patch.facebook);
        overlay_field(&mut self.instagram, patch.instagram);
        overlay_field(&mut self.map_embed, patch.map_embed);
    }
}

impl OpeningHours {
    pub fn overlay(&mut self, patch: OpeningHours) {
        overlay_field(&mut self.weekdays, patch.weekdays);
        overlay_field(&mut self.weekend, patch.weekend);
    }
}

impl AboutSection {
    pub fn overlay(&mut self, patch: AboutSection) {
        overlay_field(&mut self.title, patch.title);
        overlay_field(&mut self.story, patch.story);
        overlay_field(&mut self.features, patch.features);
    }
}

impl FounderProfile {
    pub fn overlay(&mut self, patch: FounderProfile) {
        overlay_field(&mut self.name, patch.name);
        overlay_field(&mut self.title, patch.title);
        overlay_field(&mut self.image, patch.image);
        overlay_field(&mut self.bio, patch.bio);
        overlay_field(&mut self.quote, patch.quote);
    }
}
