//! Dashboard statistics and site-wide configuration.

use serde::{Deserialize, Serialize};

/// Site configuration edited from the admin panel.
///
/// The values are stored server-side only. The client never enforces
/// `max_ad_duration_days` or `require_moderation`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct SystemConfig {
    /// Public site name.
    pub site_name: String,
    /// Public tagline.
    pub site_description: String,
    /// Support email.
    pub contact_email: String,
    /// Support phone number.
    pub contact_phone: String,
    /// Maximum images accepted per ad.
    pub max_images_per_ad: u32,
    /// Days an ad stays live.
    pub max_ad_duration_days: u32,
    /// Whether new ads wait for moderation.
    pub require_moderation: bool,
    /// Whether sign-up is open.
    pub allow_user_registration: bool,
    /// Whether the site is in maintenance mode.
    pub maintenance_mode: bool,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            site_name: String::new(),
            site_description: String::new(),
            contact_email: String::new(),
            contact_phone: String::new(),
            max_images_per_ad: 4,
            max_ad_duration_days: 30,
            require_moderation: true,
            allow_user_registration: true,
            maintenance_mode: false,
        }
    }
}

/// Per-status counters reported by the moderator dashboard.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EntityCounts {
    /// Listings in this status.
    pub listings: u64,
    /// Users in this status.
    pub users: u64,
    /// Interests in this status.
    pub interests: u64,
}

/// `GET api/mod/dashboard` payload.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ModDashboard {
    /// Pending counters.
    pub pending: EntityCounts,
    /// Approved counters.
    pub approved: EntityCounts,
    /// Rejected counters.
    pub rejected: EntityCounts,
}

/// Listing counters nested in the admin dashboard.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct ListingStats {
    /// Live listings.
    pub total_active: u64,
    /// Listings awaiting moderation.
    pub total_pending: u64,
    /// Rejected listings.
    pub total_rejected: u64,
}

/// `GET api/admin/dashboard` payload.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct AdminDashboard {
    /// Listing counters.
    pub listing_stats: ListingStats,
    /// Registered accounts.
    pub total_users: u64,
    /// Active accounts.
    pub active_users: u64,
}

impl AdminDashboard {
    /// Accounts that are not active.
    #[must_use]
    pub const fn deactivated_users(&self) -> u64 {
        self.total_users.saturating_sub(self.active_users)
    }
}

/// One point of a daily trend series.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TrendPoint {
    /// Day label.
    pub date: String,
    /// Listings created.
    pub listings: u64,
    /// Users registered.
    pub users: u64,
    /// Interests expressed.
    pub interests: u64,
}

/// `GET api/admin/analytics/overview` payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalyticsOverview {
    /// Product listings.
    pub product_count: u64,
    /// Service listings.
    pub service_count: u64,
    /// Job listings.
    pub job_count: u64,
    /// Matrimony profiles.
    pub matrimony_count: u64,
    /// Active listings.
    pub active_listings_count: u64,
    /// Pending listings.
    pub pending_listings_count: u64,
    /// Rejected listings.
    pub rejected_listings_count: u64,
    /// Inactive listings.
    pub inactive_listings_count: u64,
    /// Listings per day.
    pub listings_trend: Vec<TrendPoint>,
    /// Registrations per day.
    pub users_trend: Vec<TrendPoint>,
    /// Interests per day.
    pub interests_trend: Vec<TrendPoint>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn system_config_fills_missing_fields_with_defaults() {
        let config: SystemConfig = serde_json::from_value(json!({
            "siteName": "Bazaar",
            "maintenanceMode": true
        }))
        .expect("config");
        assert_eq!(config.site_name, "Bazaar");
        assert!(config.maintenance_mode);
        assert_eq!(config.max_ad_duration_days, 30);
        assert!(config.require_moderation);
        let encoded = serde_json::to_value(&config).expect("serialize");
        assert_eq!(encoded["maxAdDurationDays"], 30);
    }

    #[test]
    fn admin_dashboard_derives_deactivated_users() {
        let dashboard: AdminDashboard = serde_json::from_value(json!({
            "listingStats": {"totalActive": 12, "totalPending": 3},
            "totalUsers": 10,
            "activeUsers": 7
        }))
        .expect("dashboard");
        assert_eq!(dashboard.listing_stats.total_pending, 3);
        assert_eq!(dashboard.deactivated_users(), 3);
    }

    #[test]
    fn mod_dashboard_tolerates_partial_payloads() {
        let dashboard: ModDashboard =
            serde_json::from_value(json!({"pending": {"listings": 4}})).expect("dashboard");
        assert_eq!(dashboard.pending.listings, 4);
        assert_eq!(dashboard.rejected, EntityCounts::default());
    }
}
