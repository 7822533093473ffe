//! Output renderers and formatting helpers for CLI commands.

use std::fmt::{self, Write as _};

use anyhow::anyhow;
use bazaar_api_models::{
    AdminDashboard, AnalyticsOverview, Interest, Listing, ListingKind, ModDashboard, MyListings,
    Notification, SystemConfig, User,
};
use bazaar_client::{Access, PincodeDetails, ResourceList, Route};
use serde::Serialize;
use serde_json::json;

use crate::cli::OutputFormat;
use crate::client::{CliError, CliResult};

/// Print `value` as pretty JSON or as the one-line summary produced by
/// `line`.
pub(crate) fn render<T, F>(format: OutputFormat, value: &T, line: F) -> CliResult<()>
where
    T: Serialize + ?Sized,
    F: FnOnce() -> String,
{
    render_with(format, value, |out| out.write_str(&line()))
}

/// Print `value` as pretty JSON or as the text `write` produces.
pub(crate) fn render_with<T, F>(format: OutputFormat, value: &T, write: F) -> CliResult<()>
where
    T: Serialize + ?Sized,
    F: FnOnce(&mut String) -> fmt::Result,
{
    let text = match format {
        OutputFormat::Json => serde_json::to_string_pretty(value)
            .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))?,
        OutputFormat::Table => {
            let mut text = String::new();
            write(&mut text)
                .map_err(|err| CliError::failure(anyhow!("failed to format output: {err}")))?;
            text
        }
    };
    println!("{}", text.trim_end());
    Ok(())
}

pub(crate) fn render_listing_page(
    list: &ResourceList<Listing>,
    format: OutputFormat,
) -> CliResult<()> {
    let value = json!({
        "items": list.items(),
        "page": list.page(),
        "totalPages": list.total_pages(),
        "total": list.total(),
    });
    render_with(format, &value, |out| {
        write_listing_rows(out, list.items())?;
        write_page_footer(out, list)
    })
}

/// `page N of M (T total)` trailer under a paginated table.
pub(crate) fn write_page_footer<T>(out: &mut String, list: &ResourceList<T>) -> fmt::Result {
    writeln!(
        out,
        "page {} of {} ({} total)",
        list.page(),
        list.total_pages().max(1),
        list.total()
    )
}

pub(crate) fn render_listings(listings: &[Listing], format: OutputFormat) -> CliResult<()> {
    render_with(format, listings, |out| write_listing_rows(out, listings))
}

pub(crate) fn render_my_listings(listings: &MyListings, format: OutputFormat) -> CliResult<()> {
    render_with(format, listings, |out| {
        if listings.is_empty() {
            return out.write_str("no ads posted yet");
        }
        write_listing_table(
            out,
            listings.iter().map(|(kind, listing)| (Some(kind), listing)),
        )
    })
}

pub(crate) fn render_listing_detail(listing: &Listing, format: OutputFormat) -> CliResult<()> {
    render_with(format, listing, |out| write_listing_detail(out, listing))
}

fn write_listing_detail(out: &mut String, listing: &Listing) -> fmt::Result {
    writeln!(out, "id: {}", listing.id)?;
    if let Some(kind) = listing.kind {
        writeln!(out, "type: {kind}")?;
    }
    writeln!(out, "title: {}", display_or_dash(&listing.title))?;
    writeln!(out, "status: {}", listing.status)?;
    if let Some(location) = listing.location.label() {
        writeln!(out, "location: {location}")?;
    }
    if let Some(pincode) = &listing.location.pincode {
        writeln!(out, "pincode: {pincode}")?;
    }
    if let Some(owner) = &listing.owner {
        writeln!(out, "posted by: {}", owner.label())?;
    }
    if let Some(created) = listing.created_at {
        writeln!(out, "posted: {}", created.format("%Y-%m-%d"))?;
    }
    for key in listing.details.keys() {
        if let Some(value) = listing.detail_text(key) {
            writeln!(out, "{key}: {value}")?;
        }
    }
    Ok(())
}

pub(crate) fn write_listing_rows(out: &mut String, listings: &[Listing]) -> fmt::Result {
    write_listing_table(out, listings.iter().map(|listing| (None, listing)))
}

fn write_listing_table<'a, I>(out: &mut String, rows: I) -> fmt::Result
where
    I: IntoIterator<Item = (Option<ListingKind>, &'a Listing)>,
{
    writeln!(
        out,
        "{:<26} {:<10} {:<9} {:<24} TITLE",
        "ID", "TYPE", "STATUS", "LOCATION"
    )?;
    for (kind, listing) in rows {
        let kind = kind.or(listing.kind).map_or("-", ListingKind::as_str);
        let location = listing.location.label().unwrap_or_else(|| "-".to_string());
        writeln!(
            out,
            "{:<26} {:<10} {:<9} {:<24} {}",
            listing.id,
            kind,
            listing.status.as_str(),
            truncate(&location, 24),
            display_or_dash(&listing.title)
        )?;
    }
    Ok(())
}

pub(crate) fn render_interests(interests: &[Interest], format: OutputFormat) -> CliResult<()> {
    render_with(format, interests, |out| write_interest_table(out, interests))
}

pub(crate) fn write_interest_table(out: &mut String, interests: &[Interest]) -> fmt::Result {
    writeln!(
        out,
        "{:<26} {:<9} {:<26} {:<20} MESSAGE",
        "ID", "STATUS", "LISTING", "FROM"
    )?;
    for interest in interests {
        let listing = interest
            .listing
            .as_ref()
            .map(|listing| listing.title().unwrap_or(listing.id()).to_string())
            .unwrap_or_else(|| "-".to_string());
        let sender = interest
            .sender
            .as_ref()
            .map_or_else(|| "-".to_string(), |sender| sender.label());
        writeln!(
            out,
            "{:<26} {:<9} {:<26} {:<20} {}",
            interest.id,
            interest.status.interest_label(),
            truncate(&listing, 26),
            truncate(&sender, 20),
            interest.message.as_deref().unwrap_or("")
        )?;
    }
    Ok(())
}

pub(crate) fn render_users(users: &[User], format: OutputFormat) -> CliResult<()> {
    render_with(format, users, |out| write_user_table(out, users))
}

pub(crate) fn write_user_table(out: &mut String, users: &[User]) -> fmt::Result {
    writeln!(
        out,
        "{:<26} {:<10} {:<9} {:<28} NAME",
        "ID", "ROLE", "STATUS", "EMAIL"
    )?;
    for user in users {
        writeln!(
            out,
            "{:<26} {:<10} {:<9} {:<28} {}",
            user.id,
            user.role.as_str(),
            user.status.as_str(),
            user.email.as_deref().unwrap_or("-"),
            user.display_name()
        )?;
    }
    Ok(())
}

pub(crate) fn render_profile(user: &User, format: OutputFormat) -> CliResult<()> {
    render_with(format, user, |out| {
        writeln!(out, "id: {}", user.id)?;
        writeln!(out, "name: {}", user.display_name())?;
        if let Some(email) = &user.email {
            writeln!(out, "email: {email}")?;
        }
        if let Some(phone) = &user.phone_number {
            writeln!(out, "phone: {phone}")?;
        }
        writeln!(out, "role: {}", user.role)?;
        writeln!(out, "status: {}", user.status)
    })
}

pub(crate) fn render_notifications(
    items: &[Notification],
    unread: u64,
    format: OutputFormat,
) -> CliResult<()> {
    let value = json!({ "notifications": items, "unread": unread });
    render_with(format, &value, |out| {
        writeln!(out, "{unread} unread")?;
        for item in items {
            let marker = if item.read { ' ' } else { '*' };
            writeln!(out, "{marker} {:<26} {}", item.id, item.heading())?;
            writeln!(out, "  {}", item.message)?;
            if let Some(link) = item.link() {
                writeln!(out, "  -> {link}")?;
            }
        }
        Ok(())
    })
}

pub(crate) fn render_mod_dashboard(stats: &ModDashboard, format: OutputFormat) -> CliResult<()> {
    render_with(format, stats, |out| {
        writeln!(
            out,
            "{:<10} {:>9} {:>9} {:>9}",
            "", "LISTINGS", "USERS", "INTERESTS"
        )?;
        for (label, counts) in [
            ("pending", stats.pending),
            ("approved", stats.approved),
            ("rejected", stats.rejected),
        ] {
            writeln!(
                out,
                "{label:<10} {:>9} {:>9} {:>9}",
                counts.listings, counts.users, counts.interests
            )?;
        }
        Ok(())
    })
}

pub(crate) fn render_admin_dashboard(
    stats: &AdminDashboard,
    format: OutputFormat,
) -> CliResult<()> {
    render_with(format, stats, |out| {
        let listing = &stats.listing_stats;
        writeln!(out, "active listings: {}", listing.total_active)?;
        writeln!(out, "pending listings: {}", listing.total_pending)?;
        writeln!(out, "rejected listings: {}", listing.total_rejected)?;
        writeln!(out, "users: {}", stats.total_users)?;
        writeln!(out, "active users: {}", stats.active_users)?;
        writeln!(out, "deactivated users: {}", stats.deactivated_users())
    })
}

pub(crate) fn render_analytics(overview: &AnalyticsOverview, format: OutputFormat) -> CliResult<()> {
    render_with(format, overview, |out| {
        writeln!(
            out,
            "by type: product {} / service {} / job {} / matrimony {}",
            overview.product_count,
            overview.service_count,
            overview.job_count,
            overview.matrimony_count
        )?;
        writeln!(
            out,
            "by status: active {} / pending {} / rejected {} / inactive {}",
            overview.active_listings_count,
            overview.pending_listings_count,
            overview.rejected_listings_count,
            overview.inactive_listings_count
        )?;
        if !overview.listings_trend.is_empty() {
            writeln!(out, "{:<12} {:>9} {:>9} {:>9}", "DATE", "LISTINGS", "USERS", "INTERESTS")?;
            for point in &overview.listings_trend {
                writeln!(
                    out,
                    "{:<12} {:>9} {:>9} {:>9}",
                    point.date, point.listings, point.users, point.interests
                )?;
            }
        }
        Ok(())
    })
}

pub(crate) fn render_system_config(config: &SystemConfig, format: OutputFormat) -> CliResult<()> {
    render_with(format, config, |out| {
        writeln!(out, "site name: {}", config.site_name)?;
        writeln!(out, "description: {}", config.site_description)?;
        writeln!(out, "contact: {} / {}", config.contact_email, config.contact_phone)?;
        writeln!(out, "max images per ad: {}", config.max_images_per_ad)?;
        writeln!(out, "max ad duration: {} days", config.max_ad_duration_days)?;
        writeln!(out, "require moderation: {}", config.require_moderation)?;
        writeln!(out, "allow registration: {}", config.allow_user_registration)?;
        writeln!(out, "maintenance mode: {}", config.maintenance_mode)
    })
}

pub(crate) fn render_pincode(details: &PincodeDetails, format: OutputFormat) -> CliResult<()> {
    let value = json!({
        "pincode": details.pincode,
        "city": details.district,
        "state": details.state,
    });
    render(format, &value, || {
        format!("{}: {}, {}", details.pincode, details.district, details.state)
    })
}

pub(crate) fn render_access(route: &Route, access: &Access, format: OutputFormat) -> CliResult<()> {
    let value = match access {
        Access::Allow => json!({ "route": route.path(), "allowed": true }),
        Access::Redirect { to, notice } => json!({
            "route": route.path(),
            "allowed": false,
            "redirect": to,
            "notice": notice.as_ref().map(|notice| notice.message.clone()),
        }),
    };
    render(format, &value, || match access {
        Access::Allow => format!("{route}: allowed"),
        Access::Redirect { to, .. } => format!("{route}: redirect to {to}"),
    })
}

fn display_or_dash(value: &str) -> &str {
    if value.trim().is_empty() { "-" } else { value }
}

fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    let mut cut: String = value.chars().take(width.saturating_sub(1)).collect();
    cut.push('~');
    cut
}
