//! Listings: the four classified variants and their shared envelope.
//!
//! # Design
//! - Variant-specific fields (price, salary, religion, ...) stay in
//!   `details`; the fields every variant shares are lifted onto [`Listing`].
//! - The variant is read from `listingType` or the `__t` discriminator, since
//!   the server populates one or the other depending on the endpoint.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::envelope::{null_as_default, string_or_number};
use crate::status::{ParseLabelError, Status};
use crate::user::UserRef;

/// Classified variant.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum ListingKind {
    /// Physical goods.
    Product,
    /// Offered services.
    Service,
    /// Job openings.
    Job,
    /// Matrimony profiles.
    Matrimony,
}

impl ListingKind {
    /// Every variant in display order.
    pub const ALL: [Self; 4] = [Self::Product, Self::Service, Self::Job, Self::Matrimony];

    /// Lowercase label used in URL path segments.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Product => "product",
            Self::Service => "service",
            Self::Job => "job",
            Self::Matrimony => "matrimony",
        }
    }

    /// Server-side model discriminator (`ProductListing`, ...).
    #[must_use]
    pub const fn discriminator(self) -> &'static str {
        match self {
            Self::Product => "ProductListing",
            Self::Service => "ServiceListing",
            Self::Job => "JobListing",
            Self::Matrimony => "MatrimonyListing",
        }
    }

    /// Client route showing a single listing of this variant.
    #[must_use]
    pub fn detail_route(self, id: &str) -> String {
        match self {
            Self::Product => format!("/productDetail/{id}"),
            Self::Service => format!("/serviceDetail/{id}"),
            Self::Job => format!("/jobDetail/{id}"),
            Self::Matrimony => format!("/matrimonyProfile/{id}"),
        }
    }
}

impl Display for ListingKind {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for ListingKind {
    type Err = ParseLabelError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let lowered = value.trim().to_ascii_lowercase();
        let stem = lowered.strip_suffix("listing").unwrap_or(&lowered);
        let stem = stem.strip_suffix('s').unwrap_or(stem);
        match stem {
            "product" => Ok(Self::Product),
            "service" => Ok(Self::Service),
            "job" => Ok(Self::Job),
            "matrimony" | "matrimonie" => Ok(Self::Matrimony),
            _ => Err(ParseLabelError {
                kind: "listing type",
                value: value.to_string(),
            }),
        }
    }
}

/// Postal location attached to a listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Location {
    /// Six-digit postal code.
    #[serde(default, deserialize_with = "string_or_number")]
    pub pincode: Option<String>,
    /// City / district.
    #[serde(default)]
    pub city: Option<String>,
    /// State.
    #[serde(default)]
    pub state: Option<String>,
}

impl Location {
    /// `city, state` when either is known.
    #[must_use]
    pub fn label(&self) -> Option<String> {
        match (self.city.as_deref(), self.state.as_deref()) {
            (Some(city), Some(state)) => Some(format!("{city}, {state}")),
            (Some(one), None) | (None, Some(one)) => Some(one.to_string()),
            (None, None) => None,
        }
    }
}

/// A user-submitted classified entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(from = "ListingWire")]
pub struct Listing {
    /// Server identifier.
    #[serde(rename = "_id")]
    pub id: String,
    /// Variant, when the server disclosed it.
    #[serde(rename = "listingType", skip_serializing_if = "Option::is_none")]
    pub kind: Option<ListingKind>,
    /// Title (or profile name for matrimony entries).
    pub title: String,
    /// Postal location.
    #[serde(flatten)]
    pub location: Location,
    /// Moderation / lifecycle status.
    pub status: Status,
    /// Owning user.
    #[serde(rename = "user", skip_serializing_if = "Option::is_none")]
    pub owner: Option<UserRef>,
    /// Creation timestamp.
    #[serde(rename = "createdAt", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Variant-specific fields.
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

impl Listing {
    /// Variant, falling back to `fallback` when the server omitted it.
    #[must_use]
    pub fn kind_or(&self, fallback: ListingKind) -> ListingKind {
        self.kind.unwrap_or(fallback)
    }

    /// Read a variant-specific field rendered as text.
    #[must_use]
    pub fn detail_text(&self, key: &str) -> Option<String> {
        match self.details.get(key)? {
            Value::String(text) => Some(text.clone()),
            Value::Number(number) => Some(number.to_string()),
            Value::Bool(flag) => Some(flag.to_string()),
            _ => None,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListingWire {
    #[serde(rename = "_id", default)]
    underscore_id: Option<String>,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    listing_type: Option<String>,
    #[serde(rename = "__t", default)]
    discriminator: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pincode: Option<String>,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    location: Option<Location>,
    #[serde(default, deserialize_with = "null_as_default")]
    status: Status,
    #[serde(default)]
    user: Option<UserRef>,
    #[serde(default)]
    owner: Option<UserRef>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    details: Map<String, Value>,
}

impl From<ListingWire> for Listing {
    fn from(wire: ListingWire) -> Self {
        let kind = wire
            .listing_type
            .as_deref()
            .and_then(|label| label.parse().ok())
            .or_else(|| {
                wire.discriminator
                    .as_deref()
                    .and_then(|label| label.parse().ok())
            });
        let nested = wire.location.unwrap_or_default();
        let location = Location {
            pincode: wire.pincode.or(nested.pincode),
            city: wire.city.or(nested.city),
            state: wire.state.or(nested.state),
        };
        Self {
            id: wire.underscore_id.or(wire.id).unwrap_or_default(),
            kind,
            title: wire.title.or(wire.name).unwrap_or_default(),
            location,
            status: wire.status,
            owner: wire.user.or(wire.owner),
            created_at: wire.created_at,
            details: wire.details,
        }
    }
}

/// Reference to a listing that may or may not be populated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ListingRef {
    /// Unpopulated identifier.
    Id(String),
    /// Populated listing document.
    Listing(Box<Listing>),
}

impl ListingRef {
    /// Identifier regardless of population.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Id(id) => id,
            Self::Listing(listing) => &listing.id,
        }
    }

    /// Title when populated.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        match self {
            Self::Id(_) => None,
            Self::Listing(listing) => Some(listing.title.as_str()),
        }
    }
}

/// The signed-in user's own listings, grouped by variant.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(from = "MyListingsWire")]
pub struct MyListings {
    /// Product ads.
    pub product: Vec<Listing>,
    /// Service ads.
    pub service: Vec<Listing>,
    /// Job ads.
    pub job: Vec<Listing>,
    /// Matrimony profiles.
    pub matrimony: Vec<Listing>,
}

impl MyListings {
    /// Listings of one variant.
    #[must_use]
    pub fn of_kind(&self, kind: ListingKind) -> &[Listing] {
        match kind {
            ListingKind::Product => &self.product,
            ListingKind::Service => &self.service,
            ListingKind::Job => &self.job,
            ListingKind::Matrimony => &self.matrimony,
        }
    }

    /// Every listing paired with its variant.
    pub fn iter(&self) -> impl Iterator<Item = (ListingKind, &Listing)> {
        ListingKind::ALL
            .into_iter()
            .flat_map(move |kind| self.of_kind(kind).iter().map(move |listing| (kind, listing)))
    }

    /// Total number of listings across variants.
    #[must_use]
    pub fn len(&self) -> usize {
        self.product.len() + self.service.len() + self.job.len() + self.matrimony.len()
    }

    /// Whether the user owns no listings.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Locate a listing by id.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<(ListingKind, &Listing)> {
        self.iter().find(|(_, listing)| listing.id == id)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum MyListingsWire {
    Flat(Vec<Listing>),
    Grouped {
        #[serde(default)]
        product: Vec<Listing>,
        #[serde(default)]
        service: Vec<Listing>,
        #[serde(default)]
        job: Vec<Listing>,
        #[serde(default)]
        matrimony: Vec<Listing>,
    },
}

impl From<MyListingsWire> for MyListings {
    fn from(wire: MyListingsWire) -> Self {
        match wire {
            MyListingsWire::Grouped {
                product,
                service,
                job,
                matrimony,
            } => Self {
                product,
                service,
                job,
                matrimony,
            },
            MyListingsWire::Flat(rows) => {
                let mut grouped = Self::default();
                for listing in rows {
                    match listing.kind_or(ListingKind::Product) {
                        ListingKind::Product => grouped.product.push(listing),
                        ListingKind::Service => grouped.service.push(listing),
                        ListingKind::Job => grouped.job.push(listing),
                        ListingKind::Matrimony => grouped.matrimony.push(listing),
                    }
                }
                grouped
            }
        }
    }
}
