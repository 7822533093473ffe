//! Declarative route table and access guards.
//!
//! Every route carries a [`Guard`]; [`Guard::evaluate`] decides whether a
//! viewer may enter or where they are sent instead. The session context
//! supplies the viewer (see `SessionContext::authorize`).

use std::fmt::{self, Display, Formatter};

use bazaar_api_models::{ListingKind, Role};

use crate::notice::Notice;

/// Notice shown when a signed-in user lacks the role a page requires.
pub const PERMISSION_DENIED_MESSAGE: &str = "You don't have permission to access this page";

/// Notice shown when the role of a signed-in user cannot be determined.
pub const AUTH_ERROR_MESSAGE: &str = "Authentication error. Please log in again.";

/// Access rule attached to a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guard {
    /// Anyone may enter.
    Public,
    /// Only visitors without a session; signed-in users go home.
    GuestOnly,
    /// Only signed-in users; everyone else goes to the login page.
    Authenticated,
    /// Only signed-in users holding at least this role.
    Role(Role),
}

/// Who is asking for a route.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Viewer {
    /// Whether a bearer token is stored.
    pub has_token: bool,
    /// Role of the signed-in user, once known.
    pub role: Option<Role>,
}

/// Outcome of evaluating a guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    /// The viewer may enter.
    Allow,
    /// The viewer is sent to `to`, optionally with a notice.
    Redirect {
        /// Destination path.
        to: &'static str,
        /// Notice to show alongside the redirect.
        notice: Option<Notice>,
    },
}

impl Access {
    /// Whether the viewer may enter.
    #[must_use]
    pub const fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }

    const fn to(to: &'static str) -> Self {
        Self::Redirect { to, notice: None }
    }
}

impl Guard {
    /// Decide whether `viewer` may enter.
    #[must_use]
    pub fn evaluate(self, viewer: Viewer) -> Access {
        match self {
            Self::Public => Access::Allow,
            Self::GuestOnly if viewer.has_token => Access::to("/"),
            Self::GuestOnly => Access::Allow,
            Self::Authenticated if viewer.has_token => Access::Allow,
            Self::Authenticated => Access::to("/login"),
            Self::Role(_) if !viewer.has_token => Access::to("/login"),
            Self::Role(required) => match viewer.role {
                Some(role) if role.satisfies(required) => Access::Allow,
                Some(_) => Access::Redirect {
                    to: "/",
                    notice: Some(Notice::error(PERMISSION_DENIED_MESSAGE)),
                },
                None => Access::Redirect {
                    to: "/login",
                    notice: Some(Notice::error(AUTH_ERROR_MESSAGE)),
                },
            },
        }
    }
}

/// Pages of the admin panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminPage {
    /// `/admin/dashboard` (also the `/admin` index).
    Dashboard,
    /// `/admin/analytics`.
    Analytics,
    /// `/admin/listings/all`.
    AllListings,
    /// `/admin/listings/pending`.
    PendingListings,
    /// `/admin/users/all`.
    AllUsers,
    /// `/admin/users/moderators`.
    Moderators,
    /// `/admin/interests`.
    Interests,
    /// `/admin/settings/system`.
    SystemSettings,
}

impl AdminPage {
    const fn segment(self) -> &'static str {
        match self {
            Self::Dashboard => "dashboard",
            Self::Analytics => "analytics",
            Self::AllListings => "listings/all",
            Self::PendingListings => "listings/pending",
            Self::AllUsers => "users/all",
            Self::Moderators => "users/moderators",
            Self::Interests => "interests",
            Self::SystemSettings => "settings/system",
        }
    }

    fn from_segment(segment: &str) -> Option<Self> {
        [
            Self::Dashboard,
            Self::Analytics,
            Self::AllListings,
            Self::PendingListings,
            Self::AllUsers,
            Self::Moderators,
            Self::Interests,
            Self::SystemSettings,
        ]
        .into_iter()
        .find(|page| page.segment() == segment)
    }
}

/// Pages of the moderator panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeratorPage {
    /// `/moderator/dashboard` (also the `/moderator` index).
    Dashboard,
    /// `/moderator/listings`.
    Listings,
    /// `/moderator/users`.
    Users,
    /// `/moderator/interests`.
    Interests,
}

impl ModeratorPage {
    const fn segment(self) -> &'static str {
        match self {
            Self::Dashboard => "dashboard",
            Self::Listings => "listings",
            Self::Users => "users",
            Self::Interests => "interests",
        }
    }

    fn from_segment(segment: &str) -> Option<Self> {
        [Self::Dashboard, Self::Listings, Self::Users, Self::Interests]
            .into_iter()
            .find(|page| page.segment() == segment)
    }
}

/// Every page of the marketplace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// `/`.
    Home,
    /// `/login`.
    Login,
    /// `/signup`.
    Signup,
    /// `/verifyOtp`.
    VerifyOtp,
    /// `/profile`.
    Profile,
    /// `/products`, `/services`, `/jobs`, `/matrimony`.
    Browse(ListingKind),
    /// `/productDetail/:id` and friends.
    Detail(ListingKind, String),
    /// `/postAd`.
    PostAd,
    /// `/ads`.
    MyAds,
    /// `/interests`.
    Interests,
    /// `/editProduct/:id`, `/editService/:id`, `/editJob/:id`.
    Edit(ListingKind, String),
    /// `/search-results`.
    SearchResults,
    /// `/admin/*`.
    Admin(AdminPage),
    /// `/moderator/*`.
    Moderator(ModeratorPage),
    /// Anything else.
    NotFound,
}

impl Route {
    /// Map a concrete path (query and fragment ignored) to its route.
    #[must_use]
    pub fn resolve(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = path.trim_matches('/');
        if trimmed.is_empty() {
            return Self::Home;
        }
        let (head, rest) = trimmed.split_once('/').unwrap_or((trimmed, ""));
        match (head, rest) {
            ("login", "") => Self::Login,
            ("signup", "") => Self::Signup,
            ("verifyOtp", "") => Self::VerifyOtp,
            ("profile", "") => Self::Profile,
            ("products", "") => Self::Browse(ListingKind::Product),
            ("services", "") => Self::Browse(ListingKind::Service),
            ("jobs", "") => Self::Browse(ListingKind::Job),
            ("matrimony", "") => Self::Browse(ListingKind::Matrimony),
            ("postAd", "") => Self::PostAd,
            ("ads", "") => Self::MyAds,
            ("interests", "") => Self::Interests,
            ("search-results", "") => Self::SearchResults,
            ("admin", "") => Self::Admin(AdminPage::Dashboard),
            ("admin", page) => AdminPage::from_segment(page).map_or(Self::NotFound, Self::Admin),
            ("moderator", "") => Self::Moderator(ModeratorPage::Dashboard),
            ("moderator", page) => {
                ModeratorPage::from_segment(page).map_or(Self::NotFound, Self::Moderator)
            }
            (_, id) if !id.is_empty() && !id.contains('/') => {
                Self::with_id(head, id).unwrap_or(Self::NotFound)
            }
            _ => Self::NotFound,
        }
    }

    fn with_id(head: &str, id: &str) -> Option<Self> {
        let id = id.to_string();
        let route = match head {
            "productDetail" => Self::Detail(ListingKind::Product, id),
            "serviceDetail" => Self::Detail(ListingKind::Service, id),
            "jobDetail" => Self::Detail(ListingKind::Job, id),
            "matrimonyProfile" => Self::Detail(ListingKind::Matrimony, id),
            "editProduct" => Self::Edit(ListingKind::Product, id),
            "editService" => Self::Edit(ListingKind::Service, id),
            "editJob" => Self::Edit(ListingKind::Job, id),
            _ => return None,
        };
        Some(route)
    }

    /// Canonical path.
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Home => "/".to_string(),
            Self::Login => "/login".to_string(),
            Self::Signup => "/signup".to_string(),
            Self::VerifyOtp => "/verifyOtp".to_string(),
            Self::Profile => "/profile".to_string(),
            Self::Browse(ListingKind::Product) => "/products".to_string(),
            Self::Browse(ListingKind::Service) => "/services".to_string(),
            Self::Browse(ListingKind::Job) => "/jobs".to_string(),
            Self::Browse(ListingKind::Matrimony) => "/matrimony".to_string(),
            Self::Detail(kind, id) => kind.detail_route(id),
            Self::PostAd => "/postAd".to_string(),
            Self::MyAds => "/ads".to_string(),
            Self::Interests => "/interests".to_string(),
            Self::Edit(kind, id) => {
                let name = match kind {
                    ListingKind::Product => "Product",
                    ListingKind::Service => "Service",
                    ListingKind::Job => "Job",
                    ListingKind::Matrimony => "Matrimony",
                };
                format!("/edit{name}/{id}")
            }
            Self::SearchResults => "/search-results".to_string(),
            Self::Admin(page) => format!("/admin/{}", page.segment()),
            Self::Moderator(page) => format!("/moderator/{}", page.segment()),
            Self::NotFound => "/404".to_string(),
        }
    }

    /// Access rule for the route.
    #[must_use]
    pub const fn guard(&self) -> Guard {
        match self {
            Self::Login | Self::Signup | Self::VerifyOtp => Guard::GuestOnly,
            Self::Profile | Self::PostAd | Self::MyAds | Self::Interests | Self::Edit(..) => {
                Guard::Authenticated
            }
            Self::Admin(_) => Guard::Role(Role::Admin),
            Self::Moderator(_) => Guard::Role(Role::Moderator),
            Self::Home
            | Self::Browse(_)
            | Self::Detail(..)
            | Self::SearchResults
            | Self::NotFound => Guard::Public,
        }
    }
}

impl Display for Route {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.path())
    }
}
