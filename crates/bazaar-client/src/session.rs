//! Session context: the signed-in user plus every list the marketplace
//! pages read from.
//!
//! # Design
//! - The persisted token is the single source of truth for "signed in". After
//!   each operation the context re-checks the store; when the token has gone
//!   (a 401 cleared it) the in-memory user and per-user lists are dropped too.
//! - Catalog lists are public and survive logout; my-listings and interests
//!   belong to the user and do not.

use bazaar_api_models::{
    Interest, InterestDecision, Listing, ListingKind, LoginRequest, MyListings, RegisterRequest,
    RegisterResponse, Role, Status, User, VerifyOtpRequest,
};

use crate::api::listings::ListingQuery;
use crate::error::{ApiError, ApiResult};
use crate::guard::{Access, Route, Viewer};
use crate::http::ApiClient;
use crate::lists::{Applied, ResourceList};
use crate::notice::Notice;
use crate::storage::StoredSession;

/// Shared state behind every page.
#[derive(Debug)]
pub struct SessionContext {
    client: ApiClient,
    user: Option<User>,
    catalog: [ResourceList<Listing>; 4],
    my_listings: MyListings,
    sent: ResourceList<Interest>,
    received: ResourceList<Interest>,
}

const fn slot(kind: ListingKind) -> usize {
    match kind {
        ListingKind::Product => 0,
        ListingKind::Service => 1,
        ListingKind::Job => 2,
        ListingKind::Matrimony => 3,
    }
}

impl SessionContext {
    /// Context with nothing loaded.
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            user: None,
            catalog: Default::default(),
            my_listings: MyListings::default(),
            sent: ResourceList::new(),
            received: ResourceList::new(),
        }
    }

    /// API handle.
    #[must_use]
    pub const fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Signed-in user, once the profile has been fetched.
    #[must_use]
    pub const fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// Whether a token is stored.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.client.is_authenticated()
    }

    /// Public catalog for `kind`.
    #[must_use]
    pub const fn catalog(&self, kind: ListingKind) -> &ResourceList<Listing> {
        &self.catalog[slot(kind)]
    }

    /// The user's own ads.
    #[must_use]
    pub const fn my_listings(&self) -> &MyListings {
        &self.my_listings
    }

    /// Interests the user sent.
    #[must_use]
    pub const fn sent_interests(&self) -> &ResourceList<Interest> {
        &self.sent
    }

    /// Interests the user received on their ads.
    #[must_use]
    pub const fn received_interests(&self) -> &ResourceList<Interest> {
        &self.received
    }

    /// Sign in, persist the session, fetch the profile, and return the
    /// landing route for the user's role.
    ///
    /// # Errors
    ///
    /// Propagates the login failure after announcing it, or
    /// [`ApiError::Storage`] when the session cannot be persisted.
    pub async fn login(&mut self, email: &str, password: &str) -> ApiResult<&'static str> {
        let request = LoginRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        let response = match self.client.login(&request).await {
            Ok(response) => response,
            Err(err) => {
                let fallback = if err.is_unauthorized() {
                    "Invalid email or password"
                } else {
                    "Login failed"
                };
                self.client.report(&err, fallback);
                return Err(err);
            }
        };
        let Some(token) = response.token.filter(|token| !token.trim().is_empty()) else {
            let message = "Login failed. Please check your credentials.";
            self.client.notify(Notice::error(message));
            return Err(ApiError::Rejected {
                message: response.message.or_else(|| Some(message.to_string())),
            });
        };

        let user_id = response.user.as_ref().map(|user| user.id.clone());
        self.client
            .store()
            .save(&StoredSession::new(token, user_id))?;
        tracing::info!(email = %request.email, "signed in");

        let login_role = response.user.as_ref().map(|user| user.role);
        if let Err(err) = self.load_profile().await.map(|_| ()) {
            tracing::warn!(error = %err, "profile fetch after login failed");
            self.user = response.user;
        }
        let role = login_role
            .or_else(|| self.user.as_ref().map(|user| user.role))
            .unwrap_or_default();
        self.client.notify(Notice::success("Login successful"));
        Ok(role.landing_route())
    }

    /// Create an account pending OTP verification.
    ///
    /// # Errors
    ///
    /// Propagates validation and request failures after announcing them.
    pub async fn register(&mut self, request: &RegisterRequest) -> ApiResult<RegisterResponse> {
        let response = match self.client.register(request).await {
            Ok(response) => response,
            Err(err) => {
                self.client.report(&err, "Registration failed");
                return Err(err);
            }
        };
        if !response.success {
            let message = "Registration failed. Please try again.";
            self.client.notify(Notice::error(message));
            return Err(ApiError::Rejected {
                message: response.message.or_else(|| Some(message.to_string())),
            });
        }
        self.client.notify(Notice::success(
            response
                .message
                .clone()
                .unwrap_or_else(|| "Registration successful".to_string()),
        ));
        Ok(response)
    }

    /// Verify the sign-up OTP; on success the returned token becomes the
    /// session. Returns the route to continue to.
    ///
    /// # Errors
    ///
    /// Propagates validation and request failures after announcing them.
    pub async fn verify_otp(&mut self, user_id: &str, otp: &str) -> ApiResult<&'static str> {
        let request = VerifyOtpRequest {
            user_id: user_id.to_string(),
            otp: otp.trim().to_string(),
        };
        let response = match self.client.verify_otp(&request).await {
            Ok(response) => response,
            Err(err) => {
                self.client.report(&err, "Invalid OTP");
                return Err(err);
            }
        };
        let token = response
            .token
            .filter(|token| response.success && !token.trim().is_empty());
        let Some(token) = token else {
            let message = "Invalid OTP. Please try again.";
            self.client.notify(Notice::error(message));
            return Err(ApiError::Rejected {
                message: response.message.or_else(|| Some(message.to_string())),
            });
        };
        let user_id = response.user_id.or_else(|| Some(user_id.to_string()));
        self.client
            .store()
            .save(&StoredSession::new(token, user_id))?;
        self.client.notify(Notice::success("OTP verified successfully"));
        if let Err(err) = self.load_profile().await.map(|_| ()) {
            tracing::warn!(error = %err, "profile fetch after verification failed");
        }
        Ok(Role::User.landing_route())
    }

    /// Clear the persisted session and every per-user list.
    ///
    /// In-memory state is dropped even when the store cannot be cleared.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Storage`] when the persisted session survives.
    pub fn logout(&mut self) -> ApiResult<()> {
        self.drop_user_state();
        tracing::info!("signed out");
        self.client.store().clear()
    }

    /// Fetch the profile of the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] without a token, otherwise propagates
    /// the request failure.
    pub async fn load_profile(&mut self) -> ApiResult<&User> {
        if !self.client.is_authenticated() {
            return Err(ApiError::validation("Not signed in"));
        }
        match self.client.profile().await {
            Ok(user) => Ok(&*self.user.insert(user)),
            Err(err) => {
                self.sync_with_store();
                Err(err)
            }
        }
    }

    /// Reload one catalog variant.
    pub async fn browse(&mut self, kind: ListingKind, query: &ListingQuery) -> Applied {
        let applied = load_catalog(&mut self.catalog[slot(kind)], &self.client, kind, query).await;
        self.sync_with_store();
        applied
    }

    /// Reload all four catalogs concurrently, first page, no filters.
    pub async fn refresh_catalog(&mut self) -> [Applied; 4] {
        let query = ListingQuery::default();
        let client = &self.client;
        let [product, service, job, matrimony] = &mut self.catalog;
        let (product, service, job, matrimony) = tokio::join!(
            load_catalog(product, client, ListingKind::Product, &query),
            load_catalog(service, client, ListingKind::Service, &query),
            load_catalog(job, client, ListingKind::Job, &query),
            load_catalog(matrimony, client, ListingKind::Matrimony, &query),
        );
        self.sync_with_store();
        [product, service, job, matrimony]
    }

    /// Reload my-listings and both interest lists concurrently. Without a
    /// token the lists are emptied and nothing is requested.
    pub async fn refresh_session_lists(&mut self) {
        if !self.client.is_authenticated() {
            self.drop_user_state();
            return;
        }
        let client = &self.client;
        let (mine, (), ()) = tokio::join!(
            client.my_listings(),
            load_interests(&mut self.sent, client, true),
            load_interests(&mut self.received, client, false),
        );
        self.apply_my_listings(mine);
        self.sync_with_store();
    }

    /// Reload the user's own ads.
    pub async fn refresh_my_listings(&mut self) {
        let mine = self.client.my_listings().await;
        self.apply_my_listings(mine);
        self.sync_with_store();
    }

    /// Express interest in a listing, then refresh the sent list.
    ///
    /// # Errors
    ///
    /// Propagates the request failure after announcing it.
    pub async fn express_interest(
        &mut self,
        listing_id: &str,
        kind: ListingKind,
        message: &str,
    ) -> ApiResult<()> {
        if let Err(err) = self
            .client
            .express_interest(listing_id, kind, message)
            .await
        {
            self.client.report(&err, "Failed to show interest");
            self.sync_with_store();
            return Err(err);
        }
        self.client
            .notify(Notice::success("Interest shown successfully"));
        load_interests(&mut self.sent, &self.client, true).await;
        Ok(())
    }

    /// Accept or reject a received interest and patch the local row.
    ///
    /// # Errors
    ///
    /// Propagates the request failure after announcing it.
    pub async fn respond_to_interest(
        &mut self,
        interest_id: &str,
        decision: InterestDecision,
        reply: Option<String>,
    ) -> ApiResult<()> {
        let status = decision.target_status();
        if let Err(err) = self
            .client
            .respond_to_interest(interest_id, decision, reply)
            .await
        {
            self.client.report(&err, "Failed to respond to interest");
            self.sync_with_store();
            return Err(err);
        }
        self.received.patch_where(
            |interest| interest.id == interest_id,
            |interest| interest.status = status,
        );
        self.client.notify(Notice::success(format!(
            "Interest {} successfully",
            status.interest_label()
        )));
        Ok(())
    }

    /// Deactivate one of the user's ads, then refetch my-listings.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] when the ad is not active, otherwise
    /// propagates the request failure after announcing it.
    pub async fn deactivate_listing(&mut self, kind: ListingKind, id: &str) -> ApiResult<()> {
        if let Some((_, listing)) = self.my_listings.find(id)
            && !listing.status.can_transition_to(Status::Inactive)
        {
            return Err(ApiError::validation(format!(
                "Only active ads can be deactivated (this one is {})",
                listing.status
            )));
        }
        if let Err(err) = self.client.deactivate_listing(kind, id).await {
            self.client.report(&err, "Failed to deactivate ad");
            self.sync_with_store();
            return Err(err);
        }
        self.client
            .notify(Notice::success("Ad deactivated successfully"));
        self.refresh_my_listings().await;
        Ok(())
    }

    /// Evaluate `route`'s guard for the current viewer.
    ///
    /// A stored token with no known user triggers a profile fetch first. Any
    /// notice attached to a redirect is delivered before returning.
    pub async fn authorize(&mut self, route: &Route) -> Access {
        if self.client.is_authenticated()
            && self.user.is_none()
            && let Err(err) = self.load_profile().await.map(|_| ())
        {
            tracing::warn!(route = %route, error = %err, "profile unavailable for guard");
        }
        let viewer = Viewer {
            has_token: self.client.is_authenticated(),
            role: self.user.as_ref().map(|user| user.role),
        };
        let access = route.guard().evaluate(viewer);
        if let Access::Redirect { to, notice } = &access {
            tracing::debug!(route = %route, to, "route guard redirected");
            if let Some(notice) = notice {
                self.client.notify(notice.clone());
            }
        }
        access
    }

    fn apply_my_listings(&mut self, result: ApiResult<MyListings>) {
        match result {
            Ok(mine) => self.my_listings = mine,
            Err(err) => {
                tracing::warn!(error = %err, "my-listings fetch failed");
                self.client.report(&err, "Failed to fetch your ads");
                self.my_listings = MyListings::default();
            }
        }
    }

    fn sync_with_store(&mut self) {
        if self.client.is_authenticated() {
            return;
        }
        if self.user.is_some()
            || !self.my_listings.is_empty()
            || !self.sent.is_empty()
            || !self.received.is_empty()
        {
            tracing::info!("session token gone; dropping signed-in state");
        }
        self.drop_user_state();
    }

    fn drop_user_state(&mut self) {
        self.user = None;
        self.my_listings = MyListings::default();
        self.sent.clear();
        self.received.clear();
    }
}

async fn load_catalog(
    list: &mut ResourceList<Listing>,
    client: &ApiClient,
    kind: ListingKind,
    query: &ListingQuery,
) -> Applied {
    let failure = format!("Failed to fetch {kind} listings");
    let fetch = async {
        let mut page = client.browse_listings(kind, query).await?;
        for listing in &mut page.items {
            listing.kind = listing.kind.or(Some(kind));
        }
        Ok::<_, ApiError>(page)
    };
    list.load(client, query.page, &failure, fetch).await
}

async fn load_interests(list: &mut ResourceList<Interest>, client: &ApiClient, sent: bool) {
    if sent {
        list.load(client, 1, "Failed to fetch sent interests", client.sent_interests())
            .await;
    } else {
        list.load(
            client,
            1,
            "Failed to fetch received interests",
            client.received_interests(),
        )
        .await;
    }
}
