//! Reqwest-backed adapter for the admin REST backend.
//!
//! The adapter owns transport details only: bearer headers, status mapping
//! and JSON decoding into domain types.

use std::rc::Rc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use url::Url;

use crate::api::wire::{
    Ack, DataResponse, ErrorBody, ListResponse, LocationResponse, LocationsResponse,
    LoginResponse, QuestionsResponse, UsageResponse,
};
use crate::api::{
    ApiError, ApiResult, AuthApi, KycListQuery, KycReader, KycWriter, LocationReader,
    LocationWriter, Page, Pagination, QuestionReader, QuestionWriter, SessionProvider,
    UserListQuery, UserReader, UserWriter,
};
use crate::domain::kyc::KycSubmission;
use crate::domain::location::{Location, LocationUsage};
use crate::domain::question::{Question, QuestionCategory};
use crate::domain::session::Session;
use crate::domain::types::{KycId, LocationId, QuestionId, UserId};
use crate::domain::user::{UserAccount, UserStatus};
use crate::forms::kyc::RejectKycPayload;
use crate::forms::location::{LocationPayload, LocationStatusPayload};
use crate::forms::login::LoginPayload;
use crate::forms::question::QuestionPayload;
use crate::models::config::AdminConfig;

/// `{success, message?}` envelope around a typed body.
#[derive(serde::Deserialize)]
struct Flagged<T> {
    #[serde(flatten)]
    ack: Ack,
    #[serde(flatten)]
    body: T,
}

pub struct HttpAdminApi {
    client: Client,
    base: Url,
    session: Rc<dyn SessionProvider>,
}

impl HttpAdminApi {
    /// Builds an adapter whose requests time out after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Config`] when the reqwest client cannot be built.
    pub fn new(base: Url, timeout: Duration, session: Rc<dyn SessionProvider>) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Config(e.to_string()))?;
        Ok(Self {
            client,
            base: with_trailing_slash(base),
            session,
        })
    }

    pub fn from_config(config: &AdminConfig, session: Rc<dyn SessionProvider>) -> ApiResult<Self> {
        let base = Url::parse(&config.api_url)?;
        Self::new(
            base,
            Duration::from_secs(config.request_timeout_secs),
            session,
        )
    }

    fn request(&self, method: Method, path: &str) -> ApiResult<RequestBuilder> {
        let url = self.base.join(path)?;
        let builder = self.client.request(method, url);
        Ok(match self.session.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        })
    }

    /// Sends the request and maps non-2xx statuses. `authenticated` requests
    /// report 401/403 to the session provider.
    async fn execute(
        &self,
        builder: RequestBuilder,
        authenticated: bool,
    ) -> ApiResult<(StatusCode, Vec<u8>)> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.bytes().await?.to_vec();

        if status.is_success() {
            return Ok((status, body));
        }

        if authenticated && matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            log::warn!("Backend answered {status}; clearing session");
            self.session.on_unauthorized();
            return Err(ApiError::Unauthorized);
        }
        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound);
        }

        let message = serde_json::from_slice::<ErrorBody>(&body)
            .ok()
            .and_then(ErrorBody::message);
        Err(ApiError::Rejected {
            status: status.as_u16(),
            message,
        })
    }

    async fn fetch<T: DeserializeOwned>(&self, builder: RequestBuilder) -> ApiResult<T> {
        let (_, body) = self.execute(builder, true).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn fetch_flagged<T: DeserializeOwned>(&self, builder: RequestBuilder) -> ApiResult<T> {
        let (status, body) = self.execute(builder, true).await?;
        let flagged: Flagged<T> = serde_json::from_slice(&body)?;
        if !flagged.ack.success {
            return Err(ApiError::Rejected {
                status: status.as_u16(),
                message: flagged.ack.message(),
            });
        }
        Ok(flagged.body)
    }

    async fn acknowledge(&self, builder: RequestBuilder) -> ApiResult<()> {
        let (status, body) = self.execute(builder, true).await?;
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(());
        }
        let ack: Ack = serde_json::from_slice(&body)?;
        if ack.success {
            Ok(())
        } else {
            Err(ApiError::Rejected {
                status: status.as_u16(),
                message: ack.message(),
            })
        }
    }
}

fn with_trailing_slash(mut base: Url) -> Url {
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base
}

fn page_params(page: Option<Pagination>) -> Vec<(&'static str, String)> {
    page.map(|p| vec![("page", p.page.to_string()), ("limit", p.per_page.to_string())])
        .unwrap_or_default()
}

#[async_trait(?Send)]
impl AuthApi for HttpAdminApi {
    async fn login(&self, payload: &LoginPayload) -> ApiResult<Session> {
        let url = self.base.join("auth/fakeauth")?;
        let builder = self.client.post(url).json(payload);
        let (_, body) = self.execute(builder, false).await?;
        let response: LoginResponse = serde_json::from_slice(&body)?;
        Ok(Session {
            token: response.session_token,
            user: response.user,
        })
    }
}

#[async_trait(?Send)]
impl UserReader for HttpAdminApi {
    async fn list_users(&self, query: UserListQuery) -> ApiResult<Page<UserAccount>> {
        let mut params = page_params(query.pagination);
        if let Some(search) = query.search {
            params.push(("search", search));
        }
        if let Some(status) = query.status {
            params.push(("status", status.as_str().to_string()));
        }
        if let Some(premium) = query.premium_status {
            params.push(("premiumStatus", premium.as_str().to_string()));
        }

        let builder = self.request(Method::GET, "user/users")?.query(&params);
        let response: ListResponse<UserAccount> = self.fetch(builder).await?;
        Ok(Page::new(response.data, response.pagination.total))
    }

    async fn get_user(&self, id: &UserId) -> ApiResult<UserAccount> {
        let builder = self.request(Method::GET, &format!("user/users/{id}"))?;
        let response: DataResponse<UserAccount> = self.fetch(builder).await?;
        Ok(response.data)
    }

    async fn user_stats(&self) -> ApiResult<Value> {
        let builder = self.request(Method::GET, "user/stats/users")?;
        let response: DataResponse<Value> = self.fetch(builder).await?;
        Ok(response.data)
    }
}

#[async_trait(?Send)]
impl UserWriter for HttpAdminApi {
    async fn update_user_status(&self, id: &UserId, status: UserStatus) -> ApiResult<()> {
        let builder = self
            .request(Method::PUT, &format!("user/users/{id}/status"))?
            .json(&json!({ "status": status }));
        self.acknowledge(builder).await
    }

    async fn delete_user(&self, id: &UserId) -> ApiResult<()> {
        let builder = self.request(Method::DELETE, &format!("user/users/{id}"))?;
        self.acknowledge(builder).await
    }
}

#[async_trait(?Send)]
impl KycReader for HttpAdminApi {
    async fn list_kyc(&self, query: KycListQuery) -> ApiResult<Page<KycSubmission>> {
        let mut params = page_params(query.pagination);
        if let Some(status) = query.status {
            params.push(("status", status.as_str().to_string()));
        }

        let builder = self.request(Method::GET, "kyc/all")?.query(&params);
        let response: ListResponse<KycSubmission> = self.fetch(builder).await?;
        Ok(Page::new(response.data, response.pagination.total))
    }

    async fn get_kyc(&self, id: &KycId) -> ApiResult<KycSubmission> {
        let builder = self.request(Method::GET, &format!("kyc/{id}"))?;
        let response: DataResponse<KycSubmission> = self.fetch(builder).await?;
        Ok(response.data)
    }

    async fn kyc_stats(&self) -> ApiResult<Value> {
        let builder = self.request(Method::GET, "kyc/stats")?;
        let response: DataResponse<Value> = self.fetch(builder).await?;
        Ok(response.data)
    }
}

#[async_trait(?Send)]
impl KycWriter for HttpAdminApi {
    async fn approve_kyc(&self, id: &KycId) -> ApiResult<()> {
        let builder = self.request(Method::PUT, &format!("kyc/{id}/approve"))?;
        self.acknowledge(builder).await
    }

    async fn reject_kyc(&self, id: &KycId, payload: &RejectKycPayload) -> ApiResult<()> {
        let builder = self
            .request(Method::PUT, &format!("kyc/{id}/reject"))?
            .json(payload);
        self.acknowledge(builder).await
    }
}

#[async_trait(?Send)]
impl QuestionReader for HttpAdminApi {
    async fn list_questions(&self) -> ApiResult<Vec<Question>> {
        let builder = self.request(Method::GET, "profile/questions")?;
        let response: QuestionsResponse = self.fetch_flagged(builder).await?;
        Ok(QuestionCategory::flatten(response.categories))
    }
}

#[async_trait(?Send)]
impl QuestionWriter for HttpAdminApi {
    async fn create_question(&self, payload: &QuestionPayload) -> ApiResult<()> {
        let builder = self
            .request(Method::POST, "profile/questions/create")?
            .json(payload);
        self.acknowledge(builder).await
    }

    async fn update_question(&self, id: &QuestionId, payload: &QuestionPayload) -> ApiResult<()> {
        let builder = self
            .request(Method::PATCH, &format!("profile/questions/{id}"))?
            .json(payload);
        self.acknowledge(builder).await
    }

    async fn delete_question(&self, id: &QuestionId) -> ApiResult<()> {
        let builder = self.request(Method::DELETE, &format!("profile/questions/{id}"))?;
        self.acknowledge(builder).await
    }
}

#[async_trait(?Send)]
impl LocationReader for HttpAdminApi {
    async fn list_locations(&self) -> ApiResult<Vec<Location>> {
        let builder = self.request(Method::GET, "locations")?;
        let response: LocationsResponse = self.fetch_flagged(builder).await?;
        Ok(response.locations)
    }

    async fn get_location(&self, id: &LocationId) -> ApiResult<Location> {
        let builder = self.request(Method::GET, &format!("locations/{id}"))?;
        let response: LocationResponse = self.fetch_flagged(builder).await?;
        Ok(response.location)
    }

    async fn location_usage(&self, id: &LocationId) -> ApiResult<LocationUsage> {
        let builder = self.request(Method::GET, &format!("locations/{id}/usage"))?;
        let response: UsageResponse = self.fetch_flagged(builder).await?;
        Ok(LocationUsage {
            is_in_use: response.is_in_use,
            user_count: response.user_count,
        })
    }
}

#[async_trait(?Send)]
impl LocationWriter for HttpAdminApi {
    async fn create_location(&self, payload: &LocationPayload) -> ApiResult<()> {
        let builder = self.request(Method::POST, "locations")?.json(payload);
        self.acknowledge(builder).await
    }

    async fn update_location(&self, id: &LocationId, payload: &LocationPayload) -> ApiResult<()> {
        let builder = self
            .request(Method::PUT, &format!("locations/{id}"))?
            .json(payload);
        self.acknowledge(builder).await
    }

    async fn set_location_active(
        &self,
        id: &LocationId,
        payload: LocationStatusPayload,
    ) -> ApiResult<()> {
        let builder = self
            .request(Method::PUT, &format!("locations/{id}"))?
            .json(&payload);
        self.acknowledge(builder).await
    }

    async fn delete_location(&self, id: &LocationId) -> ApiResult<()> {
        let builder = self.request(Method::DELETE, &format!("locations/{id}"))?;
        self.acknowledge(builder).await
    }
}
