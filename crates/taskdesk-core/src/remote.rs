//! Remote data access: cached reads, mutations with cache invalidation and
//! the Task endpoints built on top of them.

use std::rc::Rc;

use futures::FutureExt;
use futures::future::join_all;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use taskdesk_shared::{TaskCreate, TaskDto, TaskPage, TaskPatch};
use tracing::{info, warn};

use crate::cache::{QueryCache, QueryKey};
use crate::error::ApiError;
use crate::notify::{ErrorToast, Notification, NotificationSink};
use crate::query::{TaskListParams, to_params};
use crate::transport::{ApiRequest, Method, Transport};

pub const LIST_TASKS: &str = "getTasks";
pub const GET_TASK: &str = "getTask";

/// Transport, read cache and error toasts bundled together.
pub struct RemoteClient {
    transport: Rc<dyn Transport>,
    notifier: Rc<dyn NotificationSink>,
    cache: QueryCache,
}

impl RemoteClient {
    pub fn new(transport: Rc<dyn Transport>, notifier: Rc<dyn NotificationSink>) -> Self {
        Self {
            transport,
            notifier,
            cache: QueryCache::new(),
        }
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    /// Uncached call; used by mutations.
    pub async fn fetch_data<R: DeserializeOwned>(&self, request: ApiRequest, toast: ErrorToast) -> Result<R, ApiError> {
        let value = execute(self.transport.clone(), self.notifier.clone(), request, toast).await?;
        decode(value)
    }

    /// Cached read. Every issued request toasts its own failure once, no
    /// matter how many callers share it.
    pub async fn query<R: DeserializeOwned>(
        &self,
        key: &QueryKey,
        request: ApiRequest,
        toast: ErrorToast,
    ) -> Result<R, ApiError> {
        let transport = self.transport.clone();
        let notifier = self.notifier.clone();
        let value = self
            .cache
            .fetch(key, move || execute(transport, notifier, request, toast).boxed_local())
            .await?;
        decode(value)
    }

    pub fn invalidate(&self, operation: &str, params: Option<&Value>) -> usize {
        self.cache.invalidate(operation, params)
    }
}

#[tracing::instrument(skip_all, fields(method = request.method.as_str(), path = %request.path))]
async fn execute(
    transport: Rc<dyn Transport>,
    notifier: Rc<dyn NotificationSink>,
    request: ApiRequest,
    toast: ErrorToast,
) -> Result<Value, ApiError> {
    let outcome = match transport.send(&request).await {
        Ok(response) if response.is_success() => Ok(parse_body(&response.body)),
        Ok(response) => Err(ApiError::from_response(response.status, &response.body, &request.path)),
        Err(err) => Err(ApiError::network(&err)),
    };

    if let Err(err) = &outcome {
        warn!(status = err.status_code, class = ?err.class(), error = %err, "request failed");
        if toast.should_notify(err) {
            notifier.notify(Notification::error(err.notification_text()));
        }
    }
    outcome
}

/// Empty bodies read as `null`; bodies that are not JSON are kept as text.
fn parse_body(body: &str) -> Value {
    if body.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_string()))
}

fn decode<R: DeserializeOwned>(value: Value) -> Result<R, ApiError> {
    serde_json::from_value(value).map_err(ApiError::decode)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkAction {
    Delete,
    Restore,
}

impl BulkAction {
    pub fn for_trash_view(is_trash: bool) -> Self {
        if is_trash { BulkAction::Restore } else { BulkAction::Delete }
    }

    pub fn is_restore(self) -> bool {
        self == BulkAction::Restore
    }
}

/// Settled result of one id in a bulk request.
#[derive(Debug, Clone, PartialEq)]
pub struct BulkOutcome {
    pub id: String,
    pub result: Result<(), ApiError>,
}

impl BulkOutcome {
    pub fn is_fulfilled(&self) -> bool {
        self.result.is_ok()
    }
}

pub struct TaskApi {
    remote: RemoteClient,
}

impl TaskApi {
    pub fn new(remote: RemoteClient) -> Self {
        Self { remote }
    }

    /// Forgets every cached task read, e.g. after the API base URL changed.
    pub fn drop_cached_reads(&self) {
        let lists = self.remote.invalidate(LIST_TASKS, None);
        let tasks = self.remote.invalidate(GET_TASK, None);
        info!(lists, tasks, "dropped cached task reads");
    }

    #[tracing::instrument(skip_all, fields(page = params.query.page, limit = params.query.limit))]
    pub async fn list(&self, params: &TaskListParams) -> Result<TaskPage, ApiError> {
        let key = QueryKey::new(LIST_TASKS, params)?;
        let request = ApiRequest::get("/tasks").with_params(to_params(params));
        self.remote.query(&key, request, ErrorToast::Show).await
    }

    /// 404 is left to the caller, which renders a not-found placeholder.
    #[tracing::instrument(skip(self))]
    pub async fn get(&self, id: &str) -> Result<TaskDto, ApiError> {
        let key = QueryKey::new(GET_TASK, &id)?;
        let request = ApiRequest::get(format!("/tasks/{id}"));
        self.remote.query(&key, request, ErrorToast::HideStatus(404)).await
    }

    #[tracing::instrument(skip_all)]
    pub async fn create(&self, body: &TaskCreate) -> Result<TaskDto, ApiError> {
        let payload = serde_json::to_value(body).map_err(ApiError::decode)?;
        let created: TaskDto = self
            .remote
            .fetch_data(ApiRequest::post("/tasks", payload), ErrorToast::HideValidation)
            .await?;
        self.remote.invalidate(LIST_TASKS, None);
        info!(id = %created.id, "task created");
        Ok(created)
    }

    #[tracing::instrument(skip(self, patch))]
    pub async fn update(&self, id: &str, patch: &TaskPatch) -> Result<TaskDto, ApiError> {
        let payload = serde_json::to_value(patch).map_err(ApiError::decode)?;
        let updated: TaskDto = self
            .remote
            .fetch_data(ApiRequest::patch(format!("/tasks/{id}"), payload), ErrorToast::HideValidation)
            .await?;
        self.remote.invalidate(LIST_TASKS, None);
        self.remote.invalidate(GET_TASK, Some(&json!(id)));
        info!(id, "task updated");
        Ok(updated)
    }

    pub async fn delete_many(&self, ids: &[String]) -> Vec<BulkOutcome> {
        self.bulk(BulkAction::Delete, ids).await
    }

    pub async fn restore_many(&self, ids: &[String]) -> Vec<BulkOutcome> {
        self.bulk(BulkAction::Restore, ids).await
    }

    /// One request per id, all issued at once and all awaited.
    #[tracing::instrument(skip(self, ids), fields(count = ids.len()))]
    pub async fn bulk(&self, action: BulkAction, ids: &[String]) -> Vec<BulkOutcome> {
        let requests = ids.iter().map(|id| {
            let request = match action {
                BulkAction::Delete => ApiRequest::delete(format!("/tasks/{id}")),
                BulkAction::Restore => ApiRequest::new(Method::Patch, format!("/tasks/{id}/restore")),
            };
            async move {
                let result = self
                    .remote
                    .fetch_data::<Value>(request, ErrorToast::Hide)
                    .await
                    .map(|_| ());
                BulkOutcome { id: id.clone(), result }
            }
        });
        let outcomes = join_all(requests).await;

        self.remote.invalidate(LIST_TASKS, None);
        for outcome in outcomes.iter().filter(|outcome| outcome.is_fulfilled()) {
            self.remote.invalidate(GET_TASK, Some(&json!(outcome.id)));
        }

        let succeeded = outcomes.iter().filter(|outcome| outcome.is_fulfilled()).count();
        info!(?action, succeeded, failed = outcomes.len() - succeeded, "bulk request settled");
        outcomes
    }
}
