use std::cell::RefCell;
use std::rc::Rc;

use async_trait::async_trait;
use futures::executor::block_on;
use futures::future::join;
use taskdesk_core::filter_state::FilterDefaults;
use taskdesk_core::form::{FormTarget, SubmitOutcome, TaskFormValues, submit_task};
use taskdesk_core::notify::{NotificationLog, Variant};
use taskdesk_core::query::TaskListParams;
use taskdesk_core::remote::{RemoteClient, TaskApi};
use taskdesk_core::transport::{ApiRequest, ApiResponse, Method, Transport, TransportError};

const TASK_A: &str = "0b8f2c4e-3f7a-4d0e-9a51-6c2f1e7d9a01";
const TASK_B: &str = "5d1e9b73-8c2a-4f6b-b0d4-2e7a9c3f1b02";

type Responder = Box<dyn Fn(&ApiRequest) -> Result<ApiResponse, TransportError>>;

/// Records every request and answers from a fixed script.
struct ScriptedTransport {
    requests: RefCell<Vec<ApiRequest>>,
    respond: Responder,
}

impl ScriptedTransport {
    fn new(respond: impl Fn(&ApiRequest) -> Result<ApiResponse, TransportError> + 'static) -> Rc<Self> {
        Rc::new(Self {
            requests: RefCell::new(Vec::new()),
            respond: Box::new(respond),
        })
    }

    fn count(&self, method: Method, path: &str) -> usize {
        self.requests
            .borrow()
            .iter()
            .filter(|request| request.method == method && request.path == path)
            .count()
    }

    fn total(&self) -> usize {
        self.requests.borrow().len()
    }
}

#[async_trait(?Send)]
impl Transport for ScriptedTransport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        self.requests.borrow_mut().push(request.clone());
        (self.respond)(request)
    }
}

fn ok(body: &str) -> Result<ApiResponse, TransportError> {
    Ok(ApiResponse {
        status: 200,
        body: body.to_string(),
    })
}

fn status(code: u16, body: &str) -> Result<ApiResponse, TransportError> {
    Ok(ApiResponse {
        status: code,
        body: body.to_string(),
    })
}

fn task_json(id: &str, title: &str) -> String {
    format!(r#"{{"id":"{id}","title":"{title}","status":"TO_DO"}}"#)
}

fn page_json() -> String {
    format!(
        r#"{{"data":[{}],"total":1,"page":1,"limit":10,"totalPages":1}}"#,
        task_json(TASK_A, "Write docs")
    )
}

/// Happy-path backend: lists, reads, creates, updates, deletes and restores.
fn backend(request: &ApiRequest) -> Result<ApiResponse, TransportError> {
    match (request.method, request.path.as_str()) {
        (Method::Get, "/tasks") => ok(&page_json()),
        (Method::Get, path) => {
            let id = path.trim_start_matches("/tasks/");
            ok(&task_json(id, "Write docs"))
        }
        (Method::Post, "/tasks") => ok(&task_json(TASK_B, "New task")),
        (Method::Patch, path) if path.ends_with("/restore") => ok(""),
        (Method::Patch, path) => {
            let id = path.trim_start_matches("/tasks/");
            ok(&task_json(id, "Renamed"))
        }
        (Method::Delete, _) => ok(""),
        _ => status(404, ""),
    }
}

fn api_with(transport: Rc<ScriptedTransport>) -> (TaskApi, Rc<NotificationLog>) {
    let log = Rc::new(NotificationLog::default());
    let remote = RemoteClient::new(transport, log.clone());
    (TaskApi::new(remote), log)
}

fn list_params() -> TaskListParams {
    TaskListParams::from_state(&FilterDefaults::default().state())
}

#[test]
fn list_reads_are_cached_until_a_create_invalidates_them() {
    let transport = ScriptedTransport::new(backend);
    let (api, log) = api_with(transport.clone());
    let params = list_params();

    let first = block_on(api.list(&params)).expect("first list");
    let second = block_on(api.list(&params)).expect("second list");
    assert_eq!(first, second);
    assert_eq!(first.data.len(), 1);
    assert_eq!(transport.count(Method::Get, "/tasks"), 1);

    let values = TaskFormValues {
        title: "New task".to_string(),
        ..TaskFormValues::default()
    };
    let outcome = block_on(submit_task(&api, &FormTarget::Create, &values));
    assert!(matches!(outcome, SubmitOutcome::Created(_)));

    block_on(api.list(&params)).expect("list after create");
    assert_eq!(transport.count(Method::Get, "/tasks"), 2);
    assert!(log.is_empty());
}

#[test]
fn concurrent_identical_reads_share_one_request() {
    let transport = ScriptedTransport::new(backend);
    let (api, _log) = api_with(transport.clone());
    let params = list_params();

    let (a, b) = block_on(join(api.list(&params), api.list(&params)));
    assert_eq!(a.expect("first caller"), b.expect("second caller"));
    assert_eq!(transport.count(Method::Get, "/tasks"), 1);
}

#[test]
fn list_params_reach_the_query_string() {
    let transport = ScriptedTransport::new(backend);
    let (api, _log) = api_with(transport.clone());

    block_on(api.list(&list_params())).expect("list");
    let requests = transport.requests.borrow();
    let params = &requests[0].params;
    assert!(params.contains(&("page".to_string(), "1".to_string())));
    assert!(params.contains(&("limit".to_string(), "10".to_string())));
    assert!(params.contains(&("trash".to_string(), "false".to_string())));
}

#[test]
fn forbidden_list_is_toasted_with_the_request_path() {
    let transport = ScriptedTransport::new(|_| {
        status(403, r#"{"error":"Forbidden","message":"Missing permission","statusCode":403}"#)
    });
    let (api, log) = api_with(transport);

    let err = block_on(api.list(&list_params())).expect_err("403 must fail");
    assert_eq!(err.status_code, 403);

    let toasts = log.take();
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].variant, Variant::Error);
    assert_eq!(toasts[0].message, "Forbidden. Missing permission. /tasks");
}

#[test]
fn failed_reads_are_not_cached() {
    let transport = ScriptedTransport::new(|_| status(500, r#"{"error":"Internal Server Error","statusCode":500}"#));
    let (api, log) = api_with(transport.clone());
    let params = list_params();

    block_on(api.list(&params)).expect_err("first attempt");
    block_on(api.list(&params)).expect_err("second attempt");
    assert_eq!(transport.count(Method::Get, "/tasks"), 2);
    assert_eq!(log.len(), 2);
}

#[test]
fn network_failures_are_toasted_as_network_errors() {
    let transport = ScriptedTransport::new(|_| {
        Err(TransportError::Network {
            url: "http://localhost:3000/tasks".to_string(),
            reason: "connection refused".to_string(),
        })
    });
    let (api, log) = api_with(transport);

    let err = block_on(api.list(&list_params())).expect_err("network failure");
    assert_eq!(err.status_code, 0);

    let toasts = log.take();
    assert_eq!(toasts.len(), 1);
    assert!(toasts[0].message.starts_with("Network Error. "));
    assert!(toasts[0].message.contains("connection refused"));
}

#[test]
fn missing_task_is_reported_without_a_toast() {
    let transport = ScriptedTransport::new(|_| status(404, r#"{"error":"Not Found","statusCode":404}"#));
    let (api, log) = api_with(transport);

    let err = block_on(api.get(TASK_A)).expect_err("404");
    assert!(err.is_not_found());
    assert!(log.is_empty());
}

#[test]
fn update_refreshes_the_record_and_the_list() {
    let transport = ScriptedTransport::new(backend);
    let (api, _log) = api_with(transport.clone());
    let params = list_params();
    let path = format!("/tasks/{TASK_A}");

    block_on(api.list(&params)).expect("list");
    block_on(api.get(TASK_A)).expect("get");
    block_on(api.get(TASK_A)).expect("cached get");
    assert_eq!(transport.count(Method::Get, &path), 1);

    let values = TaskFormValues {
        title: "Renamed".to_string(),
        ..TaskFormValues::default()
    };
    let outcome = block_on(submit_task(&api, &FormTarget::Update(TASK_A.to_string()), &values));
    let SubmitOutcome::Updated(task) = outcome else {
        panic!("expected an update, got {outcome:?}");
    };
    assert_eq!(task.title, "Renamed");

    let requests = transport.requests.borrow().clone();
    let patch = requests
        .iter()
        .find(|request| request.method == Method::Patch)
        .expect("patch request");
    let body = patch.body.as_ref().expect("patch body");
    assert!(body.get("id").is_none());
    assert_eq!(body["title"], "Renamed");

    block_on(api.get(TASK_A)).expect("get after update");
    block_on(api.list(&params)).expect("list after update");
    assert_eq!(transport.count(Method::Get, &path), 2);
    assert_eq!(transport.count(Method::Get, "/tasks"), 2);
}

#[test]
fn server_validation_errors_map_onto_fields_without_a_toast() {
    let transport = ScriptedTransport::new(|request| match request.method {
        Method::Post => status(
            400,
            r#"{
                "error": "Bad Request",
                "statusCode": 400,
                "message": [
                    {"property": "title", "constraints": {"isUnique": "title already exists"}, "children": []},
                    {"property": "meta", "constraints": {}, "children": [
                        {"property": "owner", "constraints": ["owner is required", "owner must be a string"], "children": []}
                    ]}
                ]
            }"#,
        ),
        _ => status(404, ""),
    });
    let (api, log) = api_with(transport);

    let values = TaskFormValues {
        title: "Duplicate".to_string(),
        ..TaskFormValues::default()
    };
    let SubmitOutcome::Invalid(errors) = block_on(submit_task(&api, &FormTarget::Create, &values)) else {
        panic!("expected field errors");
    };
    assert_eq!(errors.get("title"), Some("- title already exists"));
    assert_eq!(
        errors.get("meta.owner"),
        Some("- owner is required\n- owner must be a string")
    );
    assert_eq!(errors.focus(), Some("title"));
    assert!(log.is_empty());
}

#[test]
fn local_validation_failure_sends_nothing() {
    let transport = ScriptedTransport::new(backend);
    let (api, _log) = api_with(transport.clone());

    let outcome = block_on(submit_task(&api, &FormTarget::Create, &TaskFormValues::default()));
    let SubmitOutcome::Invalid(errors) = outcome else {
        panic!("expected field errors");
    };
    assert!(errors.get("title").is_some());
    assert_eq!(transport.total(), 0);
}

#[test]
fn bulk_delete_settles_every_id_without_individual_toasts() {
    let failing = format!("/tasks/{TASK_B}");
    let transport = ScriptedTransport::new(move |request| {
        if request.method == Method::Delete && request.path == failing {
            return status(500, r#"{"error":"Internal Server Error","statusCode":500}"#);
        }
        backend(request)
    });
    let (api, log) = api_with(transport.clone());
    let params = list_params();

    block_on(api.list(&params)).expect("list");
    block_on(api.get(TASK_A)).expect("get a");
    block_on(api.get(TASK_B)).expect("get b");

    let ids = vec![TASK_A.to_string(), TASK_B.to_string()];
    let outcomes = block_on(api.delete_many(&ids));
    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes[0].id, TASK_A);
    assert!(outcomes[0].is_fulfilled());
    assert_eq!(outcomes[1].id, TASK_B);
    assert!(!outcomes[1].is_fulfilled());
    assert!(log.is_empty());

    block_on(api.list(&params)).expect("list after bulk");
    block_on(api.get(TASK_A)).expect("get a after bulk");
    block_on(api.get(TASK_B)).expect("get b after bulk");
    assert_eq!(transport.count(Method::Get, "/tasks"), 2);
    assert_eq!(transport.count(Method::Get, &format!("/tasks/{TASK_A}")), 2);
    assert_eq!(transport.count(Method::Get, &format!("/tasks/{TASK_B}")), 1);
}

#[test]
fn restore_patches_the_restore_endpoint_without_a_body() {
    let transport = ScriptedTransport::new(backend);
    let (api, _log) = api_with(transport.clone());

    let outcomes = block_on(api.restore_many(&[TASK_A.to_string()]));
    assert!(outcomes.iter().all(|outcome| outcome.is_fulfilled()));

    let requests = transport.requests.borrow();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, Method::Patch);
    assert_eq!(requests[0].path, format!("/tasks/{TASK_A}/restore"));
    assert_eq!(requests[0].body, None);
}

#[test]
fn dropping_cached_reads_refetches_lists_and_tasks() {
    let transport = ScriptedTransport::new(backend);
    let (api, _log) = api_with(transport.clone());
    let params = list_params();

    block_on(api.list(&params)).expect("list");
    block_on(api.get(TASK_A)).expect("get");
    assert_eq!(transport.total(), 2);

    api.drop_cached_reads();
    block_on(api.list(&params)).expect("list again");
    block_on(api.get(TASK_A)).expect("get again");
    assert_eq!(transport.count(Method::Get, "/tasks"), 2);
    assert_eq!(transport.count(Method::Get, &format!("/tasks/{TASK_A}")), 2);
}
