use chrono::DateTime;
use futures::FutureExt;
use taskdesk_core::filter_state::{
  DEFAULT_PAGE_SIZE,
  FilterDefaults,
  FilterFn
};
use taskdesk_core::form::{
  FormMode,
  FormTarget,
  TaskFormValues
};
use taskdesk_core::i18n::Text;
use taskdesk_core::query::TaskListParams;
use taskdesk_core::table::{
  ColumnDef,
  FilterVariant,
  default_column_filter_fns
};
use taskdesk_core::url_state::is_edit_requested;
use taskdesk_shared::{
  TaskDto,
  TaskStatus
};
use yew::{
  Callback,
  Html,
  MouseEvent,
  Properties,
  function_component,
  html,
  use_context,
  use_memo
};
use yew_router::prelude::{
  Navigator,
  use_location,
  use_navigator
};

use super::task_form::TaskForm;
use crate::app::{
  LocaleContext,
  Route,
  Services
};
use crate::components::{
  BulkHandler,
  DataTable,
  NotFound,
  ToolbarContext,
  TopToolbar
};
use crate::hooks::{
  use_task,
  use_task_page,
  use_url_filter
};

const EDIT_QUERY: [(&str, &str); 1] =
  [("is-edit", "true")];

fn format_timestamp(
  raw: Option<&String>
) -> String {
  let Some(raw) = raw else {
    return String::new();
  };
  DateTime::parse_from_rfc3339(raw)
    .map(|ts| {
      ts.format("%Y-%m-%d %H:%M")
        .to_string()
    })
    .unwrap_or_else(|_| raw.clone())
}

fn task_columns() -> Vec<ColumnDef<TaskDto>> {
  vec![
    ColumnDef {
      id:             "title",
      header:         "Title",
      accessor:       |task: &TaskDto| {
        task.title.clone()
      },
      filter_fn:      None,
      filter_variant: FilterVariant::Text,
      sortable:       true
    },
    ColumnDef {
      id:             "description",
      header:         "Description",
      accessor:       |task: &TaskDto| {
        task
          .description
          .clone()
          .unwrap_or_default()
      },
      filter_fn:      None,
      filter_variant: FilterVariant::Text,
      sortable:       true
    },
    ColumnDef {
      id:             "status",
      header:         "Status",
      accessor:       |task: &TaskDto| {
        task
          .status
          .map(TaskStatus::as_str)
          .unwrap_or_default()
          .to_string()
      },
      filter_fn:      Some(
        FilterFn::Equals
      ),
      filter_variant:
        FilterVariant::Select(
          TaskStatus::ALL
            .iter()
            .map(|status| {
              status.as_str().to_string()
            })
            .collect()
        ),
      sortable:       true
    },
    ColumnDef {
      id:             "createdAt",
      header:         "Created",
      accessor:       |task: &TaskDto| {
        format_timestamp(
          task.created_at.as_ref()
        )
      },
      filter_fn:      Some(
        FilterFn::Between
      ),
      filter_variant:
        FilterVariant::DateRange,
      sortable:       true
    },
  ]
}

fn open_task(
  navigator: Option<Navigator>,
  id: &str,
  edit: bool
) {
  let Some(navigator) = navigator else {
    return;
  };
  let route = Route::TaskDetail {
    id: id.to_string()
  };
  if !edit {
    navigator.push(&route);
    return;
  }
  if let Err(err) =
    navigator.push_with_query(
      &route,
      &EDIT_QUERY
    )
  {
    tracing::warn!(error = %err, "failed to open edit view");
  }
}

#[function_component(TaskListPage)]
pub fn task_list_page() -> Html {
  let services = use_context::<Services>();
  let locale = use_context::<LocaleContext>()
    .map(|ctx| ctx.locale)
    .unwrap_or_default();
  let navigator = use_navigator();
  let columns = use_memo((), |_| {
    task_columns()
  });

  let page_size = services
    .as_ref()
    .map(|services| {
      services.0.config.default_page_size()
    })
    .unwrap_or(DEFAULT_PAGE_SIZE);
  let defaults =
    FilterDefaults::with_filter_fns(
      default_column_filter_fns(&columns)
    )
    .with_page_size(page_size);
  let filter = use_url_filter(defaults);
  let params =
    TaskListParams::from_state(
      &filter.state
    );
  let (state, reload) =
    use_task_page(params);

  let on_bulk = {
    let api = services
      .as_ref()
      .map(|services| {
        services.0.tasks.clone()
      });
    let reload = reload.clone();
    BulkHandler::new(move |action, ids| {
      let api = api.clone();
      let reload = reload.clone();
      async move {
        let Some(api) = api else {
          return Vec::new();
        };
        let outcomes =
          api.bulk(action, &ids).await;
        reload.emit(());
        outcomes
      }
      .boxed_local()
    })
  };

  let on_open = {
    let navigator = navigator.clone();
    Callback::from(
      move |(id, edit): (String, bool)| {
        open_task(
          navigator.clone(),
          &id,
          edit
        )
      }
    )
  };

  let on_create = Callback::from(
    move |_: MouseEvent| {
      if let Some(navigator) = &navigator {
        navigator.push(&Route::TaskCreate);
      }
    }
  );
  let render_toolbar = Callback::from(
    move |context: ToolbarContext| {
      html! {
          <TopToolbar context={context} extra={html! {
              <button class="btn ok" onclick={on_create.clone()}>{ locale.text(Text::Create) }</button>
          }} />
      }
    }
  );

  html! {
      <div class="page">
          <DataTable<TaskDto>
              columns={columns}
              page={state.data().cloned()}
              loading={state.is_loading()}
              error={state.error().map(|err| err.notification_text())}
              filter={filter.state.clone()}
              on_change={filter.on_change.clone()}
              on_reset={filter.on_reset.clone()}
              on_bulk={on_bulk}
              on_open={on_open}
              render_toolbar={Some(render_toolbar)}
          />
      </div>
  }
}

#[function_component(TaskCreatePage)]
pub fn task_create_page() -> Html {
  let navigator = use_navigator();
  let on_cancel =
    Callback::from(move |_: ()| {
      if let Some(navigator) = &navigator {
        navigator.push(&Route::Tasks);
      }
    });

  html! {
      <div class="page">
          <TaskForm
              target={FormTarget::Create}
              mode={FormMode::Create}
              initial={TaskFormValues::default()}
              on_edit={Callback::noop()}
              on_cancel={on_cancel}
          />
      </div>
  }
}

#[derive(Properties, PartialEq)]
pub struct TaskDetailPageProps {
  pub id: String
}

#[function_component(TaskDetailPage)]
pub fn task_detail_page(
  props: &TaskDetailPageProps
) -> Html {
  let locale = use_context::<LocaleContext>()
    .map(|ctx| ctx.locale)
    .unwrap_or_default();
  let navigator = use_navigator();
  let is_edit = use_location()
    .map(|location| {
      is_edit_requested(
        location.query_str()
      )
    })
    .unwrap_or(false);
  let (state, reload) =
    use_task(props.id.clone());

  if state
    .error()
    .is_some_and(|err| err.is_not_found())
  {
    return html! { <NotFound /> };
  }

  let Some(task) = state.data() else {
    return match state.error() {
      | Some(err) => html! {
          <div class="panel error">
              <div class="header">{ err.title().to_string() }</div>
              <p>{ err.notification_text() }</p>
          </div>
      },
      | None => html! {
          <div class="panel loading">{ locale.text(Text::Loading) }</div>
      }
    };
  };

  let mode =
    FormMode::resolve(true, is_edit);
  let on_edit = {
    let navigator = navigator.clone();
    let id = props.id.clone();
    Callback::from(move |_: ()| {
      open_task(navigator.clone(), &id, true)
    })
  };
  let on_cancel = {
    let id = props.id.clone();
    Callback::from(move |_: ()| {
      open_task(navigator.clone(), &id, false)
    })
  };
  // Remount when the record or mode changes so the inputs pick up fresh values.
  let key = format!(
    "{}-{}-{:?}",
    task.id,
    task.updated_at.as_deref().unwrap_or_default(),
    mode
  );

  html! {
      <div class="page">
          <TaskForm
              key={key}
              target={FormTarget::Update(props.id.clone())}
              mode={mode}
              initial={TaskFormValues::from_task(task)}
              on_edit={on_edit}
              on_cancel={on_cancel}
              on_saved={reload}
          />
      </div>
  }
}
