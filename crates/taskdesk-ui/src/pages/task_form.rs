use taskdesk_core::form::{
  FieldErrors,
  FormMode,
  FormTarget,
  SubmitOutcome,
  TaskFormValues,
  submit_task,
  success_redirect
};
use taskdesk_core::notify::Notification;
use taskdesk_shared::TaskStatus;
use yew::{
  Callback,
  Event,
  Html,
  InputEvent,
  Properties,
  TargetCast,
  function_component,
  html,
  use_context,
  use_state
};
use yew_router::prelude::{
  Routable,
  use_location,
  use_navigator
};

use crate::api::focus_element;
use crate::app::{
  LocaleContext,
  Route,
  Services
};
use crate::components::FormCard;

const ENTITY: &str = "Task";

fn field_id(path: &str) -> String {
  format!("field-{path}")
}

fn field_error(
  errors: &FieldErrors,
  path: &str
) -> Html {
  match errors.get(path) {
    | Some(message) => html! {
        <div class="field-error">{ message.to_string() }</div>
    },
    | None => html! {}
  }
}

#[derive(Properties, PartialEq)]
pub struct TaskFormProps {
  pub target:   FormTarget,
  pub mode:     FormMode,
  pub initial:  TaskFormValues,
  pub on_edit:  Callback<()>,
  pub on_cancel: Callback<()>,
  #[prop_or_default]
  pub on_saved: Callback<()>
}

/// Create/view/edit form for one task.
#[function_component(TaskForm)]
pub fn task_form(
  props: &TaskFormProps
) -> Html {
  let services = use_context::<Services>();
  let locale = use_context::<LocaleContext>()
    .map(|ctx| ctx.locale)
    .unwrap_or_default();
  let navigator = use_navigator();
  let pathname = use_location()
    .map(|location| {
      location.path().to_string()
    })
    .unwrap_or_default();

  let values = {
    let initial = props.initial.clone();
    use_state(move || initial)
  };
  let errors =
    use_state(FieldErrors::default);
  let pending = use_state(|| false);
  let read_only = props.mode.read_only();

  let on_title = {
    let values = values.clone();
    Callback::from(move |e: InputEvent| {
      let input: web_sys::HtmlInputElement =
        e.target_unchecked_into();
      let mut next = (*values).clone();
      next.title = input.value();
      values.set(next);
    })
  };
  let on_description = {
    let values = values.clone();
    Callback::from(move |e: InputEvent| {
      let input: web_sys::HtmlTextAreaElement =
        e.target_unchecked_into();
      let mut next = (*values).clone();
      next.description = input.value();
      values.set(next);
    })
  };
  let on_status = {
    let values = values.clone();
    Callback::from(move |e: Event| {
      let select: web_sys::HtmlSelectElement =
        e.target_unchecked_into();
      let mut next = (*values).clone();
      next.status =
        TaskStatus::parse(&select.value());
      values.set(next);
    })
  };

  let on_submit = {
    let values = values.clone();
    let errors = errors.clone();
    let pending = pending.clone();
    let target = props.target.clone();
    let on_saved = props.on_saved.clone();
    Callback::from(move |_: ()| {
      if *pending {
        return;
      }
      let Some(services) = services.clone()
      else {
        tracing::error!(
          "services context missing"
        );
        return;
      };
      pending.set(true);

      let api = services.0.tasks.clone();
      let notifier =
        services.0.notifier.clone();
      let values = (*values).clone();
      let target = target.clone();
      let errors = errors.clone();
      let pending = pending.clone();
      let on_saved = on_saved.clone();
      let navigator = navigator.clone();
      let pathname = pathname.clone();
      wasm_bindgen_futures::spawn_local(
        async move {
          let outcome = submit_task(
            &api, &target, &values
          )
          .await;
          pending.set(false);

          match &outcome {
            | SubmitOutcome::Created(_) => {
              notifier.notify(
                Notification::success(
                  locale.created(ENTITY)
                )
              );
            }
            | SubmitOutcome::Updated(_) => {
              notifier.notify(
                Notification::success(
                  locale.updated(ENTITY)
                )
              );
            }
            | SubmitOutcome::Invalid(
              field_errors
            ) => {
              if let Some(path) =
                field_errors.focus()
              {
                focus_element(&field_id(
                  path
                ));
              }
              errors.set(
                field_errors.clone()
              );
              return;
            }
            | SubmitOutcome::Failed(err) => {
              tracing::warn!(
                error = %err,
                "task submit failed"
              );
              return;
            }
          }

          errors.set(FieldErrors::default());
          on_saved.emit(());
          let route = success_redirect(
            &pathname, &outcome
          )
          .and_then(|path| {
            Route::recognize(&path)
          });
          if let (Some(navigator), Some(route)) =
            (navigator, route)
          {
            navigator.push(&route);
          }
        }
      );
    })
  };

  let status_field = if props
    .mode
    .shows_status()
  {
    let selected = values
      .status
      .map(TaskStatus::as_str)
      .unwrap_or_default();
    html! {
        <label class="field">
            <span>{ "Status" }</span>
            <select id={field_id("status")} disabled={read_only} onchange={on_status}>
                <option value="" selected={selected.is_empty()}>{ "" }</option>
                {
                    for TaskStatus::ALL.into_iter().map(|status| html! {
                        <option value={status.as_str()} selected={status.as_str() == selected}>
                            { status.as_str() }
                        </option>
                    })
                }
            </select>
            { field_error(&errors, "status") }
        </label>
    }
  } else {
    html! {}
  };

  html! {
      <FormCard
          title={locale.form_title(ENTITY, props.mode)}
          mode={props.mode}
          locale={locale}
          pending={*pending}
          on_submit={on_submit}
          on_edit={props.on_edit.clone()}
          on_cancel={props.on_cancel.clone()}
      >
          <label class="field">
              <span>{ "Title" }</span>
              <input
                  id={field_id("title")}
                  type="text"
                  value={values.title.clone()}
                  readonly={read_only}
                  oninput={on_title}
              />
              { field_error(&errors, "title") }
          </label>
          <label class="field">
              <span>{ "Description" }</span>
              <textarea
                  id={field_id("description")}
                  value={values.description.clone()}
                  readonly={read_only}
                  oninput={on_description}
              />
              { field_error(&errors, "description") }
          </label>
          { status_field }
      </FormCard>
  }
}
