use std::cell::RefCell;
use std::rc::Rc;

use futures::FutureExt;
use futures::future::LocalBoxFuture;
use taskdesk_core::error::ApiError;
use taskdesk_core::filter_state::{
  FilterChange,
  FilterDefaults,
  FilterState,
  FilterStore
};
use taskdesk_core::query::TaskListParams;
use taskdesk_core::remote::TaskApi;
use taskdesk_core::table::{
  LoadState,
  Loader
};
use taskdesk_core::url_state::UrlFilterStore;
use taskdesk_shared::{
  TaskDto,
  TaskPage
};
use yew::{
  Callback,
  hook,
  use_context,
  use_effect_with,
  use_force_update,
  use_mut_ref,
  use_state
};
use yew_router::prelude::use_location;

use crate::api::BrowserLocation;
use crate::app::Services;

/// Filter state kept in the address bar.
#[derive(Clone, PartialEq)]
pub struct UrlFilter {
  pub state:     FilterState,
  pub on_change: Callback<FilterChange>,
  pub on_reset:  Callback<()>
}

#[hook]
pub fn use_url_filter(
  defaults: FilterDefaults
) -> UrlFilter {
  // Re-render on back/forward navigation.
  let _location = use_location();
  let store: Rc<
    RefCell<UrlFilterStore<BrowserLocation>>
  > = use_mut_ref(move || {
    UrlFilterStore::new(
      BrowserLocation,
      defaults
    )
  });
  let update = use_force_update();

  let on_change = {
    let store = store.clone();
    let update = update.clone();
    Callback::from(
      move |change: FilterChange| {
        store.borrow_mut().apply(change);
        update.force_update();
      }
    )
  };
  let on_reset = {
    let store = store.clone();
    Callback::from(move |_: ()| {
      store.borrow_mut().reset();
      tracing::debug!(
        "filters reset to defaults"
      );
      update.force_update();
    })
  };

  let state = store.borrow().get();
  UrlFilter {
    state,
    on_change,
    on_reset
  }
}

type Load<D, T> = fn(
  Rc<TaskApi>,
  D
) -> LocalBoxFuture<
  'static,
  Result<T, ApiError>
>;

/// Runs `load` whenever `deps` or the
/// reload tick changes. Responses from
/// superseded loads are dropped.
#[hook]
fn use_remote<D, T>(
  deps: D,
  load: Load<D, T>
) -> (LoadState<T>, Callback<()>)
where
  D: Clone + PartialEq + 'static,
  T: Clone + 'static
{
  let services = use_context::<Services>();
  let loader: Rc<RefCell<Loader<T>>> =
    use_mut_ref(Loader::default);
  let update = use_force_update();
  let tick = use_state(|| 0_u64);

  {
    let loader = loader.clone();
    use_effect_with(
      (deps, *tick),
      move |(deps, _)| {
        match services {
          | Some(services) => {
            let ticket =
              loader.borrow_mut().begin();
            update.force_update();
            let future = load(
              services.0.tasks.clone(),
              deps.clone()
            );
            wasm_bindgen_futures::spawn_local(
              async move {
                let result = future.await;
                if loader
                  .borrow_mut()
                  .settle(ticket, result)
                {
                  update.force_update();
                }
              }
            );
          }
          | None => {
            tracing::error!(
              "services context missing"
            );
          }
        }
        || ()
      }
    );
  }

  let reload = Callback::from(
    move |_: ()| tick.set(*tick + 1)
  );
  let state = loader.borrow().state().clone();
  (state, reload)
}

#[hook]
pub fn use_task_page(
  params: TaskListParams
) -> (LoadState<TaskPage>, Callback<()>) {
  use_remote(params, |api, params| {
    async move { api.list(&params).await }
      .boxed_local()
  })
}

#[hook]
pub fn use_task(
  id: String
) -> (LoadState<TaskDto>, Callback<()>) {
  use_remote(id, |api, id| {
    async move { api.get(&id).await }
      .boxed_local()
  })
}
