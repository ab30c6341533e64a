use std::rc::Rc;

use taskdesk_core::config::{
  Config,
  SettingsStorage
};
use taskdesk_core::i18n::{
  Locale,
  Text
};
use taskdesk_core::notify::NotificationSink;
use taskdesk_core::remote::{
  RemoteClient,
  TaskApi
};
use taskdesk_core::transport::HttpTransport;
use yew::{
  Callback,
  ContextProvider,
  Html,
  function_component,
  html,
  use_reducer,
  use_state
};
use yew_router::prelude::{
  BrowserRouter,
  Link,
  Redirect,
  Routable,
  Switch
};

use crate::api::CookieStorage;
use crate::components::{
  NotFound,
  ToastHost,
  ToastList,
  ToastSink
};
use crate::pages::{
  SettingsPage,
  TaskCreatePage,
  TaskDetailPage,
  TaskListPage
};

const BUNDLED_CONFIG_TOML: &str =
  include_str!("../assets/taskdesk.toml");

#[derive(Clone, Routable, PartialEq)]
pub enum Route {
  #[at("/")]
  Home,
  #[at("/tasks")]
  Tasks,
  #[at("/tasks/create")]
  TaskCreate,
  #[at("/tasks/:id")]
  TaskDetail { id: String },
  #[at("/settings")]
  Settings,
  #[not_found]
  #[at("/404")]
  NotFound
}

/// Long-lived objects shared by every
/// page.
pub struct AppServices {
  pub config:   Rc<Config>,
  pub tasks:    Rc<TaskApi>,
  pub notifier: Rc<dyn NotificationSink>
}

impl AppServices {
  fn build(
    notifier: Rc<dyn NotificationSink>
  ) -> anyhow::Result<Self> {
    let storage: Rc<dyn SettingsStorage> =
      Rc::new(CookieStorage);
    let config = Rc::new(Config::load(
      storage,
      Some(BUNDLED_CONFIG_TOML)
    )?);
    let transport = Rc::new(
      HttpTransport::new(config.clone())?
    );
    let remote = RemoteClient::new(
      transport,
      notifier.clone()
    );
    Ok(Self {
      config,
      tasks: Rc::new(TaskApi::new(remote)),
      notifier
    })
  }
}

#[derive(Clone)]
pub struct Services(pub Rc<AppServices>);

impl PartialEq for Services {
  fn eq(&self, other: &Self) -> bool {
    Rc::ptr_eq(&self.0, &other.0)
  }
}

#[derive(Clone, PartialEq)]
pub struct LocaleContext {
  pub locale:     Locale,
  pub set_locale: Callback<Locale>
}

#[function_component(App)]
pub fn app() -> Html {
  let toasts =
    use_reducer(ToastList::default);
  let services = {
    let dispatcher = toasts.dispatcher();
    use_state(move || {
      let notifier: Rc<dyn NotificationSink> =
        Rc::new(ToastSink::new(dispatcher));
      AppServices::build(notifier)
        .map(|services| {
          Services(Rc::new(services))
        })
        .map_err(|err| format!("{err:#}"))
    })
  };
  let locale = {
    let services = services.clone();
    use_state(move || match &*services {
      | Ok(services) => {
        services.0.config.locale()
      }
      | Err(_) => Locale::default()
    })
  };

  let services = match &*services {
    | Ok(services) => services.clone(),
    | Err(err) => {
      tracing::error!(error = %err, "failed to start services");
      return html! {
          <div class="panel fatal">
              <div class="header">{ "TaskDesk could not start" }</div>
              <pre>{ err.clone() }</pre>
          </div>
      };
    }
  };

  let set_locale = {
    let locale = locale.clone();
    let config = services.0.config.clone();
    Callback::from(move |next: Locale| {
      if let Err(err) =
        config.set_locale(next)
      {
        tracing::warn!(error = %err, "failed to persist locale");
      }
      tracing::info!(locale = next.code(), "locale changed");
      locale.set(next);
    })
  };
  let locale_ctx = LocaleContext {
    locale: *locale,
    set_locale
  };

  html! {
      <ContextProvider<Services> context={services}>
          <ContextProvider<LocaleContext> context={locale_ctx.clone()}>
              <BrowserRouter>
                  <div class="shell">
                      <nav class="topbar">
                          <span class="brand">{ "TaskDesk" }</span>
                          <Link<Route> to={Route::Tasks} classes="nav-link">{ "Tasks" }</Link<Route>>
                          <Link<Route> to={Route::Settings} classes="nav-link">
                              { locale_ctx.locale.text(Text::Settings) }
                          </Link<Route>>
                      </nav>
                      <main class="content">
                          <Switch<Route> render={switch} />
                      </main>
                  </div>
                  <ToastHost toasts={(*toasts).clone()} dispatcher={toasts.dispatcher()} />
              </BrowserRouter>
          </ContextProvider<LocaleContext>>
      </ContextProvider<Services>>
  }
}

fn switch(route: Route) -> Html {
  match route {
    | Route::Home => {
      html! { <Redirect<Route> to={Route::Tasks} /> }
    }
    | Route::Tasks => {
      html! { <TaskListPage /> }
    }
    | Route::TaskCreate => {
      html! { <TaskCreatePage /> }
    }
    | Route::TaskDetail { id } => {
      html! { <TaskDetailPage id={id} /> }
    }
    | Route::Settings => {
      html! { <SettingsPage /> }
    }
    | Route::NotFound => {
      html! { <NotFound /> }
    }
  }
}
