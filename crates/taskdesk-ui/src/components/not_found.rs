use yew::{
  Html,
  function_component,
  html,
  use_context
};
use yew_router::prelude::Link;

use crate::app::{
  LocaleContext,
  Route
};
use taskdesk_core::i18n::{
  Locale,
  Text
};

#[function_component(NotFound)]
pub fn not_found() -> Html {
  let locale = use_context::<LocaleContext>()
    .map(|ctx| ctx.locale)
    .unwrap_or(Locale::En);

  html! {
      <div class="panel empty-state">
          <div class="header">{ "404" }</div>
          <p>{ locale.text(Text::NotFound) }</p>
          <Link<Route> to={Route::Tasks} classes="btn">{ "Tasks" }</Link<Route>>
      </div>
  }
}
