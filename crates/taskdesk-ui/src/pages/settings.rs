use taskdesk_core::i18n::{
  Locale,
  Text
};
use taskdesk_core::notify::Notification;
use yew::{
  Callback,
  Event,
  Html,
  InputEvent,
  MouseEvent,
  SubmitEvent,
  TargetCast,
  function_component,
  html,
  use_context,
  use_state
};

use crate::app::{
  LocaleContext,
  Services
};

/// Runtime settings: the API base URL
/// and the UI language, both kept in
/// cookies.
#[function_component(SettingsPage)]
pub fn settings_page() -> Html {
  let services = use_context::<Services>();
  let locale_ctx =
    use_context::<LocaleContext>();
  let locale = locale_ctx
    .as_ref()
    .map(|ctx| ctx.locale)
    .unwrap_or_default();

  let base_url = {
    let initial = services
      .as_ref()
      .map(|services| {
        services.0.config.api_base_url()
      })
      .unwrap_or_default();
    use_state(move || initial)
  };

  let on_input = {
    let base_url = base_url.clone();
    Callback::from(move |e: InputEvent| {
      let input: web_sys::HtmlInputElement =
        e.target_unchecked_into();
      base_url.set(input.value());
    })
  };

  let on_save = {
    let services = services.clone();
    let base_url = base_url.clone();
    Callback::from(move |e: SubmitEvent| {
      e.prevent_default();
      let Some(services) = &services else {
        return;
      };
      let notifier = &services.0.notifier;
      match services
        .0
        .config
        .set_api_base_url(&base_url)
      {
        | Ok(normalized) => {
          services.0.tasks.drop_cached_reads();
          base_url.set(normalized.clone());
          notifier.notify(
            Notification::success(format!(
              "{}: {normalized}",
              locale.text(Text::ApiBaseUrl)
            ))
          );
        }
        | Err(err) => {
          tracing::warn!(error = %err, "rejected API base URL");
          notifier.notify(
            Notification::error(
              err.to_string()
            )
          );
        }
      }
    })
  };

  let on_clear = {
    let base_url = base_url.clone();
    Callback::from(move |_: MouseEvent| {
      let Some(services) = &services else {
        return;
      };
      let config = &services.0.config;
      if let Err(err) =
        config.clear_api_base_url()
      {
        services.0.notifier.notify(
          Notification::error(
            err.to_string()
          )
        );
        return;
      }
      services.0.tasks.drop_cached_reads();
      base_url.set(config.api_base_url());
    })
  };

  let on_locale = Callback::from(
    move |e: Event| {
      let select: web_sys::HtmlSelectElement =
        e.target_unchecked_into();
      let next =
        Locale::parse(&select.value());
      if let (Some(ctx), Some(next)) =
        (&locale_ctx, next)
      {
        ctx.set_locale.emit(next);
      }
    }
  );

  html! {
      <div class="page">
          <form class="panel form-card" onsubmit={on_save}>
              <div class="header">{ locale.text(Text::Settings) }</div>
              <div class="form-body">
                  <label class="field">
                      <span>{ locale.text(Text::ApiBaseUrl) }</span>
                      <input
                          id="field-apiBaseUrl"
                          type="url"
                          value={(*base_url).clone()}
                          oninput={on_input}
                      />
                  </label>
                  <label class="field">
                      <span>{ locale.text(Text::Language) }</span>
                      <select onchange={on_locale}>
                          {
                              for Locale::ALL.into_iter().map(|option| html! {
                                  <option value={option.code()} selected={option == locale}>
                                      { option.display_name() }
                                  </option>
                              })
                          }
                      </select>
                  </label>
              </div>
              <div class="form-actions">
                  <button type="button" class="btn ghost" onclick={on_clear}>{ locale.text(Text::Reset) }</button>
                  <button type="submit" class="btn ok">{ locale.text(Text::Save) }</button>
              </div>
          </form>
      </div>
  }
}
