use yew::{
  Callback,
  Html,
  MouseEvent,
  Properties,
  SubmitEvent,
  function_component,
  html
};

use taskdesk_core::form::FormMode;
use taskdesk_core::i18n::{
  Locale,
  Text
};

#[derive(Properties, PartialEq)]
pub struct FormCardProps {
  pub title:     String,
  pub mode:      FormMode,
  pub locale:    Locale,
  pub pending:   bool,
  pub on_submit: Callback<()>,
  pub on_edit:   Callback<()>,
  pub on_cancel: Callback<()>,
  #[prop_or_default]
  pub children:  Html
}

/// Card chrome around a form: title,
/// fields and the mode-dependent buttons.
#[function_component(FormCard)]
pub fn form_card(
  props: &FormCardProps
) -> Html {
  let onsubmit = {
    let on_submit =
      props.on_submit.clone();
    Callback::from(
      move |e: SubmitEvent| {
        e.prevent_default();
        on_submit.emit(());
      }
    )
  };
  let on_edit = {
    let on_edit = props.on_edit.clone();
    Callback::from(
      move |_: MouseEvent| on_edit.emit(())
    )
  };
  let on_cancel = {
    let on_cancel =
      props.on_cancel.clone();
    Callback::from(
      move |_: MouseEvent| {
        on_cancel.emit(())
      }
    )
  };
  let locale = props.locale;

  html! {
      <form class="panel form-card" {onsubmit}>
          <div class="header">{ props.title.clone() }</div>
          <div class="form-body">
              { props.children.clone() }
          </div>
          <div class="form-actions">
              {
                  if props.mode.read_only() {
                      html! {
                          <button type="button" class="btn" onclick={on_edit}>{ locale.text(Text::Edit) }</button>
                      }
                  } else {
                      html! {
                          <>
                              <button type="button" class="btn ghost" onclick={on_cancel} disabled={props.pending}>
                                  { locale.text(Text::Cancel) }
                              </button>
                              <button type="submit" class="btn ok" disabled={props.pending}>
                                  { if props.pending { locale.text(Text::Loading) } else { locale.text(Text::Save) } }
                              </button>
                          </>
                      }
                  }
              }
          </div>
      </form>
  }
}
